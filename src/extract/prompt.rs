use crate::models::Post;

/// Posts are embedded with content truncated to this many characters; whole
/// self posts can run to thousands of words and blow the token budget.
const CONTENT_PREVIEW_CHARS: usize = 500;

const POST_SEPARATOR: &str = "\n---\n\n";

/// The fixed extraction prompt. `{{POSTS}}` is replaced with the rendered
/// post blocks; everything else is constant across runs so extraction
/// quality is comparable between datasets.
const EXTRACTION_PROMPT: &str = r#"You are analyzing posts from founder and indie-hacker communities to extract actionable pain points that someone could build a product around.

For each post below, identify:
1. Is there a genuine pain point or problem being expressed? (not just a meme, joke, or off-topic discussion)
2. If yes, extract the specific pain point
3. Score the pain point on three dimensions (0-100):
   - **Intensity**: How frustrated/desperate does the person sound? (0=mild annoyance, 100=extreme frustration)
   - **Specificity**: How actionable is the problem? (0=vague complaint, 100=specific workflow pain)
   - **Frequency**: Based on language, does this seem like a recurring problem? (0=one-time issue, 100=ongoing struggle)

### Scoring guide:

**Intensity:**
- 90-100: Extreme frustration ("nightmare", "crushing me", "going to break")
- 70-89: High frustration ("killing my", "eating all my time")
- 50-69: Moderate frustration ("annoying", "painful")
- 30-49: Mild annoyance
- 0-29: Barely frustrated

**Specificity:**
- 90-100: Concrete workflow pain with specific numbers/details
- 70-89: Clear problem with actionable elements
- 50-69: Problem described but vague solution space
- 30-49: Abstract complaint
- 0-29: Extremely vague

**Frequency:**
- 90-100: Daily/weekly recurring ("every day", "3-4 hours daily")
- 70-89: Monthly recurring ("third time this year", "happens often")
- 50-69: Occasional but repeated
- 30-49: Might be one-time
- 0-29: Clearly one-time event

POSTS TO ANALYZE:
{{POSTS}}

Return your analysis as a JSON array. For each post, either:
- If NO actionable pain point: {"post_id": N, "has_pain_point": false, "reason": "brief reason"}
- If YES pain point found: {
    "post_id": N,
    "has_pain_point": true,
    "pain_point": "concise description of the problem",
    "intensity": 0-100,
    "specificity": 0-100,
    "frequency": 0-100,
    "composite_score": (intensity + specificity + frequency) / 3,
    "supporting_quote": "direct quote from post showing the pain"
  }

Only extract REAL pain points. Be strict. Reject:
- Memes, jokes, sarcasm
- Success stories without a problem
- General discussions without a specific complaint
- Survey threads ("What are you working on?")
- Self-promotional posts
- Off-topic content

Return ONLY valid JSON, no other text."#;

/// Render the single batch prompt embedding every post.
pub fn render(posts: &[Post]) -> String {
    let blocks: Vec<String> = posts.iter().map(post_block).collect();
    EXTRACTION_PROMPT.replace("{{POSTS}}", &blocks.join(POST_SEPARATOR))
}

fn post_block(post: &Post) -> String {
    let mut content: String = post.content.chars().take(CONTENT_PREVIEW_CHARS).collect();
    if post.content.chars().count() > CONTENT_PREVIEW_CHARS {
        content.push_str("...");
    }
    format!(
        "POST {}: {}\nContent: {}\nURL: {}\n",
        post.id, post.title, content, post.url
    )
}
