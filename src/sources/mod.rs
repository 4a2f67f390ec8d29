pub mod hackernews;
pub mod reddit;

use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ValueEnum;
use regex::Regex;

use crate::models::Post;

/// Posts at or below this length are link posts or noise, not extractable text.
pub const MIN_CONTENT_CHARS: usize = 50;
/// Recency window: last 7 days.
pub const MAX_AGE_HOURS: f64 = 168.0;
const FETCH_TIMEOUT_SECS: u64 = 10;

// Reddit rejects default client UAs; a realistic browser identifier is required.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Source {
    Hackernews,
    Reddit,
}

impl Source {
    pub fn label(self) -> &'static str {
        match self {
            Source::Hackernews => "hackernews",
            Source::Reddit => "reddit",
        }
    }
}

/// Feed selection for the HackerNews adapter. Ask HN is the default: self
/// posts soliciting advice are a far denser pain-point source than link posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HnFeed {
    Ask,
    Top,
}

pub struct FetchOutcome {
    /// Posts that survived the content and recency filters.
    pub posts: Vec<Post>,
    /// Candidate count before filtering.
    pub fetched: usize,
}

/// Fetch a bounded list of candidate posts from one source and normalize them.
pub async fn fetch_posts(
    source: Source,
    feed: HnFeed,
    subreddit: &str,
    limit: usize,
) -> Result<FetchOutcome> {
    let client = http_client()?;
    let candidates = match source {
        Source::Hackernews => hackernews::fetch(&client, feed, limit).await?,
        Source::Reddit => reddit::fetch(&client, subreddit, limit).await?,
    };
    let fetched = candidates.len();
    let posts: Vec<Post> = candidates.into_iter().filter(is_extractable).collect();
    Ok(FetchOutcome { posts, fetched })
}

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}

/// Keep posts with real text content published inside the recency window.
pub fn is_extractable(post: &Post) -> bool {
    if post.content.chars().count() <= MIN_CONTENT_CHARS {
        return false;
    }
    matches!(post.age_hours, Some(age) if age < MAX_AGE_HOURS)
}

/// Strip HTML tags and unescape the entities the sources actually emit.
pub fn clean_html(raw: &str) -> String {
    let stripped = TAG_RE.replace_all(raw, "");
    stripped
        .replace("&gt;", ">")
        .replace("&lt;", "<")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&#x2F;", "/")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}
