use anyhow::{bail, Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing::{debug, info};

use super::{clean_html, HnFeed};
use crate::models::Post;

const ASK_STORIES_URL: &str = "https://hacker-news.firebaseio.com/v0/askstories.json";
const TOP_STORIES_URL: &str = "https://hacker-news.firebaseio.com/v0/topstories.json";
const ITEM_URL: &str = "https://hacker-news.firebaseio.com/v0/item";

/// Fetch up to `limit` stories, one item request per id, in feed order.
/// Individual item failures are skipped; a failed id-list fetch is fatal.
pub async fn fetch(client: &reqwest::Client, feed: HnFeed, limit: usize) -> Result<Vec<Post>> {
    let list_url = match feed {
        HnFeed::Ask => ASK_STORIES_URL,
        HnFeed::Top => TOP_STORIES_URL,
    };
    info!("Fetching story ids: {}", list_url);
    let resp = client
        .get(list_url)
        .send()
        .await
        .context("Failed to reach HackerNews")?;
    if !resp.status().is_success() {
        bail!("HackerNews story list returned {}", resp.status());
    }
    let ids: Vec<i64> = resp
        .json()
        .await
        .context("HackerNews story list is not valid JSON")?;
    let ids = &ids[..ids.len().min(limit)];
    info!("Got {} story ids", ids.len());

    let pb = ProgressBar::new(ids.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec})")?
            .progress_chars("=> "),
    );

    let now = Utc::now();
    let mut posts = Vec::new();
    for &id in ids {
        match fetch_item(client, id).await {
            Ok(item) => {
                if let Some(post) = format_post(&item, now) {
                    posts.push(post);
                }
            }
            Err(e) => debug!("Skipping story {}: {}", id, e),
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(posts)
}

async fn fetch_item(client: &reqwest::Client, id: i64) -> Result<Value> {
    let url = format!("{}/{}.json", ITEM_URL, id);
    let resp = client.get(&url).send().await?;
    if !resp.status().is_success() {
        bail!("item {} returned {}", id, resp.status());
    }
    Ok(resp.json().await?)
}

/// Normalize an HN item into a Post. Non-story items (jobs, polls, comments,
/// deleted entries) return None.
pub(crate) fn format_post(story: &Value, now: DateTime<Utc>) -> Option<Post> {
    if story.get("type").and_then(Value::as_str) != Some("story") {
        return None;
    }
    let id = story.get("id").and_then(Value::as_i64)?;

    let (published, age_hours) = match story
        .get("time")
        .and_then(Value::as_i64)
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    {
        Some(ts) => (
            ts.to_rfc3339(),
            Some((now - ts).num_seconds() as f64 / 3600.0),
        ),
        None => ("unknown".to_string(), None),
    };

    // HN serves self-post text as HTML
    let content = clean_html(story.get("text").and_then(Value::as_str).unwrap_or(""));

    Some(Post {
        id,
        title: story
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        content,
        url: format!("https://news.ycombinator.com/item?id={}", id),
        score: story.get("score").and_then(Value::as_i64).unwrap_or(0),
        comments: story.get("descendants").and_then(Value::as_i64).unwrap_or(0),
        author: story
            .get("by")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string(),
        published,
        age_hours,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn story_maps_to_post() {
        let published = Utc.timestamp_opt(1_754_000_000, 0).single().unwrap();
        let now = published + chrono::Duration::hours(6);

        let story = json!({
            "id": 46958774,
            "type": "story",
            "title": "Ask HN: Anyone else fighting AI tool regressions?",
            "text": "Every update breaks my pipeline &amp; I&#x27;m tired of it.<p>Third time this month.",
            "score": 120,
            "descendants": 85,
            "by": "jdoe",
            "time": 1_754_000_000
        });

        let post = format_post(&story, now).unwrap();
        assert_eq!(post.id, 46958774);
        assert_eq!(post.url, "https://news.ycombinator.com/item?id=46958774");
        assert_eq!(
            post.content,
            "Every update breaks my pipeline & I'm tired of it.Third time this month."
        );
        assert_eq!(post.score, 120);
        assert_eq!(post.comments, 85);
        assert_eq!(post.author, "jdoe");
        assert!((post.age_hours.unwrap() - 6.0).abs() < 1e-6);
        assert_eq!(post.published, published.to_rfc3339());
    }

    #[test]
    fn non_story_items_are_dropped() {
        let now = Utc.timestamp_opt(1_754_000_000, 0).single().unwrap();
        let job = json!({"id": 1, "type": "job", "title": "Hiring"});
        assert!(format_post(&job, now).is_none());
        let comment = json!({"id": 2, "type": "comment", "text": "nice"});
        assert!(format_post(&comment, now).is_none());
    }

    #[test]
    fn missing_fields_get_defaults() {
        let now = Utc.timestamp_opt(1_754_000_000, 0).single().unwrap();
        let story = json!({"id": 3, "type": "story"});
        let post = format_post(&story, now).unwrap();
        assert_eq!(post.title, "");
        assert_eq!(post.content, "");
        assert_eq!(post.score, 0);
        assert_eq!(post.author, "unknown");
        assert_eq!(post.published, "unknown");
        assert!(post.age_hours.is_none());
    }
}
