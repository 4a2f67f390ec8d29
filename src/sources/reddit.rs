use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use tracing::info;

use super::clean_html;
use crate::models::Post;

/// One feed entry as parsed, before normalization into a Post.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct FeedEntry {
    pub title: String,
    pub link: String,
    pub published: String,
    pub content: String,
    pub author: String,
}

/// Fetch a subreddit feed and normalize up to `limit` entries.
///
/// Reddit serves an HTML error page instead of a non-success status when it
/// blocks a client, so the Content-Type is checked before parsing.
pub async fn fetch(client: &reqwest::Client, subreddit: &str, limit: usize) -> Result<Vec<Post>> {
    let url = format!("https://www.reddit.com/r/{}/.rss", subreddit);
    info!("Fetching feed: {}", url);

    let resp = client
        .get(&url)
        .send()
        .await
        .context("Failed to reach Reddit")?;
    if !resp.status().is_success() {
        bail!("Reddit feed returned {}", resp.status());
    }
    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();
    if content_type.contains("html") {
        bail!(
            "Reddit returned HTML instead of a feed (request was blocked); \
             try old.reddit.com or an authenticated API client"
        );
    }

    let xml = resp.text().await.context("Failed to read feed body")?;
    let entries = parse_feed(&xml)?;
    if entries.is_empty() {
        bail!("Feed parsed but contained no entries");
    }
    info!("Feed contained {} entries", entries.len());

    let now = Utc::now();
    Ok(entries
        .into_iter()
        .take(limit)
        .enumerate()
        // The feed carries no numeric post ids; assign them in feed order.
        .map(|(i, entry)| format_post(i as i64 + 1, entry, now))
        .collect())
}

fn format_post(id: i64, entry: FeedEntry, now: DateTime<Utc>) -> Post {
    let (published, age_hours) = match parse_date(&entry.published) {
        Some(ts) => (
            entry.published.clone(),
            Some((now - ts).num_seconds() as f64 / 3600.0),
        ),
        None if entry.published.is_empty() => ("unknown".to_string(), None),
        None => (entry.published.clone(), None),
    };

    Post {
        id,
        title: entry.title,
        // Feed content is escaped HTML markup of the post body
        content: clean_html(&entry.content),
        url: entry.link,
        score: 0,
        comments: 0,
        author: if entry.author.is_empty() {
            "unknown".to_string()
        } else {
            entry.author
        },
        published,
        age_hours,
    }
}

/// Atom `<published>` is RFC 3339; RSS `<pubDate>` is RFC 2822.
pub(crate) fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[derive(Clone, Copy, PartialEq)]
enum Field {
    None,
    Title,
    Link,
    Published,
    Content,
    Author,
}

/// Parse Atom `<entry>` / RSS `<item>` elements with a streaming event loop.
pub(crate) fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut entries = Vec::new();
    let mut current: Option<FeedEntry> = None;
    let mut field = Field::None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => match e.name().as_ref() {
                b"entry" | b"item" => {
                    current = Some(FeedEntry::default());
                    field = Field::None;
                }
                b"title" if current.is_some() => field = Field::Title,
                b"published" | b"pubDate" if current.is_some() => field = Field::Published,
                b"content" | b"description" if current.is_some() => field = Field::Content,
                b"author" | b"name" if current.is_some() => field = Field::Author,
                b"link" if current.is_some() => {
                    if !read_href(&e, current.as_mut()) {
                        // RSS links carry the URL as element text
                        field = Field::Link;
                    }
                }
                _ => {}
            },
            Ok(quick_xml::events::Event::Empty(e)) => {
                if e.name().as_ref() == b"link" {
                    read_href(&e, current.as_mut());
                }
            }
            Ok(quick_xml::events::Event::Text(e)) => {
                if let Some(entry) = current.as_mut() {
                    let text = e.unescape()?;
                    append(entry, field, &text);
                }
            }
            Ok(quick_xml::events::Event::CData(e)) => {
                if let Some(entry) = current.as_mut() {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    append(entry, field, &text);
                }
            }
            Ok(quick_xml::events::Event::End(e)) => match e.name().as_ref() {
                b"entry" | b"item" => {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                    field = Field::None;
                }
                b"title" | b"link" | b"published" | b"pubDate" | b"content" | b"description"
                | b"name" | b"author" => field = Field::None,
                _ => {}
            },
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }
    Ok(entries)
}

/// Copy an Atom link's `href` attribute into the entry. Returns false when
/// the element carries no href (RSS-style text link).
fn read_href(e: &quick_xml::events::BytesStart, current: Option<&mut FeedEntry>) -> bool {
    let Some(entry) = current else { return false };
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"href" {
            entry.link = String::from_utf8_lossy(&attr.value).into_owned();
            return true;
        }
    }
    false
}

fn append(entry: &mut FeedEntry, field: Field, text: &str) {
    match field {
        Field::Title => entry.title.push_str(text),
        Field::Link => entry.link.push_str(text),
        Field::Published => entry.published.push_str(text),
        Field::Content => entry.content.push_str(text),
        Field::Author => entry.author.push_str(text),
        Field::None => {}
    }
}
