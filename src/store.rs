use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::models::{ExtractionResult, Post};

pub const DEFAULT_POSTS_PATH: &str = "data/posts.json";
pub const DEFAULT_RESULTS_PATH: &str = "data/extraction_results.json";

pub fn save_posts(path: &Path, posts: &[Post]) -> Result<()> {
    save_json(path, posts)?;
    info!("Saved {} posts to {}", posts.len(), path.display());
    Ok(())
}

pub fn load_posts(path: &Path) -> Result<Vec<Post>> {
    load_json(path)
}

pub fn save_results(path: &Path, results: &[ExtractionResult]) -> Result<()> {
    save_json(path, results)?;
    info!("Saved {} results to {}", results.len(), path.display());
    Ok(())
}

pub fn load_results(path: &Path) -> Result<Vec<ExtractionResult>> {
    load_json(path)
}

/// Write with readable indentation so result files stay hand-inspectable.
fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}
