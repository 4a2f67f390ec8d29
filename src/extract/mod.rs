pub mod llm;
pub mod parser;
pub mod prompt;

use anyhow::{ensure, Context, Result};
use tracing::{info, warn};

use crate::models::{ExtractionResult, Post};

/// How much raw response to dump when parsing fails.
const RAW_PREVIEW_CHARS: usize = 500;

/// Run the whole batch through one generation call: render the prompt, call
/// the model, parse the JSON array out of the response.
///
/// On parse failure the raw text prefix is printed for manual triage before
/// the error propagates — there is nothing automated to do with a response
/// that ignored the output contract.
pub async fn run_extraction(
    posts: &[Post],
    model: &str,
    max_tokens: u32,
) -> Result<Vec<ExtractionResult>> {
    ensure!(!posts.is_empty(), "No posts to extract from");

    let prompt = prompt::render(posts);
    info!(
        "Requesting extraction for {} posts ({} prompt chars)",
        posts.len(),
        prompt.len()
    );

    let client = llm::GenerationClient::from_env(model, max_tokens)?;
    let raw = client.complete(&prompt).await?;

    match parser::parse_response(&raw) {
        Ok(results) => {
            info!("Parsed {} extraction results", results.len());
            for result in &results {
                if !posts.iter().any(|p| p.id == result.post_id()) {
                    warn!("Result references unknown post id {}", result.post_id());
                }
            }
            Ok(results)
        }
        Err(e) => {
            let preview: String = raw.chars().take(RAW_PREVIEW_CHARS).collect();
            eprintln!("Raw response (first {} chars):\n{}", RAW_PREVIEW_CHARS, preview);
            Err(e).context("Failed to parse extraction response")
        }
    }
}
