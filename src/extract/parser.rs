use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::models::ExtractionResult;

// Greedy: first '[' through last ']'. Fragile by design — the response is
// instructed to be a single JSON array and anything fancier belongs in a
// schema-constrained output contract, not here.
static ARRAY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[\s\S]*\]").unwrap());

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no JSON array found in response")]
    NoArray,
    #[error("response array is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Extract the first array-shaped substring from the raw response text and
/// decode it. Decoded records are normalized (scores clamped, composite
/// recomputed) before they are returned.
pub fn parse_response(raw: &str) -> Result<Vec<ExtractionResult>, ParseError> {
    let stripped = strip_code_fence(raw);
    let found = ARRAY_RE.find(stripped).ok_or(ParseError::NoArray)?;
    let mut results: Vec<ExtractionResult> = serde_json::from_str(found.as_str())?;
    for result in &mut results {
        result.normalize();
    }
    Ok(results)
}

/// Models sometimes wrap the array in a markdown code block; drop the fence
/// lines when the whole response is one.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let inner = match trimmed.find('\n') {
        Some(pos) => &trimmed[pos + 1..],
        None => return trimmed,
    };
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_array_surrounded_by_prose() {
        let raw = r#"some preamble [ {"post_id":1,"has_pain_point":false,"reason":"joke"} ] trailing"#;
        let results = parse_response(raw).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].post_id(), 1);
        assert!(!results[0].has_pain_point());
    }

    #[test]
    fn extracts_array_from_code_fence() {
        let raw = "```json\n[{\"post_id\": 2, \"has_pain_point\": false, \"reason\": \"meme\"}]\n```";
        let results = parse_response(raw).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].post_id(), 2);
    }

    #[test]
    fn parses_mixed_result_array() {
        let raw = r#"[
            {"post_id": 1, "has_pain_point": true, "pain_point": "email deliverability costs",
             "intensity": 90, "specificity": 80, "frequency": 70, "composite_score": 75.0,
             "supporting_quote": "the bill doubled again"},
            {"post_id": 2, "has_pain_point": false, "reason": "success story"}
        ]"#;
        let results = parse_response(raw).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].has_pain_point());
        // composite recomputed from sub-scores, not trusted from the model
        match &results[0] {
            ExtractionResult::PainPoint(p) => assert!((p.composite_score - 80.0).abs() < 1e-9),
            _ => panic!("expected pain point"),
        }
    }

    #[test]
    fn no_array_is_an_error() {
        let err = parse_response("I could not find any pain points.").unwrap_err();
        assert!(matches!(err, ParseError::NoArray));
    }

    #[test]
    fn malformed_array_is_an_error() {
        let err = parse_response("[{\"post_id\": }]").unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn empty_response_is_an_error() {
        assert!(parse_response("").is_err());
        assert!(parse_response("```\n```").is_err());
    }

    #[test]
    fn greedy_scan_spans_first_to_last_bracket() {
        // Two arrays in one response: the greedy match covers both and fails
        // decoding, rather than silently returning half the results.
        let raw = r#"[{"post_id":1,"has_pain_point":false,"reason":"a"}] and [{"post_id":2,"has_pain_point":false,"reason":"b"}]"#;
        assert!(matches!(
            parse_response(raw).unwrap_err(),
            ParseError::Json(_)
        ));
    }
}
