use serde::{Deserialize, Serialize};
use tracing::warn;

/// A normalized post from one of the sources. Immutable once fetched.
///
/// Field names match the JSON files written by earlier runs, so old
/// `data/posts.json` / `hackernews_posts_test.json` files load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    /// Plain text, HTML stripped and entities unescaped.
    pub content: String,
    pub url: String,
    pub score: i64,
    pub comments: i64,
    pub author: String,
    /// ISO-8601 timestamp, or "unknown" when the source carried none.
    pub published: String,
    /// Hours since publication at fetch time. None when `published` is unknown.
    pub age_hours: Option<f64>,
}

/// One extraction verdict per post, as returned by the generation model.
///
/// The two JSON shapes share `post_id` and `has_pain_point` and are told apart
/// by field presence, so a results array deserializes without a tag field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractionResult {
    PainPoint(PainPoint),
    NoPainPoint(NoPainPoint),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PainPoint {
    pub post_id: i64,
    pub has_pain_point: bool,
    pub pain_point: String,
    pub intensity: f64,
    pub specificity: f64,
    pub frequency: f64,
    pub composite_score: f64,
    pub supporting_quote: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoPainPoint {
    pub post_id: i64,
    pub has_pain_point: bool,
    pub reason: String,
}

impl ExtractionResult {
    pub fn post_id(&self) -> i64 {
        match self {
            ExtractionResult::PainPoint(p) => p.post_id,
            ExtractionResult::NoPainPoint(n) => n.post_id,
        }
    }

    /// The model's own verdict flag, carried through verbatim.
    pub fn has_pain_point(&self) -> bool {
        match self {
            ExtractionResult::PainPoint(p) => p.has_pain_point,
            ExtractionResult::NoPainPoint(n) => n.has_pain_point,
        }
    }

    /// Clamp sub-scores and recompute the composite. The model is asked to
    /// compute `composite_score` itself but is not trusted to: every record
    /// is re-verified here before anything downstream reads it.
    pub fn normalize(&mut self) {
        match self {
            ExtractionResult::PainPoint(p) => {
                if !p.has_pain_point {
                    warn!(post_id = p.post_id, "pain-point record flagged has_pain_point=false");
                }
                p.normalize();
            }
            ExtractionResult::NoPainPoint(n) => {
                if n.has_pain_point {
                    warn!(post_id = n.post_id, "rejection record flagged has_pain_point=true");
                }
            }
        }
    }
}

impl PainPoint {
    /// Invariant after normalization: all sub-scores in [0,100] and
    /// `composite_score == round(mean(intensity, specificity, frequency), 1)`.
    pub fn normalize(&mut self) {
        self.intensity = self.intensity.clamp(0.0, 100.0);
        self.specificity = self.specificity.clamp(0.0, 100.0);
        self.frequency = self.frequency.clamp(0.0, 100.0);
        self.composite_score = round1((self.intensity + self.specificity + self.frequency) / 3.0);
    }
}

/// Round to one decimal place.
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
