mod scorer;

use serde::{Deserialize, Serialize};

pub use scorer::MoodScorer;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Hype,
    Calm,
    Neutral,
}

/// Classified mood for one segment; the externally visible output of the
/// pipeline.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MoodResult {
    pub t0: f64,
    pub t1: f64,
    pub mood: Mood,
    pub confidence: f64,
}
