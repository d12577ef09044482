use serde::{Deserialize, Serialize};

pub const DEFAULT_FRAME_STRIDE_SECS: f64 = 5.0;
pub const DEFAULT_FRAME_RATE_FPS: f64 = 25.0;
pub const ENV_FRAME_STRIDE: &str = "VIDEO_MOOD_FRAME_STRIDE";

const EXCITED_SEED: &[&str] = &[
    "wow",
    "amazing",
    "insane",
    "incredible",
    "hype",
    "excited",
    "epic",
    "banger",
    "!",
    "\u{1f525}",
    "exciting",
];

const CALM_SEED: &[&str] = &[
    "relax", "calm", "chill", "soft", "gentle", "quiet", "peace",
];

/// Keyword tables for lexical valence scoring. The defaults are the
/// English-only seed sets; callers can swap in their own lists without
/// touching the scorer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeywordLexicon {
    pub excited: Vec<String>,
    pub calm: Vec<String>,
}

impl Default for KeywordLexicon {
    fn default() -> Self {
        Self {
            excited: EXCITED_SEED.iter().map(|s| (*s).to_owned()).collect(),
            calm: CALM_SEED.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

/// Seconds between sampled frames during visual analysis.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct FrameStride(f64);

impl FrameStride {
    pub fn new(secs: f64) -> Result<Self, ConfigError> {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(ConfigError::InvalidFrameStride(secs));
        }
        Ok(Self(secs))
    }

    pub fn secs(&self) -> f64 {
        self.0
    }
}

impl Default for FrameStride {
    fn default() -> Self {
        Self(DEFAULT_FRAME_STRIDE_SECS)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("frame stride must be a positive number of seconds, got {0}")]
    InvalidFrameStride(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_stride_rejects_zero_and_negative() {
        assert!(FrameStride::new(0.0).is_err());
        assert!(FrameStride::new(-1.0).is_err());
        assert!(FrameStride::new(f64::NAN).is_err());
        assert!(FrameStride::new(f64::INFINITY).is_err());
    }

    #[test]
    fn frame_stride_accepts_positive() {
        let stride = FrameStride::new(2.5).expect("positive stride");
        assert_eq!(stride.secs(), 2.5);
    }

    #[test]
    fn default_stride_matches_constant() {
        assert_eq!(FrameStride::default().secs(), DEFAULT_FRAME_STRIDE_SECS);
    }

    #[test]
    fn default_lexicon_keeps_seed_membership() {
        let lexicon = KeywordLexicon::default();
        assert_eq!(lexicon.excited.len(), 11);
        assert_eq!(lexicon.calm.len(), 7);
        assert!(lexicon.excited.iter().any(|k| k == "!"));
        assert!(lexicon.excited.iter().any(|k| k == "\u{1f525}"));
        assert!(lexicon.calm.iter().any(|k| k == "peace"));
    }
}
