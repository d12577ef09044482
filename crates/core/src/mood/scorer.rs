use crate::config::KeywordLexicon;
use crate::mood::{Mood, MoodResult};
use crate::prosody::ProsodyFeature;
use crate::segment::Segment;
use crate::visual::VisualFeature;

const LEXICAL_WEIGHT: f64 = 0.6;
const EXCLAMATION_WEIGHT: f64 = 0.2;
const UPPERCASE_BONUS: f64 = 0.5;
const ENERGY_WEIGHT: f64 = 0.004;
const PITCH_VAR_WEIGHT: f64 = 0.3;
const BRIGHTNESS_WEIGHT: f64 = 0.002;
const EDGE_WEIGHT: f64 = 0.0005;
const HYPE_THRESHOLD: f64 = 1.0;
const CALM_THRESHOLD: f64 = -0.5;
const NEUTRAL_CONFIDENCE: f64 = 0.6;
const MAX_CONFIDENCE: f64 = 0.99;

/// Fuses text, prosody, and visual signals into a per-segment mood.
///
/// Pure and stateless: the classification of a segment depends only on its
/// own text and its own feature entries, never on neighbouring segments.
#[derive(Clone, Debug, Default)]
pub struct MoodScorer {
    lexicon: KeywordLexicon,
}

impl MoodScorer {
    pub fn new(lexicon: KeywordLexicon) -> Self {
        Self { lexicon }
    }

    /// Score every segment against whatever feature sequences are present.
    ///
    /// Either feature slice may be absent or shorter than `segments`; an index
    /// past its end simply drops that modality for that segment. This function
    /// is total over any such combination.
    pub fn predict(
        &self,
        segments: &[Segment],
        prosody: Option<&[ProsodyFeature]>,
        visual: Option<&[VisualFeature]>,
    ) -> Vec<MoodResult> {
        segments
            .iter()
            .enumerate()
            .map(|(idx, seg)| {
                let mut score = self.text_score(&seg.text);
                if let Some(feature) = prosody.and_then(|p| p.get(idx)) {
                    score += ENERGY_WEIGHT * (feature.energy * 1000.0)
                        + PITCH_VAR_WEIGHT * feature.pitch_var;
                }
                if let Some(feature) = visual.and_then(|v| v.get(idx)) {
                    score += BRIGHTNESS_WEIGHT * feature.brightness
                        + EDGE_WEIGHT * feature.edge_density;
                }
                let (mood, confidence) = classify(score);
                MoodResult {
                    t0: seg.t0,
                    t1: seg.t1,
                    mood,
                    confidence,
                }
            })
            .collect()
    }

    // Each keyword contributes at most once per segment, however often it
    // occurs in the text; only '!' is additionally counted per character.
    fn text_score(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let excited = self
            .lexicon
            .excited
            .iter()
            .filter(|k| lower.contains(k.as_str()))
            .count() as f64;
        let calm = self
            .lexicon
            .calm
            .iter()
            .filter(|k| lower.contains(k.as_str()))
            .count() as f64;

        let mut score = LEXICAL_WEIGHT * (excited - calm);
        score += EXCLAMATION_WEIGHT * text.matches('!').count() as f64;

        let chars = text.chars().count() as f64;
        let uppercase = text.chars().filter(|c| c.is_uppercase()).count() as f64;
        if uppercase > 5.0_f64.max(0.2 * chars) {
            score += UPPERCASE_BONUS;
        }
        score
    }
}

fn classify(score: f64) -> (Mood, f64) {
    if score > HYPE_THRESHOLD {
        let confidence = MAX_CONFIDENCE.min(0.5 + (score - HYPE_THRESHOLD) / 4.0);
        (Mood::Hype, round2(confidence))
    } else if score < CALM_THRESHOLD {
        let confidence = MAX_CONFIDENCE.min(0.5 + (-score) / 4.0);
        (Mood::Calm, round2(confidence))
    } else {
        (Mood::Neutral, NEUTRAL_CONFIDENCE)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
