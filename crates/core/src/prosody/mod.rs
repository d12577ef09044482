mod pitch;

use crate::decode::{AudioBuffer, AudioSource, DecodeError};
use crate::segment::Segment;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use pitch::{AutocorrelationPitchEstimator, PitchEstimator};

/// Slices shorter than this are not analyzed.
const MIN_ANALYSIS_SAMPLES: usize = 20;
const PITCH_FRAME_LEN: usize = 2048;
const PITCH_HOP: usize = 512;

/// Per-segment acoustic features, index-aligned with the segment sequence.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProsodyFeature {
    pub energy: f64,
    pub pitch_var: f64,
}

impl ProsodyFeature {
    /// Reserved value for a segment too short (or too empty) to measure,
    /// distinct from a genuinely quiet measurement.
    pub const UNMEASURED: Self = Self {
        energy: 0.0,
        pitch_var: 0.0,
    };
}

#[derive(thiserror::Error, Debug)]
pub enum ProsodyError {
    #[error("prosody unavailable: {0}")]
    Unavailable(#[from] DecodeError),
}

/// Computes per-segment energy and pitch-variance features from a decoded
/// waveform.
pub struct ProsodyExtractor {
    pitch: Arc<dyn PitchEstimator>,
}

impl ProsodyExtractor {
    pub fn new(pitch: Arc<dyn PitchEstimator>) -> Self {
        Self { pitch }
    }

    /// Decode the source and analyze every segment. A failed decode aborts
    /// the whole stage; the caller is expected to score without prosody.
    pub fn extract(
        &self,
        source: &dyn AudioSource,
        segments: &[Segment],
    ) -> Result<Vec<ProsodyFeature>, ProsodyError> {
        let audio = source.decode_audio()?;
        Ok(self.extract_from_buffer(&audio, segments))
    }

    /// Total per-segment analysis: one feature per segment, in order, with
    /// unmeasurable slices reported as [`ProsodyFeature::UNMEASURED`].
    pub fn extract_from_buffer(
        &self,
        audio: &AudioBuffer,
        segments: &[Segment],
    ) -> Vec<ProsodyFeature> {
        let sr = f64::from(audio.sample_rate);
        let len = audio.samples.len();
        segments
            .iter()
            .map(|seg| {
                let start = (((seg.t0 * sr).max(0.0)) as usize).min(len);
                let end = (((seg.t1 * sr).max(0.0)) as usize).min(len);
                let slice = &audio.samples[start.min(end)..end];
                if slice.len() < MIN_ANALYSIS_SAMPLES {
                    return ProsodyFeature::UNMEASURED;
                }
                ProsodyFeature {
                    energy: rms(slice),
                    pitch_var: self.pitch_variance(slice, audio.sample_rate),
                }
            })
            .collect()
    }

    // Variance of the voiced frame-wise f0 estimates; unvoiced frames are
    // excluded rather than counted as zero. No voiced frames at all falls
    // back to zero variance instead of failing.
    fn pitch_variance(&self, slice: &[f32], sample_rate: u32) -> f64 {
        let frame_len = PITCH_FRAME_LEN.min(slice.len());
        let hop = PITCH_HOP.min(frame_len);
        let mut voiced = Vec::new();
        let mut start = 0;
        while start + frame_len <= slice.len() {
            if let Some(f0) = self.pitch.estimate(&slice[start..start + frame_len], sample_rate) {
                voiced.push(f0);
            }
            start += hop;
        }
        if voiced.is_empty() {
            return 0.0;
        }
        let mean = voiced.iter().sum::<f64>() / voiced.len() as f64;
        voiced.iter().map(|f0| (f0 - mean).powi(2)).sum::<f64>() / voiced.len() as f64
    }
}

impl Default for ProsodyExtractor {
    fn default() -> Self {
        Self::new(Arc::new(AutocorrelationPitchEstimator::default()))
    }
}

fn rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (sum_squares / samples.len() as f64).sqrt()
}
