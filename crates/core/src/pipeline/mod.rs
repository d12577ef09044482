use crate::decode::{AudioSource, VideoSource};
use crate::mood::{MoodResult, MoodScorer};
use crate::prosody::ProsodyExtractor;
use crate::segment::{SegmentError, Segmenter};
use crate::visual::VisualExtractor;

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Segment(#[from] SegmentError),
}

/// End-to-end fusion pipeline: segment the transcript, extract whatever
/// modalities are available, score.
///
/// An extractor whose decoding stage fails outright loses its whole
/// contribution; the remaining modalities still get scored. Only a bad
/// transcript is fatal.
pub struct MoodPipeline {
    segmenter: Segmenter,
    prosody: ProsodyExtractor,
    visual: VisualExtractor,
    scorer: MoodScorer,
}

impl MoodPipeline {
    pub fn new(
        segmenter: Segmenter,
        prosody: ProsodyExtractor,
        visual: VisualExtractor,
        scorer: MoodScorer,
    ) -> Self {
        Self {
            segmenter,
            prosody,
            visual,
            scorer,
        }
    }

    pub fn analyze(
        &self,
        transcript: &str,
        audio: Option<&dyn AudioSource>,
        video: Option<&dyn VideoSource>,
    ) -> Result<Vec<MoodResult>, PipelineError> {
        let segments = self.segmenter.segment(transcript)?;
        tracing::info!(segments = segments.len(), "transcript segmented");
        if segments.is_empty() {
            return Ok(Vec::new());
        }

        let prosody = audio.and_then(|source| match self.prosody.extract(source, &segments) {
            Ok(features) => Some(features),
            Err(e) => {
                tracing::warn!(error = %e, "prosody analysis skipped");
                None
            }
        });

        let visual = video.and_then(|source| match self.visual.extract(source, &segments) {
            Ok(features) => Some(features),
            Err(e) => {
                tracing::warn!(error = %e, "visual analysis skipped");
                None
            }
        });

        tracing::info!(
            prosody = prosody.is_some(),
            visual = visual.is_some(),
            "scoring segments"
        );
        Ok(self
            .scorer
            .predict(&segments, prosody.as_deref(), visual.as_deref()))
    }
}

impl Default for MoodPipeline {
    fn default() -> Self {
        Self::new(
            Segmenter::default(),
            ProsodyExtractor::default(),
            VisualExtractor::default(),
            MoodScorer::default(),
        )
    }
}
