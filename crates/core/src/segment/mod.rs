mod sentences;
mod timestamp;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use sentences::{RuleSentenceSplitter, SentenceSplitter};
pub use timestamp::parse_timestamp;

/// Assumed speaking rate when synthesizing timing for plain prose.
const WORDS_PER_SECOND: f64 = 2.5;
/// Floor for a synthesized sentence duration.
const MIN_SENTENCE_SECS: f64 = 1.0;
/// Floor for the synthesized tail of the last annotated segment.
const MIN_TAIL_SECS: f64 = 3.0;

/// A contiguous time interval of the source content with its transcript text.
///
/// Segments are created once by the [`Segmenter`] and never mutated; the
/// extractors and the scorer all refer to them by position, so index `i` in a
/// feature sequence belongs to segment `i`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    pub t0: f64,
    pub t1: f64,
    pub text: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SegmentError {
    #[error("malformed timestamp: {value:?}")]
    MalformedTimestamp { value: String },
}

/// Derives the segmentation of the content from a raw transcript.
///
/// Transcripts with inline `[<timestamp>]` annotations are segmented at the
/// annotated lines; anything else is treated as plain prose and laid out on a
/// synthetic timeline from the injected sentence splitter.
pub struct Segmenter {
    splitter: Arc<dyn SentenceSplitter>,
}

impl Segmenter {
    pub fn new(splitter: Arc<dyn SentenceSplitter>) -> Self {
        Self { splitter }
    }

    pub fn segment(&self, transcript: &str) -> Result<Vec<Segment>, SegmentError> {
        let lines: Vec<&str> = transcript
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        let mut segments = if lines.iter().any(|l| is_annotated(l)) {
            from_annotated(&lines)?
        } else {
            self.from_prose(&lines)
        };

        segments.sort_by(|a, b| a.t0.total_cmp(&b.t0));
        Ok(segments)
    }

    fn from_prose(&self, lines: &[&str]) -> Vec<Segment> {
        let text = lines.join("\n");
        let mut segments = Vec::new();
        let mut t = 0.0;
        for sentence in self.splitter.split(&text) {
            let duration = (word_count(&sentence) as f64 / WORDS_PER_SECOND).max(MIN_SENTENCE_SECS);
            segments.push(Segment {
                t0: t,
                t1: t + duration,
                text: sentence,
            });
            t += duration;
        }
        segments
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(Arc::new(RuleSentenceSplitter))
    }
}

fn is_annotated(line: &str) -> bool {
    line.starts_with('[') && line.contains(']')
}

fn from_annotated(lines: &[&str]) -> Result<Vec<Segment>, SegmentError> {
    // Non-annotated lines between annotations are noise, not segments.
    let mut entries = Vec::new();
    for line in lines {
        let Some(close) = line.find(']') else {
            continue;
        };
        if !line.starts_with('[') {
            continue;
        }
        let t0 = parse_timestamp(&line[1..close])?;
        let text = line[close + 1..].trim().to_owned();
        entries.push((t0, text));
    }

    let mut segments = Vec::with_capacity(entries.len());
    for (i, (t0, text)) in entries.iter().enumerate() {
        let synthesized = t0 + (word_count(text) as f64 / 2.0).max(MIN_TAIL_SECS);
        let t1 = match entries.get(i + 1) {
            Some((next_t0, _)) if *next_t0 > *t0 => *next_t0,
            _ => synthesized,
        };
        segments.push(Segment {
            t0: *t0,
            t1,
            text: text.clone(),
        });
    }
    Ok(segments)
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
