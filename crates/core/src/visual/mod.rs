use crate::config::{FrameStride, DEFAULT_FRAME_RATE_FPS};
use crate::decode::{DecodeError, FrameStream, GrayFrame, VideoSource};
use crate::segment::Segment;
use serde::{Deserialize, Serialize};

/// Per-segment visual features, index-aligned with the segment sequence.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct VisualFeature {
    pub brightness: f64,
    pub edge_density: f64,
}

impl VisualFeature {
    /// Reserved value for a segment where no frame could be decoded.
    pub const UNMEASURED: Self = Self {
        brightness: 0.0,
        edge_density: 0.0,
    };
}

#[derive(thiserror::Error, Debug)]
pub enum VisualError {
    #[error("visual analysis unavailable: {0}")]
    Unavailable(#[from] DecodeError),
}

/// Computes per-segment brightness and edge-density features by sampling
/// frames at a fixed stride.
#[derive(Clone, Debug, Default)]
pub struct VisualExtractor {
    stride: FrameStride,
}

impl VisualExtractor {
    pub fn new(stride: FrameStride) -> Self {
        Self { stride }
    }

    /// Open the source and analyze every segment. A stream that cannot be
    /// opened aborts the whole stage; the caller is expected to score without
    /// visuals.
    pub fn extract(
        &self,
        source: &dyn VideoSource,
        segments: &[Segment],
    ) -> Result<Vec<VisualFeature>, VisualError> {
        let mut stream = source.open_frames()?;
        Ok(self.extract_from_stream(stream.as_mut(), segments))
    }

    /// Total per-segment analysis over an already-open frame stream. The
    /// stream is shared across segments, so later segments must not require
    /// frames earlier than ones already consumed; a frame that fails to
    /// decode is silently skipped.
    pub fn extract_from_stream(
        &self,
        stream: &mut dyn FrameStream,
        segments: &[Segment],
    ) -> Vec<VisualFeature> {
        let fps = stream
            .frame_rate()
            .filter(|f| f.is_finite() && *f > 0.0)
            .unwrap_or(DEFAULT_FRAME_RATE_FPS);
        let step = ((self.stride.secs() * fps) as u64).max(1);

        segments
            .iter()
            .map(|seg| {
                let start = (seg.t0 * fps) as u64;
                let end = (seg.t1 * fps) as u64;
                let indices: Vec<u64> = if end > start {
                    (start..end).step_by(step as usize).collect()
                } else {
                    vec![start]
                };

                let mut brightness = Vec::new();
                let mut edges = Vec::new();
                for index in indices {
                    let Some(frame) = stream.decode_frame(index) else {
                        continue;
                    };
                    brightness.push(mean_luma(&frame));
                    edges.push(mean_sobel_magnitude(&frame));
                }
                if brightness.is_empty() {
                    VisualFeature::UNMEASURED
                } else {
                    VisualFeature {
                        brightness: mean(&brightness),
                        edge_density: mean(&edges),
                    }
                }
            })
            .collect()
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn mean_luma(frame: &GrayFrame) -> f64 {
    let pixels = frame.width as usize * frame.height as usize;
    if pixels == 0 || frame.data.len() < pixels {
        return 0.0;
    }
    frame.data[..pixels]
        .iter()
        .map(|&v| f64::from(v))
        .sum::<f64>()
        / pixels as f64
}

// Mean Sobel gradient magnitude over interior pixels. Frames too small for
// the 3x3 kernels have no edge response.
fn mean_sobel_magnitude(frame: &GrayFrame) -> f64 {
    let w = frame.width as usize;
    let h = frame.height as usize;
    if w < 3 || h < 3 || frame.data.len() < w * h {
        return 0.0;
    }
    let px = |x: usize, y: usize| f64::from(frame.data[y * w + x]);

    let mut total = 0.0;
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let gx = px(x + 1, y - 1) + 2.0 * px(x + 1, y) + px(x + 1, y + 1)
                - px(x - 1, y - 1)
                - 2.0 * px(x - 1, y)
                - px(x - 1, y + 1);
            let gy = px(x - 1, y + 1) + 2.0 * px(x, y + 1) + px(x + 1, y + 1)
                - px(x - 1, y - 1)
                - 2.0 * px(x, y - 1)
                - px(x + 1, y - 1);
            total += (gx * gx + gy * gy).sqrt();
        }
    }
    total / ((w - 2) * (h - 2)) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn seg(t0: f64, t1: f64) -> Segment {
        Segment {
            t0,
            t1,
            text: String::new(),
        }
    }

    fn flat(width: u32, height: u32, luma: u8) -> GrayFrame {
        GrayFrame {
            width,
            height,
            data: vec![luma; width as usize * height as usize],
        }
    }

    struct FakeStream {
        fps: Option<f64>,
        frames: HashMap<u64, GrayFrame>,
        requested: Vec<u64>,
    }

    impl FakeStream {
        fn new(fps: Option<f64>) -> Self {
            Self {
                fps,
                frames: HashMap::new(),
                requested: Vec::new(),
            }
        }

        fn with_frame(mut self, index: u64, frame: GrayFrame) -> Self {
            self.frames.insert(index, frame);
            self
        }
    }

    impl FrameStream for FakeStream {
        fn frame_rate(&self) -> Option<f64> {
            self.fps
        }

        fn decode_frame(&mut self, index: u64) -> Option<GrayFrame> {
            self.requested.push(index);
            self.frames.get(&index).cloned()
        }
    }

    #[test]
    fn flat_frame_reports_its_brightness_and_no_edges() {
        let mut stream = FakeStream::new(Some(25.0)).with_frame(0, flat(8, 8, 200));
        let features =
            VisualExtractor::default().extract_from_stream(&mut stream, &[seg(0.0, 1.0)]);
        assert_eq!(features[0].brightness, 200.0);
        assert_eq!(features[0].edge_density, 0.0);
    }

    #[test]
    fn vertical_boundary_produces_edge_response() {
        let mut frame = flat(8, 8, 0);
        for y in 0..8usize {
            for x in 4..8usize {
                frame.data[y * 8 + x] = 255;
            }
        }
        let mut stream = FakeStream::new(Some(25.0)).with_frame(0, frame);
        let features =
            VisualExtractor::default().extract_from_stream(&mut stream, &[seg(0.0, 1.0)]);
        assert!(features[0].edge_density > 0.0);
    }

    #[test]
    fn undecodable_segment_yields_the_unmeasured_sentinel() {
        let mut stream = FakeStream::new(Some(25.0));
        let features =
            VisualExtractor::default().extract_from_stream(&mut stream, &[seg(0.0, 1.0)]);
        assert_eq!(features, vec![VisualFeature::UNMEASURED]);
    }

    #[test]
    fn unreported_frame_rate_falls_back_to_default() {
        let mut stream = FakeStream::new(None).with_frame(50, flat(4, 4, 10));
        let features =
            VisualExtractor::default().extract_from_stream(&mut stream, &[seg(2.0, 2.0)]);
        // Inverted range samples just the start frame, at the assumed 25 fps.
        assert_eq!(stream.requested, vec![50]);
        assert_eq!(features[0].brightness, 10.0);
    }

    #[test]
    fn zero_frame_rate_is_treated_as_unreported() {
        let mut stream = FakeStream::new(Some(0.0)).with_frame(25, flat(4, 4, 10));
        let _ = VisualExtractor::default().extract_from_stream(&mut stream, &[seg(1.0, 1.0)]);
        assert_eq!(stream.requested, vec![25]);
    }

    #[test]
    fn stride_controls_sampling_density() {
        let stride = FrameStride::new(1.0).expect("valid stride");
        let mut stream = FakeStream::new(Some(25.0));
        let _ = VisualExtractor::new(stride).extract_from_stream(&mut stream, &[seg(0.0, 3.0)]);
        assert_eq!(stream.requested, vec![0, 25, 50]);
    }

    #[test]
    fn sub_frame_stride_is_clamped_to_one_frame() {
        let stride = FrameStride::new(0.001).expect("valid stride");
        let mut stream = FakeStream::new(Some(25.0));
        let _ = VisualExtractor::new(stride).extract_from_stream(&mut stream, &[seg(0.0, 0.2)]);
        assert_eq!(stream.requested, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn decoded_frames_are_averaged_per_segment() {
        let stride = FrameStride::new(1.0).expect("valid stride");
        let mut stream = FakeStream::new(Some(25.0))
            .with_frame(0, flat(4, 4, 100))
            .with_frame(25, flat(4, 4, 200));
        let features =
            VisualExtractor::new(stride).extract_from_stream(&mut stream, &[seg(0.0, 2.0)]);
        assert_eq!(features[0].brightness, 150.0);
    }

    #[test]
    fn failed_frames_within_a_segment_are_skipped() {
        let stride = FrameStride::new(1.0).expect("valid stride");
        // Only one of the three sampled frames decodes.
        let mut stream = FakeStream::new(Some(25.0)).with_frame(25, flat(4, 4, 90));
        let features =
            VisualExtractor::new(stride).extract_from_stream(&mut stream, &[seg(0.0, 3.0)]);
        assert_eq!(features[0].brightness, 90.0);
    }

    #[test]
    fn one_feature_per_segment_in_order() {
        let mut stream = FakeStream::new(Some(25.0)).with_frame(0, flat(4, 4, 10));
        let segments = [seg(0.0, 1.0), seg(1.0, 2.0)];
        let features = VisualExtractor::default().extract_from_stream(&mut stream, &segments);
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].brightness, 10.0);
        assert_eq!(features[1], VisualFeature::UNMEASURED);
    }
}
