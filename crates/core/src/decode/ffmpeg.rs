use super::{DecodeError, FrameStream, GrayFrame, Result, VideoSource};
use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::download;
use ffmpeg_sidecar::event::{FfmpegEvent, StreamTypeSpecificData};
use ffmpeg_sidecar::iter::FfmpegIterator;
use std::path::PathBuf;

/// Default [`VideoSource`]: one ffmpeg process per opened stream, decoding
/// the whole file to rawvideo on a pipe. Frames are served strictly forward;
/// the extractor walks segments in time order, so no seeking is needed.
#[derive(Clone, Debug)]
pub struct VideoFile {
    path: PathBuf,
}

impl VideoFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl VideoSource for VideoFile {
    fn open_frames(&self) -> Result<Box<dyn FrameStream>> {
        download::auto_download().map_err(|e| DecodeError::FfmpegUnavailable(e.to_string()))?;

        let mut child = FfmpegCommand::new()
            .input(self.path.to_string_lossy())
            .args(["-an", "-sn"])
            .rawvideo()
            .spawn()
            .map_err(|e| DecodeError::VideoOpenFailed(e.to_string()))?;
        let events = child
            .iter()
            .map_err(|e| DecodeError::VideoOpenFailed(e.to_string()))?;

        let mut stream = FfmpegFrameStream {
            _child: child,
            events,
            fps: None,
            pending: None,
            next_index: 0,
            done: false,
        };
        stream.prime();
        Ok(Box::new(stream))
    }
}

struct RawFrame {
    width: u32,
    height: u32,
    pix_fmt: String,
    data: Vec<u8>,
}

struct FfmpegFrameStream {
    _child: FfmpegChild,
    events: FfmpegIterator,
    fps: Option<f64>,
    pending: Option<RawFrame>,
    next_index: u64,
    done: bool,
}

impl FfmpegFrameStream {
    // Drain events until the input stream metadata (and so the frame rate)
    // has been seen, or frames start arriving without it.
    fn prime(&mut self) {
        while self.fps.is_none() && self.pending.is_none() && !self.done {
            match self.events.next() {
                Some(FfmpegEvent::ParsedInputStream(stream)) => {
                    if let StreamTypeSpecificData::Video(video) = &stream.type_specific_data {
                        self.fps = Some(f64::from(video.fps));
                    }
                }
                Some(FfmpegEvent::OutputFrame(frame)) => {
                    self.pending = Some(RawFrame {
                        width: frame.width,
                        height: frame.height,
                        pix_fmt: frame.pix_fmt,
                        data: frame.data,
                    });
                }
                Some(_) => {}
                None => self.done = true,
            }
        }
    }

    fn next_raw_frame(&mut self) -> Option<RawFrame> {
        if let Some(frame) = self.pending.take() {
            return Some(frame);
        }
        for event in self.events.by_ref() {
            match event {
                FfmpegEvent::OutputFrame(frame) => {
                    return Some(RawFrame {
                        width: frame.width,
                        height: frame.height,
                        pix_fmt: frame.pix_fmt,
                        data: frame.data,
                    });
                }
                FfmpegEvent::ParsedInputStream(stream) => {
                    if let StreamTypeSpecificData::Video(video) = &stream.type_specific_data {
                        self.fps.get_or_insert(f64::from(video.fps));
                    }
                }
                _ => {}
            }
        }
        self.done = true;
        None
    }
}

impl FrameStream for FfmpegFrameStream {
    fn frame_rate(&self) -> Option<f64> {
        self.fps.filter(|f| f.is_finite() && *f > 0.0)
    }

    fn decode_frame(&mut self, index: u64) -> Option<GrayFrame> {
        if index < self.next_index || self.done {
            return None;
        }
        while let Some(frame) = self.next_raw_frame() {
            let current = self.next_index;
            self.next_index += 1;
            if current == index {
                return luma_plane(&frame.pix_fmt, frame.width, frame.height, &frame.data);
            }
        }
        None
    }
}

// Rec. 601 luma; rawvideo output arrives as rgb24 unless the input was
// already grayscale.
fn luma_plane(pix_fmt: &str, width: u32, height: u32, data: &[u8]) -> Option<GrayFrame> {
    let pixels = width as usize * height as usize;
    match pix_fmt {
        "rgb24" => {
            if data.len() < pixels * 3 {
                return None;
            }
            let mut luma = Vec::with_capacity(pixels);
            for px in data[..pixels * 3].chunks_exact(3) {
                let y = 0.299 * f64::from(px[0]) + 0.587 * f64::from(px[1]) + 0.114 * f64::from(px[2]);
                luma.push(y.round().min(255.0) as u8);
            }
            Some(GrayFrame {
                width,
                height,
                data: luma,
            })
        }
        "gray" => {
            if data.len() < pixels {
                return None;
            }
            Some(GrayFrame {
                width,
                height,
                data: data[..pixels].to_vec(),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luma_of_pure_channels_follows_rec601() {
        let data = [255, 0, 0, 0, 255, 0, 0, 0, 255];
        let frame = luma_plane("rgb24", 3, 1, &data).expect("valid plane");
        assert_eq!(frame.data, vec![76, 150, 29]);
    }

    #[test]
    fn gray_input_passes_through() {
        let frame = luma_plane("gray", 2, 2, &[1, 2, 3, 4]).expect("valid plane");
        assert_eq!(frame.data, vec![1, 2, 3, 4]);
    }

    #[test]
    fn truncated_or_unknown_payloads_are_rejected() {
        assert!(luma_plane("rgb24", 2, 2, &[0; 11]).is_none());
        assert!(luma_plane("gray", 2, 2, &[0; 3]).is_none());
        assert!(luma_plane("yuv420p", 2, 2, &[0; 12]).is_none());
    }

    #[test]
    #[ignore]
    fn ffmpeg_frame_stream_smoke_ignored() {
        // Intentionally ignored: requires ffmpeg presence / download.
        // Kept to allow local manual verification.
    }
}
