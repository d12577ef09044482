#[cfg(feature = "ffmpeg-sidecar")]
mod ffmpeg;

#[cfg(feature = "ffmpeg-sidecar")]
pub use ffmpeg::VideoFile;

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// A fully decoded mono waveform.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioBuffer {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

/// One decoded grayscale frame, row-major luma bytes.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GrayFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("audio decode failed: {0}")]
    AudioFailed(String),

    #[error("no decodable audio track in {0}")]
    NoAudioTrack(String),

    #[error("ffmpeg unavailable: {0}")]
    FfmpegUnavailable(String),

    #[error("video open failed: {0}")]
    VideoOpenFailed(String),
}

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Capability seam for audio decoding. The core never touches codecs
/// directly; it consumes whatever waveform the source hands over.
pub trait AudioSource: Send + Sync {
    fn decode_audio(&self) -> Result<AudioBuffer>;
}

/// Capability seam for video decoding. Opening may fail as a whole;
/// individual frames may fail quietly afterwards.
pub trait VideoSource: Send + Sync {
    fn open_frames(&self) -> Result<Box<dyn FrameStream>>;
}

/// An open, forward-moving stream of decoded frames.
///
/// `decode_frame` serves frames by index; indices are expected to be
/// non-decreasing across calls, and a frame that cannot be produced (decode
/// failure, or an index already passed) is `None` rather than an error.
pub trait FrameStream {
    fn frame_rate(&self) -> Option<f64>;
    fn decode_frame(&mut self, index: u64) -> Option<GrayFrame>;
}

/// Default [`AudioSource`]: decodes an audio file through symphonia, keeping
/// the native sample rate and downmixing interleaved channels to mono.
#[derive(Clone, Debug)]
pub struct AudioFile {
    path: PathBuf,
}

impl AudioFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AudioSource for AudioFile {
    fn decode_audio(&self) -> Result<AudioBuffer> {
        decode_audio_file(&self.path)
    }
}

fn decode_audio_file(path: &Path) -> Result<AudioBuffer> {
    let file = File::open(path).map_err(|e| DecodeError::AudioFailed(e.to_string()))?;
    let stream = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| DecodeError::AudioFailed(e.to_string()))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| DecodeError::NoAudioTrack(path.display().to_string()))?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| DecodeError::AudioFailed("sample rate unreported".to_owned()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::AudioFailed(e.to_string()))?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(DecodeError::AudioFailed(e.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }
        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // A corrupt packet is not fatal to the whole waveform.
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(DecodeError::AudioFailed(e.to_string())),
        };
        let spec = *decoded.spec();
        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);
        downmix_into(&mut samples, buffer.samples(), spec.channels.count());
    }

    Ok(AudioBuffer {
        samples,
        sample_rate,
    })
}

fn downmix_into(out: &mut Vec<f32>, interleaved: &[f32], channels: usize) {
    let channels = channels.max(1);
    out.reserve(interleaved.len() / channels);
    for frame in interleaved.chunks_exact(channels) {
        out.push(frame.iter().sum::<f32>() / channels as f32);
    }
}
