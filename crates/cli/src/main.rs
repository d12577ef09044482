#![deny(warnings)]

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use video_mood_core::config::{
    FrameStride, KeywordLexicon, DEFAULT_FRAME_STRIDE_SECS, ENV_FRAME_STRIDE,
};
use video_mood_core::decode::{AudioFile, AudioSource, VideoSource};
use video_mood_core::mood::MoodScorer;
use video_mood_core::pipeline::MoodPipeline;
use video_mood_core::prosody::ProsodyExtractor;
use video_mood_core::segment::Segmenter;
use video_mood_core::visual::VisualExtractor;

#[derive(Parser, Debug)]
#[command(name = "video-mood")]
#[command(about = "Per-segment mood classification from transcript, audio, and video signals")]
struct Args {
    /// Transcript file, UTF-8; inline [H:M:S] annotations are honored.
    #[arg(long)]
    transcript: PathBuf,

    /// Optional audio file for prosody analysis.
    #[arg(long)]
    audio: Option<PathBuf>,

    /// Optional video file for visual analysis.
    #[arg(long)]
    video: Option<PathBuf>,

    /// Seconds between sampled frames during visual analysis.
    #[arg(long, env = ENV_FRAME_STRIDE, default_value_t = DEFAULT_FRAME_STRIDE_SECS)]
    frame_stride: f64,

    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let transcript = std::fs::read_to_string(&args.transcript)
        .with_context(|| format!("reading transcript {}", args.transcript.display()))?;

    let stride = FrameStride::new(args.frame_stride)?;
    let pipeline = MoodPipeline::new(
        Segmenter::default(),
        ProsodyExtractor::default(),
        VisualExtractor::new(stride),
        MoodScorer::new(KeywordLexicon::default()),
    );

    tracing::info!(
        audio = args.audio.is_some(),
        video = args.video.is_some(),
        frame_stride = stride.secs(),
        "starting analysis"
    );

    let audio = args.audio.map(AudioFile::new);
    let video = open_video(args.video)?;

    let results = pipeline.analyze(
        &transcript,
        audio.as_ref().map(|a| a as &dyn AudioSource),
        video.as_deref(),
    )?;

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

#[cfg(feature = "ffmpeg-sidecar")]
fn open_video(path: Option<PathBuf>) -> anyhow::Result<Option<Box<dyn VideoSource>>> {
    Ok(path.map(|p| Box::new(video_mood_core::decode::VideoFile::new(p)) as Box<dyn VideoSource>))
}

#[cfg(not(feature = "ffmpeg-sidecar"))]
fn open_video(path: Option<PathBuf>) -> anyhow::Result<Option<Box<dyn VideoSource>>> {
    if path.is_some() {
        anyhow::bail!("this build has no video decoder; rebuild with the ffmpeg-sidecar feature");
    }
    Ok(None)
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(
            level
                .parse()
                .with_context(|| format!("invalid --log-level: {level}"))?,
        )
        .from_env_lossy();

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}
