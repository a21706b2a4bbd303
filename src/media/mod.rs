//! Media handling module.
//!
//! Provides the local and remote halves of video analysis:
//! - ffmpeg/ffprobe subprocess plumbing
//! - Audio and still-frame extraction
//! - Audio transcription (via external APIs)
//! - Vision-language analysis of the extracted frame

mod command;
mod extract;
mod probe;
mod transcription;
mod vision;

pub use command::FfmpegCommand;
pub use extract::{FfmpegExtractor, MediaExtractor};
pub use probe::{MediaProbe, probe};
pub use transcription::{GroqWhisperProvider, TranscriptionProvider};
pub use vision::{GeminiVisionProvider, VisionProvider};
