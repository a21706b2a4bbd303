//! ffprobe stream inspection.

use std::path::Path;
use std::process::Stdio;

use serde::Deserialize;
use tokio::process::Command;

use crate::error::MediaError;

/// What the probe learned about a video file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaProbe {
    /// Container duration in seconds.
    pub duration: f64,
    /// Whether the file carries at least one audio stream.
    pub has_audio: bool,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
}

/// Probe a local video file.
///
/// Fails with `ProbeFailed` when the file is unreadable or carries no video
/// stream at all, which is how corrupt uploads surface.
pub async fn probe(path: impl AsRef<Path>) -> Result<MediaProbe, MediaError> {
    let path = path.as_ref();

    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::ProbeFailed {
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    parse_probe_output(&output.stdout)
}

/// Parse ffprobe's JSON output into a [`MediaProbe`].
fn parse_probe_output(stdout: &[u8]) -> Result<MediaProbe, MediaError> {
    let probe: FfprobeOutput =
        serde_json::from_slice(stdout).map_err(|e| MediaError::ProbeFailed {
            reason: format!("unparseable ffprobe output: {}", e),
        })?;

    let has_video = probe
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("video"));
    if !has_video {
        return Err(MediaError::ProbeFailed {
            reason: "no video stream found".to_string(),
        });
    }

    let has_audio = probe
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    let duration = probe
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(MediaProbe {
        duration,
        has_audio,
    })
}
