//! Per-job temporary artifact lifecycle.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::pipeline::job::VideoJob;

/// The derived files a job may materialize on local disk.
///
/// Paths are unique per job; the audio file only exists for videos that
/// carry an audio stream. Owned exclusively by the job and deleted on every
/// exit path.
#[derive(Debug, Clone)]
pub struct JobArtifacts {
    pub video: PathBuf,
    pub audio: PathBuf,
    pub frame: PathBuf,
}

impl JobArtifacts {
    /// Build the artifact paths for a job under `workdir`.
    ///
    /// Names carry chat id, message id, and the arrival timestamp so
    /// concurrent jobs never collide.
    pub fn for_job(workdir: &Path, job: &VideoJob) -> Self {
        let stem = format!(
            "{}_{}_{}",
            job.key.chat_id,
            job.key.message_id,
            job.received_at.timestamp()
        );
        Self {
            video: workdir.join(format!("v_{stem}.mp4")),
            audio: workdir.join(format!("a_{stem}.wav")),
            frame: workdir.join(format!("f_{stem}.jpg")),
        }
    }

    /// Delete every artifact that exists. Idempotent; files that were never
    /// created are fine.
    pub async fn cleanup(&self) {
        for path in [&self.video, &self.audio, &self.frame] {
            match tokio::fs::remove_file(path).await {
                Ok(()) => tracing::debug!(path = %path.display(), "removed artifact"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove artifact")
                }
            }
        }
    }

    /// Whether any artifact file is still on disk.
    pub fn any_exists(&self) -> bool {
        [&self.video, &self.audio, &self.frame]
            .iter()
            .any(|p| p.exists())
    }
}
