//! Single-video processing pipeline.
//!
//! One job flows admission → download → extraction → (transcription) →
//! analysis. Whatever happens along the way, the job's artifacts and its
//! Processing Set entry are reclaimed before the outcome is returned.

pub mod artifacts;
pub mod dedup;
pub mod job;
pub mod prompt;

pub use artifacts::JobArtifacts;
pub use dedup::ProcessingSet;
pub use job::{JobKey, JobState, VideoJob};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::config;
use crate::error::{MediaError, PipelineError, TelegramError};
use crate::media::{MediaExtractor, TranscriptionProvider, VisionProvider};

/// Source of the remote video bytes.
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Materialize the remote file behind `file_id` at `dest`.
    async fn fetch(&self, file_id: &str, dest: &Path) -> Result<(), TelegramError>;
}

/// Coordinator for one video's end-to-end processing.
pub struct Pipeline {
    source: Arc<dyn VideoSource>,
    extractor: Arc<dyn MediaExtractor>,
    transcriber: Arc<dyn TranscriptionProvider>,
    vision: Arc<dyn VisionProvider>,
    processing: Arc<ProcessingSet>,
    workdir: PathBuf,
    max_video_bytes: u64,
    target_language: String,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn VideoSource>,
        extractor: Arc<dyn MediaExtractor>,
        transcriber: Arc<dyn TranscriptionProvider>,
        vision: Arc<dyn VisionProvider>,
        processing: Arc<ProcessingSet>,
        workdir: PathBuf,
    ) -> Self {
        Self {
            source,
            extractor,
            transcriber,
            vision,
            processing,
            workdir,
            max_video_bytes: config::MAX_VIDEO_BYTES,
            target_language: config::TARGET_LANGUAGE.to_string(),
        }
    }

    /// Override the admission threshold.
    pub fn with_max_video_bytes(mut self, max: u64) -> Self {
        self.max_video_bytes = max;
        self
    }

    /// Process one video job end to end.
    ///
    /// Always deletes the job's artifacts, releases its Processing Set
    /// entry, and terminates the job state — no early return inside the step
    /// sequence can skip that.
    pub async fn process(&self, job: &mut VideoJob) -> Result<String, PipelineError> {
        let artifacts = JobArtifacts::for_job(&self.workdir, job);

        let result = self.run(job, &artifacts).await;

        artifacts.cleanup().await;
        self.processing.remove(&job.key);
        job.advance(JobState::Terminated);

        match &result {
            Ok(_) => tracing::info!(job = %job.key, "video analyzed"),
            Err(e) => tracing::debug!(job = %job.key, error = %e, "job failed"),
        }
        result
    }

    /// The fallible step sequence. Never called outside [`Self::process`].
    async fn run(
        &self,
        job: &mut VideoJob,
        artifacts: &JobArtifacts,
    ) -> Result<String, PipelineError> {
        // Admission: checked against the declared size, before any artifact
        // exists or any byte is downloaded.
        if job.declared_size > self.max_video_bytes {
            return Err(PipelineError::Oversized {
                size: job.declared_size,
                max: self.max_video_bytes,
            });
        }
        job.advance(JobState::Admitted);

        // Download.
        self.source.fetch(&job.file_id, &artifacts.video).await?;
        job.advance(JobState::Downloaded);

        // Extraction.
        let probe = self.extractor.probe(&artifacts.video).await?;
        job.has_audio = probe.has_audio;
        if job.has_audio {
            self.extractor
                .extract_audio(&artifacts.video, &artifacts.audio)
                .await?;
        }
        self.extractor
            .extract_frame(&artifacts.video, &artifacts.frame)
            .await?;
        job.advance(JobState::Extracted);

        // Transcription, only for jobs whose audio actually materialized.
        let transcript = if job.has_audio && non_empty_file(&artifacts.audio).await {
            let audio = tokio::fs::read(&artifacts.audio)
                .await
                .map_err(MediaError::from)?;
            let filename = artifacts
                .audio
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "audio.wav".to_string());
            let text = self
                .transcriber
                .transcribe(&audio, &filename, &self.target_language)
                .await?;
            job.advance(JobState::Transcribed);
            text
        } else {
            job.advance(JobState::SkippedTranscription);
            String::new()
        };

        // Analysis: the response is returned verbatim, no parsing.
        let prompt = prompt::build_prompt(&transcript);
        let frame = tokio::fs::read(&artifacts.frame)
            .await
            .map_err(MediaError::from)?;
        let analysis = self.vision.analyze(&frame, "image/jpeg", &prompt).await?;
        job.advance(JobState::Analyzed);

        Ok(analysis)
    }
}

async fn non_empty_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.len() > 0)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaProbe;

    /// Collaborators that must never be reached. Admission failures happen
    /// before any of them.
    struct UnreachableSource;
    struct UnreachableExtractor;
    struct UnreachableTranscriber;
    struct UnreachableVision;

    #[async_trait]
    impl VideoSource for UnreachableSource {
        async fn fetch(&self, _file_id: &str, _dest: &Path) -> Result<(), TelegramError> {
            panic!("download attempted for a rejected job");
        }
    }

    #[async_trait]
    impl MediaExtractor for UnreachableExtractor {
        async fn probe(&self, _video: &Path) -> Result<MediaProbe, MediaError> {
            panic!("extraction attempted for a rejected job");
        }
        async fn extract_audio(&self, _video: &Path, _dest: &Path) -> Result<(), MediaError> {
            panic!("extraction attempted for a rejected job");
        }
        async fn extract_frame(&self, _video: &Path, _dest: &Path) -> Result<(), MediaError> {
            panic!("extraction attempted for a rejected job");
        }
    }

    #[async_trait]
    impl TranscriptionProvider for UnreachableTranscriber {
        async fn transcribe(
            &self,
            _data: &[u8],
            _filename: &str,
            _language: &str,
        ) -> Result<String, MediaError> {
            panic!("transcription attempted for a rejected job");
        }
        fn name(&self) -> &str {
            "unreachable"
        }
        fn is_available(&self) -> bool {
            true
        }
    }

    #[async_trait]
    impl VisionProvider for UnreachableVision {
        async fn analyze(
            &self,
            _image: &[u8],
            _mime_type: &str,
            _prompt: &str,
        ) -> Result<String, MediaError> {
            panic!("analysis attempted for a rejected job");
        }
        fn name(&self) -> &str {
            "unreachable"
        }
        fn is_available(&self) -> bool {
            true
        }
    }

    fn rejecting_pipeline(workdir: PathBuf, processing: Arc<ProcessingSet>) -> Pipeline {
        Pipeline::new(
            Arc::new(UnreachableSource),
            Arc::new(UnreachableExtractor),
            Arc::new(UnreachableTranscriber),
            Arc::new(UnreachableVision),
            processing,
            workdir,
        )
    }

    #[tokio::test]
    async fn test_oversized_job_touches_no_collaborator_and_releases_key() {
        let dir = tempfile::tempdir().unwrap();
        let processing = Arc::new(ProcessingSet::new());
        let pipeline = rejecting_pipeline(dir.path().to_path_buf(), Arc::clone(&processing));

        let key = JobKey {
            chat_id: 1,
            message_id: 1,
        };
        assert!(processing.insert(key));
        let mut job = VideoJob::new(key, "file-1", config::MAX_VIDEO_BYTES + 1);

        let err = pipeline.process(&mut job).await.unwrap_err();
        assert!(matches!(err, PipelineError::Oversized { .. }));
        assert!(err.is_user_correctable());

        assert!(processing.is_empty());
        assert_eq!(job.state, JobState::Terminated);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    /// Source whose download always fails; reaching it proves admission
    /// passed.
    struct FailingSource;

    #[async_trait]
    impl VideoSource for FailingSource {
        async fn fetch(&self, _file_id: &str, _dest: &Path) -> Result<(), TelegramError> {
            Err(TelegramError::DownloadFailed {
                reason: "test source".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_exactly_threshold_size_is_admitted() {
        let dir = tempfile::tempdir().unwrap();
        let processing = Arc::new(ProcessingSet::new());
        let pipeline = Pipeline::new(
            Arc::new(FailingSource),
            Arc::new(UnreachableExtractor),
            Arc::new(UnreachableTranscriber),
            Arc::new(UnreachableVision),
            Arc::clone(&processing),
            dir.path().to_path_buf(),
        );

        let key = JobKey {
            chat_id: 1,
            message_id: 2,
        };
        processing.insert(key);
        let mut job = VideoJob::new(key, "file-1", config::MAX_VIDEO_BYTES);

        // The job passes admission and fails at the download step instead of
        // being rejected as oversized.
        let err = pipeline.process(&mut job).await.unwrap_err();
        assert!(matches!(err, PipelineError::Transport(_)));
        assert!(processing.is_empty());
    }
}
