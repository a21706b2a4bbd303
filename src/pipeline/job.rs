//! Job identity and state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of one incoming video message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobKey {
    pub chat_id: i64,
    pub message_id: i64,
}

impl std::fmt::Display for JobKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.chat_id, self.message_id)
    }
}

/// State of a video job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Message routed in, nothing checked yet.
    Received,
    /// Declared size within the limit.
    Admitted,
    /// Video materialized on local disk.
    Downloaded,
    /// Audio (if any) and still frame extracted.
    Extracted,
    /// Audio transcribed to text.
    Transcribed,
    /// No usable audio, transcription skipped.
    SkippedTranscription,
    /// Vision-language analysis produced.
    Analyzed,
    /// Finished, successfully or not. Artifacts are gone.
    Terminated,
}

impl JobState {
    /// Check if this state allows transitioning to another state.
    ///
    /// Every non-terminal state may fail straight into `Terminated`; there
    /// is no retry transition out of it.
    pub fn can_transition_to(&self, target: JobState) -> bool {
        use JobState::*;

        if target == Terminated {
            return *self != Terminated;
        }

        matches!(
            (self, target),
            (Received, Admitted)
                | (Admitted, Downloaded)
                | (Downloaded, Extracted)
                | (Extracted, Transcribed)
                | (Extracted, SkippedTranscription)
                | (Transcribed, Analyzed)
                | (SkippedTranscription, Analyzed)
        )
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Received => "received",
            Self::Admitted => "admitted",
            Self::Downloaded => "downloaded",
            Self::Extracted => "extracted",
            Self::Transcribed => "transcribed",
            Self::SkippedTranscription => "skipped_transcription",
            Self::Analyzed => "analyzed",
            Self::Terminated => "terminated",
        };
        write!(f, "{}", s)
    }
}

/// One incoming video message and its processing lifecycle.
#[derive(Debug, Clone)]
pub struct VideoJob {
    pub key: JobKey,
    /// Transport file reference for the download step.
    pub file_id: String,
    /// Size in bytes as declared by the transport, checked at admission.
    pub declared_size: u64,
    pub received_at: DateTime<Utc>,
    pub state: JobState,
    /// Set during extraction; drives the transcription branch.
    pub has_audio: bool,
}

impl VideoJob {
    /// Create a job for a freshly routed video message.
    pub fn new(key: JobKey, file_id: impl Into<String>, declared_size: u64) -> Self {
        Self {
            key,
            file_id: file_id.into(),
            declared_size,
            received_at: Utc::now(),
            state: JobState::Received,
            has_audio: false,
        }
    }

    /// Advance the job to the next state.
    pub fn advance(&mut self, next: JobState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid job transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(job = %self.key, from = %self.state, to = %next, "job transition");
        self.state = next;
    }
}
