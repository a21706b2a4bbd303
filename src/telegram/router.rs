//! Inbound message routing.
//!
//! Long-polls the Bot API, answers the start command, and hands video
//! messages to the pipeline. Each video runs as its own task so a slow
//! remote call never blocks intake.

use std::sync::Arc;
use std::time::Duration;

use crate::pipeline::{JobKey, Pipeline, ProcessingSet, VideoJob};
use crate::telegram::api::BotApi;
use crate::telegram::types::{Message, VideoAttachment};

/// Reply to the start command.
pub const GREETING: &str = "Salom! Bot tayyor. Video yuboring.";
/// Immediate status reply once a video is accepted.
pub const STATUS_PROCESSING: &str = "⚡️ Video tahlil qilinmoqda...";
/// The one specific user-facing rejection.
pub const REPLY_OVERSIZED: &str = "❌ Fayl juda katta. 20 MB dan kichik video yuboring.";
/// Generic failure notice; internals never reach the user.
pub const REPLY_FAILURE: &str = "⚠️ Tahlil jarayonida xatolik yuz berdi.";

const POLL_TIMEOUT_SECS: u64 = 30;
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Dispatches inbound chat events.
pub struct Router {
    api: Arc<BotApi>,
    pipeline: Arc<Pipeline>,
    processing: Arc<ProcessingSet>,
}

impl Router {
    pub fn new(api: Arc<BotApi>, pipeline: Arc<Pipeline>, processing: Arc<ProcessingSet>) -> Self {
        Self {
            api,
            pipeline,
            processing,
        }
    }

    /// Run the polling loop. Never returns under normal operation.
    pub async fn run(&self) {
        let mut offset = 0i64;
        loop {
            let updates = match self.api.get_updates(offset, POLL_TIMEOUT_SECS).await {
                Ok(updates) => updates,
                Err(e) => {
                    tracing::warn!(error = %e, "getUpdates failed, backing off");
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                if let Some(message) = update.message {
                    self.dispatch(message).await;
                }
            }
        }
    }

    async fn dispatch(&self, message: Message) {
        if message.command() == Some("start") {
            if let Err(e) = self.api.send_message(message.chat.id, GREETING).await {
                tracing::warn!(error = %e, "failed to send greeting");
            }
            return;
        }

        if let Some(attachment) = message.video_attachment() {
            let api = Arc::clone(&self.api);
            let pipeline = Arc::clone(&self.pipeline);
            let processing = Arc::clone(&self.processing);
            let chat_id = message.chat.id;
            let message_id = message.message_id;
            tokio::spawn(async move {
                handle_video(api, pipeline, processing, chat_id, message_id, attachment).await;
            });
        }
    }
}

/// Process one video message: dedup gate, status reply, pipeline, outcome
/// reply. Artifact and Processing Set cleanup is the pipeline's job.
async fn handle_video(
    api: Arc<BotApi>,
    pipeline: Arc<Pipeline>,
    processing: Arc<ProcessingSet>,
    chat_id: i64,
    message_id: i64,
    attachment: VideoAttachment,
) {
    let key = JobKey {
        chat_id,
        message_id,
    };

    // Transport redelivery of an in-flight message: drop it silently.
    if !processing.insert(key) {
        tracing::debug!(job = %key, "duplicate delivery suppressed");
        return;
    }

    if let Err(e) = api.send_message(chat_id, STATUS_PROCESSING).await {
        tracing::warn!(job = %key, error = %e, "failed to send status reply");
    }

    let mut job = VideoJob::new(key, attachment.file_id, attachment.file_size);
    let reply = match pipeline.process(&mut job).await {
        Ok(analysis) => api.send_markdown(chat_id, &analysis).await,
        Err(e) if e.is_user_correctable() => api.send_message(chat_id, REPLY_OVERSIZED).await,
        Err(e) => {
            tracing::error!(job = %key, error = %e, "video analysis failed");
            api.send_message(chat_id, REPLY_FAILURE).await
        }
    };

    if let Err(e) = reply {
        tracing::warn!(job = %key, error = %e, "failed to deliver outcome");
    }
}
