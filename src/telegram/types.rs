//! Telegram Bot API wire types.
//!
//! Only the fields this bot reads are modeled; the API sends plenty more and
//! serde ignores them.

use serde::{Deserialize, Serialize};

/// One long-poll update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

/// An incoming chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
    pub video: Option<Video>,
    pub document: Option<Document>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// A native video attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub file_id: String,
    pub file_size: Option<u64>,
    pub mime_type: Option<String>,
}

/// A generic file attachment; videos sent "as file" arrive this way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub file_id: String,
    pub file_size: Option<u64>,
    pub mime_type: Option<String>,
}

/// Result of `getFile`: the server-side path the bytes are fetched from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    pub file_id: String,
    pub file_path: Option<String>,
    pub file_size: Option<u64>,
}

/// A video reference pulled out of a message, whichever way it was attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoAttachment {
    pub file_id: String,
    /// Declared size; 0 when the transport did not report one.
    pub file_size: u64,
}

impl Message {
    /// The video content of this message: a native video, or a document
    /// whose mime type says it is one.
    pub fn video_attachment(&self) -> Option<VideoAttachment> {
        if let Some(video) = &self.video {
            return Some(VideoAttachment {
                file_id: video.file_id.clone(),
                file_size: video.file_size.unwrap_or(0),
            });
        }
        if let Some(document) = &self.document {
            let is_video = document
                .mime_type
                .as_deref()
                .is_some_and(|m| m.starts_with("video/"));
            if is_video {
                return Some(VideoAttachment {
                    file_id: document.file_id.clone(),
                    file_size: document.file_size.unwrap_or(0),
                });
            }
        }
        None
    }

    /// The bot command this message carries, without the leading slash or a
    /// trailing `@botname` suffix.
    pub fn command(&self) -> Option<&str> {
        let text = self.text.as_deref()?.trim();
        let rest = text.strip_prefix('/')?;
        let name = rest.split_whitespace().next()?;
        Some(name.split('@').next().unwrap_or(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(json: &str) -> Message {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_deserialize_native_video_update() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 9001,
                "message": {
                    "message_id": 17,
                    "chat": {"id": -100123, "type": "group"},
                    "video": {
                        "file_id": "BAAC-xyz",
                        "file_unique_id": "u1",
                        "width": 640,
                        "height": 480,
                        "duration": 9,
                        "file_size": 5242880
                    }
                }
            }"#,
        )
        .unwrap();

        let message = update.message.unwrap();
        let attachment = message.video_attachment().unwrap();
        assert_eq!(attachment.file_id, "BAAC-xyz");
        assert_eq!(attachment.file_size, 5_242_880);
    }

    #[test]
    fn test_video_sent_as_document() {
        let msg = message(
            r#"{
                "message_id": 18,
                "chat": {"id": 5},
                "document": {
                    "file_id": "DOC-1",
                    "mime_type": "video/mp4",
                    "file_size": 1024
                }
            }"#,
        );
        let attachment = msg.video_attachment().unwrap();
        assert_eq!(attachment.file_id, "DOC-1");
        assert_eq!(attachment.file_size, 1024);
    }

    #[test]
    fn test_non_video_document_is_ignored() {
        let msg = message(
            r#"{
                "message_id": 19,
                "chat": {"id": 5},
                "document": {
                    "file_id": "DOC-2",
                    "mime_type": "application/pdf",
                    "file_size": 1024
                }
            }"#,
        );
        assert!(msg.video_attachment().is_none());
    }

    #[test]
    fn test_text_message_has_no_attachment() {
        let msg = message(r#"{"message_id": 20, "chat": {"id": 5}, "text": "salom"}"#);
        assert!(msg.video_attachment().is_none());
    }

    #[test]
    fn test_missing_file_size_defaults_to_zero() {
        let msg = message(
            r#"{
                "message_id": 21,
                "chat": {"id": 5},
                "video": {"file_id": "V-1"}
            }"#,
        );
        assert_eq!(msg.video_attachment().unwrap().file_size, 0);
    }

    #[test]
    fn test_command_parsing() {
        let msg = message(r#"{"message_id": 1, "chat": {"id": 5}, "text": "/start"}"#);
        assert_eq!(msg.command(), Some("start"));
    }

    #[test]
    fn test_command_with_bot_suffix() {
        let msg =
            message(r#"{"message_id": 1, "chat": {"id": 5}, "text": "/start@tahlil_bot hi"}"#);
        assert_eq!(msg.command(), Some("start"));
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        let msg = message(r#"{"message_id": 1, "chat": {"id": 5}, "text": "salom"}"#);
        assert_eq!(msg.command(), None);
    }
}
