//! Telegram transport: Bot API client, wire types, and the inbound router.

mod api;
mod router;
mod types;

pub use api::BotApi;
pub use router::{GREETING, REPLY_FAILURE, REPLY_OVERSIZED, Router, STATUS_PROCESSING};
pub use types::{Chat, Document, File, Message, Update, Video, VideoAttachment};
