//! tahlil — a Telegram bot that analyzes incoming videos.
//!
//! One video message flows through a single pipeline: download, audio and
//! frame extraction, speech transcription, and a vision-language analysis
//! that is relayed back to the chat. Duplicate deliveries are suppressed
//! while a message is in flight, and every job's temporary artifacts are
//! reclaimed whether it succeeds or fails.

pub mod config;
pub mod error;
pub mod health;
pub mod media;
pub mod pipeline;
pub mod secrets;
pub mod telegram;

pub use error::{Error, Result};
