//! Benoît - robot French tutor library
//!
//! This library provides the core of the Benoît tutor: the conversation
//! session, the mode controller, the generative backend client and the
//! speech playback pipeline.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Transcript and the request/reply cycle
//! - `mode`: Home / Lesson / Chat modes and the controller that switches them
//! - `providers`: Generative backend abstraction and the Gemini client
//! - `audio`: Speech payload decoding, output sinks and playback
//! - `lessons`: Lesson catalog and tutor prompt templates
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use benoit::{Config, ConversationSession, ModeController};
//! use benoit::providers::create_backend;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let backend = create_backend(&config.provider)?;
//!     let session = Arc::new(ConversationSession::new(backend, None, &config.tutor));
//!     let controller = ModeController::new(session);
//!
//!     controller.start_lesson_by_id("l1")?;
//!     controller.session().submit_user_message("Bonjour !").await;
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod lessons;
pub mod mode;
pub mod providers;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use error::{BenoitError, Result};
pub use lessons::{Lesson, LessonLevel, LESSONS};
pub use mode::{AppMode, ModeController};
pub use session::{ConversationSession, Message, SubmitOutcome};

#[cfg(test)]
pub mod test_utils;
