//! Provider module for Benoît
//!
//! This module contains the generative backend abstraction and the
//! Gemini implementation.

pub mod base;
pub mod gemini;

pub use base::{Backend, Role, Turn};
pub use gemini::GeminiBackend;

use crate::config::ProviderConfig;
use crate::error::Result;
use std::sync::Arc;

/// Create the configured backend
///
/// # Errors
///
/// Returns error if credentials are missing or the HTTP client cannot be built
pub fn create_backend(config: &ProviderConfig) -> Result<Arc<dyn Backend>> {
    Ok(Arc::new(GeminiBackend::new(config.clone())?))
}
