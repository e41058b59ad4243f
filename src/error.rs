//! Error types for Benoît
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Benoît operations
///
/// Covers configuration loading, backend calls, lesson lookup, audio
/// decoding and audio output. The conversation session never surfaces
/// these to the learner; it logs and discards them.
#[derive(Error, Debug)]
pub enum BenoitError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generative backend errors (status codes, malformed envelopes)
    #[error("Provider error: {0}")]
    Provider(String),

    /// No API key available for the backend
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// Lesson id not present in the catalog
    #[error("Unknown lesson: {0}")]
    UnknownLesson(String),

    /// Audio payload could not be decoded (bad base64, truncated PCM)
    #[error("Audio decode error: {0}")]
    AudioDecode(String),

    /// Audio output could not be opened or written
    #[error("Audio output error: {0}")]
    AudioOutput(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Line editor errors in the interactive shell
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

/// Result type alias for Benoît operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = BenoitError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_provider_error_display() {
        let error = BenoitError::Provider("status 500".to_string());
        assert_eq!(error.to_string(), "Provider error: status 500");
    }

    #[test]
    fn test_missing_credentials_error_display() {
        let error = BenoitError::MissingCredentials("gemini".to_string());
        assert_eq!(
            error.to_string(),
            "Missing credentials for provider: gemini"
        );
    }

    #[test]
    fn test_unknown_lesson_error_display() {
        let error = BenoitError::UnknownLesson("l9".to_string());
        assert_eq!(error.to_string(), "Unknown lesson: l9");
    }

    #[test]
    fn test_audio_decode_error_display() {
        let error = BenoitError::AudioDecode("odd byte count".to_string());
        assert_eq!(error.to_string(), "Audio decode error: odd byte count");
    }

    #[test]
    fn test_readline_error_conversion() {
        let error: BenoitError = rustyline::error::ReadlineError::Eof.into();
        assert!(matches!(error, BenoitError::Readline(_)));
        assert!(error.to_string().starts_with("Readline error:"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: BenoitError = json_error.into();
        assert!(matches!(error, BenoitError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: BenoitError = yaml_error.into();
        assert!(matches!(error, BenoitError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BenoitError>();
    }
}
