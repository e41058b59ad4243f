//! Test utilities for Benoît
//!
//! This module provides a scripted backend, a recording audio sink,
//! configuration fixtures and assertion helpers.

use crate::audio::{AudioSink, DecodedAudio};
use crate::config::Config;
use crate::error::{BenoitError, Result};
use crate::providers::{Backend, Turn};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::Notify;

/// Scripted backend that replays queued responses in order
///
/// Errors are queued as strings and surface as `BenoitError::Provider`.
/// An exhausted queue answers `Ok("")` for completions and `Ok(None)` for
/// speech.
#[derive(Default)]
pub struct MockBackend {
    completions: Mutex<VecDeque<std::result::Result<String, String>>>,
    speech: Mutex<VecDeque<std::result::Result<Option<String>, String>>>,
    completion_requests: Mutex<Vec<(Vec<Turn>, String)>>,
    speech_requests: Mutex<Vec<String>>,
    gates: Mutex<VecDeque<Arc<Notify>>>,
}

impl MockBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next completion result
    pub fn push_completion(&self, result: std::result::Result<String, String>) {
        self.completions.lock().unwrap().push_back(result);
    }

    /// Queue the next speech result
    pub fn push_speech(&self, result: std::result::Result<Option<String>, String>) {
        self.speech.lock().unwrap().push_back(result);
    }

    /// Hold the next ungated completion call until the returned handle is notified
    ///
    /// Gates are handed to calls in the order the calls arrive.
    pub fn hold_next_completion(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().push_back(Arc::clone(&gate));
        gate
    }

    /// Completion calls seen so far as (history, system instruction)
    pub fn completion_requests(&self) -> Vec<(Vec<Turn>, String)> {
        self.completion_requests.lock().unwrap().clone()
    }

    /// Texts sent for synthesis so far
    pub fn speech_requests(&self) -> Vec<String> {
        self.speech_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn complete_conversation(
        &self,
        history: &[Turn],
        system_instruction: &str,
    ) -> Result<String> {
        self.completion_requests
            .lock()
            .unwrap()
            .push((history.to_vec(), system_instruction.to_string()));

        let gate = self.gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let next = self.completions.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(msg)) => Err(BenoitError::Provider(msg).into()),
            None => Ok(String::new()),
        }
    }

    async fn synthesize_speech(&self, text: &str) -> Result<Option<String>> {
        self.speech_requests.lock().unwrap().push(text.to_string());
        let next = self.speech.lock().unwrap().pop_front();
        match next {
            Some(Ok(payload)) => Ok(payload),
            Some(Err(msg)) => Err(BenoitError::Provider(msg).into()),
            None => Ok(None),
        }
    }
}

/// Audio sink that keeps every buffer it is given
#[derive(Default)]
pub struct RecordingSink {
    played: Mutex<Vec<DecodedAudio>>,
}

impl RecordingSink {
    /// Buffers played so far
    pub fn played(&self) -> Vec<DecodedAudio> {
        self.played.lock().unwrap().clone()
    }
}

impl AudioSink for RecordingSink {
    fn play(&self, audio: DecodedAudio) -> Result<()> {
        self.played.lock().unwrap().push(audio);
        Ok(())
    }

    fn describe(&self) -> String {
        "recording".to_string()
    }
}

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = format!("{:#}", e);
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Configuration with a dummy API key, suitable for building a backend
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.provider.api_key = Some("test-key".to_string());
    config
}

/// A complete configuration file
pub fn test_config_yaml() -> String {
    r#"
provider:
  api_base: http://localhost:8089
  api_key: test-key
  chat_model: gemini-3-flash-preview
  speech_model: gemini-2.5-flash-preview-tts
  voice: Puck
  temperature: 0.5
  timeout_seconds: 30

tutor:
  auto_play: true
  auto_play_threshold: 2

audio:
  output: wav
  wav_dir: recordings
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AudioOutputKind;

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", "content");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content");
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<()> = Err(BenoitError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        assert_error_contains(Ok(()), "error");
    }

    #[test]
    fn test_test_config_is_valid() {
        let config = test_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.provider.api_key.as_deref(), Some("test-key"));
    }

    #[test]
    fn test_test_config_yaml() {
        let config: Config = serde_yaml::from_str(&test_config_yaml()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.audio.output, AudioOutputKind::Wav);
        assert_eq!(config.provider.temperature, 0.5);
    }

    #[tokio::test]
    async fn test_mock_backend_replays_queue() {
        let backend = MockBackend::new();
        backend.push_completion(Ok("un".to_string()));
        backend.push_completion(Err("deux".to_string()));

        let history = vec![Turn::user("a")];
        assert_eq!(backend.complete_conversation(&history, "sys").await.unwrap(), "un");
        assert!(backend.complete_conversation(&history, "sys").await.is_err());
        assert_eq!(backend.complete_conversation(&history, "sys").await.unwrap(), "");
        assert_eq!(backend.completion_requests().len(), 3);
        assert!(backend.synthesize_speech("x").await.unwrap().is_none());
    }
}
