//! Configuration management for Benoît
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{BenoitError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Benoît
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Generative backend configuration
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Tutor behavior configuration
    #[serde(default)]
    pub tutor: TutorConfig,
    /// Audio output configuration
    #[serde(default)]
    pub audio: AudioConfig,
}

/// Generative backend configuration
///
/// Points at the Gemini `generateContent` REST API by default. `api_base`
/// can be overridden to target a mock server in tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the generative API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// API key; usually supplied through `GEMINI_API_KEY` instead
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for conversational replies
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Model used for speech synthesis
    #[serde(default = "default_speech_model")]
    pub speech_model: String,

    /// Prebuilt voice name for speech synthesis
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Sampling temperature for replies
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// HTTP client timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_chat_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_speech_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

fn default_voice() -> String {
    "Puck".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_seconds() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
            chat_model: default_chat_model(),
            speech_model: default_speech_model(),
            voice: default_voice(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Tutor behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorConfig {
    /// Speak replies automatically while the conversation is young
    #[serde(default = "default_auto_play")]
    pub auto_play: bool,

    /// Auto-play fires when fewer than this many messages preceded the turn
    #[serde(default = "default_auto_play_threshold")]
    pub auto_play_threshold: usize,
}

fn default_auto_play() -> bool {
    true
}

fn default_auto_play_threshold() -> usize {
    2
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            auto_play: default_auto_play(),
            auto_play_threshold: default_auto_play_threshold(),
        }
    }
}

/// Where decoded speech goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioOutputKind {
    /// Default system output device (requires the `audio-io` feature)
    Device,
    /// One WAV file per utterance under `wav_dir`
    Wav,
    /// Discard audio, only log what would have played
    #[default]
    None,
}

impl AudioOutputKind {
    /// Parse an output kind from a string
    ///
    /// # Examples
    ///
    /// ```
    /// use benoit::config::AudioOutputKind;
    ///
    /// assert_eq!(AudioOutputKind::parse_str("WAV").unwrap(), AudioOutputKind::Wav);
    /// assert!(AudioOutputKind::parse_str("speaker").is_err());
    /// ```
    pub fn parse_str(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "device" => Ok(Self::Device),
            "wav" => Ok(Self::Wav),
            "none" | "off" => Ok(Self::None),
            other => Err(format!("Unknown audio output: {}", other)),
        }
    }
}

/// Audio output configuration
///
/// The speech format is fixed by the backend (see
/// [`crate::audio::SPEECH_SAMPLE_RATE`]) and is not configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Output sink
    #[serde(default)]
    pub output: AudioOutputKind,

    /// Directory for WAV capture
    #[serde(default = "default_wav_dir")]
    pub wav_dir: PathBuf,
}

fn default_wav_dir() -> PathBuf {
    PathBuf::from("recordings")
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            output: AudioOutputKind::default(),
            wav_dir: default_wav_dir(),
        }
    }
}

impl Config {
    /// Load configuration from file, then apply env vars and CLI overrides
    ///
    /// A missing file is not an error; defaults are used instead.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    /// * `cli` - Parsed CLI arguments
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!("Config file {} not found, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    /// Parse configuration from a YAML file
    fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            BenoitError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let config: Config = serde_yaml::from_str(&contents).map_err(BenoitError::from)?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .ok()
            .filter(|k| !k.is_empty());
        if api_key.is_some() {
            self.provider.api_key = api_key;
            tracing::debug!("Env override: API key");
        }

        if let Ok(api_base) = std::env::var("BENOIT_API_BASE") {
            tracing::debug!(api_base = %api_base, "Env override: BENOIT_API_BASE");
            self.provider.api_base = api_base;
        }

        if let Ok(model) = std::env::var("BENOIT_CHAT_MODEL") {
            tracing::debug!(model = %model, "Env override: BENOIT_CHAT_MODEL");
            self.provider.chat_model = model;
        }

        if let Ok(model) = std::env::var("BENOIT_SPEECH_MODEL") {
            tracing::debug!(model = %model, "Env override: BENOIT_SPEECH_MODEL");
            self.provider.speech_model = model;
        }

        if let Ok(voice) = std::env::var("BENOIT_VOICE") {
            tracing::debug!(voice = %voice, "Env override: BENOIT_VOICE");
            self.provider.voice = voice;
        }

        if let Ok(output) = std::env::var("BENOIT_AUDIO_OUTPUT") {
            match AudioOutputKind::parse_str(&output) {
                Ok(kind) => {
                    self.audio.output = kind;
                    tracing::debug!(?kind, "Env override: BENOIT_AUDIO_OUTPUT");
                }
                Err(_) => {
                    tracing::warn!("Invalid value for BENOIT_AUDIO_OUTPUT: {}", output);
                }
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(output) = cli.audio {
            self.audio.output = output;
        }
        if cli.no_auto_play {
            self.tutor.auto_play = false;
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.provider.api_base.trim().is_empty() {
            return Err(BenoitError::Config("provider.api_base cannot be empty".to_string()).into());
        }

        if self.provider.chat_model.trim().is_empty() || self.provider.speech_model.trim().is_empty()
        {
            return Err(BenoitError::Config("model names cannot be empty".to_string()).into());
        }

        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(BenoitError::Config(
                "provider.temperature must be between 0.0 and 2.0".to_string(),
            )
            .into());
        }

        if self.provider.timeout_seconds == 0 {
            return Err(BenoitError::Config(
                "provider.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.audio.output == AudioOutputKind::Device && !cfg!(feature = "audio-io") {
            return Err(BenoitError::Config(
                "audio.output 'device' requires building with the audio-io feature".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
