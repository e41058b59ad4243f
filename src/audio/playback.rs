//! Speech playback pipeline
//!
//! Turns tutor text into audible speech: acquire the shared output, strip
//! markdown punctuation, request synthesis, decode, and schedule playback.
//! Playback always runs speculatively, so the public entry point logs and
//! absorbs every failure.

use crate::audio::{decode_audio, open_sink, AudioSink, SPEECH_CHANNELS, SPEECH_SAMPLE_RATE};
use crate::config::AudioConfig;
use crate::error::{BenoitError, Result};
use crate::providers::Backend;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;

/// Characters removed before synthesis
const MARKDOWN_CHARS: &[char] = &['*', '#', '_', '[', ']', '(', ')'];

/// Outcome of one playback attempt
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackReport {
    /// Audio was decoded and handed to the output
    Scheduled {
        /// Number of decoded samples
        samples: usize,
        /// Playback length
        duration: Duration,
    },
    /// The backend answered without audio
    NoAudio,
    /// Something failed; the error has been logged
    Failed(String),
}

/// Remove markdown punctuation so the voice reads clean prose
///
/// # Examples
///
/// ```
/// use benoit::audio::strip_markdown;
///
/// assert_eq!(strip_markdown("**Bonjour** (Olá) #1 [x]_"), "Bonjour Olá 1 x");
/// ```
pub fn strip_markdown(text: &str) -> String {
    text.chars().filter(|c| !MARKDOWN_CHARS.contains(c)).collect()
}

/// Speaks tutor messages through the shared audio output
///
/// The output is opened on first use and then reused by every later
/// playback, including concurrent ones.
pub struct AudioPlayer {
    backend: Arc<dyn Backend>,
    config: AudioConfig,
    output: OnceCell<Arc<dyn AudioSink>>,
}

impl AudioPlayer {
    /// Create a player whose output is opened lazily from `config`
    pub fn new(backend: Arc<dyn Backend>, config: AudioConfig) -> Self {
        Self {
            backend,
            config,
            output: OnceCell::new(),
        }
    }

    /// Create a player with an already-open output
    pub fn with_sink(backend: Arc<dyn Backend>, config: AudioConfig, sink: Arc<dyn AudioSink>) -> Self {
        Self {
            backend,
            config,
            output: OnceCell::from(sink),
        }
    }

    /// Whether the output has been opened
    pub fn is_output_open(&self) -> bool {
        self.output.initialized()
    }

    /// Description of the open output, if any
    pub fn output_description(&self) -> Option<String> {
        self.output.get().map(|sink| sink.describe())
    }

    /// Acquire the shared output, opening it on first use
    async fn output(&self) -> Result<Arc<dyn AudioSink>> {
        let sink = self
            .output
            .get_or_try_init(|| async {
                let config = self.config.clone();
                let sink = tokio::task::spawn_blocking(move || open_sink(&config))
                    .await
                    .map_err(|e| BenoitError::AudioOutput(format!("Audio open task failed: {}", e)))??;
                let sink: Arc<dyn AudioSink> = Arc::from(sink);
                Ok::<_, anyhow::Error>(sink)
            })
            .await?;
        Ok(Arc::clone(sink))
    }

    /// Run the pipeline once, returning any failure to the caller
    ///
    /// # Errors
    ///
    /// Returns error if the output cannot be opened, synthesis fails, the
    /// payload cannot be decoded, or the output rejects the buffer
    pub async fn try_play_audio(&self, text: &str) -> Result<PlaybackReport> {
        let sink = self.output().await?;

        let prose = strip_markdown(text);
        let Some(payload) = self.backend.synthesize_speech(&prose).await? else {
            tracing::debug!("Synthesis returned no audio, nothing to play");
            return Ok(PlaybackReport::NoAudio);
        };

        let audio = decode_audio(&payload, SPEECH_SAMPLE_RATE, SPEECH_CHANNELS)?;
        let samples = audio.samples.len();
        let duration = audio.duration();

        sink.play(audio)?;
        tracing::debug!(
            "Scheduled {} samples ({:.2}s) on {}",
            samples,
            duration.as_secs_f64(),
            sink.describe()
        );

        Ok(PlaybackReport::Scheduled { samples, duration })
    }

    /// Run the pipeline once; failures are logged, never returned
    pub async fn play_audio(&self, text: &str) -> PlaybackReport {
        match self.try_play_audio(text).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("TTS error: {:#}", e);
                PlaybackReport::Failed(e.to_string())
            }
        }
    }

    /// Run the pipeline on a detached task
    pub fn spawn_playback(self: &Arc<Self>, text: impl Into<String>) -> JoinHandle<PlaybackReport> {
        let player = Arc::clone(self);
        let text = text.into();
        tokio::spawn(async move { player.play_audio(&text).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::encode_audio;
    use crate::test_utils::{MockBackend, RecordingSink};

    fn player(backend: Arc<MockBackend>, sink: Arc<RecordingSink>) -> AudioPlayer {
        AudioPlayer::with_sink(backend, AudioConfig::default(), sink)
    }

    #[test]
    fn test_strip_markdown_keeps_prose() {
        assert_eq!(strip_markdown("Salut ! 🤖"), "Salut ! 🤖");
        assert_eq!(strip_markdown("__a__ *b* (c) [d] #e"), "a b c d e");
    }

    #[tokio::test]
    async fn test_play_audio_schedules_decoded_buffer() {
        let backend = Arc::new(MockBackend::new());
        backend.push_speech(Ok(Some(encode_audio(&[0.0, 0.5, -0.5]))));
        let sink = Arc::new(RecordingSink::default());
        let player = player(Arc::clone(&backend), Arc::clone(&sink));

        let report = player.play_audio("**Bonjour** (Olá)").await;

        assert!(matches!(report, PlaybackReport::Scheduled { samples: 3, .. }));
        assert_eq!(backend.speech_requests(), vec!["Bonjour Olá".to_string()]);
        let played = sink.played();
        assert_eq!(played.len(), 1);
        assert_eq!(played[0].samples, vec![0.0, 0.5, -0.5]);
        assert_eq!(played[0].sample_rate, SPEECH_SAMPLE_RATE);
        assert_eq!(played[0].channels, SPEECH_CHANNELS);
    }

    #[tokio::test]
    async fn test_play_audio_absent_payload_is_noop() {
        let backend = Arc::new(MockBackend::new());
        backend.push_speech(Ok(None));
        let sink = Arc::new(RecordingSink::default());
        let player = player(backend, Arc::clone(&sink));

        assert_eq!(player.play_audio("Bonjour").await, PlaybackReport::NoAudio);
        assert!(sink.played().is_empty());
    }

    #[tokio::test]
    async fn test_play_audio_swallows_backend_error() {
        let backend = Arc::new(MockBackend::new());
        backend.push_speech(Err("network down".to_string()));
        let sink = Arc::new(RecordingSink::default());
        let player = player(backend, Arc::clone(&sink));

        let report = player.play_audio("Bonjour").await;
        assert!(matches!(report, PlaybackReport::Failed(ref msg) if msg.contains("network down")));
        assert!(sink.played().is_empty());
    }

    #[tokio::test]
    async fn test_play_audio_swallows_malformed_payload() {
        let backend = Arc::new(MockBackend::new());
        backend.push_speech(Ok(Some("%%%".to_string())));
        backend.push_speech(Ok(Some("AA==".to_string())));
        let sink = Arc::new(RecordingSink::default());
        let player = player(backend, Arc::clone(&sink));

        assert!(matches!(player.play_audio("a").await, PlaybackReport::Failed(_)));
        assert!(matches!(player.play_audio("b").await, PlaybackReport::Failed(_)));
        assert!(sink.played().is_empty());
    }

    #[tokio::test]
    async fn test_try_play_audio_surfaces_error() {
        let backend = Arc::new(MockBackend::new());
        backend.push_speech(Err("boom".to_string()));
        let player = player(backend, Arc::new(RecordingSink::default()));
        assert!(player.try_play_audio("x").await.is_err());
    }

    #[tokio::test]
    async fn test_output_opened_lazily_once() {
        let backend = Arc::new(MockBackend::new());
        backend.push_speech(Ok(Some(encode_audio(&[0.1]))));
        backend.push_speech(Ok(Some(encode_audio(&[0.2]))));
        let player = AudioPlayer::new(backend, AudioConfig::default());

        assert!(!player.is_output_open());
        player.play_audio("one").await;
        assert!(player.is_output_open());
        assert_eq!(player.output_description().as_deref(), Some("none"));
        player.play_audio("two").await;
        assert!(player.is_output_open());
    }

    #[tokio::test]
    async fn test_spawned_playbacks_share_output() {
        let backend = Arc::new(MockBackend::new());
        backend.push_speech(Ok(Some(encode_audio(&[0.1]))));
        backend.push_speech(Ok(Some(encode_audio(&[0.2]))));
        let sink = Arc::new(RecordingSink::default());
        let player = Arc::new(player(backend, Arc::clone(&sink)));

        let a = player.spawn_playback("one");
        let b = player.spawn_playback("two");
        a.await.unwrap();
        b.await.unwrap();

        assert_eq!(sink.played().len(), 2);
    }
}
