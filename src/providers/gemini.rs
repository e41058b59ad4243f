//! Gemini backend implementation for Benoît
//!
//! This module implements the `Backend` trait over the Gemini
//! `generateContent` REST endpoint: one request shape for conversational
//! replies and one for speech synthesis through the audio modality.

use crate::config::ProviderConfig;
use crate::error::{BenoitError, Result};
use crate::providers::{Backend, Role, Turn};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Phrase wrapped around every utterance sent for synthesis
const SPEECH_DIRECTIVE: &str = "Dites avec uma voz amicale et claire :";

/// Gemini API backend
///
/// # Examples
///
/// ```no_run
/// use benoit::config::ProviderConfig;
/// use benoit::providers::{Backend, GeminiBackend, Turn};
///
/// # async fn example() -> benoit::error::Result<()> {
/// let config = ProviderConfig {
///     api_key: Some("secret".to_string()),
///     ..Default::default()
/// };
/// let backend = GeminiBackend::new(config)?;
/// let reply = backend
///     .complete_conversation(&[Turn::user("Bonjour !")], "Be brief.")
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct GeminiBackend {
    client: Client,
    config: ProviderConfig,
    api_key: String,
}

/// Request body for `models/{model}:generateContent`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GenerationConfig,
}

/// A role-tagged list of parts, used in both directions
#[derive(Debug, Default, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
    /// Reasoning summaries are not part of the reply text
    #[serde(default, skip_serializing)]
    thought: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    data: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

/// Response envelope from `generateContent`
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the top candidate
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|p| !p.thought)
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    /// First inline data blob of the top candidate
    fn inline_audio(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .find_map(|p| p.inline_data.map(|d| d.data).filter(|d| !d.is_empty()))
    }
}

impl GeminiBackend {
    /// Create a new Gemini backend
    ///
    /// # Errors
    ///
    /// Returns `MissingCredentials` if no API key is configured, or an error
    /// if the HTTP client cannot be built
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| BenoitError::MissingCredentials("gemini".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("benoit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BenoitError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Gemini backend: base={}, chat_model={}, speech_model={}",
            config.api_base,
            config.chat_model,
            config.speech_model
        );

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Model used for replies
    pub fn chat_model(&self) -> &str {
        &self.config.chat_model
    }

    /// Model used for speech
    pub fn speech_model(&self) -> &str {
        &self.config.speech_model
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            model
        )
    }

    /// Map conversation turns to Gemini contents (`assistant` becomes `model`)
    fn convert_history(history: &[Turn]) -> Vec<GeminiContent> {
        history
            .iter()
            .map(|turn| GeminiContent {
                role: Some(
                    match turn.role {
                        Role::Assistant => "model",
                        Role::User => "user",
                    }
                    .to_string(),
                ),
                parts: vec![GeminiPart {
                    text: Some(turn.content.clone()),
                    ..Default::default()
                }],
            })
            .collect()
    }

    fn completion_request(&self, history: &[Turn], system_instruction: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: Self::convert_history(history),
            system_instruction: Some(GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: Some(system_instruction.to_string()),
                    ..Default::default()
                }],
            }),
            generation_config: GenerationConfig {
                temperature: Some(self.config.temperature),
                ..Default::default()
            },
        }
    }

    fn speech_request(&self, text: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: Some(format!("{} {}", SPEECH_DIRECTIVE, text)),
                    ..Default::default()
                }],
            }],
            system_instruction: None,
            generation_config: GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: self.config.voice.clone(),
                        },
                    },
                }),
                ..Default::default()
            },
        }
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = self.endpoint(model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini request failed: {}", e);
                BenoitError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini returned error {}: {}", status, error_text);
            return Err(BenoitError::Provider(format!(
                "Gemini returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let body = response.text().await.map_err(BenoitError::Http)?;
        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            BenoitError::Serialization(e)
        })?;

        Ok(parsed)
    }
}

#[async_trait]
impl Backend for GeminiBackend {
    async fn complete_conversation(
        &self,
        history: &[Turn],
        system_instruction: &str,
    ) -> Result<String> {
        let request = self.completion_request(history, system_instruction);

        tracing::debug!(
            "Sending Gemini completion: {} turns, model={}",
            request.contents.len(),
            self.config.chat_model
        );

        let response = self.generate(&self.config.chat_model, &request).await?;
        let text = response.text();

        tracing::debug!(
            "Gemini completion: {} candidates, {} chars",
            response.candidates.len(),
            text.len()
        );

        Ok(text)
    }

    async fn synthesize_speech(&self, text: &str) -> Result<Option<String>> {
        let request = self.speech_request(text);

        tracing::debug!(
            "Sending Gemini speech request: voice={}, model={}",
            self.config.voice,
            self.config.speech_model
        );

        let response = self.generate(&self.config.speech_model, &request).await?;
        let audio = response.inline_audio();

        if audio.is_none() {
            tracing::debug!("Gemini speech response carried no audio");
        }

        Ok(audio)
    }
}
