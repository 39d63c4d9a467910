use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{Lang, language_name};
use crate::error::{Error, Result};
use super::traits::{ProviderInfo, ProviderTranslation, TranslationProvider};

/// OpenAI-compatible API translation provider
/// Works with: llama.cpp server, Ollama, DeepSeek, OpenAI, etc.
///
/// Issues a single chat-completions request per call; the chunk
/// translator owns retries.
pub struct OpenAiProvider {
    client: Client,
    /// Base URL for the API (e.g., "http://localhost:8080/v1")
    pub api_base: String,
    /// Optional API key for authentication
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OpenAiProvider {
    /// Create a new OpenAI-compatible provider.
    ///
    /// # Panics
    /// Panics if the HTTP client cannot be created, which should only happen
    /// in extreme circumstances (e.g., TLS backend unavailable on the system).
    #[allow(clippy::expect_used)]
    pub fn new(api_base: String, api_key: Option<String>, model: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_base,
            api_key,
            model,
        }
    }

    /// Create translation prompt
    fn create_prompt(text: &str, source: &Lang, target: &Lang) -> String {
        let source_hint = if source.as_str() == "auto" {
            String::new()
        } else {
            format!(" from {}", language_name(source))
        };
        format!(
            "Translate the following text{} into {}. Output only the translation, no explanations.\n\nText: \"{}\"",
            source_hint,
            language_name(target),
            text
        )
    }

    /// Make one API request and classify the outcome
    async fn request(&self, text: &str, source: &Lang, target: &Lang) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let prompt = Self::create_prompt(text, source, target);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt,
            }],
            temperature: Some(0.3), // Lower temperature for more consistent translations
            max_tokens: None,
        };

        debug!("Translation request to {}", url);

        let mut req = self.client.post(&url).json(&request);

        // Add API key if configured
        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }

        let response = match req.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Request failed: {}", e);
                if e.is_timeout() {
                    return Err(Error::ProviderTimeout);
                }
                return Err(Error::ProviderRequest(e.to_string()));
            }
        };

        if response.status().as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());

            warn!("Rate limited, retry after {:?}s", retry_after);
            return Err(Error::ProviderRateLimited { retry_after });
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("API error: {} - {}", status, body);
            return Err(Error::ProviderRequest(format!("HTTP {status}: {body}")));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse response: {}", e);
            Error::ProviderInvalidResponse(e.to_string())
        })?;

        let Some(choice) = chat_response.choices.first() else {
            return Err(Error::ProviderInvalidResponse(
                "No choices in response".to_string(),
            ));
        };

        let translated = choice.message.content.trim();
        // Remove quotes if the model wrapped the response
        let translated = translated
            .trim_start_matches('"')
            .trim_end_matches('"')
            .to_string();
        Ok(translated)
    }
}

#[async_trait]
impl TranslationProvider for OpenAiProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "OpenAI Compatible",
            requires_api_key: false, // Optional for local servers
            supports_auto_detect: true,
        }
    }

    async fn translate(
        &self,
        text: &str,
        source: &Lang,
        target: &Lang,
    ) -> Result<ProviderTranslation> {
        let translated = self.request(text, source, target).await?;

        Ok(ProviderTranslation {
            text: translated,
            // Chat completions do not report the detected source language
            detected_source_lang: None,
        })
    }
}
