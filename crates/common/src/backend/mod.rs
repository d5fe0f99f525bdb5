//! Generative answer backend abstraction
//!
//! Provides a unified interface over the optional completion backend:
//! - OpenAI-compatible chat completions
//! - Null backend for deployments without a generative model
//!
//! The implementation is selected once at construction time; callers branch
//! on `is_configured()` instead of inspecting concrete types.

use crate::config::BackendConfig;
use crate::errors::{EngineError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Trait for answer completion
#[async_trait]
pub trait AnswerBackend: Send + Sync {
    /// Request a completion for the given prompts
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String>;

    /// Get the model name
    fn model_name(&self) -> &str;

    /// Whether a live backend is behind this handle
    fn is_configured(&self) -> bool {
        true
    }
}

/// OpenAI-compatible chat completion client
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

impl OpenAiBackend {
    /// Create a new OpenAI-compatible backend
    pub fn new(
        api_key: String,
        model: String,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url: base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
        })
    }
}

#[async_trait]
impl AnswerBackend for OpenAiBackend {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            max_tokens,
            temperature,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| EngineError::backend(format!("Completion request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::backend(format!("API error {}: {}", status, body)));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| EngineError::backend(format!("Failed to parse completion: {}", e)))?;

        chat_response
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| EngineError::backend("Empty response from backend"))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Absent-backend implementation
///
/// Every completion reports unavailability so the synthesizer takes its
/// extractive path.
pub struct NullBackend;

#[async_trait]
impl AnswerBackend for NullBackend {
    async fn complete(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<String> {
        Err(EngineError::BackendUnavailable)
    }

    fn model_name(&self) -> &str {
        "none"
    }

    fn is_configured(&self) -> bool {
        false
    }
}

/// Create a backend from configuration
pub fn create_backend(config: &BackendConfig) -> Arc<dyn AnswerBackend> {
    match config.provider.as_str() {
        "openai" => match config.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => {
                match OpenAiBackend::new(
                    key.to_string(),
                    config.model.clone(),
                    config.api_base.clone(),
                    config.timeout(),
                ) {
                    Ok(backend) => Arc::new(backend),
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            "Failed to build OpenAI backend, falling back to extractive synthesis"
                        );
                        Arc::new(NullBackend)
                    }
                }
            }
            None => {
                tracing::warn!("No backend API key configured, falling back to extractive synthesis");
                Arc::new(NullBackend)
            }
        },
        "none" => Arc::new(NullBackend),
        other => {
            tracing::warn!(provider = other, "Unknown backend provider, using null backend");
            Arc::new(NullBackend)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_backend_reports_unavailable() {
        let backend = NullBackend;
        let result = backend.complete("system", "user", 100, 0.1).await;
        assert!(matches!(result, Err(EngineError::BackendUnavailable)));
        assert!(!backend.is_configured());
    }

    #[test]
    fn test_create_backend_without_key_is_null() {
        let config = BackendConfig::default();
        let backend = create_backend(&config);
        assert!(!backend.is_configured());
        assert_eq!(backend.model_name(), "none");
    }

    #[test]
    fn test_create_backend_with_key_is_live() {
        let config = BackendConfig {
            api_key: Some("sk-test".to_string()),
            ..BackendConfig::default()
        };
        let backend = create_backend(&config);
        assert!(backend.is_configured());
        assert_eq!(backend.model_name(), "gpt-4-turbo-preview");
    }

    #[test]
    fn test_create_backend_none_provider() {
        let config = BackendConfig {
            provider: "none".to_string(),
            api_key: Some("sk-test".to_string()),
            ..BackendConfig::default()
        };
        let backend = create_backend(&config);
        assert!(!backend.is_configured());
    }
}
