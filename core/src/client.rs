use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::GeminiConfig;
use crate::errors::{GeminiError, GeminiResult};
use crate::types::*;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// The single seam through which the tutor talks to a generative model.
///
/// Implementations receive a fully built prompt and return the model's raw text.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Complete a prompt and return the raw model text
    async fn complete(&self, prompt: &str) -> GeminiResult<String>;

    /// Get the model name being used (for logging/debugging)
    fn model_name(&self) -> String;
}

/// Type alias for Arc-wrapped gateway trait objects
pub type ModelGatewayRef = Arc<dyn ModelGateway>;

/// Client for interacting with the Gemini API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new Gemini API client.
    ///
    /// A missing API key does not fail construction; every call reports
    /// [`GeminiError::MissingCredentials`] instead.
    pub fn new(config: GeminiConfig) -> GeminiResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| GeminiError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Get the generateContent endpoint URL
    fn get_base_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url(),
            self.config.model()
        )
    }

    /// Builds a single-turn request carrying the fixed sampling and safety configuration.
    pub fn create_request(&self, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            safety_settings: self.config.safety_settings(),
            generation_config: Some(self.config.generation_config()),
        }
    }

    /// Generate content using the Gemini API
    pub async fn generate_content(
        &self,
        request: GenerateContentRequest,
    ) -> GeminiResult<GenerateContentResponse> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(GeminiError::MissingCredentials)?;

        // The key travels in a header so it never shows up in a request URL.
        let response = self
            .client
            .post(self.get_base_url())
            .header(API_KEY_HEADER, api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                GeminiError::RequestError(format!("Failed to send request: {}", e.without_url()))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            GeminiError::ResponseError(format!("Failed to read response: {}", e.without_url()))
        })?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_error) => format!(
                    "{} (status: {})",
                    api_error.error.message, api_error.error.status
                ),
                Err(_) => body,
            };
            return Err(GeminiError::HttpError {
                status_code: status.as_u16(),
                message,
            });
        }

        serde_json::from_str::<GenerateContentResponse>(&body)
            .map_err(|e| GeminiError::ParsingError(format!("Failed to parse response: {}", e)))
    }

    /// Helper method to extract text from a response
    pub fn extract_text_from_response(
        &self,
        response: &GenerateContentResponse,
    ) -> GeminiResult<String> {
        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_ref())
        {
            return Err(GeminiError::SafetyBlocked(reason.clone()));
        }

        let candidate = response.candidates.first().ok_or_else(|| {
            GeminiError::ResponseError("No candidates in response".to_string())
        })?;

        let text: String = candidate
            .content
            .iter()
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| part.text.as_deref())
            .collect();

        match candidate.finish_reason.as_deref() {
            Some("SAFETY") | Some("PROHIBITED_CONTENT") | Some("BLOCKLIST") if text.is_empty() => {
                return Err(GeminiError::SafetyBlocked(
                    candidate.finish_reason.clone().unwrap_or_default(),
                ));
            }
            Some(reason) if reason != "STOP" => {
                warn!(finish_reason = reason, "Gemini generation did not finish cleanly");
            }
            _ => {}
        }

        if text.is_empty() {
            return Err(GeminiError::ResponseError("No text in response".to_string()));
        }

        Ok(text)
    }
}

#[async_trait]
impl ModelGateway for GeminiClient {
    async fn complete(&self, prompt: &str) -> GeminiResult<String> {
        debug!(
            model = self.config.model(),
            prompt_len = prompt.len(),
            "Sending prompt to Gemini"
        );

        let request = self.create_request(prompt);
        let response = self.generate_content(request).await?;

        if let Some(usage) = &response.usage_metadata {
            debug!(
                prompt_tokens = usage.prompt_token_count,
                response_tokens = usage.candidates_token_count,
                total_tokens = usage.total_token_count,
                "Gemini token usage"
            );
        }

        self.extract_text_from_response(&response)
    }

    fn model_name(&self) -> String {
        self.config.model().to_string()
    }
}
