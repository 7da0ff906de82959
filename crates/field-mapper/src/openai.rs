use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use applypilot_core_types::FieldMapping;

use crate::errors::MapperError;
use crate::json::extract_json_array;
use crate::model::MappingRequest;
use crate::prompt;
use crate::provider::FieldMapper;

#[derive(Clone, Debug)]
pub struct OpenAiMapperConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for OpenAiMapperConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            temperature: 0.1,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Chat-completions-backed mapper: one request/response exchange per
/// page/step. Any failure surfaces as `MapperError` so the caller can fall
/// back to rules; nothing here retries.
#[derive(Debug)]
pub struct OpenAiFieldMapper {
    client: Client,
    config: OpenAiMapperConfig,
}

impl OpenAiFieldMapper {
    pub fn new(config: OpenAiMapperConfig) -> Result<Self, MapperError> {
        if config.api_key.trim().is_empty() {
            return Err(MapperError::Unavailable("missing API key".into()));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| MapperError::Http(err.to_string()))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl FieldMapper for OpenAiFieldMapper {
    async fn map_fields(&self, request: &MappingRequest) -> Result<Vec<FieldMapping>, MapperError> {
        let url = format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        );
        let body = ChatCompletionRequest {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: prompt::SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt::build_user_prompt(request),
                },
            ],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| MapperError::Http(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<response unavailable>".to_string());
            return Err(MapperError::Http(format!("collaborator returned {status}: {text}")));
        }

        let response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| MapperError::Parse(err.to_string()))?;
        let content = response
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .ok_or_else(|| MapperError::Parse("response missing content".into()))?;

        let json_string = extract_json_array(&content)
            .ok_or_else(|| MapperError::Parse("response contains no JSON array".into()))?;
        let raw: Vec<RawMapping> = serde_json::from_str(&json_string)
            .map_err(|err| MapperError::Parse(format!("mapping array invalid: {err}")))?;

        // Drop anything pointing outside the supplied descriptor list.
        let mut mappings = Vec::with_capacity(raw.len());
        for item in raw {
            if !request.contains_index(item.field_index) {
                warn!(field_index = item.field_index, "mapper invented a field index, dropped");
                continue;
            }
            mappings.push(FieldMapping {
                field_index: item.field_index,
                field_name: item.field_name.unwrap_or_default(),
                value: item.value,
                rationale: item.rationale.unwrap_or_default(),
            });
        }
        debug!(count = mappings.len(), "LLM mapping accepted");
        Ok(mappings)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    content: String,
}

/// Tolerant wire shape for one mapping element.
#[derive(Debug, Deserialize)]
struct RawMapping {
    field_index: usize,
    #[serde(default)]
    field_name: Option<String>,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    rationale: Option<String>,
}
