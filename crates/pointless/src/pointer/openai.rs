//! OpenAI chat completions language model.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use super::schema::OutputSchema;
use super::LanguageModel;
use crate::error::{PointlessError, PointlessResult};

/// OpenAI API endpoint
const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Model families that accept a `json_schema` response format. A family
/// matches its own name and any `-` suffixed variant or dated snapshot.
const STRUCTURED_OUTPUT_MODELS: &[&str] = &[
    "gpt-4o",
    "gpt-4o-mini",
    "gpt-4.1",
    "gpt-4.5",
    "gpt-5",
    "o1",
    "o3",
    "o4-mini",
];

/// Variants inside those families that reject `json_schema`.
const UNSTRUCTURED_VARIANTS: &[&str] = &[
    "gpt-4o-2024-05-13",
    "gpt-4o-audio-preview",
    "gpt-4o-mini-audio-preview",
    "gpt-4o-realtime-preview",
    "gpt-4o-mini-realtime-preview",
    "gpt-4o-search-preview",
    "gpt-4o-mini-search-preview",
    "o1-mini",
    "o1-preview",
];

fn in_family(model: &str, family: &str) -> bool {
    model == family
        || model
            .strip_prefix(family)
            .is_some_and(|rest| rest.starts_with('-'))
}

/// Whether a model identifier is known to support structured output.
pub fn model_supports_structured_output(model: &str) -> bool {
    STRUCTURED_OUTPUT_MODELS.iter().any(|f| in_family(model, f))
        && !UNSTRUCTURED_VARIANTS.iter().any(|v| in_family(model, v))
}

/// OpenAI API request message
#[derive(Debug, Serialize)]
struct OpenAIMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Schema constraint for structured output
#[derive(Debug, Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    strict: bool,
    schema: &'a Value,
}

/// OpenAI API response format
#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    format_type: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

/// OpenAI API request
#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    response_format: ResponseFormat<'a>,
}

/// OpenAI API response choice message
#[derive(Debug, Deserialize)]
struct OpenAIChoiceMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

/// OpenAI API response choice
#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIChoiceMessage,
}

/// OpenAI API response
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

/// OpenAI API error
#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
}

/// OpenAI API error response
#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

/// OpenAI GPT language model.
#[derive(Clone)]
pub struct OpenAiModel {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: Option<f32>,
    structured_output: Option<bool>,
}

impl OpenAiModel {
    /// Create a new OpenAI model.
    ///
    /// # Errors
    ///
    /// Returns [`PointlessError::MissingCredentials`] if the API key is blank,
    /// or an HTTP error if the client cannot be built.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> PointlessResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(PointlessError::MissingCredentials(
                "OPENAI_API_KEY not set".to_string(),
            ));
        }

        let client = Client::builder()
            .user_agent(concat!("pointless/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model: model.into(),
            base_url: OPENAI_API_URL.to_string(),
            temperature: None,
            structured_output: None,
        })
    }

    /// Set a custom base URL (useful for Azure OpenAI or proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Override structured output detection, e.g. for models newer than the
    /// built-in list or served by a compatible endpoint.
    pub fn with_structured_output(mut self, supported: Option<bool>) -> Self {
        self.structured_output = supported;
        self
    }
}

impl std::fmt::Debug for OpenAiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiModel")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("structured_output", &self.structured_output)
            .finish_non_exhaustive()
    }
}

/// Parse message content as JSON, tolerating a markdown code fence.
fn parse_content(content: &str) -> PointlessResult<Value> {
    let text = content.trim();
    let json_text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .map_or(text, str::trim);

    serde_json::from_str(json_text).map_err(|e| {
        PointlessError::InvalidResponse(format!("response is not JSON: {e}. Response: {text}"))
    })
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    fn provider(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn supports_structured_output(&self) -> bool {
        self.structured_output
            .unwrap_or_else(|| model_supports_structured_output(&self.model))
    }

    #[instrument(skip_all, fields(schema = schema.name()))]
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &OutputSchema,
    ) -> PointlessResult<Value> {
        let request = OpenAIRequest {
            model: &self.model,
            messages: vec![OpenAIMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            response_format: ResponseFormat {
                format_type: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: schema.name(),
                    strict: true,
                    schema: schema.schema(),
                },
            },
        };

        debug!(url = %self.base_url, model = %self.model, "Making OpenAI API request");
        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<OpenAIErrorResponse>(&body)
                .map_or(body, |e| e.error.message);
            return Err(PointlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let api_response: OpenAIResponse = serde_json::from_str(&body)?;
        let message = api_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| PointlessError::InvalidResponse("no choices returned".to_string()))?;

        if let Some(refusal) = message.refusal {
            return Err(PointlessError::InvalidResponse(format!(
                "model refused: {refusal}"
            )));
        }

        let content = message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| PointlessError::InvalidResponse("empty response content".to_string()))?;

        parse_content(&content)
    }
}
