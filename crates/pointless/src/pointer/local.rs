//! Deterministic offline language model.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::schema::OutputSchema;
use super::LanguageModel;
use crate::error::PointlessResult;
use crate::models::PointerResponse;

/// Model name reported when none is configured.
pub const DEFAULT_MODEL: &str = "local";

/// Language model that always returns the same decision.
///
/// Makes no network calls; intended for tests and offline development.
#[derive(Debug, Clone)]
pub struct LocalModel {
    model: String,
    response: PointerResponse,
}

impl LocalModel {
    /// Create a stub returning the default decision.
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            response: default_response(),
        }
    }

    /// Report a different model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Return a different fixed decision.
    pub fn with_response(mut self, response: PointerResponse) -> Self {
        self.response = response;
        self
    }
}

impl Default for LocalModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Decision returned by [`LocalModel::new`].
pub fn default_response() -> PointerResponse {
    PointerResponse {
        points: 1.0,
        explanation: "Local estimate: no language model was consulted.".to_string(),
    }
}

#[async_trait]
impl LanguageModel for LocalModel {
    fn provider(&self) -> &'static str {
        "local"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn supports_structured_output(&self) -> bool {
        true
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &OutputSchema,
    ) -> PointlessResult<Value> {
        debug!(
            prompt_len = prompt.len(),
            schema = schema.name(),
            "Returning fixed local decision"
        );
        Ok(serde_json::to_value(&self.response)?)
    }
}
