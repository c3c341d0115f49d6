//! Engine construction from configuration.

use tracing::debug;

use super::engine::PointLessEngine;
use super::local::{self, LocalModel};
use super::openai::{self, OpenAiModel};
use super::LanguageModel;
use crate::config::{LlmConfig, LlmProvider};
use crate::error::{PointlessError, PointlessResult};

/// Builds a [`PointLessEngine`] for the configured provider.
///
/// Provider selection and credential checks happen here, so a misconfigured
/// backend fails before any request is made.
#[derive(Debug, Clone)]
pub struct PointLessEngineBuilder {
    config: LlmConfig,
}

impl PointLessEngineBuilder {
    /// Create a builder from config.
    pub fn new(config: LlmConfig) -> Self {
        Self { config }
    }

    fn create_llm(&self) -> PointlessResult<Box<dyn LanguageModel>> {
        match self.config.provider {
            LlmProvider::OpenAi => {
                let api_key = self
                    .config
                    .api_key
                    .as_deref()
                    .filter(|k| !k.trim().is_empty())
                    .ok_or_else(|| {
                        PointlessError::MissingCredentials("OPENAI_API_KEY not set".to_string())
                    })?;
                let model = self.config.model.as_deref().unwrap_or(openai::DEFAULT_MODEL);

                let mut llm = OpenAiModel::new(api_key, model)?
                    .with_temperature(self.config.temperature)
                    .with_structured_output(self.config.structured_output);
                if let Some(url) = &self.config.base_url {
                    llm = llm.with_base_url(url);
                }
                Ok(Box::new(llm))
            }
            LlmProvider::Local => {
                let model = self.config.model.as_deref().unwrap_or(local::DEFAULT_MODEL);
                Ok(Box::new(LocalModel::new().with_model(model)))
            }
            provider @ (LlmProvider::Anthropic | LlmProvider::Google) => Err(
                PointlessError::UnsupportedProvider(format!("{provider} support is not implemented")),
            ),
        }
    }

    /// Build the engine.
    ///
    /// # Errors
    ///
    /// Returns [`PointlessError::UnsupportedProvider`] for providers without an
    /// implementation and [`PointlessError::MissingCredentials`] when the
    /// provider needs an API key that is not set, and
    /// [`PointlessError::UnsupportedBackend`] when the model cannot produce
    /// structured output.
    pub fn build(self) -> PointlessResult<PointLessEngine> {
        let llm = self.create_llm()?;
        if !llm.supports_structured_output() {
            return Err(PointlessError::UnsupportedBackend(format!(
                "{} model {} does not support structured output",
                llm.provider(),
                llm.model()
            )));
        }
        debug!(provider = llm.provider(), model = llm.model(), "Built scoring engine");
        PointLessEngine::new(llm)
    }
}
