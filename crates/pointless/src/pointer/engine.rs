//! Prompt-driven scoring engine.

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::prompt::PromptBuilder;
use super::schema::OutputSchema;
use super::{LanguageModel, Pointer};
use crate::error::{PointlessError, PointlessResult};
use crate::models::{PointerRequest, PointerResponse};

/// Scores stories by asking a language model for a schema-constrained decision.
pub struct PointLessEngine {
    llm: Box<dyn LanguageModel>,
    prompt: PromptBuilder,
    schema: OutputSchema,
}

impl PointLessEngine {
    /// Create an engine around a language model.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt template or output schema fail to compile.
    pub fn new(llm: Box<dyn LanguageModel>) -> PointlessResult<Self> {
        Ok(Self {
            llm,
            prompt: PromptBuilder::new()?,
            schema: OutputSchema::pointer_response()?,
        })
    }

    /// Provider of the underlying model.
    pub fn provider(&self) -> &'static str {
        self.llm.provider()
    }

    /// Identifier of the underlying model.
    pub fn model(&self) -> &str {
        self.llm.model()
    }
}

impl std::fmt::Debug for PointLessEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointLessEngine")
            .field("provider", &self.llm.provider())
            .field("model", &self.llm.model())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Pointer for PointLessEngine {
    #[instrument(skip_all, fields(references = request.reference_stories.len()))]
    async fn point(&self, request: PointerRequest) -> PointlessResult<PointerResponse> {
        if !self.llm.supports_structured_output() {
            return Err(PointlessError::UnsupportedBackend(format!(
                "{} model {} does not support structured output",
                self.llm.provider(),
                self.llm.model()
            )));
        }

        let prompt = self.prompt.build(&request)?;
        debug!(
            provider = self.llm.provider(),
            model = self.llm.model(),
            prompt_len = prompt.len(),
            "Built point prompt"
        );

        let value = self.llm.generate_structured(&prompt, &self.schema).await?;
        let response = self.schema.parse(value)?;

        info!(points = response.points, "Story pointed");
        Ok(response)
    }
}
