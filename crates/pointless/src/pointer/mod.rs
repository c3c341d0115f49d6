//! Scoring backends.
//!
//! A [`Pointer`] turns a fully resolved [`PointerRequest`] into a
//! [`PointerResponse`]. The provided implementation, [`PointLessEngine`],
//! builds a prompt from the reference stories and asks a [`LanguageModel`]
//! for output constrained to a fixed schema.
//!
//! Language models:
//!
//! - **OpenAI** - chat completions with `json_schema` response format
//! - **Local** - deterministic stub for tests and offline development

pub mod builder;
pub mod engine;
pub mod local;
pub mod openai;
pub mod prompt;
pub mod schema;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::PointlessResult;
use crate::models::{PointerRequest, PointerResponse};

pub use builder::PointLessEngineBuilder;
pub use engine::PointLessEngine;
pub use local::LocalModel;
pub use openai::OpenAiModel;
pub use prompt::PromptBuilder;
pub use schema::OutputSchema;

/// Trait for scoring backends.
#[async_trait]
pub trait Pointer: Send + Sync {
    /// Estimate points for the request's story.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot produce a schema-conforming decision.
    async fn point(&self, request: PointerRequest) -> PointlessResult<PointerResponse>;
}

/// Trait for language models used by [`PointLessEngine`].
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Provider name (e.g., "openai", "local").
    fn provider(&self) -> &'static str;

    /// Model identifier.
    fn model(&self) -> &str;

    /// Whether the model can be constrained to a JSON schema.
    fn supports_structured_output(&self) -> bool;

    /// Generate a JSON value conforming to `schema`.
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &OutputSchema,
    ) -> PointlessResult<Value>;
}
