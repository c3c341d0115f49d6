//! Error types for story resolution and scoring.

use thiserror::Error;

use crate::models::StorySource;

/// Errors that can occur while resolving or scoring a story.
#[derive(Error, Debug)]
pub enum PointlessError {
    /// The remote issue does not exist or returned no usable document.
    #[error("Issue not found: {0}")]
    NotFound(String),

    /// The remote issue is not a Story.
    #[error("Invalid issue type: {}. Only Story type issues are supported", .0.as_deref().unwrap_or("<none>"))]
    InvalidIssueType(Option<String>),

    /// None of the discovered points fields holds a numeric value.
    #[error("No story points found for issue {0}")]
    MissingPointsField(String),

    /// The location cannot be turned into a request URL.
    #[error("Invalid story location: {0}")]
    InvalidLocation(String),

    /// No adapter is available for the location's source.
    #[error("Unsupported story source: {0}")]
    UnsupportedSource(StorySource),

    /// The model cannot guarantee structured output.
    #[error("Unsupported backend: {0}")]
    UnsupportedBackend(String),

    /// The provider identifier is unknown or not implemented.
    #[error("Unsupported LLM provider: {0}")]
    UnsupportedProvider(String),

    /// Required API credentials are missing.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// The model response does not conform to the output schema.
    #[error("Invalid model response: {0}")]
    InvalidResponse(String),

    /// Prompt template failed to render.
    #[error("Prompt rendering failed: {0}")]
    Prompt(String),

    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PointlessError {
    /// Whether this is a transport-level failure talking to the tracker or model API.
    #[must_use]
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Api { .. })
    }
}

/// Result alias used throughout the crate.
pub type PointlessResult<T> = Result<T, PointlessError>;
