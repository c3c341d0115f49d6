//! Configuration for the Jira adapter and the scoring backend.
//!
//! Both configs can be built explicitly or read from the environment:
//!
//! - `POINTLESS_PROVIDER`: `openai` (default), `anthropic`, `google`, `local`
//! - `POINTLESS_MODEL`: model identifier (provider default when unset)
//! - `POINTLESS_TEMPERATURE`: sampling temperature
//! - `OPENAI_API_KEY`: OpenAI API key
//! - `OPENAI_BASE_URL`: OpenAI-compatible endpoint (optional)
//! - `POINTLESS_STRUCTURED_OUTPUT`: `true`/`false`, overrides the built-in
//!   structured output model list
//! - `JIRA_URL`: Jira instance URL (e.g., `https://your-domain.atlassian.net`)
//! - `JIRA_BASIC_AUTH`: `email:api-token`, sent as a `Basic` header
//! - `JIRA_TOKEN`: OAuth access token, sent as a `Bearer` header
//! - `JIRA_PAGE_CONCURRENCY`: field search pages fetched at once (default 4)

use std::env;
use std::str::FromStr;

use base64::Engine as _;

use crate::error::PointlessError;

/// Default number of field search pages fetched concurrently.
pub const DEFAULT_PAGE_CONCURRENCY: usize = 4;

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    /// OpenAI chat completions.
    #[default]
    OpenAi,
    /// Anthropic messages API (not implemented).
    Anthropic,
    /// Google Gemini (not implemented).
    Google,
    /// Deterministic offline stub.
    Local,
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Anthropic => write!(f, "anthropic"),
            Self::Google => write!(f, "google"),
            Self::Local => write!(f, "local"),
        }
    }
}

impl FromStr for LlmProvider {
    type Err = PointlessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "google" => Ok(Self::Google),
            "local" => Ok(Self::Local),
            other => Err(PointlessError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Scoring backend configuration.
#[derive(Clone, Default)]
pub struct LlmConfig {
    /// Backend provider.
    pub provider: LlmProvider,
    /// API key for the provider.
    pub api_key: Option<String>,
    /// Model identifier; provider default when unset.
    pub model: Option<String>,
    /// Custom API endpoint.
    pub base_url: Option<String>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Whether the model supports structured output; detected from the
    /// model identifier when unset.
    pub structured_output: Option<bool>,
}

impl LlmConfig {
    /// Config for a provider with no credentials set.
    pub fn new(provider: LlmProvider) -> Self {
        Self {
            provider,
            ..Self::default()
        }
    }

    /// Config for the OpenAI provider.
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new(LlmProvider::OpenAi).with_api_key(api_key)
    }

    /// Config for the offline stub.
    pub fn local() -> Self {
        Self::new(LlmProvider::Local)
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set a custom API endpoint.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Declare whether the model supports structured output.
    pub fn with_structured_output(mut self, supported: bool) -> Self {
        self.structured_output = Some(supported);
        self
    }

    /// Read the config from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`PointlessError::UnsupportedProvider`] if `POINTLESS_PROVIDER`
    /// names an unknown provider.
    pub fn from_env() -> Result<Self, PointlessError> {
        let provider = env::var("POINTLESS_PROVIDER")
            .ok()
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<LlmProvider>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            provider,
            api_key: env::var("OPENAI_API_KEY").ok().filter(|s| !s.is_empty()),
            model: env::var("POINTLESS_MODEL").ok().filter(|s| !s.is_empty()),
            base_url: env::var("OPENAI_BASE_URL").ok().filter(|s| !s.is_empty()),
            temperature: env::var("POINTLESS_TEMPERATURE")
                .ok()
                .and_then(|s| s.parse().ok()),
            structured_output: env::var("POINTLESS_STRUCTURED_OUTPUT")
                .ok()
                .and_then(|s| s.trim().to_lowercase().parse::<bool>().ok()),
        })
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("structured_output", &self.structured_output)
            .finish()
    }
}

/// Jira adapter configuration.
///
/// These are defaults; a story location may carry its own URL and
/// authorization, which take precedence.
#[derive(Clone)]
pub struct JiraConfig {
    /// Jira instance URL.
    pub base_url: Option<String>,
    /// Full `Authorization` header value.
    pub authorization: Option<String>,
    /// Field search pages fetched at once.
    pub page_concurrency: usize,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            authorization: None,
            page_concurrency: DEFAULT_PAGE_CONCURRENCY,
        }
    }
}

impl JiraConfig {
    /// Config for a Jira instance URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Self::default()
        }
    }

    /// Use a raw `Authorization` header value.
    pub fn with_authorization(mut self, authorization: impl Into<String>) -> Self {
        self.authorization = Some(authorization.into());
        self
    }

    /// Use basic auth with an account email and API token.
    pub fn with_basic_auth(self, email: &str, api_token: &str) -> Self {
        self.with_authorization(basic_auth_header(&format!("{email}:{api_token}")))
    }

    /// Use an OAuth access token.
    pub fn with_bearer_token(self, token: &str) -> Self {
        self.with_authorization(format!("Bearer {token}"))
    }

    /// Read the config from the environment.
    pub fn from_env() -> Self {
        let authorization = env::var("JIRA_BASIC_AUTH")
            .ok()
            .filter(|s| !s.is_empty())
            .map(|credentials| basic_auth_header(&credentials))
            .or_else(|| {
                env::var("JIRA_TOKEN")
                    .ok()
                    .filter(|s| !s.is_empty())
                    .map(|token| format!("Bearer {token}"))
            });

        Self {
            base_url: env::var("JIRA_URL").ok().filter(|s| !s.is_empty()),
            authorization,
            page_concurrency: env::var("JIRA_PAGE_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_PAGE_CONCURRENCY),
        }
    }
}

impl std::fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraConfig")
            .field("base_url", &self.base_url)
            .field(
                "authorization",
                &self.authorization.as_ref().map(|_| "<redacted>"),
            )
            .field("page_concurrency", &self.page_concurrency)
            .finish()
    }
}

fn basic_auth_header(credentials: &str) -> String {
    format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode(credentials)
    )
}
