//! Story model shared by the adapters, the scoring backend and the orchestrator.

use serde::{Deserialize, Serialize};

/// Title rendered for stories without one.
pub const UNTITLED: &str = "Untitled";

/// A story to be estimated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Story {
    /// Optional short title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Full textual description
    pub content: String,
}

impl Story {
    /// Create a story with a title.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: content.into(),
        }
    }

    /// Create a story with content only.
    pub fn untitled(content: impl Into<String>) -> Self {
        Self {
            title: None,
            content: content.into(),
        }
    }

    /// Title for display, falling back to [`UNTITLED`] when missing or empty.
    pub fn display_title(&self) -> &str {
        display_title(self.title.as_deref())
    }

    /// Attach a point value, producing a reference story.
    pub fn with_points(self, points: f64) -> ReferenceStory {
        ReferenceStory {
            title: self.title,
            content: self.content,
            points,
        }
    }
}

/// A story with a known point value, used as a calibration example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceStory {
    /// Optional short title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Full textual description
    pub content: String,
    /// Ground-truth points
    pub points: f64,
}

impl ReferenceStory {
    /// Create a reference story.
    pub fn new(title: impl Into<String>, content: impl Into<String>, points: f64) -> Self {
        Self {
            title: Some(title.into()),
            content: content.into(),
            points,
        }
    }

    /// Title for display, falling back to [`UNTITLED`] when missing or empty.
    pub fn display_title(&self) -> &str {
        display_title(self.title.as_deref())
    }
}

fn display_title(title: Option<&str>) -> &str {
    match title {
        Some(t) if !t.is_empty() => t,
        _ => UNTITLED,
    }
}

/// External system a story lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorySource {
    /// Atlassian Jira
    Jira,
    /// GitHub issues
    Github,
}

impl std::fmt::Display for StorySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jira => write!(f, "jira"),
            Self::Github => write!(f, "github"),
        }
    }
}

/// Pointer to a story stored in an external tracker.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoryLocation {
    /// Tracker holding the story
    pub source: StorySource,
    /// Tracker-native identifier (e.g. `SCRUM-1`)
    pub issue: String,
    /// Tracker base URL (e.g. `https://your-domain.atlassian.net`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Full `Authorization` header value (e.g. `Basic ...` or `Bearer ...`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<String>,
}

impl StoryLocation {
    /// Location of a Jira issue using the adapter's default URL and credentials.
    pub fn jira(issue: impl Into<String>) -> Self {
        Self {
            source: StorySource::Jira,
            issue: issue.into(),
            url: None,
            authorization: None,
        }
    }
}

// Manual impl so credentials never end up in logs.
impl std::fmt::Debug for StoryLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryLocation")
            .field("source", &self.source)
            .field("issue", &self.issue)
            .field("url", &self.url)
            .field(
                "authorization",
                &self.authorization.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Either inline story content or a location that must be fetched.
///
/// On the wire an object with a `source` key is a location; inline stories
/// reject unknown fields, so a stray `source` can never be read as content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoryInput<T> {
    /// Story stored in an external tracker
    Remote(StoryLocation),
    /// Story content supplied directly
    Inline(T),
}

impl<T> StoryInput<T> {
    /// Whether resolving this input requires a remote fetch.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl From<Story> for StoryInput<Story> {
    fn from(story: Story) -> Self {
        Self::Inline(story)
    }
}

impl From<ReferenceStory> for StoryInput<ReferenceStory> {
    fn from(story: ReferenceStory) -> Self {
        Self::Inline(story)
    }
}

impl<T> From<StoryLocation> for StoryInput<T> {
    fn from(location: StoryLocation) -> Self {
        Self::Remote(location)
    }
}

/// Request before resolution: any story may still be a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointLessRequest {
    /// Story to estimate
    pub story: StoryInput<Story>,
    /// Calibration examples
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_stories: Option<Vec<StoryInput<ReferenceStory>>>,
    /// Free-form guidance passed through to the scoring backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,
}

impl PointLessRequest {
    /// Create a request for a single story without references.
    pub fn new(story: impl Into<StoryInput<Story>>) -> Self {
        Self {
            story: story.into(),
            reference_stories: None,
            custom_instructions: None,
        }
    }

    /// Add a reference story or location.
    pub fn with_reference(mut self, reference: impl Into<StoryInput<ReferenceStory>>) -> Self {
        self.reference_stories
            .get_or_insert_with(Vec::new)
            .push(reference.into());
        self
    }

    /// Set custom instructions.
    pub fn with_custom_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.custom_instructions = Some(instructions.into());
        self
    }
}

/// Fully resolved request, as received by the scoring backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerRequest {
    /// Story to estimate
    pub story: Story,
    /// Calibration examples, in input order
    #[serde(default)]
    pub reference_stories: Vec<ReferenceStory>,
    /// Free-form guidance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,
}

/// Points decision returned by the scoring backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerResponse {
    /// Non-negative estimate
    pub points: f64,
    /// Justification for the estimate
    pub explanation: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_location_is_discriminated_by_source() {
        let input: StoryInput<Story> =
            serde_json::from_value(json!({"source": "jira", "issue": "SCRUM-1"})).unwrap();
        assert_eq!(input, StoryInput::Remote(StoryLocation::jira("SCRUM-1")));

        let input: StoryInput<Story> =
            serde_json::from_value(json!({"title": "X", "content": "Fix typo"})).unwrap();
        assert_eq!(input, StoryInput::Inline(Story::new("X", "Fix typo")));
    }

    #[test]
    fn test_inline_story_with_source_key_is_rejected() {
        let result: Result<StoryInput<Story>, _> =
            serde_json::from_value(json!({"content": "Fix typo", "source": "jira"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_source_is_rejected() {
        let result: Result<StoryInput<Story>, _> =
            serde_json::from_value(json!({"source": "gitlab", "issue": "1"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_request_uses_camel_case_wire_names() {
        let request: PointLessRequest = serde_json::from_value(json!({
            "story": {"source": "jira", "issue": "SCRUM-2", "url": "https://example.atlassian.net"},
            "referenceStories": [
                {"title": "Simple fix", "content": "Typo", "points": 1},
                {"source": "jira", "issue": "SCRUM-9"}
            ],
            "customInstructions": "Use fibonacci"
        }))
        .unwrap();

        assert!(request.story.is_remote());
        let references = request.reference_stories.unwrap();
        assert_eq!(
            references[0],
            StoryInput::Inline(ReferenceStory::new("Simple fix", "Typo", 1.0))
        );
        assert!(references[1].is_remote());
        assert_eq!(request.custom_instructions.as_deref(), Some("Use fibonacci"));
    }

    #[test]
    fn test_display_title_fallback() {
        assert_eq!(Story::untitled("body").display_title(), "Untitled");
        assert_eq!(Story::new("", "body").display_title(), "Untitled");
        assert_eq!(Story::new("Login", "body").display_title(), "Login");
    }

    #[test]
    fn test_location_debug_redacts_authorization() {
        let location = StoryLocation {
            authorization: Some("Bearer secret-token".to_string()),
            ..StoryLocation::jira("SCRUM-1")
        };
        let rendered = format!("{location:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<redacted>"));
    }
}
