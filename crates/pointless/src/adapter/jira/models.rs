//! Jira REST API v3 response models.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::adf::AdfNode;

/// Issue returned by `GET /rest/api/3/issue/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct JiraIssue {
    /// Issue fields. Absent when the caller lacks permission to read them.
    #[serde(default)]
    pub fields: Option<JiraFields>,
}

/// Fields of an issue.
#[derive(Debug, Clone, Deserialize)]
pub struct JiraFields {
    /// Issue title.
    #[serde(default)]
    pub summary: Option<String>,
    /// Issue type.
    #[serde(default)]
    pub issuetype: Option<IssueType>,
    /// Rich-text description.
    #[serde(default)]
    pub description: Option<AdfNode>,
    /// Comment page.
    #[serde(default)]
    pub comment: Option<CommentPage>,
    /// Every other field, keyed by field id (custom fields live here).
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Issue type descriptor.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueType {
    /// Display name (e.g. `Story`, `Bug`).
    #[serde(default)]
    pub name: Option<String>,
}

/// Comments embedded in an issue.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentPage {
    /// Comments in creation order.
    #[serde(default)]
    pub comments: Vec<JiraComment>,
}

/// A single comment.
#[derive(Debug, Clone, Deserialize)]
pub struct JiraComment {
    /// Rich-text body.
    #[serde(default)]
    pub body: Option<AdfNode>,
}

/// Page returned by `GET /rest/api/3/field/search`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSearchPage {
    /// Matching fields on this page.
    #[serde(default)]
    pub values: Vec<FieldDefinition>,
    /// Page size used by the server.
    pub max_results: u64,
    /// Total number of matching fields.
    pub total: u64,
}

/// Field definition from field search.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDefinition {
    /// Field id (e.g. `customfield_10016`).
    pub id: String,
}

/// Jira error response body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraErrorResponse {
    /// Top-level error messages.
    #[serde(default)]
    pub error_messages: Vec<String>,
}
