//! Jira REST API client.

use async_trait::async_trait;
use futures::{stream, StreamExt, TryStreamExt};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::adf::extract_text;
use super::models::{FieldSearchPage, JiraErrorResponse, JiraFields, JiraIssue};
use crate::adapter::StorySourceAdapter;
use crate::config::JiraConfig;
use crate::error::{PointlessError, PointlessResult};
use crate::models::{ReferenceStory, Story, StoryLocation, StorySource};

const API_PATH: [&str; 3] = ["rest", "api", "3"];
const ISSUE_SEGMENT: &str = "issue";
const FIELD_SEARCH_SEGMENTS: [&str; 2] = ["field", "search"];

/// Field search query used to discover points fields.
const POINTS_FIELD_QUERY: &str = "point";

/// Only issues of this type can be estimated.
const STORY_ISSUE_TYPE: &str = "story";

/// Jira issue adapter.
///
/// Holds a single HTTP client so connections are reused across calls.
#[derive(Debug, Clone)]
pub struct JiraAdapter {
    client: Client,
    config: JiraConfig,
}

/// Where and how a single call reaches Jira.
struct Target<'a> {
    base_url: &'a str,
    authorization: Option<&'a str>,
}

impl JiraAdapter {
    /// Create a new Jira adapter.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: JiraConfig) -> PointlessResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("pointless/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    /// Resolve base URL and credentials, preferring the location's own.
    fn target<'a>(&'a self, location: &'a StoryLocation) -> PointlessResult<Target<'a>> {
        if location.source != StorySource::Jira {
            return Err(PointlessError::UnsupportedSource(location.source));
        }

        let base_url = location
            .url
            .as_deref()
            .or(self.config.base_url.as_deref())
            .ok_or_else(|| {
                PointlessError::MissingCredentials(format!(
                    "no Jira URL configured for {}",
                    location.issue
                ))
            })?;

        let authorization = location
            .authorization
            .as_deref()
            .or(self.config.authorization.as_deref());

        Ok(Target {
            base_url,
            authorization,
        })
    }

    /// Build `{base}/rest/api/3/{segments...}`, encoding each segment.
    fn api_url(target: &Target<'_>, segments: &[&str]) -> PointlessResult<Url> {
        let mut url = Url::parse(target.base_url).map_err(|e| {
            PointlessError::InvalidLocation(format!("bad Jira URL {}: {e}", target.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                PointlessError::InvalidLocation(format!("bad Jira URL {}", target.base_url))
            })?
            .pop_if_empty()
            .extend(API_PATH)
            .extend(segments);
        Ok(url)
    }

    /// Make a GET request to the Jira API.
    ///
    /// Every non-success status is an [`PointlessError::Api`] error; callers
    /// decide what a 404 means for their endpoint.
    async fn get<T>(
        &self,
        target: &Target<'_>,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> PointlessResult<T>
    where
        T: DeserializeOwned,
    {
        let url = Self::api_url(target, segments)?;
        debug!(url = %url, "Making Jira API request");

        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .query(query);
        if let Some(authorization) = target.authorization {
            request = request.header(AUTHORIZATION, authorization);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<JiraErrorResponse>(&error_text)
                .ok()
                .filter(|e| !e.error_messages.is_empty())
                .map_or(error_text, |e| e.error_messages.join("; "));
            return Err(PointlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(PointlessError::Serialization)
    }

    /// Fetch an issue and check it is a story.
    async fn fetch_issue(&self, location: &StoryLocation) -> PointlessResult<JiraFields> {
        let target = self.target(location)?;
        let issue_key = location.issue.as_str();
        if issue_key.chars().all(|c| c == '.') {
            return Err(PointlessError::InvalidLocation(format!(
                "bad issue key {issue_key:?}"
            )));
        }

        let issue: JiraIssue = self
            .get(&target, &[ISSUE_SEGMENT, issue_key], &[])
            .await
            .map_err(|e| match e {
                PointlessError::Api { status, .. } if status == StatusCode::NOT_FOUND.as_u16() => {
                    PointlessError::NotFound(location.issue.clone())
                }
                other => other,
            })?;
        let fields = issue
            .fields
            .ok_or_else(|| PointlessError::NotFound(location.issue.clone()))?;

        validate_issue_type(&fields)?;
        Ok(fields)
    }

    async fn fetch_field_page(
        &self,
        target: &Target<'_>,
        start_at: u64,
    ) -> PointlessResult<FieldSearchPage> {
        let query = [
            ("query", POINTS_FIELD_QUERY.to_string()),
            ("startAt", start_at.to_string()),
        ];
        self.get(target, &FIELD_SEARCH_SEGMENTS, &query).await
    }

    /// Discover candidate points field ids, in page order.
    ///
    /// The first page is fetched alone to learn the page size and total;
    /// remaining pages are fetched concurrently and reassembled in order.
    #[instrument(skip(self, location), fields(issue = %location.issue))]
    async fn discover_points_fields(&self, location: &StoryLocation) -> PointlessResult<Vec<String>> {
        let target = self.target(location)?;
        let first = self.fetch_field_page(&target, 0).await?;

        let max_results = first.max_results;
        let remaining = remaining_pages(first.total, max_results);
        debug!(
            total = first.total,
            max_results,
            remaining, "Discovered points field pages"
        );

        let target = &target;
        let pages: Vec<FieldSearchPage> = stream::iter(1..=remaining)
            .map(move |page| self.fetch_field_page(target, page * max_results))
            .buffered(self.config.page_concurrency.max(1))
            .try_collect()
            .await?;

        Ok(first
            .values
            .into_iter()
            .chain(pages.into_iter().flat_map(|page| page.values))
            .map(|field| field.id)
            .collect())
    }
}

/// Pages left after the first: `ceil((total - maxResults) / maxResults)`.
fn remaining_pages(total: u64, max_results: u64) -> u64 {
    if max_results == 0 || total <= max_results {
        return 0;
    }
    (total - max_results).div_ceil(max_results)
}

fn validate_issue_type(fields: &JiraFields) -> PointlessResult<()> {
    let name = fields.issuetype.as_ref().and_then(|t| t.name.clone());
    match name {
        Some(ref n) if n.eq_ignore_ascii_case(STORY_ISSUE_TYPE) => Ok(()),
        _ => Err(PointlessError::InvalidIssueType(name)),
    }
}

/// Title plus description and comments, joined by blank lines.
fn transform_issue(fields: &JiraFields) -> Story {
    let description = extract_text(fields.description.as_ref());
    let comments = fields
        .comment
        .as_ref()
        .map(|page| {
            page.comments
                .iter()
                .map(|c| extract_text(c.body.as_ref()))
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join("\n\n")
        })
        .unwrap_or_default();

    let content = [description, comments]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    Story {
        title: Some(fields.summary.clone().unwrap_or_default()),
        content,
    }
}

/// First candidate field, in discovery order, whose value is a number.
fn find_points(fields: &JiraFields, candidates: &[String]) -> Option<f64> {
    candidates
        .iter()
        .find_map(|id| fields.other.get(id).and_then(serde_json::Value::as_f64))
}

#[async_trait]
impl StorySourceAdapter for JiraAdapter {
    #[instrument(skip(self, location), fields(issue = %location.issue))]
    async fn fetch_story(&self, location: &StoryLocation) -> PointlessResult<Story> {
        let fields = self.fetch_issue(location).await?;
        Ok(transform_issue(&fields))
    }

    #[instrument(skip(self, location), fields(issue = %location.issue))]
    async fn fetch_reference_story(
        &self,
        location: &StoryLocation,
    ) -> PointlessResult<ReferenceStory> {
        let fields = self.fetch_issue(location).await?;
        let candidates = self.discover_points_fields(location).await?;

        let points = find_points(&fields, &candidates)
            .ok_or_else(|| PointlessError::MissingPointsField(location.issue.clone()))?;
        debug!(points, candidates = candidates.len(), "Resolved story points");

        Ok(transform_issue(&fields).with_points(points))
    }
}
