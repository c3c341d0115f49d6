//! Story source adapters.
//!
//! An adapter turns a [`StoryLocation`] into inline story content by reading
//! from an external tracker. Adapters are read-only and stateless across calls.
//!
//! - **Jira** - REST API v3, with paginated discovery of the points field
//!
//! # Example
//!
//! ```rust,ignore
//! use pointless::adapter::{JiraAdapter, StorySourceAdapter};
//! use pointless::{JiraConfig, StoryLocation};
//!
//! let adapter = JiraAdapter::new(JiraConfig::from_env())?;
//! let reference = adapter
//!     .fetch_reference_story(&StoryLocation::jira("SCRUM-1"))
//!     .await?;
//! println!("{} = {} points", reference.display_title(), reference.points);
//! ```

pub mod jira;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{PointlessError, PointlessResult};
use crate::models::{ReferenceStory, Story, StoryLocation, StorySource};

pub use jira::JiraAdapter;

/// Trait for resolving story locations against an external tracker.
#[async_trait]
pub trait StorySourceAdapter: Send + Sync {
    /// Fetch a story to be estimated.
    ///
    /// # Errors
    ///
    /// Returns an error if the issue is absent, is not a story, or the tracker
    /// cannot be reached.
    async fn fetch_story(&self, location: &StoryLocation) -> PointlessResult<Story>;

    /// Fetch a story together with its assigned points.
    ///
    /// # Errors
    ///
    /// Same as [`fetch_story`](Self::fetch_story), plus
    /// [`PointlessError::MissingPointsField`] when no points value is found.
    async fn fetch_reference_story(
        &self,
        location: &StoryLocation,
    ) -> PointlessResult<ReferenceStory>;
}

/// Dispatches each location to the adapter registered for its source.
#[derive(Default, Clone)]
pub struct SourceRouter {
    adapters: HashMap<StorySource, Arc<dyn StorySourceAdapter>>,
}

impl SourceRouter {
    /// Create an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter for a source, replacing any previous one.
    pub fn with_adapter(
        mut self,
        source: StorySource,
        adapter: Arc<dyn StorySourceAdapter>,
    ) -> Self {
        self.adapters.insert(source, adapter);
        self
    }

    /// Whether an adapter is registered for the source.
    pub fn supports(&self, source: StorySource) -> bool {
        self.adapters.contains_key(&source)
    }

    fn require(&self, source: StorySource) -> PointlessResult<&Arc<dyn StorySourceAdapter>> {
        self.adapters
            .get(&source)
            .ok_or(PointlessError::UnsupportedSource(source))
    }
}

#[async_trait]
impl StorySourceAdapter for SourceRouter {
    async fn fetch_story(&self, location: &StoryLocation) -> PointlessResult<Story> {
        self.require(location.source)?.fetch_story(location).await
    }

    async fn fetch_reference_story(
        &self,
        location: &StoryLocation,
    ) -> PointlessResult<ReferenceStory> {
        self.require(location.source)?
            .fetch_reference_story(location)
            .await
    }
}
