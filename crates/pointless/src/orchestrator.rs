//! Resolves story locations and forwards the request to a scoring backend.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, instrument};

use crate::adapter::StorySourceAdapter;
use crate::error::PointlessResult;
use crate::models::{
    PointLessRequest, PointerRequest, PointerResponse, ReferenceStory, Story, StoryInput,
};
use crate::pointer::Pointer;

/// Composes a story source and a scoring backend.
///
/// Stateless across calls: no caching, no retries. The first resolution
/// failure aborts the call and drops the remaining in-flight fetches.
#[derive(Clone)]
pub struct PointLessOrchestrator {
    pointer: Arc<dyn Pointer>,
    story_source: Arc<dyn StorySourceAdapter>,
}

impl PointLessOrchestrator {
    /// Create an orchestrator.
    pub fn new(pointer: Arc<dyn Pointer>, story_source: Arc<dyn StorySourceAdapter>) -> Self {
        Self {
            pointer,
            story_source,
        }
    }

    /// Resolve every location in the request, then score the story.
    ///
    /// # Errors
    ///
    /// Returns the first resolution error, or the scoring backend's error.
    #[instrument(skip_all, fields(remote_story = request.story.is_remote()))]
    pub async fn point_story(&self, request: PointLessRequest) -> PointlessResult<PointerResponse> {
        let PointLessRequest {
            story,
            reference_stories,
            custom_instructions,
        } = request;

        let story = self.resolve_story(story).await?;
        let reference_stories = self
            .resolve_reference_stories(reference_stories.unwrap_or_default())
            .await?;
        debug!(references = reference_stories.len(), "Resolved request");

        self.pointer
            .point(PointerRequest {
                story,
                reference_stories,
                custom_instructions,
            })
            .await
    }

    async fn resolve_story(&self, story: StoryInput<Story>) -> PointlessResult<Story> {
        match story {
            StoryInput::Remote(location) => self.story_source.fetch_story(&location).await,
            StoryInput::Inline(story) => Ok(story),
        }
    }

    /// Resolve references concurrently; output order matches input order.
    async fn resolve_reference_stories(
        &self,
        stories: Vec<StoryInput<ReferenceStory>>,
    ) -> PointlessResult<Vec<ReferenceStory>> {
        try_join_all(
            stories
                .into_iter()
                .map(|story| self.resolve_reference_story(story)),
        )
        .await
    }

    async fn resolve_reference_story(
        &self,
        story: StoryInput<ReferenceStory>,
    ) -> PointlessResult<ReferenceStory> {
        match story {
            StoryInput::Remote(location) => {
                self.story_source.fetch_reference_story(&location).await
            }
            StoryInput::Inline(story) => Ok(story),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PointlessError;
    use crate::models::StoryLocation;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Serves stories keyed by issue id, with per-issue delays.
    #[derive(Default)]
    struct FakeSource {
        calls: AtomicUsize,
        delays_ms: Vec<(String, u64)>,
        missing: Vec<String>,
    }

    impl FakeSource {
        async fn lookup(&self, location: &StoryLocation) -> PointlessResult<Story> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some((_, ms)) = self.delays_ms.iter().find(|(id, _)| *id == location.issue) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            if self.missing.contains(&location.issue) {
                return Err(PointlessError::MissingPointsField(location.issue.clone()));
            }
            Ok(Story::new(
                location.issue.clone(),
                format!("content of {}", location.issue),
            ))
        }
    }

    #[async_trait]
    impl StorySourceAdapter for FakeSource {
        async fn fetch_story(&self, location: &StoryLocation) -> PointlessResult<Story> {
            self.lookup(location).await
        }

        async fn fetch_reference_story(
            &self,
            location: &StoryLocation,
        ) -> PointlessResult<ReferenceStory> {
            Ok(self.lookup(location).await?.with_points(2.0))
        }
    }

    /// Records the resolved request it receives.
    #[derive(Default)]
    struct RecordingPointer {
        received: Mutex<Option<PointerRequest>>,
    }

    #[async_trait]
    impl Pointer for RecordingPointer {
        async fn point(&self, request: PointerRequest) -> PointlessResult<PointerResponse> {
            *self.received.lock().unwrap() = Some(request);
            Ok(PointerResponse {
                points: 5.0,
                explanation: "recorded".to_string(),
            })
        }
    }

    fn orchestrator(
        source: FakeSource,
    ) -> (PointLessOrchestrator, Arc<FakeSource>, Arc<RecordingPointer>) {
        let source = Arc::new(source);
        let pointer = Arc::new(RecordingPointer::default());
        let orchestrator = PointLessOrchestrator::new(pointer.clone(), source.clone());
        (orchestrator, source, pointer)
    }

    #[tokio::test]
    async fn test_inline_request_never_calls_adapter() {
        let (orchestrator, source, pointer) = orchestrator(FakeSource::default());
        let request = PointLessRequest::new(Story::new("X", "Fix typo"))
            .with_reference(ReferenceStory::new("Simple fix", "...", 1.0))
            .with_custom_instructions("Be brief");

        let response = orchestrator.point_story(request).await.unwrap();

        assert!((response.points - 5.0).abs() < f64::EPSILON);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);

        let received = pointer.received.lock().unwrap().clone().unwrap();
        assert_eq!(received.story, Story::new("X", "Fix typo"));
        assert_eq!(received.reference_stories.len(), 1);
        assert_eq!(received.custom_instructions.as_deref(), Some("Be brief"));
    }

    #[tokio::test]
    async fn test_missing_references_default_to_empty() {
        let (orchestrator, _, pointer) = orchestrator(FakeSource::default());

        orchestrator
            .point_story(PointLessRequest::new(Story::untitled("Alone")))
            .await
            .unwrap();

        let received = pointer.received.lock().unwrap().clone().unwrap();
        assert!(received.reference_stories.is_empty());
    }

    #[tokio::test]
    async fn test_remote_story_is_resolved() {
        let (orchestrator, source, pointer) = orchestrator(FakeSource::default());

        orchestrator
            .point_story(PointLessRequest::new(StoryLocation::jira("SCRUM-1")))
            .await
            .unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        let received = pointer.received.lock().unwrap().clone().unwrap();
        assert_eq!(received.story, Story::new("SCRUM-1", "content of SCRUM-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reference_order_survives_out_of_order_completion() {
        let source = FakeSource {
            delays_ms: vec![("SCRUM-1".to_string(), 60), ("SCRUM-3".to_string(), 20)],
            ..FakeSource::default()
        };
        let (orchestrator, _, pointer) = orchestrator(source);
        let request = PointLessRequest::new(Story::untitled("Target"))
            .with_reference(StoryLocation::jira("SCRUM-1"))
            .with_reference(ReferenceStory::new("Inline", "inline", 3.0))
            .with_reference(StoryLocation::jira("SCRUM-3"))
            .with_reference(StoryLocation::jira("SCRUM-4"));

        orchestrator.point_story(request).await.unwrap();

        let received = pointer.received.lock().unwrap().clone().unwrap();
        let titles: Vec<_> = received
            .reference_stories
            .iter()
            .map(ReferenceStory::display_title)
            .collect();
        assert_eq!(titles, ["SCRUM-1", "Inline", "SCRUM-3", "SCRUM-4"]);
    }

    #[tokio::test]
    async fn test_single_failure_aborts_scoring() {
        let source = FakeSource {
            missing: vec!["SCRUM-2".to_string()],
            ..FakeSource::default()
        };
        let (orchestrator, _, pointer) = orchestrator(source);
        let request = PointLessRequest::new(Story::untitled("Target"))
            .with_reference(StoryLocation::jira("SCRUM-1"))
            .with_reference(StoryLocation::jira("SCRUM-2"));

        let err = orchestrator.point_story(request).await.unwrap_err();

        assert!(matches!(err, PointlessError::MissingPointsField(ref key) if key == "SCRUM-2"));
        assert!(pointer.received.lock().unwrap().is_none());
    }
}
