//! Prompt construction for point estimation.

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::{PointlessError, PointlessResult};
use crate::models::{PointerRequest, ReferenceStory};

const TEMPLATE_NAME: &str = "point-story";

const TEMPLATE: &str = r"Given the following reference stories and a new story, analyze the new story and assign points based on the reference stories.

Reference Stories:
{{references}}

New Story:
Title: {{title}}
Content: {{content}}

Please analyze the new story and assign points based on the reference stories. Consider the complexity, creativity, and overall impact of the story.{{#if custom_instructions}}

Additional Instructions:
{{custom_instructions}}{{/if}}";

#[derive(Debug, Serialize)]
struct PromptContext<'a> {
    references: String,
    title: &'a str,
    content: &'a str,
    custom_instructions: Option<&'a str>,
}

/// Renders the point estimation prompt.
pub struct PromptBuilder {
    registry: Handlebars<'static>,
}

impl std::fmt::Debug for PromptBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptBuilder")
            .field("template", &TEMPLATE_NAME)
            .finish_non_exhaustive()
    }
}

impl PromptBuilder {
    /// Create a builder with the template registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to parse.
    pub fn new() -> PointlessResult<Self> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry
            .register_template_string(TEMPLATE_NAME, TEMPLATE)
            .map_err(|e| PointlessError::Prompt(e.to_string()))?;

        Ok(Self { registry })
    }

    /// Render the prompt for a request.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    pub fn build(&self, request: &PointerRequest) -> PointlessResult<String> {
        let context = PromptContext {
            references: format_references(&request.reference_stories),
            title: request.story.display_title(),
            content: &request.story.content,
            custom_instructions: request
                .custom_instructions
                .as_deref()
                .filter(|s| !s.trim().is_empty()),
        };

        self.registry
            .render(TEMPLATE_NAME, &context)
            .map_err(|e| PointlessError::Prompt(e.to_string()))
    }
}

/// Reference stories as `Title / Content / Points` blocks, in input order.
fn format_references(references: &[ReferenceStory]) -> String {
    references
        .iter()
        .map(|r| {
            format!(
                "Title: {}\nContent: {}\nPoints: {}",
                r.display_title(),
                r.content,
                r.points
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Story;

    fn request() -> PointerRequest {
        PointerRequest {
            story: Story::new("Add SSO", "Support <SAML> & OIDC login"),
            reference_stories: vec![
                ReferenceStory::new("Simple fix", "Fixed a typo in the login button", 1.0),
                ReferenceStory {
                    title: None,
                    content: "Rewrote the session store".to_string(),
                    points: 8.0,
                },
            ],
            custom_instructions: None,
        }
    }

    #[test]
    fn test_references_render_in_order() {
        let prompt = PromptBuilder::new().unwrap().build(&request()).unwrap();

        let first = prompt
            .find("Title: Simple fix\nContent: Fixed a typo in the login button\nPoints: 1")
            .unwrap();
        let second = prompt
            .find("Title: Untitled\nContent: Rewrote the session store\nPoints: 8")
            .unwrap();
        let target = prompt.find("New Story:\nTitle: Add SSO").unwrap();

        assert!(first < second);
        assert!(second < target);
    }

    #[test]
    fn test_content_is_not_html_escaped() {
        let prompt = PromptBuilder::new().unwrap().build(&request()).unwrap();
        assert!(prompt.contains("Content: Support <SAML> & OIDC login"));
    }

    #[test]
    fn test_custom_instructions_are_included_verbatim() {
        let mut request = request();
        request.custom_instructions = Some("Use the fibonacci scale: 1, 2, 3, 5, 8".to_string());

        let prompt = PromptBuilder::new().unwrap().build(&request).unwrap();

        let heading = prompt.find("Additional Instructions:").unwrap();
        let target = prompt.find("New Story:").unwrap();
        assert!(target < heading);
        assert!(prompt.ends_with("Use the fibonacci scale: 1, 2, 3, 5, 8"));
    }

    #[test]
    fn test_custom_instructions_keep_surrounding_whitespace() {
        let mut request = request();
        request.custom_instructions = Some("Prefer small numbers.\n\n- 1 for copy edits  \n".to_string());

        let prompt = PromptBuilder::new().unwrap().build(&request).unwrap();

        assert!(prompt.ends_with(
            "Additional Instructions:\nPrefer small numbers.\n\n- 1 for copy edits  \n"
        ));
    }

    #[test]
    fn test_no_instructions_section_without_instructions() {
        let mut request = request();
        request.custom_instructions = Some("   ".to_string());

        let prompt = PromptBuilder::new().unwrap().build(&request).unwrap();
        assert!(!prompt.contains("Additional Instructions:"));
        assert!(prompt.ends_with("overall impact of the story."));
    }

    #[test]
    fn test_fractional_points_keep_precision() {
        let request = PointerRequest {
            story: Story::untitled("Target"),
            reference_stories: vec![ReferenceStory::new("Half", "Tiny", 0.5)],
            custom_instructions: None,
        };
        let prompt = PromptBuilder::new().unwrap().build(&request).unwrap();
        assert!(prompt.contains("Points: 0.5"));
        assert!(prompt.contains("Title: Untitled\nContent: Target"));
    }
}
