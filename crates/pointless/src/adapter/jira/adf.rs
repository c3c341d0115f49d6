//! Plain-text extraction from Atlassian Document Format.
//!
//! Only top-level `paragraph` blocks contribute text: their inline runs are
//! concatenated without a separator and paragraphs are joined by newlines.
//! Every other block type (headings, lists, code, media) yields nothing.

use serde::Deserialize;

/// A node in an ADF document tree.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdfNode {
    /// Node type (`doc`, `paragraph`, `text`, ...)
    #[serde(rename = "type", default)]
    pub node_type: String,
    /// Text of a `text` node
    #[serde(default)]
    pub text: Option<String>,
    /// Child nodes
    #[serde(default)]
    pub content: Vec<AdfNode>,
}

impl AdfNode {
    fn paragraph_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|run| run.text.as_deref())
            .collect()
    }
}

/// Convert a document to plain text. A missing document is empty text.
pub fn extract_text(doc: Option<&AdfNode>) -> String {
    let Some(doc) = doc else {
        return String::new();
    };

    doc.content
        .iter()
        .map(|block| match block.node_type.as_str() {
            "paragraph" => block.paragraph_text(),
            _ => String::new(),
        })
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> AdfNode {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_paragraph_runs_concatenate_without_separator() {
        let doc = doc(json!({
            "type": "doc",
            "content": [{
                "type": "paragraph",
                "content": [
                    {"type": "text", "text": "Fix the "},
                    {"type": "text", "text": "login", "marks": [{"type": "strong"}]},
                    {"type": "text", "text": " button"}
                ]
            }]
        }));
        assert_eq!(extract_text(Some(&doc)), "Fix the login button");
    }

    #[test]
    fn test_paragraphs_join_with_newline() {
        let doc = doc(json!({
            "type": "doc",
            "content": [
                {"type": "paragraph", "content": [{"type": "text", "text": "First"}]},
                {"type": "paragraph", "content": [{"type": "text", "text": "Second"}]}
            ]
        }));
        assert_eq!(extract_text(Some(&doc)), "First\nSecond");
    }

    #[test]
    fn test_unknown_blocks_contribute_nothing() {
        let doc = doc(json!({
            "type": "doc",
            "content": [
                {"type": "heading", "attrs": {"level": 1}, "content": [{"type": "text", "text": "Title"}]},
                {"type": "paragraph", "content": [{"type": "text", "text": "Body"}]},
                {"type": "bulletList", "content": [{"type": "listItem", "content": []}]},
                {"type": "paragraph", "content": [{"type": "hardBreak"}]}
            ]
        }));
        assert_eq!(extract_text(Some(&doc)), "Body");
    }

    #[test]
    fn test_missing_document_is_empty() {
        assert_eq!(extract_text(None), "");
        assert_eq!(extract_text(Some(&AdfNode::default())), "");
    }
}
