//! Document structure and metadata.

use super::Paragraph;
use serde::Serialize;

/// A structural document ready for DOCX serialization.
///
/// Flat list of paragraphs in reading order; resumes and cover letters have
/// no tables, sections or embedded resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    /// Document metadata
    pub metadata: Metadata,
    /// Paragraphs in order
    pub paragraphs: Vec<Paragraph>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty document with a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            metadata: Metadata {
                title: Some(title.into()),
                ..Default::default()
            },
            paragraphs: Vec::new(),
        }
    }

    /// Appends a paragraph.
    pub fn push(&mut self, paragraph: Paragraph) {
        self.paragraphs.push(paragraph);
    }

    /// Returns the total number of paragraphs in the document.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    /// Returns the plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Document metadata, written to `docProps/core.xml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,
    /// Document author
    pub author: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_joins_paragraphs() {
        let mut doc = Document::titled("Resume");
        doc.push(Paragraph::text("John Doe"));
        doc.push(Paragraph::new());
        doc.push(Paragraph::text("SKILLS"));

        assert_eq!(doc.paragraph_count(), 3);
        assert_eq!(doc.plain_text(), "John Doe\n\nSKILLS");
        assert_eq!(doc.metadata.title.as_deref(), Some("Resume"));
    }

    #[test]
    fn test_serializes_structure() {
        let mut doc = Document::new();
        doc.push(Paragraph::text("x"));
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["paragraphs"][0]["content"][0]["Text"]["text"], "x");
    }
}
