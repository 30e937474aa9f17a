//! Output renderers.
//!
//! - [`layout`]: flow layout of rendered template markup onto pages
//! - [`pdf`]: laid-out pages to PDF
//! - [`structure`]: data model to structural [`Document`] layout
//! - [`docx`]: structural document to a DOCX package

pub mod docx;
pub mod layout;
pub mod pdf;
pub mod structure;

pub use docx::write_docx;
pub use layout::{layout_markup, Layout};
pub use pdf::{check_well_formed, markup_to_pdf};
pub use structure::{build_cover_letter, build_resume, bullet_line};

use crate::document::Document;
use crate::error::Result;
use crate::model::Subject;
use crate::template::TemplateStore;
use serde::Serialize;
use std::fmt;

/// Output document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DocumentFormat {
    /// Paginated visual document from an HTML template
    Pdf,
    /// Editable office document built structurally
    Docx,
}

impl DocumentFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }

    /// MIME type for transport layers.
    pub fn mime_type(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" | "word" => Ok(DocumentFormat::Docx),
            other => Err(format!("unknown format '{other}' (expected pdf or docx)")),
        }
    }
}

/// Lays out a subject as a structural document.
pub fn build_structure(subject: &Subject) -> Document {
    match subject {
        Subject::Profile(profile) => build_resume(profile),
        Subject::CoverLetter(letter) => build_cover_letter(letter),
    }
}

/// Renders a subject through a named template and converts the markup to PDF.
pub fn to_pdf(store: &TemplateStore, subject: &Subject, template_id: &str) -> Result<Vec<u8>> {
    let markup = store.render(template_id, subject)?;
    markup_to_pdf(&markup)
}

/// Builds and serializes the structural document for a subject.
pub fn to_docx(subject: &Subject) -> Result<Vec<u8>> {
    write_docx(&build_structure(subject))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_properties() {
        assert_eq!(DocumentFormat::Pdf.extension(), "pdf");
        assert_eq!(DocumentFormat::Docx.to_string(), "docx");
        assert_eq!(DocumentFormat::Pdf.mime_type(), "application/pdf");
        assert!(DocumentFormat::Docx.mime_type().ends_with("wordprocessingml.document"));
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("PDF".parse::<DocumentFormat>(), Ok(DocumentFormat::Pdf));
        assert_eq!("docx".parse::<DocumentFormat>(), Ok(DocumentFormat::Docx));
        assert!("odt".parse::<DocumentFormat>().is_err());
    }
}
