//! # cvdoc
//!
//! Renders candidate profiles and cover letters into two kinds of document:
//!
//! - **PDF**: the data is bound onto a named HTML template, and the markup is
//!   converted to a paginated document.
//! - **DOCX**: the data is laid out directly as paragraphs and runs, with
//!   free-text fields reduced to plain text by the markup normalizer.
//!
//! ## Quick Start
//!
//! ```no_run
//! use cvdoc::{CandidateProfile, Renderer, Subject};
//!
//! fn main() -> cvdoc::Result<()> {
//!     let mut profile = CandidateProfile::new("Sarah Johnson");
//!     profile.email = Some("sarah@example.com".into());
//!
//!     let renderer = Renderer::new()?;
//!     let subject = Subject::from(profile);
//!
//!     let pdf = renderer.render_pdf(&subject, "modern_profile_template")?;
//!     std::fs::write(&pdf.filename, &pdf.bytes)?;
//!
//!     let docx = renderer.render_docx(&subject)?;
//!     std::fs::write(&docx.filename, &docx.bytes)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `async`: `tokio` wrappers that run the blocking pipeline off the runtime

pub mod cleanup;
pub mod config;
pub mod document;
pub mod error;
pub mod model;
pub mod pool;
pub mod render;
pub mod template;

#[cfg(feature = "async")]
pub mod async_api;

// Re-exports
pub use cleanup::normalize_markup;
pub use config::{PoolConfig, RenderConfig, TemplateConfig};
pub use error::{Error, Result};
pub use model::{
    CandidateProfile, CoverLetter, CoverLetterClosing, CoverLetterHeader, CoverLetterRecipient,
    Education, Experience, Subject,
};
pub use pool::{JobHandle, RenderPool};
pub use render::DocumentFormat;
pub use template::{normalize_cover_letter_id, TemplateKind, TemplateRegistry, TemplateStore};

use bytes::Bytes;
use std::sync::Arc;
use std::time::Instant;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A finished document ready to be written or sent.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    /// Encoded document
    pub bytes: Bytes,
    /// Suggested download filename, e.g. `Sarah_Johnson_resume.docx`
    pub filename: String,
    /// Output format
    pub format: DocumentFormat,
}

impl RenderedDocument {
    /// MIME type of the encoded document.
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if no bytes were produced.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Entry point for both rendering paths.
///
/// Cheap to clone; clones share one [`TemplateStore`]. Each call builds its
/// own document and output buffer, so a renderer can be used from many
/// threads at once.
#[derive(Debug, Clone)]
pub struct Renderer {
    templates: Arc<TemplateStore>,
}

impl Renderer {
    /// Creates a renderer over the built-in templates.
    pub fn new() -> Result<Self> {
        Ok(Self::from_store(Arc::new(TemplateStore::builtin()?)))
    }

    /// Creates a renderer with the given configuration.
    pub fn with_config(config: &RenderConfig) -> Result<Self> {
        config.validate()?;
        let store = TemplateStore::new(config.templates.clone())?;
        Ok(Self::from_store(Arc::new(store)))
    }

    /// Creates a renderer sharing an existing template store.
    pub fn from_store(templates: Arc<TemplateStore>) -> Self {
        Self { templates }
    }

    /// The template store used for PDF output.
    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    /// Renders a subject to PDF through the named template.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if required fields are missing
    /// - [`Error::TemplateNotFound`] if `template_id` is not registered for
    ///   the subject's kind
    /// - [`Error::Conversion`] if the markup cannot be converted
    pub fn render_pdf(&self, subject: &Subject, template_id: &str) -> Result<RenderedDocument> {
        subject.validate()?;
        let subject = subject.clone().with_defaults();

        let started = Instant::now();
        log::debug!("Rendering {} PDF with {template_id}", subject.kind());
        let bytes = render::to_pdf(&self.templates, &subject, template_id)?;

        let document = finish(&subject, DocumentFormat::Pdf, bytes);
        log::info!(
            "Rendered {} ({} bytes) in {:?}",
            document.filename,
            document.len(),
            started.elapsed()
        );
        Ok(document)
    }

    /// Renders a subject to DOCX.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if required fields are missing
    /// - [`Error::DocumentBuild`] if the package cannot be written
    pub fn render_docx(&self, subject: &Subject) -> Result<RenderedDocument> {
        subject.validate()?;
        let subject = subject.clone().with_defaults();

        let started = Instant::now();
        log::debug!("Rendering {} DOCX", subject.kind());
        let bytes = render::to_docx(&subject)?;

        let document = finish(&subject, DocumentFormat::Docx, bytes);
        log::info!(
            "Rendered {} ({} bytes) in {:?}",
            document.filename,
            document.len(),
            started.elapsed()
        );
        Ok(document)
    }

    /// Renders to either format. PDF output needs a template id.
    pub fn render(
        &self,
        subject: &Subject,
        format: DocumentFormat,
        template_id: Option<&str>,
    ) -> Result<RenderedDocument> {
        match format {
            DocumentFormat::Docx => self.render_docx(subject),
            DocumentFormat::Pdf => {
                let id = template_id
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| Error::Validation("template id is required for PDF".into()))?;
                self.render_pdf(subject, id)
            }
        }
    }
}

fn finish(subject: &Subject, format: DocumentFormat, bytes: Vec<u8>) -> RenderedDocument {
    RenderedDocument {
        bytes: Bytes::from(bytes),
        filename: subject.suggested_filename(format),
        format,
    }
}
