//! Async API for non-blocking rendering.
//!
//! Enable the `async` feature to use these APIs:
//!
//! ```toml
//! [dependencies]
//! cvdoc = { version = "0.1", features = ["async"] }
//! ```
//!
//! Rendering is CPU-bound, so every call runs the blocking pipeline on
//! tokio's blocking thread pool.

use crate::error::{Error, Result};
use crate::model::Subject;
use crate::render::DocumentFormat;
use crate::{RenderedDocument, Renderer};

/// Asynchronously renders a subject to PDF.
///
/// # Example
///
/// ```no_run
/// # async fn example(subject: cvdoc::Subject) -> cvdoc::Result<()> {
/// let renderer = cvdoc::Renderer::new()?;
/// let pdf = cvdoc::async_api::render_pdf(&renderer, subject, "profile_template").await?;
/// tokio::fs::write(&pdf.filename, &pdf.bytes).await?;
/// # Ok(())
/// # }
/// ```
pub async fn render_pdf(
    renderer: &Renderer,
    subject: Subject,
    template_id: impl Into<String>,
) -> Result<RenderedDocument> {
    let renderer = renderer.clone();
    let template_id = template_id.into();
    spawn(move || renderer.render_pdf(&subject, &template_id)).await
}

/// Asynchronously renders a subject to DOCX.
pub async fn render_docx(renderer: &Renderer, subject: Subject) -> Result<RenderedDocument> {
    let renderer = renderer.clone();
    spawn(move || renderer.render_docx(&subject)).await
}

/// Asynchronously renders to either format.
pub async fn render(
    renderer: &Renderer,
    subject: Subject,
    format: DocumentFormat,
    template_id: Option<String>,
) -> Result<RenderedDocument> {
    let renderer = renderer.clone();
    spawn(move || renderer.render(&subject, format, template_id.as_deref())).await
}

async fn spawn<F>(job: F) -> Result<RenderedDocument>
where
    F: FnOnce() -> Result<RenderedDocument> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?
}
