//! Error types for cvdoc library.

use std::io;
use thiserror::Error;

/// Result type alias for cvdoc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for cvdoc library.
#[derive(Error, Debug)]
pub enum Error {
    /// Required input is missing or blank.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The template identifier is not in the registry for this document kind.
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// Rendered markup could not be converted to a visual document.
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// The structural document could not be serialized.
    #[error("Document build error: {0}")]
    DocumentBuild(String),

    /// The template engine failed while binding data.
    #[error("Template render error: {0}")]
    Render(String),

    /// A configuration value could not be parsed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input JSON could not be parsed.
    #[error("Invalid JSON input: {0}")]
    Json(String),

    /// I/O error during file or thread operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns true if the failure was caused by the caller's input.
    ///
    /// Transport layers map these to client-side rejections; everything else
    /// is a server-side failure. Neither kind is retried.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::TemplateNotFound(_) | Error::Json(_)
        )
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::DocumentBuild(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::DocumentBuild(err.to_string())
    }
}

impl From<minijinja::Error> for Error {
    fn from(err: minijinja::Error) -> Self {
        match err.kind() {
            minijinja::ErrorKind::TemplateNotFound => {
                Error::TemplateNotFound(err.detail().map_or_else(|| err.to_string(), str::to_string))
            }
            _ => Error::Render(format!("{err:#}")),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}
