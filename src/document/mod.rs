//! Document model (Intermediate Representation).
//!
//! The structural builder lays resumes and cover letters out into this model;
//! the DOCX writer serializes it. It is also what `cvdoc structure` prints.

mod document;
mod paragraph;
mod style;

pub use document::*;
pub use paragraph::*;
pub use style::*;
