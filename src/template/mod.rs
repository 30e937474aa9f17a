//! Template rendering for the visual (PDF) path.
//!
//! Data models are bound onto named HTML templates with `minijinja`. Only
//! identifiers in the fixed [`TemplateRegistry`] can be rendered, and every
//! substituted value is HTML-escaped.
//!
//! ## Profile templates
//!
//! `profile_template`, `modern_profile_template`, `minimalist_profile_template`
//!
//! ## Cover-letter templates
//!
//! `cover_letter_{starter,professional,expert}_{001,002,003}`; use
//! [`normalize_cover_letter_id`] for the shorter spellings clients send.

mod context;
mod filters;
mod registry;
mod store;

pub use context::{CoverLetterSlots, ProfileSlots};
pub use registry::{
    normalize_cover_letter_id, TemplateKind, TemplateRegistry, COVER_LETTER_TEMPLATES,
    PROFILE_TEMPLATES,
};
pub use store::TemplateStore;
