//! Fixed allow-list of template identifiers and their built-in sources.

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Templates available for candidate profiles.
pub const PROFILE_TEMPLATES: &[&str] = &[
    "profile_template",
    "modern_profile_template",
    "minimalist_profile_template",
];

/// Templates available for cover letters.
pub const COVER_LETTER_TEMPLATES: &[&str] = &[
    "cover_letter_starter_001",
    "cover_letter_starter_002",
    "cover_letter_starter_003",
    "cover_letter_professional_001",
    "cover_letter_professional_002",
    "cover_letter_professional_003",
    "cover_letter_expert_001",
    "cover_letter_expert_002",
    "cover_letter_expert_003",
];

/// Shared layouts that allow-listed templates extend. Never addressable directly.
pub(crate) const LAYOUTS: &[(&str, &str)] = &[(
    "cover_letter_base",
    include_str!("templates/cover_letter_base.html"),
)];

const COVER_LETTER_PREFIX: &str = "cover_letter_";

static RE_TIERED_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(starter|professional|expert)_template_(\d{3})$").unwrap());

/// Which kind of model a template renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    Profile,
    CoverLetter,
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKind::Profile => f.write_str("profile"),
            TemplateKind::CoverLetter => f.write_str("cover letter"),
        }
    }
}

/// Lookup over the fixed template allow-list.
///
/// Identifiers are checked here before any engine lookup or file access, so a
/// caller-supplied id can never name anything outside this list.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateRegistry;

impl TemplateRegistry {
    /// Identifiers registered for a kind, in display order.
    pub fn ids(kind: TemplateKind) -> &'static [&'static str] {
        match kind {
            TemplateKind::Profile => PROFILE_TEMPLATES,
            TemplateKind::CoverLetter => COVER_LETTER_TEMPLATES,
        }
    }

    /// Every registered identifier with its kind.
    pub fn all() -> impl Iterator<Item = (TemplateKind, &'static str)> {
        PROFILE_TEMPLATES
            .iter()
            .map(|id| (TemplateKind::Profile, *id))
            .chain(
                COVER_LETTER_TEMPLATES
                    .iter()
                    .map(|id| (TemplateKind::CoverLetter, *id)),
            )
    }

    /// Returns true if `id` is registered for `kind`.
    pub fn contains(kind: TemplateKind, id: &str) -> bool {
        Self::ids(kind).contains(&id)
    }

    /// Resolves a caller-supplied id to its registered static name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateNotFound`] if the id is not registered for
    /// this kind, including ids registered only for the other kind.
    pub fn resolve(kind: TemplateKind, id: &str) -> Result<&'static str> {
        Self::ids(kind)
            .iter()
            .find(|registered| **registered == id)
            .copied()
            .ok_or_else(|| Error::TemplateNotFound(format!("{id} (no such {kind} template)")))
    }
}

/// Maps the id spellings clients send onto registered cover-letter ids.
///
/// - ids starting with `cover_letter_` pass through
/// - `starter_template_001` style ids become `cover_letter_starter_001`
/// - anything else gets the `cover_letter_` prefix
///
/// Empty input is returned unchanged.
pub fn normalize_cover_letter_id(raw: &str) -> String {
    if raw.is_empty() || raw.starts_with(COVER_LETTER_PREFIX) {
        return raw.to_string();
    }
    if let Some(caps) = RE_TIERED_ID.captures(raw) {
        return format!("{COVER_LETTER_PREFIX}{}_{}", &caps[1], &caps[2]);
    }
    format!("{COVER_LETTER_PREFIX}{raw}")
}

/// Built-in source for a registered id.
pub(crate) fn builtin_source(id: &str) -> Option<&'static str> {
    let source = match id {
        "profile_template" => include_str!("templates/profile_template.html"),
        "modern_profile_template" => include_str!("templates/modern_profile_template.html"),
        "minimalist_profile_template" => {
            include_str!("templates/minimalist_profile_template.html")
        }
        "cover_letter_starter_001" => include_str!("templates/cover_letter_starter_001.html"),
        "cover_letter_starter_002" => include_str!("templates/cover_letter_starter_002.html"),
        "cover_letter_starter_003" => include_str!("templates/cover_letter_starter_003.html"),
        "cover_letter_professional_001" => {
            include_str!("templates/cover_letter_professional_001.html")
        }
        "cover_letter_professional_002" => {
            include_str!("templates/cover_letter_professional_002.html")
        }
        "cover_letter_professional_003" => {
            include_str!("templates/cover_letter_professional_003.html")
        }
        "cover_letter_expert_001" => include_str!("templates/cover_letter_expert_001.html"),
        "cover_letter_expert_002" => include_str!("templates/cover_letter_expert_002.html"),
        "cover_letter_expert_003" => include_str!("templates/cover_letter_expert_003.html"),
        _ => return None,
    };
    Some(source)
}
