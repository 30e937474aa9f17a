//! Input data model.
//!
//! Plain records for the two kinds of document this crate renders, plus the
//! [`Subject`] sum type that lets one entry point accept either kind.

mod cover_letter;
mod profile;

pub use cover_letter::*;
pub use profile::*;

pub(crate) use profile::non_blank;

use crate::error::Result;
use crate::render::DocumentFormat;
use regex::Regex;
use std::sync::LazyLock;

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// The thing being rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum Subject {
    /// A resume built from a candidate profile
    Profile(CandidateProfile),
    /// A cover letter
    CoverLetter(CoverLetter),
}

impl Subject {
    /// Name of the person the document is about.
    pub fn display_name(&self) -> &str {
        match self {
            Subject::Profile(profile) => &profile.name,
            Subject::CoverLetter(letter) => &letter.header.name,
        }
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Subject::Profile(_) => "profile",
            Subject::CoverLetter(_) => "cover letter",
        }
    }

    /// Runs the required-field checks for the wrapped record.
    pub fn validate(&self) -> Result<()> {
        match self {
            Subject::Profile(profile) => profile.validate(),
            Subject::CoverLetter(letter) => letter.validate(),
        }
    }

    /// Returns the subject with cover-letter defaults applied.
    pub fn with_defaults(self) -> Self {
        match self {
            Subject::CoverLetter(letter) => Subject::CoverLetter(letter.with_defaults()),
            profile => profile,
        }
    }

    /// Suggested download filename, e.g. `Sarah_Johnson_cover_letter.pdf`.
    pub fn suggested_filename(&self, format: DocumentFormat) -> String {
        let suffix = match (self, format) {
            (Subject::Profile(_), DocumentFormat::Pdf) => "profile",
            (Subject::Profile(_), DocumentFormat::Docx) => "resume",
            (Subject::CoverLetter(_), _) => "cover_letter",
        };
        format!(
            "{}_{}.{}",
            filename_stem(self.display_name()),
            suffix,
            format.extension()
        )
    }
}

impl From<CandidateProfile> for Subject {
    fn from(profile: CandidateProfile) -> Self {
        Subject::Profile(profile)
    }
}

impl From<CoverLetter> for Subject {
    fn from(letter: CoverLetter) -> Self {
        Subject::CoverLetter(letter)
    }
}

/// Turns a display name into a file-name stem.
///
/// Path separators and characters reserved on common filesystems become `_`,
/// each whitespace run collapses to one `_`, and leading dots are dropped, so
/// the stem never names another directory.
pub fn filename_stem(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect();
    let stem = RE_WHITESPACE.replace_all(replaced.trim(), "_");
    let stem = stem.trim_start_matches(['.', '_']);
    if stem.is_empty() {
        "document".to_string()
    } else {
        stem.to_string()
    }
}
