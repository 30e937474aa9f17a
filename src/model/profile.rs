//! Candidate profile records.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A candidate profile as supplied by the caller.
///
/// Only `name` is required for rendering. Every other field may be absent or
/// empty; renderers omit the matching section instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    /// Candidate name (also used for output filenames)
    #[serde(default)]
    pub name: String,
    /// Contact email
    #[serde(default)]
    pub email: Option<String>,
    /// Contact phone
    #[serde(default)]
    pub phone: Option<String>,
    /// City / region
    #[serde(default)]
    pub location: Option<String>,
    /// Free-text summary, may contain simple markup
    #[serde(default)]
    pub summary: Option<String>,
    /// Skills in display order
    #[serde(default)]
    pub skills: Vec<String>,
    /// Work history in display order
    #[serde(default)]
    pub experience: Vec<Experience>,
    /// Education in display order
    #[serde(default)]
    pub education: Vec<Education>,
    /// Certifications in display order
    #[serde(default)]
    pub certifications: Vec<String>,
}

impl CandidateProfile {
    /// Creates a profile with only a name set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parses a profile from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Checks the fields a render request cannot do without.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("profile.name is required".into()));
        }
        Ok(())
    }

    /// Contact parts that are present, in display order (email, phone, location).
    pub fn contact_parts(&self) -> Vec<&str> {
        [&self.email, &self.phone, &self.location]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect()
    }

    /// Returns the summary if it has visible content.
    pub fn summary(&self) -> Option<&str> {
        non_blank(self.summary.as_deref())
    }
}

/// A single position in the candidate's work history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    /// Free-form label such as "2020-Present"
    #[serde(default)]
    pub duration: String,
    /// Free text; may contain line breaks, list items, paragraphs and entities
    #[serde(default)]
    pub description: String,
}

impl Experience {
    /// Creates an experience entry.
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        duration: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            duration: duration.into(),
            description: description.into(),
        }
    }

    /// "title - company", skipping whichever part is blank.
    pub fn heading(&self) -> String {
        join_present(&[&self.title, &self.company], " - ")
    }
}

/// A degree or course of study.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub year: String,
}

impl Education {
    /// Creates an education entry.
    pub fn new(
        degree: impl Into<String>,
        institution: impl Into<String>,
        year: impl Into<String>,
    ) -> Self {
        Self {
            degree: degree.into(),
            institution: institution.into(),
            year: year.into(),
        }
    }

    /// "degree - institution", skipping whichever part is blank.
    pub fn heading(&self) -> String {
        join_present(&[&self.degree, &self.institution], " - ")
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn join_present(parts: &[&String], separator: &str) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}
