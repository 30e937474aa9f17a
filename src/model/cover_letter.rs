//! Cover letter records and the defaulting rules applied before rendering.

use super::profile::non_blank;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Company used when the recipient's company is unknown.
pub const DEFAULT_COMPANY: &str = "Hiring Team";

/// Salutation used when the recipient's name is unknown.
pub const DEFAULT_SALUTATION: &str = "Dear Hiring Manager";

/// Valediction used when the caller gives none.
pub const DEFAULT_VALEDICTION: &str = "Sincerely";

/// A cover letter as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetter {
    /// Candidate details (all fields required)
    #[serde(default)]
    pub header: CoverLetterHeader,
    /// Addressee, optional
    #[serde(default)]
    pub recipient: Option<CoverLetterRecipient>,
    /// Opening line; derived from the recipient when absent
    #[serde(default)]
    pub salutation: Option<String>,
    /// Body paragraphs in order; may contain simple markup
    #[serde(default)]
    pub content: Vec<String>,
    /// Valediction and signature, optional
    #[serde(default)]
    pub closing: Option<CoverLetterClosing>,
}

/// Candidate details printed at the top of the letter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterHeader {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub date: String,
}

/// Who the letter is addressed to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterRecipient {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    /// The position applied for
    #[serde(default)]
    pub position: Option<String>,
}

/// Sign-off block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterClosing {
    /// e.g. "Best regards"
    #[serde(default)]
    pub valediction: Option<String>,
    /// Signature name
    #[serde(default)]
    pub name: Option<String>,
}

impl CoverLetter {
    /// Creates a letter with the given header and body.
    pub fn new(header: CoverLetterHeader, content: Vec<String>) -> Self {
        Self {
            header,
            content,
            ..Default::default()
        }
    }

    /// Parses a cover letter from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Checks the header fields and body, reporting every missing field at once.
    pub fn validate(&self) -> Result<()> {
        let header = &self.header;
        let mut missing = Vec::new();

        for (field, value) in [
            ("header.name", &header.name),
            ("header.email", &header.email),
            ("header.phone", &header.phone),
            ("header.date", &header.date),
        ] {
            if value.trim().is_empty() {
                missing.push(field);
            }
        }
        if self.content.is_empty() {
            missing.push("content");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "required fields missing: {}",
                missing.join(", ")
            )))
        }
    }

    /// Returns a copy with every optional field filled in.
    ///
    /// Applying this to its own output changes nothing.
    pub fn with_defaults(&self) -> CoverLetter {
        let mut recipient = self.recipient.clone().unwrap_or_default();
        if non_blank(recipient.company.as_deref()).is_none() {
            recipient.company = Some(DEFAULT_COMPANY.to_string());
        }

        let mut salutation = match non_blank(self.salutation.as_deref()) {
            Some(s) => s.to_string(),
            None => match non_blank(recipient.name.as_deref()) {
                Some(name) => format!("Dear {name}"),
                None => DEFAULT_SALUTATION.to_string(),
            },
        };
        if !salutation.ends_with(',') && !salutation.ends_with(':') {
            salutation.push(',');
        }

        let mut closing = self.closing.clone().unwrap_or_default();
        let mut valediction = non_blank(closing.valediction.as_deref())
            .unwrap_or(DEFAULT_VALEDICTION)
            .trim_end()
            .to_string();
        if !valediction.ends_with(',') {
            valediction.push(',');
        }
        closing.valediction = Some(valediction);
        if non_blank(closing.name.as_deref()).is_none() {
            closing.name = Some(self.header.name.clone());
        }

        CoverLetter {
            header: self.header.clone(),
            recipient: Some(recipient),
            salutation: Some(salutation),
            content: self.content.clone(),
            closing: Some(closing),
        }
    }

    /// Valediction to print, falling back to "Sincerely," without a closing.
    pub fn valediction(&self) -> String {
        self.closing
            .as_ref()
            .and_then(|c| non_blank(c.valediction.as_deref()))
            .map(str::to_string)
            .unwrap_or_else(|| format!("{DEFAULT_VALEDICTION},"))
    }

    /// Signature to print, falling back to the header name.
    pub fn signature(&self) -> &str {
        self.closing
            .as_ref()
            .and_then(|c| non_blank(c.name.as_deref()))
            .unwrap_or(&self.header.name)
    }
}
