//! Slot values bound into templates.
//!
//! Blank optional strings become `none` so templates can drop the matching
//! section with a plain `{% if %}`.

use crate::model::{non_blank, CandidateProfile, CoverLetter, Education, Experience};
use serde::Serialize;

/// Slots for profile templates.
#[derive(Debug, Serialize)]
pub struct ProfileSlots<'a> {
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub location: Option<&'a str>,
    /// Present contact parts, for templates that print them on one line
    pub contact: Vec<&'a str>,
    pub summary: Option<&'a str>,
    pub skills: &'a [String],
    pub experience: &'a [Experience],
    pub education: &'a [Education],
    pub certifications: &'a [String],
}

impl<'a> From<&'a CandidateProfile> for ProfileSlots<'a> {
    fn from(profile: &'a CandidateProfile) -> Self {
        Self {
            name: profile.name.trim(),
            email: non_blank(profile.email.as_deref()),
            phone: non_blank(profile.phone.as_deref()),
            location: non_blank(profile.location.as_deref()),
            contact: profile.contact_parts(),
            summary: profile.summary(),
            skills: &profile.skills,
            experience: &profile.experience,
            education: &profile.education,
            certifications: &profile.certifications,
        }
    }
}

/// Slots for cover-letter templates (camelCase names).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterSlots<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub date: &'a str,
    pub recipient_name: Option<&'a str>,
    pub company_name: Option<&'a str>,
    pub position: Option<&'a str>,
    pub salutation: Option<&'a str>,
    pub content: &'a [String],
    pub valediction: String,
    pub signature: &'a str,
}

impl<'a> From<&'a CoverLetter> for CoverLetterSlots<'a> {
    fn from(letter: &'a CoverLetter) -> Self {
        let header = &letter.header;
        let recipient = letter.recipient.as_ref();
        Self {
            name: &header.name,
            email: &header.email,
            phone: &header.phone,
            date: &header.date,
            recipient_name: recipient.and_then(|r| non_blank(r.name.as_deref())),
            company_name: recipient.and_then(|r| non_blank(r.company.as_deref())),
            position: recipient.and_then(|r| non_blank(r.position.as_deref())),
            salutation: non_blank(letter.salutation.as_deref()),
            content: &letter.content,
            valediction: letter.valediction(),
            signature: letter.signature(),
        }
    }
}
