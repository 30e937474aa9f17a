//! Lays resumes and cover letters out as structural documents.
//!
//! Free-text fields go through the markup normalizer; every run is set in
//! Arial so the DOCX output does not depend on the reader's default font.

use crate::cleanup::{normalize_markup, split_lines};
use crate::document::{
    Alignment, Border, Document, Paragraph, ParagraphStyle, TextRun, TextStyle, DEFAULT_FONT,
};
use crate::model::{CandidateProfile, CoverLetter};

/// Indentation of experience bullet lines (0.5 inch).
const DESCRIPTION_INDENT_TWIPS: u32 = 720;

/// Indentation of certification lines.
const CERTIFICATION_INDENT_TWIPS: u32 = 360;

const NAME_SIZE: f32 = 24.0;
const SECTION_HEADING_SIZE: f32 = 14.0;
const ENTRY_HEADING_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 11.0;
const DETAIL_SIZE: f32 = 10.0;
const SPACER_SIZE: f32 = 6.0;

const BULLET: &str = "•";

/// Builds the resume layout for a profile.
///
/// Sections whose source data is empty are left out entirely.
pub fn build_resume(profile: &CandidateProfile) -> Document {
    log::debug!("Laying out resume for {}", profile.name);

    let mut doc = Document::titled(format!("{} - Resume", profile.name.trim()));
    doc.metadata.author = Some(profile.name.clone());

    doc.push(Paragraph::styled(
        profile.name.clone(),
        bold_run(NAME_SIZE),
        ParagraphStyle::new().aligned(Alignment::Center),
    ));

    let contact = profile.contact_parts();
    if !contact.is_empty() {
        doc.push(Paragraph::styled(
            contact.join(" | "),
            run_style().size(BODY_SIZE),
            ParagraphStyle::new().aligned(Alignment::Center),
        ));
    }
    doc.push(spacer());

    if let Some(summary) = profile.summary() {
        doc.push(section_heading("PROFESSIONAL SUMMARY"));
        doc.push(multiline(&normalize_markup(summary), body(), ParagraphStyle::new()));
        doc.push(spacer());
    }

    if !profile.skills.is_empty() {
        doc.push(section_heading("SKILLS"));
        doc.push(Paragraph::styled(
            profile.skills.join(" • "),
            body(),
            ParagraphStyle::new(),
        ));
        doc.push(spacer());
    }

    if !profile.experience.is_empty() {
        doc.push(section_heading("PROFESSIONAL EXPERIENCE"));
        for exp in &profile.experience {
            doc.push(entry_heading(exp.heading()));
            if !exp.duration.trim().is_empty() {
                doc.push(detail(&exp.duration));
            }
            for line in split_lines(&exp.description) {
                doc.push(Paragraph::styled(
                    bullet_line(&line),
                    body(),
                    ParagraphStyle::new().indented(DESCRIPTION_INDENT_TWIPS),
                ));
            }
            doc.push(spacer());
        }
    }

    if !profile.education.is_empty() {
        doc.push(section_heading("EDUCATION"));
        for edu in &profile.education {
            doc.push(entry_heading(edu.heading()));
            if !edu.year.trim().is_empty() {
                doc.push(detail(&edu.year));
            }
            doc.push(spacer());
        }
    }

    if !profile.certifications.is_empty() {
        doc.push(section_heading("CERTIFICATIONS"));
        for cert in &profile.certifications {
            doc.push(Paragraph::styled(
                format!("{BULLET} {}", cert.trim()),
                body(),
                ParagraphStyle::new().indented(CERTIFICATION_INDENT_TWIPS),
            ));
        }
    }

    doc
}

/// Builds the cover-letter layout.
///
/// Expects a letter that already went through
/// [`CoverLetter::with_defaults`]; without it the recipient block and
/// salutation are simply left out.
pub fn build_cover_letter(letter: &CoverLetter) -> Document {
    let header = &letter.header;
    log::debug!("Laying out cover letter for {}", header.name);

    let mut doc = Document::titled(format!("{} - Cover Letter", header.name.trim()));
    doc.metadata.author = Some(header.name.clone());

    let mut header_para = Paragraph::new();
    header_para.push_text(TextRun::with_style(
        header.name.clone(),
        bold_run(SECTION_HEADING_SIZE),
    ));
    for line in [&header.email, &header.phone] {
        if !line.trim().is_empty() {
            header_para.push_line_break();
            header_para.push_text(TextRun::with_style(line.clone(), body()));
        }
    }
    doc.push(header_para);
    doc.push(spacer());

    doc.push(Paragraph::styled(header.date.clone(), body(), ParagraphStyle::new()));
    doc.push(spacer());

    if let Some(recipient) = &letter.recipient {
        let lines: Vec<&str> = [&recipient.name, &recipient.position, &recipient.company]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        if !lines.is_empty() {
            doc.push(multiline(&lines.join("\n"), body(), ParagraphStyle::new()));
            doc.push(spacer());
        }
    }

    if let Some(salutation) = letter.salutation.as_deref().filter(|s| !s.trim().is_empty()) {
        doc.push(Paragraph::styled(salutation, body(), ParagraphStyle::new()));
        doc.push(spacer());
    }

    for paragraph in &letter.content {
        doc.push(multiline(
            &normalize_markup(paragraph),
            body(),
            ParagraphStyle::new().aligned(Alignment::Justify),
        ));
        doc.push(spacer());
    }

    doc.push(Paragraph::styled(letter.valediction(), body(), ParagraphStyle::new()));
    doc.push(spacer());
    doc.push(spacer());
    doc.push(Paragraph::styled(letter.signature(), body(), ParagraphStyle::new()));

    doc
}

/// Normalizes the leading marker of a description line to "•".
///
/// Lines already starting with "•" are kept, a leading "-" or "*" is
/// replaced, and anything else gets "• " prepended.
pub fn bullet_line(line: &str) -> String {
    if line.starts_with(BULLET) {
        line.to_string()
    } else if let Some(rest) = line.strip_prefix(['-', '*']) {
        format!("{BULLET}{rest}")
    } else {
        format!("{BULLET} {line}")
    }
}

fn run_style() -> TextStyle {
    TextStyle::new().font(DEFAULT_FONT)
}

fn bold_run(points: f32) -> TextStyle {
    let mut style = run_style().size(points);
    style.bold = true;
    style
}

fn body() -> TextStyle {
    run_style().size(BODY_SIZE)
}

fn section_heading(text: &str) -> Paragraph {
    Paragraph::styled(
        text,
        bold_run(SECTION_HEADING_SIZE),
        ParagraphStyle::heading(1).with_bottom_border(Border::rule()),
    )
}

fn entry_heading(text: String) -> Paragraph {
    Paragraph::styled(
        text,
        bold_run(ENTRY_HEADING_SIZE),
        ParagraphStyle::heading(2),
    )
}

fn detail(text: &str) -> Paragraph {
    let mut style = run_style().size(DETAIL_SIZE);
    style.italic = true;
    Paragraph::styled(text.trim(), style, ParagraphStyle::new())
}

fn spacer() -> Paragraph {
    Paragraph::styled("", TextStyle::new().size(SPACER_SIZE), ParagraphStyle::new())
}

/// One paragraph with a line break for every newline in `text`.
fn multiline(text: &str, style: TextStyle, para_style: ParagraphStyle) -> Paragraph {
    let mut para = Paragraph::with_style(para_style);
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            para.push_line_break();
        }
        if !line.is_empty() {
            para.push_text(TextRun::with_style(line, style.clone()));
        }
    }
    if para.content.is_empty() {
        para.push_text(TextRun::with_style("", style));
    }
    para
}
