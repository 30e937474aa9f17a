//! End-to-end tests for both rendering paths.

use cvdoc::document::{Alignment, Document};
use cvdoc::render::{build_cover_letter, build_resume, layout_markup, Layout};
use cvdoc::{
    CandidateProfile, CoverLetter, CoverLetterHeader, DocumentFormat, Education, Error,
    Experience, RenderConfig, RenderPool, Renderer, Subject, TemplateConfig, TemplateKind,
    TemplateRegistry,
};
use std::io::{Cursor, Read};

fn john_doe() -> CandidateProfile {
    let mut profile = CandidateProfile::new("John Doe");
    profile.email = Some("john.doe@example.com".into());
    profile.skills = vec!["Java".into(), "AWS".into()];
    profile.experience = vec![Experience::new(
        "Senior Engineer",
        "Tech Corp",
        "2020-Present",
        "Led development.<br>Shipped v2.",
    )];
    profile
}

fn sarah_letter() -> CoverLetter {
    CoverLetter::new(
        CoverLetterHeader {
            name: "Sarah Johnson".into(),
            email: "sarah@example.com".into(),
            phone: "555-0100".into(),
            date: "March 3, 2025".into(),
        },
        vec![
            "<p>I am writing to apply for the role.</p>".into(),
            "I led a team of <b>five</b> engineers &amp; shipped on time.".into(),
        ],
    )
}

fn texts(document: &Document) -> Vec<String> {
    document.paragraphs.iter().map(|p| p.plain_text()).collect()
}

fn read_part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut xml = String::new();
    part.read_to_string(&mut xml).unwrap();
    xml
}

#[test]
fn test_resume_experience_layout() {
    let document = build_resume(&john_doe());
    let paragraphs = &document.paragraphs;

    let heading = paragraphs
        .iter()
        .position(|p| p.plain_text() == "Senior Engineer - Tech Corp")
        .expect("experience heading");

    let run = paragraphs[heading].runs().next().unwrap();
    assert!(run.style.bold);

    let duration = &paragraphs[heading + 1];
    assert_eq!(duration.plain_text(), "2020-Present");
    assert!(duration.runs().next().unwrap().style.italic);

    assert_eq!(paragraphs[heading + 2].plain_text(), "• Led development.");
    assert_eq!(paragraphs[heading + 3].plain_text(), "• Shipped v2.");
}

#[test]
fn test_resume_omits_empty_sections() {
    let document = build_resume(&CandidateProfile::new("Jane Roe"));
    let text = texts(&document).join("\n");

    assert!(text.contains("Jane Roe"));
    for heading in ["SUMMARY", "SKILLS", "EXPERIENCE", "EDUCATION", "CERTIFICATIONS"] {
        assert!(!text.to_uppercase().contains(heading), "unexpected {heading}");
    }
}

#[test]
fn test_cover_letter_defaults() {
    let letter = sarah_letter().with_defaults();
    let recipient = letter.recipient.as_ref().unwrap();

    assert_eq!(recipient.company.as_deref(), Some("Hiring Team"));
    assert_eq!(letter.salutation.as_deref(), Some("Dear Hiring Manager,"));
    assert_eq!(letter.with_defaults(), letter);
}

#[test]
fn test_cover_letter_body_is_normalized_and_justified() {
    let document = build_cover_letter(&sarah_letter().with_defaults());

    let body = document
        .paragraphs
        .iter()
        .find(|p| p.plain_text().starts_with("I led a team"))
        .expect("body paragraph");
    assert_eq!(body.plain_text(), "I led a team of five engineers & shipped on time.");
    assert_eq!(body.style.alignment, Alignment::Justify);

    let text = texts(&document);
    assert!(text.contains(&"Dear Hiring Manager,".to_string()));
    assert!(text.contains(&"Sincerely,".to_string()));
    assert_eq!(text.last().map(String::as_str), Some("Sarah Johnson"));
}

#[test]
fn test_unknown_template_produces_nothing() {
    let renderer = Renderer::new().unwrap();
    let subject = Subject::from(john_doe());

    let result = renderer.render_pdf(&subject, "fancy_template");
    assert!(matches!(result, Err(Error::TemplateNotFound(_))));

    // Cover-letter ids are not valid for profiles.
    let result = renderer.render_pdf(&subject, "cover_letter_starter_001");
    assert!(matches!(result, Err(Error::TemplateNotFound(_))));
}

#[test]
fn test_docx_output() {
    let renderer = Renderer::new().unwrap();
    let document = renderer.render_docx(&Subject::from(john_doe())).unwrap();

    assert_eq!(document.filename, "John_Doe_resume.docx");
    assert_eq!(document.mime_type(), DocumentFormat::Docx.mime_type());

    let xml = read_part(&document.bytes, "word/document.xml");
    assert!(xml.contains("Senior Engineer - Tech Corp"));
    assert!(xml.contains("• Shipped v2."));
    assert!(xml.contains("john.doe@example.com"));

    let content_types = read_part(&document.bytes, "[Content_Types].xml");
    assert!(content_types.contains("wordprocessingml.document.main+xml"));
}

#[test]
fn test_cover_letter_docx_escapes_text() {
    let mut letter = sarah_letter();
    letter.content = vec!["Salary &lt; market &amp; growth".into()];

    let renderer = Renderer::new().unwrap();
    let document = renderer.render_docx(&Subject::from(letter)).unwrap();
    assert_eq!(document.filename, "Sarah_Johnson_cover_letter.docx");

    let xml = read_part(&document.bytes, "word/document.xml");
    assert!(xml.contains("Salary &lt; market &amp; growth"));
    assert!(xml.contains("Dear Hiring Manager,"));
}

#[test]
fn test_pdf_output() {
    let renderer = Renderer::new().unwrap();
    let document = renderer
        .render_pdf(&Subject::from(john_doe()), "profile_template")
        .unwrap();

    assert_eq!(document.filename, "John_Doe_profile.pdf");
    assert_eq!(document.format, DocumentFormat::Pdf);
    assert!(document.bytes.starts_with(b"%PDF"));
}

/// Laid-out text of a rendered template, lines joined by spaces.
fn page_text(renderer: &Renderer, id: &str, subject: &Subject) -> String {
    let markup = renderer.templates().render(id, subject).unwrap();
    let layout: Layout = layout_markup(&markup).unwrap();
    layout
        .lines()
        .map(|line| line.text())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Asserts each value occurs in `text`, in the given order.
fn assert_in_order(id: &str, text: &str, values: &[&str]) {
    let haystack = text.to_lowercase();
    let mut from = 0;
    for value in values {
        let needle = value.to_lowercase();
        match haystack[from..].find(&needle) {
            Some(at) => from += at + needle.len(),
            None => panic!("{id}: '{value}' missing or out of order in:\n{text}"),
        }
    }
}

#[test]
fn test_cover_letter_pdf_keeps_every_slot_in_order() {
    let renderer = Renderer::new().unwrap();
    let subject = Subject::from(sarah_letter()).with_defaults();

    for id in TemplateRegistry::ids(TemplateKind::CoverLetter) {
        let text = page_text(&renderer, id, &subject);
        assert_in_order(
            id,
            &text,
            &[
                "Sarah Johnson",
                "sarah@example.com",
                "555-0100",
                "March 3, 2025",
                "Hiring Team",
                "Dear Hiring Manager,",
                "I am writing to apply for the role.",
                "I led a team of five engineers & shipped on time.",
                "Sincerely,",
                "Sarah Johnson",
            ],
        );
    }
}

#[test]
fn test_profile_pdf_keeps_every_slot() {
    let mut profile = john_doe();
    profile.phone = Some("555-0199".into());
    profile.location = Some("Austin, TX".into());
    profile.summary = Some("Backend engineer.<br>Open to relocation.".into());
    profile.education = vec![Education::new("B.Sc. Computer Science", "MIT", "2015")];
    profile.certifications = vec!["AWS Solutions Architect".into()];
    let renderer = Renderer::new().unwrap();
    let subject = Subject::from(profile);

    for id in TemplateRegistry::ids(TemplateKind::Profile) {
        let text = page_text(&renderer, id, &subject);
        for value in [
            "John Doe",
            "john.doe@example.com",
            "555-0199",
            "Austin, TX",
            "Backend engineer.",
            "Open to relocation.",
            "Java",
            "AWS",
            "Senior Engineer",
            "Tech Corp",
            "2020-Present",
            "Led development.",
            "Shipped v2.",
            "B.Sc. Computer Science",
            "MIT",
            "2015",
            "AWS Solutions Architect",
        ] {
            assert!(text.contains(value), "{id}: missing '{value}' in:\n{text}");
        }
        assert_in_order(id, &text, &["John Doe", "Senior Engineer", "Led development."]);
    }
}

#[test]
fn test_summary_lines_become_separate_paragraphs() {
    let mut profile = CandidateProfile::new("Jane Roe");
    profile.summary = Some("Backend engineer.<br>Open to relocation.".into());
    let renderer = Renderer::new().unwrap();
    let subject = Subject::from(profile);

    for id in TemplateRegistry::ids(TemplateKind::Profile) {
        let markup = renderer.templates().render(id, &subject).unwrap();
        let lines: Vec<String> = layout_markup(&markup)
            .unwrap()
            .lines()
            .map(|line| line.text())
            .collect();
        assert!(lines.iter().any(|l| l == "Backend engineer."), "{id}: {lines:?}");
        assert!(lines.iter().any(|l| l == "Open to relocation."), "{id}: {lines:?}");
    }
}

#[test]
fn test_template_override_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("profile_template.html"),
        "<html><body><p>Override for {{ name }}</p></body></html>",
    )
    .unwrap();

    let config = RenderConfig::new().with_templates(TemplateConfig::new().with_template_dir(dir.path()));
    let renderer = Renderer::with_config(&config).unwrap();

    let markup = renderer
        .templates()
        .render_profile("profile_template", &john_doe())
        .unwrap();
    assert!(markup.contains("Override for John Doe"));

    // Ids without an override keep their built-in source.
    let markup = renderer
        .templates()
        .render_profile("modern_profile_template", &john_doe())
        .unwrap();
    assert!(!markup.contains("Override"));
}

#[test]
fn test_batch_through_pool() {
    let renderer = Renderer::new().unwrap();
    let pool = RenderPool::new(
        cvdoc::PoolConfig::new()
            .with_workers(1, 2)
            .with_queue_capacity(1),
    )
    .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let renderer = renderer.clone();
            let subject = Subject::from(CandidateProfile::new(format!("Candidate {i}")));
            pool.submit(move || renderer.render_docx(&subject))
        })
        .collect();

    let mut names: Vec<String> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap().filename)
        .collect();
    names.sort();

    assert_eq!(names.len(), 8);
    assert_eq!(names[0], "Candidate_0_resume.docx");
    assert_eq!(names[7], "Candidate_7_resume.docx");
}
