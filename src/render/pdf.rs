//! Markup to PDF conversion for the visual path.

use super::layout::{
    encode_win_ansi, layout_markup, Layout, Page, MARGIN, PAGE_HEIGHT, PAGE_WIDTH,
};
use crate::error::{Error, Result};
use printpdf::{
    Color, DictItem, Line, LinePoint, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, Point, Pt, Rgb,
};
use quick_xml::events::Event;
use quick_xml::Reader;

const TEXT_COLOR: (f32, f32, f32) = (0.13, 0.13, 0.13);
const RULE_THICKNESS: f32 = 0.75;

/// Converts rendered template markup into PDF bytes.
///
/// The markup must be well-formed (balanced, properly nested elements, XHTML
/// style void tags). Text is laid out in the standard Helvetica faces; on
/// failure no bytes are returned.
///
/// # Errors
///
/// Returns [`Error::Conversion`] if the markup is malformed or the writer
/// produces nothing.
pub fn markup_to_pdf(markup: &str) -> Result<Vec<u8>> {
    if let Err(err) = check_well_formed(markup) {
        log::error!("PDF conversion rejected malformed markup: {err}");
        return Err(err);
    }

    let layout = layout_markup(markup)?;
    let bytes = write_layout(&layout, true);
    if bytes.is_empty() {
        log::error!("PDF conversion produced no output");
        return Err(Error::Conversion("converter produced no output".into()));
    }

    log::debug!(
        "PDF written: {} page(s), {} bytes",
        layout.pages.len(),
        bytes.len()
    );
    Ok(bytes)
}

/// Serializes laid-out pages. `compress` controls stream compression.
pub(crate) fn write_layout(layout: &Layout, compress: bool) -> Vec<u8> {
    let mut document = PdfDocument::new(layout.title.as_deref().unwrap_or("Document"));
    let pages = layout
        .pages
        .iter()
        .map(|page| {
            PdfPage::new(
                Mm::from(Pt(PAGE_WIDTH)),
                Mm::from(Pt(PAGE_HEIGHT)),
                page_ops(page),
            )
        })
        .collect();
    document.with_pages(pages);

    // Text operators are emitted pre-encoded, so they must not be filtered out.
    let options = PdfSaveOptions {
        optimize: compress,
        secure: false,
        ..PdfSaveOptions::default()
    };
    let mut warnings = Vec::new();
    let bytes = document.save(&options, &mut warnings);
    for warning in &warnings {
        log::warn!("PDF writer warning: {warning:?}");
    }
    bytes
}

fn page_ops(page: &Page) -> Vec<Op> {
    let (r, g, b) = TEXT_COLOR;
    let color = Color::Rgb(Rgb {
        r,
        g,
        b,
        icc_profile: None,
    });

    let mut ops = vec![
        Op::SaveGraphicsState,
        Op::SetFillColor { col: color.clone() },
    ];

    for line in &page.lines {
        for run in &line.runs {
            let font = run.style.builtin();
            ops.extend([
                Op::StartTextSection,
                Op::SetFontSizeBuiltinFont {
                    size: Pt(run.size),
                    font,
                },
                Op::SetTextCursor {
                    pos: Point {
                        x: Pt(run.x),
                        y: Pt(line.baseline),
                    },
                },
                // Declares the font resource; nothing is drawn for no items.
                Op::WriteTextBuiltinFont {
                    items: Vec::new(),
                    font,
                },
                Op::Unknown {
                    key: "Tj".into(),
                    value: vec![text_string(&run.text)],
                },
                Op::EndTextSection,
            ]);
        }
    }

    if !page.rules.is_empty() {
        ops.push(Op::SetOutlineColor { col: color });
        ops.push(Op::SetOutlineThickness {
            pt: Pt(RULE_THICKNESS),
        });
    }
    for &y in &page.rules {
        let point = |x: f32| LinePoint {
            p: Point { x: Pt(x), y: Pt(y) },
            bezier: false,
        };
        ops.push(Op::DrawLine {
            line: Line {
                points: vec![point(MARGIN), point(PAGE_WIDTH - MARGIN)],
                is_closed: false,
            },
        });
    }

    ops.push(Op::RestoreGraphicsState);
    ops
}

/// WinAnsi-encoded string operand; printable ASCII stays literal.
fn text_string(text: &str) -> DictItem {
    let data = encode_win_ansi(text);
    let literal = data
        .iter()
        .all(|&b| (0x20..0x7f).contains(&b) && !matches!(b, b'(' | b')' | b'\\'));
    DictItem::String { data, literal }
}

/// Checks that markup is a single well-formed element tree.
///
/// Text content and entities are not interpreted; only element structure is
/// verified.
pub fn check_well_formed(markup: &str) -> Result<()> {
    let mut reader = Reader::from_str(markup);
    let mut depth: usize = 0;
    let mut saw_element = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => {
                depth += 1;
                saw_element = true;
            }
            Ok(Event::Empty(_)) => saw_element = true,
            Ok(Event::End(e)) => {
                if depth == 0 {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    return Err(malformed(&reader, format!("unexpected closing tag </{name}>")));
                }
                depth -= 1;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(malformed(&reader, e.to_string())),
        }
    }

    if depth != 0 {
        return Err(Error::Conversion(format!(
            "malformed markup: {depth} element(s) left unclosed"
        )));
    }
    if !saw_element {
        return Err(Error::Conversion("malformed markup: no elements".into()));
    }
    Ok(())
}

fn malformed(reader: &Reader<&[u8]>, detail: String) -> Error {
    Error::Conversion(format!(
        "malformed markup at byte {}: {detail}",
        reader.buffer_position()
    ))
}
