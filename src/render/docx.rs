//! DOCX (OOXML WordprocessingML) writer for structural documents.

use crate::document::{Alignment, Document, InlineContent, Paragraph, TextRun};
use crate::error::{Error, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::borrow::Cow;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// DOCX package paths.
mod paths {
    pub const CONTENT_TYPES: &str = "[Content_Types].xml";
    pub const ROOT_RELS: &str = "_rels/.rels";
    pub const CORE_PROPS: &str = "docProps/core.xml";
    pub const DOCUMENT: &str = "word/document.xml";
    pub const DOCUMENT_RELS: &str = "word/_rels/document.xml.rels";
    pub const STYLES: &str = "word/styles.xml";
}

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Arial" w:hAnsi="Arial" w:cs="Arial"/><w:sz w:val="22"/><w:szCs w:val="22"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="0" w:line="240" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:outlineLvl w:val="0"/></w:pPr></w:style><w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:outlineLvl w:val="1"/></w:pPr></w:style></w:styles>"#;

/// Serializes a structural document into a DOCX package.
///
/// Any failure while writing XML or the ZIP container is reported as
/// [`Error::DocumentBuild`]; no partial package is returned.
pub fn write_docx(document: &Document) -> Result<Vec<u8>> {
    build_package(document).map_err(|err| match err {
        Error::Io(io) => Error::DocumentBuild(io.to_string()),
        other => other,
    })
}

fn build_package(document: &Document) -> Result<Vec<u8>> {
    let document_xml = document_xml(document)?;
    let core_xml = core_properties_xml(document)?;

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    let parts: [(&str, &[u8]); 6] = [
        (paths::CONTENT_TYPES, CONTENT_TYPES_XML.as_bytes()),
        (paths::ROOT_RELS, ROOT_RELS_XML.as_bytes()),
        (paths::CORE_PROPS, &core_xml),
        (paths::DOCUMENT, &document_xml),
        (paths::DOCUMENT_RELS, DOCUMENT_RELS_XML.as_bytes()),
        (paths::STYLES, STYLES_XML.as_bytes()),
    ];
    for (name, data) in parts {
        zip.start_file(name, options)?;
        zip.write_all(data)?;
    }

    let bytes = zip.finish()?.into_inner();
    log::debug!(
        "DOCX package written: {} paragraphs, {} bytes",
        document.paragraph_count(),
        bytes.len()
    );
    Ok(bytes)
}

/// Builds `word/document.xml`.
fn document_xml(document: &Document) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    write_declaration(&mut writer)?;

    let mut root = BytesStart::new("w:document");
    root.push_attribute(("xmlns:w", NS_W));
    root.push_attribute(("xmlns:r", NS_R));
    writer.write_event(Event::Start(root))?;
    start(&mut writer, "w:body", &[])?;

    for paragraph in &document.paragraphs {
        write_paragraph(&mut writer, paragraph)?;
    }

    // US Letter, 1 inch margins
    start(&mut writer, "w:sectPr", &[])?;
    empty(&mut writer, "w:pgSz", &[("w:w", "12240"), ("w:h", "15840")])?;
    empty(
        &mut writer,
        "w:pgMar",
        &[
            ("w:top", "1440"),
            ("w:right", "1440"),
            ("w:bottom", "1440"),
            ("w:left", "1440"),
            ("w:header", "720"),
            ("w:footer", "720"),
            ("w:gutter", "0"),
        ],
    )?;
    end(&mut writer, "w:sectPr")?;

    end(&mut writer, "w:body")?;
    end(&mut writer, "w:document")?;
    Ok(writer.into_inner())
}

fn write_paragraph<W: Write>(writer: &mut Writer<W>, paragraph: &Paragraph) -> Result<()> {
    start(writer, "w:p", &[])?;

    let style = &paragraph.style;
    let has_props = style.is_heading()
        || style.bottom_border.is_some()
        || style.indent_twips > 0
        || style.alignment != Alignment::Left;

    // Child order follows CT_PPr: pStyle, pBdr, ind, jc
    if has_props {
        start(writer, "w:pPr", &[])?;
        if style.is_heading() {
            let style_id = format!("Heading{}", style.heading_level);
            empty(writer, "w:pStyle", &[("w:val", &style_id)])?;
        }
        if let Some(border) = &style.bottom_border {
            let size = border.size.to_string();
            let space = border.space.to_string();
            start(writer, "w:pBdr", &[])?;
            empty(
                writer,
                "w:bottom",
                &[
                    ("w:val", "single"),
                    ("w:sz", &size),
                    ("w:space", &space),
                    ("w:color", &border.color),
                ],
            )?;
            end(writer, "w:pBdr")?;
        }
        if style.indent_twips > 0 {
            let twips = style.indent_twips.to_string();
            empty(writer, "w:ind", &[("w:left", &twips)])?;
        }
        if style.alignment != Alignment::Left {
            empty(writer, "w:jc", &[("w:val", style.alignment.ooxml_value())])?;
        }
        end(writer, "w:pPr")?;
    }

    for item in &paragraph.content {
        match item {
            InlineContent::Text(run) => write_run(writer, run)?,
            InlineContent::LineBreak => {
                start(writer, "w:r", &[])?;
                empty(writer, "w:br", &[])?;
                end(writer, "w:r")?;
            }
        }
    }

    end(writer, "w:p")
}

fn write_run<W: Write>(writer: &mut Writer<W>, run: &TextRun) -> Result<()> {
    start(writer, "w:r", &[])?;

    let style = &run.style;
    // Child order follows CT_RPr: rFonts, b, i, sz
    if style.has_formatting() {
        start(writer, "w:rPr", &[])?;
        if let Some(font) = &style.font_name {
            empty(
                writer,
                "w:rFonts",
                &[("w:ascii", font), ("w:hAnsi", font), ("w:cs", font)],
            )?;
        }
        if style.bold {
            empty(writer, "w:b", &[])?;
        }
        if style.italic {
            empty(writer, "w:i", &[])?;
        }
        if let Some(half_points) = style.half_points() {
            let size = half_points.to_string();
            empty(writer, "w:sz", &[("w:val", &size)])?;
            empty(writer, "w:szCs", &[("w:val", &size)])?;
        }
        end(writer, "w:rPr")?;
    }

    for (i, line) in run.text.split('\n').enumerate() {
        if i > 0 {
            empty(writer, "w:br", &[])?;
        }
        let line = xml_text(line);
        if !line.is_empty() {
            start(writer, "w:t", &[("xml:space", "preserve")])?;
            writer.write_event(Event::Text(BytesText::new(&line)))?;
            end(writer, "w:t")?;
        }
    }

    end(writer, "w:r")
}

/// Builds `docProps/core.xml` from the document metadata.
fn core_properties_xml(document: &Document) -> Result<Vec<u8>> {
    let meta = &document.metadata;
    let mut writer = Writer::new(Vec::new());
    write_declaration(&mut writer)?;

    start(
        &mut writer,
        "cp:coreProperties",
        &[
            (
                "xmlns:cp",
                "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
            ),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
            ("xmlns:dcterms", "http://purl.org/dc/terms/"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ],
    )?;
    for (element, value) in [("dc:title", &meta.title), ("dc:creator", &meta.author)] {
        if let Some(value) = value {
            start(&mut writer, element, &[])?;
            writer.write_event(Event::Text(BytesText::new(&xml_text(value))))?;
            end(&mut writer, element)?;
        }
    }
    let app = format!("cvdoc {}", crate::VERSION);
    start(&mut writer, "cp:lastModifiedBy", &[])?;
    writer.write_event(Event::Text(BytesText::new(&app)))?;
    end(&mut writer, "cp:lastModifiedBy")?;
    end(&mut writer, "cp:coreProperties")?;

    Ok(writer.into_inner())
}

/// Drops characters XML 1.0 does not allow, such as most C0 controls.
fn xml_text(text: &str) -> Cow<'_, str> {
    fn allowed(c: char) -> bool {
        matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{d7ff}' | '\u{e000}'..='\u{fffd}')
            || c >= '\u{10000}'
    }

    if text.chars().all(allowed) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|&c| allowed(c)).collect())
    }
}

fn write_declaration<W: Write>(writer: &mut Writer<W>) -> Result<()> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    Ok(())
}

fn start<W: Write>(writer: &mut Writer<W>, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
    let mut element = BytesStart::new(name);
    for attr in attrs {
        element.push_attribute(*attr);
    }
    writer.write_event(Event::Start(element))?;
    Ok(())
}

fn empty<W: Write>(writer: &mut Writer<W>, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
    let mut element = BytesStart::new(name);
    for attr in attrs {
        element.push_attribute(*attr);
    }
    writer.write_event(Event::Empty(element))?;
    Ok(())
}

fn end<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
