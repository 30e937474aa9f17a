//! Flow layout for rendered template markup.
//!
//! Markup is read as block elements (headings, paragraphs, list items) that
//! hold styled inline text. Each block is wrapped to the content width and
//! stacked top to bottom; a new page starts when the next line would cross
//! the bottom margin.

use crate::error::{Error, Result};
use printpdf::BuiltinFont;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// A4 width in points.
pub const PAGE_WIDTH: f32 = 595.28;
/// A4 height in points.
pub const PAGE_HEIGHT: f32 = 841.89;
/// Margin on every side, in points.
pub const MARGIN: f32 = 54.0;

const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const LINE_SPACING: f32 = 1.3;
const LIST_INDENT: f32 = 16.0;
const BULLET: char = '\u{2022}';

/// Helvetica advance widths for ' '..='~', in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];
const DEFAULT_WIDTH: u16 = 556;
const BOLD_FACTOR: f32 = 1.08;

/// Font face of a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    fn from_flags(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => FontStyle::Regular,
            (true, false) => FontStyle::Bold,
            (false, true) => FontStyle::Italic,
            (true, true) => FontStyle::BoldItalic,
        }
    }

    fn is_bold(self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::BoldItalic)
    }

    fn is_italic(self) -> bool {
        matches!(self, FontStyle::Italic | FontStyle::BoldItalic)
    }

    fn bolder(self) -> Self {
        Self::from_flags(true, self.is_italic())
    }

    /// The standard PDF font used for this style.
    pub fn builtin(self) -> BuiltinFont {
        match self {
            FontStyle::Regular => BuiltinFont::Helvetica,
            FontStyle::Bold => BuiltinFont::HelveticaBold,
            FontStyle::Italic => BuiltinFont::HelveticaOblique,
            FontStyle::BoldItalic => BuiltinFont::HelveticaBoldOblique,
        }
    }
}

/// Kind of a block element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// `h1`..`h6`
    Heading(u8),
    Paragraph,
    ListItem,
}

struct BlockMetrics {
    size: f32,
    bold: bool,
    space_before: f32,
    space_after: f32,
    indent: f32,
    rule: bool,
}

impl BlockKind {
    fn metrics(self) -> BlockMetrics {
        let body = BlockMetrics {
            size: 11.0,
            bold: false,
            space_before: 0.0,
            space_after: 6.0,
            indent: 0.0,
            rule: false,
        };
        match self {
            BlockKind::Heading(1) => BlockMetrics {
                size: 20.0,
                bold: true,
                space_after: 4.0,
                ..body
            },
            BlockKind::Heading(2) => BlockMetrics {
                size: 13.0,
                bold: true,
                space_before: 10.0,
                space_after: 6.0,
                rule: true,
                ..body
            },
            BlockKind::Heading(_) => BlockMetrics {
                size: 12.0,
                bold: true,
                space_before: 6.0,
                space_after: 2.0,
                ..body
            },
            BlockKind::Paragraph => body,
            BlockKind::ListItem => BlockMetrics {
                space_after: 2.0,
                indent: LIST_INDENT,
                ..body
            },
        }
    }
}

/// Inline content of a block.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text { style: FontStyle, text: String },
    /// Forced line break (`<br/>`)
    Break,
}

/// A block element with its collapsed inline text.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    pub inlines: Vec<Inline>,
}

impl Block {
    /// Text of the block with forced breaks as `\n`.
    pub fn text(&self) -> String {
        self.inlines
            .iter()
            .map(|inline| match inline {
                Inline::Text { text, .. } => text.as_str(),
                Inline::Break => "\n",
            })
            .collect()
    }
}

/// A run of same-styled text at a horizontal position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRun {
    pub x: f32,
    pub size: f32,
    pub style: FontStyle,
    pub text: String,
}

/// One line of text; `baseline` is measured from the bottom of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub baseline: f32,
    pub runs: Vec<PlacedRun>,
}

impl PlacedLine {
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

/// A laid-out page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
    /// Heights of horizontal rules spanning the content width.
    pub rules: Vec<f32>,
}

/// Result of laying out a markup document.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    /// Content of `<title>`, if any.
    pub title: Option<String>,
    pub pages: Vec<Page>,
}

impl Layout {
    /// Every line of text in reading order.
    pub fn lines(&self) -> impl Iterator<Item = &PlacedLine> {
        self.pages.iter().flat_map(|page| page.lines.iter())
    }
}

/// Parses markup and lays it out onto pages.
pub fn layout_markup(markup: &str) -> Result<Layout> {
    let parsed = parse_blocks(markup)?;
    Ok(Layout {
        title: parsed.title,
        pages: layout(&parsed.blocks),
    })
}

/// Blocks read from a markup document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedMarkup {
    pub title: Option<String>,
    pub blocks: Vec<Block>,
}

enum Element {
    Hidden,
    Title,
    Block(BlockKind),
    Bold,
    Italic,
    Break,
    Inline,
}

impl Element {
    fn classify(tag: &[u8]) -> Self {
        match tag {
            b"head" | b"style" | b"script" | b"meta" | b"link" => Element::Hidden,
            b"title" => Element::Title,
            b"h1" => Element::Block(BlockKind::Heading(1)),
            b"h2" => Element::Block(BlockKind::Heading(2)),
            b"h3" => Element::Block(BlockKind::Heading(3)),
            b"h4" | b"h5" | b"h6" => Element::Block(BlockKind::Heading(4)),
            b"li" => Element::Block(BlockKind::ListItem),
            b"html" | b"body" | b"div" | b"p" | b"ul" | b"ol" | b"section" | b"header"
            | b"footer" | b"article" | b"table" | b"tr" | b"td" | b"th" | b"blockquote"
            | b"hr" => Element::Block(BlockKind::Paragraph),
            b"strong" | b"b" => Element::Bold,
            b"em" | b"i" => Element::Italic,
            b"br" => Element::Break,
            _ => Element::Inline,
        }
    }
}

fn tag_name(e: &BytesStart<'_>) -> Vec<u8> {
    e.local_name().as_ref().to_ascii_lowercase()
}

fn resolve_entity(entity: &str) -> Option<&'static str> {
    match entity {
        "nbsp" => Some(" "),
        other => resolve_predefined_entity(other),
    }
}

/// Reads block elements and their text from markup.
///
/// Content of `<head>` is skipped apart from the title. Whitespace collapses
/// the way a browser collapses it; `<strong>`/`<b>` and `<em>`/`<i>` select
/// the font style.
pub fn parse_blocks(markup: &str) -> Result<ParsedMarkup> {
    let mut reader = Reader::from_str(markup);
    let mut collector = BlockCollector::default();
    let mut kinds: Vec<BlockKind> = Vec::new();
    let mut title: Option<String> = None;
    let mut hidden = 0usize;
    let mut in_title = false;
    let mut bold = 0usize;
    let mut italic = 0usize;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::Conversion(format!(
                "malformed markup at byte {}: {e}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(e) => match Element::classify(&tag_name(&e)) {
                Element::Hidden => hidden += 1,
                Element::Title => in_title = true,
                Element::Block(kind) => {
                    collector.flush();
                    kinds.push(kind);
                }
                Element::Bold => bold += 1,
                Element::Italic => italic += 1,
                Element::Break | Element::Inline => {}
            },
            Event::End(e) => {
                let tag = e.local_name().as_ref().to_ascii_lowercase();
                match Element::classify(&tag) {
                    Element::Hidden => hidden = hidden.saturating_sub(1),
                    Element::Title => in_title = false,
                    Element::Block(_) => {
                        collector.flush();
                        kinds.pop();
                    }
                    Element::Bold => bold = bold.saturating_sub(1),
                    Element::Italic => italic = italic.saturating_sub(1),
                    Element::Break | Element::Inline => {}
                }
            }
            Event::Empty(e) => match Element::classify(&tag_name(&e)) {
                Element::Break if hidden == 0 => collector.push_break(),
                Element::Block(_) => collector.flush(),
                _ => {}
            },
            Event::Text(t) => {
                let text = t.unescape_with(resolve_entity).map_err(|e| {
                    Error::Conversion(format!(
                        "malformed markup at byte {}: {e}",
                        reader.buffer_position()
                    ))
                })?;
                if in_title {
                    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
                    if !collapsed.is_empty() {
                        title = Some(collapsed);
                    }
                } else if hidden == 0 {
                    let kind = kinds.last().copied().unwrap_or(BlockKind::Paragraph);
                    let style = FontStyle::from_flags(bold > 0, italic > 0);
                    collector.push_text(kind, style, &text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    collector.flush();
    Ok(ParsedMarkup {
        title,
        blocks: collector.blocks,
    })
}

#[derive(Default)]
struct BlockCollector {
    blocks: Vec<Block>,
    current: Option<Block>,
    pending_space: bool,
}

impl BlockCollector {
    fn flush(&mut self) {
        if let Some(mut block) = self.current.take() {
            while matches!(block.inlines.last(), Some(Inline::Break)) {
                block.inlines.pop();
            }
            if !block.inlines.is_empty() {
                self.blocks.push(block);
            }
        }
        self.pending_space = false;
    }

    fn push_text(&mut self, kind: BlockKind, style: FontStyle, text: &str) {
        for ch in text.chars() {
            if ch.is_whitespace() {
                self.pending_space = true;
                continue;
            }
            if ch.is_control() {
                continue;
            }

            let block = self.current.get_or_insert_with(|| Block {
                kind,
                inlines: Vec::new(),
            });
            let starts_line = matches!(block.inlines.last(), None | Some(Inline::Break));
            let space = std::mem::take(&mut self.pending_space) && !starts_line;

            match block.inlines.last_mut() {
                Some(Inline::Text { style: current, text }) if *current == style => {
                    if space {
                        text.push(' ');
                    }
                    text.push(ch);
                }
                _ => {
                    let mut text = String::new();
                    if space {
                        text.push(' ');
                    }
                    text.push(ch);
                    block.inlines.push(Inline::Text { style, text });
                }
            }
        }
    }

    fn push_break(&mut self) {
        if let Some(block) = self.current.as_mut() {
            block.inlines.push(Inline::Break);
        }
        self.pending_space = false;
    }
}

/// Advance width of `text` in points.
pub fn text_width(text: &str, style: FontStyle, size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| match c {
            ' '..='~' => u32::from(HELVETICA_WIDTHS[c as usize - 32]),
            _ => u32::from(DEFAULT_WIDTH),
        })
        .sum();
    let width = units as f32 * size / 1000.0;
    if style.is_bold() {
        width * BOLD_FACTOR
    } else {
        width
    }
}

/// Stacks blocks onto pages.
pub fn layout(blocks: &[Block]) -> Vec<Page> {
    let mut flow = Flow::new();
    for block in blocks {
        flow.place(block);
    }
    flow.finish()
}

struct Flow {
    pages: Vec<Page>,
    page: Page,
    cursor: f32,
}

impl Flow {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            page: Page::default(),
            cursor: PAGE_HEIGHT - MARGIN,
        }
    }

    fn at_top(&self) -> bool {
        self.page.lines.is_empty()
    }

    fn remaining(&self) -> f32 {
        self.cursor - MARGIN
    }

    fn new_page(&mut self) {
        let page = std::mem::take(&mut self.page);
        self.pages.push(page);
        self.cursor = PAGE_HEIGHT - MARGIN;
    }

    fn place(&mut self, block: &Block) {
        let metrics = block.kind.metrics();
        let line_height = metrics.size * LINE_SPACING;
        let lines = wrap(&block.inlines, &metrics, CONTENT_WIDTH - metrics.indent);
        if lines.is_empty() {
            return;
        }

        if !self.at_top() {
            self.cursor -= metrics.space_before;
        }
        // A heading moves to the next page together with the line after it.
        let keep = match block.kind {
            BlockKind::Heading(_) => (lines.len() + 1) as f32 * line_height,
            _ => line_height,
        };
        if !self.at_top() && self.remaining() < keep {
            self.new_page();
        }

        let left = MARGIN + metrics.indent;
        for (i, runs) in lines.into_iter().enumerate() {
            if !self.at_top() && self.remaining() < line_height {
                self.new_page();
            }
            self.cursor -= line_height;
            let baseline = self.cursor + (line_height - metrics.size) / 2.0 + metrics.size * 0.2;

            let mut placed: Vec<PlacedRun> = runs
                .into_iter()
                .map(|run| PlacedRun {
                    x: run.x + left,
                    ..run
                })
                .collect();
            if i == 0 && block.kind == BlockKind::ListItem {
                placed.insert(
                    0,
                    PlacedRun {
                        x: left - LIST_INDENT * 0.75,
                        size: metrics.size,
                        style: FontStyle::Regular,
                        text: BULLET.to_string(),
                    },
                );
            }
            self.page.lines.push(PlacedLine {
                baseline,
                runs: placed,
            });
        }

        if metrics.rule {
            self.cursor -= 2.0;
            self.page.rules.push(self.cursor);
        }
        self.cursor -= metrics.space_after;
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.page.lines.is_empty() || self.pages.is_empty() {
            self.pages.push(self.page);
        }
        self.pages
    }
}

#[derive(Default)]
struct LineBuilder {
    runs: Vec<PlacedRun>,
    width: f32,
}

impl LineBuilder {
    fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    fn take(&mut self) -> Vec<PlacedRun> {
        self.width = 0.0;
        std::mem::take(&mut self.runs)
    }

    fn append(&mut self, word: &str, spaced: bool, style: FontStyle, size: f32) {
        let gap = if spaced && !self.is_empty() {
            text_width(" ", style, size)
        } else {
            0.0
        };
        let word_width = text_width(word, style, size);

        match self.runs.last_mut() {
            Some(run) if run.style == style => {
                if gap > 0.0 {
                    run.text.push(' ');
                }
                run.text.push_str(word);
            }
            _ => {
                let text = if gap > 0.0 {
                    format!(" {word}")
                } else {
                    word.to_string()
                };
                self.runs.push(PlacedRun {
                    x: self.width,
                    size,
                    style,
                    text,
                });
            }
        }
        self.width += gap + word_width;
    }
}

/// Greedy word wrap; a word wider than the line is split across lines.
fn wrap(inlines: &[Inline], metrics: &BlockMetrics, width: f32) -> Vec<Vec<PlacedRun>> {
    let mut lines = Vec::new();
    let mut line = LineBuilder::default();
    let size = metrics.size;

    for inline in inlines {
        let (style, text) = match inline {
            Inline::Break => {
                lines.push(line.take());
                continue;
            }
            Inline::Text { style, text } => {
                let style = if metrics.bold { style.bolder() } else { *style };
                (style, text)
            }
        };

        let mut spaced = false;
        for (i, word) in text.split(' ').enumerate() {
            if i > 0 {
                spaced = true;
            }
            if word.is_empty() {
                continue;
            }

            let gap = if spaced { text_width(" ", style, size) } else { 0.0 };
            if !line.is_empty() && line.width + gap + text_width(word, style, size) > width {
                lines.push(line.take());
            }

            let mut rest = word;
            while line.is_empty() && text_width(rest, style, size) > width {
                let split = fitting_prefix(rest, style, size, width);
                line.append(&rest[..split], false, style, size);
                lines.push(line.take());
                rest = &rest[split..];
            }
            if !rest.is_empty() {
                line.append(rest, spaced, style, size);
            }
            spaced = false;
        }
    }

    if !line.is_empty() {
        lines.push(line.take());
    }
    lines
}

/// Byte length of the longest prefix of `word` that fits in `width`, at
/// least one character.
fn fitting_prefix(word: &str, style: FontStyle, size: f32, width: f32) -> usize {
    let mut end = 0;
    for (i, c) in word.char_indices() {
        let next = i + c.len_utf8();
        if end > 0 && text_width(&word[..next], style, size) > width {
            break;
        }
        end = next;
    }
    end
}

/// Encodes text for a standard font with WinAnsiEncoding.
///
/// Characters outside the code page become `?`; control characters are
/// dropped.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            ' '..='~' | '\u{a0}'..='\u{ff}' => c as u8,
            '\u{20ac}' => 0x80,
            '\u{201a}' => 0x82,
            '\u{0192}' => 0x83,
            '\u{201e}' => 0x84,
            '\u{2026}' => 0x85,
            '\u{2020}' => 0x86,
            '\u{2021}' => 0x87,
            '\u{02c6}' => 0x88,
            '\u{2030}' => 0x89,
            '\u{0160}' => 0x8a,
            '\u{2039}' => 0x8b,
            '\u{0152}' => 0x8c,
            '\u{017d}' => 0x8e,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{02dc}' => 0x98,
            '\u{2122}' => 0x99,
            '\u{0161}' => 0x9a,
            '\u{203a}' => 0x9b,
            '\u{0153}' => 0x9c,
            '\u{017e}' => 0x9e,
            '\u{0178}' => 0x9f,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(layout: &Layout) -> Vec<String> {
        layout.lines().map(PlacedLine::text).collect()
    }

    #[test]
    fn test_text_in_any_block_is_kept() {
        let markup = r#"<html><head><title>Letter</title><style>.name { color: red; }</style></head>
<body><div class="header"><div class="name">Sarah Johnson</div><div>sarah@example.com</div></div>
<p>Body text</p></body></html>"#;
        let layout = layout_markup(markup).unwrap();

        assert_eq!(layout.title.as_deref(), Some("Letter"));
        assert_eq!(
            texts(&layout),
            vec!["Sarah Johnson", "sarah@example.com", "Body text"]
        );
    }

    #[test]
    fn test_whitespace_collapses() {
        let parsed = parse_blocks("<p>\n  Senior\n   Engineer  <em>at</em>  Acme\n</p>").unwrap();
        assert_eq!(parsed.blocks.len(), 1);
        assert_eq!(parsed.blocks[0].text(), "Senior Engineer at Acme");
    }

    #[test]
    fn test_inline_styles() {
        let parsed = parse_blocks("<p><strong>Lead</strong> and <em>notes</em></p>").unwrap();
        let styles: Vec<FontStyle> = parsed.blocks[0]
            .inlines
            .iter()
            .filter_map(|inline| match inline {
                Inline::Text { style, .. } => Some(*style),
                Inline::Break => None,
            })
            .collect();
        assert_eq!(
            styles,
            vec![FontStyle::Bold, FontStyle::Regular, FontStyle::Italic]
        );
    }

    #[test]
    fn test_line_breaks() {
        let parsed = parse_blocks("<p>Jane Roe<br/>\nHiring Manager<br/>\n</p>").unwrap();
        assert_eq!(parsed.blocks[0].text(), "Jane Roe\nHiring Manager");

        let layout = layout(&parsed.blocks);
        assert_eq!(layout[0].lines.len(), 2);
    }

    #[test]
    fn test_entities_are_decoded() {
        let parsed = parse_blocks("<p>R&amp;D &lt;team&gt; O&#x27;Brien&nbsp;Co</p>").unwrap();
        assert_eq!(parsed.blocks[0].text(), "R&D <team> O'Brien Co");
    }

    #[test]
    fn test_lines_move_down_the_page() {
        let markup = "<body><h1>Name</h1><h2>Summary</h2><p>One</p><p>Two</p><ul><li>Three</li></ul></body>";
        let pages = layout_markup(markup).unwrap().pages;
        assert_eq!(pages.len(), 1);

        let baselines: Vec<f32> = pages[0].lines.iter().map(|l| l.baseline).collect();
        assert_eq!(baselines.len(), 5);
        assert!(baselines.windows(2).all(|w| w[0] > w[1]), "{baselines:?}");
        assert!(baselines.iter().all(|&y| y > MARGIN && y < PAGE_HEIGHT - MARGIN));
        assert_eq!(pages[0].rules.len(), 1);
    }

    #[test]
    fn test_fonts_follow_markup() {
        let markup = "<body><h1>Name</h1><p>Plain <em>dates</em></p></body>";
        let layout = layout_markup(markup).unwrap();
        let lines: Vec<&PlacedLine> = layout.lines().collect();

        assert_eq!(lines[0].runs[0].style.builtin(), BuiltinFont::HelveticaBold);
        assert!(lines[0].runs[0].size > lines[1].runs[0].size);
        assert_eq!(lines[1].runs[0].style.builtin(), BuiltinFont::Helvetica);
        assert_eq!(lines[1].runs[1].style.builtin(), BuiltinFont::HelveticaOblique);
        assert!(lines[1].runs[1].x > lines[1].runs[0].x);
    }

    #[test]
    fn test_long_paragraph_wraps_within_margins() {
        let sentence = "Delivered the quarterly platform migration on schedule. ".repeat(20);
        let layout = layout_markup(&format!("<p>{sentence}</p>")).unwrap();
        let lines: Vec<&PlacedLine> = layout.lines().collect();

        assert!(lines.len() > 5);
        for line in &lines {
            let run = &line.runs[0];
            assert!(text_width(&run.text, run.style, run.size) <= CONTENT_WIDTH + 0.01);
        }
        let joined = lines
            .iter()
            .map(|l| l.text())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(joined, sentence.trim_end());
    }

    #[test]
    fn test_unbroken_word_is_split() {
        let word = "x".repeat(400);
        let layout = layout_markup(&format!("<p>{word}</p>")).unwrap();
        let rebuilt: String = layout.lines().map(PlacedLine::text).collect();
        assert_eq!(rebuilt, word);
        assert!(layout.lines().count() > 1);
    }

    #[test]
    fn test_flows_onto_new_pages() {
        let items: String = (0..120).map(|i| format!("<li>Point {i}</li>")).collect();
        let layout = layout_markup(&format!("<body><h1>Name</h1><ul>{items}</ul></body>")).unwrap();

        assert!(layout.pages.len() > 1);
        for page in &layout.pages {
            assert!(!page.lines.is_empty());
            assert!(page.lines.iter().all(|l| l.baseline >= MARGIN));
            assert!(page.lines.windows(2).all(|w| w[0].baseline > w[1].baseline));
        }
        // Nothing lost across the break.
        let count = layout
            .lines()
            .filter(|l| l.text().starts_with('\u{2022}'))
            .count();
        assert_eq!(count, 120);
        let last = layout.lines().last().unwrap().text();
        assert!(last.ends_with("Point 119"));
    }

    #[test]
    fn test_heading_keeps_with_next_line() {
        // Leaves room for the heading alone but not for the line after it.
        let filler: String = (0..34).map(|i| format!("<p>Line {i}</p>")).collect();
        let markup = format!("<body>{filler}<h2>Education</h2><p>BSc</p></body>");
        let layout = layout_markup(&markup).unwrap();

        assert_eq!(layout.pages.len(), 2);
        assert_eq!(layout.pages[0].lines.len(), 34);
        assert_eq!(layout.pages[1].lines[0].text(), "Education");
        assert_eq!(layout.pages[1].lines[1].text(), "BSc");
    }

    #[test]
    fn test_list_items_get_bullets() {
        let layout = layout_markup("<ul><li>Led team</li></ul>").unwrap();
        let line = layout.lines().next().unwrap();
        assert_eq!(line.runs[0].text, "\u{2022}");
        assert!(line.runs[0].x < line.runs[1].x);
        assert_eq!(line.runs[1].text, "Led team");
    }

    #[test]
    fn test_empty_body_gives_one_blank_page() {
        let pages = layout_markup("<html><body></body></html>").unwrap().pages;
        assert_eq!(pages, vec![Page::default()]);
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(encode_win_ansi("Plain (text)"), b"Plain (text)".to_vec());
        assert_eq!(encode_win_ansi("\u{2022} caf\u{e9}"), vec![0x95, b' ', b'c', b'a', b'f', 0xe9]);
        assert_eq!(encode_win_ansi("\u{2019}\u{2013}\u{2026}"), vec![0x92, 0x96, 0x85]);
        assert_eq!(encode_win_ansi("\u{4e2d}"), b"?".to_vec());
        assert_eq!(encode_win_ansi("a\u{7}b"), b"ab".to_vec());
    }
}
