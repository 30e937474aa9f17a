//! # Markup Normalizer
//!
//! Reduces the small markup fragments found in free-text fields (summaries,
//! experience descriptions, letter paragraphs) to plain text for the DOCX path.
//!
//! ## Pipeline Stages
//!
//! 1. **Stage 1: Break Conversion** - `<br>`, `</li>` and `</p>` become newlines
//! 2. **Stage 2: Tag Stripping** - every remaining tag is removed
//! 3. **Stage 3: Entity Decoding** - a fixed table of six named entities
//! 4. **Stage 4: Final Normalization** - 3+ newlines collapse to 2, then trim
//!
//! The order is fixed: later stages rely on the newlines produced earlier.

use regex::Regex;
use std::sync::LazyLock;

// ============================================================================
// Stage 1: Break Conversion
// ============================================================================

static RE_LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());

static RE_LIST_ITEM_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</li\s*>").unwrap());

static RE_PARAGRAPH_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</p\s*>").unwrap());

/// Stage 1: Turn structural closing tags into newlines.
///
/// - Line breaks (`<br>`, `<br/>`, `<br />`) -> `\n`
/// - List item closes -> `\n`
/// - Paragraph closes -> `\n\n`
pub fn stage1_convert_breaks(input: &str) -> String {
    let result = RE_LINE_BREAK.replace_all(input, "\n");
    let result = RE_LIST_ITEM_CLOSE.replace_all(&result, "\n");
    RE_PARAGRAPH_CLOSE.replace_all(&result, "\n\n").into_owned()
}

// ============================================================================
// Stage 2: Tag Stripping
// ============================================================================

static RE_ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Stage 2: Remove every remaining tag without replacement.
pub fn stage2_strip_tags(input: &str) -> String {
    RE_ANY_TAG.replace_all(input, "").into_owned()
}

// ============================================================================
// Stage 3: Entity Decoding
// ============================================================================

/// Entities decoded by the normalizer, in replacement order.
/// Anything else passes through.
const ENTITY_TABLE: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
];

/// Stage 3: Decode the fixed entity table, one entity at a time.
///
/// Each replacement sees the output of the previous one, so `&amp;lt;`
/// becomes `<` while `&amp;nbsp;` stays `&nbsp;`.
pub fn stage3_decode_entities(input: &str) -> String {
    ENTITY_TABLE
        .iter()
        .fold(input.to_string(), |text, (entity, decoded)| {
            if text.contains(entity) {
                text.replace(entity, decoded)
            } else {
                text
            }
        })
}

// ============================================================================
// Stage 4: Final Normalization
// ============================================================================

static RE_MULTIPLE_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Stage 4: Collapse newline runs and trim the result.
pub fn stage4_final_normalize(input: &str) -> String {
    RE_MULTIPLE_NEWLINES
        .replace_all(input, "\n\n")
        .trim()
        .to_string()
}

// ============================================================================
// Main Pipeline
// ============================================================================

/// Reduce a markup fragment to plain text.
///
/// Never fails; malformed markup is handled best-effort. An empty input is
/// returned unchanged.
///
/// # Example
///
/// ```
/// use cvdoc::cleanup::normalize_markup;
///
/// let text = normalize_markup("<p>Led team&nbsp;of 5</p><ul><li>Shipped v2</li></ul>");
/// assert_eq!(text, "Led team of 5\n\nShipped v2");
/// ```
pub fn normalize_markup(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let result = stage1_convert_breaks(input);
    let result = stage2_strip_tags(&result);
    let result = stage3_decode_entities(&result);
    stage4_final_normalize(&result)
}

/// Normalized text split into trimmed, non-empty lines.
pub fn split_lines(input: &str) -> Vec<String> {
    normalize_markup(input)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
