//! Template filters over the markup normalizer.

use crate::cleanup::{normalize_markup, split_lines};

/// `{{ value|plain }}`: caller markup reduced to plain text.
///
/// The result is escaped like any other value, so markup in free-text fields
/// cannot break the surrounding document.
pub fn plain(value: &str) -> String {
    normalize_markup(value)
}

/// `{% for para in value|paragraphs %}`: non-empty normalized lines, kept
/// verbatim, so each line break in the source becomes its own paragraph.
pub fn paragraphs(value: &str) -> Vec<String> {
    split_lines(value)
}

/// `{% for line in value|lines %}`: non-empty normalized lines with any
/// leading bullet marker removed, for templates that draw their own bullets.
pub fn lines(value: &str) -> Vec<String> {
    split_lines(value)
        .into_iter()
        .map(|line| {
            line.trim_start_matches(['•', '-', '*'])
                .trim_start()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}
