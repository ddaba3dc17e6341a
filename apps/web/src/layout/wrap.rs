//! Greedy word wrapping against measured font widths.

use crate::layout::font_metrics::FontMetricTable;

/// Wraps `text` into lines no wider than `max_width` points.
///
/// Words are never split: a word wider than the line occupies a line of its own.
/// Whitespace-only input yields no lines.
pub fn wrap_text(text: &str, metrics: &FontMetricTable, size_pt: f32, max_width: f32) -> Vec<String> {
    let space_w = metrics.space_width(size_pt);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0_f32;

    for word in text.split_whitespace() {
        let word_w = metrics.measure_str(word, size_pt);
        if current.is_empty() {
            current.push_str(word);
            current_width = word_w;
        } else if current_width + space_w + word_w > max_width {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_width = word_w;
        } else {
            current.push(' ');
            current.push_str(word);
            current_width += space_w + word_w;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Wraps and keeps at most `max_lines` lines.
pub fn wrap_clipped(
    text: &str,
    metrics: &FontMetricTable,
    size_pt: f32,
    max_width: f32,
    max_lines: usize,
) -> Vec<String> {
    let mut lines = wrap_text(text, metrics, size_pt, max_width);
    lines.truncate(max_lines);
    lines
}

const ELLIPSIS: &str = "...";

/// Shortens a single-line `text` so it fits in `max_width` points, marking the cut with
/// "...". Text that already fits is returned unchanged.
pub fn ellipsize(text: &str, metrics: &FontMetricTable, size_pt: f32, max_width: f32) -> String {
    if metrics.measure_str(text, size_pt) <= max_width {
        return text.to_string();
    }
    let budget = max_width - metrics.measure_str(ELLIPSIS, size_pt);
    let mut kept = String::new();
    let mut width = 0.0_f32;
    for c in text.chars() {
        let char_w = metrics.measure_str(c.encode_utf8(&mut [0; 4]), size_pt);
        if width + char_w > budget {
            break;
        }
        kept.push(c);
        width += char_w;
    }
    kept.truncate(kept.trim_end().len());
    kept.push_str(ELLIPSIS);
    kept
}
