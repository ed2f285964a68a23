use crate::detector::text_index::TextIndex;

const ELLIPSIS: &str = "...";

/// Context window of `context_chars` characters either side of `[start, end)`.
/// An ellipsis marks each side where the window stops short of the text edge.
/// The window may cut through a word.
pub fn excerpt_from(index: &TextIndex<'_>, start: usize, end: usize, context_chars: usize) -> String {
    let len = index.char_len();
    let window_start = start.saturating_sub(context_chars);
    let window_end = end.saturating_add(context_chars).min(len);

    let body = index.slice(window_start, window_end);
    let mut out = String::with_capacity(body.len() + 2 * ELLIPSIS.len());
    if window_start > 0 {
        out.push_str(ELLIPSIS);
    }
    out.push_str(body);
    if window_end < len {
        out.push_str(ELLIPSIS);
    }
    out
}

pub fn excerpt(text: &str, start: usize, end: usize, context_chars: usize) -> String {
    excerpt_from(&TextIndex::new(text), start, end, context_chars)
}
