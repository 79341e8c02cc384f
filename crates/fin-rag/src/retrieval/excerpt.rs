//! Word-boundary-safe excerpts for search results

/// Marker appended to truncated excerpts
pub const ELLIPSIS: &str = "...";

const SENTENCE_TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Cut points before this fraction of `max_len` are ignored
const MIN_CUT_RATIO: f64 = 0.7;

/// Shorten `text` to at most `max_len` characters.
///
/// Text that already fits is returned unchanged. Otherwise the cut prefers the
/// last sentence terminator past 70% of `max_len` (kept, no ellipsis), then the
/// last whitespace past 70% (ellipsis appended), then a hard cut (ellipsis appended).
pub fn excerpt(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().take(max_len).collect();
    let threshold = max_len as f64 * MIN_CUT_RATIO;

    if let Some(pos) = chars.iter().rposition(|c| SENTENCE_TERMINATORS.contains(c)) {
        if pos as f64 > threshold {
            return chars[..=pos].iter().collect();
        }
    }

    if let Some(pos) = chars.iter().rposition(|c| c.is_whitespace()) {
        if pos as f64 > threshold {
            let mut cut: String = chars[..pos].iter().collect();
            cut.push_str(ELLIPSIS);
            return cut;
        }
    }

    let mut cut: String = chars.into_iter().collect();
    cut.push_str(ELLIPSIS);
    cut
}
