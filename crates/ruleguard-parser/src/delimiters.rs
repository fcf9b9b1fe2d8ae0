//! Expression delimiters
//!
//! Rules are usually written as `${ ... }` (or the deferred form `#{ ... }`).
//! Text without a wrapper is taken as a bare expression.

/// Byte range of the expression body inside `text`, without surrounding
/// whitespace and without one pair of `${`/`#{` and `}`.
pub fn body_range(text: &str) -> (usize, usize) {
    let start = text.len() - text.trim_start().len();
    let end = text.trim_end().len();
    if end < start {
        return (start, start);
    }

    let trimmed = &text[start..end];
    let wrapped = (trimmed.starts_with("${") || trimmed.starts_with("#{"))
        && trimmed.ends_with('}')
        && trimmed.len() >= 3;
    if wrapped {
        (start + 2, end - 1)
    } else {
        (start, end)
    }
}

/// Remove surrounding whitespace and one pair of expression delimiters
pub fn strip_delimiters(text: &str) -> &str {
    let (start, end) = body_range(text);
    &text[start..end]
}

/// True when the text is empty or whitespace only
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// True when the rule has no expression once delimiters are removed
pub fn is_empty_rule(text: &str) -> bool {
    is_blank(strip_delimiters(text))
}
