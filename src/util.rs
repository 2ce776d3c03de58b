use std::borrow::Cow;

/// Shortens `text` to at most `max_chars` characters, ending in an ellipsis
/// when anything was cut.
pub fn truncate_label(text: &str, max_chars: usize) -> Cow<'_, str> {
    if text.chars().count() <= max_chars {
        return Cow::Borrowed(text);
    }

    let mut shortened = text
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    shortened.push('…');
    Cow::Owned(shortened)
}

/// Title shown for a node; untitled nodes fall back to a placeholder.
pub fn display_title(title: &str) -> &str {
    let trimmed = title.trim();
    if trimmed.is_empty() { "(untitled)" } else { trimmed }
}
