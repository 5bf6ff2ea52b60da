// src/parse/lines.rs

/// Everything from the first `@` onwards, or `None` if the text has no marker at all.
///
/// The cut is character-based: `note @X` keeps `@X`.
pub fn from_first_marker(raw: &str) -> Option<&str> {
    raw.find('@').map(|idx| &raw[idx..])
}

/// Split on `\n`, trim each line (which also drops a trailing `\r`) and skip blanks.
pub fn content_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(str::trim).filter(|l| !l.is_empty())
}

/// `true` for a section-start line (`@name`).
pub fn is_marker(line: &str) -> bool {
    line.starts_with('@')
}

/// The trimmed section name after the leading `@`.
pub fn marker_name(line: &str) -> &str {
    line.strip_prefix('@').unwrap_or(line).trim()
}

/// Comma-split a line into trimmed fields. A line with no commas is one field.
pub fn split_fields(line: &str) -> Vec<String> {
    line.split(',').map(|f| f.trim().to_string()).collect()
}
