//! Sheet-title and file-name sanitization.

/// Longest sheet title the xlsx format accepts.
pub const MAX_SHEET_TITLE_CHARS: usize = 31;

/// Characters the xlsx format rejects in a sheet title.
pub const ILLEGAL_TITLE_CHARS: [char; 7] = [':', '\\', '/', '?', '*', '[', ']'];

pub const GROUP_FILE_SUFFIX: &str = "_registrations.xlsx";

/// Strips illegal characters, truncates to the title limit and substitutes `fallback`
/// when nothing usable remains.
pub fn sanitize_sheet_title(raw: &str, fallback: &str) -> String {
    let stripped: String = raw
        .chars()
        .filter(|c| !ILLEGAL_TITLE_CHARS.contains(c) && !c.is_control())
        .collect();
    let truncated: String = stripped.chars().take(MAX_SHEET_TITLE_CHARS).collect();
    // Excel also refuses titles that begin or end with an apostrophe.
    let cleaned = truncated.trim().trim_matches('\'').trim();

    if cleaned.is_empty() {
        fallback.chars().take(MAX_SHEET_TITLE_CHARS).collect()
    } else {
        cleaned.to_string()
    }
}

/// Keeps alphanumerics, spaces, hyphens and underscores; spaces become underscores.
pub fn sanitize_display_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim()
        .replace(' ', "_")
}

/// Removes characters that would escape the output directory or upset spreadsheet hosts.
pub fn sanitize_file_component(raw: &str) -> String {
    raw.chars()
        .filter(|c| !ILLEGAL_TITLE_CHARS.contains(c) && !matches!(c, '"' | '<' | '>' | '|'))
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .trim_matches('.')
        .to_string()
}

pub fn collection_file_name(collection: &str) -> String {
    format!("{}.xlsx", sanitize_file_component(collection))
}

/// `{key}_{sanitized display name}_registrations.xlsx`
pub fn group_file_name(key: &str, display_name: &str) -> String {
    format!(
        "{}_{}{}",
        sanitize_file_component(key),
        sanitize_display_name(display_name),
        GROUP_FILE_SUFFIX
    )
}
