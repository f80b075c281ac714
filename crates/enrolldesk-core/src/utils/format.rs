use std::cmp::Ordering;

/// Format a mobile number as `0917 123 4567`.
///
/// Accepts local (`09171234567`), bare (`9171234567`) and international
/// (`+63 917 123 4567`) forms. Anything else comes back trimmed.
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    let local = match digits.len() {
        11 if digits.starts_with('0') => digits,
        12 if digits.starts_with("63") => format!("0{}", &digits[2..]),
        10 if digits.starts_with('9') => format!("0{}", digits),
        _ => return phone.trim().to_string(),
    };
    format!("{} {} {}", &local[0..4], &local[4..7], &local[7..11])
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Compare two strings ignoring ASCII case
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}

/// Show "-" for blank cells
pub fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}
