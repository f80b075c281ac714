//! Student id generation.
//!
//! Ids look like `2025R10001`: four-digit year, one program letter, then a
//! sequence number. The sequence continues from the highest existing id with
//! the same year and letter.

/// Sequence number of the first id under a new prefix
pub const FIRST_SEQUENCE: u64 = 10001;

pub fn id_prefix(year: i32, program_code: char) -> String {
    format!("{:04}{}", year, program_code.to_ascii_uppercase())
}

/// Next free id for `year` and `program_code` given the ids already in use.
/// Ids whose sequence cannot be incremented are ignored.
pub fn next_student_id<'a, I>(existing: I, year: i32, program_code: char) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let prefix = id_prefix(year, program_code);
    let next = existing
        .into_iter()
        .filter_map(|id| id.trim().strip_prefix(prefix.as_str()))
        .filter(|suffix| !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|suffix| suffix.parse::<u64>().ok()?.checked_add(1))
        .max()
        .unwrap_or(FIRST_SEQUENCE);

    format!("{}{}", prefix, next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_id_under_prefix() {
        assert_eq!(next_student_id(std::iter::empty(), 2025, 'R'), "2025R10001");
    }

    #[test]
    fn test_continues_sequence() {
        let ids = ["2025R10001", "2025R10002"];
        assert_eq!(next_student_id(ids, 2025, 'R'), "2025R10003");
    }

    #[test]
    fn test_ignores_other_prefixes_and_malformed_ids() {
        let ids = [
            "2024R10050",
            "2025T10040",
            "2025R1000X",
            "2025R",
            "",
            " 2025R10007 ",
        ];
        assert_eq!(next_student_id(ids, 2025, 'r'), "2025R10008");
    }

    #[test]
    fn test_sequence_at_limit_is_skipped() {
        let ids = ["2025R10004", "2025R18446744073709551615", "2025R99999999999999999999"];
        assert_eq!(next_student_id(ids, 2025, 'R'), "2025R10005");
        assert_eq!(
            next_student_id(["2025R18446744073709551615"], 2025, 'R'),
            "2025R10001"
        );
    }

    #[test]
    fn test_deterministic() {
        let ids = vec!["2025R10003".to_string(), "2025R10001".to_string()];
        let first = next_student_id(ids.iter().map(String::as_str), 2025, 'R');
        let second = next_student_id(ids.iter().map(String::as_str), 2025, 'R');
        assert_eq!(first, second);
        assert_eq!(first, "2025R10004");
    }
}
