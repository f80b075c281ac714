use std::collections::BTreeMap;

/// Seats per section unless configured otherwise
pub const DEFAULT_SECTION_CAPACITY: usize = 6;

/// Program letter used in generated ids when the student type has no mapping
pub const DEFAULT_PROGRAM_CODE: char = 'R';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentPolicy {
    /// `None` means sections never fill
    pub capacity: Option<usize>,
    pub default_program_code: char,
    /// Lowercase student type to program letter
    pub program_codes: BTreeMap<String, char>,
}

impl Default for EnrollmentPolicy {
    fn default() -> Self {
        Self {
            capacity: Some(DEFAULT_SECTION_CAPACITY),
            default_program_code: DEFAULT_PROGRAM_CODE,
            program_codes: BTreeMap::new(),
        }
    }
}

impl EnrollmentPolicy {
    pub fn with_capacity(mut self, capacity: Option<usize>) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_program_code(mut self, student_type: &str, code: char) -> Self {
        self.program_codes
            .insert(student_type.trim().to_lowercase(), code.to_ascii_uppercase());
        self
    }

    pub fn program_code_for(&self, student_type: &str) -> char {
        self.program_codes
            .get(&student_type.trim().to_lowercase())
            .copied()
            .unwrap_or(self.default_program_code)
            .to_ascii_uppercase()
    }

    pub fn is_full(&self, occupancy: usize) -> bool {
        self.capacity.map(|cap| occupancy >= cap).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_code_lookup() {
        let policy = EnrollmentPolicy::default().with_program_code("Transferee", 't');
        assert_eq!(policy.program_code_for(" TRANSFEREE "), 'T');
        assert_eq!(policy.program_code_for("Regular"), 'R');
        assert_eq!(policy.program_code_for(""), 'R');
    }

    #[test]
    fn test_capacity() {
        let policy = EnrollmentPolicy::default();
        assert!(!policy.is_full(5));
        assert!(policy.is_full(6));

        let unbounded = policy.with_capacity(None);
        assert!(!unbounded.is_full(10_000));
    }
}
