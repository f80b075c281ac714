//! Typed views over normalized sheet records.
//!
//! - `Student`: a row of the `Students` sheet
//! - `Subject`: a row of the `Subjects` sheet
//! - `Section`, `Membership`: definition and membership rows of the `Section` sheet
//! - `Application`: a row of the `Students Registration` sheet
//! - `EnrollmentFact`: who is in which section, derived from students and memberships

pub mod application;
pub mod section;
pub mod student;
pub mod subject;

use std::collections::HashSet;

pub use application::{Application, STATUS_FIELD};
pub use section::{Membership, Section, SectionSheet};
pub use student::{EmergencyContact, Student};
pub use subject::Subject;

/// A (student, subject, section) triple.
///
/// Both a student row with a section code and a membership row count as a
/// fact; occupancy, duplicate checks and reports are all computed from the
/// combined set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnrollmentFact<'a> {
    pub student_id: &'a str,
    pub subject_id: &'a str,
    pub section_code: &'a str,
}

/// Every fact with a non-blank student id and section code
pub fn enrollment_facts<'a>(
    students: &'a [Student],
    sections: &'a SectionSheet,
) -> Vec<EnrollmentFact<'a>> {
    let from_students = students.iter().map(|s| EnrollmentFact {
        student_id: s.student_id.trim(),
        subject_id: s.subject_id.trim(),
        section_code: s.section_code.trim(),
    });
    let from_memberships = sections.memberships.iter().map(|m| EnrollmentFact {
        student_id: m.student_id.trim(),
        subject_id: m.subject_id.trim(),
        section_code: m.section_code.trim(),
    });

    from_students
        .chain(from_memberships)
        .filter(|f| !f.student_id.is_empty() && !f.section_code.is_empty())
        .collect()
}

impl EnrollmentFact<'_> {
    /// Whether the fact places a student in section `code` of `subject_id`.
    /// A blank subject on either side matches any subject.
    pub fn is_in(&self, subject_id: &str, code: &str) -> bool {
        let subject_id = subject_id.trim();
        self.section_code == code.trim()
            && (self.subject_id.is_empty() || subject_id.is_empty() || self.subject_id == subject_id)
    }
}

/// Distinct students in a section of a subject
pub fn occupancy(facts: &[EnrollmentFact<'_>], subject_id: &str, section_code: &str) -> usize {
    facts
        .iter()
        .filter(|f| f.is_in(subject_id, section_code))
        .map(|f| f.student_id)
        .collect::<HashSet<_>>()
        .len()
}

pub fn is_enrolled_in(
    facts: &[EnrollmentFact<'_>],
    student_id: &str,
    subject_id: &str,
    section_code: &str,
) -> bool {
    let id = student_id.trim();
    facts
        .iter()
        .any(|f| f.student_id == id && f.is_in(subject_id, section_code))
}
