//! Read-only views over a snapshot: the enrolled roster and section summaries.
//!
//! Both are derived from enrollment facts (students with a section plus the
//! membership rows of the `Section` sheet), never from stored counters.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::io::Write;

use serde::Serialize;

use crate::models::subject::find_by_title;
use crate::models::{enrollment_facts, SectionSheet, Student, Subject};
use crate::utils::cmp_ignore_case;

/// Column names of the roster view and its CSV export
pub const ROSTER_COLUMNS: [&str; 6] = [
    "student_id",
    "first_name",
    "last_name",
    "subject_id",
    "subject_title",
    "section_code",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterRow {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub subject_id: String,
    pub subject_title: String,
    pub section_code: String,
}

impl RosterRow {
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

/// Which sections a summary lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Listing {
    /// Only sections with at least one student
    #[default]
    Enrolled,
    /// Every defined section, empty ones included
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSummary {
    pub section_code: String,
    pub subject_id: String,
    pub enrolled_count: usize,
    pub day_schedule: String,
    pub start_time: String,
    pub end_time: String,
    pub batch_id: String,
}

impl SectionSummary {
    pub fn schedule_display(&self) -> String {
        format!("{} {} - {}", self.day_schedule, self.start_time, self.end_time)
            .trim()
            .to_string()
    }

    pub fn seats_left(&self, capacity: Option<usize>) -> Option<usize> {
        capacity.map(|cap| cap.saturating_sub(self.enrolled_count))
    }
}

/// Everyone enrolled in a section, one row per (student, subject, section).
///
/// Names come from the first student row with the id and titles from the
/// first subject row with the id; either may be blank if missing.
pub fn enrolled_roster(
    students: &[Student],
    sections: &SectionSheet,
    subjects: &[Subject],
) -> Vec<RosterRow> {
    let mut by_id: HashMap<&str, &Student> = HashMap::new();
    for student in students {
        by_id.entry(student.student_id.trim()).or_insert(student);
    }
    let mut titles: HashMap<&str, &str> = HashMap::new();
    for subject in subjects {
        titles
            .entry(subject.subject_id.trim())
            .or_insert(subject.subject_title.as_str());
    }

    let facts: BTreeSet<_> = enrollment_facts(students, sections).into_iter().collect();

    let mut rows: Vec<RosterRow> = facts
        .into_iter()
        .map(|fact| {
            let student = by_id.get(fact.student_id);
            RosterRow {
                student_id: fact.student_id.to_string(),
                first_name: student.map(|s| s.first_name.clone()).unwrap_or_default(),
                last_name: student.map(|s| s.last_name.clone()).unwrap_or_default(),
                subject_id: fact.subject_id.to_string(),
                subject_title: titles
                    .get(fact.subject_id)
                    .map(|t| t.to_string())
                    .unwrap_or_default(),
                section_code: fact.section_code.to_string(),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        a.section_code
            .cmp(&b.section_code)
            .then_with(|| cmp_ignore_case(&a.last_name, &b.last_name))
            .then_with(|| cmp_ignore_case(&a.first_name, &b.first_name))
            .then_with(|| a.student_id.cmp(&b.student_id))
    });
    rows
}

/// Student counts per section code, with schedule details from the first
/// definition carrying that code. Sorted by section code.
pub fn section_summary(
    students: &[Student],
    sections: &SectionSheet,
    listing: Listing,
) -> Vec<SectionSummary> {
    let mut members: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();
    for fact in enrollment_facts(students, sections) {
        members
            .entry(fact.section_code)
            .or_default()
            .insert(fact.student_id);
    }

    let mut codes: BTreeSet<&str> = members.keys().copied().collect();
    if listing == Listing::All {
        codes.extend(
            sections
                .sections
                .iter()
                .map(|s| s.section_code.trim())
                .filter(|c| !c.is_empty()),
        );
    }

    codes
        .into_iter()
        .map(|code| {
            let enrolled_count = members.get(code).map(HashSet::len).unwrap_or(0);
            match sections.definition(code) {
                Some(d) => SectionSummary {
                    section_code: code.to_string(),
                    subject_id: d.subject_id.clone(),
                    enrolled_count,
                    day_schedule: d.day_schedule.clone(),
                    start_time: d.start_time.clone(),
                    end_time: d.end_time.clone(),
                    batch_id: d.batch_id.clone(),
                },
                None => SectionSummary {
                    section_code: code.to_string(),
                    subject_id: String::new(),
                    enrolled_count,
                    day_schedule: String::new(),
                    start_time: String::new(),
                    end_time: String::new(),
                    batch_id: String::new(),
                },
            }
        })
        .collect()
}

/// Roster rows of one section
pub fn section_members(
    section_code: &str,
    students: &[Student],
    sections: &SectionSheet,
    subjects: &[Subject],
) -> Vec<RosterRow> {
    let code = section_code.trim();
    enrolled_roster(students, sections, subjects)
        .into_iter()
        .filter(|row| row.section_code == code)
        .collect()
}

/// Section codes offered under a subject title. Empty if the title is unknown.
pub fn subject_sections(subject_title: &str, subjects: &[Subject], sections: &SectionSheet) -> Vec<String> {
    find_by_title(subjects, subject_title)
        .map(|subject| sections.codes_for_subject(&subject.subject_id))
        .unwrap_or_default()
}

/// Write the roster as UTF-8 CSV: header row, then one line per row
pub fn write_roster_csv<W: Write>(rows: &[RosterRow], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(ROSTER_COLUMNS)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}
