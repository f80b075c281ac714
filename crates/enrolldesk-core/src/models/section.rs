use serde::{Deserialize, Serialize};

use crate::normalize::Record;

/// A class section, from a `Section` row with no `student_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub section_code: String,
    pub subject_id: String,
    pub day_schedule: String,
    pub start_time: String,
    pub end_time: String,
    pub batch_id: String,
}

impl Section {
    pub fn from_record(record: &Record) -> Self {
        Self {
            section_code: record.get("section_code").trim().to_string(),
            subject_id: record.get("subject_id").trim().to_string(),
            day_schedule: record.get("section_day_sched").to_string(),
            start_time: record.get("section_start_time").to_string(),
            end_time: record.get("section_end_time").to_string(),
            batch_id: record.get("batch_id").to_string(),
        }
    }
}

/// A student's membership in a section, from a `Section` row with a `student_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub student_id: String,
    pub section_id: String,
    pub section_code: String,
    pub subject_id: String,
}

impl Membership {
    pub const COLUMNS: [&'static str; 4] = ["student_id", "section_id", "section_code", "subject_id"];

    pub fn new(student_id: &str, section_code: &str, subject_id: &str) -> Self {
        Self {
            student_id: student_id.to_string(),
            // Sections have no separate id; the code doubles as one
            section_id: section_code.to_string(),
            section_code: section_code.to_string(),
            subject_id: subject_id.to_string(),
        }
    }

    pub fn from_record(record: &Record) -> Self {
        Self {
            student_id: record.get("student_id").trim().to_string(),
            section_id: record.get("section_id").trim().to_string(),
            section_code: record.get("section_code").trim().to_string(),
            subject_id: record.get("subject_id").trim().to_string(),
        }
    }

    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.set("student_id", self.student_id.as_str());
        record.set("section_id", self.section_id.as_str());
        record.set("section_code", self.section_code.as_str());
        record.set("subject_id", self.subject_id.as_str());
        record
    }
}

/// The `Section` sheet split into definitions and memberships
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionSheet {
    pub sections: Vec<Section>,
    pub memberships: Vec<Membership>,
}

impl SectionSheet {
    pub fn from_records(records: &[Record]) -> Self {
        let mut sheet = SectionSheet::default();
        for record in records {
            if record.is_blank("student_id") {
                sheet.sections.push(Section::from_record(record));
            } else {
                sheet.memberships.push(Membership::from_record(record));
            }
        }
        sheet
    }

    /// All definitions carrying `code`, in sheet order
    pub fn definitions(&self, code: &str) -> impl Iterator<Item = &Section> + '_ {
        let code = code.trim().to_string();
        self.sections.iter().filter(move |s| s.section_code == code)
    }

    /// First definition carrying `code`
    pub fn definition(&self, code: &str) -> Option<&Section> {
        self.definitions(code).next()
    }

    /// Distinct section codes offered for a subject, in sheet order
    pub fn codes_for_subject(&self, subject_id: &str) -> Vec<String> {
        let subject_id = subject_id.trim();
        let mut codes: Vec<String> = Vec::new();
        for section in &self.sections {
            if section.subject_id == subject_id
                && !section.section_code.is_empty()
                && !codes.contains(&section.section_code)
            {
                codes.push(section.section_code.clone());
            }
        }
        codes
    }
}
