use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Membership, Student, STATUS_FIELD};
use crate::normalize::{Record, Table};
use crate::snapshot::Snapshot;

use super::error::{EnrollError, Entity};

/// Date format written to `date_enrolled` cells
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StudentUpsert {
    Create {
        student: Student,
    },
    Update {
        student_id: String,
        subject_id: String,
        section_code: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationUpdate {
    pub row: usize,
    /// Set when the engine generated the student id
    pub assigned_student_id: Option<String>,
    pub subject_id: String,
    pub subject_title: String,
    pub section_code: String,
    pub date_enrolled: NaiveDate,
}

/// Every change one enrollment makes, across three sheets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationSet {
    pub student: StudentUpsert,
    /// The student's earlier section, recorded before the `Students` row moves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<Membership>,
    pub membership: Membership,
    pub application: ApplicationUpdate,
}

impl MutationSet {
    pub fn student_id(&self) -> &str {
        &self.membership.student_id
    }

    pub fn section_code(&self) -> &str {
        &self.membership.section_code
    }

    pub fn creates_student(&self) -> bool {
        matches!(self.student, StudentUpsert::Create { .. })
    }

    /// Apply all three changes to the snapshot's tables.
    ///
    /// The application row is checked first; if it is gone nothing is touched.
    pub fn apply(&self, snapshot: &mut Snapshot) -> Result<(), EnrollError> {
        let row = self.application.row;
        if snapshot.registrations.get(row).is_none() {
            return Err(EnrollError::not_found(
                Entity::Application,
                format!("row {}", row),
            ));
        }

        self.apply_student(&mut snapshot.students);

        snapshot.sections.ensure_columns(&Membership::COLUMNS);
        if let Some(previous) = &self.previous {
            snapshot.sections.push(previous.to_record());
        }
        snapshot.sections.push(self.membership.to_record());

        self.apply_application(&mut snapshot.registrations);

        debug!(
            row,
            student_id = self.student_id(),
            section = self.section_code(),
            "Mutations applied"
        );
        Ok(())
    }

    fn apply_student(&self, students: &mut Table) {
        match &self.student {
            StudentUpsert::Create { student } => {
                students.ensure_columns(&Student::COLUMNS);
                students.push(student.to_record());
            }
            StudentUpsert::Update {
                student_id,
                subject_id,
                section_code,
            } => match students.position("student_id", student_id) {
                Some(index) => {
                    students.set(index, "subject_id", subject_id.as_str());
                    students.set(index, "section_code", section_code.as_str());
                }
                None => {
                    let mut record = Record::new();
                    record.set("student_id", student_id.as_str());
                    record.set("subject_id", subject_id.as_str());
                    record.set("section_code", section_code.as_str());
                    students.ensure_columns(&Student::COLUMNS);
                    students.push(record);
                }
            },
        }
    }

    fn apply_application(&self, registrations: &mut Table) {
        let update = &self.application;
        let row = update.row;

        if let Some(id) = &update.assigned_student_id {
            registrations.set(row, "student_id", id.as_str());
        }
        registrations.set(row, "subject_title", update.subject_title.as_str());
        registrations.set(row, "subject_id", update.subject_id.as_str());
        registrations.set(row, "section_code", update.section_code.as_str());
        registrations.set(
            row,
            "date_enrolled",
            update.date_enrolled.format(DATE_FORMAT).to_string(),
        );
        registrations.mark_enrolled(row, STATUS_FIELD);
    }
}
