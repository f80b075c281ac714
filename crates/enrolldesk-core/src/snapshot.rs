use tracing::debug;

use crate::models::{Application, SectionSheet, Student, Subject, STATUS_FIELD};
use crate::normalize::{Normalizer, Table};
use crate::store::{Sheet, StoreError, TableStore};

/// All four sheets, normalized, as read at the start of one action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub students: Table,
    pub sections: Table,
    pub subjects: Table,
    pub registrations: Table,
}

impl Snapshot {
    pub fn load<S: TableStore>(store: &S) -> Result<Self, StoreError> {
        let plain = Normalizer::plain();
        let load = |sheet: Sheet, normalizer: &Normalizer| -> Result<Table, StoreError> {
            Ok(Table::from_raw(&store.load(sheet.name())?, normalizer))
        };

        let snapshot = Self {
            students: load(Sheet::Students, &plain)?,
            sections: load(Sheet::Sections, &plain)?,
            subjects: load(Sheet::Subjects, &plain)?,
            registrations: load(Sheet::Registrations, &Normalizer::with_status(STATUS_FIELD))?,
        };
        debug!(
            students = snapshot.students.len(),
            sections = snapshot.sections.len(),
            subjects = snapshot.subjects.len(),
            registrations = snapshot.registrations.len(),
            "Snapshot loaded"
        );
        Ok(snapshot)
    }

    pub fn table(&self, sheet: Sheet) -> &Table {
        match sheet {
            Sheet::Students => &self.students,
            Sheet::Sections => &self.sections,
            Sheet::Subjects => &self.subjects,
            Sheet::Registrations => &self.registrations,
        }
    }

    pub fn students(&self) -> Vec<Student> {
        self.students.records().iter().map(Student::from_record).collect()
    }

    pub fn section_sheet(&self) -> SectionSheet {
        SectionSheet::from_records(self.sections.records())
    }

    pub fn subjects(&self) -> Vec<Subject> {
        self.subjects.records().iter().map(Subject::from_record).collect()
    }

    pub fn applications(&self) -> Vec<Application> {
        self.registrations
            .records()
            .iter()
            .enumerate()
            .map(|(row, record)| Application::from_record(row, record))
            .collect()
    }

    pub fn application(&self, row: usize) -> Option<Application> {
        self.registrations
            .get(row)
            .map(|record| Application::from_record(row, record))
    }
}
