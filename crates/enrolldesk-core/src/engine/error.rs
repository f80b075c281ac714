use std::fmt;

use thiserror::Error;

use crate::store::StoreError;

/// What kind of thing a lookup failed to find
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Subject,
    Section,
    Table,
    Application,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Subject => write!(f, "Subject"),
            Entity::Section => write!(f, "Section"),
            Entity::Table => write!(f, "Table"),
            Entity::Application => write!(f, "Application"),
        }
    }
}

/// A store failure partway through writing an enrollment back.
/// Tables in `written` already hold the new data; the rest do not.
#[derive(Error, Debug)]
#[error("Failed to save '{table}' (already saved: {}): {source}", written_display(.written))]
pub struct PersistError {
    pub table: String,
    pub written: Vec<String>,
    #[source]
    pub source: StoreError,
}

fn written_display(written: &[String]) -> String {
    if written.is_empty() {
        "none".to_string()
    } else {
        written.join(", ")
    }
}

#[derive(Error, Debug)]
pub enum EnrollError {
    #[error("{kind} not found: {name}")]
    NotFound { kind: Entity, name: String },

    #[error("Section '{section}' belongs to subject '{actual}', not '{expected}'")]
    SubjectMismatch {
        section: String,
        expected: String,
        actual: String,
    },

    #[error("Section '{section}' is full ({occupancy}/{capacity} students)")]
    SectionFull {
        section: String,
        occupancy: usize,
        capacity: usize,
    },

    #[error("Student {student_id} is already enrolled in section '{section}'")]
    DuplicateEnrollment { student_id: String, section: String },

    #[error("{0}")]
    Validation(String),

    #[error("Workbook unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    /// The store failed between table writes, leaving the workbook inconsistent
    #[error("Workbook unavailable, enrollment only partly saved: {0}")]
    PartiallySaved(#[from] PersistError),
}

impl EnrollError {
    pub(crate) fn not_found(kind: Entity, name: impl Into<String>) -> Self {
        EnrollError::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// True when nothing was written
    pub fn is_clean(&self) -> bool {
        match self {
            EnrollError::PartiallySaved(e) => e.written.is_empty(),
            _ => true,
        }
    }
}

impl From<StoreError> for EnrollError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::TableNotFound(name) => EnrollError::not_found(Entity::Table, name),
            other => EnrollError::StoreUnavailable(other),
        }
    }
}
