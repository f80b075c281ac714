//! Tabular store adapter for the enrollment workbook.
//!
//! The workbook is four named sheets, each a 2-D grid of strings whose first
//! row holds the field names. This module exposes the `TableStore` trait
//! used by everything above it, plus two implementations:
//!
//! - `WorkbookStore`: one JSON sheet file per table in a directory
//! - `MemoryStore`: in-process sheets, used in tests
//!
//! `save` always replaces a table's entire contents. Callers must hold the
//! full table in memory before saving.

pub mod error;
pub mod grid;
pub mod memory;
pub mod workbook;

use std::fmt;

pub use error::StoreError;
pub use grid::Grid;
pub use memory::MemoryStore;
pub use workbook::{SheetStatus, WorkbookStore};

/// A record as read from a sheet: field name to cell value, in column order.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

pub trait TableStore {
    /// Load every record of the named table, in row order.
    fn load(&self, table: &str) -> Result<Vec<RawRecord>, StoreError>;

    /// Replace the named table's contents with `records`.
    fn save(&self, table: &str, records: &[RawRecord]) -> Result<(), StoreError>;
}

impl<T: TableStore + ?Sized> TableStore for &T {
    fn load(&self, table: &str) -> Result<Vec<RawRecord>, StoreError> {
        (**self).load(table)
    }

    fn save(&self, table: &str, records: &[RawRecord]) -> Result<(), StoreError> {
        (**self).save(table, records)
    }
}

/// The sheets that make up an enrollment workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sheet {
    Students,
    Sections,
    Subjects,
    Registrations,
}

impl Sheet {
    pub const ALL: [Sheet; 4] = [
        Sheet::Students,
        Sheet::Sections,
        Sheet::Subjects,
        Sheet::Registrations,
    ];

    /// Sheet name as it appears in the workbook
    pub fn name(&self) -> &'static str {
        match self {
            Sheet::Students => "Students",
            Sheet::Sections => "Section",
            Sheet::Subjects => "Subjects",
            Sheet::Registrations => "Students Registration",
        }
    }

    /// Look up a sheet by name, ignoring case and surrounding whitespace
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim();
        Sheet::ALL
            .into_iter()
            .find(|sheet| sheet.name().eq_ignore_ascii_case(wanted))
    }
}

impl fmt::Display for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_names() {
        assert_eq!(Sheet::Sections.name(), "Section");
        assert_eq!(Sheet::Registrations.to_string(), "Students Registration");
    }

    #[test]
    fn test_sheet_from_name() {
        assert_eq!(Sheet::from_name("students"), Some(Sheet::Students));
        assert_eq!(Sheet::from_name("  STUDENTS REGISTRATION "), Some(Sheet::Registrations));
        assert_eq!(Sheet::from_name("Sections"), None);
    }
}
