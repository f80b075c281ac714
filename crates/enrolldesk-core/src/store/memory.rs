use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use super::grid::{grid_from_records, records_from_grid, Grid};
use super::{RawRecord, StoreError, TableStore};

/// Sheets held in memory.
///
/// Data goes through the same string grid as a real workbook, so booleans
/// come back as `TRUE`/`FALSE` text. Saves to a table marked with
/// `fail_saves_to` return `StoreError::Unavailable`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RefCell<HashMap<String, Grid>>,
    failing: RefCell<HashSet<String>>,
    saves: RefCell<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grid(self, table: &str, rows: Grid) -> Self {
        self.insert_grid(table, rows);
        self
    }

    pub fn insert_grid(&self, table: &str, rows: Grid) {
        self.tables.borrow_mut().insert(table.to_string(), rows);
    }

    pub fn grid(&self, table: &str) -> Option<Grid> {
        self.tables.borrow().get(table).cloned()
    }

    pub fn fail_saves_to(&self, table: &str) {
        self.failing.borrow_mut().insert(table.to_string());
    }

    pub fn allow_saves_to(&self, table: &str) {
        self.failing.borrow_mut().remove(table);
    }

    /// Tables saved so far, in order
    pub fn save_log(&self) -> Vec<String> {
        self.saves.borrow().clone()
    }
}

impl TableStore for MemoryStore {
    fn load(&self, table: &str) -> Result<Vec<RawRecord>, StoreError> {
        self.tables
            .borrow()
            .get(table)
            .map(|rows| records_from_grid(rows))
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))
    }

    fn save(&self, table: &str, records: &[RawRecord]) -> Result<(), StoreError> {
        if self.failing.borrow().contains(table) {
            return Err(StoreError::unavailable(
                table,
                "write",
                std::io::Error::other("backing store rejected the write"),
            ));
        }

        let mut rows = grid_from_records(records);
        let mut tables = self.tables.borrow_mut();
        if records.is_empty() {
            if let Some(existing) = tables.get(table) {
                rows = existing.iter().take(1).cloned().collect();
            }
        }
        tables.insert(table.to_string(), rows);
        self.saves.borrow_mut().push(table.to_string());
        Ok(())
    }
}
