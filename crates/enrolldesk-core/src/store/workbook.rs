use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::grid::{grid_from_records, records_from_grid, Grid};
use super::{RawRecord, Sheet, StoreError, TableStore};

/// Write `contents` to `temp_path`, flush it, then rename it over `path`.
/// On failure, returns the step that failed.
fn replace_file(
    temp_path: &Path,
    path: &Path,
    contents: &[u8],
) -> Result<(), (&'static str, io::Error)> {
    let mut file = File::create(temp_path).map_err(|e| ("create", e))?;
    file.write_all(contents).map_err(|e| ("write", e))?;
    file.sync_all().map_err(|e| ("sync", e))?;
    fs::rename(temp_path, path).map_err(|e| ("replace", e))
}

/// One sheet as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetFile {
    pub name: String,
    pub saved_at: DateTime<Utc>,
    pub rows: Grid,
}

impl SheetFile {
    pub fn new(name: &str, rows: Grid) -> Self {
        Self {
            name: name.to_string(),
            saved_at: Utc::now(),
            rows,
        }
    }

    /// Number of data rows (header excluded)
    pub fn row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.saved_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

/// Row count and age of one sheet, for status display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetStatus {
    pub sheet: Sheet,
    pub rows: Option<usize>,
    pub saved: Option<String>,
}

impl SheetStatus {
    pub fn saved_display(&self) -> &str {
        self.saved.as_deref().unwrap_or("never")
    }
}

/// A workbook kept as a directory of JSON sheet files
pub struct WorkbookStore {
    dir: PathBuf,
}

impl WorkbookStore {
    pub fn new(dir: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&dir)
            .map_err(|e| StoreError::unavailable(&dir.display().to_string(), "create", e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `Students Registration` is stored as `students_registration.json`
    fn sheet_path(&self, table: &str) -> PathBuf {
        let stem: String = table
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", stem))
    }

    fn read_sheet(&self, table: &str) -> Result<Option<SheetFile>, StoreError> {
        let path = self.sheet_path(table);
        if !path.exists() {
            return Ok(None);
        }

        let contents =
            fs::read_to_string(&path).map_err(|e| StoreError::unavailable(table, "read", e))?;
        let sheet: SheetFile =
            serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt {
                table: table.to_string(),
                message: e.to_string(),
            })?;
        Ok(Some(sheet))
    }

    /// Write to a temp file and rename over the sheet so readers never see a partial write
    fn write_sheet(&self, sheet: &SheetFile) -> Result<(), StoreError> {
        let table = sheet.name.as_str();
        let path = self.sheet_path(table);
        let temp_path = path.with_extension("json.tmp");

        let contents = serde_json::to_vec_pretty(sheet).map_err(|e| StoreError::Corrupt {
            table: table.to_string(),
            message: e.to_string(),
        })?;

        if let Err((operation, e)) = replace_file(&temp_path, &path, &contents) {
            if temp_path.exists() {
                if let Err(cleanup) = fs::remove_file(&temp_path) {
                    warn!(table, error = %cleanup, "Failed to remove temp sheet file");
                }
            }
            return Err(StoreError::unavailable(table, operation, e));
        }

        debug!(table, rows = sheet.row_count(), "Sheet saved");
        Ok(())
    }

    /// Load a sheet's raw grid, header row included
    pub fn load_grid(&self, table: &str) -> Result<Grid, StoreError> {
        self.read_sheet(table)?
            .map(|sheet| sheet.rows)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))
    }

    /// Replace a sheet with a raw grid, e.g. one imported from CSV
    pub fn save_grid(&self, table: &str, rows: Grid) -> Result<(), StoreError> {
        self.write_sheet(&SheetFile::new(table, rows))
    }

    pub fn sheet_status(&self) -> Vec<SheetStatus> {
        Sheet::ALL
            .into_iter()
            .map(|sheet| match self.read_sheet(sheet.name()) {
                Ok(Some(file)) => SheetStatus {
                    sheet,
                    rows: Some(file.row_count()),
                    saved: Some(file.age_display()),
                },
                Ok(None) => SheetStatus {
                    sheet,
                    rows: None,
                    saved: None,
                },
                Err(e) => {
                    debug!(table = sheet.name(), error = %e, "Failed to read sheet for status");
                    SheetStatus {
                        sheet,
                        rows: None,
                        saved: None,
                    }
                }
            })
            .collect()
    }
}

impl TableStore for WorkbookStore {
    fn load(&self, table: &str) -> Result<Vec<RawRecord>, StoreError> {
        let rows = self.load_grid(table)?;
        Ok(records_from_grid(&rows))
    }

    fn save(&self, table: &str, records: &[RawRecord]) -> Result<(), StoreError> {
        let mut rows = grid_from_records(records);
        // An empty table keeps its existing header row
        if records.is_empty() {
            if let Some(existing) = self.read_sheet(table)? {
                rows = existing.rows.into_iter().take(1).collect();
            }
        }
        self.write_sheet(&SheetFile::new(table, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;
    use tempfile::tempdir;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_sheet_age_display() {
        let mut sheet = SheetFile::new("Students", vec![]);
        assert_eq!(sheet.age_display(), "just now");

        sheet.saved_at = Utc::now() - Duration::minutes(5);
        assert_eq!(sheet.age_display(), "5m ago");

        sheet.saved_at = Utc::now() - Duration::minutes(95);
        assert_eq!(sheet.age_display(), "2h ago");

        sheet.saved_at = Utc::now() - Duration::hours(50);
        assert_eq!(sheet.age_display(), "2d ago");
    }

    #[test]
    fn test_missing_table_is_not_found() {
        let dir = tempdir().unwrap();
        let store = WorkbookStore::new(dir.path().to_path_buf()).unwrap();

        let err = store.load("Subjects").unwrap_err();
        assert!(matches!(err, StoreError::TableNotFound(name) if name == "Subjects"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = WorkbookStore::new(dir.path().to_path_buf()).unwrap();

        let mut record = RawRecord::new();
        record.insert("subject_id".into(), json!("MATH"));
        record.insert("subject_title".into(), json!("Mathematics"));
        store.save("Subjects", &[record]).unwrap();

        assert!(dir.path().join("subjects.json").exists());
        assert!(!dir.path().join("subjects.json.tmp").exists());

        let loaded = store.load("Subjects").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0]["subject_title"], json!("Mathematics"));
    }

    #[test]
    fn test_sheet_file_name_for_spaced_table() {
        let dir = tempdir().unwrap();
        let store = WorkbookStore::new(dir.path().to_path_buf()).unwrap();

        store
            .save_grid("Students Registration", vec![row(&["first_name"])])
            .unwrap();
        assert!(dir.path().join("students_registration.json").exists());
    }

    #[test]
    fn test_empty_save_keeps_header() {
        let dir = tempdir().unwrap();
        let store = WorkbookStore::new(dir.path().to_path_buf()).unwrap();

        store
            .save_grid(
                "Students",
                vec![row(&["student_id", "first_name"]), row(&["2025R10001", "Ana"])],
            )
            .unwrap();
        store.save("Students", &[]).unwrap();

        assert_eq!(
            store.load_grid("Students").unwrap(),
            vec![row(&["student_id", "first_name"])]
        );
    }

    #[test]
    fn test_failed_replace_removes_temp_file() {
        let dir = tempdir().unwrap();
        let store = WorkbookStore::new(dir.path().to_path_buf()).unwrap();
        let blocker = dir.path().join("subjects.json");
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("keep"), "x").unwrap();

        let err = store
            .save_grid("Subjects", vec![row(&["subject_id"]), row(&["MATH"])])
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));
        assert!(!dir.path().join("subjects.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_sheet() {
        let dir = tempdir().unwrap();
        let store = WorkbookStore::new(dir.path().to_path_buf()).unwrap();
        fs::write(dir.path().join("section.json"), "not json").unwrap();

        let err = store.load("Section").unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn test_sheet_status() {
        let dir = tempdir().unwrap();
        let store = WorkbookStore::new(dir.path().to_path_buf()).unwrap();
        store
            .save_grid("Subjects", vec![row(&["subject_id"]), row(&["MATH"]), row(&["ART"])])
            .unwrap();

        let status = store.sheet_status();
        assert_eq!(status.len(), 4);

        let subjects = status.iter().find(|s| s.sheet == Sheet::Subjects).unwrap();
        assert_eq!(subjects.rows, Some(2));
        assert_eq!(subjects.saved_display(), "just now");

        let students = status.iter().find(|s| s.sheet == Sheet::Students).unwrap();
        assert_eq!(students.rows, None);
        assert_eq!(students.saved_display(), "never");
    }
}
