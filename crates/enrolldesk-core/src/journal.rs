//! Append-only enrollment journal.
//!
//! Every enrollment is recorded as `pending` with its full mutation set before
//! any table is written, then closed out as `committed` or `failed`. Entries
//! whose last state is not `committed` are the ones an operator may need to
//! reconcile by hand.
//!
//! The journal is a JSON-lines file next to the workbook sheets. Each state
//! change appends a line; nothing is rewritten in place.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::engine::MutationSet;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("Failed to {operation} journal {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode journal entry: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryState {
    Pending,
    Committed,
    Failed,
}

impl std::fmt::Display for EntryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryState::Pending => write!(f, "pending"),
            EntryState::Committed => write!(f, "committed"),
            EntryState::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: u64,
    pub recorded_at: DateTime<Utc>,
    pub state: EntryState,
    /// Present on the `pending` line only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutations: Option<MutationSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Tables already saved when the entry failed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub written: Vec<String>,
}

/// An enrollment whose journal trail does not end in `committed`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub id: u64,
    pub recorded_at: DateTime<Utc>,
    pub state: EntryState,
    pub mutations: Option<MutationSet>,
    pub error: Option<String>,
    pub written: Vec<String>,
}

impl Unresolved {
    pub fn summary(&self) -> String {
        match &self.mutations {
            Some(m) => format!("{} -> {}", m.student_id(), m.section_code()),
            None => "(mutations not recorded)".to_string(),
        }
    }
}

pub struct Journal {
    path: PathBuf,
}

impl Journal {
    pub const FILE_NAME: &'static str = "journal.jsonl";

    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Journal stored alongside the workbook sheets in `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record an enrollment about to be written. Returns its entry id.
    pub fn begin(&self, mutations: &MutationSet) -> Result<u64, JournalError> {
        let id = self
            .entries()?
            .iter()
            .map(|e| e.id)
            .max()
            .map_or(1, |max| max + 1);

        self.append(&JournalEntry {
            id,
            recorded_at: Utc::now(),
            state: EntryState::Pending,
            mutations: Some(mutations.clone()),
            error: None,
            written: Vec::new(),
        })?;
        Ok(id)
    }

    pub fn commit(&self, id: u64) -> Result<(), JournalError> {
        self.append(&JournalEntry {
            id,
            recorded_at: Utc::now(),
            state: EntryState::Committed,
            mutations: None,
            error: None,
            written: Vec::new(),
        })
    }

    pub fn fail(&self, id: u64, error: &str, written: &[String]) -> Result<(), JournalError> {
        self.append(&JournalEntry {
            id,
            recorded_at: Utc::now(),
            state: EntryState::Failed,
            mutations: None,
            error: Some(error.to_string()),
            written: written.to_vec(),
        })
    }

    fn append(&self, entry: &JournalEntry) -> Result<(), JournalError> {
        let io_err = |operation: &'static str| {
            let path = self.path.clone();
            move |source| JournalError::Io {
                path,
                operation,
                source,
            }
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err("create"))?;
        }

        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err("open"))?;
        file.write_all(line.as_bytes()).map_err(io_err("append to"))?;
        file.sync_all().map_err(io_err("sync"))?;

        debug!(id = entry.id, state = %entry.state, "Journal entry appended");
        Ok(())
    }

    /// Every line of the journal in file order. Unreadable lines are skipped.
    pub fn entries(&self) -> Result<Vec<JournalEntry>, JournalError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path).map_err(|source| JournalError::Io {
            path: self.path.clone(),
            operation: "open",
            source,
        })?;

        let mut entries = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|source| JournalError::Io {
                path: self.path.clone(),
                operation: "read",
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<JournalEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    warn!(line = index + 1, error = %e, "Skipping unreadable journal line");
                }
            }
        }
        Ok(entries)
    }

    /// Enrollments whose latest state is `pending` or `failed`, oldest first
    pub fn unresolved(&self) -> Result<Vec<Unresolved>, JournalError> {
        let mut by_id: BTreeMap<u64, Unresolved> = BTreeMap::new();

        for entry in self.entries()? {
            let trail = by_id.entry(entry.id).or_insert_with(|| Unresolved {
                id: entry.id,
                recorded_at: entry.recorded_at,
                state: entry.state,
                mutations: None,
                error: None,
                written: Vec::new(),
            });
            trail.state = entry.state;
            if entry.mutations.is_some() {
                trail.mutations = entry.mutations;
            }
            if entry.error.is_some() {
                trail.error = entry.error;
            }
            if !entry.written.is_empty() {
                trail.written = entry.written;
            }
        }

        Ok(by_id
            .into_values()
            .filter(|u| u.state != EntryState::Committed)
            .collect())
    }
}
