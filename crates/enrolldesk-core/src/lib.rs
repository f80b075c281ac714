//! Enrollment desk core library.
//!
//! Reads and writes a workbook of four sheets (`Students`, `Section`,
//! `Subjects`, `Students Registration`), enrolls pending applications into
//! subject sections, and derives rosters and section summaries.
//!
//! - `store`: the `TableStore` trait and its workbook/in-memory backends
//! - `normalize`: raw sheet rows to uniform records
//! - `models`: typed rows and enrollment facts
//! - `engine`: the pure enrollment rules
//! - `reports`: roster and section views, CSV export
//! - `journal`: write-ahead log of enrollments
//! - `desk`: one method per user action
//! - `config`: persisted settings

pub mod config;
pub mod desk;
pub mod engine;
pub mod journal;
pub mod models;
pub mod normalize;
pub mod reports;
pub mod snapshot;
pub mod store;
pub mod utils;

pub use config::Config;
pub use desk::{EnrollReceipt, EnrollmentDesk};
pub use engine::{EnrollError, Enrollment, EnrollmentPolicy, MutationSet, PersistError};
pub use journal::{Journal, JournalEntry, Unresolved};
pub use reports::{Listing, RosterRow, SectionSummary};
pub use snapshot::Snapshot;
pub use store::{MemoryStore, Sheet, StoreError, TableStore, WorkbookStore};
