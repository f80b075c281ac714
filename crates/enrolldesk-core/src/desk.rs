//! The enrollment desk: one method per user action.
//!
//! Every action re-reads the workbook immediately before computing, so a
//! result always reflects the latest saved state. `enroll` is the only
//! action that writes.

use std::io::Write;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::engine::{EnrollError, Enrollment, EnrollmentPolicy, Entity, MutationSet, PersistError};
use crate::journal::Journal;
use crate::models::subject::titles;
use crate::models::{enrollment_facts, occupancy, Application};
use crate::reports::{self, Listing, RosterRow, SectionSummary};
use crate::snapshot::Snapshot;
use crate::store::{Sheet, StoreError, TableStore};

/// Tables written by an enrollment, in write order
pub const PERSIST_ORDER: [Sheet; 3] = [Sheet::Registrations, Sheet::Students, Sheet::Sections];

/// What a successful enrollment did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollReceipt {
    pub student_id: String,
    /// The id was generated by this enrollment
    pub generated_id: bool,
    pub student_name: String,
    pub subject_title: String,
    pub section_code: String,
    /// Students in the section after this enrollment
    pub occupancy: usize,
}

pub struct EnrollmentDesk<S: TableStore> {
    store: S,
    policy: EnrollmentPolicy,
    journal: Option<Journal>,
}

impl<S: TableStore> EnrollmentDesk<S> {
    pub fn new(store: S, policy: EnrollmentPolicy) -> Self {
        Self {
            store,
            policy,
            journal: None,
        }
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> &EnrollmentPolicy {
        &self.policy
    }

    pub fn journal(&self) -> Option<&Journal> {
        self.journal.as_ref()
    }

    pub fn snapshot(&self) -> Result<Snapshot, StoreError> {
        Snapshot::load(&self.store)
    }

    /// Applications still waiting for a subject and section, in sheet order
    pub fn pending_applications(&self) -> Result<Vec<Application>, StoreError> {
        Ok(self
            .snapshot()?
            .applications()
            .into_iter()
            .filter(Application::is_pending)
            .collect())
    }

    pub fn subject_titles(&self) -> Result<Vec<String>, StoreError> {
        Ok(titles(&self.snapshot()?.subjects()))
    }

    pub fn subject_sections(&self, subject_title: &str) -> Result<Vec<String>, StoreError> {
        let snapshot = self.snapshot()?;
        Ok(reports::subject_sections(
            subject_title,
            &snapshot.subjects(),
            &snapshot.section_sheet(),
        ))
    }

    /// Enroll the application at `row` into a subject (by title) and section.
    ///
    /// Nothing is written unless every check passes. The three tables are
    /// then saved in `PERSIST_ORDER`; a store failure after the first save
    /// is reported as `EnrollError::PartiallySaved` naming what was written.
    pub fn enroll(
        &self,
        row: usize,
        subject_choice: &str,
        section_choice: &str,
        today: NaiveDate,
    ) -> Result<EnrollReceipt, EnrollError> {
        let mut snapshot = self.snapshot()?;
        let application = snapshot
            .application(row)
            .ok_or_else(|| EnrollError::not_found(Entity::Application, format!("row {}", row)))?;

        let mutations = Enrollment::new(&self.policy, today)
            .with_reserved_ids(self.reserved_ids(&snapshot))
            .enroll(
                &application,
                subject_choice,
                section_choice,
                &snapshot.students(),
                &snapshot.section_sheet(),
                &snapshot.subjects(),
            )?;

        mutations.apply(&mut snapshot)?;

        let entry = self.journal_begin(&mutations);
        if let Err(err) = self.persist(&snapshot) {
            self.journal_fail(entry, &err);
            return Err(if err.written.is_empty() {
                EnrollError::from(err.source)
            } else {
                EnrollError::PartiallySaved(err)
            });
        }
        self.journal_commit(entry);

        let students = snapshot.students();
        let sheet = snapshot.section_sheet();
        let occupied = occupancy(
            &enrollment_facts(&students, &sheet),
            &mutations.membership.subject_id,
            mutations.section_code(),
        );

        info!(
            row,
            student_id = mutations.student_id(),
            section = mutations.section_code(),
            occupancy = occupied,
            new_student = mutations.creates_student(),
            "Student enrolled"
        );

        Ok(EnrollReceipt {
            student_id: mutations.student_id().to_string(),
            generated_id: mutations.application.assigned_student_id.is_some(),
            student_name: application.full_name(),
            subject_title: mutations.application.subject_title.clone(),
            section_code: mutations.section_code().to_string(),
            occupancy: occupied,
        })
    }

    /// Student ids on application rows and in unfinished journal entries.
    /// Either can hold an id the `Students` sheet never received.
    fn reserved_ids(&self, snapshot: &Snapshot) -> Vec<String> {
        let mut ids: Vec<String> = snapshot
            .table(Sheet::Registrations)
            .records()
            .iter()
            .map(|record| record.get("student_id").trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();

        if let Some(journal) = &self.journal {
            match journal.unresolved() {
                Ok(open) => ids.extend(
                    open.iter()
                        .filter_map(|entry| entry.mutations.as_ref())
                        .map(|m| m.student_id().to_string()),
                ),
                Err(e) => warn!(error = %e, "Failed to read journal for reserved ids"),
            }
        }
        ids
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<(), PersistError> {
        let mut written = Vec::new();
        for sheet in PERSIST_ORDER {
            let records = snapshot.table(sheet).to_raw();
            if let Err(source) = self.store.save(sheet.name(), &records) {
                return Err(PersistError {
                    table: sheet.name().to_string(),
                    written,
                    source,
                });
            }
            written.push(sheet.name().to_string());
        }
        Ok(())
    }

    fn journal_begin(&self, mutations: &MutationSet) -> Option<u64> {
        let journal = self.journal.as_ref()?;
        match journal.begin(mutations) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(error = %e, "Failed to journal enrollment");
                None
            }
        }
    }

    fn journal_commit(&self, entry: Option<u64>) {
        if let (Some(journal), Some(id)) = (&self.journal, entry) {
            if let Err(e) = journal.commit(id) {
                warn!(id, error = %e, "Failed to mark journal entry committed");
            }
        }
    }

    fn journal_fail(&self, entry: Option<u64>, err: &PersistError) {
        if let (Some(journal), Some(id)) = (&self.journal, entry) {
            if let Err(e) = journal.fail(id, &err.to_string(), &err.written) {
                warn!(id, error = %e, "Failed to mark journal entry failed");
            }
        }
    }

    pub fn roster(&self) -> Result<Vec<RosterRow>, StoreError> {
        let snapshot = self.snapshot()?;
        Ok(reports::enrolled_roster(
            &snapshot.students(),
            &snapshot.section_sheet(),
            &snapshot.subjects(),
        ))
    }

    pub fn section_summary(&self, listing: Listing) -> Result<Vec<SectionSummary>, StoreError> {
        let snapshot = self.snapshot()?;
        Ok(reports::section_summary(
            &snapshot.students(),
            &snapshot.section_sheet(),
            listing,
        ))
    }

    pub fn section_members(&self, section_code: &str) -> Result<Vec<RosterRow>, StoreError> {
        let snapshot = self.snapshot()?;
        Ok(reports::section_members(
            section_code,
            &snapshot.students(),
            &snapshot.section_sheet(),
            &snapshot.subjects(),
        ))
    }

    /// Write the current roster as CSV. Returns the number of data rows.
    pub fn export_roster_csv<W: Write>(&self, writer: W) -> Result<usize, StoreError> {
        let rows = self.roster()?;
        reports::write_roster_csv(&rows, writer)?;
        Ok(rows.len())
    }
}
