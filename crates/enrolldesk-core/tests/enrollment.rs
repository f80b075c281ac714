//! End-to-end enrollment through the on-disk workbook.

use std::fs;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use enrolldesk_core::store::Grid;
use enrolldesk_core::{
    EnrollError, EnrollmentDesk, EnrollmentPolicy, Journal, Listing, Sheet, WorkbookStore,
};
use tempfile::{tempdir, TempDir};

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

/// One section S1 of Mathematics, no students, two pending applications
fn seeded_workbook() -> (TempDir, WorkbookStore) {
    let dir = tempdir().unwrap();
    let store = WorkbookStore::new(dir.path().to_path_buf()).unwrap();

    let sheets: Vec<(Sheet, Grid)> = vec![
        (
            Sheet::Students,
            vec![row(&["student_id", "first_name", "last_name", "section_code", "subject_id"])],
        ),
        (
            Sheet::Sections,
            vec![
                row(&[
                    "section_code",
                    "subject_id",
                    "section_day_sched",
                    "section_start_time",
                    "section_end_time",
                    "batch_id",
                ]),
                row(&["S1", "MATH", "Mon", "9:00", "10:00", "B1"]),
            ],
        ),
        (
            Sheet::Subjects,
            vec![
                row(&["subject_id", "subject_title"]),
                row(&["MATH", "Mathematics"]),
            ],
        ),
        (
            Sheet::Registrations,
            vec![
                row(&["student_id", "first_name", "last_name", "student_type", "status"]),
                row(&["", "Ana", "Cruz", "Regular", "FALSE"]),
                row(&["", "Ben", "Reyes", "Regular", ""]),
            ],
        ),
    ];
    for (sheet, grid) in sheets {
        store.save_grid(sheet.name(), grid).unwrap();
    }
    (dir, store)
}

fn sheet_bytes(dir: &Path) -> Vec<Vec<u8>> {
    ["students.json", "section.json", "subjects.json", "students_registration.json"]
        .iter()
        .map(|name| fs::read(dir.join(name)).unwrap())
        .collect()
}

#[test]
fn test_new_applicant_is_enrolled() {
    let (_dir, store) = seeded_workbook();
    let desk = EnrollmentDesk::new(&store, EnrollmentPolicy::default());

    let receipt = desk.enroll(0, "Mathematics", "S1", today()).unwrap();
    assert!(receipt.generated_id);
    assert_eq!(receipt.student_id, format!("{}R10001", today().year()));

    let snapshot = desk.snapshot().unwrap();
    let students = snapshot.students();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0].section_code, "S1");
    assert_eq!(students[0].subject_id, "MATH");
    assert_eq!(students[0].first_name, "Ana");
    assert_eq!(students[0].date_enrolled, "2025-06-01");

    let application = snapshot.application(0).unwrap();
    assert!(application.enrolled);
    assert_eq!(application.student_id, receipt.student_id);
    assert_eq!(application.subject_title, "Mathematics");

    // Status checkbox is written back as a boolean cell
    let grid = store.load_grid(Sheet::Registrations.name()).unwrap();
    let status = grid[0].iter().position(|h| h == "status").unwrap();
    assert_eq!(grid[1][status], "TRUE");
}

#[test]
fn test_occupancy_grows_by_one() {
    let (_dir, store) = seeded_workbook();
    let desk = EnrollmentDesk::new(&store, EnrollmentPolicy::default());

    let first = desk.enroll(0, "Mathematics", "S1", today()).unwrap();
    let second = desk.enroll(1, "Mathematics", "S1", today()).unwrap();

    assert_eq!(first.occupancy, 1);
    assert_eq!(second.occupancy, 2);
    assert_eq!(second.student_id, "2025R10002");

    let summary = desk.section_summary(Listing::Enrolled).unwrap();
    assert_eq!(summary[0].enrolled_count, 2);
    assert_eq!(summary[0].seats_left(desk.policy().capacity), Some(4));
    assert!(desk.pending_applications().unwrap().is_empty());
}

#[test]
fn test_full_section_leaves_workbook_untouched() {
    let (dir, store) = seeded_workbook();
    let desk = EnrollmentDesk::new(&store, EnrollmentPolicy::default().with_capacity(Some(1)));

    desk.enroll(0, "Mathematics", "S1", today()).unwrap();
    let before = sheet_bytes(dir.path());

    let err = desk.enroll(1, "Mathematics", "S1", today()).unwrap_err();
    assert!(matches!(
        err,
        EnrollError::SectionFull {
            occupancy: 1,
            capacity: 1,
            ..
        }
    ));
    assert_eq!(sheet_bytes(dir.path()), before);
}

#[test]
fn test_unbounded_section_never_fills() {
    let (_dir, store) = seeded_workbook();
    let desk = EnrollmentDesk::new(&store, EnrollmentPolicy::default().with_capacity(None));

    desk.enroll(0, "Mathematics", "S1", today()).unwrap();
    desk.enroll(1, "Mathematics", "S1", today()).unwrap();
    assert_eq!(desk.roster().unwrap().len(), 2);
}

#[test]
fn test_enrolled_application_cannot_enroll_again() {
    let (_dir, store) = seeded_workbook();
    let desk = EnrollmentDesk::new(&store, EnrollmentPolicy::default());

    desk.enroll(0, "Mathematics", "S1", today()).unwrap();
    let err = desk.enroll(0, "Mathematics", "S1", today()).unwrap_err();
    assert!(matches!(err, EnrollError::Validation(_)));
}

#[test]
fn test_returning_student_duplicate_is_rejected() {
    let (dir, store) = seeded_workbook();
    let desk = EnrollmentDesk::new(&store, EnrollmentPolicy::default());
    desk.enroll(0, "Mathematics", "S1", today()).unwrap();

    // A second application from the same student, already carrying the id
    let mut grid = store.load_grid(Sheet::Registrations.name()).unwrap();
    let header = grid[0].clone();
    let mut reapply = vec![String::new(); header.len()];
    for (i, name) in header.iter().enumerate() {
        reapply[i] = match name.as_str() {
            "student_id" => "2025R10001".to_string(),
            "first_name" => "Ana".to_string(),
            "last_name" => "Cruz".to_string(),
            _ => String::new(),
        };
    }
    grid.push(reapply);
    store.save_grid(Sheet::Registrations.name(), grid).unwrap();
    let before = sheet_bytes(dir.path());

    let err = desk.enroll(2, "Mathematics", "S1", today()).unwrap_err();
    assert!(matches!(
        err,
        EnrollError::DuplicateEnrollment { ref student_id, ref section }
            if student_id == "2025R10001" && section == "S1"
    ));
    assert_eq!(sheet_bytes(dir.path()), before);
}

#[test]
fn test_roster_export_and_journal() {
    let (dir, store) = seeded_workbook();
    let desk = EnrollmentDesk::new(&store, EnrollmentPolicy::default())
        .with_journal(Journal::in_dir(dir.path()));

    desk.enroll(1, "Mathematics", "S1", today()).unwrap();
    desk.enroll(0, "Mathematics", "S1", today()).unwrap();

    let mut out = Vec::new();
    desk.export_roster_csv(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        [
            "student_id,first_name,last_name,subject_id,subject_title,section_code",
            "2025R10002,Ana,Cruz,MATH,Mathematics,S1",
            "2025R10001,Ben,Reyes,MATH,Mathematics,S1",
        ]
    );

    let journal = Journal::in_dir(dir.path());
    assert_eq!(journal.entries().unwrap().len(), 4);
    assert!(journal.unresolved().unwrap().is_empty());
}
