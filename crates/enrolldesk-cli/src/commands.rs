use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use enrolldesk_core::models::subject::titles;
use enrolldesk_core::reports::subject_sections;
use enrolldesk_core::store::grid::{read_csv_grid, write_csv_grid};
use enrolldesk_core::store::Grid;
use enrolldesk_core::{Config, EnrollmentDesk, Journal, Listing, Sheet, StoreError, WorkbookStore};

use crate::cli::{Cli, ConfigArgs, EnrollArgs, RosterArgs, SectionsArgs, SheetCsvArgs};
use crate::output;

pub type Desk = EnrollmentDesk<WorkbookStore>;

// ============================================================================
// Setup
// ============================================================================

/// Settings in effect: config file, then environment, then flags
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load().context("load config")?;
    config.apply_env(|key| std::env::var(key).ok())?;

    if let Some(dir) = &cli.workbook {
        config.workbook_dir = Some(dir.clone());
    }
    if cli.unbounded {
        config.section_capacity = None;
    } else if let Some(capacity) = cli.capacity {
        config.section_capacity = Some(capacity);
    }
    Ok(config)
}

pub fn open_desk(cli: &Cli) -> Result<Desk> {
    let config = resolve_config(cli)?;
    let dir = config.workbook_dir()?;
    let policy = config.policy()?;
    debug!(workbook = %dir.display(), capacity = ?policy.capacity, "Opening workbook");

    let store = WorkbookStore::new(dir.clone())
        .with_context(|| format!("open workbook {}", dir.display()))?;
    Ok(EnrollmentDesk::new(store, policy).with_journal(Journal::in_dir(&dir)))
}

/// Point at `import` when a sheet has never been loaded
fn with_import_hint<T>(result: Result<T, StoreError>) -> Result<T> {
    result.map_err(|err| {
        if err.is_not_found() {
            anyhow::Error::new(err)
                .context("Sheet missing from workbook; load it with `enrolldesk import --sheet NAME --csv PATH`")
        } else {
            err.into()
        }
    })
}

fn parse_sheet(name: &str) -> Result<Sheet> {
    match Sheet::from_name(name) {
        Some(sheet) => Ok(sheet),
        None => {
            let names: Vec<&str> = Sheet::ALL.iter().map(|s| s.name()).collect();
            bail!("Unknown sheet '{}'; expected one of: {}", name, names.join(", "))
        }
    }
}

fn capacity_display(capacity: Option<usize>) -> String {
    match capacity {
        Some(n) => n.to_string(),
        None => "unbounded".to_string(),
    }
}

// ============================================================================
// Commands
// ============================================================================

pub fn run_status(desk: &Desk) -> Result<()> {
    let policy = desk.policy();
    println!("Workbook: {}", desk.store().dir().display());
    println!("Section capacity: {}", capacity_display(policy.capacity));
    println!("Default program code: {}", policy.default_program_code);
    println!("{}", output::sheets_table(&desk.store().sheet_status()));

    if let Some(journal) = desk.journal() {
        let unresolved = journal.unresolved().context("read journal")?;
        if !unresolved.is_empty() {
            println!(
                "{} enrollment(s) not fully saved; run `enrolldesk journal` for details",
                unresolved.len()
            );
        }
    }
    Ok(())
}

pub fn run_pending(desk: &Desk) -> Result<()> {
    let pending = with_import_hint(desk.pending_applications())?;
    if pending.is_empty() {
        println!("No pending applications.");
        return Ok(());
    }
    println!("{}", output::pending_table(&pending));
    println!("{} pending", pending.len());
    Ok(())
}

pub fn run_subjects(desk: &Desk) -> Result<()> {
    let snapshot = with_import_hint(desk.snapshot())?;
    let subjects = snapshot.subjects();
    let sections = snapshot.section_sheet();

    let listing: Vec<(String, Vec<String>)> = titles(&subjects)
        .into_iter()
        .map(|title| {
            let codes = subject_sections(&title, &subjects, &sections);
            (title, codes)
        })
        .collect();

    if listing.is_empty() {
        println!("No subjects defined.");
        return Ok(());
    }
    println!("{}", output::subjects_table(&listing));
    Ok(())
}

pub fn run_enroll(desk: &Desk, args: &EnrollArgs) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let receipt = match desk.enroll(args.row, &args.subject, &args.section, today) {
        Ok(receipt) => receipt,
        Err(err) => {
            if err.is_clean() {
                eprintln!("No changes were saved.");
            } else {
                eprintln!("Some sheets were updated; run `enrolldesk journal` to see which.");
            }
            return Err(err.into());
        }
    };

    if receipt.generated_id {
        println!("Assigned new student ID {}", receipt.student_id);
    }
    println!(
        "Enrolled {} ({}) in {} section {}",
        receipt.student_name, receipt.student_id, receipt.subject_title, receipt.section_code
    );
    match desk.policy().capacity {
        Some(capacity) => println!(
            "Section {}: {}/{} students",
            receipt.section_code, receipt.occupancy, capacity
        ),
        None => println!(
            "Section {}: {} students",
            receipt.section_code, receipt.occupancy
        ),
    }
    Ok(())
}

pub fn run_roster(desk: &Desk, args: &RosterArgs) -> Result<()> {
    if let Some(path) = &args.csv {
        let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        let count = with_import_hint(desk.export_roster_csv(BufWriter::new(file)))?;
        info!(path = %path.display(), rows = count, "Roster exported");
        println!("Wrote {} roster row(s) to {}", count, path.display());
        return Ok(());
    }

    let roster = with_import_hint(desk.roster())?;
    if roster.is_empty() {
        println!("Nobody is enrolled yet.");
        return Ok(());
    }
    println!("{}", output::roster_table(&roster));
    Ok(())
}

pub fn run_sections(desk: &Desk, args: &SectionsArgs) -> Result<()> {
    if let Some(code) = &args.show {
        let members = with_import_hint(desk.section_members(code))?;
        if members.is_empty() {
            println!("No students in section {}.", code.trim());
        } else {
            println!("{}", output::roster_table(&members));
        }
        return Ok(());
    }

    let listing = if args.all { Listing::All } else { Listing::Enrolled };
    let summaries = with_import_hint(desk.section_summary(listing))?;
    if summaries.is_empty() {
        println!("No sections to show.");
        return Ok(());
    }
    println!("{}", output::sections_table(&summaries, desk.policy()));
    Ok(())
}

pub fn run_import(desk: &Desk, args: &SheetCsvArgs) -> Result<()> {
    let sheet = parse_sheet(&args.sheet)?;

    let grid = read_csv(&args.csv)?;
    if grid.first().map_or(true, |header| header.iter().all(|h| h.trim().is_empty())) {
        bail!("{} has no header row", args.csv.display());
    }

    let rows = grid.len() - 1;
    desk.store().save_grid(sheet.name(), grid)?;
    info!(sheet = %sheet, rows, "Sheet imported");
    println!("Imported {} row(s) into {}", rows, sheet);
    Ok(())
}

fn read_csv(path: &Path) -> Result<Grid> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    Ok(read_csv_grid(file)?)
}

pub fn run_export(desk: &Desk, args: &SheetCsvArgs) -> Result<()> {
    let sheet = parse_sheet(&args.sheet)?;
    let grid = with_import_hint(desk.store().load_grid(sheet.name()))?;

    let file = File::create(&args.csv).with_context(|| format!("create {}", args.csv.display()))?;
    write_csv_grid(&grid, BufWriter::new(file))?;

    let rows = grid.len().saturating_sub(1);
    info!(sheet = %sheet, rows, "Sheet exported");
    println!("Wrote {} row(s) of {} to {}", rows, sheet, args.csv.display());
    Ok(())
}

pub fn run_journal(desk: &Desk) -> Result<()> {
    let Some(journal) = desk.journal() else {
        println!("Journal is disabled.");
        return Ok(());
    };

    let unresolved = journal.unresolved().context("read journal")?;
    if unresolved.is_empty() {
        println!("All journaled enrollments were saved.");
        return Ok(());
    }
    println!("{}", output::journal_table(&unresolved));
    println!("Journal: {}", journal.path().display());
    Ok(())
}

pub fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<()> {
    let config = resolve_config(cli)?;
    let path = Config::config_path()?;

    println!("Config file: {}", path.display());
    println!("Workbook: {}", config.workbook_dir()?.display());
    println!("Section capacity: {}", capacity_display(config.section_capacity));
    println!("Default program code: {}", config.default_program_code);
    for (student_type, code) in &config.program_codes {
        println!("Program code for {}: {}", student_type, code);
    }

    if args.save {
        config.policy()?;
        config.save().with_context(|| format!("save {}", path.display()))?;
        info!(path = %path.display(), "Config saved");
        println!("Saved.");
    }
    Ok(())
}
