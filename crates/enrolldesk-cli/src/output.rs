//! Table rendering for command output.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use enrolldesk_core::journal::Unresolved;
use enrolldesk_core::models::Application;
use enrolldesk_core::store::SheetStatus;
use enrolldesk_core::utils::{format_phone, or_dash, truncate};
use enrolldesk_core::{EnrollmentPolicy, RosterRow, SectionSummary};

/// Longest name shown before truncating
const NAME_WIDTH: usize = 32;

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_header(headers.iter().map(|h| header_cell(h)).collect::<Vec<_>>());
    apply_table_style(&mut table);
    table
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn sheets_table(statuses: &[SheetStatus]) -> Table {
    let mut table = new_table(&["Sheet", "Rows", "Saved"]);
    align_column(&mut table, 1, CellAlignment::Right);
    for status in statuses {
        let rows = match status.rows {
            Some(n) => Cell::new(n),
            None => dim_cell("missing"),
        };
        table.add_row(vec![
            Cell::new(status.sheet.name()),
            rows,
            Cell::new(status.saved_display()),
        ]);
    }
    table
}

pub fn pending_table(applications: &[Application]) -> Table {
    let mut table = new_table(&["Row", "Name", "Type", "Bracket", "Contact", "Student ID"]);
    align_column(&mut table, 0, CellAlignment::Right);
    for app in applications {
        table.add_row(vec![
            Cell::new(app.row),
            Cell::new(truncate(&app.full_name(), NAME_WIDTH)),
            Cell::new(or_dash(&app.student_type)),
            Cell::new(or_dash(&app.preferred_bracket)),
            Cell::new(or_dash(&format_phone(&app.contact))),
            if app.has_student_id() {
                Cell::new(&app.student_id)
            } else {
                dim_cell("new")
            },
        ]);
    }
    table
}

pub fn subjects_table(subjects: &[(String, Vec<String>)]) -> Table {
    let mut table = new_table(&["Subject", "Sections"]);
    for (title, codes) in subjects {
        let sections = if codes.is_empty() {
            dim_cell("none")
        } else {
            Cell::new(codes.join(", "))
        };
        table.add_row(vec![Cell::new(title), sections]);
    }
    table
}

pub fn roster_table(rows: &[RosterRow]) -> Table {
    let mut table = new_table(&["Section", "Student ID", "Name", "Subject"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.section_code),
            Cell::new(&row.student_id),
            Cell::new(truncate(&row.display_name(), NAME_WIDTH)),
            Cell::new(or_dash(&row.subject_title)),
        ]);
    }
    table
}

pub fn sections_table(summaries: &[SectionSummary], policy: &EnrollmentPolicy) -> Table {
    let mut table = new_table(&["Section", "Subject", "Schedule", "Batch", "Enrolled", "Seats left"]);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);
    for summary in summaries {
        let seats = if policy.is_full(summary.enrolled_count) {
            Cell::new("full").fg(Color::Red)
        } else {
            match summary.seats_left(policy.capacity) {
                Some(n) => Cell::new(n),
                None => dim_cell("-"),
            }
        };
        table.add_row(vec![
            Cell::new(&summary.section_code),
            Cell::new(or_dash(&summary.subject_id)),
            Cell::new(or_dash(&summary.schedule_display())),
            Cell::new(or_dash(&summary.batch_id)),
            Cell::new(summary.enrolled_count),
            seats,
        ]);
    }
    table
}

pub fn journal_table(entries: &[Unresolved]) -> Table {
    let mut table = new_table(&["Entry", "Recorded", "State", "Enrollment", "Saved", "Error"]);
    align_column(&mut table, 0, CellAlignment::Right);
    for entry in entries {
        let written = if entry.written.is_empty() {
            dim_cell("none")
        } else {
            Cell::new(entry.written.join(", "))
        };
        table.add_row(vec![
            Cell::new(entry.id),
            Cell::new(entry.recorded_at.format("%Y-%m-%d %H:%M")),
            Cell::new(entry.state).fg(Color::Yellow),
            Cell::new(entry.summary()),
            written,
            Cell::new(or_dash(entry.error.as_deref().unwrap_or(""))),
        ]);
    }
    table
}
