use std::io::{self, Write};

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use exposure_model::{DurationUnit, IntervalStore, convert_duration};
use exposure_timeline::{QueryRow, Timelines};

use crate::types::CumulativeOutcome;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn print_summary(outcome: &CumulativeOutcome) {
    if let Some(path) = &outcome.output {
        println!("Output: {}", path.display());
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Patients"),
            header_cell("Events"),
            header_cell("Rows"),
            header_cell("Rejected"),
        ]);
        apply_table_style(&mut table);
        for index in 0..4 {
            align_column(&mut table, index, CellAlignment::Right);
        }
        table.add_row(vec![
            Cell::new(outcome.entity_count),
            Cell::new(outcome.event_count),
            Cell::new(outcome.rows.len()),
            count_cell(outcome.rejected.len(), Color::Red),
        ]);
        println!("{table}");
    }
    if outcome.has_errors() {
        eprintln!("Rejected queries:");
        for message in &outcome.rejected {
            eprintln!("- {message}");
        }
    }
}

/// Result rows as a table, in query order.
pub fn write_rows_table<W: Write>(
    mut writer: W,
    rows: &[QueryRow<String>],
    include_timedelta: bool,
) -> io::Result<()> {
    let mut table = Table::new();
    let mut header = vec![
        header_cell("Patient"),
        header_cell("Start"),
        header_cell("Query time"),
        header_cell("Before (d)"),
        header_cell("During (d)"),
        header_cell("After (d)"),
    ];
    if include_timedelta {
        header.extend([
            header_cell("Before (s)"),
            header_cell("During (s)"),
            header_cell("After (s)"),
        ]);
    }
    table.set_header(header);
    apply_table_style(&mut table);
    for index in 3..table.column_count() {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for row in rows {
        let split = &row.split;
        let mut cells = vec![
            Cell::new(&row.entity).add_attribute(Attribute::Bold),
            Cell::new(row.window_start.format(TIMESTAMP_FORMAT)),
            Cell::new(row.query_time.format(TIMESTAMP_FORMAT)),
            days_cell(split.before_days()),
            days_cell(split.during_days()),
            days_cell(split.after_days()),
        ];
        if include_timedelta {
            cells.extend([
                dim_cell(split.before.num_seconds()),
                dim_cell(split.during.num_seconds()),
                dim_cell(split.after.num_seconds()),
            ]);
        }
        table.add_row(cells);
    }
    writeln!(writer, "{table}")
}

/// Each patient's merged intervals with totals.
pub fn print_timelines(timelines: &Timelines<String>) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Patient"),
        header_cell("Intervals"),
        header_cell("Exposure (d)"),
        header_cell("Gaps (d)"),
        header_cell("Periods"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    let mut total_intervals = 0usize;
    for (patient, store) in timelines.iter() {
        total_intervals += store.len();
        table.add_row(vec![
            Cell::new(patient)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(store.len()),
            Cell::new(format_days(store)),
            dim_cell(format!(
                "{:.2}",
                convert_duration(store.gaps().total_duration(), DurationUnit::Days)
            )),
            Cell::new(
                store
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_intervals).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell(format!("{} patients", timelines.len())),
    ]);
    println!("{table}");
}

fn format_days(store: &IntervalStore) -> String {
    format!(
        "{:.2}",
        convert_duration(store.total_duration(), DurationUnit::Days)
    )
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn days_cell(days: i64) -> Cell {
    if days > 0 {
        Cell::new(days)
    } else {
        dim_cell(days)
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
