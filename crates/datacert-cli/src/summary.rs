use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use datacert_cli::pipeline::RunOutcome;
use datacert_model::TableStatus;

pub fn print_summary(outcome: &RunOutcome) {
    let report = &outcome.report;
    println!("Schema fingerprint: {}", report.schema_fingerprint);
    if let Some(paths) = &outcome.paths {
        println!("Markdown report: {}", paths.markdown.display());
        println!("JSON report: {}", paths.json.display());
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Entity type"),
        header_cell("Status"),
        header_cell("Scan"),
        header_cell("Validated"),
        header_cell("Total"),
        header_cell("Violations"),
        header_cell("Elapsed (ms)"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    align_column(&mut table, 3, CellAlignment::Center);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);
    align_column(&mut table, 6, CellAlignment::Right);
    align_column(&mut table, 7, CellAlignment::Right);

    for result in &report.tables {
        let scan = if result.sampled { "sampled" } else { "full" };
        table.add_row(vec![
            Cell::new(&result.table_name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&result.entity_type_name),
            status_cell(result.status),
            Cell::new(scan),
            Cell::new(result.validated_row_count),
            Cell::new(result.total_row_count),
            violation_cell(result.violation_count),
            Cell::new(result.elapsed_ms),
        ]);
    }

    let summary = &report.summary;
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} table(s)", summary.tables_validated))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(summary.rows_validated).add_attribute(Attribute::Bold),
        dim_cell("-"),
        violation_cell(summary.total_violations).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");

    if summary.tables_cancelled > 0 {
        eprintln!(
            "{} table(s) cancelled before completing their scan.",
            summary.tables_cancelled
        );
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
    if table.column_count() >= 8 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(24)),
            ColumnConstraint::UpperBoundary(Width::Fixed(20)),
            ColumnConstraint::LowerBoundary(Width::Fixed(9)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::LowerBoundary(Width::Fixed(9)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::LowerBoundary(Width::Fixed(10)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn status_cell(status: TableStatus) -> Cell {
    match status {
        TableStatus::Passed => Cell::new("PASSED")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        TableStatus::Failed => Cell::new("FAILED")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        TableStatus::Cancelled => Cell::new("CANCELLED").fg(Color::Yellow),
    }
}

fn violation_cell(count: u64) -> Cell {
    if count > 0 {
        Cell::new(count).fg(Color::Red)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}
