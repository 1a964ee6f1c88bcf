//! Human-readable run summary.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

use weave_model::CompileReport;

pub fn print_summary(report: &CompileReport) {
    if report.skipped {
        println!("Nothing changed since the last link; skipped.");
        return;
    }
    if report.dry_run {
        println!("Dry run: no files were written.");
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![header_cell("Category"), header_cell("Items")]);
    if let Some(column) = table.column_mut(1) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    for count in &report.categories {
        table.add_row(vec![
            Cell::new(&count.category),
            Cell::new(count.items),
        ]);
    }
    table.add_row(vec![
        Cell::new("total").add_attribute(Attribute::Bold),
        Cell::new(report.total_items()).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    println!(
        "Modules written: {}, unchanged: {}",
        report.modules_written, report.modules_unchanged
    );
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}
