use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use geoedu_cli::types::RunResult;
use geoedu_transform::aggregate::RegionRates;

pub fn print_summary(result: &RunResult) {
    println!("Year: {} (cohort {})", result.year, result.cohort);
    match &result.manifest {
        Some(_) => println!("Output: {}", result.output_dir.display()),
        None => println!("Output: {} (dry run, nothing written)", result.output_dir.display()),
    }
    print_input_table(result);
    print_stage_table(result);
    print_rate_table(&result.outputs.rates);

    let resolution = &result.outputs.resolution;
    if resolution.attempted > 0 {
        println!(
            "Campus coordinates: {} of {} missing filled, {} still missing",
            resolution.filled, resolution.attempted, resolution.still_missing
        );
    }
    let vulnerability = &result.outputs.vulnerability;
    match vulnerability.cutoff {
        Some(cutoff) => println!(
            "Vulnerability cutoff {cutoff:.5}: {} high, {} imputed, {} without index",
            vulnerability.high, vulnerability.imputed, vulnerability.unmatched
        ),
        None => println!("Vulnerability cutoff: none for this year, flags left empty"),
    }
}

fn print_input_table(result: &RunResult) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Dataset"), header_cell("File")]);
    apply_table_style(&mut table);
    for file in &result.inputs {
        let name = file
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");
        table.add_row(vec![Cell::new(file.dataset), Cell::new(name)]);
    }
    println!("{table}");
}

fn print_stage_table(result: &RunResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Records"),
        header_cell("Dropped"),
        header_cell("Unmatched"),
        header_cell("Written"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);

    table.add_row(vec![
        Cell::new("Cohort").fg(Color::Cyan),
        Cell::new(result.cohort_rows),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    for stage in &result.stages {
        let written = result
            .manifest
            .as_ref()
            .and_then(|m| m.artifact(stage.stage.artifact_stem()))
            .is_some();
        table.add_row(vec![
            Cell::new(stage.stage.label())
                .fg(Color::Cyan)
                .add_attribute(Attribute::Bold),
            Cell::new(stage.records),
            count_cell(stage.dropped, Color::Yellow),
            count_cell(stage.unmatched, Color::Yellow),
            written_cell(written),
        ]);
    }
    println!("{table}");
}

fn print_rate_table(rates: &[RegionRates]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Region"),
        header_cell("Students"),
        header_cell("Migration %"),
        header_cell("Reception %"),
        header_cell("Avg out km"),
        header_cell("Avg in km"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for rate in rates {
        table.add_row(vec![
            Cell::new(&rate.region),
            Cell::new(rate.origin_total),
            Cell::new(format!("{:.2}", rate.migration_rate)),
            Cell::new(format!("{:.2}", rate.reception_rate)),
            Cell::new(format!("{:.1}", rate.avg_migration_distance_km)),
            Cell::new(format!("{:.1}", rate.avg_reception_distance_km)),
        ]);
    }
    println!("{table}");
}

fn written_cell(written: bool) -> Cell {
    if written {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell("-")
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
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
