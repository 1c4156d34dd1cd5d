use anyhow::Result;
use comfy_table::Table;

use geoedu_cli::pipeline::{load_standards, run_year};
use geoedu_cli::types::{RunRequest, RunResult};

use crate::cli::{RunArgs, StandardsArgs};
use crate::summary::apply_table_style;

pub fn run(args: &RunArgs) -> Result<RunResult> {
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| args.base.join("output").join(args.year.to_string()));
    let request = RunRequest {
        base: args.base.clone(),
        year: args.year,
        output_dir,
        cohort: args.cohort.into(),
        standards_dir: args.standards.standards.clone(),
        dry_run: args.dry_run,
    };
    run_year(&request)
}

pub fn run_regions(args: &StandardsArgs) -> Result<()> {
    let standards = load_standards(args.standards.as_deref())?;
    let mut table = Table::new();
    table.set_header(vec!["#", "Region", "Code", "Aliases"]);
    apply_table_style(&mut table);
    for (position, region) in standards.tables.regions.iter().enumerate() {
        table.add_row(vec![
            (position + 1).to_string(),
            region.name.clone(),
            region.code.to_string(),
            region.aliases.len().to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_cutoffs(args: &StandardsArgs) -> Result<()> {
    let standards = load_standards(args.standards.as_deref())?;
    let mut table = Table::new();
    table.set_header(vec!["Year", "IVM cutoff"]);
    apply_table_style(&mut table);
    for (year, cutoff) in standards.tables.cutoffs.iter() {
        table.add_row(vec![year.to_string(), format!("{cutoff:.5}")]);
    }
    println!("{table}");
    Ok(())
}
