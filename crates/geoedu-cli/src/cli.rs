//! CLI argument definitions for the mobility pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use geoedu_model::CohortKind;

#[derive(Parser)]
#[command(
    name = "geoedu",
    version,
    about = "Link Chilean higher-education enrollment to school origins",
    long_about = "Link higher-education enrollment, admission scores, school and campus\n\
                  locations and school vulnerability for one dataset year.\n\n\
                  Writes the joined stage tables, the interregional mobility matrix,\n\
                  migration rates and regional vulnerability shares as CSV."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow student identifiers in trace-level logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Process one dataset year and write the mobility outputs.
    Run(RunArgs),

    /// List canonical regions in north-to-south order.
    Regions(StandardsArgs),

    /// List the high-vulnerability cutoff per year.
    Cutoffs(StandardsArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Base folder holding one sub-folder per dataset year.
    #[arg(value_name = "BASE")]
    pub base: PathBuf,

    /// Dataset year to process.
    #[arg(long = "year")]
    pub year: i32,

    /// Output directory (default: <BASE>/output/<YEAR>).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Enrollment cohort to link.
    #[arg(long = "cohort", value_enum, default_value = "a1")]
    pub cohort: CohortArg,

    #[command(flatten)]
    pub standards: StandardsArgs,

    /// Run every stage and print the summary without writing files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct StandardsArgs {
    /// Directory with reference.toml and layout.toml
    /// (default: GEOEDU_STANDARDS_DIR, then the built-in tables).
    #[arg(long = "standards", value_name = "DIR")]
    pub standards: Option<PathBuf>,
}

/// CLI cohort choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum CohortArg {
    A0,
    A,
    A1,
}

impl From<CohortArg> for CohortKind {
    fn from(arg: CohortArg) -> Self {
        match arg {
            CohortArg::A0 => CohortKind::A0,
            CohortArg::A => CohortKind::A,
            CohortArg::A1 => CohortKind::A1,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
