//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "onco-endpoints",
    version,
    about = "Derive oncology response endpoints from per-visit assessment tables",
    long_about = "Derive best overall response, time-to-event endpoints and their statuses\n\
                  from wide per-cycle tumour assessment tables.\n\n\
                  An optional intervention table flags new anti-cancer therapy; endpoints\n\
                  are then derived both on all assessments and censored at the new therapy."
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Derive per-patient endpoints and write the endpoint table.
    Derive(DeriveArgs),

    /// Write the analysis dataset for one estimand.
    Analysis(AnalysisArgs),

    /// List the supported estimand labels.
    Estimands,
}

/// Input tables and derivation settings shared by both commands.
#[derive(Parser)]
pub struct InputArgs {
    /// Assessment table (CSV, one row per patient, one column per cycle).
    #[arg(value_name = "ASSESSMENTS")]
    pub assessments: PathBuf,

    /// Intervention table flagging new anti-cancer therapy (same layout).
    #[arg(long = "interventions", value_name = "FILE")]
    pub interventions: Option<PathBuf>,

    /// Subject identifier column (default: first column).
    #[arg(long = "id-column", value_name = "NAME")]
    pub id_column: Option<String>,

    /// Treatment cycle length in days.
    #[arg(long = "cycle-length", value_name = "DAYS", default_value_t = 28)]
    pub cycle_length: u32,

    /// Abort on the first invalid patient and reject assessments recorded
    /// after a new therapy started.
    #[arg(long = "strict")]
    pub strict: bool,

    /// Use this cycle as the cohort maximum TTP for substituted TTR, e.g.
    /// when re-running a subset of a larger cohort.
    #[arg(long = "fixed-cohort-max", value_name = "CYCLE")]
    pub fixed_cohort_max: Option<u32>,
}

#[derive(Parser)]
pub struct DeriveArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output directory (default: <ASSESSMENTS directory>/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format to generate.
    #[arg(long = "format", value_enum, default_value = "both")]
    pub format: OutputFormatArg,

    /// Derive and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct AnalysisArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Estimand label (see the `estimands` command).
    #[arg(long = "estimand", value_name = "LABEL")]
    pub estimand: String,

    /// Output CSV (default: <ASSESSMENTS directory>/output/<LABEL>.csv).
    #[arg(long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Csv,
    Json,
    Both,
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
