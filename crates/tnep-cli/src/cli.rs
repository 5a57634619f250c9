use clap::{Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;
use tnep_algo::{FlowModel, RedundancyRule};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Minimum-cost transmission network design with station outage checks",
    long_about = None
)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    /// Planner configuration file (TOML)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// MILP engine (microlp, highs, default)
    #[arg(long, global = true)]
    pub solver: Option<String>,

    /// Flow direction convention (directed, bidirectional)
    #[arg(long, global = true)]
    pub flow_model: Option<FlowModel>,

    /// How city connections are counted (circuits, distinct-links)
    #[arg(long, global = true)]
    pub redundancy: Option<RedundancyRule>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Node input files. Without them the built-in reference dataset is used.
#[derive(clap::Args, Debug, Clone)]
pub struct InputArgs {
    /// Station records (count-prefixed text or CSV)
    #[arg(long, requires = "cities", value_hint = ValueHint::FilePath)]
    pub stations: Option<PathBuf>,

    /// City records (count-prefixed text or CSV)
    #[arg(long, requires = "stations", value_hint = ValueHint::FilePath)]
    pub cities: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    #[default]
    Table,
    /// JSON on stdout
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Design the minimum-cost network
    Solve {
        #[command(flatten)]
        input: InputArgs,
        /// Maximum candidate link length in km (default: complete graph)
        #[arg(long)]
        max_distance: Option<f64>,
        /// Directory for solution_<tag>.txt and attempts.json
        #[arg(long, value_hint = ValueHint::DirPath)]
        out: Option<PathBuf>,
        /// Write the solved design as a Graphviz DOT file
        #[arg(long, value_hint = ValueHint::FilePath)]
        dot: Option<PathBuf>,
        /// Exit with an error when no optimal design exists
        #[arg(long)]
        strict: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Design the base network, then test every single-station outage
    Reliability {
        #[command(flatten)]
        input: InputArgs,
        /// Threshold of the first outage attempt in km
        #[arg(long)]
        initial_distance: Option<f64>,
        /// Threshold increase after each failed attempt in km
        #[arg(long)]
        distance_step: Option<f64>,
        /// Attempts per station before it is declared failed
        #[arg(long)]
        max_attempts: Option<u32>,
        /// Directory for solution_<tag>.txt and attempts.json
        #[arg(long, value_hint = ValueHint::DirPath)]
        out: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Check a dataset and describe its candidate topology
    Inspect {
        #[command(flatten)]
        input: InputArgs,
        /// Maximum candidate link length in km (default: complete graph)
        #[arg(long)]
        max_distance: Option<f64>,
        /// Write the candidate graph in DOT format
        #[arg(long, value_hint = ValueHint::FilePath)]
        dot: Option<PathBuf>,
    },
    /// Write the reference dataset (power_plant.txt, home.txt)
    Sample {
        /// Output directory
        #[arg(long, value_hint = ValueHint::DirPath)]
        out: PathBuf,
    },
}
