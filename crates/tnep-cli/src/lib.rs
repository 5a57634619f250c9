pub mod cli;
pub mod config;

pub use cli::{Cli, Commands, InputArgs, OutputFormat};
pub use config::PlannerConfig;
