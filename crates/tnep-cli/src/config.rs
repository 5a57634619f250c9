//! Planner configuration file.
//!
//! ```toml
//! engine = "microlp"
//! base_max_distance = 1500.0
//!
//! [lines]
//! capacity = 1000.0
//! cost_per_km = 1e6
//!
//! [formulation]
//! flow_model = "directed"
//! redundancy = "circuits"
//! min_connections = 2
//! max_circuits = 2
//!
//! [reliability]
//! initial_max_distance = 1000.0
//! distance_step = 100.0
//! max_attempts = 5
//!
//! [solver]
//! time_limit_seconds = 60.0
//! ```
//!
//! Every key is optional; command-line flags override file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tnep_algo::{MilpSolverKind, PlannerSettings};

use crate::cli::Cli;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// MILP engine name
    pub engine: Option<String>,
    #[serde(flatten)]
    pub planner: PlannerSettings,
}

impl PlannerConfig {
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("parsing planner configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("in {}", path.display()))
    }

    /// File config (or defaults) with the global CLI overrides applied.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(engine) = &cli.solver {
            config.engine = Some(engine.clone());
        }
        if let Some(flow_model) = cli.flow_model {
            config.planner.formulation.flow_model = flow_model;
        }
        if let Some(redundancy) = cli.redundancy {
            config.planner.formulation.redundancy = redundancy;
        }
        Ok(config)
    }

    pub fn solver_kind(&self) -> Result<MilpSolverKind> {
        match &self.engine {
            Some(name) => name.parse(),
            None => Ok(MilpSolverKind::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tnep_algo::{FlowModel, RedundancyRule};
    use tnep_core::Kilometers;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = PlannerConfig::from_toml(
            r#"
base_max_distance = 1500.0

[reliability]
max_attempts = 3

[lines]
cost_per_km = 2e6
"#,
        )
        .unwrap();
        assert_eq!(config.planner.base_max_distance, Some(Kilometers(1500.0)));
        assert_eq!(config.planner.reliability.max_attempts, 3);
        assert_eq!(config.planner.reliability.distance_step, Kilometers(100.0));
        assert_eq!(config.planner.lines.cost_per_km, 2e6);
        assert_eq!(config.planner.lines.capacity.value(), 1000.0);
        assert_eq!(config.planner.formulation.max_circuits, 2);
        assert!(config.engine.is_none());
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planner.toml");
        std::fs::write(
            &path,
            "engine = \"nonsense\"\n[formulation]\nflow_model = \"bidirectional\"\n",
        )
        .unwrap();

        let cli = Cli::parse_from([
            "tnep-cli",
            "--config",
            path.to_str().unwrap(),
            "--redundancy",
            "distinct-links",
            "--solver",
            "default",
            "sample",
            "--out",
            "x",
        ]);
        let config = PlannerConfig::resolve(&cli).unwrap();
        assert_eq!(config.planner.formulation.flow_model, FlowModel::Bidirectional);
        assert_eq!(config.planner.formulation.redundancy, RedundancyRule::DistinctLinks);
        assert_eq!(config.solver_kind().unwrap(), MilpSolverKind::default());
    }

    #[test]
    fn test_unknown_engine_rejected() {
        let config = PlannerConfig {
            engine: Some("cplex".into()),
            ..Default::default()
        };
        let err = config.solver_kind().unwrap_err();
        assert!(err.to_string().contains("unknown milp solver 'cplex'"));
    }
}
