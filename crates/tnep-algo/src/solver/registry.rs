use super::{GoodLpBackend, MilpBackend};
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

/// MILP engines compiled into this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilpSolverKind {
    #[cfg(feature = "solver-microlp")]
    Microlp,
    #[cfg(feature = "solver-highs")]
    Highs,
}

const AVAILABLE_MILP_SOLVERS: &[&str] = &[
    #[cfg(feature = "solver-microlp")]
    "microlp",
    #[cfg(feature = "solver-highs")]
    "highs",
];

impl MilpSolverKind {
    pub fn available() -> &'static [&'static str] {
        AVAILABLE_MILP_SOLVERS
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            #[cfg(feature = "solver-microlp")]
            MilpSolverKind::Microlp => "microlp",
            #[cfg(feature = "solver-highs")]
            MilpSolverKind::Highs => "highs",
        }
    }

    pub fn build_backend(self) -> Arc<dyn MilpBackend> {
        Arc::new(GoodLpBackend::new(self))
    }
}

impl Default for MilpSolverKind {
    fn default() -> Self {
        #[cfg(feature = "solver-microlp")]
        {
            MilpSolverKind::Microlp
        }
        #[cfg(all(not(feature = "solver-microlp"), feature = "solver-highs"))]
        {
            MilpSolverKind::Highs
        }
    }
}

impl std::fmt::Display for MilpSolverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn unknown_solver_error(label: &str) -> anyhow::Error {
    anyhow!(
        "unknown milp solver '{}'; supported values: {}",
        label,
        MilpSolverKind::available().join(", ")
    )
}

impl FromStr for MilpSolverKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.to_ascii_lowercase();
        match normalized.as_str() {
            "default" => Ok(MilpSolverKind::default()),
            "microlp" => {
                #[cfg(feature = "solver-microlp")]
                {
                    Ok(MilpSolverKind::Microlp)
                }
                #[cfg(not(feature = "solver-microlp"))]
                {
                    Err(unknown_solver_error(&normalized))
                }
            }
            "highs" => {
                #[cfg(feature = "solver-highs")]
                {
                    Ok(MilpSolverKind::Highs)
                }
                #[cfg(not(feature = "solver-highs"))]
                {
                    Err(unknown_solver_error(&normalized))
                }
            }
            other => Err(unknown_solver_error(other)),
        }
    }
}
