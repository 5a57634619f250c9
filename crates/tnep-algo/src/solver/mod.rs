//! MILP solver adapters.
//!
//! The design core never solves anything itself. It hands a finished
//! [`DesignModel`] to a [`MilpBackend`] and gets back either an
//! [`Assignment`] or a [`SolveError`]. Infeasibility is an ordinary outcome,
//! not a failure of the caller.

use crate::planning::model::{DesignModel, VarId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod lp_backend;
mod registry;

pub use lp_backend::GoodLpBackend;
pub use registry::MilpSolverKind;

/// Outcome class of a solve attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// The backend itself failed
    Error,
}

impl SolveStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, SolveStatus::Optimal)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-optimal solve outcomes.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SolveError {
    #[error("model is infeasible")]
    Infeasible,

    #[error("model is unbounded")]
    Unbounded,

    #[error("solver backend failed: {0}")]
    Backend(String),
}

impl SolveError {
    pub fn status(&self) -> SolveStatus {
        match self {
            SolveError::Infeasible => SolveStatus::Infeasible,
            SolveError::Unbounded => SolveStatus::Unbounded,
            SolveError::Backend(_) => SolveStatus::Error,
        }
    }
}

/// Optimal values for every declared variable, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub objective: f64,
    pub values: Vec<f64>,
}

impl Assignment {
    #[inline]
    pub fn value(&self, var: VarId) -> f64 {
        self.values[var.index()]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Wall-clock limit per solve (backends that support it)
    pub time_limit_seconds: Option<f64>,
    /// Tolerance used when checking returned values against the model
    pub feasibility_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_seconds: None,
            feasibility_tolerance: 1e-6,
        }
    }
}

/// A MILP engine. Each call is an independent attempt.
pub trait MilpBackend: Send + Sync {
    /// Short identifier (e.g., "microlp", "highs")
    fn id(&self) -> &str;

    fn solve(&self, model: &DesignModel, config: &SolverConfig) -> Result<Assignment, SolveError>;
}
