//! Transmission network design.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  NETWORK DESIGN                                                      │
//! │                                                                      │
//! │  Given:   stations (capacity), cities (demand), candidate links     │
//! │  Decide:  lines built per link (0..=2), flow per link               │
//! │  Minimize: Σ lines · length · cost rate                             │
//! │  Subject to:                                                        │
//! │    • station output within capacity                                 │
//! │    • city demand met exactly                                        │
//! │    • flow within built capacity                                     │
//! │    • every city connected at least twice                            │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The pipeline per attempt is: generate a [`LinkSet`](tnep_core::LinkSet)
//! → [`build_design_model`] → [`MilpBackend::solve`](crate::solver::MilpBackend::solve)
//! → [`extract_solution`]. Each stage takes its inputs by reference and
//! returns fresh values, so attempts never share mutable state.

pub mod audit;
mod formulation;
pub mod model;
mod solution;

pub use audit::{audit_solution, AuditReport};
pub use formulation::{
    build_design_model, DesignFormulation, FlowModel, FormulationOptions, LinkVars, RedundancyRule,
};
pub use solution::{extract_solution, DesignSolution, LinkDecision};

use crate::solver::SolveError;
use thiserror::Error;
use tnep_core::TnepError;

/// Errors that stop a design run. Solver outcomes are not among them.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DesignError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("grid has no nodes")]
    EmptyTopology,

    #[error(transparent)]
    Solve(#[from] SolveError),

    #[error("result tag '{0}' already recorded")]
    DuplicateTag(String),
}

impl From<TnepError> for DesignError {
    fn from(err: TnepError) -> Self {
        match err {
            TnepError::Config(msg) => DesignError::Config(msg),
            other => DesignError::InvalidInput(other.to_string()),
        }
    }
}

impl From<DesignError> for TnepError {
    fn from(err: DesignError) -> Self {
        match err {
            DesignError::InvalidInput(msg) => TnepError::Validation(msg),
            DesignError::Config(msg) => TnepError::Config(msg),
            DesignError::EmptyTopology => TnepError::Validation("grid has no nodes".into()),
            DesignError::Solve(err) => TnepError::Solver(err.to_string()),
            DesignError::DuplicateTag(tag) => {
                TnepError::Other(format!("result tag '{tag}' already recorded"))
            }
        }
    }
}
