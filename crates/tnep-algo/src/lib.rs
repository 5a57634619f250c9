//! # tnep-algo: Transmission Network Design and Outage Sweeps
//!
//! This crate turns a [`tnep_core::Grid`] into a minimum-cost transmission
//! network and checks that the network survives the loss of any one station.
//!
//! ## Architecture
//!
//! - **[`planning`]**: MILP formulation (what to solve), solution extraction and audit
//! - **[`solver`]**: [`MilpBackend`] adapters over `good_lp` (how to solve it)
//! - **[`reliability`]**: sequential station-outage sweep with threshold relaxation
//! - **[`store`]**: tagged record of every attempt
//! - **[`Planner`]**: ties the above into the two top-level operations
//!
//! | Operation | Tag(s) | Result |
//! |-----------|--------|--------|
//! | [`Planner::solve_base_case`] | `base` | [`DesignSolution`] |
//! | [`Planner::reliability_sweep`] | `station_<id>_try_<n>` | [`ReliabilityReport`] |
//!
//! ## Example
//!
//! ```ignore
//! use tnep_algo::{AttemptStore, MilpSolverKind, Planner, PlannerSettings};
//!
//! let planner = Planner::with_solver(MilpSolverKind::default(), PlannerSettings::default())?;
//! let mut store = AttemptStore::new();
//!
//! let base = planner.solve_base_case(&grid, &mut store)?;
//! println!("{}", base.summary());
//!
//! let report = planner.reliability_sweep(&grid, &mut store)?;
//! println!("{}", report.summary());
//! ```

#[cfg(not(any(feature = "solver-microlp", feature = "solver-highs")))]
compile_error!("tnep-algo needs at least one MILP engine: enable `solver-microlp` or `solver-highs`");

pub mod planner;
pub mod planning;
pub mod reliability;
pub mod solver;
pub mod store;

pub use planner::{Planner, PlannerSettings};
pub use planning::{
    audit_solution, build_design_model, extract_solution, AuditReport, DesignError,
    DesignFormulation, DesignSolution, FlowModel, FormulationOptions, LinkDecision,
    RedundancyRule,
};
pub use reliability::{
    ReliabilityConfig, ReliabilityReport, ReliabilitySweep, StationResult, StationVerdict,
};
pub use solver::{
    Assignment, GoodLpBackend, MilpBackend, MilpSolverKind, SolveError, SolveStatus,
    SolverConfig,
};
pub use store::{attempt_tag, AttemptRecord, AttemptStore, BASE_TAG};
