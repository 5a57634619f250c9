//! The two top-level operations: design the base network, then sweep
//! station outages against it.

use crate::planning::{
    audit_solution, build_design_model, extract_solution, DesignError, DesignSolution,
    FormulationOptions,
};
use crate::reliability::{ReliabilityConfig, ReliabilityReport, ReliabilitySweep};
use crate::solver::{MilpBackend, MilpSolverKind, SolveStatus, SolverConfig};
use crate::store::{AttemptStore, BASE_TAG};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tnep_core::{generate_links, Grid, Kilometers, LineParams};
use tracing::{debug, info, warn};

/// Everything a planner needs besides the grid and the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    /// Threshold for the base design; unset means the complete graph
    pub base_max_distance: Option<Kilometers>,
    pub lines: LineParams,
    pub formulation: FormulationOptions,
    pub reliability: ReliabilityConfig,
    pub solver: SolverConfig,
}

impl PlannerSettings {
    pub fn validate(&self) -> Result<(), DesignError> {
        self.lines.validate()?;
        self.reliability.validate()?;
        if self.formulation.max_circuits == 0 {
            return Err(DesignError::Config("max_circuits must be at least 1".into()));
        }
        if let Some(d) = self.base_max_distance {
            if !d.value().is_finite() || d.value() < 0.0 {
                return Err(DesignError::Config(format!(
                    "base_max_distance must be finite and non-negative, got {}",
                    d.value()
                )));
            }
        }
        Ok(())
    }
}

pub struct Planner {
    backend: Arc<dyn MilpBackend>,
    settings: PlannerSettings,
}

impl Planner {
    pub fn new(backend: Arc<dyn MilpBackend>, settings: PlannerSettings) -> Result<Self, DesignError> {
        settings.validate()?;
        Ok(Self { backend, settings })
    }

    /// Planner backed by one of the built-in `good_lp` engines.
    pub fn with_solver(kind: MilpSolverKind, settings: PlannerSettings) -> Result<Self, DesignError> {
        Self::new(kind.build_backend(), settings)
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    pub fn backend_id(&self) -> &str {
        self.backend.id()
    }

    /// Generate candidates, build, solve and extract one tagged attempt.
    ///
    /// Solver failures come back as a non-optimal [`DesignSolution`], and so
    /// does an assignment that fails [`audit_solution`]. `Err` means the
    /// inputs themselves are unusable.
    pub fn solve_attempt(
        &self,
        grid: &Grid,
        max_distance: Option<Kilometers>,
        tag: &str,
    ) -> Result<DesignSolution, DesignError> {
        if grid.is_empty() {
            return Err(DesignError::EmptyTopology);
        }

        let links = generate_links(grid, max_distance, &self.settings.lines);
        let formulation = build_design_model(grid, &links, &self.settings.formulation)?;
        debug!(
            tag,
            links = links.len(),
            variables = formulation.model.variables().len(),
            constraints = formulation.model.constraints().len(),
            "model built"
        );

        let start = Instant::now();
        let outcome = self.backend.solve(&formulation.model, &self.settings.solver);
        let elapsed = start.elapsed();

        let solution = match outcome {
            Ok(assignment) => {
                let solution = extract_solution(tag, &formulation, &links, &assignment, elapsed);
                let tolerance = self.settings.solver.feasibility_tolerance;
                let mut audit = audit_solution(
                    grid,
                    &links,
                    &solution,
                    &self.settings.formulation,
                    tolerance,
                );
                audit.check_objective(assignment.objective, solution.total_cost, tolerance);
                if audit.is_clean() {
                    solution
                } else {
                    // an assignment that breaks the model is a failed attempt, not a design
                    warn!(tag, violations = audit.violation_count(), "{}", audit);
                    DesignSolution::failed(tag, SolveStatus::Error, audit.to_string(), &links, elapsed)
                }
            }
            Err(err) => {
                if err.status() == SolveStatus::Error {
                    warn!(tag, backend = self.backend.id(), error = %err, "solver failed");
                } else {
                    debug!(tag, status = %err.status(), "no optimal solution");
                }
                DesignSolution::failed(tag, err.status(), err.to_string(), &links, elapsed)
            }
        };
        Ok(solution)
    }

    /// Design the full network and record it under [`BASE_TAG`].
    pub fn solve_base_case(
        &self,
        grid: &Grid,
        store: &mut AttemptStore,
    ) -> Result<DesignSolution, DesignError> {
        let solution = self.solve_attempt(grid, self.settings.base_max_distance, BASE_TAG)?;
        if solution.is_optimal() {
            info!(
                cost_millions = solution.cost_millions(),
                links = solution.lines_built(),
                "base design solved"
            );
        } else {
            info!(status = %solution.status, "base design has no optimal solution");
        }
        store.insert(solution.clone())?;
        Ok(solution)
    }

    /// Run the outage sweep over every station of `grid`.
    pub fn reliability_sweep(
        &self,
        grid: &Grid,
        store: &mut AttemptStore,
    ) -> Result<ReliabilityReport, DesignError> {
        ReliabilitySweep::new(self, self.settings.reliability)?.run(grid, store)
    }
}
