//! Design solution data structures and extraction.

use super::formulation::DesignFormulation;
use super::DesignError;
use crate::solver::{Assignment, SolveError, SolveStatus};
use serde::Serialize;
use std::time::Duration;
use tnep_core::{Kilometers, LinkId, LinkSet, Megawatts, NodeId};

/// A link with at least one built line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkDecision {
    pub link: LinkId,
    pub from: NodeId,
    pub to: NodeId,
    /// Number of parallel lines built
    pub circuits: u32,
    /// Flow in the `from → to` direction
    pub flow: Megawatts,
    pub distance: Kilometers,
    /// Construction cost of the built lines
    pub cost: f64,
}

/// Result of one solve attempt, keyed by its tag.
#[derive(Debug, Clone, Serialize)]
pub struct DesignSolution {
    pub tag: String,
    pub status: SolveStatus,
    /// Total construction cost (currency units, unscaled)
    pub total_cost: f64,
    /// Distance threshold the candidate links were generated with
    pub max_distance: Option<Kilometers>,
    pub candidate_links: usize,
    /// Built links only, in link order
    pub decisions: Vec<LinkDecision>,
    pub solve_time: Duration,
    /// Backend message for non-optimal outcomes
    pub message: Option<String>,
}

impl DesignSolution {
    /// A non-optimal outcome with no decisions.
    pub fn failed(
        tag: impl Into<String>,
        status: SolveStatus,
        message: impl Into<String>,
        links: &LinkSet,
        solve_time: Duration,
    ) -> Self {
        Self {
            tag: tag.into(),
            status,
            total_cost: 0.0,
            max_distance: links.max_distance(),
            candidate_links: links.len(),
            decisions: Vec::new(),
            solve_time,
            message: Some(message.into()),
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status.is_success()
    }

    /// Turn a non-optimal outcome into an error, for callers that need a design.
    pub fn require_optimal(self) -> Result<Self, DesignError> {
        let err = match self.status {
            SolveStatus::Optimal => return Ok(self),
            SolveStatus::Infeasible => SolveError::Infeasible,
            SolveStatus::Unbounded => SolveError::Unbounded,
            SolveStatus::Error => SolveError::Backend(self.message.unwrap_or_default()),
        };
        Err(DesignError::Solve(err))
    }

    /// Total cost scaled to millions.
    pub fn cost_millions(&self) -> f64 {
        self.total_cost / 1e6
    }

    pub fn lines_built(&self) -> usize {
        self.decisions.len()
    }

    pub fn total_circuits(&self) -> u32 {
        self.decisions.iter().map(|d| d.circuits).sum()
    }

    pub fn decision(&self, link: LinkId) -> Option<&LinkDecision> {
        self.decisions.iter().find(|d| d.link == link)
    }

    /// Decision on the link between `a` and `b`, in either order.
    pub fn decision_between(&self, a: NodeId, b: NodeId) -> Option<&LinkDecision> {
        self.decisions
            .iter()
            .find(|d| (d.from == a && d.to == b) || (d.from == b && d.to == a))
    }

    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Design '{}'\n{}\n", self.tag, "=".repeat(40)));
        s.push_str(&format!("Status: {}\n", self.status));
        match self.max_distance {
            Some(d) => s.push_str(&format!(
                "Candidates: {} links within {}\n",
                self.candidate_links, d
            )),
            None => s.push_str(&format!(
                "Candidates: {} links (complete graph)\n",
                self.candidate_links
            )),
        }
        if !self.is_optimal() {
            s.push_str("No optimal solution found\n");
            if let Some(msg) = &self.message {
                s.push_str(&format!("  {}\n", msg));
            }
            return s;
        }
        s.push_str(&format!("Total Cost: {:.3} M\n", self.cost_millions()));
        s.push_str(&format!(
            "Lines Built: {} links ({} lines)\n",
            self.lines_built(),
            self.total_circuits()
        ));
        s.push_str(&format!("Solve Time: {:.2?}\n", self.solve_time));
        if !self.decisions.is_empty() {
            s.push_str("\nActive Links:\n");
            for d in &self.decisions {
                s.push_str(&format!(
                    "  {} -> {}  lines: {}  flow: {:.1} MW\n",
                    d.from,
                    d.to,
                    d.circuits,
                    d.flow.value()
                ));
            }
        }
        s
    }
}

/// Read circuits and flows back from a solved formulation.
///
/// Circuit values are rounded to the nearest integer; links with zero
/// rounded circuits are dropped.
pub fn extract_solution(
    tag: impl Into<String>,
    formulation: &DesignFormulation,
    links: &LinkSet,
    assignment: &Assignment,
    solve_time: Duration,
) -> DesignSolution {
    let mut decisions = Vec::new();
    for (link, vars) in links.iter().zip(&formulation.link_vars) {
        let circuits = assignment.value(vars.circuits).round().max(0.0) as u32;
        if circuits == 0 {
            continue;
        }
        decisions.push(LinkDecision {
            link: link.id,
            from: link.from,
            to: link.to,
            circuits,
            flow: Megawatts(assignment.value(vars.flow)),
            distance: link.distance,
            cost: f64::from(circuits) * link.cost_per_circuit(),
        });
    }

    DesignSolution {
        tag: tag.into(),
        status: SolveStatus::Optimal,
        // `+ 0.0` turns an empty sum's -0.0 into 0.0
        total_cost: decisions.iter().map(|d| d.cost).sum::<f64>() + 0.0,
        max_distance: links.max_distance(),
        candidate_links: links.len(),
        decisions,
        solve_time,
        message: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::{build_design_model, FormulationOptions};
    use tnep_core::{generate_links, Grid, LineParams};

    fn solved_fixture() -> DesignSolution {
        let grid = Grid::from_records(
            &[(0.0, 0.0, 100.0), (10.0, 0.0, 100.0)],
            &[(5.0, 0.0, 150.0)],
        )
        .unwrap();
        let links = generate_links(&grid, Some(Kilometers(20.0)), &LineParams::default());
        let formulation =
            build_design_model(&grid, &links, &FormulationOptions::default()).unwrap();

        // y01 = 0, y02 = 1, y12 = 1 with flows 0, 100, 50 (ordering y, f per link)
        let mut values = vec![0.0; formulation.model.variables().len()];
        let set = |values: &mut Vec<f64>, idx: usize, y: f64, f: f64| {
            let vars = formulation.link_vars[idx];
            values[vars.circuits.index()] = y;
            values[vars.flow.index()] = f;
        };
        set(&mut values, 1, 1.0, 100.0);
        set(&mut values, 2, 0.9999999, 50.0);
        let assignment = Assignment {
            objective: formulation.model.objective().evaluate(&values),
            values,
        };
        extract_solution("base", &formulation, &links, &assignment, Duration::ZERO)
    }

    #[test]
    fn test_extract_keeps_only_built_links() {
        let solution = solved_fixture();
        assert_eq!(solution.lines_built(), 2);
        assert_eq!(solution.total_circuits(), 2);
        assert!(solution
            .decision_between(NodeId::new(2), NodeId::new(1))
            .is_some());
        assert!(solution.decision(LinkId::new(0)).is_none());
    }

    #[test]
    fn test_cost_uses_rounded_circuits() {
        let solution = solved_fixture();
        // two 5 km lines at 1e6 per km
        assert!((solution.total_cost - 10e6).abs() < 1e-6);
        assert!((solution.cost_millions() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_nothing_built_costs_positive_zero() {
        let grid = Grid::from_records(&[(0.0, 0.0, 100.0)], &[(5.0, 0.0, 50.0)]).unwrap();
        let links = generate_links(&grid, None, &LineParams::default());
        let formulation =
            build_design_model(&grid, &links, &FormulationOptions::default()).unwrap();
        let assignment = Assignment {
            objective: 0.0,
            values: vec![0.0; formulation.model.variables().len()],
        };
        let solution = extract_solution("base", &formulation, &links, &assignment, Duration::ZERO);
        assert_eq!(solution.lines_built(), 0);
        assert!(solution.total_cost.is_sign_positive());
        assert!(solution.summary().contains("Total Cost: 0.000 M"));
    }

    #[test]
    fn test_summary_lists_active_links() {
        let summary = solved_fixture().summary();
        assert!(summary.contains("Status: optimal"));
        assert!(summary.contains("Total Cost: 10.000 M"));
        assert!(summary.contains("0 -> 2  lines: 1  flow: 100.0 MW"));
    }

    #[test]
    fn test_failed_summary() {
        let grid = Grid::from_records(&[(0.0, 0.0, 1.0)], &[(1.0, 0.0, 1.0)]).unwrap();
        let links = generate_links(&grid, None, &LineParams::default());
        let solution = DesignSolution::failed(
            "station_0_try_1",
            SolveStatus::Infeasible,
            "model is infeasible",
            &links,
            Duration::ZERO,
        );
        assert!(!solution.is_optimal());
        assert!(solution.summary().contains("No optimal solution found"));
        assert_eq!(
            solution.require_optimal().unwrap_err(),
            DesignError::Solve(SolveError::Infeasible)
        );
    }
}
