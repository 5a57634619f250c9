//! Independent re-check of a design against its inputs.
//!
//! The audit works from the extracted [`DesignSolution`] rather than the raw
//! solver values, so it also catches anything lost in rounding. Violations
//! are collected as [`Diagnostics`] errors; nothing here panics.

use super::{DesignSolution, FlowModel, FormulationOptions, RedundancyRule};
use tnep_core::{find_islands, Diagnostics, Grid, LinkSet, Severity};

/// Result of auditing one design.
#[derive(Debug, Clone)]
pub struct AuditReport {
    pub tag: String,
    pub diagnostics: Diagnostics,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        !self.diagnostics.has_errors()
    }

    pub fn violation_count(&self) -> usize {
        self.diagnostics.count(Severity::Error)
    }

    /// Compare the objective a backend reported with the cost recomputed
    /// from the extracted design.
    pub fn check_objective(&mut self, reported: f64, extracted: f64, tolerance: f64) {
        if (reported - extracted).abs() > slack(tolerance, extracted) {
            self.diagnostics.error(
                "objective",
                format!(
                    "backend reported {:.3}, built lines cost {:.3}",
                    reported, extracted
                ),
            );
        }
    }
}

impl std::fmt::Display for AuditReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "audit '{}': {}", self.tag, self.diagnostics)
    }
}

fn slack(tolerance: f64, reference: f64) -> f64 {
    tolerance * reference.abs().max(1.0)
}

/// Check balance, capacity, circuit bounds, redundancy and island supply.
///
/// Non-optimal solutions carry no decisions and audit clean.
pub fn audit_solution(
    grid: &Grid,
    links: &LinkSet,
    solution: &DesignSolution,
    options: &FormulationOptions,
    tolerance: f64,
) -> AuditReport {
    let mut diag = Diagnostics::new();
    let report = |diagnostics| AuditReport {
        tag: solution.tag.clone(),
        diagnostics,
    };
    if !solution.is_optimal() {
        return report(diag);
    }

    let mut inflow = vec![0.0_f64; grid.len()];
    let mut outflow = vec![0.0_f64; grid.len()];
    let mut connections = vec![0_u32; grid.len()];

    for decision in &solution.decisions {
        let entity = format!("link {}-{}", decision.from, decision.to);
        let Some(link) = links.get(decision.link) else {
            diag.error_on(entity, "topology", "not in the candidate set");
            continue;
        };
        if link.from != decision.from || link.to != decision.to {
            diag.error_on(entity, "topology", "endpoints differ from the candidate link");
            continue;
        }

        if decision.circuits > options.max_circuits {
            diag.error_on(
                entity.as_str(),
                "circuits",
                format!("{} lines, limit is {}", decision.circuits, options.max_circuits),
            );
        }

        let flow = decision.flow.value();
        let limit = f64::from(decision.circuits) * link.capacity.value();
        if flow.abs() > limit + slack(tolerance, limit) {
            diag.error_on(
                entity.as_str(),
                "capacity",
                format!("flow {:.3} MW over built capacity {:.3} MW", flow, limit),
            );
        }
        if options.flow_model == FlowModel::Directed && flow < -slack(tolerance, limit) {
            diag.error_on(entity.as_str(), "capacity", "negative flow on a directed link");
        }

        outflow[link.from.value()] += flow;
        inflow[link.to.value()] += flow;
        let weight = match options.redundancy {
            RedundancyRule::Circuits => decision.circuits,
            RedundancyRule::DistinctLinks => 1,
        };
        connections[link.from.value()] += weight;
        connections[link.to.value()] += weight;
    }

    for node in grid.nodes() {
        let idx = node.id.value();
        let net_out = outflow[idx] - inflow[idx];
        if node.is_station() {
            let cap = node.capacity().value();
            if net_out > cap + slack(tolerance, cap) {
                diag.error_on(
                    node.label(),
                    "balance",
                    format!("output {:.3} MW over capacity {:.3} MW", net_out, cap),
                );
            }
            continue;
        }

        let demand = node.demand().value();
        let served = -net_out;
        if (served - demand).abs() > slack(tolerance, demand) {
            diag.error_on(
                node.label(),
                "balance",
                format!("receives {:.3} MW, demand is {:.3} MW", served, demand),
            );
        }
        if connections[idx] < options.min_connections {
            diag.error_on(
                node.label(),
                "redundancy",
                format!(
                    "{} connections, at least {} required",
                    connections[idx], options.min_connections
                ),
            );
        }
    }

    let built = solution.decisions.iter().filter_map(|d| links.get(d.link));
    for island in find_islands(grid, built) {
        if island.is_short() {
            diag.error(
                "islands",
                format!(
                    "island {} has {} of supply for {} of demand",
                    island.island_id, island.capacity, island.demand
                ),
            );
        }
    }

    report(diag)
}
