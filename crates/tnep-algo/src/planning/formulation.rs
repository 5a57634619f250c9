//! Network design formulation.
//!
//! Translates a [`Grid`] and a candidate [`LinkSet`] into a [`DesignModel`]:
//!
//! ```text
//! minimize    Σ_l y_l · d_l · c_l
//!
//! subject to:
//!   Σ_out f - Σ_in f ≤ P_s               every station s (generation ceiling)
//!   Σ_in f - Σ_out f = D_c               every city c (demand met exactly)
//!   f_l ≤ cap · y_l                      every link l
//!   Σ_{l ∋ c} y_l ≥ k                    every city c (redundancy)
//!   y_l ∈ {0, …, max_circuits}
//!   f_l ≥ 0                              (directed flow model)
//! ```
//!
//! Flow runs in the link's stored `from → to` direction. With
//! [`FlowModel::Bidirectional`] the flow is signed and additionally bounded
//! below by `-cap · y_l`.

use super::model::{ConstraintFamily, DesignModel, LinearExpr, Sense, VarDomain, VarId};
use super::DesignError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tnep_core::{Grid, LinkId, LinkSet, NodeKind};

/// Direction convention for link flow variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowModel {
    /// Non-negative flow in the stored `from → to` direction only
    #[default]
    Directed,
    /// Signed flow bounded by `±cap · y`
    Bidirectional,
}

impl std::str::FromStr for FlowModel {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "directed" => Ok(FlowModel::Directed),
            "bidirectional" | "signed" => Ok(FlowModel::Bidirectional),
            other => Err(anyhow::anyhow!(
                "unknown flow model '{}'; supported values: directed, bidirectional",
                other
            )),
        }
    }
}

/// How the per-city connection minimum is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RedundancyRule {
    /// Sum of built lines on incident links (parallel lines count twice)
    #[default]
    Circuits,
    /// Number of distinct incident links with at least one built line
    DistinctLinks,
}

impl std::str::FromStr for RedundancyRule {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "circuits" => Ok(RedundancyRule::Circuits),
            "distinct-links" | "distinct_links" | "links" => Ok(RedundancyRule::DistinctLinks),
            other => Err(anyhow::anyhow!(
                "unknown redundancy rule '{}'; supported values: circuits, distinct-links",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormulationOptions {
    pub flow_model: FlowModel,
    pub redundancy: RedundancyRule,
    /// Minimum connections per city
    pub min_connections: u32,
    /// Upper bound on parallel lines per link
    pub max_circuits: u32,
}

impl Default for FormulationOptions {
    fn default() -> Self {
        Self {
            flow_model: FlowModel::Directed,
            redundancy: RedundancyRule::Circuits,
            min_connections: 2,
            max_circuits: 2,
        }
    }
}

/// Variable handles for one candidate link.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LinkVars {
    pub link: LinkId,
    /// Number of parallel lines built
    pub circuits: VarId,
    pub flow: VarId,
    /// Binary "at least one line" indicator (distinct-links redundancy only)
    pub usage: Option<VarId>,
}

/// A built model together with the handles needed to read a solution back.
#[derive(Debug, Clone)]
pub struct DesignFormulation {
    pub model: DesignModel,
    pub link_vars: Vec<LinkVars>,
}

impl DesignFormulation {
    pub fn vars_for(&self, link: LinkId) -> Option<&LinkVars> {
        self.link_vars.iter().find(|v| v.link == link)
    }
}

/// Build the design model for `grid` over the candidate `links`.
///
/// This only constructs; infeasibility (for instance a city without any
/// candidate link) is left for the solver to discover.
pub fn build_design_model(
    grid: &Grid,
    links: &LinkSet,
    options: &FormulationOptions,
) -> Result<DesignFormulation, DesignError> {
    if options.max_circuits == 0 {
        return Err(DesignError::Config("max_circuits must be at least 1".into()));
    }
    for link in links {
        if link.from == link.to {
            return Err(DesignError::InvalidInput(format!(
                "link {} is a self-loop on node {}",
                link.id, link.from
            )));
        }
        for end in [link.from, link.to] {
            if grid.node(end).is_none() {
                return Err(DesignError::InvalidInput(format!(
                    "link {} references unknown node {}",
                    link.id, end
                )));
            }
        }
    }

    let mut model = DesignModel::new();
    let mut link_vars = Vec::with_capacity(links.len());
    let mut objective = LinearExpr::new();

    let flow_domain = match options.flow_model {
        FlowModel::Directed => VarDomain::non_negative(),
        FlowModel::Bidirectional => VarDomain::free(),
    };

    for link in links {
        let circuits = model.add_variable(
            format!("y_{}_{}", link.from, link.to),
            VarDomain::Integer {
                min: 0,
                max: i64::from(options.max_circuits),
            },
        );
        let flow = model.add_variable(format!("f_{}_{}", link.from, link.to), flow_domain);
        objective.add_term(circuits, link.cost_per_circuit());

        let touches_city = [link.from, link.to]
            .iter()
            .any(|id| grid.node(*id).is_some_and(|n| n.is_city()));
        let usage = match options.redundancy {
            RedundancyRule::DistinctLinks if touches_city => Some(model.add_variable(
                format!("u_{}_{}", link.from, link.to),
                VarDomain::binary(),
            )),
            _ => None,
        };

        link_vars.push(LinkVars {
            link: link.id,
            circuits,
            flow,
            usage,
        });
    }
    model.set_objective(objective);

    // Power balance, expressed as inflow minus outflow at each node
    let mut net_inflow: HashMap<usize, LinearExpr> = HashMap::new();
    for (link, vars) in links.iter().zip(&link_vars) {
        net_inflow
            .entry(link.to.value())
            .or_default()
            .add_term(vars.flow, 1.0);
        net_inflow
            .entry(link.from.value())
            .or_default()
            .add_term(vars.flow, -1.0);
    }
    for node in grid.nodes() {
        let inflow = net_inflow.remove(&node.id.value()).unwrap_or_default();
        match node.kind {
            NodeKind::Station => {
                // outflow - inflow <= P  <=>  inflow - outflow >= -P
                model.add_constraint(
                    format!("balance_station_{}", node.id),
                    ConstraintFamily::PowerBalance,
                    inflow,
                    Sense::Ge,
                    -node.capacity().value(),
                );
            }
            NodeKind::City => {
                model.add_constraint(
                    format!("balance_city_{}", node.id),
                    ConstraintFamily::PowerBalance,
                    inflow,
                    Sense::Eq,
                    node.demand().value(),
                );
            }
        }
    }

    for (link, vars) in links.iter().zip(&link_vars) {
        let cap = link.capacity.value();
        model.add_constraint(
            format!("capacity_{}_{}", link.from, link.to),
            ConstraintFamily::Capacity,
            LinearExpr::new()
                .with_term(vars.flow, 1.0)
                .with_term(vars.circuits, -cap),
            Sense::Le,
            0.0,
        );
        if options.flow_model == FlowModel::Bidirectional {
            model.add_constraint(
                format!("capacity_rev_{}_{}", link.from, link.to),
                ConstraintFamily::Capacity,
                LinearExpr::new()
                    .with_term(vars.flow, 1.0)
                    .with_term(vars.circuits, cap),
                Sense::Ge,
                0.0,
            );
        }
        if let Some(usage) = vars.usage {
            model.add_constraint(
                format!("usage_{}_{}", link.from, link.to),
                ConstraintFamily::LinkUsage,
                LinearExpr::new()
                    .with_term(usage, 1.0)
                    .with_term(vars.circuits, -1.0),
                Sense::Le,
                0.0,
            );
        }
    }

    for city in grid.cities() {
        let mut connections = LinearExpr::new();
        for (link, vars) in links.iter().zip(&link_vars) {
            if !link.touches(city.id) {
                continue;
            }
            let var = match options.redundancy {
                RedundancyRule::Circuits => vars.circuits,
                RedundancyRule::DistinctLinks => match vars.usage {
                    Some(usage) => usage,
                    None => continue,
                },
            };
            connections.add_term(var, 1.0);
        }
        model.add_constraint(
            format!("redundancy_city_{}", city.id),
            ConstraintFamily::Redundancy,
            connections,
            Sense::Ge,
            f64::from(options.min_connections),
        );
    }

    Ok(DesignFormulation { model, link_vars })
}
