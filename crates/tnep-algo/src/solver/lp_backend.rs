//! [`MilpBackend`] implemented on top of `good_lp`.

use super::{Assignment, MilpBackend, MilpSolverKind, SolveError, SolverConfig};
use crate::planning::model::{ConstraintDef, DesignModel, LinearExpr, Sense, VarDomain};
use good_lp::{
    constraint, variable, Constraint, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable,
};
use std::time::Instant;
use tracing::{debug, warn};

/// Translates a [`DesignModel`] into a `good_lp` problem and solves it with
/// the selected engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodLpBackend {
    kind: MilpSolverKind,
}

impl GoodLpBackend {
    pub fn new(kind: MilpSolverKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> MilpSolverKind {
        self.kind
    }
}

fn to_expression(expr: &LinearExpr, handles: &[Variable]) -> Expression {
    let mut out = Expression::from(expr.constant);
    for &(var, coef) in &expr.terms {
        out += coef * handles[var.index()];
    }
    out
}

fn to_constraint(def: &ConstraintDef, handles: &[Variable]) -> Constraint {
    let lhs = to_expression(&def.expr, handles);
    let rhs = def.rhs;
    match def.sense {
        Sense::Le => constraint!(lhs <= rhs),
        Sense::Ge => constraint!(lhs >= rhs),
        Sense::Eq => constraint!(lhs == rhs),
    }
}

fn map_resolution_error(err: ResolutionError) -> SolveError {
    match err {
        ResolutionError::Infeasible => SolveError::Infeasible,
        ResolutionError::Unbounded => SolveError::Unbounded,
        other => SolveError::Backend(other.to_string()),
    }
}

fn run<M>(mut problem: M, rows: Vec<Constraint>, handles: &[Variable]) -> Result<Vec<f64>, SolveError>
where
    M: SolverModel<Error = ResolutionError>,
{
    for row in rows {
        problem = problem.with(row);
    }
    let solution = problem.solve().map_err(map_resolution_error)?;
    Ok(handles.iter().map(|h| solution.value(*h)).collect())
}

impl MilpBackend for GoodLpBackend {
    fn id(&self) -> &str {
        self.kind.as_str()
    }

    fn solve(&self, model: &DesignModel, config: &SolverConfig) -> Result<Assignment, SolveError> {
        let start = Instant::now();

        let mut vars = ProblemVariables::new();
        let handles: Vec<Variable> = model
            .variables()
            .iter()
            .map(|def| {
                let definition = match def.domain {
                    VarDomain::Integer { min, max } => {
                        variable().integer().min(min as f64).max(max as f64)
                    }
                    VarDomain::Continuous { min, max } => {
                        let mut d = variable();
                        if let Some(lo) = min {
                            d = d.min(lo);
                        }
                        if let Some(hi) = max {
                            d = d.max(hi);
                        }
                        d
                    }
                };
                vars.add(definition.name(def.name.clone()))
            })
            .collect();

        // Rows without variables never reach the engine; a violated one
        // settles the attempt as infeasible on its own.
        let mut rows = Vec::with_capacity(model.constraints().len());
        for def in model.constraints() {
            if def.expr.is_constant() {
                if !def.is_satisfied(&[], config.feasibility_tolerance) {
                    debug!(constraint = %def.name, "constant constraint violated");
                    return Err(SolveError::Infeasible);
                }
                continue;
            }
            rows.push(to_constraint(def, &handles));
        }

        let objective = to_expression(model.objective(), &handles);
        let problem = vars.minimise(objective);

        let values = match self.kind {
            #[cfg(feature = "solver-microlp")]
            MilpSolverKind::Microlp => {
                if config.time_limit_seconds.is_some() {
                    warn!("microlp does not support a time limit; ignoring");
                }
                run(
                    problem.using(good_lp::solvers::microlp::microlp),
                    rows,
                    &handles,
                )?
            }
            #[cfg(feature = "solver-highs")]
            MilpSolverKind::Highs => {
                let mut highs = problem.using(good_lp::solvers::highs::highs);
                if let Some(limit) = config.time_limit_seconds {
                    highs = highs.set_time_limit(limit);
                }
                run(highs, rows, &handles)?
            }
        };

        debug!(
            backend = self.id(),
            variables = handles.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "milp solved"
        );

        Ok(Assignment {
            objective: model.objective().evaluate(&values),
            values,
        })
    }
}

#[cfg(all(test, feature = "solver-microlp"))]
mod tests {
    use super::*;
    use crate::planning::model::ConstraintFamily;

    fn backend() -> GoodLpBackend {
        GoodLpBackend::new(MilpSolverKind::Microlp)
    }

    #[test]
    fn test_small_integer_program() {
        // minimize 3y subject to 10y >= 15, y integer in [0, 2]  ->  y = 2
        let mut model = DesignModel::new();
        let y = model.add_variable("y", VarDomain::Integer { min: 0, max: 2 });
        model.set_objective(LinearExpr::new().with_term(y, 3.0));
        model.add_constraint(
            "need",
            ConstraintFamily::Capacity,
            LinearExpr::new().with_term(y, 10.0),
            Sense::Ge,
            15.0,
        );

        let assignment = backend().solve(&model, &SolverConfig::default()).unwrap();
        assert!((assignment.value(y) - 2.0).abs() < 1e-6);
        assert!((assignment.objective - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_infeasible_program() {
        let mut model = DesignModel::new();
        let y = model.add_variable("y", VarDomain::Integer { min: 0, max: 1 });
        model.set_objective(LinearExpr::new().with_term(y, 1.0));
        model.add_constraint(
            "impossible",
            ConstraintFamily::Redundancy,
            LinearExpr::new().with_term(y, 1.0),
            Sense::Ge,
            2.0,
        );

        let err = backend().solve(&model, &SolverConfig::default()).unwrap_err();
        assert_eq!(err, SolveError::Infeasible);
    }

    #[test]
    fn test_violated_constant_row_short_circuits() {
        let mut model = DesignModel::new();
        model.add_variable("y", VarDomain::binary());
        model.add_constraint(
            "redundancy_city_0",
            ConstraintFamily::Redundancy,
            LinearExpr::new(),
            Sense::Ge,
            2.0,
        );
        let err = backend().solve(&model, &SolverConfig::default()).unwrap_err();
        assert_eq!(err, SolveError::Infeasible);
    }
}
