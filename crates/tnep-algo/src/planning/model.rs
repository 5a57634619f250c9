//! Solver-neutral MILP representation.
//!
//! The formulation is written against these types rather than against a
//! particular modelling library, so the model can be inspected in tests and
//! handed to any [`MilpBackend`](crate::solver::MilpBackend).

use serde::Serialize;

/// Handle to a variable declared in a [`DesignModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VarId(usize);

impl VarId {
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum VarDomain {
    /// Integer in `[min, max]`
    Integer { min: i64, max: i64 },
    /// Real with optional bounds (`None` = unbounded on that side)
    Continuous { min: Option<f64>, max: Option<f64> },
}

impl VarDomain {
    pub fn binary() -> Self {
        VarDomain::Integer { min: 0, max: 1 }
    }

    pub fn non_negative() -> Self {
        VarDomain::Continuous {
            min: Some(0.0),
            max: None,
        }
    }

    pub fn free() -> Self {
        VarDomain::Continuous {
            min: None,
            max: None,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, VarDomain::Integer { .. })
    }

    /// Whether `value` lies in the domain, within `tol`.
    pub fn contains(&self, value: f64, tol: f64) -> bool {
        match *self {
            VarDomain::Integer { min, max } => {
                (value - value.round()).abs() <= tol
                    && value >= min as f64 - tol
                    && value <= max as f64 + tol
            }
            VarDomain::Continuous { min, max } => {
                min.map_or(true, |lo| value >= lo - tol) && max.map_or(true, |hi| value <= hi + tol)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VariableDef {
    pub name: String,
    pub domain: VarDomain,
}

/// `Σ coef·var + constant`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinearExpr {
    pub terms: Vec<(VarId, f64)>,
    pub constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_term(&mut self, var: VarId, coef: f64) -> &mut Self {
        self.terms.push((var, coef));
        self
    }

    pub fn with_term(mut self, var: VarId, coef: f64) -> Self {
        self.terms.push((var, coef));
        self
    }

    /// An expression with no variables.
    pub fn is_constant(&self) -> bool {
        self.terms.iter().all(|(_, coef)| *coef == 0.0)
    }

    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.constant
            + self
                .terms
                .iter()
                .map(|(var, coef)| coef * values[var.index()])
                .sum::<f64>()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sense {
    Le,
    Ge,
    Eq,
}

impl std::fmt::Display for Sense {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Sense::Le => "<=",
            Sense::Ge => ">=",
            Sense::Eq => "==",
        })
    }
}

/// Which part of the formulation a constraint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintFamily {
    PowerBalance,
    Capacity,
    Redundancy,
    LinkUsage,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConstraintDef {
    pub name: String,
    pub family: ConstraintFamily,
    pub expr: LinearExpr,
    pub sense: Sense,
    pub rhs: f64,
}

impl ConstraintDef {
    /// Check the constraint at `values` with an absolute-or-relative tolerance.
    pub fn is_satisfied(&self, values: &[f64], tol: f64) -> bool {
        let lhs = self.expr.evaluate(values);
        let slack = tol * self.rhs.abs().max(1.0);
        match self.sense {
            Sense::Le => lhs <= self.rhs + slack,
            Sense::Ge => lhs >= self.rhs - slack,
            Sense::Eq => (lhs - self.rhs).abs() <= slack,
        }
    }
}

/// A minimisation MILP. Built once per solve attempt and never modified
/// after it is handed to a backend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DesignModel {
    variables: Vec<VariableDef>,
    objective: LinearExpr,
    constraints: Vec<ConstraintDef>,
}

impl DesignModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_variable(&mut self, name: impl Into<String>, domain: VarDomain) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(VariableDef {
            name: name.into(),
            domain,
        });
        id
    }

    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        family: ConstraintFamily,
        expr: LinearExpr,
        sense: Sense,
        rhs: f64,
    ) {
        self.constraints.push(ConstraintDef {
            name: name.into(),
            family,
            expr,
            sense,
            rhs,
        });
    }

    pub fn set_objective(&mut self, objective: LinearExpr) {
        self.objective = objective;
    }

    pub fn variables(&self) -> &[VariableDef] {
        &self.variables
    }

    pub fn variable(&self, id: VarId) -> &VariableDef {
        &self.variables[id.index()]
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn constraints(&self) -> &[ConstraintDef] {
        &self.constraints
    }

    pub fn constraints_in(&self, family: ConstraintFamily) -> impl Iterator<Item = &ConstraintDef> {
        self.constraints.iter().filter(move |c| c.family == family)
    }

    pub fn num_integer_variables(&self) -> usize {
        self.variables.iter().filter(|v| v.domain.is_integer()).count()
    }

    /// Names of constraints or variable domains violated at `values`.
    pub fn violations(&self, values: &[f64], tol: f64) -> Vec<String> {
        let mut out = Vec::new();
        for (var, value) in self.variables.iter().zip(values) {
            if !var.domain.contains(*value, tol) {
                out.push(format!("{} = {} outside domain", var.name, value));
            }
        }
        for c in &self.constraints {
            if !c.is_satisfied(values, tol) {
                out.push(format!(
                    "{}: {:.6} {} {}",
                    c.name,
                    c.expr.evaluate(values),
                    c.sense,
                    c.rhs
                ));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_evaluation() {
        let mut model = DesignModel::new();
        let x = model.add_variable("x", VarDomain::binary());
        let y = model.add_variable("y", VarDomain::non_negative());
        let expr = LinearExpr::new().with_term(x, 2.0).with_term(y, -1.0);
        assert_eq!(expr.evaluate(&[1.0, 0.5]), 1.5);
        assert!(!expr.is_constant());
        assert!(LinearExpr::new().is_constant());
    }

    #[test]
    fn test_integer_domain_rejects_fractional_values() {
        let domain = VarDomain::Integer { min: 0, max: 2 };
        assert!(domain.contains(2.0, 1e-9));
        assert!(!domain.contains(1.5, 1e-9));
        assert!(!domain.contains(3.0, 1e-9));
    }

    #[test]
    fn test_violations_report_constraint_names() {
        let mut model = DesignModel::new();
        let x = model.add_variable("x", VarDomain::non_negative());
        model.add_constraint(
            "cap",
            ConstraintFamily::Capacity,
            LinearExpr::new().with_term(x, 1.0),
            Sense::Le,
            10.0,
        );
        assert!(model.violations(&[5.0], 1e-9).is_empty());
        let violations = model.violations(&[12.0], 1e-9);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].starts_with("cap:"));
    }

    #[test]
    fn test_equality_uses_relative_tolerance() {
        let mut model = DesignModel::new();
        let f = model.add_variable("f", VarDomain::free());
        model.add_constraint(
            "balance",
            ConstraintFamily::PowerBalance,
            LinearExpr::new().with_term(f, 1.0),
            Sense::Eq,
            1000.0,
        );
        assert!(model.constraints()[0].is_satisfied(&[1000.0000005], 1e-9));
        assert!(!model.constraints()[0].is_satisfied(&[1000.1], 1e-9));
    }
}
