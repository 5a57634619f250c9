//! Non-fatal findings about input data and designs.
//!
//! A [`Grid`] that passed construction is structurally valid, but it can
//! still describe a network that no design will satisfy (not enough
//! generation, nodes stacked on top of each other). [`diagnose_grid`]
//! collects those findings so the CLI can surface them before solving.
//! Design audits reuse the same collection for their violations.
//!
//! ```
//! use tnep_core::diagnostics::{Diagnostics, Severity};
//!
//! let mut diag = Diagnostics::new();
//! diag.warn("balance", "total capacity below total demand");
//! diag.error_on("city 3", "redundancy", "1 connection, at least 2 required");
//!
//! assert_eq!(diag.count(Severity::Warning), 1);
//! assert!(diag.has_errors());
//! ```

use crate::Grid;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    /// Grouping key, e.g. "balance", "topology", "redundancy"
    pub category: String,
    pub message: String,
    /// Node or link the finding is about, e.g. "city 14"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl DiagnosticIssue {
    pub fn new(severity: Severity, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            entity: None,
        }
    }

    pub fn on(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] ", self.severity.as_str(), self.category)?;
        if let Some(entity) = &self.entity {
            write!(f, "{}: ", entity)?;
        }
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: DiagnosticIssue) {
        self.issues.push(issue);
    }

    pub fn warn(&mut self, category: impl Into<String>, message: impl Into<String>) {
        self.push(DiagnosticIssue::new(Severity::Warning, category, message));
    }

    pub fn warn_on(
        &mut self,
        entity: impl Into<String>,
        category: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.push(DiagnosticIssue::new(Severity::Warning, category, message).on(entity));
    }

    pub fn error(&mut self, category: impl Into<String>, message: impl Into<String>) {
        self.push(DiagnosticIssue::new(Severity::Error, category, message));
    }

    pub fn error_on(
        &mut self,
        entity: impl Into<String>,
        category: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.push(DiagnosticIssue::new(Severity::Error, category, message).on(entity));
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a DiagnosticIssue> {
        self.issues.iter().filter(move |i| i.category == category)
    }

    /// One-line tally, e.g. "2 warnings, 1 error".
    pub fn summary(&self) -> String {
        fn tally(n: usize, noun: &str) -> String {
            if n == 1 {
                format!("1 {noun}")
            } else {
                format!("{n} {noun}s")
            }
        }
        let (warnings, errors) = (self.count(Severity::Warning), self.count(Severity::Error));
        match (warnings, errors) {
            (0, 0) => "clean".to_string(),
            (w, 0) => tally(w, "warning"),
            (0, e) => tally(e, "error"),
            (w, e) => format!("{}, {}", tally(w, "warning"), tally(e, "error")),
        }
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Diagnostics: {}", self.summary())?;
        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }
        Ok(())
    }
}

/// Sanity checks that do not invalidate a grid but predict infeasibility.
pub fn diagnose_grid(grid: &Grid) -> Diagnostics {
    let mut diag = Diagnostics::new();

    let stations = grid.stations().count();
    let cities = grid.cities().count();
    if stations == 0 {
        diag.warn("structure", "grid has no stations");
    }
    if cities == 0 {
        diag.warn("structure", "grid has no cities");
    }
    // Redundancy needs at least two distinct neighbours to be met with single lines
    if grid.len() < 3 && cities > 0 {
        diag.warn(
            "topology",
            "fewer than three nodes: cities can only reach the redundancy minimum with parallel lines",
        );
    }

    let capacity = grid.total_capacity();
    let demand = grid.total_demand();
    if capacity.value() < demand.value() {
        diag.warn(
            "balance",
            format!("total capacity {} is below total demand {}", capacity, demand),
        );
    }

    for city in grid.cities() {
        if city.demand().value() == 0.0 {
            diag.warn_on(city.label(), "balance", "zero demand");
        }
    }

    let nodes = grid.nodes();
    for (i, a) in nodes.iter().enumerate() {
        for b in &nodes[i + 1..] {
            if a.position == b.position {
                diag.warn_on(
                    a.label(),
                    "topology",
                    format!("same position as {}", b.label()),
                );
            }
        }
    }

    diag
}
