//! Single-station outage sweep.
//!
//! For each station in turn the sweep takes a private copy of the grid with
//! that station's capacity set to zero, then retries the design at a growing
//! distance threshold:
//!
//! ```text
//! threshold = initial_max_distance
//! for attempt in 1..=max_attempts:
//!     links    = generate_links(outage_grid, threshold)
//!     solution = solve(outage_grid, links)      tagged station_<id>_try_<attempt>
//!     if optimal: Passed, stop
//!     threshold += distance_step
//! Failed
//! ```
//!
//! Widening the threshold only adds candidate links, so it cannot rescue an
//! outage that leaves too little capacity for total demand. Such stations
//! always use every attempt and fail.

use crate::planner::Planner;
use crate::planning::DesignError;
use crate::solver::SolveStatus;
use crate::store::{attempt_tag, AttemptStore};
use serde::{Deserialize, Serialize};
use tnep_core::{Grid, Kilometers, NodeId};
use tracing::{debug, info, warn};

/// Retry and relaxation policy for the outage sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReliabilityConfig {
    /// Threshold used by the first attempt
    pub initial_max_distance: Kilometers,
    /// Added to the threshold after every failed attempt
    pub distance_step: Kilometers,
    pub max_attempts: u32,
}

impl Default for ReliabilityConfig {
    fn default() -> Self {
        Self {
            initial_max_distance: Kilometers(1000.0),
            distance_step: Kilometers(100.0),
            max_attempts: 5,
        }
    }
}

impl ReliabilityConfig {
    pub fn validate(&self) -> Result<(), DesignError> {
        if self.max_attempts == 0 {
            return Err(DesignError::Config("max_attempts must be at least 1".into()));
        }
        let initial = self.initial_max_distance.value();
        if !initial.is_finite() || initial < 0.0 {
            return Err(DesignError::Config(format!(
                "initial_max_distance must be finite and non-negative, got {}",
                initial
            )));
        }
        let step = self.distance_step.value();
        if !step.is_finite() || step <= 0.0 {
            return Err(DesignError::Config(format!(
                "distance_step must be positive, got {}",
                step
            )));
        }
        Ok(())
    }

    /// Threshold of the `attempt`-th (1-based) try.
    pub fn threshold_for(&self, attempt: u32) -> Kilometers {
        self.initial_max_distance + self.distance_step * f64::from(attempt.saturating_sub(1))
    }
}

/// Terminal state for one station outage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "lowercase")]
pub enum StationVerdict {
    Passed {
        attempts: u32,
        max_distance: Kilometers,
        cost: f64,
    },
    Failed {
        attempts: u32,
        last_status: SolveStatus,
    },
}

impl StationVerdict {
    pub fn is_passed(&self) -> bool {
        matches!(self, StationVerdict::Passed { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            StationVerdict::Passed { attempts, .. } | StationVerdict::Failed { attempts, .. } => {
                *attempts
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StationResult {
    pub station: NodeId,
    pub verdict: StationVerdict,
}

/// Outcome of a full sweep, one entry per station in node order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReliabilityReport {
    pub stations: Vec<StationResult>,
}

impl ReliabilityReport {
    /// Every station outage was survivable.
    ///
    /// A grid without stations has nothing to test and counts as reliable.
    pub fn is_reliable(&self) -> bool {
        self.stations.iter().all(|s| s.verdict.is_passed())
    }

    pub fn failed_stations(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.stations
            .iter()
            .filter(|s| !s.verdict.is_passed())
            .map(|s| s.station)
    }

    pub fn result_for(&self, station: NodeId) -> Option<&StationResult> {
        self.stations.iter().find(|s| s.station == station)
    }

    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Reliability Sweep\n{}\n", "=".repeat(40)));
        for result in &self.stations {
            match &result.verdict {
                StationVerdict::Passed {
                    attempts,
                    max_distance,
                    cost,
                } => s.push_str(&format!(
                    "  station {}: PASSED after {} attempt(s) at {} ({:.3} M)\n",
                    result.station,
                    attempts,
                    max_distance,
                    cost / 1e6
                )),
                StationVerdict::Failed {
                    attempts,
                    last_status,
                } => s.push_str(&format!(
                    "  station {}: FAILED after {} attempt(s) (last: {})\n",
                    result.station, attempts, last_status
                )),
            }
        }
        let verdict = if self.is_reliable() {
            "RELIABLE"
        } else {
            "NOT RELIABLE"
        };
        s.push_str(&format!("Overall: {}\n", verdict));
        s
    }
}

/// Sequential outage sweep driven by a [`Planner`].
pub struct ReliabilitySweep<'a> {
    planner: &'a Planner,
    config: ReliabilityConfig,
}

impl<'a> ReliabilitySweep<'a> {
    pub fn new(planner: &'a Planner, config: ReliabilityConfig) -> Result<Self, DesignError> {
        config.validate()?;
        Ok(Self { planner, config })
    }

    /// Test every station of `grid`, recording each attempt in `store`.
    ///
    /// Only input and bookkeeping problems return `Err`; a station that
    /// never solves is reported as [`StationVerdict::Failed`].
    pub fn run(&self, grid: &Grid, store: &mut AttemptStore) -> Result<ReliabilityReport, DesignError> {
        let mut report = ReliabilityReport::default();
        for station in grid.stations().map(|n| n.id) {
            let verdict = self.run_station(grid, station, store)?;
            report.stations.push(StationResult { station, verdict });
        }
        info!(
            stations = report.stations.len(),
            reliable = report.is_reliable(),
            "reliability sweep finished"
        );
        Ok(report)
    }

    /// Outage test for a single station.
    pub fn run_station(
        &self,
        grid: &Grid,
        station: NodeId,
        store: &mut AttemptStore,
    ) -> Result<StationVerdict, DesignError> {
        let outage = grid.with_station_outage(station)?;
        let mut last_status = SolveStatus::Error;

        for attempt in 1..=self.config.max_attempts {
            let threshold = self.config.threshold_for(attempt);
            let tag = attempt_tag(station, attempt);
            debug!(%station, attempt, threshold = threshold.value(), tag = %tag, "outage attempt");

            let solution = self.planner.solve_attempt(&outage, Some(threshold), &tag)?;
            let status = solution.status;
            let cost = solution.total_cost;
            store.insert(solution)?;

            if status.is_success() {
                info!(%station, attempts = attempt, threshold = threshold.value(), "station passed");
                return Ok(StationVerdict::Passed {
                    attempts: attempt,
                    max_distance: threshold,
                    cost,
                });
            }
            last_status = status;
        }

        warn!(
            %station,
            attempts = self.config.max_attempts,
            last_status = %last_status,
            "station failed"
        );
        Ok(StationVerdict::Failed {
            attempts: self.config.max_attempts,
            last_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let config = ReliabilityConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.threshold_for(1), Kilometers(1000.0));
        assert_eq!(config.threshold_for(2), Kilometers(1100.0));
        assert_eq!(config.threshold_for(5), Kilometers(1400.0));
    }

    #[test]
    fn test_validation() {
        let zero_attempts = ReliabilityConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(matches!(zero_attempts.validate(), Err(DesignError::Config(_))));

        let no_step = ReliabilityConfig {
            distance_step: Kilometers(0.0),
            ..Default::default()
        };
        assert!(no_step.validate().is_err());
    }

    #[test]
    fn test_report_verdict() {
        let mut report = ReliabilityReport::default();
        assert!(report.is_reliable());

        report.stations.push(StationResult {
            station: NodeId::new(0),
            verdict: StationVerdict::Passed {
                attempts: 2,
                max_distance: Kilometers(1100.0),
                cost: 5e6,
            },
        });
        assert!(report.is_reliable());

        report.stations.push(StationResult {
            station: NodeId::new(1),
            verdict: StationVerdict::Failed {
                attempts: 5,
                last_status: SolveStatus::Infeasible,
            },
        });
        assert!(!report.is_reliable());
        assert_eq!(report.failed_stations().collect::<Vec<_>>(), vec![NodeId::new(1)]);
        assert_eq!(report.result_for(NodeId::new(0)).unwrap().verdict.attempts(), 2);

        let summary = report.summary();
        assert!(summary.contains("station 0: PASSED after 2 attempt(s) at 1100.00 km (5.000 M)"));
        assert!(summary.contains("station 1: FAILED after 5 attempt(s) (last: infeasible)"));
        assert!(summary.contains("Overall: NOT RELIABLE"));
    }

    #[test]
    fn test_config_from_toml() {
        let config: ReliabilityConfig =
            toml::from_str("max_attempts = 3\ndistance_step = 50.0").unwrap();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.distance_step, Kilometers(50.0));
        assert_eq!(config.initial_max_distance, Kilometers(1000.0));
    }
}
