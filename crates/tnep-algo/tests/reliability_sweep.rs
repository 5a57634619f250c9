//! Outage sweep state machine, driven by a scripted backend.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tnep_algo::planning::model::DesignModel;
use tnep_algo::{
    Assignment, AttemptStore, DesignError, MilpBackend, MilpSolverKind, Planner, PlannerSettings,
    ReliabilityConfig, SolveError, SolveStatus, SolverConfig, StationVerdict,
};
use tnep_core::{Grid, Kilometers, NodeId};

#[derive(Debug, Clone, Copy)]
enum Step {
    /// Hand the model to the real default solver
    Optimal,
    Infeasible,
    Crash,
    /// Claim success with every variable at zero
    Zeros,
}

/// Replays a fixed script of outcomes, then answers infeasible forever.
struct ScriptedBackend {
    script: Mutex<VecDeque<Step>>,
    calls: Mutex<usize>,
    solver: Arc<dyn MilpBackend>,
}

impl ScriptedBackend {
    fn new(steps: &[Step]) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(steps.iter().copied().collect()),
            calls: Mutex::new(0),
            solver: MilpSolverKind::default().build_backend(),
        })
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl MilpBackend for ScriptedBackend {
    fn id(&self) -> &str {
        "scripted"
    }

    fn solve(&self, model: &DesignModel, config: &SolverConfig) -> Result<Assignment, SolveError> {
        *self.calls.lock().unwrap() += 1;
        let step = self.script.lock().unwrap().pop_front().unwrap_or(Step::Infeasible);
        match step {
            Step::Optimal => self.solver.solve(model, config),
            Step::Infeasible => Err(SolveError::Infeasible),
            Step::Crash => Err(SolveError::Backend("license server unreachable".into())),
            Step::Zeros => Ok(Assignment {
                objective: 0.0,
                values: vec![0.0; model.variables().len()],
            }),
        }
    }
}

fn one_station_grid() -> Grid {
    Grid::from_records(
        &[(0.0, 0.0, 500.0)],
        &[(100.0, 0.0, 100.0), (0.0, 100.0, 100.0)],
    )
    .unwrap()
}

/// Either station alone covers both cities.
fn two_station_grid() -> Grid {
    Grid::from_records(
        &[(0.0, 0.0, 500.0), (50.0, 0.0, 500.0)],
        &[(100.0, 0.0, 100.0), (0.0, 100.0, 100.0)],
    )
    .unwrap()
}

fn planner_with(backend: Arc<ScriptedBackend>, config: ReliabilityConfig) -> Planner {
    let settings = PlannerSettings {
        reliability: config,
        ..Default::default()
    };
    Planner::new(backend, settings).unwrap()
}

#[test]
fn test_passes_on_third_attempt() {
    let backend = ScriptedBackend::new(&[Step::Infeasible, Step::Crash, Step::Optimal]);
    let planner = planner_with(backend.clone(), ReliabilityConfig::default());
    let mut store = AttemptStore::new();

    let report = planner.reliability_sweep(&two_station_grid(), &mut store).unwrap();
    // three calls for station 0, then station 1 exhausts its five
    assert_eq!(backend.calls(), 8);
    match report.stations[0].verdict {
        StationVerdict::Passed {
            attempts,
            max_distance,
            cost,
        } => {
            assert_eq!(attempts, 3);
            assert_eq!(max_distance, Kilometers(1200.0));
            assert!(cost > 0.0);
        }
        ref other => panic!("expected a pass, got {other:?}"),
    }

    let statuses: Vec<(&str, SolveStatus)> =
        store.iter().take(3).map(|r| (r.tag.as_str(), r.status)).collect();
    assert_eq!(
        statuses,
        vec![
            ("station_0_try_1", SolveStatus::Infeasible),
            ("station_0_try_2", SolveStatus::Error),
            ("station_0_try_3", SolveStatus::Optimal),
        ]
    );
}

#[test]
fn test_thresholds_grow_by_step() {
    let backend = ScriptedBackend::new(&[]);
    let planner = planner_with(backend, ReliabilityConfig::default());
    let mut store = AttemptStore::new();
    planner.reliability_sweep(&one_station_grid(), &mut store).unwrap();

    let thresholds: Vec<f64> = store
        .iter()
        .map(|r| r.solution.max_distance.unwrap().value())
        .collect();
    assert_eq!(thresholds, vec![1000.0, 1100.0, 1200.0, 1300.0, 1400.0]);
}

#[test]
fn test_bounded_attempts_then_failed() {
    let backend = ScriptedBackend::new(&[]);
    let config = ReliabilityConfig {
        max_attempts: 3,
        ..Default::default()
    };
    let planner = planner_with(backend.clone(), config);
    let mut store = AttemptStore::new();

    let report = planner.reliability_sweep(&one_station_grid(), &mut store).unwrap();
    assert_eq!(backend.calls(), 3);
    assert_eq!(
        report.stations[0].verdict,
        StationVerdict::Failed {
            attempts: 3,
            last_status: SolveStatus::Infeasible,
        }
    );
    assert!(!report.is_reliable());
    assert!(report.summary().contains("Overall: NOT RELIABLE"));
}

#[test]
fn test_backend_errors_are_contained() {
    let backend = ScriptedBackend::new(&[Step::Crash; 5]);
    let planner = planner_with(backend.clone(), ReliabilityConfig::default());
    let mut store = AttemptStore::new();

    let report = planner.reliability_sweep(&one_station_grid(), &mut store).unwrap();
    assert_eq!(backend.calls(), 5);
    assert_eq!(
        report.stations[0].verdict,
        StationVerdict::Failed {
            attempts: 5,
            last_status: SolveStatus::Error,
        }
    );
    let last = store.get("station_0_try_5").unwrap();
    assert!(last.solution.message.as_deref().unwrap().contains("license server"));
}

#[test]
fn test_every_station_gets_exactly_one_verdict() {
    let grid = Grid::from_records(
        &[(0.0, 0.0, 500.0), (50.0, 0.0, 500.0), (0.0, 50.0, 500.0)],
        &[(100.0, 0.0, 100.0)],
    )
    .unwrap();
    // station 0 passes at once, station 1 never, station 2 on its second try
    let mut script = vec![Step::Optimal];
    script.extend([Step::Infeasible; 5]);
    script.extend([Step::Infeasible, Step::Optimal]);
    let backend = ScriptedBackend::new(&script);
    let planner = planner_with(backend.clone(), ReliabilityConfig::default());
    let mut store = AttemptStore::new();

    let report = planner.reliability_sweep(&grid, &mut store).unwrap();
    let summary: Vec<(NodeId, bool, u32)> = report
        .stations
        .iter()
        .map(|s| (s.station, s.verdict.is_passed(), s.verdict.attempts()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (NodeId::new(0), true, 1),
            (NodeId::new(1), false, 5),
            (NodeId::new(2), true, 2),
        ]
    );
    assert_eq!(backend.calls(), 8);
    assert_eq!(store.len(), 8);
    assert_eq!(report.failed_stations().collect::<Vec<_>>(), vec![NodeId::new(1)]);
}

#[test]
fn test_base_and_sweep_share_one_store() {
    let backend = ScriptedBackend::new(&[Step::Optimal; 3]);
    let planner = planner_with(backend, ReliabilityConfig::default());
    let grid = two_station_grid();
    let mut store = AttemptStore::new();

    let base = planner.solve_base_case(&grid, &mut store).unwrap();
    assert!(base.is_optimal());
    assert_eq!(base.max_distance, None);
    planner.reliability_sweep(&grid, &mut store).unwrap();

    let tags: Vec<&str> = store.tags().collect();
    assert_eq!(tags, vec!["base", "station_0_try_1", "station_1_try_1"]);

    // tags are write-once
    let err = planner.solve_base_case(&grid, &mut store).unwrap_err();
    assert_eq!(err, DesignError::DuplicateTag("base".into()));
}

#[test]
fn test_empty_grid_is_an_input_error() {
    let backend = ScriptedBackend::new(&[]);
    let planner = planner_with(backend.clone(), ReliabilityConfig::default());
    let grid = Grid::new(Vec::new()).unwrap();

    let err = planner.solve_base_case(&grid, &mut AttemptStore::new()).unwrap_err();
    assert_eq!(err, DesignError::EmptyTopology);
    assert_eq!(backend.calls(), 0);
}

#[test]
fn test_invalid_policy_rejected_up_front() {
    let settings = PlannerSettings {
        reliability: ReliabilityConfig {
            max_attempts: 0,
            ..Default::default()
        },
        ..Default::default()
    };
    let result = Planner::new(ScriptedBackend::new(&[]), settings);
    assert!(matches!(result, Err(DesignError::Config(_))));
}

#[test]
fn test_assignment_failing_audit_is_not_accepted() {
    let backend = ScriptedBackend::new(&[Step::Zeros; 6]);
    let config = ReliabilityConfig {
        max_attempts: 3,
        ..Default::default()
    };
    let planner = planner_with(backend, config);
    let grid = two_station_grid();
    let mut store = AttemptStore::new();

    // nothing built, so no city is served or connected
    let base = planner.solve_base_case(&grid, &mut store).unwrap();
    assert_eq!(base.status, SolveStatus::Error);
    assert!(base.decisions.is_empty());
    let message = base.message.as_deref().unwrap();
    assert!(message.contains("[balance]"), "{message}");
    assert!(message.contains("[redundancy]"), "{message}");

    let report = planner.reliability_sweep(&grid, &mut store).unwrap();
    assert!(!report.is_reliable());
    assert_eq!(
        report.stations[0].verdict,
        StationVerdict::Failed {
            attempts: 3,
            last_status: SolveStatus::Error,
        }
    );
}
