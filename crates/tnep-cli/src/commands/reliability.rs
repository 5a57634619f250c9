use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tnep_algo::{AttemptStore, DesignSolution, ReliabilityReport};
use tnep_cli::{InputArgs, OutputFormat, PlannerConfig};
use tnep_core::Kilometers;
use tracing::info;

use super::{build_planner, load_input, report};

/// Policy overrides from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepOverrides {
    pub initial_distance: Option<f64>,
    pub distance_step: Option<f64>,
    pub max_attempts: Option<u32>,
}

#[derive(Serialize)]
struct SweepOutput<'a> {
    base: &'a DesignSolution,
    reliability: &'a ReliabilityReport,
    reliable: bool,
}

pub fn handle(
    config: &PlannerConfig,
    input: &InputArgs,
    overrides: SweepOverrides,
    out: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let grid = load_input(input)?;
    let mut settings = config.planner.clone();
    if let Some(d) = overrides.initial_distance {
        settings.reliability.initial_max_distance = Kilometers(d);
    }
    if let Some(step) = overrides.distance_step {
        settings.reliability.distance_step = Kilometers(step);
    }
    if let Some(n) = overrides.max_attempts {
        settings.reliability.max_attempts = n;
    }
    let planner = build_planner(config, settings)?;

    let mut store = AttemptStore::new();
    let base = planner.solve_base_case(&grid, &mut store)?;
    let sweep = planner.reliability_sweep(&grid, &mut store)?;

    match format {
        OutputFormat::Table => {
            report::print_solution(&base)?;
            println!();
            report::print_reliability(&sweep)?;
        }
        OutputFormat::Json => {
            let output = SweepOutput {
                base: &base,
                reliability: &sweep,
                reliable: sweep.is_reliable(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    if let Some(dir) = out {
        let written = tnep_io::write_store_solutions(dir, &store)
            .with_context(|| format!("writing solutions to {}", dir.display()))?;
        tnep_io::write_store_json(&dir.join("attempts.json"), &store)?;
        info!(
            dir = %dir.display(),
            files = written.len(),
            attempts = store.len(),
            "wrote attempt files"
        );
    }
    Ok(())
}
