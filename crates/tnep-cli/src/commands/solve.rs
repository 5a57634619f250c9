use anyhow::{Context, Result};
use std::path::Path;
use tnep_algo::AttemptStore;
use tnep_cli::{InputArgs, OutputFormat, PlannerConfig};
use tnep_core::Kilometers;
use tracing::{info, warn};

use super::{build_planner, load_input, report};

pub fn handle(
    config: &PlannerConfig,
    input: &InputArgs,
    max_distance: Option<f64>,
    out: Option<&Path>,
    dot: Option<&Path>,
    strict: bool,
    format: OutputFormat,
) -> Result<()> {
    let grid = load_input(input)?;
    let mut settings = config.planner.clone();
    if let Some(d) = max_distance {
        settings.base_max_distance = Some(Kilometers(d));
    }
    let planner = build_planner(config, settings)?;

    let mut store = AttemptStore::new();
    let solution = planner.solve_base_case(&grid, &mut store)?;

    match format {
        OutputFormat::Table => report::print_solution(&solution)?,
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&solution)?),
    }

    if let Some(dir) = out {
        let written = tnep_io::write_store_solutions(dir, &store)
            .with_context(|| format!("writing solutions to {}", dir.display()))?;
        tnep_io::write_store_json(&dir.join("attempts.json"), &store)?;
        info!(dir = %dir.display(), files = written.len(), "wrote solution files");
    }

    if let Some(path) = dot {
        if solution.is_optimal() {
            tnep_io::write_solution_dot(path, &grid, &solution)
                .with_context(|| format!("writing design graph to {}", path.display()))?;
            info!(path = %path.display(), "wrote design graph");
        } else {
            warn!(status = %solution.status, "no design to draw");
        }
    }

    if strict {
        solution
            .require_optimal()
            .context("base design has no optimal solution")?;
    }
    Ok(())
}
