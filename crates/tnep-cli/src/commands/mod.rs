pub mod inspect;
pub mod reliability;
pub mod report;
pub mod sample;
pub mod solve;

use anyhow::{Context, Result};
use tnep_algo::{Planner, PlannerSettings};
use tnep_cli::{InputArgs, PlannerConfig};
use tnep_core::Grid;
use tracing::info;

/// Load the grid named by `input`, or the reference dataset.
pub fn load_input(input: &InputArgs) -> Result<Grid> {
    match (&input.stations, &input.cities) {
        (Some(stations), Some(cities)) => {
            info!(stations = %stations.display(), cities = %cities.display(), "loading grid");
            tnep_io::load_grid(stations, cities).context("loading node data")
        }
        _ => {
            info!("no input files given, using the reference dataset");
            tnep_io::reference_grid().context("building reference dataset")
        }
    }
}

pub fn build_planner(config: &PlannerConfig, settings: PlannerSettings) -> Result<Planner> {
    let kind = config.solver_kind()?;
    let planner = Planner::with_solver(kind, settings).context("invalid planner settings")?;
    info!(engine = planner.backend_id(), "planner ready");
    Ok(planner)
}
