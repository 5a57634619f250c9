use anyhow::{Context, Result};
use std::path::Path;
use tnep_cli::{InputArgs, PlannerConfig};
use tnep_core::{diagnose_grid, export_graph, generate_links, graph_stats, Kilometers};

use super::load_input;

pub fn handle(
    config: &PlannerConfig,
    input: &InputArgs,
    max_distance: Option<f64>,
    dot: Option<&Path>,
) -> Result<()> {
    let grid = load_input(input)?;
    let threshold = max_distance
        .map(Kilometers)
        .or(config.planner.base_max_distance);
    let links = generate_links(&grid, threshold, &config.planner.lines);

    println!(
        "Nodes: {} stations, {} cities",
        grid.stations().count(),
        grid.cities().count()
    );
    println!(
        "Supply {} / demand {}",
        grid.total_capacity(),
        grid.total_demand()
    );

    let stats = graph_stats(&grid, &links);
    match threshold {
        Some(d) => println!("Candidate links within {}: {}", d, stats.edge_count),
        None => println!("Candidate links (complete graph): {}", stats.edge_count),
    }
    println!("  Components    : {}", stats.connected_components);
    println!(
        "  Degree [min/avg/max]: {}/{:.2}/{}",
        stats.min_degree, stats.avg_degree, stats.max_degree
    );
    println!("  Density       : {:.4}", stats.density);

    print!("{}", diagnose_grid(&grid));

    if let Some(path) = dot {
        let rendered = export_graph(&grid, &links, "dot")?;
        std::fs::write(path, rendered)
            .with_context(|| format!("writing DOT graph to {}", path.display()))?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}
