//! Per-attempt output files.

use std::collections::HashSet;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tnep_algo::{AttemptStore, DesignSolution};
use tnep_core::{Grid, NodeId, TnepResult};
use tracing::debug;

/// Flow (MW) above which a line is drawn as heavily loaded.
const HEAVY_FLOW: f64 = 800.0;
/// Flow (MW) per unit of pen width, clamped to `0.5..=5.0`.
const FLOW_PER_PEN: f64 = 150.0;

/// `solution_<tag>.txt`
pub fn solution_file_name(tag: &str) -> String {
    format!("solution_{}.txt", tag)
}

/// Write one `from to circuits flow` line per built link into
/// `dir/solution_<tag>.txt`.
pub fn write_solution_text(dir: &Path, solution: &DesignSolution) -> TnepResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(solution_file_name(&solution.tag));
    let mut out = BufWriter::new(fs::File::create(&path)?);
    for d in &solution.decisions {
        writeln!(out, "{} {} {} {:.3}", d.from, d.to, d.circuits, d.flow.value())?;
    }
    out.flush()?;
    debug!(path = %path.display(), links = solution.decisions.len(), "wrote solution");
    Ok(path)
}

/// Write a solution file for every optimal attempt in `store`.
pub fn write_store_solutions(dir: &Path, store: &AttemptStore) -> TnepResult<Vec<PathBuf>> {
    store
        .iter()
        .filter(|record| record.status.is_success())
        .map(|record| write_solution_text(dir, &record.solution))
        .collect()
}

/// Dump every attempt, optimal or not, as pretty JSON.
pub fn write_store_json(path: &Path, store: &AttemptStore) -> TnepResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, store.to_json()?)?;
    Ok(())
}

/// Render a solved design as Graphviz DOT.
///
/// Built links are labelled with their circuit count and flow, and their
/// pen width grows with the flow. Stations that no built link touches are
/// drawn dashed and grey. Node positions are pinned to the input
/// coordinates, so `neato -n` reproduces the map.
pub fn render_solution_dot(grid: &Grid, solution: &DesignSolution) -> String {
    let used: HashSet<NodeId> = solution
        .decisions
        .iter()
        .flat_map(|d| [d.from, d.to])
        .collect();

    let mut dot = String::from("graph tnep_design {\n");
    dot.push_str(&format!(
        "  label=\"{}: {:.3} M\";\n",
        solution.tag,
        solution.cost_millions()
    ));
    for node in grid.nodes() {
        let style = if node.is_city() {
            "shape=ellipse, style=filled, fillcolor=lightblue"
        } else if used.contains(&node.id) {
            "shape=box, style=filled, fillcolor=red"
        } else {
            "shape=box, style=\"filled,dashed\", fillcolor=lightgray, color=gray"
        };
        dot.push_str(&format!(
            "  n{} [label=\"{}\\n({:.0})\", {}, pos=\"{},{}!\"];\n",
            node.id,
            node.id,
            node.power.value(),
            style,
            node.position.x,
            node.position.y
        ));
    }
    for d in &solution.decisions {
        let flow = d.flow.value();
        let style = if flow.abs() < 1e-9 {
            "color=gray, style=dashed, penwidth=1.2".to_string()
        } else {
            let color = if flow.abs() > HEAVY_FLOW { "red" } else { "black" };
            let pen = (flow.abs() / FLOW_PER_PEN).clamp(0.5, 5.0);
            format!("color={color}, penwidth={pen:.2}")
        };
        dot.push_str(&format!(
            "  n{} -- n{} [label=\"lines: {}\\n{:.0} MW\", {}];\n",
            d.from, d.to, d.circuits, flow, style
        ));
    }
    dot.push_str("}\n");
    dot
}

/// Write [`render_solution_dot`] output to `path`.
pub fn write_solution_dot(path: &Path, grid: &Grid, solution: &DesignSolution) -> TnepResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_solution_dot(grid, solution))?;
    debug!(path = %path.display(), tag = %solution.tag, "wrote design graph");
    Ok(())
}
