use anyhow::Result;
use std::io::Write;
use tabwriter::TabWriter;
use tnep_algo::{DesignSolution, ReliabilityReport, StationVerdict};

/// Cost line and active link table for one design.
pub fn print_solution(solution: &DesignSolution) -> Result<()> {
    println!("Design '{}': {}", solution.tag, solution.status);
    if !solution.is_optimal() {
        println!("No optimal solution found");
        if let Some(msg) = &solution.message {
            println!("  {msg}");
        }
        return Ok(());
    }
    println!("Minimum cost: {:.3} M", solution.cost_millions());
    println!(
        "Active links: {} ({} lines)",
        solution.lines_built(),
        solution.total_circuits()
    );

    let mut writer = TabWriter::new(Vec::new()).padding(2);
    writeln!(writer, "From\tTo\tLines\tFlow (MW)\tLength (km)")?;
    for d in &solution.decisions {
        writeln!(
            writer,
            "{}\t{}\t{}\t{:.1}\t{:.1}",
            d.from,
            d.to,
            d.circuits,
            d.flow.value(),
            d.distance.value()
        )?;
    }
    writer.flush()?;
    let table = String::from_utf8(writer.into_inner()?)?;
    print!("{table}");
    Ok(())
}

/// Per-station verdict table and overall verdict.
pub fn print_reliability(report: &ReliabilityReport) -> Result<()> {
    let mut writer = TabWriter::new(Vec::new()).padding(2);
    writeln!(writer, "Station\tVerdict\tAttempts\tThreshold (km)\tCost (M)")?;
    for result in &report.stations {
        match &result.verdict {
            StationVerdict::Passed {
                attempts,
                max_distance,
                cost,
            } => writeln!(
                writer,
                "{}\tpassed\t{}\t{:.0}\t{:.3}",
                result.station,
                attempts,
                max_distance.value(),
                cost / 1e6
            )?,
            StationVerdict::Failed {
                attempts,
                last_status,
            } => writeln!(
                writer,
                "{}\tfailed ({})\t{}\t-\t-",
                result.station, last_status, attempts
            )?,
        }
    }
    writer.flush()?;
    let table = String::from_utf8(writer.into_inner()?)?;
    print!("{table}");

    if report.is_reliable() {
        println!("Network is reliable: every single-station outage can be served");
    } else {
        let failed: Vec<String> = report.failed_stations().map(|s| s.to_string()).collect();
        println!(
            "Network is NOT reliable: outage of station(s) {} cannot be served",
            failed.join(", ")
        );
    }
    Ok(())
}
