//! Station and city record loaders.
//!
//! Both files carry the same `(x, y, power)` triple. For stations `power` is
//! generation capacity, for cities it is demand; both must be non-negative.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tnep_core::{Grid, NodeKind, TnepError, TnepResult};
use tracing::debug;

/// One raw node record as it appears in an input file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub x: f64,
    pub y: f64,
    /// Capacity for stations, demand magnitude for cities (MW)
    pub power: f64,
}

impl NodeRecord {
    pub fn new(x: f64, y: f64, power: f64) -> Self {
        Self { x, y, power }
    }

    fn check(&self, kind: NodeKind, source: &str, line: usize) -> TnepResult<()> {
        if !(self.x.is_finite() && self.y.is_finite() && self.power.is_finite()) {
            return Err(TnepError::Parse(format!(
                "{}:{}: {} record has non-finite values",
                source, line, kind
            )));
        }
        if self.power < 0.0 {
            let what = match kind {
                NodeKind::Station => "capacity",
                NodeKind::City => "demand",
            };
            return Err(TnepError::Validation(format!(
                "{}:{}: {} {} must be non-negative, got {}",
                source, line, kind, what, self.power
            )));
        }
        Ok(())
    }
}

fn parse_field(token: &str, name: &str, source: &str, line: usize) -> TnepResult<f64> {
    token.parse::<f64>().map_err(|_| {
        TnepError::Parse(format!(
            "{}:{}: invalid {} value '{}'",
            source, line, name, token
        ))
    })
}

/// Parse a count-prefixed node list.
///
/// The first non-blank line holds the record count `n`; exactly `n`
/// non-blank `x y power` lines must follow. `source` names the input in
/// error messages.
pub fn parse_node_list(text: &str, kind: NodeKind, source: &str) -> TnepResult<Vec<NodeRecord>> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (count_line, count_text) = lines
        .next()
        .ok_or_else(|| TnepError::Parse(format!("{}: empty file, expected a record count", source)))?;
    let count: usize = count_text.parse().map_err(|_| {
        TnepError::Parse(format!(
            "{}:{}: invalid record count '{}'",
            source, count_line, count_text
        ))
    })?;

    let mut records = Vec::with_capacity(count);
    for (line_no, line) in lines.by_ref().take(count) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 3 {
            return Err(TnepError::Parse(format!(
                "{}:{}: expected 3 fields (x y power), found {}",
                source,
                line_no,
                fields.len()
            )));
        }
        let record = NodeRecord {
            x: parse_field(fields[0], "x", source, line_no)?,
            y: parse_field(fields[1], "y", source, line_no)?,
            power: parse_field(fields[2], "power", source, line_no)?,
        };
        record.check(kind, source, line_no)?;
        records.push(record);
    }

    if records.len() < count {
        return Err(TnepError::Parse(format!(
            "{}: header declares {} records but only {} found",
            source,
            count,
            records.len()
        )));
    }
    if let Some((line_no, _)) = lines.next() {
        return Err(TnepError::Parse(format!(
            "{}:{}: unexpected record after the declared {}",
            source, line_no, count
        )));
    }

    debug!(source, kind = %kind, records = records.len(), "parsed node list");
    Ok(records)
}

/// Load a count-prefixed node list file.
pub fn load_node_list(path: &Path, kind: NodeKind) -> TnepResult<Vec<NodeRecord>> {
    let text = fs::read_to_string(path)?;
    parse_node_list(&text, kind, &path.display().to_string())
}

/// Load a CSV node file with an `x,y,power` header.
pub fn load_node_csv(path: &Path, kind: NodeKind) -> TnepResult<Vec<NodeRecord>> {
    let source = path.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| match e.into_kind() {
            csv::ErrorKind::Io(io) => TnepError::Io(io),
            other => TnepError::Parse(format!("{}: {:?}", source, other)),
        })?;
    let mut records = Vec::new();
    for (idx, row) in reader.deserialize::<NodeRecord>().enumerate() {
        // header is line 1
        let line = idx + 2;
        let record = row.map_err(|e| TnepError::Parse(format!("{}:{}: {}", source, line, e)))?;
        record.check(kind, &source, line)?;
        records.push(record);
    }
    debug!(source = %source, kind = %kind, records = records.len(), "parsed node csv");
    Ok(records)
}

/// Load by extension: `.csv` through the CSV reader, anything else as a node list.
pub fn load_records(path: &Path, kind: NodeKind) -> TnepResult<Vec<NodeRecord>> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        load_node_csv(path, kind)
    } else {
        load_node_list(path, kind)
    }
}

/// Build a grid, assigning ids in load order with stations first.
pub fn grid_from_records(stations: &[NodeRecord], cities: &[NodeRecord]) -> TnepResult<Grid> {
    let triples = |records: &[NodeRecord]| -> Vec<(f64, f64, f64)> {
        records.iter().map(|r| (r.x, r.y, r.power)).collect()
    };
    Grid::from_records(&triples(stations), &triples(cities))
}

/// Load station and city files into a grid.
pub fn load_grid(stations: &Path, cities: &Path) -> TnepResult<Grid> {
    let station_records = load_records(stations, NodeKind::Station)?;
    let city_records = load_records(cities, NodeKind::City)?;
    grid_from_records(&station_records, &city_records)
}

/// Write records in the count-prefixed node list format.
pub fn write_node_list(path: &Path, records: &[NodeRecord]) -> TnepResult<()> {
    let mut out = fs::File::create(path)?;
    writeln!(out, "{}", records.len())?;
    for r in records {
        writeln!(out, "{} {} {}", r.x, r.y, r.power)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_count_prefixed() {
        let text = "3\n300 100 900\n600 100 500\n\n700 200 1200\n";
        let records = parse_node_list(text, NodeKind::Station, "stations").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2], NodeRecord::new(700.0, 200.0, 1200.0));
    }

    #[test]
    fn test_short_file_is_parse_error() {
        let err = parse_node_list("2\n1 2 3\n", NodeKind::City, "home.txt").unwrap_err();
        assert!(matches!(err, TnepError::Parse(_)));
        assert!(err.to_string().contains("declares 2 records but only 1"));
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let err = parse_node_list("2\n1 2 3\n1 two 3\n", NodeKind::City, "home.txt").unwrap_err();
        assert!(err.to_string().contains("home.txt:3: invalid y value 'two'"));

        let err = parse_node_list("1\n1 2\n", NodeKind::City, "home.txt").unwrap_err();
        assert!(err.to_string().contains("home.txt:2: expected 3 fields"));

        let err = parse_node_list("x\n", NodeKind::City, "home.txt").unwrap_err();
        assert!(err.to_string().contains("invalid record count"));
    }

    #[test]
    fn test_rejects_trailing_and_non_finite_records() {
        let err = parse_node_list("1\n1 2 3\n4 5 6\n", NodeKind::City, "f").unwrap_err();
        assert!(err.to_string().contains("f:3: unexpected record"));

        let err = parse_node_list("1\n1 NaN 3\n", NodeKind::City, "f").unwrap_err();
        assert!(matches!(err, TnepError::Parse(_)));
    }

    #[test]
    fn test_negative_power_is_validation_error() {
        let err = parse_node_list("1\n0 0 -5\n", NodeKind::Station, "f").unwrap_err();
        assert!(matches!(err, TnepError::Validation(_)));
        assert!(err.is_input_error());
        assert!(err.to_string().contains("station capacity must be non-negative"));
    }

    #[test]
    fn test_csv_loader() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("home.csv");
        fs::write(&path, "x,y,power\n150, 100, 200\n400,80,300\n").unwrap();

        let records = load_records(&path, NodeKind::City).unwrap();
        assert_eq!(records, vec![
            NodeRecord::new(150.0, 100.0, 200.0),
            NodeRecord::new(400.0, 80.0, 300.0),
        ]);

        fs::write(&path, "x,y,power\n1,2,abc\n").unwrap();
        let err = load_node_csv(&path, NodeKind::City).unwrap_err();
        assert!(matches!(err, TnepError::Parse(_)));
        assert!(err.to_string().contains(":2:"));
    }

    #[test]
    fn test_load_grid_assigns_stations_first() {
        let dir = TempDir::new().unwrap();
        let stations = dir.path().join("power_plant.txt");
        let cities = dir.path().join("home.txt");
        write_node_list(&stations, &[NodeRecord::new(0.0, 0.0, 100.0)]).unwrap();
        write_node_list(
            &cities,
            &[NodeRecord::new(5.0, 0.0, 60.0), NodeRecord::new(0.0, 5.0, 40.0)],
        )
        .unwrap();

        let grid = load_grid(&stations, &cities).unwrap();
        assert_eq!(grid.len(), 3);
        assert!(grid.nodes()[0].is_station());
        assert!(grid.nodes()[1].is_city());
        assert_eq!(grid.total_demand().value(), 100.0);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_node_list(Path::new("/nonexistent/power_plant.txt"), NodeKind::Station)
            .unwrap_err();
        assert!(matches!(err, TnepError::Io(_)));
    }
}
