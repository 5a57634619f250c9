//! Built-in reference dataset: six stations and fifteen cities on a
//! 1000 × 1000 km field.

use crate::nodes::{grid_from_records, write_node_list, NodeRecord};
use std::path::{Path, PathBuf};
use tnep_core::{Grid, TnepResult};

/// `(x, y, capacity)` for each station.
const STATIONS: [(f64, f64, f64); 6] = [
    (300.0, 100.0, 900.0),
    (600.0, 100.0, 500.0),
    (700.0, 200.0, 1200.0),
    (900.0, 700.0, 450.0),
    (500.0, 500.0, 750.0),
    (400.0, 900.0, 1200.0),
];

/// `(x, y, demand)` for each city.
const CITIES: [(f64, f64, f64); 15] = [
    (150.0, 100.0, 200.0),
    (400.0, 80.0, 300.0),
    (950.0, 70.0, 200.0),
    (30.0, 120.0, 250.0),
    (600.0, 300.0, 300.0),
    (20.0, 450.0, 250.0),
    (300.0, 500.0, 300.0),
    (950.0, 450.0, 300.0),
    (70.0, 800.0, 250.0),
    (350.0, 750.0, 150.0),
    (500.0, 750.0, 250.0),
    (600.0, 800.0, 300.0),
    (600.0, 900.0, 100.0),
    (750.0, 750.0, 250.0),
    (850.0, 950.0, 250.0),
];

/// Station and city records of the reference dataset.
pub fn reference_records() -> (Vec<NodeRecord>, Vec<NodeRecord>) {
    let to_records = |rows: &[(f64, f64, f64)]| {
        rows.iter()
            .map(|&(x, y, p)| NodeRecord::new(x, y, p))
            .collect::<Vec<_>>()
    };
    (to_records(&STATIONS), to_records(&CITIES))
}

pub fn reference_grid() -> TnepResult<Grid> {
    let (stations, cities) = reference_records();
    grid_from_records(&stations, &cities)
}

/// Write `power_plant.txt` and `home.txt` into `dir`, returning both paths.
pub fn write_reference_dataset(dir: &Path) -> TnepResult<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)?;
    let (stations, cities) = reference_records();
    let station_path = dir.join("power_plant.txt");
    let city_path = dir.join("home.txt");
    write_node_list(&station_path, &stations)?;
    write_node_list(&city_path, &cities)?;
    Ok((station_path, city_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::load_grid;

    #[test]
    fn test_reference_totals() {
        let grid = reference_grid().unwrap();
        assert_eq!(grid.stations().count(), 6);
        assert_eq!(grid.cities().count(), 15);
        assert_eq!(grid.total_capacity().value(), 5000.0);
        assert_eq!(grid.total_demand().value(), 3650.0);
    }

    #[test]
    fn test_reference_round_trips_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let (stations, cities) = write_reference_dataset(dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(&stations).unwrap().lines().next(), Some("6"));
        assert_eq!(load_grid(&stations, &cities).unwrap(), reference_grid().unwrap());
    }
}
