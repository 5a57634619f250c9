//! # tnep-io: Node Data and Design Output
//!
//! Loaders turn station and city record files into a [`tnep_core::Grid`];
//! exporters write per-attempt solution files and a JSON record of every
//! attempt.
//!
//! ## Formats
//!
//! | Format | Extension | Layout |
//! |--------|-----------|--------|
//! | Node list | `.txt` (default) | record count on the first line, then `x y power` lines |
//! | Node CSV | `.csv` | header `x,y,power`, one record per row |
//! | Solution | `solution_<tag>.txt` | `from to circuits flow` per built link |
//! | Attempt store | `.json` | array of tagged attempt records |
//! | Design graph | `.dot` | Graphviz drawing of one solved design |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let grid = tnep_io::load_grid(Path::new("power_plant.txt"), Path::new("home.txt"))?;
//!     println!("{} stations, {} cities", grid.stations().count(), grid.cities().count());
//!     Ok(())
//! }
//! ```

pub mod export;
pub mod nodes;
pub mod reference;

pub use export::{
    render_solution_dot, solution_file_name, write_solution_dot, write_solution_text,
    write_store_json, write_store_solutions,
};
pub use nodes::{
    grid_from_records, load_grid, load_node_csv, load_node_list, load_records,
    parse_node_list, write_node_list, NodeRecord,
};
pub use reference::{reference_grid, reference_records, write_reference_dataset};
