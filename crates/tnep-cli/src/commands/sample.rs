use anyhow::{Context, Result};
use std::path::Path;

pub fn handle(out: &Path) -> Result<()> {
    let (stations, cities) = tnep_io::write_reference_dataset(out)
        .with_context(|| format!("writing reference dataset to {}", out.display()))?;
    println!("Wrote {}", stations.display());
    println!("Wrote {}", cities.display());
    Ok(())
}
