//! Write the built-in sample tables to a directory in every supported format.
//!
//! Usage: `generate_sample [OUT_DIR]` (default `sample_data`).

use std::path::PathBuf;

use anyhow::Context;
use startup_benchmark::data::loader::{parse_companies, parse_rounds};
use startup_benchmark::data::sample::{materialize, SampleTable};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data"));

    // Check the embedded tables type-check before writing anything.
    let companies = parse_companies(&SampleTable::Companies.raw()?)
        .context("parsing embedded company sample")?;
    let rounds = parse_rounds(&SampleTable::Rounds.raw()?)
        .context("parsing embedded rounds sample")?;

    for ext in ["csv", "json", "parquet"] {
        for (table, stem) in [
            (SampleTable::Companies, "startups_clean"),
            (SampleTable::Rounds, "rounds"),
        ] {
            let path = out_dir.join(format!("{stem}.{ext}"));
            materialize(table, &path).with_context(|| format!("writing {}", path.display()))?;
        }
    }

    println!(
        "Wrote {} companies and {} rounds to {} (csv, json, parquet)",
        companies.len(),
        rounds.len(),
        out_dir.display()
    );
    Ok(())
}
