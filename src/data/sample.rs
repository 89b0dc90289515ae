//! Built-in sample data, written to disk when a data file is missing so the
//! dashboard always has something to show.

use std::path::Path;

use crate::error::{LoadError, Result};

use super::table::{RawTable, TableFormat};

const COMPANIES_CSV: &str = include_str!("../../assets/sample/startups_clean.csv");
const ROUNDS_CSV: &str = include_str!("../../assets/sample/rounds.csv");

/// Which of the two embedded sample tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleTable {
    /// Five LATAM company profiles.
    Companies,
    /// Twelve funding rounds for those companies.
    Rounds,
}

impl SampleTable {
    pub fn csv(self) -> &'static str {
        match self {
            SampleTable::Companies => COMPANIES_CSV,
            SampleTable::Rounds => ROUNDS_CSV,
        }
    }

    pub fn raw(self) -> Result<RawTable> {
        RawTable::parse(TableFormat::Csv, self.csv().as_bytes())
    }
}

/// Write the sample table to `path`, creating parent directories. The format
/// follows the extension of `path`.
pub fn materialize(table: SampleTable, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| LoadError::io(parent, e))?;
    }

    match TableFormat::from_path(path)? {
        TableFormat::Csv => std::fs::write(path, table.csv()).map_err(|e| LoadError::io(path, e))?,
        _ => table.raw()?.write_path(path)?,
    }
    log::info!("Materialized sample {table:?} data at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_tables_parse() {
        let companies = SampleTable::Companies.raw().unwrap();
        let rounds = SampleTable::Rounds.raw().unwrap();
        assert_eq!(companies.len(), 5);
        assert_eq!(companies.headers.len(), 15);
        assert_eq!(rounds.len(), 12);
    }

    #[test]
    fn materialize_json_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("rounds.json");
        materialize(SampleTable::Rounds, &path).unwrap();
        let table = RawTable::read_path(&path).unwrap();
        assert_eq!(table.len(), 12);
    }
}
