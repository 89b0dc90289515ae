use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::config::{Fallback, LoaderConfig, SourcePreference};
use crate::error::{LoadError, Result};

use super::cache::{DatasetCache, SourceKey};
use super::derive::derive_fields;
use super::model::{Company, CompanyCollection, CompanyColumn, Dataset, Round, RoundCollection};
use super::sample::{self, SampleTable};
use super::table::{RawTable, TableFormat};

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

/// A user-supplied file: its original name (for the format) and its bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Upload {
            name: name.into(),
            bytes,
        }
    }

    /// Read a picked file into memory. Nothing is written back.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| LoadError::io(path, e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Upload { name, bytes })
    }

    pub fn table(&self) -> Result<RawTable> {
        RawTable::parse(TableFormat::from_name(&self.name)?, &self.bytes)
    }
}

/// The two upload slots. Only a complete pair replaces the disk sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Uploads {
    pub companies: Option<Upload>,
    pub rounds: Option<Upload>,
}

impl Uploads {
    pub fn pair(&self) -> Option<(&Upload, &Upload)> {
        Some((self.companies.as_ref()?, self.rounds.as_ref()?))
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_none() && self.rounds.is_none()
    }
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Resolves the companies and rounds sources and memoizes what it parsed.
#[derive(Debug)]
pub struct Loader {
    config: LoaderConfig,
    cache: DatasetCache,
}

impl Loader {
    pub fn new(config: LoaderConfig) -> Self {
        Loader {
            config,
            cache: DatasetCache::default(),
        }
    }

    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    /// Load from a complete upload pair when the config prefers uploads,
    /// otherwise from disk.
    pub fn load(&mut self, uploads: &Uploads) -> Result<Arc<Dataset>> {
        if self.config.preferred == SourcePreference::Upload {
            match uploads.pair() {
                Some((companies, rounds)) => return self.load_uploads(companies, rounds),
                None if !uploads.is_empty() => {
                    log::warn!("Only one of the two files was uploaded; using data on disk");
                }
                None => {}
            }
        }
        self.load_disk()
    }

    /// Load the two configured files, materializing missing ones from the
    /// embedded sample when the fallback allows it.
    pub fn load_disk(&mut self) -> Result<Arc<Dataset>> {
        let companies_path = self.config.companies_path();
        let rounds_path = self.config.rounds_path();
        self.ensure_present(&companies_path, SampleTable::Companies)?;
        self.ensure_present(&rounds_path, SampleTable::Rounds)?;

        let key = SourceKey::disk(&companies_path, &rounds_path)?;
        if let Some(hit) = self.cache.get(&key) {
            log::debug!(
                "Dataset cache hit for {} ({} hits so far)",
                self.config.data_dir.display(),
                self.cache.hits()
            );
            return Ok(hit);
        }

        let dataset = parse_dataset(
            &RawTable::read_path(&companies_path)?,
            &RawTable::read_path(&rounds_path)?,
        )?;
        log::info!(
            "Loaded {} companies and {} rounds from {}",
            dataset.companies.len(),
            dataset.rounds.len(),
            self.config.data_dir.display()
        );
        // The paths are fixed, so any other disk entry is an older version.
        self.cache.evict_disk();
        Ok(self.cache.insert(key, dataset))
    }

    /// Parse an upload pair. A pair not seen before replaces everything
    /// cached so far.
    pub fn load_uploads(&mut self, companies: &Upload, rounds: &Upload) -> Result<Arc<Dataset>> {
        let key = SourceKey::upload(companies, rounds);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let dataset = parse_dataset(&companies.table()?, &rounds.table()?)?;
        log::info!(
            "Loaded {} companies from '{}' and {} rounds from '{}'",
            dataset.companies.len(),
            companies.name,
            dataset.rounds.len(),
            rounds.name
        );
        self.cache.clear();
        Ok(self.cache.insert(key, dataset))
    }

    /// Drop every cached dataset.
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    fn ensure_present(&self, path: &Path, table: SampleTable) -> Result<()> {
        if path.exists() {
            return Ok(());
        }
        match self.config.fallback {
            Fallback::Sample => sample::materialize(table, path),
            Fallback::Fail => Err(LoadError::MissingFile(path.to_path_buf())),
        }
    }
}

// ---------------------------------------------------------------------------
// Typed parsing
// ---------------------------------------------------------------------------

/// Type both raw tables and derive the millions columns.
pub fn parse_dataset(companies: &RawTable, rounds: &RawTable) -> Result<Dataset> {
    Ok(Dataset {
        companies: parse_companies(companies)?,
        rounds: parse_rounds(rounds)?,
    })
}

/// Build the company collection. Only `name` is required; every other
/// column may be absent, and numeric cells that do not parse become missing.
pub fn parse_companies(table: &RawTable) -> Result<CompanyCollection> {
    let name_idx = table
        .column_index(CompanyColumn::Name.name())
        .ok_or(LoadError::MissingColumn {
            table: "companies",
            column: "name",
        })?;

    let present: Vec<(CompanyColumn, usize)> = CompanyColumn::SOURCE
        .into_iter()
        .filter_map(|col| table.column_index(col.name()).map(|idx| (col, idx)))
        .collect();

    let mut companies = Vec::with_capacity(table.len());
    let mut seen = HashSet::new();
    let mut misses = 0usize;

    for row in 0..table.len() {
        let name = table
            .cell(row, name_idx)
            .ok_or_else(|| LoadError::InvalidValue {
                table: "companies",
                row,
                column: "name",
                message: "company name is required".to_string(),
            })?;
        if !seen.insert(name) {
            log::warn!("Duplicate company name '{name}' at row {row}");
        }

        let mut company = Company {
            name: name.to_string(),
            ..Company::default()
        };
        for &(column, idx) in &present {
            let cell = table.cell(row, idx);
            match column {
                CompanyColumn::Name => {}
                CompanyColumn::Country => company.country = cell.map(str::to_string),
                CompanyColumn::Industry => company.industry = cell.map(str::to_string),
                CompanyColumn::Stage => company.stage = cell.map(str::to_string),
                CompanyColumn::RevenueModel => company.revenue_model = cell.map(str::to_string),
                numeric => {
                    if let Some(slot) = company.number_mut(numeric) {
                        *slot = coerce_cell(cell, &mut misses);
                    }
                }
            }
        }
        companies.push(company);
    }

    if misses > 0 {
        log::warn!("{misses} numeric company cells could not be parsed and were treated as missing");
    }

    let mut columns: BTreeSet<CompanyColumn> = present.iter().map(|&(col, _)| col).collect();
    if columns.contains(&CompanyColumn::FundingTotalUsd) {
        columns.insert(CompanyColumn::FundingTotalUsdM);
    }
    if columns.contains(&CompanyColumn::ArrUsd) {
        columns.insert(CompanyColumn::ArrUsdM);
    }

    Ok(CompanyCollection::new(derive_fields(&companies), columns))
}

/// Build the round collection. `name` and `round_date` are required and a
/// date that does not parse fails the whole load.
pub fn parse_rounds(table: &RawTable) -> Result<RoundCollection> {
    let required = |column: &'static str| {
        table.column_index(column).ok_or(LoadError::MissingColumn {
            table: "rounds",
            column,
        })
    };
    let name_idx = required("name")?;
    let date_idx = required("round_date")?;
    let type_idx = table.column_index("round_type");
    let amount_idx = table.column_index("round_amount_usd");

    let mut rounds = Vec::with_capacity(table.len());
    let mut misses = 0usize;

    for row in 0..table.len() {
        let name = table
            .cell(row, name_idx)
            .ok_or_else(|| LoadError::InvalidValue {
                table: "rounds",
                row,
                column: "name",
                message: "company name is required".to_string(),
            })?;
        let raw_date = table.cell(row, date_idx).unwrap_or("");
        let round_date = parse_date(raw_date).ok_or_else(|| LoadError::InvalidDate {
            table: "rounds",
            row,
            value: raw_date.to_string(),
        })?;

        rounds.push(Round {
            name: name.to_string(),
            round_date,
            round_type: type_idx.and_then(|idx| table.cell(row, idx)).map(str::to_string),
            round_amount_usd: coerce_cell(amount_idx.and_then(|idx| table.cell(row, idx)), &mut misses),
        });
    }

    if misses > 0 {
        log::warn!("{misses} round amounts could not be parsed and were treated as missing");
    }
    Ok(RoundCollection { rounds })
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

const NA_TOKENS: [&str; 7] = ["na", "n/a", "nan", "null", "none", "nil", "-"];

/// Lenient number parse: anything that is not a finite number is missing.
pub fn coerce_number(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Like [`coerce_number`], counting cells that held text but no number.
/// Blank cells and NA markers are missing without counting.
fn coerce_cell(cell: Option<&str>, misses: &mut usize) -> Option<f64> {
    let text = cell?;
    let value = coerce_number(text);
    if value.is_none() && !NA_TOKENS.contains(&text.to_ascii_lowercase().as_str()) {
        *misses += 1;
    }
    value
}

const DATE_FORMATS: [&str; 8] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an ISO or common locale date. Date-times keep only the date.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
}
