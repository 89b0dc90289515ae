use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use serde_json::{Map, Value as JsonValue};

use crate::error::{LoadError, Result};

// ---------------------------------------------------------------------------
// TableFormat – dispatch by extension
// ---------------------------------------------------------------------------

/// On-disk encodings of a flat table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Header row, comma separated.
    Csv,
    /// Records-oriented array: `[{ "name": "PayFlex", ... }, ...]`.
    Json,
    /// Parquet file with one column per field.
    Parquet,
}

impl TableFormat {
    /// Guess the format from a file name or path.
    pub fn from_name(name: &str) -> Result<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Ok(TableFormat::Csv),
            "json" => Ok(TableFormat::Json),
            "parquet" | "pq" => Ok(TableFormat::Parquet),
            other => Err(LoadError::UnsupportedFormat(format!(".{other} ({name})"))),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_name(&path.to_string_lossy())
    }
}

// ---------------------------------------------------------------------------
// RawTable – untyped cells, typed later by the loader
// ---------------------------------------------------------------------------

/// A header row and rows of optional text cells. Empty cells are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// The cell at (`row`, `col`), if present and non-empty.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Read a table file, dispatching on its extension.
    pub fn read_path(path: &Path) -> Result<Self> {
        match TableFormat::from_path(path)? {
            TableFormat::Parquet => read_parquet(path),
            format => {
                let bytes = std::fs::read(path).map_err(|e| LoadError::io(path, e))?;
                Self::parse(format, &bytes)
            }
        }
    }

    /// Parse an in-memory payload. Parquet needs a seekable file, so only
    /// CSV and JSON are accepted here.
    pub fn parse(format: TableFormat, bytes: &[u8]) -> Result<Self> {
        match format {
            TableFormat::Csv => parse_csv(bytes),
            TableFormat::Json => parse_json(bytes),
            TableFormat::Parquet => Err(LoadError::UnsupportedFormat(
                "parquet payloads must be read from a file".to_string(),
            )),
        }
    }

    /// Write the table to `path` in the format implied by its extension.
    pub fn write_path(&self, path: &Path) -> Result<()> {
        match TableFormat::from_path(path)? {
            TableFormat::Csv => {
                let mut writer = csv::Writer::from_path(path)?;
                self.write_csv(&mut writer)?;
                writer.flush().map_err(|e| LoadError::io(path, e))?;
            }
            TableFormat::Json => {
                let text = serde_json::to_string_pretty(&self.to_json_records())?;
                std::fs::write(path, text).map_err(|e| LoadError::io(path, e))?;
            }
            TableFormat::Parquet => write_parquet(self, path)?,
        }
        Ok(())
    }

    fn write_csv<W: std::io::Write>(&self, writer: &mut csv::Writer<W>) -> Result<()> {
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|c| c.as_deref().unwrap_or("")))?;
        }
        Ok(())
    }

    fn to_json_records(&self) -> Vec<Map<String, JsonValue>> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .zip(row)
                    .map(|(h, cell)| (h.clone(), cell_to_json(cell.as_deref())))
                    .collect()
            })
            .collect()
    }
}

fn normalize(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn parse_csv(bytes: &[u8]) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(normalize).collect());
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

fn parse_json(bytes: &[u8]) -> Result<RawTable> {
    let root: JsonValue = serde_json::from_slice(bytes)?;
    let records = root
        .as_array()
        .ok_or_else(|| LoadError::malformed("expected a top-level JSON array of records"))?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::malformed(format!("record {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).and_then(json_to_cell))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_to_cell(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => normalize(s),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Numbers are written as JSON numbers only when they print back as the same
/// text, so "0012" or "1e3" stay strings.
fn cell_to_json(cell: Option<&str>) -> JsonValue {
    let Some(text) = cell else {
        return JsonValue::Null;
    };
    let number = match text.parse::<i64>() {
        Ok(i) => Some(serde_json::Number::from(i)),
        Err(_) => text
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64),
    };
    match number {
        Some(n) if n.to_string() == text => JsonValue::Number(n),
        _ => JsonValue::String(text.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Every column is cast to text, so numeric, string and date columns written
/// by Pandas or Polars all read the same way.
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::io(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let columns = batch
            .columns()
            .iter()
            .map(|col| cast(col.as_ref(), &DataType::Utf8))
            .collect::<std::result::Result<Vec<ArrayRef>, _>>()?;

        for row in 0..batch.num_rows() {
            let mut cells = Vec::with_capacity(columns.len());
            for col in &columns {
                let strings = col
                    .as_string_opt::<i32>()
                    .ok_or_else(|| LoadError::malformed("parquet column did not cast to text"))?;
                cells.push(if strings.is_null(row) {
                    None
                } else {
                    normalize(strings.value(row))
                });
            }
            rows.push(cells);
        }
    }

    Ok(RawTable { headers, rows })
}

fn write_parquet(table: &RawTable, path: &Path) -> Result<()> {
    let schema = Arc::new(Schema::new(
        table
            .headers
            .iter()
            .map(|h| Field::new(h, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));

    let columns: Vec<ArrayRef> = (0..table.headers.len())
        .map(|col| {
            let values: Vec<Option<&str>> = table
                .rows
                .iter()
                .map(|row| row.get(col).and_then(|c| c.as_deref()))
                .collect();
            Arc::new(StringArray::from(values)) as ArrayRef
        })
        .collect();

    let batch = RecordBatch::try_new(schema.clone(), columns)?;
    let file = std::fs::File::create(path).map_err(|e| LoadError::io(path, e))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_blank_cells_become_none() {
        let table = RawTable::parse(
            TableFormat::Csv,
            b"name,country,arr_usd\nPayFlex, Mexico ,\nSolo,,12\n",
        )
        .unwrap();
        assert_eq!(table.headers, vec!["name", "country", "arr_usd"]);
        assert_eq!(table.cell(0, 1), Some("Mexico"));
        assert_eq!(table.cell(0, 2), None);
        assert_eq!(table.cell(1, 1), None);
        assert_eq!(table.cell(1, 2), Some("12"));
    }

    #[test]
    fn json_records_union_keys() {
        let table = RawTable::parse(
            TableFormat::Json,
            br#"[{"name": "PayFlex", "nps": 52}, {"name": "EduPlus", "stage": null, "ltv_cac": 4.5}]"#,
        )
        .unwrap();
        let nps = table.column_index("nps").unwrap();
        let ltv = table.column_index("ltv_cac").unwrap();
        let stage = table.column_index("stage").unwrap();
        assert_eq!(table.cell(0, nps), Some("52"));
        assert_eq!(table.cell(1, nps), None);
        assert_eq!(table.cell(1, ltv), Some("4.5"));
        assert_eq!(table.cell(1, stage), None);
    }

    #[test]
    fn json_file_keeps_number_like_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("companies.json");
        let table = RawTable {
            // JSON objects come back with their keys sorted.
            headers: vec!["founded_year".into(), "ltv_cac".into(), "name".into()],
            rows: vec![
                vec![Some("2019".into()), Some("6.0".into()), Some("0012".into())],
                vec![None, Some("4.25".into()), Some("1e3".into())],
            ],
        };
        table.write_path(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains(r#""name": "0012""#));
        assert!(text.contains(r#""founded_year": 2019"#));
        assert_eq!(RawTable::read_path(&path).unwrap(), table);
    }

    #[test]
    fn json_must_be_an_array() {
        let err = RawTable::parse(TableFormat::Json, br#"{"name": "PayFlex"}"#).unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        assert!(matches!(
            TableFormat::from_name("companies.xlsx"),
            Err(LoadError::UnsupportedFormat(_))
        ));
        assert_eq!(TableFormat::from_name("R.PQ").unwrap(), TableFormat::Parquet);
    }

    #[test]
    fn parquet_file_reads_back_what_was_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rounds.parquet");
        let table = RawTable {
            headers: vec!["name".into(), "round_amount_usd".into()],
            rows: vec![
                vec![Some("PayFlex".into()), Some("5000000".into())],
                vec![Some("EduPlus".into()), None],
            ],
        };
        table.write_path(&path).unwrap();
        assert_eq!(RawTable::read_path(&path).unwrap(), table);
    }
}
