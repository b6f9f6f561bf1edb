use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{row, ColumnKind, DataSource, Value};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Everything that can go wrong while bringing the dataset up.
/// All variants are fatal: there is no partially loaded dataset.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("dataset has no '{0}' column")]
    MissingColumn(String),
    #[error("column '{column}' must be numeric, found {value:?} in row {row}")]
    NotNumeric {
        column: String,
        row: usize,
        value: String,
    },
    #[error("dataset is empty")]
    Empty,
    #[error("{0}")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// What the loader needs to know about the expected schema.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Field delimiter for delimited text files.
    pub delimiter: u8,
    /// Columns that must exist.
    pub required: Vec<String>,
    /// Columns that must exist and be numeric.
    pub numeric: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            required: Vec::new(),
            numeric: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.tsv` / `.txt` – header row, one record per line
/// * `.json`    – `[{ "quality": 6, "fixed acidity": 7.0, ... }, ...]`
/// * `.parquet` – flat scalar columns
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<DataSource, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let source = match ext.as_str() {
        "csv" | "txt" => load_csv(path, options.delimiter)?,
        "tsv" => load_csv(path, b'\t')?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    validate(&source, options)?;
    log::debug!(
        "{}: {} rows, columns {:?}",
        path.display(),
        source.len(),
        source.column_names().collect::<Vec<_>>()
    );
    Ok(source)
}

/// Enforce the schema invariants the filter pipeline relies on.
pub fn validate(source: &DataSource, options: &LoadOptions) -> Result<(), LoadError> {
    if source.is_empty() {
        return Err(LoadError::Empty);
    }
    for name in options.required.iter().chain(&options.numeric) {
        if source.column(name).is_none() {
            return Err(LoadError::MissingColumn(name.clone()));
        }
    }
    for name in &options.numeric {
        if source.column(name).map(|c| c.kind) == Some(ColumnKind::Numeric) {
            continue;
        }
        let offender = source
            .rows()
            .iter()
            .find_map(|r| match r.get(name) {
                Some(v) if !v.is_null() && v.as_f64().is_none() => Some((r.id.0, v.to_string())),
                _ => None,
            })
            .unwrap_or_default();
        return Err(LoadError::NotNumeric {
            column: name.clone(),
            row: offender.0,
            value: offender.1,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header row with column names, one record per line. Ragged records are
/// rejected by the reader, so every row carries every declared column.
fn load_csv(path: &Path, delimiter: u8) -> Result<DataSource, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv(file, delimiter)
}

pub fn read_csv<R: std::io::Read>(reader: R, delimiter: u8) -> Result<DataSource, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_matches('"').to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let cells = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), guess_value_type(v)));
        rows.push(row(cells));
    }

    Ok(DataSource::from_rows(headers, rows))
}

fn guess_value_type(s: &str) -> Value {
    if s.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }
    if s == "true" || s == "false" {
        return Value::Bool(s == "true");
    }
    Value::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "fixed acidity": 7.0, "volatile acidity": 0.27, "quality": 6 },
///   ...
/// ]
/// ```
///
/// Columns come out in key order; keys first seen in later records are appended.
fn load_json(path: &Path) -> Result<DataSource, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_json_records(&text)
}

pub fn parse_json_records(text: &str) -> Result<DataSource, LoadError> {
    let root: JsonValue = serde_json::from_str(text)?;

    let records = root
        .as_array()
        .ok_or_else(|| LoadError::Malformed("expected top-level JSON array".into()))?;

    let mut headers: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::Malformed(format!("row {i} is not a JSON object")))?;

        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
        rows.push(row(obj.iter().map(|(k, v)| (k.clone(), json_to_value(v)))));
    }

    // Fill absent keys so every row carries every column.
    for r in &mut rows {
        for h in &headers {
            r.cells.entry(h.clone()).or_insert(Value::Null);
        }
    }

    Ok(DataSource::from_rows(headers, rows))
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of flat scalar columns (strings, ints, floats, bools).
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<DataSource, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
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
        let batch = batch_result.map_err(|e| LoadError::Malformed(e.to_string()))?;
        let schema = batch.schema();

        for r in 0..batch.num_rows() {
            let mut cells = BTreeMap::new();
            for (col_idx, field) in schema.fields().iter().enumerate() {
                let value = extract_value(batch.column(col_idx), r)?;
                cells.insert(field.name().clone(), value);
            }
            rows.push(row(cells));
        }
    }

    Ok(DataSource::from_rows(headers, rows))
}

// -- Arrow helpers --

fn downcast<'a, T: 'static>(col: &'a Arc<dyn Array>) -> Result<&'a T, LoadError> {
    col.as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| LoadError::Malformed(format!("unexpected array for {:?}", col.data_type())))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &Arc<dyn Array>, r: usize) -> Result<Value, LoadError> {
    if col.is_null(r) {
        return Ok(Value::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => Value::String(downcast::<StringArray>(col)?.value(r).to_string()),
        DataType::LargeUtf8 => Value::String(col.as_string::<i64>().value(r).to_string()),
        DataType::Int32 => Value::Integer(downcast::<Int32Array>(col)?.value(r) as i64),
        DataType::Int64 => Value::Integer(downcast::<Int64Array>(col)?.value(r)),
        DataType::Float32 => Value::Float(downcast::<Float32Array>(col)?.value(r) as f64),
        DataType::Float64 => Value::Float(downcast::<Float64Array>(col)?.value(r)),
        DataType::Boolean => Value::Bool(downcast::<BooleanArray>(col)?.value(r)),
        other => {
            log::warn!("unsupported parquet column type {other:?}, reading as text");
            Value::String(format!("{other:?}"))
        }
    };
    Ok(value)
}
