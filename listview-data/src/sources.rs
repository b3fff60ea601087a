//! Record sources — materialize a collection of records from a file.
//!
//! The pipeline only consumes an in-memory collection; this module turns a
//! JSON array of objects or a CSV table into `DynRecord`s, coercing every
//! cell through the view schema. Cells that do not coerce are dropped from
//! the record (logged at `warn`) rather than failing the load.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use listview_core::{DynRecord, FieldKind, OwnedValue, Record, Schema};

/// Errors from loading a record file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("expected a JSON array of objects at the top level")]
    NotAnArray,

    #[error("unsupported record file extension '{0}' (expected .json or .csv)")]
    UnknownFormat(String),
}

/// Load records from `path`, choosing the format by extension.
///
/// `key_field` names the identity column; when absent (or missing on a row)
/// the 1-based row number is used.
pub fn load_records(
    path: &Path,
    schema: &Schema,
    key_field: Option<&str>,
) -> Result<Vec<DynRecord>, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "json" => load_json(path, schema, key_field),
        "csv" => load_csv(path, schema, key_field),
        other => Err(LoadError::UnknownFormat(other.to_string())),
    }
}

pub fn load_json(
    path: &Path,
    schema: &Schema,
    key_field: Option<&str>,
) -> Result<Vec<DynRecord>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let value: Value = serde_json::from_reader(BufReader::new(file))?;
    records_from_json(&value, schema, key_field)
}

/// Convert an already-parsed JSON array into records.
pub fn records_from_json(
    value: &Value,
    schema: &Schema,
    key_field: Option<&str>,
) -> Result<Vec<DynRecord>, LoadError> {
    let rows = value.as_array().ok_or(LoadError::NotAnArray)?;
    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row.as_object().ok_or(LoadError::NotAnArray)?;
        let key = key_field
            .and_then(|k| obj.get(k))
            .and_then(json_key)
            .unwrap_or_else(|| (i + 1).to_string());
        let mut record = DynRecord::new(key);
        for spec in &schema.fields {
            let Some(raw) = obj.get(&spec.name) else {
                continue;
            };
            match json_cell(spec.kind, raw) {
                Some(v) => record.insert(spec.name.clone(), v),
                None if raw.is_null() => {}
                None => tracing::warn!(row = i + 1, field = %spec.name, "dropping value that does not fit field kind"),
            }
        }
        records.push(record);
    }
    tracing::debug!(count = records.len(), "loaded JSON records");
    Ok(records)
}

fn json_key(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_cell(kind: FieldKind, raw: &Value) -> Option<OwnedValue> {
    match raw {
        Value::Null => None,
        Value::String(s) => listview_core::schema::coerce_kind(kind, s),
        Value::Number(n) => match kind {
            FieldKind::Number => n.as_f64().filter(|f| f.is_finite()).map(OwnedValue::Number),
            FieldKind::Text | FieldKind::Category => Some(OwnedValue::Text(n.to_string())),
            FieldKind::Date => None,
        },
        Value::Bool(b) if kind.is_textual() => Some(OwnedValue::Text(b.to_string())),
        _ => None,
    }
}

pub fn load_csv(
    path: &Path,
    schema: &Schema,
    key_field: Option<&str>,
) -> Result<Vec<DynRecord>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    records_from_csv(BufReader::new(file), schema, key_field)
}

/// Read CSV rows (with a header) from any reader.
pub fn records_from_csv<R: std::io::Read>(
    reader: R,
    schema: &Schema,
    key_field: Option<&str>,
) -> Result<Vec<DynRecord>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let key_col = key_field.and_then(|k| headers.iter().position(|h| h == k));

    // (column index, field name, kind) for every schema field present in the header.
    let columns: Vec<(usize, &str, FieldKind)> = schema
        .fields
        .iter()
        .filter_map(|spec| {
            headers
                .iter()
                .position(|h| h == spec.name)
                .map(|idx| (idx, spec.name.as_str(), spec.kind))
        })
        .collect();

    let mut records = Vec::new();
    for (i, row) in rdr.records().enumerate() {
        let row = row?;
        let key = key_col
            .and_then(|c| row.get(c))
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| (i + 1).to_string());
        let mut record = DynRecord::new(key);
        for &(idx, name, kind) in &columns {
            let cell = row.get(idx).unwrap_or_default();
            if cell.is_empty() {
                continue;
            }
            match listview_core::schema::coerce_kind(kind, cell) {
                Some(v) => record.insert(name, v),
                None => tracing::warn!(row = i + 1, field = name, cell, "dropping unparseable cell"),
            }
        }
        records.push(record);
    }
    tracing::debug!(count = records.len(), "loaded CSV records");
    Ok(records)
}

/// Snapshot typed records into `DynRecord`s, reading every schema field.
pub fn to_dyn_records<R: Record>(records: &[R], schema: &Schema) -> Vec<DynRecord> {
    records
        .iter()
        .map(|r| {
            let mut d = DynRecord::new(r.key().into_owned());
            for name in schema.names() {
                if let Some(v) = r.field(name) {
                    d.insert(name, v.into_owned());
                }
            }
            d
        })
        .collect()
}

/// Write records as CSV: a `key` column followed by every schema field.
/// Absent fields are written as empty cells; dates as `YYYY-MM-DD`.
pub fn write_csv<W: std::io::Write, R: Record>(
    writer: W,
    records: &[R],
    schema: &Schema,
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec!["key"];
    header.extend(schema.names());
    wtr.write_record(&header)?;
    for r in records {
        let mut row = vec![r.key().into_owned()];
        row.extend(
            schema
                .names()
                .map(|name| r.field(name).map(|v| v.to_string()).unwrap_or_default()),
        );
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}
