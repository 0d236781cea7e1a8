//! Local population loading.
//!
//! A population lives in two files sharing one stem: `<stem>.csv` holds the
//! records and `<stem>.json` the schema metadata. The loader parses every
//! value against its declared column kind, so anything downstream can rely
//! on the metadata describing every attribute of every record.

use crate::data::{ColumnKind, ColumnMeta, Dataset, Metadata, Record, RecordId, Value};
use crate::models::{LinkriskError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

/// Load a `(population, metadata)` pair from `<stem>.csv` + `<stem>.json`.
///
/// If the first CSV header field is not a metadata column it is treated as
/// the record-identifier column; otherwise row ordinals become identifiers
/// (matching data exported without an explicit key).
pub fn load_local(stem: &Path) -> Result<(Dataset, Metadata)> {
    let meta_path = stem.with_extension("json");
    let csv_path = stem.with_extension("csv");

    let meta_content = std::fs::read_to_string(&meta_path)
        .map_err(|e| LinkriskError::io(format!("reading metadata file {meta_path:?}"), e))?;
    let metadata: Metadata = serde_json::from_str(&meta_content)
        .map_err(|e| LinkriskError::Parse(format!("metadata file {meta_path:?}: {e}")))?;

    let file = File::open(&csv_path)
        .map_err(|e| LinkriskError::io(format!("opening data file {csv_path:?}"), e))?;
    let mut lines = BufReader::new(file).lines();

    let header_line = lines
        .next()
        .ok_or_else(|| LinkriskError::data(format!("data file {csv_path:?} is empty")))?
        .map_err(|e| LinkriskError::io("reading data file header", e))?;
    let header: Vec<&str> = header_line.split(',').map(str::trim).collect();

    let declared = metadata.column_names();
    let has_id_column = header
        .first()
        .is_some_and(|first| !declared.contains(first));
    let attr_header = if has_id_column { &header[1..] } else { &header[..] };

    if attr_header != declared.as_slice() {
        return Err(LinkriskError::data(format!(
            "data columns {attr_header:?} do not match metadata columns {declared:?}"
        )));
    }

    let mut records = Vec::new();
    for (line_num, line) in lines.enumerate() {
        let line = line.map_err(|e| LinkriskError::io("reading data file", e))?;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != header.len() {
            return Err(LinkriskError::Parse(format!(
                "line {}: expected {} fields, found {}",
                line_num + 2,
                header.len(),
                fields.len()
            )));
        }

        let (id, attrs) = if has_id_column {
            (RecordId::from(fields[0]), &fields[1..])
        } else {
            (RecordId::from(line_num.to_string()), &fields[..])
        };

        let mut values = Vec::with_capacity(metadata.len());
        for (column, raw) in metadata.columns.iter().zip(attrs.iter().copied()) {
            values.push(parse_value(column, raw, line_num + 2)?);
        }
        records.push(Record { id, values });
    }

    let population = Dataset::new(
        declared.iter().map(|s| s.to_string()).collect(),
        records,
    )?;

    info!(
        records = population.len(),
        columns = metadata.len(),
        path = ?csv_path,
        "Loaded population"
    );

    Ok((population, metadata))
}

fn parse_value(column: &ColumnMeta, raw: &str, line: usize) -> Result<Value> {
    match &column.kind {
        ColumnKind::Categorical { categories } => {
            if !categories.iter().any(|c| c == raw) {
                return Err(LinkriskError::data(format!(
                    "line {line}: value '{raw}' not in declared domain of column '{}'",
                    column.name
                )));
            }
            Ok(Value::Text(raw.to_string()))
        }
        ColumnKind::Integer { min, max } => {
            let v = raw.parse::<i64>().map_err(|e| {
                LinkriskError::Parse(format!(
                    "line {line}: column '{}': invalid integer '{raw}': {e}",
                    column.name
                ))
            })?;
            if v < *min || v > *max {
                return Err(LinkriskError::data(format!(
                    "line {line}: value {v} outside declared domain [{min}, {max}] of column '{}'",
                    column.name
                )));
            }
            Ok(Value::Int(v))
        }
        ColumnKind::Float { min, max } => {
            let v = raw.parse::<f64>().map_err(|e| {
                LinkriskError::Parse(format!(
                    "line {line}: column '{}': invalid float '{raw}': {e}",
                    column.name
                ))
            })?;
            if !v.is_finite() || v < *min || v > *max {
                return Err(LinkriskError::data(format!(
                    "line {line}: value {v} outside declared domain [{min}, {max}] of column '{}'",
                    column.name
                )));
            }
            Ok(Value::Float(v))
        }
    }
}
