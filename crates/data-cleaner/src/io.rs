//! Loading tables from CSV/JSON and writing cleaned frames back.
//!
//! The engine never calls into this module; it only sees [`Table`]s.

use crate::error::{CleaningError, Result, ResultExt};
use crate::types::{Table, dataframe_records};
use polars::prelude::*;
use serde_json::{Map, Value};
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// Delimiters tried when sniffing a CSV header, in priority order.
const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Rows used by polars to infer column dtypes.
const INFER_SCHEMA_ROWS: usize = 100;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Json,
}

impl TableFormat {
    /// Detect the format from a file extension (case-insensitive).
    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(CleaningError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Detect the format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        Self::from_extension(extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Load a table from a `.csv` or `.json` file.
pub fn load_table(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let format = TableFormat::from_path(path)?;
    info!("Loading {} file: {}", format, path.display());

    let bytes = std::fs::read(path)
        .map_err(CleaningError::from)
        .context(format!("Failed to read '{}'", path.display()))?;
    read_table(&bytes, format)
}

/// Parse raw bytes into a table.
pub fn read_table(bytes: &[u8], format: TableFormat) -> Result<Table> {
    let text = decode_text(bytes);
    let table = match format {
        TableFormat::Csv => read_csv(&text)?,
        TableFormat::Json => read_json(&text)?,
    };
    debug!("Loaded table: {} rows x {} columns", table.height(), table.width());
    Ok(table)
}

/// Serialize a frame to bytes in the given format.
pub fn write_table(df: &DataFrame, format: TableFormat) -> Result<Vec<u8>> {
    match format {
        TableFormat::Csv => {
            let mut buffer = Vec::new();
            let mut df = df.clone();
            CsvWriter::new(&mut buffer)
                .include_header(true)
                .with_separator(b',')
                .with_quote_char(b'"')
                .finish(&mut df)
                .context("Failed to write CSV")?;
            Ok(buffer)
        }
        TableFormat::Json => {
            let records = dataframe_records(df, None)?;
            Ok(serde_json::to_vec_pretty(&records)?)
        }
    }
}

/// UTF-8 with a Latin-1 fallback; a leading BOM is dropped.
fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.trim_start_matches('\u{feff}').to_string(),
        Err(_) => {
            debug!("Input is not valid UTF-8, decoding as Latin-1");
            bytes.iter().map(|&b| b as char).collect()
        }
    }
}

// ============================================================================
// CSV
// ============================================================================

fn read_csv(content: &str) -> Result<Table> {
    let delimiter = sniff_delimiter(content);
    let (header, body_offset) = match header_record(content, delimiter)? {
        Some((record, offset)) if record.iter().any(|f| !f.trim().is_empty()) => (record, offset),
        _ => return Err(CleaningError::InvalidInput("CSV file has no header".to_string())),
    };
    let names = header_names(&header);
    debug!(
        "CSV header has {} columns, delimiter {:?}",
        names.len(),
        delimiter as char
    );

    // polars rejects repeated header names, so the header is read here and
    // the body parsed without one.
    let body = content.get(body_offset..).unwrap_or_default();
    if body.trim().is_empty() {
        let columns = names
            .iter()
            .map(|name| Series::new_empty(name.as_str().into(), &DataType::String))
            .collect();
        return Table::new(columns);
    }

    let df = CsvReadOptions::default()
        .with_has_header(false)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(delimiter)
                .with_quote_char(Some(b'"')),
        )
        .into_reader_with_file_handle(Cursor::new(body.to_string()))
        .finish()
        .map_err(|e| CleaningError::InvalidInput(format!("Failed to parse CSV: {}", e)))?;

    if df.width() != names.len() {
        return Err(CleaningError::InvalidInput(format!(
            "CSV header has {} columns but rows have {}",
            names.len(),
            df.width()
        )));
    }

    let columns = df
        .get_columns()
        .iter()
        .zip(&names)
        .map(|(col, name)| {
            col.as_materialized_series()
                .clone()
                .with_name(name.as_str().into())
        })
        .collect();
    Table::new(columns)
}

/// First record of the file and the byte offset where the body starts.
fn header_record(content: &str, delimiter: u8) -> Result<Option<(csv::StringRecord, usize)>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let mut record = csv::StringRecord::new();
    let found = reader
        .read_record(&mut record)
        .map_err(|e| CleaningError::InvalidInput(format!("Failed to read CSV header: {}", e)))?;

    Ok(found.then(|| (record, reader.position().byte() as usize)))
}

/// The candidate delimiter splitting the header into the most fields; `,` on ties.
fn sniff_delimiter(content: &str) -> u8 {
    let mut best = (b',', 0);
    for delimiter in CANDIDATE_DELIMITERS {
        let fields = match header_record(content, delimiter) {
            Ok(Some((record, _))) => record.len(),
            _ => 0,
        };
        if fields > best.1 {
            best = (delimiter, fields);
        }
    }
    best.0
}

/// Header names; empty names become `Unnamed: {i}`.
fn header_names(header: &csv::StringRecord) -> Vec<String> {
    header
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if name.trim().is_empty() {
                format!("Unnamed: {}", i)
            } else {
                name.to_string()
            }
        })
        .collect()
}

// ============================================================================
// JSON
// ============================================================================

fn read_json(content: &str) -> Result<Table> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| CleaningError::InvalidInput(format!("Failed to parse JSON: {}", e)))?;

    let records: Vec<Map<String, Value>> = match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => Ok(map),
                other => Err(CleaningError::InvalidInput(format!(
                    "expected an array of objects, found element {}",
                    other
                ))),
            })
            .collect::<Result<_>>()?,
        Value::Object(map) => {
            let mut flat = Map::new();
            flatten_object("", map, &mut flat);
            vec![flat]
        }
        _ => {
            return Err(CleaningError::InvalidInput(
                "expected a JSON array of records or an object".to_string(),
            ));
        }
    };

    // Keys in first-seen order.
    let mut keys: Vec<String> = Vec::new();
    for record in &records {
        for key in record.keys() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
    }

    if keys.is_empty() {
        return Err(CleaningError::EmptyTable);
    }

    let columns = keys
        .iter()
        .map(|key| {
            let values: Vec<&Value> = records
                .iter()
                .map(|record| record.get(key).unwrap_or(&Value::Null))
                .collect();
            json_series(key, &values)
        })
        .collect();
    Table::new(columns)
}

/// Flatten nested objects into dotted keys (`{"a": {"b": 1}}` -> `a.b`).
fn flatten_object(prefix: &str, map: Map<String, Value>, out: &mut Map<String, Value>) {
    for (key, value) in map {
        let full_key = if prefix.is_empty() {
            key
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::Object(inner) => flatten_object(&full_key, inner, out),
            other => {
                out.insert(full_key, other);
            }
        }
    }
}

/// Build a series from JSON values with the narrowest fitting dtype.
fn json_series(name: &str, values: &[&Value]) -> Series {
    let present = values.iter().filter(|v| !v.is_null());

    if present.clone().all(|v| v.is_boolean()) && values.iter().any(|v| v.is_boolean()) {
        let data: Vec<Option<bool>> = values.iter().map(|v| v.as_bool()).collect();
        return Series::new(name.into(), data);
    }
    if present.clone().all(|v| v.is_i64()) && values.iter().any(|v| v.is_i64()) {
        let data: Vec<Option<i64>> = values.iter().map(|v| v.as_i64()).collect();
        return Series::new(name.into(), data);
    }
    if present.clone().all(|v| v.is_number()) && values.iter().any(|v| v.is_number()) {
        let data: Vec<Option<f64>> = values.iter().map(|v| v.as_f64()).collect();
        return Series::new(name.into(), data);
    }

    let data: Vec<Option<String>> = values
        .iter()
        .map(|v| match v {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
        .collect();
    Series::new(name.into(), data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(TableFormat::from_extension("CSV").unwrap(), TableFormat::Csv);
        assert_eq!(
            TableFormat::from_path(Path::new("data/people.json")).unwrap(),
            TableFormat::Json
        );
        assert!(matches!(
            TableFormat::from_extension("xlsx"),
            Err(CleaningError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("a,b,c\n1,2,3"), b',');
        assert_eq!(sniff_delimiter("a;b;c"), b';');
        assert_eq!(sniff_delimiter("a\tb"), b'\t');
        assert_eq!(sniff_delimiter("\"x;y\",z"), b',');
        assert_eq!(sniff_delimiter("single"), b',');
    }

    #[test]
    fn test_header_names() {
        let (header, _) = header_record("\"First Name\",age,,\"say \"\"hi\"\"\"\n1,2,3,4\n", b',')
            .unwrap()
            .unwrap();
        assert_eq!(
            header_names(&header),
            vec!["First Name", "age", "Unnamed: 2", "say \"hi\""]
        );
    }

    #[test]
    fn test_read_csv_quoted_newline_in_header() {
        let table = read_table(b"\"full\nname\",age\nAnn,30\n", TableFormat::Csv).unwrap();
        assert_eq!(table.column_names(), vec!["full\nname", "age"]);
        assert_eq!(table.height(), 1);
    }

    #[test]
    fn test_malformed_input_is_input_error() {
        let err = read_table(b"[{", TableFormat::Json).unwrap_err();
        assert!(err.is_input_error());
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let err = read_table(b"a,b\n1,2,3\n", TableFormat::Csv).unwrap_err();
        assert!(err.is_input_error());

        assert!(read_table(b"", TableFormat::Csv).unwrap_err().is_input_error());
    }

    #[test]
    fn test_read_csv_keeps_duplicate_headers() {
        let table = read_table(b"age,name,age\n30,Ann,31\n40,Bob,41\n", TableFormat::Csv).unwrap();
        assert_eq!(table.column_names(), vec!["age", "name", "age"]);
        assert_eq!(table.height(), 2);
    }

    #[test]
    fn test_read_csv_semicolon_and_missing() {
        let table = read_table(b"id;score\n1;10\n2;\n3;20\n", TableFormat::Csv).unwrap();
        assert_eq!(table.column_names(), vec!["id", "score"]);
        assert_eq!(table.columns()[1].null_count(), 1);
    }

    #[test]
    fn test_read_csv_header_only() {
        let table = read_table(b"a,b\n", TableFormat::Csv).unwrap();
        assert_eq!(table.width(), 2);
        assert_eq!(table.height(), 0);
    }

    #[test]
    fn test_read_csv_latin1() {
        let bytes = b"name\nJos\xe9\n";
        let table = read_table(bytes, TableFormat::Csv).unwrap();
        let value = table.columns()[0].str().unwrap().get(0).map(str::to_string);
        assert_eq!(value, Some("José".to_string()));
    }

    #[test]
    fn test_read_json_records() {
        let table = read_table(
            br#"[{"id": 1, "name": "Ann", "score": 1.5}, {"id": 2, "score": null, "extra": true}]"#,
            TableFormat::Json,
        )
        .unwrap();

        assert_eq!(table.column_names(), vec!["id", "name", "score", "extra"]);
        assert_eq!(table.columns()[0].dtype(), &DataType::Int64);
        assert_eq!(table.columns()[1].null_count(), 1);
        assert_eq!(table.columns()[2].dtype(), &DataType::Float64);
        assert_eq!(table.columns()[3].dtype(), &DataType::Boolean);
    }

    #[test]
    fn test_read_json_single_object_is_flattened() {
        let table = read_table(br#"{"id": 7, "address": {"city": "Oslo"}}"#, TableFormat::Json)
            .unwrap();
        assert_eq!(table.column_names(), vec!["id", "address.city"]);
        assert_eq!(table.height(), 1);
    }

    #[test]
    fn test_read_json_rejects_scalars() {
        assert!(read_table(b"42", TableFormat::Json).unwrap_err().is_input_error());
        assert!(matches!(
            read_table(b"[]", TableFormat::Json),
            Err(CleaningError::EmptyTable)
        ));
    }

    #[test]
    fn test_write_table() {
        let df = DataFrame::new(vec![
            Column::new("id".into(), &[1i64, 2]),
            Column::new("name".into(), &["a", "b"]),
        ])
        .unwrap();

        let csv = String::from_utf8(write_table(&df, TableFormat::Csv).unwrap()).unwrap();
        assert_eq!(csv, "id,name\n1,a\n2,b\n");

        let json: Value = serde_json::from_slice(&write_table(&df, TableFormat::Json).unwrap())
            .unwrap();
        assert_eq!(json[1]["name"], "b");
    }
}
