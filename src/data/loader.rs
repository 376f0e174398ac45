//! Row loading from delimited text or JSON.
//!
//! Delimited text follows the usual comma-separated conventions: a header
//! line names the columns, cells may be wrapped in double quotes (with `""`
//! as an escaped quote), CRLF line ends are accepted and blank lines are
//! skipped. Every cell loads as text; the measure is read numerically when
//! the hierarchy is summed.
//!
//! JSON input is an array of objects. Loading from disk can run on a
//! background thread via [`spawn_load`]; the result arrives on a channel.

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use crate::data::{FieldValue, Row, Table};
use crate::error::{Result, SunburstError};

/// Parse comma-separated text with a header line.
pub fn parse_delimited(text: &str) -> Result<Table> {
    let mut records = split_records(text)?.into_iter();

    let columns: Vec<String> = match records.next() {
        Some(header) => header.into_iter().map(|c| c.trim().to_string()).collect(),
        None => {
            return Err(SunburstError::InvalidInput(
                "delimited input has no header line".into(),
            ))
        }
    };
    if columns.iter().any(|c| c.is_empty()) {
        return Err(SunburstError::InvalidInput(
            "header contains an empty column name".into(),
        ));
    }

    let mut rows = Vec::new();
    for (line_no, record) in records.enumerate() {
        if record.len() > columns.len() {
            return Err(SunburstError::InvalidInput(format!(
                "data line {} has {} cells but the header has {}",
                line_no + 1,
                record.len(),
                columns.len()
            )));
        }
        // Short lines leave trailing fields absent.
        let row: Row = columns
            .iter()
            .zip(record)
            .map(|(c, v)| (c.clone(), FieldValue::Text(v)))
            .collect();
        rows.push(row);
    }

    Ok(Table { columns, rows })
}

/// Split text into records of cells, honouring quoted cells that span lines.
fn split_records(text: &str) -> Result<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    cell.push('"');
                }
                '"' => in_quotes = false,
                _ => cell.push(c),
            }
            continue;
        }
        match c {
            '"' if cell.is_empty() => in_quotes = true,
            ',' => record.push(std::mem::take(&mut cell)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                record.push(std::mem::take(&mut cell));
                push_record(&mut records, std::mem::take(&mut record));
            }
            _ => cell.push(c),
        }
    }

    if in_quotes {
        return Err(SunburstError::InvalidInput("unterminated quoted cell".into()));
    }
    if !cell.is_empty() || !record.is_empty() {
        record.push(cell);
        push_record(&mut records, record);
    }
    Ok(records)
}

fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>) {
    if record.len() == 1 && record[0].trim().is_empty() {
        log::debug!("Skipping blank line");
        return;
    }
    records.push(record);
}

/// Parse a JSON array of objects.
///
/// Strings and numbers keep their type, booleans become text and `null`
/// leaves the field absent. Columns are listed in order of first appearance.
pub fn parse_json_rows(text: &str) -> Result<Table> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        other => {
            return Err(SunburstError::InvalidInput(format!(
                "expected an array of objects, found {}",
                json_kind(&other)
            )))
        }
    };

    let mut columns: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        let object = match item {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(SunburstError::InvalidInput(format!(
                    "row {} is {}, not an object",
                    idx,
                    json_kind(&other)
                )))
            }
        };

        let mut row = Row::new();
        for (key, value) in object {
            let cell = match value {
                serde_json::Value::Null => continue,
                serde_json::Value::String(s) => FieldValue::Text(s),
                serde_json::Value::Number(n) => match n.as_f64() {
                    Some(f) => FieldValue::Number(f),
                    None => FieldValue::Text(n.to_string()),
                },
                serde_json::Value::Bool(b) => FieldValue::Text(b.to_string()),
                nested => {
                    return Err(SunburstError::InvalidInput(format!(
                        "row {} field {:?} holds {}",
                        idx,
                        key,
                        json_kind(&nested)
                    )))
                }
            };
            if !columns.contains(&key) {
                columns.push(key.clone());
            }
            row.insert(key, cell);
        }
        rows.push(row);
    }

    Ok(Table { columns, rows })
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Read rows from disk: `.json` files as JSON, anything else as delimited text.
pub fn load_rows(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("json"));

    let table = if is_json {
        parse_json_rows(&text)?
    } else {
        parse_delimited(&text)?
    };
    log::info!(
        "Loaded {} rows ({} columns) from {}",
        table.rows.len(),
        table.columns.len(),
        path.display()
    );
    Ok(table)
}

/// Load rows on a background thread.
///
/// `on_done` runs on the loader thread after the result is sent; hosts use
/// it to wake their event loop.
pub fn spawn_load<F>(path: PathBuf, on_done: F) -> mpsc::Receiver<Result<Table>>
where
    F: FnOnce() + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let result = load_rows(&path);
        if let Err(ref e) = result {
            log::warn!("Loading {} failed: {}", path.display(), e);
        }
        let _ = tx.send(result);
        on_done();
    });
    rx
}
