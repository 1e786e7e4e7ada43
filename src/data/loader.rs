use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value as JsonValue;

use super::model::{Dataset, FieldValue, Sample};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json` – `[{ "field": value, ... }, ...]`
/// * `.csv`  – header row, one sample per row
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON layout (records-oriented):
///
/// ```json
/// [
///   {
///     "confidence": 0.42,
///     "tags": [1, 2, 3],
///     "created": {"_cls": "DateTime", "datetime": 1700000000000},
///     "label": "cat"
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

pub fn parse_json(text: &str) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut samples = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let fields: BTreeMap<String, FieldValue> = obj
            .iter()
            .map(|(key, val)| (key.clone(), json_to_value(val)))
            .collect();
        samples.push(Sample { fields });
    }

    Ok(Dataset::from_samples(samples))
}

fn json_to_value(val: &JsonValue) -> FieldValue {
    match val {
        JsonValue::String(s) => FieldValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                FieldValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                FieldValue::Float(f)
            } else {
                FieldValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => FieldValue::Bool(*b),
        JsonValue::Null => FieldValue::Null,
        JsonValue::Array(items) => FieldValue::List(items.iter().map(json_to_value).collect()),
        JsonValue::Object(obj) => {
            let ms = obj.get("datetime").and_then(JsonValue::as_f64);
            match (obj.get("_cls").and_then(JsonValue::as_str), ms) {
                (Some("DateTime"), Some(ms)) => FieldValue::DateTime(ms),
                (Some("Date"), Some(ms)) => FieldValue::Date(ms),
                _ => FieldValue::String(val.to_string()),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout:  header row with field names, one sample per row.
/// Cells containing `;` are lists: `"1;2;3"`. Empty cells are null.
fn load_csv(path: &Path) -> Result<Dataset> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader)
}

fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Dataset> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut samples = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let mut fields = BTreeMap::new();
        for (col_idx, cell) in record.iter().enumerate() {
            let Some(name) = headers.get(col_idx) else {
                bail!("CSV row {row_no}: more cells than headers");
            };
            fields.insert(name.clone(), guess_value(cell));
        }
        samples.push(Sample { fields });
    }

    Ok(Dataset::from_samples(samples))
}

fn guess_value(s: &str) -> FieldValue {
    if s.contains(';') {
        return FieldValue::List(s.split(';').map(|tok| guess_scalar(tok.trim())).collect());
    }
    guess_scalar(s)
}

fn guess_scalar(s: &str) -> FieldValue {
    if s.is_empty() {
        return FieldValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return FieldValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return FieldValue::Float(f);
    }
    if s == "true" || s == "false" {
        return FieldValue::Bool(s == "true");
    }
    FieldValue::String(s.to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn json_records_become_samples() {
        let ds = parse_json(
            r#"[
                {"confidence": 0.5, "n": 3, "created": {"_cls": "DateTime", "datetime": 1000},
                 "tags": [1, 2], "label": "cat", "flag": true, "missing": null},
                {"confidence": 0.9}
            ]"#,
        )
        .unwrap();

        assert_eq!(ds.len(), 2);
        let first = &ds.samples[0];
        assert_eq!(first.get("confidence"), Some(&FieldValue::Float(0.5)));
        assert_eq!(first.get("n"), Some(&FieldValue::Integer(3)));
        assert_eq!(first.get("created"), Some(&FieldValue::DateTime(1000.0)));
        assert_eq!(
            first.get("tags"),
            Some(&FieldValue::List(vec![FieldValue::Integer(1), FieldValue::Integer(2)]))
        );
        assert_eq!(first.get("flag"), Some(&FieldValue::Bool(true)));
        assert_eq!(first.get("missing"), Some(&FieldValue::Null));
        assert_eq!(ds.samples[1].get("n"), None);
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        assert!(parse_json(r#"{"a": 1}"#).is_err());
        assert!(parse_json("[1, 2]").is_err());
    }

    #[test]
    fn csv_cells_are_type_guessed() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "id,score,label,frames").unwrap();
        writeln!(file, "1,0.25,cat,1;5").unwrap();
        writeln!(file, "2,,dog,").unwrap();
        file.flush().unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.samples[0].get("score"), Some(&FieldValue::Float(0.25)));
        assert_eq!(
            ds.samples[0].get("frames"),
            Some(&FieldValue::List(vec![FieldValue::Integer(1), FieldValue::Integer(5)]))
        );
        assert_eq!(ds.samples[1].get("score"), Some(&FieldValue::Null));
        assert_eq!(
            ds.field_paths,
            vec!["frames", "id", "label", "score"]
        );
    }

    #[test]
    fn unsupported_extension() {
        assert!(load_file(Path::new("data.parquet")).is_err());
    }
}
