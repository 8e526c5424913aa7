//! CSV and JSON file loading.

use serde_json::{Map, Number, Value};
use std::path::Path;
use tokio::fs;

use crate::domain::{Dataset, Record};

/// Errors raised at the file ingestion boundary.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("unsupported file type '{extension}': expected .csv or .json")]
    UnsupportedFileType { extension: String },

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("malformed {format} input: {message}")]
    Malformed {
        format: &'static str,
        message: String,
    },

    #[error("input contains no records")]
    Empty,
}

impl IngestError {
    fn malformed(format: &'static str, message: impl Into<String>) -> Self {
        Self::Malformed {
            format,
            message: message.into(),
        }
    }
}

/// Reads a dataset from disk, dispatching on the file extension.
pub async fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset, IngestError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if extension != "csv" && extension != "json" {
        return Err(IngestError::UnsupportedFileType { extension });
    }

    let contents = fs::read_to_string(path).await.map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let dataset = if extension == "csv" {
        parse_csv(&contents)?
    } else {
        parse_json(&contents)?
    };

    tracing::info!(
        path = %path.display(),
        records = dataset.len(),
        headers = dataset.headers.len(),
        "Loaded dataset"
    );
    Ok(dataset)
}

/// Parses comma-separated text with a header line.
///
/// Cells are trimmed of whitespace and surrounding quotes. Numeric cells
/// become numbers and `true`/`false` become booleans; short rows are padded
/// with empty strings.
pub fn parse_csv(contents: &str) -> Result<Dataset, IngestError> {
    let mut lines = contents.lines().filter(|line| !line.trim().is_empty());

    let headers: Vec<String> = lines
        .next()
        .ok_or(IngestError::Empty)?
        .split(',')
        .map(|cell| clean_cell(cell).to_string())
        .collect();

    if headers.iter().any(String::is_empty) {
        return Err(IngestError::malformed("csv", "header line has a blank column name"));
    }

    let records: Vec<Record> = lines
        .map(|line| {
            let cells: Vec<&str> = line.split(',').collect();
            headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    let value = cells.get(i).map(|cell| typed_cell(clean_cell(cell)));
                    (header.clone(), value.unwrap_or_else(|| Value::String(String::new())))
                })
                .collect()
        })
        .collect();

    if records.is_empty() {
        return Err(IngestError::Empty);
    }
    Ok(Dataset::new(headers, records))
}

/// Parses a JSON array of flat objects; headers come from the first object.
pub fn parse_json(contents: &str) -> Result<Dataset, IngestError> {
    let value: Value =
        serde_json::from_str(contents).map_err(|e| IngestError::malformed("json", e.to_string()))?;

    let Value::Array(items) = value else {
        return Err(IngestError::malformed("json", "expected a top-level array"));
    };

    let records = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => Ok(map),
            _ => Err(IngestError::malformed(
                "json",
                format!("element {} is not an object", index),
            )),
        })
        .collect::<Result<Vec<Map<String, Value>>, _>>()?;

    let headers = records
        .first()
        .ok_or(IngestError::Empty)?
        .keys()
        .cloned()
        .collect();

    Ok(Dataset::new(headers, records))
}

fn clean_cell(cell: &str) -> &str {
    cell.trim().trim_matches('"').trim()
}

fn typed_cell(cell: &str) -> Value {
    match cell {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            if let Ok(int) = cell.parse::<i64>() {
                return Value::Number(int.into());
            }
            cell.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(cell.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn csv_cells_are_typed() {
        let dataset = parse_csv(
            "customer_id,spend_amount,frequency,is_promo_user\n\
             \"C-1\", 42.5, 3, true\n\
             C-2,10,1,false\n",
        )
        .unwrap();

        assert_eq!(
            dataset.headers,
            vec!["customer_id", "spend_amount", "frequency", "is_promo_user"]
        );
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records[0]["customer_id"], json!("C-1"));
        assert_eq!(dataset.records[0]["spend_amount"], json!(42.5));
        assert_eq!(dataset.records[0]["frequency"], json!(3));
        assert_eq!(dataset.records[1]["is_promo_user"], json!(false));
    }

    #[test]
    fn short_csv_rows_are_padded() {
        let dataset = parse_csv("a,b,c\n1,2\n").unwrap();
        assert_eq!(dataset.records[0]["c"], json!(""));
    }

    #[test]
    fn csv_without_rows_is_empty() {
        assert!(matches!(parse_csv("a,b\n\n"), Err(IngestError::Empty)));
        assert!(matches!(parse_csv(""), Err(IngestError::Empty)));
    }

    #[test]
    fn json_headers_follow_first_object_order() {
        let dataset =
            parse_json(r#"[{"zeta": 1, "alpha": "x"}, {"zeta": 2, "alpha": "y"}]"#).unwrap();

        assert_eq!(dataset.headers, vec!["zeta", "alpha"]);
        assert_eq!(dataset.records[1]["zeta"], json!(2));
    }

    #[test]
    fn json_must_be_array_of_objects() {
        assert!(matches!(
            parse_json(r#"{"a": 1}"#),
            Err(IngestError::Malformed { .. })
        ));
        assert!(matches!(
            parse_json(r#"[{"a": 1}, 3]"#),
            Err(IngestError::Malformed { .. })
        ));
        assert!(matches!(parse_json("[]"), Err(IngestError::Empty)));
    }

    #[tokio::test]
    async fn unsupported_extension_is_rejected_before_reading() {
        let result = load_dataset("/nonexistent/data.xlsx").await;

        assert!(matches!(
            result,
            Err(IngestError::UnsupportedFileType { ref extension }) if extension == "xlsx"
        ));
    }

    #[tokio::test]
    async fn load_dataset_reads_csv_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shoppers.CSV");
        std::fs::write(&path, "id,spend\n1,9.5\n2,3\n").unwrap();

        let dataset = load_dataset(&path).await.unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.headers, vec!["id", "spend"]);
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = load_dataset(dir.path().join("missing.json")).await;

        assert!(matches!(result, Err(IngestError::Io { .. })));
    }
}
