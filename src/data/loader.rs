use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Dataset, RawTable, Value};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one record per line
/// * `.json`    – `[{ "Glucose": 148, "BMI": 33.6, ... }, ...]`
/// * `.parquet` – flat primitive columns
///
/// The schema is inferred once here; `target` must name a binary column.
pub fn load_file(path: &Path, target: &str) -> Result<Dataset> {
    let raw = load_raw(path)?;
    let dataset = Dataset::from_raw(raw, target)
        .with_context(|| format!("validating schema of {}", path.display()))?;
    log::debug!(
        "{}: {} rows, schema {:?}",
        path.display(),
        dataset.len(),
        dataset.schema().fields()
    );
    Ok(dataset)
}

fn load_raw(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(Value::guess).collect());
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`). Column order
/// follows first appearance; keys missing from a record read as null.
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
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
                .map(|h| obj.get(h).map(json_to_value).unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => Value::guess(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Text(b.to_string()),
        JsonValue::Null => Value::Null,
        other => Value::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| extract_value(col, row))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Row {}", rows.len()))?;
            rows.push(cells);
        }
    }

    Ok(RawTable { headers, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &Arc<dyn Array>, row: usize) -> Result<Value> {
    if col.is_null(row) {
        return Ok(Value::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => Value::guess(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => Value::guess(col.as_string::<i64>().value(row)),
        DataType::Int8 => Value::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => Value::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => Value::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => Value::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => Value::Integer(col.as_primitive::<UInt8Type>().value(row) as i64),
        DataType::UInt16 => Value::Integer(col.as_primitive::<UInt16Type>().value(row) as i64),
        DataType::UInt32 => Value::Integer(col.as_primitive::<UInt32Type>().value(row) as i64),
        DataType::UInt64 => Value::Integer(col.as_primitive::<UInt64Type>().value(row) as i64),
        DataType::Float32 => float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Value::Integer(col.as_boolean().value(row) as i64),
        other => bail!("unsupported parquet column type {other:?}"),
    };
    Ok(value)
}

/// NaN and infinities read as missing, like an unparseable text cell.
fn float(v: f64) -> Value {
    if v.is_finite() {
        Value::Float(v)
    } else {
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::FieldType;
    use std::io::Write;

    fn write_temp(suffix: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_csv_with_inferred_schema() {
        let file = write_temp(
            ".csv",
            "Pregnancies,Glucose,BMI,Outcome\n6,148,33.6,1\n1,85,26.6,0\n",
        );
        let ds = load_file(file.path(), "Outcome").unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.features(), vec!["Pregnancies", "Glucose", "BMI"]);
        assert_eq!(ds.schema().fields()[2].kind, FieldType::Float);
        assert_eq!(ds.numeric("Glucose").unwrap(), &[148.0, 85.0]);
    }

    #[test]
    fn loads_json_records_in_key_order() {
        let file = write_temp(
            ".json",
            r#"[{"Glucose": 148, "Age": 50, "Outcome": 1}, {"Glucose": 85, "Age": 31, "Outcome": 0}]"#,
        );
        let ds = load_file(file.path(), "Outcome").unwrap();
        assert_eq!(ds.features(), vec!["Glucose", "Age"]);
        assert_eq!(ds.numeric("Age").unwrap(), &[50.0, 31.0]);
    }

    #[test]
    fn loads_parquet_columns() {
        use arrow::array::{Float64Array, Int64Array};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("Glucose", DataType::Int64, false),
            Field::new("BMI", DataType::Float64, true),
            Field::new("Outcome", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![148, 85])),
                Arc::new(Float64Array::from(vec![33.6, 26.6])),
                Arc::new(Int64Array::from(vec![1, 0])),
            ],
        )
        .unwrap();
        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path(), "Outcome").unwrap();
        assert_eq!(ds.features(), vec!["Glucose", "BMI"]);
        assert_eq!(ds.schema().fields()[0].kind, FieldType::Integer);
        assert_eq!(ds.numeric("BMI").unwrap(), &[33.6, 26.6]);
    }

    #[test]
    fn parquet_nan_is_a_missing_measurement() {
        use arrow::array::{Float64Array, Int64Array};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("BMI", DataType::Float64, false),
            Field::new("Outcome", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(vec![33.6, f64::NAN, 23.3])),
                Arc::new(Int64Array::from(vec![1, 0, 1])),
            ],
        )
        .unwrap();
        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let err = load_file(file.path(), "Outcome").unwrap_err();
        assert!(format!("{err:#}").contains("column 'BMI' is numeric but row 1 is empty"));
        assert_eq!(float(f64::INFINITY), Value::Null);
        assert_eq!(float(-1.5), Value::Float(-1.5));
    }

    #[test]
    fn rejects_unknown_extension() {
        let file = write_temp(".xlsx", "");
        let err = load_file(file.path(), "Outcome").unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }

    #[test]
    fn schema_errors_carry_context() {
        let file = write_temp(".csv", "Glucose,Outcome\n148,3\n");
        let err = load_file(file.path(), "Outcome").unwrap_err();
        assert!(format!("{err:#}").contains("non-binary"));
    }
}
