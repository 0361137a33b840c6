use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::error::DatasetError;
use super::model::{
    COL_BOOSTER_CATEGORY, COL_BOOSTER_VERSION, COL_CLASS, COL_FLIGHT_NUMBER, COL_PAYLOAD,
    COL_SITE, Dataset, LaunchRecord, Outcome,
};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a launch records table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one launch per line (pandas `to_csv` output works)
/// * `.json`    – `[{ "Launch Site": ..., "Payload Mass (kg)": ..., ... }, ...]`
/// * `.parquet` – flat columns named as in the CSV header
///
/// Required columns: `Launch Site`, `Payload Mass (kg)`, `class`,
/// `Booster Version Category`.  `Flight Number` and `Booster Version` are
/// picked up when present; everything else is ignored.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(DatasetError::UnsupportedFormat(other.to_string()).into()),
    }
}

/// Validate one row's cells and turn them into a record.
fn build_record(
    row: usize,
    site: String,
    payload: f64,
    class: f64,
    booster_category: String,
    flight_number: Option<u32>,
    booster_version: Option<String>,
) -> Result<LaunchRecord, DatasetError> {
    if !payload.is_finite() {
        return Err(DatasetError::invalid(row, COL_PAYLOAD, payload));
    }
    if payload < 0.0 {
        return Err(DatasetError::NegativePayload { row, value: payload });
    }
    let outcome =
        Outcome::from_class(class).ok_or_else(|| DatasetError::invalid(row, COL_CLASS, class))?;

    Ok(LaunchRecord {
        site,
        payload_mass_kg: payload,
        outcome,
        booster_category,
        flight_number,
        booster_version,
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening CSV")?;
    parse_csv(file)
}

/// Parse CSV text with a header row. Extra columns (e.g. a pandas index) are skipped.
fn parse_csv<R: Read>(input: R) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let site_idx = required_column(&headers, COL_SITE)?;
    let payload_idx = required_column(&headers, COL_PAYLOAD)?;
    let class_idx = required_column(&headers, COL_CLASS)?;
    let category_idx = required_column(&headers, COL_BOOSTER_CATEGORY)?;
    let flight_idx = headers.iter().position(|h| h == COL_FLIGHT_NUMBER);
    let version_idx = headers.iter().position(|h| h == COL_BOOSTER_VERSION);

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let payload = parse_number(cell(&record, payload_idx), row_no, COL_PAYLOAD)?;
        let class = parse_number(cell(&record, class_idx), row_no, COL_CLASS)?;

        let flight_number = match flight_idx.map(|i| cell(&record, i)) {
            None | Some("") => None,
            Some(s) => Some(parse_flight_number(s, row_no)?),
        };
        let booster_version = version_idx
            .map(|i| cell(&record, i))
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        records.push(build_record(
            row_no,
            cell(&record, site_idx).to_string(),
            payload,
            class,
            cell(&record, category_idx).to_string(),
            flight_number,
            booster_version,
        )?);
    }

    Ok(Dataset::from_records(records))
}

fn cell(record: &csv::StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("").trim()
}

fn required_column(headers: &[String], name: &str) -> Result<usize, DatasetError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
}

fn parse_number(s: &str, row: usize, col: &str) -> Result<f64, DatasetError> {
    s.parse::<f64>().map_err(|_| DatasetError::invalid(row, col, s))
}

/// Flight numbers may be written as `12` or `12.0`.
fn parse_flight_number(s: &str, row: usize) -> Result<u32, DatasetError> {
    if let Ok(n) = s.parse::<u32>() {
        return Ok(n);
    }
    match s.parse::<f64>() {
        Ok(f) => flight_number_from_f64(f, row),
        Err(_) => Err(DatasetError::invalid(row, COL_FLIGHT_NUMBER, s)),
    }
}

/// pandas stores the column as float once it holds a NaN, so `7.0` is a valid flight number.
fn flight_number_from_f64(f: f64, row: usize) -> Result<u32, DatasetError> {
    if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 {
        Ok(f as u32)
    } else {
        Err(DatasetError::invalid(row, COL_FLIGHT_NUMBER, f))
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "Flight Number": 1,
///     "Launch Site": "CCAFS LC-40",
///     "class": 0,
///     "Payload Mass (kg)": 0.0,
///     "Booster Version": "F9 v1.0  B0003",
///     "Booster Version Category": "v1.0"
///   },
///   ...
/// ]
/// ```
fn parse_json(text: &str) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let rows = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let site = json_string(obj, COL_SITE, i)?;
        let payload = json_number(obj, COL_PAYLOAD, i)?;
        let class = json_number(obj, COL_CLASS, i)?;
        let category = json_string(obj, COL_BOOSTER_CATEGORY, i)?;

        let flight_number = match obj.get(COL_FLIGHT_NUMBER) {
            None | Some(JsonValue::Null) => None,
            Some(v) => {
                let n = v
                    .as_f64()
                    .ok_or_else(|| DatasetError::invalid(i, COL_FLIGHT_NUMBER, v))?;
                Some(flight_number_from_f64(n, i)?)
            }
        };
        let booster_version = obj
            .get(COL_BOOSTER_VERSION)
            .and_then(|v| v.as_str())
            .map(str::to_string);

        records.push(build_record(
            i,
            site,
            payload,
            class,
            category,
            flight_number,
            booster_version,
        )?);
    }

    Ok(Dataset::from_records(records))
}

fn json_string(obj: &Map<String, JsonValue>, key: &str, row: usize) -> Result<String, DatasetError> {
    match obj.get(key) {
        Some(JsonValue::String(s)) => Ok(s.clone()),
        Some(other) => Err(DatasetError::invalid(row, key, other)),
        None => Err(DatasetError::MissingColumn(key.to_string())),
    }
}

fn json_number(obj: &Map<String, JsonValue>, key: &str, row: usize) -> Result<f64, DatasetError> {
    match obj.get(key) {
        Some(v) => v.as_f64().ok_or_else(|| DatasetError::invalid(row, key, v)),
        None => Err(DatasetError::MissingColumn(key.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of launch records.
///
/// String columns may be `Utf8` or `LargeUtf8`; numeric columns any of
/// `Int32`, `Int64`, `Float32`, `Float64`.  Works with files written by both
/// **Pandas** (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    let mut offset = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let column = |name: &str| -> Result<ArrayRef, DatasetError> {
            schema
                .index_of(name)
                .map(|i| batch.column(i).clone())
                .map_err(|_| DatasetError::MissingColumn(name.to_string()))
        };
        let site_col = column(COL_SITE)?;
        let payload_col = column(COL_PAYLOAD)?;
        let class_col = column(COL_CLASS)?;
        let category_col = column(COL_BOOSTER_CATEGORY)?;
        let flight_col = column(COL_FLIGHT_NUMBER).ok();
        let version_col = column(COL_BOOSTER_VERSION).ok();

        for i in 0..batch.num_rows() {
            let row = offset + i;

            let site = string_at(&site_col, i)
                .ok_or_else(|| invalid_cell(&site_col, i, row, COL_SITE))?;
            let payload = number_at(&payload_col, i)
                .ok_or_else(|| invalid_cell(&payload_col, i, row, COL_PAYLOAD))?;
            let class = number_at(&class_col, i)
                .ok_or_else(|| invalid_cell(&class_col, i, row, COL_CLASS))?;
            let category = string_at(&category_col, i)
                .ok_or_else(|| invalid_cell(&category_col, i, row, COL_BOOSTER_CATEGORY))?;

            let flight_number = match &flight_col {
                Some(col) if !col.is_null(i) => {
                    let n = number_at(col, i)
                        .ok_or_else(|| invalid_cell(col, i, row, COL_FLIGHT_NUMBER))?;
                    Some(flight_number_from_f64(n, row)?)
                }
                _ => None,
            };
            let booster_version = version_col.as_ref().and_then(|col| string_at(col, i));

            records.push(build_record(
                row,
                site,
                payload,
                class,
                category,
                flight_number,
                booster_version,
            )?);
        }
        offset += batch.num_rows();
    }

    if records.is_empty() {
        log::warn!("Parquet file {} contains no rows", path.display());
    }

    Ok(Dataset::from_records(records))
}

// -- Parquet / Arrow helpers --

/// `index` is the position inside the current batch, `row` the position in the file.
fn invalid_cell(col: &ArrayRef, index: usize, row: usize, name: &str) -> DatasetError {
    if col.is_null(index) {
        DatasetError::invalid(row, name, "<null>")
    } else {
        DatasetError::invalid(row, name, format!("{:?}", col.data_type()))
    }
}

/// Read a string cell from a `Utf8` or `LargeUtf8` column.
fn string_at(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => col.as_string_opt::<i32>().map(|a| a.value(row).to_string()),
        DataType::LargeUtf8 => col.as_string_opt::<i64>().map(|a| a.value(row).to_string()),
        _ => None,
    }
}

/// Read a numeric cell as `f64`, whatever the integer/float width.
fn number_at(col: &ArrayRef, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Float64 => col.as_primitive_opt::<Float64Type>().map(|a| a.value(row)),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| a.value(row) as f64),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| a.value(row) as f64),
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| a.value(row) as f64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    const SAMPLE_CSV: &str = "\
,Flight Number,Launch Site,class,Payload Mass (kg),Booster Version,Booster Version Category
0,1,CCAFS LC-40,0,0.0,F9 v1.0  B0003,v1.0
1,2,CCAFS LC-40,0,0.0,F9 v1.0  B0004,v1.0
2,3,CCAFS LC-40,0,525.0,F9 v1.0  B0005,v1.0
3,4,VAFB SLC-4E,1,9600.0,F9 FT B1029.1,FT
";

    fn dataset_error(err: &anyhow::Error) -> &DatasetError {
        err.downcast_ref::<DatasetError>()
            .expect("expected a DatasetError")
    }

    #[test]
    fn test_parse_csv() {
        let ds = parse_csv(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(ds.len(), 4);
        assert_eq!(ds.sites.len(), 2);
        assert_eq!(ds.payload_extent, Some((0.0, 9600.0)));

        let last = &ds.records[3];
        assert_eq!(last.site, "VAFB SLC-4E");
        assert_eq!(last.outcome, Outcome::Success);
        assert_eq!(last.booster_category, "FT");
        assert_eq!(last.flight_number, Some(4));
        assert_eq!(last.booster_version.as_deref(), Some("F9 FT B1029.1"));
    }

    #[test]
    fn test_parse_csv_without_optional_columns() {
        let text = "Launch Site,Payload Mass (kg),class,Booster Version Category\nKSC LC-39A,2490,1,FT\n";
        let ds = parse_csv(text.as_bytes()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].payload_mass_kg, 2490.0);
        assert_eq!(ds.records[0].flight_number, None);
        assert_eq!(ds.records[0].booster_version, None);
    }

    #[test]
    fn test_parse_csv_missing_column() {
        let text = "Launch Site,class,Booster Version Category\nKSC LC-39A,1,FT\n";
        let err = parse_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(
            dataset_error(&err),
            DatasetError::MissingColumn(c) if c == COL_PAYLOAD
        ));
    }

    #[test]
    fn test_parse_csv_rejects_bad_class() {
        let text = "Launch Site,Payload Mass (kg),class,Booster Version Category\nKSC LC-39A,2490,2,FT\n";
        let err = parse_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(
            dataset_error(&err),
            DatasetError::InvalidValue { row: 0, column, .. } if column == COL_CLASS
        ));
    }

    #[test]
    fn test_parse_csv_rejects_negative_payload() {
        let text = "Launch Site,Payload Mass (kg),class,Booster Version Category\nKSC LC-39A,-5,1,FT\n";
        let err = parse_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(
            dataset_error(&err),
            DatasetError::NegativePayload { row: 0, .. }
        ));
    }

    #[test]
    fn test_parse_csv_rejects_non_numeric_payload() {
        let text = "Launch Site,Payload Mass (kg),class,Booster Version Category\nKSC LC-39A,heavy,1,FT\n";
        assert!(parse_csv(text.as_bytes()).is_err());
    }

    #[test]
    fn test_parse_csv_rejects_infinite_payload() {
        let text = "Launch Site,Payload Mass (kg),class,Booster Version Category\nKSC LC-39A,inf,1,FT\n";
        let err = parse_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(
            dataset_error(&err),
            DatasetError::InvalidValue { row: 0, column, .. } if column == COL_PAYLOAD
        ));
    }

    #[test]
    fn test_parse_json() {
        let text = r#"[
            {"Flight Number": 7, "Launch Site": "CCAFS LC-40", "class": 1,
             "Payload Mass (kg)": 2296.0, "Booster Version Category": "v1.1"},
            {"Launch Site": "KSC LC-39A", "class": 0,
             "Payload Mass (kg)": 5300, "Booster Version Category": "FT",
             "Booster Version": "F9 FT B1031.1"}
        ]"#;
        let ds = parse_json(text).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].flight_number, Some(7));
        assert_eq!(ds.records[0].outcome, Outcome::Success);
        assert_eq!(ds.records[1].payload_mass_kg, 5300.0);
        assert_eq!(ds.records[1].outcome, Outcome::Failure);
        assert_eq!(ds.records[1].booster_version.as_deref(), Some("F9 FT B1031.1"));
    }

    #[test]
    fn test_parse_json_missing_key() {
        let text = r#"[{"Launch Site": "KSC LC-39A", "class": 1, "Payload Mass (kg)": 1.0}]"#;
        let err = parse_json(text).unwrap_err();
        assert!(matches!(
            dataset_error(&err),
            DatasetError::MissingColumn(c) if c == COL_BOOSTER_CATEGORY
        ));
    }

    #[test]
    fn test_parse_json_requires_array() {
        assert!(parse_json(r#"{"Launch Site": "x"}"#).is_err());
    }

    #[test]
    fn test_parse_json_float_flight_number() {
        let text = r#"[{"Flight Number": 7.0, "Launch Site": "KSC LC-39A", "class": 1,
                        "Payload Mass (kg)": 2490.0, "Booster Version Category": "FT"}]"#;
        let ds = parse_json(text).unwrap();
        assert_eq!(ds.records[0].flight_number, Some(7));

        let fractional = text.replace("7.0", "7.5");
        let err = parse_json(&fractional).unwrap_err();
        assert!(matches!(
            dataset_error(&err),
            DatasetError::InvalidValue { row: 0, column, .. } if column == COL_FLIGHT_NUMBER
        ));
    }

    #[test]
    fn test_parse_json_rejects_bad_class() {
        let text = r#"[{"Launch Site": "KSC LC-39A", "class": 3,
                        "Payload Mass (kg)": 2490.0, "Booster Version Category": "FT"}]"#;
        let err = parse_json(text).unwrap_err();
        assert!(matches!(
            dataset_error(&err),
            DatasetError::InvalidValue { row: 0, column, .. } if column == COL_CLASS
        ));
    }

    #[test]
    fn test_parse_json_rejects_negative_payload() {
        let text = r#"[
            {"Launch Site": "KSC LC-39A", "class": 1,
             "Payload Mass (kg)": 2490.0, "Booster Version Category": "FT"},
            {"Launch Site": "KSC LC-39A", "class": 1,
             "Payload Mass (kg)": -1.0, "Booster Version Category": "FT"}
        ]"#;
        let err = parse_json(text).unwrap_err();
        assert!(matches!(
            dataset_error(&err),
            DatasetError::NegativePayload { row: 1, .. }
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_file(Path::new("launches.xlsx")).unwrap_err();
        assert!(matches!(
            dataset_error(&err),
            DatasetError::UnsupportedFormat(ext) if ext == "xlsx"
        ));
    }

    #[test]
    fn test_load_csv_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        std::io::Write::write_all(&mut file, SAMPLE_CSV.as_bytes()).unwrap();
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 4);
    }

    #[test]
    fn test_load_parquet_file() {
        let schema = Arc::new(Schema::new(vec![
            Field::new(COL_FLIGHT_NUMBER, DataType::Int64, false),
            Field::new(COL_SITE, DataType::Utf8, false),
            Field::new(COL_CLASS, DataType::Int64, false),
            Field::new(COL_PAYLOAD, DataType::Float64, false),
            Field::new(COL_BOOSTER_CATEGORY, DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![1, 2, 3])),
                Arc::new(StringArray::from(vec!["CCAFS LC-40", "KSC LC-39A", "KSC LC-39A"])),
                Arc::new(Int64Array::from(vec![0, 1, 1])),
                Arc::new(Float64Array::from(vec![0.0, 2490.0, 5300.0])),
                Arc::new(StringArray::from(vec!["v1.0", "FT", "FT"])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.records[0].outcome, Outcome::Failure);
        assert_eq!(ds.records[2].flight_number, Some(3));
        assert_eq!(ds.records[2].booster_version, None);
        assert_eq!(ds.payload_extent, Some((0.0, 5300.0)));
    }

    #[test]
    fn test_load_parquet_missing_column() {
        let schema = Arc::new(Schema::new(vec![Field::new(COL_SITE, DataType::Utf8, false)]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![Arc::new(StringArray::from(vec!["CCAFS LC-40"]))],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(dataset_error(&err), DatasetError::MissingColumn(_)));
    }

    #[test]
    fn test_load_parquet_null_cell_in_later_batch() {
        const ROWS: usize = 3000;
        const BAD_ROW: usize = 2000;

        let schema = Arc::new(Schema::new(vec![
            Field::new(COL_SITE, DataType::Utf8, true),
            Field::new(COL_CLASS, DataType::Int64, false),
            Field::new(COL_PAYLOAD, DataType::Float64, false),
            Field::new(COL_BOOSTER_CATEGORY, DataType::Utf8, false),
        ]));
        let sites: Vec<Option<&str>> = (0..ROWS)
            .map(|i| if i == BAD_ROW { None } else { Some("CCAFS LC-40") })
            .collect();
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(sites)),
                Arc::new(Int64Array::from(vec![1; ROWS])),
                Arc::new(Float64Array::from(vec![500.0; ROWS])),
                Arc::new(StringArray::from(vec!["FT"; ROWS])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(
            dataset_error(&err),
            DatasetError::InvalidValue { row: BAD_ROW, column, value }
                if column == COL_SITE && value == "<null>"
        ));
    }
}
