use std::borrow::Cow;
use std::fs::File;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int32Type, Int64Type, UInt32Type,
};
use arrow::util::display::array_value_to_string;
use chrono::{NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{
    Dataset, Row, CATEGORY, CITY, ORDER_DATE, PROFIT, QUANTITY, REGION, REQUIRED_COLUMNS, SALES,
    SEGMENT, STATE, SUB_CATEGORY,
};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – comma-delimited with a header row (UTF-8 or Latin-1)
/// * `.json`         – `[{ "Order Date": "...", "Region": "...", ... }, ...]`
/// * `.parquet`      – flat table, dates as `Date32`/`Date64` or text
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" | "txt" => parse_csv(&read_bytes(path)?),
        "json" => parse_json(&read_bytes(path)?),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedExtension {
            extension: other.to_string(),
        }),
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, LoadError> {
    std::fs::read(path).map_err(|source| LoadError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse day-first dates (`31/12/2024`, `31-12-2024`) and unambiguous ISO
/// dates or timestamps (`2024-12-31`, `2024-12-31T00:00:00`).
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    for fmt in ["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date);
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(ts.date());
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Cells and column layout (shared by every format)
// ---------------------------------------------------------------------------

/// One source value before it is typed into a [`Row`] field.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    Null,
}

impl Cell {
    fn into_text(self) -> Option<String> {
        match self {
            Cell::Text(s) => Some(s),
            Cell::Integer(i) => Some(i.to_string()),
            Cell::Float(v) => Some(v.to_string()),
            Cell::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            Cell::Null => None,
        }
    }
}

/// Header positions of the mandatory columns (in [`REQUIRED_COLUMNS`] order)
/// plus every passthrough column.
#[derive(Debug)]
struct ColumnLayout {
    required: [usize; REQUIRED_COLUMNS.len()],
    extra: Vec<(usize, String)>,
}

impl ColumnLayout {
    fn resolve<S: AsRef<str>>(headers: &[S]) -> Result<Self, LoadError> {
        let mut required = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, column) in required.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h.as_ref().trim() == column)
                .ok_or(LoadError::MissingColumn { column })?;
        }
        let extra = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| !required.contains(i))
            .map(|(i, h)| (i, h.as_ref().trim().to_string()))
            .collect();
        Ok(ColumnLayout { required, extra })
    }

    fn extra_columns(&self) -> Vec<String> {
        self.extra.iter().map(|(_, name)| name.clone()).collect()
    }

    /// Type one record. `row` is the 1-based data row used in error messages.
    fn build_row(&self, row: usize, mut cells: Vec<Cell>) -> Result<Row, LoadError> {
        let mut take = |slot: usize| {
            cells
                .get_mut(self.required[slot])
                .map(|c| std::mem::replace(c, Cell::Null))
                .unwrap_or(Cell::Null)
        };

        let order_date = date_cell(take(0), row)?;
        let region = text_cell(take(1), row, REGION)?;
        let state = text_cell(take(2), row, STATE)?;
        let city = text_cell(take(3), row, CITY)?;
        let category = text_cell(take(4), row, CATEGORY)?;
        let sub_category = text_cell(take(5), row, SUB_CATEGORY)?;
        let segment = text_cell(take(6), row, SEGMENT)?;
        let sales = float_cell(take(7), row, SALES)?;
        let profit = float_cell(take(8), row, PROFIT)?;
        let quantity = quantity_cell(take(9), row)?;

        let extra = self
            .extra
            .iter()
            .map(|(idx, name)| {
                let value = cells
                    .get_mut(*idx)
                    .map(|c| std::mem::replace(c, Cell::Null))
                    .and_then(Cell::into_text)
                    .unwrap_or_default();
                (name.clone(), value)
            })
            .collect();

        Ok(Row {
            order_date,
            region,
            state,
            city,
            category,
            sub_category,
            segment,
            sales,
            profit,
            quantity,
            extra,
        })
    }
}

fn text_cell(cell: Cell, row: usize, column: &'static str) -> Result<String, LoadError> {
    cell.into_text()
        .ok_or(LoadError::MissingValue { row, column })
}

fn date_cell(cell: Cell, row: usize) -> Result<NaiveDate, LoadError> {
    match cell {
        Cell::Date(d) => Ok(d),
        Cell::Null => Err(LoadError::MissingValue {
            row,
            column: ORDER_DATE,
        }),
        other => {
            let text = other.into_text().unwrap_or_default();
            parse_date(&text).ok_or(LoadError::InvalidDate {
                row,
                column: ORDER_DATE,
                value: text,
            })
        }
    }
}

fn float_cell(cell: Cell, row: usize, column: &'static str) -> Result<f64, LoadError> {
    let value = match cell {
        Cell::Float(v) => Some(v),
        Cell::Integer(i) => Some(i as f64),
        Cell::Null => return Err(LoadError::MissingValue { row, column }),
        Cell::Text(ref s) => s.trim().parse::<f64>().ok(),
        Cell::Date(_) => None,
    };
    match value {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(LoadError::InvalidNumber {
            row,
            column,
            value: cell.into_text().unwrap_or_default(),
        }),
    }
}

fn quantity_cell(cell: Cell, row: usize) -> Result<u32, LoadError> {
    let whole = |v: f64| {
        (v.fract() == 0.0 && v >= 0.0 && v <= f64::from(u32::MAX)).then_some(v as u32)
    };
    let value = match cell {
        Cell::Integer(i) => u32::try_from(i).ok(),
        Cell::Float(v) => whole(v),
        Cell::Null => {
            return Err(LoadError::MissingValue {
                row,
                column: QUANTITY,
            })
        }
        Cell::Text(ref s) => {
            let s = s.trim();
            s.parse::<u32>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole))
        }
        Cell::Date(_) => None,
    };
    value.ok_or_else(|| LoadError::InvalidNumber {
        row,
        column: QUANTITY,
        value: cell.into_text().unwrap_or_default(),
    })
}

/// Strip a UTF-8 BOM; fall back to ISO-8859-1 for bytes that are not UTF-8.
fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            log::warn!("Input is not valid UTF-8, decoding as ISO-8859-1");
            Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())
        }
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse delimited text with a header row.  Also reads back the output of
/// [`crate::data::export::ToCsv`] for row sequences.
pub fn parse_csv(bytes: &[u8]) -> Result<Dataset, LoadError> {
    let text = decode_text(bytes);
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let layout = ColumnLayout::resolve(&headers)?;

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let cells = record.iter().map(|v| Cell::Text(v.to_string())).collect();
        rows.push(layout.build_row(i + 1, cells)?);
    }

    Ok(Dataset::from_rows(rows, layout.extra_columns()))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`). The column set is
/// taken from the first record, in key order.
pub fn parse_json(bytes: &[u8]) -> Result<Dataset, LoadError> {
    let text = decode_text(bytes);
    let root: JsonValue = serde_json::from_str(&text)?;
    let records = root.as_array().ok_or_else(|| LoadError::JsonShape {
        row: 0,
        reason: "expected a top-level array of records".to_string(),
    })?;

    let Some(first) = records.first() else {
        return Ok(Dataset::default());
    };
    let headers: Vec<String> = first
        .as_object()
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default();
    let layout = ColumnLayout::resolve(&headers)?;

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or_else(|| LoadError::JsonShape {
            row: i + 1,
            reason: "record is not a JSON object".to_string(),
        })?;
        let cells = headers.iter().map(|h| json_cell(obj.get(h))).collect();
        rows.push(layout.build_row(i + 1, cells)?);
    }

    Ok(Dataset::from_rows(rows, layout.extra_columns()))
}

fn json_cell(val: Option<&JsonValue>) -> Cell {
    match val {
        None | Some(JsonValue::Null) => Cell::Null,
        Some(JsonValue::String(s)) => Cell::Text(s.clone()),
        Some(JsonValue::Number(n)) => {
            if let Some(i) = n.as_i64() {
                Cell::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::Text(n.to_string())
            }
        }
        Some(other) => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet table, e.g. written by `df.to_parquet()`.
fn load_parquet(path: &Path) -> Result<Dataset, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::FileRead {
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
    let layout = ColumnLayout::resolve(&headers)?;
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch?;
        for row in 0..batch.num_rows() {
            let cells = batch.columns().iter().map(|col| arrow_cell(col, row)).collect();
            rows.push(layout.build_row(rows.len() + 1, cells)?);
        }
    }

    Ok(Dataset::from_rows(rows, layout.extra_columns()))
}

/// Extract a single value from an Arrow column at a given row.
fn arrow_cell(col: &ArrayRef, row: usize) -> Cell {
    if col.is_null(row) {
        return Cell::Null;
    }
    match col.data_type() {
        DataType::Utf8 => Cell::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Cell::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => Cell::Integer(col.as_primitive::<Int32Type>().value(row).into()),
        DataType::Int64 => Cell::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt32 => Cell::Integer(col.as_primitive::<UInt32Type>().value(row).into()),
        DataType::Float32 => Cell::Float(col.as_primitive::<Float32Type>().value(row).into()),
        DataType::Float64 => Cell::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Date32 => col
            .as_primitive::<Date32Type>()
            .value_as_date(row)
            .map_or(Cell::Null, Cell::Date),
        DataType::Date64 => col
            .as_primitive::<Date64Type>()
            .value_as_date(row)
            .map_or(Cell::Null, Cell::Date),
        // Timestamps and anything exotic go through the display formatter.
        _ => array_value_to_string(col, row).map_or(Cell::Null, Cell::Text),
    }
}
