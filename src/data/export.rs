use std::path::Path;

use super::aggregate::{AggregateEntry, AggregateView, PivotTable};
use super::error::{ExportError, LoadError};
use super::model::{Row, REQUIRED_COLUMNS};

/// MIME type attached to every download.
pub const CSV_CONTENT_TYPE: &str = "text/csv";

// ---------------------------------------------------------------------------
// ToCsv – one serialiser per view shape
// ---------------------------------------------------------------------------

/// UTF-8 CSV with a header row and minimal quoting (only fields containing
/// the delimiter, a quote or a line break are quoted).
pub trait ToCsv {
    fn to_csv(&self) -> Result<Vec<u8>, ExportError>;
}

fn writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new())
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, ExportError> {
    wtr.into_inner()
        .map_err(|e| ExportError::Flush(e.into_error()))
}

/// Header follows the first row: mandatory columns, then its passthrough
/// columns. Rows with the same passthrough layout are written by position,
/// any other row is aligned to the header by column name.
impl ToCsv for [Row] {
    fn to_csv(&self) -> Result<Vec<u8>, ExportError> {
        let extra: Vec<&str> = self
            .first()
            .map(|r| r.extra.iter().map(|(name, _)| name.as_str()).collect())
            .unwrap_or_default();

        let mut wtr = writer();
        wtr.write_record(REQUIRED_COLUMNS.iter().copied().chain(extra.iter().copied()))?;
        for row in self {
            let mut record = vec![
                row.order_date.format("%Y-%m-%d").to_string(),
                row.region.clone(),
                row.state.clone(),
                row.city.clone(),
                row.category.clone(),
                row.sub_category.clone(),
                row.segment.clone(),
                row.sales.to_string(),
                row.profit.to_string(),
                row.quantity.to_string(),
            ];
            let same_layout = row.extra.len() == extra.len()
                && row.extra.iter().zip(&extra).all(|((name, _), header)| name == header);
            if same_layout {
                // Positional, so repeated header names keep their own values.
                record.extend(row.extra.iter().map(|(_, value)| value.clone()));
            } else {
                record.extend(
                    extra
                        .iter()
                        .map(|name| row.extra_value(name).unwrap_or_default().to_string()),
                );
            }
            wtr.write_record(&record)?;
        }
        finish(wtr)
    }
}

impl ToCsv for Vec<Row> {
    fn to_csv(&self) -> Result<Vec<u8>, ExportError> {
        self.as_slice().to_csv()
    }
}

impl ToCsv for AggregateView {
    fn to_csv(&self) -> Result<Vec<u8>, ExportError> {
        let mut wtr = writer();
        wtr.write_record(
            self.key_columns
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(self.measure.as_str())),
        )?;
        for entry in &self.entries {
            let value = entry.value.to_string();
            wtr.write_record(
                entry
                    .key
                    .iter()
                    .map(String::as_str)
                    .chain(std::iter::once(value.as_str())),
            )?;
        }
        finish(wtr)
    }
}

/// Empty cells stand for "no data".
impl ToCsv for PivotTable {
    fn to_csv(&self) -> Result<Vec<u8>, ExportError> {
        let mut wtr = writer();
        wtr.write_record(
            std::iter::once(self.row_header.as_str())
                .chain(self.column_labels.iter().map(String::as_str)),
        )?;
        for (label, cells) in self.row_labels.iter().zip(&self.cells) {
            let mut record = vec![label.clone()];
            record.extend(cells.iter().map(|c| c.map(|v| v.to_string()).unwrap_or_default()));
            wtr.write_record(&record)?;
        }
        finish(wtr)
    }
}

// ---------------------------------------------------------------------------
// Reading views back
// ---------------------------------------------------------------------------

impl AggregateView {
    /// Parse the output of [`ToCsv`] for a view: every column but the last
    /// is a key column, the last is the measure.
    pub fn from_csv(bytes: &[u8]) -> Result<Self, LoadError> {
        let mut reader = csv::Reader::from_reader(bytes);
        let mut headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let measure = headers.pop().ok_or(LoadError::MissingColumn { column: "measure" })?;

        let mut view = AggregateView::new(headers, measure);
        for (i, result) in reader.records().enumerate() {
            let record = result?;
            let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
            let raw = fields.pop().unwrap_or_default();
            let value = raw.trim().parse::<f64>().map_err(|_| LoadError::InvalidNumber {
                row: i + 1,
                column: "measure",
                value: raw.clone(),
            })?;
            view.entries.push(AggregateEntry { key: fields, value });
        }
        Ok(view)
    }
}

// ---------------------------------------------------------------------------
// Download – a named CSV payload for the presentation layer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl Download {
    /// Serialise `data` under the caller-supplied file name.
    pub fn csv<T: ToCsv + ?Sized>(file_name: impl Into<String>, data: &T) -> Result<Self, ExportError> {
        Ok(Download {
            file_name: file_name.into(),
            content_type: CSV_CONTENT_TYPE,
            bytes: data.to_csv()?,
        })
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, &self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::aggregate::{aggregate_by_month, aggregate_by_region, pivot_sub_category_by_month};
    use crate::data::loader::parse_csv;
    use crate::data::model::fixtures::{date, row};

    #[test]
    fn rows_round_trip_with_escaping() {
        let mut tricky = row(date(2024, 3, 1), "North", "Office, Supplies", 100.25);
        tricky.city = "Coeur d'Alene \"East\"".into();
        tricky.sub_category = "Line\nBreak".into();
        tricky.extra.push(("Customer Name".into(), "Smith, \"Jo\"".into()));
        let mut plain = row(date(2024, 12, 31), "South", "Furniture", -3.5);
        plain.extra.push(("Customer Name".into(), "Lee".into()));
        let rows = vec![tricky, plain];

        let bytes = rows.to_csv().unwrap();
        let parsed = parse_csv(&bytes).unwrap();
        assert_eq!(parsed.rows, rows);
        assert_eq!(parsed.extra_columns, vec!["Customer Name"]);
    }

    #[test]
    fn repeated_passthrough_headers_keep_both_values() {
        let text = "Order Date,Region,State,City,Category,Sub-Category,Segment,Sales,Profit,Quantity,Note,Note\n\
                    01/03/2024,North,S,C,Furniture,Chairs,Consumer,100,10,1,first,second\n";
        let ds = parse_csv(text.as_bytes()).unwrap();
        assert_eq!(
            ds.rows[0].extra,
            vec![
                ("Note".to_string(), "first".to_string()),
                ("Note".to_string(), "second".to_string())
            ]
        );

        let back = parse_csv(&ds.rows.to_csv().unwrap()).unwrap();
        assert_eq!(back.rows, ds.rows);
        assert_eq!(back.extra_columns, vec!["Note", "Note"]);
    }

    #[test]
    fn rows_with_other_layout_align_by_name() {
        let mut first = row(date(2024, 3, 1), "North", "A", 1.0);
        first.extra = vec![("Ship Mode".into(), "First".into()), ("Note".into(), "x".into())];
        let mut second = row(date(2024, 3, 2), "South", "A", 2.0);
        second.extra = vec![("Note".into(), "y".into())];

        let back = parse_csv(&[first, second].to_csv().unwrap()).unwrap();
        assert_eq!(back.rows[1].extra_value("Ship Mode"), Some(""));
        assert_eq!(back.rows[1].extra_value("Note"), Some("y"));
    }

    #[test]
    fn quoting_is_minimal() {
        let rows = vec![row(date(2024, 3, 1), "North", "Tech, Gadgets", 1.0)];
        let text = String::from_utf8(rows.to_csv().unwrap()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Order Date,Region,State,City,Category,Sub-Category,Segment,Sales,Profit,Quantity")
        );
        assert_eq!(
            lines.next(),
            Some("2024-03-01,North,North State,North City,\"Tech, Gadgets\",\"Tech, Gadgets Sub\",Consumer,1,0.1,1")
        );
    }

    #[test]
    fn empty_rows_still_have_a_header() {
        let rows: Vec<Row> = Vec::new();
        let parsed = parse_csv(&rows.to_csv().unwrap()).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn view_round_trips() {
        let rows = vec![
            row(date(2024, 3, 1), "North, Upper", "A", 100.0),
            row(date(2024, 3, 15), "South \"Deep\"", "A", 50.5),
        ];
        let view = aggregate_by_region(&rows);
        let bytes = view.to_csv().unwrap();
        assert!(bytes.starts_with(b"Region,Sales\n"));
        assert_eq!(AggregateView::from_csv(&bytes).unwrap(), view);
    }

    #[test]
    fn monthly_view_keeps_order_in_csv() {
        let rows = vec![
            row(date(2025, 1, 3), "North", "A", 1.0),
            row(date(2024, 12, 30), "North", "A", 2.0),
        ];
        let text = String::from_utf8(aggregate_by_month(&rows).to_csv().unwrap()).unwrap();
        assert_eq!(text, "month_year,Sales\n2024-Dec,2\n2025-Jan,1\n");
    }

    #[test]
    fn pivot_writes_blank_for_no_data() {
        let mut a = row(date(2024, 1, 5), "North", "X", 10.0);
        a.sub_category = "Chairs".into();
        let mut b = row(date(2024, 2, 5), "North", "X", 0.0);
        b.sub_category = "Phones".into();
        let text = String::from_utf8(pivot_sub_category_by_month(&[a, b]).to_csv().unwrap()).unwrap();
        assert_eq!(text, "Sub-Category,January,February\nChairs,10,\nPhones,,0\n");
    }

    #[test]
    fn download_carries_name_and_type() {
        let view = aggregate_by_region(&[row(date(2024, 3, 1), "North", "A", 1.0)]);
        let download = Download::csv("Region.csv", &view).unwrap();
        assert_eq!(download.file_name, "Region.csv");
        assert_eq!(download.content_type, "text/csv");
        assert_eq!(download.bytes, b"Region,Sales\nNorth,1\n");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(&download.file_name);
        download.save_to(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), download.bytes);
    }

    fn text_field() -> impl Strategy<Value = String> {
        "[a-zA-Z ,\"'\r\n]{0,12}"
    }

    proptest! {
        #[test]
        fn rows_round_trip_arbitrary_text(
            fields in prop::collection::vec(text_field(), 6),
            notes in (text_field(), text_field()),
            sales in -1_000.0f64..1_000.0,
        ) {
            let mut r = row(date(2024, 5, 1), &fields[0], &fields[1], sales);
            r.state = fields[2].clone();
            r.city = fields[3].clone();
            r.sub_category = fields[4].clone();
            r.segment = fields[5].clone();
            r.extra = vec![("Note".to_string(), notes.0), ("Note".to_string(), notes.1)];
            let rows = vec![r.clone(), r];

            let parsed = parse_csv(&rows.to_csv().unwrap()).unwrap();
            prop_assert_eq!(parsed.rows, rows);
        }
    }
}
