use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Column names – the Superstore export layout
// ---------------------------------------------------------------------------

pub const ORDER_DATE: &str = "Order Date";
pub const REGION: &str = "Region";
pub const STATE: &str = "State";
pub const CITY: &str = "City";
pub const CATEGORY: &str = "Category";
pub const SUB_CATEGORY: &str = "Sub-Category";
pub const SEGMENT: &str = "Segment";
pub const SALES: &str = "Sales";
pub const PROFIT: &str = "Profit";
pub const QUANTITY: &str = "Quantity";

/// Mandatory columns, in the order they are written on export.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    ORDER_DATE,
    REGION,
    STATE,
    CITY,
    CATEGORY,
    SUB_CATEGORY,
    SEGMENT,
    SALES,
    PROFIT,
    QUANTITY,
];

// ---------------------------------------------------------------------------
// Dimension – a categorical column usable for filtering and grouping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    Region,
    State,
    City,
    Category,
    SubCategory,
    Segment,
}

impl Dimension {
    /// Source column name.
    pub fn column_name(self) -> &'static str {
        match self {
            Dimension::Region => REGION,
            Dimension::State => STATE,
            Dimension::City => CITY,
            Dimension::Category => CATEGORY,
            Dimension::SubCategory => SUB_CATEGORY,
            Dimension::Segment => SEGMENT,
        }
    }

    /// Borrow this dimension's value from a row.
    pub fn value(self, row: &Row) -> &str {
        match self {
            Dimension::Region => &row.region,
            Dimension::State => &row.state,
            Dimension::City => &row.city,
            Dimension::Category => &row.category,
            Dimension::SubCategory => &row.sub_category,
            Dimension::Segment => &row.segment,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

// ---------------------------------------------------------------------------
// Row – one transaction record
// ---------------------------------------------------------------------------

/// A single order line (one row of the source table).
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub order_date: NaiveDate,
    pub region: String,
    pub state: String,
    pub city: String,
    pub category: String,
    pub sub_category: String,
    pub segment: String,
    /// Signed; returns show up as negative sales in some exports.
    pub sales: f64,
    pub profit: f64,
    pub quantity: u32,
    /// Uninterpreted columns (name → raw text), in source column order.
    pub extra: Vec<(String, String)>,
}

impl Row {
    /// Look up a passthrough column by name.
    pub fn extra_value(&self, column: &str) -> Option<&str> {
        self.extra
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset. Never mutated after load.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// All rows, in file order.
    pub rows: Vec<Row>,
    /// Passthrough column names, in source order.
    pub extra_columns: Vec<String>,
    /// Earliest and latest order date, `None` for an empty dataset.
    pub date_span: Option<(NaiveDate, NaiveDate)>,
}

impl Dataset {
    pub fn from_rows(rows: Vec<Row>, extra_columns: Vec<String>) -> Self {
        let date_span = rows.iter().fold(None, |span, row| match span {
            None => Some((row.order_date, row.order_date)),
            Some((lo, hi)) => Some((
                std::cmp::min(lo, row.order_date),
                std::cmp::max(hi, row.order_date),
            )),
        });
        Dataset {
            rows,
            extra_columns,
            date_span,
        }
    }

    /// Sorted distinct values of a dimension across the whole dataset.
    pub fn distinct(&self, dimension: Dimension) -> BTreeSet<String> {
        distinct_values(&self.rows, dimension)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Sorted distinct values of a dimension within `rows`.
pub fn distinct_values(rows: &[Row], dimension: Dimension) -> BTreeSet<String> {
    rows.iter()
        .map(|row| dimension.value(row).to_string())
        .collect()
}


#[cfg(test)]
mod tests {
    use super::fixtures::{date, row};
    use super::*;

    #[test]
    fn date_span_covers_all_rows() {
        let ds = Dataset::from_rows(
            vec![
                row(date(2024, 3, 15), "South", "Furniture", 1.0),
                row(date(2023, 11, 2), "North", "Technology", 2.0),
                row(date(2024, 1, 9), "East", "Furniture", 3.0),
            ],
            Vec::new(),
        );
        assert_eq!(ds.date_span, Some((date(2023, 11, 2), date(2024, 3, 15))));
        assert_eq!(ds.len(), 3);
    }

    #[test]
    fn empty_dataset_has_no_span() {
        let ds = Dataset::from_rows(Vec::new(), Vec::new());
        assert!(ds.is_empty());
        assert_eq!(ds.date_span, None);
    }

    #[test]
    fn distinct_is_sorted_and_deduplicated() {
        let ds = Dataset::from_rows(
            vec![
                row(date(2024, 1, 1), "West", "A", 1.0),
                row(date(2024, 1, 2), "East", "A", 1.0),
                row(date(2024, 1, 3), "West", "A", 1.0),
            ],
            Vec::new(),
        );
        let regions: Vec<_> = ds.distinct(Dimension::Region).into_iter().collect();
        assert_eq!(regions, vec!["East", "West"]);
    }

    #[test]
    fn extra_value_lookup() {
        let mut r = row(date(2024, 1, 1), "West", "A", 1.0);
        r.extra.push(("Order ID".into(), "CA-1".into()));
        assert_eq!(r.extra_value("Order ID"), Some("CA-1"));
        assert_eq!(r.extra_value("Ship Mode"), None);
    }
}
