//! Derived views over a filtered row sequence.
//!
//! Every function here is a pure sum-reduction over `sales`. Views are
//! rebuilt from scratch on each filter change and never patched in place.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use super::model::{Dimension, Row, SALES, SUB_CATEGORY};

/// Full English month names, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Key column written for monthly views.
pub const MONTH_YEAR: &str = "month_year";

// ---------------------------------------------------------------------------
// AggregateView
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateEntry {
    /// One component per key column.
    pub key: Vec<String>,
    pub value: f64,
}

/// Grouping key → summed measure, in presentation order.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateView {
    pub key_columns: Vec<String>,
    pub measure: String,
    pub entries: Vec<AggregateEntry>,
}

impl AggregateView {
    pub fn new(key_columns: Vec<String>, measure: impl Into<String>) -> Self {
        AggregateView {
            key_columns,
            measure: measure.into(),
            entries: Vec::new(),
        }
    }

    /// Value for an exact key, if that group exists.
    pub fn get(&self, key: &[&str]) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.key.iter().map(String::as_str).eq(key.iter().copied()))
            .map(|e| e.value)
    }

    /// Sum across all groups.
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.value).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Sum sales per distinct combination of `dimensions`, ascending by key.
pub fn aggregate_sales(rows: &[Row], dimensions: &[Dimension]) -> AggregateView {
    let mut sums: BTreeMap<Vec<String>, f64> = BTreeMap::new();
    for row in rows {
        let key = dimensions
            .iter()
            .map(|d| d.value(row).to_string())
            .collect();
        *sums.entry(key).or_insert(0.0) += row.sales;
    }

    let key_columns = dimensions
        .iter()
        .map(|d| d.column_name().to_string())
        .collect();
    let mut view = AggregateView::new(key_columns, SALES);
    view.entries = sums
        .into_iter()
        .map(|(key, value)| AggregateEntry { key, value })
        .collect();
    view
}

pub fn aggregate_by_category(rows: &[Row]) -> AggregateView {
    aggregate_sales(rows, &[Dimension::Category])
}

pub fn aggregate_by_region(rows: &[Row]) -> AggregateView {
    aggregate_sales(rows, &[Dimension::Region])
}

pub fn aggregate_by_segment(rows: &[Row]) -> AggregateView {
    aggregate_sales(rows, &[Dimension::Segment])
}

/// Region → category → sub-category, the treemap path.
pub fn aggregate_hierarchy(rows: &[Row]) -> AggregateView {
    aggregate_sales(
        rows,
        &[Dimension::Region, Dimension::Category, Dimension::SubCategory],
    )
}

// ---------------------------------------------------------------------------
// Monthly views
// ---------------------------------------------------------------------------

/// A calendar month as `year * 12 + (month - 1)`, so integer order is
/// chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey(i32);

impl MonthKey {
    pub fn from_date(date: NaiveDate) -> Self {
        MonthKey(date.year() * 12 + date.month0() as i32)
    }

    pub fn year(self) -> i32 {
        self.0.div_euclid(12)
    }

    /// 1-based month number.
    pub fn month(self) -> u32 {
        self.0.rem_euclid(12) as u32 + 1
    }

    /// Display label, e.g. `2024-Jan`.
    pub fn label(self) -> String {
        let name = MONTH_NAMES[self.0.rem_euclid(12) as usize];
        format!("{}-{}", self.year(), &name[..3])
    }
}

/// Sales per calendar month, in chronological order.
pub fn aggregate_by_month(rows: &[Row]) -> AggregateView {
    let mut sums: BTreeMap<MonthKey, f64> = BTreeMap::new();
    for row in rows {
        *sums.entry(MonthKey::from_date(row.order_date)).or_insert(0.0) += row.sales;
    }

    let mut view = AggregateView::new(vec![MONTH_YEAR.to_string()], SALES);
    view.entries = sums
        .into_iter()
        .map(|(month, value)| AggregateEntry {
            key: vec![month.label()],
            value,
        })
        .collect();
    view
}

// ---------------------------------------------------------------------------
// PivotTable
// ---------------------------------------------------------------------------

/// Two-dimensional aggregate. `None` cells mean no rows for that pair,
/// which is distinct from a zero sum.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    /// Name of the row dimension (first CSV column).
    pub row_header: String,
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    /// `cells[r][c]` for `row_labels[r]` × `column_labels[c]`.
    pub cells: Vec<Vec<Option<f64>>>,
}

impl PivotTable {
    pub fn get(&self, row_label: &str, column_label: &str) -> Option<f64> {
        let r = self.row_labels.iter().position(|l| l == row_label)?;
        let c = self.column_labels.iter().position(|l| l == column_label)?;
        self.cells[r][c]
    }

    pub fn is_empty(&self) -> bool {
        self.row_labels.is_empty()
    }
}

/// Sales by sub-category (rows) and calendar month name (columns).
///
/// Months from different years share a column. Columns run January to
/// December and only months that occur are present.
pub fn pivot_sub_category_by_month(rows: &[Row]) -> PivotTable {
    let mut sums: BTreeMap<(&str, u32), f64> = BTreeMap::new();
    for row in rows {
        *sums
            .entry((row.sub_category.as_str(), row.order_date.month0()))
            .or_insert(0.0) += row.sales;
    }

    let mut row_labels: Vec<&str> = sums.keys().map(|(sub, _)| *sub).collect();
    row_labels.dedup();
    let mut months: Vec<u32> = sums.keys().map(|(_, m)| *m).collect();
    months.sort_unstable();
    months.dedup();

    let cells = row_labels
        .iter()
        .map(|sub| {
            months
                .iter()
                .map(|m| sums.get(&(*sub, *m)).copied())
                .collect()
        })
        .collect();

    PivotTable {
        row_header: SUB_CATEGORY.to_string(),
        row_labels: row_labels.into_iter().map(str::to_string).collect(),
        column_labels: months
            .into_iter()
            .map(|m| MONTH_NAMES[m as usize].to_string())
            .collect(),
        cells,
    }
}

// ---------------------------------------------------------------------------
// Row-level views
// ---------------------------------------------------------------------------

/// One marker of the sales-vs-profit scatter, sized by quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    pub sales: f64,
    pub profit: f64,
    pub quantity: u32,
}

pub fn scatter_points(rows: &[Row]) -> Vec<ScatterPoint> {
    rows.iter()
        .map(|r| ScatterPoint {
            sales: r.sales,
            profit: r.profit,
            quantity: r.quantity,
        })
        .collect()
}

/// The first `n` rows in original order; fewer if the input is shorter.
pub fn sample_rows(rows: &[Row], n: usize) -> Vec<Row> {
    rows.iter().take(n).cloned().collect()
}

// ---------------------------------------------------------------------------
// DashboardViews – everything derived from one filter evaluation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardViews {
    pub by_category: AggregateView,
    pub by_region: AggregateView,
    pub by_segment: AggregateView,
    pub by_month: AggregateView,
    pub hierarchy: AggregateView,
    pub sub_category_by_month: PivotTable,
    pub scatter: Vec<ScatterPoint>,
    pub sample: Vec<Row>,
}

impl DashboardViews {
    pub fn compute(rows: &[Row], sample_size: usize) -> Self {
        DashboardViews {
            by_category: aggregate_by_category(rows),
            by_region: aggregate_by_region(rows),
            by_segment: aggregate_by_segment(rows),
            by_month: aggregate_by_month(rows),
            hierarchy: aggregate_hierarchy(rows),
            sub_category_by_month: pivot_sub_category_by_month(rows),
            scatter: scatter_points(rows),
            sample: sample_rows(rows, sample_size),
        }
    }
}

impl Default for DashboardViews {
    fn default() -> Self {
        Self::compute(&[], 0)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::model::fixtures::{date, row};

    #[test]
    fn region_example_conserves_total() {
        let rows = vec![
            row(date(2024, 3, 1), "North", "Furniture", 100.0),
            row(date(2024, 3, 15), "South", "Furniture", 50.0),
        ];
        let view = aggregate_by_region(&rows);
        assert_eq!(view.get(&["North"]), Some(100.0));
        assert_eq!(view.get(&["South"]), Some(50.0));
        assert_eq!(view.len(), 2);
        assert_eq!(view.total(), 150.0);
        assert_eq!(view.key_columns, vec!["Region"]);
        assert_eq!(view.measure, "Sales");
    }

    #[test]
    fn absent_category_has_no_entry() {
        let rows = vec![row(date(2024, 3, 1), "North", "Furniture", 0.0)];
        let view = aggregate_by_category(&rows);
        assert_eq!(view.get(&["Furniture"]), Some(0.0));
        assert_eq!(view.get(&["Technology"]), None);
    }

    #[test]
    fn empty_input_gives_empty_views() {
        let views = DashboardViews::compute(&[], 5);
        assert!(views.by_category.is_empty());
        assert!(views.by_month.is_empty());
        assert!(views.hierarchy.is_empty());
        assert!(views.sub_category_by_month.is_empty());
        assert!(views.scatter.is_empty());
        assert!(views.sample.is_empty());
    }

    #[test]
    fn months_are_chronological_across_year_boundary() {
        let rows = vec![
            row(date(2025, 1, 3), "North", "A", 1.0),
            row(date(2024, 12, 30), "North", "A", 2.0),
            row(date(2024, 2, 1), "North", "A", 4.0),
            row(date(2024, 12, 1), "North", "A", 8.0),
        ];
        let view = aggregate_by_month(&rows);
        let labels: Vec<&str> = view.entries.iter().map(|e| e.key[0].as_str()).collect();
        assert_eq!(labels, vec!["2024-Feb", "2024-Dec", "2025-Jan"]);
        assert_eq!(view.get(&["2024-Dec"]), Some(10.0));
        assert_eq!(view.key_columns, vec![MONTH_YEAR]);
    }

    #[test]
    fn month_key_round_trips_components() {
        let key = MonthKey::from_date(date(2023, 11, 17));
        assert_eq!(key.year(), 2023);
        assert_eq!(key.month(), 11);
        assert_eq!(key.label(), "2023-Nov");
        assert!(MonthKey::from_date(date(2023, 12, 31)) < MonthKey::from_date(date(2024, 1, 1)));
    }

    #[test]
    fn hierarchy_keys_are_three_levels() {
        let rows = vec![
            row(date(2024, 1, 1), "West", "Furniture", 5.0),
            row(date(2024, 1, 2), "West", "Furniture", 7.0),
            row(date(2024, 1, 3), "East", "Technology", 1.0),
        ];
        let view = aggregate_hierarchy(&rows);
        assert_eq!(view.key_columns, vec!["Region", "Category", "Sub-Category"]);
        assert_eq!(view.get(&["West", "Furniture", "Furniture Sub"]), Some(12.0));
        assert_eq!(view.entries[0].key[0], "East");
    }

    #[test]
    fn pivot_marks_missing_pairs_as_no_data() {
        let mut zero = row(date(2024, 3, 9), "North", "Chairs", 0.0);
        zero.sub_category = "Chairs".into();
        let mut a = row(date(2024, 1, 5), "North", "Chairs", 10.0);
        a.sub_category = "Chairs".into();
        let mut b = row(date(2023, 1, 20), "North", "Chairs", 5.0);
        b.sub_category = "Chairs".into();
        let mut c = row(date(2024, 3, 2), "North", "Phones", 7.0);
        c.sub_category = "Phones".into();

        let pivot = pivot_sub_category_by_month(&[c, a, zero, b]);
        assert_eq!(pivot.row_header, "Sub-Category");
        assert_eq!(pivot.row_labels, vec!["Chairs", "Phones"]);
        assert_eq!(pivot.column_labels, vec!["January", "March"]);
        // January spans both years.
        assert_eq!(pivot.get("Chairs", "January"), Some(15.0));
        assert_eq!(pivot.get("Chairs", "March"), Some(0.0));
        assert_eq!(pivot.get("Phones", "January"), None);
        assert_eq!(pivot.get("Phones", "March"), Some(7.0));
    }

    #[test]
    fn sample_is_a_prefix() {
        let rows: Vec<Row> = (1..=3)
            .map(|d| row(date(2024, 1, d), "North", "A", d as f64))
            .collect();
        assert_eq!(sample_rows(&rows, 5), rows);
        assert_eq!(sample_rows(&rows, 2), rows[..2].to_vec());
        assert!(sample_rows(&rows, 0).is_empty());
    }

    #[test]
    fn scatter_mirrors_rows() {
        let mut r = row(date(2024, 1, 1), "North", "A", 12.0);
        r.quantity = 3;
        let points = scatter_points(&[r]);
        assert_eq!(
            points,
            vec![ScatterPoint {
                sales: 12.0,
                profit: 1.2,
                quantity: 3
            }]
        );
    }

    proptest! {
        #[test]
        fn grouping_conserves_total_sales(
            items in prop::collection::vec(
                (prop::sample::select(vec!["Furniture", "Technology", "Office Supplies"]), -500i32..5000),
                0..50,
            )
        ) {
            // Integral cents keep float sums exact regardless of order.
            let rows: Vec<Row> = items
                .iter()
                .map(|(cat, cents)| row(date(2024, 1, 1), "North", cat, f64::from(*cents) / 4.0))
                .collect();
            let total: f64 = rows.iter().map(|r| r.sales).sum();
            prop_assert_eq!(aggregate_by_category(&rows).total(), total);
            prop_assert_eq!(aggregate_by_region(&rows).total(), total);
            prop_assert_eq!(aggregate_by_month(&rows).total(), total);
        }
    }
}
