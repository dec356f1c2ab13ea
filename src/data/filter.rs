use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{Dataset, Dimension, Row};

// ---------------------------------------------------------------------------
// Filter predicate: date window plus per-dimension selections
// ---------------------------------------------------------------------------

/// The user's current selection.
///
/// Date bounds are inclusive. For each categorical set an empty set means
/// "no filter" (show all); a populated set keeps exactly those values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub regions: BTreeSet<String>,
    pub states: BTreeSet<String>,
    pub cities: BTreeSet<String>,
}

impl FilterCriteria {
    /// A date window with no categorical restriction.
    pub fn new(date_from: NaiveDate, date_to: NaiveDate) -> Self {
        FilterCriteria {
            date_from,
            date_to,
            regions: BTreeSet::new(),
            states: BTreeSet::new(),
            cities: BTreeSet::new(),
        }
    }

    /// Criteria spanning the whole dataset, or `None` if it has no rows.
    pub fn for_dataset(dataset: &Dataset) -> Option<Self> {
        dataset.date_span.map(|(from, to)| Self::new(from, to))
    }

    /// Selection set for a filterable dimension.
    pub fn selection(&self, dimension: Dimension) -> Option<&BTreeSet<String>> {
        match dimension {
            Dimension::Region => Some(&self.regions),
            Dimension::State => Some(&self.states),
            Dimension::City => Some(&self.cities),
            _ => None,
        }
    }

    pub fn selection_mut(&mut self, dimension: Dimension) -> Option<&mut BTreeSet<String>> {
        match dimension {
            Dimension::Region => Some(&mut self.regions),
            Dimension::State => Some(&mut self.states),
            Dimension::City => Some(&mut self.cities),
            _ => None,
        }
    }

    /// Whether a single row passes every active predicate.
    pub fn matches(&self, row: &Row) -> bool {
        self.date_from <= row.order_date
            && row.order_date <= self.date_to
            && selected(&self.regions, &row.region)
            && selected(&self.states, &row.state)
            && selected(&self.cities, &row.city)
    }
}

fn selected(set: &BTreeSet<String>, value: &str) -> bool {
    set.is_empty() || set.contains(value)
}

/// Rows passing `criteria`, in their original relative order.
///
/// Never fails: an inverted date window simply matches nothing.
pub fn filter_rows(rows: &[Row], criteria: &FilterCriteria) -> Vec<Row> {
    rows.iter()
        .filter(|row| criteria.matches(row))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::model::fixtures::{date, row};

    fn sample() -> Vec<Row> {
        vec![
            row(date(2024, 1, 5), "North", "Furniture", 10.0),
            row(date(2024, 2, 10), "South", "Technology", 20.0),
            row(date(2024, 3, 15), "North", "Technology", 30.0),
            row(date(2024, 4, 20), "West", "Furniture", 40.0),
        ]
    }

    #[test]
    fn empty_sets_keep_every_row_in_window() {
        let rows = sample();
        let criteria = FilterCriteria::new(date(2024, 2, 10), date(2024, 3, 15));
        let kept = filter_rows(&rows, &criteria);
        assert_eq!(kept, vec![rows[1].clone(), rows[2].clone()]);
    }

    #[test]
    fn populated_set_restricts_to_members() {
        let rows = sample();
        let mut criteria = FilterCriteria::new(date(2024, 1, 1), date(2024, 12, 31));
        criteria.regions.insert("North".to_string());
        let kept = filter_rows(&rows, &criteria);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| r.region == "North"));
    }

    #[test]
    fn sets_combine_conjunctively() {
        let rows = sample();
        let mut criteria = FilterCriteria::new(date(2024, 1, 1), date(2024, 12, 31));
        criteria.regions.insert("North".to_string());
        criteria.cities.insert("West City".to_string());
        assert!(filter_rows(&rows, &criteria).is_empty());
    }

    #[test]
    fn inverted_window_is_empty_not_error() {
        let criteria = FilterCriteria::new(date(2024, 12, 31), date(2024, 1, 1));
        assert!(filter_rows(&sample(), &criteria).is_empty());
    }

    #[test]
    fn for_dataset_spans_everything() {
        let ds = Dataset::from_rows(sample(), Vec::new());
        let criteria = FilterCriteria::for_dataset(&ds).unwrap();
        assert_eq!(filter_rows(&ds.rows, &criteria).len(), 4);
        assert!(FilterCriteria::for_dataset(&Dataset::default()).is_none());
    }

    #[test]
    fn only_geographic_dimensions_are_selectable() {
        let mut criteria = FilterCriteria::new(date(2024, 1, 1), date(2024, 1, 1));
        assert!(criteria.selection(Dimension::Category).is_none());
        criteria
            .selection_mut(Dimension::State)
            .unwrap()
            .insert("X".into());
        assert_eq!(criteria.states.len(), 1);
    }

    fn arb_rows() -> impl Strategy<Value = Vec<Row>> {
        let regions = prop::sample::select(vec!["North", "South", "East", "West"]);
        prop::collection::vec((0u32..365, regions, 0.0f64..1000.0), 0..40).prop_map(|items| {
            items
                .into_iter()
                .map(|(offset, region, sales)| {
                    let day = date(2024, 1, 1) + chrono::Days::new(u64::from(offset));
                    row(day, region, "Furniture", sales)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn unrestricted_filter_is_a_date_window(rows in arb_rows(), a in 0u64..365, b in 0u64..365) {
            let from = date(2024, 1, 1) + chrono::Days::new(a.min(b));
            let to = date(2024, 1, 1) + chrono::Days::new(a.max(b));
            let kept = filter_rows(&rows, &FilterCriteria::new(from, to));
            let expected: Vec<Row> = rows
                .iter()
                .filter(|r| from <= r.order_date && r.order_date <= to)
                .cloned()
                .collect();
            prop_assert_eq!(kept, expected);
        }

        #[test]
        fn kept_rows_satisfy_every_predicate(
            rows in arb_rows(),
            picks in prop::collection::btree_set(prop::sample::select(vec!["North", "South", "East", "West"]), 0..3),
        ) {
            let mut criteria = FilterCriteria::new(date(2024, 2, 1), date(2024, 10, 31));
            criteria.regions = picks.iter().map(|s| s.to_string()).collect();
            for r in filter_rows(&rows, &criteria) {
                prop_assert!(criteria.date_from <= r.order_date && r.order_date <= criteria.date_to);
                prop_assert!(criteria.regions.is_empty() || criteria.regions.contains(&r.region));
            }
        }
    }
}
