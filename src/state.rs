use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::color::SeriesColors;
use crate::config::DashboardConfig;
use crate::data::aggregate::DashboardViews;
use crate::data::filter::{filter_rows, FilterCriteria};
use crate::data::loader::load_file;
use crate::data::model::{distinct_values, Dataset, Dimension, Row};

/// Dimensions offered as multi-select filters, in panel order.
pub const FILTER_DIMENSIONS: [Dimension; 3] = [Dimension::Region, Dimension::State, Dimension::City];

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Dataset>,

    /// Current selection; `None` while no non-empty dataset is loaded.
    pub criteria: Option<FilterCriteria>,

    /// Values offered per filter dimension: the distinct values of rows inside
    /// the selected date window.
    pub options: BTreeMap<Dimension, BTreeSet<String>>,

    /// Rows passing the current filters (cached).
    pub filtered: Vec<Row>,

    /// Views derived from `filtered` (cached).
    pub views: DashboardViews,

    pub region_colors: SeriesColors,
    pub segment_colors: SeriesColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: None,
            criteria: None,
            options: BTreeMap::new(),
            filtered: Vec::new(),
            views: DashboardViews::default(),
            region_colors: SeriesColors::default(),
            segment_colors: SeriesColors::default(),
            status_message: None,
        }
    }

    /// Load a file and make it the current dataset. On failure the previous
    /// dataset stays in place.
    pub fn load_path(&mut self, path: &Path) -> Result<()> {
        let dataset = load_file(path).with_context(|| format!("loading {}", path.display()))?;
        log::info!(
            "Loaded {} rows from {} with passthrough columns {:?}",
            dataset.len(),
            path.display(),
            dataset.extra_columns
        );
        if let Some((from, to)) = dataset.date_span {
            log::info!("Order dates span {from} to {to}");
        }
        self.set_dataset(dataset);
        Ok(())
    }

    /// Ingest a newly loaded dataset and reset filters to its full span.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.criteria = FilterCriteria::for_dataset(&dataset);
        self.region_colors =
            SeriesColors::new(dataset.distinct(Dimension::Region).iter().map(String::as_str));
        self.segment_colors =
            SeriesColors::new(dataset.distinct(Dimension::Segment).iter().map(String::as_str));
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refresh_options();
        self.refilter();
    }

    /// Recompute `filtered` and every derived view after a filter change.
    pub fn refilter(&mut self) {
        self.filtered = match (&self.dataset, &self.criteria) {
            (Some(ds), Some(criteria)) => filter_rows(&ds.rows, criteria),
            _ => Vec::new(),
        };
        self.views = DashboardViews::compute(&self.filtered, self.config.sample_size);
        log::debug!(
            "Refiltered: {} of {} rows visible",
            self.filtered.len(),
            self.dataset.as_ref().map_or(0, Dataset::len)
        );
    }

    /// Rebuild the option lists from the rows inside the date window.
    fn refresh_options(&mut self) {
        self.options.clear();
        if self.criteria.is_none() {
            return;
        }
        let in_window = self.date_window_rows();
        for dim in FILTER_DIMENSIONS {
            self.options.insert(dim, distinct_values(&in_window, dim));
        }
    }

    /// Move the date window. Out-of-order bounds are kept as chosen and
    /// simply match nothing.
    pub fn set_date_range(&mut self, date_from: NaiveDate, date_to: NaiveDate) {
        let Some(criteria) = &mut self.criteria else {
            return;
        };
        if criteria.date_from == date_from && criteria.date_to == date_to {
            return;
        }
        criteria.date_from = date_from;
        criteria.date_to = date_to;
        self.refresh_options();
        self.refilter();
    }

    /// Toggle a single value in a dimension's selection.
    pub fn toggle_selection(&mut self, dimension: Dimension, value: &str) {
        let Some(selected) = self
            .criteria
            .as_mut()
            .and_then(|c| c.selection_mut(dimension))
        else {
            return;
        };
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Clear a dimension's selection (back to "all").
    pub fn clear_selection(&mut self, dimension: Dimension) {
        if let Some(selected) = self
            .criteria
            .as_mut()
            .and_then(|c| c.selection_mut(dimension))
        {
            selected.clear();
            self.refilter();
        }
    }

    pub fn is_selected(&self, dimension: Dimension, value: &str) -> bool {
        self.criteria
            .as_ref()
            .and_then(|c| c.selection(dimension))
            .is_some_and(|s| s.contains(value))
    }

    /// Rows inside the date window with the region, state and city
    /// selections ignored. This is what "Original_Dataset.csv" holds.
    pub fn date_window_rows(&self) -> Vec<Row> {
        match (&self.dataset, &self.criteria) {
            (Some(ds), Some(criteria)) => filter_rows(
                &ds.rows,
                &FilterCriteria::new(criteria.date_from, criteria.date_to),
            ),
            (Some(ds), None) => ds.rows.clone(),
            (None, _) => Vec::new(),
        }
    }

    /// Rows for the snapshot table, capped by config.
    pub fn snapshot(&self) -> &[Row] {
        let n = self.config.snapshot_rows.min(self.filtered.len());
        &self.filtered[..n]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{date, row};

    fn loaded() -> AppState {
        let mut state = AppState::new(DashboardConfig::default());
        state.set_dataset(Dataset::from_rows(
            vec![
                row(date(2024, 1, 5), "North", "Furniture", 10.0),
                row(date(2024, 2, 10), "South", "Technology", 20.0),
                row(date(2024, 3, 15), "North", "Technology", 30.0),
                row(date(2024, 4, 20), "West", "Furniture", 40.0),
            ],
            Vec::new(),
        ));
        state
    }

    #[test]
    fn new_dataset_shows_everything() {
        let state = loaded();
        assert_eq!(state.filtered.len(), 4);
        assert_eq!(state.views.by_region.total(), 100.0);
        assert_eq!(state.options[&Dimension::Region].len(), 3);
    }

    #[test]
    fn toggling_restricts_then_releases() {
        let mut state = loaded();
        state.toggle_selection(Dimension::Region, "North");
        assert!(state.is_selected(Dimension::Region, "North"));
        assert_eq!(state.filtered.len(), 2);
        assert_eq!(state.views.by_region.total(), 40.0);

        state.toggle_selection(Dimension::Region, "North");
        assert_eq!(state.filtered.len(), 4);

        state.toggle_selection(Dimension::City, "West City");
        state.clear_selection(Dimension::City);
        assert_eq!(state.filtered.len(), 4);
    }

    #[test]
    fn date_window_narrows_options() {
        let mut state = loaded();
        state.set_date_range(date(2024, 2, 1), date(2024, 3, 31));
        assert_eq!(state.filtered.len(), 2);
        let regions: Vec<&str> = state.options[&Dimension::Region]
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(regions, vec!["North", "South"]);
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let mut state = loaded();
        let err = state
            .load_path(Path::new("/nonexistent/Superstore.csv"))
            .unwrap_err();
        assert!(format!("{err:#}").contains("loading /nonexistent/Superstore.csv"));
        assert_eq!(state.filtered.len(), 4);
    }

    #[test]
    fn original_download_follows_date_window_only() {
        let mut state = loaded();
        state.set_date_range(date(2024, 2, 1), date(2024, 4, 30));
        state.toggle_selection(Dimension::Region, "North");
        assert_eq!(state.filtered.len(), 1);

        let rows = state.date_window_rows();
        let regions: Vec<&str> = rows.iter().map(|r| r.region.as_str()).collect();
        assert_eq!(regions, vec!["South", "North", "West"]);
    }

    #[test]
    fn snapshot_is_capped() {
        let mut state = loaded();
        state.config.snapshot_rows = 3;
        assert_eq!(state.snapshot().len(), 3);
    }

    #[test]
    fn empty_dataset_has_no_criteria() {
        let mut state = AppState::new(DashboardConfig::default());
        state.set_dataset(Dataset::default());
        assert!(state.criteria.is_none());
        assert!(state.filtered.is_empty());
        state.toggle_selection(Dimension::Region, "North");
        assert!(state.views.by_category.is_empty());
    }
}
