use eframe::egui::{RichText, ScrollArea, Ui};

use crate::color::SeriesColors;
use crate::data::aggregate::AggregateView;
use crate::state::AppState;
use crate::ui::panels::download_button;
use crate::ui::{charts, tables};

// ---------------------------------------------------------------------------
// Central panel – every chart and table for the current filter
// ---------------------------------------------------------------------------

fn view_data(
    ui: &mut Ui,
    title: &str,
    view: &AggregateView,
    file_name: &str,
    status: &mut Option<String>,
) {
    ui.collapsing(title, |ui: &mut Ui| {
        tables::view_table(ui, title, view);
        download_button(ui, status, "Download Data", file_name, view);
    });
}

/// Render the dashboard in the central panel.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to explore sales  (File → Open…)");
        });
        return;
    }

    let snapshot_rows = state.snapshot().len();
    let AppState {
        filtered,
        views,
        region_colors,
        segment_colors,
        status_message,
        ..
    } = state;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if filtered.is_empty() {
                ui.label(RichText::new("No rows match the current filters.").italics());
            }

            ui.columns(2, |cols: &mut [Ui]| {
                cols[0].heading("Category Wise Sales");
                charts::category_bar_chart(&mut cols[0], "category_sales", &views.by_category);
                cols[1].heading("Region Wise Sales");
                charts::share_chart(&mut cols[1], "region_share", &views.by_region, region_colors);
            });

            ui.columns(2, |cols: &mut [Ui]| {
                view_data(
                    &mut cols[0],
                    "Category_ViewData",
                    &views.by_category,
                    "Category.csv",
                    status_message,
                );
                view_data(
                    &mut cols[1],
                    "Region_ViewData",
                    &views.by_region,
                    "Region.csv",
                    status_message,
                );
            });

            ui.separator();
            ui.heading("Time Series Analysis");
            charts::monthly_line_chart(ui, &views.by_month);
            ui.collapsing("View Data of Line Chart", |ui: &mut Ui| {
                tables::view_table(ui, "line_chart_data", &views.by_month);
                download_button(
                    ui,
                    status_message,
                    "Download LineChart Data",
                    "LineChartData.csv",
                    &views.by_month,
                );
            });

            ui.separator();
            ui.heading("Hierarchical View of Sales");
            tables::treemap(ui, &views.hierarchy, region_colors);

            ui.separator();
            ui.columns(2, |cols: &mut [Ui]| {
                cols[0].heading("Segment Wise Sales");
                charts::share_chart(&mut cols[0], "segment_share", &views.by_segment, segment_colors);
                view_data(
                    &mut cols[0],
                    "Segment_ViewData",
                    &views.by_segment,
                    "Segment.csv",
                    status_message,
                );
                cols[1].heading("Category Share");
                let labels: Vec<String> =
                    views.by_category.entries.iter().map(|e| e.key.join(" / ")).collect();
                let category_colors = SeriesColors::new(labels.iter().map(String::as_str));
                charts::share_chart(
                    &mut cols[1],
                    "category_share",
                    &views.by_category,
                    &category_colors,
                );
            });

            ui.separator();
            ui.heading("Month Wise Sub-Category Table");
            ui.collapsing("Sub_Category_Table", |ui: &mut Ui| {
                ui.strong("Sample");
                tables::rows_table(ui, "sample_rows", &views.sample);
                ui.add_space(8.0);
                ui.strong("Sales by Sub-Category and Month");
                tables::pivot_table(ui, &views.sub_category_by_month);
                download_button(
                    ui,
                    status_message,
                    "Download Data",
                    "SubCategoryByMonth.csv",
                    &views.sub_category_by_month,
                );
            });

            ui.separator();
            ui.heading("Relationship Between Sales and Profits");
            charts::scatter_plot(ui, &views.scatter);

            ui.separator();
            ui.collapsing("Data Snapshot", |ui: &mut Ui| {
                ui.label(format!("First {snapshot_rows} of {} rows", filtered.len()));
                tables::rows_table(ui, "snapshot_rows", &filtered[..snapshot_rows]);
                download_button(
                    ui,
                    status_message,
                    "Download Filtered Data",
                    "Filtered_Dataset.csv",
                    filtered.as_slice(),
                );
            });
        });
}
