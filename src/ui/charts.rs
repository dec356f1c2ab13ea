use std::collections::BTreeMap;

use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::color::{generate_palette, SeriesColors};
use crate::data::aggregate::{AggregateView, ScatterPoint};
use crate::ui::format_currency;

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Bar and share charts
// ---------------------------------------------------------------------------

/// Vertical bars, one per group, labelled with the summed amount.
pub fn category_bar_chart(ui: &mut Ui, id: &str, view: &AggregateView) {
    let bars: Vec<Bar> = view
        .entries
        .iter()
        .enumerate()
        .map(|(i, e)| {
            Bar::new(i as f64, e.value)
                .name(format!("{}  {}", e.key.join(" / "), format_currency(e.value)))
                .width(0.6)
        })
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .y_axis_label(view.measure.as_str())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .name(view.measure.as_str())
                    .color(Color32::LIGHT_BLUE),
            );
        });
}

/// Each group's share of the total as horizontal bars (the dashboard's
/// stand-in for a pie chart).
pub fn share_chart(ui: &mut Ui, id: &str, view: &AggregateView, colors: &SeriesColors) {
    let total = view.total();
    let bars: Vec<Bar> = view
        .entries
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let label = e.key.join(" / ");
            let pct = if total != 0.0 { e.value / total * 100.0 } else { 0.0 };
            Bar::new(i as f64, e.value)
                .name(format!("{label}: {pct:.1}%"))
                .fill(colors.color_for(&label))
                .width(0.7)
        })
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT * 0.75)
        .x_axis_label(view.measure.as_str())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

// ---------------------------------------------------------------------------
// Time series
// ---------------------------------------------------------------------------

/// Monthly totals as a line; x is the position in the chronological view.
pub fn monthly_line_chart(ui: &mut Ui, view: &AggregateView) {
    let labels: Vec<String> = view.entries.iter().map(|e| e.key.join(" ")).collect();
    let coords: Vec<[f64; 2]> = view
        .entries
        .iter()
        .enumerate()
        .map(|(i, e)| [i as f64, e.value])
        .collect();

    let line_points: PlotPoints = coords.iter().copied().collect();
    let marker_points: PlotPoints = coords.iter().copied().collect();

    Plot::new("monthly_sales")
        .height(CHART_HEIGHT)
        .x_axis_label("month_year")
        .y_axis_label("Amount")
        .allow_scroll(false)
        .label_formatter(|_name, value| {
            let idx = value.x.round();
            if idx < 0.0 {
                return String::new();
            }
            labels
                .get(idx as usize)
                .map(|label| format!("{label}\n{}", format_currency(value.y)))
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(line_points).name("Sales").width(2.0));
            plot_ui.points(Points::new(marker_points).radius(3.0));
        });
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

fn marker_radius(quantity: u32) -> f32 {
    1.5 + (quantity as f32).sqrt() * 1.5
}

/// Sales (x) against profit (y); one series per quantity so marker size
/// tracks quantity.
pub fn scatter_plot(ui: &mut Ui, points: &[ScatterPoint]) {
    let mut by_quantity: BTreeMap<u32, Vec<[f64; 2]>> = BTreeMap::new();
    for p in points {
        by_quantity
            .entry(p.quantity)
            .or_default()
            .push([p.sales, p.profit]);
    }
    let palette = generate_palette(by_quantity.len());

    Plot::new("sales_vs_profit")
        .height(CHART_HEIGHT * 1.3)
        .legend(Legend::default())
        .x_axis_label("Sales")
        .y_axis_label("Profit")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for ((quantity, coords), color) in by_quantity.into_iter().zip(palette) {
                let series: PlotPoints = coords.into_iter().collect();
                plot_ui.points(
                    Points::new(series)
                        .name(format!("Quantity {quantity}"))
                        .radius(marker_radius(quantity))
                        .color(color),
                );
            }
        });
}
