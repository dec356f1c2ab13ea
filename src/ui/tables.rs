use std::collections::BTreeMap;

use eframe::egui::{self, CollapsingHeader, Grid, RichText, ScrollArea, Ui};

use crate::color::SeriesColors;
use crate::data::aggregate::{AggregateView, PivotTable};
use crate::data::model::{Row, REQUIRED_COLUMNS};
use crate::ui::format_currency;

/// Shown in pivot cells with no underlying rows.
const NO_DATA: &str = "-";

// ---------------------------------------------------------------------------
// Grids
// ---------------------------------------------------------------------------

pub fn view_table(ui: &mut Ui, id: &str, view: &AggregateView) {
    Grid::new(id).striped(true).show(ui, |ui: &mut Ui| {
        for col in &view.key_columns {
            ui.strong(col);
        }
        ui.strong(&view.measure);
        ui.end_row();

        for entry in &view.entries {
            for part in &entry.key {
                ui.label(part);
            }
            ui.label(format_currency(entry.value));
            ui.end_row();
        }
    });
}

pub fn pivot_table(ui: &mut Ui, pivot: &PivotTable) {
    if pivot.is_empty() {
        ui.label("No data.");
        return;
    }
    ScrollArea::horizontal()
        .id_salt("pivot_scroll")
        .show(ui, |ui: &mut Ui| {
            Grid::new("sub_category_by_month")
                .striped(true)
                .show(ui, |ui: &mut Ui| {
                    ui.strong(&pivot.row_header);
                    for month in &pivot.column_labels {
                        ui.strong(month);
                    }
                    ui.end_row();

                    for (label, cells) in pivot.row_labels.iter().zip(&pivot.cells) {
                        ui.label(label);
                        for cell in cells {
                            match cell {
                                Some(v) => ui.label(format!("{v:.2}")),
                                None => ui.weak(NO_DATA),
                            };
                        }
                        ui.end_row();
                    }
                });
        });
}

/// Row table with every mandatory column, inside its own scroll area.
pub fn rows_table(ui: &mut Ui, id: &str, rows: &[Row]) {
    ScrollArea::both()
        .id_salt(id)
        .max_height(320.0)
        .auto_shrink([false, true])
        .show(ui, |ui: &mut Ui| {
            Grid::new(id).striped(true).show(ui, |ui: &mut Ui| {
                for col in REQUIRED_COLUMNS {
                    ui.strong(col);
                }
                ui.end_row();

                for row in rows {
                    ui.label(row.order_date.format("%d/%m/%Y").to_string());
                    ui.label(&row.region);
                    ui.label(&row.state);
                    ui.label(&row.city);
                    ui.label(&row.category);
                    ui.label(&row.sub_category);
                    ui.label(&row.segment);
                    ui.label(format!("{:.2}", row.sales));
                    ui.label(format!("{:.2}", row.profit));
                    ui.label(row.quantity.to_string());
                    ui.end_row();
                }
            });
        });
}

// ---------------------------------------------------------------------------
// Treemap – region → category → sub-category
// ---------------------------------------------------------------------------

type Tree<'a> = BTreeMap<&'a str, BTreeMap<&'a str, Vec<(&'a str, f64)>>>;

fn build_tree(view: &AggregateView) -> Tree<'_> {
    let mut tree: Tree<'_> = BTreeMap::new();
    for entry in &view.entries {
        if let [region, category, sub] = entry.key.as_slice() {
            tree.entry(region.as_str())
                .or_default()
                .entry(category.as_str())
                .or_default()
                .push((sub.as_str(), entry.value));
        }
    }
    tree
}

/// Nested totals with bars proportional to each node's share of its parent.
pub fn treemap(ui: &mut Ui, view: &AggregateView, colors: &SeriesColors) {
    let tree = build_tree(view);
    let grand_total = view.total();
    let share = |part: f64, whole: f64| {
        if whole > 0.0 {
            (part / whole).clamp(0.0, 1.0) as f32
        } else {
            0.0
        }
    };

    for (region, categories) in &tree {
        let region_total: f64 = categories.values().flatten().map(|(_, v)| v).sum();
        let title = RichText::new(format!("{region}  {}", format_currency(region_total)))
            .color(colors.color_for(region))
            .strong();

        CollapsingHeader::new(title)
            .id_salt(("treemap", *region))
            .default_open(false)
            .show(ui, |ui: &mut Ui| {
                ui.add(egui::ProgressBar::new(share(region_total, grand_total)).desired_width(240.0));
                for (category, subs) in categories {
                    let category_total: f64 = subs.iter().map(|(_, v)| v).sum();
                    CollapsingHeader::new(format!(
                        "{category}  {}",
                        format_currency(category_total)
                    ))
                    .id_salt(("treemap", *region, *category))
                    .show(ui, |ui: &mut Ui| {
                        for (sub, value) in subs {
                            ui.add(
                                egui::ProgressBar::new(share(*value, category_total))
                                    .desired_width(240.0)
                                    .text(format!("{sub}: {}", format_currency(*value))),
                            );
                        }
                    });
                }
            });
    }
}
