use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::ColorMap;
use crate::data::filter::Correlation;
use crate::router::ActiveTab;
use crate::state::{ControlEvent, Session};

const ABOUT: &str = "\
This data set assesses the quality of 4898 white wine variants from the \
Portuguese Vinho Verde region based on 11 physicochemical features. It was \
originally used in \"Modeling wine preferences by data mining from \
physicochemical properties\" by Cortez et al. (2009) and is posted on the UCI \
Machine Learning Repository.

Quality is scored from 0 to 10; no wine in the set scores 0, 1, 2 or 10.

Filter the table by one or more qualities and narrow the fixed acidity range \
with the sliders. The graph tab plots fixed acidity against volatile acidity \
coloured by quality; shift+drag on it to lasso points and list their rows \
below the plot.";

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title, tab selector and row counts.
pub fn top_bar(ui: &mut Ui, title: &str, session: &Session, events: &mut Vec<ControlEvent>) {
    ui.horizontal(|ui: &mut Ui| {
        ui.heading(title);
        ui.separator();

        let active = session.active_tab();
        for tab in ActiveTab::ALL {
            if ui.selectable_label(active == tab, tab.label()).clicked() {
                events.push(ControlEvent::TabSelect(tab));
            }
        }

        ui.separator();
        ui.label(format!(
            "{} rows loaded, {} visible",
            session.source().len(),
            session.primary().len()
        ));
    });
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the quality picker, acidity range and lasso options.
pub fn side_panel(
    ui: &mut Ui,
    session: &Session,
    color_map: &ColorMap,
    events: &mut Vec<ControlEvent>,
) {
    let source = session.source();
    let filter = session.filter();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            egui::CollapsingHeader::new(RichText::new("About").strong())
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    ui.label(ABOUT);
                });
            ui.separator();

            // ---- Category multi-select ----
            let column = &filter.category_column;
            let all = source.categories(column);
            ui.strong(format!(
                "Select {column} ({}/{})",
                filter.allowed_categories.len(),
                all.len()
            ));
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    events.push(ControlEvent::CategorySelect(all.to_vec()));
                }
                if ui.small_button("None").clicked() {
                    events.push(ControlEvent::CategorySelect(Vec::new()));
                }
            });
            let coloured = color_map.column == *column;
            for category in all {
                let mut checked = filter.allowed_categories.contains(category);
                let mut text = RichText::new(format!("{category} {column}"));
                if coloured {
                    text = text.color(color_map.color_for(Some(category)));
                }
                if ui.checkbox(&mut checked, text).changed() {
                    let mut next = filter.allowed_categories.clone();
                    if checked {
                        next.insert(category.clone());
                    } else {
                        next.remove(category);
                    }
                    events.push(ControlEvent::CategorySelect(next.into_iter().collect()));
                }
            }
            ui.separator();

            // ---- Numeric range ----
            ui.strong(&filter.numeric_column);
            match source.bounds(&filter.numeric_column) {
                Some((lo, hi)) => {
                    let range = filter.numeric_range;
                    let (mut min, mut max) = (range.min, range.max);
                    let a = ui.add(egui::Slider::new(&mut min, lo..=hi).text("min"));
                    let b = ui.add(egui::Slider::new(&mut max, lo..=hi).text("max"));
                    if a.changed() || b.changed() {
                        events.push(ControlEvent::RangeChange { min, max });
                    }
                    if ui.small_button("Reset range").clicked() {
                        events.push(ControlEvent::RangeChange { min: lo, max: hi });
                    }
                }
                None => {
                    ui.label("no numeric values");
                }
            }

            if let Some(issue) = filter.diagnose(source) {
                ui.label(RichText::new(format!("Nothing matches: {issue}")).color(Color32::RED));
            }
            ui.separator();

            // ---- Lasso correlation ----
            ui.strong("Lasso selects");
            let current = session.correlation();
            for (mode, label) in [
                (Correlation::RowId, "only the lassoed wines"),
                (Correlation::Category, "every wine of a lassoed quality"),
            ] {
                if ui.radio(current == mode, label).clicked() && current != mode {
                    events.push(ControlEvent::CorrelationChange(mode));
                }
            }
            if session.selection().is_some() && ui.small_button("Clear lasso").clicked() {
                events.push(ControlEvent::LassoSelect(Vec::new()));
            }
        });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

/// Ask for the dataset when none was given on the command line.
pub fn pick_dataset_file() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open wine quality data")
        .add_filter("Supported files", &["csv", "tsv", "txt", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv", "tsv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file()
}
