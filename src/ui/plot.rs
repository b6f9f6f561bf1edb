use std::collections::BTreeMap;

use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use crate::color::ColorMap;
use crate::data::model::DataSource;
use crate::lasso::{LassoPath, ScatterPoint};
use crate::state::ControlEvent;
use crate::ui::{table, Views};

/// Axis columns for the scatter plot.
pub struct Axes<'a> {
    pub x: &'a str,
    pub y: &'a str,
}

// ---------------------------------------------------------------------------
// Scatter plot (graph tab)
// ---------------------------------------------------------------------------

/// Scatter of the filtered rows with the lasso detail table underneath.
pub fn graph_tab(
    ui: &mut Ui,
    source: &DataSource,
    axes: Axes<'_>,
    views: &Views,
    color_map: &ColorMap,
    lasso: &mut LassoPath,
    events: &mut Vec<ControlEvent>,
) {
    let markers = ScatterPoint::collect(source, &views.plot, axes.x, axes.y, &views.color_by);

    // One series per category so the legend reads "<category> quality".
    let mut series: BTreeMap<Option<String>, Vec<[f64; 2]>> = BTreeMap::new();
    for m in &markers {
        series.entry(m.category.clone()).or_default().push([m.x, m.y]);
    }
    let mut order: Vec<Option<String>> = color_map
        .legend_entries()
        .into_iter()
        .map(|(c, _)| Some(c))
        .filter(|key| series.contains_key(key))
        .collect();
    if series.contains_key(&None) {
        order.push(None);
    }

    let shift = ui.input(|i| i.modifiers.shift);
    let mut finished = false;

    Plot::new("scatter_plot")
        .legend(Legend::default())
        .x_axis_label(axes.x)
        .y_axis_label(axes.y)
        .height(ui.available_height() * 0.6)
        .allow_drag(!shift)
        .allow_boxed_zoom(!shift)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for key in &order {
                let Some(points) = series.get(key) else {
                    continue;
                };
                let name = match key {
                    Some(c) => format!("{c} {}", views.color_by),
                    None => "unlabelled".to_string(),
                };
                let pts: PlotPoints = points.iter().copied().collect();
                plot_ui.points(
                    Points::new(pts)
                        .name(name)
                        .color(color_map.color_for(key.as_deref()))
                        .radius(2.5),
                );
            }

            let response = plot_ui.response().clone();
            if shift && response.drag_started() {
                lasso.begin();
            }
            if lasso.is_drawing() && response.dragged() {
                if let Some(p) = plot_ui.pointer_coordinate() {
                    lasso.push([p.x, p.y]);
                }
            }
            if response.drag_stopped() && lasso.finish() {
                finished = true;
            }

            if !lasso.vertices().is_empty() {
                let outline: PlotPoints = lasso
                    .vertices()
                    .iter()
                    .chain(lasso.vertices().first())
                    .copied()
                    .collect();
                plot_ui.line(
                    Line::new(outline)
                        .color(Color32::DARK_GRAY)
                        .width(1.0),
                );
            }
        });

    if finished {
        events.push(ControlEvent::LassoSelect(lasso.select(&markers)));
    }

    ui.separator();
    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Selected wines");
        if ui.small_button("Clear").clicked() {
            lasso.clear();
            events.push(ControlEvent::LassoSelect(Vec::new()));
        }
    });

    match &views.detail {
        Some(view) if !view.is_empty() => table::rows_table(ui, "detail_table", source, view),
        _ => {
            ui.label(RichText::new("Shift+drag on the plot to lasso points.").weak());
        }
    }
}
