use std::sync::Arc;

use eframe::egui;

use crate::color::ColorMap;
use crate::config::Config;
use crate::data::model::DataSource;
use crate::lasso::LassoPath;
use crate::router::ActiveTab;
use crate::state::{ControlEvent, Session};
use crate::ui::plot::Axes;
use crate::ui::{panels, plot, table, Views};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct WineLensApp {
    config: Config,
    session: Session,
    views: Views,
    color_map: ColorMap,
    lasso: LassoPath,
}

impl WineLensApp {
    /// One window is one session over the shared dataset.
    pub fn new(config: Config, source: Arc<DataSource>) -> Self {
        let color_map = ColorMap::new(
            &config.category_column,
            source.categories(&config.category_column),
        );
        let session = Session::new(
            source,
            &config.category_column,
            &config.numeric_column,
            config.correlation,
        );
        let mut views = Views::default();
        session.refresh().deliver(&mut views);

        Self {
            config,
            session,
            views,
            color_map,
            lasso: LassoPath::new(),
        }
    }
}

impl eframe::App for WineLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut events = Vec::new();
        let source = Arc::clone(self.session.source());

        // ---- Top panel: title, tabs ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.config.title, &self.session, &mut events);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &self.session, &self.color_map, &mut events);
            });
        // The only lasso event the side panel sends is "Clear lasso".
        if events.iter().any(|e| matches!(e, ControlEvent::LassoSelect(_))) {
            self.lasso.clear();
        }

        // ---- Central panel: active tab ----
        egui::CentralPanel::default().show(ctx, |ui| match self.session.active_tab() {
            ActiveTab::Table => table::rows_table(ui, "main_table", &source, &self.views.table),
            ActiveTab::Graph => plot::graph_tab(
                ui,
                &source,
                Axes {
                    x: &self.config.numeric_column,
                    y: &self.config.y_column,
                },
                &self.views,
                &self.color_map,
                &mut self.lasso,
                &mut events,
            ),
        });

        for event in events {
            let dispatch = self.session.handle(event);
            if dispatch.is_empty() {
                log::trace!("no visible view depends on this change");
                continue;
            }
            dispatch.deliver(&mut self.views);
        }
    }
}
