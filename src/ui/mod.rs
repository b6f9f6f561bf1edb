//! egui presentation: the concrete control boundary and render sinks.

pub mod panels;
pub mod plot;
pub mod table;

use crate::data::filter::FilteredView;
use crate::state::Sink;

/// What each sink last received. Egui redraws every frame from these.
#[derive(Debug, Default)]
pub struct Views {
    pub table: FilteredView,
    pub plot: FilteredView,
    pub color_by: String,
    /// `None` until a lasso selection has been made.
    pub detail: Option<FilteredView>,
}

impl Sink for Views {
    fn render_table(&mut self, view: &FilteredView) {
        self.table = view.clone();
    }

    fn render_plot(&mut self, view: &FilteredView, color_by: &str) {
        self.plot = view.clone();
        self.color_by = color_by.to_string();
    }

    fn render_detail_table(&mut self, view: &FilteredView) {
        self.detail = Some(view.clone());
    }
}
