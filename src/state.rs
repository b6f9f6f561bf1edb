use std::collections::BTreeSet;
use std::sync::Arc;

use crate::data::filter::{
    apply, apply_selection, Correlation, FilterState, FilteredView, NumericRange, SelectedPoint,
    Selection,
};
use crate::data::model::DataSource;
use crate::router::{ActiveTab, DerivedView, Input, ViewRouter};

// ---------------------------------------------------------------------------
// Sink boundary
// ---------------------------------------------------------------------------

/// An external renderer. A method that is not called means "keep what you
/// have"; a call with an empty view means "show nothing".
pub trait Sink {
    fn render_table(&mut self, view: &FilteredView);
    fn render_plot(&mut self, view: &FilteredView, color_by: &str);
    fn render_detail_table(&mut self, view: &FilteredView);
}

/// Payload for the scatter plot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotPayload {
    pub view: FilteredView,
    pub color_by: String,
}

/// What one interaction produced for each sink. `None` is a withheld update,
/// distinct from `Some` of an empty view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dispatch {
    pub table: Option<FilteredView>,
    pub plot: Option<PlotPayload>,
    pub detail: Option<FilteredView>,
}

impl Dispatch {
    pub fn is_empty(&self) -> bool {
        self.table.is_none() && self.plot.is_none() && self.detail.is_none()
    }

    /// Hand every present payload to `sink`.
    pub fn deliver<S: Sink + ?Sized>(&self, sink: &mut S) {
        if let Some(view) = &self.table {
            sink.render_table(view);
        }
        if let Some(plot) = &self.plot {
            sink.render_plot(&plot.view, &plot.color_by);
        }
        if let Some(view) = &self.detail {
            sink.render_detail_table(view);
        }
    }
}

// ---------------------------------------------------------------------------
// Control boundary
// ---------------------------------------------------------------------------

/// A discrete event from one UI control carrying its new value.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    CategorySelect(Vec<String>),
    RangeChange { min: f64, max: f64 },
    TabSelect(ActiveTab),
    LassoSelect(Vec<SelectedPoint>),
    CorrelationChange(Correlation),
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Per-session UI state over a shared, read-only dataset.
///
/// Each control owns one field: the category picker owns the allowed
/// categories, the slider owns the range, the tab bar owns the router and the
/// plot lasso owns the selection. Every handler returns the [`Dispatch`] for
/// the views that depend on the field it changed.
#[derive(Debug, Clone)]
pub struct Session {
    source: Arc<DataSource>,
    filter: FilterState,
    router: ViewRouter,
    correlation: Correlation,
    lassoed: Vec<SelectedPoint>,
    selection: Option<Selection>,
    /// `apply(source, filter)`, kept in step with `filter`.
    primary: FilteredView,
}

impl Session {
    /// Fresh page-load state: first category, full range, table tab.
    pub fn new(
        source: Arc<DataSource>,
        category_column: &str,
        numeric_column: &str,
        correlation: Correlation,
    ) -> Self {
        let filter = FilterState::initial(&source, category_column, numeric_column);
        let primary = apply(&source, &filter);
        Self {
            source,
            filter,
            router: ViewRouter::default(),
            correlation,
            lassoed: Vec::new(),
            selection: None,
            primary,
        }
    }

    pub fn source(&self) -> &Arc<DataSource> {
        &self.source
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn active_tab(&self) -> ActiveTab {
        self.router.active()
    }

    pub fn correlation(&self) -> Correlation {
        self.correlation
    }

    /// Current primary view (memoized).
    pub fn primary(&self) -> &FilteredView {
        &self.primary
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Route a control event to its handler.
    pub fn handle(&mut self, event: ControlEvent) -> Dispatch {
        match event {
            ControlEvent::CategorySelect(values) => self.on_category_select(values),
            ControlEvent::RangeChange { min, max } => self.on_range_change(min, max),
            ControlEvent::TabSelect(tab) => self.on_tab_select(tab),
            ControlEvent::LassoSelect(points) => {
                log::debug!("lasso picked {} points", points.len());
                self.on_lasso_select(&points)
            }
            ControlEvent::CorrelationChange(c) => self.set_correlation(c),
        }
    }

    /// Everything currently visible, as on first render.
    pub fn refresh(&self) -> Dispatch {
        self.dispatch(Input::Tab)
    }

    pub fn on_category_select<I, S>(&mut self, values: I) -> Dispatch
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if allowed != self.filter.allowed_categories {
            self.filter.allowed_categories = allowed;
            self.refilter();
        }
        self.dispatch(Input::Categories)
    }

    pub fn on_range_change(&mut self, min: f64, max: f64) -> Dispatch {
        let range = NumericRange::new(min, max);
        if range != self.filter.numeric_range {
            self.filter.numeric_range = range;
            self.refilter();
        }
        self.dispatch(Input::Range)
    }

    pub fn on_tab_select(&mut self, tab: ActiveTab) -> Dispatch {
        if self.router.select(tab) {
            log::debug!("tab -> {tab}");
        }
        self.dispatch(Input::Tab)
    }

    /// An empty `points` slice clears the selection.
    pub fn on_lasso_select(&mut self, points: &[SelectedPoint]) -> Dispatch {
        self.lassoed = points.to_vec();
        self.reselect();
        self.dispatch(Input::Selection)
    }

    /// Switch how lassoed points map back to rows; re-derives the selection.
    pub fn set_correlation(&mut self, correlation: Correlation) -> Dispatch {
        self.correlation = correlation;
        self.reselect();
        self.dispatch(Input::Selection)
    }

    fn refilter(&mut self) {
        self.primary = apply(&self.source, &self.filter);
        match self.filter.diagnose(&self.source) {
            Some(issue) => log::debug!("filter matches nothing: {issue}"),
            None => log::debug!("{} of {} rows pass", self.primary.len(), self.source.len()),
        }
    }

    fn reselect(&mut self) {
        self.selection = if self.lassoed.is_empty() {
            None
        } else {
            Some(Selection::from_points(
                &self.lassoed,
                self.correlation,
                &self.filter.category_column,
            ))
        };
    }

    /// Build payloads for the visible views that depend on `changed`.
    fn dispatch(&self, changed: Input) -> Dispatch {
        let mut out = Dispatch::default();
        for view in DerivedView::affected_by(changed) {
            if !self.router.is_visible(view) {
                continue;
            }
            match view {
                DerivedView::Table => out.table = Some(self.primary.clone()),
                DerivedView::Plot => {
                    out.plot = Some(PlotPayload {
                        view: self.primary.clone(),
                        color_by: self.filter.category_column.clone(),
                    })
                }
                DerivedView::Detail => {
                    // Never having lassoed withholds the detail table;
                    // clearing a lasso empties it.
                    out.detail = match apply_selection(&self.source, self.selection.as_ref()) {
                        Some(view) => Some(view),
                        None if changed == Input::Selection => Some(FilteredView::default()),
                        None => None,
                    };
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{row, RowId, Value};

    fn three_wines() -> Arc<DataSource> {
        Arc::new(DataSource::from_rows(
            vec!["quality".into(), "acid".into()],
            vec![
                row([("quality", Value::from("3")), ("acid", Value::Float(6.0))]),
                row([("quality", Value::from("5")), ("acid", Value::Float(7.5))]),
                row([("quality", Value::from("3")), ("acid", Value::Float(9.0))]),
            ],
        ))
    }

    fn session() -> Session {
        Session::new(three_wines(), "quality", "acid", Correlation::RowId)
    }

    fn ids(v: &[usize]) -> Vec<RowId> {
        v.iter().copied().map(RowId).collect()
    }

    fn point(i: usize, cat: &str) -> SelectedPoint {
        SelectedPoint {
            row: RowId(i),
            category: Some(cat.into()),
        }
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Sink for Recorder {
        fn render_table(&mut self, view: &FilteredView) {
            self.calls.push(format!("table {}", view.len()));
        }
        fn render_plot(&mut self, view: &FilteredView, color_by: &str) {
            self.calls.push(format!("plot {} by {color_by}", view.len()));
        }
        fn render_detail_table(&mut self, view: &FilteredView) {
            self.calls.push(format!("detail {}", view.len()));
        }
    }

    #[test]
    fn initial_render_is_table_with_first_category() {
        let s = session();
        let d = s.refresh();
        assert_eq!(d.table.map(|v| v.ids), Some(ids(&[0, 2])));
        assert_eq!(d.plot, None);
        assert_eq!(d.detail, None);
    }

    #[test]
    fn category_and_range_scenarios() {
        let mut s = session();
        s.on_category_select(["3"]);
        let d = s.on_range_change(5.0, 8.0);
        assert_eq!(d.table.map(|v| v.ids), Some(ids(&[0])));

        s.on_category_select(["3", "5"]);
        let d = s.on_range_change(0.0, 100.0);
        assert_eq!(d.table.map(|v| v.ids), Some(ids(&[0, 1, 2])));
    }

    #[test]
    fn transient_bad_inputs_render_empty() {
        let mut s = session();
        let d = s.on_range_change(9.0, 1.0);
        assert_eq!(d.table, Some(FilteredView::default()));
        let d = s.on_category_select(Vec::<String>::new());
        assert_eq!(d.table, Some(FilteredView::default()));
    }

    #[test]
    fn graph_tab_withholds_table() {
        let mut s = session();
        let d = s.on_tab_select(ActiveTab::Graph);
        assert!(d.table.is_none());
        assert!(d.plot.is_some());

        let d = s.on_range_change(0.0, 100.0);
        assert!(d.table.is_none());
        assert_eq!(
            d.plot,
            Some(PlotPayload {
                view: FilteredView { ids: ids(&[0, 2]) },
                color_by: "quality".into(),
            })
        );

        let d = s.on_tab_select(ActiveTab::Table);
        assert!(d.plot.is_none());
        assert!(d.detail.is_none());
        assert_eq!(d.table.map(|v| v.ids), Some(ids(&[0, 2])));
    }

    #[test]
    fn filter_changes_keep_applying_while_hidden() {
        let mut s = session();
        s.on_tab_select(ActiveTab::Graph);
        s.on_category_select(["5"]);
        let d = s.on_tab_select(ActiveTab::Table);
        assert_eq!(d.table.map(|v| v.ids), Some(ids(&[1])));
    }

    #[test]
    fn lasso_on_table_tab_is_withheld() {
        let mut s = session();
        let d = s.on_lasso_select(&[point(0, "3")]);
        assert!(d.is_empty());
        let d = s.on_tab_select(ActiveTab::Graph);
        assert_eq!(d.detail.map(|v| v.ids), Some(ids(&[0])));
    }

    #[test]
    fn detail_withheld_until_lasso_then_emptied_on_clear() {
        let mut s = session();
        let d = s.on_tab_select(ActiveTab::Graph);
        assert_eq!(d.detail, None);

        let d = s.on_lasso_select(&[point(2, "3")]);
        assert_eq!(d.detail.map(|v| v.ids), Some(ids(&[2])));
        assert!(d.table.is_none());
        assert!(d.plot.is_none());
        assert!(s.selection().is_some());

        // "Clear lasso" in the side panel sends an empty lasso event.
        let d = s.handle(ControlEvent::LassoSelect(Vec::new()));
        assert_eq!(d.detail, Some(FilteredView::default()));
        assert!(s.selection().is_none());
    }

    #[test]
    fn switching_correlation_rederives_selection() {
        let mut s = session();
        s.on_tab_select(ActiveTab::Graph);
        s.on_lasso_select(&[point(0, "3")]);
        let d = s.set_correlation(Correlation::Category);
        assert_eq!(d.detail.map(|v| v.ids), Some(ids(&[0, 2])));
        let d = s.set_correlation(Correlation::RowId);
        assert_eq!(d.detail.map(|v| v.ids), Some(ids(&[0])));
    }

    #[test]
    fn deliver_calls_only_present_sinks() {
        let mut s = session();
        let mut sink = Recorder::default();
        s.refresh().deliver(&mut sink);
        s.on_tab_select(ActiveTab::Graph).deliver(&mut sink);
        s.on_lasso_select(&[point(1, "5")]).deliver(&mut sink);
        assert_eq!(
            sink.calls,
            ["table 2", "plot 2 by quality", "detail 1"]
        );
    }

    #[test]
    fn events_route_to_handlers() {
        let mut s = session();
        let d = s.handle(ControlEvent::RangeChange { min: 5.0, max: 8.0 });
        assert_eq!(d.table.map(|v| v.ids), Some(ids(&[0])));
        let d = s.handle(ControlEvent::TabSelect(ActiveTab::Graph));
        assert!(d.plot.is_some());
        let d = s.handle(ControlEvent::LassoSelect(vec![point(0, "3")]));
        assert_eq!(d.detail.map(|v| v.ids), Some(ids(&[0])));
        let d = s.handle(ControlEvent::CategorySelect(vec!["5".into()]));
        assert_eq!(d.plot.map(|p| p.view.ids), Some(ids(&[1])));
        assert!(d.detail.is_none());
        let d = s.handle(ControlEvent::CorrelationChange(Correlation::Category));
        assert_eq!(d.detail.map(|v| v.ids), Some(ids(&[0, 2])));
    }

    #[test]
    fn sessions_do_not_share_controls() {
        let source = three_wines();
        let mut a = Session::new(source.clone(), "quality", "acid", Correlation::RowId);
        let b = Session::new(source.clone(), "quality", "acid", Correlation::RowId);

        a.on_category_select(["5"]);
        a.on_tab_select(ActiveTab::Graph);

        assert_eq!(b.active_tab(), ActiveTab::Table);
        assert_eq!(b.primary().ids, ids(&[0, 2]));
        assert_eq!(a.primary().ids, ids(&[1]));
        assert!(Arc::ptr_eq(a.source(), b.source()));
        assert_eq!(source.len(), 3);
    }
}
