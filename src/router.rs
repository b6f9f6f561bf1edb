use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

/// Which sink is currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActiveTab {
    #[default]
    Table,
    Graph,
}

impl ActiveTab {
    pub const ALL: [ActiveTab; 2] = [ActiveTab::Table, ActiveTab::Graph];

    pub fn label(self) -> &'static str {
        match self {
            ActiveTab::Table => "Table",
            ActiveTab::Graph => "Graph",
        }
    }
}

impl fmt::Display for ActiveTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tab '{0}'")]
pub struct UnknownTab(pub String);

impl FromStr for ActiveTab {
    type Err = UnknownTab;

    /// Accepts the tab labels and the short ids `tab-t` / `tab-g`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" | "tab-t" => Ok(ActiveTab::Table),
            "graph" | "tab-g" => Ok(ActiveTab::Graph),
            _ => Err(UnknownTab(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Dependency declaration
// ---------------------------------------------------------------------------

/// A session field that a control writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Written by the category multi-select.
    Categories,
    /// Written by the range slider.
    Range,
    /// Written by the tab control.
    Tab,
    /// Written by the plot lasso.
    Selection,
}

/// A view derived from the dataset and session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedView {
    Table,
    Plot,
    /// Rows behind the lasso selection, shown under the plot.
    Detail,
}

impl DerivedView {
    pub const ALL: [DerivedView; 3] = [DerivedView::Table, DerivedView::Plot, DerivedView::Detail];

    /// The inputs whose change makes this view stale.
    pub fn depends_on(self) -> &'static [Input] {
        match self {
            DerivedView::Table => &[Input::Categories, Input::Range, Input::Tab],
            DerivedView::Plot => &[Input::Categories, Input::Range, Input::Tab],
            DerivedView::Detail => &[Input::Selection, Input::Tab],
        }
    }

    /// The tab this view lives on.
    pub fn tab(self) -> ActiveTab {
        match self {
            DerivedView::Table => ActiveTab::Table,
            DerivedView::Plot | DerivedView::Detail => ActiveTab::Graph,
        }
    }

    /// Views to recompute after `input` changed, in dispatch order.
    pub fn affected_by(input: Input) -> impl Iterator<Item = DerivedView> {
        Self::ALL
            .into_iter()
            .filter(move |v| v.depends_on().contains(&input))
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Two-state machine over [`ActiveTab`]. Every transition is allowed and
/// there is no terminal state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewRouter {
    active: ActiveTab,
}

impl ViewRouter {
    pub fn active(&self) -> ActiveTab {
        self.active
    }

    /// Returns whether the tab actually changed.
    pub fn select(&mut self, tab: ActiveTab) -> bool {
        let changed = self.active != tab;
        self.active = tab;
        changed
    }

    /// Only views on the active tab receive render payloads.
    pub fn is_visible(&self, view: DerivedView) -> bool {
        view.tab() == self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_table() {
        let router = ViewRouter::default();
        assert_eq!(router.active(), ActiveTab::Table);
        assert!(router.is_visible(DerivedView::Table));
        assert!(!router.is_visible(DerivedView::Plot));
        assert!(!router.is_visible(DerivedView::Detail));
    }

    #[test]
    fn any_tab_is_reachable_from_any_tab() {
        let mut router = ViewRouter::default();
        for from in ActiveTab::ALL {
            for to in ActiveTab::ALL {
                router.select(from);
                assert_eq!(router.select(to), from != to);
                assert_eq!(router.active(), to);
            }
        }
    }

    #[test]
    fn parses_labels_and_ids() {
        assert_eq!("Graph".parse::<ActiveTab>(), Ok(ActiveTab::Graph));
        assert_eq!(" table ".parse::<ActiveTab>(), Ok(ActiveTab::Table));
        assert_eq!("tab-g".parse::<ActiveTab>(), Ok(ActiveTab::Graph));
        assert_eq!("tab-t".parse::<ActiveTab>(), Ok(ActiveTab::Table));
        assert_eq!("map".parse::<ActiveTab>(), Err(UnknownTab("map".into())));
    }

    #[test]
    fn dependencies() {
        let by_range: Vec<_> = DerivedView::affected_by(Input::Range).collect();
        assert_eq!(by_range, [DerivedView::Table, DerivedView::Plot]);
        let by_lasso: Vec<_> = DerivedView::affected_by(Input::Selection).collect();
        assert_eq!(by_lasso, [DerivedView::Detail]);
        assert_eq!(DerivedView::affected_by(Input::Tab).count(), 3);
    }
}
