use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::{DataSource, Row, RowId, Value};

// ---------------------------------------------------------------------------
// Numeric range
// ---------------------------------------------------------------------------

/// Closed interval `[min, max]` over the designated numeric column.
///
/// Range widgets can transiently emit `min > max` while being dragged; such a
/// range (or one with a NaN bound) contains nothing instead of being an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// A range nothing falls into.
    pub fn empty() -> Self {
        Self::new(f64::INFINITY, f64::NEG_INFINITY)
    }

    /// Inclusive on both ends.
    pub fn contains(&self, v: f64) -> bool {
        self.min <= v && v <= self.max
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_nan() || self.max.is_nan() || self.min > self.max
    }
}

// ---------------------------------------------------------------------------
// Filter predicate
// ---------------------------------------------------------------------------

/// The complete set of user-chosen constraints for the primary views.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    /// Column holding the category labels (e.g. `quality`).
    pub category_column: String,
    /// Column the range applies to (e.g. `fixed acidity`).
    pub numeric_column: String,
    /// Category keys a row may carry. Empty means nothing matches.
    pub allowed_categories: BTreeSet<String>,
    pub numeric_range: NumericRange,
}

/// Why a filter state cannot match anything. Reported, never raised.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterIssue {
    NoCategories,
    InvertedRange { min: f64, max: f64 },
    /// None of the allowed categories occur in the dataset.
    UnknownCategories(Vec<String>),
}

impl std::fmt::Display for FilterIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterIssue::NoCategories => write!(f, "no category selected"),
            FilterIssue::InvertedRange { min, max } => {
                write!(f, "range {min} to {max} is inverted")
            }
            FilterIssue::UnknownCategories(c) => write!(f, "unknown categories: {}", c.join(", ")),
        }
    }
}

impl FilterState {
    /// Page-load defaults: the first observed category and the full observed
    /// range of the numeric column.
    pub fn initial(source: &DataSource, category_column: &str, numeric_column: &str) -> Self {
        let allowed_categories = source
            .categories(category_column)
            .first()
            .cloned()
            .into_iter()
            .collect();
        Self::with_categories(source, category_column, numeric_column, allowed_categories)
    }

    /// Every category and the full observed range.
    #[cfg(test)]
    pub fn everything(source: &DataSource, category_column: &str, numeric_column: &str) -> Self {
        let allowed_categories = source.categories(category_column).iter().cloned().collect();
        Self::with_categories(source, category_column, numeric_column, allowed_categories)
    }

    fn with_categories(
        source: &DataSource,
        category_column: &str,
        numeric_column: &str,
        allowed_categories: BTreeSet<String>,
    ) -> Self {
        let numeric_range = source
            .bounds(numeric_column)
            .map(|(lo, hi)| NumericRange::new(lo, hi))
            .unwrap_or_else(NumericRange::empty);
        Self {
            category_column: category_column.to_string(),
            numeric_column: numeric_column.to_string(),
            allowed_categories,
            numeric_range,
        }
    }

    /// Row predicate. A row missing either field fails silently.
    pub fn matches(&self, row: &Row) -> bool {
        let Some(category) = row.get(&self.category_column).and_then(Value::as_category) else {
            return false;
        };
        let Some(v) = row.get(&self.numeric_column).and_then(Value::as_f64) else {
            return false;
        };
        self.allowed_categories.contains(&category) && self.numeric_range.contains(v)
    }

    /// Explain why this state matches nothing, if it obviously does.
    pub fn diagnose(&self, source: &DataSource) -> Option<FilterIssue> {
        if self.allowed_categories.is_empty() {
            return Some(FilterIssue::NoCategories);
        }
        if self.numeric_range.is_empty() {
            return Some(FilterIssue::InvertedRange {
                min: self.numeric_range.min,
                max: self.numeric_range.max,
            });
        }
        let known = source.categories(&self.category_column);
        if self.allowed_categories.iter().all(|c| !known.contains(c)) {
            return Some(FilterIssue::UnknownCategories(
                self.allowed_categories.iter().cloned().collect(),
            ));
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Ordered subsequence of source rows, by id. Order is the source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredView {
    pub ids: Vec<RowId>,
}

impl FilteredView {
    pub fn rows<'a>(&'a self, source: &'a DataSource) -> impl Iterator<Item = &'a Row> + 'a {
        self.ids.iter().filter_map(move |id| source.row(*id))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// The filter engine: rows passing `state`, in source order.
///
/// Pure: the same `(source, state)` always yields the same view.
pub fn apply(source: &DataSource, state: &FilterState) -> FilteredView {
    if state.allowed_categories.is_empty() || state.numeric_range.is_empty() {
        return FilteredView::default();
    }
    FilteredView {
        ids: source
            .rows()
            .iter()
            .filter(|row| state.matches(row))
            .map(|row| row.id)
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Lasso selection
// ---------------------------------------------------------------------------

/// How lassoed plot points are mapped back to source rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Correlation {
    /// Exactly the lassoed rows.
    #[default]
    RowId,
    /// Every row sharing a category with any lassoed point.
    Category,
}

/// A plotted point picked by the lasso.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedPoint {
    pub row: RowId,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SelectionKey {
    Row(RowId),
    Category(String),
}

/// The explicit selection behind the detail table.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    category_column: String,
    keys: BTreeSet<SelectionKey>,
}

impl Selection {
    pub fn from_points(
        points: &[SelectedPoint],
        correlation: Correlation,
        category_column: &str,
    ) -> Self {
        let keys = points
            .iter()
            .filter_map(|p| match correlation {
                Correlation::RowId => Some(SelectionKey::Row(p.row)),
                Correlation::Category => p.category.clone().map(SelectionKey::Category),
            })
            .collect();
        Self {
            category_column: category_column.to_string(),
            keys,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn matches(&self, row: &Row) -> bool {
        if self.keys.contains(&SelectionKey::Row(row.id)) {
            return true;
        }
        row.get(&self.category_column)
            .and_then(Value::as_category)
            .is_some_and(|c| self.keys.contains(&SelectionKey::Category(c)))
    }
}

/// Rows behind an explicit selection, in source order.
///
/// `None` when there is no selection or it is empty: the detail view is
/// withheld until something is selected. Not intersected with the primary
/// filter.
pub fn apply_selection(source: &DataSource, selection: Option<&Selection>) -> Option<FilteredView> {
    let selection = selection.filter(|s| !s.is_empty())?;
    Some(FilteredView {
        ids: source
            .rows()
            .iter()
            .filter(|row| selection.matches(row))
            .map(|row| row.id)
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::row;

    fn three_wines() -> DataSource {
        DataSource::from_rows(
            vec!["quality".into(), "acid".into()],
            vec![
                row([("quality", Value::from("3")), ("acid", Value::Float(6.0))]),
                row([("quality", Value::from("5")), ("acid", Value::Float(7.5))]),
                row([("quality", Value::from("3")), ("acid", Value::Float(9.0))]),
            ],
        )
    }

    fn state(cats: &[&str], min: f64, max: f64) -> FilterState {
        FilterState {
            category_column: "quality".into(),
            numeric_column: "acid".into(),
            allowed_categories: cats.iter().map(|c| c.to_string()).collect(),
            numeric_range: NumericRange::new(min, max),
        }
    }

    fn ids(v: &[usize]) -> Vec<RowId> {
        v.iter().copied().map(RowId).collect()
    }

    #[test]
    fn category_and_range_both_apply() {
        let ds = three_wines();
        let view = apply(&ds, &state(&["3"], 5.0, 8.0));
        assert_eq!(view.ids, ids(&[0]));
        let row = view.rows(&ds).next().unwrap();
        assert_eq!(row.get("acid"), Some(&Value::Float(6.0)));
    }

    #[test]
    fn wide_filter_keeps_everything_in_order() {
        let ds = three_wines();
        let view = apply(&ds, &state(&["3", "5"], 0.0, 100.0));
        assert_eq!(view.ids, ids(&[0, 1, 2]));
    }

    #[test]
    fn range_is_inclusive() {
        let ds = three_wines();
        assert_eq!(apply(&ds, &state(&["3", "5"], 6.0, 7.5)).ids, ids(&[0, 1]));
    }

    #[test]
    fn no_categories_matches_nothing() {
        let ds = three_wines();
        let s = state(&[], 0.0, 100.0);
        assert!(apply(&ds, &s).is_empty());
        assert_eq!(s.diagnose(&ds), Some(FilterIssue::NoCategories));
    }

    #[test]
    fn inverted_range_matches_nothing() {
        let ds = three_wines();
        let s = state(&["3", "5"], 8.0, 5.0);
        assert!(apply(&ds, &s).is_empty());
        assert!(matches!(s.diagnose(&ds), Some(FilterIssue::InvertedRange { .. })));
        assert!(NumericRange::new(f64::NAN, 1.0).is_empty());
    }

    #[test]
    fn unknown_category_matches_nothing() {
        let ds = three_wines();
        let s = state(&["11"], 0.0, 100.0);
        assert!(apply(&ds, &s).is_empty());
        assert!(matches!(s.diagnose(&ds), Some(FilterIssue::UnknownCategories(_))));
        assert_eq!(state(&["3"], 0.0, 100.0).diagnose(&ds), None);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let ds = DataSource::from_rows(
            vec!["quality".into(), "acid".into()],
            vec![
                row([("quality", Value::from("3"))]),
                row([("acid", Value::Float(6.0))]),
                row([("quality", Value::from("3")), ("acid", Value::from("sour"))]),
                row([("quality", Value::Null), ("acid", Value::Float(6.0))]),
                row([("quality", Value::from("3")), ("acid", Value::Float(6.0))]),
            ],
        );
        assert_eq!(apply(&ds, &state(&["3"], 0.0, 100.0)).ids, ids(&[4]));
    }

    #[test]
    fn integer_quality_matches_string_label() {
        let ds = DataSource::from_rows(
            vec!["quality".into(), "acid".into()],
            vec![
                row([("quality", Value::Integer(6)), ("acid", Value::Float(7.0))]),
                row([("quality", Value::Integer(5)), ("acid", Value::Float(7.0))]),
            ],
        );
        assert_eq!(apply(&ds, &state(&["6"], 0.0, 10.0)).ids, ids(&[0]));
    }

    #[test]
    fn initial_state_picks_first_category_and_full_range() {
        let ds = three_wines();
        let s = FilterState::initial(&ds, "quality", "acid");
        assert_eq!(s.allowed_categories, BTreeSet::from(["3".to_string()]));
        assert_eq!(s.numeric_range, NumericRange::new(6.0, 9.0));
        assert_eq!(apply(&ds, &s).ids, ids(&[0, 2]));
    }

    #[test]
    fn selection_by_row_id_is_exact() {
        let ds = three_wines();
        let points = [SelectedPoint {
            row: RowId(0),
            category: Some("3".into()),
        }];
        let sel = Selection::from_points(&points, Correlation::RowId, "quality");
        assert_eq!(apply_selection(&ds, Some(&sel)).unwrap().ids, ids(&[0]));
    }

    #[test]
    fn selection_by_category_pulls_in_siblings() {
        let ds = three_wines();
        let points = [SelectedPoint {
            row: RowId(0),
            category: Some("3".into()),
        }];
        let sel = Selection::from_points(&points, Correlation::Category, "quality");
        assert_eq!(apply_selection(&ds, Some(&sel)).unwrap().ids, ids(&[0, 2]));
    }

    #[test]
    fn missing_or_empty_selection_is_withheld() {
        let ds = three_wines();
        assert_eq!(apply_selection(&ds, None), None);
        let empty = Selection::from_points(&[], Correlation::RowId, "quality");
        assert_eq!(apply_selection(&ds, Some(&empty)), None);
    }

    #[test]
    fn selection_ignores_primary_filter() {
        let ds = three_wines();
        let filtered = apply(&ds, &state(&["3"], 0.0, 100.0));
        let points = [SelectedPoint {
            row: RowId(1),
            category: Some("5".into()),
        }];
        let sel = Selection::from_points(&points, Correlation::RowId, "quality");
        let detail = apply_selection(&ds, Some(&sel)).unwrap();
        assert_eq!(detail.ids, ids(&[1]));
        assert!(!filtered.ids.contains(&RowId(1)));
    }
}
