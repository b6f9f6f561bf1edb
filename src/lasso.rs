use crate::data::filter::{FilteredView, SelectedPoint};
use crate::data::model::{DataSource, RowId, Value};

// ---------------------------------------------------------------------------
// Scatter points
// ---------------------------------------------------------------------------

/// One plotted marker, carrying enough to find its row again.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub row: RowId,
    pub category: Option<String>,
    pub x: f64,
    pub y: f64,
}

impl ScatterPoint {
    /// Markers for the rows of `view`. Rows without numeric x and y are not
    /// plotted.
    pub fn collect(
        source: &DataSource,
        view: &FilteredView,
        x_column: &str,
        y_column: &str,
        category_column: &str,
    ) -> Vec<ScatterPoint> {
        view.rows(source)
            .filter_map(|r| {
                let x = r.get(x_column).and_then(Value::as_f64)?;
                let y = r.get(y_column).and_then(Value::as_f64)?;
                Some(ScatterPoint {
                    row: r.id,
                    category: r.get(category_column).and_then(Value::as_category),
                    x,
                    y,
                })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Lasso path
// ---------------------------------------------------------------------------

/// A free-form polygon in plot coordinates, implicitly closed.
///
/// The finished path stays on screen after the gesture ends; `drawing` is
/// only set between [`LassoPath::begin`] and [`LassoPath::finish`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LassoPath {
    vertices: Vec<[f64; 2]>,
    drawing: bool,
}

impl LassoPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vertex; repeats of the last vertex are dropped.
    pub fn push(&mut self, p: [f64; 2]) {
        if self.vertices.last() != Some(&p) {
            self.vertices.push(p);
        }
    }

    pub fn vertices(&self) -> &[[f64; 2]] {
        &self.vertices
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.drawing = false;
    }

    /// Start a new lasso gesture, discarding the previous path.
    pub fn begin(&mut self) {
        self.vertices.clear();
        self.drawing = true;
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// End of any drag on the plot. True only when a lasso gesture was in
    /// progress and its path encloses an area; other drags (pans) end here
    /// too and must not touch the selection.
    pub fn finish(&mut self) -> bool {
        std::mem::take(&mut self.drawing) && !self.is_degenerate()
    }

    /// Fewer than three vertices enclose no area.
    pub fn is_degenerate(&self) -> bool {
        self.vertices.len() < 3
    }

    /// Even-odd ray cast towards +x.
    pub fn contains(&self, [px, py]: [f64; 2]) -> bool {
        if self.is_degenerate() {
            return false;
        }
        let n = self.vertices.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let [xi, yi] = self.vertices[i];
            let [xj, yj] = self.vertices[j];
            if (yi > py) != (yj > py) {
                let cross_x = xi + (py - yi) * (xj - xi) / (yj - yi);
                if px < cross_x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// The markers inside the lasso, as selection events.
    pub fn select(&self, points: &[ScatterPoint]) -> Vec<SelectedPoint> {
        points
            .iter()
            .filter(|p| self.contains([p.x, p.y]))
            .map(|p| SelectedPoint {
                row: p.row,
                category: p.category.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply, FilterState};
    use crate::data::model::row;

    fn square() -> LassoPath {
        let mut lasso = LassoPath::new();
        for p in [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]] {
            lasso.push(p);
        }
        lasso
    }

    #[test]
    fn inside_and_outside() {
        let lasso = square();
        assert!(lasso.contains([2.0, 2.0]));
        assert!(!lasso.contains([5.0, 2.0]));
        assert!(!lasso.contains([2.0, -0.5]));
    }

    #[test]
    fn concave_notch_is_outside() {
        let mut lasso = LassoPath::new();
        for p in [[0.0, 0.0], [6.0, 0.0], [6.0, 6.0], [3.0, 2.0], [0.0, 6.0]] {
            lasso.push(p);
        }
        assert!(lasso.contains([1.0, 1.0]));
        assert!(!lasso.contains([3.0, 4.0]));
    }

    #[test]
    fn short_paths_select_nothing() {
        let mut lasso = LassoPath::new();
        lasso.push([0.0, 0.0]);
        lasso.push([0.0, 0.0]);
        lasso.push([1.0, 1.0]);
        assert_eq!(lasso.vertices().len(), 2);
        assert!(lasso.is_degenerate());
        assert!(!lasso.contains([0.5, 0.5]));
    }

    #[test]
    fn only_a_lasso_gesture_finishes() {
        let mut lasso = LassoPath::new();
        lasso.begin();
        for p in [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]] {
            lasso.push(p);
        }
        assert!(lasso.is_drawing());
        assert!(lasso.finish());
        assert!(!lasso.is_drawing());

        // A later pan ends a drag too; the kept path must not re-select.
        assert!(!lasso.finish());
        assert_eq!(lasso.vertices().len(), 4);
    }

    #[test]
    fn short_gesture_does_not_finish() {
        let mut lasso = LassoPath::new();
        lasso.begin();
        lasso.push([0.0, 0.0]);
        lasso.push([1.0, 1.0]);
        assert!(!lasso.finish());
        assert!(!lasso.is_drawing());
    }

    #[test]
    fn selects_visible_markers_only() {
        let ds = DataSource::from_rows(
            vec!["quality".into(), "fa".into(), "va".into()],
            vec![
                row([("quality", Value::Integer(5)), ("fa", Value::Float(1.0)), ("va", Value::Float(1.0))]),
                row([("quality", Value::Integer(6)), ("fa", Value::Float(2.0)), ("va", Value::Null)]),
                row([("quality", Value::Integer(6)), ("fa", Value::Float(3.0)), ("va", Value::Float(3.0))]),
                row([("quality", Value::Integer(7)), ("fa", Value::Float(9.0)), ("va", Value::Float(1.0))]),
            ],
        );
        let view = apply(&ds, &FilterState::everything(&ds, "quality", "fa"));
        let markers = ScatterPoint::collect(&ds, &view, "fa", "va", "quality");
        assert_eq!(markers.len(), 3);

        let picked = square().select(&markers);
        assert_eq!(
            picked,
            vec![
                SelectedPoint { row: RowId(0), category: Some("5".into()) },
                SelectedPoint { row: RowId(2), category: Some("6".into()) },
            ]
        );
    }
}
