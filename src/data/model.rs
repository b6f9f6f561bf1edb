use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// Value – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
/// Used as a `BTreeSet` key downstream, so `Value` must be `Ord`.
/// Equality follows the ordering: `Integer(3) == Float(3.0)`.
#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put Value in BTreeSet --

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        // Integers and floats share a rank so that 3 < 3.5 < 4.
        fn rank(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) | Float(_) => 2,
                String(_) => 3,
            }
        }
        let ra = rank(self);
        let rb = rank(other);
        if ra != rb {
            return ra.cmp(&rb);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (a, b) => {
                let fa = a.as_f64().unwrap_or(f64::NAN);
                let fb = b.as_f64().unwrap_or(f64::NAN);
                fa.total_cmp(&fb)
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => write!(f, ""),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl Value {
    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Key used when the value acts as a category label.
    ///
    /// Integral floats drop their fractional part so that a quality of `6`
    /// read as `6.0` still matches the label `"6"`.
    pub fn as_category(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => Some(format!("{}", *v as i64)),
            Value::Float(v) if v.is_finite() => Some(v.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Float(_) | Value::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

// ---------------------------------------------------------------------------
// Row – one record of the dataset
// ---------------------------------------------------------------------------

/// Stable identity of a row: its position in the [`DataSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(pub usize);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single record: column_name → value.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: RowId,
    pub cells: BTreeMap<String, Value>,
}

impl Row {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }
}

// ---------------------------------------------------------------------------
// Column schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Every non-null value is coercible to `f64`.
    Numeric,
    Categorical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

// ---------------------------------------------------------------------------
// DataSource – the complete loaded table
// ---------------------------------------------------------------------------

/// The immutable, load-once table with pre-computed column indices.
///
/// Built once at startup and shared read-only (behind an `Arc`) by every
/// session; nothing hands out a mutable reference after construction.
#[derive(Debug, Clone)]
pub struct DataSource {
    rows: Vec<Row>,
    /// Columns in header order.
    columns: Vec<Column>,
    /// For each column the sorted, de-duplicated category keys.
    categories: BTreeMap<String, Vec<String>>,
    /// Observed `(min, max)` for each numeric column that has any value.
    bounds: BTreeMap<String, (f64, f64)>,
}

impl DataSource {
    /// Build column indices from loaded rows.
    ///
    /// `column_names` gives header order. Row ids are reassigned from the
    /// row positions so that `rows()[i].id == RowId(i)` always holds.
    pub fn from_rows(column_names: Vec<String>, rows: Vec<Row>) -> Self {
        let rows: Vec<Row> = rows
            .into_iter()
            .enumerate()
            .map(|(i, mut row)| {
                row.id = RowId(i);
                row
            })
            .collect();

        let mut columns = Vec::with_capacity(column_names.len());
        let mut categories = BTreeMap::new();
        let mut bounds = BTreeMap::new();

        for name in column_names {
            let mut unique: BTreeSet<&Value> = BTreeSet::new();
            let mut numeric = true;
            let mut lo = f64::INFINITY;
            let mut hi = f64::NEG_INFINITY;

            for row in &rows {
                let Some(val) = row.get(&name) else { continue };
                if val.is_null() {
                    continue;
                }
                unique.insert(val);
                match val.as_f64() {
                    Some(v) if v.is_finite() => {
                        lo = lo.min(v);
                        hi = hi.max(v);
                    }
                    Some(_) => {}
                    None => numeric = false,
                }
            }

            // Keys follow value order (numeric labels sort numerically).
            let mut keys: Vec<String> = Vec::with_capacity(unique.len());
            for key in unique.iter().filter_map(|v| v.as_category()) {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
            categories.insert(name.clone(), keys);

            let kind = if numeric {
                if lo <= hi {
                    bounds.insert(name.clone(), (lo, hi));
                }
                ColumnKind::Numeric
            } else {
                ColumnKind::Categorical
            };
            columns.push(Column { name, kind });
        }

        DataSource {
            rows,
            columns,
            categories,
            bounds,
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.rows.get(id.0)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Sorted unique category keys of a column (empty if unknown).
    pub fn categories(&self, column: &str) -> &[String] {
        self.categories
            .get(column)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Observed `(min, max)` of a numeric column.
    pub fn bounds(&self, column: &str) -> Option<(f64, f64)> {
        self.bounds.get(column).copied()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Build a row from `(column, value)` pairs. The id is assigned by
/// [`DataSource::from_rows`].
pub fn row<K, V, I>(cells: I) -> Row
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    Row {
        id: RowId(0),
        cells: cells
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect(),
    }
}
