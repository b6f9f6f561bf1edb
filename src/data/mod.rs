/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → DataSource (validated, read-only)
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ DataSource │  Vec<Row>, column schema, categories, bounds
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterState / Selection → FilteredView
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
