/// Data layer: core types, loading, filtering, querying and statistics.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable → Dataset (schema checked once)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  source   │  named sources, opened once: Arc<Dataset> + SQLite table
///   └──────────┘
///        │
///        ├──────────────┬───────────────┐
///        ▼              ▼               ▼
///   ┌──────────┐   ┌──────────┐   ┌──────────┐
///   │  filter   │   │  query    │   │  stats    │
///   └──────────┘   └──────────┘   └──────────┘
///   x > threshold   SQL text →     summary, correlations,
///   row indices     RowSet         histograms, OLS
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod query;
pub mod source;
pub mod stats;
