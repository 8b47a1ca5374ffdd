/// Data layer: sanitizing, loading, and summarizing logger files.
///
/// Architecture:
/// ```text
///  .tsv / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │ sanitize  │  raw lines → exclusion set
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  retained lines → LoggerTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ filter/stats  │  recognized sensors → StatisticsSummary
///   └──────────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod sanitize;
pub mod stats;
pub mod time;
