/// Data layer: core types, loading, filtering, aggregation and export.
///
/// Architecture:
/// ```text
///  .csv / .txt / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (fails whole load on bad rows)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterCriteria → filtered rows (order preserved)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  sums by category / region / month, pivot, sample
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  views → CSV downloads
///   └──────────┘
/// ```

pub mod aggregate;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
