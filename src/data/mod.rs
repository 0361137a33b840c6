/// Data layer: core types, loading, and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<LaunchRecord>, site / category index
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  site + payload selection → PieChart / ScatterChart
///   └───────────┘
/// ```

pub mod aggregate;
pub mod error;
pub mod loader;
pub mod model;
