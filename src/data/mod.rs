/// Data layer: core types, loading, statistics, and filtering.
///
/// Architecture:
/// ```text
///  .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  schema   │  field path → type tag
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  bounds / counts per numeric field
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply range filters → filtered indices
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
pub mod stats;
