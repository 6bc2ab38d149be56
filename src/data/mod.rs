/// Data layer: dataset types, loading, and train/test splitting.
///
/// Architecture:
/// ```text
///  remote .csv (DATASET_URL)  /  local .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse header → band columns + soil_moisture
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset  │  X: Array2<f64>, y: Array1<f64>, row index
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  split    │  shuffle / label mask / cutoff → row partitions
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod split;
