use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Source of the hyperspectral soil-moisture table.
pub const DATASET_URL: &str = "https://raw.githubusercontent.com/felixriese/hyperspectral-soilmoisture-dataset/master/soilmoisture_dataset.csv";

/// Seed shared by the shuffle split and the label mask.
pub const SEED: u64 = 42;

/// Fraction of rows assigned to the test partition.
pub const TEST_SIZE: f64 = 0.5;

pub const RESULTS_DIR: &str = "results";
pub const PLOTS_DIR: &str = "plots";

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// The fixed experiment parameters, gathered in one place.
///
/// `Settings::default()` reproduces the constants above and is what the
/// plain entry points use.  The `_with` loaders and splits take a
/// `&Settings`; the `_in` writers take `results_dir` or `plots_dir`:
///
/// ```
/// use ndarray::{Array1, Array2};
/// use soilmoisture_utils::config::Settings;
/// use soilmoisture_utils::semi_supervised_split;
///
/// let settings = Settings::from_json_str(r#"{ "seed": 7, "test_size": 0.25 }"#).unwrap();
/// assert_eq!(settings.results_dir.to_str(), Some("results"));
///
/// let x = Array2::<f64>::zeros((8, 3));
/// let y = Array1::linspace(10.0, 45.0, 8);
/// let split = semi_supervised_split(&x, &y, 0.0, &settings).unwrap();
/// assert_eq!(split.split().y_test.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub dataset_url: String,
    pub seed: u64,
    pub test_size: f64,
    pub results_dir: PathBuf,
    pub plots_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dataset_url: DATASET_URL.to_string(),
            seed: SEED,
            test_size: TEST_SIZE,
            results_dir: PathBuf::from(RESULTS_DIR),
            plots_dir: PathBuf::from(PLOTS_DIR),
        }
    }
}

impl Settings {
    /// Parse settings from JSON; absent keys keep their default.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
