use ndarray::{Array1, Array2};

use crate::error::{Error, Result};

/// Name of the regression target column.
pub const TARGET_COLUMN: &str = "soil_moisture";

// ---------------------------------------------------------------------------
// Band columns
// ---------------------------------------------------------------------------

/// Whether a header names a hyperspectral band.
///
/// Band columns are named by their wavelength, so a column is a feature
/// exactly when its name is non-empty and made of ASCII decimal digits only.
/// Everything else (`soil_moisture`, `datetime`, ...) is metadata or target.
pub fn is_band_column(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// Dataset – the loaded table as numeric arrays
// ---------------------------------------------------------------------------

/// The parsed soil-moisture table.
///
/// Rows of `features`, entries of `target` and entries of `index` are
/// aligned by position; columns of `features` follow `bands`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Row labels taken from the first CSV column.
    pub index: Vec<String>,
    /// Band column names in file order.
    pub bands: Vec<String>,
    /// Reflectance values, one row per sample.
    pub features: Array2<f64>,
    /// Measured soil moisture in percent.
    pub target: Array1<f64>,
}

impl Dataset {
    /// Assemble a dataset, checking that every part has the same row count.
    pub fn new(
        index: Vec<String>,
        bands: Vec<String>,
        features: Array2<f64>,
        target: Array1<f64>,
    ) -> Result<Self> {
        if features.nrows() != target.len() {
            return Err(Error::shape("feature rows vs targets", features.nrows(), target.len()));
        }
        if index.len() != target.len() {
            return Err(Error::shape("index vs targets", target.len(), index.len()));
        }
        if features.ncols() != bands.len() {
            return Err(Error::shape("feature columns vs bands", bands.len(), features.ncols()));
        }
        Ok(Dataset {
            index,
            bands,
            features,
            target,
        })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.target.len()
    }

    /// Whether the dataset has no samples.
    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    /// Band wavelengths in nm, parsed from the column names.
    pub fn wavelengths(&self) -> Vec<u32> {
        // Names that overflow u32 are still bands; they map to u32::MAX.
        self.bands
            .iter()
            .map(|b| b.parse().unwrap_or(u32::MAX))
            .collect()
    }

    /// Split into the `(X, y)` pair consumed by the regression notebooks.
    pub fn into_xy(self) -> (Array2<f64>, Array1<f64>) {
        (self.features, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn band_predicate() {
        assert!(is_band_column("454"));
        assert!(is_band_column("0950"));
        assert!(!is_band_column(""));
        assert!(!is_band_column("soil_moisture"));
        assert!(!is_band_column("454nm"));
        assert!(!is_band_column("-454"));
        assert!(!is_band_column("45.4"));
        assert!(!is_band_column(" 454"));
    }

    #[test]
    fn new_rejects_misaligned_rows() {
        let err = Dataset::new(
            vec!["0".into(), "1".into()],
            vec!["454".into()],
            array![[0.1], [0.2]],
            array![30.0],
        )
        .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { expected: 2, found: 1, .. }));
    }

    #[test]
    fn wavelengths_follow_band_order() {
        let ds = Dataset::new(
            vec!["0".into()],
            vec!["458".into(), "454".into()],
            array![[0.1, 0.2]],
            array![30.0],
        )
        .unwrap();
        assert_eq!(ds.wavelengths(), vec![458, 454]);
        assert_eq!(ds.len(), 1);
        let (x, y) = ds.into_xy();
        assert_eq!(x.nrows(), y.len());
    }
}
