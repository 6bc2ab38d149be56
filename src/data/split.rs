use log::{debug, info};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::loader::get_xy_with;
use crate::config::Settings;
use crate::error::{Error, Result};

/// Label written over masked training targets.
pub const UNLABELED: f64 = -1.0;

/// Default moisture cutoff of the shifted split, in percent.
pub const DEFAULT_CUT: f64 = 35.0;

// ---------------------------------------------------------------------------
// Split results
// ---------------------------------------------------------------------------

/// A random train/test partition of `(X, y)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
}

impl TrainTestSplit {
    /// `(x_train, x_test, y_train, y_test)`
    pub fn into_tuple(self) -> (Array2<f64>, Array2<f64>, Array1<f64>, Array1<f64>) {
        (self.x_train, self.x_test, self.y_train, self.y_test)
    }
}

/// Result of [`get_xy_split`]: a plain split when nothing is masked,
/// otherwise the split plus a training target copy with hidden labels.
#[derive(Debug, Clone, PartialEq)]
pub enum SemiSupervisedSplit {
    Supervised(TrainTestSplit),
    SemiSupervised {
        /// `split.y_train` keeps every label.
        split: TrainTestSplit,
        /// `split.y_train` with [`UNLABELED`] at the masked rows.
        y_train_semi: Array1<f64>,
    },
}

/// Positional shapes of a [`SemiSupervisedSplit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SplitParts {
    /// `(x_train, x_test, y_train, y_test)`
    Four(Array2<f64>, Array2<f64>, Array1<f64>, Array1<f64>),
    /// `(x_train, x_test, y_train_semi, y_test, y_train)`
    Five(Array2<f64>, Array2<f64>, Array1<f64>, Array1<f64>, Array1<f64>),
}

impl SemiSupervisedSplit {
    /// The underlying train/test partition, with unmasked labels.
    pub fn split(&self) -> &TrainTestSplit {
        match self {
            SemiSupervisedSplit::Supervised(split) => split,
            SemiSupervisedSplit::SemiSupervised { split, .. } => split,
        }
    }

    /// The masked training targets, if any labels were hidden.
    pub fn y_train_semi(&self) -> Option<&Array1<f64>> {
        match self {
            SemiSupervisedSplit::Supervised(_) => None,
            SemiSupervisedSplit::SemiSupervised { y_train_semi, .. } => Some(y_train_semi),
        }
    }

    pub fn into_parts(self) -> SplitParts {
        match self {
            SemiSupervisedSplit::Supervised(s) => SplitParts::Four(s.x_train, s.x_test, s.y_train, s.y_test),
            SemiSupervisedSplit::SemiSupervised { split: s, y_train_semi } => {
                SplitParts::Five(s.x_train, s.x_test, y_train_semi, s.y_test, s.y_train)
            }
        }
    }
}

/// Rows partitioned by thresholding the target.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftedSplit {
    /// Rows with `y < cut`, in original order.
    pub x_below: Array2<f64>,
    /// Every other row (`y >= cut` or NaN), in original order.
    pub x_at_or_above: Array2<f64>,
    pub y_below: Array1<f64>,
    pub y_at_or_above: Array1<f64>,
}

impl ShiftedSplit {
    /// Positional form matching the historical notebook helper:
    /// `(x_below, x_at_or_above, y_at_or_above, y_below)`.
    ///
    /// Note the target order is swapped relative to the features.
    pub fn into_tuple(self) -> (Array2<f64>, Array2<f64>, Array1<f64>, Array1<f64>) {
        (self.x_below, self.x_at_or_above, self.y_at_or_above, self.y_below)
    }
}

// ---------------------------------------------------------------------------
// Loader-backed entry points
// ---------------------------------------------------------------------------

/// Fetch the dataset and split it 50/50 with the fixed seed, optionally
/// hiding a fraction of the training labels.
///
/// `missing_rate == 0.0` yields [`SemiSupervisedSplit::Supervised`].
pub fn get_xy_split(missing_rate: f64) -> Result<SemiSupervisedSplit> {
    get_xy_split_with(&Settings::default(), missing_rate)
}

/// [`get_xy_split`] with the URL, seed and test size taken from `settings`.
pub fn get_xy_split_with(settings: &Settings, missing_rate: f64) -> Result<SemiSupervisedSplit> {
    let (x, y) = get_xy_with(settings)?;
    semi_supervised_split(&x, &y, missing_rate, settings)
}

/// Fetch the dataset and partition it at `cut` (see [`shifted_split`]).
pub fn get_xy_shifted(cut: f64) -> Result<ShiftedSplit> {
    get_xy_shifted_with(&Settings::default(), cut)
}

pub fn get_xy_shifted_with(settings: &Settings, cut: f64) -> Result<ShiftedSplit> {
    let (x, y) = get_xy_with(settings)?;
    shifted_split(&x, &y, cut)
}

// ---------------------------------------------------------------------------
// Pure splitters
// ---------------------------------------------------------------------------

/// Shuffle row indices with `seed` and cut off the test partition.
///
/// The test partition holds `ceil(test_size * n)` rows (clamped to `n`),
/// taken from the front of the permutation; train holds the rest.
pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    test_size: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    check_rows(x, y)?;
    let n = y.len();
    let n_test = ((test_size * n as f64).ceil().max(0.0) as usize).min(n);

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed));
    let (test_idx, train_idx) = order.split_at(n_test);

    info!("split {n} rows into {} train / {} test", train_idx.len(), test_idx.len());
    Ok(TrainTestSplit {
        x_train: x.select(Axis(0), train_idx),
        x_test: x.select(Axis(0), test_idx),
        y_train: y.select(Axis(0), train_idx),
        y_test: y.select(Axis(0), test_idx),
    })
}

/// Random split at `settings.test_size` plus label masking at `missing_rate`,
/// both driven by `settings.seed`.
///
/// The rate is not validated: `>= 1.0` masks every row, `<= 0.0` none
/// (exactly `0.0` returns the plain split).
pub fn semi_supervised_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    missing_rate: f64,
    settings: &Settings,
) -> Result<SemiSupervisedSplit> {
    let split = train_test_split(x, y, settings.test_size, settings.seed)?;
    if missing_rate == 0.0 {
        return Ok(SemiSupervisedSplit::Supervised(split));
    }

    let mask = unlabeled_mask(split.y_train.len(), missing_rate, settings.seed);
    let mut y_train_semi = split.y_train.clone();
    for (label, &hidden) in y_train_semi.iter_mut().zip(&mask) {
        if hidden {
            *label = UNLABELED;
        }
    }
    debug!(
        "masked {} of {} training labels (rate {missing_rate})",
        mask.iter().filter(|&&m| m).count(),
        mask.len()
    );

    Ok(SemiSupervisedSplit::SemiSupervised { split, y_train_semi })
}

/// One uniform `[0, 1)` draw per row from a fresh generator seeded with
/// `seed`; a row is hidden when its draw is below `missing_rate`.
pub fn unlabeled_mask(n: usize, missing_rate: f64, seed: u64) -> Vec<bool> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen::<f64>() < missing_rate).collect()
}

/// Order-preserving partition at `cut`: `y < cut` against the rest.
///
/// A NaN target fails `y < cut` and lands on the upper side, so the two
/// parts always cover every row.
pub fn shifted_split(x: &Array2<f64>, y: &Array1<f64>, cut: f64) -> Result<ShiftedSplit> {
    check_rows(x, y)?;
    let (below, above): (Vec<usize>, Vec<usize>) = (0..y.len()).partition(|&i| y[i] < cut);

    info!("cut at {cut}: {} below, {} at or above", below.len(), above.len());
    Ok(ShiftedSplit {
        x_below: x.select(Axis(0), &below),
        x_at_or_above: x.select(Axis(0), &above),
        y_below: y.select(Axis(0), &below),
        y_at_or_above: y.select(Axis(0), &above),
    })
}

fn check_rows(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(Error::shape("feature rows vs targets", x.nrows(), y.len()));
    }
    Ok(())
}
