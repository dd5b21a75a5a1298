//! Per-flow normalization, sliding-window sample generation and the train/test split of the
//! generated samples.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// How a flow is rescaled before windowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Normalization {
    /// Rescale to `[0, 1]` using the minimum and maximum of the whole series.
    #[default]
    MinMax,
    /// Subtract the mean and divide by the (population) standard deviation.
    ZScore,
}

/// Scaling parameters fitted on one complete series. Computed once per flow, before any window
/// is generated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Scaler {
    /// The series is constant (or empty). Values are left as they are, and denormalization
    /// always yields the constant.
    Constant { value: f64 },
    MinMax { min: f64, max: f64 },
    ZScore { mean: f64, std: f64 },
}

impl Scaler {
    /// Fit the scaler on `values`.
    pub fn fit(values: &[f64], normalization: Normalization) -> Self {
        let Some(&first) = values.first() else {
            return Self::Constant { value: 0.0 };
        };
        let (min, max) = values
            .iter()
            .fold((first, first), |(min, max), &x| (min.min(x), max.max(x)));
        if min == max {
            return Self::Constant { value: min };
        }

        match normalization {
            Normalization::MinMax => Self::MinMax { min, max },
            Normalization::ZScore => {
                let n = values.len() as f64;
                let mean = values.iter().sum::<f64>() / n;
                let var = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
                Self::ZScore {
                    mean,
                    std: var.sqrt(),
                }
            }
        }
    }

    pub fn normalize(&self, x: f64) -> f64 {
        match *self {
            Self::Constant { .. } => x,
            Self::MinMax { min, max } => (x - min) / (max - min),
            Self::ZScore { mean, std } => (x - mean) / std,
        }
    }

    pub fn denormalize(&self, x: f64) -> f64 {
        match *self {
            Self::Constant { value } => value,
            Self::MinMax { min, max } => x * (max - min) + min,
            Self::ZScore { mean, std } => x * std + mean,
        }
    }

    /// Smallest value of the series the scaler was fitted on, if known.
    pub fn min(&self) -> Option<f64> {
        match *self {
            Self::Constant { value } => Some(value),
            Self::MinMax { min, .. } => Some(min),
            Self::ZScore { .. } => None,
        }
    }

    /// Largest value of the series the scaler was fitted on, if known.
    pub fn max(&self) -> Option<f64> {
        match *self {
            Self::Constant { value } => Some(value),
            Self::MinMax { max, .. } => Some(max),
            Self::ZScore { .. } => None,
        }
    }
}

/// Fit a scaler on `values` and return the rescaled series together with the scaler.
pub fn normalize(values: &[f64], normalization: Normalization) -> (Vec<f64>, Scaler) {
    let scaler = Scaler::fit(values, normalization);
    let normalized = values.iter().map(|x| scaler.normalize(*x)).collect();
    (normalized, scaler)
}

/// One sliding-window sample: the `k` values of the history, and the value right after.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window<'a> {
    pub history: &'a [f64],
    pub label: f64,
}

/// Number of windows of length `k` on a series of length `len`.
pub fn num_windows(len: usize, k: usize) -> usize {
    len.saturating_sub(k)
}

/// All overlapping windows of length `k`, sliding by one step. A series shorter than `k + 1`
/// produces no window at all.
pub fn windows(series: &[f64], k: usize) -> impl Iterator<Item = Window<'_>> + '_ {
    series.windows(k + 1).map(move |w| Window {
        history: &w[..k],
        label: w[k],
    })
}

/// Number of training samples: `ratio` of all samples, rounded down to a multiple of
/// `multiple`. A `multiple` of zero disables the rounding.
pub fn train_len(num_samples: usize, ratio: f64, multiple: usize) -> usize {
    let ratio = ratio.clamp(0.0, 1.0);
    let len = (num_samples as f64 * ratio).floor() as usize;
    let len = if multiple == 0 {
        len
    } else {
        len / multiple * multiple
    };
    len.min(num_samples)
}

/// Index ranges of the training and the held-out samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Range<usize>,
    pub test: Range<usize>,
}

impl Split {
    pub fn new(num_samples: usize, ratio: f64, multiple: usize) -> Self {
        let train = train_len(num_samples, ratio, multiple);
        Self {
            train: 0..train,
            test: train..num_samples,
        }
    }
}
