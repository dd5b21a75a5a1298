// TMPRED: Per-Flow Traffic Matrix Prediction on Backbone Topologies
// Copyright (C) 2024-2025 Roland Schmid <roschmi@ethz.ch> and Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! Prediction of held-out windows, and conversion of the model outputs back to traffic volumes.

use burn::tensor::backend::Backend;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use tmpred_utils::series::{Scaler, Window};

use crate::{model::Regressor, training::SequenceBatch};

/// Treatment of negative predictions.
///
/// The Abilene experiments flipped the sign of negative predictions. This is kept as the
/// default so results stay comparable, but every flip is counted and reported.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum, strum::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum NegativePolicy {
    /// Take the absolute value.
    #[default]
    Abs,
    /// Clip to zero.
    Clip,
    /// Keep negative values.
    Keep,
}

impl NegativePolicy {
    /// Apply the policy to `x`. Returns the new value and whether it was changed.
    pub fn apply(self, x: f64) -> (f64, bool) {
        if x >= 0.0 {
            return (x, false);
        }
        match self {
            Self::Abs => (-x, true),
            Self::Clip => (0.0, true),
            Self::Keep => (x, false),
        }
    }
}

/// Predict the next value of every window, in window order. The returned values are still
/// normalized.
pub fn predict<B, M>(
    model: &M,
    windows: &[Window<'_>],
    batch_size: usize,
    device: &B::Device,
) -> Result<Vec<f64>, InferenceError>
where
    B: Backend,
    M: Regressor<B>,
{
    let indices: Vec<usize> = (0..windows.len()).collect();
    let mut predictions = Vec::with_capacity(windows.len());
    for chunk in indices.chunks(batch_size.max(1)) {
        let batch = SequenceBatch::<B>::new(windows, chunk, device);
        let output = model.forward(batch.inputs, batch.mask_pad);
        let values = output
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| InferenceError::Data(format!("{e:?}")))?;
        if values.len() != chunk.len() {
            return Err(InferenceError::Shape {
                expected: chunk.len(),
                got: values.len(),
            });
        }
        predictions.extend(values.into_iter().map(f64::from));
    }
    Ok(predictions)
}

/// Predictions of one flow in traffic volumes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowPrediction {
    pub values: Vec<f64>,
    /// Number of predictions changed by the `NegativePolicy`.
    pub adjusted: usize,
}

/// Undo the normalization of `predictions` and apply `policy` to negative values.
///
/// Under min-max scaling a negative normalized value lies below the minimum of the flow, so the
/// policy acts on the normalized value. Otherwise a negative normalized value is just below the
/// mean, and the policy acts on the traffic volume.
pub fn denormalize(
    predictions: &[f64],
    scaler: &Scaler,
    policy: NegativePolicy,
) -> FlowPrediction {
    let mut adjusted = 0;
    let values = predictions
        .iter()
        .map(|&x| {
            let (x, changed) = match scaler {
                Scaler::MinMax { .. } => {
                    let (x, changed) = policy.apply(x);
                    (scaler.denormalize(x), changed)
                }
                Scaler::ZScore { .. } | Scaler::Constant { .. } => {
                    policy.apply(scaler.denormalize(x))
                }
            };
            adjusted += changed as usize;
            x
        })
        .collect();
    FlowPrediction { values, adjusted }
}

/// Error type for running inference.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Cannot read the model output: {0}")]
    Data(String),
    #[error("The model returned {got} predictions for {expected} windows")]
    Shape { expected: usize, got: usize },
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{model::SequenceModelConfig, InferenceBackend as B};

    #[test]
    fn negative_policies() {
        assert_eq!(NegativePolicy::Abs.apply(-0.25), (0.25, true));
        assert_eq!(NegativePolicy::Clip.apply(-0.25), (0.0, true));
        assert_eq!(NegativePolicy::Keep.apply(-0.25), (-0.25, false));
        for policy in [NegativePolicy::Abs, NegativePolicy::Clip, NegativePolicy::Keep] {
            assert_eq!(policy.apply(0.5), (0.5, false));
        }
    }

    #[test]
    fn undo_normalization() {
        let scaler = Scaler::MinMax {
            min: 100.0,
            max: 200.0,
        };
        let prediction = denormalize(&[0.5, -0.1, 1.0], &scaler, NegativePolicy::Abs);
        assert_eq!(prediction.adjusted, 1);
        assert!((prediction.values[0] - 150.0).abs() < 1e-9);
        assert!((prediction.values[1] - 110.0).abs() < 1e-9);
        assert!((prediction.values[2] - 200.0).abs() < 1e-9);

        let prediction = denormalize(&[-0.1], &scaler, NegativePolicy::Clip);
        assert_eq!(prediction.values, vec![100.0]);
    }

    #[test]
    fn z_score_below_mean_is_kept() {
        let std = 200f64.sqrt();
        let scaler = Scaler::ZScore { mean: 100.0, std };
        let prediction = denormalize(&[-10.0 / std, 10.0 / std], &scaler, NegativePolicy::Abs);
        assert_eq!(prediction.adjusted, 0);
        assert!((prediction.values[0] - 90.0).abs() < 1e-9);
        assert!((prediction.values[1] - 110.0).abs() < 1e-9);

        // negative volumes are still subject to the policy
        let scaler = Scaler::ZScore {
            mean: 10.0,
            std: 10.0,
        };
        let prediction = denormalize(&[-2.0], &scaler, NegativePolicy::Abs);
        assert_eq!(prediction.adjusted, 1);
        assert!((prediction.values[0] - 10.0).abs() < 1e-9);
        let prediction = denormalize(&[-2.0], &scaler, NegativePolicy::Clip);
        assert_eq!(prediction.values, vec![0.0]);
    }

    #[test]
    fn one_prediction_per_window() {
        let device = Default::default();
        let model = SequenceModelConfig::new()
            .with_hidden_size(4)
            .init_lstm::<B>(&device);
        let series: Vec<f64> = (0..40).map(|x| x as f64 / 40.0).collect();
        let windows: Vec<_> = tmpred_utils::series::windows(&series, 10).collect();
        let predictions = predict::<B, _>(&model, &windows, 7, &device).unwrap();
        assert_eq!(predictions.len(), 30);
        assert!(predictions.iter().all(|x| x.is_finite()));
        assert!(predict::<B, _>(&model, &[], 7, &device).unwrap().is_empty());
    }
}
