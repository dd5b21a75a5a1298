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
//! Error metrics of reconstructed traffic matrices w.r.t. the measured ones.

use std::cmp::Ordering;

use statrs::statistics::Statistics;

use crate::matrix::TrafficMatrix;

/// Mean of `values`, `NaN` if empty.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().mean()
}

/// Root mean squared error between equally long `predicted` and `truth`.
pub fn rmse(predicted: &[f64], truth: &[f64]) -> f64 {
    debug_assert_eq!(predicted.len(), truth.len());
    predicted
        .iter()
        .zip(truth)
        .map(|(p, t)| (p - t).powi(2))
        .mean()
        .sqrt()
}

/// Mean absolute error between equally long `predicted` and `truth`.
pub fn mae(predicted: &[f64], truth: &[f64]) -> f64 {
    debug_assert_eq!(predicted.len(), truth.len());
    predicted.iter().zip(truth).map(|(p, t)| (p - t).abs()).mean()
}

/// RMSE and MAE of one snapshot, over all matrix entries.
pub fn snapshot_errors(predicted: &TrafficMatrix, truth: &TrafficMatrix) -> (f64, f64) {
    (
        rmse(predicted.values(), truth.values()),
        mae(predicted.values(), truth.values()),
    )
}

/// Prediction bias of one flow.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowBias {
    pub flow: String,
    /// Mean of the measured values over the held-out snapshots.
    pub mean: f64,
    /// Mean prediction minus mean measurement.
    pub bias: f64,
}

/// Compute the bias of every flow, sorted from the largest to the smallest mean measurement.
/// Each item of `flows` is `(name, predicted, measured)`.
pub fn flow_biases<'a>(
    flows: impl IntoIterator<Item = (&'a str, &'a [f64], &'a [f64])>,
) -> Vec<FlowBias> {
    let mut biases: Vec<FlowBias> = flows
        .into_iter()
        .map(|(flow, predicted, truth)| {
            let mean = truth.iter().mean();
            FlowBias {
                flow: flow.to_string(),
                mean,
                bias: predicted.iter().mean() - mean,
            }
        })
        .collect();
    biases.sort_by(|a, b| b.mean.partial_cmp(&a.mean).unwrap_or(Ordering::Equal));
    biases
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn errors() {
        let p = [1.0, 2.0, 3.0, 4.0];
        let t = [1.0, 4.0, 3.0, 0.0];
        assert!((rmse(&p, &t) - 5f64.sqrt()).abs() < 1e-12);
        assert!((mae(&p, &t) - 1.5).abs() < 1e-12);
        assert_eq!(rmse(&p, &p), 0.0);
    }

    #[test]
    fn snapshot() {
        let a = TrafficMatrix::from_flow_values(&[1.0, 2.0, 3.0, 4.0], 2).unwrap();
        let b = TrafficMatrix::from_flow_values(&[1.0, 2.0, 3.0, 6.0], 2).unwrap();
        let (rmse, mae) = snapshot_errors(&a, &b);
        assert!((rmse - 1.0).abs() < 1e-12);
        assert!((mae - 0.5).abs() < 1e-12);
    }

    #[test]
    fn biases_sorted_by_mean() {
        let small_p = [1.0, 1.0];
        let small_t = [2.0, 2.0];
        let large_p = [12.0, 10.0];
        let large_t = [10.0, 10.0];
        let biases = flow_biases([
            ("OD_1-2", small_p.as_slice(), small_t.as_slice()),
            ("OD_2-1", large_p.as_slice(), large_t.as_slice()),
        ]);
        assert_eq!(biases[0].flow, "OD_2-1");
        assert_eq!(biases[0].bias, 1.0);
        assert_eq!(biases[1].flow, "OD_1-2");
        assert_eq!(biases[1].bias, -1.0);
    }
}
