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
//! Test cases spanning several modules: training a model end to end, storing and restoring it,
//! and reconstructing the traffic matrices from its predictions.
//!
//! Use the following command to see the log output:
//!
//! ```shell
//! RUST_LOG=debug cargo test --release -- --nocapture --test-threads 1
//! ```

use std::{fs, path::PathBuf};

use burn::module::AutodiffModule;
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    dataset::{OdFlow, PreparedFlow},
    inference::{self, NegativePolicy},
    matrix::{assemble_snapshots, snapshot_file_name, TrafficMatrix},
    model::{ModelKind, SequenceModelConfig},
    training::{self, TrainingParams},
    InferenceBackend, TrainingBackend,
};
use tmpred_utils::series::{Normalization, Scaler};

/// Assert that `acq` is within `precision` of `exp`.
pub fn check_close(exp: f64, acq: f64, precision: f64) {
    let diff = (exp - acq).abs();
    assert!(
        diff <= precision,
        "expected {exp}, got {acq} (diff {diff:.3e} > {precision:.1e})"
    );
}

/// Fresh temporary directory for one test.
fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tmpred-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn periodic_flow(name: &str, len: usize) -> OdFlow {
    let values = (0..len)
        .map(|t| 1000.0 + 500.0 * (t as f64 * 0.3).sin())
        .collect();
    OdFlow::new(name, values)
}

fn params() -> TrainingParams {
    TrainingParams {
        epochs: 3,
        batch_size: 16,
        learning_rate: 0.05,
    }
}

#[test]
fn train_store_restore_lstm() {
    let dir = temp_dir("lstm");
    let device = Default::default();
    let flow = periodic_flow("OD_1-2", 60);
    let prepared = PreparedFlow::new(&flow, 4, Normalization::MinMax, 0.8, 10);
    assert_eq!(prepared.split.train, 0..40);
    assert_eq!(prepared.split.test, 40..56);

    let config = SequenceModelConfig::new().with_hidden_size(8);
    let mut rng = StdRng::seed_from_u64(0);
    let (model, outcome) = training::train(
        config.init_lstm::<TrainingBackend>(&device),
        &prepared.train_windows(),
        params(),
        &mut rng,
        &device,
        None,
    );
    assert_eq!(outcome.train_samples, 40);
    assert_eq!(outcome.epochs, 3);
    assert!(outcome.final_loss.is_finite());

    let path = training::checkpoint_path(&dir, ModelKind::Lstm, &flow.name);
    assert!(!training::checkpoint_exists(&path));
    training::save_checkpoint::<TrainingBackend, _>(model.clone(), &path).unwrap();
    assert!(training::checkpoint_exists(&path));

    let restored = training::load_checkpoint::<InferenceBackend, _>(
        config.init_lstm::<InferenceBackend>(&device),
        &path,
        &device,
    )
    .unwrap();

    let windows = prepared.test_windows();
    let expected = inference::predict(&model.valid(), &windows, 5, &device).unwrap();
    let acquired = inference::predict(&restored, &windows, 16, &device).unwrap();
    assert_eq!(expected.len(), 16);
    for (e, a) in expected.iter().zip(acquired.iter()) {
        check_close(*e, *a, 1e-5);
    }

    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn missing_checkpoint() {
    let dir = temp_dir("missing");
    let device = Default::default();
    let path = training::checkpoint_path(&dir, ModelKind::Transformer, "OD_1-2");
    let result = training::load_checkpoint::<InferenceBackend, _>(
        SequenceModelConfig::new()
            .with_d_ff(8)
            .init_transformer::<InferenceBackend>(&device),
        &path,
        &device,
    );
    assert!(matches!(
        result,
        Err(training::TrainingError::MissingCheckpoint(_))
    ));
    fs::remove_dir_all(dir).unwrap();
}

#[test]
fn train_transformer() {
    let device = Default::default();
    let flow = periodic_flow("OD_2-3", 40);
    let prepared = PreparedFlow::new(&flow, 6, Normalization::ZScore, 0.8, 5);
    let config = SequenceModelConfig::new().with_d_ff(16);
    let mut rng = StdRng::seed_from_u64(0);
    let (model, outcome) = training::train(
        config.init_transformer::<TrainingBackend>(&device),
        &prepared.train_windows(),
        params(),
        &mut rng,
        &device,
        None,
    );
    assert_eq!(outcome.train_samples, 25);
    assert!(outcome.final_loss.is_finite());

    let predictions =
        inference::predict(&model.valid(), &prepared.test_windows(), 4, &device).unwrap();
    assert_eq!(predictions.len(), prepared.split.test.len());
    assert!(predictions.iter().all(|x| x.is_finite()));
}

#[test]
fn reconstruct_matrices() {
    let dir = temp_dir("matrices");
    // 2x2 matrix: OD_1-1, OD_1-2, OD_2-1, OD_2-2
    let scaler = Scaler::MinMax {
        min: 0.0,
        max: 100.0,
    };
    let predicted = inference::denormalize(&[0.5, -0.25, 1.0], &scaler, NegativePolicy::Abs);
    assert_eq!(predicted.adjusted, 1);
    let per_flow = vec![None, Some(predicted.values), Some(vec![7.0, 8.0, 9.0]), None];
    let matrices = assemble_snapshots(&per_flow, 2).unwrap();
    assert_eq!(matrices.len(), 3);

    for (i, tm) in matrices.iter().enumerate() {
        tm.write_file(dir.join(snapshot_file_name(ModelKind::Lstm, i)))
            .unwrap();
    }
    assert!(dir.join("LSTM_OD_pair_1.txt").exists());
    assert!(dir.join("LSTM_OD_pair_3.txt").exists());

    let second = TrafficMatrix::read_file(dir.join("LSTM_OD_pair_2.txt"), 2, 2).unwrap();
    check_close(25.0, second.get(0, 1).unwrap(), 1e-9);
    check_close(8.0, second.get(1, 0).unwrap(), 1e-9);
    assert_eq!(second.get(0, 0), Some(0.0));
    assert_eq!(second, matrices[1]);

    fs::remove_dir_all(dir).unwrap();
}
