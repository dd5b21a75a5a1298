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
//! Per-flow training: shuffled mini-batches, Adagrad on the mean-squared error, and one
//! checkpoint per flow.

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use burn::{
    module::{AutodiffModule, Module},
    nn::loss::{MseLoss, Reduction},
    optim::{AdaGradConfig, GradientsParams, Optimizer},
    record::{FullPrecisionSettings, NamedMpkFileRecorder},
    tensor::{
        backend::{AutodiffBackend, Backend},
        Bool, ElementConversion, Tensor, TensorData,
    },
};
use indicatif::ProgressBar;
use rand::{rngs::StdRng, seq::SliceRandom};

use tmpred_utils::series::Window;

use crate::{
    model::{no_padding, ModelKind, Regressor},
    util::PathBufExt,
};

/// Extension added to every checkpoint by the recorder.
pub const CHECKPOINT_EXTENSION: &str = "mpk";

/// Optimization parameters of one training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingParams {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
}

/// A batch of windows.
#[derive(Debug, Clone)]
pub struct SequenceBatch<B: Backend> {
    /// Histories, `[batch, k, 1]`.
    pub inputs: Tensor<B, 3>,
    /// Labels, `[batch, 1]`.
    pub targets: Tensor<B, 2>,
    /// Padding mask, `[batch, k]`.
    pub mask_pad: Tensor<B, 2, Bool>,
}

impl<B: Backend> SequenceBatch<B> {
    /// Stack the windows selected by `indices` into one batch. All windows must have the same
    /// length.
    pub fn new(windows: &[Window<'_>], indices: &[usize], device: &B::Device) -> Self {
        let batch = indices.len();
        let k = indices.first().map(|i| windows[*i].history.len()).unwrap_or(0);

        let mut inputs = Vec::with_capacity(batch * k);
        let mut targets = Vec::with_capacity(batch);
        for &i in indices {
            inputs.extend(windows[i].history.iter().map(|x| *x as f32));
            targets.push(windows[i].label as f32);
        }

        Self {
            inputs: Tensor::from_data(TensorData::new(inputs, [batch, k, 1]), device),
            targets: Tensor::from_data(TensorData::new(targets, [batch, 1]), device),
            mask_pad: no_padding(batch, k, device),
        }
    }
}

/// Split `0..num_samples` into shuffled batches of at most `batch_size` indices. Only the last
/// batch may be smaller.
pub fn shuffled_batches(
    num_samples: usize,
    batch_size: usize,
    rng: &mut StdRng,
) -> Vec<Vec<usize>> {
    let mut indices: Vec<usize> = (0..num_samples).collect();
    indices.shuffle(rng);
    indices
        .chunks(batch_size.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// Outcome of training a model on one flow.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingOutcome {
    pub train_samples: usize,
    pub epochs: usize,
    /// Mean batch loss of the last epoch, `NaN` if nothing was trained.
    pub final_loss: f64,
    pub seconds: f64,
}

/// Train `model` on `windows` for `params.epochs` epochs. Every epoch visits all windows once in
/// a new random order.
pub fn train<B, M>(
    mut model: M,
    windows: &[Window<'_>],
    params: TrainingParams,
    rng: &mut StdRng,
    device: &B::Device,
    progress: Option<&ProgressBar>,
) -> (M, TrainingOutcome)
where
    B: AutodiffBackend,
    M: AutodiffModule<B> + Regressor<B>,
{
    let start = Instant::now();
    let mut optim = AdaGradConfig::new().init::<B, M>();
    let loss_fn = MseLoss::new();
    let mut final_loss = f64::NAN;

    if windows.is_empty() {
        log::warn!("No training samples, keeping the initial weights");
    } else {
        for epoch in 0..params.epochs {
            let mut loss_sum = 0.0;
            let mut num_batches = 0;
            for indices in shuffled_batches(windows.len(), params.batch_size, rng) {
                let batch = SequenceBatch::<B>::new(windows, &indices, device);
                let prediction = model.forward(batch.inputs, batch.mask_pad);
                let loss = loss_fn.forward(prediction, batch.targets, Reduction::Mean);
                loss_sum += loss.clone().into_scalar().elem::<f64>();
                num_batches += 1;

                let grads = GradientsParams::from_grads(loss.backward(), &model);
                model = optim.step(params.learning_rate, model, grads);
            }
            final_loss = loss_sum / num_batches as f64;
            log::trace!("epoch {epoch}: loss {final_loss:.6}");
            if let Some(bar) = progress {
                bar.set_message(format!("loss {final_loss:.5}"));
            }
        }
    }

    let outcome = TrainingOutcome {
        train_samples: windows.len(),
        epochs: params.epochs,
        final_loss,
        seconds: start.elapsed().as_secs_f64(),
    };
    (model, outcome)
}

/// Path (without extension) of the checkpoint of `flow`, e.g., `<dir>/LSTM_OD_2-8`.
pub fn checkpoint_path(model_dir: impl AsRef<Path>, kind: ModelKind, flow: &str) -> PathBuf {
    model_dir.as_ref().then(format!("{kind}_{flow}"))
}

/// Whether a checkpoint was already stored at `path`.
pub fn checkpoint_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().with_extension(CHECKPOINT_EXTENSION).exists()
}

fn recorder() -> NamedMpkFileRecorder<FullPrecisionSettings> {
    NamedMpkFileRecorder::<FullPrecisionSettings>::new()
}

/// Store the parameters of `model` at `path`.
pub fn save_checkpoint<B, M>(model: M, path: impl AsRef<Path>) -> Result<(), TrainingError>
where
    B: Backend,
    M: Module<B>,
{
    let path = path.as_ref();
    log::debug!("Saving checkpoint {path:?}");
    model
        .save_file(path.to_path_buf(), &recorder())
        .map_err(|e| TrainingError::Checkpoint {
            path: path.to_path_buf(),
            reason: format!("{e:?}"),
        })
}

/// Load the parameters stored at `path` into `model`.
pub fn load_checkpoint<B, M>(
    model: M,
    path: impl AsRef<Path>,
    device: &B::Device,
) -> Result<M, TrainingError>
where
    B: Backend,
    M: Module<B>,
{
    let path = path.as_ref();
    log::debug!("Loading checkpoint {path:?}");
    if !checkpoint_exists(path) {
        return Err(TrainingError::MissingCheckpoint(path.to_path_buf()));
    }
    model
        .load_file(path.to_path_buf(), &recorder(), device)
        .map_err(|e| TrainingError::Checkpoint {
            path: path.to_path_buf(),
            reason: format!("{e:?}"),
        })
}

/// Error type for training and checkpointing.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("Cannot access checkpoint {path:?}: {reason}")]
    Checkpoint { path: PathBuf, reason: String },
    #[error("No checkpoint stored at {0:?}")]
    MissingCheckpoint(PathBuf),
}
