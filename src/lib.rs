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
//! Library for predicting traffic matrices of backbone topologies flow by flow, using one
//! sequence model per origin-destination flow.
use burn::backend::{Autodiff, NdArray};

/// Backend used to run inference and to load checkpoints.
pub type InferenceBackend = NdArray<f32>;
/// Backend used to train the sequence models.
pub type TrainingBackend = Autodiff<InferenceBackend>;

pub mod config;
pub mod dataset;
pub mod figures;
pub mod inference;
pub mod matrix;
pub mod metrics;
pub mod model;
pub mod records;
pub mod training;
pub mod util;

#[cfg(test)]
mod test;

pub mod prelude {
    pub use super::{
        config::RunConfig,
        dataset::{OdDataset, OdFlow, PreparedFlow},
        inference::NegativePolicy,
        matrix::TrafficMatrix,
        model::{ModelKind, Regressor, SequenceModelConfig},
        InferenceBackend, TrainingBackend,
    };
    pub use tmpred_utils::series::{Normalization, Scaler};
}
