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
//! Sequence models predicting the next value of a flow from a window of its history.
//!
//! All models take inputs of shape `[batch, k, input_size]` and return `[batch, input_size]`.
//! The padding mask of shape `[batch, k]` is computed by the caller and passed with every
//! forward call; models never cache it.

use burn::{
    config::Config,
    tensor::{backend::Backend, Bool, Tensor},
};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

mod lstm;
mod transformer;

pub use lstm::LstmRegressor;
pub use transformer::{positional_encoding, TransformerRegressor};

/// Architecture of the per-flow model.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    #[default]
    #[strum(serialize = "LSTM")]
    Lstm,
    #[strum(serialize = "Transformer")]
    Transformer,
}

/// A model regressing the next value of a window.
pub trait Regressor<B: Backend> {
    /// Predict the value following each window of `inputs`. Positions set in `mask_pad` are
    /// padding and must be ignored.
    fn forward(&self, inputs: Tensor<B, 3>, mask_pad: Tensor<B, 2, Bool>) -> Tensor<B, 2>;
}

/// Hyper-parameters of the sequence models.
#[derive(Config, Debug)]
pub struct SequenceModelConfig {
    #[config(default = 1)]
    pub input_size: usize,
    /// Hidden size of each LSTM layer.
    #[config(default = 30)]
    pub hidden_size: usize,
    #[config(default = 1)]
    pub num_layers: usize,
    /// Size of the feed-forward layer inside each encoder layer.
    #[config(default = 2048)]
    pub d_ff: usize,
    #[config(default = 1)]
    pub n_heads: usize,
    #[config(default = 0.0)]
    pub dropout: f64,
}

/// A mask of shape `[batch, seq]` without any padded position.
pub fn no_padding<B: Backend>(
    batch: usize,
    seq: usize,
    device: &B::Device,
) -> Tensor<B, 2, Bool> {
    Tensor::<B, 2>::zeros([batch, seq], device).greater_elem(0.5)
}

/// Select the last time step of a `[batch, seq, d]` tensor.
pub(crate) fn last_step<B: Backend>(x: Tensor<B, 3>) -> Tensor<B, 2> {
    let [batch, seq, d] = x.dims();
    x.slice([0..batch, seq - 1..seq, 0..d]).reshape([batch, d])
}

#[cfg(test)]
mod test {
    use burn::tensor::TensorData;

    use super::*;
    use crate::InferenceBackend as B;

    #[test]
    fn model_names() {
        assert_eq!(ModelKind::Lstm.to_string(), "LSTM");
        assert_eq!(ModelKind::Transformer.to_string(), "Transformer");
    }

    #[test]
    fn mask_is_empty() {
        let device = Default::default();
        let mask = no_padding::<B>(3, 4, &device);
        assert_eq!(mask.dims(), [3, 4]);
        let values = mask.into_data().to_vec::<bool>().unwrap();
        assert!(values.iter().all(|x| !x));
    }

    #[test]
    fn select_last_step() {
        let device = Default::default();
        let x = Tensor::<B, 3>::from_data(
            TensorData::new((0..12).map(|x| x as f32).collect::<Vec<_>>(), [2, 3, 2]),
            &device,
        );
        let last = last_step(x);
        assert_eq!(last.dims(), [2, 2]);
        assert_eq!(
            last.into_data().to_vec::<f32>().unwrap(),
            vec![4.0, 5.0, 10.0, 11.0]
        );
    }
}
