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
//! Transformer encoder with sinusoidal positional encoding and a linear decoder on the last
//! position.

use burn::{
    module::{Module, Param},
    nn::{
        transformer::{TransformerEncoder, TransformerEncoderConfig, TransformerEncoderInput},
        Initializer, Linear, LinearConfig,
    },
    tensor::{backend::Backend, Bool, Tensor, TensorData},
};

use super::{last_step, Regressor, SequenceModelConfig};

/// Initial weights of the decoder are drawn from `[-INIT_RANGE, INIT_RANGE]`.
const INIT_RANGE: f64 = 0.1;

#[derive(Module, Debug)]
pub struct TransformerRegressor<B: Backend> {
    encoder: TransformerEncoder<B>,
    decoder: Linear<B>,
    d_model: usize,
}

impl SequenceModelConfig {
    /// Build a transformer regressor with `input_size` as model dimension.
    pub fn init_transformer<B: Backend>(&self, device: &B::Device) -> TransformerRegressor<B> {
        let d_model = self.input_size;
        let encoder = TransformerEncoderConfig::new(
            d_model,
            self.d_ff,
            self.n_heads,
            self.num_layers.max(1),
        )
        .with_dropout(self.dropout)
        .init(device);

        let mut decoder = LinearConfig::new(d_model, 1)
            .with_initializer(Initializer::Uniform {
                min: -INIT_RANGE,
                max: INIT_RANGE,
            })
            .init(device);
        decoder.bias = Some(Param::from_tensor(Tensor::zeros([1], device)));

        TransformerRegressor {
            encoder,
            decoder,
            d_model,
        }
    }
}

/// Sinusoidal positional encoding of shape `[seq, d_model]`, flattened in row-major order.
///
/// Even dimensions use `sin(pos * w)`, odd dimensions `cos(pos * w)`, with
/// `w = exp(-ln(10000) * 2i / d_model)` for the dimension pair `i`.
pub fn positional_encoding(seq: usize, d_model: usize) -> Vec<f32> {
    let mut pe = vec![0.0; seq * d_model];
    for pos in 0..seq {
        for i in (0..d_model).step_by(2) {
            let w = (-(10_000f64.ln()) * i as f64 / d_model as f64).exp();
            let angle = pos as f64 * w;
            pe[pos * d_model + i] = angle.sin() as f32;
            if i + 1 < d_model {
                pe[pos * d_model + i + 1] = angle.cos() as f32;
            }
        }
    }
    pe
}

impl<B: Backend> Regressor<B> for TransformerRegressor<B> {
    fn forward(&self, inputs: Tensor<B, 3>, mask_pad: Tensor<B, 2, Bool>) -> Tensor<B, 2> {
        let [_, seq, d_model] = inputs.dims();
        debug_assert_eq!(d_model, self.d_model);
        let pe = Tensor::<B, 3>::from_data(
            TensorData::new(positional_encoding(seq, d_model), [1, seq, d_model]),
            &inputs.device(),
        );

        let encoded = self
            .encoder
            .forward(TransformerEncoderInput::new(inputs + pe).mask_pad(mask_pad));
        self.decoder.forward(last_step(encoded))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{model::no_padding, InferenceBackend as B};

    #[test]
    fn encoding_values() {
        let pe = positional_encoding(3, 1);
        assert_eq!(pe.len(), 3);
        assert_eq!(pe[0], 0.0);
        assert!((pe[1] - 1f32.sin()).abs() < 1e-6);
        assert!((pe[2] - 2f32.sin()).abs() < 1e-6);

        let pe = positional_encoding(2, 4);
        assert_eq!(&pe[..4], &[0.0, 1.0, 0.0, 1.0]);
        assert!((pe[4] - 1f32.sin()).abs() < 1e-6);
        assert!((pe[5] - 1f32.cos()).abs() < 1e-6);
    }

    #[test]
    fn output_shape() {
        let device = Default::default();
        let model = SequenceModelConfig::new()
            .with_d_ff(16)
            .init_transformer::<B>(&device);
        let x = Tensor::<B, 3>::ones([4, 10, 1], &device);
        let y = model.forward(x, no_padding(4, 10, &device));
        assert_eq!(y.dims(), [4, 1]);
    }
}
