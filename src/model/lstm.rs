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
//! Stacked LSTM with a linear head on the last time step.

use burn::{
    module::Module,
    nn::{Linear, LinearConfig, Lstm, LstmConfig},
    tensor::{backend::Backend, Bool, Tensor},
};

use super::{last_step, Regressor, SequenceModelConfig};

#[derive(Module, Debug)]
pub struct LstmRegressor<B: Backend> {
    layers: Vec<Lstm<B>>,
    output: Linear<B>,
}

impl SequenceModelConfig {
    /// Build an LSTM regressor with `num_layers` layers of `hidden_size` units. The initial
    /// hidden and cell states are zero.
    pub fn init_lstm<B: Backend>(&self, device: &B::Device) -> LstmRegressor<B> {
        let layers = (0..self.num_layers.max(1))
            .map(|i| {
                let d_input = if i == 0 {
                    self.input_size
                } else {
                    self.hidden_size
                };
                LstmConfig::new(d_input, self.hidden_size, true).init(device)
            })
            .collect();
        LstmRegressor {
            layers,
            output: LinearConfig::new(self.hidden_size, self.input_size).init(device),
        }
    }
}

impl<B: Backend> Regressor<B> for LstmRegressor<B> {
    fn forward(&self, inputs: Tensor<B, 3>, _mask_pad: Tensor<B, 2, Bool>) -> Tensor<B, 2> {
        let hidden = self
            .layers
            .iter()
            .fold(inputs, |x, layer| layer.forward(x, None).0);
        self.output.forward(last_step(hidden))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{model::no_padding, InferenceBackend as B};

    #[test]
    fn output_shape() {
        let device = Default::default();
        for num_layers in [1, 2] {
            let model = SequenceModelConfig::new()
                .with_hidden_size(8)
                .with_num_layers(num_layers)
                .init_lstm::<B>(&device);
            let x = Tensor::<B, 3>::ones([5, 10, 1], &device);
            let y = model.forward(x, no_padding(5, 10, &device));
            assert_eq!(y.dims(), [5, 1]);
        }
    }
}
