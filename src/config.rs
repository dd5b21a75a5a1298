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
//! Run configuration of the training and inference driver.
//!
//! The defaults reproduce the constants used for the Abilene experiments. A configuration can be
//! stored as JSON and loaded with [`RunConfig::load`]; command-line flags of the drivers override
//! single fields afterwards.

use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};

use tmpred_utils::series::Normalization;

use crate::{
    inference::NegativePolicy,
    model::{ModelKind, SequenceModelConfig},
    training::TrainingParams,
};

/// Number of flows per row of the traffic matrix on Abilene (12 nodes).
pub const ABILENE_ROW_LENGTH: usize = 12;
/// Number of flows per row of the traffic matrix on CERNET (14 nodes).
pub const CERNET_ROW_LENGTH: usize = 14;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Model architecture trained for every flow.
    pub model: ModelKind,
    /// Length of the history window.
    pub k: usize,
    /// Number of features per time step. Windows hold a single feature, so this must be 1.
    pub input_size: usize,
    /// Hidden size of the LSTM layers.
    pub hidden_size: usize,
    /// Number of stacked LSTM or encoder layers.
    pub num_layers: usize,
    /// Number of training epochs per flow.
    pub epochs: usize,
    /// Learning rate of the Adagrad optimizer.
    pub learning_rate: f64,
    pub batch_size: usize,
    /// Share of the windows used for training.
    pub train_ratio: f64,
    /// The number of training windows is rounded down to a multiple of this.
    pub train_multiple: usize,
    /// Number of flows per row of the reconstructed traffic matrix.
    pub row_length: usize,
    pub normalization: Normalization,
    /// What to do with negative predictions.
    pub negative_policy: NegativePolicy,
    /// Seed for weight initialization and shuffling.
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            model: ModelKind::Lstm,
            k: 10,
            input_size: 1,
            hidden_size: 30,
            num_layers: 1,
            epochs: 100,
            learning_rate: 0.01,
            batch_size: 128,
            train_ratio: 0.8,
            train_multiple: 50,
            row_length: ABILENE_ROW_LENGTH,
            normalization: Normalization::MinMax,
            negative_policy: NegativePolicy::Abs,
            seed: 42,
        }
    }
}

impl RunConfig {
    /// Load a configuration from a JSON file. Missing fields keep their default value.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(&fs::read_to_string(path.as_ref())?)?;
        config.validate()?;
        Ok(config)
    }

    /// Store the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path.as_ref(), serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Check that the configuration can be used to train a model.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.k == 0 {
            return Err(ConfigError::Invalid("k must be positive"));
        }
        if self.input_size != 1 {
            return Err(ConfigError::Invalid(
                "input_size must be 1, every flow is a univariate series",
            ));
        }
        if self.hidden_size == 0 || self.num_layers == 0 {
            return Err(ConfigError::Invalid("model dimensions must be positive"));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be positive"));
        }
        if self.row_length == 0 {
            return Err(ConfigError::Invalid("row_length must be positive"));
        }
        if !(0.0..=1.0).contains(&self.train_ratio) {
            return Err(ConfigError::Invalid("train_ratio must be within [0, 1]"));
        }
        if self.learning_rate.is_nan() || self.learning_rate <= 0.0 {
            return Err(ConfigError::Invalid("learning_rate must be positive"));
        }
        Ok(())
    }

    /// Hyper-parameters of the per-flow model.
    pub fn model_config(&self) -> SequenceModelConfig {
        SequenceModelConfig::new()
            .with_input_size(self.input_size)
            .with_hidden_size(self.hidden_size)
            .with_num_layers(self.num_layers)
    }

    pub fn training_params(&self) -> TrainingParams {
        TrainingParams {
            epochs: self.epochs,
            batch_size: self.batch_size,
            learning_rate: self.learning_rate,
        }
    }
}

/// Error type for loading or storing a `RunConfig`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = RunConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.k, 10);
        assert_eq!(config.batch_size, 128);
        assert_eq!(config.row_length, 12);
        assert_eq!(config.model_config().hidden_size, 30);
        assert_eq!(config.training_params().epochs, 100);
    }

    #[test]
    fn partial_json() {
        let config: RunConfig =
            serde_json::from_str(r#"{"model": "transformer", "epochs": 3, "row_length": 14}"#)
                .unwrap();
        assert_eq!(config.model, ModelKind::Transformer);
        assert_eq!(config.epochs, 3);
        assert_eq!(config.row_length, CERNET_ROW_LENGTH);
        assert_eq!(config.k, 10);
        assert_eq!(config.negative_policy, NegativePolicy::Abs);
    }

    #[test]
    fn invalid() {
        let config = RunConfig {
            k: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        let config = RunConfig {
            train_ratio: 1.2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        let config = RunConfig {
            input_size: 2,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        let config: RunConfig = serde_json::from_str(r#"{"input_size": 2}"#).unwrap();
        assert!(config.validate().is_err());
    }
}
