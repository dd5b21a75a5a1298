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
//! Module defining record data types written to and read from CSV: metric tables with one column
//! per model variant, and the per-flow training summary.
use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};

use tmpred_utils::table::{self, Column, TableError};

/// Per-snapshot RMSE of every model variant.
pub const RMSE_FILE: &str = "RMSE_result.csv";
/// Per-snapshot MAE of every model variant.
pub const MAE_FILE: &str = "MAE_result.csv";
/// Per-flow bias of every model variant, flows sorted by decreasing mean.
pub const BIAS_FILE: &str = "bias_OD_result.csv";
/// Training summary appended to by the training driver.
pub const TRAINING_SUMMARY_FILE: &str = "training_summary.csv";

/// Table of metric values (RMSE, MAE, bias, MLU bias), one column per model variant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricTable {
    pub columns: Vec<Column>,
}

impl MetricTable {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        Ok(Self {
            columns: table::read_columns(path)?,
        })
    }

    /// Load the table at `path`, or start an empty one if the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RecordError> {
        table::write_columns(path, &self.columns)?;
        Ok(())
    }

    pub fn column(&self, variant: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == variant)
            .map(|c| c.values.as_slice())
    }

    /// Replace the column of `variant`, or append it if it does not exist yet.
    pub fn upsert(&mut self, variant: &str, values: Vec<f64>) {
        match self.columns.iter_mut().find(|c| c.name == variant) {
            Some(column) => column.values = values,
            None => self.columns.push(Column {
                name: variant.to_string(),
                values,
            }),
        }
    }

    pub fn variants(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Summary of training the model of one flow.
pub struct TrainingRecord {
    /// Local time when training finished.
    pub finished: String,
    pub model: String,
    pub flow: String,
    pub train_samples: usize,
    pub epochs: usize,
    /// Mean loss of the last epoch.
    pub final_loss: f64,
    /// Wall-clock training time in seconds.
    pub seconds: f64,
}

/// Append `record` to the CSV at `path`, writing the header if the file is new.
pub fn append_training_record(
    path: impl AsRef<Path>,
    record: &TrainingRecord,
) -> Result<(), RecordError> {
    let path = path.as_ref();
    let new_file = !path.exists();
    let file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    let mut csv = csv::WriterBuilder::new()
        .has_headers(new_file)
        .from_writer(file);
    csv.serialize(record)?;
    csv.flush()?;
    Ok(())
}

/// Error type for reading and writing records.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("{0}")]
    Table(#[from] TableError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
