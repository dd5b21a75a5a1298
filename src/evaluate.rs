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
//! Evaluation driver: compares reconstructed traffic matrices to the measured OD flows, and stores
//! the per-snapshot RMSE and MAE and the per-flow bias as the column of one model variant.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use itertools::Itertools;

use tmpred::{
    config::RunConfig,
    dataset::OdDataset,
    matrix::TrafficMatrix,
    metrics,
    records::{self, MetricTable},
    util::{self, PathBufExt},
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
/// Computes the prediction errors of reconstructed traffic matrices.
struct Args {
    /// CSV file with the measured OD flows, as used for training.
    #[arg(short, long, default_value = "./data/Abilene_OD_pair.csv")]
    data: PathBuf,
    /// Directory of the reconstructed traffic matrices.
    #[arg(short, long, default_value = "./TM_result/")]
    matrices: PathBuf,
    /// Prefix of the matrix files, e.g., `LSTM` for `LSTM_OD_pair_1.txt`.
    #[arg(short, long, default_value = "LSTM")]
    prefix: String,
    /// Column name of the variant in the result tables. Defaults to `<PREFIX>_OD_pair`.
    #[arg(long)]
    variant: Option<String>,
    /// JSON configuration of the training run (window length, split and row length).
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Overwrite the row length of the configuration.
    #[arg(long)]
    row_length: Option<usize>,
    /// Directory of the result tables. Existing tables are updated.
    #[arg(short, long, default_value = "./")]
    output_path: PathBuf,
}

/// Find the matrix files of `prefix` in `dir`, ordered by their snapshot number.
fn matrix_files(dir: &Path, prefix: &str) -> anyhow::Result<Vec<PathBuf>> {
    let pattern = dir.then(format!("{prefix}_OD_pair_*.txt"));
    let pattern = pattern.to_string_lossy();
    let head = format!("{prefix}_OD_pair_");

    let mut files: Vec<(usize, PathBuf)> = Vec::new();
    for path in glob::glob(&pattern)? {
        let path = path?;
        let index = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.strip_prefix(head.as_str()))
            .and_then(|s| s.parse::<usize>().ok());
        match index {
            Some(i) => files.push((i, path)),
            None => log::debug!("Ignoring {path:?}"),
        }
    }
    files.sort_by_key(|(i, _)| *i);

    if let Some((pos, (i, _))) = files.iter().enumerate().find(|(pos, (i, _))| *i != pos + 1) {
        anyhow::bail!("Snapshot {} of {prefix} is missing (found {i} instead)", pos + 1);
    }
    Ok(files.into_iter().map(|(_, p)| p).collect())
}

fn main() -> anyhow::Result<()> {
    util::init_logging();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RunConfig::load(path)
            .with_context(|| format!("Cannot load the configuration {path:?}"))?,
        None => RunConfig::default(),
    };
    if let Some(row_length) = args.row_length {
        config.row_length = row_length;
    }
    config.validate()?;
    let variant = args
        .variant
        .clone()
        .unwrap_or_else(|| format!("{}_OD_pair", args.prefix));

    let dataset = OdDataset::load(&args.data)
        .with_context(|| format!("Cannot load the OD pairs from {:?}", args.data))?;
    let prepared = dataset.prepare(
        config.k,
        config.normalization,
        config.train_ratio,
        config.train_multiple,
    );
    let held_out = prepared.first().map_or(0, |p| p.split.test.len());

    let files = matrix_files(&args.matrices, &args.prefix)?;
    if files.len() > held_out {
        anyhow::bail!(
            "Found {} snapshots, but only {held_out} held-out samples exist",
            files.len()
        );
    }
    log::info!("Evaluating {} snapshots of {variant}", files.len());

    let rows = dataset.len().div_ceil(config.row_length);
    let mut rmse = Vec::with_capacity(files.len());
    let mut mae = Vec::with_capacity(files.len());
    let mut predicted: Vec<Vec<f64>> = vec![Vec::with_capacity(files.len()); dataset.len()];
    let mut measured: Vec<Vec<f64>> = vec![Vec::with_capacity(files.len()); dataset.len()];

    for (t, file) in files.iter().enumerate() {
        let truth = dataset
            .held_out_snapshot(&prepared, t)
            .with_context(|| format!("No measurement for snapshot {}", t + 1))?;
        let truth = TrafficMatrix::from_flow_values(&truth, config.row_length)?;
        let prediction = TrafficMatrix::read_file(file, rows, config.row_length)
            .with_context(|| format!("Cannot read {file:?}"))?;

        let (r, m) = metrics::snapshot_errors(&prediction, &truth);
        rmse.push(r);
        mae.push(m);
        for f in 0..dataset.len() {
            predicted[f].push(prediction.values()[f]);
            measured[f].push(truth.values()[f]);
        }
    }

    let biases = metrics::flow_biases(
        dataset
            .flows
            .iter()
            .enumerate()
            .filter(|(_, flow)| !flow.is_diagonal())
            .map(|(f, flow)| {
                (
                    flow.name.as_str(),
                    predicted[f].as_slice(),
                    measured[f].as_slice(),
                )
            }),
    );
    log::debug!(
        "Largest flows: {}",
        biases.iter().take(5).map(|b| &b.flow).join(", ")
    );
    log::info!(
        "{variant}: mean RMSE {:.3}, mean MAE {:.3}",
        metrics::mean(&rmse),
        metrics::mean(&mae)
    );

    std::fs::create_dir_all(&args.output_path)?;
    for (file, values) in [
        (records::RMSE_FILE, rmse),
        (records::MAE_FILE, mae),
        (
            records::BIAS_FILE,
            biases.into_iter().map(|b| b.bias).collect(),
        ),
    ] {
        let path = args.output_path.clone().then(file);
        let mut table = MetricTable::load_or_default(&path)?;
        table.upsert(&variant, values);
        table
            .save(&path)
            .with_context(|| format!("Cannot write {path:?}"))?;
        log::info!("Updated {path:?}");
    }

    Ok(())
}
