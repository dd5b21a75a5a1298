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
//! Training driver: one sequence model per OD flow, and optionally the reconstruction of the
//! predicted traffic matrices of the held-out snapshots.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::Context;
use burn::{module::AutodiffModule, tensor::backend::Backend};
use clap::Parser;
use indicatif::{MultiProgress, ProgressBar};
use rand::{rngs::StdRng, SeedableRng};

use tmpred::{
    config::RunConfig,
    dataset::{OdDataset, OdFlow, PreparedFlow},
    inference::{self, NegativePolicy},
    matrix::{self, assemble_snapshots},
    model::{ModelKind, Regressor},
    records::{self, TrainingRecord},
    training,
    util::{self, PathBufExt},
    InferenceBackend, TrainingBackend,
};
use tmpred_utils::series::Normalization;

type Device = <TrainingBackend as Backend>::Device;

#[derive(Parser, Debug)]
#[command(author, version, about)]
/// Trains one sequence model per OD flow of a traffic trace.
struct Args {
    /// CSV file with one OD flow per column (the first column is the time index).
    #[arg(short, long, default_value = "./data/Abilene_OD_pair.csv")]
    data: PathBuf,
    /// Directory of the per-flow checkpoints and of the training summary.
    #[arg(long, default_value = "./models/")]
    model_dir: PathBuf,
    /// Directory of the reconstructed traffic matrices.
    #[arg(short, long, default_value = "./TM_result/")]
    output_path: PathBuf,
    /// JSON file with the run configuration. The flags below override single fields.
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum)]
    model: Option<ModelKind>,
    /// Window length.
    #[arg(short)]
    k: Option<usize>,
    #[arg(long)]
    hidden_size: Option<usize>,
    #[arg(long)]
    num_layers: Option<usize>,
    #[arg(short, long)]
    epochs: Option<usize>,
    #[arg(long)]
    learning_rate: Option<f64>,
    #[arg(long)]
    batch_size: Option<usize>,
    #[arg(long)]
    train_ratio: Option<f64>,
    /// Number of flows per row of the traffic matrix (12 on Abilene, 14 on CERNET).
    #[arg(long)]
    row_length: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, value_enum)]
    normalization: Option<Normalization>,
    /// What to do with negative predictions.
    #[arg(long, value_enum)]
    negative_policy: Option<NegativePolicy>,
    /// Only train these flows, e.g., `--flow OD_2-8`. May be repeated.
    #[arg(long = "flow")]
    flows: Vec<String>,
    /// Do not retrain flows that already have a checkpoint.
    #[arg(long)]
    skip_existing: bool,
    /// Predict the held-out snapshots and write the reconstructed traffic matrices.
    #[arg(short, long)]
    predict: bool,
}

impl Args {
    fn run_config(&self) -> anyhow::Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)
                .with_context(|| format!("Cannot load the configuration {path:?}"))?,
            None => RunConfig::default(),
        };
        macro_rules! overwrite {
            ($($field:ident),*) => {
                $(if let Some(x) = self.$field {
                    config.$field = x;
                })*
            };
        }
        overwrite!(
            model,
            k,
            hidden_size,
            num_layers,
            epochs,
            learning_rate,
            batch_size,
            train_ratio,
            row_length,
            seed,
            normalization,
            negative_policy
        );
        config.validate()?;
        Ok(config)
    }

    fn selected(&self, flow: &str) -> bool {
        self.flows.is_empty() || self.flows.iter().any(|f| f == flow)
    }
}

fn main() -> anyhow::Result<()> {
    let multi = util::init_logging_with_progress();
    let args = Args::parse();
    let config = args.run_config()?;
    log::info!("Running with {config:?}");

    let dataset = OdDataset::load(&args.data)
        .with_context(|| format!("Cannot load the OD pairs from {:?}", args.data))?;
    for flow in args.flows.iter() {
        if dataset.flow(flow).is_none() {
            anyhow::bail!("Flow {flow} is not part of {:?}", args.data);
        }
    }
    log::info!("Loaded {} flows from {:?}", dataset.len(), args.data);

    fs::create_dir_all(&args.model_dir)?;
    config.save(args.model_dir.clone().then("config.json"))?;

    let model_config = config.model_config();
    match config.model {
        ModelKind::Lstm => run(&args, &config, &dataset, &multi, |device| {
            model_config.init_lstm::<TrainingBackend>(device)
        }),
        ModelKind::Transformer => run(&args, &config, &dataset, &multi, |device| {
            model_config.init_transformer::<TrainingBackend>(device)
        }),
    }
}

/// Train (and predict) all flows with models created by `init`.
fn run<M>(
    args: &Args,
    config: &RunConfig,
    dataset: &OdDataset,
    multi: &MultiProgress,
    init: impl Fn(&Device) -> M,
) -> anyhow::Result<()>
where
    M: AutodiffModule<TrainingBackend> + Regressor<TrainingBackend>,
    M::InnerModule: Regressor<InferenceBackend>,
{
    let device = Device::default();
    let bar = multi.add(ProgressBar::new(dataset.len() as u64));
    bar.set_style(util::progress_style());

    // predictions of the held-out snapshots, `None` for diagonal flows.
    let mut predictions: Vec<Option<Vec<f64>>> = Vec::new();

    for flow in dataset.flows.iter() {
        bar.inc(1);
        if flow.is_diagonal() {
            log::debug!("Skipping diagonal flow {}", flow.name);
            predictions.push(None);
            continue;
        }

        let prepared = PreparedFlow::new(
            flow,
            config.k,
            config.normalization,
            config.train_ratio,
            config.train_multiple,
        );
        let checkpoint = training::checkpoint_path(&args.model_dir, config.model, &flow.name);
        let retrain = !(args.skip_existing && training::checkpoint_exists(&checkpoint));

        let model = if args.selected(&flow.name) && retrain {
            Some(train_flow(
                config,
                flow,
                &prepared,
                &checkpoint,
                &args.model_dir,
                &init,
                &device,
                &bar,
            )?)
        } else {
            log::debug!("Not training {}", flow.name);
            None
        };

        if args.predict {
            let model = match model {
                Some(model) => model,
                None => training::load_checkpoint::<InferenceBackend, _>(
                    init(&device).valid(),
                    &checkpoint,
                    &device,
                )?,
            };
            predictions.push(Some(predict_flow(config, &prepared, &model, &device)?));
        }
    }
    bar.finish_with_message("done");
    multi.remove(&bar);

    if args.predict {
        write_matrices(args, config, &predictions)?;
    }
    Ok(())
}

/// Train the model of one flow and store its checkpoint. Returns the trained model, ready for
/// inference.
#[allow(clippy::too_many_arguments)]
fn train_flow<M>(
    config: &RunConfig,
    flow: &OdFlow,
    prepared: &PreparedFlow,
    checkpoint: &Path,
    model_dir: &Path,
    init: &impl Fn(&Device) -> M,
    device: &Device,
    bar: &ProgressBar,
) -> anyhow::Result<M::InnerModule>
where
    M: AutodiffModule<TrainingBackend> + Regressor<TrainingBackend>,
{
    log::info!(
        "Training {} on {} with {} samples",
        config.model,
        flow.name,
        prepared.split.train.len()
    );
    TrainingBackend::seed(config.seed);
    let mut rng = StdRng::seed_from_u64(config.seed);

    let (model, outcome) = training::train(
        init(device),
        &prepared.train_windows(),
        config.training_params(),
        &mut rng,
        device,
        Some(bar),
    );
    log::info!(
        "Trained {} in {:.2}s, final loss {:.6}",
        flow.name,
        outcome.seconds,
        outcome.final_loss
    );

    training::save_checkpoint::<TrainingBackend, _>(model.clone(), checkpoint)?;
    records::append_training_record(
        model_dir.then(records::TRAINING_SUMMARY_FILE),
        &TrainingRecord {
            finished: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            model: config.model.to_string(),
            flow: flow.name.clone(),
            train_samples: outcome.train_samples,
            epochs: outcome.epochs,
            final_loss: outcome.final_loss,
            seconds: outcome.seconds,
        },
    )?;

    Ok(model.valid())
}

/// Predict the held-out windows of one flow, in traffic volumes.
fn predict_flow<M>(
    config: &RunConfig,
    prepared: &PreparedFlow,
    model: &M,
    device: &Device,
) -> anyhow::Result<Vec<f64>>
where
    M: Regressor<InferenceBackend>,
{
    let start = Instant::now();
    let normalized = inference::predict(model, &prepared.test_windows(), config.batch_size, device)
        .with_context(|| format!("Cannot predict {}", prepared.name))?;
    let prediction = inference::denormalize(&normalized, &prepared.scaler, config.negative_policy);
    if prediction.adjusted > 0 {
        log::warn!(
            "{} of {} predictions of {} were negative ({})",
            prediction.adjusted,
            prediction.values.len(),
            prepared.name,
            config.negative_policy
        );
    }
    log::debug!(
        "Predicted {} snapshots of {} in {:.3}s",
        prediction.values.len(),
        prepared.name,
        start.elapsed().as_secs_f64()
    );
    Ok(prediction.values)
}

/// Assemble the per-flow predictions into one matrix per snapshot and write them to the output
/// directory. Diagonal flows are zero.
fn write_matrices(
    args: &Args,
    config: &RunConfig,
    predictions: &[Option<Vec<f64>>],
) -> anyhow::Result<()> {
    let matrices = assemble_snapshots(predictions, config.row_length)?;

    fs::create_dir_all(&args.output_path)?;
    for (i, tm) in matrices.iter().enumerate() {
        tm.write_file(
            args.output_path
                .clone()
                .then(matrix::snapshot_file_name(config.model, i)),
        )?;
    }
    log::info!(
        "Wrote {} traffic matrices to {:?}",
        matrices.len(),
        args.output_path
    );
    Ok(())
}
