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
//! Plotting driver: draws the comparison figures from the metric tables of one topology.

use std::{fs, path::PathBuf, process};

use anyhow::Context;
use clap::Parser;
use itertools::Itertools;
use rayon::prelude::*;
use strum::IntoEnumIterator;

use tmpred::{
    figures::{self, Format, PlotKind, RoutingScenario},
    records::MetricTable,
    util::{self, PathBufExt},
};

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// Directory containing the metric tables.
    #[arg(short, long, default_value = "./")]
    data_path: PathBuf,
    /// Overwrite the output path for plots.
    #[arg(short, long, default_value = "./fig/")]
    output_path: PathBuf,
    /// Type of plot to generate. May be repeated; all types are drawn if omitted.
    #[arg(short, long, value_enum)]
    plot_type: Vec<PlotKind>,
    /// Topology name, used in the file names.
    #[arg(short, long, default_value = "CERNET")]
    topology: String,
    /// Routing scenarios of the MLU bias figures (`SDN_split`, `hybrid` or `OSPF`).
    #[arg(short, long = "scenario", default_values_t = ["OSPF".to_string()])]
    scenarios: Vec<String>,
    /// X range `MIN,MAX` of the MLU bias figures of the TM, the OD, and the KEC groups. Missing
    /// ranges repeat the last one given.
    #[arg(short, long = "x-range", value_parser = parse_range, allow_hyphen_values = true)]
    x_ranges: Vec<(f64, f64)>,
    #[arg(short, long, value_enum, default_value_t = Format::Png)]
    format: Format,
}

impl Args {
    fn x_ranges(&self, scenario: RoutingScenario) -> [Option<(f64, f64)>; 3] {
        match self.x_ranges.last() {
            None => scenario.default_x_ranges(),
            Some(last) => {
                std::array::from_fn(|i| Some(self.x_ranges.get(i).copied().unwrap_or(*last)))
            }
        }
    }
}

fn parse_range(s: &str) -> Result<(f64, f64), String> {
    let (lo, hi) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `MIN,MAX`, got `{s}`"))?;
    let lo: f64 = lo.trim().parse().map_err(|e| format!("{e}"))?;
    let hi: f64 = hi.trim().parse().map_err(|e| format!("{e}"))?;
    if lo >= hi {
        return Err(format!("empty range `{s}`"));
    }
    Ok((lo, hi))
}

fn main() -> anyhow::Result<()> {
    util::init_logging();

    // parse plot parameters
    let args = Args::parse();
    fs::create_dir_all(&args.output_path)?;

    // ensure that the data folder exists
    if !args.data_path.exists() {
        log::error!("Could not read data in {:?}!", args.data_path);
        process::exit(1)
    }

    let kinds: Vec<PlotKind> = if args.plot_type.is_empty() {
        PlotKind::iter().collect()
    } else {
        args.plot_type.clone()
    };

    let mut figures = Vec::new();
    for kind in kinds {
        let scenarios = match kind {
            PlotKind::MluBias => args.scenarios.clone(),
            _ => vec![String::new()],
        };
        for scenario in scenarios {
            let file = args
                .data_path
                .clone()
                .then(kind.input_file(&args.topology, &scenario));
            if !file.exists() && args.plot_type.is_empty() {
                log::warn!("Skipping the {kind} figures, {file:?} does not exist");
                continue;
            }
            let table = MetricTable::load(&file)
                .with_context(|| format!("Cannot read the metric table {file:?}"))?;
            log::debug!("{file:?} holds {}", table.variants().join(", "));
            let routing = RoutingScenario::from_name(&scenario);
            figures.extend(figures::figures_for(
                kind,
                &table,
                &args.topology,
                routing,
                args.x_ranges(routing),
            ));
        }
    }

    figures
        .par_iter()
        .try_for_each(|figure| figures::render(figure, &args.output_path, args.format))?;
    log::info!("Plotted {} figures to {:?}", figures.len(), args.output_path);

    Ok(())
}
