use std::path::PathBuf;

use clap::Parser;

use tmpred_utils::{
    od::OdLabel,
    series::{self, Normalization},
    table,
};

#[derive(Parser, Debug)]
#[command(author, version, about)] // get author/version information from Cargo.toml
/// Prints per-flow statistics of an OD-pair CSV.
struct Args {
    /// CSV file with one OD flow per column (the first column is the time index).
    od_pair_csv: PathBuf,
    /// Window length.
    #[arg(short, default_value_t = 10)]
    k: usize,
    /// Share of the windows used for training.
    #[arg(long, default_value_t = 0.8)]
    train_ratio: f64,
    /// The number of training windows is rounded down to a multiple of this.
    #[arg(long, default_value_t = 50)]
    train_multiple: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let args = Args::parse();

    let columns = table::read_columns(&args.od_pair_csv)?;

    println!("flow,diagonal,len,min,max,windows,train,test");
    for column in columns.iter().skip(1) {
        let diagonal = column
            .name
            .parse::<OdLabel>()
            .map(|label| label.is_diagonal())
            .unwrap_or(false);
        let scaler = series::Scaler::fit(&column.values, Normalization::MinMax);
        let num_windows = series::num_windows(column.values.len(), args.k);
        let split = series::Split::new(num_windows, args.train_ratio, args.train_multiple);
        println!(
            "{},{},{},{},{},{},{},{}",
            column.name,
            diagonal,
            column.values.len(),
            scaler.min().unwrap_or(f64::NAN),
            scaler.max().unwrap_or(f64::NAN),
            num_windows,
            split.train.len(),
            split.test.len(),
        );
    }

    Ok(())
}
