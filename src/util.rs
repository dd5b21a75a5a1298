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
//! Utility module collection of functions

use std::path::{Path, PathBuf};

use indicatif::{MultiProgress, ProgressStyle};
use indicatif_log_bridge::LogWrapper;

/// Configuration file read by `init_logging`.
pub const LOG_CONFIG: &str = "log4rs.yml";

/// Initialize logging from `log4rs.yml`. If that file does not exist, fall back to
/// `pretty_env_logger`, configured by `RUST_LOG`.
pub fn init_logging() {
    if Path::new(LOG_CONFIG).exists() {
        if let Err(e) = log4rs::init_file(LOG_CONFIG, Default::default()) {
            eprintln!("Cannot initialize logging from {LOG_CONFIG}: {e}");
        }
    } else {
        let _ = pretty_env_logger::try_init();
    }
}

/// Initialize `pretty_env_logger` such that log lines are printed above the progress bars of
/// `multi`.
pub fn init_logging_with_progress() -> MultiProgress {
    let logger = pretty_env_logger::formatted_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .build();
    let level = logger.filter();
    let multi = MultiProgress::new();
    if LogWrapper::new(multi.clone(), logger).try_init().is_ok() {
        log::set_max_level(level);
    }
    multi
}

/// Style of the progress bars shown while iterating over flows.
pub fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "[{bar:60}] {pos:>4}/{len:4} {msg:20} elapsed: {elapsed}, eta: {eta}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("##-")
}

pub trait PathBufExt: Sized {
    fn then(self, p: impl AsRef<Path>) -> PathBuf;
}

impl PathBufExt for PathBuf {
    fn then(mut self, p: impl AsRef<Path>) -> PathBuf {
        self.push(p);
        self
    }
}

impl PathBufExt for &Path {
    fn then(self, p: impl AsRef<Path>) -> PathBuf {
        let mut path = self.to_path_buf();
        path.push(p);
        path
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn path_then() {
        let base = Path::new("./models");
        assert_eq!(base.then("LSTM_OD_2-8"), PathBuf::from("./models/LSTM_OD_2-8"));
        assert_eq!(
            PathBuf::from("fig").then("RMSE_TM_Abilene.png"),
            PathBuf::from("fig/RMSE_TM_Abilene.png")
        );
    }
}
