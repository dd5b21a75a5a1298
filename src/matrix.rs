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
//! Traffic matrices reassembled from per-flow predictions.
//!
//! Flows are placed row by row in dataset order: flow `i` lands in row `i / row_length` and
//! column `i % row_length`. On disk, a matrix is a text file with one line `row column value`
//! (1-based) per non-zero entry.

use std::{
    fmt, fs,
    io::{self, BufRead, BufWriter, Write},
    path::Path,
};

/// A dense traffic matrix, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficMatrix {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl TrafficMatrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            values: vec![0.0; rows * cols],
        }
    }

    /// Place `flow_values[i]` at row `i / row_length`, column `i % row_length`.
    pub fn from_flow_values(flow_values: &[f64], row_length: usize) -> Result<Self, MatrixError> {
        if row_length == 0 {
            return Err(MatrixError::ZeroRowLength);
        }
        let rows = flow_values.len().div_ceil(row_length);
        let mut tm = Self::zeros(rows, row_length);
        tm.values[..flow_values.len()].copy_from_slice(flow_values);
        Ok(tm)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// All values in row-major order, i.e., in flow order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        (row < self.rows && col < self.cols).then(|| self.values[row * self.cols + col])
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<(), MatrixError> {
        if row >= self.rows || col >= self.cols {
            return Err(MatrixError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        self.values[row * self.cols + col] = value;
        Ok(())
    }

    /// Iterate over the non-zero entries as `(row, col, value)`, 0-based.
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0.0)
            .map(|(i, v)| (i / self.cols, i % self.cols, *v))
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for (row, col, value) in self.entries() {
            writeln!(writer, "{} {} {}", row + 1, col + 1, value)?;
        }
        Ok(())
    }

    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<(), MatrixError> {
        let file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Parse a matrix of the given size from `row column value` lines. Missing entries are zero.
    pub fn read_from<R: BufRead>(
        reader: R,
        rows: usize,
        cols: usize,
    ) -> Result<Self, MatrixError> {
        let mut tm = Self::zeros(rows, cols);
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let malformed = || MatrixError::Malformed {
                line: i + 1,
                content: line.clone(),
            };
            let mut fields = line.split_whitespace();
            let (Some(row), Some(col), Some(value), None) =
                (fields.next(), fields.next(), fields.next(), fields.next())
            else {
                return Err(malformed());
            };
            let row: usize = row.parse().map_err(|_| malformed())?;
            let col: usize = col.parse().map_err(|_| malformed())?;
            let value: f64 = value.parse().map_err(|_| malformed())?;
            if row == 0 || col == 0 {
                return Err(malformed());
            }
            tm.set(row - 1, col - 1, value)?;
        }
        Ok(tm)
    }

    pub fn read_file(
        path: impl AsRef<Path>,
        rows: usize,
        cols: usize,
    ) -> Result<Self, MatrixError> {
        let file = fs::File::open(path.as_ref())?;
        Self::read_from(io::BufReader::new(file), rows, cols)
    }
}

/// Build one matrix per snapshot from per-flow predictions. `per_flow[f][t]` is the value of flow
/// `f` at snapshot `t`; all predicted flows must hold the same number of snapshots. Flows without
/// predictions (`None`, the diagonal) are zero in every snapshot.
pub fn assemble_snapshots(
    per_flow: &[Option<Vec<f64>>],
    row_length: usize,
) -> Result<Vec<TrafficMatrix>, MatrixError> {
    let Some(snapshots) = per_flow.iter().flatten().map(Vec::len).next() else {
        return Ok(Vec::new());
    };
    if let Some((flow, values)) = per_flow
        .iter()
        .enumerate()
        .filter_map(|(f, v)| v.as_ref().map(|v| (f, v)))
        .find(|(_, v)| v.len() != snapshots)
    {
        return Err(MatrixError::LengthMismatch {
            flow,
            expected: snapshots,
            got: values.len(),
        });
    }

    (0..snapshots)
        .map(|t| {
            let column: Vec<f64> = per_flow
                .iter()
                .map(|values| values.as_ref().map_or(0.0, |v| v[t]))
                .collect();
            TrafficMatrix::from_flow_values(&column, row_length)
        })
        .collect()
}

/// File name of snapshot `index` (0-based), e.g., `LSTM_OD_pair_1.txt` for the first one.
pub fn snapshot_file_name(prefix: impl fmt::Display, index: usize) -> String {
    format!("{prefix}_OD_pair_{}.txt", index + 1)
}

/// Error type for building, writing and parsing traffic matrices.
#[derive(Debug, thiserror::Error)]
pub enum MatrixError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Row length must be positive")]
    ZeroRowLength,
    #[error("Entry ({row}, {col}) is outside of a {rows}x{cols} matrix")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("Flow {flow} has {got} snapshots, expected {expected}")]
    LengthMismatch {
        flow: usize,
        expected: usize,
        got: usize,
    },
    #[error("Malformed matrix entry on line {line}: `{content}`")]
    Malformed { line: usize, content: String },
}
