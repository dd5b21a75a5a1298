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
//! Loading of OD-pair CSV files, and preparation of a single flow for training.
//!
//! An OD-pair CSV has one column per origin-destination flow, named `OD_<origin>-<destination>`.
//! The first column holds the time index and is not a flow.

use std::path::Path;

use itertools::Itertools;

use tmpred_utils::{
    od::OdLabel,
    series::{self, Normalization, Scaler, Split, Window},
    table::{self, Column, TableError},
};

/// One origin-destination flow.
#[derive(Debug, Clone, PartialEq)]
pub struct OdFlow {
    pub name: String,
    /// Parsed label, if the column name follows the `OD_<origin>-<destination>` pattern.
    pub label: Option<OdLabel>,
    pub values: Vec<f64>,
}

impl OdFlow {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        let name = name.into();
        let label = name.parse().ok();
        Self {
            name,
            label,
            values,
        }
    }

    /// Flows from a node to itself are never trained.
    pub fn is_diagonal(&self) -> bool {
        self.label.as_ref().is_some_and(OdLabel::is_diagonal)
    }
}

/// All flows of one OD-pair CSV, in column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OdDataset {
    pub flows: Vec<OdFlow>,
}

impl OdDataset {
    /// Load all flows from the CSV file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        log::info!("Loading OD flows from {path:?}");
        Self::from_columns(table::read_aligned_columns(path)?)
    }

    /// Build the dataset from raw columns, dropping the leading time index column. All flows must
    /// cover the same snapshots.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, DatasetError> {
        let flows = columns
            .into_iter()
            .skip(1)
            .map(|Column { name, values }| OdFlow::new(name, values))
            .collect_vec();
        if flows.is_empty() {
            return Err(DatasetError::NoFlows);
        }
        if let Some(flow) = flows.iter().duplicates_by(|f| f.name.as_str()).next() {
            return Err(DatasetError::DuplicateFlow(flow.name.clone()));
        }
        let expected = flows[0].values.len();
        if let Some(flow) = flows.iter().find(|f| f.values.len() != expected) {
            return Err(DatasetError::Ragged {
                flow: flow.name.clone(),
                expected,
                got: flow.values.len(),
            });
        }
        Ok(Self { flows })
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    pub fn flow(&self, name: &str) -> Option<&OdFlow> {
        self.flows.iter().find(|f| f.name == name)
    }

    /// Prepare every flow with the same parameters, in dataset order.
    pub fn prepare(
        &self,
        k: usize,
        normalization: Normalization,
        train_ratio: f64,
        train_multiple: usize,
    ) -> Vec<PreparedFlow> {
        self.flows
            .iter()
            .map(|f| PreparedFlow::new(f, k, normalization, train_ratio, train_multiple))
            .collect()
    }

    /// Measured values of all flows at the label of held-out window `t`, i.e., the snapshot that
    /// the predictions of window `t` are compared to. `prepared` must come from
    /// [`OdDataset::prepare`]. Returns `None` if `t` is not a held-out window of every flow.
    pub fn held_out_snapshot(&self, prepared: &[PreparedFlow], t: usize) -> Option<Vec<f64>> {
        if prepared.len() != self.flows.len() {
            return None;
        }
        self.flows
            .iter()
            .zip(prepared)
            .map(|(flow, p)| {
                (t < p.split.test.len())
                    .then(|| flow.values.get(p.test_label_index(t)).copied())
                    .flatten()
            })
            .collect()
    }

    /// Keep only the flows named in `names`, in dataset order. Unknown names are an error.
    pub fn select(self, names: &[String]) -> Result<Self, DatasetError> {
        if let Some(missing) = names.iter().find(|n| self.flow(n).is_none()) {
            return Err(DatasetError::UnknownFlow(missing.clone()));
        }
        Ok(Self {
            flows: self
                .flows
                .into_iter()
                .filter(|f| names.contains(&f.name))
                .collect(),
        })
    }
}

/// A flow after normalization, ready to generate windows.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedFlow {
    pub name: String,
    pub scaler: Scaler,
    pub normalized: Vec<f64>,
    pub k: usize,
    /// Split of the window indices into training and held-out samples.
    pub split: Split,
}

impl PreparedFlow {
    /// Normalize `flow` with scaling parameters computed on the whole series, and split its
    /// windows of length `k`.
    pub fn new(
        flow: &OdFlow,
        k: usize,
        normalization: Normalization,
        train_ratio: f64,
        train_multiple: usize,
    ) -> Self {
        let (normalized, scaler) = series::normalize(&flow.values, normalization);
        let split = Split::new(
            series::num_windows(normalized.len(), k),
            train_ratio,
            train_multiple,
        );
        Self {
            name: flow.name.clone(),
            scaler,
            normalized,
            k,
            split,
        }
    }

    pub fn train_windows(&self) -> Vec<Window<'_>> {
        series::windows(&self.normalized, self.k)
            .take(self.split.train.end)
            .collect()
    }

    pub fn test_windows(&self) -> Vec<Window<'_>> {
        series::windows(&self.normalized, self.k)
            .skip(self.split.test.start)
            .collect()
    }

    /// Index into the raw series of the label of held-out window `i`.
    pub fn test_label_index(&self, i: usize) -> usize {
        self.split.test.start + i + self.k
    }
}

/// Error type for loading OD-pair data.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Cannot read the OD-pair table: {0}")]
    Table(#[from] TableError),
    #[error("The OD-pair table contains no flow column")]
    NoFlows,
    #[error("Flow {0} appears more than once")]
    DuplicateFlow(String),
    #[error("Flow {0} is not part of the dataset")]
    UnknownFlow(String),
    #[error("Flow {flow} has {got} samples, expected {expected}")]
    Ragged {
        flow: String,
        expected: usize,
        got: usize,
    },
}

#[cfg(test)]
mod test {
    use super::*;

    fn dataset() -> OdDataset {
        let csv = "time,OD_1-1,OD_1-2,OD_2-1\n\
                   0,0,10,5\n1,0,20,5\n2,0,30,5\n3,0,40,5\n4,0,50,5\n";
        let columns = table::read_aligned_columns_from(csv.as_bytes()).unwrap();
        OdDataset::from_columns(columns).unwrap()
    }

    #[test]
    fn load_flows() {
        let data = dataset();
        assert_eq!(data.len(), 3);
        assert_eq!(
            data.flows.iter().map(|f| f.name.as_str()).collect_vec(),
            vec!["OD_1-1", "OD_1-2", "OD_2-1"]
        );
        assert!(data.flows[0].is_diagonal());
        assert!(!data.flows[1].is_diagonal());
        assert_eq!(data.flow("OD_1-2").unwrap().values[4], 50.0);
        assert!(data.flow("time").is_none());
    }

    #[test]
    fn no_flow_columns() {
        let columns = table::read_columns_from("time\n0\n1\n".as_bytes()).unwrap();
        assert!(matches!(
            OdDataset::from_columns(columns),
            Err(DatasetError::NoFlows)
        ));
    }

    #[test]
    fn held_out_snapshots() {
        let data = dataset();
        let prepared = data.prepare(2, Normalization::MinMax, 0.8, 1);
        assert_eq!(prepared.len(), 3);
        // 3 windows, the first 2 are used for training, the last one predicts index 4
        assert_eq!(prepared[1].test_label_index(0), 4);
        assert_eq!(
            data.held_out_snapshot(&prepared, 0),
            Some(vec![0.0, 50.0, 5.0])
        );
        assert_eq!(data.held_out_snapshot(&prepared, 1), None);
        assert_eq!(data.held_out_snapshot(&prepared[..1], 0), None);

        let prepared = data.prepare(1, Normalization::MinMax, 0.5, 1);
        // 4 windows, 2 held out, predicting indices 3 and 4
        assert_eq!(
            data.held_out_snapshot(&prepared, 0),
            Some(vec![0.0, 40.0, 5.0])
        );
        assert_eq!(
            data.held_out_snapshot(&prepared, 1),
            Some(vec![0.0, 50.0, 5.0])
        );
    }

    #[test]
    fn gaps_are_rejected() {
        let csv = "time,OD_1-2,OD_2-1\n0,10,5\n1,,5\n2,30,5\n";
        assert!(matches!(
            table::read_aligned_columns_from(csv.as_bytes()),
            Err(TableError::Missing { row: 2, .. })
        ));

        // columns read without alignment cannot be shifted silently either
        let columns = table::read_columns_from(csv.as_bytes()).unwrap();
        match OdDataset::from_columns(columns) {
            Err(DatasetError::Ragged {
                flow,
                expected,
                got,
            }) => {
                assert_eq!(flow, "OD_2-1");
                assert_eq!(expected, 2);
                assert_eq!(got, 3);
            }
            x => panic!("unexpected result: {x:?}"),
        }
    }

    #[test]
    fn select_flows() {
        let data = dataset().select(&["OD_2-1".to_string()]).unwrap();
        assert_eq!(data.len(), 1);
        assert!(matches!(
            dataset().select(&["OD_9-9".to_string()]),
            Err(DatasetError::UnknownFlow(_))
        ));
    }

    #[test]
    fn prepare_flow() {
        let data = dataset();
        let prepared = PreparedFlow::new(&data.flows[1], 2, Normalization::MinMax, 0.8, 1);
        assert_eq!(prepared.normalized, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(prepared.split.test.end, 3);
        assert_eq!(prepared.split.train, 0..2);
        assert_eq!(prepared.train_windows().len(), 2);
        let test = prepared.test_windows();
        assert_eq!(test.len(), 1);
        assert_eq!(test[0].label, 1.0);
        assert_eq!(prepared.test_label_index(0), 4);

        // constant flows are left as they are
        let prepared = PreparedFlow::new(&data.flows[2], 2, Normalization::MinMax, 0.8, 1);
        assert_eq!(prepared.normalized, vec![5.0; 5]);
    }
}
