//! Column-oriented numeric CSV tables: the header names the columns, every further row holds one
//! value per column.

use std::{fs, io, path::Path};

use itertools::Itertools;

/// A named numeric column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

/// Error type for reading and writing column tables.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Cannot parse `{value}` in column `{column}` (row {row}) as a number")]
    Parse {
        column: String,
        row: usize,
        value: String,
    },
    #[error("Missing value in column `{column}` (row {row})")]
    Missing { column: String, row: usize },
}

/// Read all columns from any reader. Empty cells are skipped, so columns may differ in length.
pub fn read_columns_from<R: io::Read>(reader: R) -> Result<Vec<Column>, TableError> {
    read(reader, false)
}

/// Read all columns of the CSV file at `path`. Empty cells are skipped.
pub fn read_columns(path: impl AsRef<Path>) -> Result<Vec<Column>, TableError> {
    let path = path.as_ref();
    log::debug!("Loading: {path:?}");
    read_columns_from(fs::File::open(path)?)
}

/// Read all columns from any reader, requiring a value in every cell. Row `i` of every column
/// therefore belongs to the same record.
pub fn read_aligned_columns_from<R: io::Read>(reader: R) -> Result<Vec<Column>, TableError> {
    read(reader, true)
}

/// Read all columns of the CSV file at `path`, requiring a value in every cell.
pub fn read_aligned_columns(path: impl AsRef<Path>) -> Result<Vec<Column>, TableError> {
    let path = path.as_ref();
    log::debug!("Loading: {path:?}");
    read_aligned_columns_from(fs::File::open(path)?)
}

fn read<R: io::Read>(reader: R, aligned: bool) -> Result<Vec<Column>, TableError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(!aligned)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut columns = rdr
        .headers()?
        .iter()
        .map(|name| Column {
            name: name.to_string(),
            values: Vec::new(),
        })
        .collect_vec();

    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        for (column, value) in columns.iter_mut().zip(record.iter()) {
            if value.is_empty() {
                if aligned {
                    return Err(TableError::Missing {
                        column: column.name.clone(),
                        row: row + 1,
                    });
                }
                continue;
            }
            let parsed = value.parse::<f64>().map_err(|_| TableError::Parse {
                column: column.name.clone(),
                row: row + 1,
                value: value.to_string(),
            })?;
            column.values.push(parsed);
        }
    }

    Ok(columns)
}

/// Write `columns` side by side. Shorter columns are padded with empty cells.
pub fn write_columns_to<W: io::Write>(writer: W, columns: &[Column]) -> Result<(), TableError> {
    let mut csv = csv::WriterBuilder::new().has_headers(true).from_writer(writer);
    csv.write_record(columns.iter().map(|c| c.name.as_str()))?;

    let rows = columns.iter().map(|c| c.values.len()).max().unwrap_or(0);
    for row in 0..rows {
        csv.write_record(columns.iter().map(|c| {
            c.values
                .get(row)
                .map(|x| x.to_string())
                .unwrap_or_default()
        }))?;
    }
    csv.flush()?;
    Ok(())
}

/// Write `columns` to the CSV file at `path`, replacing it if it exists.
pub fn write_columns(path: impl AsRef<Path>, columns: &[Column]) -> Result<(), TableError> {
    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path.as_ref())?;
    write_columns_to(file, columns)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn read_with_gaps() {
        let data = "time, OD_1-1, OD_1-2\n0, 0, 1.5\n1, 0, 2.5\n2, , 3\n";
        let columns = read_columns_from(data.as_bytes()).unwrap();
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].name, "time");
        assert_eq!(columns[1].values, vec![0.0, 0.0]);
        assert_eq!(columns[2].name, "OD_1-2");
        assert_eq!(columns[2].values, vec![1.5, 2.5, 3.0]);
    }

    #[test]
    fn aligned_rejects_gaps() {
        let data = "time, OD_1-1, OD_1-2\n0, 0, 1.5\n1, 0, 2.5\n2, , 3\n";
        match read_aligned_columns_from(data.as_bytes()) {
            Err(TableError::Missing { column, row }) => {
                assert_eq!(column, "OD_1-1");
                assert_eq!(row, 3);
            }
            x => panic!("unexpected result: {x:?}"),
        }

        // short rows are rejected as well
        let data = "time,OD_1-2\n0,1\n1\n";
        assert!(matches!(
            read_aligned_columns_from(data.as_bytes()),
            Err(TableError::Csv(_))
        ));

        let data = "time,OD_1-2\n0,1\n1,2\n";
        let columns = read_aligned_columns_from(data.as_bytes()).unwrap();
        assert_eq!(columns[1].values, vec![1.0, 2.0]);
    }

    #[test]
    fn parse_error() {
        let data = "a,b\n1,x\n";
        match read_columns_from(data.as_bytes()) {
            Err(TableError::Parse { column, row, value }) => {
                assert_eq!(column, "b");
                assert_eq!(row, 1);
                assert_eq!(value, "x");
            }
            x => panic!("unexpected result: {x:?}"),
        }
    }

    #[test]
    fn write_padded() {
        let columns = vec![
            Column {
                name: "LSTM".to_string(),
                values: vec![1.0, 2.0],
            },
            Column {
                name: "GRU".to_string(),
                values: vec![3.0],
            },
        ];
        let mut buf = Vec::new();
        write_columns_to(&mut buf, &columns).unwrap();
        let ser = String::from_utf8(buf).unwrap();
        assert_eq!(ser, "LSTM,GRU\n1,3\n2,\n");

        let de = read_columns_from(ser.as_bytes()).unwrap();
        assert_eq!(de, columns);
    }
}
