//! Loader for a directory of headerless, comma-separated files:
//!
//! - `train_data.csv` / `train_labels.csv`
//! - `test_data.csv`  / `test_labels.csv`
//!
//! Each line of a data file is one example's features. Each line of a label
//! file is either one class index (single column) or a one-hot row (several
//! columns); both label files must use the same form.

use std::path::Path;

use csv::ReaderBuilder;
use log::info;

use crate::data::dataset::Split;
use crate::data::labels::Labels;
use crate::data::memory::{Layout, MemoryDataset};
use crate::data::partition_training;
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

/// Reads every record of a headerless CSV file as a row of `f64`.
pub fn read_rows(path: &Path) -> Result<Vec<Vec<f64>>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let row = record
            .iter()
            .enumerate()
            .map(|(col, cell)| {
                cell.parse::<f64>().map_err(|_| {
                    Error::Format(format!(
                        "{}: can't parse column {} of line {} ({:?}) as a number",
                        path.display(), col + 1, line + 1, cell
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push(row);
    }
    Ok(rows)
}

/// Interprets label rows as class indices (one column) or one-hot columns.
fn parse_labels(rows: &[Vec<f64>], path: &Path) -> Result<Labels> {
    if rows.iter().all(|r| r.len() == 1) {
        let classes = rows
            .iter()
            .enumerate()
            .map(|(line, r)| {
                let v = r[0];
                if v >= 0.0 && v.fract() == 0.0 {
                    Ok(v as usize)
                } else {
                    Err(Error::Format(format!(
                        "{}: line {} holds {} which is not a class index",
                        path.display(), line + 1, v
                    )))
                }
            })
            .collect::<Result<Vec<usize>>>()?;
        Ok(Labels::Index(classes))
    } else {
        Ok(Labels::OneHot(Matrix::from_columns(rows)))
    }
}

fn read_split(data_path: &Path, labels_path: &Path) -> Result<Split> {
    let rows = read_rows(data_path)?;
    let labels = parse_labels(&read_rows(labels_path)?, labels_path)?;
    if labels.len() != rows.len() {
        return Err(Error::InvalidDataset(format!(
            "{} has {} rows but {} has {} labels",
            data_path.display(), rows.len(), labels_path.display(), labels.len()
        )));
    }
    let inputs = if rows.is_empty() { Matrix::zeros(0, 0) } else { Matrix::from_columns(&rows) };
    Split::new(inputs, labels)
}

/// Loads a CSV dataset directory.
///
/// The first `training` rows of the training files (all rows not reserved for
/// validation when `None`) become the training split; the last `validation`
/// rows become the validation split. The test files form the test split.
pub fn load_directory(dir: &Path, training: Option<usize>, validation: usize) -> Result<MemoryDataset> {
    info!("Reading data from {:?}:", dir);
    let full = read_split(&dir.join("train_data.csv"), &dir.join("train_labels.csv"))?;
    let test = read_split(&dir.join("test_data.csv"), &dir.join("test_labels.csv"))?;

    if matches!(full.labels, Labels::OneHot(_)) != matches!(test.labels, Labels::OneHot(_)) && !test.is_empty() {
        return Err(Error::InvalidDataset(
            "training and test label files use different label formats".into(),
        ));
    }
    let n_outputs = full.labels.class_count().max(test.labels.class_count());

    let (train_split, validation_split) = partition_training(&full, training, validation)?;
    MemoryDataset::new(train_split, validation_split, test, n_outputs, Layout::Tabular)
}
