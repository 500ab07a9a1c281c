// src/data_loader.rs

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::DatasetError;
use crate::locator::DatasetLocation;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Quantitative,
    Categorical,
}

#[derive(Debug)]
pub struct TableData {
    pub headers: Vec<String>,
    pub columns: Vec<Vec<String>>,
    pub kinds: Vec<ColumnKind>,
}

impl TableData {
    pub fn new(headers: Vec<String>, columns: Vec<Vec<String>>) -> Self {
        let kinds = columns.iter().map(|col| infer_kind(col)).collect();
        TableData {
            headers,
            columns,
            kinds,
        }
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn columns_of_kind(&self, kind: ColumnKind) -> Vec<usize> {
        self.kinds
            .iter()
            .enumerate()
            .filter(|(_, k)| **k == kind)
            .map(|(i, _)| i)
            .collect()
    }

    /// Numeric value of a cell, `None` for missing or non-numeric cells.
    pub fn number(&self, col: usize, row: usize) -> Option<f64> {
        let cell = self.columns.get(col)?.get(row)?;
        if is_missing(cell) {
            None
        } else {
            cell.trim().parse::<f64>().ok()
        }
    }
}

pub fn is_missing(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || cell.eq_ignore_ascii_case("na") || cell.eq_ignore_ascii_case("nan")
}

fn infer_kind(column: &[String]) -> ColumnKind {
    let mut present = column.iter().filter(|cell| !is_missing(cell)).peekable();
    if present.peek().is_none() {
        return ColumnKind::Categorical;
    }
    if present.all(|cell| cell.trim().parse::<f64>().is_ok()) {
        ColumnKind::Quantitative
    } else {
        ColumnKind::Categorical
    }
}

pub trait DataLoader {
    fn load(&self, location: &DatasetLocation) -> Result<TableData, DatasetError>;
}

pub struct CsvLoader;

impl CsvLoader {
    pub fn read<R: Read>(&self, source: R) -> Result<TableData, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(source);
        let headers = reader
            .headers()?
            .iter()
            .map(String::from)
            .collect::<Vec<String>>();

        let mut columns: Vec<Vec<String>> = headers.iter().map(|_| Vec::new()).collect();

        for result in reader.records() {
            let record = result?;
            for (i, field) in record.iter().enumerate() {
                columns[i].push(field.to_string());
            }
        }

        Ok(TableData::new(headers, columns))
    }

    fn open_file(&self, path: &Path) -> Result<File, DatasetError> {
        if !path.is_file() {
            return Err(DatasetError::not_found(path.display()));
        }
        File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => DatasetError::not_found(path.display()),
            _ => DatasetError::Io(e),
        })
    }

    fn fetch(&self, url: &str) -> Result<reqwest::blocking::Response, DatasetError> {
        let response = reqwest::blocking::get(url).map_err(|e| {
            warn!(url, error = %e, "dataset fetch failed");
            DatasetError::not_found(url)
        })?;
        let status = response.status();
        if !status.is_success() {
            warn!(url, %status, "dataset fetch returned an error status");
            return Err(DatasetError::not_found(url));
        }
        Ok(response)
    }
}

impl DataLoader for CsvLoader {
    fn load(&self, location: &DatasetLocation) -> Result<TableData, DatasetError> {
        debug!(%location, "reading CSV");
        let data = match location {
            DatasetLocation::File(path) => self.read(self.open_file(path)?)?,
            DatasetLocation::Url(url) => self.read(self.fetch(url)?)?,
        };
        info!(
            %location,
            rows = data.row_count(),
            columns = data.column_count(),
            "dataset loaded"
        );
        Ok(data)
    }
}

pub fn get_loader(extension: &str) -> Result<Box<dyn DataLoader>, DatasetError> {
    match extension.to_lowercase().as_str() {
        "csv" => Ok(Box::new(CsvLoader)),

        _ => Err(DatasetError::UnsupportedFormat(extension.to_string())),
    }
}
