use std::fs::File;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] calamine::XlsxError),
    #[error("workbook has no sheets: {0}")]
    EmptyWorkbook(String),
    #[error("unsupported file extension: {0:?}")]
    UnsupportedExtension(String),
}

/// Produces the raw 2-D string grid for one statement file, with the
/// header row already stripped.
pub trait GridReader {
    fn read(&self, path: &Path) -> Result<Vec<Vec<String>>, ReaderError>;
}

/// Picks a reader by file extension. An unknown extension is a
/// configuration error, fatal for that file.
pub fn reader_for(path: &Path) -> Result<Box<dyn GridReader>, ReaderError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match extension.as_str() {
        "csv" => Ok(Box::new(CsvGridReader)),
        "xlsx" => Ok(Box::new(XlsxGridReader)),
        _ => Err(ReaderError::UnsupportedExtension(extension)),
    }
}

pub struct CsvGridReader;

impl GridReader for CsvGridReader {
    fn read(&self, path: &Path) -> Result<Vec<Vec<String>>, ReaderError> {
        let file = File::open(path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);
        let mut grid = Vec::new();
        for record in reader.records() {
            let record = record?;
            grid.push(record.iter().map(str::to_string).collect());
        }
        Ok(grid)
    }
}

pub struct XlsxGridReader;

impl GridReader for XlsxGridReader {
    fn read(&self, path: &Path) -> Result<Vec<Vec<String>>, ReaderError> {
        let mut workbook: Xlsx<_> = open_workbook(path)?;
        let sheet = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ReaderError::EmptyWorkbook(path.display().to_string()))?;
        let range = workbook.worksheet_range(&sheet)?;
        let grid = range
            .rows()
            .skip(1)
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();
        Ok(grid)
    }
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}
