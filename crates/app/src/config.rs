use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use cstreet_import::{Classifier, ColumnMapping, RowWindow, Tagger};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Whole-run configuration: the database location, one entry per known
/// statement file (each holding one or more card layouts), and the
/// classification and tagging rule tables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub files: BTreeMap<String, FileConfig>,
    #[serde(default)]
    pub classes: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub tags: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    pub cards: BTreeMap<String, CardConfig>,
}

/// One card layout within a statement file: which column holds which
/// field, which rows are data, and how dates are written.
#[derive(Debug, Clone, Deserialize)]
pub struct CardConfig {
    pub columns: ColumnsConfig,
    pub rows: Option<RowsConfig>,
    /// chrono format string, e.g. "%d.%m.%Y".
    pub date_layout: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnsConfig {
    pub date: usize,
    pub description: usize,
    pub credit: Option<usize>,
    pub refund: Option<usize>,
    pub balance: Option<usize>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RowsConfig {
    pub start: usize,
    pub end: usize,
}

impl Config {
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn file(&self, file_name: &str) -> Option<&FileConfig> {
        self.files.get(file_name)
    }

    pub fn classifier(&self) -> Classifier {
        Classifier::new(&self.classes)
    }

    pub fn tagger(&self) -> Tagger {
        Tagger::new(&self.tags)
    }
}

impl CardConfig {
    pub fn column_mapping(&self) -> ColumnMapping {
        ColumnMapping {
            date: self.columns.date,
            description: self.columns.description,
            credit: self.columns.credit,
            refund: self.columns.refund,
            balance: self.columns.balance,
        }
    }

    pub fn row_window(&self) -> RowWindow {
        match self.rows {
            Some(RowsConfig { start, end }) => RowWindow::Range { start, end },
            None => RowWindow::All,
        }
    }
}
