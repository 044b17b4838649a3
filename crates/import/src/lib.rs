pub mod expense;
pub mod grid;
pub mod reader;
pub mod rules;

pub use expense::build_expenses;
pub use grid::{extract, ColumnMapping, ExtractError, RowWindow};
pub use reader::{reader_for, CsvGridReader, GridReader, ReaderError, XlsxGridReader};
pub use rules::{Classifier, RuleSet, Tagger};
