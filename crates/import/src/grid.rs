use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use cstreet_core::{Money, Transaction};

/// Positional (0-based) column indices for one card format. Date and
/// description are mandatory; the amount and balance columns are absent
/// from some exports, so they stay optional instead of overloading index
/// zero as a sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub date: usize,
    pub description: usize,
    pub credit: Option<usize>,
    pub refund: Option<usize>,
    pub balance: Option<usize>,
}

impl ColumnMapping {
    /// The configured (field, index) pairs, enumerated explicitly for
    /// bounds checking.
    fn configured(&self) -> Vec<(&'static str, usize)> {
        let mut fields = vec![("date", self.date), ("description", self.description)];
        if let Some(idx) = self.credit {
            fields.push(("credit", idx));
        }
        if let Some(idx) = self.refund {
            fields.push(("refund", idx));
        }
        if let Some(idx) = self.balance {
            fields.push(("balance", idx));
        }
        fields
    }
}

/// Contiguous row range of a grid considered transaction data. 0-based,
/// half-open. `All` is an explicit variant, not an equal-bounds sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowWindow {
    All,
    Range { start: usize, end: usize },
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("row window {start}..{end} invalid for grid with {rows} rows")]
    Window {
        start: usize,
        end: usize,
        rows: usize,
    },
    #[error("column mapping out of range for grid with {columns} columns: {fields:?}")]
    Columns {
        columns: usize,
        fields: Vec<(&'static str, usize)>,
    },
}

/// Turns a raw string grid into validated transactions.
///
/// Structural problems — a window that falls outside the grid, a column
/// index past the grid width — abort the whole grid: they mean the card
/// configuration does not fit this file. Rows that fail to parse are
/// isolated bad data and are skipped without surfacing an error.
pub fn extract(
    grid: &[Vec<String>],
    mapping: &ColumnMapping,
    window: RowWindow,
    date_layout: &str,
) -> Result<Vec<Transaction>, ExtractError> {
    let rows = match window {
        RowWindow::All => grid,
        RowWindow::Range { start, end } => {
            if start >= end || end > grid.len() {
                return Err(ExtractError::Window {
                    start,
                    end,
                    rows: grid.len(),
                });
            }
            &grid[start..end]
        }
    };
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let invalid: Vec<(&'static str, usize)> = mapping
        .configured()
        .into_iter()
        .filter(|(_, idx)| *idx >= columns)
        .collect();
    if !invalid.is_empty() {
        return Err(ExtractError::Columns {
            columns,
            fields: invalid,
        });
    }

    let mut transactions = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        match parse_row(row, mapping, date_layout) {
            Some(tx) => transactions.push(tx),
            None => debug!(row = i, "skipping row that failed validation"),
        }
    }
    Ok(transactions)
}

fn parse_row(row: &[String], mapping: &ColumnMapping, date_layout: &str) -> Option<Transaction> {
    let date = NaiveDate::parse_from_str(cell(row, Some(mapping.date)).trim(), date_layout).ok()?;

    let credit = parse_amount(cell(row, mapping.credit));
    let refund = parse_amount(cell(row, mapping.refund));
    // Exactly one of credit/refund must be populated.
    let (credit, refund) = match (credit, refund) {
        (Some(credit), None) => (credit, Money::zero()),
        (None, Some(refund)) => (Money::zero(), refund),
        _ => return None,
    };

    // Balance is best-effort; a statement without one reads as zero.
    let balance = parse_amount(cell(row, mapping.balance)).unwrap_or_else(Money::zero);
    let description = cell(row, Some(mapping.description)).to_string();

    Some(Transaction {
        date,
        description,
        credit,
        refund,
        balance,
    })
}

fn cell<'a>(row: &'a [String], idx: Option<usize>) -> &'a str {
    idx.and_then(|i| row.get(i)).map(String::as_str).unwrap_or("")
}

/// A cell counts as populated when it is non-empty, not the literal "NaN",
/// and parses as a decimal number.
fn parse_amount(cell: &str) -> Option<Money> {
    let cell = cell.trim();
    if cell.is_empty() || cell == "NaN" {
        return None;
    }
    Decimal::from_str(cell).ok().map(Money::from_decimal)
}
