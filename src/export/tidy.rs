//! Tidy relational export
//!
//! Flattens the matrix projection into one record per grid position, plus a
//! JSON array-of-rows form for the non-tidy case.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{MatrixFill, Table};

/// One grid position in tidy form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidyCell {
    /// Grid row
    pub row: usize,
    /// Grid column
    pub col: usize,
    /// Projected value at the position
    pub value: String,
}

/// Flatten a table into `{row, col, value}` records.
pub fn table_to_tidy(table: &Table, fill: &MatrixFill) -> Vec<TidyCell> {
    let matrix = table.as_matrix(fill);
    let mut records = Vec::with_capacity(table.n_rows * table.n_cols);
    for (row, values) in matrix.into_iter().enumerate() {
        for (col, value) in values.into_iter().enumerate() {
            records.push(TidyCell { row, col, value });
        }
    }
    records
}

/// Serialize the matrix projection as a JSON array of row arrays.
pub fn table_to_records(table: &Table, fill: &MatrixFill) -> Result<String> {
    Ok(serde_json::to_string_pretty(&table.as_matrix(fill))?)
}
