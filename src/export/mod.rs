//! Table exporters
//!
//! Straight-line formatters over the extracted tables: HTML with
//! `rowspan`/`colspan`, CSV and Markdown over the matrix projection, and
//! tidy relational records.

pub mod csv;
pub mod html;
pub mod markdown;
pub mod tidy;

pub use csv::table_to_csv;
pub use html::{table_to_html, tables_to_html};
pub use markdown::table_to_markdown;
pub use tidy::{TidyCell, table_to_records, table_to_tidy};
