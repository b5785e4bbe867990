//! Importing employees from spreadsheets.
//!
//! The import runs in three steps:
//! 1. [read_spreadsheet] reads a workbook or CSV file into a [SourceTable],
//! 2. the table's rows are normalized into [crate::NewEmployee]s,
//! 3. each employee is inserted on its own and the outcomes are summarized in
//!    an [ImportSummary].

mod load;
mod normalize;
mod role_corrections;
mod spreadsheet;
mod upload;

pub use load::{ImportSummary, InsertOutcome, import_table};
pub use role_corrections::RoleCorrections;
pub use spreadsheet::{SourceTable, read_spreadsheet};
pub use upload::{get_import_page, upload_spreadsheet};
