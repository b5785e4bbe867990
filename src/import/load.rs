//! Inserting normalized employees one row at a time.

use rusqlite::Connection;

use crate::{
    Error,
    employee::{EmployeeId, insert_employee},
    import::{
        RoleCorrections,
        normalize::{NormalizedRow, normalize_table},
        spreadsheet::SourceTable,
    },
};

/// What happened when inserting a single spreadsheet row.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    /// The row was inserted with the given ID.
    Inserted(EmployeeId),
    /// The database rejected the row.
    Failed {
        /// The row number in the spreadsheet, counting the header as row 1.
        row: usize,
        /// Why the database rejected the row.
        reason: String,
    },
}

/// The number of rows inserted and rejected by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Rows that were inserted.
    pub inserted: usize,
    /// Rows the database rejected.
    pub failed: usize,
}

impl ImportSummary {
    /// Count the outcomes of an import.
    pub fn from_outcomes(outcomes: &[InsertOutcome]) -> Self {
        outcomes
            .iter()
            .fold(Self::default(), |summary, outcome| match outcome {
                InsertOutcome::Inserted(_) => Self {
                    inserted: summary.inserted + 1,
                    ..summary
                },
                InsertOutcome::Failed { .. } => Self {
                    failed: summary.failed + 1,
                    ..summary
                },
            })
    }
}

/// Normalize `table` and insert every row into the database.
///
/// Each row is inserted on its own: a rejected row is logged and counted, and
/// the import carries on with the next row. Rows that were inserted stay
/// inserted no matter what happens to later rows.
///
/// # Errors
/// Returns an error, before anything is inserted, if the table is missing one
/// of the employee columns.
pub fn import_table(
    table: &SourceTable,
    corrections: &RoleCorrections,
    connection: &Connection,
) -> Result<ImportSummary, Error> {
    let rows = normalize_table(table, corrections)?;
    let outcomes = insert_rows(&rows, connection);
    let summary = ImportSummary::from_outcomes(&outcomes);

    tracing::info!(
        "Import finished: {} rows inserted, {} rows failed",
        summary.inserted,
        summary.failed
    );

    Ok(summary)
}

fn insert_rows(rows: &[NormalizedRow], connection: &Connection) -> Vec<InsertOutcome> {
    rows.iter()
        .map(|row| {
            let employee = &row.employee;
            tracing::debug!(
                "Inserting row {}: {:?}, {:?}, {:?}, {:?}, {:?}, {}, {:?}",
                row.number,
                employee.name,
                employee.role,
                employee.location,
                employee.experience_years,
                employee.compensation,
                employee.status.as_str(),
                employee.last_working_day,
            );

            match insert_employee(employee, connection) {
                Ok(id) => InsertOutcome::Inserted(id),
                Err(error) => {
                    tracing::warn!("Could not insert row {}: {error}", row.number);
                    InsertOutcome::Failed {
                        row: row.number,
                        reason: error.to_string(),
                    }
                }
            }
        })
        .collect()
}
