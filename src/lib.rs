//! Employee compensation reporting.
//!
//! This library provides two pipelines that share a SQLite database:
//!
//! - an importer that reads a spreadsheet of employees, normalizes the
//!   loosely-typed, human-entered fields and appends the rows to the database,
//! - a web dashboard that reads the employees back, applies the user's filters
//!   and renders aggregate metrics, charts and a CSV export.
//!
//! The dashboard is served as HTML pages directly from the REST API.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod dashboard;
mod db;
mod employee;
mod endpoints;
mod html;
mod import;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod routing;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use employee::{Employee, NewEmployee, Status, get_all_employees, insert_employee};
pub use import::{
    ImportSummary, InsertOutcome, RoleCorrections, SourceTable, import_table, read_spreadsheet,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;

use crate::{
    alert::Alert,
    internal_server_error::{InternalServerError, render_internal_server_error},
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The spreadsheet is missing one of the columns needed to build an
    /// employee record.
    ///
    /// The string is the name of the missing column as it is expected to
    /// appear in the header row.
    #[error("the spreadsheet has no \"{0}\" column")]
    MissingColumn(String),

    /// The spreadsheet has no header row.
    #[error("the spreadsheet is empty")]
    EmptySpreadsheet,

    /// The spreadsheet could not be opened or read.
    ///
    /// Callers should pass in the original error as a string.
    #[error("could not read the spreadsheet: {0}")]
    SpreadsheetError(String),

    /// The named worksheet does not exist in the workbook.
    #[error("the workbook has no worksheet named \"{0}\"")]
    MissingWorksheet(String),

    /// The file extension is not one of the supported spreadsheet formats.
    #[error("unsupported file type \"{0}\", expected .xlsx, .xls, .ods or .csv")]
    UnsupportedFileType(String),

    /// The multipart form could not be parsed.
    #[error("Could not parse multipart form: {0}")]
    MultipartError(String),

    /// The multipart form did not contain a file.
    #[error("no file was uploaded")]
    MissingUpload,

    /// The role corrections file could not be read or is not a JSON object
    /// of strings.
    #[error("invalid role corrections: {0}")]
    InvalidRoleCorrections(String),

    /// The export set could not be written as CSV.
    #[error("could not write CSV export: {0}")]
    CsvExportError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::DatabaseLockError => render_internal_server_error(Default::default()),
            Error::CsvExportError(_) => render_internal_server_error(InternalServerError {
                description: "Export Failed",
                fix: "The filtered employees could not be exported. Please try again.",
            }),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(Default::default())
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::MissingColumn(column) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Missing column".to_owned(),
                    details: format!(
                        "The spreadsheet needs a \"{column}\" column in its header row."
                    ),
                },
            )
                .into_response(),
            Error::EmptySpreadsheet => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: "The spreadsheet is empty.".to_owned(),
                },
            )
                .into_response(),
            Error::MissingUpload => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: "Choose a file to upload.".to_owned(),
                },
            )
                .into_response(),
            Error::UnsupportedFileType(_) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Unsupported file type".to_owned(),
                    details: "Upload an Excel workbook (.xlsx, .xls), an OpenDocument \
                        spreadsheet (.ods) or a CSV file."
                        .to_owned(),
                },
            )
                .into_response(),
            Error::SpreadsheetError(_) | Error::MissingWorksheet(_) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Could not read the spreadsheet".to_owned(),
                    details: "Check that the file is a valid spreadsheet and try again."
                        .to_owned(),
                },
            )
                .into_response(),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    },
                )
                    .into_response()
            }
        }
    }
}
