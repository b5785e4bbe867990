//! CSV download of the employees selected for export.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;

use crate::{
    Error,
    dashboard::{filters::DashboardQuery, handlers::DashboardState, pipeline::run_pipeline},
    employee::{Employee, get_all_employees},
};

/// The name offered to the browser for the downloaded file.
pub const EXPORT_FILE_NAME: &str = "filtered_employees.csv";

/// The header row of the export, in column order.
const EXPORT_HEADER: [&str; 6] = [
    "Name",
    "Role",
    "Location",
    "ExperienceYears",
    "Compensation",
    "Status",
];

/// Route handler for downloading the export set as CSV.
///
/// Takes the same query string as the dashboard page and reruns the filter
/// pipeline, so the download matches the export table the user is looking at.
pub async fn export_csv(
    State(state): State<DashboardState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    let employees = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_all_employees(&connection)
            .inspect_err(|error| tracing::error!("could not get employees: {error}"))?
    };

    let data = run_pipeline(employees, &query);
    let csv = write_csv(&data.export_set)?;

    tracing::debug!("Exporting {} employees as CSV", data.export_set.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        csv,
    )
        .into_response())
}

/// Write `employees` as comma separated values with a header row.
///
/// Missing values are written as empty fields. The header is written even if
/// there are no employees.
pub(super) fn write_csv(employees: &[Employee]) -> Result<String, Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(EXPORT_HEADER).map_err(into_export_error)?;

    for employee in employees {
        writer.serialize(employee).map_err(into_export_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::CsvExportError(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::CsvExportError(error.to_string()))
}

fn into_export_error(error: csv::Error) -> Error {
    tracing::error!("could not write CSV record: {error}");
    Error::CsvExportError(error.to_string())
}
