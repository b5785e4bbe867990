//! The import page and the endpoint that receives uploaded spreadsheets.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Multipart, State, multipart::Field},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_TEXT_INPUT_STYLE, base, format_count, loading_spinner},
    import::{
        ImportSummary, RoleCorrections, import_table,
        spreadsheet::{SourceFormat, read_spreadsheet_bytes},
    },
    navigation::NavBar,
};

/// The file types offered by the file picker.
const ACCEPTED_FILE_TYPES: &str = ".xlsx,.xls,.ods,.csv";

/// The state needed for importing employees.
#[derive(Debug, Clone)]
pub struct ImportState {
    /// The database connection for storing employees.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Spelling fixes applied to the role column.
    pub role_corrections: Arc<RoleCorrections>,
}

impl FromRef<AppState> for ImportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            role_corrections: state.role_corrections.clone(),
        }
    }
}

fn import_form_view() -> Markup {
    let import_route = endpoints::IMPORT;
    let spinner = loading_spinner();

    html! {
        form
            hx-post=(import_route)
            enctype="multipart/form-data"
            hx-disabled-elt="#file, #submit-button"
            hx-indicator="#indicator"
            hx-target="#alert-container"
            hx-target-error="#alert-container"
            hx-swap="innerHTML"
            class="space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="file"
                    class="block mb-2 text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Choose a spreadsheet to upload"
                }

                input
                    id="file"
                    type="file"
                    name="file"
                    accept=(ACCEPTED_FILE_TYPES)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                p class="mt-2 text-sm text-gray-600 dark:text-gray-400"
                {
                    "Upload an Excel workbook or CSV file with the columns Name, Role, \
                    Location, Years of Experience, Active?, Current Comp (INR) and \
                    Last Working Day. Rows are added to the existing employees."
                }
            }

            button
                type="submit"
                id="submit-button"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (spinner) }
                " Upload File"
            }
        }
    }
}

fn import_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::IMPORT_VIEW).into_html();
    let form = import_form_view();

    let content = html! {
        (nav_bar)

        div
            class="flex flex-col items-center px-6 py-8 mx-auto lg:py-0
            text-gray-900 dark:text-white"
        {
            div class="relative max-w-md"
            {
                (form)
            }
        }
    };

    base("Import Employees", &[], &content)
}

/// Route handler for the import page.
pub async fn get_import_page() -> Response {
    import_view().into_response()
}

/// Route handler for importing employees from an uploaded spreadsheet.
///
/// Responds with an alert fragment that reports how many rows were inserted
/// and how many were rejected.
pub async fn upload_spreadsheet(
    State(state): State<ImportState>,
    mut multipart: Multipart,
) -> Result<Response, Response> {
    let start_time = std::time::Instant::now();

    let field = multipart
        .next_field()
        .await
        .map_err(|error| Error::MultipartError(error.to_string()).into_alert_response())?
        .ok_or_else(|| Error::MissingUpload.into_alert_response())?;

    let (file_name, bytes) = read_multipart_field(field)
        .await
        .map_err(Error::into_alert_response)?;

    let format = SourceFormat::from_file_name(&file_name).map_err(Error::into_alert_response)?;

    let table = read_spreadsheet_bytes(bytes, format, None)
        .inspect_err(|error| tracing::debug!("Failed to read spreadsheet {file_name}: {error}"))
        .map_err(Error::into_alert_response)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError.into_alert_response()
    })?;

    let summary = import_table(&table, &state.role_corrections, &connection)
        .map_err(Error::into_alert_response)?;

    let duration = start_time.elapsed();
    tracing::info!(
        "Imported {file_name} in {}ms: {} inserted, {} failed",
        duration.as_millis(),
        summary.inserted,
        summary.failed
    );

    Ok((StatusCode::CREATED, summary_alert(&summary)).into_response())
}

async fn read_multipart_field(field: Field<'_>) -> Result<(String, Vec<u8>), Error> {
    let file_name = match field.file_name() {
        Some(file_name) if !file_name.is_empty() => file_name.to_owned(),
        _ => return Err(Error::MissingUpload),
    };

    let data = field.bytes().await.map_err(|error| {
        tracing::error!("Could not read data from multipart form field: {error}");
        Error::MultipartError("Could not read data from multipart form field.".to_owned())
    })?;

    tracing::debug!("Received file '{}' that is {} bytes", file_name, data.len());

    Ok((file_name, data.to_vec()))
}

fn summary_alert(summary: &ImportSummary) -> Alert {
    let inserted = format_count(summary.inserted);
    let failed = format_count(summary.failed);

    match (summary.inserted, summary.failed) {
        (0, 0) => Alert::Error {
            message: "Nothing to import".to_owned(),
            details: "The spreadsheet has a header row but no employees.".to_owned(),
        },
        (_, 0) => Alert::Success {
            message: "Import completed successfully!".to_owned(),
            details: format!("Imported {inserted} employees."),
        },
        (0, _) => Alert::Error {
            message: "Import failed".to_owned(),
            details: format!("All {failed} rows were rejected. Check the server logs for details."),
        },
        (_, _) => Alert::Success {
            message: "Import completed with errors".to_owned(),
            details: format!(
                "Imported {inserted} employees, {failed} rows were rejected. \
                Check the server logs for details."
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{FromRequest, Multipart, State},
        http::{Request, StatusCode},
        response::Response,
    };
    use rusqlite::Connection;
    use scraper::ElementRef;

    use crate::{
        db::initialize,
        employee::get_all_employees,
        endpoints,
        import::RoleCorrections,
        test_utils::{
            assert_content_type, assert_form_input, assert_form_submit_button, assert_hx_endpoint,
            assert_valid_html, must_get_form, parse_html_document, parse_html_fragment,
        },
    };

    use super::{ImportState, get_import_page, upload_spreadsheet};

    const EMPLOYEES_CSV: &str = "\
        Name,Role,Location,Years of Experience,Active?,Current Comp (INR),Last Working Day\n\
        Asha,Senir Associate,Pune,2-5,Y,\"1,200,000\",\n\
        ,Engineer,Pune,1,Y,\"900,000\",\n\
        Chen,Engineer,Delhi,0-1,No,\"800,000\",2024-03-31\n";

    fn get_test_state() -> ImportState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        ImportState {
            db_connection: Arc::new(Mutex::new(connection)),
            role_corrections: Arc::new(RoleCorrections::default()),
        }
    }

    #[tokio::test]
    async fn render_page() {
        let response = get_import_page().await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::IMPORT, "hx-post");
        assert_form_enctype(&form, "multipart/form-data");
        assert_form_input(&form, "file", "file");
        assert_form_submit_button(&form);
    }

    #[track_caller]
    fn assert_form_enctype(form: &ElementRef, enctype: &str) {
        let form_enctype = form
            .value()
            .attr("enctype")
            .expect("enctype attribute missing");

        assert_eq!(
            form_enctype, enctype,
            "want form with attribute enctype=\"{enctype}\", got {form_enctype:?}"
        );
    }

    #[tokio::test]
    async fn imports_csv_and_reports_counts() {
        let state = get_test_state();

        let response = upload_spreadsheet(
            State(state.clone()),
            must_make_multipart("employees.csv", EMPLOYEES_CSV).await,
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);

        let employees = get_all_employees(&state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(employees.len(), 2);
        assert_eq!(employees[0].role.as_deref(), Some("Senior Associate"));

        assert_alert(
            response,
            "Import completed with errors",
            "Imported 2 employees, 1 rows were rejected.",
        )
        .await;
    }

    #[tokio::test]
    async fn unsupported_file_type_renders_error_message() {
        let state = get_test_state();

        let response = upload_spreadsheet(
            State(state.clone()),
            must_make_multipart("employees.txt", EMPLOYEES_CSV).await,
        )
        .await
        .unwrap_err();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(
            get_all_employees(&state.db_connection.lock().unwrap())
                .unwrap()
                .is_empty()
        );
        assert_alert(response, "Unsupported file type", "").await;
    }

    #[tokio::test]
    async fn missing_column_renders_error_message() {
        let state = get_test_state();

        let response = upload_spreadsheet(
            State(state.clone()),
            must_make_multipart("employees.csv", "Name,Role\nAsha,Engineer\n").await,
        )
        .await
        .unwrap_err();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(
            get_all_employees(&state.db_connection.lock().unwrap())
                .unwrap()
                .is_empty()
        );
        assert_alert(response, "Missing column", "\"Location\"").await;
    }

    #[tokio::test]
    async fn sql_error_reports_failed_rows() {
        // No tables, so every insert fails.
        let state = ImportState {
            db_connection: Arc::new(Mutex::new(Connection::open_in_memory().unwrap())),
            role_corrections: Arc::new(RoleCorrections::default()),
        };

        let response = upload_spreadsheet(
            State(state),
            must_make_multipart("employees.csv", EMPLOYEES_CSV).await,
        )
        .await
        .unwrap();

        assert_alert(response, "Import failed", "All 3 rows were rejected.").await;
    }

    async fn assert_alert(response: Response, want_message: &str, want_details: &str) {
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);

        let alert = html
            .select(&scraper::Selector::parse("[role=alert]").unwrap())
            .next()
            .expect("No alert found");

        let message = alert
            .select(&scraper::Selector::parse("span.font-semibold").unwrap())
            .next()
            .expect("No alert message found")
            .text()
            .collect::<String>();
        assert_eq!(message.trim(), want_message);

        let details = alert
            .select(&scraper::Selector::parse("p").unwrap())
            .next()
            .map(|details| details.text().collect::<String>())
            .unwrap_or_default();
        assert!(
            details.contains(want_details),
            "want details containing {want_details:?}, got {details:?}"
        );
    }

    async fn must_make_multipart(file_name: &str, contents: &str) -> Multipart {
        let boundary = "MY_BOUNDARY123456789";
        let disposition =
            format!("Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"");

        let boundary_start = format!("--{boundary}");
        let boundary_end = format!("--{boundary}--");

        let data = [
            boundary_start.as_str(),
            disposition.as_str(),
            "Content-Type: application/octet-stream",
            "",
            contents,
            boundary_end.as_str(),
        ]
        .join("\r\n")
        .into_bytes();

        let request = Request::builder()
            .method("POST")
            .uri(endpoints::IMPORT)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(data.into())
            .unwrap();

        Multipart::from_request(request, &{}).await.unwrap()
    }
}
