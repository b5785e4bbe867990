//! Application router configuration.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    dashboard::{export_csv, get_dashboard_page},
    endpoints,
    import::{get_import_page, upload_spreadsheet},
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
};

/// The largest spreadsheet that can be uploaded, in bytes.
const UPLOAD_LIMIT_BYTES: usize = 32 * 1024 * 1024;

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::IMPORT_VIEW, get(get_import_page))
        .route(
            endpoints::IMPORT,
            post(upload_spreadsheet).layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES)),
        )
        .route(endpoints::EXPORT_CSV, get(export_csv))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        )
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}


#[cfg(test)]
mod router_tests {
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, endpoints, import::RoleCorrections};

    use super::build_router;

    fn get_test_server() -> TestServer {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            RoleCorrections::default(),
        )
        .unwrap();

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn serves_pages() {
        let server = get_test_server();

        for endpoint in [
            endpoints::DASHBOARD_VIEW,
            endpoints::IMPORT_VIEW,
            endpoints::EXPORT_CSV,
        ] {
            server.get(endpoint).await.assert_status_ok();
        }
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        server
            .get("/does-not-exist")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn invalid_breakdown_is_bad_request() {
        let server = get_test_server();

        server
            .get(&format!("{}?breakdown=salary", endpoints::DASHBOARD_VIEW))
            .await
            .assert_status_bad_request();
    }
}
