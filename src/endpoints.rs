//! The API endpoints URIs.

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The compensation dashboard.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for uploading a spreadsheet of employees.
pub const IMPORT_VIEW: &str = "/import";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to upload a spreadsheet for importing employees.
pub const IMPORT: &str = "/api/import";
/// The route to download the export set as CSV.
pub const EXPORT_CSV: &str = "/api/export.csv";
