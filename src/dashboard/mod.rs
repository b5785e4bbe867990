//! Dashboard module
//!
//! Provides the interactive compensation overview: filters, the headline
//! metric, charts, tables and the CSV export of the filtered employees.

mod aggregation;
mod charts;
mod export;
mod filters;
mod handlers;
mod pipeline;
mod tables;

pub use export::export_csv;
pub use handlers::get_dashboard_page;
