//! Table views for the employees behind the dashboard metrics.

use maud::{Markup, html};

use crate::{
    employee::Employee,
    html::{TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_inr},
};

const TABLE_STYLE: &str = "w-full text-sm text-left text-gray-500 dark:text-gray-400";
const TABLE_CONTAINER_STYLE: &str = "overflow-x-auto max-h-[480px] rounded-lg shadow";
const MISSING_VALUE: &str = "-";

/// The employees in the working set, one row each.
pub(super) fn employee_details_table(employees: &[Employee]) -> Markup {
    html! {
        div id="employee-details" class="w-full" {
            h3 class="text-xl font-semibold mb-4" { "Employee Details" }

            div class=(TABLE_CONTAINER_STYLE) {
                table class=(TABLE_STYLE) {
                    thead class=(TABLE_HEADER_STYLE) {
                        tr {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Role" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Location" }
                            th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Compensation" }
                        }
                    }
                    tbody {
                        @for employee in employees {
                            tr class=(TABLE_ROW_STYLE) {
                                td class=(TABLE_CELL_STYLE) { (employee.name) }
                                td class=(TABLE_CELL_STYLE) { (text_or_missing(employee.role.as_deref())) }
                                td class=(TABLE_CELL_STYLE) { (text_or_missing(employee.location.as_deref())) }
                                td class={(TABLE_CELL_STYLE) " text-right whitespace-nowrap"} {
                                    (compensation_or_missing(employee.compensation))
                                }
                            }
                        }

                        @if employees.is_empty() {
                            tr class=(TABLE_ROW_STYLE) {
                                td colspan="4" class={(TABLE_CELL_STYLE) " text-center"} {
                                    "No employees match the current filters."
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// The records that the CSV download will contain, with every exported column.
pub(super) fn export_table(employees: &[Employee]) -> Markup {
    html! {
        div id="export-preview" class="w-full" {
            h3 class="text-xl font-semibold mb-4" { "Filtered Data for Export" }

            div class=(TABLE_CONTAINER_STYLE) {
                table class=(TABLE_STYLE) {
                    thead class=(TABLE_HEADER_STYLE) {
                        tr {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Role" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Location" }
                            th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Experience (years)" }
                            th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Compensation" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                        }
                    }
                    tbody {
                        @for employee in employees {
                            tr class=(TABLE_ROW_STYLE) {
                                td class=(TABLE_CELL_STYLE) { (employee.name) }
                                td class=(TABLE_CELL_STYLE) { (text_or_missing(employee.role.as_deref())) }
                                td class=(TABLE_CELL_STYLE) { (text_or_missing(employee.location.as_deref())) }
                                td class={(TABLE_CELL_STYLE) " text-right"} {
                                    @match employee.experience_years {
                                        Some(years) => { (years) }
                                        None => { (MISSING_VALUE) }
                                    }
                                }
                                td class={(TABLE_CELL_STYLE) " text-right whitespace-nowrap"} {
                                    (compensation_or_missing(employee.compensation))
                                }
                                td class=(TABLE_CELL_STYLE) { (employee.status.as_str()) }
                            }
                        }

                        @if employees.is_empty() {
                            tr class=(TABLE_ROW_STYLE) {
                                td colspan="6" class={(TABLE_CELL_STYLE) " text-center"} {
                                    "Nothing to export."
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn text_or_missing(text: Option<&str>) -> &str {
    text.unwrap_or(MISSING_VALUE)
}

fn compensation_or_missing(compensation: Option<f64>) -> String {
    compensation
        .map(format_inr)
        .unwrap_or_else(|| MISSING_VALUE.to_owned())
}
