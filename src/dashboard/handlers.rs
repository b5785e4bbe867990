//! Dashboard HTTP handlers and view rendering.
//!
//! The whole dashboard is one form. Changing any control sends the form to
//! [get_dashboard_page] with htmx, which reruns the filter pipeline and swaps
//! in the new `#dashboard-content`.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use axum_htmx::HxRequest;
use maud::{Markup, html};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::{
    AppState, Error,
    dashboard::{
        charts::{
            DashboardChart, chart_container, charts_script, experience_chart, experience_chart_id,
            location_compensation_chart,
        },
        export::EXPORT_FILE_NAME,
        filters::{ALL_ROLES, Breakdown, DashboardQuery, ExportFilter},
        pipeline::{DashboardData, run_pipeline},
        tables::{employee_details_table, export_table},
    },
    employee::get_all_employees,
    endpoints,
    html::{
        BUTTON_SECONDARY_STYLE, FORM_CHECKBOX_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        HeadElement, PAGE_CONTAINER_STYLE, base, format_count, format_inr, link,
    },
    navigation::NavBar,
};

const LOCATION_CHART_ID: &str = "location-compensation-chart";
const SECTION_STYLE: &str = "w-full mb-8 space-y-4";
const SECTION_HEADING_STYLE: &str = "text-2xl font-bold";
const DASHBOARD_CONTENT_STYLE: &str = "flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto \
    max-w-screen-xl text-gray-900 dark:text-white";

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading employees.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display the dashboard for the filters in the query string.
///
/// htmx requests get only the dashboard content, everything else gets the
/// full page.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    HxRequest(is_htmx_request): HxRequest,
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

    if employees.is_empty() {
        return Ok(if is_htmx_request {
            dashboard_no_data_content().into_response()
        } else {
            dashboard_no_data_view().into_response()
        });
    }

    let data = run_pipeline(employees, &query);

    Ok(if is_htmx_request {
        dashboard_content(&data).into_response()
    } else {
        dashboard_view(&data).into_response()
    })
}

fn build_dashboard_charts(data: &DashboardData) -> [DashboardChart; 2] {
    [
        DashboardChart {
            id: LOCATION_CHART_ID,
            options: location_compensation_chart(&data.location_means).to_string(),
        },
        DashboardChart {
            id: experience_chart_id(data.selections.breakdown),
            options: experience_chart(&data.experience).to_string(),
        },
    ]
}

fn dashboard_no_data_content() -> Markup {
    let import_link = link(endpoints::IMPORT_VIEW, "importing a spreadsheet");

    html!(
        div class=(PAGE_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Charts will show up here once there are some employees.
                You can add employees by " (import_link) "."
            }
        }
    )
}

/// Renders the dashboard page when there are no employees.
fn dashboard_no_data_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html!(
        (nav_bar)

        div id="dashboard-content" { (dashboard_no_data_content()) }
    );

    base("Dashboard", &[], &content)
}

/// Renders the full dashboard page.
fn dashboard_view(data: &DashboardData) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class=(DASHBOARD_CONTENT_STYLE)
        {
            (dashboard_content(data))
        }
    );

    let scripts = [HeadElement::ScriptLink(
        "/static/echarts.6.0.0.min.js".to_owned(),
    )];

    base("Dashboard", &scripts, &content)
}

/// Renders the controls and results that go inside `#dashboard-content`.
fn dashboard_content(data: &DashboardData) -> Markup {
    let charts = build_dashboard_charts(data);
    let [location_chart, experience_by_chart] = &charts;

    html!(
        form
            id="dashboard-form"
            hx-get=(endpoints::DASHBOARD_VIEW)
            hx-trigger="change"
            hx-target="#dashboard-content"
            hx-target-error="#alert-container"
            hx-swap="innerHTML"
            hx-push-url="true"
            class="w-full"
        {
            (filters_section(data))
            (headline_section(data))

            section class=(SECTION_STYLE)
            {
                (chart_container(location_chart))
                (employee_details_table(&data.working_set))
            }

            (export_section(data))
            (experience_section(data, experience_by_chart))
        }

        (charts_script(&charts))
    )
}

fn filters_section(data: &DashboardData) -> Markup {
    let selections = &data.selections;

    html!(
        section class=(SECTION_STYLE)
        {
            h2 class=(SECTION_HEADING_STYLE) { "Employee Compensation" }

            div class="flex flex-wrap items-end gap-6"
            {
                div class="flex items-center gap-2"
                {
                    // Unchecked boxes are not submitted, so the hidden input
                    // is what turns the filter off.
                    input type="hidden" name="include_inactive" value="false";
                    input
                        id="include_inactive"
                        type="checkbox"
                        name="include_inactive"
                        value="true"
                        checked[selections.include_inactive]
                        class=(FORM_CHECKBOX_STYLE);
                    label for="include_inactive" class="text-sm font-medium"
                    {
                        "Include Inactive Employees"
                    }
                }

                div class="min-w-64"
                {
                    label for="role" class=(FORM_LABEL_STYLE) { "Filter by Role" }
                    select id="role" name="role" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value=(ALL_ROLES) selected[selections.role.as_str() == ALL_ROLES]
                        {
                            (ALL_ROLES)
                        }

                        @for role in &data.role_options {
                            option value=(role) selected[selections.role.as_str() == role.as_str()]
                            {
                                (role)
                            }
                        }
                    }
                }
            }

            p class="text-sm text-gray-600 dark:text-gray-400"
            {
                "Showing " (format_count(data.working_set.len())) " employees."
            }
        }
    )
}

fn headline_section(data: &DashboardData) -> Markup {
    let selected_location = data.selections.location.as_deref();

    html!(
        section id="headline" class=(SECTION_STYLE)
        {
            @if data.location_options.is_empty() {
                p { "No employees in the current selection have a location." }
            } @else {
                div class="max-w-md"
                {
                    label for="location" class=(FORM_LABEL_STYLE) { "Select Location" }
                    select id="location" name="location" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for location in &data.location_options {
                            option
                                value=(location)
                                selected[selected_location == Some(location.as_str())]
                            {
                                (location)
                            }
                        }
                    }
                }
            }

            div class="p-4 rounded-lg bg-white dark:bg-gray-800 shadow"
            {
                p class="text-sm text-gray-600 dark:text-gray-400"
                {
                    "Average Compensation in " (selected_location.unwrap_or("-"))
                }

                p id="headline-metric" class="text-3xl font-bold"
                {
                    @match data.headline {
                        Some(mean) => { (format_inr(mean)) }
                        None => { "N/A" }
                    }
                }
            }
        }
    )
}

fn export_section(data: &DashboardData) -> Markup {
    let export = &data.selections.export;
    let export_filtered = match export {
        ExportFilter::Everything => "false",
        ExportFilter::Only { .. } => "true",
    };
    let download_url = format!(
        "{}?{}",
        endpoints::EXPORT_CSV,
        data.selections.to_query_string()
    );
    // The export selects start with everything selected. Once one of them
    // is changed the selection is sent as is, even if it is empty.
    let mark_export_filtered = "this.form.export_filtered.value = 'true'";

    html!(
        section id="export" class=(SECTION_STYLE)
        {
            h2 class=(SECTION_HEADING_STYLE) { "Export" }

            input
                type="hidden"
                name="export_filtered"
                value=(export_filtered);

            div class="grid grid-cols-1 md:grid-cols-2 gap-4"
            {
                div
                {
                    label for="export_roles" class=(FORM_LABEL_STYLE) { "Select Roles to Export" }
                    select
                        id="export_roles"
                        name="export_roles"
                        multiple
                        size="5"
                        onchange=(mark_export_filtered)
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for role in &data.export_role_options {
                            option value=(role) selected[export.is_role_selected(role)] { (role) }
                        }
                    }
                }

                div
                {
                    label for="export_locations" class=(FORM_LABEL_STYLE) { "Select Locations to Export" }
                    select
                        id="export_locations"
                        name="export_locations"
                        multiple
                        size="5"
                        onchange=(mark_export_filtered)
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for location in &data.location_options {
                            option
                                value=(location)
                                selected[export.is_location_selected(location)]
                            {
                                (location)
                            }
                        }
                    }
                }
            }

            a
                id="download-csv"
                href=(download_url)
                download=(EXPORT_FILE_NAME)
                class=(BUTTON_SECONDARY_STYLE)
            {
                "Download Filtered CSV"
            }

            (export_table(&data.export_set))
        }
    )
}

fn experience_section(data: &DashboardData, chart: &DashboardChart) -> Markup {
    html!(
        section id="experience" class=(SECTION_STYLE)
        {
            h2 class=(SECTION_HEADING_STYLE) { "Group Employees by Years of Experience" }

            fieldset class="flex flex-wrap items-center gap-4"
            {
                legend class=(FORM_LABEL_STYLE) { "Group breakdown by:" }

                @for breakdown in Breakdown::ALL {
                    @let id = format!("breakdown-{}", breakdown.as_query_value());

                    div class="flex items-center gap-2"
                    {
                        input
                            id=(id)
                            type="radio"
                            name="breakdown"
                            value=(breakdown.as_query_value())
                            checked[data.selections.breakdown == breakdown]
                            class=(FORM_CHECKBOX_STYLE);
                        label for=(id) class="text-sm font-medium" { (breakdown.label()) }
                    }
                }
            }

            (chart_container(chart))
        }
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::Query;
    use axum_htmx::HxRequest;
    use rusqlite::Connection;
    use scraper::{Html, Selector};

    use crate::{
        dashboard::filters::DashboardQuery,
        db::initialize,
        employee::{NewEmployee, Status, insert_employee},
        endpoints,
        test_utils::{
            assert_content_type, assert_hx_endpoint, assert_valid_html, must_get_form,
            parse_html_document, parse_html_fragment,
        },
    };

    use super::{DashboardState, get_dashboard_page};

    fn new_employee(
        name: &str,
        role: &str,
        location: &str,
        experience_years: f64,
        compensation: f64,
        status: Status,
    ) -> NewEmployee {
        NewEmployee {
            name: Some(name.to_owned()),
            role: Some(role.to_owned()),
            location: Some(location.to_owned()),
            experience_years: Some(experience_years),
            compensation: Some(compensation),
            status,
            last_working_day: None,
        }
    }

    fn get_test_state(employees: &[NewEmployee]) -> DashboardState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        for employee in employees {
            insert_employee(employee, &connection).unwrap();
        }

        DashboardState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn sample_state() -> DashboardState {
        get_test_state(&[
            new_employee("A", "Eng", "NY", 0.5, 100_000.0, Status::Active),
            new_employee("B", "Eng", "NY", 1.5, 200_000.0, Status::Active),
            new_employee("C", "Sales", "LA", 3.0, 150_000.0, Status::Inactive),
        ])
    }

    fn query(query_string: &str) -> Query<DashboardQuery> {
        Query(serde_html_form::from_str(query_string).unwrap())
    }

    #[track_caller]
    fn must_get_text(html: &Html, selector: &str) -> String {
        let selector = Selector::parse(selector).unwrap();
        html.select(&selector)
            .next()
            .unwrap_or_else(|| panic!("could not find {selector:?} in {}", html.html()))
            .text()
            .collect::<String>()
            .trim()
            .to_owned()
    }

    fn count_elements(html: &Html, selector: &str) -> usize {
        html.select(&Selector::parse(selector).unwrap()).count()
    }

    #[tokio::test]
    async fn dashboard_page_loads_successfully() {
        let response = get_dashboard_page(State(sample_state()), HxRequest(false), query(""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::DASHBOARD_VIEW, "hx-get");
        assert_eq!(count_elements(&html, "#location-compensation-chart"), 1);
        assert_eq!(count_elements(&html, "#experience-chart"), 1);
        assert_eq!(count_elements(&html, "#employee-details tbody tr"), 3);
        assert_eq!(count_elements(&html, "#export-preview tbody tr"), 3);
    }

    #[tokio::test]
    async fn active_employees_in_new_york() {
        let response = get_dashboard_page(
            State(sample_state()),
            HxRequest(false),
            query("include_inactive=false&role=All&location=NY"),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;

        assert_eq!(must_get_text(&html, "#headline-metric"), "INR 150,000.00");
        assert_eq!(count_elements(&html, "#employee-details tbody tr"), 2);
        assert_eq!(
            count_elements(&html, "input[name=include_inactive][type=checkbox][checked]"),
            0
        );
        assert_eq!(
            must_get_text(&html, "#location option[selected]"),
            "NY"
        );
    }

    #[tokio::test]
    async fn location_without_compensation_shows_placeholder() {
        let mut no_compensation = new_employee("A", "Eng", "NY", 2.0, 0.0, Status::Active);
        no_compensation.compensation = None;
        let state = get_test_state(&[no_compensation]);

        let response = get_dashboard_page(State(state), HxRequest(false), query(""))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_eq!(must_get_text(&html, "#headline-metric"), "N/A");
    }

    #[tokio::test]
    async fn displays_prompt_text_on_no_data() {
        let response = get_dashboard_page(State(get_test_state(&[])), HxRequest(false), query(""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(must_get_text(&html, "h2"), "Nothing here yet...");
        assert_eq!(
            count_elements(&html, &format!("a[href='{}']", endpoints::IMPORT_VIEW)),
            2
        );
        assert_eq!(count_elements(&html, "form"), 0);
    }

    #[tokio::test]
    async fn htmx_request_gets_content_only() {
        let response = get_dashboard_page(
            State(sample_state()),
            HxRequest(true),
            query("breakdown=role"),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_eq!(count_elements(&html, "nav"), 0);
        assert_eq!(count_elements(&html, "form#dashboard-form"), 1);
        assert_eq!(count_elements(&html, "#experience-by-role-chart"), 1);
        assert_eq!(
            count_elements(&html, "input[name=breakdown][value=role][checked]"),
            1
        );
    }

    #[tokio::test]
    async fn download_link_carries_selections() {
        let response = get_dashboard_page(
            State(sample_state()),
            HxRequest(true),
            query("role=Eng&export_filtered=true&export_roles=Eng&export_locations=NY"),
        )
        .await
        .unwrap();

        let html = parse_html_fragment(response).await;
        let link = html
            .select(&Selector::parse("a#download-csv").unwrap())
            .next()
            .expect("could not find download link");
        let href = link.value().attr("href").unwrap();

        assert!(href.starts_with(endpoints::EXPORT_CSV), "got {href}");
        assert!(href.contains("role=Eng"), "got {href}");
        assert!(href.contains("export_filtered=true"), "got {href}");
        assert!(href.contains("export_locations=NY"), "got {href}");
        assert_eq!(
            count_elements(&html, "#export_roles option[selected]"),
            1
        );
    }
}
