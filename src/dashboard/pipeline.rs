//! The dashboard's filter pipeline.
//!
//! Each stage takes the working set from the stage before and returns a new
//! one, so the whole pipeline can be rerun from scratch on every request:
//!
//! 1. load: drop inactive employees unless they are wanted,
//! 2. role: keep one role, or every role,
//! 3. location: pick the location for the headline metric,
//! 4. export: narrow the working set to the selected roles and locations,
//! 5. experience: count the working set per experience bucket.

use std::collections::BTreeSet;

use crate::{
    dashboard::{
        aggregation::{
            BucketCounts, ExperienceSeries, LocationMean, count_by_experience,
            count_by_experience_grouped, mean_compensation, mean_compensation_by_location,
        },
        filters::{Breakdown, DashboardQuery, ExportFilter, RoleFilter, Selections},
    },
    employee::{Employee, Status},
};

/// The experience chart data for the selected breakdown.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum ExperienceBreakdown {
    /// A single series, one count per bucket.
    Total(BucketCounts),
    /// One series per location or role.
    Grouped {
        dimension: Breakdown,
        series: Vec<ExperienceSeries>,
    },
}

/// Everything derived from the employees for one set of selections.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct DashboardData {
    pub selections: Selections,
    /// Roles offered by the role select, not including "All".
    pub role_options: Vec<String>,
    /// Locations in the working set, offered by the location select.
    pub location_options: Vec<String>,
    /// Employees left after the status and role filters.
    pub working_set: Vec<Employee>,
    /// Mean compensation at the selected location.
    pub headline: Option<f64>,
    pub location_means: Vec<LocationMean>,
    /// Roles in the working set, offered by the export role select.
    pub export_role_options: Vec<String>,
    pub export_set: Vec<Employee>,
    pub experience: ExperienceBreakdown,
}

/// Run every stage of the pipeline over `employees`.
///
/// Never fails: empty working sets and stale selections fall back to
/// defaults.
pub(super) fn run_pipeline(employees: Vec<Employee>, query: &DashboardQuery) -> DashboardData {
    let include_inactive = query.include_inactive();
    let loaded = load_stage(employees, include_inactive);

    let role_options = distinct_values(&loaded, |employee| employee.role.as_deref());
    let role = RoleFilter::resolve(query.role.as_deref(), &role_options);
    let working_set = role_stage(loaded, &role);

    let location_options = distinct_values(&working_set, |employee| employee.location.as_deref());
    let location = resolve_location(query.location.as_deref(), &location_options);
    let headline = location
        .as_deref()
        .and_then(|location| location_stage(&working_set, location));
    let location_means = mean_compensation_by_location(&working_set);

    let export_role_options = distinct_values(&working_set, |employee| employee.role.as_deref());
    let export = ExportFilter::resolve(query, &export_role_options, &location_options);
    let export_set = export_stage(&working_set, &export);

    let experience = experience_stage(&working_set, query.breakdown);

    DashboardData {
        selections: Selections {
            include_inactive,
            role,
            location,
            export,
            breakdown: query.breakdown,
        },
        role_options,
        location_options,
        working_set,
        headline,
        location_means,
        export_role_options,
        export_set,
        experience,
    }
}

/// Drop employees whose status is not active, unless `include_inactive`.
pub(super) fn load_stage(employees: Vec<Employee>, include_inactive: bool) -> Vec<Employee> {
    if include_inactive {
        return employees;
    }

    employees
        .into_iter()
        .filter(|employee| employee.status == Status::Active)
        .collect()
}

pub(super) fn role_stage(employees: Vec<Employee>, role: &RoleFilter) -> Vec<Employee> {
    match role {
        RoleFilter::All => employees,
        RoleFilter::Only(role) => employees
            .into_iter()
            .filter(|employee| employee.role.as_deref() == Some(role.as_str()))
            .collect(),
    }
}

/// The mean compensation of the employees at `location`.
///
/// `None` when there are no employees there or none of them has a known
/// compensation.
pub(super) fn location_stage(employees: &[Employee], location: &str) -> Option<f64> {
    mean_compensation(
        employees
            .iter()
            .filter(|employee| employee.location.as_deref() == Some(location)),
    )
}

pub(super) fn export_stage(employees: &[Employee], export: &ExportFilter) -> Vec<Employee> {
    match export {
        ExportFilter::Everything => employees.to_vec(),
        ExportFilter::Only { .. } => employees
            .iter()
            .filter(|employee| {
                employee
                    .role
                    .as_deref()
                    .is_some_and(|role| export.is_role_selected(role))
                    && employee
                        .location
                        .as_deref()
                        .is_some_and(|location| export.is_location_selected(location))
            })
            .cloned()
            .collect(),
    }
}

pub(super) fn experience_stage(employees: &[Employee], breakdown: Breakdown) -> ExperienceBreakdown {
    match breakdown {
        Breakdown::None => ExperienceBreakdown::Total(count_by_experience(employees)),
        Breakdown::Location => ExperienceBreakdown::Grouped {
            dimension: breakdown,
            series: count_by_experience_grouped(employees, |employee| {
                employee.location.as_deref()
            }),
        },
        Breakdown::Role => ExperienceBreakdown::Grouped {
            dimension: breakdown,
            series: count_by_experience_grouped(employees, |employee| employee.role.as_deref()),
        },
    }
}

/// The sorted distinct values of a text field, skipping missing values.
fn distinct_values(
    employees: &[Employee],
    field: impl Fn(&Employee) -> Option<&str>,
) -> Vec<String> {
    employees
        .iter()
        .filter_map(field)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// The requested location if it is an option, otherwise the first option.
fn resolve_location(requested: Option<&str>, options: &[String]) -> Option<String> {
    requested
        .and_then(|location| options.iter().find(|option| *option == location))
        .or_else(|| options.first())
        .cloned()
}
