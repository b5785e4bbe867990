//! The dashboard's filter controls as they arrive in the query string, and
//! the selections they resolve to once the available options are known.

use serde::{Deserialize, Serialize};

/// The dimension used to split the experience chart into grouped bars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Breakdown {
    /// One bar per experience bucket.
    #[default]
    None,
    /// One bar per location within each bucket.
    Location,
    /// One bar per role within each bucket.
    Role,
}

impl Breakdown {
    pub const ALL: [Breakdown; 3] = [Breakdown::None, Breakdown::Location, Breakdown::Role];

    pub fn label(self) -> &'static str {
        match self {
            Breakdown::None => "None",
            Breakdown::Location => "Location",
            Breakdown::Role => "Role",
        }
    }

    /// The value used for the breakdown radio buttons and in query strings.
    pub fn as_query_value(self) -> &'static str {
        match self {
            Breakdown::None => "none",
            Breakdown::Location => "location",
            Breakdown::Role => "role",
        }
    }
}

/// The value of the role select that means "do not filter by role".
pub const ALL_ROLES: &str = "All";

/// The raw filter values submitted by the dashboard form.
///
/// Every field is optional so that a bare `/dashboard` shows the defaults.
/// Fields that can repeat, like the export multi-selects, are parsed with
/// `axum_extra::extract::Query`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardQuery {
    /// The "Include Inactive Employees" checkbox.
    ///
    /// The form sends a hidden "false" followed by "true" when the box is
    /// ticked, so the last value wins. Missing means ticked.
    #[serde(default)]
    pub include_inactive: Vec<bool>,

    /// The selected role, or [ALL_ROLES].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// The location for the headline metric.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Whether the user has edited the export selects.
    ///
    /// Until then every record in the working set is exported.
    #[serde(default)]
    pub export_filtered: bool,

    /// The roles to export.
    #[serde(default)]
    pub export_roles: Vec<String>,

    /// The locations to export.
    #[serde(default)]
    pub export_locations: Vec<String>,

    /// How to break down the experience chart.
    #[serde(default)]
    pub breakdown: Breakdown,
}

impl DashboardQuery {
    /// Whether inactive employees should be loaded.
    pub fn include_inactive(&self) -> bool {
        self.include_inactive.last().copied().unwrap_or(true)
    }
}

/// The role filter after checking the requested role against the options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleFilter {
    /// Keep every employee.
    All,
    /// Keep employees with exactly this role.
    Only(String),
}

impl RoleFilter {
    /// Pick the requested role if it is one of `options`, otherwise fall back
    /// to [RoleFilter::All].
    pub fn resolve(requested: Option<&str>, options: &[String]) -> Self {
        match requested {
            Some(role) if role != ALL_ROLES && options.iter().any(|option| option == role) => {
                RoleFilter::Only(role.to_owned())
            }
            _ => RoleFilter::All,
        }
    }

    /// The value of the role select, e.g. "All" or "Engineer".
    pub fn as_str(&self) -> &str {
        match self {
            RoleFilter::All => ALL_ROLES,
            RoleFilter::Only(role) => role,
        }
    }
}

/// Which records of the working set go into the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportFilter {
    /// The user has not touched the export selects: export everything,
    /// including records with no role or location.
    Everything,
    /// Export records whose role and location are both selected.
    Only {
        roles: Vec<String>,
        locations: Vec<String>,
    },
}

impl ExportFilter {
    /// Keep only the requested roles and locations that are still options.
    pub fn resolve(
        query: &DashboardQuery,
        role_options: &[String],
        location_options: &[String],
    ) -> Self {
        if !query.export_filtered {
            return ExportFilter::Everything;
        }

        let keep_options = |requested: &[String], options: &[String]| -> Vec<String> {
            options
                .iter()
                .filter(|option| requested.contains(*option))
                .cloned()
                .collect()
        };

        ExportFilter::Only {
            roles: keep_options(&query.export_roles, role_options),
            locations: keep_options(&query.export_locations, location_options),
        }
    }

    pub fn is_role_selected(&self, role: &str) -> bool {
        match self {
            ExportFilter::Everything => true,
            ExportFilter::Only { roles, .. } => roles.iter().any(|selected| selected == role),
        }
    }

    pub fn is_location_selected(&self, location: &str) -> bool {
        match self {
            ExportFilter::Everything => true,
            ExportFilter::Only { locations, .. } => {
                locations.iter().any(|selected| selected == location)
            }
        }
    }
}

/// Every filter value after checking it against the options the data offers.
#[derive(Debug, Clone, PartialEq)]
pub struct Selections {
    pub include_inactive: bool,
    pub role: RoleFilter,
    /// `None` only when the working set has no locations at all.
    pub location: Option<String>,
    pub export: ExportFilter,
    pub breakdown: Breakdown,
}

impl Selections {
    /// The query string that reproduces these selections, e.g. for the
    /// export download link.
    pub fn to_query_string(&self) -> String {
        let (export_filtered, export_roles, export_locations) = match &self.export {
            ExportFilter::Everything => (false, Vec::new(), Vec::new()),
            ExportFilter::Only { roles, locations } => (true, roles.clone(), locations.clone()),
        };

        let query = DashboardQuery {
            include_inactive: vec![self.include_inactive],
            role: Some(self.role.as_str().to_owned()),
            location: self.location.clone(),
            export_filtered,
            export_roles,
            export_locations,
            breakdown: self.breakdown,
        };

        serde_html_form::to_string(&query).unwrap_or_else(|error| {
            tracing::error!("could not serialize dashboard query {query:?}: {error}");
            String::new()
        })
    }
}
