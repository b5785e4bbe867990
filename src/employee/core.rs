use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

pub type EmployeeId = i64;

/// Whether an employee still works at the company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Currently employed.
    Active,
    /// Left the company, or the spreadsheet did not say otherwise.
    Inactive,
}

impl Status {
    /// The text stored in the database and written to CSV exports.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Active => "Active",
            Status::Inactive => "Inactive",
        }
    }

    /// Read a status written by the importer or any other loader.
    ///
    /// Only "active" (in any case) counts as [Status::Active].
    pub fn from_stored(text: &str) -> Self {
        if text.trim().eq_ignore_ascii_case("active") {
            Status::Active
        } else {
            Status::Inactive
        }
    }
}

impl ToSql for Status {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Status {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().map(Status::from_stored)
    }
}

/// A normalized spreadsheet row that has not been inserted yet.
///
/// `name` is optional because spreadsheets may contain rows without a name.
/// Such rows are rejected by the database, not by the importer.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    /// The employee's name.
    pub name: Option<String>,
    /// The employee's job title, after spelling corrections.
    pub role: Option<String>,
    /// Where the employee works.
    pub location: Option<String>,
    /// Years of experience, non-negative.
    pub experience_years: Option<f64>,
    /// Current compensation in INR, non-negative.
    pub compensation: Option<f64>,
    /// Whether the employee is still employed.
    pub status: Status,
    /// The last day the employee worked, if they have left.
    pub last_working_day: Option<Date>,
}

/// An employee as shown on the dashboard and written to CSV exports.
///
/// The serde field names are the CSV export header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Employee {
    /// The employee's name.
    pub name: String,
    /// The employee's job title.
    pub role: Option<String>,
    /// Where the employee works.
    pub location: Option<String>,
    /// Years of experience.
    pub experience_years: Option<f64>,
    /// Current compensation in INR.
    pub compensation: Option<f64>,
    /// Whether the employee is still employed.
    pub status: Status,
}

#[cfg(test)]
mod tests {
    use super::Status;

    #[test]
    fn stored_status_is_case_insensitive() {
        assert_eq!(Status::from_stored("Active"), Status::Active);
        assert_eq!(Status::from_stored("active"), Status::Active);
        assert_eq!(Status::from_stored("ACTIVE "), Status::Active);
    }

    #[test]
    fn anything_else_is_inactive() {
        assert_eq!(Status::from_stored("Inactive"), Status::Inactive);
        assert_eq!(Status::from_stored("Y"), Status::Inactive);
        assert_eq!(Status::from_stored(""), Status::Inactive);
    }
}
