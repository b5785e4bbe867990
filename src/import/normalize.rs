//! Normalization of human-entered spreadsheet fields.
//!
//! Every function here fails softly: a value that cannot be understood
//! becomes `None` (or [Status::Inactive]) instead of an error, so that one
//! badly typed cell never stops an import.

use time::{Date, PrimitiveDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    employee::{NewEmployee, Status},
    import::{
        RoleCorrections,
        spreadsheet::{CellValue, SourceTable, excel_serial_to_date},
    },
};

/// The spreadsheet headers and the employee fields they map to.
///
/// Headers are compared after trimming. Columns that already use the
/// canonical field name are accepted too.
const COLUMN_ALIASES: [(&str, &str); 7] = [
    ("Name", "Name"),
    ("Role", "Role"),
    ("Location", "Location"),
    ("Years of Experience", "ExperienceYears"),
    ("Active?", "Status"),
    ("Current Comp (INR)", "Compensation"),
    ("Last Working Day", "LastWorkingDay"),
];

/// Status markers that mean the employee is still employed, upper case.
const ACTIVE_MARKERS: [&str; 3] = ["Y", "YES", "ACTIVE"];

const DATE_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month]-[day]"),
    format_description!("[year]/[month]/[day]"),
    format_description!("[month padding:none]/[day padding:none]/[year]"),
    format_description!("[day padding:none]-[month repr:short case_sensitive:false]-[year]"),
    format_description!("[day padding:none] [month repr:short case_sensitive:false] [year]"),
    format_description!("[day padding:none] [month repr:long case_sensitive:false] [year]"),
    format_description!("[month repr:long case_sensitive:false] [day padding:none], [year]"),
    format_description!("[month repr:short case_sensitive:false] [day padding:none], [year]"),
];

const DATE_TIME_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
];

static EMPTY_CELL: CellValue = CellValue::Empty;

/// Column positions of the employee fields within a [SourceTable].
struct ColumnIndices {
    name: usize,
    role: usize,
    location: usize,
    experience_years: usize,
    status: usize,
    compensation: usize,
    last_working_day: usize,
}

impl ColumnIndices {
    fn find(columns: &[String]) -> Result<Self, Error> {
        let find = |field: &str| -> Result<usize, Error> {
            columns
                .iter()
                .position(|column| canonical_field(column) == Some(field))
                .ok_or_else(|| {
                    let expected = COLUMN_ALIASES
                        .iter()
                        .find(|(_, canonical)| *canonical == field)
                        .map(|(header, _)| *header)
                        .unwrap_or(field);
                    Error::MissingColumn(expected.to_owned())
                })
        };

        Ok(Self {
            name: find("Name")?,
            role: find("Role")?,
            location: find("Location")?,
            experience_years: find("ExperienceYears")?,
            status: find("Status")?,
            compensation: find("Compensation")?,
            last_working_day: find("LastWorkingDay")?,
        })
    }
}

/// Map a trimmed spreadsheet header to the employee field it holds.
fn canonical_field(column: &str) -> Option<&'static str> {
    let column = column.trim();

    COLUMN_ALIASES
        .iter()
        .find(|(header, canonical)| column == *header || column == *canonical)
        .map(|(_, canonical)| *canonical)
}

/// An employee built from the spreadsheet row with the given row number.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub number: usize,
    pub employee: NewEmployee,
}

/// Normalize every row of `table` into an employee.
///
/// # Errors
/// Returns [Error::MissingColumn] if the header row lacks one of the employee
/// fields. Bad cell values never cause an error.
pub fn normalize_table(
    table: &SourceTable,
    corrections: &RoleCorrections,
) -> Result<Vec<NormalizedRow>, Error> {
    let indices = ColumnIndices::find(&table.columns)?;

    let rows = table
        .rows
        .iter()
        .map(|row| {
            let cell = |index: usize| row.cells.get(index).unwrap_or(&EMPTY_CELL);

            NormalizedRow {
                number: row.number,
                employee: NewEmployee {
                    name: normalize_text(cell(indices.name)),
                    role: normalize_text(cell(indices.role))
                        .map(|role| corrections.correct(role)),
                    location: normalize_text(cell(indices.location)),
                    experience_years: normalize_experience(cell(indices.experience_years)),
                    compensation: normalize_compensation(cell(indices.compensation)),
                    status: normalize_status(cell(indices.status)),
                    last_working_day: normalize_last_working_day(cell(indices.last_working_day)),
                },
            }
        })
        .collect();

    Ok(rows)
}

/// Text fields such as the name, role and location.
///
/// Numbers are written without a trailing ".0". Blank cells become `None`.
pub fn normalize_text(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Empty => None,
        CellValue::Text(text) => Some(text.clone()),
        CellValue::Number(number) => Some(number.to_string()),
        CellValue::Date(date) => Some(date.to_string()),
    }
}

/// Years of experience as a number.
///
/// A range such as "2-5" becomes its midpoint rounded to one decimal place.
/// Blank cells and anything that is not a finite, non-negative number become
/// `None`.
pub fn normalize_experience(cell: &CellValue) -> Option<f64> {
    let years = match cell {
        CellValue::Text(text) if text.contains('-') => {
            let (start, end) = text.split_once('-')?;

            if end.contains('-') {
                return None;
            }

            let start: f64 = start.trim().parse().ok()?;
            let end: f64 = end.trim().parse().ok()?;

            round_to_one_decimal((start + end) / 2.0)
        }
        CellValue::Text(text) => text.parse().ok()?,
        CellValue::Number(number) => *number,
        CellValue::Empty | CellValue::Date(_) => return None,
    };

    non_negative(years)
}

/// Compensation with thousands separators removed.
///
/// "1,200,000" becomes 1200000. Anything that does not parse as a finite,
/// non-negative number becomes `None`.
pub fn normalize_compensation(cell: &CellValue) -> Option<f64> {
    let amount = match cell {
        CellValue::Text(text) => text.replace(',', "").trim().parse().ok()?,
        CellValue::Number(number) => *number,
        CellValue::Empty | CellValue::Date(_) => return None,
    };

    non_negative(amount)
}

/// "Y", "Yes" and "Active" in any case mean [Status::Active]. Everything else,
/// including a blank cell, means [Status::Inactive].
pub fn normalize_status(cell: &CellValue) -> Status {
    match cell {
        CellValue::Text(text) if ACTIVE_MARKERS.contains(&text.trim().to_uppercase().as_str()) => {
            Status::Active
        }
        _ => Status::Inactive,
    }
}

/// The last working day as a date.
///
/// Numbers are read as Excel serial dates. Text is tried against a list of
/// common date formats. Blank cells and unparseable values become `None`.
pub fn normalize_last_working_day(cell: &CellValue) -> Option<Date> {
    match cell {
        CellValue::Empty => None,
        CellValue::Date(date) => Some(*date),
        CellValue::Number(serial) => excel_serial_to_date(*serial),
        CellValue::Text(text) => parse_date(text),
    }
}

fn parse_date(text: &str) -> Option<Date> {
    let text = text.trim();

    DATE_FORMATS
        .iter()
        .find_map(|format| Date::parse(text, *format).ok())
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|format| PrimitiveDateTime::parse(text, *format).ok())
                .map(|date_time| date_time.date())
        })
}

/// Round the exact binary value to one decimal place, with exact ties going to
/// even. 2.25 becomes 2.2, and 1.05 (stored as 1.0500000000000000444) becomes
/// 1.1.
fn round_to_one_decimal(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}

fn non_negative(value: f64) -> Option<f64> {
    (value.is_finite() && value >= 0.0).then_some(value)
}
