//! Reading workbooks and CSV files into a table of loosely-typed cells.

use std::{
    io::{Cursor, Read, Seek},
    path::Path,
};

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use time::{Date, Duration, macros::date};

use crate::Error;

/// Day zero of Excel's 1900 date system, adjusted for the fictional
/// 29 February 1900 so that serials after February 1900 land on the right day.
const EXCEL_EPOCH: Date = date!(1899 - 12 - 30);

/// The largest serial Excel can display, 9999-12-31.
const EXCEL_MAX_SERIAL: f64 = 2_958_465.0;

/// A single spreadsheet cell, as loosely typed as the human who filled it in.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// A blank cell, or an error value such as `#N/A`.
    Empty,
    /// Text, trimmed of surrounding whitespace and never empty.
    Text(String),
    /// A number or boolean (as 0 or 1).
    Number(f64),
    /// A cell formatted as a date.
    Date(Date),
}

impl CellValue {
    /// Build a cell from text, treating whitespace-only text as blank.
    pub fn from_text(text: &str) -> Self {
        let text = text.trim();

        if text.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(text.to_owned())
        }
    }
}

/// A row of cells together with its row number in the source file.
///
/// Row numbers start at 1 for the header row, so the first data row is 2.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    pub number: usize,
    pub cells: Vec<CellValue>,
}

/// A spreadsheet with a header row.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTable {
    /// The column names from the header row, trimmed of whitespace.
    pub columns: Vec<String>,
    /// The data rows. Rows where every cell is blank are skipped.
    pub rows: Vec<SourceRow>,
}

impl SourceTable {
    /// Build a table from a header row and data rows, trimming the column
    /// names and skipping blank rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let columns = columns
            .into_iter()
            .map(|column| column.trim().to_owned())
            .collect();

        let rows = rows
            .into_iter()
            .enumerate()
            .filter(|(_, cells)| cells.iter().any(|cell| *cell != CellValue::Empty))
            .map(|(index, cells)| SourceRow {
                number: index + 2,
                cells,
            })
            .collect();

        Self { columns, rows }
    }
}

/// The file formats the importer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Excel or OpenDocument workbooks.
    Workbook,
    /// Comma separated values with a header row.
    Csv,
}

impl SourceFormat {
    /// Pick the format from a file name's extension.
    ///
    /// # Errors
    /// Returns [Error::UnsupportedFileType] for any other extension.
    pub fn from_file_name(file_name: &str) -> Result<Self, Error> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|extension| extension.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SourceFormat::Workbook),
            "csv" => Ok(SourceFormat::Csv),
            _ => Err(Error::UnsupportedFileType(extension)),
        }
    }
}

/// Read a spreadsheet file from disk.
///
/// `sheet` selects a worksheet by name. The first worksheet is used when it is
/// `None`. CSV files ignore `sheet`.
///
/// # Errors
/// Returns an error if the file cannot be read, has an unsupported extension,
/// or has no header row.
pub fn read_spreadsheet(path: &Path, sheet: Option<&str>) -> Result<SourceTable, Error> {
    let file_name = path.to_string_lossy();
    let format = SourceFormat::from_file_name(&file_name)?;
    let bytes = std::fs::read(path)
        .map_err(|error| Error::SpreadsheetError(format!("{file_name}: {error}")))?;

    read_spreadsheet_bytes(bytes, format, sheet)
}

/// Read a spreadsheet that is already in memory, e.g. an uploaded file.
///
/// # Errors
/// Returns an error if the bytes are not a valid spreadsheet of the given
/// format, or if there is no header row.
pub fn read_spreadsheet_bytes(
    bytes: Vec<u8>,
    format: SourceFormat,
    sheet: Option<&str>,
) -> Result<SourceTable, Error> {
    match format {
        SourceFormat::Workbook => read_workbook(Cursor::new(bytes), sheet),
        SourceFormat::Csv => read_csv(bytes.as_slice()),
    }
}

fn read_workbook<RS>(data: RS, sheet: Option<&str>) -> Result<SourceTable, Error>
where
    RS: Read + Seek + Clone,
{
    let mut workbook = open_workbook_auto_from_rs(data)
        .map_err(|error| Error::SpreadsheetError(error.to_string()))?;

    let sheet_name = match sheet {
        Some(name) => name.to_owned(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(Error::EmptySpreadsheet)?,
    };

    if !workbook.sheet_names().contains(&sheet_name) {
        return Err(Error::MissingWorksheet(sheet_name));
    }

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|error| Error::SpreadsheetError(error.to_string()))?;

    let mut rows = range.rows();
    let header = rows.next().ok_or(Error::EmptySpreadsheet)?;
    let columns = header.iter().map(|cell| cell.to_string()).collect();
    let rows = rows
        .map(|row| row.iter().map(convert_workbook_cell).collect())
        .collect();

    Ok(SourceTable::new(columns, rows))
}

fn convert_workbook_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(text) => CellValue::from_text(text),
        Data::Float(number) => CellValue::Number(*number),
        Data::Int(number) => CellValue::Number(*number as f64),
        Data::Bool(value) => CellValue::Number(if *value { 1.0 } else { 0.0 }),
        Data::DateTime(date_time) => match excel_serial_to_date(date_time.as_f64()) {
            Some(date) => CellValue::Date(date),
            None => CellValue::Number(date_time.as_f64()),
        },
        Data::DateTimeIso(text) | Data::DurationIso(text) => CellValue::from_text(text),
    }
}

/// Convert an Excel serial day number to a date, ignoring the time of day.
///
/// Returns `None` for serials outside the range Excel can display.
pub(super) fn excel_serial_to_date(serial: f64) -> Option<Date> {
    if !serial.is_finite() || !(1.0..=EXCEL_MAX_SERIAL).contains(&serial) {
        return None;
    }

    EXCEL_EPOCH.checked_add(Duration::days(serial.floor() as i64))
}

fn read_csv<R: Read>(reader: R) -> Result<SourceTable, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = reader
        .headers()
        .map_err(|error| Error::SpreadsheetError(error.to_string()))?
        .iter()
        .map(str::to_owned)
        .collect();

    if columns.iter().all(|column| column.trim().is_empty()) {
        return Err(Error::EmptySpreadsheet);
    }

    let rows = reader
        .records()
        .map(|record| {
            record
                .map(|record| record.iter().map(CellValue::from_text).collect())
                .map_err(|error| Error::SpreadsheetError(error.to_string()))
        })
        .collect::<Result<Vec<Vec<CellValue>>, Error>>()?;

    Ok(SourceTable::new(columns, rows))
}
