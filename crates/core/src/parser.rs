//! CSV parsing for user imports.
//!
//! A parse pass never fails as a whole. Problems with a single row become a
//! [`RowError`] for that row and the remaining rows are still imported;
//! problems with the file itself become one synthetic error at row 0.

use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

use crate::limits::{FILE_LEVEL_ROW, FIRST_DATA_ROW, REQUIRED_COLUMNS, REQUIRED_COLUMN_NAMES};
use crate::user::UserRecord;

/// A per-row validation or parsing failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    /// 1-based row position; the header is row 1, so data starts at 2.
    /// Row 0 means the file itself could not be read.
    pub row_number: usize,
    pub message: String,
}

impl RowError {
    pub fn new(row_number: usize, message: impl Into<String>) -> Self {
        Self {
            row_number,
            message: message.into(),
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.row_number, self.message)
    }
}

/// Outcome of parsing one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseResult {
    /// Valid records in original row order.
    pub records: Vec<UserRecord>,
    /// Row errors in original row order.
    pub errors: Vec<RowError>,
}

impl ParseResult {
    /// Zero records and a single row-0 error.
    pub fn file_error(message: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            errors: vec![RowError::new(FILE_LEVEL_ROW, message)],
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Turns a stored upload into records.
///
/// Implementations must be pure apart from reading the file: the same bytes
/// always produce the same result.
pub trait RowParser: Send + Sync {
    fn parse(&self, path: &Path) -> ParseResult;
}

/// Comma-delimited parser for the `id, firstName, lastName, email` layout.
///
/// Quoted fields may contain commas or line breaks; row numbers count
/// logical CSV records, not physical lines. A blank line is a record of one
/// empty field and is reported as having too few columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvParser;

impl CsvParser {
    pub fn new() -> Self {
        Self
    }

    /// Reads every record of the file up front.
    ///
    /// Blank lines come back as single empty-field records so they keep
    /// their place in the row numbering. Record-level decode errors are kept
    /// in place so that they can be reported against their row; an I/O error
    /// aborts the whole read.
    fn read_rows(path: &Path) -> Result<Vec<Result<StringRecord, csv::Error>>, String> {
        let data = fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => format!("File not found: {}", path.display()),
            _ => format!("Failed to read CSV file: {}", e),
        })?;

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(data.as_slice());

        let mut rows = Vec::new();
        let mut record = StringRecord::new();
        let mut consumed = 0;
        loop {
            // The reader skips blank lines silently, so count them from the
            // bytes between the previous record and this one.
            let blanks = blank_lines_at(&data, consumed);
            let read = reader.read_record(&mut record);
            consumed = reader.position().byte() as usize;

            match read {
                Ok(more) => {
                    rows.extend((0..blanks).map(|_| Ok(StringRecord::from(vec![""]))));
                    if !more {
                        break;
                    }
                    rows.push(Ok(record.clone()));
                }
                Err(e) if e.is_io_error() => {
                    return Err(format!("Failed to read CSV file: {}", e));
                }
                Err(e) => {
                    rows.extend((0..blanks).map(|_| Ok(StringRecord::from(vec![""]))));
                    rows.push(Err(e));
                }
            }
        }

        Ok(rows)
    }

    fn parse_row(record: &StringRecord, row_number: usize) -> Result<UserRecord, RowError> {
        if record.len() < REQUIRED_COLUMNS {
            return Err(RowError::new(
                row_number,
                format!(
                    "Row has insufficient columns. Expected {} ({})",
                    REQUIRED_COLUMNS,
                    REQUIRED_COLUMN_NAMES.join(", ")
                ),
            ));
        }

        UserRecord::from_columns(&record[0], &record[1], &record[2], &record[3])
            .map_err(|rejection| RowError::new(row_number, rejection.message()))
    }
}

/// Number of empty lines starting at `offset`.
///
/// `\r`, `\n` and `\r\n` each end one line. A `\n` directly after a `\r`
/// at `offset` finishes the previous record's terminator and is not counted.
fn blank_lines_at(data: &[u8], offset: usize) -> usize {
    let mut i = offset;
    if i > 0 && data.get(i) == Some(&b'\n') && data[i - 1] == b'\r' {
        i += 1;
    }

    let mut count = 0;
    while let Some(&byte) = data.get(i) {
        match byte {
            b'\r' => {
                i += 1;
                if data.get(i) == Some(&b'\n') {
                    i += 1;
                }
            }
            b'\n' => i += 1,
            _ => break,
        }
        count += 1;
    }
    count
}

impl RowParser for CsvParser {
    fn parse(&self, path: &Path) -> ParseResult {
        debug!(path = %path.display(), "Reading CSV file");

        let rows = match Self::read_rows(path) {
            Ok(rows) => rows,
            Err(message) => {
                warn!(path = %path.display(), error = %message, "CSV file could not be read");
                return ParseResult::file_error(message);
            }
        };

        let mut result = ParseResult::default();

        // The first row is the header and is skipped without inspection
        for (index, row) in rows.iter().skip(1).enumerate() {
            let row_number = index + FIRST_DATA_ROW;

            let parsed = match row {
                Ok(record) => Self::parse_row(record, row_number),
                Err(e) => Err(RowError::new(row_number, format!("Error parsing row: {}", e))),
            };

            match parsed {
                Ok(user) => result.records.push(user),
                Err(error) => result.errors.push(error),
            }
        }

        result
    }
}
