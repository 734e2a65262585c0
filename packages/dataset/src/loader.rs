//! Flat-file loaders.
//!
//! Both loaders read a comma-delimited file with a header row. They differ
//! in how column labels are normalized, whether a date column is parsed,
//! and what happens when the file is missing. See [`LoadOptions::FIR`] and
//! [`LoadOptions::GENERIC`].

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use crime_demo_dataset_models::{Cell, ColumnPolicy, IncidentTable, MissingFilePolicy};

use crate::DatasetError;

/// Cell values read as missing, in addition to the empty string.
pub const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Day-first date layouts, tried in order after the two-digit-year forms.
const DATE_FORMATS: &[&str] = &[
    "%d/%m/%y", "%d-%m-%y", "%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y",
];

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M",
];

/// Month-first layouts, only reached when no day-first reading is valid
/// (e.g. `12/25/2024`).
const MONTH_FIRST_FORMATS: &[&str] = &["%m/%d/%Y", "%m-%d-%Y"];

/// How a file is turned into an [`IncidentTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub column_policy: ColumnPolicy,
    pub missing_file: MissingFilePolicy,
    /// Raw header of the column parsed as day-first dates, if any. The
    /// column must exist when set.
    pub date_column: Option<&'static str>,
}

impl LoadOptions {
    /// FIR loader: trim-only labels, `date` parsed day-first, `time` kept as
    /// raw text, missing file is an empty table.
    pub const FIR: Self = Self {
        column_policy: ColumnPolicy::TrimOnly,
        missing_file: MissingFilePolicy::EmptyTable,
        date_column: Some("date"),
    };

    /// Generic processor: lower-case/underscore labels, no type coercion,
    /// missing file is an error.
    pub const GENERIC: Self = Self {
        column_policy: ColumnPolicy::LowerSnake,
        missing_file: MissingFilePolicy::Fail,
        date_column: None,
    };
}

/// Loads the FIR table behind the chain-snatching view.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file exists but cannot be read or
/// parsed, or has no `date` column.
pub fn load_fir_table(path: &Path) -> Result<IncidentTable, DatasetError> {
    load_table(path, &LoadOptions::FIR)
}

/// Loads a table for the generic breakdown reports.
///
/// # Errors
///
/// Returns [`DatasetError::NotFound`] if `path` does not exist, or another
/// [`DatasetError`] if it cannot be read or parsed.
pub fn process_csv(path: &Path) -> Result<IncidentTable, DatasetError> {
    load_table(path, &LoadOptions::GENERIC)
}

/// Loads `path` according to `options`.
///
/// # Errors
///
/// Returns [`DatasetError`] on a missing file (when the policy says so) or
/// on read and parse failures.
pub fn load_table(path: &Path, options: &LoadOptions) -> Result<IncidentTable, DatasetError> {
    if !path.exists() {
        return match options.missing_file {
            MissingFilePolicy::EmptyTable => {
                log::warn!(
                    "{} does not exist, using an empty table",
                    path.display()
                );
                Ok(IncidentTable::canonical_fir())
            }
            MissingFilePolicy::Fail => Err(DatasetError::NotFound {
                path: path.to_path_buf(),
            }),
        };
    }

    let file = File::open(path)?;
    let table = read_table(file, options)?;

    log::debug!(
        "Loaded {} rows x {} columns from {}",
        table.len(),
        table.columns().len(),
        path.display()
    );

    Ok(table)
}

/// Parses delimited text from `reader` according to `options`.
///
/// Rows with fewer fields than the header are padded with nulls; rows with
/// more are a parse error.
///
/// # Errors
///
/// Returns [`DatasetError`] if the input has no header row, a row is too
/// wide, the configured date column is missing, or the CSV reader fails.
pub fn read_table<R: Read>(reader: R, options: &LoadOptions) -> Result<IncidentTable, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();

    if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
        return Err(DatasetError::Parse {
            message: "No columns to parse from file".to_owned(),
        });
    }

    let date_idx = options
        .date_column
        .map(|name| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DatasetError::Parse {
                    message: format!("Missing date column '{name}'"),
                })
        })
        .transpose()?;

    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;

        if record.len() > headers.len() {
            let line = record.position().map_or(0, csv::Position::line);
            return Err(DatasetError::Parse {
                message: format!(
                    "Expected {} fields in line {line}, saw {}",
                    headers.len(),
                    record.len()
                ),
            });
        }

        let row: Vec<Cell> = record
            .iter()
            .enumerate()
            .map(|(idx, raw)| to_cell(raw, Some(idx) == date_idx))
            .collect();
        rows.push(row);
    }

    Ok(IncidentTable::new(headers, rows).with_normalized_columns(options.column_policy))
}

/// Returns `true` if `raw` is empty or one of the [`NA_TOKENS`].
#[must_use]
pub fn is_missing(raw: &str) -> bool {
    raw.is_empty() || NA_TOKENS.contains(&raw)
}

fn to_cell(raw: &str, is_date: bool) -> Cell {
    if is_missing(raw) {
        Cell::Null
    } else if is_date {
        parse_day_first_date(raw).map_or(Cell::Null, Cell::Date)
    } else {
        Cell::Text(raw.to_owned())
    }
}

/// Parses a calendar date, reading ambiguous numeric dates day-first.
///
/// `05/03/2024` is 5 March. ISO dates are read as written. A trailing
/// time of day is accepted and discarded.
#[must_use]
pub fn parse_day_first_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_TIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            MONTH_FIRST_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        })
}
