#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident table and result types for the crime demo.
//!
//! An [`IncidentTable`] is the in-memory form of one flat file of crime
//! incident records. It is immutable once loaded: every filter produces a
//! new derived table. The query and result types describe what callers
//! can ask of a table and what comes back, and are serialized as-is into
//! the JSON API.

pub mod area;
pub mod query;
pub mod results;

use chrono::NaiveDate;

pub use area::{AreaLookup, Coordinates};
pub use query::{ChainSnatchingQuery, GroupBy};
pub use results::{
    AggregationResult, AreaCount, AreaQueryResult, AreaResult, BreakdownEntry, BreakdownOutcome,
    MissingColumnReport, RepeatIndicator, RepeatIndicatorOutcome, SummaryItem, TotalCrimes,
    ValueCount,
};

/// Column set of an FIR table whose backing file does not exist.
pub const CANONICAL_FIR_COLUMNS: [&str; 6] =
    ["fir_id", "date", "time", "area", "crime_type", "details"];

/// A single cell of an [`IncidentTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// Missing value (empty cell or a recognised NA token).
    Null,
    /// Raw text exactly as read from the file.
    Text(String),
    /// A calendar date parsed from a designated date column.
    Date(NaiveDate),
}

impl Cell {
    /// Returns `true` for [`Cell::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the raw text of a [`Cell::Text`] cell.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            Self::Null | Self::Date(_) => None,
        }
    }

    /// Returns the date of a [`Cell::Date`] cell.
    #[must_use]
    pub const fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::Null | Self::Text(_) => None,
        }
    }

    /// Coerces the cell to a year, see [`coerce_year`].
    #[must_use]
    pub fn as_year(&self) -> Option<i64> {
        self.as_text().and_then(coerce_year)
    }

    /// Returns the value used when this cell is a grouping key.
    ///
    /// Dates render as `YYYY-MM-DD`. Nulls have no key.
    #[must_use]
    pub fn group_key(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Text(s) => Some(s.clone()),
            Self::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }
}

/// Coerces a numeric-like value to an integer year.
///
/// Integers parse directly. Finite decimals are truncated toward zero, so
/// `"2020.0"` becomes `2020`. Everything else yields `None`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn coerce_year(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(year) = trimmed.parse::<i64>() {
        return Some(year);
    }
    let value = trimmed.parse::<f64>().ok()?;
    if !value.is_finite() || value.abs() >= 9.0e18 {
        return None;
    }
    Some(value.trunc() as i64)
}

/// How column labels are rewritten at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnPolicy {
    /// Strip surrounding whitespace only (FIR loader).
    TrimOnly,
    /// Trim, lower-case, and replace spaces with underscores (generic
    /// processor).
    LowerSnake,
}

impl ColumnPolicy {
    /// Applies this policy to a single column label.
    #[must_use]
    pub fn normalize(self, label: &str) -> String {
        match self {
            Self::TrimOnly => label.trim().to_string(),
            Self::LowerSnake => label.trim().to_lowercase().replace(' ', "_"),
        }
    }
}

/// What a loader does when its source path does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingFilePolicy {
    /// Return an empty table with [`CANONICAL_FIR_COLUMNS`].
    EmptyTable,
    /// Fail with a not-found error.
    Fail,
}

/// Immutable in-memory table of incident records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncidentTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl IncidentTable {
    /// Builds a table from column labels and rows.
    ///
    /// Rows shorter than the header are padded with [`Cell::Null`]; longer
    /// rows are truncated.
    #[must_use]
    pub fn new(columns: Vec<String>, mut rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        for row in &mut rows {
            row.resize(width, Cell::Null);
        }
        Self { columns, rows }
    }

    /// Builds an empty table with the given columns.
    #[must_use]
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Empty table with the canonical FIR column set.
    #[must_use]
    pub fn canonical_fir() -> Self {
        Self::with_columns(CANONICAL_FIR_COLUMNS)
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first column with exactly this label.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Iterates rows in file order.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Iterates the cells of one column, or `None` if the column is absent.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Returns a new table holding the rows for which `keep` is true.
    #[must_use]
    pub fn select_rows(&self, mut keep: impl FnMut(&[Cell]) -> bool) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| keep(row.as_slice()))
                .cloned()
                .collect(),
        }
    }

    /// Like [`Self::select_rows`], but tests the typed [`IncidentRecord`]
    /// view of each row.
    #[must_use]
    pub fn select_records(&self, mut keep: impl FnMut(&IncidentRecord<'_>) -> bool) -> Self {
        let layout = RecordLayout::resolve(&self.columns);
        self.select_rows(|row| keep(&layout.project(row)))
    }

    /// Returns a table whose column labels have been rewritten by `policy`.
    #[must_use]
    pub fn with_normalized_columns(mut self, policy: ColumnPolicy) -> Self {
        for column in &mut self.columns {
            *column = policy.normalize(column);
        }
        self
    }

    /// Typed view over every row.
    pub fn records(&self) -> impl Iterator<Item = IncidentRecord<'_>> {
        let layout = RecordLayout::resolve(&self.columns);
        self.rows.iter().map(move |row| layout.project(row))
    }
}

/// Borrowed, typed view of one row of an [`IncidentTable`].
///
/// A field is `None` when the cell is null or the column does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IncidentRecord<'a> {
    pub fir_id: Option<&'a str>,
    pub date: Option<NaiveDate>,
    /// Raw `HH:MM` text, never parsed.
    pub time: Option<&'a str>,
    pub area: Option<&'a str>,
    pub location: Option<&'a str>,
    pub crime_type: Option<&'a str>,
    pub year: Option<i64>,
    pub severity: Option<&'a str>,
    pub details: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, Default)]
struct RecordLayout {
    fir_id: Option<usize>,
    date: Option<usize>,
    time: Option<usize>,
    area: Option<usize>,
    location: Option<usize>,
    crime_type: Option<usize>,
    year: Option<usize>,
    severity: Option<usize>,
    details: Option<usize>,
}

impl RecordLayout {
    fn resolve(columns: &[String]) -> Self {
        let find = |name: &str| columns.iter().position(|c| c == name);
        Self {
            fir_id: find("fir_id"),
            date: find("date"),
            time: find("time"),
            area: find("area"),
            location: find("location"),
            crime_type: find("crime_type"),
            year: find("year"),
            severity: find("severity"),
            details: find("details"),
        }
    }

    fn project<'a>(&self, row: &'a [Cell]) -> IncidentRecord<'a> {
        let text = |idx: Option<usize>| idx.and_then(|i| row[i].as_text());
        IncidentRecord {
            fir_id: text(self.fir_id),
            date: self.date.and_then(|i| row[i].as_date()),
            time: text(self.time),
            area: text(self.area),
            location: text(self.location),
            crime_type: text(self.crime_type),
            year: self.year.and_then(|i| row[i].as_year()),
            severity: text(self.severity),
            details: text(self.details),
        }
    }
}
