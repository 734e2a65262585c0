//! Multi-predicate row filtering.
//!
//! Predicates are optional and combined with logical AND. A predicate whose
//! column is missing from the table is skipped, with one exception: a
//! crime-type substring filter against a table without `crime_type`
//! matches nothing.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use crime_demo_dataset_models::{ChainSnatchingQuery, IncidentRecord, IncidentTable};

use crate::DatasetError;

/// Substring identifying chain-snatching incidents.
pub const CHAIN_SNATCHING_PATTERN: &str = "chain";

/// Validated filter predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPredicates {
    /// Case-insensitive substring of `crime_type`.
    pub crime_type_contains: Option<String>,
    /// Case-insensitive exact match on `area`.
    pub area_equals: Option<String>,
    /// Inclusive lower bound on `date`.
    pub date_on_or_after: Option<NaiveDateTime>,
    /// Inclusive upper bound on `date`.
    pub date_on_or_before: Option<NaiveDateTime>,
    /// Inclusive lexical lower bound on the raw `time` text.
    pub time_on_or_after: Option<String>,
    /// Inclusive lexical upper bound on the raw `time` text.
    pub time_on_or_before: Option<String>,
}

impl FilterPredicates {
    /// Builds the chain-snatching predicates from raw query parameters.
    ///
    /// Empty strings count as "not supplied".
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Validation`] naming `start_date` or
    /// `end_date` if a bound cannot be parsed.
    pub fn from_query(query: &ChainSnatchingQuery) -> Result<Self, DatasetError> {
        let supplied = |value: &Option<String>| value.clone().filter(|s| !s.is_empty());

        let date_on_or_after = supplied(&query.start_date)
            .map(|raw| parse_date_bound("start_date", &raw))
            .transpose()?;
        let date_on_or_before = supplied(&query.end_date)
            .map(|raw| parse_date_bound("end_date", &raw))
            .transpose()?;

        Ok(Self {
            crime_type_contains: Some(CHAIN_SNATCHING_PATTERN.to_owned()),
            area_equals: supplied(&query.area),
            date_on_or_after,
            date_on_or_before,
            time_on_or_after: supplied(&query.start_time),
            time_on_or_before: supplied(&query.end_time),
        })
    }
}

/// Parses a caller-supplied date bound (`YYYY-MM-DD`, optionally with a
/// `THH:MM:SS` or ` HH:MM:SS` time part).
///
/// # Errors
///
/// Returns [`DatasetError::Validation`] naming `field` if `raw` matches
/// none of the accepted layouts.
pub fn parse_date_bound(field: &'static str, raw: &str) -> Result<NaiveDateTime, DatasetError> {
    let s = raw.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| DatasetError::Validation { field })
}

/// Predicates resolved against one table's columns.
struct CompiledFilter<'a> {
    crime_needle: Option<String>,
    area: Option<String>,
    date_from: Option<NaiveDateTime>,
    date_to: Option<NaiveDateTime>,
    time_from: Option<&'a str>,
    time_to: Option<&'a str>,
}

impl<'a> CompiledFilter<'a> {
    fn compile(table: &IncidentTable, predicates: &'a FilterPredicates) -> Self {
        let has_date = table.has_column("date");
        let has_time = table.has_column("time");

        Self {
            crime_needle: predicates
                .crime_type_contains
                .as_deref()
                .map(str::to_lowercase),
            area: predicates
                .area_equals
                .as_deref()
                .filter(|_| table.has_column("area"))
                .map(str::to_lowercase),
            date_from: predicates.date_on_or_after.filter(|_| has_date),
            date_to: predicates.date_on_or_before.filter(|_| has_date),
            time_from: predicates.time_on_or_after.as_deref().filter(|_| has_time),
            time_to: predicates.time_on_or_before.as_deref().filter(|_| has_time),
        }
    }

    fn matches(&self, record: &IncidentRecord<'_>) -> bool {
        if let Some(needle) = &self.crime_needle
            && !record
                .crime_type
                .is_some_and(|c| c.to_lowercase().contains(needle.as_str()))
        {
            return false;
        }

        if let Some(area) = &self.area
            && !record.area.is_some_and(|a| a.to_lowercase() == *area)
        {
            return false;
        }

        let day_start = record.date.map(|d| d.and_time(NaiveTime::MIN));
        if let Some(from) = self.date_from
            && !day_start.is_some_and(|d| d >= from)
        {
            return false;
        }
        if let Some(to) = self.date_to
            && !day_start.is_some_and(|d| d <= to)
        {
            return false;
        }

        let time = record.time.unwrap_or("");
        if self.time_from.is_some_and(|from| time < from) {
            return false;
        }
        if self.time_to.is_some_and(|to| time > to) {
            return false;
        }

        true
    }
}

/// Returns the rows of `table` matching every applicable predicate.
///
/// The source table is never modified.
#[must_use]
pub fn filter(table: &IncidentTable, predicates: &FilterPredicates) -> IncidentTable {
    if predicates.crime_type_contains.is_some() && !table.has_column("crime_type") {
        return IncidentTable::with_columns(table.columns().iter().cloned());
    }

    let compiled = CompiledFilter::compile(table, predicates);
    table.select_records(|record| compiled.matches(record))
}
