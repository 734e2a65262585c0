//! Grouping and counting.
//!
//! Sort orders are part of the contract:
//!
//! * type and location breakdowns: count descending, ties in order of first
//!   appearance in the file
//! * year breakdowns: year ascending
//! * area counts: count descending, ties in area-name order
//!
//! `total_crimes` is always the row count of the whole table, including
//! rows that contributed nothing to the breakdown.

use std::collections::{BTreeMap, HashMap};

use crime_demo_dataset_models::{
    AggregationResult, AreaCount, BreakdownEntry, BreakdownOutcome, Cell, GroupBy, IncidentTable,
    MissingColumnReport,
};

/// Bucket label for null type and location values.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Counts occurrences of each key.
///
/// The result is sorted by count descending. The sort is stable, so keys
/// with equal counts keep the order in which they were first seen.
pub fn value_counts<I>(keys: I) -> Vec<(String, u64)>
where
    I: IntoIterator<Item = String>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, u64)> = Vec::new();

    for key in keys {
        if let Some(&i) = index.get(&key) {
            counts[i].1 += 1;
        } else {
            index.insert(key.clone(), counts.len());
            counts.push((key, 1));
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Picks the column holding crime types.
///
/// The first column whose label contains `crime` or `type` wins, then
/// `crime_type`, then the first column.
#[must_use]
pub fn detect_crime_type_column(columns: &[String]) -> Option<&str> {
    columns
        .iter()
        .find(|c| c.contains("crime") || c.contains("type"))
        .or_else(|| columns.iter().find(|c| *c == "crime_type"))
        .or_else(|| columns.first())
        .map(String::as_str)
}

fn row_total(table: &IncidentTable) -> u64 {
    table.len() as u64
}

fn keyed_counts<'a>(cells: impl Iterator<Item = &'a Cell>) -> Vec<(String, u64)> {
    value_counts(cells.map(|cell| cell.group_key().unwrap_or_else(|| UNKNOWN_LABEL.to_owned())))
}

/// Counts rows per crime type, nulls bucketed as [`UNKNOWN_LABEL`].
#[must_use]
pub fn crimes_by_type(table: &IncidentTable) -> AggregationResult {
    let breakdown = detect_crime_type_column(table.columns())
        .and_then(|column| table.column(column))
        .map(|cells| {
            keyed_counts(cells)
                .into_iter()
                .map(|(crime_type, count)| BreakdownEntry::CrimeType { crime_type, count })
                .collect()
        })
        .unwrap_or_default();

    AggregationResult {
        group_by: GroupBy::Type.result_label().to_owned(),
        total_crimes: row_total(table),
        breakdown,
    }
}

/// Counts rows per year in chronological order.
///
/// Rows whose `year` is not numeric are left out of the breakdown but
/// still counted in `total_crimes`. Without a `year` column the result is
/// a [`MissingColumnReport`].
#[must_use]
pub fn crimes_by_year(table: &IncidentTable) -> BreakdownOutcome {
    let Some(cells) = table.column("year") else {
        return BreakdownOutcome::MissingColumn(MissingColumnReport::new("year", table.columns()));
    };

    let mut by_year: BTreeMap<i64, u64> = BTreeMap::new();
    for year in cells.filter_map(Cell::as_year) {
        *by_year.entry(year).or_default() += 1;
    }

    BreakdownOutcome::Grouped(AggregationResult {
        group_by: GroupBy::Year.result_label().to_owned(),
        total_crimes: row_total(table),
        breakdown: by_year
            .into_iter()
            .map(|(year, count)| BreakdownEntry::Year { year, count })
            .collect(),
    })
}

/// Counts rows per location, nulls bucketed as [`UNKNOWN_LABEL`].
///
/// Without a `location` column the result is a [`MissingColumnReport`].
#[must_use]
pub fn crimes_by_location(table: &IncidentTable) -> BreakdownOutcome {
    let Some(cells) = table.column("location") else {
        return BreakdownOutcome::MissingColumn(MissingColumnReport::new(
            "location",
            table.columns(),
        ));
    };

    BreakdownOutcome::Grouped(AggregationResult {
        group_by: GroupBy::Location.result_label().to_owned(),
        total_crimes: row_total(table),
        breakdown: keyed_counts(cells)
            .into_iter()
            .map(|(location, count)| BreakdownEntry::Location { location, count })
            .collect(),
    })
}

/// Groups `table` by `dimension`.
#[must_use]
pub fn aggregate(table: &IncidentTable, dimension: GroupBy) -> BreakdownOutcome {
    match dimension {
        GroupBy::Type => BreakdownOutcome::Grouped(crimes_by_type(table)),
        GroupBy::Year => crimes_by_year(table),
        GroupBy::Location => crimes_by_location(table),
    }
}

/// Counts rows per area, most incidents first.
///
/// Rows with a null area are dropped. Areas with equal counts appear in
/// name order. A table without an `area` column yields no counts.
#[must_use]
pub fn aggregate_area(table: &IncidentTable) -> Vec<AreaCount> {
    let Some(cells) = table.column("area") else {
        return Vec::new();
    };

    let mut by_area: BTreeMap<String, u64> = BTreeMap::new();
    for area in cells.filter_map(Cell::group_key) {
        *by_area.entry(area).or_default() += 1;
    }

    let mut counts: Vec<AreaCount> = by_area
        .into_iter()
        .map(|(area, count)| AreaCount { area, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}
