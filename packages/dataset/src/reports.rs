//! File-level breakdown reports built on the generic processor.
//!
//! Every report re-reads its file through [`process_csv`], so a missing
//! file is a hard [`DatasetError::NotFound`].

use std::path::Path;

use crime_demo_dataset_models::{
    AggregationResult, BreakdownOutcome, GroupBy, SummaryItem, TotalCrimes,
};

use crate::DatasetError;
use crate::aggregate::{aggregate, crimes_by_location, crimes_by_type, crimes_by_year};
use crate::loader::process_csv;

/// Total number of rows in the file.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file is missing or malformed.
pub fn get_total_crimes(path: &Path) -> Result<TotalCrimes, DatasetError> {
    let table = process_csv(path)?;
    Ok(TotalCrimes {
        total_crimes: table.len() as u64,
        file: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
    })
}

/// Crime counts per type, most frequent first.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file is missing or malformed.
pub fn get_crimes_by_type(path: &Path) -> Result<AggregationResult, DatasetError> {
    Ok(crimes_by_type(&process_csv(path)?))
}

/// Crime counts per year, oldest first.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file is missing or malformed.
pub fn get_crimes_by_year(path: &Path) -> Result<BreakdownOutcome, DatasetError> {
    Ok(crimes_by_year(&process_csv(path)?))
}

/// Crime counts per location, most frequent first.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file is missing or malformed.
pub fn get_crimes_by_location(path: &Path) -> Result<BreakdownOutcome, DatasetError> {
    Ok(crimes_by_location(&process_csv(path)?))
}

/// Breakdown of the file by `group_by`.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file is missing or malformed.
pub fn get_breakdown(path: &Path, group_by: GroupBy) -> Result<BreakdownOutcome, DatasetError> {
    Ok(aggregate(&process_csv(path)?, group_by))
}

/// Legacy `{label, value}` summary.
///
/// `group_by` accepts `type`/`crime_type`, `year` and `location`/`place`.
/// Any other value yields an empty list without touching the file, as does
/// a missing grouping column.
///
/// # Errors
///
/// Returns [`DatasetError`] if a recognised grouping is requested and the
/// file is missing or malformed.
pub fn summarize_by(path: &Path, group_by: &str) -> Result<Vec<SummaryItem>, DatasetError> {
    let Ok(dimension) = group_by.parse::<GroupBy>() else {
        log::debug!("summarize_by: unknown grouping {group_by:?}");
        return Ok(Vec::new());
    };

    let outcome = get_breakdown(path, dimension)?;
    Ok(outcome.breakdown().iter().map(SummaryItem::from).collect())
}
