//! Repeat-indicator scan.
//!
//! Flags columns where a single value (a vehicle colour, a phone ID)
//! recurs across many incidents, a cheap hint of organised activity.

use crime_demo_dataset_models::{
    IncidentTable, MissingColumnReport, RepeatIndicator, RepeatIndicatorOutcome, ValueCount,
};

use crate::aggregate::value_counts;

/// Occurrences of the top value at which a column is flagged.
pub const DEFAULT_REPEAT_THRESHOLD: u64 = 3;

/// Counts the values of `column` and flags it when the most frequent value
/// occurs at least `threshold` times. Null cells are ignored.
#[must_use]
pub fn repeat_indicator(table: &IncidentTable, column: &str, threshold: u64) -> RepeatIndicatorOutcome {
    let Some(cells) = table.column(column) else {
        return RepeatIndicatorOutcome::MissingColumn(MissingColumnReport::new(
            column,
            table.columns(),
        ));
    };

    let counts: Vec<ValueCount> = value_counts(cells.filter_map(|cell| cell.group_key()))
        .into_iter()
        .map(|(value, count)| ValueCount { value, count })
        .collect();
    let top = counts.first().cloned();
    let alert = top.as_ref().is_some_and(|t| t.count >= threshold);

    if alert {
        log::info!("Repeated value in {column}: {top:?}");
    }

    RepeatIndicatorOutcome::Found(RepeatIndicator {
        column: column.to_owned(),
        threshold,
        top,
        alert,
        counts,
    })
}

/// Runs [`repeat_indicator`] for each column in order.
#[must_use]
pub fn repeat_indicators<S: AsRef<str>>(
    table: &IncidentTable,
    columns: &[S],
    threshold: u64,
) -> Vec<RepeatIndicatorOutcome> {
    columns
        .iter()
        .map(|column| repeat_indicator(table, column.as_ref(), threshold))
        .collect()
}
