//! Aggregation outputs, shaped the way the JSON API returns them.

use serde::{Deserialize, Serialize};

/// One `(key, count)` pair of a breakdown.
///
/// The key field is named after the grouping dimension, so a type breakdown
/// serializes as `{"crime_type": "Theft", "count": 5}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BreakdownEntry {
    CrimeType { crime_type: String, count: u64 },
    Year { year: i64, count: u64 },
    Location { location: String, count: u64 },
}

impl BreakdownEntry {
    #[must_use]
    pub const fn count(&self) -> u64 {
        match self {
            Self::CrimeType { count, .. } | Self::Year { count, .. } | Self::Location { count, .. } => {
                *count
            }
        }
    }

    /// The group key rendered as text (years are stringified).
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::CrimeType { crime_type, .. } => crime_type.clone(),
            Self::Year { year, .. } => year.to_string(),
            Self::Location { location, .. } => location.clone(),
        }
    }
}

/// Output of a grouped query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResult {
    /// Name of the grouping dimension (`crime_type`, `year` or `location`).
    pub group_by: String,
    /// Row count of the whole table, including rows dropped from the
    /// breakdown for having no usable key.
    pub total_crimes: u64,
    pub breakdown: Vec<BreakdownEntry>,
}

/// Soft failure returned when a grouping column does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingColumnReport {
    pub error: String,
    pub available_columns: Vec<String>,
}

impl MissingColumnReport {
    #[must_use]
    pub fn new(column: &str, available_columns: &[String]) -> Self {
        Self {
            error: format!("{column} column not found in dataset"),
            available_columns: available_columns.to_vec(),
        }
    }
}

/// Either a breakdown or an explanation of why none could be computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BreakdownOutcome {
    Grouped(AggregationResult),
    MissingColumn(MissingColumnReport),
}

impl BreakdownOutcome {
    /// Breakdown entries, empty for a soft failure.
    #[must_use]
    pub fn breakdown(&self) -> &[BreakdownEntry] {
        match self {
            Self::Grouped(result) => &result.breakdown,
            Self::MissingColumn(_) => &[],
        }
    }
}

/// Total row count of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalCrimes {
    pub total_crimes: u64,
    /// File name without its directory.
    pub file: String,
}

/// Legacy `{label, value}` breakdown item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryItem {
    pub label: String,
    pub value: u64,
}

impl From<&BreakdownEntry> for SummaryItem {
    fn from(entry: &BreakdownEntry) -> Self {
        Self {
            label: entry.label(),
            value: entry.count(),
        }
    }
}

/// Incident count for one area, before enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaCount {
    pub area: String,
    pub count: u64,
}

/// Incident count for one area with its map marker position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaResult {
    pub area: String,
    pub count: u64,
    pub lat: f64,
    pub lng: f64,
}

/// Paginated, enriched output of the chain-snatching view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaQueryResult {
    /// Sum of counts over every matching area, before pagination.
    pub total: u64,
    pub results: Vec<AreaResult>,
    pub limit: usize,
    pub offset: usize,
}

impl AreaQueryResult {
    #[must_use]
    pub const fn empty(limit: usize, offset: usize) -> Self {
        Self {
            total: 0,
            results: Vec::new(),
            limit,
            offset,
        }
    }
}

/// How often one value occurs in a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: u64,
}

/// Value frequencies of one column, flagged when a single value repeats
/// across at least `threshold` incidents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatIndicator {
    pub column: String,
    pub threshold: u64,
    /// Most frequent value, if the column has any non-null values.
    pub top: Option<ValueCount>,
    pub alert: bool,
    /// All value counts, most frequent first.
    pub counts: Vec<ValueCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepeatIndicatorOutcome {
    Found(RepeatIndicator),
    MissingColumn(MissingColumnReport),
}
