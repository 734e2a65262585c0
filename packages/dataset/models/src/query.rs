//! Caller-supplied query parameters.

use serde::{Deserialize, Serialize};
use strum_macros::EnumString;

/// Dimension a breakdown groups by.
///
/// Deserializes from `type`, `year` or `location`. [`std::str::FromStr`]
/// additionally accepts the legacy aliases `crime_type` and `place`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumString,
)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    #[strum(serialize = "type", serialize = "crime_type")]
    Type,
    #[strum(serialize = "year")]
    Year,
    #[strum(serialize = "location", serialize = "place")]
    Location,
}

impl GroupBy {
    /// Label reported as `group_by` in an aggregation result.
    #[must_use]
    pub const fn result_label(self) -> &'static str {
        match self {
            Self::Type => "crime_type",
            Self::Year => "year",
            Self::Location => "location",
        }
    }
}

/// Default page size for the chain-snatching view.
pub const DEFAULT_LIMIT: usize = 100;

/// Raw, unvalidated filters and pagination for the chain-snatching view.
///
/// Date bounds stay as text here; they are validated only when a query
/// actually reaches the date filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSnatchingQuery {
    pub area: Option<String>,
    /// Inclusive lower date bound, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// Inclusive upper date bound, `YYYY-MM-DD`.
    pub end_date: Option<String>,
    /// Inclusive lower bound on the raw time text.
    pub start_time: Option<String>,
    /// Inclusive upper bound on the raw time text.
    pub end_time: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for ChainSnatchingQuery {
    fn default() -> Self {
        Self {
            area: None,
            start_date: None,
            end_date: None,
            start_time: None,
            end_time: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_legacy_aliases() {
        assert_eq!("crime_type".parse::<GroupBy>().unwrap(), GroupBy::Type);
        assert_eq!("place".parse::<GroupBy>().unwrap(), GroupBy::Location);
        assert_eq!("year".parse::<GroupBy>().unwrap(), GroupBy::Year);
        assert!("month".parse::<GroupBy>().is_err());
    }

    #[test]
    fn deserializes_api_names() {
        let g: GroupBy = serde_json::from_str(r#""location""#).unwrap();
        assert_eq!(g, GroupBy::Location);
        assert!(serde_json::from_str::<GroupBy>(r#""place""#).is_err());
    }

    #[test]
    fn default_query_pages_one_hundred() {
        let q = ChainSnatchingQuery::default();
        assert_eq!((q.limit, q.offset), (100, 0));
    }
}
