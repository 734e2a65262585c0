//! The chain-snatching view: filter, group by area, paginate, enrich.

use std::path::Path;

use crime_demo_dataset_models::{AreaLookup, AreaQueryResult, ChainSnatchingQuery, IncidentTable};

use crate::DatasetError;
use crate::aggregate::aggregate_area;
use crate::filter::{FilterPredicates, filter};
use crate::loader::load_fir_table;
use crate::paginate::paginate_areas;

/// Runs the chain-snatching query against an already loaded FIR table.
///
/// An empty table, or one without a `crime_type` column, produces an empty
/// result before any parameter is validated.
///
/// # Errors
///
/// Returns [`DatasetError::Validation`] if a date bound cannot be parsed.
pub fn chain_snatching(
    table: &IncidentTable,
    query: &ChainSnatchingQuery,
    lookup: &AreaLookup,
) -> Result<AreaQueryResult, DatasetError> {
    if table.is_empty() || !table.has_column("crime_type") {
        return Ok(AreaQueryResult::empty(query.limit, query.offset));
    }

    let predicates = FilterPredicates::from_query(query)?;
    let matching = filter(table, &predicates);
    let counts = aggregate_area(&matching);

    log::debug!(
        "chain-snatching: {} of {} rows matched across {} areas",
        matching.len(),
        table.len(),
        counts.len()
    );

    Ok(paginate_areas(&counts, query.limit, query.offset, lookup))
}

/// Loads the FIR file at `path` and runs [`chain_snatching`] on it.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be parsed or a date bound
/// is invalid.
pub fn run_chain_snatching(
    path: &Path,
    query: &ChainSnatchingQuery,
    lookup: &AreaLookup,
) -> Result<AreaQueryResult, DatasetError> {
    let table = load_fir_table(path)?;
    chain_snatching(&table, query, lookup)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use crime_demo_dataset_models::AreaResult;

    use super::*;
    use crate::loader::{LoadOptions, read_table};

    const SCENARIO: &str = "\
fir_id,date,time,area,crime_type,details
1,2024-01-05,09:00,Downtown,Chain Snatching,
2,2024-01-06,10:00,Downtown,Theft,
3,2024-02-01,21:30,Northside,chain snatch,
";

    fn scenario() -> IncidentTable {
        read_table(SCENARIO.as_bytes(), &LoadOptions::FIR).unwrap()
    }

    #[test]
    fn unfiltered_scenario_counts_each_area_once() {
        let result =
            chain_snatching(&scenario(), &ChainSnatchingQuery::default(), &AreaLookup::default())
                .unwrap();
        assert_eq!(result.total, 2);
        assert_eq!(
            result.results,
            vec![
                AreaResult {
                    area: "Downtown".into(),
                    count: 1,
                    lat: 12.9716,
                    lng: 77.5946,
                },
                AreaResult {
                    area: "Northside".into(),
                    count: 1,
                    lat: 12.986,
                    lng: 77.61,
                },
            ]
        );
        assert_eq!((result.limit, result.offset), (100, 0));
    }

    #[test]
    fn area_and_date_filters_narrow_the_result() {
        let query = ChainSnatchingQuery {
            area: Some("NORTHSIDE".into()),
            start_date: Some("2024-01-15".into()),
            ..ChainSnatchingQuery::default()
        };
        let result = chain_snatching(&scenario(), &query, &AreaLookup::default()).unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.results[0].area, "Northside");
    }

    #[test]
    fn pagination_keeps_full_total() {
        let query = ChainSnatchingQuery {
            limit: 1,
            offset: 1,
            ..ChainSnatchingQuery::default()
        };
        let result = chain_snatching(&scenario(), &query, &AreaLookup::default()).unwrap();
        assert_eq!(result.total, 2);
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.results[0].area, "Northside");
    }

    #[test]
    fn invalid_start_date_fails_the_query() {
        let query = ChainSnatchingQuery {
            start_date: Some("next tuesday".into()),
            ..ChainSnatchingQuery::default()
        };
        let err = chain_snatching(&scenario(), &query, &AreaLookup::default()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid start_date format. Use YYYY-MM-DD");
    }

    #[test]
    fn empty_table_short_circuits_before_validation() {
        let query = ChainSnatchingQuery {
            start_date: Some("garbage".into()),
            ..ChainSnatchingQuery::default()
        };
        let result =
            chain_snatching(&IncidentTable::canonical_fir(), &query, &AreaLookup::default())
                .unwrap();
        assert_eq!(result, AreaQueryResult::empty(100, 0));
    }

    #[test]
    fn missing_crime_type_column_yields_empty_result() {
        let csv = "fir_id,date,area\n1,2024-01-01,Downtown\n";
        let table = read_table(csv.as_bytes(), &LoadOptions::FIR).unwrap();
        let result =
            chain_snatching(&table, &ChainSnatchingQuery::default(), &AreaLookup::default())
                .unwrap();
        assert_eq!(result.total, 0);
        assert!(result.results.is_empty());
    }

    #[test]
    fn missing_file_yields_zero_total() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_chain_snatching(
            &dir.path().join("fir_data.csv"),
            &ChainSnatchingQuery::default(),
            &AreaLookup::default(),
        )
        .unwrap();
        assert_eq!(result.total, 0);
    }

    #[test]
    fn repeated_queries_are_identical() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{SCENARIO}").unwrap();
        let run = || {
            let result = run_chain_snatching(
                file.path(),
                &ChainSnatchingQuery::default(),
                &AreaLookup::default(),
            )
            .unwrap();
            serde_json::to_string(&result).unwrap()
        };
        assert_eq!(run(), run());
    }
}
