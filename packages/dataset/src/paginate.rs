//! Pagination and map-coordinate enrichment for area counts.

use crime_demo_dataset_models::{AreaCount, AreaLookup, AreaQueryResult, AreaResult};

/// Slices `counts` to `[offset, offset + limit)` and attaches coordinates.
///
/// `total` is the sum over every entry of `counts`, not just the returned
/// page.
#[must_use]
pub fn paginate_areas(
    counts: &[AreaCount],
    limit: usize,
    offset: usize,
    lookup: &AreaLookup,
) -> AreaQueryResult {
    let total = counts.iter().map(|c| c.count).sum();

    let results = counts
        .iter()
        .skip(offset)
        .take(limit)
        .map(|c| {
            let coords = lookup.resolve(&c.area);
            AreaResult {
                area: c.area.clone(),
                count: c.count,
                lat: coords.lat,
                lng: coords.lng,
            }
        })
        .collect();

    AreaQueryResult {
        total,
        results,
        limit,
        offset,
    }
}
