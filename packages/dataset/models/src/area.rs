//! Static area name to map coordinate lookup.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair used for map markers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Immutable table of known area names and their marker coordinates.
///
/// Lookups are exact and case-sensitive. Unknown names resolve to
/// `(0.0, 0.0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AreaLookup {
    entries: BTreeMap<String, Coordinates>,
}

impl AreaLookup {
    /// Builds a lookup from `(name, coordinates)` pairs.
    #[must_use]
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Coordinates)>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Coordinates for `area`, or the origin when the name is unknown.
    #[must_use]
    pub fn resolve(&self, area: &str) -> Coordinates {
        self.entries.get(area).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AreaLookup {
    fn default() -> Self {
        Self::new([
            ("Downtown", Coordinates::new(12.9716, 77.5946)),
            ("Northside", Coordinates::new(12.9860, 77.6100)),
            ("Eastend", Coordinates::new(12.9600, 77.6200)),
            ("Westpark", Coordinates::new(12.9500, 77.5800)),
        ])
    }
}
