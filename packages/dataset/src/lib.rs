#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Flat-file incident loader and filter/aggregate query engine.
//!
//! Two loaders read a delimited file into an
//! [`IncidentTable`](crime_demo_dataset_models::IncidentTable):
//! [`loader::load_fir_table`] for the authenticated chain-snatching view
//! and [`loader::process_csv`] for the generic breakdown reports. They
//! disagree on column normalization and on what a missing file means, and
//! both behaviours are kept as separate named policies.
//!
//! Nothing here caches. Every call re-reads the file, so repeated queries
//! against an unchanged file return identical results.

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod paginate;
pub mod patterns;
pub mod query;
pub mod reports;

use std::path::PathBuf;

/// Errors that abort a load or a query.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// The generic processor was pointed at a path that does not exist.
    #[error("File not found: {}", .path.display())]
    NotFound {
        /// The path that was requested.
        path: PathBuf,
    },

    /// I/O error while reading the source file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV reader rejected the file.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// The file was readable but structurally unusable.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of what went wrong.
        message: String,
    },

    /// A caller-supplied date bound could not be parsed.
    #[error("Invalid {field} format. Use YYYY-MM-DD")]
    Validation {
        /// Name of the offending request field.
        field: &'static str,
    },
}

impl DatasetError {
    /// Returns `true` for errors caused by the caller's parameters rather
    /// than by the data file.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
