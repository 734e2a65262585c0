#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the crime demo server.
//!
//! Every successful response is wrapped as `{"success": true, ...}` with
//! the payload's fields flattened alongside; every failure is
//! `{"success": false, "detail": "..."}`. Field names are `snake_case` to
//! match the dashboard frontend.

use crime_demo_dataset_models::{ChainSnatchingQuery, GroupBy, SummaryItem};
use serde::{Deserialize, Serialize};

/// Success envelope around a flattened payload.
#[derive(Debug, Clone, Serialize)]
pub struct ApiSuccess<T> {
    /// Always `true`.
    pub success: bool,
    /// Payload whose fields sit next to `success`.
    #[serde(flatten)]
    pub body: T,
}

impl<T> ApiSuccess<T> {
    #[must_use]
    pub const fn new(body: T) -> Self {
        Self {
            success: true,
            body,
        }
    }
}

/// Failure envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiFailure {
    /// Always `false`.
    pub success: bool,
    /// Human-readable reason.
    pub detail: String,
}

impl ApiFailure {
    #[must_use]
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            detail: detail.into(),
        }
    }
}

/// `GET /` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiStatus {
    pub status: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// `POST /login` body. Both fields are required; they are optional here so
/// that a missing field produces the API's own error message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Issued bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
}

impl LoginResponse {
    #[must_use]
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_owned(),
        }
    }
}

/// Query parameters for `GET /chain-snatching`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChainSnatchingParams {
    /// Case-insensitive area name.
    pub area: Option<String>,
    /// Inclusive lower date bound (`YYYY-MM-DD`).
    pub start_date: Option<String>,
    /// Inclusive upper date bound (`YYYY-MM-DD`).
    pub end_date: Option<String>,
    /// Inclusive lower time bound (`HH:MM`).
    pub start_time: Option<String>,
    /// Inclusive upper time bound (`HH:MM`).
    pub end_time: Option<String>,
    /// Page size (default 100).
    pub limit: Option<usize>,
    /// Rows to skip (default 0).
    pub offset: Option<usize>,
}

impl From<ChainSnatchingParams> for ChainSnatchingQuery {
    fn from(p: ChainSnatchingParams) -> Self {
        let defaults = Self::default();
        Self {
            area: p.area,
            start_date: p.start_date,
            end_date: p.end_date,
            start_time: p.start_time,
            end_time: p.end_time,
            limit: p.limit.unwrap_or(defaults.limit),
            offset: p.offset.unwrap_or(defaults.offset),
        }
    }
}

/// Query parameters for `GET /api/crimes/breakdown`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct BreakdownParams {
    /// `type`, `year` or `location`.
    #[serde(default)]
    pub group_by: GroupBy,
}

/// Query parameters for `GET /api/crimes/summary`.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryParams {
    /// Raw grouping name; unknown values yield an empty summary.
    #[serde(default = "default_summary_group")]
    pub group_by: String,
}

fn default_summary_group() -> String {
    "type".to_owned()
}

/// Legacy summary payload.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryResponse {
    pub data: Vec<SummaryItem>,
}

#[cfg(test)]
mod tests {
    use crime_demo_dataset_models::TotalCrimes;

    use super::*;

    #[test]
    fn success_envelope_flattens_payload() {
        let body = ApiSuccess::new(TotalCrimes {
            total_crimes: 3,
            file: "fir_data.csv".into(),
        });
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"success": true, "total_crimes": 3, "file": "fir_data.csv"})
        );
    }

    #[test]
    fn failure_envelope_carries_detail() {
        assert_eq!(
            serde_json::to_value(ApiFailure::new("Invalid token")).unwrap(),
            serde_json::json!({"success": false, "detail": "Invalid token"})
        );
    }

    #[test]
    fn chain_snatching_params_default_pagination() {
        let query = ChainSnatchingQuery::from(ChainSnatchingParams {
            area: Some("Downtown".into()),
            ..ChainSnatchingParams::default()
        });
        assert_eq!(query.limit, 100);
        assert_eq!(query.offset, 0);
        assert_eq!(query.area.as_deref(), Some("Downtown"));
    }

    #[test]
    fn summary_group_defaults_to_type() {
        let params: SummaryParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.group_by, "type");
    }
}
