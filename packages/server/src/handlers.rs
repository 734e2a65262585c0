//! HTTP handler functions for the crime demo API.
//!
//! Every data handler re-reads its CSV file on a blocking thread, so edits
//! to the file show up on the next request.

use actix_web::{HttpResponse, web};
use crime_demo_dataset::{query, reports};
use crime_demo_dataset_models::ChainSnatchingQuery;
use crime_demo_server_models::{
    ApiHealth, ApiStatus, ApiSuccess, BreakdownParams, ChainSnatchingParams, LoginRequest,
    LoginResponse, SummaryParams, SummaryResponse,
};

use crate::AppState;
use crate::auth::AuthenticatedUser;
use crate::error::ApiError;

/// `GET /`
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(ApiStatus {
        status: "running".to_owned(),
    })
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /login`
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let token = state
        .auth
        .login(body.username.as_deref(), body.password.as_deref())?;
    Ok(HttpResponse::Ok().json(ApiSuccess::new(LoginResponse::bearer(token))))
}

/// `GET /chain-snatching`
///
/// Chain-snatching incident counts per area, filtered and paginated.
pub async fn chain_snatching(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    params: web::Query<ChainSnatchingParams>,
) -> Result<HttpResponse, ApiError> {
    let request = ChainSnatchingQuery::from(params.into_inner());
    log::debug!("chain-snatching query by {}: {request:?}", user.0.sub);

    let config = state.config.clone();
    let result = web::block(move || {
        query::run_chain_snatching(&config.fir_data_path, &request, &config.area_coordinates)
    })
    .await??;

    Ok(HttpResponse::Ok().json(ApiSuccess::new(result)))
}

/// `GET /api/crimes/total`
pub async fn total(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let config = state.config.clone();
    let result = web::block(move || reports::get_total_crimes(config.crime_csv_path())).await??;
    Ok(HttpResponse::Ok().json(ApiSuccess::new(result)))
}

/// `GET /api/crimes/breakdown`
///
/// A missing grouping column is still a `200` with `error` and
/// `available_columns` in place of the breakdown.
pub async fn breakdown(
    state: web::Data<AppState>,
    params: web::Query<BreakdownParams>,
) -> Result<HttpResponse, ApiError> {
    let group_by = params.group_by;
    let config = state.config.clone();
    let outcome =
        web::block(move || reports::get_breakdown(config.crime_csv_path(), group_by)).await??;
    Ok(HttpResponse::Ok().json(ApiSuccess::new(outcome)))
}

/// `GET /api/crimes/summary`
pub async fn summary(
    state: web::Data<AppState>,
    params: web::Query<SummaryParams>,
) -> Result<HttpResponse, ApiError> {
    let SummaryParams { group_by } = params.into_inner();
    let config = state.config.clone();
    let data =
        web::block(move || reports::summarize_by(config.crime_csv_path(), &group_by)).await??;
    Ok(HttpResponse::Ok().json(ApiSuccess::new(SummaryResponse { data })))
}
