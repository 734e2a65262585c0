#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the crime demo dashboard.
//!
//! Serves the token-protected chain-snatching view, the public breakdown
//! reports and, when present on disk, the dashboard's static files. All
//! data comes from CSV files re-read on every request.

pub mod auth;
pub mod config;
pub mod error;
mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};

use crate::auth::AuthService;
use crate::config::AppConfig;
use crate::error::ApiError;

/// Shared application state.
pub struct AppState {
    /// Startup configuration, shared with blocking load tasks.
    pub config: Arc<AppConfig>,
    pub auth: AuthService,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        let auth = AuthService::new(&config.auth);
        Self {
            config: Arc::new(config),
            auth,
        }
    }
}

/// Registers the API routes and the extractor error handlers.
///
/// Malformed query strings and JSON bodies are answered with `422`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::unprocessable(err.to_string()).into()),
    )
    .app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::unprocessable(err.to_string()).into()),
    )
    .route("/", web::get().to(handlers::health_check))
    .route("/login", web::post().to(handlers::login))
    .route("/chain-snatching", web::get().to(handlers::chain_snatching))
    .service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/crimes/total", web::get().to(handlers::total))
            .route("/crimes/breakdown", web::get().to(handlers::breakdown))
            .route("/crimes/summary", web::get().to(handlers::summary)),
    );
}

/// Mounts the static and template directories that exist on disk.
fn configure_static(config: &AppConfig) -> impl Fn(&mut web::ServiceConfig) + Clone + use<> {
    let mounts: Vec<(&'static str, std::path::PathBuf)> = [
        ("/static", config.static_dir.clone()),
        ("/templates", config.templates_dir.clone()),
    ]
    .into_iter()
    .filter(|(prefix, dir)| {
        let exists = dir.is_dir();
        if !exists {
            log::info!("Not serving {prefix}: {} does not exist", dir.display());
        }
        exists
    })
    .collect();

    move |cfg: &mut web::ServiceConfig| {
        for (prefix, dir) in &mounts {
            cfg.service(Files::new(prefix, dir));
        }
    }
}

/// Starts the crime demo API server.
///
/// This is a regular async function; the caller provides the runtime
/// (e.g. via `#[actix_web::main]`) and initialises logging.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: AppConfig) -> std::io::Result<()> {
    let bind_addr = config.bind_addr.clone();
    let port = config.port;
    let statics = configure_static(&config);

    log::info!(
        "Serving chain-snatching data from {} and reports from {}",
        config.fir_data_path.display(),
        config.crime_csv_path().display()
    );

    let state = web::Data::new(AppState::new(config));

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_routes)
            .configure(statics.clone())
    })
    .bind((bind_addr, port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use actix_web::http::{StatusCode, header};
    use actix_web::test;
    use serde_json::{Value, json};

    use super::*;

    const FIR_CSV: &str = "\
fir_id,date,time,area,crime_type,year,location
1,05/01/2024,09:30,Downtown,Chain Snatching,2024,Market
2,06/01/2024,10:00,Downtown,Theft,2024,Market
3,01/02/2024,22:15,Northside,chain snatching,2023,Station
";

    fn fixture() -> (tempfile::NamedTempFile, web::Data<AppState>) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FIR_CSV.as_bytes()).unwrap();

        let config = AppConfig {
            fir_data_path: file.path().to_path_buf(),
            ..AppConfig::default()
        };
        (file, web::Data::new(AppState::new(config)))
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(App::new().app_data($state.clone()).configure(configure_routes))
                .await
        };
    }

    fn bearer(state: &AppState, user: &str) -> (header::HeaderName, String) {
        let token = state.auth.issue_token(user, "admin").unwrap();
        (header::AUTHORIZATION, format!("Bearer {token}"))
    }

    #[actix_web::test]
    async fn root_reports_running() {
        let (_file, state) = fixture();
        let app = app!(state);
        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"status": "running"}));
    }

    #[actix_web::test]
    async fn login_then_query_chain_snatching() {
        let (_file, state) = fixture();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({"username": "admin", "password": "password123"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["token_type"], "bearer");
        let token = body["access_token"].as_str().unwrap().to_owned();

        let req = test::TestRequest::get()
            .uri("/chain-snatching")
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["total"], 2);
        assert_eq!(body["limit"], 100);
        assert_eq!(body["offset"], 0);
        assert_eq!(body["results"][0]["area"], "Downtown");
        assert_eq!(body["results"][0]["lat"], 12.9716);
        assert_eq!(body["results"][1]["area"], "Northside");
    }

    #[actix_web::test]
    async fn login_failures_use_detail_envelope() {
        let (_file, state) = fixture();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({"username": "admin"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({"success": false, "detail": "Username and password required"})
        );

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({"username": "admin", "password": "nope"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn chain_snatching_requires_a_valid_bearer() {
        let (_file, state) = fixture();
        let app = app!(state);

        let req = test::TestRequest::get().uri("/chain-snatching").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["detail"], "Not authenticated");

        let req = test::TestRequest::get()
            .uri("/chain-snatching")
            .insert_header((header::AUTHORIZATION, "Bearer not-a-jwt"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["detail"], "Invalid token");

        let req = test::TestRequest::get()
            .uri("/chain-snatching")
            .insert_header(bearer(&state, "ghost"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["detail"], "Invalid credentials");
    }

    #[actix_web::test]
    async fn chain_snatching_rejects_bad_dates_and_bad_query() {
        let (_file, state) = fixture();
        let app = app!(state);

        let req = test::TestRequest::get()
            .uri("/chain-snatching?start_date=2024/01/01")
            .insert_header(bearer(&state, "admin"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["detail"], "Invalid start_date format. Use YYYY-MM-DD");

        let req = test::TestRequest::get()
            .uri("/chain-snatching?limit=many")
            .insert_header(bearer(&state, "admin"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn chain_snatching_filters_and_paginates() {
        let (_file, state) = fixture();
        let app = app!(state);

        let req = test::TestRequest::get()
            .uri("/chain-snatching?area=northside&limit=1")
            .insert_header(bearer(&state, "officer"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["limit"], 1);
        assert_eq!(body["results"][0]["area"], "Northside");

        let req = test::TestRequest::get()
            .uri("/chain-snatching?offset=5")
            .insert_header(bearer(&state, "officer"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["results"], json!([]));
    }

    #[actix_web::test]
    async fn reports_cover_total_breakdown_and_summary() {
        let (file, state) = fixture();
        let app = app!(state);

        let req = test::TestRequest::get().uri("/api/crimes/total").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["total_crimes"], 3);
        assert_eq!(
            body["file"],
            file.path().file_name().unwrap().to_string_lossy().as_ref()
        );

        let req = test::TestRequest::get()
            .uri("/api/crimes/breakdown?group_by=year")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["group_by"], "year");
        assert_eq!(
            body["breakdown"],
            json!([{"year": 2023, "count": 1}, {"year": 2024, "count": 2}])
        );

        let req = test::TestRequest::get()
            .uri("/api/crimes/summary?group_by=place")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body,
            json!({"success": true, "data": [
                {"label": "Market", "value": 2},
                {"label": "Station", "value": 1}
            ]})
        );

        let req = test::TestRequest::get()
            .uri("/api/crimes/summary?group_by=weekday")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"], json!([]));
    }

    #[actix_web::test]
    async fn breakdown_rejects_unknown_grouping() {
        let (_file, state) = fixture();
        let app = app!(state);
        let req = test::TestRequest::get()
            .uri("/api/crimes/breakdown?group_by=weekday")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn missing_report_file_is_not_found() {
        let state = web::Data::new(AppState::new(AppConfig {
            crime_csv_path: Some("does/not/exist.csv".into()),
            ..AppConfig::default()
        }));
        let app = app!(state);
        let req = test::TestRequest::get().uri("/api/crimes/total").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["detail"], "File not found: does/not/exist.csv");
    }
}
