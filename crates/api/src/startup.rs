use crate::{
    db, index_handler, precipitation, routes, stations, temperature_between, temperature_from,
    tobs, ClimateAccess, ClimateData, Database, DatabaseOptions,
};
use anyhow::{anyhow, Context};
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Router,
};
use climate_api_core::is_file;
use hyper::{
    header::{ACCEPT, CONTENT_TYPE},
    Method,
};
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

#[derive(Clone)]
pub struct AppState {
    pub remote_url: String,
    pub climate_db: Arc<dyn ClimateData>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::climate::climate_routes::precipitation,
        routes::climate::climate_routes::stations,
        routes::climate::climate_routes::tobs,
        routes::climate::climate_routes::temperature_from,
        routes::climate::climate_routes::temperature_between,
    ),
    components(
        schemas(
                db::TemperatureRange,
                db::ErrorBody,
        )
    ),
    tags(
        (name = "climate api", description = "a read-only RESTful api over station precipitation and temperature observations")
    )
)]
struct ApiDoc;

/// Open the observations store and wire up the aggregation layer.
///
/// Fails if the database file is missing; the store is never created here.
pub async fn build_app_state(
    remote_url: String,
    database_path: String,
    options: DatabaseOptions,
) -> Result<AppState, anyhow::Error> {
    if !is_file(&database_path) {
        return Err(anyhow!(
            "observations database not found at: {}",
            database_path
        ));
    }

    let db = Database::new(&database_path, options)
        .await
        .map_err(|e| anyhow!("error setting up SQLite database: {}", e))?;
    db.health_check()
        .await
        .context("observations database failed its health check")?;

    let climate_db = Arc::new(ClimateAccess::new(Arc::new(db)));

    Ok(AppState {
        remote_url,
        climate_db,
    })
}

pub fn app(app_state: AppState) -> Router {
    let api_docs = ApiDoc::openapi();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        .route("/", get(index_handler))
        // API routes, static segments win over the {start} capture
        .route("/api/v1.0/precipitation", get(precipitation))
        .route("/api/v1.0/stations", get(stations))
        .route("/api/v1.0/tobs", get(tobs))
        .route("/api/v1.0/{start}", get(temperature_from))
        .route("/api/v1.0/{start}/{end}", get(temperature_between))
        .with_state(Arc::new(app_state))
        .layer(middleware::from_fn(log_request))
        .merge(Scalar::with_url("/docs", api_docs))
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default()
        .to_owned();
    info!(target: "http_request","new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, code: {}, path: {}, time: {}", response.status().as_str(), path, response_time);

    response
}
