use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{AppState, Error, ErrorBody, TemperatureRange, TemperatureRangeRequest};

#[utoipa::path(
    get,
    path = "/api/v1.0/precipitation",
    responses(
        (status = OK, description = "Precipitation by date for the 12 months before the most recent measurement", content_type = "application/json", body = BTreeMap<String, Option<f64>>),
        (status = NOT_FOUND, description = "No measurements stored", body = ErrorBody),
        (status = SERVICE_UNAVAILABLE, description = "Observations store could not be queried", body = ErrorBody)
    ))]
pub async fn precipitation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BTreeMap<String, Option<f64>>>, Error> {
    let precipitation = state.climate_db.precipitation().await?;
    Ok(Json(precipitation))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/stations",
    responses(
        (status = OK, description = "Every station id", content_type = "application/json", body = Vec<String>),
        (status = SERVICE_UNAVAILABLE, description = "Observations store could not be queried", body = ErrorBody)
    ))]
pub async fn stations(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, Error> {
    let stations = state.climate_db.stations().await?;
    Ok(Json(stations))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/tobs",
    responses(
        (status = OK, description = "Temperature observations by date for the most active station over the last 12 months of data", content_type = "application/json", body = BTreeMap<String, f64>),
        (status = NOT_FOUND, description = "No measurements stored", body = ErrorBody),
        (status = SERVICE_UNAVAILABLE, description = "Observations store could not be queried", body = ErrorBody)
    ))]
pub async fn tobs(State(state): State<Arc<AppState>>) -> Result<Json<BTreeMap<String, f64>>, Error> {
    let tobs = state.climate_db.tobs().await?;
    Ok(Json(tobs))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start}",
    params(
         ("start" = String, Path, description = "First date to include, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "Temperature summary from start onward", content_type = "application/json", body = TemperatureRange),
        (status = BAD_REQUEST, description = "Start is not a YYYY-MM-DD date", body = ErrorBody),
        (status = NOT_FOUND, description = "No measurements in the requested span", body = ErrorBody),
        (status = SERVICE_UNAVAILABLE, description = "Observations store could not be queried", body = ErrorBody)
    ))]
pub async fn temperature_from(
    State(state): State<Arc<AppState>>,
    Path(start): Path<String>,
) -> Result<Json<TemperatureRange>, Error> {
    let req = TemperatureRangeRequest::new(start, None);
    let range = state.climate_db.temperature_range(&req).await?;
    Ok(Json(range))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start}/{end}",
    params(
         ("start" = String, Path, description = "First date to include, YYYY-MM-DD"),
         ("end" = String, Path, description = "Last date to include, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "Temperature summary between start and end inclusive", content_type = "application/json", body = TemperatureRange),
        (status = BAD_REQUEST, description = "Start or end is not a YYYY-MM-DD date", body = ErrorBody),
        (status = NOT_FOUND, description = "No measurements in the requested span", body = ErrorBody),
        (status = SERVICE_UNAVAILABLE, description = "Observations store could not be queried", body = ErrorBody)
    ))]
pub async fn temperature_between(
    State(state): State<Arc<AppState>>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<TemperatureRange>, Error> {
    let req = TemperatureRangeRequest::new(start, Some(end));
    let range = state.climate_db.temperature_range(&req).await?;
    Ok(Json(range))
}
