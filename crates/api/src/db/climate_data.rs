use crate::{Database, Measurement, Station, TemperatureRange};
use async_trait::async_trait;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqliteConnection};
use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};
use time::{macros::format_description, Date, Duration};
use utoipa::ToSchema;

/// Length of the trailing window used by the precipitation and tobs series.
/// Fixed day count, leap years are not special-cased.
pub const WINDOW_DAYS: i64 = 365;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("No measurements available: {0}")]
    NoData(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("No measurements match {0}")]
    NoMatchingData(String),
    #[error("Failed to query observations store: {0}")]
    StoreUnavailable(#[from] sqlx::Error),
}

impl Error {
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NoData(_) => "NoDataError",
            Error::InvalidDate(_) => "InvalidDateError",
            Error::NoMatchingData(_) => "NoMatchingDataError",
            Error::StoreUnavailable(_) => "StoreUnavailableError",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NoData(_) | Error::NoMatchingData(_) => StatusCode::NOT_FOUND,
            Error::InvalidDate(_) => StatusCode::BAD_REQUEST,
            Error::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// JSON body returned for every failed request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Error kind, e.g. `NoDataError`
    pub error: String,
    pub message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("request failed: {}", self);
        } else {
            warn!("request rejected: {}", self);
        }
        let body = ErrorBody {
            error: self.kind().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Date span for the temperature summary, straight from the request path
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TemperatureRangeRequest {
    pub start: String,
    pub end: Option<String>,
}

impl TemperatureRangeRequest {
    pub fn new(start: impl Into<String>, end: Option<String>) -> Self {
        Self {
            start: start.into(),
            end,
        }
    }

    /// Parse both bounds, failing on the first one that is not a calendar date.
    pub fn dates(&self) -> Result<(Date, Option<Date>), Error> {
        let start = parse_date(&self.start)?;
        let end = self.end.as_deref().map(parse_date).transpose()?;
        Ok((start, end))
    }
}

/// Parse a strict, zero-padded `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<Date, Error> {
    Date::parse(value, format_description!("[year]-[month]-[day]")).map_err(|e| {
        Error::InvalidDate(format!("'{}' is not a YYYY-MM-DD date ({})", value, e))
    })
}

/// First date of the trailing window ending at `most_recent`.
pub fn window_start(most_recent: &str) -> Result<String, Error> {
    let most_recent = parse_date(most_recent)?;
    let start = most_recent
        .checked_sub(Duration::days(WINDOW_DAYS))
        .ok_or_else(|| {
            Error::InvalidDate(format!(
                "{} minus {} days is out of range",
                most_recent, WINDOW_DAYS
            ))
        })?;
    // Date's Display is zero-padded YYYY-MM-DD, matching the stored format
    Ok(start.to_string())
}

#[async_trait]
pub trait ClimateData: Sync + Send {
    /// `MAX(date) - 365 days` over all measurements
    async fn window_start(&self) -> Result<String, Error>;
    /// Date to precipitation over the trailing window. One value survives per date.
    async fn precipitation(&self) -> Result<BTreeMap<String, Option<f64>>, Error>;
    /// Every distinct station id, in store order
    async fn stations(&self) -> Result<Vec<String>, Error>;
    /// Station with the most measurements. Ties are decided by the store.
    async fn most_active_station(&self) -> Result<String, Error>;
    /// Date to temperature for the most active station over the trailing window
    async fn tobs(&self) -> Result<BTreeMap<String, f64>, Error>;
    async fn temperature_range(
        &self,
        req: &TemperatureRangeRequest,
    ) -> Result<TemperatureRange, Error>;
}

pub struct ClimateAccess {
    db: Arc<Database>,
}

impl ClimateAccess {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

async fn latest_window_start(conn: &mut SqliteConnection) -> Result<String, Error> {
    let most_recent: Option<String> = sqlx::query_scalar("SELECT MAX(date) FROM measurement")
        .fetch_one(&mut *conn)
        .await?;
    let most_recent = most_recent
        .ok_or_else(|| Error::NoData(String::from("measurement table is empty")))?;
    let start = window_start(&most_recent)?;
    debug!("most recent date: {}, window start: {}", most_recent, start);
    Ok(start)
}

async fn most_active(conn: &mut SqliteConnection) -> Result<String, Error> {
    let row: Option<(String, i64)> = sqlx::query_as(
        "SELECT station, COUNT(station) AS readings
         FROM measurement
         GROUP BY station
         ORDER BY readings DESC
         LIMIT 1",
    )
    .fetch_optional(&mut *conn)
    .await?;

    let (station, readings) =
        row.ok_or_else(|| Error::NoData(String::from("measurement table is empty")))?;
    debug!("most active station: {} ({} readings)", station, readings);
    Ok(station)
}

#[async_trait]
impl ClimateData for ClimateAccess {
    async fn window_start(&self) -> Result<String, Error> {
        let mut conn = self.db.acquire().await?;
        latest_window_start(&mut conn).await
    }

    async fn precipitation(&self) -> Result<BTreeMap<String, Option<f64>>, Error> {
        let mut conn = self.db.acquire().await?;
        let start = latest_window_start(&mut conn).await?;

        let rows: Vec<Measurement> = sqlx::query_as(
            "SELECT id, station, date, prcp, tobs
             FROM measurement
             WHERE date >= ?
             ORDER BY id",
        )
        .bind(&start)
        .fetch_all(&mut *conn)
        .await?;
        debug!("precipitation rows since {}: {}", start, rows.len());

        // Keyed by date only: a later row for the same date replaces the earlier one
        Ok(rows.into_iter().map(|m| (m.date, m.prcp)).collect())
    }

    async fn stations(&self) -> Result<Vec<String>, Error> {
        let mut conn = self.db.acquire().await?;
        let rows: Vec<Station> = sqlx::query_as(
            "SELECT id, station, name, latitude, longitude, elevation
             FROM station
             ORDER BY id",
        )
        .fetch_all(&mut *conn)
        .await?;

        // First occurrence wins so store order is kept
        let mut seen = HashSet::new();
        Ok(rows
            .into_iter()
            .map(|s| s.station)
            .filter(|station| seen.insert(station.clone()))
            .collect())
    }

    async fn most_active_station(&self) -> Result<String, Error> {
        let mut conn = self.db.acquire().await?;
        most_active(&mut conn).await
    }

    async fn tobs(&self) -> Result<BTreeMap<String, f64>, Error> {
        let mut conn = self.db.acquire().await?;
        let station = most_active(&mut conn).await?;
        let start = latest_window_start(&mut conn).await?;

        let rows: Vec<Measurement> = sqlx::query_as(
            "SELECT id, station, date, prcp, tobs
             FROM measurement
             WHERE station = ? AND date >= ?
             ORDER BY id",
        )
        .bind(&station)
        .bind(&start)
        .fetch_all(&mut *conn)
        .await?;
        debug!("tobs rows for {} since {}: {}", station, start, rows.len());

        Ok(rows.into_iter().map(|m| (m.date, m.tobs)).collect())
    }

    async fn temperature_range(
        &self,
        req: &TemperatureRangeRequest,
    ) -> Result<TemperatureRange, Error> {
        let (start, end) = req.dates()?;

        let mut query = String::from(
            "SELECT MIN(tobs) AS tmin, AVG(tobs) AS tavg, MAX(tobs) AS tmax,
                    COUNT(tobs) AS readings
             FROM measurement
             WHERE date >= ?",
        );
        let mut bindings = vec![start.to_string()];
        if let Some(end) = end {
            query.push_str(" AND date <= ?");
            bindings.push(end.to_string());
        }

        let mut conn = self.db.acquire().await?;
        let mut q = sqlx::query(&query);
        for binding in &bindings {
            q = q.bind(binding);
        }
        let row = q.fetch_one(&mut *conn).await?;

        let readings: i64 = row.try_get("readings")?;
        let span = match end {
            Some(end) => format!("dates {} to {}", start, end),
            None => format!("dates from {}", start),
        };
        if readings == 0 {
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM measurement")
                .fetch_one(&mut *conn)
                .await?;
            if total == 0 {
                return Err(Error::NoData(String::from("measurement table is empty")));
            }
            return Err(Error::NoMatchingData(span));
        }

        let tmin: Option<f64> = row.try_get("tmin")?;
        let tavg: Option<f64> = row.try_get("tavg")?;
        let tmax: Option<f64> = row.try_get("tmax")?;
        match (tmin, tavg, tmax) {
            (Some(tmin), Some(tavg), Some(tmax)) => {
                debug!("temperature range over {}: {} readings", span, readings);
                Ok(TemperatureRange { tmin, tavg, tmax })
            }
            _ => Err(Error::NoMatchingData(span)),
        }
    }
}
