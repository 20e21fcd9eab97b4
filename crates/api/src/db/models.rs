use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// A single daily reading from one station (`measurement` table).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Measurement {
    pub id: i64,
    pub station: String,
    /// Zero-padded `YYYY-MM-DD`, so string order is chronological order
    pub date: String,
    pub prcp: Option<f64>,
    pub tobs: f64,
}

/// A weather station (`station` table). Only `station` is used by the queries.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Station {
    pub id: i64,
    pub station: String,
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
}

/// Temperature summary over a date span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct TemperatureRange {
    #[serde(rename = "TMIN")]
    pub tmin: f64,
    #[serde(rename = "TAVG")]
    pub tavg: f64,
    #[serde(rename = "TMAX")]
    pub tmax: f64,
}
