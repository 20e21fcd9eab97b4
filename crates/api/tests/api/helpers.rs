use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use climate_api::{
    app, AppState, ClimateAccess, ClimateData, Database, DatabaseOptions, Error,
    TemperatureRange, TemperatureRangeRequest,
};
use hyper::{header, Method};
use mockall::mock;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::{collections::BTreeMap, str::FromStr, sync::Arc};
use tempfile::TempDir;
use tower::ServiceExt;

mock! {
    pub ClimateAccess {}
    #[async_trait]
    impl ClimateData for ClimateAccess {
        async fn window_start(&self) -> Result<String, Error>;
        async fn precipitation(&self) -> Result<BTreeMap<String, Option<f64>>, Error>;
        async fn stations(&self) -> Result<Vec<String>, Error>;
        async fn most_active_station(&self) -> Result<String, Error>;
        async fn tobs(&self) -> Result<BTreeMap<String, f64>, Error>;
        async fn temperature_range(
            &self,
            req: &TemperatureRangeRequest,
        ) -> Result<TemperatureRange, Error>;
    }
}

pub struct TestApp {
    pub app: Router,
}

pub fn spawn_app(climate_db: Arc<dyn ClimateData>) -> TestApp {
    let app_state = AppState {
        remote_url: String::from("http://127.0.0.1:5000"),
        climate_db,
    };

    TestApp {
        app: app(app_state),
    }
}

impl TestApp {
    /// Send a GET and return the status with the raw body bytes
    pub async fn get(&self, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(header::ACCEPT, "application/json")
            .body(Body::empty())
            .unwrap();

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request.");

        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = self.get(uri).await;
        let json = serde_json::from_slice(&body).expect("response body is not JSON");
        (status, json)
    }
}

/// One `measurement` row: (station, date, prcp, tobs)
pub type MeasurementRow<'a> = (&'a str, &'a str, Option<f64>, f64);

/// A throwaway SQLite observations database on disk
pub struct TestStore {
    _dir: TempDir,
    pub path: String,
}

impl TestStore {
    pub async fn new(measurements: &[MeasurementRow<'_>], stations: &[&str]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir
            .path()
            .join("hawaii.sqlite")
            .to_str()
            .unwrap()
            .to_owned();

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))
            .unwrap()
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();

        sqlx::query(
            "CREATE TABLE measurement (
                id INTEGER PRIMARY KEY,
                station TEXT,
                date TEXT,
                prcp FLOAT,
                tobs FLOAT
            )",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "CREATE TABLE station (
                id INTEGER PRIMARY KEY,
                station TEXT,
                name TEXT,
                latitude FLOAT,
                longitude FLOAT,
                elevation FLOAT
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        for (station, date, prcp, tobs) in measurements {
            sqlx::query("INSERT INTO measurement (station, date, prcp, tobs) VALUES (?, ?, ?, ?)")
                .bind(*station)
                .bind(*date)
                .bind(*prcp)
                .bind(*tobs)
                .execute(&pool)
                .await
                .unwrap();
        }

        for station in stations {
            sqlx::query(
                "INSERT INTO station (station, name, latitude, longitude, elevation)
                 VALUES (?, ?, 21.3, -157.8, 3.0)",
            )
            .bind(*station)
            .bind(format!("{} station, HI US", station))
            .execute(&pool)
            .await
            .unwrap();
        }

        pool.close().await;

        Self { _dir: dir, path }
    }

    pub async fn open(&self, options: DatabaseOptions) -> Database {
        Database::new(&self.path, options).await.unwrap()
    }

    pub async fn climate_access(&self) -> ClimateAccess {
        ClimateAccess::new(Arc::new(self.open(DatabaseOptions::default()).await))
    }

    pub async fn spawn_app(&self) -> TestApp {
        spawn_app(Arc::new(self.climate_access().await))
    }
}

/// Two readings from one station, a day apart
pub fn two_day_sample() -> Vec<MeasurementRow<'static>> {
    vec![
        ("A", "2017-08-22", Some(0.1), 80.0),
        ("A", "2017-08-23", Some(0.0), 82.0),
    ]
}

/// Three stations over two years; USC00519281 reports most often
pub fn hawaii_sample() -> Vec<MeasurementRow<'static>> {
    vec![
        ("USC00519397", "2016-08-22", Some(0.40), 75.0),
        ("USC00519281", "2016-08-22", Some(1.80), 74.0),
        ("USC00519397", "2016-08-23", Some(0.00), 81.0),
        ("USC00519281", "2016-08-23", Some(1.79), 77.0),
        ("USC00513117", "2016-08-23", Some(0.15), 76.0),
        ("USC00519281", "2017-01-10", None, 65.0),
        ("USC00513117", "2017-01-10", Some(0.02), 66.0),
        ("USC00519281", "2017-08-18", Some(0.06), 79.0),
        ("USC00519397", "2017-08-23", Some(0.00), 81.0),
        ("USC00519281", "2017-08-23", Some(0.45), 82.0),
        ("USC00513117", "2015-06-01", Some(0.03), 70.0),
    ]
}

pub const HAWAII_STATIONS: &[&str] = &["USC00519397", "USC00513117", "USC00519281"];
