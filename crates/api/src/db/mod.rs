pub mod climate_data;
pub mod models;
pub mod sqlite;

pub use climate_data::*;
pub use models::*;
pub use sqlite::*;
