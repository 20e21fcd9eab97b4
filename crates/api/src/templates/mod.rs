pub mod layouts;
pub mod pages;

pub use layouts::PageConfig;
pub use pages::{home_page, ROUTES};
