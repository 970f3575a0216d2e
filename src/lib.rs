pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod model;
pub mod resolver;
pub mod storage;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
