// Library for tests to access modules

pub mod aggregation_worker;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod models;
pub mod routes;
pub mod schedule;
pub mod store;

/// Package version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name (from Cargo.toml).
pub const NAME: &str = env!("CARGO_PKG_NAME");
