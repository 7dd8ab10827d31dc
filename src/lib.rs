// Library exports for Snapfeed
// This allows integration tests to drive the router directly

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod feed;
pub mod labeling;
pub mod routes;
pub mod state;
pub mod storage;
