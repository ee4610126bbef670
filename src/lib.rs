//! # Turfbook backend library

#[macro_use]
extern crate tracing;

use axum::extract::FromRef;
use deadpool_diesel::postgres::{Object, Pool};

mod config;

pub mod controllers;
pub mod error;
pub mod interval;
pub mod models;
pub mod operator;
pub mod pricing;
pub mod routes;
pub mod schema;
pub mod schemas;
pub mod slots;

pub use config::Config;
pub use error::{BookingError, Error};

pub type DbPool = Pool;
pub type DbConn = Object;

/// Common state of the app
#[derive(Clone)]
pub struct AppState {
	pub config:        Config,
	pub database_pool: DbPool,
}

impl FromRef<AppState> for Config {
	fn from_ref(input: &AppState) -> Self { input.config.clone() }
}

impl FromRef<AppState> for DbPool {
	fn from_ref(input: &AppState) -> Self { input.database_pool.clone() }
}
