#![doc = "The `taskflow` library crate."]
#![doc = ""]
#![doc = "Domain models, the token codec and request authenticator, storage backends,"]
#![doc = "routing configuration and error handling for the TaskFlow service."]
#![doc = "The binary (`main.rs`) wires these together into an `HttpServer`."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;
