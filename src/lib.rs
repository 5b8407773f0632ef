// src/lib.rs

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod routes;
pub mod screens;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod utils;

// Handles most callers need
pub use api::{ApiClient, ApiRequest, ApiResponse};
pub use error::AppError;
pub use state::ClientState;
