//! HTTP API over the aggregator.
//!
//! This module provides:
//! - Configuration types and loading (`config`)
//! - The axum router (`routes`) and its handlers (`handlers`)
//! - The `{success, data, error}` response envelope and error mapping (`error`)

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::{ApiResponse, HttpError};
pub use routes::create_router;
pub use state::AppState;
