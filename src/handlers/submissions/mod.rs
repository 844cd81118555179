//! Submission handlers

mod handler;
pub mod request;

pub use handler::*;
pub use request::*;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Submission routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handler::create_submission))
        .route("/my", get(handler::list_my_submissions))
        .route("/my/stream", get(handler::stream_my_submissions))
        .route("/{id}", get(handler::get_submission))
}
