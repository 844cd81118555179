//! Contest handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Contest routes
pub fn routes() -> Router<AppState> {
    Router::new()
        // Contest management
        .route("/", get(handler::list_contests).post(handler::create_contest))
        .route(
            "/{id}",
            get(handler::get_contest)
                .put(handler::update_contest)
                .delete(handler::delete_contest),
        )
        .route("/{id}/register", post(handler::register_for_contest))
        // Problems
        .route(
            "/{id}/problems",
            get(handler::list_contest_problems).post(handler::add_problem_to_contest),
        )
        .route(
            "/{id}/problems/{problem_id}",
            get(handler::get_contest_problem)
                .put(handler::update_contest_problem)
                .delete(handler::delete_contest_problem),
        )
        // Standings
        .route("/{id}/standings", get(handler::get_standings))
        .route("/{id}/standings/stream", get(handler::stream_standings))
        // Submissions
        .route("/{id}/submissions", get(handler::list_contest_submissions))
        .route("/{id}/submissions/stream", get(handler::stream_contest_submissions))
        .route("/{id}/submissions/my", get(handler::list_my_contest_submissions))
        .route("/{id}/submissions/my/stream", get(handler::stream_my_contest_submissions))
}
