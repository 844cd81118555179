//! HTTP Request Handlers
//!
//! This module contains all HTTP request handlers organized by domain.

pub mod admin;
pub mod contests;
pub mod health;
pub mod submissions;

use axum::{middleware, Router};

use crate::{middleware::auth::auth_middleware, state::AppState};

/// Create all API routes
///
/// Everything except the health checks requires a verified token.
pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .nest("/submissions", submissions::routes())
        .nest("/contests", contests::routes())
        .nest("/admin", admin::routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new().merge(health::routes()).merge(protected)
}
