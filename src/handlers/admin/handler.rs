//! Admin handler implementations

use axum::{extract::State, Json};

use crate::{
    error::AppResult, middleware::auth::AuthenticatedUser, services::DeadLetter, state::AppState,
};

/// Judging tasks that failed outside the judging pipeline, newest first
pub async fn list_dead_letters(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> AppResult<Json<Vec<DeadLetter>>> {
    auth_user.require_admin()?;
    Ok(Json(state.submissions().dead_letters()))
}
