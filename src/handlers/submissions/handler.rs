//! Submission handler implementations

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, Sse},
    Json,
};
use futures::Stream;
use validator::Validate;

use crate::{
    error::AppResult,
    middleware::auth::AuthenticatedUser,
    models::{Submission, SubmissionView},
    realtime::{sse, Topic},
    state::AppState,
};

use super::request::CreateSubmissionRequest;

/// Create a new submission
///
/// Responds as soon as the pending row exists; the verdict arrives later on
/// the submission streams.
pub async fn create_submission(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<CreateSubmissionRequest>,
) -> AppResult<(StatusCode, Json<Submission>)> {
    payload.validate()?;

    let submission = state.submissions().submit(auth_user.id, payload.into()).await?;

    Ok((StatusCode::ACCEPTED, Json(submission)))
}

/// List the caller's submissions
pub async fn list_my_submissions(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> AppResult<Json<Vec<SubmissionView>>> {
    let submissions = state.submissions().list_user_submissions(auth_user.id).await?;
    Ok(Json(submissions))
}

/// Stream the caller's submission list, refreshed on every change
pub async fn stream_my_submissions(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let user_id = auth_user.id;
    let subscription = state.broker().subscribe(Topic::UserSubmissions { user_id });
    let service = state.submissions().clone();

    sse::into_sse(sse::snapshot_stream(subscription, move || {
        let service = service.clone();
        async move { service.list_user_submissions(user_id).await }
    }))
}

/// Get a specific submission
pub async fn get_submission(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Submission>> {
    let submission = state
        .submissions()
        .get_submission(id, auth_user.id, auth_user.is_admin())
        .await?;
    Ok(Json(submission))
}
