//! Contest handler implementations

use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, Sse},
    Json,
};
use futures::Stream;
use validator::Validate;

use crate::{
    error::AppResult,
    middleware::auth::AuthenticatedUser,
    models::{Problem, SubmissionView, UserStanding},
    realtime::{sse, Topic},
    state::AppState,
    utils::now_utc,
};

use super::{
    request::{AddProblemRequest, ContestRequest, ListContestsQuery, UpdateProblemRequest},
    response::{ContestDetailResponse, ContestResponse},
};

/// List contests, latest first
pub async fn list_contests(
    State(state): State<AppState>,
    Query(query): Query<ListContestsQuery>,
) -> AppResult<Json<Vec<ContestResponse>>> {
    let now = now_utc();
    let contests = state.contests().list_contests(query.upcoming, now).await?;

    Ok(Json(
        contests
            .into_iter()
            .map(|contest| ContestResponse::at(contest, now))
            .collect(),
    ))
}

/// Create a new contest
pub async fn create_contest(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<ContestRequest>,
) -> AppResult<(StatusCode, Json<ContestResponse>)> {
    auth_user.require_admin()?;
    payload.validate()?;

    let contest = state.contests().create_contest(payload.into()).await?;

    Ok((StatusCode::CREATED, Json(ContestResponse::at(contest, now_utc()))))
}

/// Get a contest with its problems
pub async fn get_contest(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ContestDetailResponse>> {
    let (contest, problems) = state.contests().get_contest_with_problems(id).await?;

    Ok(Json(ContestDetailResponse {
        contest: ContestResponse::at(contest, now_utc()),
        problems,
    }))
}

/// Update a contest
pub async fn update_contest(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(payload): Json<ContestRequest>,
) -> AppResult<Json<ContestResponse>> {
    auth_user.require_admin()?;
    payload.validate()?;

    let contest = state.contests().update_contest(id, payload.into()).await?;

    Ok(Json(ContestResponse::at(contest, now_utc())))
}

/// Delete a contest that has no submissions
pub async fn delete_contest(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    auth_user.require_admin()?;
    state.contests().delete_contest(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Register the caller for a contest
pub async fn register_for_contest(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.contests().register_participant(id, auth_user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List a contest's problems
pub async fn list_contest_problems(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Problem>>> {
    Ok(Json(state.contests().list_problems(id).await?))
}

/// Add a problem to a contest
pub async fn add_problem_to_contest(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(payload): Json<AddProblemRequest>,
) -> AppResult<(StatusCode, Json<Problem>)> {
    auth_user.require_admin()?;
    payload.validate()?;

    let problem = state
        .contests()
        .add_problem(
            id,
            payload.title,
            payload.statement,
            payload.test_case_path,
            payload.problem_number,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(problem)))
}

/// Get one problem of a contest
pub async fn get_contest_problem(
    State(state): State<AppState>,
    Path((id, problem_id)): Path<(i64, i64)>,
) -> AppResult<Json<Problem>> {
    Ok(Json(state.contests().get_problem(id, problem_id).await?))
}

/// Update a contest problem
pub async fn update_contest_problem(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path((id, problem_id)): Path<(i64, i64)>,
    Json(payload): Json<UpdateProblemRequest>,
) -> AppResult<Json<Problem>> {
    auth_user.require_admin()?;
    payload.validate()?;

    let problem = state
        .contests()
        .update_problem(id, problem_id, payload.into())
        .await?;

    Ok(Json(problem))
}

/// Delete a contest problem that has no submissions
pub async fn delete_contest_problem(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path((id, problem_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    auth_user.require_admin()?;
    state.contests().delete_problem(id, problem_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Current standings
pub async fn get_standings(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<UserStanding>>> {
    Ok(Json(state.standings().compute(id).await?))
}

/// Stream standings, recomputed after every verdict
pub async fn stream_standings(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    state.contests().get_contest(id).await?;

    let subscription = state.broker().subscribe(Topic::Standings { contest_id: id });
    let service = state.standings().clone();

    Ok(sse::into_sse(sse::snapshot_stream(subscription, move || {
        let service = service.clone();
        async move { service.compute(id).await }
    })))
}

/// Latest contest submissions; source is hidden from non-admins
pub async fn list_contest_submissions(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<SubmissionView>>> {
    let submissions = state
        .submissions()
        .list_contest_submissions(id, auth_user.is_admin())
        .await?;
    Ok(Json(submissions))
}

/// Stream latest contest submissions
pub async fn stream_contest_submissions(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    state.contests().get_contest(id).await?;

    let is_admin = auth_user.is_admin();
    let subscription = state.broker().subscribe(Topic::ContestSubmissions { contest_id: id });
    let service = state.submissions().clone();

    Ok(sse::into_sse(sse::snapshot_stream(subscription, move || {
        let service = service.clone();
        async move { service.list_contest_submissions(id, is_admin).await }
    })))
}

/// The caller's submissions in one contest
pub async fn list_my_contest_submissions(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<SubmissionView>>> {
    let submissions = state
        .submissions()
        .list_user_contest_submissions(id, auth_user.id)
        .await?;
    Ok(Json(submissions))
}

/// Stream the caller's submissions in one contest
pub async fn stream_my_contest_submissions(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    state.contests().get_contest(id).await?;

    let user_id = auth_user.id;
    let subscription = state.broker().subscribe(Topic::UserContestSubmissions {
        contest_id: id,
        user_id,
    });
    let service = state.submissions().clone();

    Ok(sse::into_sse(sse::snapshot_stream(subscription, move || {
        let service = service.clone();
        async move { service.list_user_contest_submissions(id, user_id).await }
    })))
}
