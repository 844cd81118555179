//! Persistence port
//!
//! Services talk to storage only through [`Store`], so the judging and
//! standings logic can run against PostgreSQL in production and an
//! in-memory store in tests.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::AppResult,
    judge::Verdict,
    models::{
        Contest, NewContest, NewProblem, NewSubmission, Problem, ProblemUpdate, Submission,
        SubmissionFilter, SubmissionView, SubmissionWindow, User,
    },
};

use super::repositories::{
    ContestRepository, ProblemRepository, SubmissionRepository, UserRepository,
};

/// Record store used by the services
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap connectivity check for `/health/ready`
    async fn ping(&self) -> AppResult<()>;

    async fn find_user(&self, id: i64) -> AppResult<Option<User>>;

    /// Every user, ordered by ID
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Registered participants of a contest, ordered by ID
    async fn list_contest_participants(&self, contest_id: i64) -> AppResult<Vec<User>>;

    async fn add_contest_participant(&self, contest_id: i64, user_id: i64) -> AppResult<()>;

    async fn find_contest(&self, id: i64) -> AppResult<Option<Contest>>;

    /// Every contest, latest start first
    async fn list_contests(&self) -> AppResult<Vec<Contest>>;

    async fn create_contest(&self, contest: NewContest) -> AppResult<Contest>;

    /// Replace title, start time and duration; `None` if the contest is missing
    async fn update_contest(&self, id: i64, contest: NewContest) -> AppResult<Option<Contest>>;

    /// Remove a contest with its problems and registrations; `false` if missing
    async fn delete_contest(&self, id: i64) -> AppResult<bool>;

    async fn find_problem(&self, id: i64) -> AppResult<Option<Problem>>;

    /// A contest's problems, ordered by ID
    async fn list_contest_problems(&self, contest_id: i64) -> AppResult<Vec<Problem>>;

    /// Fails with `AlreadyExists` when the number is taken in the contest
    async fn create_problem(&self, problem: NewProblem) -> AppResult<Problem>;

    /// Apply the set fields; `None` if the problem is missing
    async fn update_problem(&self, id: i64, update: ProblemUpdate) -> AppResult<Option<Problem>>;

    /// `false` if the problem is missing
    async fn delete_problem(&self, id: i64) -> AppResult<bool>;

    async fn problem_has_submissions(&self, problem_id: i64) -> AppResult<bool>;

    async fn contest_has_submissions(&self, contest_id: i64) -> AppResult<bool>;

    /// Persist a new submission with status `pending`
    async fn create_submission(&self, submission: NewSubmission) -> AppResult<Submission>;

    async fn find_submission(&self, id: i64) -> AppResult<Option<Submission>>;

    /// Conditional update of status and message; `false` if no longer pending
    async fn record_verdict(&self, id: i64, verdict: &Verdict) -> AppResult<bool>;

    /// Submissions for `problem_ids` inside `window`, ordered by
    /// `created_at` then ID, both ascending
    async fn list_window_submissions(
        &self,
        problem_ids: &[i64],
        window: SubmissionWindow,
    ) -> AppResult<Vec<Submission>>;

    /// Joined submission rows, newest first
    async fn list_submission_views(
        &self,
        filter: SubmissionFilter,
    ) -> AppResult<Vec<SubmissionView>>;
}

/// [`Store`] backed by PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> AppResult<()> {
        super::connection::ping(&self.pool).await?;
        Ok(())
    }

    async fn find_user(&self, id: i64) -> AppResult<Option<User>> {
        UserRepository::find_by_id(&self.pool, id).await
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        UserRepository::list_all(&self.pool).await
    }

    async fn list_contest_participants(&self, contest_id: i64) -> AppResult<Vec<User>> {
        UserRepository::list_contest_participants(&self.pool, contest_id).await
    }

    async fn add_contest_participant(&self, contest_id: i64, user_id: i64) -> AppResult<()> {
        ContestRepository::add_participant(&self.pool, contest_id, user_id).await
    }

    async fn find_contest(&self, id: i64) -> AppResult<Option<Contest>> {
        ContestRepository::find_by_id(&self.pool, id).await
    }

    async fn list_contests(&self) -> AppResult<Vec<Contest>> {
        ContestRepository::list_all(&self.pool).await
    }

    async fn create_contest(&self, contest: NewContest) -> AppResult<Contest> {
        ContestRepository::create(&self.pool, &contest).await
    }

    async fn update_contest(&self, id: i64, contest: NewContest) -> AppResult<Option<Contest>> {
        ContestRepository::update(&self.pool, id, &contest).await
    }

    async fn delete_contest(&self, id: i64) -> AppResult<bool> {
        ContestRepository::delete(&self.pool, id).await
    }

    async fn find_problem(&self, id: i64) -> AppResult<Option<Problem>> {
        ProblemRepository::find_by_id(&self.pool, id).await
    }

    async fn list_contest_problems(&self, contest_id: i64) -> AppResult<Vec<Problem>> {
        ProblemRepository::list_by_contest(&self.pool, contest_id).await
    }

    async fn create_problem(&self, problem: NewProblem) -> AppResult<Problem> {
        ProblemRepository::create(&self.pool, &problem).await
    }

    async fn update_problem(&self, id: i64, update: ProblemUpdate) -> AppResult<Option<Problem>> {
        ProblemRepository::update(&self.pool, id, &update).await
    }

    async fn delete_problem(&self, id: i64) -> AppResult<bool> {
        ProblemRepository::delete(&self.pool, id).await
    }

    async fn problem_has_submissions(&self, problem_id: i64) -> AppResult<bool> {
        SubmissionRepository::exists_for_problem(&self.pool, problem_id).await
    }

    async fn contest_has_submissions(&self, contest_id: i64) -> AppResult<bool> {
        SubmissionRepository::exists_for_contest(&self.pool, contest_id).await
    }

    async fn create_submission(&self, submission: NewSubmission) -> AppResult<Submission> {
        SubmissionRepository::create(&self.pool, &submission).await
    }

    async fn find_submission(&self, id: i64) -> AppResult<Option<Submission>> {
        SubmissionRepository::find_by_id(&self.pool, id).await
    }

    async fn record_verdict(&self, id: i64, verdict: &Verdict) -> AppResult<bool> {
        SubmissionRepository::record_verdict(&self.pool, id, verdict).await
    }

    async fn list_window_submissions(
        &self,
        problem_ids: &[i64],
        window: SubmissionWindow,
    ) -> AppResult<Vec<Submission>> {
        SubmissionRepository::list_in_window(&self.pool, problem_ids, window).await
    }

    async fn list_submission_views(
        &self,
        filter: SubmissionFilter,
    ) -> AppResult<Vec<SubmissionView>> {
        SubmissionRepository::list_views(&self.pool, filter).await
    }
}
