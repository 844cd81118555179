//! Submission repository

use sqlx::PgPool;

use crate::{
    error::AppResult,
    judge::{JudgeStatus, Verdict},
    models::{NewSubmission, Submission, SubmissionFilter, SubmissionView, SubmissionWindow},
};

/// Repository for submission database operations
pub struct SubmissionRepository;

impl SubmissionRepository {
    /// Create a new pending submission
    pub async fn create(pool: &PgPool, submission: &NewSubmission) -> AppResult<Submission> {
        let submission = sqlx::query_as::<_, Submission>(
            r#"
            INSERT INTO submissions (user_id, problem_id, contest_id, language, source_code, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(submission.user_id)
        .bind(submission.problem_id)
        .bind(submission.contest_id)
        .bind(&submission.language)
        .bind(&submission.source_code)
        .bind(JudgeStatus::Pending.as_str())
        .fetch_one(pool)
        .await?;

        Ok(submission)
    }

    /// Find submission by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> AppResult<Option<Submission>> {
        let submission =
            sqlx::query_as::<_, Submission>(r#"SELECT * FROM submissions WHERE id = $1"#)
                .bind(id)
                .fetch_optional(pool)
                .await?;

        Ok(submission)
    }

    /// Whether any submission targets the given problem
    pub async fn exists_for_problem(pool: &PgPool, problem_id: i64) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS (SELECT 1 FROM submissions WHERE problem_id = $1)"#,
        )
        .bind(problem_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Whether any submission belongs to the given contest
    pub async fn exists_for_contest(pool: &PgPool, contest_id: i64) -> AppResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS (SELECT 1 FROM submissions WHERE contest_id = $1)"#,
        )
        .bind(contest_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Write status and message, only while the submission is still pending
    ///
    /// Returns `false` when the row was already terminal (or missing).
    pub async fn record_verdict(pool: &PgPool, id: i64, verdict: &Verdict) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE submissions
            SET status = $2, message = $3
            WHERE id = $1 AND status = $4
            "#,
        )
        .bind(id)
        .bind(verdict.status.as_str())
        .bind(&verdict.message)
        .bind(JudgeStatus::Pending.as_str())
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Submissions for the given problems inside `window`, oldest first
    pub async fn list_in_window(
        pool: &PgPool,
        problem_ids: &[i64],
        window: SubmissionWindow,
    ) -> AppResult<Vec<Submission>> {
        let submissions = sqlx::query_as::<_, Submission>(
            r#"
            SELECT * FROM submissions
            WHERE problem_id = ANY($1)
                AND ($2::timestamptz IS NULL OR created_at >= $2)
                AND ($3::timestamptz IS NULL OR created_at <= $3)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(problem_ids)
        .bind(window.start)
        .bind(window.end)
        .fetch_all(pool)
        .await?;

        Ok(submissions)
    }

    /// Submissions joined with user name and problem title, newest first
    pub async fn list_views(pool: &PgPool, filter: SubmissionFilter) -> AppResult<Vec<SubmissionView>> {
        let views = sqlx::query_as::<_, SubmissionView>(
            r#"
            SELECT
                s.id, s.user_id, u.name AS user_name, s.problem_id,
                p.title AS problem_title, s.language, s.source_code,
                s.status, s.message, s.created_at
            FROM submissions s
            INNER JOIN users u ON u.id = s.user_id
            INNER JOIN problems p ON p.id = s.problem_id
            WHERE
                ($1::bigint IS NULL OR s.user_id = $1)
                AND ($2::bigint IS NULL OR s.contest_id = $2)
            ORDER BY s.id DESC
            LIMIT $3
            "#,
        )
        .bind(filter.user_id)
        .bind(filter.contest_id)
        .bind(filter.limit)
        .fetch_all(pool)
        .await?;

        Ok(views)
    }
}
