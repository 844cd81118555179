//! Contest repository

use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{Contest, NewContest},
};

/// Repository for contest database operations
pub struct ContestRepository;

impl ContestRepository {
    /// Create a new contest
    pub async fn create(pool: &PgPool, contest: &NewContest) -> AppResult<Contest> {
        let contest = sqlx::query_as::<_, Contest>(
            r#"
            INSERT INTO contests (title, start_time, duration_minutes)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&contest.title)
        .bind(contest.start_time)
        .bind(contest.duration_minutes)
        .fetch_one(pool)
        .await?;

        Ok(contest)
    }

    /// Find contest by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> AppResult<Option<Contest>> {
        let contest = sqlx::query_as::<_, Contest>(r#"SELECT * FROM contests WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(contest)
    }

    /// List every contest, latest start first
    pub async fn list_all(pool: &PgPool) -> AppResult<Vec<Contest>> {
        let contests = sqlx::query_as::<_, Contest>(
            r#"SELECT * FROM contests ORDER BY start_time DESC, id DESC"#,
        )
        .fetch_all(pool)
        .await?;

        Ok(contests)
    }

    /// Update contest
    pub async fn update(pool: &PgPool, id: i64, contest: &NewContest) -> AppResult<Option<Contest>> {
        let contest = sqlx::query_as::<_, Contest>(
            r#"
            UPDATE contests
            SET title = $2, start_time = $3, duration_minutes = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&contest.title)
        .bind(contest.start_time)
        .bind(contest.duration_minutes)
        .fetch_optional(pool)
        .await?;

        Ok(contest)
    }

    /// Register a user for a contest; registering twice is a no-op
    pub async fn add_participant(pool: &PgPool, contest_id: i64, user_id: i64) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO contest_participants (contest_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(contest_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Delete contest with its problems and registrations; `false` if missing
    pub async fn delete(pool: &PgPool, id: i64) -> AppResult<bool> {
        let result = sqlx::query(r#"DELETE FROM contests WHERE id = $1"#)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
