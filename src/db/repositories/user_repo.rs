//! User repository

use sqlx::PgPool;

use crate::{error::AppResult, models::User};

/// Repository for user database operations
pub struct UserRepository;

impl UserRepository {
    /// Find user by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// List every user, ordered by ID
    pub async fn list_all(pool: &PgPool) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(r#"SELECT * FROM users ORDER BY id"#)
            .fetch_all(pool)
            .await?;

        Ok(users)
    }

    /// List users registered for a contest, ordered by ID
    pub async fn list_contest_participants(pool: &PgPool, contest_id: i64) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.*
            FROM users u
            INNER JOIN contest_participants cp ON cp.user_id = u.id
            WHERE cp.contest_id = $1
            ORDER BY u.id
            "#,
        )
        .bind(contest_id)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }
}
