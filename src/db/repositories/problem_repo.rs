//! Problem repository

use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{NewProblem, Problem, ProblemUpdate},
};

/// Repository for problem database operations
pub struct ProblemRepository;

impl ProblemRepository {
    /// Create a new problem
    pub async fn create(pool: &PgPool, problem: &NewProblem) -> AppResult<Problem> {
        let problem = sqlx::query_as::<_, Problem>(
            r#"
            INSERT INTO problems (contest_id, title, statement, test_case_path, problem_number)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(problem.contest_id)
        .bind(&problem.title)
        .bind(&problem.statement)
        .bind(&problem.test_case_path)
        .bind(problem.problem_number)
        .fetch_one(pool)
        .await?;

        Ok(problem)
    }

    /// Find problem by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> AppResult<Option<Problem>> {
        let problem = sqlx::query_as::<_, Problem>(r#"SELECT * FROM problems WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(problem)
    }

    /// List a contest's problems, ordered by ID
    pub async fn list_by_contest(pool: &PgPool, contest_id: i64) -> AppResult<Vec<Problem>> {
        let problems = sqlx::query_as::<_, Problem>(
            r#"SELECT * FROM problems WHERE contest_id = $1 ORDER BY id"#,
        )
        .bind(contest_id)
        .fetch_all(pool)
        .await?;

        Ok(problems)
    }

    /// Update the given fields; `None` if the problem is missing
    pub async fn update(
        pool: &PgPool,
        id: i64,
        update: &ProblemUpdate,
    ) -> AppResult<Option<Problem>> {
        let problem = sqlx::query_as::<_, Problem>(
            r#"
            UPDATE problems
            SET
                title = COALESCE($2, title),
                statement = COALESCE($3, statement),
                test_case_path = COALESCE($4, test_case_path),
                problem_number = COALESCE($5, problem_number)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.title.as_deref())
        .bind(update.statement.as_deref())
        .bind(update.test_case_path.as_deref())
        .bind(update.problem_number)
        .fetch_optional(pool)
        .await?;

        Ok(problem)
    }

    /// Delete problem; `false` if it did not exist
    ///
    /// Submissions reference their problem without cascading, so a judged
    /// problem cannot be removed.
    pub async fn delete(pool: &PgPool, id: i64) -> AppResult<bool> {
        let result = sqlx::query(r#"DELETE FROM problems WHERE id = $1"#)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
