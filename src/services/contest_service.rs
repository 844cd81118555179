//! Contest service

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    db::Store,
    error::{AppError, AppResult},
    models::{Contest, ContestStatus, NewContest, NewProblem, Problem, ProblemUpdate},
    utils::validation::{validate_duration_minutes, validate_problem_number},
};

/// Contest and problem management
#[derive(Clone)]
pub struct ContestService {
    store: Arc<dyn Store>,
}

impl ContestService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create a new contest
    pub async fn create_contest(&self, contest: NewContest) -> AppResult<Contest> {
        Self::validate_duration(contest.duration_minutes)?;

        let contest = self.store.create_contest(contest).await?;
        tracing::info!(contest_id = contest.id, title = %contest.title, "Contest created");
        Ok(contest)
    }

    /// Update contest
    pub async fn update_contest(&self, id: i64, contest: NewContest) -> AppResult<Contest> {
        Self::validate_duration(contest.duration_minutes)?;

        self.store
            .update_contest(id, contest)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))
    }

    /// Delete a contest with its problems and registrations
    ///
    /// Refused once anything was submitted, so submission history is never
    /// orphaned.
    pub async fn delete_contest(&self, id: i64) -> AppResult<()> {
        self.get_contest(id).await?;

        if self.store.contest_has_submissions(id).await? {
            return Err(AppError::Conflict(
                "Contest has submissions and cannot be deleted".to_string(),
            ));
        }

        if !self.store.delete_contest(id).await? {
            return Err(AppError::NotFound("Contest not found".to_string()));
        }

        tracing::info!(contest_id = id, "Contest deleted");
        Ok(())
    }

    /// Get contest by ID
    pub async fn get_contest(&self, id: i64) -> AppResult<Contest> {
        self.store
            .find_contest(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))
    }

    /// Get contest together with its problems
    pub async fn get_contest_with_problems(&self, id: i64) -> AppResult<(Contest, Vec<Problem>)> {
        let contest = self.get_contest(id).await?;
        let problems = self.store.list_contest_problems(id).await?;
        Ok((contest, problems))
    }

    /// List contests, latest first; `upcoming_only` keeps those not yet started at `now`
    pub async fn list_contests(
        &self,
        upcoming_only: bool,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Contest>> {
        let contests = self.store.list_contests().await?;
        if !upcoming_only {
            return Ok(contests);
        }

        Ok(contests
            .into_iter()
            .filter(|c| c.status_at(now) == ContestStatus::Upcoming)
            .collect())
    }

    /// List contest problems
    pub async fn list_problems(&self, contest_id: i64) -> AppResult<Vec<Problem>> {
        self.get_contest(contest_id).await?;
        self.store.list_contest_problems(contest_id).await
    }

    /// Get one of a contest's problems
    pub async fn get_problem(&self, contest_id: i64, problem_id: i64) -> AppResult<Problem> {
        self.store
            .find_problem(problem_id)
            .await?
            .filter(|p| p.contest_id == contest_id)
            .ok_or_else(|| AppError::NotFound("Problem not found".to_string()))
    }

    /// Update a problem's fields; a new number must stay unique in the contest
    pub async fn update_problem(
        &self,
        contest_id: i64,
        problem_id: i64,
        update: ProblemUpdate,
    ) -> AppResult<Problem> {
        self.get_problem(contest_id, problem_id).await?;

        if let Some(number) = update.problem_number {
            validate_problem_number(number)
                .map_err(|message| AppError::Validation(message.to_string()))?;

            let existing = self.store.list_contest_problems(contest_id).await?;
            if existing
                .iter()
                .any(|p| p.problem_number == number && p.id != problem_id)
            {
                return Err(Self::number_taken(number));
            }
        }

        self.store
            .update_problem(problem_id, update)
            .await?
            .ok_or_else(|| AppError::NotFound("Problem not found".to_string()))
    }

    /// Delete a problem nobody has submitted to
    pub async fn delete_problem(&self, contest_id: i64, problem_id: i64) -> AppResult<()> {
        self.get_problem(contest_id, problem_id).await?;

        if self.store.problem_has_submissions(problem_id).await? {
            return Err(AppError::Conflict(
                "Problem has submissions and cannot be deleted".to_string(),
            ));
        }

        if !self.store.delete_problem(problem_id).await? {
            return Err(AppError::NotFound("Problem not found".to_string()));
        }

        tracing::info!(contest_id, problem_id, "Problem deleted");
        Ok(())
    }

    /// Add a problem to a contest
    ///
    /// Without an explicit number the problem is appended after the highest
    /// existing one. Numbers must be unique within a contest.
    pub async fn add_problem(
        &self,
        contest_id: i64,
        title: String,
        statement: String,
        test_case_path: String,
        problem_number: Option<i32>,
    ) -> AppResult<Problem> {
        let existing = self.list_problems(contest_id).await?;

        let problem_number = match problem_number {
            Some(number) => {
                validate_problem_number(number)
                    .map_err(|message| AppError::Validation(message.to_string()))?;
                number
            }
            None => existing.iter().map(|p| p.problem_number).max().unwrap_or(0) + 1,
        };

        if existing.iter().any(|p| p.problem_number == problem_number) {
            return Err(Self::number_taken(problem_number));
        }

        let problem = self
            .store
            .create_problem(NewProblem {
                contest_id,
                title,
                statement,
                test_case_path,
                problem_number,
            })
            .await?;

        tracing::info!(contest_id, problem_id = problem.id, problem_number, "Problem added");
        Ok(problem)
    }

    /// Register a user for a contest
    ///
    /// Users are provisioned outside the judge, so a token can name a user
    /// the store does not know yet.
    pub async fn register_participant(&self, contest_id: i64, user_id: i64) -> AppResult<()> {
        self.get_contest(contest_id).await?;

        if self.store.find_user(user_id).await?.is_none() {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        self.store.add_contest_participant(contest_id, user_id).await
    }

    fn number_taken(number: i32) -> AppError {
        AppError::AlreadyExists(format!(
            "Problem number {number} is already used in this contest"
        ))
    }

    fn validate_duration(duration_minutes: i32) -> AppResult<()> {
        validate_duration_minutes(duration_minutes)
            .map_err(|message| AppError::Validation(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use chrono::Duration;

    fn new_contest(start_time: DateTime<Utc>) -> NewContest {
        NewContest {
            title: "Weekly".to_string(),
            start_time,
            duration_minutes: 90,
        }
    }

    #[tokio::test]
    async fn test_problem_numbers_are_appended_and_unique() {
        let service = ContestService::new(Arc::new(MemoryStore::new()));
        let contest = service.create_contest(new_contest(Utc::now())).await.unwrap();

        let a = service
            .add_problem(contest.id, "A".into(), String::new(), "/a".into(), None)
            .await
            .unwrap();
        let c = service
            .add_problem(contest.id, "C".into(), String::new(), "/c".into(), Some(3))
            .await
            .unwrap();
        let d = service
            .add_problem(contest.id, "D".into(), String::new(), "/d".into(), None)
            .await
            .unwrap();
        assert_eq!((a.problem_number, c.problem_number, d.problem_number), (1, 3, 4));

        let err = service
            .add_problem(contest.id, "again".into(), String::new(), "/x".into(), Some(3))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));

        let err = service
            .add_problem(99, "lost".into(), String::new(), "/x".into(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_upcoming_filter() {
        let service = ContestService::new(Arc::new(MemoryStore::new()));
        let now = Utc::now();
        service.create_contest(new_contest(now - Duration::days(1))).await.unwrap();
        let upcoming = service.create_contest(new_contest(now + Duration::days(1))).await.unwrap();

        assert_eq!(service.list_contests(false, now).await.unwrap().len(), 2);
        let listed = service.list_contests(true, now).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, upcoming.id);
    }

    #[tokio::test]
    async fn test_invalid_duration_rejected() {
        let service = ContestService::new(Arc::new(MemoryStore::new()));
        let mut contest = new_contest(Utc::now());
        contest.duration_minutes = 0;
        let err = service.create_contest(contest).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    async fn contest_with_problems(service: &ContestService) -> (Contest, Problem, Problem) {
        let contest = service.create_contest(new_contest(Utc::now())).await.unwrap();
        let a = service
            .add_problem(contest.id, "A".into(), String::new(), "/a".into(), None)
            .await
            .unwrap();
        let b = service
            .add_problem(contest.id, "B".into(), String::new(), "/b".into(), None)
            .await
            .unwrap();
        (contest, a, b)
    }

    #[tokio::test]
    async fn test_problem_lookup_is_scoped_to_contest() {
        let service = ContestService::new(Arc::new(MemoryStore::new()));
        let (contest, a, _) = contest_with_problems(&service).await;
        let other = service.create_contest(new_contest(Utc::now())).await.unwrap();

        assert_eq!(service.get_problem(contest.id, a.id).await.unwrap().title, "A");
        let err = service.get_problem(other.id, a.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_problem_keeps_unset_fields_and_unique_numbers() {
        let service = ContestService::new(Arc::new(MemoryStore::new()));
        let (contest, a, b) = contest_with_problems(&service).await;

        let updated = service
            .update_problem(
                contest.id,
                a.id,
                ProblemUpdate {
                    title: Some("A prime".into()),
                    problem_number: Some(5),
                    ..ProblemUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "A prime");
        assert_eq!(updated.problem_number, 5);
        assert_eq!(updated.test_case_path, "/a");

        let err = service
            .update_problem(
                contest.id,
                b.id,
                ProblemUpdate {
                    problem_number: Some(5),
                    ..ProblemUpdate::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));

        let err = service
            .update_problem(
                contest.id,
                b.id,
                ProblemUpdate {
                    problem_number: Some(0),
                    ..ProblemUpdate::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_deletes_refused_once_submitted() {
        let store = Arc::new(MemoryStore::new());
        let service = ContestService::new(store.clone());
        let (contest, a, b) = contest_with_problems(&service).await;
        let ada = store.insert_user("ada", false);
        store
            .create_submission(crate::models::NewSubmission {
                user_id: ada.id,
                problem_id: a.id,
                contest_id: contest.id,
                language: "py".to_string(),
                source_code: String::new(),
            })
            .await
            .unwrap();

        let err = service.delete_problem(contest.id, a.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        let err = service.delete_contest(contest.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        service.delete_problem(contest.id, b.id).await.unwrap();
        let remaining: Vec<i64> = service
            .list_problems(contest.id)
            .await
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(remaining, [a.id]);
    }

    #[tokio::test]
    async fn test_delete_contest_removes_problems() {
        let store = Arc::new(MemoryStore::new());
        let service = ContestService::new(store.clone());
        let (contest, a, _) = contest_with_problems(&service).await;

        service.delete_contest(contest.id).await.unwrap();

        assert!(matches!(
            service.get_contest(contest.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(store.find_problem(a.id).await.unwrap().is_none());
        assert!(matches!(
            service.delete_contest(contest.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_register_requires_known_user() {
        let store = Arc::new(MemoryStore::new());
        let service = ContestService::new(store.clone());
        let contest = service.create_contest(new_contest(Utc::now())).await.unwrap();
        let ada = store.insert_user("ada", false);

        service.register_participant(contest.id, ada.id).await.unwrap();
        service.register_participant(contest.id, ada.id).await.unwrap();
        let participants = store.list_contest_participants(contest.id).await.unwrap();
        assert_eq!(participants.len(), 1);

        let err = service.register_participant(contest.id, 99).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
