//! In-memory [`Store`]
//!
//! Mirrors the PostgreSQL semantics closely enough for service and router
//! tests: dense IDs, the same orderings, the conditional verdict write, and
//! the uniqueness and reference constraints of the schema.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    judge::{JudgeStatus, Verdict},
    models::{
        Contest, NewContest, NewProblem, NewSubmission, Problem, ProblemUpdate, Submission,
        SubmissionFilter, SubmissionView, SubmissionWindow, User,
    },
};

use super::store::Store;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    contests: Vec<Contest>,
    participants: BTreeSet<(i64, i64)>,
    problems: Vec<Problem>,
    submissions: Vec<Submission>,
    // deletions leave gaps, so IDs are not derived from lengths
    next_contest_id: i64,
    next_problem_id: i64,
}

impl Tables {
    /// `UNIQUE (contest_id, problem_number)`
    fn check_problem_number(
        &self,
        contest_id: i64,
        number: i32,
        except: Option<i64>,
    ) -> AppResult<()> {
        let taken = self.problems.iter().any(|p| {
            p.contest_id == contest_id && p.problem_number == number && Some(p.id) != except
        });
        if taken {
            return Err(AppError::AlreadyExists("Resource already exists".to_string()));
        }
        Ok(())
    }

    /// Submissions reference problems and contests without cascading
    fn check_unreferenced(&self, referenced: impl Fn(&Submission) -> bool) -> AppResult<()> {
        if self.submissions.iter().any(referenced) {
            return Err(AppError::Conflict("Resource is still referenced".to_string()));
        }
        Ok(())
    }
}

/// Volatile store holding every table in a single mutex
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Users come from outside the judge; this seeds one
    pub fn insert_user(&self, name: &str, is_admin: bool) -> User {
        let mut tables = self.tables();
        let user = User {
            id: tables.users.len() as i64 + 1,
            name: name.to_string(),
            is_admin,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        user
    }

    /// Insert a submission with an explicit timestamp and status
    pub fn insert_submission_at(
        &self,
        submission: NewSubmission,
        created_at: DateTime<Utc>,
        status: JudgeStatus,
    ) -> Submission {
        let mut tables = self.tables();
        let submission = Submission {
            id: tables.submissions.len() as i64 + 1,
            user_id: submission.user_id,
            problem_id: submission.problem_id,
            contest_id: submission.contest_id,
            language: submission.language,
            source_code: submission.source_code,
            status: status.as_str().to_string(),
            message: String::new(),
            created_at,
        };
        tables.submissions.push(submission.clone());
        submission
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn find_user(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.tables().users.iter().find(|u| u.id == id).cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let mut users = self.tables().users.clone();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn list_contest_participants(&self, contest_id: i64) -> AppResult<Vec<User>> {
        let tables = self.tables();
        Ok(tables
            .participants
            .iter()
            .filter(|(cid, _)| *cid == contest_id)
            .filter_map(|(_, uid)| tables.users.iter().find(|u| u.id == *uid).cloned())
            .collect())
    }

    async fn add_contest_participant(&self, contest_id: i64, user_id: i64) -> AppResult<()> {
        self.tables().participants.insert((contest_id, user_id));
        Ok(())
    }

    async fn find_contest(&self, id: i64) -> AppResult<Option<Contest>> {
        Ok(self.tables().contests.iter().find(|c| c.id == id).cloned())
    }

    async fn list_contests(&self) -> AppResult<Vec<Contest>> {
        let mut contests = self.tables().contests.clone();
        contests.sort_by_key(|c| std::cmp::Reverse((c.start_time, c.id)));
        Ok(contests)
    }

    async fn update_contest(&self, id: i64, contest: NewContest) -> AppResult<Option<Contest>> {
        let mut tables = self.tables();
        let Some(existing) = tables.contests.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };

        existing.title = contest.title;
        existing.start_time = contest.start_time;
        existing.duration_minutes = contest.duration_minutes;
        Ok(Some(existing.clone()))
    }

    async fn delete_contest(&self, id: i64) -> AppResult<bool> {
        let mut tables = self.tables();
        if !tables.contests.iter().any(|c| c.id == id) {
            return Ok(false);
        }
        tables.check_unreferenced(|s| s.contest_id == id)?;

        tables.contests.retain(|c| c.id != id);
        tables.problems.retain(|p| p.contest_id != id);
        tables.participants.retain(|(cid, _)| *cid != id);
        Ok(true)
    }

    async fn create_contest(&self, contest: NewContest) -> AppResult<Contest> {
        let mut tables = self.tables();
        tables.next_contest_id += 1;
        let contest = Contest {
            id: tables.next_contest_id,
            title: contest.title,
            start_time: contest.start_time,
            duration_minutes: contest.duration_minutes,
            created_at: Utc::now(),
        };
        tables.contests.push(contest.clone());
        Ok(contest)
    }

    async fn find_problem(&self, id: i64) -> AppResult<Option<Problem>> {
        Ok(self.tables().problems.iter().find(|p| p.id == id).cloned())
    }

    async fn list_contest_problems(&self, contest_id: i64) -> AppResult<Vec<Problem>> {
        let mut problems: Vec<Problem> = self
            .tables()
            .problems
            .iter()
            .filter(|p| p.contest_id == contest_id)
            .cloned()
            .collect();
        problems.sort_by_key(|p| p.id);
        Ok(problems)
    }

    async fn create_problem(&self, problem: NewProblem) -> AppResult<Problem> {
        let mut tables = self.tables();
        tables.check_problem_number(problem.contest_id, problem.problem_number, None)?;

        tables.next_problem_id += 1;
        let problem = Problem {
            id: tables.next_problem_id,
            contest_id: problem.contest_id,
            title: problem.title,
            statement: problem.statement,
            test_case_path: problem.test_case_path,
            problem_number: problem.problem_number,
            created_at: Utc::now(),
        };
        tables.problems.push(problem.clone());
        Ok(problem)
    }

    async fn update_problem(&self, id: i64, update: ProblemUpdate) -> AppResult<Option<Problem>> {
        let mut tables = self.tables();
        let Some(contest_id) = tables.problems.iter().find(|p| p.id == id).map(|p| p.contest_id)
        else {
            return Ok(None);
        };
        if let Some(number) = update.problem_number {
            tables.check_problem_number(contest_id, number, Some(id))?;
        }

        let Some(problem) = tables.problems.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(title) = update.title {
            problem.title = title;
        }
        if let Some(statement) = update.statement {
            problem.statement = statement;
        }
        if let Some(path) = update.test_case_path {
            problem.test_case_path = path;
        }
        if let Some(number) = update.problem_number {
            problem.problem_number = number;
        }
        Ok(Some(problem.clone()))
    }

    async fn delete_problem(&self, id: i64) -> AppResult<bool> {
        let mut tables = self.tables();
        if !tables.problems.iter().any(|p| p.id == id) {
            return Ok(false);
        }
        tables.check_unreferenced(|s| s.problem_id == id)?;

        tables.problems.retain(|p| p.id != id);
        Ok(true)
    }

    async fn problem_has_submissions(&self, problem_id: i64) -> AppResult<bool> {
        Ok(self.tables().submissions.iter().any(|s| s.problem_id == problem_id))
    }

    async fn contest_has_submissions(&self, contest_id: i64) -> AppResult<bool> {
        Ok(self.tables().submissions.iter().any(|s| s.contest_id == contest_id))
    }

    async fn create_submission(&self, submission: NewSubmission) -> AppResult<Submission> {
        Ok(self.insert_submission_at(submission, Utc::now(), JudgeStatus::Pending))
    }

    async fn find_submission(&self, id: i64) -> AppResult<Option<Submission>> {
        Ok(self.tables().submissions.iter().find(|s| s.id == id).cloned())
    }

    async fn record_verdict(&self, id: i64, verdict: &Verdict) -> AppResult<bool> {
        let mut tables = self.tables();
        let Some(submission) = tables
            .submissions
            .iter_mut()
            .find(|s| s.id == id && s.is_pending())
        else {
            return Ok(false);
        };

        submission.status = verdict.status.as_str().to_string();
        submission.message = verdict.message.clone();
        Ok(true)
    }

    async fn list_window_submissions(
        &self,
        problem_ids: &[i64],
        window: SubmissionWindow,
    ) -> AppResult<Vec<Submission>> {
        let mut submissions: Vec<Submission> = self
            .tables()
            .submissions
            .iter()
            .filter(|s| problem_ids.contains(&s.problem_id) && window.contains(s.created_at))
            .cloned()
            .collect();
        submissions.sort_by_key(|s| (s.created_at, s.id));
        Ok(submissions)
    }

    async fn list_submission_views(
        &self,
        filter: SubmissionFilter,
    ) -> AppResult<Vec<SubmissionView>> {
        let tables = self.tables();
        let mut views: Vec<SubmissionView> = tables
            .submissions
            .iter()
            .filter(|s| filter.user_id.is_none_or(|uid| s.user_id == uid))
            .filter(|s| filter.contest_id.is_none_or(|cid| s.contest_id == cid))
            .filter_map(|s| {
                let user = tables.users.iter().find(|u| u.id == s.user_id)?;
                let problem = tables.problems.iter().find(|p| p.id == s.problem_id)?;
                Some(SubmissionView {
                    id: s.id,
                    user_id: s.user_id,
                    user_name: user.name.clone(),
                    problem_id: s.problem_id,
                    problem_title: problem.title.clone(),
                    language: s.language.clone(),
                    source_code: s.source_code.clone(),
                    status: s.status.clone(),
                    message: s.message.clone(),
                    created_at: s.created_at,
                })
            })
            .collect();

        views.sort_by_key(|v| std::cmp::Reverse(v.id));
        if let Some(limit) = filter.limit {
            views.truncate(usize::try_from(limit).unwrap_or(0));
        }
        Ok(views)
    }
}
