//! Submission service
//!
//! Accepts submissions, judges them on a detached task and publishes the
//! outcome. The HTTP request that created a submission never waits for its
//! verdict.

use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tracing::{error, info, warn};

use crate::{
    constants::{CONTEST_SUBMISSIONS_LIMIT, HIDDEN_SOURCE, NEW_SUBMISSION_SIGNAL},
    db::Store,
    error::{AppError, AppResult},
    judge::{Judge, JudgeStatus, Verdict},
    models::{NewSubmission, Submission, SubmissionFilter, SubmissionView},
    realtime::{Broker, Topic},
    utils::{now_utc, validate_language},
};

use super::dead_letters::{DeadLetter, DeadLetterLog};

const INTERNAL_FAILURE_MESSAGE: &str = "internal judge failure";

/// What a caller submits
#[derive(Debug, Clone)]
pub struct SubmissionDraft {
    pub problem_id: i64,
    pub language: String,
    pub source_code: String,
}

/// Submission lifecycle orchestrator
#[derive(Clone)]
pub struct SubmissionService {
    store: Arc<dyn Store>,
    judge: Judge,
    broker: Broker,
    dead_letters: DeadLetterLog,
    permits: Option<Arc<Semaphore>>,
}

impl SubmissionService {
    /// `max_concurrency` of 0 runs every judging task immediately
    pub fn new(store: Arc<dyn Store>, judge: Judge, broker: Broker, max_concurrency: usize) -> Self {
        Self {
            store,
            judge,
            broker,
            dead_letters: DeadLetterLog::default(),
            permits: (max_concurrency > 0).then(|| Arc::new(Semaphore::new(max_concurrency))),
        }
    }

    pub fn dead_letters(&self) -> Vec<DeadLetter> {
        self.dead_letters.entries()
    }

    /// Persist a pending submission and start judging it in the background
    pub async fn submit(&self, user_id: i64, draft: SubmissionDraft) -> AppResult<Submission> {
        validate_language(&draft.language).map_err(AppError::Validation)?;

        let problem = self
            .store
            .find_problem(draft.problem_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Problem not found".to_string()))?;

        let contest = self
            .store
            .find_contest(problem.contest_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))?;

        if !contest.has_started(now_utc()) {
            return Err(AppError::Forbidden("Contest has not started yet".to_string()));
        }

        let submission = self
            .store
            .create_submission(NewSubmission {
                user_id,
                problem_id: problem.id,
                contest_id: contest.id,
                language: draft.language,
                source_code: draft.source_code,
            })
            .await?;

        info!(
            submission_id = submission.id,
            user_id,
            problem_id = problem.id,
            language = %submission.language,
            "Submission accepted"
        );

        self.publish(&Topic::on_submit(user_id, contest.id));
        self.spawn_judging(submission.clone(), PathBuf::from(problem.test_case_path));

        Ok(submission)
    }

    fn spawn_judging(&self, submission: Submission, corpus_path: PathBuf) {
        let submission_id = submission.id;
        let user_id = submission.user_id;
        let contest_id = submission.contest_id;

        let worker = self.clone();
        let task = tokio::spawn(async move { worker.judge_and_record(submission, corpus_path).await });

        let supervisor = self.clone();
        tokio::spawn(async move {
            let reason = match task.await {
                Ok(Ok(())) => return,
                Ok(Err(e)) => format!("verdict write failed: {e}"),
                Err(e) => describe_join_error(e),
            };
            supervisor
                .recover(submission_id, user_id, contest_id, reason)
                .await;
        });
    }

    async fn judge_and_record(&self, submission: Submission, corpus_path: PathBuf) -> AppResult<()> {
        let _permit = match &self.permits {
            Some(permits) => Some(
                permits
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|e| anyhow::anyhow!("judge semaphore closed: {e}"))?,
            ),
            None => None,
        };

        let verdict = self
            .judge
            .judge(&submission.source_code, &corpus_path, &submission.language)
            .await;

        info!(
            submission_id = submission.id,
            status = %verdict.status,
            "Submission judged"
        );

        if !self.store.record_verdict(submission.id, &verdict).await? {
            warn!(
                submission_id = submission.id,
                "Submission already has a final status, verdict discarded"
            );
        }

        self.publish(&Topic::on_verdict(submission.user_id, submission.contest_id));
        Ok(())
    }

    /// Dead-letter a failed judging task and try to leave the row terminal
    async fn recover(&self, submission_id: i64, user_id: i64, contest_id: i64, reason: String) {
        let letter = self.dead_letters.record(submission_id, reason);
        error!(
            submission_id,
            reason = %letter.reason,
            "Judging task failed, submission dead-lettered"
        );

        let fallback = Verdict::new(JudgeStatus::Error, INTERNAL_FAILURE_MESSAGE);
        match self.store.record_verdict(submission_id, &fallback).await {
            Ok(true) => self.publish(&Topic::on_verdict(user_id, contest_id)),
            Ok(false) => {}
            Err(e) => error!(submission_id, error = %e, "Failed to record fallback verdict"),
        }
    }

    fn publish(&self, topics: &[Topic]) {
        for topic in topics {
            self.broker.publish(*topic, NEW_SUBMISSION_SIGNAL);
        }
    }

    /// Get a submission owned by the requester (admins may read any)
    pub async fn get_submission(
        &self,
        id: i64,
        requester_id: i64,
        requester_is_admin: bool,
    ) -> AppResult<Submission> {
        let submission = self
            .store
            .find_submission(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

        if submission.user_id != requester_id && !requester_is_admin {
            return Err(AppError::Forbidden(
                "Cannot view other users' submissions".to_string(),
            ));
        }

        Ok(submission)
    }

    /// A user's submissions across all contests, newest first
    pub async fn list_user_submissions(&self, user_id: i64) -> AppResult<Vec<SubmissionView>> {
        self.store
            .list_submission_views(SubmissionFilter {
                user_id: Some(user_id),
                ..SubmissionFilter::default()
            })
            .await
    }

    /// Latest submissions of a contest; source is hidden from non-admins
    pub async fn list_contest_submissions(
        &self,
        contest_id: i64,
        requester_is_admin: bool,
    ) -> AppResult<Vec<SubmissionView>> {
        let mut views = self
            .store
            .list_submission_views(SubmissionFilter {
                contest_id: Some(contest_id),
                limit: Some(CONTEST_SUBMISSIONS_LIMIT),
                ..SubmissionFilter::default()
            })
            .await?;

        if !requester_is_admin {
            for view in &mut views {
                view.source_code = HIDDEN_SOURCE.to_string();
            }
        }

        Ok(views)
    }

    /// A user's submissions within one contest, newest first
    pub async fn list_user_contest_submissions(
        &self,
        contest_id: i64,
        user_id: i64,
    ) -> AppResult<Vec<SubmissionView>> {
        self.store
            .list_submission_views(SubmissionFilter {
                user_id: Some(user_id),
                contest_id: Some(contest_id),
                limit: None,
            })
            .await
    }
}

fn describe_join_error(err: JoinError) -> String {
    if err.is_panic() {
        format!("judging task panicked: {}", panic_message(err.into_panic()))
    } else {
        format!("judging task aborted: {err}")
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
