//! Standings service
//!
//! Standings are never stored. Every call folds the contest's submissions,
//! in chronological order, into one row per participant.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    config::{ParticipantScope, StandingsConfig},
    db::Store,
    error::{AppError, AppResult},
    models::{AttemptStatus, Problem, Submission, User, UserStanding},
};

/// Computes contest standings from persisted submissions
#[derive(Clone)]
pub struct StandingsService {
    store: Arc<dyn Store>,
    config: StandingsConfig,
}

impl StandingsService {
    pub fn new(store: Arc<dyn Store>, config: StandingsConfig) -> Self {
        Self { store, config }
    }

    /// Ranked standings for a contest
    pub async fn compute(&self, contest_id: i64) -> AppResult<Vec<UserStanding>> {
        let contest = self
            .store
            .find_contest(contest_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Contest not found".to_string()))?;

        let problems = self.store.list_contest_problems(contest_id).await?;
        let users = match self.config.participants {
            ParticipantScope::All => self.store.list_users().await?,
            ParticipantScope::Contest => self.store.list_contest_participants(contest_id).await?,
        };

        let problem_ids: Vec<i64> = problems.iter().map(|p| p.id).collect();
        let submissions = self
            .store
            .list_window_submissions(&problem_ids, contest.window(self.config.window))
            .await?;

        tracing::debug!(
            contest_id,
            problems = problems.len(),
            participants = users.len(),
            submissions = submissions.len(),
            "Computing standings"
        );

        let mut standings = fill_standings(
            &users,
            &problems,
            &submissions,
            contest.start_time,
            self.config.count_attempts_after_solve,
        );
        sort_and_rank(&mut standings);

        Ok(standings)
    }
}

/// Fold chronologically ordered submissions into unranked standings rows
///
/// Rows follow `users` order and columns follow `problems` order.
/// Submissions by unknown users or for unknown problems are ignored. Once a
/// (user, problem) pair is solved, later submissions neither change its
/// status nor add penalty; they are still counted as attempts only when
/// `count_attempts_after_solve` is set.
pub fn fill_standings(
    users: &[User],
    problems: &[Problem],
    submissions: &[Submission],
    start: DateTime<Utc>,
    count_attempts_after_solve: bool,
) -> Vec<UserStanding> {
    let problem_numbers: Vec<i32> = problems.iter().map(|p| p.problem_number).collect();
    let column: HashMap<i64, usize> = problems
        .iter()
        .enumerate()
        .map(|(idx, p)| (p.id, idx))
        .collect();
    let row: HashMap<i64, usize> = users
        .iter()
        .enumerate()
        .map(|(idx, u)| (u.id, idx))
        .collect();

    let mut standings: Vec<UserStanding> = users
        .iter()
        .map(|u| UserStanding::new(u.id, u.name.clone(), &problem_numbers))
        .collect();
    let mut settled: HashSet<(usize, usize)> = HashSet::new();

    for submission in submissions {
        let (Some(&r), Some(&c)) = (row.get(&submission.user_id), column.get(&submission.problem_id))
        else {
            continue;
        };

        let solved = settled.contains(&(r, c));
        if solved && !count_attempts_after_solve {
            continue;
        }

        let standing = &mut standings[r];
        let cell = &mut standing.problems[c];
        cell.count += 1;
        if solved {
            continue;
        }

        if submission.is_pass() {
            cell.status = AttemptStatus::Solved;
            standing.solved += 1;
            standing.penalty += (submission.created_at - start).num_seconds();
            settled.insert((r, c));
        } else {
            cell.status = AttemptStatus::Failed;
        }
    }

    for standing in &mut standings {
        for cell in &mut standing.problems {
            if cell.count == 0 {
                cell.status = AttemptStatus::Unattempted;
            }
        }
    }

    standings
}

/// Order by solved desc then penalty asc, and assign competition ranks
///
/// The sort is stable, so tied rows keep their input order. Tied rows share
/// the rank of the first row in their group; the next distinct row is ranked
/// by its 1-based position (1, 1, 3, ...).
pub fn sort_and_rank(standings: &mut [UserStanding]) {
    standings.sort_by(|a, b| b.solved.cmp(&a.solved).then(a.penalty.cmp(&b.penalty)));

    for idx in 0..standings.len() {
        let tied = idx > 0
            && standings[idx].solved == standings[idx - 1].solved
            && standings[idx].penalty == standings[idx - 1].penalty;
        standings[idx].rank = if tied {
            standings[idx - 1].rank
        } else {
            idx as u32 + 1
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WindowMode;
    use crate::db::MemoryStore;
    use crate::judge::JudgeStatus;
    use crate::models::{NewContest, NewProblem, NewSubmission, ProblemAttempt};
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    fn user(id: i64, name: &str) -> User {
        User {
            id,
            name: name.to_string(),
            is_admin: false,
            created_at: start(),
        }
    }

    fn problem(id: i64, number: i32) -> Problem {
        Problem {
            id,
            contest_id: 1,
            title: format!("P{number}"),
            statement: String::new(),
            test_case_path: String::new(),
            problem_number: number,
            created_at: start(),
        }
    }

    fn submission(id: i64, user_id: i64, problem_id: i64, minutes: i64, status: JudgeStatus) -> Submission {
        Submission {
            id,
            user_id,
            problem_id,
            contest_id: 1,
            language: "py".to_string(),
            source_code: String::new(),
            status: status.as_str().to_string(),
            message: String::new(),
            created_at: start() + Duration::minutes(minutes),
        }
    }

    fn row(solved: u32, penalty: i64) -> UserStanding {
        UserStanding {
            rank: 0,
            user_id: 0,
            user_name: String::new(),
            solved,
            penalty,
            problems: Vec::new(),
        }
    }

    #[test]
    fn test_fail_then_pass() {
        let users = [user(1, "ada")];
        let problems = [problem(10, 1)];
        let submissions = [
            submission(1, 1, 10, 5, JudgeStatus::Fail),
            submission(2, 1, 10, 10, JudgeStatus::Pass),
        ];

        let standings = fill_standings(&users, &problems, &submissions, start(), false);

        assert_eq!(standings[0].solved, 1);
        assert_eq!(standings[0].penalty, 600);
        assert_eq!(
            standings[0].problems,
            [ProblemAttempt {
                problem_number: 1,
                status: AttemptStatus::Solved,
                count: 2
            }]
        );
    }

    #[test]
    fn test_first_pass_wins() {
        let users = [user(1, "ada")];
        let problems = [problem(10, 1)];
        let submissions = [
            submission(1, 1, 10, 3, JudgeStatus::Pass),
            submission(2, 1, 10, 7, JudgeStatus::Pass),
            submission(3, 1, 10, 9, JudgeStatus::Fail),
        ];

        let standings = fill_standings(&users, &problems, &submissions, start(), false);
        assert_eq!(standings[0].solved, 1);
        assert_eq!(standings[0].penalty, 180);
        assert_eq!(standings[0].problems[0].count, 1);
        assert_eq!(standings[0].problems[0].status, AttemptStatus::Solved);

        let counted = fill_standings(&users, &problems, &submissions, start(), true);
        assert_eq!(counted[0].solved, 1);
        assert_eq!(counted[0].penalty, 180);
        assert_eq!(counted[0].problems[0].count, 3);
        assert_eq!(counted[0].problems[0].status, AttemptStatus::Solved);
    }

    #[test]
    fn test_unknown_users_and_problems_are_ignored() {
        let users = [user(1, "ada"), user(2, "bob")];
        let problems = [problem(10, 1), problem(11, 2)];
        let submissions = [
            submission(1, 99, 10, 1, JudgeStatus::Pass),
            submission(2, 1, 99, 1, JudgeStatus::Pass),
            submission(3, 2, 11, 2, JudgeStatus::RuntimeError),
        ];

        let standings = fill_standings(&users, &problems, &submissions, start(), false);
        assert_eq!(standings.len(), 2);
        assert_eq!(standings[0].solved, 0);
        assert!(standings[0].problems.iter().all(|p| p.count == 0));
        assert_eq!(standings[1].problems[0].status, AttemptStatus::Unattempted);
        assert_eq!(standings[1].problems[1].status, AttemptStatus::Failed);
        assert_eq!(standings[1].problems[1].problem_number, 2);
    }

    #[test]
    fn test_solved_never_exceeds_problem_count() {
        let users = [user(1, "ada")];
        let problems = [problem(10, 1), problem(11, 2)];
        let submissions: Vec<Submission> = (0..10)
            .map(|i| submission(i, 1, 10 + i % 2, i, JudgeStatus::Pass))
            .collect();

        let standings = fill_standings(&users, &problems, &submissions, start(), true);
        assert_eq!(standings[0].solved, 2);
    }

    #[test]
    fn test_competition_ranking() {
        let mut standings = vec![row(1, 300), row(2, 900), row(2, 600), row(2, 600), row(0, 0)];
        for (idx, s) in standings.iter_mut().enumerate() {
            s.user_id = idx as i64;
        }

        sort_and_rank(&mut standings);

        let summary: Vec<(i64, u32)> = standings.iter().map(|s| (s.user_id, s.rank)).collect();
        assert_eq!(summary, [(2, 1), (3, 1), (1, 3), (0, 4), (4, 5)]);
    }

    #[test]
    fn test_all_tied() {
        let mut standings = vec![row(0, 0), row(0, 0), row(0, 0)];
        sort_and_rank(&mut standings);
        assert!(standings.iter().all(|s| s.rank == 1));
    }

    async fn seeded_store() -> (Arc<MemoryStore>, i64) {
        let store = Arc::new(MemoryStore::new());
        let ada = store.insert_user("ada", false);
        let bob = store.insert_user("bob", false);
        let contest = store
            .create_contest(NewContest {
                title: "Weekly".to_string(),
                start_time: start(),
                duration_minutes: 60,
            })
            .await
            .unwrap();
        let p = store
            .create_problem(NewProblem {
                contest_id: contest.id,
                title: "A".to_string(),
                statement: String::new(),
                test_case_path: String::new(),
                problem_number: 1,
            })
            .await
            .unwrap();

        let attempt = |user_id| NewSubmission {
            user_id,
            problem_id: p.id,
            contest_id: contest.id,
            language: "py".to_string(),
            source_code: String::new(),
        };
        store.insert_submission_at(attempt(ada.id), start() + Duration::minutes(20), JudgeStatus::Pass);
        store.insert_submission_at(attempt(bob.id), start() + Duration::minutes(10), JudgeStatus::Pass);
        // outside the contest window
        store.insert_submission_at(attempt(ada.id), start() - Duration::minutes(1), JudgeStatus::Fail);
        store.insert_submission_at(attempt(bob.id), start() + Duration::minutes(61), JudgeStatus::Fail);
        store.add_contest_participant(contest.id, ada.id).await.unwrap();

        (store, contest.id)
    }

    #[tokio::test]
    async fn test_compute_uses_contest_window() {
        let (store, contest_id) = seeded_store().await;
        let service = StandingsService::new(store, StandingsConfig::default());

        let standings = service.compute(contest_id).await.unwrap();

        assert_eq!(standings.len(), 2);
        assert_eq!(standings[0].user_name, "bob");
        assert_eq!(standings[0].rank, 1);
        assert_eq!(standings[0].penalty, 600);
        assert_eq!(standings[0].problems[0].count, 1);
        assert_eq!(standings[1].user_name, "ada");
        assert_eq!(standings[1].rank, 2);
        assert_eq!(standings[1].problems[0].count, 1);
    }

    #[tokio::test]
    async fn test_compute_open_window_and_contest_participants() {
        let (store, contest_id) = seeded_store().await;
        let service = StandingsService::new(
            store,
            StandingsConfig {
                window: WindowMode::Open,
                participants: ParticipantScope::Contest,
                count_attempts_after_solve: false,
            },
        );

        let standings = service.compute(contest_id).await.unwrap();

        assert_eq!(standings.len(), 1);
        assert_eq!(standings[0].user_name, "ada");
        assert_eq!(standings[0].problems[0].count, 2);
        assert_eq!(standings[0].penalty, 1200);
    }

    #[tokio::test]
    async fn test_recompute_without_new_submissions_is_identical() {
        let (store, contest_id) = seeded_store().await;
        store.insert_user("cy", false);
        store.insert_user("dan", false);
        let service = StandingsService::new(store, StandingsConfig::default());

        let first = service.compute(contest_id).await.unwrap();
        let second = service.compute(contest_id).await.unwrap();

        assert_eq!(first, second);
        let tied: Vec<(&str, u32)> = first[2..]
            .iter()
            .map(|s| (s.user_name.as_str(), s.rank))
            .collect();
        assert_eq!(tied, [("cy", 3), ("dan", 3)]);
    }

    #[tokio::test]
    async fn test_compute_unknown_contest() {
        let service = StandingsService::new(Arc::new(MemoryStore::new()), StandingsConfig::default());
        let err = service.compute(42).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
