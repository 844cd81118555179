//! Topic keys

use std::fmt;

/// Notification topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Every submission in the system
    AllSubmissions,
    UserSubmissions { user_id: i64 },
    Standings { contest_id: i64 },
    ContestSubmissions { contest_id: i64 },
    UserContestSubmissions { contest_id: i64, user_id: i64 },
}

impl Topic {
    /// Topics whose views change when a submission is created
    pub fn on_submit(user_id: i64, contest_id: i64) -> [Topic; 4] {
        [
            Topic::AllSubmissions,
            Topic::UserSubmissions { user_id },
            Topic::ContestSubmissions { contest_id },
            Topic::UserContestSubmissions { contest_id, user_id },
        ]
    }

    /// Topics whose views change when a verdict is recorded
    pub fn on_verdict(user_id: i64, contest_id: i64) -> [Topic; 5] {
        [
            Topic::AllSubmissions,
            Topic::UserSubmissions { user_id },
            Topic::Standings { contest_id },
            Topic::ContestSubmissions { contest_id },
            Topic::UserContestSubmissions { contest_id, user_id },
        ]
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllSubmissions => write!(f, "all_submissions"),
            Self::UserSubmissions { user_id } => write!(f, "submissions:user:{user_id}"),
            Self::Standings { contest_id } => write!(f, "standings:{contest_id}"),
            Self::ContestSubmissions { contest_id } => {
                write!(f, "contest_submissions:{contest_id}")
            }
            Self::UserContestSubmissions {
                contest_id,
                user_id,
            } => write!(f, "contest_submissions:{contest_id}:user:{user_id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        let keys: Vec<String> = Topic::on_verdict(7, 3).iter().map(Topic::to_string).collect();
        assert_eq!(
            keys,
            [
                "all_submissions",
                "submissions:user:7",
                "standings:3",
                "contest_submissions:3",
                "contest_submissions:3:user:7",
            ]
        );
        assert!(!Topic::on_submit(7, 3).contains(&Topic::Standings { contest_id: 3 }));
    }
}
