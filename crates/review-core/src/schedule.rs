//! Review state machine and due-date derivation.
//!
//! A problem is reviewed three times at fixed offsets from the date that
//! governs its current status:
//!
//! | status       | anchor               | offset  |
//! |--------------|----------------------|---------|
//! | New          | `date_attempted`     | 3 days  |
//! | FirstReview  | `first_review_date`  | 7 days  |
//! | SecondReview | `second_review_date` | 20 days |
//! | Mastered     | none                 | terminal |
//!
//! All functions here are pure. A missing anchor yields `None`, which means
//! "not scheduled", never an error.

use crate::model::{Problem, ProblemStatus};
use chrono::{Days, NaiveDate};
use thiserror::Error;

/// Days between attempting a problem and its first review.
pub const NEW_INTERVAL_DAYS: u64 = 3;
/// Days between the first and second review.
pub const FIRST_REVIEW_INTERVAL_DAYS: u64 = 7;
/// Days between the second review and mastery.
pub const SECOND_REVIEW_INTERVAL_DAYS: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReviewError {
    #[error("cannot advance a problem that is already {from}")]
    InvalidTransition { from: ProblemStatus },
}

impl ProblemStatus {
    /// Move one stage forward. Advancing `Mastered` is rejected rather
    /// than clamped.
    pub fn advance(self) -> Result<Self, ReviewError> {
        match self {
            Self::New => Ok(Self::FirstReview),
            Self::FirstReview => Ok(Self::SecondReview),
            Self::SecondReview => Ok(Self::Mastered),
            Self::Mastered => Err(ReviewError::InvalidTransition { from: self }),
        }
    }

    /// Move one stage back, staying at `New` when already there.
    pub fn reset(self) -> Self {
        match self {
            Self::New | Self::FirstReview => Self::New,
            Self::SecondReview => Self::FirstReview,
            Self::Mastered => Self::SecondReview,
        }
    }

    /// Review interval that applies while in this status.
    pub fn interval_days(self) -> Option<u64> {
        match self {
            Self::New => Some(NEW_INTERVAL_DAYS),
            Self::FirstReview => Some(FIRST_REVIEW_INTERVAL_DAYS),
            Self::SecondReview => Some(SECOND_REVIEW_INTERVAL_DAYS),
            Self::Mastered => None,
        }
    }
}

/// The date field the next review is counted from.
pub fn anchor_date(problem: &Problem) -> Option<NaiveDate> {
    match problem.status {
        ProblemStatus::New => Some(problem.date_attempted),
        ProblemStatus::FirstReview => problem.first_review_date,
        ProblemStatus::SecondReview => problem.second_review_date,
        ProblemStatus::Mastered => None,
    }
}

pub fn next_review_date(problem: &Problem) -> Option<NaiveDate> {
    let anchor = anchor_date(problem)?;
    let days = problem.status.interval_days()?;
    anchor.checked_add_days(Days::new(days))
}

/// True when the next review falls on or before `today`. Both sides are
/// calendar days, so the time a review was stamped never matters.
pub fn is_review_due(problem: &Problem, today: NaiveDate) -> bool {
    next_review_date(problem).is_some_and(|due| due <= today)
}

/// Signed days until the next review; negative when overdue.
pub fn days_until_review(problem: &Problem, today: NaiveDate) -> Option<i64> {
    next_review_date(problem).map(|due| (due - today).num_days())
}

/// Display classification of a problem's schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewState {
    Due,
    Scheduled,
    /// In a review stage whose anchor date was never stamped.
    Unscheduled,
    Mastered,
}

impl ReviewState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Due => "Due",
            Self::Scheduled => "Scheduled",
            Self::Unscheduled => "Unscheduled",
            Self::Mastered => "Mastered",
        }
    }
}

pub fn review_state(problem: &Problem, today: NaiveDate) -> ReviewState {
    if problem.status == ProblemStatus::Mastered {
        return ReviewState::Mastered;
    }
    match next_review_date(problem) {
        Some(due) if due <= today => ReviewState::Due,
        Some(_) => ReviewState::Scheduled,
        None => ReviewState::Unscheduled,
    }
}

/// The server exposes one endpoint per forward transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewStep {
    FirstReview,
    SecondReview,
    MasterReview,
}

impl ReviewStep {
    /// Endpoint that advances a problem currently in `status`.
    pub fn for_status(status: ProblemStatus) -> Result<Self, ReviewError> {
        match status {
            ProblemStatus::New => Ok(Self::FirstReview),
            ProblemStatus::FirstReview => Ok(Self::SecondReview),
            ProblemStatus::SecondReview => Ok(Self::MasterReview),
            ProblemStatus::Mastered => Err(ReviewError::InvalidTransition { from: status }),
        }
    }

    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::FirstReview => "first-review",
            Self::SecondReview => "second-review",
            Self::MasterReview => "master-review",
        }
    }

    pub fn target_status(&self) -> ProblemStatus {
        match self {
            Self::FirstReview => ProblemStatus::FirstReview,
            Self::SecondReview => ProblemStatus::SecondReview,
            Self::MasterReview => ProblemStatus::Mastered,
        }
    }
}

/// Local mirror of a server-side advance: bump the status and stamp the
/// matching review date with `today`. A date that is already set is kept,
/// so replaying an advance after a reset never rewrites history.
pub fn apply_advance(problem: &Problem, today: NaiveDate) -> Result<Problem, ReviewError> {
    let next = problem.status.advance()?;
    let mut updated = problem.clone();
    updated.status = next;

    let stamp = match next {
        ProblemStatus::FirstReview => Some(&mut updated.first_review_date),
        ProblemStatus::SecondReview => Some(&mut updated.second_review_date),
        ProblemStatus::Mastered => Some(&mut updated.final_review_date),
        ProblemStatus::New => None,
    };
    if let Some(slot) = stamp {
        slot.get_or_insert(today);
    }

    Ok(updated)
}

/// Local mirror of a reset. Review dates are left untouched.
pub fn apply_reset(problem: &Problem) -> Problem {
    let mut updated = problem.clone();
    updated.status = problem.status.reset();
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn problem(attempted: NaiveDate) -> Problem {
        Problem::new(1, 1, "Two Sum", Difficulty::Easy, "Array", attempted)
    }

    #[test]
    fn test_new_problem_due_three_days_after_attempt() {
        let p = problem(date(2024, 1, 30));
        assert_eq!(next_review_date(&p), Some(date(2024, 2, 2)));

        let leap = problem(date(2024, 2, 27));
        assert_eq!(next_review_date(&leap), Some(date(2024, 3, 1)));

        let year_end = problem(date(2024, 12, 30));
        assert_eq!(next_review_date(&year_end), Some(date(2025, 1, 2)));
    }

    #[test]
    fn test_review_stage_offsets() {
        let first = problem(date(2025, 1, 1))
            .with_status(ProblemStatus::FirstReview)
            .with_first_review(date(2025, 1, 4));
        assert_eq!(next_review_date(&first), Some(date(2025, 1, 11)));

        let second = problem(date(2025, 1, 1))
            .with_status(ProblemStatus::SecondReview)
            .with_first_review(date(2025, 1, 4))
            .with_second_review(date(2025, 1, 11));
        assert_eq!(next_review_date(&second), Some(date(2025, 1, 31)));
    }

    #[test]
    fn test_missing_anchor_means_unscheduled() {
        let p = problem(date(2025, 1, 1)).with_status(ProblemStatus::FirstReview);
        assert_eq!(next_review_date(&p), None);
        assert!(!is_review_due(&p, date(2030, 1, 1)));
        assert_eq!(review_state(&p, date(2030, 1, 1)), ReviewState::Unscheduled);

        let p = problem(date(2025, 1, 1)).with_status(ProblemStatus::SecondReview);
        assert_eq!(next_review_date(&p), None);
    }

    #[test]
    fn test_mastered_is_terminal() {
        let p = problem(date(2025, 1, 1))
            .with_status(ProblemStatus::Mastered)
            .with_final_review(date(2025, 2, 1));
        assert_eq!(next_review_date(&p), None);
        assert!(!is_review_due(&p, date(2030, 1, 1)));
        assert_eq!(review_state(&p, date(2030, 1, 1)), ReviewState::Mastered);
    }

    #[test]
    fn test_due_today_regardless_of_time_of_day() {
        // Attempted late in the evening; the timestamp is stripped on decode.
        let raw = serde_json::json!({
            "id": 1,
            "problem_number": 1,
            "title": "Two Sum",
            "difficulty": 1,
            "status": 1,
            "pattern": "Array",
            "date_attempted": "2025-01-01T23:59:00"
        });
        let p: Problem = serde_json::from_value(raw).unwrap();

        assert!(is_review_due(&p, date(2025, 1, 4)));
        assert!(!is_review_due(&p, date(2025, 1, 3)));
        assert_eq!(review_state(&p, date(2025, 1, 3)), ReviewState::Scheduled);
        assert_eq!(days_until_review(&p, date(2025, 1, 3)), Some(1));
        assert_eq!(days_until_review(&p, date(2025, 1, 6)), Some(-2));
    }

    #[test]
    fn test_advance_chain_fails_after_mastered() {
        let mut status = ProblemStatus::New;
        for expected in [
            ProblemStatus::FirstReview,
            ProblemStatus::SecondReview,
            ProblemStatus::Mastered,
        ] {
            status = status.advance().unwrap();
            assert_eq!(status, expected);
        }
        assert_eq!(
            status.advance(),
            Err(ReviewError::InvalidTransition {
                from: ProblemStatus::Mastered
            })
        );
    }

    #[test]
    fn test_reset_clamps_at_new() {
        let status = ProblemStatus::FirstReview.reset();
        assert_eq!(status, ProblemStatus::New);
        assert_eq!(status.reset(), ProblemStatus::New);
        assert_eq!(ProblemStatus::Mastered.reset(), ProblemStatus::SecondReview);
    }

    #[test]
    fn test_review_step_per_status() {
        assert_eq!(
            ReviewStep::for_status(ProblemStatus::New),
            Ok(ReviewStep::FirstReview)
        );
        assert_eq!(
            ReviewStep::for_status(ProblemStatus::SecondReview).map(|s| s.path_segment()),
            Ok("master-review")
        );
        assert!(ReviewStep::for_status(ProblemStatus::Mastered).is_err());
        for status in [
            ProblemStatus::New,
            ProblemStatus::FirstReview,
            ProblemStatus::SecondReview,
        ] {
            let step = ReviewStep::for_status(status).unwrap();
            assert_eq!(Ok(step.target_status()), status.advance());
        }
    }

    #[test]
    fn test_end_to_end_schedule() {
        let p = problem(date(2025, 1, 1));
        assert_eq!(next_review_date(&p), Some(date(2025, 1, 4)));

        let reviewed = apply_advance(&p, date(2025, 1, 4)).unwrap();
        assert_eq!(reviewed.status, ProblemStatus::FirstReview);
        assert_eq!(reviewed.first_review_date, Some(date(2025, 1, 4)));
        assert_eq!(next_review_date(&reviewed), Some(date(2025, 1, 11)));
        // Input is left untouched.
        assert_eq!(p.status, ProblemStatus::New);
    }

    #[test]
    fn test_advance_stamps_each_date_once() {
        let p = problem(date(2025, 1, 1));
        let first = apply_advance(&p, date(2025, 1, 4)).unwrap();
        let back = apply_reset(&first);
        assert_eq!(back.status, ProblemStatus::New);
        assert_eq!(back.first_review_date, Some(date(2025, 1, 4)));

        let again = apply_advance(&back, date(2025, 1, 9)).unwrap();
        assert_eq!(again.first_review_date, Some(date(2025, 1, 4)));

        let second = apply_advance(&again, date(2025, 1, 12)).unwrap();
        let mastered = apply_advance(&second, date(2025, 2, 1)).unwrap();
        assert_eq!(mastered.second_review_date, Some(date(2025, 1, 12)));
        assert_eq!(mastered.final_review_date, Some(date(2025, 2, 1)));
        assert!(apply_advance(&mastered, date(2025, 3, 1)).is_err());
    }

    fn any_status() -> impl Strategy<Value = ProblemStatus> {
        prop::sample::select(ProblemStatus::ALL.to_vec())
    }

    fn any_date() -> impl Strategy<Value = NaiveDate> {
        (0u64..40_000).prop_map(|n| date(1990, 1, 1).checked_add_days(Days::new(n)).unwrap())
    }

    proptest! {
        #[test]
        fn prop_new_due_is_attempt_plus_three(attempted in any_date()) {
            let due = next_review_date(&problem(attempted)).unwrap();
            prop_assert_eq!((due - attempted).num_days(), 3);
        }

        #[test]
        fn prop_reset_never_goes_below_new(status in any_status(), steps in 0usize..8) {
            let mut current = status;
            for _ in 0..steps {
                let next = current.reset();
                prop_assert!(next <= current);
                current = next;
            }
            prop_assert!(current >= ProblemStatus::New);
        }

        #[test]
        fn prop_advance_then_reset_round_trips(status in any_status()) {
            match status.advance() {
                Ok(next) => prop_assert_eq!(next.reset(), status),
                Err(_) => prop_assert_eq!(status, ProblemStatus::Mastered),
            }
        }

        #[test]
        fn prop_due_matches_date_comparison(attempted in any_date(), offset in -10i64..10) {
            let p = problem(attempted);
            let due = next_review_date(&p).unwrap();
            let today = due + chrono::Duration::days(offset);
            prop_assert_eq!(is_review_due(&p, today), offset >= 0);
        }
    }
}
