//! Aggregate counts and analytics breakdowns, derived from the local list.

use crate::model::{Difficulty, Problem, ProblemStats, ProblemStatus};
use crate::schedule::is_review_due;
use chrono::{Days, NaiveDate};
use std::collections::{BTreeSet, HashMap};

impl ProblemStats {
    /// Same counts the server reports, computed from whatever is loaded.
    pub fn from_problems<'a, I>(problems: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a Problem>,
    {
        let mut stats = Self::default();
        for problem in problems {
            stats.total_problems += 1;
            match problem.status {
                ProblemStatus::New => stats.new_count += 1,
                ProblemStatus::FirstReview => stats.first_review_count += 1,
                ProblemStatus::SecondReview => stats.second_review_count += 1,
                ProblemStatus::Mastered => stats.mastered_count += 1,
            }
            match problem.difficulty {
                Difficulty::Easy => stats.easy_count += 1,
                Difficulty::Medium => stats.medium_count += 1,
                Difficulty::Hard => stats.hard_count += 1,
            }
            if is_review_due(problem, today) {
                stats.reviews_due_today += 1;
            }
        }
        stats
    }

    pub fn status_count(&self, status: ProblemStatus) -> u32 {
        match status {
            ProblemStatus::New => self.new_count,
            ProblemStatus::FirstReview => self.first_review_count,
            ProblemStatus::SecondReview => self.second_review_count,
            ProblemStatus::Mastered => self.mastered_count,
        }
    }

    pub fn difficulty_count(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.easy_count,
            Difficulty::Medium => self.medium_count,
            Difficulty::Hard => self.hard_count,
        }
    }

    pub fn in_progress(&self) -> u32 {
        self.first_review_count + self.second_review_count
    }

    pub fn mastery_rate(&self) -> u32 {
        mastery_rate(self.total_problems, self.mastered_count)
    }
}

/// `part / total` as a whole percentage, rounded half up. Zero when `total` is zero.
pub fn percentage(part: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let (part, total) = (u64::from(part), u64::from(total));
    ((200 * part + total) / (2 * total)) as u32
}

pub fn mastery_rate(total: u32, mastered: u32) -> u32 {
    percentage(mastered, total)
}

/// One bar in a breakdown chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakdown {
    pub label: &'static str,
    pub count: u32,
    pub percentage: u32,
}

pub fn difficulty_breakdown(stats: &ProblemStats) -> Vec<Breakdown> {
    Difficulty::ALL
        .iter()
        .map(|d| {
            let count = stats.difficulty_count(*d);
            Breakdown {
                label: d.label(),
                count,
                percentage: percentage(count, stats.total_problems),
            }
        })
        .collect()
}

pub fn status_breakdown(stats: &ProblemStats) -> Vec<Breakdown> {
    ProblemStatus::ALL
        .iter()
        .map(|s| {
            let count = stats.status_count(*s);
            Breakdown {
                label: s.label(),
                count,
                percentage: percentage(count, stats.total_problems),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternStats {
    pub pattern: String,
    pub count: u32,
    pub mastered: u32,
    pub mastery_percentage: u32,
}

/// Per-pattern totals, largest first. Ties are ordered by pattern name.
pub fn pattern_stats<'a, I>(problems: I) -> Vec<PatternStats>
where
    I: IntoIterator<Item = &'a Problem>,
{
    let mut by_pattern: HashMap<&str, (u32, u32)> = HashMap::new();
    for problem in problems {
        let pattern = problem.pattern.trim();
        if pattern.is_empty() {
            continue;
        }
        let entry = by_pattern.entry(pattern).or_default();
        entry.0 += 1;
        if problem.status == ProblemStatus::Mastered {
            entry.1 += 1;
        }
    }

    let mut stats: Vec<PatternStats> = by_pattern
        .into_iter()
        .map(|(pattern, (count, mastered))| PatternStats {
            pattern: pattern.to_string(),
            count,
            mastered,
            mastery_percentage: percentage(mastered, count),
        })
        .collect();
    stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.pattern.cmp(&b.pattern)));
    stats
}

/// Analytics range over `date_attempted`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimeWindow {
    Days7,
    #[default]
    Days30,
    Days90,
    All,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 4] = [
        TimeWindow::Days7,
        TimeWindow::Days30,
        TimeWindow::Days90,
        TimeWindow::All,
    ];

    pub fn days(&self) -> Option<u64> {
        match self {
            Self::Days7 => Some(7),
            Self::Days30 => Some(30),
            Self::Days90 => Some(90),
            Self::All => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Days7 => "Last 7 days",
            Self::Days30 => "Last 30 days",
            Self::Days90 => "Last 90 days",
            Self::All => "All time",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Days7 => Self::Days30,
            Self::Days30 => Self::Days90,
            Self::Days90 => Self::All,
            Self::All => Self::Days7,
        }
    }

    /// Includes `today` and the `days - 1` days before it.
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        let Some(days) = self.days() else {
            return true;
        };
        match today.checked_sub_days(Days::new(days - 1)) {
            Some(start) => date >= start && date <= today,
            None => date <= today,
        }
    }

    pub fn apply<'a>(&self, problems: &'a [Problem], today: NaiveDate) -> Vec<&'a Problem> {
        problems
            .iter()
            .filter(|p| self.contains(p.date_attempted, today))
            .collect()
    }
}

/// Consecutive calendar days, ending today, with at least one attempt.
pub fn attempt_streak<'a, I>(problems: I, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = &'a Problem>,
{
    let days: BTreeSet<NaiveDate> = problems.into_iter().map(|p| p.date_attempted).collect();
    let mut streak = 0;
    let mut cursor = Some(today);
    while let Some(day) = cursor.filter(|d| days.contains(d)) {
        streak += 1;
        cursor = day.pred_opt();
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<Problem> {
        vec![
            Problem::new(1, 1, "Two Sum", Difficulty::Easy, "Array", date(2025, 3, 10)),
            Problem::new(2, 15, "3Sum", Difficulty::Medium, "Two Pointers", date(2025, 3, 9))
                .with_status(ProblemStatus::Mastered),
            Problem::new(3, 11, "Container With Most Water", Difficulty::Medium, "Two Pointers", date(2025, 3, 8))
                .with_status(ProblemStatus::FirstReview)
                .with_first_review(date(2025, 3, 9)),
            Problem::new(4, 42, "Trapping Rain Water", Difficulty::Hard, "Two Pointers", date(2025, 1, 2))
                .with_status(ProblemStatus::SecondReview),
        ]
    }

    #[test]
    fn test_from_problems_counts() {
        let today = date(2025, 3, 10);
        let stats = ProblemStats::from_problems(&sample(), today);
        assert_eq!(stats.total_problems, 4);
        assert_eq!(stats.new_count, 1);
        assert_eq!(stats.first_review_count, 1);
        assert_eq!(stats.second_review_count, 1);
        assert_eq!(stats.mastered_count, 1);
        assert_eq!(stats.medium_count, 2);
        // #1 is due 03-13, #3 is due 03-16 and #4 has no anchor.
        assert_eq!(stats.reviews_due_today, 0);

        let later = ProblemStats::from_problems(&sample(), date(2025, 3, 16));
        assert_eq!(later.reviews_due_today, 2);
        assert_eq!(later.in_progress(), 2);
    }

    #[test]
    fn test_percentages_round_half_up() {
        assert_eq!(mastery_rate(0, 0), 0);
        assert_eq!(mastery_rate(3, 1), 33);
        assert_eq!(mastery_rate(3, 2), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(5, 5), 100);
    }

    #[test]
    fn test_breakdowns_follow_enum_order() {
        let stats = ProblemStats::from_problems(&sample(), date(2025, 3, 10));
        let difficulty = difficulty_breakdown(&stats);
        assert_eq!(
            difficulty.iter().map(|b| (b.label, b.count, b.percentage)).collect::<Vec<_>>(),
            vec![("Easy", 1, 25), ("Medium", 2, 50), ("Hard", 1, 25)]
        );
        let status = status_breakdown(&stats);
        assert_eq!(status.len(), 4);
        assert_eq!(status[3].label, "Mastered");
        assert_eq!(stats.mastery_rate(), 25);
    }

    #[test]
    fn test_pattern_stats_sorted_by_count() {
        let stats = pattern_stats(&sample());
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].pattern, "Two Pointers");
        assert_eq!(stats[0].count, 3);
        assert_eq!(stats[0].mastered, 1);
        assert_eq!(stats[0].mastery_percentage, 33);
        assert_eq!(stats[1].pattern, "Array");
    }

    #[test]
    fn test_time_window_is_inclusive_of_today() {
        let today = date(2025, 3, 10);
        assert!(TimeWindow::Days7.contains(date(2025, 3, 4), today));
        assert!(!TimeWindow::Days7.contains(date(2025, 3, 3), today));
        assert!(TimeWindow::All.contains(date(1999, 1, 1), today));
        assert_eq!(TimeWindow::default(), TimeWindow::Days30);
        assert_eq!(TimeWindow::Days30.apply(&sample(), today).len(), 3);
        assert_eq!(TimeWindow::All.next(), TimeWindow::Days7);
    }

    #[test]
    fn test_attempt_streak_counts_distinct_days() {
        let problems = sample();
        assert_eq!(attempt_streak(&problems, date(2025, 3, 10)), 3);
        assert_eq!(attempt_streak(&problems, date(2025, 3, 11)), 0);

        let mut doubled = problems.clone();
        doubled.push(Problem::new(5, 5, "Longest Palindrome", Difficulty::Easy, "String", date(2025, 3, 10)));
        assert_eq!(attempt_streak(&doubled, date(2025, 3, 10)), 3);
    }
}
