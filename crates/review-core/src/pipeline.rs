//! Filter, sort and paginate the in-memory problem list.
//!
//! The pipeline holds no state of its own. Given the same slice and the same
//! [`ListQuery`] it returns the same references in the same order, so it can
//! be rerun on every keystroke.

use crate::model::{Difficulty, Problem, ProblemStatus};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// A filter value where `All` never excludes anything.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Self::All
    }
}

impl<T> Selection<T> {
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Self::All => None,
            Self::Only(value) => Some(value),
        }
    }
}

impl<T: PartialEq> Selection<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == value,
        }
    }
}

impl<T: FromStr> Selection<T> {
    /// `"all"` (any case) and the empty string are wildcards.
    pub fn parse(raw: &str) -> Result<Self, T::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        trimmed.parse().map(Self::Only)
    }
}

impl<T: fmt::Display> fmt::Display for Selection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Only(value) => value.fmt(f),
        }
    }
}

/// Step a selection through `All` followed by each of `values` in order.
pub fn cycle_selection<T: Clone + PartialEq>(current: &Selection<T>, values: &[T]) -> Selection<T> {
    let next_index = match current {
        Selection::All => 0,
        Selection::Only(value) => match values.iter().position(|v| v == value) {
            Some(i) => i + 1,
            None => values.len(),
        },
    };
    values
        .get(next_index)
        .cloned()
        .map_or(Selection::All, Selection::Only)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    /// Case-insensitive substring matched against title, number, pattern and notes.
    pub search: String,
    pub difficulty: Selection<Difficulty>,
    pub status: Selection<ProblemStatus>,
    pub pattern: Selection<String>,
}

impl FilterConfig {
    pub fn matches(&self, problem: &Problem) -> bool {
        self.matches_search(problem)
            && self.difficulty.matches(&problem.difficulty)
            && self.status.matches(&problem.status)
            && self.matches_pattern(problem)
    }

    /// Patterns compare trimmed, the same way `distinct_patterns` lists them.
    fn matches_pattern(&self, problem: &Problem) -> bool {
        self.pattern
            .as_option()
            .map_or(true, |wanted| wanted.trim() == problem.pattern.trim())
    }

    fn matches_search(&self, problem: &Problem) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        problem.title.to_lowercase().contains(&needle)
            || problem.problem_number.to_string().contains(&needle)
            || problem.pattern.to_lowercase().contains(&needle)
            || problem.notes.to_lowercase().contains(&needle)
    }

    pub fn is_active(&self) -> bool {
        !self.search.is_empty()
            || !self.difficulty.is_all()
            || !self.status.is_all()
            || !self.pattern.is_all()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    ProblemNumber,
    Title,
    Difficulty,
    Status,
    Pattern,
    DateAttempted,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::ProblemNumber,
        SortKey::Title,
        SortKey::Difficulty,
        SortKey::Status,
        SortKey::Pattern,
        SortKey::DateAttempted,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::ProblemNumber => "Number",
            Self::Title => "Title",
            Self::Difficulty => "Difficulty",
            Self::Status => "Status",
            Self::Pattern => "Pattern",
            Self::DateAttempted => "Date Attempted",
        }
    }

    pub fn cycle(&self) -> Self {
        let index = Self::ALL.iter().position(|k| k == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn compare(&self, a: &Problem, b: &Problem) -> Ordering {
        match self {
            Self::ProblemNumber => a.problem_number.cmp(&b.problem_number),
            Self::Title => cmp_ignore_case(&a.title, &b.title),
            Self::Difficulty => a.difficulty.cmp(&b.difficulty),
            Self::Status => a.status.cmp(&b.status),
            Self::Pattern => cmp_ignore_case(&a.pattern, &b.pattern),
            Self::DateAttempted => a.date_attempted.cmp(&b.date_attempted),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "problemnumber" | "number" => Ok(Self::ProblemNumber),
            "title" => Ok(Self::Title),
            "difficulty" => Ok(Self::Difficulty),
            "status" => Ok(Self::Status),
            "pattern" => Ok(Self::Pattern),
            "dateattempted" | "date" => Ok(Self::DateAttempted),
            _ => Err(format!("unknown sort key: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn toggle(&self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Self::Asc => "↑",
            Self::Desc => "↓",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub key: SortKey,
    pub order: SortOrder,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            key: SortKey::DateAttempted,
            order: SortOrder::Desc,
        }
    }
}

impl SortConfig {
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }

    pub fn compare(&self, a: &Problem, b: &Problem) -> Ordering {
        let ordering = self.key.compare(a, b);
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Full configuration for one rendering of the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: FilterConfig,
    pub sort: SortConfig,
    pub page_size: usize,
    /// 1-indexed.
    pub current_page: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            sort: SortConfig::default(),
            page_size: DEFAULT_PAGE_SIZE,
            current_page: 1,
        }
    }
}

impl ListQuery {
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn run<'a>(&self, problems: &'a [Problem]) -> PageView<'a> {
        run(problems, self)
    }

    /// Pull `current_page` back into range for a list of `filtered_count` items.
    pub fn clamp_to(&mut self, filtered_count: usize) {
        let pages = total_pages(filtered_count, self.page_size);
        self.current_page = clamp_page(self.current_page, pages);
    }
}

/// One page of results plus the counts needed to draw a pager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView<'a> {
    pub items: Vec<&'a Problem>,
    pub filtered_count: usize,
    pub total_pages: usize,
    pub current_page: usize,
}

impl PageView<'_> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

pub fn filter_problems<'a>(problems: &'a [Problem], filter: &FilterConfig) -> Vec<&'a Problem> {
    problems.iter().filter(|p| filter.matches(p)).collect()
}

/// Stable: equal keys keep their input order.
pub fn sort_problems(items: &mut [&Problem], sort: &SortConfig) {
    items.sort_by(|a, b| sort.compare(a, b));
}

/// Never less than one, even for an empty list.
pub fn total_pages(filtered_count: usize, page_size: usize) -> usize {
    filtered_count.div_ceil(page_size.max(1)).max(1)
}

/// Slice out a 1-indexed page. Pages outside the list are empty rather than
/// clamped; use [`clamp_page`] first when that is not wanted.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let page_size = page_size.max(1);
    let Some(start) = page
        .checked_sub(1)
        .and_then(|p| p.checked_mul(page_size))
    else {
        return &[];
    };
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

pub fn clamp_page(current: usize, total_pages: usize) -> usize {
    current.clamp(1, total_pages.max(1))
}

pub fn run<'a>(problems: &'a [Problem], query: &ListQuery) -> PageView<'a> {
    let mut filtered = filter_problems(problems, &query.filter);
    sort_problems(&mut filtered, &query.sort);
    let filtered_count = filtered.len();
    let items = paginate(&filtered, query.current_page, query.page_size).to_vec();

    PageView {
        items,
        filtered_count,
        total_pages: total_pages(filtered_count, query.page_size),
        current_page: query.current_page,
    }
}

/// Non-empty patterns in the list, deduplicated and ordered without regard to case.
pub fn distinct_patterns(problems: &[Problem]) -> Vec<String> {
    let unique: BTreeSet<&str> = problems
        .iter()
        .map(|p| p.pattern.trim())
        .filter(|p| !p.is_empty())
        .collect();
    let mut patterns: Vec<String> = unique.into_iter().map(str::to_string).collect();
    patterns.sort_by(|a, b| cmp_ignore_case(a, b).then_with(|| a.cmp(b)));
    patterns
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}
