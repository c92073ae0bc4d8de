//! Field-scoped checks for the add/edit form. Errors here block submission
//! and never reach the server.

use crate::model::{CreateProblemRequest, Difficulty, Problem};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub const MAX_PROBLEM_NUMBER: i64 = 10_000;
pub const TITLE_LEN: (usize, usize) = (3, 200);
pub const PATTERN_LEN: (usize, usize) = (2, 100);
pub const MAX_NOTES_LEN: usize = 1000;

/// Suggestions offered when typing a pattern.
pub const COMMON_PATTERNS: &[&str] = &[
    "Array",
    "Hash Table",
    "Two Pointers",
    "Sliding Window",
    "Dynamic Programming",
    "Binary Search",
    "Tree",
    "Graph",
    "Backtracking",
    "Greedy",
    "Stack",
    "Queue",
    "Heap",
    "Linked List",
    "String",
    "Math",
    "Bit Manipulation",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    ProblemNumber,
    Title,
    Difficulty,
    Pattern,
    Notes,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::ProblemNumber,
        Field::Title,
        Field::Difficulty,
        Field::Pattern,
        Field::Notes,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::ProblemNumber => "Problem Number",
            Self::Title => "Title",
            Self::Difficulty => "Difficulty",
            Self::Pattern => "Pattern",
            Self::Notes => "Notes",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Messages keyed by the field they belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", join_messages(.errors))]
pub struct ValidationErrors {
    errors: BTreeMap<Field, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    fn check(&mut self, field: Field, result: Option<&'static str>) {
        if let Some(message) = result {
            self.add(field, message);
        }
    }

    fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

fn join_messages(errors: &BTreeMap<Field, String>) -> String {
    errors.values().map(String::as_str).collect::<Vec<_>>().join("; ")
}

pub fn validate_problem_number(value: &str) -> Result<u32, &'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Err("Problem number is required");
    }
    let number: i64 = value
        .parse()
        .map_err(|_| "Problem number must be a positive integer")?;
    if number <= 0 {
        return Err("Problem number must be a positive integer");
    }
    if number > MAX_PROBLEM_NUMBER {
        return Err("Problem number seems unusually high");
    }
    u32::try_from(number).map_err(|_| "Problem number seems unusually high")
}

pub fn validate_title(value: &str) -> Option<&'static str> {
    let len = value.trim().chars().count();
    if len == 0 {
        Some("Title is required")
    } else if len < TITLE_LEN.0 {
        Some("Title must be at least 3 characters long")
    } else if len > TITLE_LEN.1 {
        Some("Title must be at most 200 characters")
    } else {
        None
    }
}

pub fn validate_pattern(value: &str) -> Option<&'static str> {
    let len = value.trim().chars().count();
    if len == 0 {
        Some("Pattern is required")
    } else if len < PATTERN_LEN.0 {
        Some("Pattern must be at least 2 characters long")
    } else if len > PATTERN_LEN.1 {
        Some("Pattern must be at most 100 characters")
    } else {
        None
    }
}

pub fn validate_notes(value: &str) -> Option<&'static str> {
    (value.chars().count() > MAX_NOTES_LEN).then_some("Notes must be at most 1000 characters")
}

/// Raw form input, kept as typed until submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProblemDraft {
    pub problem_number: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub pattern: String,
    pub notes: String,
}

impl ProblemDraft {
    pub fn from_problem(problem: &Problem) -> Self {
        Self {
            problem_number: problem.problem_number.to_string(),
            title: problem.title.clone(),
            difficulty: problem.difficulty,
            pattern: problem.pattern.clone(),
            notes: problem.notes.clone(),
        }
    }

    pub fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::ProblemNumber => Some(&self.problem_number),
            Field::Title => Some(&self.title),
            Field::Pattern => Some(&self.pattern),
            Field::Notes => Some(&self.notes),
            Field::Difficulty => None,
        }
    }

    pub fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::ProblemNumber => Some(&mut self.problem_number),
            Field::Title => Some(&mut self.title),
            Field::Pattern => Some(&mut self.pattern),
            Field::Notes => Some(&mut self.notes),
            Field::Difficulty => None,
        }
    }

    /// Message for a single field, used to show errors as the user types.
    pub fn field_error(&self, field: Field) -> Option<&'static str> {
        match field {
            Field::ProblemNumber => validate_problem_number(&self.problem_number).err(),
            Field::Title => validate_title(&self.title),
            Field::Pattern => validate_pattern(&self.pattern),
            Field::Notes => validate_notes(&self.notes),
            Field::Difficulty => None,
        }
    }

    /// Check every field and build the create request. Text is trimmed and
    /// blank notes are omitted.
    pub fn validate_create(&self) -> Result<CreateProblemRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let number = match validate_problem_number(&self.problem_number) {
            Ok(number) => number,
            Err(message) => {
                errors.add(Field::ProblemNumber, message);
                0
            }
        };
        errors.check(Field::Title, validate_title(&self.title));
        errors.check(Field::Pattern, validate_pattern(&self.pattern));
        errors.check(Field::Notes, validate_notes(&self.notes));

        let notes = self.notes.trim();
        errors.into_result(CreateProblemRequest {
            problem_number: number,
            title: self.title.trim().to_string(),
            difficulty: self.difficulty,
            pattern: self.pattern.trim().to_string(),
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        })
    }

    /// The problem number is fixed after creation, so edits skip it.
    pub fn validate_edit(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(Field::Title, validate_title(&self.title));
        errors.check(Field::Pattern, validate_pattern(&self.pattern));
        errors.check(Field::Notes, validate_notes(&self.notes));
        errors.into_result(())
    }
}

/// Common patterns starting with `prefix`, ignoring case.
pub fn suggest_patterns(prefix: &str) -> Vec<&'static str> {
    let prefix = prefix.trim().to_lowercase();
    if prefix.is_empty() {
        return Vec::new();
    }
    COMMON_PATTERNS
        .iter()
        .copied()
        .filter(|p| p.to_lowercase().starts_with(&prefix))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn draft() -> ProblemDraft {
        ProblemDraft {
            problem_number: " 15 ".into(),
            title: "  3Sum ".into(),
            difficulty: Difficulty::Medium,
            pattern: "Two Pointers".into(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_problem_number_rules() {
        assert_eq!(validate_problem_number("1"), Ok(1));
        assert_eq!(validate_problem_number("10000"), Ok(10_000));
        assert_eq!(validate_problem_number("  "), Err("Problem number is required"));
        assert_eq!(
            validate_problem_number("0"),
            Err("Problem number must be a positive integer")
        );
        assert_eq!(
            validate_problem_number("-3"),
            Err("Problem number must be a positive integer")
        );
        assert_eq!(
            validate_problem_number("abc"),
            Err("Problem number must be a positive integer")
        );
        assert_eq!(
            validate_problem_number("10001"),
            Err("Problem number seems unusually high")
        );
    }

    #[test]
    fn test_title_and_pattern_bounds() {
        assert_eq!(validate_title(""), Some("Title is required"));
        assert!(validate_title("ab").is_some());
        assert!(validate_title("abc").is_none());
        assert!(validate_title(&"x".repeat(200)).is_none());
        assert!(validate_title(&"x".repeat(201)).is_some());

        assert_eq!(validate_pattern("   "), Some("Pattern is required"));
        assert!(validate_pattern("a").is_some());
        assert!(validate_pattern("DP").is_none());
        assert!(validate_pattern(&"p".repeat(101)).is_some());
    }

    #[test]
    fn test_notes_limit_counts_chars() {
        assert!(validate_notes("").is_none());
        assert!(validate_notes(&"é".repeat(1000)).is_none());
        assert!(validate_notes(&"n".repeat(1001)).is_some());
    }

    #[test]
    fn test_validate_create_trims_and_omits_blank_notes() {
        let request = draft().validate_create().unwrap();
        assert_eq!(request.problem_number, 15);
        assert_eq!(request.title, "3Sum");
        assert_eq!(request.difficulty, Difficulty::Medium);
        assert_eq!(request.notes, None);
    }

    #[test]
    fn test_validate_create_collects_every_field() {
        let bad = ProblemDraft {
            problem_number: "zero".into(),
            title: "x".into(),
            pattern: String::new(),
            notes: "n".repeat(1001),
            ..Default::default()
        };
        let errors = bad.validate_create().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get(Field::Pattern), Some("Pattern is required"));
        assert!(errors.get(Field::Difficulty).is_none());
        assert!(errors.to_string().contains("Title must be at least 3"));
    }

    #[test]
    fn test_edit_ignores_problem_number() {
        let problem = Problem::new(
            1,
            1,
            "Two Sum",
            Difficulty::Easy,
            "Array",
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        );
        let mut edit = ProblemDraft::from_problem(&problem);
        edit.problem_number.clear();
        assert!(edit.validate_edit().is_ok());

        edit.title = "ab".into();
        assert_eq!(
            edit.validate_edit().unwrap_err().get(Field::Title),
            Some("Title must be at least 3 characters long")
        );
    }

    #[test]
    fn test_pattern_suggestions() {
        assert_eq!(suggest_patterns("tw"), vec!["Two Pointers"]);
        assert_eq!(suggest_patterns("B"), vec!["Binary Search", "Backtracking", "Bit Manipulation"]);
        assert!(suggest_patterns("").is_empty());
    }
}
