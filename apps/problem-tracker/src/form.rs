//! Add-problem form state.

use review_core::validation::{suggest_patterns, Field};
use review_core::{CreateProblemRequest, Difficulty, ProblemDraft, ValidationErrors};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct ProblemForm {
    pub draft: ProblemDraft,
    pub focus: Field,
    pub errors: ValidationErrors,
    /// Titles of existing problems that look like the one being typed.
    pub similar: Vec<String>,
    touched: HashSet<Field>,
}

impl Default for ProblemForm {
    fn default() -> Self {
        Self {
            draft: ProblemDraft::default(),
            focus: Field::ProblemNumber,
            errors: ValidationErrors::new(),
            similar: Vec::new(),
            touched: HashSet::new(),
        }
    }
}

impl ProblemForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn focus_next(&mut self) {
        self.touched.insert(self.focus);
        let index = Field::ALL.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = Field::ALL[(index + 1) % Field::ALL.len()];
    }

    pub fn focus_prev(&mut self) {
        self.touched.insert(self.focus);
        let index = Field::ALL.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = Field::ALL[(index + Field::ALL.len() - 1) % Field::ALL.len()];
    }

    pub fn insert_char(&mut self, c: char) {
        match self.focus {
            Field::Difficulty => match c.to_ascii_lowercase() {
                'e' => self.draft.difficulty = Difficulty::Easy,
                'm' => self.draft.difficulty = Difficulty::Medium,
                'h' => self.draft.difficulty = Difficulty::Hard,
                _ => {}
            },
            Field::ProblemNumber if !c.is_ascii_digit() => {}
            field => {
                if let Some(text) = self.draft.text_mut(field) {
                    text.push(c);
                }
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(text) = self.draft.text_mut(self.focus) {
            text.pop();
        }
    }

    pub fn cycle_difficulty(&mut self) {
        self.draft.difficulty = self.draft.difficulty.cycle();
    }

    pub fn suggestions(&self) -> Vec<&'static str> {
        if self.focus != Field::Pattern {
            return Vec::new();
        }
        suggest_patterns(&self.draft.pattern)
            .into_iter()
            .filter(|s| *s != self.draft.pattern)
            .collect()
    }

    /// Replace the pattern with the first suggestion. Returns false when
    /// nothing was suggested.
    pub fn accept_suggestion(&mut self) -> bool {
        match self.suggestions().first() {
            Some(suggestion) => {
                self.draft.pattern = suggestion.to_string();
                true
            }
            None => false,
        }
    }

    /// Error to show next to `field`: the submit result if there is one,
    /// otherwise a live check once the user has left the field.
    pub fn field_error(&self, field: Field) -> Option<&str> {
        if let Some(message) = self.errors.get(field) {
            return Some(message);
        }
        if self.touched.contains(&field) {
            return self.draft.field_error(field);
        }
        None
    }

    /// Title to look up for likely duplicates, if long enough to be useful.
    pub fn similar_query(&self) -> Option<String> {
        let title = self.draft.title.trim();
        (title.chars().count() >= 3).then(|| title.to_string())
    }

    pub fn submit(&mut self) -> Option<CreateProblemRequest> {
        match self.draft.validate_create() {
            Ok(request) => {
                self.errors = ValidationErrors::new();
                Some(request)
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(form: &mut ProblemForm, text: &str) {
        for c in text.chars() {
            form.insert_char(c);
        }
    }

    #[test]
    fn test_number_field_accepts_digits_only() {
        let mut form = ProblemForm::new();
        type_str(&mut form, "1a2-3");
        assert_eq!(form.draft.problem_number, "123");
        form.backspace();
        assert_eq!(form.draft.problem_number, "12");
    }

    #[test]
    fn test_focus_wraps_both_ways() {
        let mut form = ProblemForm::new();
        form.focus_prev();
        assert_eq!(form.focus, Field::Notes);
        form.focus_next();
        assert_eq!(form.focus, Field::ProblemNumber);
    }

    #[test]
    fn test_difficulty_shortcuts() {
        let mut form = ProblemForm::new();
        form.focus = Field::Difficulty;
        form.insert_char('h');
        assert_eq!(form.draft.difficulty, Difficulty::Hard);
        form.cycle_difficulty();
        assert_eq!(form.draft.difficulty, Difficulty::Easy);
    }

    #[test]
    fn test_pattern_suggestion() {
        let mut form = ProblemForm::new();
        form.focus = Field::Pattern;
        type_str(&mut form, "sli");
        assert_eq!(form.suggestions(), vec!["Sliding Window"]);
        assert!(form.accept_suggestion());
        assert_eq!(form.draft.pattern, "Sliding Window");
        assert!(form.suggestions().is_empty());
    }

    #[test]
    fn test_errors_appear_after_leaving_field() {
        let mut form = ProblemForm::new();
        form.focus = Field::Title;
        type_str(&mut form, "ab");
        assert_eq!(form.field_error(Field::Title), None);
        form.focus_next();
        assert_eq!(
            form.field_error(Field::Title),
            Some("Title must be at least 3 characters long")
        );
    }

    #[test]
    fn test_submit_collects_errors_then_succeeds() {
        let mut form = ProblemForm::new();
        assert!(form.submit().is_none());
        assert_eq!(form.field_error(Field::ProblemNumber), Some("Problem number is required"));

        form.draft = ProblemDraft {
            problem_number: "20".into(),
            title: "Valid Parentheses".into(),
            difficulty: Difficulty::Easy,
            pattern: "Stack".into(),
            notes: String::new(),
        };
        let request = form.submit().unwrap();
        assert_eq!(request.problem_number, 20);
        assert!(form.errors.is_empty());
    }
}
