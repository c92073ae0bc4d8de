//! Advisory loading flags, one per `(action, problem)` pair.
//!
//! These only stop the same button from firing twice while a request is
//! outstanding. Two different actions on the same problem can still run at
//! the same time.

use crate::model::ProblemId;
use std::collections::HashSet;

/// Id used for the submit flag of a problem that does not exist yet.
pub const NEW_PROBLEM_ID: ProblemId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    MarkReviewed,
    NeedsMoreReview,
    Delete,
    Submit,
    UpdateNotes,
}

impl ActionKind {
    /// Fills the blank in "Failed to ___. Please try again."
    pub fn description(&self) -> &'static str {
        match self {
            Self::MarkReviewed => "mark problem as reviewed",
            Self::NeedsMoreReview => "mark problem for more review",
            Self::Delete => "delete problem",
            Self::Submit => "save problem",
            Self::UpdateNotes => "update notes",
        }
    }

    pub fn failure_message(&self) -> String {
        format!("Failed to {}. Please try again.", self.description())
    }

    pub fn success_message(&self) -> String {
        format!("Successfully completed {}.", self.description())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ActionLoaders {
    in_flight: HashSet<(ActionKind, ProblemId)>,
}

impl ActionLoaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the pair as loading. Returns false if it already was, in which
    /// case the caller should drop the action.
    pub fn begin(&mut self, kind: ActionKind, id: ProblemId) -> bool {
        self.in_flight.insert((kind, id))
    }

    pub fn finish(&mut self, kind: ActionKind, id: ProblemId) {
        self.in_flight.remove(&(kind, id));
    }

    pub fn is_loading(&self, kind: ActionKind, id: ProblemId) -> bool {
        self.in_flight.contains(&(kind, id))
    }

    /// True when any action on `id` is outstanding.
    pub fn is_busy(&self, id: ProblemId) -> bool {
        self.in_flight.iter().any(|(_, busy)| *busy == id)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_begin_is_refused() {
        let mut loaders = ActionLoaders::new();
        assert!(loaders.begin(ActionKind::Delete, 7));
        assert!(!loaders.begin(ActionKind::Delete, 7));
        assert!(loaders.is_loading(ActionKind::Delete, 7));

        loaders.finish(ActionKind::Delete, 7);
        assert!(!loaders.is_loading(ActionKind::Delete, 7));
        assert!(loaders.begin(ActionKind::Delete, 7));
    }

    #[test]
    fn test_kinds_and_ids_are_independent() {
        let mut loaders = ActionLoaders::new();
        assert!(loaders.begin(ActionKind::MarkReviewed, 1));
        assert!(loaders.begin(ActionKind::Delete, 1));
        assert!(loaders.begin(ActionKind::MarkReviewed, 2));
        assert_eq!(loaders.in_flight(), 3);
        assert!(loaders.is_busy(1));
        assert!(!loaders.is_busy(3));
    }

    #[test]
    fn test_finish_unknown_key_is_noop() {
        let mut loaders = ActionLoaders::new();
        loaders.finish(ActionKind::Submit, NEW_PROBLEM_ID);
        assert_eq!(loaders.in_flight(), 0);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ActionKind::Delete.failure_message(),
            "Failed to delete problem. Please try again."
        );
        assert_eq!(
            ActionKind::UpdateNotes.success_message(),
            "Successfully completed update notes."
        );
    }
}
