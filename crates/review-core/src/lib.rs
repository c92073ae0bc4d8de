//! # review-core
//!
//! Domain logic for the coding-interview practice tracker.
//!
//! Everything in this crate is pure: no network, no terminal, no clock reads.
//! Callers pass "today" in explicitly so that scheduling answers are
//! reproducible.
//!
//! ## Modules
//!
//! - [`model`] - Problem records and the wire format shared with the API
//! - [`schedule`] - Review status state machine and due-date derivation
//! - [`pipeline`] - Filter, sort and paginate an in-memory problem list
//! - [`validation`] - Field-scoped checks for the create/edit form
//! - [`stats`] - Aggregate counts and analytics breakdowns
//! - [`loaders`] - Per-action loading flags keyed by problem

pub mod loaders;
pub mod model;
pub mod pipeline;
pub mod schedule;
pub mod stats;
pub mod validation;

pub use loaders::{ActionKind, ActionLoaders};
pub use model::{
    ApiMessage, CreateProblemRequest, CreatedProblem, Difficulty, Problem, ProblemId,
    ProblemStats, ProblemStatus, UpdateNotesRequest,
};
pub use pipeline::{
    clamp_page, distinct_patterns, FilterConfig, ListQuery, PageView, Selection, SortConfig,
    SortKey, SortOrder, DEFAULT_PAGE_SIZE,
};
pub use schedule::{
    apply_advance, apply_reset, is_review_due, next_review_date, review_state, ReviewError,
    ReviewState, ReviewStep,
};
pub use stats::{PatternStats, TimeWindow};
pub use validation::{ProblemDraft, ValidationErrors, COMMON_PATTERNS};
