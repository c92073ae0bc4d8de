use chrono::{Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use review_core::loaders::NEW_PROBLEM_ID;
use review_core::pipeline::{cycle_selection, filter_problems};
use review_core::validation::{validate_notes, Field};
use review_core::{
    apply_advance, apply_reset, distinct_patterns, ActionKind, ActionLoaders, ApiMessage,
    CreatedProblem, Difficulty, ListQuery, PageView, Problem, ProblemId, ProblemStats,
    ProblemStatus, ReviewStep, TimeWindow,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::client::{ApiResult, ProblemApi};
use crate::config::Config;
use crate::form::ProblemForm;
use crate::toast::Toast;

const OUTCOME_BUFFER: usize = 64;
const SIMILAR_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Problems,
    Detail,
    Add,
    Analytics,
}

impl View {
    /// Views reachable from the tab bar. Detail is opened from a list.
    pub const TABS: [View; 4] = [View::Dashboard, View::Problems, View::Add, View::Analytics];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Problems => "Problems",
            Self::Detail => "Problem",
            Self::Add => "Add Problem",
            Self::Analytics => "Analytics",
        }
    }

    pub fn tab_index(&self) -> usize {
        match self {
            Self::Dashboard => 0,
            Self::Problems | Self::Detail => 1,
            Self::Add => 2,
            Self::Analytics => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    EditNotes,
    Confirm,
}

/// Which server list feeds the dashboard queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueSource {
    Reviews,
    Today,
}

impl QueueSource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Reviews => "Due for Review",
            Self::Today => "Attempted Today",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Self::Reviews => Self::Today,
            Self::Today => Self::Reviews,
        }
    }
}

/// The review-progress fields an advance or reset touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleFields {
    pub status: ProblemStatus,
    pub first_review_date: Option<NaiveDate>,
    pub second_review_date: Option<NaiveDate>,
    pub final_review_date: Option<NaiveDate>,
}

impl ScheduleFields {
    pub fn of(problem: &Problem) -> Self {
        Self {
            status: problem.status,
            first_review_date: problem.first_review_date,
            second_review_date: problem.second_review_date,
            final_review_date: problem.final_review_date,
        }
    }

    pub fn apply_to(&self, problem: &mut Problem) {
        problem.status = self.status;
        problem.first_review_date = self.first_review_date;
        problem.second_review_date = self.second_review_date;
        problem.final_review_date = self.final_review_date;
    }
}

/// How to undo an optimistic change if the server rejects it. Only the
/// fields the action changed are restored, so a concurrent action on the
/// same problem keeps its result.
#[derive(Debug, Clone)]
pub enum Rollback {
    Schedule(ScheduleFields),
    Notes(String),
    Reinsert {
        problem: Problem,
        list_index: Option<usize>,
        queue_index: Option<usize>,
    },
}

/// Completion of a background request.
#[derive(Debug)]
pub enum Outcome {
    Problems(ApiResult<Vec<Problem>>),
    Queue(QueueSource, ApiResult<Vec<Problem>>),
    Stats(ApiResult<Option<ProblemStats>>),
    Fetched(ProblemId, ApiResult<Option<Problem>>),
    Similar(String, ApiResult<Vec<Problem>>),
    Created(ApiResult<Option<CreatedProblem>>),
    Mutation {
        kind: ActionKind,
        id: ProblemId,
        result: ApiResult<Option<ApiMessage>>,
        rollback: Rollback,
    },
}

pub struct App {
    pub config: Config,
    api: Arc<dyn ProblemApi>,
    outcome_tx: mpsc::Sender<Outcome>,
    outcome_rx: mpsc::Receiver<Outcome>,

    pub view: View,
    previous_view: View,
    pub input_mode: InputMode,
    pub today: NaiveDate,

    // Data
    pub problems: Vec<Problem>,
    pub queue: Vec<Problem>,
    pub queue_source: QueueSource,
    pub server_stats: Option<ProblemStats>,

    // List state
    pub query: ListQuery,
    pub selected_row: usize,
    pub selected_queue: usize,

    // Detail state
    pub current: Option<ProblemId>,
    pub notes_buffer: String,
    pub confirm_delete: Option<ProblemId>,

    pub form: ProblemForm,
    pub analytics_window: TimeWindow,

    pub loaders: ActionLoaders,
    pub pending_loads: usize,
    pub toast: Option<Toast>,
    pub show_help: bool,
}

impl App {
    pub fn new(config: Config, api: Arc<dyn ProblemApi>) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel(OUTCOME_BUFFER);
        let query = ListQuery::default().with_page_size(config.display.page_size);

        Self {
            config,
            api,
            outcome_tx,
            outcome_rx,
            view: View::Dashboard,
            previous_view: View::Dashboard,
            input_mode: InputMode::Normal,
            today: Local::now().date_naive(),
            problems: Vec::new(),
            queue: Vec::new(),
            queue_source: QueueSource::Reviews,
            server_stats: None,
            query,
            selected_row: 0,
            selected_queue: 0,
            current: None,
            notes_buffer: String::new(),
            confirm_delete: None,
            form: ProblemForm::new(),
            analytics_window: TimeWindow::default(),
            loaders: ActionLoaders::new(),
            pending_loads: 0,
            toast: None,
            show_help: false,
        }
    }

    // ---- background work ----

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let outcome = task.await;
            let _ = tx.send(outcome).await;
        });
    }

    pub fn refresh(&mut self) {
        info!("refreshing problem list");
        let api = Arc::clone(&self.api);
        self.pending_loads += 1;
        self.spawn(async move { Outcome::Problems(api.list().await) });
        self.refresh_overview();
    }

    /// Reload the pieces the server computes: stats and the review queue.
    pub fn refresh_overview(&mut self) {
        let api = Arc::clone(&self.api);
        self.pending_loads += 1;
        self.spawn(async move { Outcome::Stats(api.stats().await) });
        self.load_queue();
    }

    fn load_queue(&mut self) {
        let api = Arc::clone(&self.api);
        let source = self.queue_source;
        self.pending_loads += 1;
        self.spawn(async move {
            let result = match source {
                QueueSource::Reviews => api.list_reviews().await,
                QueueSource::Today => api.list_today().await,
            };
            Outcome::Queue(source, result)
        });
    }

    /// Apply every completed request without blocking.
    pub fn drain_outcomes(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.apply_outcome(outcome);
        }
    }

    /// Advance the clock and expire the toast.
    pub fn tick(&mut self, today: NaiveDate) {
        self.today = today;
        let ttl = Duration::from_secs(self.config.display.toast_secs);
        if self.toast.as_ref().is_some_and(|t| t.is_expired(ttl)) {
            self.toast = None;
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending_loads > 0
    }

    fn finish_load(&mut self) {
        self.pending_loads = self.pending_loads.saturating_sub(1);
    }

    pub fn apply_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Problems(result) => {
                self.finish_load();
                match result {
                    Ok(problems) => {
                        debug!(count = problems.len(), "problems loaded");
                        self.problems = problems;
                        self.clamp_page();
                    }
                    Err(err) => {
                        warn!(error = %err, "failed to load problems");
                        self.toast = Some(Toast::error("Failed to load problems. Please try again."));
                    }
                }
            }
            Outcome::Queue(source, result) => {
                self.finish_load();
                if source != self.queue_source {
                    return;
                }
                match result {
                    Ok(mut queue) => {
                        queue.truncate(self.config.display.review_queue_limit);
                        self.queue = queue;
                        self.selected_queue = self.selected_queue.min(self.queue.len().saturating_sub(1));
                    }
                    Err(err) => {
                        warn!(error = %err, "failed to load review queue");
                        self.toast = Some(Toast::error("Failed to load reviews. Please try again."));
                    }
                }
            }
            Outcome::Stats(result) => {
                self.finish_load();
                match result {
                    Ok(stats) => self.server_stats = stats,
                    Err(err) => warn!(error = %err, "failed to load stats"),
                }
            }
            Outcome::Fetched(id, result) => match result {
                Ok(Some(problem)) => self.upsert(problem),
                Ok(None) => {
                    if self.current == Some(id) && self.find(id).is_none() {
                        self.toast = Some(Toast::warning("Problem not found."));
                        self.close_detail();
                    }
                }
                Err(err) => {
                    warn!(id, error = %err, "failed to fetch problem");
                    self.toast = Some(Toast::error("Failed to load problem. Please try again."));
                }
            },
            Outcome::Similar(query, result) => match result {
                Ok(matches) => {
                    if self.form.draft.title.trim() == query {
                        self.form.similar = matches
                            .iter()
                            .take(SIMILAR_LIMIT)
                            .map(|p| format!("#{} {}", p.problem_number, p.title))
                            .collect();
                    }
                }
                Err(err) => debug!(error = %err, "similar-title lookup failed"),
            },
            Outcome::Created(result) => {
                self.loaders.finish(ActionKind::Submit, NEW_PROBLEM_ID);
                match result {
                    Ok(created) => {
                        info!(id = ?created.map(|c| c.id), "problem created");
                        self.toast = Some(Toast::success(ActionKind::Submit.success_message()));
                        self.form.reset();
                        self.view = View::Problems;
                        self.refresh();
                    }
                    Err(err) => {
                        warn!(error = %err, "failed to create problem");
                        self.toast = Some(Toast::error(ActionKind::Submit.failure_message()));
                    }
                }
            }
            Outcome::Mutation {
                kind,
                id,
                result,
                rollback,
            } => {
                self.loaders.finish(kind, id);
                match result {
                    Ok(message) => {
                        info!(id, ?kind, "action confirmed");
                        let text = message
                            .map(|m| m.message)
                            .unwrap_or_else(|| kind.success_message());
                        self.toast = Some(Toast::success(text));
                        self.refresh_overview();
                    }
                    Err(err) => {
                        warn!(id, ?kind, error = %err, "action failed, rolling back");
                        self.rollback(id, rollback);
                        self.toast = Some(Toast::error(kind.failure_message()));
                    }
                }
            }
        }
    }

    // ---- local data helpers ----

    pub fn find(&self, id: ProblemId) -> Option<&Problem> {
        self.problems
            .iter()
            .chain(self.queue.iter())
            .find(|p| p.id == id)
    }

    pub fn current_problem(&self) -> Option<&Problem> {
        self.current.and_then(|id| self.find(id))
    }

    /// Combined stats: the server's when available, else computed locally.
    pub fn stats(&self) -> ProblemStats {
        self.server_stats
            .unwrap_or_else(|| ProblemStats::from_problems(&self.problems, self.today))
    }

    pub fn page(&self) -> PageView<'_> {
        self.query.run(&self.problems)
    }

    pub fn filtered_count(&self) -> usize {
        filter_problems(&self.problems, &self.query.filter).len()
    }

    pub fn selected_problem(&self) -> Option<&Problem> {
        match self.view {
            View::Dashboard => self.queue.get(self.selected_queue),
            View::Problems => self.page().items.get(self.selected_row).copied(),
            View::Detail => self.current_problem(),
            _ => None,
        }
    }

    fn replace_everywhere(&mut self, updated: &Problem) {
        for problem in self.problems.iter_mut().chain(self.queue.iter_mut()) {
            if problem.id == updated.id {
                *problem = updated.clone();
            }
        }
    }

    fn update_everywhere(&mut self, id: ProblemId, update: impl Fn(&mut Problem)) {
        for problem in self.problems.iter_mut().chain(self.queue.iter_mut()) {
            if problem.id == id {
                update(problem);
            }
        }
    }

    fn upsert(&mut self, problem: Problem) {
        self.replace_everywhere(&problem);
        if !self.problems.iter().any(|p| p.id == problem.id) {
            self.problems.push(problem);
        }
    }

    fn rollback(&mut self, id: ProblemId, rollback: Rollback) {
        match rollback {
            Rollback::Schedule(previous) => self.update_everywhere(id, |p| previous.apply_to(p)),
            Rollback::Notes(previous) => self.update_everywhere(id, |p| p.notes = previous.clone()),
            Rollback::Reinsert {
                problem,
                list_index,
                queue_index,
            } => {
                if let Some(index) = list_index {
                    if !self.problems.iter().any(|p| p.id == problem.id) {
                        let index = index.min(self.problems.len());
                        self.problems.insert(index, problem.clone());
                    }
                }
                if let Some(index) = queue_index {
                    if !self.queue.iter().any(|p| p.id == problem.id) {
                        let index = index.min(self.queue.len());
                        self.queue.insert(index, problem);
                    }
                }
            }
        }
    }

    /// Keep the current page and row inside the filtered list.
    fn clamp_page(&mut self) {
        let count = self.filtered_count();
        self.query.clamp_to(count);
        let rows = self.page().items.len();
        self.selected_row = self.selected_row.min(rows.saturating_sub(1));
    }

    fn on_filter_changed(&mut self) {
        self.selected_row = 0;
        self.clamp_page();
    }

    // ---- actions ----

    pub fn open_detail(&mut self, id: ProblemId) {
        if self.view != View::Detail {
            self.previous_view = self.view;
        }
        self.current = Some(id);
        self.view = View::Detail;
        let api = Arc::clone(&self.api);
        self.spawn(async move { Outcome::Fetched(id, api.get(id).await) });
    }

    fn close_detail(&mut self) {
        self.current = None;
        self.input_mode = InputMode::Normal;
        if self.view == View::Detail {
            self.view = self.previous_view;
        }
    }

    pub fn mark_reviewed(&mut self, id: ProblemId) {
        let Some(snapshot) = self.find(id).cloned() else {
            return;
        };
        let prepared = ReviewStep::for_status(snapshot.status)
            .and_then(|step| apply_advance(&snapshot, self.today).map(|updated| (step, updated)));
        let (step, updated) = match prepared {
            Ok(prepared) => prepared,
            Err(err) => {
                debug!(id, error = %err, "advance refused");
                self.toast = Some(Toast::warning("Problem is already mastered."));
                return;
            }
        };
        if !self.loaders.begin(ActionKind::MarkReviewed, id) {
            return;
        }

        let next = ScheduleFields::of(&updated);
        self.update_everywhere(id, |p| next.apply_to(p));
        let previous = ScheduleFields::of(&snapshot);
        let api = Arc::clone(&self.api);
        self.spawn(async move {
            let result = api.advance(id, step).await;
            Outcome::Mutation {
                kind: ActionKind::MarkReviewed,
                id,
                result,
                rollback: Rollback::Schedule(previous),
            }
        });
    }

    pub fn needs_more_review(&mut self, id: ProblemId) {
        let Some(snapshot) = self.find(id).cloned() else {
            return;
        };
        if snapshot.status == ProblemStatus::New {
            self.toast = Some(Toast::warning("Problem has not been reviewed yet."));
            return;
        }
        if !self.loaders.begin(ActionKind::NeedsMoreReview, id) {
            return;
        }

        let next = ScheduleFields::of(&apply_reset(&snapshot));
        self.update_everywhere(id, |p| next.apply_to(p));
        let previous = ScheduleFields::of(&snapshot);
        let api = Arc::clone(&self.api);
        self.spawn(async move {
            let result = api.reset_timer(id).await;
            Outcome::Mutation {
                kind: ActionKind::NeedsMoreReview,
                id,
                result,
                rollback: Rollback::Schedule(previous),
            }
        });
    }

    pub fn request_delete(&mut self, id: ProblemId) {
        if self.find(id).is_some() {
            self.confirm_delete = Some(id);
            self.input_mode = InputMode::Confirm;
        }
    }

    pub fn delete(&mut self, id: ProblemId) {
        if !self.loaders.begin(ActionKind::Delete, id) {
            return;
        }
        let list_index = self.problems.iter().position(|p| p.id == id);
        let queue_index = self.queue.iter().position(|p| p.id == id);
        let from_list = list_index.map(|i| self.problems.remove(i));
        let from_queue = queue_index.map(|i| self.queue.remove(i));
        let Some(problem) = from_list.or(from_queue) else {
            self.loaders.finish(ActionKind::Delete, id);
            return;
        };

        if self.current == Some(id) {
            self.close_detail();
        }
        self.clamp_page();
        self.selected_queue = self.selected_queue.min(self.queue.len().saturating_sub(1));

        let api = Arc::clone(&self.api);
        self.spawn(async move {
            let result = api.delete(id).await;
            Outcome::Mutation {
                kind: ActionKind::Delete,
                id,
                result,
                rollback: Rollback::Reinsert {
                    problem,
                    list_index,
                    queue_index,
                },
            }
        });
    }

    pub fn start_edit_notes(&mut self) {
        if let Some(problem) = self.current_problem() {
            self.notes_buffer = problem.notes.clone();
            self.input_mode = InputMode::EditNotes;
        }
    }

    pub fn save_notes(&mut self) {
        let Some(snapshot) = self.current_problem().cloned() else {
            self.input_mode = InputMode::Normal;
            return;
        };
        if let Some(message) = validate_notes(&self.notes_buffer) {
            self.toast = Some(Toast::warning(message));
            return;
        }
        self.input_mode = InputMode::Normal;
        if snapshot.notes == self.notes_buffer {
            return;
        }
        let id = snapshot.id;
        if !self.loaders.begin(ActionKind::UpdateNotes, id) {
            return;
        }

        let notes = self.notes_buffer.clone();
        self.update_everywhere(id, |p| p.notes = notes.clone());

        let api = Arc::clone(&self.api);
        let previous = snapshot.notes;
        self.spawn(async move {
            let result = api.update_notes(id, &notes).await;
            Outcome::Mutation {
                kind: ActionKind::UpdateNotes,
                id,
                result,
                rollback: Rollback::Notes(previous),
            }
        });
    }

    pub fn submit_form(&mut self) {
        if self.loaders.is_loading(ActionKind::Submit, NEW_PROBLEM_ID) {
            return;
        }
        let Some(request) = self.form.submit() else {
            self.toast = Some(Toast::warning("Please fix the highlighted fields."));
            return;
        };
        self.loaders.begin(ActionKind::Submit, NEW_PROBLEM_ID);

        let api = Arc::clone(&self.api);
        self.spawn(async move { Outcome::Created(api.create(&request).await) });
    }

    fn lookup_similar(&mut self) {
        self.form.similar.clear();
        let Some(query) = self.form.similar_query() else {
            return;
        };
        let api = Arc::clone(&self.api);
        self.spawn(async move {
            let result = api.search(&query).await;
            Outcome::Similar(query, result)
        });
    }

    fn switch_view(&mut self, view: View) {
        self.view = view;
        self.current = None;
        self.input_mode = InputMode::Normal;
    }

    // ---- key handling ----

    /// Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let is_ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if is_ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
            return true;
        }
        if self.show_help {
            self.show_help = false;
            return false;
        }

        match self.input_mode {
            InputMode::Normal => return self.handle_normal_key(key),
            InputMode::Search => self.handle_search_key(key),
            InputMode::EditNotes => self.handle_notes_key(key),
            InputMode::Confirm => self.handle_confirm_key(key),
        }
        false
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        if self.view == View::Add {
            self.handle_form_key(key);
            return false;
        }

        match key.code {
            KeyCode::Char('q') => {
                if self.view == View::Detail {
                    self.close_detail();
                } else {
                    return true;
                }
            }
            KeyCode::Esc if self.view == View::Detail => self.close_detail(),
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('1') => self.switch_view(View::Dashboard),
            KeyCode::Char('2') => self.switch_view(View::Problems),
            KeyCode::Char('3') => self.switch_view(View::Add),
            KeyCode::Char('4') => self.switch_view(View::Analytics),
            KeyCode::Tab => {
                let next = (self.view.tab_index() + 1) % View::TABS.len();
                self.switch_view(View::TABS[next]);
            }
            KeyCode::BackTab => {
                let prev = (self.view.tab_index() + View::TABS.len() - 1) % View::TABS.len();
                self.switch_view(View::TABS[prev]);
            }
            KeyCode::Char('r') => self.refresh(),
            _ => match self.view {
                View::Dashboard => self.handle_dashboard_key(key),
                View::Problems => self.handle_problems_key(key),
                View::Detail => self.handle_detail_key(key),
                View::Analytics => self.handle_analytics_key(key),
                View::Add => {}
            },
        }
        false
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) {
        let selected = self.queue.get(self.selected_queue).map(|p| p.id);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.selected_queue + 1 < self.queue.len() {
                    self.selected_queue += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected_queue = self.selected_queue.saturating_sub(1);
            }
            KeyCode::Char('t') => {
                self.queue_source = self.queue_source.toggle();
                self.queue.clear();
                self.selected_queue = 0;
                self.toast = Some(Toast::info(format!("Showing {}", self.queue_source.label())));
                self.load_queue();
            }
            KeyCode::Enter => {
                if let Some(id) = selected {
                    self.open_detail(id);
                }
            }
            KeyCode::Char('m') => {
                if let Some(id) = selected {
                    self.mark_reviewed(id);
                }
            }
            KeyCode::Char('n') => {
                if let Some(id) = selected {
                    self.needs_more_review(id);
                }
            }
            _ => {}
        }
    }

    fn handle_problems_key(&mut self, key: KeyEvent) {
        let selected = self.selected_problem().map(|p| p.id);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.selected_row + 1 < self.page().items.len() {
                    self.selected_row += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected_row = self.selected_row.saturating_sub(1);
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if self.page().has_next() {
                    self.query.current_page += 1;
                    self.selected_row = 0;
                }
            }
            KeyCode::Char('h') | KeyCode::Left => {
                if self.query.current_page > 1 {
                    self.query.current_page -= 1;
                    self.selected_row = 0;
                }
            }
            KeyCode::Char('/') => self.input_mode = InputMode::Search,
            KeyCode::Char('d') => {
                self.query.filter.difficulty =
                    cycle_selection(&self.query.filter.difficulty, &Difficulty::ALL);
                self.on_filter_changed();
            }
            KeyCode::Char('s') => {
                self.query.filter.status =
                    cycle_selection(&self.query.filter.status, &ProblemStatus::ALL);
                self.on_filter_changed();
            }
            KeyCode::Char('p') => {
                let patterns = distinct_patterns(&self.problems);
                self.query.filter.pattern = cycle_selection(&self.query.filter.pattern, &patterns);
                self.on_filter_changed();
            }
            KeyCode::Char('c') => {
                self.query.filter.clear();
                self.on_filter_changed();
            }
            KeyCode::Char('o') => self.query.sort.key = self.query.sort.key.cycle(),
            KeyCode::Char('O') => self.query.sort.order = self.query.sort.order.toggle(),
            KeyCode::Enter => {
                if let Some(id) = selected {
                    self.open_detail(id);
                }
            }
            KeyCode::Char('m') => {
                if let Some(id) = selected {
                    self.mark_reviewed(id);
                }
            }
            KeyCode::Char('n') => {
                if let Some(id) = selected {
                    self.needs_more_review(id);
                }
            }
            KeyCode::Char('x') | KeyCode::Delete => {
                if let Some(id) = selected {
                    self.request_delete(id);
                }
            }
            _ => {}
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) {
        let Some(id) = self.current else {
            return;
        };
        match key.code {
            KeyCode::Char('m') => self.mark_reviewed(id),
            KeyCode::Char('n') => self.needs_more_review(id),
            KeyCode::Char('e') => self.start_edit_notes(),
            KeyCode::Char('x') | KeyCode::Delete => self.request_delete(id),
            _ => {}
        }
    }

    fn handle_analytics_key(&mut self, key: KeyEvent) {
        if let KeyCode::Char('w') = key.code {
            self.analytics_window = self.analytics_window.next();
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.input_mode = InputMode::Normal,
            KeyCode::Esc => {
                self.query.filter.search.clear();
                self.input_mode = InputMode::Normal;
                self.on_filter_changed();
            }
            KeyCode::Backspace => {
                self.query.filter.search.pop();
                self.on_filter_changed();
            }
            KeyCode::Char(c) => {
                self.query.filter.search.push(c);
                self.on_filter_changed();
            }
            _ => {}
        }
    }

    fn handle_notes_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.save_notes(),
            KeyCode::Esc => {
                self.notes_buffer.clear();
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.notes_buffer.pop();
            }
            KeyCode::Char(c) => self.notes_buffer.push(c),
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                if let Some(id) = self.confirm_delete.take() {
                    self.delete(id);
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.confirm_delete = None;
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.switch_view(View::Dashboard),
            KeyCode::Tab | KeyCode::Down => {
                let leaving_title = self.form.focus == Field::Title;
                self.form.focus_next();
                if leaving_title {
                    self.lookup_similar();
                }
            }
            KeyCode::BackTab | KeyCode::Up => self.form.focus_prev(),
            KeyCode::Enter => self.submit_form(),
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Left | KeyCode::Right if self.form.focus == Field::Difficulty => {
                self.form.cycle_difficulty();
            }
            KeyCode::Right if self.form.focus == Field::Pattern => {
                self.form.accept_suggestion();
            }
            KeyCode::Char(c) => self.form.insert_char(c),
            _ => {}
        }
    }
}
