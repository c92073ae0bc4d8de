use chrono::NaiveDate;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Clear, Gauge, List, ListItem, Paragraph, Row, Table, Tabs, Wrap},
};
use review_core::loaders::NEW_PROBLEM_ID;
use review_core::schedule::days_until_review;
use review_core::stats::{attempt_streak, difficulty_breakdown, pattern_stats, status_breakdown, Breakdown};
use review_core::validation::{Field, MAX_NOTES_LEN};
use review_core::{
    next_review_date, review_state, ActionKind, Difficulty, Problem, ProblemStats, ProblemStatus,
    ReviewState,
};
use std::fmt::Write as _;

use crate::app::{App, InputMode, QueueSource, View};

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .split(area);

    render_tabs(frame, app, chunks[0]);
    render_main(frame, app, chunks[1]);
    render_status(frame, app, chunks[2]);

    // Overlays
    match app.input_mode {
        InputMode::Search => render_search(frame, app),
        InputMode::Confirm => render_confirm(frame, app),
        _ => {}
    }
    if app.show_help {
        render_help(frame);
    }
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::TABS
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!("{} {}", i + 1, view.title())))
        .collect();

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(" Problem Tracker "))
        .select(app.view.tab_index())
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    frame.render_widget(tabs, area);
}

fn render_main(frame: &mut Frame, app: &App, area: Rect) {
    match app.view {
        View::Dashboard => render_dashboard(frame, app, area),
        View::Problems => render_problems(frame, app, area),
        View::Detail => render_detail(frame, app, area),
        View::Add => render_form(frame, app, area),
        View::Analytics => render_analytics(frame, app, area),
    }
}

// ---- shared helpers ----

fn format_date(app: &App, date: NaiveDate) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(&app.config.display.date_format)).is_err() {
        return date.format("%Y-%m-%d").to_string();
    }
    out
}

fn format_optional_date(app: &App, date: Option<NaiveDate>) -> String {
    date.map(|d| format_date(app, d)).unwrap_or_else(|| "-".to_string())
}

fn difficulty_color(difficulty: Difficulty) -> Color {
    match difficulty {
        Difficulty::Easy => Color::Green,
        Difficulty::Medium => Color::Yellow,
        Difficulty::Hard => Color::Red,
    }
}

fn status_color(status: ProblemStatus) -> Color {
    match status {
        ProblemStatus::New => Color::Cyan,
        ProblemStatus::FirstReview => Color::Blue,
        ProblemStatus::SecondReview => Color::Magenta,
        ProblemStatus::Mastered => Color::Green,
    }
}

fn review_cell(app: &App, problem: &Problem) -> Cell<'static> {
    let state = review_state(problem, app.today);
    let color = match state {
        ReviewState::Due => Color::Red,
        ReviewState::Scheduled => Color::Gray,
        ReviewState::Unscheduled => Color::DarkGray,
        ReviewState::Mastered => Color::Green,
    };
    Cell::from(state.label()).style(Style::default().fg(color))
}

/// "in 3 days", "today", "2 days overdue".
fn relative_due(days: i64) -> String {
    match days {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        d if d > 1 => format!("in {} days", d),
        -1 => "1 day overdue".to_string(),
        d => format!("{} days overdue", -d),
    }
}

fn row_style(selected: bool, busy: bool) -> Style {
    let style = if selected {
        Style::default().bg(Color::DarkGray)
    } else {
        Style::default()
    };
    if busy {
        style.add_modifier(Modifier::DIM)
    } else {
        style
    }
}

fn problem_row<'a>(app: &App, problem: &'a Problem, selected: bool) -> Row<'a> {
    let busy = app.loaders.is_busy(problem.id);
    let title = if busy {
        format!("{} …", problem.title)
    } else {
        problem.title.clone()
    };

    Row::new(vec![
        Cell::from(problem.problem_number.to_string()),
        Cell::from(title),
        Cell::from(problem.difficulty.label())
            .style(Style::default().fg(difficulty_color(problem.difficulty))),
        Cell::from(problem.pattern.as_str()),
        Cell::from(problem.status.short_label())
            .style(Style::default().fg(status_color(problem.status))),
        Cell::from(format_optional_date(app, next_review_date(problem))),
        review_cell(app, problem),
    ])
    .style(row_style(selected, busy))
}

fn problem_table<'a>(rows: Vec<Row<'a>>, title: String) -> Table<'a> {
    let header = Row::new(vec!["#", "Title", "Difficulty", "Pattern", "Status", "Next Review", "Due"])
        .style(Style::default().add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Percentage(30),
            Constraint::Length(10),
            Constraint::Percentage(20),
            Constraint::Length(8),
            Constraint::Length(14),
            Constraint::Length(11),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(title))
}

// ---- dashboard ----

fn render_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(5)])
        .split(area);

    render_stat_cards(frame, &app.stats(), chunks[0]);
    render_queue(frame, app, chunks[1]);
}

fn render_stat_cards(frame: &mut Frame, stats: &ProblemStats, area: Rect) {
    let cards = [
        ("Total", stats.total_problems.to_string(), Color::White),
        ("Mastered", stats.mastered_count.to_string(), Color::Green),
        ("In Progress", stats.in_progress().to_string(), Color::Blue),
        ("Due Today", stats.reviews_due_today.to_string(), Color::Red),
        ("Mastery", format!("{}%", stats.mastery_rate()), Color::Yellow),
    ];

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, cards.len() as u32); 5])
        .split(area);

    for ((label, value, color), chunk) in cards.into_iter().zip(chunks.iter()) {
        let card = Paragraph::new(Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", label)));
        frame.render_widget(card, *chunk);
    }
}

fn render_queue(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(" {} ({}) ", app.queue_source.label(), app.queue.len());

    if app.queue.is_empty() {
        let message = if app.is_loading() {
            "Loading..."
        } else {
            match app.queue_source {
                QueueSource::Reviews => "No problems due for review. Nice work!",
                QueueSource::Today => "No problems attempted today.",
            }
        };
        let empty = Paragraph::new(message)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = app
        .queue
        .iter()
        .enumerate()
        .map(|(i, problem)| problem_row(app, problem, i == app.selected_queue))
        .collect();

    frame.render_widget(problem_table(rows, title), area);
}

// ---- problems list ----

fn render_problems(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    render_filter_bar(frame, app, chunks[0]);

    let page = app.page();
    let title = if app.query.filter.is_active() {
        format!(" Problems ({} of {}) ", page.filtered_count, app.problems.len())
    } else {
        format!(" Problems ({}) ", app.problems.len())
    };

    if page.is_empty() {
        let message = if app.problems.is_empty() {
            "No problems yet. Press 3 to add one."
        } else {
            "No problems match the current filters."
        };
        let empty = Paragraph::new(message)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(empty, chunks[1]);
    } else {
        let rows: Vec<Row> = page
            .items
            .iter()
            .enumerate()
            .map(|(i, problem)| problem_row(app, problem, i == app.selected_row))
            .collect();
        frame.render_widget(problem_table(rows, title), chunks[1]);
    }

    let prev = if page.has_previous() { "◀ " } else { "  " };
    let next = if page.has_next() { " ▶" } else { "  " };
    let pager = Paragraph::new(format!(
        "{}Page {} of {}{}",
        prev, page.current_page, page.total_pages, next
    ))
    .alignment(Alignment::Center);
    frame.render_widget(pager, chunks[2]);
}

fn render_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
    let filter = &app.query.filter;
    let sort = &app.query.sort;
    let label = Style::default().fg(Color::DarkGray);

    let search = if filter.search.is_empty() {
        "-".to_string()
    } else {
        filter.search.clone()
    };

    let line = Line::from(vec![
        Span::styled("Search ", label),
        Span::raw(search),
        Span::styled("  Difficulty ", label),
        Span::raw(filter.difficulty.to_string()),
        Span::styled("  Status ", label),
        Span::raw(filter.status.to_string()),
        Span::styled("  Pattern ", label),
        Span::raw(filter.pattern.to_string()),
        Span::styled("  Sort ", label),
        Span::raw(format!("{} {}", sort.key.label(), sort.order.arrow())),
    ]);

    let bar = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(" Filters "));
    frame.render_widget(bar, area);
}

// ---- detail ----

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let Some(problem) = app.current_problem() else {
        let empty = Paragraph::new("Loading problem...")
            .block(Block::default().borders(Borders::ALL).title(" Problem "));
        frame.render_widget(empty, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(12), Constraint::Min(5)])
        .split(area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let field = |name: &'static str, value: Span<'static>| {
        Line::from(vec![Span::styled(format!("{:<15}", name), bold), value])
    };

    let next_review = match (next_review_date(problem), days_until_review(problem, app.today)) {
        (Some(date), Some(days)) => format!("{} ({})", format_date(app, date), relative_due(days)),
        _ if problem.status == ProblemStatus::Mastered => "Mastered".to_string(),
        _ => "-".to_string(),
    };

    let info = vec![
        field("Difficulty", Span::styled(
            problem.difficulty.label(),
            Style::default().fg(difficulty_color(problem.difficulty)),
        )),
        field("Pattern", Span::raw(problem.pattern.clone())),
        field("Status", Span::styled(
            problem.status.label(),
            Style::default().fg(status_color(problem.status)),
        )),
        field("Attempted", Span::raw(format_date(app, problem.date_attempted))),
        field("First Review", Span::raw(format_optional_date(app, problem.first_review_date))),
        field("Second Review", Span::raw(format_optional_date(app, problem.second_review_date))),
        field("Final Review", Span::raw(format_optional_date(app, problem.final_review_date))),
        field("Next Review", Span::raw(next_review)),
        Line::from(""),
        Line::from(Span::styled(
            "m reviewed · n needs more review · e edit notes · x delete",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let title = format!(" #{} {} ", problem.problem_number, problem.title);
    let info_widget = Paragraph::new(info).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(info_widget, chunks[0]);

    let editing = app.input_mode == InputMode::EditNotes;
    let (content, title, border) = if editing {
        (
            format!("{}█", app.notes_buffer),
            format!(
                " Notes ({}/{}) Enter save · Esc cancel ",
                app.notes_buffer.chars().count(),
                MAX_NOTES_LEN
            ),
            Style::default().fg(Color::Yellow),
        )
    } else if problem.notes.is_empty() {
        ("No notes yet.".to_string(), " Notes ".to_string(), Style::default())
    } else {
        (problem.notes.clone(), " Notes ".to_string(), Style::default())
    };

    let saving = app.loaders.is_loading(ActionKind::UpdateNotes, problem.id);
    let title = if saving { format!("{}saving... ", title) } else { title };

    let notes = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).border_style(border).title(title));
    frame.render_widget(notes, chunks[1]);
}

// ---- add form ----

fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.form;
    let mut constraints = vec![Constraint::Length(4); Field::ALL.len()];
    constraints.push(Constraint::Min(3));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (field, chunk) in Field::ALL.iter().zip(chunks.iter()) {
        let focused = form.focus == *field;
        let value = match field {
            Field::Difficulty => format!("◀ {} ▶  (e/m/h)", form.draft.difficulty.label()),
            other => {
                let text = form.draft.text(*other).unwrap_or_default().to_string();
                if focused {
                    format!("{}█", text)
                } else {
                    text
                }
            }
        };

        let mut lines = vec![Line::from(value)];
        if let Some(error) = form.field_error(*field) {
            lines.push(Line::from(Span::styled(
                error.to_string(),
                Style::default().fg(Color::Red),
            )));
        }

        let border = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let input = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(format!(" {} ", field.label())),
        );
        frame.render_widget(input, *chunk);
    }

    let hint = Style::default().fg(Color::DarkGray);
    let mut lines = Vec::new();
    let suggestions = form.suggestions();
    if !suggestions.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Suggestions: ", hint),
            Span::raw(suggestions.join(", ")),
            Span::styled("  (→ to accept)", hint),
        ]));
    }
    if !form.similar.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Possible duplicates: ", Style::default().fg(Color::Yellow)),
            Span::raw(form.similar.join(", ")),
        ]));
    }
    if app.loaders.is_loading(ActionKind::Submit, NEW_PROBLEM_ID) {
        lines.push(Line::from("Saving..."));
    }
    lines.push(Line::from(Span::styled(
        "Tab next field · Enter save · Esc cancel",
        hint,
    )));

    if let Some(last) = chunks.last() {
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), *last);
    }
}

// ---- analytics ----

fn render_analytics(frame: &mut Frame, app: &App, area: Rect) {
    let window = app.analytics_window;
    let problems = window.apply(&app.problems, app.today);
    let stats = ProblemStats::from_problems(problems.iter().copied(), app.today);
    let streak = attempt_streak(&app.problems, app.today);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(7),
            Constraint::Min(5),
        ])
        .split(area);

    let rate = stats.mastery_rate();
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(format!(
            " {} · {} problems · streak {} day{} ",
            window.label(),
            stats.total_problems,
            streak,
            if streak == 1 { "" } else { "s" }
        )))
        .gauge_style(Style::default().fg(Color::Green))
        .percent(rate.min(100) as u16)
        .label(format!("{}% mastered", rate));
    frame.render_widget(gauge, chunks[0]);

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    render_breakdown(frame, " By Difficulty ", &difficulty_breakdown(&stats), halves[0]);
    render_breakdown(frame, " By Status ", &status_breakdown(&stats), halves[1]);

    let header = Row::new(vec!["Pattern", "Problems", "Mastered", "Mastery"])
        .style(Style::default().add_modifier(Modifier::BOLD))
        .bottom_margin(1);
    let rows: Vec<Row> = pattern_stats(problems.iter().copied())
        .into_iter()
        .map(|p| {
            Row::new(vec![
                Cell::from(p.pattern),
                Cell::from(p.count.to_string()),
                Cell::from(p.mastered.to_string()),
                Cell::from(format!("{}%", p.mastery_percentage)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(40),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(" Patterns (w: change window) "));
    frame.render_widget(table, chunks[2]);
}

fn render_breakdown(frame: &mut Frame, title: &str, rows: &[Breakdown], area: Rect) {
    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            let bar = "█".repeat((row.percentage / 5) as usize);
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:<14}{:>4} {:>3}% ", row.label, row.count, row.percentage)),
                Span::styled(bar, Style::default().fg(Color::Cyan)),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title.to_string()));
    frame.render_widget(list, area);
}

// ---- status line and overlays ----

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(toast) = &app.toast {
        let line = Line::from(vec![Span::styled(
            format!(" {} {} ", toast.level.icon(), toast.message),
            Style::default().fg(toast.level.color()),
        )]);
        frame.render_widget(Paragraph::new(line).style(Style::default().bg(Color::Black)), area);
        return;
    }

    let hints = match (app.input_mode, app.view) {
        (InputMode::Search, _) => "type to filter · Enter keep · Esc clear",
        (InputMode::EditNotes, _) => "Enter save · Esc cancel",
        (InputMode::Confirm, _) => "y confirm · n cancel",
        (_, View::Dashboard) => "j/k move · Enter open · m reviewed · n more review · t queue · ? help · q quit",
        (_, View::Problems) => "/ search · d/s/p filter · o/O sort · h/l page · x delete · ? help",
        (_, View::Detail) => "m reviewed · n more review · e notes · x delete · Esc back",
        (_, View::Add) => "Tab next · Enter save · Esc cancel",
        (_, View::Analytics) => "w window · r refresh · ? help · q quit",
    };
    let status = if app.is_loading() {
        format!(" Loading... │ {} ", hints)
    } else {
        format!(" {} ", hints)
    };

    frame.render_widget(Paragraph::new(status).style(Style::default().bg(Color::DarkGray)), area);
}

fn render_search(frame: &mut Frame, app: &App) {
    let area = centered_rect(50, 20, frame.area());
    let area = Rect { height: area.height.min(3), ..area };
    frame.render_widget(Clear, area);

    let search = Paragraph::new(format!("/{}", app.query.filter.search))
        .block(Block::default().borders(Borders::ALL).title(" Search "));

    frame.render_widget(search, area);
}

fn render_confirm(frame: &mut Frame, app: &App) {
    let area = centered_rect(50, 25, frame.area());
    frame.render_widget(Clear, area);

    let title = app
        .confirm_delete
        .and_then(|id| app.find(id))
        .map(|p| format!("#{} {}", p.problem_number, p.title))
        .unwrap_or_default();
    let content = format!("Delete {}?\n\n(y) Yes  (n) No", title);

    let dialog = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title(" Confirm "))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(dialog, area);
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(60, 70, frame.area());
    frame.render_widget(Clear, area);

    let bindings = [
        ("1-4 / Tab", "Switch view"),
        ("j/k", "Move selection"),
        ("Enter", "Open problem"),
        ("m", "Mark reviewed"),
        ("n", "Needs more review"),
        ("x", "Delete problem"),
        ("e", "Edit notes (detail)"),
        ("/", "Search (problems)"),
        ("d / s / p", "Cycle difficulty, status, pattern filter"),
        ("c", "Clear filters"),
        ("o / O", "Sort key / order"),
        ("h/l", "Previous / next page"),
        ("t", "Toggle dashboard queue"),
        ("w", "Analytics time window"),
        ("r", "Refresh"),
        ("q", "Back / quit"),
    ];

    let items: Vec<ListItem> = bindings
        .iter()
        .map(|(keys, action)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<12}", keys), Style::default().fg(Color::Yellow)),
                Span::raw(*action),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Help "));
    frame.render_widget(list, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
