use std::{
    fs::File,
    io::{self, Write},
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result, anyhow};
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyEventState,
        KeyModifiers,
    },
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};
use ratatui::{
    backend::{Backend, CrosstermBackend, TestBackend},
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    style::{Color, Modifier, Style},
    widgets::{
        Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs,
        Wrap,
    },
};
use roster_core::Dashboard;
use roster_model::{
    Permission, Role, RoleFilter, SortConfig, SortDirection, SortKey, User,
    UserStatus,
};

use super::render::{format_last_login, format_permissions};

pub const SCRIPT_ENV: &str = "ROSTERCTL_TUI_SCRIPT";
pub const TRACE_ENV: &str = "ROSTERCTL_TUI_TRACE";

const SCRIPT_WIDTH: u16 = 120;
const SCRIPT_HEIGHT: u16 = 32;

/// Source of key/input events so tests can drive the TUI without a real tty.
trait EventSource {
    fn next(&mut self, timeout: Duration) -> Result<Option<Event>>;
}

struct CrosstermEventSource;

impl EventSource for CrosstermEventSource {
    fn next(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }
}

/// Scripted event source driven by a simple line-oriented DSL:
///   down|up|left|right|tab|backtab|enter|space|esc|backspace|delete|q
///   type:<text>   one key press per character
///   <c>           any other single character is pressed as-is
/// `j`/`k` are aliases for down/up. Lines beginning with # are ignored.
/// When events are exhausted, we fail fast to avoid hangs.
struct ScriptEventSource {
    events: Vec<Event>,
    cursor: usize,
    exhausted_at: Option<Instant>,
    trace: Option<File>,
}

impl ScriptEventSource {
    fn from_path(path: PathBuf, trace_path: Option<PathBuf>) -> Result<Self> {
        let contents = std::fs::read_to_string(&path)
            .context("read scripted TUI input")?;
        let events = parse_script(&contents)?;

        let trace = trace_path
            .map(|p| File::create(p).context("create tui trace file"))
            .transpose()?;

        Ok(Self {
            events,
            cursor: 0,
            exhausted_at: None,
            trace,
        })
    }

    /// Append the final screen to the trace file.
    fn finish(&mut self, screen: &str) -> Result<()> {
        if let Some(trace) = self.trace.as_mut() {
            writeln!(trace, "--- screen ---")?;
            trace.write_all(screen.as_bytes())?;
        }
        Ok(())
    }
}

fn parse_script(contents: &str) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    for (idx, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut push_key = |code: KeyCode, modifiers: KeyModifiers| {
            events.push(Event::Key(KeyEvent {
                code,
                modifiers,
                kind: KeyEventKind::Press,
                state: KeyEventState::NONE,
            }));
        };

        match line {
            "down" | "j" => push_key(KeyCode::Down, KeyModifiers::NONE),
            "up" | "k" => push_key(KeyCode::Up, KeyModifiers::NONE),
            "left" => push_key(KeyCode::Left, KeyModifiers::NONE),
            "right" => push_key(KeyCode::Right, KeyModifiers::NONE),
            "tab" => push_key(KeyCode::Tab, KeyModifiers::NONE),
            "backtab" => push_key(KeyCode::BackTab, KeyModifiers::SHIFT),
            "enter" => push_key(KeyCode::Enter, KeyModifiers::NONE),
            "space" => push_key(KeyCode::Char(' '), KeyModifiers::NONE),
            "esc" => push_key(KeyCode::Esc, KeyModifiers::NONE),
            "backspace" => push_key(KeyCode::Backspace, KeyModifiers::NONE),
            "delete" => push_key(KeyCode::Delete, KeyModifiers::NONE),
            "q" | "quit" => push_key(KeyCode::Char('q'), KeyModifiers::NONE),
            _ => {
                if let Some(rest) = line.strip_prefix("type:") {
                    for ch in rest.chars() {
                        push_key(KeyCode::Char(ch), KeyModifiers::NONE);
                    }
                } else if let Some(ch) = single_char(line) {
                    push_key(KeyCode::Char(ch), KeyModifiers::NONE);
                } else {
                    return Err(anyhow!(
                        "unrecognized TUI script token at line {}: {}",
                        idx + 1,
                        line
                    ));
                }
            }
        }
    }
    Ok(events)
}

fn single_char(token: &str) -> Option<char> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

impl EventSource for ScriptEventSource {
    fn next(&mut self, _timeout: Duration) -> Result<Option<Event>> {
        if self.cursor >= self.events.len() {
            // Allow a short grace period before failing to avoid tight loop.
            match self.exhausted_at {
                Some(ea) => {
                    if ea.elapsed() > Duration::from_secs(1) {
                        return Err(anyhow!(
                            "scripted TUI input exhausted before quit"
                        ));
                    }
                }
                None => self.exhausted_at = Some(Instant::now()),
            }
            std::thread::sleep(Duration::from_millis(25));
            return Ok(None);
        }

        let ev = self.events[self.cursor].clone();
        self.cursor += 1;

        if let Some(trace) = self.trace.as_mut() {
            let _ = writeln!(trace, "{:?}", ev);
        }

        Ok(Some(ev))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Users,
    Roles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UserField {
    Name,
    Email,
    Role,
    Status,
}

const USER_FIELDS: [UserField; 4] = [
    UserField::Name,
    UserField::Email,
    UserField::Role,
    UserField::Status,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoleField {
    Name,
    Grant(Permission),
    Description,
}

const ROLE_FIELDS: [RoleField; 5] = [
    RoleField::Name,
    RoleField::Grant(Permission::Read),
    RoleField::Grant(Permission::Write),
    RoleField::Grant(Permission::Delete),
    RoleField::Description,
];

enum Mode {
    Navigate,
    Search,
    UserForm(usize),
    RoleForm(usize),
}

enum MessageKind {
    Info,
    Success,
    Error,
}

struct StatusMessage {
    kind: MessageKind,
    text: String,
}

struct AppState {
    tab: Tab,
    selected_user: usize,
    selected_role: usize,
    mode: Mode,
    message: Option<StatusMessage>,
}

impl AppState {
    fn new() -> Self {
        Self {
            tab: Tab::Users,
            selected_user: 0,
            selected_role: 0,
            mode: Mode::Navigate,
            message: None,
        }
    }

    fn set_message(&mut self, kind: MessageKind, text: impl Into<String>) {
        self.message = Some(StatusMessage {
            kind,
            text: text.into(),
        });
    }

    fn clear_message(&mut self) {
        self.message = None;
    }

    fn mode_name(&self) -> &'static str {
        match self.mode {
            Mode::Navigate => "Navigate",
            Mode::Search => "Search",
            Mode::UserForm(_) | Mode::RoleForm(_) => "Editing",
        }
    }
}

/// Run the full-screen UI until the user quits.
///
/// With `ROSTERCTL_TUI_SCRIPT` set, keys come from that file and frames are
/// drawn off-screen; `ROSTERCTL_TUI_TRACE` receives the events and the last
/// frame.
pub fn run_tui(dashboard: &mut Dashboard) -> Result<()> {
    let mut app = AppState::new();
    if let Err(err) = dashboard.persist_fallbacks() {
        app.set_message(MessageKind::Error, format!("Not saved: {err}"));
    }

    if let Ok(path) = std::env::var(SCRIPT_ENV) {
        let trace = std::env::var(TRACE_ENV).ok().map(PathBuf::from);
        let mut source =
            ScriptEventSource::from_path(PathBuf::from(path), trace)?;
        let backend = TestBackend::new(SCRIPT_WIDTH, SCRIPT_HEIGHT);
        let mut terminal = Terminal::new(backend)?;
        let result = run_app(&mut terminal, dashboard, &mut app, &mut source);
        source.finish(&buffer_text(terminal.backend().buffer()))?;
        return result;
    }

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(
        &mut terminal,
        dashboard,
        &mut app,
        &mut CrosstermEventSource,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    dashboard: &mut Dashboard,
    app: &mut AppState,
    source: &mut dyn EventSource,
) -> Result<()> {
    loop {
        let users = dashboard.visible_users().to_vec();
        clamp_selection(app, users.len(), dashboard.roles().len());
        terminal.draw(|f| render(f, dashboard, app, &users))?;

        if let Some(Event::Key(key)) = source.next(Duration::from_millis(150))?
            && key.kind == KeyEventKind::Press
            && handle_key(key, dashboard, app)
        {
            return Ok(());
        }
    }
}

fn clamp_selection(app: &mut AppState, users: usize, roles: usize) {
    app.selected_user = app.selected_user.min(users.saturating_sub(1));
    app.selected_role = app.selected_role.min(roles.saturating_sub(1));
}

fn buffer_text(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut text = String::new();
    for y in area.top()..area.bottom() {
        let mut line = String::new();
        for x in area.left()..area.right() {
            line.push_str(buffer.get(x, y).symbol());
        }
        text.push_str(line.trim_end());
        text.push('\n');
    }
    text
}

/// Returns `true` when the UI should exit.
fn handle_key(
    key: KeyEvent,
    dashboard: &mut Dashboard,
    app: &mut AppState,
) -> bool {
    match app.mode {
        Mode::Navigate => return handle_navigate(key, dashboard, app),
        Mode::Search => handle_search(key, dashboard, app),
        Mode::UserForm(field) => handle_user_form(key, field, dashboard, app),
        Mode::RoleForm(field) => handle_role_form(key, field, dashboard, app),
    }
    false
}

fn handle_navigate(
    key: KeyEvent,
    dashboard: &mut Dashboard,
    app: &mut AppState,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c'));
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
            app.tab = match app.tab {
                Tab::Users => Tab::Roles,
                Tab::Roles => Tab::Users,
            };
            app.clear_message();
        }
        KeyCode::Down | KeyCode::Char('j') => {
            let len = current_len(dashboard, app);
            let selected = current_selection(app);
            if len > 0 {
                *selected = (*selected + 1) % len;
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            let len = current_len(dashboard, app);
            let selected = current_selection(app);
            if len > 0 {
                *selected = if *selected == 0 { len - 1 } else { *selected - 1 };
            }
        }
        KeyCode::Char('a') => match app.tab {
            Tab::Users => {
                dashboard.user_form.open_new();
                app.mode = Mode::UserForm(0);
                app.clear_message();
            }
            Tab::Roles => {
                dashboard.role_form.open_new();
                app.mode = Mode::RoleForm(0);
                app.clear_message();
            }
        },
        KeyCode::Char('e') | KeyCode::Enter => open_selected(dashboard, app),
        KeyCode::Char('x') | KeyCode::Delete => delete_selected(dashboard, app),
        KeyCode::Char('/') if app.tab == Tab::Users => {
            app.mode = Mode::Search;
            app.clear_message();
        }
        KeyCode::Char('f') if app.tab == Tab::Users => {
            let shown = dashboard.toggle_filters();
            app.set_message(
                MessageKind::Info,
                if shown { "Filters shown" } else { "Filters hidden" },
            );
        }
        KeyCode::Char(c @ ('s' | 'r' | 'd')) if app.tab == Tab::Users => {
            if !dashboard.show_filters() {
                app.set_message(
                    MessageKind::Info,
                    "Press f to open the filter panel",
                );
            } else {
                cycle_filter(c, dashboard);
                app.selected_user = 0;
            }
        }
        KeyCode::Char('n') if app.tab == Tab::Users => {
            dashboard.sort_by(SortKey::Name);
            let dir = dashboard.query().sort.direction.as_str();
            app.set_message(MessageKind::Info, format!("Sorted by name ({dir})"));
        }
        KeyCode::Char('o') if app.tab == Tab::Users => {
            let sort = dashboard.query().sort;
            let keys = SortKey::all();
            let idx = keys.iter().position(|k| *k == sort.key).unwrap_or(0);
            let next = keys[(idx + 1) % keys.len()];
            dashboard.set_sort(SortConfig::new(next, SortDirection::Ascending));
            app.set_message(MessageKind::Info, format!("Sorted by {next}"));
        }
        _ => {}
    }
    false
}

fn current_len(dashboard: &mut Dashboard, app: &AppState) -> usize {
    match app.tab {
        Tab::Users => dashboard.visible_users().len(),
        Tab::Roles => dashboard.roles().len(),
    }
}

fn current_selection(app: &mut AppState) -> &mut usize {
    match app.tab {
        Tab::Users => &mut app.selected_user,
        Tab::Roles => &mut app.selected_role,
    }
}

fn open_selected(dashboard: &mut Dashboard, app: &mut AppState) {
    match app.tab {
        Tab::Users => {
            let id = dashboard
                .visible_users()
                .get(app.selected_user)
                .map(|user| user.id);
            if let Some(id) = id
                && dashboard.edit_user(id)
            {
                app.mode = Mode::UserForm(0);
                app.clear_message();
            }
        }
        Tab::Roles => {
            let id = dashboard.roles().get(app.selected_role).map(|r| r.id);
            if let Some(id) = id
                && dashboard.edit_role(id)
            {
                app.mode = Mode::RoleForm(0);
                app.clear_message();
            }
        }
    }
}

fn delete_selected(dashboard: &mut Dashboard, app: &mut AppState) {
    let outcome = match app.tab {
        Tab::Users => {
            let id = dashboard
                .visible_users()
                .get(app.selected_user)
                .map(|user| user.id);
            let Some(id) = id else { return };
            dashboard
                .delete_user(id)
                .map(|removed| removed.map(|user| user.name))
        }
        Tab::Roles => {
            let id = dashboard.roles().get(app.selected_role).map(|r| r.id);
            let Some(id) = id else { return };
            dashboard
                .delete_role(id)
                .map(|removed| removed.map(|role| role.name))
        }
    };
    match outcome {
        Ok(Some(name)) => {
            app.set_message(MessageKind::Success, format!("Deleted {name}"))
        }
        Ok(None) => app.set_message(MessageKind::Error, "Nothing to delete"),
        Err(err) => app.set_message(MessageKind::Error, err.to_string()),
    }
}

fn cycle_filter(which: char, dashboard: &mut Dashboard) {
    let filters = dashboard.query().filters.clone();
    match which {
        's' => dashboard.set_status_filter(filters.status.cycle()),
        'r' => {
            let names = dashboard.role_names();
            let next = next_role_filter(&filters.role, &names);
            dashboard.set_role_filter(next);
        }
        _ => dashboard.set_date_range(filters.date_range.cycle()),
    }
}

/// All, then each role name in order, then back to All.
fn next_role_filter(current: &RoleFilter, names: &[&str]) -> RoleFilter {
    let next = match current {
        RoleFilter::All => names.first(),
        RoleFilter::Named(name) => names
            .iter()
            .position(|n| n == name)
            .and_then(|idx| names.get(idx + 1)),
    };
    next.map(|name| RoleFilter::Named(name.to_string()))
        .unwrap_or_default()
}

fn handle_search(
    key: KeyEvent,
    dashboard: &mut Dashboard,
    app: &mut AppState,
) {
    let mut term = dashboard.query().search.clone();
    match key.code {
        KeyCode::Enter => app.mode = Mode::Navigate,
        KeyCode::Esc => {
            term.clear();
            app.mode = Mode::Navigate;
        }
        KeyCode::Backspace => {
            term.pop();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            term.push(c)
        }
        _ => {}
    }
    dashboard.set_search(term);
    app.selected_user = 0;
}

fn handle_user_form(
    key: KeyEvent,
    field: usize,
    dashboard: &mut Dashboard,
    app: &mut AppState,
) {
    let count = USER_FIELDS.len();
    match key.code {
        KeyCode::Esc => {
            dashboard.user_form.cancel();
            app.mode = Mode::Navigate;
            app.set_message(MessageKind::Info, "Cancelled");
        }
        KeyCode::Enter => {
            app.mode = Mode::Navigate;
            match dashboard.submit_user_form() {
                Ok(Some(user)) => app.set_message(
                    MessageKind::Success,
                    format!("Saved user {}", user.name),
                ),
                Ok(None) => {
                    app.set_message(MessageKind::Error, "User no longer exists")
                }
                Err(err) => app.set_message(MessageKind::Error, err.to_string()),
            }
        }
        KeyCode::Tab | KeyCode::Down => {
            app.mode = Mode::UserForm((field + 1) % count)
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.mode = Mode::UserForm((field + count - 1) % count)
        }
        code => {
            let names: Vec<String> =
                dashboard.role_names().into_iter().map(String::from).collect();
            let draft = &mut dashboard.user_form.draft;
            match (USER_FIELDS[field], code) {
                (UserField::Name, code) => edit_text(&mut draft.name, code),
                (UserField::Email, code) => edit_text(&mut draft.email, code),
                (
                    UserField::Role,
                    KeyCode::Left | KeyCode::Right | KeyCode::Char(' '),
                ) => {
                    let back = code == KeyCode::Left;
                    draft.role = cycle_choice(&draft.role, &names, back);
                }
                (
                    UserField::Status,
                    KeyCode::Left | KeyCode::Right | KeyCode::Char(' '),
                ) => {
                    draft.status = match draft.status {
                        UserStatus::Active => UserStatus::Inactive,
                        UserStatus::Inactive => UserStatus::Active,
                    };
                }
                _ => {}
            }
        }
    }
}

fn handle_role_form(
    key: KeyEvent,
    field: usize,
    dashboard: &mut Dashboard,
    app: &mut AppState,
) {
    let count = ROLE_FIELDS.len();
    match key.code {
        KeyCode::Esc => {
            dashboard.role_form.cancel();
            app.mode = Mode::Navigate;
            app.set_message(MessageKind::Info, "Cancelled");
        }
        KeyCode::Enter => {
            app.mode = Mode::Navigate;
            let note = if dashboard.options().persist_roles {
                ""
            } else {
                " (this session only)"
            };
            match dashboard.submit_role_form() {
                Ok(Some(role)) => app.set_message(
                    MessageKind::Success,
                    format!("Saved role {}{note}", role.name),
                ),
                Ok(None) => {
                    app.set_message(MessageKind::Error, "Role no longer exists")
                }
                Err(err) => app.set_message(MessageKind::Error, err.to_string()),
            }
        }
        KeyCode::Tab | KeyCode::Down => {
            app.mode = Mode::RoleForm((field + 1) % count)
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.mode = Mode::RoleForm((field + count - 1) % count)
        }
        code => match ROLE_FIELDS[field] {
            RoleField::Name => {
                edit_text(&mut dashboard.role_form.draft.name, code)
            }
            RoleField::Description => {
                edit_text(&mut dashboard.role_form.draft.description, code)
            }
            RoleField::Grant(permission) => {
                if matches!(
                    code,
                    KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right
                ) {
                    dashboard.role_form.toggle_permission(permission);
                }
            }
        },
    }
}

fn edit_text(value: &mut String, code: KeyCode) {
    match code {
        KeyCode::Char(c) => value.push(c),
        KeyCode::Backspace | KeyCode::Delete => {
            value.pop();
        }
        _ => {}
    }
}

/// Step through `choices`; an unknown current value starts at the first.
fn cycle_choice(current: &str, choices: &[String], back: bool) -> String {
    if choices.is_empty() {
        return current.to_string();
    }
    let len = choices.len();
    let next = match choices.iter().position(|c| c == current) {
        None => 0,
        Some(idx) if back => (idx + len - 1) % len,
        Some(idx) => (idx + 1) % len,
    };
    choices[next].clone()
}

fn render(
    f: &mut Frame,
    dashboard: &Dashboard,
    app: &AppState,
    users: &[User],
) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(4),
            ]
            .as_ref(),
        )
        .split(f.size());

    let titles = vec![
        Line::from(format!("Users({})", dashboard.users().len())),
        Line::from(format!("Roles({})", dashboard.roles().len())),
    ];
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("User Management"),
        )
        .select(match app.tab {
            Tab::Users => 0,
            Tab::Roles => 1,
        })
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, vertical[0]);

    match app.tab {
        Tab::Users => render_users(f, vertical[1], dashboard, app, users),
        Tab::Roles => render_roles(f, vertical[1], dashboard, app),
    }

    render_status(f, vertical[2], app);

    match app.mode {
        Mode::UserForm(field) => render_user_form(f, dashboard, field),
        Mode::RoleForm(field) => render_role_form(f, dashboard, field),
        Mode::Navigate | Mode::Search => {}
    }
}

fn render_users(
    f: &mut Frame,
    area: Rect,
    dashboard: &Dashboard,
    app: &AppState,
    users: &[User],
) {
    let mut constraints = vec![Constraint::Length(3)];
    if dashboard.show_filters() {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Min(3));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let query = dashboard.query();
    let searching = matches!(app.mode, Mode::Search);
    let search_line = if query.search.is_empty() && !searching {
        Line::from(Span::styled(
            "Search users...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(query.search.clone())
    };
    let search_style = if searching {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let search = Paragraph::new(search_line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(search_style)
            .title("Search (/)"),
    );
    f.render_widget(search, chunks[0]);

    let table_area = if dashboard.show_filters() {
        let filters = &query.filters;
        let line = Line::from(vec![
            Span::styled("s Status: ", Style::default().fg(Color::Gray)),
            Span::raw(filters.status.to_string()),
            Span::styled("   r Role: ", Style::default().fg(Color::Gray)),
            Span::raw(filters.role.to_string()),
            Span::styled("   d Date: ", Style::default().fg(Color::Gray)),
            Span::raw(filters.date_range.to_string()),
            Span::styled("   Sort: ", Style::default().fg(Color::Gray)),
            Span::raw(format!(
                "{} {}",
                query.sort.key,
                query.sort.direction.as_str()
            )),
        ]);
        let panel = Paragraph::new(line)
            .block(Block::default().borders(Borders::ALL).title("Filters"));
        f.render_widget(panel, chunks[1]);
        chunks[2]
    } else {
        chunks[1]
    };

    let header = Row::new(["Name", "Email", "Role", "Status", "Last Login"])
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    let rows: Vec<Row> = users
        .iter()
        .map(|user| {
            let status_style = match user.status {
                UserStatus::Active => Style::default().fg(Color::Green),
                UserStatus::Inactive => Style::default().fg(Color::DarkGray),
            };
            Row::new(vec![
                Cell::from(user.name.clone()),
                Cell::from(user.email.clone()),
                Cell::from(user.role.clone()),
                Cell::from(user.status.to_string()).style(status_style),
                Cell::from(format_last_login(&user.last_login)),
            ])
        })
        .collect();
    let widths = [
        Constraint::Percentage(20),
        Constraint::Percentage(28),
        Constraint::Percentage(12),
        Constraint::Percentage(10),
        Constraint::Percentage(30),
    ];
    let title = format!("{} of {} users", users.len(), dashboard.users().len());
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::new()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    let mut state = TableState::default();
    if !users.is_empty() {
        state.select(Some(app.selected_user));
    }
    f.render_stateful_widget(table, table_area, &mut state);
}

fn render_roles(
    f: &mut Frame,
    area: Rect,
    dashboard: &Dashboard,
    app: &AppState,
) {
    let header = Row::new(["Role Name", "Permissions", "Description"]).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );
    let rows: Vec<Row> = dashboard
        .roles()
        .iter()
        .map(|role: &Role| {
            Row::new(vec![
                role.name.clone(),
                format_permissions(role),
                role.description.clone(),
            ])
        })
        .collect();
    let widths = [
        Constraint::Percentage(20),
        Constraint::Percentage(30),
        Constraint::Percentage(50),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Roles"))
        .highlight_style(
            Style::new()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    let mut state = TableState::default();
    if !dashboard.roles().is_empty() {
        state.select(Some(app.selected_role));
    }
    f.render_stateful_widget(table, area, &mut state);
}

fn render_status(f: &mut Frame, area: Rect, app: &AppState) {
    let status_text = match app.mode {
        Mode::Navigate => {
            "Tab switch • ↑/↓ move • a add • e edit • x delete • / search • f filters • n sort name • o sort column • q quit"
        }
        Mode::Search => "Type to search • Enter keep • Esc clear",
        Mode::UserForm(_) | Mode::RoleForm(_) => {
            "Tab/↑/↓ field • ←/→/space choose • Enter submit • Esc cancel"
        }
    };
    let (message_text, message_style) = match &app.message {
        Some(msg) => {
            let style = match msg.kind {
                MessageKind::Info => Style::default().fg(Color::Gray),
                MessageKind::Success => Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
                MessageKind::Error => {
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
                }
            };
            (msg.text.clone(), style)
        }
        None => (String::new(), Style::default()),
    };
    let lines = vec![
        Line::from(Span::styled(status_text, Style::default().fg(Color::Gray))),
        Line::from(Span::styled(message_text, message_style)),
    ];
    let bottom = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Status [{}]", app.mode_name())),
    );
    f.render_widget(bottom, area);
}

fn field_line(active: bool, label: &str, value: String) -> Line<'static> {
    let marker = if active { "> " } else { "  " };
    let style = if active {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(format!("{marker}{label:<12}"), style),
        Span::raw(value),
    ])
}

fn render_user_form(f: &mut Frame, dashboard: &Dashboard, field: usize) {
    let form = &dashboard.user_form;
    let draft = &form.draft;
    let role = if draft.role.is_empty() {
        "(select role)".to_string()
    } else {
        draft.role.clone()
    };
    let mut lines: Vec<Line> = USER_FIELDS
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let (label, value) = match item {
                UserField::Name => ("Name", draft.name.clone()),
                UserField::Email => ("Email", draft.email.clone()),
                UserField::Role => ("Role", format!("< {role} >")),
                UserField::Status => {
                    ("Status", format!("< {} >", draft.status))
                }
            };
            field_line(idx == field, label, value)
        })
        .collect();
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!("Enter: {}   Esc: cancel", form.submit_label()),
        Style::default().fg(Color::Gray),
    )));
    render_popup(f, form.title(), lines);
}

fn render_role_form(f: &mut Frame, dashboard: &Dashboard, field: usize) {
    let form = &dashboard.role_form;
    let draft = &form.draft;
    let mut lines: Vec<Line> = ROLE_FIELDS
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let (label, value) = match item {
                RoleField::Name => ("Name", draft.name.clone()),
                RoleField::Grant(p) => {
                    let mark =
                        if draft.permissions.contains(*p) { "[x]" } else { "[ ]" };
                    (permission_label(*p), mark.to_string())
                }
                RoleField::Description => {
                    ("Description", draft.description.clone())
                }
            };
            field_line(idx == field, label, value)
        })
        .collect();
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!("Enter: {}   Esc: cancel", form.submit_label()),
        Style::default().fg(Color::Gray),
    )));
    render_popup(f, form.title(), lines);
}

fn permission_label(permission: Permission) -> &'static str {
    match permission {
        Permission::Read => "Read",
        Permission::Write => "Write",
        Permission::Delete => "Delete",
    }
}

fn render_popup(f: &mut Frame, title: &str, lines: Vec<Line>) {
    let height = lines.len() as u16 + 2;
    let area = centered_rect(60, height, f.size());
    f.render_widget(Clear, area);
    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title.to_string())
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(popup, area);
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let height = height.min(area.height);
    let width = (u32::from(area.width) * u32::from(percent_x) / 100) as u16;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
