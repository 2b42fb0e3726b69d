//! Dashboard state machine and event loop.
//!
//! ## ftui Model Contract
//!
//! `App` implements `ftui::Model`:
//! - `init()` starts gateway initialization as a background task
//! - `update(msg)` applies a single `Msg` and may return a `Cmd`
//! - `view(frame)` renders state into a frame (pure w.r.t. input state)
//! - `subscriptions()` runs the spinner ticker while anything is loading
//!
//! Network work never runs inside `update()`. Fetches are issued as
//! `Cmd::task` closures (see `commands`) and their results come back as
//! messages. A fetch is never cancelled; a completion that arrives after the
//! user switched tabs is still applied to its panel.
//!
//! ## Running
//!
//! `run_ftui(...)` wires terminal lifecycle via `ftui::Program`. Inline mode
//! (`--inline`) anchors the UI at the bottom of the terminal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arr_common::{sort_by_creation, RoutineRecord, UserRecord};
use ftui::layout::Rect;
use ftui::runtime::{Every, Subscription};
use ftui::text::{Line as FtuiLine, Span as FtuiSpan, Text as FtuiText};
use ftui::widgets::block::Block as FtuiBlock;
use ftui::widgets::paragraph::Paragraph as FtuiParagraph;
use ftui::widgets::Widget as FtuiWidget;
use ftui::{
    Cell as FtuiCell, Cmd as FtuiCmd, Frame as FtuiFrame, KeyEvent as FtuiKeyEvent,
    KeyEventKind as FtuiKeyEventKind, Model as FtuiModel, Program, ProgramConfig,
};

use super::commands;
use super::events::KeyBindings;
use super::layout::{self, ResponsiveLayout};
use super::msg::Msg;
use super::projector::{self, ROUTINE_COLUMNS, USER_COLUMNS};
use super::router::{self, route, Tab, View};
use super::spinner::{self, Spinner};
use super::theme::Theme;
use super::widgets::{RecordTable, RecordTableState, StatusBar, TabBar, APP_TITLE};
use super::{TuiError, TuiResult};
use crate::exit_codes::ExitCode;
use crate::gateway::{Gateway, Services};

/// Subscription id of the spinner ticker.
pub const SPINNER_TICK_ID: u64 = 0x4152_5253_504E;

/// Terminal size assumed until the first resize event.
const DEFAULT_SIZE: (u16, u16) = (80, 24);

/// Per-tab fetch state, independent of the global loading/error flags.
#[derive(Debug, Clone)]
pub struct Panel<T> {
    pub loading: bool,
    pub error: Option<String>,
    /// Last successfully fetched records.
    pub records: Vec<T>,
    /// Projected rows and cursor.
    pub table: RecordTableState,
    /// Set once a fetch has succeeded.
    pub loaded: bool,
}

impl<T> Default for Panel<T> {
    fn default() -> Self {
        Self {
            loading: false,
            error: None,
            records: Vec::new(),
            table: RecordTableState::new(),
            loaded: false,
        }
    }
}

impl<T> Panel<T> {
    fn can_fetch(&self) -> bool {
        !self.loading
    }

    fn begin_fetch(&mut self) {
        self.loading = true;
        self.error = None;
    }

    fn complete(&mut self, records: Vec<T>, rows: Vec<Vec<String>>) {
        self.loading = false;
        self.error = None;
        self.records = records;
        self.table.set_rows(rows);
        self.loaded = true;
    }

    fn fail(&mut self, error: String) {
        self.loading = false;
        self.error = Some(error);
    }
}

/// Shared record of how the session ended, read by `main` after the
/// runtime returns.
#[derive(Debug, Clone, Default)]
pub struct SessionOutcome {
    startup_failed: Arc<AtomicBool>,
}

impl SessionOutcome {
    pub fn startup_failed(&self) -> bool {
        self.startup_failed.load(Ordering::SeqCst)
    }

    fn mark_startup_failed(&self) {
        self.startup_failed.store(true, Ordering::SeqCst);
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.startup_failed() {
            ExitCode::StartupError
        } else {
            ExitCode::Clean
        }
    }
}

/// Main dashboard application.
pub struct App {
    pub theme: Theme,
    pub key_bindings: KeyBindings,
    gateway: Arc<dyn Gateway>,
    active_tab: usize,
    /// Written only by `recompute_view`.
    view: View,
    /// Global loading flag; true until initialization completes.
    loading: bool,
    /// Global error; set when initialization fails.
    error: Option<String>,
    spinner: Spinner,
    width: u16,
    height: u16,
    table_height: u16,
    services: Option<Services>,
    pub users: Panel<UserRecord>,
    pub routines: Panel<RoutineRecord>,
    status_message: Option<String>,
    quitting: bool,
    outcome: SessionOutcome,
}

impl App {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        let (width, height) = DEFAULT_SIZE;
        let mut app = Self {
            theme: Theme::default(),
            key_bindings: KeyBindings::default(),
            gateway,
            active_tab: 0,
            view: View::Loading,
            loading: true,
            error: None,
            spinner: Spinner::new(),
            width,
            height,
            table_height: layout::table_height(height),
            services: None,
            users: Panel::default(),
            routines: Panel::default(),
            status_message: None,
            quitting: false,
            outcome: SessionOutcome::default(),
        };
        app.apply_viewport();
        app.recompute_view();
        app
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Handle shared with the caller to read the exit code after `run_ftui`.
    pub fn outcome(&self) -> SessionOutcome {
        self.outcome.clone()
    }

    pub fn view_id(&self) -> View {
        self.view
    }

    pub fn active_tab(&self) -> Tab {
        Tab::from_index(self.active_tab)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn spinner(&self) -> &Spinner {
        &self.spinner
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn table_height(&self) -> u16 {
        self.table_height
    }

    pub fn has_services(&self) -> bool {
        self.services.is_some()
    }

    pub fn should_quit(&self) -> bool {
        self.quitting
    }

    /// True while the spinner has something to animate.
    pub fn any_loading(&self) -> bool {
        self.loading || self.users.loading || self.routines.loading
    }

    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
    }

    /// Recompute the visible view from loading, error and the active tab.
    fn recompute_view(&mut self) {
        let next = route(self.loading, self.error.is_some(), self.active_tab());
        if next != self.view {
            tracing::debug!(
                target: "tui.state_transition",
                from = ?self.view,
                to = ?next,
                "View changed"
            );
        }
        self.view = next;
    }

    fn apply_viewport(&mut self) {
        let rows = usize::from(self.table_height);
        self.users.table.set_viewport(rows);
        self.routines.table.set_viewport(rows);
    }

    fn page_size(&self) -> usize {
        usize::from(self.table_height).max(1)
    }

    /// Table state of the data tab currently shown, if any.
    fn visible_table(&mut self) -> Option<&mut RecordTableState> {
        match self.view {
            View::Users => Some(&mut self.users.table),
            View::Routines => Some(&mut self.routines.table),
            _ => None,
        }
    }

    fn start_users_fetch(&mut self) -> FtuiCmd<Msg> {
        let Some(services) = self.services.as_ref() else {
            return FtuiCmd::none();
        };
        let users = Arc::clone(&services.users);
        self.users.begin_fetch();
        tracing::info!(target: "tui.state_transition", panel = "users", "Fetch started");
        commands::users_cmd(users)
    }

    fn start_routines_fetch(&mut self) -> FtuiCmd<Msg> {
        let Some(services) = self.services.as_ref() else {
            return FtuiCmd::none();
        };
        let store = Arc::clone(&services.store);
        self.routines.begin_fetch();
        tracing::info!(target: "tui.state_transition", panel = "routines", "Fetch started");
        commands::routines_cmd(store)
    }

    /// Fetch the visible data tab if it has never loaded.
    fn fetch_on_entry(&mut self) -> FtuiCmd<Msg> {
        match self.view {
            View::Users if !self.users.loaded && self.users.can_fetch() => {
                self.start_users_fetch()
            }
            View::Routines if !self.routines.loaded && self.routines.can_fetch() => {
                self.start_routines_fetch()
            }
            _ => FtuiCmd::none(),
        }
    }

    fn refresh_active(&mut self) -> FtuiCmd<Msg> {
        match self.view {
            View::Users if self.users.can_fetch() => self.start_users_fetch(),
            View::Routines if self.routines.can_fetch() => self.start_routines_fetch(),
            _ => FtuiCmd::none(),
        }
    }

    fn switch_tab(&mut self, index: usize) -> FtuiCmd<Msg> {
        let from = self.active_tab();
        self.active_tab = index;
        self.recompute_view();
        tracing::debug!(
            target: "tui.state_transition",
            from = from.label(),
            to = self.active_tab().label(),
            "Tab switched"
        );
        self.fetch_on_entry()
    }

    fn handle_msg(&mut self, msg: Msg) -> FtuiCmd<Msg> {
        match msg {
            Msg::KeyPressed(key) => self.handle_key(key),
            Msg::Resized { width, height } => {
                self.width = width;
                self.height = height;
                self.table_height = layout::table_height(height);
                self.apply_viewport();
                tracing::debug!(
                    target: "tui.state_transition",
                    width,
                    height,
                    table_height = self.table_height,
                    "Terminal resized"
                );
                FtuiCmd::none()
            }
            Msg::Tick => {
                self.spinner.advance();
                FtuiCmd::none()
            }
            Msg::Noop => FtuiCmd::none(),

            Msg::NextTab => self.switch_tab(router::next_index(self.active_tab)),
            Msg::PrevTab => self.switch_tab(router::prev_index(self.active_tab)),
            Msg::CursorDown => {
                if let Some(table) = self.visible_table() {
                    table.cursor_down();
                }
                FtuiCmd::none()
            }
            Msg::CursorUp => {
                if let Some(table) = self.visible_table() {
                    table.cursor_up();
                }
                FtuiCmd::none()
            }
            Msg::CursorHome => {
                if let Some(table) = self.visible_table() {
                    table.cursor_home();
                }
                FtuiCmd::none()
            }
            Msg::CursorEnd => {
                if let Some(table) = self.visible_table() {
                    table.cursor_end();
                }
                FtuiCmd::none()
            }
            Msg::PageDown => {
                let page = self.page_size();
                if let Some(table) = self.visible_table() {
                    table.page_down(page);
                }
                FtuiCmd::none()
            }
            Msg::PageUp => {
                let page = self.page_size();
                if let Some(table) = self.visible_table() {
                    table.page_up(page);
                }
                FtuiCmd::none()
            }
            Msg::RequestRefresh => {
                tracing::info!(target: "tui.user_input", action = "refresh_requested", "Refresh requested");
                self.refresh_active()
            }

            Msg::GatewayReady(Ok(services)) => {
                tracing::info!(target: "tui.async_complete", "Gateway initialized");
                self.services = Some(services);
                self.loading = false;
                self.set_status("Firebase initialized successfully!");
                self.recompute_view();
                let fetch = self.fetch_on_entry();
                FtuiCmd::batch(vec![FtuiCmd::log("init: ready"), fetch])
            }
            Msg::GatewayReady(Err(error)) => {
                tracing::error!(target: "tui.async_complete", error = %error, "Gateway initialization failed");
                self.loading = false;
                self.error = Some(format!("Failed to initialize Firebase: {}", error));
                self.outcome.mark_startup_failed();
                self.recompute_view();
                FtuiCmd::log(format!("init: failed ({})", error))
            }
            Msg::UsersLoaded(Ok(mut users)) => {
                let count = users.len();
                sort_by_creation(&mut users);
                let rows = projector::project_users(&users);
                self.users.complete(users, rows);
                tracing::info!(target: "tui.async_complete", panel = "users", count, "Users loaded");
                FtuiCmd::log(format!("users: loaded (rows={})", count))
            }
            Msg::UsersLoaded(Err(error)) => {
                tracing::error!(target: "tui.async_complete", panel = "users", error = %error, "Users fetch failed");
                self.users.fail(format!("Failed to load users: {}", error));
                FtuiCmd::log(format!("users: failed ({})", error))
            }
            Msg::RoutinesLoaded(Ok(routines)) => {
                let count = routines.len();
                let rows = projector::project_routines(&routines);
                self.routines.complete(routines, rows);
                tracing::info!(target: "tui.async_complete", panel = "routines", count, "Routines loaded");
                FtuiCmd::log(format!("routines: loaded (rows={})", count))
            }
            Msg::RoutinesLoaded(Err(error)) => {
                tracing::error!(target: "tui.async_complete", panel = "routines", error = %error, "Routines fetch failed");
                self.routines
                    .fail(format!("Failed to load routines: {}", error));
                FtuiCmd::log(format!("routines: failed ({})", error))
            }

            Msg::Quit => {
                self.quitting = true;
                FtuiCmd::quit()
            }
        }
    }

    fn handle_key(&mut self, key: FtuiKeyEvent) -> FtuiCmd<Msg> {
        if !matches!(key.kind, FtuiKeyEventKind::Press | FtuiKeyEventKind::Repeat) {
            return FtuiCmd::none();
        }

        tracing::debug!(
            target: "tui.user_input",
            key_code = ?key.code,
            modifiers = ?key.modifiers,
            view = ?self.view,
            "Key event received"
        );

        let bindings = &self.key_bindings;
        let msg = if bindings.is_quit(&key) {
            tracing::info!(target: "tui.user_input", action = "quit", "Quit requested");
            Msg::Quit
        } else if bindings.is_prev_tab(&key) {
            Msg::PrevTab
        } else if bindings.is_next_tab(&key) {
            Msg::NextTab
        } else if bindings.is_next(&key) {
            Msg::CursorDown
        } else if bindings.is_prev(&key) {
            Msg::CursorUp
        } else if bindings.is_first(&key) {
            Msg::CursorHome
        } else if bindings.is_last(&key) {
            Msg::CursorEnd
        } else if bindings.is_page_down(&key) {
            Msg::PageDown
        } else if bindings.is_page_up(&key) {
            Msg::PageUp
        } else if bindings.is_refresh(&key) {
            Msg::RequestRefresh
        } else {
            return FtuiCmd::none();
        };
        self.handle_msg(msg)
    }

    // ── Rendering ─────────────────────────────────────────────────────

    fn content_lines(&self) -> Vec<FtuiLine> {
        let title = FtuiLine::from_spans([FtuiSpan::styled(APP_TITLE, self.theme.class("title"))]);
        let spin = self.spinner.current();
        match self.view {
            View::Loading => vec![
                title,
                FtuiLine::raw(""),
                FtuiLine::from_spans([FtuiSpan::styled(
                    format!("{} Loading Firebase... Please wait.", spin),
                    self.theme.class("status.loading"),
                )]),
            ],
            View::Error => vec![
                title,
                FtuiLine::raw(""),
                FtuiLine::from_spans([FtuiSpan::styled(
                    format!("Error: {}", self.error.as_deref().unwrap_or_default()),
                    self.theme.class("status.error"),
                )]),
                FtuiLine::raw(""),
                FtuiLine::raw("Press 'q' to quit."),
            ],
            View::Home => {
                let ok = self.theme.class("status.success");
                vec![
                    FtuiLine::from_spans([FtuiSpan::styled(
                        "Welcome to Arrogance Admin!",
                        self.theme.class("title"),
                    )]),
                    FtuiLine::raw(""),
                    FtuiLine::raw("Firebase is initialized and ready to use."),
                    FtuiLine::raw(""),
                    FtuiLine::from_spans([FtuiSpan::styled("✓ Auth service ready", ok)]),
                    FtuiLine::from_spans([FtuiSpan::styled("✓ Firestore service ready", ok)]),
                    FtuiLine::raw(""),
                    FtuiLine::from_spans([FtuiSpan::styled(
                        "Use the tabs above to navigate.",
                        self.theme.class("text.muted"),
                    )]),
                ]
            }
            View::Users => self.panel_lines(
                &self.users,
                "users",
                &[
                    "No users found in Firebase Authentication.",
                    "To add users, use the Firebase Console or Authentication SDK.",
                ],
            ),
            View::Routines => {
                self.panel_lines(&self.routines, "routines", &["No routines found in Firestore."])
            }
        }
    }

    /// Lines for a data panel that is not showing its table.
    fn panel_lines<T>(&self, panel: &Panel<T>, noun: &str, empty: &[&str]) -> Vec<FtuiLine> {
        if panel.loading {
            return vec![FtuiLine::from_spans([FtuiSpan::styled(
                format!("{} Loading {}...", self.spinner.current(), noun),
                self.theme.class("status.loading"),
            )])];
        }
        if let Some(ref error) = panel.error {
            return vec![FtuiLine::from_spans([FtuiSpan::styled(
                format!("Error loading {}: {}", noun, error),
                self.theme.class("status.error"),
            )])];
        }
        // Empty state: headline, then muted hints.
        let mut lines = Vec::with_capacity(empty.len() + 1);
        if let Some((headline, hints)) = empty.split_first() {
            lines.push(FtuiLine::raw(*headline));
            if !hints.is_empty() {
                lines.push(FtuiLine::raw(""));
            }
            let muted = self.theme.class("text.muted");
            for hint in hints {
                lines.push(FtuiLine::from_spans([FtuiSpan::styled(*hint, muted)]));
            }
        }
        lines
    }

    /// Draw a titled border; the caller fills `layout::block_inner(area)`.
    fn render_box(&self, frame: &mut FtuiFrame, area: Rect, title: &str) {
        let block = FtuiBlock::bordered()
            .title(title)
            .border_style(self.theme.class("border.normal"));
        FtuiWidget::render(
            &FtuiParagraph::new(FtuiText::raw("")).block(block),
            area,
            frame,
        );
    }

    fn render_data_table(
        &self,
        frame: &mut FtuiFrame,
        content: Rect,
        table: &RecordTableState,
        columns: &[projector::Column],
        summary: String,
    ) {
        self.render_box(frame, content, self.active_tab().label());

        let areas = ResponsiveLayout::data_areas(content);
        RecordTable::new(columns)
            .theme(&self.theme)
            .available_width(projector::content_width(self.width))
            .render_view(areas.table, frame, table);

        let para = FtuiParagraph::new(FtuiText::raw(summary)).style(self.theme.class("text.muted"));
        FtuiWidget::render(&para, areas.summary, frame);
    }

    fn shows_table<T>(panel: &Panel<T>) -> bool {
        !panel.loading && panel.error.is_none() && !panel.table.is_empty()
    }
}

impl FtuiModel for App {
    type Message = Msg;

    fn init(&mut self) -> FtuiCmd<Self::Message> {
        tracing::info!(
            target: "tui.startup",
            gateway = self.gateway.name(),
            terminal_size = ?self.size(),
            theme = ?self.theme.mode,
            "TUI model initialized"
        );
        commands::init_cmd(Arc::clone(&self.gateway))
    }

    fn update(&mut self, msg: Self::Message) -> FtuiCmd<Self::Message> {
        self.handle_msg(msg)
    }

    fn view(&self, frame: &mut FtuiFrame) {
        let full_area = Rect::new(0, 0, frame.width(), frame.height());
        let layout = ResponsiveLayout::new(full_area);

        if layout.is_too_small() {
            draw_ftui_text(frame, 0, 0, "Terminal too small (min 40x10)");
            return;
        }

        let areas = layout.main_areas();

        TabBar::new(self.active_tab())
            .theme(&self.theme)
            .render_ftui(areas.tabs, frame);

        match self.view {
            View::Users if Self::shows_table(&self.users) => self.render_data_table(
                frame,
                areas.content,
                &self.users.table,
                &USER_COLUMNS,
                format!("Total users: {}", self.users.records.len()),
            ),
            View::Routines if Self::shows_table(&self.routines) => self.render_data_table(
                frame,
                areas.content,
                &self.routines.table,
                &ROUTINE_COLUMNS,
                format!("Total routines: {}", self.routines.records.len()),
            ),
            _ => {
                let title = match self.view {
                    View::Loading | View::Error => APP_TITLE,
                    _ => self.active_tab().label(),
                };
                self.render_box(frame, areas.content, title);
                let text: FtuiText = self.content_lines().into_iter().collect();
                FtuiWidget::render(
                    &FtuiParagraph::new(text),
                    layout::block_inner(areas.content),
                    frame,
                );
            }
        }

        let mut status_bar = StatusBar::new().theme(&self.theme);
        if matches!(self.view, View::Users | View::Routines) {
            status_bar = status_bar.tab(self.active_tab());
        }
        if let Some(ref msg) = self.status_message {
            status_bar = status_bar.message(msg);
        }
        status_bar.render_ftui(areas.footer, frame);
    }

    fn subscriptions(&self) -> Vec<Box<dyn Subscription<Self::Message>>> {
        if !self.any_loading() {
            return Vec::new();
        }
        vec![Box::new(Every::with_id(
            SPINNER_TICK_ID,
            spinner::INTERVAL,
            || Msg::Tick,
        ))]
    }
}

fn draw_ftui_text(frame: &mut FtuiFrame, x: u16, y: u16, text: &str) {
    if y >= frame.height() || x >= frame.width() {
        return;
    }

    let mut col = x;
    let max_col = frame.width();
    for ch in text.chars() {
        if col >= max_col {
            break;
        }
        frame.buffer.set(col, y, FtuiCell::from_char(ch));
        col = col.saturating_add(1);
    }
}

/// Run the dashboard using the ftui runtime.
///
/// Terminal setup, event polling and teardown are delegated to ftui's
/// `Program`. Read the exit code from [`App::outcome`] afterwards.
pub fn run_ftui(app: App, config: ProgramConfig) -> TuiResult<()> {
    let mut program =
        Program::with_config(app, config).map_err(|e| TuiError::TerminalInit(e.to_string()))?;
    program
        .run()
        .map_err(|e| TuiError::TerminalInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;
    use ftui::{GraphemePool, KeyCode as FtuiKeyCode, Modifiers as FtuiModifiers};
    use proptest::prelude::*;

    fn app() -> App {
        App::new(Arc::new(MemoryGateway::demo())).with_theme(Theme::no_color())
    }

    fn ready_app() -> App {
        let mut app = app();
        let services = MemoryGateway::demo().initialize().unwrap();
        <App as FtuiModel>::update(&mut app, Msg::GatewayReady(Ok(services)));
        app
    }

    fn key(code: FtuiKeyCode) -> Msg {
        Msg::KeyPressed(FtuiKeyEvent::new(code))
    }

    fn render(app: &App, width: u16, height: u16) -> String {
        let mut pool = GraphemePool::new();
        let mut frame = FtuiFrame::new(width, height, &mut pool);
        <App as FtuiModel>::view(app, &mut frame);
        let FtuiFrame { buffer, .. } = frame;
        ftui_harness::buffer_to_text(&buffer)
    }

    fn assert_view_consistent(app: &App) {
        assert_eq!(
            app.view_id(),
            route(app.is_loading(), app.error().is_some(), app.active_tab())
        );
    }

    #[test]
    fn test_app_starts_loading() {
        let app = app();
        assert!(app.is_loading());
        assert_eq!(app.view_id(), View::Loading);
        assert_eq!(app.active_tab(), Tab::Home);
        assert!(!app.has_services());
        assert!(!app.should_quit());
    }

    #[test]
    fn test_quit_message() {
        let mut app = app();
        let cmd = <App as FtuiModel>::update(&mut app, Msg::Quit);
        assert!(matches!(cmd, FtuiCmd::Quit));
        assert!(app.should_quit());
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        let cmd = <App as FtuiModel>::update(&mut app, key(FtuiKeyCode::Char('q')));
        assert!(matches!(cmd, FtuiCmd::Quit));

        let mut app = ready_app();
        let ctrl_c = FtuiKeyEvent::new(FtuiKeyCode::Char('c')).with_modifiers(FtuiModifiers::CTRL);
        let cmd = <App as FtuiModel>::update(&mut app, Msg::KeyPressed(ctrl_c));
        assert!(matches!(cmd, FtuiCmd::Quit));
    }

    #[test]
    fn test_init_success_goes_home() {
        let app = ready_app();
        assert!(!app.is_loading());
        assert!(app.has_services());
        assert_eq!(app.view_id(), View::Home);
        assert_eq!(
            app.status_message(),
            Some("Firebase initialized successfully!")
        );
    }

    #[test]
    fn test_init_failure_shows_error_and_marks_outcome() {
        let mut app = app();
        let outcome = app.outcome();
        <App as FtuiModel>::update(&mut app, Msg::GatewayReady(Err("no credentials".into())));
        assert_eq!(app.view_id(), View::Error);
        assert_eq!(
            app.error(),
            Some("Failed to initialize Firebase: no credentials")
        );
        assert_eq!(outcome.exit_code(), ExitCode::StartupError);
    }

    #[test]
    fn test_clean_session_exit_code() {
        let app = ready_app();
        assert_eq!(app.outcome().exit_code(), ExitCode::Clean);
    }

    #[test]
    fn test_tab_into_users_starts_fetch_once() {
        let mut app = ready_app();
        <App as FtuiModel>::update(&mut app, Msg::NextTab);
        assert_eq!(app.view_id(), View::Users);
        assert!(app.users.loading);

        // Away and back while still loading: no second fetch.
        <App as FtuiModel>::update(&mut app, Msg::PrevTab);
        <App as FtuiModel>::update(&mut app, Msg::NextTab);
        assert!(app.users.loading);
    }

    #[test]
    fn test_no_fetch_while_global_error() {
        let mut app = app();
        <App as FtuiModel>::update(&mut app, Msg::GatewayReady(Err("boom".into())));
        <App as FtuiModel>::update(&mut app, Msg::NextTab);
        assert_eq!(app.active_tab(), Tab::Users);
        assert_eq!(app.view_id(), View::Error);
        assert!(!app.users.loading);
    }

    #[test]
    fn test_users_loaded_sorted_by_creation() {
        let mut app = ready_app();
        <App as FtuiModel>::update(&mut app, Msg::NextTab);
        let users = vec![
            UserRecord::new("b", 200),
            UserRecord::new("a", 100),
            UserRecord::new("c", 300),
        ];
        <App as FtuiModel>::update(&mut app, Msg::UsersLoaded(Ok(users)));
        let created: Vec<i64> = app.users.records.iter().map(|u| u.created_at_ms).collect();
        assert_eq!(created, vec![100, 200, 300]);
        assert!(app.users.loaded);
        assert!(!app.users.loading);
        assert_eq!(app.users.table.rows[0][0], "a");
    }

    #[test]
    fn test_users_error_keeps_records() {
        let mut app = ready_app();
        <App as FtuiModel>::update(&mut app, Msg::NextTab);
        <App as FtuiModel>::update(
            &mut app,
            Msg::UsersLoaded(Ok(vec![UserRecord::new("a", 1)])),
        );
        <App as FtuiModel>::update(&mut app, key(FtuiKeyCode::Char('r')));
        assert!(app.users.loading);
        <App as FtuiModel>::update(&mut app, Msg::UsersLoaded(Err("timeout".into())));
        assert_eq!(app.users.error.as_deref(), Some("Failed to load users: timeout"));
        assert_eq!(app.users.records.len(), 1);
        assert!(!app.users.loading);
    }

    #[test]
    fn test_late_completion_applies_after_tab_away() {
        let mut app = ready_app();
        <App as FtuiModel>::update(&mut app, Msg::NextTab);
        <App as FtuiModel>::update(&mut app, Msg::NextTab);
        assert_eq!(app.view_id(), View::Routines);
        <App as FtuiModel>::update(
            &mut app,
            Msg::UsersLoaded(Ok(vec![UserRecord::new("late", 5)])),
        );
        assert_eq!(app.users.records[0].uid, "late");
        assert!(app.users.loaded);
    }

    #[test]
    fn test_loaded_panel_not_refetched_on_entry() {
        let mut app = ready_app();
        <App as FtuiModel>::update(&mut app, Msg::NextTab);
        <App as FtuiModel>::update(&mut app, Msg::UsersLoaded(Ok(Vec::new())));
        <App as FtuiModel>::update(&mut app, Msg::PrevTab);
        <App as FtuiModel>::update(&mut app, Msg::NextTab);
        assert!(!app.users.loading);
    }

    #[test]
    fn test_resize_sets_table_height() {
        let mut app = app();
        <App as FtuiModel>::update(
            &mut app,
            Msg::Resized {
                width: 120,
                height: 40,
            },
        );
        assert_eq!(app.size(), (120, 40));
        assert_eq!(app.table_height(), 27);

        <App as FtuiModel>::update(&mut app, Msg::Resized { width: 50, height: 5 });
        assert_eq!(app.table_height(), 0);
    }

    #[test]
    fn test_tick_advances_spinner() {
        let mut app = app();
        <App as FtuiModel>::update(&mut app, Msg::Tick);
        <App as FtuiModel>::update(&mut app, Msg::Tick);
        assert_eq!(app.spinner().frame_index(), 2);
    }

    #[test]
    fn test_ticker_only_while_loading() {
        let app = app();
        let subs = <App as FtuiModel>::subscriptions(&app);
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].id(), SPINNER_TICK_ID);

        let mut app = ready_app();
        assert!(<App as FtuiModel>::subscriptions(&app).is_empty());

        <App as FtuiModel>::update(&mut app, Msg::PrevTab);
        assert_eq!(app.active_tab(), Tab::Routines);
        assert!(app.routines.loading);
        assert_eq!(<App as FtuiModel>::subscriptions(&app).len(), 1);
    }

    #[test]
    fn test_cursor_navigation_on_users() {
        let mut app = ready_app();
        <App as FtuiModel>::update(&mut app, Msg::NextTab);
        let users = (0..5).map(|i| UserRecord::new(format!("u{i}"), i)).collect();
        <App as FtuiModel>::update(&mut app, Msg::UsersLoaded(Ok(users)));
        <App as FtuiModel>::update(&mut app, key(FtuiKeyCode::Down));
        <App as FtuiModel>::update(&mut app, key(FtuiKeyCode::Char('j')));
        assert_eq!(app.users.table.cursor, 2);
        <App as FtuiModel>::update(&mut app, key(FtuiKeyCode::End));
        assert_eq!(app.users.table.cursor, 4);
        <App as FtuiModel>::update(&mut app, key(FtuiKeyCode::Home));
        assert_eq!(app.users.table.cursor, 0);
    }

    #[test]
    fn test_render_loading_view() {
        let text = render(&app(), 100, 30);
        let rows: Vec<&str> = text.lines().collect();
        assert!(rows[1].contains("Home"));
        assert!(rows[1].contains("Users"));
        assert!(rows[1].contains("Routines"));
        // Content box border at row 3, first inner row at 4.
        assert!(rows[4].contains("Arrogance Admin"));
        assert!(rows[6].contains("Loading Firebase... Please wait."));
    }

    #[test]
    fn test_render_home_view() {
        let text = render(&ready_app(), 100, 30);
        let rows: Vec<&str> = text.lines().collect();
        assert!(rows[1].contains("Home │ Users │ Routines"));
        assert!(rows[4].contains("Welcome to Arrogance Admin!"));
        assert!(text.contains("✓ Firestore service ready"));
        assert!(text.contains("Press 'q' to quit, tab/arrow keys to navigate"));
    }

    #[test]
    fn test_render_users_table() {
        let mut app = ready_app();
        <App as FtuiModel>::update(&mut app, Msg::NextTab);
        let users = vec![UserRecord::new("uid-42", 1).with_email("x@y.z")];
        <App as FtuiModel>::update(&mut app, Msg::UsersLoaded(Ok(users)));
        let text = render(&app, 140, 30);
        assert!(text.contains("uid-42"));
        assert!(text.contains("Total users: 1"));
        assert!(text.contains("up/down to select users"));
    }

    #[test]
    fn test_render_too_small() {
        let text = render(&app(), 30, 8);
        assert!(text.contains("Terminal too small (min 40x10)"));
    }

    fn arb_msg() -> impl Strategy<Value = Msg> {
        prop_oneof![
            Just(Msg::NextTab),
            Just(Msg::PrevTab),
            Just(Msg::Tick),
            Just(Msg::CursorDown),
            Just(Msg::PageDown),
            Just(Msg::RequestRefresh),
            Just(Msg::GatewayReady(Err("denied".to_string()))),
            Just(Msg::UsersLoaded(Ok(vec![UserRecord::new("u", 1)]))),
            Just(Msg::UsersLoaded(Err("reset".to_string()))),
            Just(Msg::RoutinesLoaded(Ok(Vec::new()))),
            Just(Msg::RoutinesLoaded(Err("denied".to_string()))),
            (20u16..200, 5u16..60).prop_map(|(width, height)| Msg::Resized { width, height }),
        ]
    }

    proptest! {
        #[test]
        fn prop_view_always_matches_router(
            init_ok in any::<bool>(),
            msgs in proptest::collection::vec(arb_msg(), 0..40),
        ) {
            let mut app = app();
            assert_view_consistent(&app);
            if init_ok {
                let services = MemoryGateway::demo().initialize().unwrap();
                <App as FtuiModel>::update(&mut app, Msg::GatewayReady(Ok(services)));
                assert_view_consistent(&app);
            }
            for msg in msgs {
                <App as FtuiModel>::update(&mut app, msg);
                prop_assert_eq!(
                    app.view_id(),
                    route(app.is_loading(), app.error().is_some(), app.active_tab())
                );
            }
        }
    }
}
