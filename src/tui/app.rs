//! TUI Application - main event loop and terminal management
//!
//! This module contains the core TUI application logic including:
//! - Terminal setup and restoration
//! - Event loop over poll outcomes and keyboard input
//! - Tab switching between Board, Graph and Gas Town
//! - The issue detail overlay
//!
//! All dashboard state lives in [`Dashboard`]; this module maps keys onto its
//! transitions and draws whatever it holds.

use std::io::{self, stdout};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::views::{BoardView, GraphView, IssueDetailView, TownView};
use crate::Result;
use crate::client::{DashboardSource, TransportError};
use crate::models::{GraphResponse, Issue};
use crate::poll::{CycleOutcome, Poller};
use crate::state::{Dashboard, Overlay, Phase, View};
use crate::stats::{board_tab_label, gastown_tab_label};

/// How often the loop checks for key presses and redraws.
const TICK: Duration = Duration::from_millis(100);

/// Work a key press asks the event loop to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Run a poll cycle now, and reload the graph if it is showing
    Refresh,
    /// Leave the connection error screen and poll again
    Retry,
    /// Fetch an issue and open it in the overlay
    OpenIssue(String),
    /// Fetch the graph for the Graph tab
    LoadGraph,
}

/// Result of an on-demand fetch, handed back to the event loop.
#[derive(Debug)]
pub enum Fetched {
    Issue {
        id: String,
        result: std::result::Result<Issue, TransportError>,
    },
    Graph(std::result::Result<GraphResponse, TransportError>),
}

/// Main TUI application state
pub struct TuiApp {
    dashboard: Dashboard,
    should_quit: bool,
    board_view: BoardView,
    graph_view: GraphView,
    town_view: TownView,
    detail_view: IssueDetailView,
    /// A graph fetch is in flight
    graph_pending: bool,
    /// Last key pressed (for gg detection)
    last_key: Option<KeyCode>,
}

impl TuiApp {
    /// Create a new TUI application
    pub fn new(daemon_url: impl Into<String>) -> Self {
        Self {
            dashboard: Dashboard::new(daemon_url),
            should_quit: false,
            board_view: BoardView::new(),
            graph_view: GraphView::new(),
            town_view: TownView::new(),
            detail_view: IssueDetailView::new(),
            graph_pending: false,
            last_key: None,
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Apply a finished poll cycle
    pub fn apply_cycle(&mut self, outcome: &CycleOutcome) {
        self.dashboard.apply_cycle(outcome);
    }

    /// Fetch the graph if the Graph tab is showing and has never loaded.
    fn on_view_changed(&self) -> Option<Action> {
        let unloaded = !self.graph_view.is_loaded() && !self.graph_pending;
        (self.dashboard.view() == View::Graph && unloaded).then_some(Action::LoadGraph)
    }

    /// Handle keyboard events
    pub fn handle_key(&mut self, key: KeyCode) -> Option<Action> {
        if matches!(self.dashboard.phase(), Phase::ConnectionError(_)) {
            return match key {
                KeyCode::Char('R') | KeyCode::Char('r') | KeyCode::Enter => {
                    self.dashboard.retry().then_some(Action::Retry)
                }
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.should_quit = true;
                    None
                }
                _ => None,
            };
        }
        if *self.dashboard.phase() == Phase::Loading {
            if matches!(key, KeyCode::Char('q') | KeyCode::Esc) {
                self.should_quit = true;
            }
            return None;
        }

        let overlay_open = self.dashboard.overlay().is_open();
        let previous = self.last_key.replace(key);
        let view = self.dashboard.view();

        match key {
            KeyCode::Char('q') => {
                self.should_quit = true;
                None
            }
            KeyCode::Esc => {
                if !self.dashboard.close_issue() {
                    self.should_quit = true;
                }
                None
            }
            // View switching
            KeyCode::Tab => {
                self.dashboard.next_view();
                self.on_view_changed()
            }
            KeyCode::Char(c @ '1'..='3') => {
                let index = (c as usize) - ('1' as usize);
                self.dashboard.select_view(View::ALL[index]);
                self.on_view_changed()
            }
            // Navigation
            KeyCode::Char('j') | KeyCode::Down => {
                if overlay_open {
                    self.detail_view.scroll_down();
                    return None;
                }
                match view {
                    View::Beads => {
                        if let Some(board) = self.dashboard.snapshot().board() {
                            self.board_view.select_next(board);
                        }
                    }
                    View::Graph => self.graph_view.select_next(),
                    View::Gastown => self.town_view.scroll_down(),
                }
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if overlay_open {
                    self.detail_view.scroll_up();
                    return None;
                }
                match view {
                    View::Beads => {
                        if let Some(board) = self.dashboard.snapshot().board() {
                            self.board_view.select_previous(board);
                        }
                    }
                    View::Graph => self.graph_view.select_previous(),
                    View::Gastown => self.town_view.scroll_up(),
                }
                None
            }
            KeyCode::Char('h') | KeyCode::Left => {
                if let (View::Beads, Some(board)) = (view, self.dashboard.snapshot().board()) {
                    self.board_view.select_left(board);
                }
                None
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if let (View::Beads, Some(board)) = (view, self.dashboard.snapshot().board()) {
                    self.board_view.select_right(board);
                }
                None
            }
            KeyCode::Char('g') => {
                if previous == Some(KeyCode::Char('g')) {
                    self.select_first();
                    self.last_key = None;
                }
                None
            }
            KeyCode::Home => {
                self.select_first();
                None
            }
            KeyCode::Char('G') | KeyCode::End => {
                match view {
                    View::Beads => {
                        if let Some(board) = self.dashboard.snapshot().board() {
                            self.board_view.select_last(board);
                        }
                    }
                    View::Graph => self.graph_view.select_last(),
                    View::Gastown => {}
                }
                None
            }
            KeyCode::Enter => self.selected_issue_id().map(Action::OpenIssue),
            KeyCode::Char('r') => Some(Action::Refresh),
            _ => None,
        }
    }

    fn select_first(&mut self) {
        match self.dashboard.view() {
            View::Beads => self.board_view.select_first(),
            View::Graph => self.graph_view.select_first(),
            View::Gastown => self.town_view.scroll_top(),
        }
    }

    /// Issue under the cursor on the Board or Graph tab.
    fn selected_issue_id(&self) -> Option<String> {
        match self.dashboard.view() {
            View::Beads => {
                let board = self.dashboard.snapshot().board()?;
                self.board_view.selected_issue(board).map(|i| i.id.clone())
            }
            View::Graph => self.graph_view.selected_node().map(|n| n.id.clone()),
            View::Gastown => None,
        }
    }

    fn load_graph<S>(&mut self, source: &Arc<S>, fetches: &mut JoinSet<Fetched>)
    where
        S: DashboardSource + 'static,
    {
        if self.graph_pending {
            return;
        }
        self.graph_pending = true;
        let source = Arc::clone(source);
        fetches.spawn(async move { Fetched::Graph(source.graph().await) });
    }

    /// Carry out an action. Returns true when a poll cycle should be triggered.
    ///
    /// Issue and graph fetches are spawned onto `fetches`; their results come
    /// back through [`TuiApp::apply_fetched`].
    pub fn perform<S>(
        &mut self,
        action: Action,
        source: &Arc<S>,
        fetches: &mut JoinSet<Fetched>,
    ) -> bool
    where
        S: DashboardSource + 'static,
    {
        match action {
            Action::Retry => true,
            Action::Refresh => {
                if self.dashboard.view() == View::Graph {
                    self.load_graph(source, fetches);
                }
                true
            }
            Action::LoadGraph => {
                self.load_graph(source, fetches);
                false
            }
            Action::OpenIssue(id) => {
                let source = Arc::clone(source);
                fetches.spawn(async move {
                    let result = source.issue(&id).await;
                    Fetched::Issue { id, result }
                });
                false
            }
        }
    }

    /// Apply the result of an on-demand fetch
    pub fn apply_fetched(&mut self, fetched: Fetched) {
        match fetched {
            Fetched::Issue { id, result } => match result {
                Ok(issue) => self.dashboard.open_issue(issue),
                Err(e) => self.dashboard.issue_fetch_failed(&id, &e),
            },
            Fetched::Graph(result) => {
                self.graph_pending = false;
                match result {
                    Ok(graph) => self.graph_view.set_graph(graph),
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to fetch graph");
                        self.graph_view.set_error(e.to_string());
                    }
                }
            }
        }
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame, now: DateTime<Utc>) {
        let area = frame.area();
        match self.dashboard.phase() {
            Phase::Loading => {
                let text = format!("Connecting to gvid at {}...", self.dashboard.daemon_url());
                let line = Line::styled(text, Style::default().fg(Color::DarkGray));
                render_centered(frame, area, vec![line]);
                return;
            }
            Phase::ConnectionError(message) => {
                let lines = vec![
                    Line::styled(
                        message.clone(),
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                    Line::from(""),
                    Line::styled(
                        "Press R to retry, q to quit",
                        Style::default().fg(Color::DarkGray),
                    ),
                ];
                render_centered(frame, area, lines);
                return;
            }
            Phase::Ready => {}
        }

        // Create main layout
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title bar
                Constraint::Min(5),    // Main content
                Constraint::Length(3), // Status bar
            ])
            .split(area);

        self.render_title_bar(frame, chunks[0]);

        let snapshot = self.dashboard.snapshot();
        match self.dashboard.view() {
            View::Beads => self.board_view.render(frame, chunks[1], snapshot.board()),
            View::Graph => self.graph_view.render(frame, chunks[1]),
            View::Gastown => {
                self.town_view
                    .render(frame, chunks[1], snapshot.town(), snapshot.town_status(), now)
            }
        }

        self.render_status_bar(frame, chunks[2]);

        if let Overlay::Open(issue) = self.dashboard.overlay() {
            self.detail_view.render(frame, area, issue, now);
        }
    }

    /// Render the tab bar
    fn render_title_bar(&self, frame: &mut Frame, area: Rect) {
        let snapshot = self.dashboard.snapshot();
        let tabs = [
            (View::Beads, board_tab_label(snapshot.board())),
            (View::Graph, "Graph".to_string()),
            (View::Gastown, gastown_tab_label(snapshot.town_status())),
        ];

        let active_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let inactive_style = Style::default().fg(Color::DarkGray);

        let mut spans = Vec::new();
        for (i, (view, label)) in tabs.into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" | "));
            }
            let text = format!(" [{}] {}", view.index() + 1, label);
            let style = if view == self.dashboard.view() {
                active_style
            } else {
                inactive_style
            };
            spans.push(Span::styled(text, style));
        }

        let title = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(title, area);
    }

    /// Render the status bar with keybindings
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let hints = if self.dashboard.overlay().is_open() {
            " Esc:Close  j/k:Scroll  Tab/1-3:Switch View  q:Quit"
        } else {
            match self.dashboard.view() {
                View::Beads => {
                    " Tab/1-3:Switch View  h/l:Column  j/k:Navigate  Enter:Open  r:Refresh  q:Quit"
                }
                View::Graph => {
                    " Tab/1-3:Switch View  j/k:Navigate  gg/G:Top/Bottom  Enter:Open  r:Refresh  q:Quit"
                }
                View::Gastown => " Tab/1-3:Switch View  j/k:Scroll  r:Refresh  q:Quit",
            }
        };
        let status = Paragraph::new(hints)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(status, area);
    }
}

fn render_centered(frame: &mut Frame, area: Rect, lines: Vec<Line<'_>>) {
    let height = lines.len() as u16;
    let top = area.height.saturating_sub(height) / 2;
    let inner = Rect::new(area.x, area.y + top, area.width, height.min(area.height));
    let body = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(body, inner);
}

/// Setup the terminal for TUI mode
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

/// Restore the terminal to normal mode
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

async fn event_loop<S: DashboardSource + 'static>(
    app: &mut TuiApp,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    source: &Arc<S>,
    poller: &Poller,
    outcomes: &mut mpsc::Receiver<CycleOutcome>,
) -> Result<()> {
    // Dropped with the loop, which aborts fetches still in flight.
    let mut fetches = JoinSet::new();

    loop {
        terminal.draw(|f| app.render(f, Utc::now()))?;

        let action = tokio::select! {
            outcome = outcomes.recv() => {
                match outcome {
                    Some(outcome) => app.apply_cycle(&outcome),
                    None => {
                        tracing::warn!("poller ended");
                        break;
                    }
                }
                None
            }
            Some(joined) = fetches.join_next() => {
                match joined {
                    Ok(fetched) => app.apply_fetched(fetched),
                    Err(e) => tracing::warn!(error = %e, "fetch task failed"),
                }
                None
            }
            _ = tokio::time::sleep(TICK) => {
                let mut action = None;
                if event::poll(Duration::from_millis(0))? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind == KeyEventKind::Press {
                            action = app.handle_key(key.code);
                        }
                    }
                }
                action
            }
        };

        if let Some(action) = action {
            if app.perform(action, source, &mut fetches) {
                poller.trigger();
            }
        }

        if app.should_quit() {
            break;
        }
    }
    Ok(())
}

/// Run the TUI application
///
/// Starts the poller, takes over the terminal and runs until the user quits.
/// The poller is stopped before the terminal is restored.
pub async fn run_tui<S: DashboardSource + 'static>(
    source: Arc<S>,
    daemon_url: &str,
    interval: Duration,
) -> Result<()> {
    let (tx, mut rx) = mpsc::channel(4);
    let poller = Poller::start(Arc::clone(&source), interval, tx);
    let mut app = TuiApp::new(daemon_url);

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut app, &mut terminal, &source, &poller, &mut rx).await;

    poller.stop();
    restore_terminal()?;
    tracing::info!("dashboard closed");
    result
}
