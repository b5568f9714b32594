//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, resize, frame tick)
//! - ViewStateMachine for everything with behavior
//! - Widget-local state (list cursor, input buffer, scroll) for rendering
//!
//! Keys become [`Intent`]s; each frame applies finished exchanges with
//! [`ViewStateMachine::poll_exchanges`] and redraws from the view state.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, List, ListItem, ListState, Paragraph, Tabs};
use ratatui::{Frame, Terminal};
use unicode_width::UnicodeWidthChar;

use wisdom_conductor::{Figure, Intent, Sender, SessionController, ViewState, ViewStateMachine};

use crate::theme;

/// Title shown on the browse screen
pub const APP_TITLE: &str = "Wisdom Through Time";

/// Tagline under the title
pub const APP_TAGLINE: &str = "Engage in meaningful conversations with history's greatest minds";

/// Shown in the empty search box
pub const SEARCH_PLACEHOLDER: &str = "Search historical figures...";

/// Target frame interval
const FRAME_DURATION: Duration = Duration::from_millis(50);

/// Lines moved per PageUp/PageDown
const SCROLL_STEP: usize = 5;

/// Main application state
pub struct App {
    // === Core State ===
    /// Is the app still running?
    running: bool,
    /// Browse / Conversation state machine
    view: ViewStateMachine,

    // === Browse Widgets ===
    /// Tab titles, `"All"` first
    categories: Vec<String>,
    /// Selected tab
    category_index: usize,
    /// Highlighted row in the result list
    selected: usize,

    // === Conversation Widgets ===
    /// Message being typed
    input_buffer: String,
    /// Scroll offset (lines from bottom, 0 = latest)
    scroll_offset: usize,
    /// Total rendered log lines (for scroll bounds)
    total_lines: usize,
}

impl App {
    /// Create an App in Browse mode
    #[must_use]
    pub fn new(view: ViewStateMachine) -> Self {
        let categories = view.categories();

        Self {
            running: true,
            view,
            categories,
            category_index: 0,
            selected: 0,
            input_buffer: String::new(),
            scroll_offset: 0,
            total_lines: 0,
        }
    }

    /// Whether the event loop should keep going
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The underlying state machine
    #[must_use]
    pub fn view(&self) -> &ViewStateMachine {
        &self.view
    }

    /// Main event loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();

        // Render initial frame immediately so user sees UI
        terminal.draw(|frame| self.draw(frame))?;

        while self.running {
            let frame_start = Instant::now();

            tokio::select! {
                biased;

                maybe_event = event_stream.next() => {
                    match maybe_event {
                        // Only handle Press events (not Release or Repeat)
                        Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                            self.handle_key(key);
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return Err(e.into()),
                        None => self.running = false,
                    }
                }

                () = tokio::time::sleep(FRAME_DURATION) => {}
            }

            if self.view.poll_exchanges() > 0 {
                self.scroll_offset = 0;
            }

            terminal.draw(|frame| self.draw(frame))?;

            // Frame rate limiting
            let elapsed = frame_start.elapsed();
            if elapsed < FRAME_DURATION {
                tokio::time::sleep(FRAME_DURATION - elapsed).await;
            }
        }

        Ok(())
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.running = false;
            return;
        }

        if self.view.state().is_browse() {
            self.handle_browse_key(key);
        } else {
            self.handle_conversation_key(key);
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.running = false,
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                let last = self.view.results().len().saturating_sub(1);
                self.selected = (self.selected + 1).min(last);
            }
            KeyCode::Tab => self.cycle_category(1),
            KeyCode::BackTab => self.cycle_category(self.categories.len().saturating_sub(1)),
            KeyCode::Enter => {
                let Some(id) = self.view.results().get(self.selected).map(|f| f.id) else {
                    return;
                };
                if self.dispatch(Intent::SelectEntity(id)) {
                    self.input_buffer.clear();
                    self.scroll_offset = 0;
                }
            }
            KeyCode::Backspace => {
                let mut query = self.view.query().to_string();
                if query.pop().is_some() {
                    self.dispatch(Intent::SetSearchQuery(query));
                    self.selected = 0;
                }
            }
            KeyCode::Char(c) => {
                let mut query = self.view.query().to_string();
                query.push(c);
                self.dispatch(Intent::SetSearchQuery(query));
                self.selected = 0;
            }
            _ => {}
        }
    }

    fn handle_conversation_key(&mut self, key: KeyEvent) {
        let pending = self.view.session().is_some_and(SessionController::is_pending);

        match key.code {
            KeyCode::Esc => {
                self.dispatch(Intent::Back);
                self.input_buffer.clear();
            }
            KeyCode::PageUp => {
                let max_scroll = self.total_lines.saturating_sub(1);
                self.scroll_offset = (self.scroll_offset + SCROLL_STEP).min(max_scroll);
            }
            KeyCode::PageDown => {
                self.scroll_offset = self.scroll_offset.saturating_sub(SCROLL_STEP);
            }
            // Input is disabled while a reply is pending
            _ if pending => {}
            KeyCode::Enter => match self.view.send_message(&self.input_buffer) {
                Ok(true) => {
                    self.input_buffer.clear();
                    self.scroll_offset = 0;
                }
                Ok(false) => {
                    if self.input_buffer.trim().is_empty() {
                        self.input_buffer.clear();
                    }
                }
                Err(e) => tracing::debug!(error = %e, "Send rejected"),
            },
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Char(c) => self.input_buffer.push(c),
            _ => {}
        }
    }

    fn cycle_category(&mut self, step: usize) {
        if self.categories.is_empty() {
            return;
        }
        self.category_index = (self.category_index + step) % self.categories.len();
        let name = self.categories[self.category_index].clone();
        self.dispatch(Intent::SetCategory(name));
        self.selected = 0;
    }

    /// Forward an intent, logging rejections
    fn dispatch(&mut self, intent: Intent) -> bool {
        match self.view.handle_intent(intent) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Intent rejected");
                false
            }
        }
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Draw the current screen
    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if self.view.state().is_browse() {
            self.draw_browse(frame, area);
        } else {
            self.draw_conversation(frame, area);
        }
    }

    fn draw_browse(&self, frame: &mut Frame, area: Rect) {
        let [title_area, search_area, tabs_area, list_area, hint_area] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(vec![
                Line::styled(APP_TITLE, theme::title()),
                Line::styled(APP_TAGLINE, theme::dim()),
            ]),
            title_area,
        );

        frame.render_widget(
            Paragraph::new(search_line(self.view.query())).block(
                Block::bordered()
                    .title(" Search ")
                    .border_style(theme::border()),
            ),
            search_area,
        );

        frame.render_widget(
            Tabs::new(self.categories.iter().map(String::as_str))
                .select(self.category_index)
                .style(theme::dim())
                .highlight_style(
                    Style::default()
                        .fg(theme::ACCENT_PURPLE)
                        .add_modifier(Modifier::BOLD),
                )
                .divider("|"),
            tabs_area,
        );

        let results = self.view.results();
        if results.is_empty() {
            frame.render_widget(
                Paragraph::new("No figures match your search.").style(theme::dim()),
                list_area,
            );
        } else {
            let width = usize::from(list_area.width.saturating_sub(4));
            let items: Vec<ListItem> = results.iter().map(|f| figure_item(f, width)).collect();
            let mut state = ListState::default().with_selected(Some(self.selected));
            frame.render_stateful_widget(
                List::new(items)
                    .highlight_style(theme::selected())
                    .highlight_symbol("> "),
                list_area,
                &mut state,
            );
        }

        frame.render_widget(
            Paragraph::new("type to search  Tab category  Up/Down move  Enter talk  Esc quit")
                .style(theme::dim()),
            hint_area,
        );
    }

    fn draw_conversation(&mut self, frame: &mut Frame, area: Rect) {
        let ViewState::Conversation(session) = self.view.state() else {
            return;
        };
        let figure = session.figure();
        let pending = session.is_pending();

        let [header_area, log_area, status_area, input_area, hint_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(figure.name.clone(), theme::title()),
                Span::styled(format!("  {}", figure.era), theme::dim()),
            ]))
            .block(Block::bordered().border_style(theme::border())),
            header_area,
        );

        // Build wrapped lines from the session log
        let width = usize::from(log_area.width.saturating_sub(1)).max(10);
        let mut all_lines: Vec<Line> = Vec::new();
        for msg in session.log() {
            let (prefix, style) = match msg.sender {
                Sender::User => ("You".to_string(), Style::default().fg(theme::USER_GREEN)),
                Sender::Assistant => (
                    figure.name.clone(),
                    Style::default().fg(theme::ACCENT_PURPLE),
                ),
            };
            let content = format!("{prefix}: {}", msg.text);
            for line in textwrap::wrap(&content, width) {
                all_lines.push(Line::styled(line.into_owned(), style));
            }
            all_lines.push(Line::default());
        }
        self.total_lines = all_lines.len();

        let height = usize::from(log_area.height);
        let max_scroll = self.total_lines.saturating_sub(height);
        self.scroll_offset = self.scroll_offset.min(max_scroll);
        let visible_end = self.total_lines.saturating_sub(self.scroll_offset);
        let visible_start = visible_end.saturating_sub(height);
        let visible: Vec<Line> = all_lines
            .into_iter()
            .skip(visible_start)
            .take(visible_end - visible_start)
            .collect();
        frame.render_widget(Paragraph::new(visible), log_area);

        if pending {
            frame.render_widget(
                Paragraph::new(pending_text(figure)).style(
                    Style::default()
                        .fg(theme::PENDING_BLUE)
                        .add_modifier(Modifier::ITALIC),
                ),
                status_area,
            );
        }

        let (input_text, input_style) = if pending {
            (
                Line::raw(self.input_buffer.clone()),
                Style::default().fg(theme::DISABLED_GRAY),
            )
        } else if self.input_buffer.is_empty() {
            (
                Line::styled(input_placeholder(figure), theme::dim()),
                Style::default().fg(theme::USER_GREEN),
            )
        } else {
            (
                Line::raw(format!("{}_", self.input_buffer)),
                Style::default().fg(theme::USER_GREEN),
            )
        };
        frame.render_widget(
            Paragraph::new(input_text).style(input_style).block(
                Block::bordered()
                    .title(format!(" Ask {} ", figure.name))
                    .border_style(if pending {
                        Style::default().fg(theme::DISABLED_GRAY)
                    } else {
                        theme::border()
                    }),
            ),
            input_area,
        );

        frame.render_widget(
            Paragraph::new("Enter send  PgUp/PgDn scroll  Esc back  Ctrl-C quit")
                .style(theme::dim()),
            hint_area,
        );
    }
}

/// Text shown while a reply is pending
#[must_use]
pub fn pending_text(figure: &Figure) -> String {
    format!("{} is contemplating your question...", figure.name)
}

/// Shown in the empty message box
#[must_use]
pub fn input_placeholder(figure: &Figure) -> String {
    format!("Ask {} anything...", figure.name)
}

/// Search box content: the query with a cursor, or the placeholder
fn search_line(query: &str) -> Line<'static> {
    if query.is_empty() {
        Line::styled(SEARCH_PLACEHOLDER, theme::dim())
    } else {
        Line::raw(format!("{query}_"))
    }
}

/// Two-line list row: name and era, then the description
fn figure_item(figure: &Figure, width: usize) -> ListItem<'static> {
    ListItem::new(vec![
        Line::from(vec![
            Span::styled(
                figure.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}  [{}]", figure.era, figure.category),
                Style::default().fg(theme::ACCENT_BLUE),
            ),
        ]),
        Line::styled(truncate_to_width(&figure.description, width), theme::dim()),
    ])
}

/// Cut `text` to at most `width` display columns, marking the cut with "..."
fn truncate_to_width(text: &str, width: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= width {
        return text.to_string();
    }

    let budget = width.saturating_sub(3);
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str("...");
    out
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("running", &self.running)
            .field("view", &self.view)
            .field("selected", &self.selected)
            .field("input_buffer", &self.input_buffer)
            .finish_non_exhaustive()
    }
}

/// Convenience alias used by the binary
pub type CrosstermTerminal = Terminal<ratatui::backend::CrosstermBackend<io::Stdout>>;
