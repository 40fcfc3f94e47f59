//! Assistant module
//!
//! The main CodeBuddy view: a request form (language, code, error
//! message, problem description) next to the AI response area.
//! Requests run in a background thread and results are polled from
//! the main loop, so the UI never blocks.

pub mod backend;
pub mod highlight;
pub mod segment;

use crate::config::{Config, Language, LayoutMode};
use crate::types::{Action, FlashMessage};
use crate::ui::theme::Theme;
use crate::ui::widgets;
use anyhow::Result;
use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use segment::Segment;
use std::sync::mpsc;

// ── Form ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Language,
    Code,
    ErrorMessage,
    ProblemDescription,
}

impl FormField {
    pub fn all() -> &'static [FormField] {
        &[
            FormField::Language,
            FormField::Code,
            FormField::ErrorMessage,
            FormField::ProblemDescription,
        ]
    }

    pub fn next(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|f| f == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn prev(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|f| f == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Language => "Language",
            FormField::Code => "Code",
            FormField::ErrorMessage => "Error Message",
            FormField::ProblemDescription => "Problem Description",
        }
    }

    /// Whether this field holds free text (the language row cycles
    /// instead of being typed into).
    pub fn is_text(&self) -> bool {
        !matches!(self, FormField::Language)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssistForm {
    pub language: Language,
    pub code: String,
    pub error_message: String,
    pub problem_description: String,
    pub active_field: FormField,
}

impl AssistForm {
    pub fn text_field_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Language => None,
            FormField::Code => Some(&mut self.code),
            FormField::ErrorMessage => Some(&mut self.error_message),
            FormField::ProblemDescription => Some(&mut self.problem_description),
        }
    }

    pub fn text_field(&self, field: FormField) -> &str {
        match field {
            FormField::Language => "",
            FormField::Code => &self.code,
            FormField::ErrorMessage => &self.error_message,
            FormField::ProblemDescription => &self.problem_description,
        }
    }

    /// The reason an action cannot run yet, if any. Every action needs
    /// code; analyze also needs the error message.
    pub fn missing_input(&self, action: Action) -> Option<&'static str> {
        if self.code.trim().is_empty() {
            return Some("Enter some code first");
        }
        if action == Action::AnalyzeError && self.error_message.trim().is_empty() {
            return Some("Enter an error message first");
        }
        None
    }
}

// ── Module state ──

/// One finished backend reply, split into renderable segments.
pub struct AssistResponse {
    pub action: Action,
    pub segments: Vec<Segment>,
    pub received_at: DateTime<Local>,
}

pub struct AssistState {
    // Form
    pub form: AssistForm,
    pub input_mode: bool,

    // Request lifecycle
    pub loading: bool,
    pub active_action: Option<Action>,
    pub response: Option<AssistResponse>,
    pub error: Option<String>,
    pub scroll_offset: usize,

    // Pipe mode
    #[allow(dead_code)] // Set during init, reserved for future pipe-specific UI
    pub piped: bool,

    // Requests picked up by app.rs (it has config access)
    pub requested_action: Option<Action>,
    pub ping_requested: bool,

    // Flash
    pub flash_message: Option<FlashMessage>,

    reply_rx: Option<mpsc::Receiver<Result<String, String>>>,
    ping_rx: Option<mpsc::Receiver<Result<String, String>>>,
}

impl AssistState {
    /// Initialize the assistant module. Always succeeds.
    pub fn new(default_language: Language) -> Self {
        Self {
            form: AssistForm {
                language: default_language,
                ..AssistForm::default()
            },
            input_mode: false,
            loading: false,
            active_action: None,
            response: None,
            error: None,
            scroll_offset: 0,
            piped: false,
            requested_action: None,
            ping_requested: false,
            flash_message: None,
            reply_rx: None,
            ping_rx: None,
        }
    }

    /// Initialize with piped input prefilled into the code field.
    pub fn new_with_input(code: String, default_language: Language) -> Self {
        let mut state = Self::new(default_language);
        state.form.code = code;
        state.form.active_field = FormField::Code;
        state.piped = true;
        state.flash_message = Some(FlashMessage::new(
            "Code loaded from stdin. Press [e] to explain it.".to_string(),
            false,
        ));
        state
    }

    pub fn show_flash(&mut self, msg: &str, is_error: bool) {
        self.flash_message = Some(FlashMessage::new(msg.to_string(), is_error));
    }

    /// Whether a backend call is in flight. Only one runs at a time.
    pub fn busy(&self) -> bool {
        self.loading || self.ping_rx.is_some()
    }

    /// Kick off a backend request in a background thread (non-blocking).
    pub fn start_request(&mut self, action: Action, base_url: &str, timeout_secs: u64) {
        if self.busy() {
            self.show_flash("A request is already running", true);
            return;
        }
        if let Some(reason) = self.form.missing_input(action) {
            self.show_flash(reason, true);
            return;
        }

        self.loading = true;
        self.active_action = Some(action);
        self.response = None;
        self.error = None;
        self.scroll_offset = 0;
        self.input_mode = false;

        let (tx, rx) = mpsc::channel();
        self.reply_rx = Some(rx);

        let base_url = base_url.to_string();
        let language = self.form.language.id().to_string();
        let code = self.form.code.clone();
        let error_message = self.form.error_message.clone();
        let problem_description = self.form.problem_description.clone();

        std::thread::spawn(move || {
            let result = backend::request_assist(
                &base_url,
                timeout_secs,
                action,
                &language,
                &code,
                &error_message,
                &problem_description,
            );
            let msg = match result {
                Ok(text) => Ok(text),
                Err(e) => Err(format!("{:#}", e)),
            };
            let _ = tx.send(msg);
        });
    }

    /// Kick off a connection test against the backend hello endpoint.
    pub fn start_ping(&mut self, base_url: &str, timeout_secs: u64) {
        if self.busy() {
            self.show_flash("A request is already running", true);
            return;
        }

        let (tx, rx) = mpsc::channel();
        self.ping_rx = Some(rx);

        let base_url = base_url.to_string();
        std::thread::spawn(move || {
            let result = backend::ping(&base_url, timeout_secs);
            let msg = match result {
                Ok(text) => Ok(text),
                Err(e) => Err(format!("{:#}", e)),
            };
            let _ = tx.send(msg);
        });
    }

    /// Poll for finished backend calls. Called from update_timers
    /// (non-blocking).
    pub fn poll_replies(&mut self) {
        if let Some(ref rx) = self.reply_rx {
            match rx.try_recv() {
                Ok(Ok(text)) => {
                    if let Some(action) = self.active_action.take() {
                        let segments = segment::split_segments(&text, self.form.language.id());
                        self.response = Some(AssistResponse {
                            action,
                            segments,
                            received_at: Local::now(),
                        });
                    }
                    self.error = None;
                    self.loading = false;
                    self.scroll_offset = 0;
                    self.reply_rx = None;
                }
                Ok(Err(err)) => {
                    let label = self
                        .active_action
                        .take()
                        .map(|a| a.label())
                        .unwrap_or("complete the request");
                    self.response = None;
                    self.error = Some(format!(
                        "Failed to {}. Please check your backend connection. Error: {}",
                        label, err
                    ));
                    self.loading = false;
                    self.scroll_offset = 0;
                    self.reply_rx = None;
                }
                Err(mpsc::TryRecvError::Empty) => {
                    // Still loading
                }
                Err(mpsc::TryRecvError::Disconnected) => {
                    self.active_action = None;
                    self.response = None;
                    self.error = Some("An internal error occurred.".to_string());
                    self.loading = false;
                    self.reply_rx = None;
                }
            }
        }

        if let Some(ref rx) = self.ping_rx {
            match rx.try_recv() {
                Ok(Ok(msg)) => {
                    self.show_flash(&msg, false);
                    self.ping_rx = None;
                }
                Ok(Err(err)) => {
                    self.show_flash(&format!("Backend check failed: {}", err), true);
                    self.ping_rx = None;
                }
                Err(mpsc::TryRecvError::Empty) => {}
                Err(mpsc::TryRecvError::Disconnected) => {
                    self.show_flash("Backend check failed", true);
                    self.ping_rx = None;
                }
            }
        }
    }

    /// Handle key events
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Clear expired flash
        if let Some(msg) = &self.flash_message {
            if msg.is_expired(3) {
                self.flash_message = None;
            }
        }

        if self.input_mode {
            self.handle_edit_key(key);
            return Ok(());
        }

        if self.loading {
            // A request is in flight; scrolling stays live, actions wait
            match key.code {
                KeyCode::Char('j') | KeyCode::Down => {
                    self.scroll_offset = self.scroll_offset.saturating_add(1);
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    self.scroll_offset = self.scroll_offset.saturating_sub(1);
                }
                _ => {}
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Tab => {
                self.form.active_field = self.form.active_field.next();
            }
            KeyCode::BackTab => {
                self.form.active_field = self.form.active_field.prev();
            }
            KeyCode::Left | KeyCode::Char('h') => {
                if self.form.active_field == FormField::Language {
                    self.form.language = self.form.language.prev();
                }
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if self.form.active_field == FormField::Language {
                    self.form.language = self.form.language.next();
                }
            }
            KeyCode::Enter | KeyCode::Char('i') => {
                if self.form.active_field.is_text() {
                    self.input_mode = true;
                }
            }
            KeyCode::Char('e') => {
                self.requested_action = Some(Action::Explain);
            }
            KeyCode::Char('a') => {
                self.requested_action = Some(Action::AnalyzeError);
            }
            KeyCode::Char('s') => {
                self.requested_action = Some(Action::Suggestions);
            }
            KeyCode::Char('t') => {
                self.ping_requested = true;
            }
            KeyCode::Char('n') => {
                // New session: clear everything except the language
                self.form.code.clear();
                self.form.error_message.clear();
                self.form.problem_description.clear();
                self.form.active_field = FormField::Code;
                self.response = None;
                self.error = None;
                self.scroll_offset = 0;
                self.input_mode = true;
            }
            KeyCode::Char('j') => {
                self.scroll_offset = self.scroll_offset.saturating_add(1);
            }
            KeyCode::Char('k') => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
            }
            KeyCode::Down => {
                self.form.active_field = self.form.active_field.next();
            }
            KeyCode::Up => {
                self.form.active_field = self.form.active_field.prev();
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = false;
            }
            KeyCode::Tab => {
                self.form.active_field = self.form.active_field.next();
                if !self.form.active_field.is_text() {
                    self.input_mode = false;
                }
            }
            KeyCode::BackTab => {
                self.form.active_field = self.form.active_field.prev();
                if !self.form.active_field.is_text() {
                    self.input_mode = false;
                }
            }
            KeyCode::Enter => {
                if let Some(field) = self.form.text_field_mut(self.form.active_field) {
                    field.push('\n');
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = self.form.text_field_mut(self.form.active_field) {
                    field.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(field) = self.form.text_field_mut(self.form.active_field) {
                    field.push(c);
                }
            }
            _ => {}
        }
    }
}

// ════════════════════════════════════════════════════════════════════
// RENDERING
// ════════════════════════════════════════════════════════════════════

/// Main render function for the assistant module
pub fn render(frame: &mut Frame, state: &AssistState, theme: &Theme, config: &Config, area: Rect) {
    let side_by_side = match config.layout {
        LayoutMode::SideBySide => true,
        LayoutMode::Stacked => false,
        LayoutMode::Auto => area.width >= 100,
    };

    let chunks = if side_by_side {
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).split(area)
    } else {
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area)
    };

    render_form(frame, state, theme, chunks[0]);
    render_output(frame, state, theme, config, chunks[1]);

    // Flash message
    if let Some(msg) = &state.flash_message {
        widgets::render_flash_message(frame, &msg.text, msg.is_error, theme, area);
    }
}

// ── Form ──

fn render_form(frame: &mut Frame, state: &AssistState, theme: &Theme, area: Rect) {
    let block = Block::default()
        .style(theme.block_style())
        .title(" Request ")
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(if state.input_mode {
            theme.border_focused()
        } else {
            theme.border()
        });

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 12 || inner.width < 20 {
        return;
    }

    let has_hint = inner.height >= 15;
    let mut constraints = vec![
        Constraint::Length(3), // Language
        Constraint::Min(4),    // Code
        Constraint::Length(3), // Error message
        Constraint::Length(3), // Problem description
    ];
    if has_hint {
        constraints.push(Constraint::Length(1));
    }
    let chunks = Layout::vertical(constraints).split(inner);

    render_language_field(frame, state, theme, chunks[0]);
    for (i, field) in [
        FormField::Code,
        FormField::ErrorMessage,
        FormField::ProblemDescription,
    ]
    .iter()
    .enumerate()
    {
        render_text_field(frame, state, theme, *field, chunks[i + 1]);
    }

    if has_hint {
        let hint = if state.input_mode {
            "[Esc] done · [Enter] newline · [Tab] next field"
        } else {
            "[Tab] field · [i] edit · [e/a/s] ask · [t] test backend"
        };
        frame.render_widget(Paragraph::new(hint).style(theme.text_dim()), chunks[4]);
    }
}

fn render_language_field(frame: &mut Frame, state: &AssistState, theme: &Theme, area: Rect) {
    let is_active = state.form.active_field == FormField::Language;

    let block = Block::default()
        .style(theme.block_style())
        .borders(Borders::ALL)
        .border_style(if is_active {
            theme.border_focused()
        } else {
            theme.border()
        })
        .title(" Language ")
        .title_style(if is_active {
            theme.title()
        } else {
            theme.text_dim()
        });

    let block_inner = block.inner(area);
    frame.render_widget(block, area);

    let (value, style) = if is_active {
        (
            format!("◂ {} ▸", state.form.language.as_str()),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        )
    } else {
        (state.form.language.as_str().to_string(), theme.text())
    };
    frame.render_widget(Paragraph::new(value).style(style), block_inner);
}

fn render_text_field(
    frame: &mut Frame,
    state: &AssistState,
    theme: &Theme,
    field: FormField,
    area: Rect,
) {
    let is_active = state.form.active_field == field;
    let value = state.form.text_field(field);

    let required = if field == FormField::Code { " *" } else { "" };

    let block = Block::default()
        .style(theme.block_style())
        .borders(Borders::ALL)
        .border_style(if is_active {
            theme.border_focused()
        } else {
            theme.border()
        })
        .title(format!(" {}{} ", field.label(), required))
        .title_style(if is_active {
            theme.title()
        } else {
            theme.text_dim()
        });

    let block_inner = block.inner(area);
    frame.render_widget(block, area);

    if block_inner.width == 0 || block_inner.height == 0 {
        return;
    }

    // The code field shows its tail when taller than the box; the
    // short fields wrap instead
    if field == FormField::Code {
        let line_count = value.split('\n').count() as u16;
        let scroll_y = line_count.saturating_sub(block_inner.height);
        frame.render_widget(
            Paragraph::new(value).style(theme.text()).scroll((scroll_y, 0)),
            block_inner,
        );

        if is_active && state.input_mode {
            let last_len = value.split('\n').last().map_or(0, |l| l.chars().count()) as u16;
            let cx = block_inner.x + last_len.min(block_inner.width.saturating_sub(1));
            let cy = block_inner.y
                + (line_count.saturating_sub(1).saturating_sub(scroll_y))
                    .min(block_inner.height.saturating_sub(1));
            frame.set_cursor_position(ratatui::layout::Position::new(cx, cy));
        }
    } else {
        frame.render_widget(
            Paragraph::new(value)
                .style(theme.text())
                .wrap(Wrap { trim: false }),
            block_inner,
        );

        if is_active && state.input_mode {
            let iw = block_inner.width as usize;
            let text_len = value.chars().count();
            let cx = block_inner.x + (text_len % iw) as u16;
            let cy = block_inner.y + (text_len / iw) as u16;
            let max_y = block_inner.y + block_inner.height.saturating_sub(1);
            frame.set_cursor_position(ratatui::layout::Position::new(
                cx.min(block_inner.x + block_inner.width.saturating_sub(1)),
                cy.min(max_y),
            ));
        }
    }
}

// ── Output ──

fn render_output(
    frame: &mut Frame,
    state: &AssistState,
    theme: &Theme,
    config: &Config,
    area: Rect,
) {
    if state.loading {
        render_loading(frame, state, theme, area);
    } else if let Some(error) = &state.error {
        render_error(frame, error, theme, area);
    } else if let Some(response) = &state.response {
        render_response(frame, state, response, theme, config, area);
    } else {
        render_placeholder(frame, theme, area);
    }
}

fn render_placeholder(frame: &mut Frame, theme: &Theme, area: Rect) {
    let block = Block::default()
        .style(theme.block_style())
        .title(" AI Explanation ")
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(theme.border());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut content = vec![
        Line::raw(""),
        Line::raw(""),
        Line::styled("💬", Style::default().add_modifier(Modifier::BOLD)),
        Line::raw(""),
        Line::styled("Your AI explanation will appear here.", theme.text_dim()),
        Line::raw(""),
        Line::raw(""),
    ];

    for action in Action::all() {
        content.push(Line::from(vec![
            Span::styled(
                format!("  [{}] ", action.key_hint()),
                Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
            ),
            Span::styled(action.title(), theme.text()),
        ]));
    }

    frame.render_widget(
        Paragraph::new(content)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false }),
        inner,
    );
}

fn render_loading(frame: &mut Frame, state: &AssistState, theme: &Theme, area: Rect) {
    let block = Block::default()
        .style(theme.block_style())
        .title(" AI Explanation ")
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(theme.border_focused());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut content = vec![
        Line::raw(""),
        Line::raw(""),
        Line::raw(""),
        Line::styled(
            format!("{} Thinking...", widgets::spinner_frame()),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ),
        Line::raw(""),
    ];

    if let Some(action) = state.active_action {
        content.push(Line::styled(action.progress_label(), theme.text_dim()));
    }

    frame.render_widget(
        Paragraph::new(content)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false }),
        inner,
    );
}

fn render_error(frame: &mut Frame, error: &str, theme: &Theme, area: Rect) {
    let block = Block::default()
        .style(theme.block_style())
        .title(" Error ")
        .title_style(theme.error())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.error));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let content = vec![
        Line::raw(""),
        Line::styled(" ❌ Request failed", theme.error()),
        Line::raw(""),
        Line::styled(format!(" {}", error), theme.text()),
        Line::raw(""),
        Line::from(vec![
            Span::styled(
                " [e/a/s] ",
                Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
            ),
            Span::styled("try again", theme.text()),
        ]),
        Line::from(vec![
            Span::styled(
                " [t] ",
                Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
            ),
            Span::styled("test the backend connection", theme.text()),
        ]),
    ];

    frame.render_widget(
        Paragraph::new(content).wrap(Wrap { trim: false }),
        inner,
    );
}

fn render_response(
    frame: &mut Frame,
    state: &AssistState,
    response: &AssistResponse,
    theme: &Theme,
    config: &Config,
    area: Rect,
) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Status header
        Constraint::Min(6),    // Response (scrollable)
    ])
    .split(area);

    // 1. Status header
    let header_text = format!(
        " ✅ {} · {} ",
        response.action.title(),
        response.received_at.format("%H:%M:%S")
    );
    let header = Paragraph::new(header_text).style(theme.success()).block(
        Block::default()
            .style(theme.block_style())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.success)),
    );
    frame.render_widget(header, chunks[0]);

    // 2. Response (scrollable)
    let lines = response_lines(response, theme, config.highlighting);
    let visible_height = chunks[1].height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(visible_height);
    let scroll = state.scroll_offset.min(max_scroll);

    let visible: Vec<Line> = lines
        .iter()
        .skip(scroll)
        .take(visible_height)
        .cloned()
        .collect();

    let scroll_indicator = if lines.len() > visible_height {
        format!(" [{}/{}]", scroll + 1, max_scroll + 1)
    } else {
        String::new()
    };

    let body = Paragraph::new(visible)
        .block(
            Block::default()
                .style(theme.block_style())
                .borders(Borders::ALL)
                .border_style(theme.border_focused())
                .title(format!(" Response (j/k){} ", scroll_indicator))
                .title_style(theme.text_dim()),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(body, chunks[1]);
}

/// Flatten a segmented response into display lines. Code blocks get a
/// language chip above them and highlighted (or dimmed) body lines.
fn response_lines(response: &AssistResponse, theme: &Theme, highlighting: bool) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = Vec::new();

    for segment in &response.segments {
        match segment {
            Segment::Prose(text) => {
                for line in text.lines() {
                    lines.push(Line::styled(line.to_string(), theme.text()));
                }
            }
            Segment::Code { language, text } => {
                lines.push(Line::from(Span::styled(
                    format!(" {} ", language),
                    theme.code_label(),
                )));
                if highlighting {
                    lines.extend(highlight::highlight_code(text, language));
                } else {
                    for line in text.lines() {
                        lines.push(Line::styled(line.to_string(), theme.code()));
                    }
                }
            }
        }
    }

    if lines.is_empty() {
        lines.push(Line::raw(""));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn serve_once(body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 8192];
                let _ = stream.read(&mut buf);
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{}", addr)
    }

    fn refused_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        url
    }

    fn wait_for_reply(state: &mut AssistState) {
        for _ in 0..250 {
            state.poll_replies();
            if !state.busy() {
                return;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        panic!("backend reply did not arrive in time");
    }

    #[test]
    fn test_field_cycle_wraps() {
        let mut field = FormField::Language;
        for _ in 0..FormField::all().len() {
            field = field.next();
        }
        assert_eq!(field, FormField::Language);
        assert_eq!(FormField::Language.prev(), FormField::ProblemDescription);
    }

    #[test]
    fn test_missing_input_rules() {
        let mut form = AssistForm::default();
        assert!(form.missing_input(Action::Explain).is_some());
        assert!(form.missing_input(Action::Suggestions).is_some());

        form.code = "print(1)".to_string();
        assert!(form.missing_input(Action::Explain).is_none());
        assert!(form.missing_input(Action::Suggestions).is_none());
        assert!(form.missing_input(Action::AnalyzeError).is_some());

        form.error_message = "NameError".to_string();
        assert!(form.missing_input(Action::AnalyzeError).is_none());
    }

    #[test]
    fn test_start_request_requires_code() {
        let mut state = AssistState::new(Language::Python);
        state.start_request(Action::Explain, "http://127.0.0.1:1", 1);
        assert!(!state.loading);
        assert!(state.reply_rx.is_none());
        let flash = state.flash_message.as_ref().unwrap();
        assert!(flash.is_error);
    }

    #[test]
    fn test_busy_gate_blocks_second_request() {
        let mut state = AssistState::new(Language::Python);
        state.form.code = "print(1)".to_string();
        state.start_request(Action::Explain, &refused_url(), 1);
        assert!(state.loading);

        state.flash_message = None;
        state.start_request(Action::Suggestions, &refused_url(), 1);
        assert!(state.flash_message.is_some());
        assert_eq!(state.active_action, Some(Action::Explain));

        wait_for_reply(&mut state);
    }

    #[test]
    fn test_network_failure_clears_busy_and_sets_error() {
        let mut state = AssistState::new(Language::Python);
        state.form.code = "print(1)".to_string();
        state.start_request(Action::Explain, &refused_url(), 1);
        wait_for_reply(&mut state);

        assert!(!state.loading);
        assert!(state.response.is_none());
        let error = state.error.as_deref().unwrap();
        assert!(error.starts_with("Failed to explain. Please check your backend connection."));
        assert!(error.contains("Network error"));
    }

    #[test]
    fn test_success_reply_is_segmented() {
        let mut state = AssistState::new(Language::Python);
        state.form.code = "print(1)".to_string();
        let url = serve_once(
            r#"{"explanation":"This prints a number:\n```python\nprint(1)\n```\nThat is all."}"#,
        );
        state.start_request(Action::Explain, &url, 5);
        wait_for_reply(&mut state);

        assert!(state.error.is_none());
        let response = state.response.as_ref().unwrap();
        assert_eq!(response.action, Action::Explain);
        assert_eq!(response.segments.len(), 3);
        assert_eq!(
            response.segments[1],
            Segment::Code {
                language: "python".to_string(),
                text: "print(1)".to_string(),
            }
        );
    }

    #[test]
    fn test_ping_failure_flashes_error() {
        let mut state = AssistState::new(Language::Python);
        state.start_ping(&refused_url(), 1);
        assert!(state.busy());
        wait_for_reply(&mut state);

        let flash = state.flash_message.as_ref().unwrap();
        assert!(flash.is_error);
        assert!(flash.text.contains("Backend check failed"));
    }

    #[test]
    fn test_new_with_input_prefills_code() {
        let state = AssistState::new_with_input("print(1)".to_string(), Language::Python);
        assert!(state.piped);
        assert_eq!(state.form.code, "print(1)");
        assert_eq!(state.form.active_field, FormField::Code);
        assert!(state.flash_message.is_some());
    }

    #[test]
    fn test_edit_mode_typing_and_escape() {
        let mut state = AssistState::new(Language::Python);
        state.form.active_field = FormField::Code;
        state.handle_key(key(KeyCode::Char('i'))).unwrap();
        assert!(state.input_mode);

        state.handle_key(key(KeyCode::Char('f'))).unwrap();
        state.handle_key(key(KeyCode::Char('n'))).unwrap();
        state.handle_key(key(KeyCode::Enter)).unwrap();
        state.handle_key(key(KeyCode::Char('x'))).unwrap();
        state.handle_key(key(KeyCode::Backspace)).unwrap();
        assert_eq!(state.form.code, "fn\n");

        state.handle_key(key(KeyCode::Esc)).unwrap();
        assert!(!state.input_mode);
    }

    #[test]
    fn test_language_row_cycles_with_arrows() {
        let mut state = AssistState::new(Language::Python);
        assert_eq!(state.form.active_field, FormField::Language);
        state.handle_key(key(KeyCode::Right)).unwrap();
        assert_eq!(state.form.language, Language::JavaScript);
        state.handle_key(key(KeyCode::Left)).unwrap();
        assert_eq!(state.form.language, Language::Python);
    }

    #[test]
    fn test_action_keys_set_requested_action() {
        let mut state = AssistState::new(Language::Python);
        state.form.active_field = FormField::Code;
        state.handle_key(key(KeyCode::Char('a'))).unwrap();
        assert_eq!(state.requested_action, Some(Action::AnalyzeError));
        state.handle_key(key(KeyCode::Char('t'))).unwrap();
        assert!(state.ping_requested);
    }

    #[test]
    fn test_keys_ignored_while_loading() {
        let mut state = AssistState::new(Language::Python);
        state.form.code = "x = 1".to_string();
        state.loading = true;
        state.handle_key(key(KeyCode::Char('e'))).unwrap();
        assert!(state.requested_action.is_none());
        state.handle_key(key(KeyCode::Char('j'))).unwrap();
        assert_eq!(state.scroll_offset, 1);
    }
}
