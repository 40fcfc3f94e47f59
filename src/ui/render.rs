//! Main rendering module for codebuddy
//!
//! Renders the complete UI:
//! - Vertical sidebar with views (left)
//! - Active view content area (right)
//! - Global status bar (bottom)
//! - Popup overlays + flash messages

use crate::app::{App, PopupState};
use crate::ui::widgets;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// Tab definition with index for keybinding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleTab {
    Assist,
    Settings,
    HelpAbout,
}

impl ModuleTab {
    pub fn label(&self) -> &'static str {
        match self {
            ModuleTab::Assist => "Assistant",
            ModuleTab::Settings => "Settings",
            ModuleTab::HelpAbout => "Help / About",
        }
    }

    /// Keybind hint shown in sidebar
    pub fn key_hint(&self) -> &'static str {
        match self {
            ModuleTab::Assist => "1",
            ModuleTab::Settings => ",",
            ModuleTab::HelpAbout => "?",
        }
    }
}

/// Modules shown in the main sidebar area
const SIDEBAR_MODULES: &[ModuleTab] = &[ModuleTab::Assist];

/// Bottom items (below separator)
const SIDEBAR_BOTTOM: &[ModuleTab] = &[ModuleTab::Settings, ModuleTab::HelpAbout];

const SIDEBAR_WIDTH: u16 = 24;

/// Main render function – entry point for all UI rendering
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    let theme = &app.theme;

    // Fill entire background
    frame.render_widget(Block::default().style(theme.block_style()), area);

    // Main layout: sidebar | content, status bar at bottom
    let vertical = Layout::vertical([
        Constraint::Min(8),    // sidebar + content
        Constraint::Length(1), // status bar
    ])
    .split(area);

    let horizontal = Layout::horizontal([
        Constraint::Length(SIDEBAR_WIDTH),
        Constraint::Min(30), // content area
    ])
    .split(vertical[0]);

    render_sidebar(frame, app, horizontal[0]);
    render_module_content(frame, app, horizontal[1]);
    render_status_bar(frame, app, vertical[1]);

    // Popup overlays
    render_popups(frame, app, area);
}

/// Render the vertical sidebar
fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let sidebar_block = Block::default()
        .style(theme.block_style())
        .borders(Borders::RIGHT)
        .border_style(theme.border());
    let inner = sidebar_block.inner(area);
    frame.render_widget(sidebar_block, area);

    let mut lines: Vec<Line> = Vec::new();

    // Title
    lines.push(Line::from(vec![
        Span::styled(
            " codebuddy",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(theme.fg_dim),
        ),
    ]));
    lines.push(Line::raw(""));

    for &module in SIDEBAR_MODULES {
        render_sidebar_item(&mut lines, app, module, theme);
    }

    // Separator
    lines.push(Line::raw(""));
    let sep_width = inner.width.saturating_sub(2) as usize;
    lines.push(Line::styled(
        format!(" {}", "─".repeat(sep_width.min(20))),
        Style::default().fg(theme.border),
    ));

    // Bottom items (Settings, Help)
    for &module in SIDEBAR_BOTTOM {
        render_sidebar_item(&mut lines, app, module, theme);
    }

    frame.render_widget(Paragraph::new(lines).style(theme.block_style()), area);
}

/// Render a single sidebar item
fn render_sidebar_item<'a>(
    lines: &mut Vec<Line<'a>>,
    app: &App,
    module: ModuleTab,
    theme: &crate::ui::Theme,
) {
    let is_active = app.active_tab == module;
    let hint = module.key_hint();

    if is_active {
        lines.push(Line::from(vec![
            Span::styled(" ▸ ", Style::default().fg(theme.accent)),
            Span::styled(hint.to_string(), Style::default().fg(theme.accent)),
            Span::styled(
                format!(" {}", module.label()),
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
    } else {
        lines.push(Line::from(vec![
            Span::styled("   ", Style::default()),
            Span::styled(hint.to_string(), Style::default().fg(theme.fg_dim)),
            Span::styled(
                format!(" {}", module.label()),
                Style::default().fg(theme.fg),
            ),
        ]));
    }
}

/// Render the active view's content
fn render_module_content(frame: &mut Frame, app: &mut App, area: Rect) {
    match app.active_tab {
        ModuleTab::Assist => {
            crate::modules::assist::render(frame, &app.assist, &app.theme, &app.config, area);
        }
        ModuleTab::Settings => render_settings(frame, app, area),
        ModuleTab::HelpAbout => render_help_about(frame, app, area),
    }
}

/// Render the Help / About tab
fn render_help_about(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let block = Block::default()
        .style(theme.block_style())
        .title(" Help / About ")
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(theme.border_focused());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut content: Vec<Line> = Vec::new();

    content.push(Line::raw(""));
    content.push(Line::from(vec![
        Span::styled(
            "CodeBuddy",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(theme.fg_dim),
        ),
    ]));
    content.push(Line::styled(
        "Your AI-powered assistant for understanding and debugging code. For beginners!",
        Style::default().fg(theme.fg_dim),
    ));
    content.push(Line::styled(
        "https://github.com/daskladas/codebuddy",
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::UNDERLINED),
    ));
    content.push(Line::raw(""));

    content.push(Line::styled(
        "── Views ──",
        Style::default().fg(theme.accent),
    ));
    content.push(Line::raw(""));
    let views: Vec<(&str, &str, &str)> = vec![
        ("1", "Assistant", "ask the AI about your code"),
        (",", "Settings", "theme, layout, backend connection"),
        ("?", "Help / About", "this page"),
    ];
    for (key, name, desc) in views {
        let padded_name = format!("{:<16}", name);
        content.push(Line::from(vec![
            Span::styled(format!("  [{}]  ", key), Style::default().fg(theme.accent)),
            Span::styled(
                padded_name,
                Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
            ),
            Span::styled(desc.to_string(), Style::default().fg(theme.fg_dim)),
        ]));
    }
    content.push(Line::raw(""));

    content.push(Line::styled(
        "── Assistant keys ──",
        Style::default().fg(theme.accent),
    ));
    content.push(Line::raw(""));
    let keys: Vec<(&str, &str)> = vec![
        ("Tab", "move between form fields"),
        ("i / Enter", "edit the selected field"),
        ("h / l", "change the language"),
        ("e", "Explain Code"),
        ("a", "Analyze Error"),
        ("s", "Get Suggestions"),
        ("t", "test the backend connection"),
        ("n", "start over"),
        ("j / k", "scroll the response"),
        ("q", "quit"),
    ];
    for (key, desc) in keys {
        let padded_key = format!("{:<11}", key);
        content.push(Line::from(vec![
            Span::styled(format!("  {}", padded_key), Style::default().fg(theme.accent)),
            Span::styled(desc.to_string(), Style::default().fg(theme.fg)),
        ]));
    }
    content.push(Line::raw(""));

    content.push(Line::styled(
        "── Pipe mode ──",
        Style::default().fg(theme.accent),
    ));
    content.push(Line::raw(""));
    content.push(Line::styled(
        "cat main.py | codebuddy",
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::UNDERLINED),
    ));
    content.push(Line::styled(
        "loads the piped code straight into the form",
        Style::default().fg(theme.fg_dim),
    ));

    frame.render_widget(Paragraph::new(content).alignment(Alignment::Center), inner);
}

/// Render the global Settings tab
fn render_settings(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let block = Block::default()
        .style(theme.block_style())
        .title(" Settings ")
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(theme.border_focused());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let settings: Vec<(&str, String, bool)> = vec![
        ("Theme", app.config.theme.as_str().to_string(), false),
        ("Layout", app.config.layout.as_str().to_string(), false),
        (
            "Default language",
            app.config.default_language.as_str().to_string(),
            false,
        ),
        (
            "Syntax highlighting",
            if app.config.highlighting {
                "enabled"
            } else {
                "disabled"
            }
            .to_string(),
            false,
        ),
        (
            "Backend URL",
            if app.settings_editing && app.settings_selected == 4 {
                format!("{}_", app.settings_edit_buffer)
            } else {
                app.config.backend_url.clone()
            },
            app.settings_editing && app.settings_selected == 4,
        ),
        (
            "Request timeout",
            if app.settings_editing && app.settings_selected == 5 {
                format!("{}_", app.settings_edit_buffer)
            } else {
                format!("{}s", app.config.request_timeout_secs)
            },
            app.settings_editing && app.settings_selected == 5,
        ),
    ];

    let mut items: Vec<ListItem> = Vec::new();

    for (i, (label, value, editing)) in settings.iter().enumerate() {
        let style = if i == app.settings_selected {
            theme.selected()
        } else {
            theme.text()
        };

        let value_style = if *editing {
            Style::default()
                .fg(theme.success)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.accent)
        };

        items.push(ListItem::new(Line::from(vec![
            Span::styled(format!("  {:<24}", label), style),
            Span::styled(format!("[{}]", value), value_style),
        ])));
    }

    // Editing hint
    if app.settings_editing {
        items.push(ListItem::new(Line::raw("")));
        items.push(ListItem::new(Line::styled(
            "  💡 Type to edit, Enter to save, Esc to cancel",
            theme.text_dim(),
        )));
    }

    let list = List::new(items);
    frame.render_widget(list, inner);

    // Config path at bottom
    let config_path = crate::config::Config::path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "Unknown".into());

    let path_area = Rect {
        x: inner.x,
        y: inner.y + inner.height.saturating_sub(2),
        width: inner.width,
        height: 1,
    };
    let path_widget =
        Paragraph::new(format!("Config: {}", config_path)).style(theme.text_dim());
    frame.render_widget(path_widget, path_area);
}

/// Render status bar with context-sensitive keybindings
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let hints = match app.active_tab {
        ModuleTab::Assist => {
            let assist = &app.assist;
            if assist.input_mode {
                "[Esc] Done  [Enter] Newline  [Tab] Next field".to_string()
            } else if assist.loading {
                "🔄 Waiting for the backend...  [j/k] Scroll  [q] Quit".to_string()
            } else if assist.error.is_some() {
                "[e/a/s] Try again  [t] Test backend  [q] Quit".to_string()
            } else if assist.response.is_some() {
                "[j/k] Scroll  [e/a/s] Ask again  [n] New  [q] Quit".to_string()
            } else {
                "[Tab] Field  [i] Edit  [e/a/s] Ask  [t] Test  [q] Quit".to_string()
            }
        }
        ModuleTab::Settings => {
            if app.settings_editing {
                "Type to edit, Enter to save, Esc to cancel".to_string()
            } else {
                "[j/k] Navigate  [Enter] Change  [q] Quit".to_string()
            }
        }
        ModuleTab::HelpAbout => "[1] Assistant  [,] Settings  [q] Quit".to_string(),
    };

    let right = match app.active_tab {
        ModuleTab::Assist => app.config.backend_url.as_str(),
        _ => "",
    };

    widgets::render_status_bar(frame, &hints, right, theme, area);
}

/// Render popup overlays
fn render_popups(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    match &app.popup {
        PopupState::None => {}
        PopupState::Error { title, message } => {
            widgets::render_error_popup(frame, title, message, theme, area);
        }
    }

    // Flash message
    if let Some(msg) = &app.flash_message {
        widgets::render_flash_message(frame, &msg.text, msg.is_error, &app.theme, area);
    }
}
