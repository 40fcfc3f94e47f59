//! Application state and event handling for codebuddy

use crate::config::Config;
use crate::modules::assist::AssistState;
use crate::types::FlashMessage;
use crate::ui::{ModuleTab, Theme};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

/// Main application state
pub struct App {
    pub should_quit: bool,
    pub active_tab: ModuleTab,
    pub config: Config,
    pub theme: Theme,
    pub settings_selected: usize,
    pub settings_editing: bool,
    pub settings_edit_buffer: String,
    pub popup: PopupState,
    pub flash_message: Option<FlashMessage>,

    // Module states
    pub assist: AssistState,
}

#[derive(Debug, Clone)]
pub enum PopupState {
    None,
    Error { title: String, message: String },
}

impl App {
    pub fn new(config: Config, piped_input: Option<String>) -> Self {
        let theme = Theme::from_name(config.theme);

        // Piped code goes straight into the form
        let assist = match piped_input {
            Some(input) => AssistState::new_with_input(input, config.default_language),
            None => AssistState::new(config.default_language),
        };

        Self {
            should_quit: false,
            active_tab: ModuleTab::Assist,
            config,
            theme,
            settings_selected: 0,
            settings_editing: false,
            settings_edit_buffer: String::new(),
            popup: PopupState::None,
            flash_message: None,
            assist,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Clear expired flash
        if let Some(msg) = &self.flash_message {
            if msg.is_expired(3) {
                self.flash_message = None;
            }
        }

        // App-level popup handling
        match &self.popup {
            PopupState::Error { .. } => {
                match key.code {
                    KeyCode::Char('o') | KeyCode::Enter | KeyCode::Esc => {
                        self.popup = PopupState::None;
                    }
                    _ => {}
                }
                return Ok(());
            }
            PopupState::None => {}
        }

        // Settings text editing mode captures ALL keys
        if self.settings_editing {
            self.handle_settings_edit_key(key)?;
            return Ok(());
        }

        // Try to let active module consume the key
        let consumed = self.try_module_key(key)?;
        if consumed {
            return Ok(());
        }

        // Global keys
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return Ok(());
            }
            KeyCode::Char('1') => self.active_tab = ModuleTab::Assist,
            KeyCode::Char(',') => self.active_tab = ModuleTab::Settings,
            KeyCode::Char('?') => self.active_tab = ModuleTab::HelpAbout,
            _ => {}
        }

        if self.active_tab == ModuleTab::Settings {
            self.handle_settings_key(key)?;
        }

        Ok(())
    }

    fn try_module_key(&mut self, key: KeyEvent) -> Result<bool> {
        match self.active_tab {
            ModuleTab::Assist => {
                // Module captures ALL keys while a form field is being edited
                if self.assist.input_mode {
                    self.assist.handle_key(key)?;
                    return Ok(true);
                }

                // Tab-switch keys and quit stay global
                match key.code {
                    KeyCode::Char('1') | KeyCode::Char(',') | KeyCode::Char('?')
                    | KeyCode::Char('q') => Ok(false),
                    _ => {
                        self.assist.handle_key(key)?;

                        // Check if a backend request was armed
                        if let Some(action) = self.assist.requested_action.take() {
                            self.assist.start_request(
                                action,
                                &self.config.backend_url,
                                self.config.request_timeout_secs,
                            );
                        }
                        if self.assist.ping_requested {
                            self.assist.ping_requested = false;
                            self.assist.start_ping(
                                &self.config.backend_url,
                                self.config.request_timeout_secs,
                            );
                        }

                        Ok(true)
                    }
                }
            }
            _ => Ok(false),
        }
    }

    pub fn update_timers(&mut self) {
        // Poll background requests (non-blocking)
        self.assist.poll_replies();

        // Expire flash messages
        expire_flash(&mut self.flash_message);
        expire_flash(&mut self.assist.flash_message);
    }

    fn handle_settings_key(&mut self, key: KeyEvent) -> Result<()> {
        let settings_count = 6;
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.settings_selected < settings_count - 1 {
                    self.settings_selected += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.settings_selected = self.settings_selected.saturating_sub(1);
            }
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
                match self.settings_selected {
                    0 => {
                        self.config.theme = self.config.theme.next();
                        self.theme = Theme::from_name(self.config.theme);
                    }
                    1 => {
                        self.config.layout = self.config.layout.next();
                    }
                    2 => {
                        self.config.default_language = self.config.default_language.next();
                        // New sessions and fence fallbacks follow the default
                        self.assist.form.language = self.config.default_language;
                    }
                    3 => {
                        self.config.highlighting = !self.config.highlighting;
                    }
                    // Text-editable fields: enter edit mode
                    4 => {
                        self.settings_editing = true;
                        self.settings_edit_buffer = self.config.backend_url.clone();
                        return Ok(());
                    }
                    5 => {
                        self.settings_editing = true;
                        self.settings_edit_buffer = self.config.request_timeout_secs.to_string();
                        return Ok(());
                    }
                    _ => {}
                }
                if let Err(e) = self.config.save() {
                    self.popup = PopupState::Error {
                        title: "Save failed".into(),
                        message: e.to_string(),
                    };
                } else {
                    self.flash_message = Some(FlashMessage::new("Settings saved".into(), false));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Handle key events while editing a settings text field.
    fn handle_settings_edit_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                // Cancel editing
                self.settings_editing = false;
                self.settings_edit_buffer.clear();
            }
            KeyCode::Enter => {
                // Save the value
                let value = self.settings_edit_buffer.trim().to_string();
                match self.settings_selected {
                    4 => {
                        self.config.backend_url = if value.is_empty() {
                            "http://localhost:8000".to_string()
                        } else {
                            value
                        };
                    }
                    5 => match value.parse::<u64>() {
                        Ok(secs) if secs > 0 => {
                            self.config.request_timeout_secs = secs;
                        }
                        _ => {
                            self.flash_message = Some(FlashMessage::new(
                                "Timeout must be a whole number of seconds".into(),
                                true,
                            ));
                            return Ok(());
                        }
                    },
                    _ => {}
                }
                self.settings_editing = false;
                self.settings_edit_buffer.clear();

                if let Err(e) = self.config.save() {
                    self.popup = PopupState::Error {
                        title: "Save failed".into(),
                        message: e.to_string(),
                    };
                } else {
                    self.flash_message = Some(FlashMessage::new("Settings saved".into(), false));
                }
            }
            KeyCode::Backspace => {
                self.settings_edit_buffer.pop();
            }
            KeyCode::Char(c) => {
                self.settings_edit_buffer.push(c);
            }
            _ => {}
        }
        Ok(())
    }
}

/// Expire a flash message after 3 seconds
fn expire_flash(msg: &mut Option<FlashMessage>) {
    if let Some(m) = msg {
        if m.is_expired(3) {
            *msg = None;
        }
    }
}
