//! Configuration management for codebuddy
//!
//! Single global config – theme, layout, default language, and the
//! backend connection are set once and apply everywhere.
//!
//! Config file location: ~/.config/codebuddy/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// On-disk location override. `None` means the standard config
    /// dir; tests point this at a temp file so saves never touch the
    /// user's real config.
    #[serde(skip)]
    pub path_override: Option<PathBuf>,

    pub theme: ThemeName,
    pub layout: LayoutMode,

    /// Pre-selected language for new sessions and untagged code blocks
    pub default_language: Language,

    // Backend connection
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    // Response rendering
    #[serde(default = "default_highlighting")]
    pub highlighting: bool,
}

fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

fn default_highlighting() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path_override: None,
            theme: ThemeName::Gruvbox,
            layout: LayoutMode::Auto,
            default_language: Language::Python,
            backend_url: default_backend_url(),
            request_timeout_secs: default_request_timeout(),
            highlighting: true,
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("codebuddy");
        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default if not exists
    pub fn load() -> Result<Self> {
        let path = Self::path()?;

        if !path.exists() {
            let config = Config::default();
            config.save()?;
            return Ok(config);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {:?}", path))
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = match &self.path_override {
            Some(p) => p.clone(),
            None => Self::path()?,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }
}

/// Available theme names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Gruvbox,
    Nord,
    Catppuccin,
    Dracula,
    OneDark,
    Transparent,
}

impl ThemeName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeName::Gruvbox => "Gruvbox",
            ThemeName::Nord => "Nord",
            ThemeName::Catppuccin => "Catppuccin",
            ThemeName::Dracula => "Dracula",
            ThemeName::OneDark => "One Dark",
            ThemeName::Transparent => "Transparent",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ThemeName::Gruvbox => ThemeName::Nord,
            ThemeName::Nord => ThemeName::Catppuccin,
            ThemeName::Catppuccin => ThemeName::Dracula,
            ThemeName::Dracula => ThemeName::OneDark,
            ThemeName::OneDark => ThemeName::Transparent,
            ThemeName::Transparent => ThemeName::Gruvbox,
        }
    }
}

/// Programming languages the backend accepts.
///
/// `id()` is the wire identifier sent in request bodies and used as
/// the fallback tag for untagged code fences; `as_str()` is the
/// display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Python,
    JavaScript,
    Java,
    #[serde(rename = "c++")]
    Cpp,
    CSharp,
    Html,
    Css,
    Sql,
    Php,
    Ruby,
    Go,
}

impl Language {
    pub fn all() -> &'static [Language] {
        &[
            Language::Python,
            Language::JavaScript,
            Language::Java,
            Language::Cpp,
            Language::CSharp,
            Language::Html,
            Language::Css,
            Language::Sql,
            Language::Php,
            Language::Ruby,
            Language::Go,
        ]
    }

    pub fn id(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::Java => "java",
            Language::Cpp => "c++",
            Language::CSharp => "csharp",
            Language::Html => "html",
            Language::Css => "css",
            Language::Sql => "sql",
            Language::Php => "php",
            Language::Ruby => "ruby",
            Language::Go => "go",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::Java => "Java",
            Language::Cpp => "C++",
            Language::CSharp => "C#",
            Language::Html => "HTML",
            Language::Css => "CSS",
            Language::Sql => "SQL",
            Language::Php => "PHP",
            Language::Ruby => "Ruby",
            Language::Go => "Go",
        }
    }

    pub fn next(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|l| l == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn prev(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|l| l == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }
}

/// Layout mode for the assistant view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Auto,
    SideBySide,
    Stacked,
}

impl LayoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutMode::Auto => "Auto (responsive)",
            LayoutMode::SideBySide => "Side-by-side",
            LayoutMode::Stacked => "Stacked",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            LayoutMode::Auto => LayoutMode::SideBySide,
            LayoutMode::SideBySide => LayoutMode::Stacked,
            LayoutMode::Stacked => LayoutMode::Auto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.theme, ThemeName::Gruvbox);
        assert_eq!(config.layout, LayoutMode::Auto);
        assert_eq!(config.default_language, Language::Python);
        assert_eq!(config.backend_url, "http://localhost:8000");
        assert_eq!(config.request_timeout_secs, 60);
        assert!(config.highlighting);
    }

    #[test]
    fn test_theme_cycle() {
        let theme = ThemeName::Gruvbox;
        assert_eq!(theme.next(), ThemeName::Nord);
        // Full cycle should return to start
        let mut t = ThemeName::Gruvbox;
        for _ in 0..6 {
            t = t.next();
        }
        assert_eq!(t, ThemeName::Gruvbox);
    }

    #[test]
    fn test_language_cycle() {
        assert_eq!(Language::Python.next(), Language::JavaScript);
        assert_eq!(Language::Python.prev(), Language::Go);
        // Full cycle should return to start
        let mut l = Language::Python;
        for _ in 0..Language::all().len() {
            l = l.next();
        }
        assert_eq!(l, Language::Python);
    }

    #[test]
    fn test_language_wire_ids() {
        assert_eq!(Language::Cpp.id(), "c++");
        assert_eq!(Language::CSharp.id(), "csharp");
        assert_eq!(Language::CSharp.as_str(), "C#");
        assert_eq!(Language::Python.id(), "python");
    }

    #[test]
    fn test_config_toml_round_trip() {
        let mut config = Config::default();
        config.theme = ThemeName::Dracula;
        config.default_language = Language::Cpp;
        config.backend_url = "http://127.0.0.1:9000".to_string();

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.theme, ThemeName::Dracula);
        assert_eq!(parsed.default_language, Language::Cpp);
        assert_eq!(parsed.backend_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_save_honors_path_override() {
        let path = std::env::temp_dir().join(format!(
            "codebuddy-config-test-{}.toml",
            std::process::id()
        ));
        let mut config = Config::default();
        config.path_override = Some(path.clone());
        config.theme = ThemeName::OneDark;
        config.save().unwrap();

        let parsed: Config = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.theme, ThemeName::OneDark);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_config_tolerates_missing_fields() {
        let parsed: Config = toml::from_str("theme = \"nord\"").unwrap();
        assert_eq!(parsed.theme, ThemeName::Nord);
        assert_eq!(parsed.backend_url, "http://localhost:8000");
        assert_eq!(parsed.request_timeout_secs, 60);
    }
}
