//! codebuddy - AI code assistant
//!
//! A TUI front end for the CodeBuddy backend:
//! - Explain a piece of code in beginner-friendly terms
//! - Analyze an error message against the code that caused it
//! - Get improvement suggestions
//!
//! Usage: codebuddy [--help] [--version]
//! Pipe:  cat src/main.py | codebuddy

mod app;
mod config;
mod modules;
mod types;
mod ui;

use anyhow::{Context, Result};
use app::App;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io::{self, stdout, IsTerminal, Read};
use std::time::Duration;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    if args.iter().any(|a| a == "--version" || a == "-v") {
        println!("codebuddy {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Check for piped input BEFORE starting TUI
    let piped_input = read_piped_input();

    // If stdin was a pipe, reattach to /dev/tty so crossterm can read key events
    if piped_input.is_some() {
        reattach_stdin_to_tty()
            .context("Failed to reattach stdin to terminal. Are you running in a TTY?")?;
    }

    let result = run_app(piped_input);

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Read all of stdin if it's a pipe (not a terminal).
/// Returns None if stdin is a terminal (normal interactive mode).
/// Limits input to 1 MB to prevent excessive memory usage.
fn read_piped_input() -> Option<String> {
    if io::stdin().is_terminal() {
        return None;
    }

    const MAX_PIPE_SIZE: usize = 1024 * 1024; // 1 MB — more than enough for any source file

    let mut input = String::new();
    match io::stdin().take(MAX_PIPE_SIZE as u64).read_to_string(&mut input) {
        Ok(_) => {}
        Err(_) => return None, // Non-UTF8 or read error
    }

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    Some(trimmed.to_string())
}

/// After reading piped stdin, reopen /dev/tty as fd 0 so crossterm
/// can read keyboard events. This is the standard Unix approach used
/// by tools like fzf, bat, less, etc.
#[cfg(unix)]
fn reattach_stdin_to_tty() -> Result<()> {
    use std::os::unix::io::AsRawFd;

    let tty = std::fs::File::open("/dev/tty")
        .context("Cannot open /dev/tty — pipe mode requires a controlling terminal")?;

    let tty_fd = tty.as_raw_fd();
    let result = unsafe { libc::dup2(tty_fd, libc::STDIN_FILENO) };
    if result == -1 {
        anyhow::bail!("dup2 failed: could not reattach stdin to /dev/tty");
    }

    // Let `tty` drop naturally — it closes the original fd, but fd 0 now
    // independently points to /dev/tty via the dup2 copy.
    drop(tty);

    Ok(())
}

#[cfg(not(unix))]
fn reattach_stdin_to_tty() -> Result<()> {
    anyhow::bail!("Pipe mode is only supported on Unix systems (Linux, macOS)")
}

fn print_help() {
    println!(
        r#"codebuddy - AI code assistant

                  _        _                 _      _
  ___   ___    __| |  ___ | |__   _   _   __| |  __| | _   _
 / __| / _ \  / _` | / _ \| '_ \ | | | | / _` | / _` || | | |
| (__ | (_) || (_| ||  __/| |_) || |_| || (_| || (_| || |_| |
 \___| \___/  \__,_| \___||_.__/  \__,_| \__,_| \__,_| \__, |
                                                        |___/

Made with ♥ by daskladas

USAGE:
    codebuddy [OPTIONS]
    cat src/main.py | codebuddy      # pipe code straight into the form

OPTIONS:
    -h, --help       Print help information
    -v, --version    Print version information

KEYBINDINGS:
    Tab              Next form field
    i / Enter        Edit the selected field
    h/l              Change language
    e                Explain Code
    a                Analyze Error
    s                Get Suggestions
    t                Test backend connection
    j/k              Scroll the response
    n                Start over
    q                Quit

VIEWS:
    [1] Assistant        Ask the AI about your code
    [,] Settings         Theme, layout, backend connection
    [?] Help / About     What codebuddy does

PIPE MODE:
    Pipe source code into codebuddy to load it into the form:
      cat src/main.py | codebuddy
      git diff | codebuddy

BACKEND:
    codebuddy talks to a CodeBuddy API server. Start the backend first,
    then point backend_url at it (default http://localhost:8000).

CONFIG:
    ~/.config/codebuddy/config.toml
"#
    );
}

fn run_app(piped_input: Option<String>) -> Result<()> {
    // Load configuration
    let config = config::Config::load().context("Failed to load configuration")?;

    // Create application state (with optional piped input)
    let mut app = App::new(config, piped_input);

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to setup terminal")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    // Install panic handler so terminal is restored on panic
    // (without this, a panic leaves the terminal in raw mode + alternate screen)
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        // Best-effort terminal cleanup on panic
        let _ = disable_raw_mode();
        let _ = execute!(std::io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        let _ = execute!(std::io::stdout(), crossterm::cursor::Show);
        original_hook(info);
    }));

    // Run main loop
    let result = main_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

fn main_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| {
            ui::render(frame, app);
        })?;

        // Poll background requests, expire flash messages
        app.update_timers();

        // Poll for events with timeout (drives the spinner + flash expiry)
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key)?;
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_does_not_panic() {
        print_help();
    }
}
