//! Terminal setup and teardown.
//!
//! [`SlackTerminal`] puts the terminal into raw mode on the alternate screen
//! and restores it when dropped. A panic hook restores it too, before the
//! panic message is printed, so a crash never leaves the shell unusable.

use std::io::{Stdout, stdout};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use crossterm::{
    cursor,
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode},
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

/// Window title while the client runs.
pub const TERMINAL_TITLE: &str = "slack-tui";

/// Track whether the panic hook has been installed to avoid installing it multiple times.
static PANIC_HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Set while the terminal is in raw mode, so restoring twice is harmless.
static TERMINAL_ACTIVE: AtomicBool = AtomicBool::new(false);

/// RAII guard that restores the terminal on drop.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = restore_terminal();
    }
}

/// The ratatui terminal plus its cleanup guard.
pub struct SlackTerminal {
    /// The underlying ratatui terminal
    pub terminal: Terminal<CrosstermBackend<Stdout>>,
    _guard: TerminalGuard,
}

impl SlackTerminal {
    /// Enter raw mode and the alternate screen.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout is not a terminal or raw mode cannot be
    /// enabled.
    pub fn new() -> Result<Self> {
        install_panic_hook();

        enable_raw_mode()?;
        TERMINAL_ACTIVE.store(true, Ordering::SeqCst);
        let guard = TerminalGuard;

        let mut out = stdout();
        execute!(
            out,
            EnterAlternateScreen,
            EnableBracketedPaste,
            SetTitle(TERMINAL_TITLE),
            cursor::Hide
        )?;

        let terminal = Terminal::new(CrosstermBackend::new(out))?;

        Ok(Self {
            terminal,
            _guard: guard,
        })
    }

    pub fn draw<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut ratatui::Frame),
    {
        self.terminal.draw(f)?;
        Ok(())
    }
}

/// Restore the terminal to its normal state. Safe to call more than once.
///
/// # Errors
///
/// Returns an error if any terminal operation fails.
pub fn restore_terminal() -> Result<()> {
    if !TERMINAL_ACTIVE.swap(false, Ordering::SeqCst) {
        return Ok(());
    }

    let mut out = stdout();
    execute!(out, cursor::Show)?;
    execute!(out, DisableBracketedPaste)?;
    execute!(out, LeaveAlternateScreen)?;
    disable_raw_mode()?;

    Ok(())
}

/// Install a panic hook that restores the terminal before the default hook
/// prints the panic message.
fn install_panic_hook() {
    if PANIC_HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }

    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}
