//! Operator keyboard control.
//!
//! Keys are read without blocking via `crossterm`. The terminal has to be in
//! raw mode for single key presses to arrive, which also stops Ctrl+C from
//! raising SIGINT, so Ctrl+C is handled here as a quit key as well.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use tracing::{debug, warn};

use crate::forwarder::QuitSignal;

/// Default quit key.
pub const QUIT_KEY: char = 'q';

/// Whether `key` asks the loop to stop.
pub fn is_quit_key(key: &KeyEvent, quit: char) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => true,
        KeyCode::Char(c) => c.eq_ignore_ascii_case(&quit),
        _ => false,
    }
}

/// Quit signal driven by the terminal keyboard.
pub struct KeyboardQuit {
    quit: char,
}

impl KeyboardQuit {
    /// Watch for `quit` (case-insensitive) and Ctrl+C.
    pub fn new(quit: char) -> Self {
        Self { quit }
    }
}

impl Default for KeyboardQuit {
    fn default() -> Self {
        Self::new(QUIT_KEY)
    }
}

impl QuitSignal for KeyboardQuit {
    fn quit_requested(&mut self) -> io::Result<bool> {
        // Drain everything pending; other keys are ignored.
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if is_quit_key(&key, self.quit) {
                    debug!(code = ?key.code, "Quit key pressed");
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

/// Keeps the terminal in raw mode until dropped.
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    /// Switch the terminal to raw mode.
    pub fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(err) = terminal::disable_raw_mode() {
            warn!(error = %err, "Could not restore terminal mode");
        }
    }
}
