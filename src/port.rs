//! Capability interfaces between the game engine and the terminal.
//!
//! The engine only ever talks to the outside world through these two
//! traits. Implementations must return within bounded time: the tick
//! cadence is governed entirely by [`InputPort::poll_key`]'s timeout.

use std::io;
use std::time::Duration;

use crate::input::Key;
use crate::snake::Position;
use crate::speed::Speed;

/// Write-only drawing surface for the play field and its panels.
///
/// Positions are interior coordinates; the implementation accounts for
/// the border.
pub trait RenderPort {
    /// Sets one play-field cell to `glyph`.
    fn draw_cell(&mut self, position: Position, glyph: char) -> io::Result<()>;

    /// Updates the food counter and speed readout.
    fn draw_status(&mut self, food_count: usize, speed: Speed) -> io::Result<()>;

    /// Shows `message` centered over the play field.
    fn draw_game_over(&mut self, message: &str) -> io::Result<()>;

    /// Blanks the play field and redraws its border.
    fn clear_playfield(&mut self) -> io::Result<()>;

    /// Appends one line to the log panel.
    fn append_log(&mut self, line: &str) -> io::Result<()>;

    /// Pushes everything drawn so far to the screen.
    fn present(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Source of logical key presses.
pub trait InputPort {
    /// Waits up to `timeout` for a key; `None` waits indefinitely.
    ///
    /// Returns `Ok(None)` on timeout or for events that carry no key.
    fn poll_key(&mut self, timeout: Option<Duration>) -> io::Result<Option<Key>>;
}
