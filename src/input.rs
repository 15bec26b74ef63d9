use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use serde::{Deserialize, Serialize};

use crate::port::InputPort;

/// Canonical movement directions for snake input.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns the opposite direction.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Logical keys delivered by an input port.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Key {
    Quit,
    Reset,
    Pause,
    Move(Direction),
    SpeedUp,
    SpeedDown,
}

/// How a direction key that points straight back into the neck is handled.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReversalPolicy {
    /// Accept it; the snake bites its own neck on the next tick.
    #[default]
    Allow,
    /// Drop the key and keep the current heading.
    Reject,
}

impl ReversalPolicy {
    /// Returns whether `next` may replace `current` under this policy.
    #[must_use]
    pub fn permits(self, current: Direction, next: Direction) -> bool {
        match self {
            Self::Allow => true,
            Self::Reject => direction_change_is_valid(current, next),
        }
    }
}

/// Returns whether a direction change is legal (no immediate 180° turns).
#[must_use]
pub fn direction_change_is_valid(current: Direction, next: Direction) -> bool {
    next != current.opposite()
}

/// Maps a terminal key event to a logical key.
///
/// Only presses map to a key; releases and repeats yield `None`.
#[must_use]
pub fn map_key_event(key: KeyEvent) -> Option<Key> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Key::Quit);
    }

    match key.code {
        KeyCode::Up => Some(Key::Move(Direction::Up)),
        KeyCode::Down => Some(Key::Move(Direction::Down)),
        KeyCode::Left => Some(Key::Move(Direction::Left)),
        KeyCode::Right => Some(Key::Move(Direction::Right)),
        KeyCode::Esc => Some(Key::Quit),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' => Some(Key::Move(Direction::Up)),
            's' => Some(Key::Move(Direction::Down)),
            'a' => Some(Key::Move(Direction::Left)),
            'd' => Some(Key::Move(Direction::Right)),
            'q' => Some(Key::Quit),
            'r' => Some(Key::Reset),
            'p' => Some(Key::Pause),
            'x' => Some(Key::SpeedUp),
            'z' => Some(Key::SpeedDown),
            _ => None,
        },
        _ => None,
    }
}

/// Raw terminal event queue, split out so key waiting can run against a script.
pub trait EventSource {
    /// Returns true when an event is ready within `timeout`.
    fn poll(&mut self, timeout: Duration) -> io::Result<bool>;

    /// Takes the next event, blocking until one arrives.
    fn read(&mut self) -> io::Result<Event>;
}

/// The process-wide crossterm event queue.
#[derive(Debug, Default)]
pub struct TerminalEvents;

impl EventSource for TerminalEvents {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        event::poll(timeout)
    }

    fn read(&mut self) -> io::Result<Event> {
        event::read()
    }
}

/// Waits for the next key press from `source`.
///
/// Releases, repeats, resizes, mouse and focus events are swallowed and the
/// wait resumes for whatever is left of `timeout`. Returns `Ok(None)` when
/// the timeout expires or the press has no binding.
pub fn wait_for_key<S: EventSource + ?Sized>(
    source: &mut S,
    timeout: Option<Duration>,
) -> io::Result<Option<Key>> {
    let deadline = timeout.map(|timeout| Instant::now() + timeout);

    loop {
        if let Some(deadline) = deadline {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || !source.poll(remaining)? {
                return Ok(None);
            }
        }

        if let Event::Key(key) = source.read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(map_key_event(key));
            }
        }
    }
}

/// Keyboard input read from the crossterm event queue.
#[derive(Debug, Default)]
pub struct CrosstermInput<S = TerminalEvents> {
    events: S,
}

impl CrosstermInput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: EventSource> CrosstermInput<S> {
    /// Reads events from `events` instead of the terminal.
    pub fn with_source(events: S) -> Self {
        Self { events }
    }
}

impl<S: EventSource> InputPort for CrosstermInput<S> {
    fn poll_key(&mut self, timeout: Option<Duration>) -> io::Result<Option<Key>> {
        wait_for_key(&mut self.events, timeout)
    }
}
