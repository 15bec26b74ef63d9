use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::GridSize;
use crate::input::Direction;

/// Grid position in logical cell coordinates.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Returns true when the position lies inside the bounds.
    #[must_use]
    pub fn is_within_bounds(self, bounds: GridSize) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x < i32::from(bounds.width)
            && self.y < i32::from(bounds.height)
    }

    /// Returns the neighbouring cell one step towards `direction`.
    #[must_use]
    pub fn step(self, direction: Direction) -> Self {
        match direction {
            Direction::Up => Self {
                x: self.x,
                y: self.y - 1,
            },
            Direction::Down => Self {
                x: self.x,
                y: self.y + 1,
            },
            Direction::Left => Self {
                x: self.x - 1,
                y: self.y,
            },
            Direction::Right => Self {
                x: self.x + 1,
                y: self.y,
            },
        }
    }
}

/// Snake body stored tail-first: the front of the deque is the tail and the
/// back is the head, so a move is one push at the back and at most one pop
/// at the front.
#[derive(Debug, Clone)]
pub struct Snake {
    body: VecDeque<Position>,
    last_tail: Option<Position>,
}

impl Snake {
    /// Creates a one-cell snake at `origin`.
    #[must_use]
    pub fn new(origin: Position) -> Self {
        let mut snake = Self {
            body: VecDeque::new(),
            last_tail: None,
        };
        snake.reset(origin);
        snake
    }

    /// Creates a snake from explicit body cells, tail first and head last.
    ///
    /// Returns `None` for an empty body.
    #[must_use]
    pub fn from_segments(segments: Vec<Position>) -> Option<Self> {
        if segments.is_empty() {
            return None;
        }

        Some(Self {
            body: VecDeque::from(segments),
            last_tail: None,
        })
    }

    /// Truncates the body to a single cell at `origin`.
    pub fn reset(&mut self, origin: Position) {
        self.body.clear();
        self.body.push_back(origin);
        self.last_tail = None;
    }

    /// Advances the head one cell towards `direction`.
    ///
    /// When the new head lands on `food` the tail stays put and the snake
    /// grows by one. Otherwise the tail is dropped and remembered as the
    /// last tail. No bounds checking happens here.
    pub fn advance(&mut self, direction: Direction, food: Position) {
        let new_head = self.head().step(direction);
        self.body.push_back(new_head);

        if new_head == food {
            self.last_tail = None;
        } else {
            self.last_tail = self.body.pop_front();
        }
    }

    /// Returns true if the head shares a cell with any other segment.
    #[must_use]
    pub fn self_collision(&self) -> bool {
        let head = self.head();
        self.body
            .iter()
            .take(self.body.len() - 1)
            .any(|segment| *segment == head)
    }

    /// Returns the current head position.
    #[must_use]
    pub fn head(&self) -> Position {
        // The body is never empty: every constructor and `reset` seed one cell
        // and `advance` pushes before it pops.
        self.body[self.body.len() - 1]
    }

    /// Cell vacated by the most recent non-growing move.
    #[must_use]
    pub fn last_tail(&self) -> Option<Position> {
        self.last_tail
    }

    /// Returns true if any segment occupies `position`.
    #[must_use]
    pub fn occupies(&self, position: Position) -> bool {
        self.body.contains(&position)
    }

    /// Returns current segment count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Returns true when there are no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Iterates over body segments from tail to head.
    pub fn segments(&self) -> impl Iterator<Item = &Position> {
        self.body.iter()
    }
}
