use std::collections::VecDeque;

/// Most recent log lines, oldest first, capped at a fixed capacity.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LogBuffer {
    /// Creates an empty buffer that keeps at most `capacity` lines.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a line, evicting the oldest one when full.
    pub fn push_line(&mut self, line: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }

        if self.lines.len() == self.capacity {
            let _ = self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    /// Returns up to `rows` of the newest lines, oldest first.
    pub fn visible_lines(&self, rows: usize) -> impl Iterator<Item = &str> {
        let skip = self.lines.len().saturating_sub(rows);
        self.lines.iter().skip(skip).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
