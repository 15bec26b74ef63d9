use std::io;

use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::Backend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Block;
use unicode_width::UnicodeWidthStr;

use crate::config::{GLYPH_EMPTY, GridSize};
use crate::log_buffer::LogBuffer;
use crate::port::RenderPort;
use crate::snake::Position;
use crate::speed::Speed;

/// Columns left blank to the left of both panels.
pub const PLAY_AREA_MARGIN_X: u16 = 3;

/// Rows left blank above the game panel.
pub const PLAY_AREA_MARGIN_Y: u16 = 1;

/// Indent for log panel lines.
const LOG_INDENT: &str = "  ";

/// Retained picture of the game and log panels.
#[derive(Debug, Clone)]
struct Screen {
    surface: GridSize,
    cells: Vec<char>,
    food_count: usize,
    speed: Speed,
    banner: Option<String>,
    log: LogBuffer,
    log_rows: u16,
}

impl Screen {
    fn new(surface: GridSize, log_rows: u16) -> Self {
        Self {
            surface,
            cells: vec![GLYPH_EMPTY; surface.interior().total_cells()],
            food_count: 0,
            speed: Speed::SLOWEST,
            banner: None,
            log: LogBuffer::new(usize::from(log_rows)),
            log_rows,
        }
    }

    fn cell_index(&self, position: Position) -> Option<usize> {
        let interior = self.surface.interior();
        if !position.is_within_bounds(interior) {
            return None;
        }

        let x = usize::try_from(position.x).ok()?;
        let y = usize::try_from(position.y).ok()?;
        Some(y * usize::from(interior.width) + x)
    }

    fn row(&self, y: u16) -> String {
        let width = usize::from(self.surface.interior().width);
        let start = usize::from(y) * width;
        self.cells[start..start + width].iter().collect()
    }

    fn render(&self, frame: &mut Frame<'_>) {
        let area = frame.area();
        let game_area = Rect::new(
            area.x.saturating_add(PLAY_AREA_MARGIN_X),
            area.y.saturating_add(PLAY_AREA_MARGIN_Y),
            self.surface.width,
            self.surface.height,
        )
        .intersection(area);
        let log_area = Rect::new(
            game_area.x,
            game_area.bottom(),
            self.surface.width,
            self.log_rows.saturating_add(2),
        )
        .intersection(area);

        self.render_game(frame, game_area);
        self.render_log(frame, log_area);
    }

    fn render_game(&self, frame: &mut Frame<'_>, area: Rect) {
        let block = Block::bordered()
            .title(" GAME ")
            .title_bottom(Line::from(format!(" Foods: {} ", self.food_count)))
            .title_bottom(Line::from(format!(" Speed: {} ", self.speed)).right_aligned());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let buffer = frame.buffer_mut();
        for row in 0..inner.height.min(self.surface.interior().height) {
            buffer.set_stringn(
                inner.x,
                inner.y + row,
                self.row(row),
                usize::from(inner.width),
                Style::default(),
            );
        }

        if let Some(message) = &self.banner {
            render_banner(buffer, inner, message);
        }
    }

    fn render_log(&self, frame: &mut Frame<'_>, area: Rect) {
        let block = Block::bordered().title(" LOG ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let buffer = frame.buffer_mut();
        for (row, line) in (0..inner.height).zip(self.log.visible_lines(usize::from(inner.height)))
        {
            buffer.set_stringn(
                inner.x,
                inner.y + row,
                format!("{LOG_INDENT}{line}"),
                usize::from(inner.width),
                Style::default(),
            );
        }
    }
}

fn render_banner(buffer: &mut Buffer, inner: Rect, message: &str) {
    if inner.is_empty() {
        return;
    }

    let width = u16::try_from(message.width()).unwrap_or(u16::MAX);
    let x = inner.x + inner.width.saturating_sub(width) / 2;
    let y = inner.y + inner.height / 2;
    buffer.set_stringn(
        x,
        y,
        message,
        usize::from(inner.right() - x),
        Style::default().add_modifier(Modifier::BOLD),
    );
}

/// Render port backed by a ratatui terminal.
///
/// Draw calls update a retained screen model; [`RenderPort::present`]
/// paints it in one frame.
pub struct TerminalRenderer<'a, B: Backend> {
    terminal: &'a mut Terminal<B>,
    screen: Screen,
}

impl<'a, B: Backend> TerminalRenderer<'a, B> {
    /// Creates a renderer for a game surface of `surface` (border included)
    /// and a log panel showing `log_rows` lines.
    pub fn new(terminal: &'a mut Terminal<B>, surface: GridSize, log_rows: u16) -> Self {
        Self {
            terminal,
            screen: Screen::new(surface, log_rows),
        }
    }
}

impl<B: Backend> RenderPort for TerminalRenderer<'_, B> {
    fn draw_cell(&mut self, position: Position, glyph: char) -> io::Result<()> {
        if let Some(index) = self.screen.cell_index(position) {
            self.screen.cells[index] = glyph;
        }
        Ok(())
    }

    fn draw_status(&mut self, food_count: usize, speed: Speed) -> io::Result<()> {
        self.screen.food_count = food_count;
        self.screen.speed = speed;
        Ok(())
    }

    fn draw_game_over(&mut self, message: &str) -> io::Result<()> {
        self.screen.banner = Some(message.to_owned());
        Ok(())
    }

    fn clear_playfield(&mut self) -> io::Result<()> {
        self.screen.cells.fill(GLYPH_EMPTY);
        self.screen.banner = None;
        Ok(())
    }

    fn append_log(&mut self, line: &str) -> io::Result<()> {
        self.screen.log.push_line(line);
        Ok(())
    }

    fn present(&mut self) -> io::Result<()> {
        self.terminal.draw(|frame| self.screen.render(frame))?;
        Ok(())
    }
}
