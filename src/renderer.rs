use std::io;

use crossterm::execute;
use crossterm::style::Print;
use log::{debug, warn};
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Block;
use ratatui::Frame;

use crate::config::{Palette, Rgb, GLYPH_CELL, GLYPH_CIRCLE, GLYPH_EMPTY};
use crate::geometry::{GridGeometry, PixelPosition};
use crate::presentation::{Presenter, SoundSignal};
use crate::ui::hud::{render_hud, HudInfo};
use crate::ui::menu::{render_death_banner, render_instructions, render_pause_menu, render_start_menu};

/// Terminal columns used per grid cell.
pub const COLUMNS_PER_CELL: u16 = 2;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Shape {
    Square,
    Circle,
}

/// Which overlay, if any, covers the board.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Overlay {
    None,
    Start,
    Paused,
    Instructions,
    Died { score: u32, new_record: bool },
}

/// Presenter that rasterises draw calls into one terminal glyph per grid cell.
#[derive(Debug, Clone)]
pub struct TerminalCanvas {
    grid: GridGeometry,
    cells: Vec<Option<(Shape, Rgb)>>,
    arena: Rgb,
    border: Rgb,
    message: Rgb,
    muted: bool,
    last_sound: Option<SoundSignal>,
}

impl TerminalCanvas {
    #[must_use]
    pub fn new(grid: GridGeometry, palette: &Palette) -> Self {
        Self {
            grid,
            cells: vec![None; grid.cell_count()],
            arena: palette.arena,
            border: palette.grid,
            message: palette.message,
            muted: false,
            last_sound: None,
        }
    }

    /// Clears the canvas, resizing it when the grid changed.
    pub fn begin_frame(&mut self, grid: GridGeometry) {
        if grid != self.grid {
            self.grid = grid;
            self.cells = vec![None; grid.cell_count()];
        } else {
            self.cells.fill(None);
        }
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Returns and clears the last sound requested since the previous call.
    pub fn take_sound(&mut self) -> Option<SoundSignal> {
        self.last_sound.take()
    }

    #[must_use]
    pub fn grid(&self) -> GridGeometry {
        self.grid
    }

    /// Terminal size the board needs, border excluded.
    #[must_use]
    pub fn board_size(&self) -> (u16, u16) {
        let cols = u16::try_from(self.grid.cols()).unwrap_or(u16::MAX);
        let rows = u16::try_from(self.grid.rows()).unwrap_or(u16::MAX);
        (cols.saturating_mul(COLUMNS_PER_CELL), rows)
    }

    fn paint(&mut self, pixel: PixelPosition, shape: Shape, color: Rgb) {
        let cell = self.grid.to_cell(pixel);
        if !self.grid.contains(cell) {
            return;
        }
        let (Ok(col), Ok(row)) = (usize::try_from(cell.col), usize::try_from(cell.row)) else {
            return;
        };
        let index = row * self.grid.cols() as usize + col;
        if let Some(slot) = self.cells.get_mut(index) {
            *slot = Some((shape, color));
        }
    }
}

impl Presenter for TerminalCanvas {
    fn draw_cell(&mut self, corner: PixelPosition, _size: u32, color: Rgb) {
        self.paint(corner, Shape::Square, color);
    }

    fn draw_circle(&mut self, center: PixelPosition, _radius: u32, color: Rgb) {
        self.paint(center, Shape::Circle, color);
    }

    fn play_sound(&mut self, signal: SoundSignal) {
        debug!("sound {signal:?}");
        self.last_sound = Some(signal);
        if !self.muted && signal == SoundSignal::Death {
            if let Err(error) = execute!(io::stdout(), Print('\u{7}')) {
                warn!("terminal bell failed: {error}");
            }
        }
    }
}

/// Renders the full frame: HUD, board and the active overlay.
pub fn render(frame: &mut Frame<'_>, canvas: &TerminalCanvas, hud: &HudInfo, overlay: Overlay) {
    let area = frame.area();
    let board_area = render_hud(frame, area, hud);

    let (width, height) = canvas.board_size();
    let outer = centered(board_area, width.saturating_add(2), height.saturating_add(2));
    let block = Block::bordered().border_style(Style::new().fg(to_color(canvas.border)));
    let inner = block.inner(outer);
    frame.render_widget(block, outer);

    render_board(frame, inner, canvas);

    let text = to_color(canvas.message);
    match overlay {
        Overlay::None => {}
        Overlay::Start => render_start_menu(frame, outer, hud.high_score),
        Overlay::Paused => render_pause_menu(frame, outer, text),
        Overlay::Instructions => render_instructions(frame, outer, text),
        Overlay::Died { score, new_record } => {
            render_death_banner(frame, outer, score, hud.high_score, new_record, text);
        }
    }
}

fn render_board(frame: &mut Frame<'_>, inner: Rect, canvas: &TerminalCanvas) {
    let cols = canvas.grid.cols() as usize;
    let background = to_color(canvas.arena);
    let buffer = frame.buffer_mut();

    for (index, cell) in canvas.cells.iter().enumerate() {
        let (Ok(col), Ok(row)) = (u16::try_from(index % cols), u16::try_from(index / cols)) else {
            continue;
        };
        let x = inner.x.saturating_add(col.saturating_mul(COLUMNS_PER_CELL));
        let y = inner.y.saturating_add(row);
        if x >= inner.right() || y >= inner.bottom() {
            continue;
        }

        let (glyph, style) = match cell {
            None => (GLYPH_EMPTY, Style::new().bg(background)),
            Some((Shape::Square, color)) => (GLYPH_CELL, Style::new().fg(to_color(*color)).bg(background)),
            Some((Shape::Circle, color)) => (GLYPH_CIRCLE, Style::new().fg(Color::Black).bg(to_color(*color))),
        };
        buffer.set_string(x, y, glyph, style);
    }
}

/// Converts a core colour into a ratatui colour.
#[must_use]
pub fn to_color(color: Rgb) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
