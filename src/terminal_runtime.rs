use std::io;
use std::panic;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    self, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::{error, info, warn};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

/// Rows taken by the HUD above and below the board.
const HUD_ROWS: u16 = 3;

pub type AppTerminal = Terminal<CrosstermBackend<io::Stdout>>;

/// Raw-mode alternate screen held for the lifetime of the game.
///
/// The terminal is put back on [`TerminalSession::restore`], on drop and on panic.
pub struct TerminalSession {
    terminal: AppTerminal,
    restored: bool,
}

impl TerminalSession {
    pub fn enter() -> io::Result<Self> {
        let previous_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = leave_screen();
            error!("panic: {panic_info}");
            previous_hook(panic_info);
        }));

        enable_raw_mode()?;
        let terminal = execute!(io::stdout(), EnterAlternateScreen, Hide)
            .and_then(|()| Terminal::new(CrosstermBackend::new(io::stdout())));

        match terminal {
            Ok(terminal) => {
                info!("entered alternate screen");
                Ok(Self {
                    terminal,
                    restored: false,
                })
            }
            Err(error) => {
                let _ = leave_screen();
                Err(error)
            }
        }
    }

    pub fn terminal_mut(&mut self) -> &mut AppTerminal {
        &mut self.terminal
    }

    /// Returns false, with a warning, when the window cannot show a board of
    /// `board` columns and rows plus its border and the HUD.
    pub fn fits_board(&self, board: (u16, u16)) -> bool {
        let Ok((cols, rows)) = terminal::size() else {
            return true;
        };
        let needed = (
            board.0.saturating_add(2),
            board.1.saturating_add(2).saturating_add(HUD_ROWS),
        );
        let fits = cols >= needed.0 && rows >= needed.1;
        if !fits {
            warn!(
                "terminal is {cols}x{rows}, board needs {}x{}; it will be clipped",
                needed.0, needed.1
            );
        }
        fits
    }

    /// Leaves the alternate screen now, reporting any failure.
    pub fn restore(mut self) -> io::Result<()> {
        self.restored = true;
        leave_screen()
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(error) = leave_screen() {
            error!("failed to restore terminal: {error}");
        }
    }
}

fn leave_screen() -> io::Result<()> {
    let raw = disable_raw_mode();
    execute!(io::stdout(), Show, LeaveAlternateScreen)?;
    raw
}
