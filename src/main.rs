use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use coral_snake::config::{CellSize, GameConfig};
use coral_snake::game::{GameEvent, GameSession, TickInput};
use coral_snake::input::{GameInput, InputHandler};
use coral_snake::presentation::SoundSignal;
use coral_snake::renderer::{self, Overlay, TerminalCanvas};
use coral_snake::score::{FileHighScoreStore, HighScoreStore};
use coral_snake::terminal_runtime::TerminalSession;
use coral_snake::ui::hud::HudInfo;
use log::{info, warn, LevelFilter};
use simplelog::WriteLogger;

const INPUT_POLL: Duration = Duration::from_millis(10);
const DEATH_BANNER_DURATION: Duration = Duration::from_millis(1_500);

#[derive(Debug, Parser)]
#[command(name = "coral", about = "Grid snake with energy, oranges and obstacles")]
struct Cli {
    /// JSON config file; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for reproducible food and obstacle placement.
    #[arg(long)]
    seed: Option<u64>,

    /// Re-enter from the opposite side instead of dying at the border.
    #[arg(long)]
    wrap: bool,

    #[arg(long)]
    hard: bool,

    /// Enable the timed poison apple.
    #[arg(long)]
    poison: bool,

    /// One of large, medium, small.
    #[arg(long, value_parser = parse_cell_size)]
    cell_size: Option<CellSize>,

    /// Where the 4-byte high score record lives.
    #[arg(long)]
    high_score_file: Option<PathBuf>,

    #[arg(long, default_value = "coral.log")]
    log_file: PathBuf,

    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

/// Shell-side state the core does not know about.
#[derive(Debug, Default)]
struct ShellState {
    started: bool,
    paused: bool,
    instructions: bool,
    death: Option<(Instant, u32, bool)>,
    pickup_at: Option<Instant>,
}

impl ShellState {
    fn simulating(&self) -> bool {
        self.started && !self.paused && !self.instructions
    }

    fn overlay(&self, now: Instant) -> Overlay {
        if self.instructions {
            return Overlay::Instructions;
        }
        if !self.started {
            return Overlay::Start;
        }
        if self.paused {
            return Overlay::Paused;
        }
        match self.death {
            Some((at, score, new_record))
                if now.saturating_duration_since(at) < DEATH_BANNER_DURATION =>
            {
                Overlay::Died { score, new_record }
            }
            _ => Overlay::None,
        }
    }
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = load_config(&cli)?;
    let store = cli
        .high_score_file
        .clone()
        .map(FileHighScoreStore::new)
        .unwrap_or_default();
    let session = match cli.seed {
        Some(seed) => GameSession::with_seed(config, seed, store),
        None => GameSession::new(config, store),
    };

    let mut terminal = TerminalSession::enter()?;
    let result = run(&mut terminal, session);
    if let Err(error) = &result {
        warn!("game loop ended with error: {error}");
    }
    terminal.restore()?;
    result
}

fn init_logging(cli: &Cli) -> io::Result<()> {
    let file = File::create(&cli.log_file)?;
    WriteLogger::init(cli.log_level, simplelog::Config::default(), file)
        .map_err(|error| io::Error::new(io::ErrorKind::Other, error))?;
    info!("starting coral");
    Ok(())
}

fn load_config(cli: &Cli) -> io::Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path).map_err(invalid_input)?,
        None => GameConfig::default(),
    };

    config.border_wrap |= cli.wrap;
    config.hard_mode |= cli.hard;
    config.poison.enabled |= cli.poison;
    if let Some(cell_size) = cli.cell_size {
        config.cell_size = cell_size;
    }

    config.validate().map_err(invalid_input)?;
    Ok(config)
}

fn invalid_input(error: impl std::error::Error + Send + Sync + 'static) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, error)
}

fn parse_cell_size(raw: &str) -> Result<CellSize, String> {
    match raw.to_ascii_lowercase().as_str() {
        "large" => Ok(CellSize::Large),
        "medium" => Ok(CellSize::Medium),
        "small" => Ok(CellSize::Small),
        other => Err(format!("unknown cell size {other:?}")),
    }
}

fn run<S: HighScoreStore>(
    terminal: &mut TerminalSession,
    mut session: GameSession<S>,
) -> io::Result<()> {
    let mut input = InputHandler::new();
    let mut canvas = TerminalCanvas::new(session.grid(), &session.config().palette);
    terminal.fits_board(canvas.board_size());
    let mut shell = ShellState::default();
    let mut logical_ms: u64 = 0;
    let mut last_tick = Instant::now();

    canvas.begin_frame(session.grid());
    session.step(TickInput::suspended(logical_ms), &mut canvas);

    loop {
        if let Some(game_input) = input.poll_input(INPUT_POLL)? {
            if game_input == GameInput::Quit {
                info!("quit requested");
                return Ok(());
            }
            let grid = session.grid();
            handle_input(&mut session, &mut shell, &mut canvas, game_input, logical_ms);
            if session.grid() != grid {
                canvas.begin_frame(session.grid());
                terminal.fits_board(canvas.board_size());
            }
        }

        let interval = session.tick_interval();
        if last_tick.elapsed() >= interval {
            let simulate = shell.simulating();
            if simulate {
                logical_ms += u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
            }

            canvas.begin_frame(session.grid());
            let report = session.step(
                TickInput {
                    simulate,
                    now_ms: logical_ms,
                },
                &mut canvas,
            );

            let now = Instant::now();
            for event in report.events {
                if let GameEvent::Died { score, new_record } = event {
                    shell.death = Some((now, score, new_record));
                }
            }
            if canvas.take_sound() == Some(SoundSignal::Pickup) {
                shell.pickup_at = Some(now);
            }
            last_tick = now;
        }

        let snapshot = session.snapshot();
        let config = session.config();
        let now = Instant::now();
        let hud = HudInfo {
            score: snapshot.score,
            high_score: snapshot.high_score,
            energy: snapshot.energy,
            speed_multiplier: snapshot.speed_multiplier,
            sprinting: snapshot.sprinting,
            deaths: snapshot.deaths,
            cell_size: config.cell_size,
            border_wrap: config.border_wrap,
            hard_mode: config.hard_mode,
            muted: canvas.is_muted(),
            now,
            pickup_at: shell.pickup_at,
        };
        let overlay = shell.overlay(now);
        terminal
            .terminal_mut()
            .draw(|frame| renderer::render(frame, &canvas, &hud, overlay))?;
    }
}

fn handle_input<S: HighScoreStore>(
    session: &mut GameSession<S>,
    shell: &mut ShellState,
    canvas: &mut TerminalCanvas,
    input: GameInput,
    now_ms: u64,
) {
    match input {
        GameInput::Direction(direction) => {
            if shell.simulating() {
                session.queue_direction(direction);
            }
        }
        GameInput::Sprint => {
            if shell.simulating() {
                session.toggle_sprint();
            }
        }
        GameInput::Confirm if !shell.started => shell.started = true,
        GameInput::Pause if shell.started && !shell.instructions => {
            shell.paused = !shell.paused;
        }
        GameInput::Instructions => shell.instructions = !shell.instructions,
        GameInput::Mute => canvas.toggle_mute(),
        GameInput::CycleCellSize | GameInput::ToggleWrap | GameInput::ToggleHardMode
            if !shell.simulating() =>
        {
            let mut config = session.config().clone();
            match input {
                GameInput::CycleCellSize => config.cell_size = config.cell_size.next(),
                GameInput::ToggleWrap => config.border_wrap = !config.border_wrap,
                _ => config.hard_mode = !config.hard_mode,
            }
            if let Err(error) = session.reconfigure(config, now_ms) {
                warn!("rejected configuration change: {error}");
            }
        }
        _ => {}
    }
}
