use std::fmt;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::GridGeometry;

/// Smallest grid edge that still leaves room for a spawn two cells from every border.
pub const MIN_GRID_CELLS: u32 = 5;

/// Maximum number of buffered direction changes.
pub const MAX_QUEUED_MOVES: usize = 3;

/// Glyph used for one filled grid cell (two terminal columns).
pub const GLYPH_CELL: &str = "██";

/// Glyph used for round entities (food, snake head).
pub const GLYPH_CIRCLE: &str = "()";

/// Glyph used for an empty grid cell.
pub const GLYPH_EMPTY: &str = "  ";

/// Errors raised while loading or validating a [`GameConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("arena of {cols}x{rows} cells is too small, need at least {MIN_GRID_CELLS} per side")]
    ArenaTooSmall { cols: u32, rows: u32 },
    #[error("max_energy must be positive")]
    ZeroMaxEnergy,
    #[error("velocity for every difficulty must be positive")]
    ZeroVelocity,
    #[error("range {name} has min {min} greater than max {max}")]
    InvalidRange { name: &'static str, min: u64, max: u64 },
    #[error("{count} obstacles and {foods} foods do not fit in {cells} cells")]
    CrowdedGrid {
        count: usize,
        foods: usize,
        cells: usize,
    },
    #[error("sprint_factor must be a positive finite number, got {0}")]
    InvalidSprintFactor(f32),
    #[error("invalid color {0:?}, expected #rrggbb")]
    InvalidColor(String),
}

/// 24-bit colour handed to the presentation layer.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Rgb {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidColor(raw.to_owned());
        let hex = raw.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Selectable grid cell sizes in pixels.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellSize {
    Large,
    Medium,
    Small,
}

impl CellSize {
    #[must_use]
    pub fn pixels(self) -> u32 {
        match self {
            Self::Large => 60,
            Self::Medium => 40,
            Self::Small => 20,
        }
    }

    /// Returns the next size in the configuration cycle.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Large => Self::Medium,
            Self::Medium => Self::Small,
            Self::Small => Self::Large,
        }
    }
}

/// Difficulty level selecting the base tick velocity.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Low,
    Medium,
    High,
    Extreme,
}

impl Difficulty {
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
            Self::Extreme => 3,
        }
    }
}

/// Inclusive millisecond range for randomized timers.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct MsRange {
    pub min: u64,
    pub max: u64,
}

impl MsRange {
    #[must_use]
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn as_range(self) -> RangeInclusive<u64> {
        self.min..=self.max
    }
}

/// What a poison apple does right after it has been eaten.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoisonRespawn {
    /// Reappear immediately somewhere else, still active.
    Reactivate,
    /// Go dormant and wait a fresh respawn delay.
    Dormant,
}

/// Timing for the optional poison apple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoisonConfig {
    pub enabled: bool,
    pub first_delay_ms: MsRange,
    pub active_ms: MsRange,
    pub respawn_delay_ms: MsRange,
    pub after_consumption: PoisonRespawn,
}

impl Default for PoisonConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            first_delay_ms: MsRange::new(5_000, 10_000),
            active_ms: MsRange::new(5_000, 10_000),
            respawn_delay_ms: MsRange::new(5_000, 15_000),
            after_consumption: PoisonRespawn::Dormant,
        }
    }
}

/// Colours for every drawable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub head: Rgb,
    pub dead_head: Rgb,
    pub tail: Rgb,
    pub apple: Rgb,
    pub orange: Rgb,
    pub poison: Rgb,
    pub obstacle: Rgb,
    pub arena: Rgb,
    pub grid: Rgb,
    pub message: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            head: Rgb::new(0x00, 0xaa, 0x00),
            dead_head: Rgb::new(0x4b, 0x00, 0x82),
            tail: Rgb::new(0x00, 0xff, 0x00),
            apple: Rgb::new(0xaa, 0x00, 0x00),
            orange: Rgb::new(0xff, 0xa5, 0x00),
            poison: Rgb::new(0x80, 0x00, 0x80),
            obstacle: Rgb::new(0x8b, 0x45, 0x13),
            arena: Rgb::new(0x20, 0x20, 0x20),
            grid: Rgb::new(0x3c, 0x3c, 0x3b),
            message: Rgb::new(0x80, 0x80, 0x80),
        }
    }
}

/// Immutable settings for one session, shared by reference with every component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub arena_width_px: u32,
    pub arena_height_px: u32,
    pub cell_size: CellSize,
    pub difficulty: Difficulty,
    /// Base ticks per second for each [`Difficulty`].
    pub velocity: [u32; 4],
    /// Forces [`Difficulty::High`] regardless of `difficulty`.
    pub hard_mode: bool,
    pub border_wrap: bool,
    pub max_energy: u32,
    pub energy_per_tick: u32,
    pub apple_energy: u32,
    /// Apples grant a random amount in `apple_energy - spread ..= apple_energy`.
    pub apple_energy_spread: u32,
    pub apple_count: usize,
    pub orange_count: usize,
    pub orange_speed_increment: f32,
    /// Tick rate multiplier while sprinting, on top of the orange-earned speed.
    pub sprint_factor: f32,
    /// Extra score per orange eaten in the current life.
    pub orange_points: u32,
    pub obstacle_count: usize,
    /// Rejection-sampling attempts before spawning falls back to a free-cell scan.
    pub spawn_retry_cap: u32,
    pub poison: PoisonConfig,
    pub palette: Palette,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena_width_px: 800,
            arena_height_px: 800,
            cell_size: CellSize::Medium,
            difficulty: Difficulty::Medium,
            velocity: [4, 7, 10, 15],
            hard_mode: false,
            border_wrap: false,
            max_energy: 100,
            energy_per_tick: 1,
            apple_energy: 50,
            apple_energy_spread: 25,
            apple_count: 1,
            orange_count: 1,
            orange_speed_increment: 0.05,
            sprint_factor: 2.0,
            orange_points: 0,
            obstacle_count: 5,
            spawn_retry_cap: 1_000,
            poison: PoisonConfig::default(),
            palette: Palette::default(),
        }
    }
}

impl GameConfig {
    /// Parses and validates a JSON document. Missing fields take defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Checks the invariants the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let grid = self.grid();
        if grid.cols() < MIN_GRID_CELLS || grid.rows() < MIN_GRID_CELLS {
            return Err(ConfigError::ArenaTooSmall {
                cols: grid.cols(),
                rows: grid.rows(),
            });
        }
        if self.max_energy == 0 {
            return Err(ConfigError::ZeroMaxEnergy);
        }
        if self.velocity.contains(&0) {
            return Err(ConfigError::ZeroVelocity);
        }
        if !(self.sprint_factor.is_finite() && self.sprint_factor > 0.0) {
            return Err(ConfigError::InvalidSprintFactor(self.sprint_factor));
        }

        let ranges = [
            ("poison.first_delay_ms", self.poison.first_delay_ms),
            ("poison.active_ms", self.poison.active_ms),
            ("poison.respawn_delay_ms", self.poison.respawn_delay_ms),
        ];
        for (name, range) in ranges {
            if range.min > range.max {
                return Err(ConfigError::InvalidRange {
                    name,
                    min: range.min,
                    max: range.max,
                });
            }
        }

        // One cell for the snake head, the rest must hold obstacles and food.
        let foods = self.food_count();
        if self.obstacle_count + foods >= grid.cell_count() {
            return Err(ConfigError::CrowdedGrid {
                count: self.obstacle_count,
                foods,
                cells: grid.cell_count(),
            });
        }

        Ok(())
    }

    /// Grid geometry for the configured arena and cell size.
    #[must_use]
    pub fn grid(&self) -> GridGeometry {
        GridGeometry::new(
            self.arena_width_px,
            self.arena_height_px,
            self.cell_size.pixels(),
        )
    }

    /// Food entities placed on the board at once.
    #[must_use]
    pub fn food_count(&self) -> usize {
        self.apple_count + self.orange_count + usize::from(self.poison.enabled)
    }

    #[must_use]
    pub fn effective_difficulty(&self) -> Difficulty {
        if self.hard_mode {
            Difficulty::High
        } else {
            self.difficulty
        }
    }

    /// Simulation rate for a snake moving at `speed_multiplier`, optionally sprinting.
    #[must_use]
    pub fn ticks_per_second(&self, speed_multiplier: f32, sprinting: bool) -> f64 {
        let base = f64::from(self.velocity[self.effective_difficulty().index()]);
        let sprint = if sprinting {
            f64::from(self.sprint_factor)
        } else {
            1.0
        };
        base * f64::from(speed_multiplier.max(0.0)) * sprint
    }

    /// Frame-limiter interval for a snake moving at `speed_multiplier`.
    #[must_use]
    pub fn tick_interval(&self, speed_multiplier: f32, sprinting: bool) -> Duration {
        let rate = self.ticks_per_second(speed_multiplier, sprinting);
        if rate <= f64::EPSILON {
            return Duration::from_secs(1);
        }
        Duration::from_secs_f64(1.0 / rate)
    }

    /// Inclusive range of energy an apple grants.
    #[must_use]
    pub fn apple_energy_range(&self) -> RangeInclusive<u32> {
        self.apple_energy.saturating_sub(self.apple_energy_spread)..=self.apple_energy
    }
}
