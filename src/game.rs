use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{ConfigError, GameConfig};
use crate::energy::EnergyResource;
use crate::food::{Food, FoodKind, TimerEvent};
use crate::geometry::{GridGeometry, GridPosition};
use crate::input::Direction;
use crate::obstacle::ObstacleField;
use crate::presentation::{Presenter, SoundSignal};
use crate::score::{HighScoreStore, MemoryHighScoreStore};
use crate::snake::{Snake, SnakeStep};
use crate::spawner::{FoodSpawner, SpawnError};

/// Per-tick input from the shell.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct TickInput {
    /// False while paused or showing instructions; the tick then only redraws.
    pub simulate: bool,
    /// Monotonic logical clock driving timed food.
    pub now_ms: u64,
}

impl TickInput {
    #[must_use]
    pub fn running(now_ms: u64) -> Self {
        Self {
            simulate: true,
            now_ms,
        }
    }

    #[must_use]
    pub fn suspended(now_ms: u64) -> Self {
        Self {
            simulate: false,
            now_ms,
        }
    }
}

/// Something notable that happened during a tick.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameEvent {
    AteApple { energy_gained: u32 },
    AteOrange,
    AtePoison { fatal: bool },
    PoisonActivated,
    PoisonExpired,
    HitObstacle,
    EnergyDepleted,
    Died { score: u32, new_record: bool },
    FoodLost(SpawnError),
}

/// What one [`GameSession::step`] did.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct TickReport {
    pub simulated: bool,
    pub events: Vec<GameEvent>,
}

/// Owned view of the board for renderers and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub head: GridPosition,
    pub body: Vec<GridPosition>,
    pub direction: Direction,
    pub alive: bool,
    pub foods: Vec<Food>,
    pub obstacles: Vec<GridPosition>,
    pub energy: EnergyResource,
    pub speed_multiplier: f32,
    pub sprinting: bool,
    pub score: u32,
    pub high_score: u32,
    pub deaths: u32,
    pub tick_count: u64,
}

/// One running match: snake, food, obstacles, score and the random source.
#[derive(Debug)]
pub struct GameSession<S: HighScoreStore = MemoryHighScoreStore> {
    pub snake: Snake,
    pub foods: Vec<Food>,
    pub obstacles: ObstacleField,
    config: GameConfig,
    grid: GridGeometry,
    spawner: FoodSpawner,
    score: u32,
    high_score: u32,
    oranges_eaten: u32,
    deaths: u32,
    tick_count: u64,
    sprinting: bool,
    rng: StdRng,
    store: S,
}

impl<S: HighScoreStore> GameSession<S> {
    /// Creates a session seeded from the operating system.
    #[must_use]
    pub fn new(config: GameConfig, store: S) -> Self {
        Self::from_rng(config, StdRng::from_entropy(), store)
    }

    /// Creates a deterministic session for tests and reproducible runs.
    #[must_use]
    pub fn with_seed(config: GameConfig, seed: u64, store: S) -> Self {
        Self::from_rng(config, StdRng::seed_from_u64(seed), store)
    }

    fn from_rng(config: GameConfig, mut rng: StdRng, store: S) -> Self {
        let grid = config.grid();
        let snake = Snake::spawn(&mut rng, grid, config.max_energy);
        let high_score = store.load();
        info!(
            "new session on {}x{} grid, high score {high_score}",
            grid.cols(),
            grid.rows()
        );

        let mut session = Self {
            snake,
            foods: Vec::new(),
            obstacles: ObstacleField::empty(config.cell_size),
            spawner: FoodSpawner::new(grid, config.spawn_retry_cap),
            grid,
            config,
            score: 0,
            high_score,
            oranges_eaten: 0,
            deaths: 0,
            tick_count: 0,
            sprinting: false,
            rng,
            store,
        };
        session.regenerate_obstacles();
        session.refill_foods(0);
        session
    }

    /// Buffers a direction change for the next tick.
    pub fn queue_direction(&mut self, direction: Direction) {
        self.snake.set_direction(direction);
    }

    /// Flips sprinting on or off. Sprinting scales the tick rate only; the
    /// orange-earned speed multiplier is left alone.
    pub fn toggle_sprint(&mut self) {
        self.sprinting = !self.sprinting;
        debug!("sprinting: {}", self.sprinting);
    }

    #[must_use]
    pub fn is_sprinting(&self) -> bool {
        self.sprinting
    }

    /// Advances the simulation one tick (when `input.simulate`) and redraws.
    pub fn step<P: Presenter + ?Sized>(&mut self, input: TickInput, presenter: &mut P) -> TickReport {
        let mut report = TickReport::default();
        if input.simulate {
            report.simulated = true;
            self.simulate(input.now_ms, presenter, &mut report.events);
        }

        self.render(presenter);
        report
    }

    fn simulate<P: Presenter + ?Sized>(
        &mut self,
        now_ms: u64,
        presenter: &mut P,
        events: &mut Vec<GameEvent>,
    ) {
        self.tick_count += 1;

        let step = {
            let Self {
                snake,
                config,
                grid,
                rng,
                obstacles,
                ..
            } = self;
            snake.tick(config, *grid, rng, |cell| obstacles.contains(cell))
        };

        if let SnakeStep::Respawned { length } = step {
            self.resolve_death(length, now_ms, presenter, events);
            return;
        }

        self.resolve_food(now_ms, presenter, events);

        if self.snake.is_alive() && self.obstacles.collides(self.snake.head()) {
            debug!("hit obstacle at {:?}", self.snake.head());
            self.snake.kill();
            events.push(GameEvent::HitObstacle);
        }

        self.snake.energy_mut().decrease(self.config.energy_per_tick);
        if self.snake.is_alive() && self.snake.energy().is_depleted() {
            self.snake.kill();
            events.push(GameEvent::EnergyDepleted);
        }

        self.score = self.current_score(self.snake.len());
    }

    fn resolve_death<P: Presenter + ?Sized>(
        &mut self,
        length: usize,
        now_ms: u64,
        presenter: &mut P,
        events: &mut Vec<GameEvent>,
    ) {
        let final_score = self.current_score(length);
        let new_record = final_score > self.high_score;
        if new_record {
            self.high_score = final_score;
            self.store.save(final_score);
        }
        info!("snake died with score {final_score}, new record: {new_record}");

        presenter.play_sound(SoundSignal::Death);
        events.push(GameEvent::Died {
            score: final_score,
            new_record,
        });

        self.deaths += 1;
        self.oranges_eaten = 0;
        self.score = 0;

        // The respawned snake may sit on food; move it aside.
        let head = self.snake.head();
        let mut index = 0;
        while index < self.foods.len() {
            if self.foods[index].blocks(head) && !self.relocate_food(index, events) {
                continue;
            }
            index += 1;
        }
        self.refill_foods(now_ms);
    }

    fn resolve_food<P: Presenter + ?Sized>(
        &mut self,
        now_ms: u64,
        presenter: &mut P,
        events: &mut Vec<GameEvent>,
    ) {
        let head = self.snake.head();
        let mut index = 0;

        while index < self.foods.len() {
            let timer = {
                let Self {
                    foods, config, rng, ..
                } = self;
                foods[index].advance_timer(now_ms, &config.poison, rng)
            };
            match timer {
                TimerEvent::Activated => {
                    events.push(GameEvent::PoisonActivated);
                    if !self.relocate_food(index, events) {
                        continue;
                    }
                }
                TimerEvent::Expired => events.push(GameEvent::PoisonExpired),
                TimerEvent::Idle => {}
            }

            if self.snake.is_alive()
                && self.foods[index].is_eaten_by(head)
                && !self.consume_food(index, now_ms, presenter, events)
            {
                continue;
            }
            index += 1;
        }
    }

    /// Applies the effect of eating `foods[index]`. Returns false when the food was removed.
    fn consume_food<P: Presenter + ?Sized>(
        &mut self,
        index: usize,
        now_ms: u64,
        presenter: &mut P,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        match self.foods[index].kind {
            FoodKind::Apple => {
                let energy_gained = self.rng.gen_range(self.config.apple_energy_range());
                self.snake.mark_ate();
                self.snake.energy_mut().increase(energy_gained);
                presenter.play_sound(SoundSignal::Pickup);
                events.push(GameEvent::AteApple { energy_gained });
                self.relocate_food(index, events)
            }
            FoodKind::Orange => {
                self.snake.boost_speed(self.config.orange_speed_increment);
                self.oranges_eaten += 1;
                presenter.play_sound(SoundSignal::Pickup);
                events.push(GameEvent::AteOrange);
                self.relocate_food(index, events)
            }
            FoodKind::Poison(_) => {
                let fatal = !self.snake.shrink();
                if fatal {
                    self.snake.kill();
                }
                events.push(GameEvent::AtePoison { fatal });

                let stays_active = {
                    let Self {
                        foods, config, rng, ..
                    } = self;
                    foods[index].consume_poison(now_ms, &config.poison, rng)
                };
                !stays_active || self.relocate_food(index, events)
            }
        }
    }

    /// Moves `foods[index]` to a free cell. Returns false when the grid is
    /// saturated and the food was removed instead.
    fn relocate_food(&mut self, index: usize, events: &mut Vec<GameEvent>) -> bool {
        match self.free_cell() {
            Ok(position) => {
                self.foods[index].position = position;
                true
            }
            Err(error) => {
                warn!("removing food: {error}");
                let _ = self.foods.remove(index);
                events.push(GameEvent::FoodLost(error));
                false
            }
        }
    }

    /// Tops the board up to the configured number of each food kind.
    fn refill_foods(&mut self, now_ms: u64) {
        let count = |foods: &[Food], wanted: fn(&FoodKind) -> bool| {
            foods.iter().filter(|food| wanted(&food.kind)).count()
        };
        let apples = count(&self.foods, |kind| matches!(kind, FoodKind::Apple));
        let oranges = count(&self.foods, |kind| matches!(kind, FoodKind::Orange));
        let poisons = count(&self.foods, |kind| matches!(kind, FoodKind::Poison(_)));
        let wanted_poisons = usize::from(self.config.poison.enabled);

        for _ in apples..self.config.apple_count {
            self.add_food(Food::apple);
        }
        for _ in oranges..self.config.orange_count {
            self.add_food(Food::orange);
        }
        for _ in poisons..wanted_poisons {
            let Self { config, rng, .. } = self;
            let timing = config.poison;
            let probe = Food::poison(GridPosition::new(0, 0), now_ms, &timing, rng);
            self.add_food(|position| Food { position, ..probe });
        }
    }

    fn add_food(&mut self, make: impl FnOnce(GridPosition) -> Food) {
        match self.free_cell() {
            Ok(position) => self.foods.push(make(position)),
            Err(error) => warn!("could not place food: {error}"),
        }
    }

    fn free_cell(&mut self) -> Result<GridPosition, SpawnError> {
        let Self {
            spawner,
            rng,
            snake,
            obstacles,
            foods,
            ..
        } = self;
        spawner.spawn(rng, |cell| is_occupied(snake, obstacles, foods, cell))
    }

    /// Rebuilds the obstacle field, keeping the snake, its next cell and food clear.
    fn regenerate_obstacles(&mut self) {
        let Self {
            spawner,
            rng,
            snake,
            foods,
            obstacles,
            config,
            grid,
            ..
        } = self;
        let ahead = grid.wrap(snake.head().step(snake.direction()));
        *obstacles = ObstacleField::generate(
            config.obstacle_count,
            spawner,
            rng,
            config.cell_size,
            config.palette.obstacle,
            |cell| {
                cell == ahead
                    || snake.occupies(cell)
                    || foods.iter().any(|food| food.blocks(cell))
            },
        );
    }

    /// Applies a new configuration.
    ///
    /// When the grid changes (cell size or arena) the snake respawns and all
    /// obstacles and food are regenerated; otherwise only food counts adjust.
    pub fn reconfigure(&mut self, config: GameConfig, now_ms: u64) -> Result<(), ConfigError> {
        config.validate()?;
        let grid_changed = config.grid() != self.grid;
        info!(
            "reconfiguring: cell size {:?}, wrap {}, hard {}",
            config.cell_size, config.border_wrap, config.hard_mode
        );

        self.config = config;
        self.grid = self.config.grid();
        self.spawner = FoodSpawner::new(self.grid, self.config.spawn_retry_cap);

        if grid_changed {
            self.foods.clear();
            self.snake = Snake::spawn(&mut self.rng, self.grid, self.config.max_energy);
            self.score = 0;
            self.oranges_eaten = 0;
            self.regenerate_obstacles();
        } else {
            self.trim_foods();
        }
        self.refill_foods(now_ms);
        Ok(())
    }

    fn trim_foods(&mut self) {
        let mut apples = 0;
        let mut oranges = 0;
        let (apple_limit, orange_limit) = (self.config.apple_count, self.config.orange_count);
        let poison_enabled = self.config.poison.enabled;

        self.foods.retain(|food| match food.kind {
            FoodKind::Apple => {
                apples += 1;
                apples <= apple_limit
            }
            FoodKind::Orange => {
                oranges += 1;
                oranges <= orange_limit
            }
            FoodKind::Poison(_) => poison_enabled,
        });
    }

    /// Draws the current board through `presenter`.
    pub fn render<P: Presenter + ?Sized>(&self, presenter: &mut P) {
        let size = self.grid.cell_size();
        let radius = size / 2;
        let palette = &self.config.palette;

        for obstacle in self.obstacles.iter() {
            presenter.draw_cell(self.grid.to_pixel(obstacle.position), size, obstacle.color);
        }
        for food in self.foods.iter().filter(|food| food.is_active()) {
            presenter.draw_circle(
                self.grid.cell_center(food.position),
                radius,
                food.color(palette),
            );
        }
        for segment in self.snake.body() {
            presenter.draw_cell(self.grid.to_pixel(*segment), size, palette.tail);
        }

        let head_color = if self.snake.is_alive() {
            palette.head
        } else {
            palette.dead_head
        };
        presenter.draw_circle(self.grid.cell_center(self.snake.head()), radius, head_color);
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            head: self.snake.head(),
            body: self.snake.body().copied().collect(),
            direction: self.snake.direction(),
            alive: self.snake.is_alive(),
            foods: self
                .foods
                .iter()
                .filter(|food| food.is_active())
                .copied()
                .collect(),
            obstacles: self.obstacles.iter().map(|obstacle| obstacle.position).collect(),
            energy: self.snake.energy(),
            speed_multiplier: self.snake.speed_multiplier(),
            sprinting: self.sprinting,
            score: self.score,
            high_score: self.high_score,
            deaths: self.deaths,
            tick_count: self.tick_count,
        }
    }

    fn current_score(&self, tail_length: usize) -> u32 {
        let tail = u32::try_from(tail_length).unwrap_or(u32::MAX);
        tail.saturating_add(self.oranges_eaten.saturating_mul(self.config.orange_points))
    }

    /// Frame-limiter interval for the current snake speed and sprint state.
    #[must_use]
    pub fn tick_interval(&self) -> std::time::Duration {
        self.config
            .tick_interval(self.snake.speed_multiplier(), self.sprinting)
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn grid(&self) -> GridGeometry {
        self.grid
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    #[must_use]
    pub fn deaths(&self) -> u32 {
        self.deaths
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Returns true when an entity already sits on `cell`.
fn is_occupied(snake: &Snake, obstacles: &ObstacleField, foods: &[Food], cell: GridPosition) -> bool {
    snake.occupies(cell) || obstacles.contains(cell) || foods.iter().any(|food| food.blocks(cell))
}
