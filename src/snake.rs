use std::collections::VecDeque;

use log::debug;
use rand::Rng;

use crate::config::{GameConfig, MAX_QUEUED_MOVES};
use crate::energy::EnergyResource;
use crate::geometry::{GridGeometry, GridPosition};
use crate::input::{direction_change_is_valid, Direction};

/// Minimum distance, in cells, between a respawned head and any border.
pub const SPAWN_BORDER_MARGIN: u32 = 2;

/// Spawn draws tried before accepting a blocked respawn cell.
pub const RESPAWN_ATTEMPTS: usize = 64;

/// Outcome of one [`Snake::tick`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SnakeStep {
    Moved,
    /// Direction is `None`; nothing moved.
    Stationary,
    /// The snake was dead at the start of the tick and has been respawned.
    /// `length` is the tail length it died with.
    Respawned { length: usize },
}

/// Mutable snake state and movement buffering behavior.
#[derive(Debug, Clone)]
pub struct Snake {
    head: GridPosition,
    /// Front is the newest segment, back the oldest. Never includes the head.
    body: VecDeque<GridPosition>,
    direction: Direction,
    pending_moves: VecDeque<Direction>,
    alive: bool,
    speed_multiplier: f32,
    energy: EnergyResource,
    just_ate: bool,
}

impl Snake {
    /// Creates a tailless snake at `head` moving along `direction` with full energy.
    #[must_use]
    pub fn new(head: GridPosition, direction: Direction, max_energy: u32) -> Self {
        Self {
            head,
            body: VecDeque::new(),
            direction,
            pending_moves: VecDeque::with_capacity(MAX_QUEUED_MOVES),
            alive: true,
            speed_multiplier: 1.0,
            energy: EnergyResource::new(max_energy),
            just_ate: false,
        }
    }

    /// Creates a snake from explicit tail segments, newest first.
    #[must_use]
    pub fn from_segments(
        head: GridPosition,
        body: Vec<GridPosition>,
        direction: Direction,
        max_energy: u32,
    ) -> Self {
        Self {
            body: VecDeque::from(body),
            ..Self::new(head, direction, max_energy)
        }
    }

    /// Creates a snake at a random spawn cell heading away from the nearest border.
    #[must_use]
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, grid: GridGeometry, max_energy: u32) -> Self {
        let (head, direction) = random_spawn(rng, grid);
        Self::new(head, direction, max_energy)
    }

    /// Buffers a direction change for a later tick.
    ///
    /// Reversals of the *current* direction and `None` are ignored, as is
    /// any request once [`MAX_QUEUED_MOVES`] are already waiting.
    pub fn set_direction(&mut self, direction: Direction) {
        if !direction_change_is_valid(self.direction, direction) {
            return;
        }
        if self.pending_moves.len() >= MAX_QUEUED_MOVES {
            return;
        }
        self.pending_moves.push_back(direction);
    }

    /// Advances the snake by one simulation step.
    ///
    /// A snake that is dead when the tick starts respawns instead of moving,
    /// avoiding cells for which `blocked` is true.
    pub fn tick<R, F>(
        &mut self,
        config: &GameConfig,
        grid: GridGeometry,
        rng: &mut R,
        blocked: F,
    ) -> SnakeStep
    where
        R: Rng + ?Sized,
        F: Fn(GridPosition) -> bool,
    {
        if let Some(next) = self.pending_moves.pop_front() {
            self.direction = next;
        }

        if !config.border_wrap && !grid.contains(self.head) {
            self.alive = false;
        }
        if self.body.contains(&self.head) {
            self.alive = false;
        }
        if self.energy.is_depleted() {
            self.alive = false;
        }

        if !self.alive {
            let length = self.body.len();
            self.respawn(rng, grid, blocked);
            return SnakeStep::Respawned { length };
        }

        if !self.direction.is_moving() {
            return SnakeStep::Stationary;
        }

        self.body.push_front(self.head);
        if self.just_ate {
            self.just_ate = false;
        } else {
            let _ = self.body.pop_back();
        }
        self.head = self.head.step(self.direction);

        if config.border_wrap {
            self.head = grid.wrap(self.head);
        } else if !grid.contains(self.head) {
            self.alive = false;
        }
        if self.body.contains(&self.head) {
            self.alive = false;
        }

        SnakeStep::Moved
    }

    /// Places the snake at a fresh spawn cell with an empty tail and full energy.
    ///
    /// The head and the first cell ahead of it avoid `blocked` when a free
    /// spot is found within [`RESPAWN_ATTEMPTS`] draws.
    pub fn respawn<R, F>(&mut self, rng: &mut R, grid: GridGeometry, blocked: F)
    where
        R: Rng + ?Sized,
        F: Fn(GridPosition) -> bool,
    {
        let mut spawn = random_spawn(rng, grid);
        for _ in 1..RESPAWN_ATTEMPTS {
            let (head, direction) = spawn;
            if !blocked(head) && !blocked(head.step(direction)) {
                break;
            }
            spawn = random_spawn(rng, grid);
        }
        let (head, direction) = spawn;
        debug!("respawning at {head:?} heading {direction:?}");

        self.head = head;
        self.direction = direction;
        self.body.clear();
        self.pending_moves.clear();
        self.energy.refill();
        self.just_ate = false;
        self.speed_multiplier = 1.0;
        self.alive = true;
    }

    /// Returns true if the head or any tail segment occupies `position`.
    #[must_use]
    pub fn occupies(&self, position: GridPosition) -> bool {
        self.head == position || self.body.contains(&position)
    }

    /// Marks the snake dead; the next tick runs the respawn path.
    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Flags that food was eaten so the next move keeps the oldest segment.
    pub fn mark_ate(&mut self) {
        self.just_ate = true;
    }

    /// Drops the oldest tail segment. Returns false when the tail was already empty.
    pub fn shrink(&mut self) -> bool {
        self.body.pop_back().is_some()
    }

    pub fn boost_speed(&mut self, increment: f32) {
        self.speed_multiplier = (self.speed_multiplier + increment).max(0.0);
    }

    #[must_use]
    pub fn head(&self) -> GridPosition {
        self.head
    }

    /// Iterates over tail segments from newest to oldest.
    pub fn body(&self) -> impl Iterator<Item = &GridPosition> {
        self.body.iter()
    }

    /// Returns the tail length (head excluded).
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Returns true when only the head is left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Directions waiting to be applied, oldest first.
    pub fn pending_moves(&self) -> impl Iterator<Item = &Direction> {
        self.pending_moves.iter()
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[must_use]
    pub fn just_ate(&self) -> bool {
        self.just_ate
    }

    #[must_use]
    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    #[must_use]
    pub fn energy(&self) -> EnergyResource {
        self.energy
    }

    pub fn energy_mut(&mut self) -> &mut EnergyResource {
        &mut self.energy
    }
}

/// Picks a cell at least [`SPAWN_BORDER_MARGIN`] from every border and the heading away from the nearest one.
fn random_spawn<R: Rng + ?Sized>(rng: &mut R, grid: GridGeometry) -> (GridPosition, Direction) {
    let col = spawn_axis(rng, grid.cols());
    let row = spawn_axis(rng, grid.rows());
    let position = GridPosition {
        col: i32::try_from(col).unwrap_or(0),
        row: i32::try_from(row).unwrap_or(0),
    };
    (position, spawn_heading(position, grid))
}

fn spawn_axis<R: Rng + ?Sized>(rng: &mut R, cells: u32) -> u32 {
    let low = SPAWN_BORDER_MARGIN.min(cells / 2);
    let high = cells.saturating_sub(SPAWN_BORDER_MARGIN).max(low);
    rng.gen_range(low..=high)
}

/// Heading for a snake spawned at `position`.
///
/// Moves along the axis whose nearest border is closer, towards the farther
/// side of that axis. Ties pick the vertical axis and, within an axis, Left/Up.
#[must_use]
pub fn spawn_heading(position: GridPosition, grid: GridGeometry) -> Direction {
    let left = i64::from(position.col);
    let right = i64::from(grid.cols()) - left;
    let top = i64::from(position.row);
    let bottom = i64::from(grid.rows()) - top;

    if left.min(right) < top.min(bottom) {
        if left < right {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if top < bottom {
        Direction::Down
    } else {
        Direction::Up
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::{spawn_heading, Snake, SnakeStep, SPAWN_BORDER_MARGIN};
    use crate::config::GameConfig;
    use crate::geometry::{GridGeometry, GridPosition};
    use crate::input::Direction;

    fn config() -> GameConfig {
        GameConfig {
            cell_size: crate::config::CellSize::Small,
            ..GameConfig::default()
        }
    }

    fn grid() -> GridGeometry {
        GridGeometry::new(800, 800, 20)
    }

    #[test]
    fn snake_moves_one_cell_per_tick_without_growing() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut snake = Snake::from_segments(
            GridPosition::new(10, 10),
            vec![
                GridPosition::new(9, 10),
                GridPosition::new(8, 10),
                GridPosition::new(7, 10),
            ],
            Direction::Right,
            100,
        );

        for _ in 0..3 {
            assert_eq!(snake.tick(&config(), grid(), &mut rng, |_| false), SnakeStep::Moved);
        }

        assert_eq!(snake.head(), GridPosition::new(13, 10));
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.body().next(), Some(&GridPosition::new(12, 10)));
    }

    #[test]
    fn growth_keeps_oldest_segment_once() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut snake = Snake::new(GridPosition::new(5, 5), Direction::Right, 100);

        snake.mark_ate();
        snake.tick(&config(), grid(), &mut rng, |_| false);
        assert_eq!(snake.len(), 1);
        assert!(!snake.just_ate());

        snake.tick(&config(), grid(), &mut rng, |_| false);
        assert_eq!(snake.len(), 1);
    }

    #[test]
    fn reversal_of_current_direction_is_ignored() {
        let mut snake = Snake::new(GridPosition::new(5, 5), Direction::Up, 100);

        snake.set_direction(Direction::Down);

        assert_eq!(snake.direction(), Direction::Up);
        assert_eq!(snake.pending_moves().count(), 0);
    }

    #[test]
    fn reversal_is_checked_against_current_not_queued_direction() {
        let mut snake = Snake::new(GridPosition::new(5, 5), Direction::Up, 100);

        snake.set_direction(Direction::Left);
        snake.set_direction(Direction::Right);

        let queued: Vec<_> = snake.pending_moves().copied().collect();
        assert_eq!(queued, vec![Direction::Left, Direction::Right]);
    }

    #[test]
    fn queue_keeps_oldest_three_moves() {
        let mut snake = Snake::new(GridPosition::new(5, 5), Direction::Up, 100);

        for direction in [
            Direction::Left,
            Direction::Up,
            Direction::Right,
            Direction::Left,
            Direction::Up,
        ] {
            snake.set_direction(direction);
        }

        let queued: Vec<_> = snake.pending_moves().copied().collect();
        assert_eq!(
            queued,
            vec![Direction::Left, Direction::Up, Direction::Right]
        );
    }

    #[test]
    fn queued_moves_apply_one_per_tick() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut snake = Snake::new(GridPosition::new(5, 5), Direction::Down, 100);

        snake.set_direction(Direction::Right);
        snake.tick(&config(), grid(), &mut rng, |_| false);
        assert_eq!(snake.head(), GridPosition::new(6, 5));

        snake.set_direction(Direction::Up);
        snake.tick(&config(), grid(), &mut rng, |_| false);
        assert_eq!(snake.head(), GridPosition::new(6, 4));
    }

    #[test]
    fn reversal_stays_rejected_behind_a_queued_turn() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut snake = Snake::new(GridPosition::new(5, 5), Direction::Down, 100);

        snake.set_direction(Direction::Right);
        snake.set_direction(Direction::Up);

        let queued: Vec<_> = snake.pending_moves().copied().collect();
        assert_eq!(queued, vec![Direction::Right]);

        snake.tick(&config(), grid(), &mut rng, |_| false);
        snake.tick(&config(), grid(), &mut rng, |_| false);
        assert_eq!(snake.head(), GridPosition::new(7, 5));
        assert_eq!(snake.direction(), Direction::Right);
    }

    #[test]
    fn leaving_grid_marks_dead_then_respawns() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut snake = Snake::from_segments(
            GridPosition::new(0, 3),
            vec![GridPosition::new(1, 3)],
            Direction::Left,
            100,
        );

        assert_eq!(snake.tick(&config(), grid(), &mut rng, |_| false), SnakeStep::Moved);
        assert_eq!(snake.head(), GridPosition::new(-1, 3));
        assert!(!snake.is_alive());

        assert_eq!(
            snake.tick(&config(), grid(), &mut rng, |_| false),
            SnakeStep::Respawned { length: 1 }
        );
        assert!(snake.is_alive());
        assert!(snake.is_empty());
        assert!(grid().contains(snake.head()));
    }

    #[test]
    fn wrap_mode_reenters_from_opposite_side() {
        let mut rng = StdRng::seed_from_u64(5);
        let config = GameConfig {
            border_wrap: true,
            ..config()
        };
        let mut snake = Snake::new(GridPosition::new(0, 3), Direction::Left, 100);

        snake.tick(&config, grid(), &mut rng, |_| false);

        assert!(snake.is_alive());
        assert_eq!(snake.head(), GridPosition::new(39, 3));
    }

    #[test]
    fn biting_tail_marks_dead() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut snake = Snake::from_segments(
            GridPosition::new(2, 2),
            vec![
                GridPosition::new(1, 2),
                GridPosition::new(1, 3),
                GridPosition::new(2, 3),
                GridPosition::new(3, 3),
                GridPosition::new(3, 2),
            ],
            Direction::Right,
            100,
        );
        snake.set_direction(Direction::Down);

        snake.tick(&config(), grid(), &mut rng, |_| false);

        assert_eq!(snake.head(), GridPosition::new(2, 3));
        assert!(!snake.is_alive());
    }

    #[test]
    fn chasing_own_tail_is_legal() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut snake = Snake::from_segments(
            GridPosition::new(2, 2),
            vec![
                GridPosition::new(2, 3),
                GridPosition::new(3, 3),
                GridPosition::new(3, 2),
            ],
            Direction::Up,
            100,
        );
        snake.set_direction(Direction::Right);

        snake.tick(&config(), grid(), &mut rng, |_| false);

        assert_eq!(snake.head(), GridPosition::new(3, 2));
        assert!(snake.is_alive());
    }

    #[test]
    fn depleted_energy_respawns_with_full_energy() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut snake = Snake::from_segments(
            GridPosition::new(10, 10),
            vec![GridPosition::new(9, 10)],
            Direction::Right,
            100,
        );
        snake.boost_speed(0.5);
        snake.energy_mut().decrease(100);

        let step = snake.tick(&config(), grid(), &mut rng, |_| false);

        assert_eq!(step, SnakeStep::Respawned { length: 1 });
        assert_eq!(snake.energy().value(), snake.energy().max());
        assert!(snake.is_empty());
        assert!((snake.speed_multiplier() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn stationary_snake_does_not_move() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut snake = Snake::new(GridPosition::new(4, 4), Direction::None, 100);

        assert_eq!(
            snake.tick(&config(), grid(), &mut rng, |_| false),
            SnakeStep::Stationary
        );
        assert_eq!(snake.head(), GridPosition::new(4, 4));
    }

    #[test]
    fn respawn_avoids_blocked_cells() {
        let mut rng = StdRng::seed_from_u64(11);
        let grid = GridGeometry::new(140, 140, 20);
        let free = GridPosition::new(3, 2);
        let mut snake = Snake::new(GridPosition::new(0, 0), Direction::Up, 100);
        snake.kill();

        for _ in 0..20 {
            snake.respawn(&mut rng, grid, |cell| cell.col != free.col || cell.row < 2);
            assert!(snake.is_alive());
            assert_eq!(snake.head().col, free.col);
        }
    }

    #[test]
    fn spawn_heading_points_away_from_nearest_border() {
        let grid = grid();

        assert_eq!(
            spawn_heading(GridPosition::new(2, 20), grid),
            Direction::Right
        );
        assert_eq!(
            spawn_heading(GridPosition::new(37, 20), grid),
            Direction::Left
        );
        assert_eq!(spawn_heading(GridPosition::new(20, 3), grid), Direction::Down);
        assert_eq!(spawn_heading(GridPosition::new(20, 36), grid), Direction::Up);
    }

    #[test]
    fn spawn_heading_ties_prefer_vertical_then_up() {
        let grid = grid();

        assert_eq!(spawn_heading(GridPosition::new(3, 3), grid), Direction::Down);
        assert_eq!(spawn_heading(GridPosition::new(20, 20), grid), Direction::Up);
    }

    #[test]
    fn spawn_respects_border_margin() {
        let mut rng = StdRng::seed_from_u64(10);
        let grid = grid();
        let margin = i32::try_from(SPAWN_BORDER_MARGIN).unwrap();

        for _ in 0..200 {
            let snake = Snake::spawn(&mut rng, grid, 100);
            let head = snake.head();
            assert!(head.col >= margin && head.col <= 40 - margin);
            assert!(head.row >= margin && head.row <= 40 - margin);
            assert_eq!(snake.direction(), spawn_heading(head, grid));
        }
    }
}
