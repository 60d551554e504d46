use log::warn;
use rand::Rng;

use crate::config::{CellSize, Rgb};
use crate::geometry::GridPosition;
use crate::spawner::FoodSpawner;

/// Static single-cell obstacle.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Obstacle {
    pub position: GridPosition,
    pub color: Rgb,
}

/// Fixed set of obstacles generated for one cell size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
    cell_size: CellSize,
}

impl ObstacleField {
    /// Creates a field with no obstacles.
    #[must_use]
    pub fn empty(cell_size: CellSize) -> Self {
        Self {
            obstacles: Vec::new(),
            cell_size,
        }
    }

    /// Creates a field from explicit obstacle cells.
    #[must_use]
    pub fn from_positions(
        positions: impl IntoIterator<Item = GridPosition>,
        cell_size: CellSize,
        color: Rgb,
    ) -> Self {
        Self {
            obstacles: positions
                .into_iter()
                .map(|position| Obstacle { position, color })
                .collect(),
            cell_size,
        }
    }

    /// Places up to `count` obstacles on cells where `forbidden` is false,
    /// never two on the same cell.
    ///
    /// Stops early, with a warning, when the grid runs out of free cells.
    #[must_use]
    pub fn generate<R, F>(
        count: usize,
        spawner: &FoodSpawner,
        rng: &mut R,
        cell_size: CellSize,
        color: Rgb,
        forbidden: F,
    ) -> Self
    where
        R: Rng + ?Sized,
        F: Fn(GridPosition) -> bool,
    {
        let mut field = Self::empty(cell_size);

        for _ in 0..count {
            let placed = spawner.spawn(rng, |cell| forbidden(cell) || field.contains(cell));
            match placed {
                Ok(position) => field.obstacles.push(Obstacle { position, color }),
                Err(error) => {
                    warn!("placed {} of {count} obstacles: {error}", field.len());
                    break;
                }
            }
        }

        field
    }

    /// Returns true when an obstacle sits on `position`.
    #[must_use]
    pub fn contains(&self, position: GridPosition) -> bool {
        self.obstacles
            .iter()
            .any(|obstacle| obstacle.position == position)
    }

    /// Returns true when a head at `head` hits an obstacle.
    #[must_use]
    pub fn collides(&self, head: GridPosition) -> bool {
        self.contains(head)
    }

    #[must_use]
    pub fn cell_size(&self) -> CellSize {
        self.cell_size
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::ObstacleField;
    use crate::config::{CellSize, Rgb};
    use crate::geometry::{GridGeometry, GridPosition};
    use crate::spawner::FoodSpawner;

    const COLOR: Rgb = Rgb::new(1, 2, 3);

    #[test]
    fn obstacles_avoid_forbidden_cells_and_each_other() {
        let mut rng = StdRng::seed_from_u64(21);
        let spawner = FoodSpawner::new(GridGeometry::new(100, 100, 20), 1_000);
        let snake_cell = GridPosition::new(2, 2);

        let field = ObstacleField::generate(
            20,
            &spawner,
            &mut rng,
            CellSize::Small,
            COLOR,
            |cell| cell == snake_cell,
        );

        let unique: HashSet<_> = field.iter().map(|obstacle| obstacle.position).collect();
        assert_eq!(field.len(), 20);
        assert_eq!(unique.len(), 20);
        assert!(!field.contains(snake_cell));
    }

    #[test]
    fn generation_stops_when_grid_is_full() {
        let mut rng = StdRng::seed_from_u64(22);
        let spawner = FoodSpawner::new(GridGeometry::new(100, 100, 20), 50);

        let field =
            ObstacleField::generate(30, &spawner, &mut rng, CellSize::Small, COLOR, |_| false);

        assert_eq!(field.len(), 25);
    }

    #[test]
    fn head_on_obstacle_collides() {
        let field = ObstacleField::from_positions(
            [GridPosition::new(4, 4)],
            CellSize::Medium,
            COLOR,
        );

        assert!(field.collides(GridPosition::new(4, 4)));
        assert!(!field.collides(GridPosition::new(4, 5)));
    }
}
