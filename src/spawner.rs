use log::warn;
use rand::Rng;
use thiserror::Error;

use crate::geometry::{GridGeometry, GridPosition};

/// Raised when no free cell is left for an entity.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum SpawnError {
    #[error("no free cell left on the {cols}x{rows} grid")]
    Saturated { cols: u32, rows: u32 },
}

/// Stateless generator of grid-aligned random positions.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct FoodSpawner {
    grid: GridGeometry,
    retry_cap: u32,
}

impl FoodSpawner {
    #[must_use]
    pub fn new(grid: GridGeometry, retry_cap: u32) -> Self {
        Self { grid, retry_cap }
    }

    /// Draws a uniformly random cell for which `forbidden` is false.
    ///
    /// Samples at most `retry_cap` times, then scans every cell and picks
    /// uniformly among the free ones.
    pub fn spawn<R, F>(&self, rng: &mut R, forbidden: F) -> Result<GridPosition, SpawnError>
    where
        R: Rng + ?Sized,
        F: Fn(GridPosition) -> bool,
    {
        let saturated = SpawnError::Saturated {
            cols: self.grid.cols(),
            rows: self.grid.rows(),
        };
        if self.grid.cell_count() == 0 {
            return Err(saturated);
        }

        for _ in 0..self.retry_cap {
            let candidate = self.random_cell(rng);
            if !forbidden(candidate) {
                return Ok(candidate);
            }
        }

        warn!(
            "spawn sampling exceeded {} attempts, scanning free cells",
            self.retry_cap
        );
        let candidates: Vec<GridPosition> =
            self.grid.cells().filter(|cell| !forbidden(*cell)).collect();
        if candidates.is_empty() {
            return Err(saturated);
        }

        let index = rng.gen_range(0..candidates.len());
        Ok(candidates[index])
    }

    /// Draws any cell of the grid, ignoring occupancy.
    pub fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> GridPosition {
        let col = rng.gen_range(0..self.grid.cols());
        let row = rng.gen_range(0..self.grid.rows());
        GridPosition {
            col: i32::try_from(col).unwrap_or(i32::MAX),
            row: i32::try_from(row).unwrap_or(i32::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::{FoodSpawner, SpawnError};
    use crate::geometry::{GridGeometry, GridPosition};

    #[test]
    fn spawn_never_returns_forbidden_cell() {
        let mut rng = StdRng::seed_from_u64(7);
        let grid = GridGeometry::new(160, 120, 20);
        let spawner = FoodSpawner::new(grid, 1_000);
        let taken: HashSet<_> = (0..8).map(|col| GridPosition::new(col, 0)).collect();

        for _ in 0..200 {
            let position = spawner
                .spawn(&mut rng, |cell| taken.contains(&cell))
                .expect("grid has free cells");
            assert!(grid.contains(position));
            assert!(!taken.contains(&position));
        }
    }

    #[test]
    fn exhausted_retries_fall_back_to_scan() {
        let mut rng = StdRng::seed_from_u64(11);
        let grid = GridGeometry::new(100, 100, 20);
        let spawner = FoodSpawner::new(grid, 0);
        let free = GridPosition::new(3, 4);

        let position = spawner
            .spawn(&mut rng, |cell| cell != free)
            .expect("one cell is free");

        assert_eq!(position, free);
    }

    #[test]
    fn saturated_grid_reports_error() {
        let mut rng = StdRng::seed_from_u64(3);
        let spawner = FoodSpawner::new(GridGeometry::new(100, 100, 20), 10);

        let result = spawner.spawn(&mut rng, |_| true);

        assert_eq!(result, Err(SpawnError::Saturated { cols: 5, rows: 5 }));
    }
}
