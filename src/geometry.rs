use crate::input::Direction;

/// Grid position in logical cell coordinates.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct GridPosition {
    pub col: i32,
    pub row: i32,
}

impl GridPosition {
    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Returns the neighbouring cell one step along `direction`.
    #[must_use]
    pub fn step(self, direction: Direction) -> Self {
        let (dc, dr) = direction.delta();
        Self {
            col: self.col + dc,
            row: self.row + dr,
        }
    }
}

/// Position in arena pixels, as handed to the presentation layer.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct PixelPosition {
    pub x: i64,
    pub y: i64,
}

/// Conversion between pixel and cell coordinates for one cell size.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct GridGeometry {
    cell_size: u32,
    cols: u32,
    rows: u32,
}

impl GridGeometry {
    /// Builds the grid that fits in a `width_px` × `height_px` arena.
    ///
    /// Partial cells at the right/bottom edges are not part of the grid.
    #[must_use]
    pub fn new(width_px: u32, height_px: u32, cell_size: u32) -> Self {
        let cell_size = cell_size.max(1);
        Self {
            cell_size,
            cols: width_px / cell_size,
            rows: height_px / cell_size,
        }
    }

    #[must_use]
    pub fn cell_size(self) -> u32 {
        self.cell_size
    }

    #[must_use]
    pub fn cols(self) -> u32 {
        self.cols
    }

    #[must_use]
    pub fn rows(self) -> u32 {
        self.rows
    }

    /// Returns the total number of cells in the grid.
    #[must_use]
    pub fn cell_count(self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Returns the top-left pixel of `position`.
    #[must_use]
    pub fn to_pixel(self, position: GridPosition) -> PixelPosition {
        PixelPosition {
            x: i64::from(position.col) * i64::from(self.cell_size),
            y: i64::from(position.row) * i64::from(self.cell_size),
        }
    }

    /// Returns the pixel at the centre of `position`.
    #[must_use]
    pub fn cell_center(self, position: GridPosition) -> PixelPosition {
        let corner = self.to_pixel(position);
        let half = i64::from(self.cell_size / 2);
        PixelPosition {
            x: corner.x + half,
            y: corner.y + half,
        }
    }

    /// Returns the cell containing `pixel`, flooring towards negative infinity.
    #[must_use]
    pub fn to_cell(self, pixel: PixelPosition) -> GridPosition {
        let size = i64::from(self.cell_size);
        GridPosition {
            col: saturate(pixel.x.div_euclid(size)),
            row: saturate(pixel.y.div_euclid(size)),
        }
    }

    /// Returns true when the position lies inside the grid.
    #[must_use]
    pub fn contains(self, position: GridPosition) -> bool {
        position.col >= 0
            && position.row >= 0
            && i64::from(position.col) < i64::from(self.cols)
            && i64::from(position.row) < i64::from(self.rows)
    }

    /// Returns this position wrapped into the grid on both axes.
    #[must_use]
    pub fn wrap(self, position: GridPosition) -> GridPosition {
        GridPosition {
            col: wrap_axis(position.col, self.cols),
            row: wrap_axis(position.row, self.rows),
        }
    }

    /// Iterates over every cell in row-major order.
    pub fn cells(self) -> impl Iterator<Item = GridPosition> {
        let cols = saturate(i64::from(self.cols));
        let rows = saturate(i64::from(self.rows));
        (0..rows).flat_map(move |row| (0..cols).map(move |col| GridPosition { col, row }))
    }
}

fn wrap_axis(value: i32, upper_bound: u32) -> i32 {
    if upper_bound == 0 {
        return 0;
    }
    let upper = i64::from(upper_bound);
    saturate(i64::from(value).rem_euclid(upper))
}

fn saturate(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

#[cfg(test)]
mod tests {
    use super::{GridGeometry, GridPosition, PixelPosition};
    use crate::input::Direction;

    #[test]
    fn default_arena_has_forty_cells_per_side() {
        let grid = GridGeometry::new(800, 800, 20);

        assert_eq!(grid.cols(), 40);
        assert_eq!(grid.rows(), 40);
        assert_eq!(grid.cell_count(), 1600);
    }

    #[test]
    fn pixel_and_cell_conversion_agree() {
        let grid = GridGeometry::new(800, 800, 20);

        let cell = grid.to_cell(PixelPosition { x: 100, y: 119 });
        assert_eq!(cell, GridPosition::new(5, 5));
        assert_eq!(grid.to_pixel(cell), PixelPosition { x: 100, y: 100 });
        assert_eq!(grid.cell_center(cell), PixelPosition { x: 110, y: 110 });
    }

    #[test]
    fn negative_pixels_floor_to_negative_cells() {
        let grid = GridGeometry::new(800, 800, 20);

        let cell = grid.to_cell(PixelPosition { x: -20, y: 0 });

        assert_eq!(cell, GridPosition::new(-1, 0));
        assert!(!grid.contains(cell));
    }

    #[test]
    fn wrapping_keeps_coordinates_inside_bounds() {
        let grid = GridGeometry::new(200, 160, 20);

        assert_eq!(grid.wrap(GridPosition::new(-1, 3)), GridPosition::new(9, 3));
        assert_eq!(grid.wrap(GridPosition::new(4, 8)), GridPosition::new(4, 0));
    }

    #[test]
    fn step_moves_one_cell() {
        let origin = GridPosition::new(3, 3);

        assert_eq!(origin.step(Direction::Up), GridPosition::new(3, 2));
        assert_eq!(origin.step(Direction::Right), GridPosition::new(4, 3));
        assert_eq!(origin.step(Direction::None), origin);
    }

    #[test]
    fn cells_cover_whole_grid_once() {
        let grid = GridGeometry::new(60, 40, 20);
        let cells: Vec<_> = grid.cells().collect();

        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], GridPosition::new(0, 0));
        assert_eq!(cells[5], GridPosition::new(2, 1));
    }
}
