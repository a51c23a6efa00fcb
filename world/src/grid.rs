//! Immutable tile classification for a level.

use collie_defence_core::{ConfigError, GridTileType, Rect};
use glam::Vec2;

/// Fixed-size lookup classifying each cell of a level.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cell_size: f32,
    origin: Vec2,
    cells: Vec<GridTileType>,
}

impl Grid {
    /// Creates a grid from row-major cells.
    pub fn new(
        columns: u32,
        rows: u32,
        cell_size: f32,
        origin: Vec2,
        cells: Vec<GridTileType>,
    ) -> Result<Self, ConfigError> {
        if columns == 0 || rows == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(ConfigError::NonPositiveCellSize);
        }
        if !origin.is_finite() {
            return Err(ConfigError::NonFiniteOrigin);
        }

        let expected = columns as usize * rows as usize;
        if cells.len() != expected {
            return Err(ConfigError::GridSizeMismatch {
                expected,
                actual: cells.len(),
            });
        }

        Ok(Self {
            columns,
            rows,
            cell_size,
            origin,
            cells,
        })
    }

    /// Classifies the cell containing `point`. Points outside the grid are blocked.
    #[must_use]
    pub fn classify(&self, point: Vec2) -> GridTileType {
        self.cell_of(point)
            .map_or(GridTileType::Blocked, |(column, row)| self.cell(column, row))
    }

    /// Classifies the cell at `column`, `row`.
    #[must_use]
    pub fn cell(&self, column: u32, row: u32) -> GridTileType {
        self.index(column, row)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(GridTileType::Blocked)
    }

    /// Reports whether every cell touched by `region` is buildable.
    #[must_use]
    pub fn is_region_buildable(&self, region: &Rect) -> bool {
        let local_min = (region.min() - self.origin) / self.cell_size;
        let local_max = (region.max() - self.origin) / self.cell_size;
        if local_min.x < 0.0 || local_min.y < 0.0 {
            return false;
        }

        let first_column = local_min.x.floor() as u32;
        let first_row = local_min.y.floor() as u32;
        let last_column = (local_max.x.ceil() as u32).saturating_sub(1).max(first_column);
        let last_row = (local_max.y.ceil() as u32).saturating_sub(1).max(first_row);
        if last_column >= self.columns || last_row >= self.rows {
            return false;
        }

        (first_row..=last_row).all(|row| {
            (first_column..=last_column)
                .all(|column| self.cell(column, row) == GridTileType::Buildable)
        })
    }

    /// World-space rectangle covered by the grid.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        let size = Vec2::new(self.columns as f32, self.rows as f32) * self.cell_size;
        Rect::from_corners(self.origin, self.origin + size)
    }

    /// Number of columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World position of the grid's upper-left corner.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    fn cell_of(&self, point: Vec2) -> Option<(u32, u32)> {
        let local = (point - self.origin) / self.cell_size;
        if !local.is_finite() || local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let column = local.x.floor() as u32;
        let row = local.y.floor() as u32;
        (column < self.columns && row < self.rows).then_some((column, row))
    }

    fn index(&self, column: u32, row: u32) -> Option<usize> {
        if column < self.columns && row < self.rows {
            Some(row as usize * self.columns as usize + column as usize)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 4x3 grid of 8-unit cells:
    //   B B B X
    //   P P P P
    //   B B X B
    fn sample_grid() -> Grid {
        use GridTileType::{Blocked as X, Buildable as B, Path as P};
        Grid::new(
            4,
            3,
            8.0,
            Vec2::ZERO,
            vec![B, B, B, X, P, P, P, P, B, B, X, B],
        )
        .expect("valid grid")
    }

    #[test]
    fn classify_maps_points_to_cells() {
        let grid = sample_grid();
        assert_eq!(grid.classify(Vec2::new(0.0, 0.0)), GridTileType::Buildable);
        assert_eq!(grid.classify(Vec2::new(7.9, 8.0)), GridTileType::Path);
        assert_eq!(grid.classify(Vec2::new(25.0, 2.0)), GridTileType::Blocked);
    }

    #[test]
    fn points_outside_grid_are_blocked() {
        let grid = sample_grid();
        assert_eq!(grid.classify(Vec2::new(-0.1, 4.0)), GridTileType::Blocked);
        assert_eq!(grid.classify(Vec2::new(32.0, 4.0)), GridTileType::Blocked);
        assert_eq!(grid.classify(Vec2::new(4.0, 24.0)), GridTileType::Blocked);
    }

    #[test]
    fn region_buildable_checks_every_covered_cell() {
        let grid = sample_grid();
        let two_by_one = Rect::from_corners(Vec2::new(0.0, 0.0), Vec2::new(16.0, 8.0));
        let touches_path = Rect::from_corners(Vec2::new(0.0, 0.0), Vec2::new(16.0, 16.0));
        let touches_blocked = Rect::from_corners(Vec2::new(16.0, 0.0), Vec2::new(32.0, 8.0));
        let outside = Rect::from_corners(Vec2::new(-8.0, 0.0), Vec2::new(8.0, 8.0));

        assert!(grid.is_region_buildable(&two_by_one));
        assert!(!grid.is_region_buildable(&touches_path));
        assert!(!grid.is_region_buildable(&touches_blocked));
        assert!(!grid.is_region_buildable(&outside));
    }

    #[test]
    fn mismatched_cell_count_is_rejected() {
        let error = Grid::new(2, 2, 8.0, Vec2::ZERO, vec![GridTileType::Path; 3])
            .expect_err("mismatch must fail");
        assert_eq!(
            error,
            ConfigError::GridSizeMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn zero_cell_size_is_rejected() {
        let error = Grid::new(1, 1, 0.0, Vec2::ZERO, vec![GridTileType::Path])
            .expect_err("zero cell size must fail");
        assert_eq!(error, ConfigError::NonPositiveCellSize);
    }

    #[test]
    fn non_finite_origin_is_rejected() {
        let origin = Vec2::new(f32::INFINITY, 0.0);
        let error = Grid::new(1, 1, 8.0, origin, vec![GridTileType::Path])
            .expect_err("infinite origin must fail");
        assert_eq!(error, ConfigError::NonFiniteOrigin);
    }
}
