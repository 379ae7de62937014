//! Grid bounds and coordinate translation used while laying out ships.

use super::common::{Direction, Position};

/// Size of the playable area. Valid cells are `1..=width` by `1..=height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
}

impl Grid {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Number of cells on the grid.
    pub fn cells(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }

    /// Returns `true` if `pos` lies on the grid on both axes.
    pub fn contains(&self, pos: Position) -> bool {
        (1..=self.width).contains(&pos.x) && (1..=self.height).contains(&pos.y)
    }

    /// Checks only the leading edge for `direction`: a ship growing upwards
    /// can only leave through the top, so only `y >= 1` is tested, and so on.
    /// Callers stepping one cell at a time from an on-grid start never need
    /// the other three edges.
    pub fn in_bounds(&self, pos: Position, direction: Direction) -> bool {
        match direction {
            Direction::Up => pos.y >= 1,
            Direction::Left => pos.x >= 1,
            Direction::Down => pos.y <= self.height,
            Direction::Right => pos.x <= self.width,
        }
    }
}

/// Translate `start` by `offset` cells along `direction`.
pub fn extend(start: Position, direction: Direction, offset: i32) -> Position {
    let (dx, dy) = direction.delta();
    Position::new(start.x + dx * offset, start.y + dy * offset)
}
