//! Ship definitions, placed ships with damage tracking, and fleets.

use alloc::vec::Vec;
use core::fmt;

use super::common::Position;

/// Identity color of a ship. Each fleet holds exactly one ship per color, so
/// the color doubles as the ship's key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum ShipColor {
    Red,
    Blue,
    Orange,
    Purple,
    Yellow,
}

impl ShipColor {
    /// Display color as an `(r, g, b)` triple.
    pub const fn rgb(self) -> (u8, u8, u8) {
        match self {
            ShipColor::Red => (180, 0, 0),
            ShipColor::Blue => (23, 168, 208),
            ShipColor::Orange => (238, 146, 17),
            ShipColor::Purple => (105, 105, 157),
            ShipColor::Yellow => (188, 188, 93),
        }
    }
}

impl fmt::Display for ShipColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShipColor::Red => "red",
            ShipColor::Blue => "blue",
            ShipColor::Orange => "orange",
            ShipColor::Purple => "purple",
            ShipColor::Yellow => "yellow",
        };
        f.write_str(name)
    }
}

/// Type of ship: color and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShipDef {
    color: ShipColor,
    length: usize,
}

impl ShipDef {
    pub const fn new(color: ShipColor, length: usize) -> Self {
        Self { color, length }
    }

    pub fn color(&self) -> ShipColor {
        self.color
    }

    pub const fn length(&self) -> usize {
        self.length
    }
}

/// A ship laid out on a player's grid.
///
/// Positions are fixed once placed. Damage only grows, and the ship is
/// destroyed exactly when every position is damaged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ship {
    def: ShipDef,
    positions: Vec<Position>,
    damaged: Vec<Position>,
    destroyed: bool,
}

impl Ship {
    /// Wrap a placement produced for `def`. The placement must hold exactly
    /// `def.length()` distinct cells.
    pub(crate) fn new(def: ShipDef, positions: Vec<Position>) -> Self {
        debug_assert_eq!(positions.len(), def.length());
        Self {
            def,
            positions,
            damaged: Vec::new(),
            destroyed: false,
        }
    }

    pub fn color(&self) -> ShipColor {
        self.def.color()
    }

    pub fn length(&self) -> usize {
        self.def.length()
    }

    /// Cells in placement order, starting at the start cell.
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Damaged cells in the order they were hit.
    pub fn damaged_positions(&self) -> &[Position] {
        &self.damaged
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn occupies(&self, pos: Position) -> bool {
        self.positions.contains(&pos)
    }

    pub fn is_damaged_at(&self, pos: Position) -> bool {
        self.damaged.contains(&pos)
    }

    /// Mark `pos` as damaged. Returns `true` if this hit destroyed the ship.
    pub(crate) fn record_hit(&mut self, pos: Position) -> bool {
        if !self.occupies(pos) || self.is_damaged_at(pos) {
            return false;
        }
        self.damaged.push(pos);
        if self.damaged.len() == self.length() {
            self.destroyed = true;
            return true;
        }
        false
    }
}

/// The full set of ships owned by one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fleet {
    ships: Vec<Ship>,
}

impl Fleet {
    pub(crate) fn new(ships: Vec<Ship>) -> Self {
        Self { ships }
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub(crate) fn ships_mut(&mut self) -> &mut [Ship] {
        &mut self.ships
    }

    pub fn ship(&self, color: ShipColor) -> Option<&Ship> {
        self.ships.iter().find(|s| s.color() == color)
    }

    /// Ship covering `pos`, if any.
    pub fn ship_at(&self, pos: Position) -> Option<&Ship> {
        self.ships.iter().find(|s| s.occupies(pos))
    }

    /// Every occupied cell across the fleet.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.ships.iter().flat_map(|s| s.positions().iter().copied())
    }

    /// Number of ships not yet destroyed.
    pub fn ships_remaining(&self) -> usize {
        self.ships.iter().filter(|s| !s.is_destroyed()).count()
    }

    pub fn all_destroyed(&self) -> bool {
        self.ships.iter().all(Ship::is_destroyed)
    }
}
