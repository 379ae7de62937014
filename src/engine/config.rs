use super::grid::Grid;
use super::ship::{ShipColor, ShipDef};

/// Playable area. Coordinates are 1-indexed on both axes.
pub const GRID: Grid = Grid::new(10, 10);

/// Number of seats in a session; a game runs only when all are taken.
pub const PLAYERS_NEEDED: usize = 2;

pub const NUM_SHIPS: usize = 5;

/// Fleet handed to every player, in placement order.
pub const FLEET: [ShipDef; NUM_SHIPS] = [
    ShipDef::new(ShipColor::Red, 6),
    ShipDef::new(ShipColor::Blue, 5),
    ShipDef::new(ShipColor::Orange, 4),
    ShipDef::new(ShipColor::Purple, 3),
    ShipDef::new(ShipColor::Yellow, 2),
];

/// Total number of ship segments in one fleet.
pub const TOTAL_SHIP_CELLS: usize = fleet_cells(&FLEET);

const fn fleet_cells(defs: &[ShipDef]) -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < defs.len() {
        total += defs[i].length();
        i += 1;
    }
    total
}

/// Upper bound on start/direction draws for a single ship before placement
/// gives up.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 10_000;

pub const WAITING_MESSAGE: &str = "Waiting for opponent...";
