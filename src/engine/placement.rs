//! Random, non-overlapping fleet layout by rejection sampling.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use rand::Rng;

use super::common::{Direction, PlacementError, Position};
use super::config::MAX_PLACEMENT_ATTEMPTS;
use super::grid::{extend, Grid};
use super::ship::{Fleet, Ship, ShipDef};

/// Reject grids that can never hold `fleet`, so generation cannot spin on an
/// impossible layout.
pub fn validate_layout(grid: Grid, fleet: &[ShipDef]) -> Result<(), PlacementError> {
    let longest = fleet.iter().map(ShipDef::length).max().unwrap_or(0);
    let total: usize = fleet.iter().map(ShipDef::length).sum();
    let span = grid.width.max(grid.height).max(0) as usize;
    if grid.width < 1 || grid.height < 1 || longest > span || total > grid.cells() {
        return Err(PlacementError::GridTooSmall {
            width: grid.width,
            height: grid.height,
            length: longest,
        });
    }
    Ok(())
}

/// Choose cells for one ship of `def`'s length.
///
/// Each attempt draws a start cell and a direction uniformly. The attempt is
/// thrown away if the start is taken, or if any further cell leaves the grid
/// or lands on a taken cell. Returned cells are ordered from the start cell.
pub fn place<R: Rng>(
    rng: &mut R,
    grid: Grid,
    def: ShipDef,
    taken: &BTreeSet<Position>,
) -> Result<Vec<Position>, PlacementError> {
    let length = def.length();
    if grid.width < 1 || grid.height < 1 {
        return Err(PlacementError::GridTooSmall {
            width: grid.width,
            height: grid.height,
            length,
        });
    }
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let start = Position::new(
            rng.random_range(1..=grid.width),
            rng.random_range(1..=grid.height),
        );
        let direction = Direction::ALL[rng.random_range(0..Direction::ALL.len())];
        if taken.contains(&start) {
            continue;
        }
        let fits = (1..length as i32).all(|offset| {
            let pos = extend(start, direction, offset);
            grid.in_bounds(pos, direction) && !taken.contains(&pos)
        });
        if fits {
            return Ok((0..length as i32)
                .map(|offset| extend(start, direction, offset))
                .collect());
        }
    }
    Err(PlacementError::AttemptsExhausted {
        length,
        attempts: MAX_PLACEMENT_ATTEMPTS,
    })
}

/// Lay out a whole fleet for one player. Ships are placed in the order given
/// and never overlap each other; the taken set lives only for this call.
pub fn generate_fleet<R: Rng>(
    rng: &mut R,
    grid: Grid,
    defs: &[ShipDef],
) -> Result<Fleet, PlacementError> {
    validate_layout(grid, defs)?;
    let mut taken = BTreeSet::new();
    let mut ships = Vec::with_capacity(defs.len());
    for def in defs {
        let positions = place(rng, grid, *def, &taken)?;
        taken.extend(positions.iter().copied());
        ships.push(Ship::new(*def, positions));
    }
    Ok(Fleet::new(ships))
}
