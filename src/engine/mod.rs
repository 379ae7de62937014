//! Server-authoritative battleship rules (no_std compatible).
//!
//! This module holds the game logic only: grid geometry, fleet placement,
//! the session state machine and the events it emits. It needs `alloc` and
//! `rand`, nothing else, and never performs I/O.

pub mod common;
pub mod config;
pub mod events;
pub mod grid;
mod lifecycle;
pub mod placement;
mod resolver;
pub mod session;
pub mod ship;

pub use common::{Direction, JoinError, PlacementError, PlayerId, Position, ShotError};
pub use config::*;
pub use events::{Dispatch, ServerEvent, ShotReport};
pub use grid::{extend, Grid};
pub use placement::{generate_fleet, place, validate_layout};
pub use session::{Phase, Seat, Session};
pub use ship::{Fleet, Ship, ShipColor, ShipDef};
