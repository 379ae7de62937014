//! Common types for the engine: coordinates, directions, player identity and
//! the error enums returned by placement, seating and shot resolution.

use core::fmt;

/// A cell on the grid. Both axes start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Direction a ship extends in from its start cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Left,
    Down,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    /// Unit step `(dx, dy)`. Up decreases `y`.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Down => (0, 1),
            Direction::Right => (1, 0),
        }
    }
}

/// Identity of a connected player, assigned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

/// Expected, recoverable reasons a shot is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum ShotError {
    /// Shooter does not hold the turn, or no turn is set.
    NotYourTurn,
    /// Shooter has nobody to shoot at.
    NoOpponent,
    /// Target lies outside the grid.
    OutOfBounds,
    /// Target is an already damaged ship segment; the shooter keeps the turn.
    AlreadyShot,
}

impl fmt::Display for ShotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShotError::NotYourTurn => write!(f, "It is not your turn"),
            ShotError::NoOpponent => write!(f, "No opponent to shoot at"),
            ShotError::OutOfBounds => write!(f, "Shot lies outside the grid"),
            ShotError::AlreadyShot => write!(f, "Position was already hit"),
        }
    }
}

/// Configuration errors raised before a game can start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    /// The grid cannot hold the fleet at all.
    GridTooSmall { width: i32, height: i32, length: usize },
    /// Rejection sampling did not find a free slot in time.
    AttemptsExhausted { length: usize, attempts: usize },
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::GridTooSmall {
                width,
                height,
                length,
            } => write!(
                f,
                "A {}x{} grid cannot hold a fleet with a ship of length {}",
                width, height, length
            ),
            PlacementError::AttemptsExhausted { length, attempts } => write!(
                f,
                "Unable to place ship of length {} after {} attempts",
                length, attempts
            ),
        }
    }
}

/// Reasons a join is refused or could not start the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinError {
    /// Both seats are taken.
    SessionFull,
    /// This identity is already seated.
    AlreadySeated,
    /// The join completed the session but fleets could not be generated.
    Placement(PlacementError),
}

impl From<PlacementError> for JoinError {
    fn from(err: PlacementError) -> Self {
        JoinError::Placement(err)
    }
}

impl fmt::Display for JoinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinError::SessionFull => write!(f, "Session already has two players"),
            JoinError::AlreadySeated => write!(f, "Player is already seated"),
            JoinError::Placement(e) => write!(f, "Placement error: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ShotError {}
#[cfg(feature = "std")]
impl std::error::Error for PlacementError {}
#[cfg(feature = "std")]
impl std::error::Error for JoinError {}
