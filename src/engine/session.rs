//! Authoritative session state: two seats, their fleets, the turn pointer and
//! rematch votes.
//!
//! All mutation goes through [`Session::shoot`](super::resolver) and the
//! lifecycle methods in [`lifecycle`](super::lifecycle). Everything here is
//! read-only from the outside.

use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;
use rand::rngs::SmallRng;

use super::common::{JoinError, PlacementError, PlayerId};
use super::config::{FLEET, GRID};
use super::events::{Dispatch, Outbox};
use super::grid::Grid;
use super::placement::validate_layout;
use super::ship::Fleet;

/// Where the session is in its game cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Fewer than two players, or the last game was abandoned.
    WaitingForPlayers,
    /// A game is running; the turn pointer names who may shoot.
    AwaitingShot,
    /// The last game was won; both players are still seated.
    GameOver { winner: PlayerId },
}

/// A seated player and, while a game runs, their fleet.
#[derive(Debug, Clone)]
pub struct Seat {
    id: PlayerId,
    name: String,
    pub(crate) fleet: Option<Fleet>,
}

impl Seat {
    pub(crate) fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            fleet: None,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fleet(&self) -> Option<&Fleet> {
        self.fleet.as_ref()
    }
}

/// Exactly two slots, kept in join order: `first` is always filled before
/// `second`.
#[derive(Debug, Default)]
pub(crate) struct Seats {
    first: Option<Seat>,
    second: Option<Seat>,
}

impl Seats {
    pub(crate) fn len(&self) -> usize {
        self.first.is_some() as usize + self.second.is_some() as usize
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Seat> {
        self.first.iter().chain(self.second.iter())
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Seat> {
        self.first.iter_mut().chain(self.second.iter_mut())
    }

    pub(crate) fn ids(&self) -> Vec<PlayerId> {
        self.iter().map(Seat::id).collect()
    }

    pub(crate) fn first(&self) -> Option<&Seat> {
        self.first.as_ref()
    }

    pub(crate) fn get(&self, id: PlayerId) -> Option<&Seat> {
        self.iter().find(|s| s.id == id)
    }

    /// The other seated player, if `id` is seated and has company.
    pub(crate) fn opponent(&self, id: PlayerId) -> Option<&Seat> {
        match (&self.first, &self.second) {
            (Some(a), Some(b)) if a.id == id => Some(b),
            (Some(a), Some(b)) if b.id == id => Some(a),
            _ => None,
        }
    }

    pub(crate) fn opponent_mut(&mut self, id: PlayerId) -> Option<&mut Seat> {
        let first_is = self.first.as_ref().is_some_and(|s| s.id == id);
        let second_is = self.second.as_ref().is_some_and(|s| s.id == id);
        match (first_is, second_is) {
            (true, false) => self.second.as_mut(),
            (false, true) => self.first.as_mut(),
            _ => None,
        }
    }

    pub(crate) fn take_seat(&mut self, seat: Seat) -> Result<(), JoinError> {
        if self.get(seat.id).is_some() {
            return Err(JoinError::AlreadySeated);
        }
        match (&self.first, &self.second) {
            (None, _) => self.first = Some(seat),
            (Some(_), None) => self.second = Some(seat),
            (Some(_), Some(_)) => return Err(JoinError::SessionFull),
        }
        Ok(())
    }

    /// Remove `id`, moving the second player up if the first leaves.
    pub(crate) fn leave(&mut self, id: PlayerId) -> Option<Seat> {
        if self.first.as_ref().is_some_and(|s| s.id == id) {
            let seat = self.first.take();
            self.first = self.second.take();
            seat
        } else if self.second.as_ref().is_some_and(|s| s.id == id) {
            self.second.take()
        } else {
            None
        }
    }
}

/// The single owner of game state for one pair of players.
pub struct Session {
    pub(crate) grid: Grid,
    pub(crate) seats: Seats,
    pub(crate) current_turn: Option<PlayerId>,
    pub(crate) phase: Phase,
    pub(crate) rematch_votes: BTreeSet<PlayerId>,
    pub(crate) outbox: Outbox,
    pub(crate) rng: SmallRng,
}

impl Session {
    /// Create an empty session. Fails if the fixed fleet cannot fit on the
    /// grid, before any player can join.
    pub fn new(rng: SmallRng) -> Result<Self, PlacementError> {
        validate_layout(GRID, &FLEET)?;
        Ok(Self {
            grid: GRID,
            seats: Seats::default(),
            current_turn: None,
            phase: Phase::WaitingForPlayers,
            rematch_votes: BTreeSet::new(),
            outbox: Outbox::default(),
            rng,
        })
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Player allowed to shoot next, if any.
    pub fn current_turn(&self) -> Option<PlayerId> {
        self.current_turn
    }

    pub fn player_count(&self) -> usize {
        self.seats.len()
    }

    /// Seated players in join order.
    pub fn players(&self) -> Vec<PlayerId> {
        self.seats.ids()
    }

    pub fn seat(&self, id: PlayerId) -> Option<&Seat> {
        self.seats.get(id)
    }

    pub fn opponent(&self, id: PlayerId) -> Option<PlayerId> {
        self.seats.opponent(id).map(Seat::id)
    }

    pub fn fleet(&self, id: PlayerId) -> Option<&Fleet> {
        self.seats.get(id).and_then(Seat::fleet)
    }

    pub fn has_voted(&self, id: PlayerId) -> bool {
        self.rematch_votes.contains(&id)
    }

    /// Take every event queued since the last call, in emission order.
    pub fn take_dispatches(&mut self) -> Vec<Dispatch> {
        self.outbox.take()
    }

    pub(crate) fn name_of(&self, id: PlayerId) -> String {
        self.seats
            .get(id)
            .map(|s| String::from(s.name()))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opponent_mut_finds_the_other_seat() {
        let mut seats = Seats::default();
        seats.take_seat(Seat::new(PlayerId(1), String::from("alice"))).unwrap();
        assert!(seats.opponent_mut(PlayerId(1)).is_none());

        seats.take_seat(Seat::new(PlayerId(2), String::from("bob"))).unwrap();
        assert_eq!(seats.opponent_mut(PlayerId(1)).map(|s| s.id()), Some(PlayerId(2)));
        assert_eq!(seats.opponent_mut(PlayerId(2)).map(|s| s.id()), Some(PlayerId(1)));
        assert!(seats.opponent_mut(PlayerId(3)).is_none());

        if let Some(seat) = seats.opponent_mut(PlayerId(1)) {
            seat.fleet = None;
        }
        assert_eq!(seats.opponent(PlayerId(2)).map(Seat::id), Some(PlayerId(1)));
    }
}
