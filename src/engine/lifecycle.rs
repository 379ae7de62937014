//! Joining, leaving, starting and ending games, and rematch voting.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use super::common::{JoinError, PlacementError, PlayerId};
use super::config::{FLEET, PLAYERS_NEEDED, WAITING_MESSAGE};
use super::events::ServerEvent;
use super::placement::generate_fleet;
use super::session::{Phase, Seat, Session};

impl Session {
    /// Seat a new player. The second seat filling up starts a game; a lone
    /// player is told to wait and gets a clean board.
    ///
    /// If the game cannot be dealt the new player is unseated again and the
    /// session is left as it was before the call.
    pub fn player_joined(&mut self, id: PlayerId, name: String) -> Result<(), JoinError> {
        self.seats.take_seat(Seat::new(id, name))?;
        if self.seats.len() == PLAYERS_NEEDED {
            if let Err(e) = self.start_game() {
                self.seats.leave(id);
                return Err(JoinError::Placement(e));
            }
        } else {
            self.outbox
                .send(id, ServerEvent::InfoMessage(String::from(WAITING_MESSAGE)));
            self.outbox.send(id, ServerEvent::BoardsCleared);
        }
        Ok(())
    }

    /// Remove a player. Returns `false` if `id` was not seated.
    ///
    /// With a seat now empty any running game is abandoned without a winner.
    pub fn player_left(&mut self, id: PlayerId) -> bool {
        if self.seats.leave(id).is_none() {
            return false;
        }
        self.rematch_votes.remove(&id);
        if self.seats.len() != PLAYERS_NEEDED {
            self.end_game(None);
        }
        true
    }

    /// Deal fresh fleets and give the first turn to the first seated player.
    ///
    /// Each player only ever learns their own layout. Does nothing unless both
    /// seats are taken. Fleets are generated before any state changes, so a
    /// placement failure leaves the session as it was.
    pub fn start_game(&mut self) -> Result<(), PlacementError> {
        if self.seats.len() != PLAYERS_NEEDED {
            return Ok(());
        }
        let Some(first) = self.seats.first().map(Seat::id) else {
            return Ok(());
        };
        let mut fleets = Vec::with_capacity(PLAYERS_NEEDED);
        for _ in 0..PLAYERS_NEEDED {
            fleets.push(generate_fleet(&mut self.rng, self.grid, &FLEET)?);
        }

        let ids = self.seats.ids();
        self.outbox
            .send_all(ids, ServerEvent::RematchButtonVisibility(false));
        self.rematch_votes.clear();
        self.phase = Phase::AwaitingShot;
        self.current_turn = Some(first);
        self.announce_turn(first);

        for (seat, fleet) in self.seats.iter_mut().zip(fleets) {
            for ship in fleet.ships() {
                self.outbox.send(
                    seat.id(),
                    ServerEvent::FleetPlaced {
                        color: ship.color(),
                        rgb: ship.color().rgb(),
                        positions: ship.positions().to_vec(),
                    },
                );
            }
            seat.fleet = Some(fleet);
        }
        Ok(())
    }

    /// Tear the game down and tell every seated player how it ended.
    ///
    /// With a winner the session moves to [`Phase::GameOver`] and offers a
    /// rematch; without one it goes back to waiting for players.
    pub fn end_game(&mut self, winner: Option<PlayerId>) {
        self.current_turn = None;
        self.rematch_votes.clear();
        for seat in self.seats.iter_mut() {
            seat.fleet = None;
        }
        self.phase = match winner {
            Some(winner) => Phase::GameOver { winner },
            None => Phase::WaitingForPlayers,
        };

        let winner_name = winner.map(|w| self.name_of(w));
        let info = match &winner_name {
            Some(name) => format!("{} won! {}", name, WAITING_MESSAGE),
            None => String::from(WAITING_MESSAGE),
        };
        for id in self.seats.ids() {
            if let (Some(winner), Some(name)) = (winner, &winner_name) {
                self.outbox.send(
                    id,
                    ServerEvent::GameEnded {
                        winner,
                        winner_name: name.clone(),
                    },
                );
            }
            self.outbox.send(id, ServerEvent::InfoMessage(info.clone()));
            self.outbox
                .send(id, ServerEvent::RematchButtonVisibility(winner.is_some()));
            self.outbox.send(id, ServerEvent::BoardsCleared);
        }
    }

    /// Record that `id` wants another game. Returns `true` once the second
    /// distinct vote starts it.
    ///
    /// Votes only count from seated players while no game is running and both
    /// seats are taken. Repeat votes from the same player are idempotent.
    pub fn vote_rematch(&mut self, id: PlayerId) -> Result<bool, PlacementError> {
        if self.seats.get(id).is_none()
            || self.seats.len() != PLAYERS_NEEDED
            || self.phase == Phase::AwaitingShot
        {
            return Ok(false);
        }
        self.rematch_votes.insert(id);
        if self.rematch_votes.len() < PLAYERS_NEEDED {
            return Ok(false);
        }
        self.rematch_votes.clear();
        self.start_game()?;
        Ok(true)
    }

    /// Broadcast that `player` holds the turn, as text and as an identity.
    pub(crate) fn announce_turn(&mut self, player: PlayerId) {
        let text = format!("{}'s turn", self.name_of(player));
        let ids = self.seats.ids();
        self.outbox
            .send_all(ids.iter().copied(), ServerEvent::InfoMessage(text));
        self.outbox.send_all(ids, ServerEvent::TurnChanged { player });
    }
}
