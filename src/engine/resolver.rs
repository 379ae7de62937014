//! Shot validation and resolution.

use super::common::{PlayerId, Position, ShotError};
use super::events::{ServerEvent, ShotReport};
use super::session::{Phase, Session};

impl Session {
    /// Fire at `(x, y)` on the opponent's board.
    ///
    /// Refusals leave the session untouched, except that [`ShotError::AlreadyShot`]
    /// hands the spent turn back to the shooter. A shot that goes through
    /// passes the turn to the opponent, and ends the game if it destroyed the
    /// opponent's last ship.
    pub fn shoot(&mut self, shooter: PlayerId, x: i32, y: i32) -> Result<ShotReport, ShotError> {
        if self.phase != Phase::AwaitingShot || self.current_turn != Some(shooter) {
            return Err(ShotError::NotYourTurn);
        }
        let opponent = self.opponent(shooter).ok_or(ShotError::NoOpponent)?;
        let target = Position::new(x, y);
        if !self.grid.contains(target) {
            return Err(ShotError::OutOfBounds);
        }

        // The turn is spent before the board is touched.
        self.current_turn = None;

        let Some(fleet) = self
            .seats
            .opponent_mut(shooter)
            .and_then(|seat| seat.fleet.as_mut())
        else {
            self.current_turn = Some(shooter);
            return Err(ShotError::NoOpponent);
        };

        let mut did_hit = false;
        let mut destroyed_ship = false;
        for ship in fleet.ships_mut() {
            if !ship.occupies(target) {
                continue;
            }
            if ship.is_damaged_at(target) {
                self.current_turn = Some(shooter);
                return Err(ShotError::AlreadyShot);
            }
            did_hit = true;
            destroyed_ship |= ship.record_hit(target);
        }
        let fleet_destroyed = destroyed_ship && fleet.all_destroyed();

        let report = ShotReport {
            position: target,
            did_hit,
        };
        self.outbox.send(opponent, ServerEvent::ShotResolved(report));
        self.current_turn = Some(opponent);
        self.announce_turn(opponent);

        if fleet_destroyed {
            self.end_game(Some(shooter));
        }
        Ok(report)
    }
}
