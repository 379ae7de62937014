//! Events the session emits for the presentation side.
//!
//! The session never talks to clients directly. Every outward notification is
//! queued as a [`Dispatch`] addressed to one seated player; the host drains the
//! queue after each call and delivers in order.

use alloc::string::String;
use alloc::vec::Vec;

use super::common::{PlayerId, Position};
use super::ship::ShipColor;

/// Result of a shot that went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct ShotReport {
    pub position: Position,
    pub did_hit: bool,
}

/// One-way notifications to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum ServerEvent {
    /// Reset both boards to their default look.
    BoardsCleared,
    /// Status line text.
    InfoMessage(String),
    /// Layout of one of the recipient's own ships, with the display color
    /// to paint it in.
    FleetPlaced {
        color: ShipColor,
        rgb: (u8, u8, u8),
        positions: Vec<Position>,
    },
    /// The opponent fired at the recipient's board.
    ShotResolved(ShotReport),
    /// `player` now holds the turn.
    TurnChanged { player: PlayerId },
    /// A game finished with a winner.
    GameEnded { winner: PlayerId, winner_name: String },
    RematchButtonVisibility(bool),
}

/// An event addressed to a single player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub to: PlayerId,
    pub event: ServerEvent,
}

/// Ordered queue of pending dispatches.
#[derive(Debug, Default)]
pub(crate) struct Outbox {
    pending: Vec<Dispatch>,
}

impl Outbox {
    pub(crate) fn send(&mut self, to: PlayerId, event: ServerEvent) {
        self.pending.push(Dispatch { to, event });
    }

    pub(crate) fn send_all<I>(&mut self, recipients: I, event: ServerEvent)
    where
        I: IntoIterator<Item = PlayerId>,
    {
        for to in recipients {
            self.send(to, event.clone());
        }
    }

    pub(crate) fn take(&mut self) -> Vec<Dispatch> {
        core::mem::take(&mut self.pending)
    }
}
