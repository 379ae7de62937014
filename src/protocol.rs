use crate::engine::{PlayerId, ServerEvent, ShotError, ShotReport};

/// Wire protocol version. Both ends must agree during the handshake.
pub const PROTOCOL_VERSION: u8 = 1;

/// Reply to a shot, as seen by the shooter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ShotOutcome {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub did_hit: Option<bool>,
    pub failed: bool,
    pub reason: Option<ShotError>,
}

impl From<Result<ShotReport, ShotError>> for ShotOutcome {
    fn from(res: Result<ShotReport, ShotError>) -> Self {
        match res {
            Ok(report) => ShotOutcome {
                x: Some(report.position.x),
                y: Some(report.position.y),
                did_hit: Some(report.did_hit),
                failed: false,
                reason: None,
            },
            Err(err) => ShotOutcome {
                x: None,
                y: None,
                did_hit: None,
                failed: true,
                reason: Some(err),
            },
        }
    }
}

/// Messages exchanged between the server and a client.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Message {
    /// First frame from a client, asking for a seat under `name`.
    Hello { version: u8, name: String },
    /// Seat granted; `player` is the identity used in later events.
    Welcome { version: u8, player: PlayerId },
    /// Handshake refused; the server closes the connection after this.
    Rejected { reason: String },
    /// Fire at `(x, y)`. `seq` is echoed back in the matching `ShotResult`.
    Shoot { seq: u64, x: i32, y: i32 },
    ShotResult { seq: u64, outcome: ShotOutcome },
    VoteRematch,
    /// Broadcast or private notification from the session.
    Event(ServerEvent),
}
