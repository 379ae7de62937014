//! Automated client: joins a server, fires at random untried cells whenever
//! it holds the turn, and keeps voting for rematches until it has played the
//! requested number of games.

use std::collections::BTreeSet;

use log::{debug, info};
use rand::rngs::SmallRng;
use rand::Rng;

use crate::engine::{PlayerId, Position, ServerEvent, ShotError, GRID};
use crate::protocol::{Message, PROTOCOL_VERSION};
use crate::transport::Transport;

/// Summary of a bot's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotReport {
    pub player: PlayerId,
    pub games: usize,
    pub wins: usize,
    pub shots: usize,
}

pub struct Bot<T: Transport> {
    name: String,
    transport: T,
    rng: SmallRng,
    games_to_play: usize,
    tried: BTreeSet<Position>,
    seq: u64,
}

impl<T: Transport> Bot<T> {
    pub fn new(name: impl Into<String>, transport: T, rng: SmallRng, games_to_play: usize) -> Self {
        Self {
            name: name.into(),
            transport,
            rng,
            games_to_play,
            tried: BTreeSet::new(),
            seq: 0,
        }
    }

    async fn handshake(&mut self) -> anyhow::Result<PlayerId> {
        self.transport
            .send(Message::Hello {
                version: PROTOCOL_VERSION,
                name: self.name.clone(),
            })
            .await?;
        match self.transport.recv().await? {
            Message::Welcome { version, player } if version == PROTOCOL_VERSION => Ok(player),
            Message::Welcome { version, .. } => Err(anyhow::anyhow!(
                "Protocol version mismatch in Welcome: expected {}, got {}",
                PROTOCOL_VERSION,
                version
            )),
            Message::Rejected { reason } => Err(anyhow::anyhow!("Join rejected: {}", reason)),
            other => Err(anyhow::anyhow!("Expected Welcome, got {:?}", other)),
        }
    }

    /// Pick a cell not yet fired at in this game.
    fn pick_target(&mut self) -> anyhow::Result<Position> {
        let candidates: Vec<Position> = (1..=GRID.height)
            .flat_map(|y| (1..=GRID.width).map(move |x| Position::new(x, y)))
            .filter(|p| !self.tried.contains(p))
            .collect();
        if candidates.is_empty() {
            return Err(anyhow::anyhow!("No untried cells left"));
        }
        Ok(candidates[self.rng.random_range(0..candidates.len())])
    }

    async fn fire(&mut self) -> anyhow::Result<()> {
        let target = self.pick_target()?;
        self.tried.insert(target);
        self.transport
            .send(Message::Shoot {
                seq: self.seq,
                x: target.x,
                y: target.y,
            })
            .await?;
        self.seq += 1;
        Ok(())
    }

    /// Play until `games_to_play` games have finished with a winner.
    pub async fn run(mut self) -> anyhow::Result<BotReport> {
        let me = self.handshake().await?;
        info!("{} seated as {}", self.name, me);
        let mut report = BotReport {
            player: me,
            games: 0,
            wins: 0,
            shots: 0,
        };

        while report.games < self.games_to_play {
            match self.transport.recv().await? {
                Message::Event(ServerEvent::TurnChanged { player }) if player == me => {
                    self.fire().await?;
                }
                Message::Event(ServerEvent::GameEnded {
                    winner,
                    winner_name,
                }) => {
                    report.games += 1;
                    if winner == me {
                        report.wins += 1;
                    }
                    info!("{}: game {} won by {}", self.name, report.games, winner_name);
                    self.tried.clear();
                    if report.games < self.games_to_play {
                        self.transport.send(Message::VoteRematch).await?;
                    }
                }
                Message::Event(ServerEvent::BoardsCleared) => self.tried.clear(),
                Message::Event(ServerEvent::InfoMessage(text)) => {
                    debug!("{}: {}", self.name, text);
                }
                Message::ShotResult { outcome, .. } => {
                    if outcome.failed {
                        if outcome.reason == Some(ShotError::AlreadyShot) {
                            self.fire().await?;
                        }
                    } else {
                        report.shots += 1;
                    }
                }
                _ => {}
            }
        }
        Ok(report)
    }
}
