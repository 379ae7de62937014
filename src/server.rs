//! Session host: one actor task owns the [`Session`], connection tasks talk
//! to it through a command channel.
//!
//! Commands are handled one at a time to completion, so no two shots, joins
//! or votes ever interleave. Outbound events are pushed to each connection's
//! own channel and written by that connection's task.

use std::collections::BTreeMap;

use log::{debug, error, info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::net::TcpListener;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;

use crate::engine::{JoinError, PlayerId, Session};
use crate::protocol::{Message, ShotOutcome, PROTOCOL_VERSION};
use crate::transport::tcp::TcpTransport;
use crate::transport::Transport;

/// Runtime settings for a server.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Fixed RNG seed for reproducible fleets. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl ServerConfig {
    fn rng(&self) -> SmallRng {
        match self.seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => {
                let mut seed_rng = rand::rng();
                SmallRng::from_rng(&mut seed_rng)
            }
        }
    }
}

enum Command {
    Join {
        name: String,
        outbound: UnboundedSender<Message>,
        reply: oneshot::Sender<Result<PlayerId, JoinError>>,
    },
    Shoot {
        player: PlayerId,
        seq: u64,
        x: i32,
        y: i32,
    },
    VoteRematch {
        player: PlayerId,
    },
    Leave {
        player: PlayerId,
    },
}

/// Cloneable entry point for submitting player actions to a running server.
#[derive(Clone)]
pub struct ServerHandle {
    commands: UnboundedSender<Command>,
}

impl ServerHandle {
    fn submit(&self, cmd: Command) -> anyhow::Result<()> {
        self.commands
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Server is shut down"))
    }

    /// Ask for a seat. Session events for the new player are delivered on
    /// `outbound`.
    pub async fn join(
        &self,
        name: String,
        outbound: UnboundedSender<Message>,
    ) -> anyhow::Result<Result<PlayerId, JoinError>> {
        let (reply, rx) = oneshot::channel();
        self.submit(Command::Join {
            name,
            outbound,
            reply,
        })?;
        rx.await.map_err(|_| anyhow::anyhow!("Server is shut down"))
    }

    pub fn shoot(&self, player: PlayerId, seq: u64, x: i32, y: i32) -> anyhow::Result<()> {
        self.submit(Command::Shoot { player, seq, x, y })
    }

    pub fn vote_rematch(&self, player: PlayerId) -> anyhow::Result<()> {
        self.submit(Command::VoteRematch { player })
    }

    pub fn leave(&self, player: PlayerId) -> anyhow::Result<()> {
        self.submit(Command::Leave { player })
    }
}

/// The actor owning the session.
pub struct GameServer {
    session: Session,
    peers: BTreeMap<PlayerId, UnboundedSender<Message>>,
    next_id: u64,
    commands: UnboundedReceiver<Command>,
}

impl GameServer {
    pub fn new(config: &ServerConfig) -> anyhow::Result<(Self, ServerHandle)> {
        let session = Session::new(config.rng()).map_err(|e| anyhow::anyhow!(e))?;
        let (tx, rx) = unbounded_channel();
        let server = Self {
            session,
            peers: BTreeMap::new(),
            next_id: 1,
            commands: rx,
        };
        Ok((server, ServerHandle { commands: tx }))
    }

    /// Build a server and run it on its own task.
    pub fn spawn(config: &ServerConfig) -> anyhow::Result<ServerHandle> {
        let (server, handle) = Self::new(config)?;
        tokio::spawn(server.run());
        Ok(handle)
    }

    /// Process commands until every [`ServerHandle`] is dropped.
    pub async fn run(mut self) {
        while let Some(cmd) = self.commands.recv().await {
            self.handle(cmd);
        }
        debug!("All server handles dropped, stopping");
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Join {
                name,
                outbound,
                reply,
            } => {
                let id = PlayerId(self.next_id);
                self.next_id += 1;
                self.peers.insert(id, outbound);
                let result = match self.session.player_joined(id, name.clone()) {
                    Ok(()) => {
                        info!("{} joined as {} ({} seated)", name, id, self.session.player_count());
                        Ok(id)
                    }
                    Err(JoinError::Placement(e)) => {
                        error!("Could not start a game: {}", e);
                        Err(JoinError::Placement(e))
                    }
                    Err(e) => {
                        warn!("Refused {}: {}", name, e);
                        Err(e)
                    }
                };
                self.flush();
                if result.is_err() {
                    self.peers.remove(&id);
                }
                let _ = reply.send(result);
            }
            Command::Shoot { player, seq, x, y } => {
                let result = self.session.shoot(player, x, y);
                match &result {
                    Ok(report) => debug!(
                        "{} fired at ({}, {}): {}",
                        player,
                        x,
                        y,
                        if report.did_hit { "hit" } else { "miss" }
                    ),
                    Err(e) => debug!("{} shot at ({}, {}) refused: {}", player, x, y, e),
                }
                self.flush();
                self.send_to(
                    player,
                    Message::ShotResult {
                        seq,
                        outcome: ShotOutcome::from(result),
                    },
                );
            }
            Command::VoteRematch { player } => {
                match self.session.vote_rematch(player) {
                    Ok(true) => info!("Rematch agreed, new game started"),
                    Ok(false) => debug!("{} voted for a rematch", player),
                    Err(e) => error!("Could not start rematch: {}", e),
                }
                self.flush();
            }
            Command::Leave { player } => {
                if self.session.player_left(player) {
                    info!("{} left ({} seated)", player, self.session.player_count());
                }
                self.peers.remove(&player);
                self.flush();
            }
        }
    }

    /// Forward every queued session event to its recipient.
    fn flush(&mut self) {
        for dispatch in self.session.take_dispatches() {
            self.send_to(dispatch.to, Message::Event(dispatch.event));
        }
    }

    fn send_to(&self, player: PlayerId, msg: Message) {
        if let Some(tx) = self.peers.get(&player) {
            // A closed channel means the connection task is already on its
            // way out and will send `Leave`.
            let _ = tx.send(msg);
        }
    }
}

/// Run one client connection: handshake, then shuttle frames between the
/// transport and the server until either side goes away.
pub async fn serve_connection<T: Transport>(
    handle: ServerHandle,
    mut transport: T,
) -> anyhow::Result<()> {
    let name = match transport.recv().await? {
        Message::Hello { version, name } if version == PROTOCOL_VERSION => name,
        Message::Hello { version, .. } => {
            let reason = format!(
                "Protocol version mismatch: expected {}, got {}",
                PROTOCOL_VERSION, version
            );
            warn!("{}", reason);
            transport.send(Message::Rejected { reason: reason.clone() }).await?;
            return Err(anyhow::anyhow!(reason));
        }
        other => {
            warn!("Expected Hello, got {:?}", other);
            transport
                .send(Message::Rejected {
                    reason: "Expected Hello".to_string(),
                })
                .await?;
            return Err(anyhow::anyhow!("Expected Hello, got unexpected message"));
        }
    };

    let (tx, mut outbound) = unbounded_channel();
    let player = match handle.join(name, tx).await? {
        Ok(id) => id,
        Err(e) => {
            transport
                .send(Message::Rejected {
                    reason: e.to_string(),
                })
                .await?;
            return Err(anyhow::anyhow!(e));
        }
    };

    let result = match transport
        .send(Message::Welcome {
            version: PROTOCOL_VERSION,
            player,
        })
        .await
    {
        Ok(()) => pump(&handle, player, &mut transport, &mut outbound).await,
        Err(e) => Err(e),
    };
    handle.leave(player)?;
    result
}

async fn pump<T: Transport>(
    handle: &ServerHandle,
    player: PlayerId,
    transport: &mut T,
    outbound: &mut UnboundedReceiver<Message>,
) -> anyhow::Result<()> {
    loop {
        tokio::select! {
            incoming = transport.recv() => match incoming {
                Ok(Message::Shoot { seq, x, y }) => handle.shoot(player, seq, x, y)?,
                Ok(Message::VoteRematch) => handle.vote_rematch(player)?,
                Ok(other) => warn!("{} sent unexpected message: {:?}", player, other),
                Err(e) => {
                    info!("{} disconnected: {}", player, e);
                    return Ok(());
                }
            },
            outgoing = outbound.recv() => match outgoing {
                Some(msg) => transport.send(msg).await?,
                None => return Ok(()),
            },
        }
    }
}

/// Accept TCP clients forever, serving each on its own task.
pub async fn accept_loop(listener: TcpListener, handle: ServerHandle) -> anyhow::Result<()> {
    loop {
        let (stream, addr) = listener.accept().await?;
        info!("Connection from {}", addr);
        let handle = handle.clone();
        tokio::spawn(async move {
            if let Err(e) = serve_connection(handle, TcpTransport::new(stream)).await {
                warn!("Connection from {} ended with an error: {}", addr, e);
            }
        });
    }
}
