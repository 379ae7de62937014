use crate::protocol::Message;

/// Bidirectional, ordered message channel to one peer.
///
/// Implementations must keep `recv` cancel-safe: dropping a pending `recv`
/// future may not lose a message, so callers can `select!` on it.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()>;
    async fn recv(&mut self) -> anyhow::Result<Message>;
}

pub mod in_memory;
pub mod tcp;
