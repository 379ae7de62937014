use battleship_arena::protocol::{Message, PROTOCOL_VERSION};
use battleship_arena::transport::in_memory::InMemoryTransport;
use battleship_arena::transport::Transport;
use battleship_arena::{PlayerId, ServerEvent};

#[tokio::test(flavor = "multi_thread")]
async fn test_pair_delivers_in_order() -> anyhow::Result<()> {
    let (mut left, mut right) = InMemoryTransport::pair();

    left.send(Message::Hello {
        version: PROTOCOL_VERSION,
        name: "alice".to_string(),
    })
    .await?;
    left.send(Message::VoteRematch).await?;

    assert!(matches!(right.recv().await?, Message::Hello { ref name, .. } if name == "alice"));
    assert!(matches!(right.recv().await?, Message::VoteRematch));

    right
        .send(Message::Event(ServerEvent::TurnChanged { player: PlayerId(7) }))
        .await?;
    assert!(matches!(
        left.recv().await?,
        Message::Event(ServerEvent::TurnChanged { player: PlayerId(7) })
    ));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dropped_peer_is_an_error() -> anyhow::Result<()> {
    let (mut left, right) = InMemoryTransport::pair();
    drop(right);

    assert!(left.recv().await.is_err());
    assert!(left.send(Message::VoteRematch).await.is_err());
    Ok(())
}
