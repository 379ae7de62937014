use battleship_arena::protocol::{Message, PROTOCOL_VERSION};
use battleship_arena::transport::in_memory::InMemoryTransport;
use battleship_arena::transport::Transport;
use battleship_arena::{
    serve_connection, Bot, GameServer, JoinError, PlayerId, ServerConfig, ServerEvent,
    ServerHandle, ShotError, NUM_SHIPS, WAITING_MESSAGE,
};
use rand::{rngs::SmallRng, SeedableRng};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};

const STEP: Duration = Duration::from_secs(5);

fn connect(handle: &ServerHandle) -> (InMemoryTransport, JoinHandle<anyhow::Result<()>>) {
    let (server_end, client_end) = InMemoryTransport::pair();
    let task = tokio::spawn(serve_connection(handle.clone(), server_end));
    (client_end, task)
}

async fn join(handle: &ServerHandle, name: &str) -> anyhow::Result<(InMemoryTransport, PlayerId)> {
    let (mut client, _task) = connect(handle);
    client
        .send(Message::Hello {
            version: PROTOCOL_VERSION,
            name: name.to_string(),
        })
        .await?;
    match timeout(STEP, client.recv()).await?? {
        Message::Welcome { player, .. } => Ok((client, player)),
        other => Err(anyhow::anyhow!("expected Welcome, got {:?}", other)),
    }
}

/// Read frames until one matches `done`; returns everything read, the match last.
async fn recv_until(
    client: &mut InMemoryTransport,
    done: impl Fn(&Message) -> bool,
) -> anyhow::Result<Vec<Message>> {
    let mut seen = Vec::new();
    loop {
        let msg = timeout(STEP, client.recv()).await??;
        let last = done(&msg);
        seen.push(msg);
        if last {
            return Ok(seen);
        }
    }
}

fn fleet_count(msgs: &[Message]) -> usize {
    msgs.iter()
        .filter(|m| matches!(m, Message::Event(ServerEvent::FleetPlaced { .. })))
        .count()
}

/// Seat two raw clients and wait until both have their fleets.
async fn started_game(
    handle: &ServerHandle,
) -> anyhow::Result<((InMemoryTransport, PlayerId), (InMemoryTransport, PlayerId))> {
    let (mut alice, a) = join(handle, "alice").await?;
    let (mut bob, b) = join(handle, "bob").await?;
    for client in [&mut alice, &mut bob] {
        let mut placed = 0;
        while placed < NUM_SHIPS {
            let msgs = recv_until(client, |m| {
                matches!(m, Message::Event(ServerEvent::FleetPlaced { .. }))
            })
            .await?;
            placed += fleet_count(&msgs);
        }
    }
    Ok(((alice, a), (bob, b)))
}

#[tokio::test(flavor = "multi_thread")]
async fn test_version_mismatch_is_rejected() -> anyhow::Result<()> {
    let handle = GameServer::spawn(&ServerConfig { seed: Some(1) })?;
    let (mut client, task) = connect(&handle);

    client
        .send(Message::Hello {
            version: PROTOCOL_VERSION + 1,
            name: "future".to_string(),
        })
        .await?;
    match timeout(STEP, client.recv()).await?? {
        Message::Rejected { reason } => assert!(reason.contains("version"), "{}", reason),
        other => panic!("expected Rejected, got {:?}", other),
    }
    assert!(task.await?.is_err());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_first_frame_must_be_hello() -> anyhow::Result<()> {
    let handle = GameServer::spawn(&ServerConfig { seed: Some(1) })?;
    let (mut client, task) = connect(&handle);

    client.send(Message::VoteRematch).await?;
    assert!(matches!(
        timeout(STEP, client.recv()).await??,
        Message::Rejected { .. }
    ));
    assert!(task.await?.is_err());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_lone_player_is_told_to_wait() -> anyhow::Result<()> {
    let handle = GameServer::spawn(&ServerConfig { seed: Some(2) })?;
    let (mut alice, _) = join(&handle, "alice").await?;

    let msgs = recv_until(&mut alice, |m| {
        matches!(m, Message::Event(ServerEvent::BoardsCleared))
    })
    .await?;
    assert_eq!(
        msgs,
        vec![
            Message::Event(ServerEvent::InfoMessage(WAITING_MESSAGE.to_string())),
            Message::Event(ServerEvent::BoardsCleared),
        ]
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_third_player_is_rejected() -> anyhow::Result<()> {
    let handle = GameServer::spawn(&ServerConfig { seed: Some(3) })?;
    let _a = join(&handle, "alice").await?;
    let _b = join(&handle, "bob").await?;

    let (mut carol, task) = connect(&handle);
    carol
        .send(Message::Hello {
            version: PROTOCOL_VERSION,
            name: "carol".to_string(),
        })
        .await?;
    match timeout(STEP, carol.recv()).await?? {
        Message::Rejected { reason } => assert_eq!(reason, JoinError::SessionFull.to_string()),
        other => panic!("expected Rejected, got {:?}", other),
    }
    assert!(task.await?.is_err());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_shot_replies_echo_seq() -> anyhow::Result<()> {
    let handle = GameServer::spawn(&ServerConfig { seed: Some(4) })?;
    let ((mut alice, a), (mut bob, b)) = started_game(&handle).await?;

    // Bob fires out of turn.
    bob.send(Message::Shoot { seq: 7, x: 1, y: 1 }).await?;
    let msgs = recv_until(&mut bob, |m| matches!(m, Message::ShotResult { .. })).await?;
    match msgs.last() {
        Some(Message::ShotResult { seq, outcome }) => {
            assert_eq!(*seq, 7);
            assert!(outcome.failed);
            assert_eq!(outcome.reason, Some(ShotError::NotYourTurn));
        }
        other => panic!("expected ShotResult, got {:?}", other),
    }

    // Alice misses the grid entirely and keeps the turn.
    alice.send(Message::Shoot { seq: 1, x: 0, y: 11 }).await?;
    let msgs = recv_until(&mut alice, |m| matches!(m, Message::ShotResult { .. })).await?;
    assert!(matches!(
        msgs.last(),
        Some(Message::ShotResult { seq: 1, outcome }) if outcome.reason == Some(ShotError::OutOfBounds)
    ));

    alice.send(Message::Shoot { seq: 42, x: 3, y: 4 }).await?;
    let msgs = recv_until(&mut alice, |m| matches!(m, Message::ShotResult { .. })).await?;
    assert!(msgs.contains(&Message::Event(ServerEvent::TurnChanged { player: b })));
    match msgs.last() {
        Some(Message::ShotResult { seq, outcome }) => {
            assert_eq!(*seq, 42);
            assert!(!outcome.failed);
            assert_eq!((outcome.x, outcome.y), (Some(3), Some(4)));
        }
        other => panic!("expected ShotResult, got {:?}", other),
    }

    // Bob sees where the shot landed, then the turn passes to him.
    let msgs = recv_until(&mut bob, |m| {
        matches!(m, Message::Event(ServerEvent::TurnChanged { .. }))
    })
    .await?;
    assert!(msgs.iter().any(|m| matches!(
        m,
        Message::Event(ServerEvent::ShotResolved(report)) if report.position.x == 3 && report.position.y == 4
    )));
    assert_eq!(
        msgs.last(),
        Some(&Message::Event(ServerEvent::TurnChanged { player: b }))
    );
    assert_ne!(a, b);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_disconnect_mid_game_resets_survivor() -> anyhow::Result<()> {
    let handle = GameServer::spawn(&ServerConfig { seed: Some(5) })?;
    let ((mut alice, _), (bob, _)) = started_game(&handle).await?;

    drop(bob);

    let msgs = recv_until(&mut alice, |m| {
        matches!(m, Message::Event(ServerEvent::BoardsCleared))
    })
    .await?;
    assert_eq!(
        msgs,
        vec![
            Message::Event(ServerEvent::InfoMessage(WAITING_MESSAGE.to_string())),
            Message::Event(ServerEvent::RematchButtonVisibility(false)),
            Message::Event(ServerEvent::BoardsCleared),
        ]
    );

    // The freed seat can be taken and a new game starts with alice first.
    let (mut carol, _) = join(&handle, "carol").await?;
    let msgs = recv_until(&mut carol, |m| {
        matches!(m, Message::Event(ServerEvent::TurnChanged { .. }))
    })
    .await?;
    assert!(msgs.contains(&Message::Event(ServerEvent::InfoMessage(
        "alice's turn".to_string()
    ))));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bots_play_several_games() -> anyhow::Result<()> {
    let handle = GameServer::spawn(&ServerConfig { seed: Some(6) })?;
    let games = 3;

    let (alpha_end, _alpha_task) = connect(&handle);
    let (bravo_end, _bravo_task) = connect(&handle);
    let alpha = Bot::new("alpha", alpha_end, SmallRng::seed_from_u64(10), games);
    let bravo = Bot::new("bravo", bravo_end, SmallRng::seed_from_u64(20), games);

    let (a, b) = timeout(Duration::from_secs(30), async {
        tokio::try_join!(alpha.run(), bravo.run())
    })
    .await??;

    assert_ne!(a.player, b.player);
    assert_eq!(a.games, games);
    assert_eq!(b.games, games);
    assert_eq!(a.wins + b.wins, games);
    // A game needs at least all 20 ship cells hit by the winner.
    assert!(a.shots + b.shots >= 20 * games);
    Ok(())
}
