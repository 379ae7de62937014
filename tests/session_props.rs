use battleship_arena::{Phase, PlayerId, Position, ServerEvent, Session, ShotError};
use proptest::prelude::*;
use rand::{rngs::SmallRng, SeedableRng};

fn started(seed: u64) -> Session {
    let mut session = Session::new(SmallRng::seed_from_u64(seed)).unwrap();
    session.player_joined(PlayerId(1), "alice".to_string()).unwrap();
    session.player_joined(PlayerId(2), "bob".to_string()).unwrap();
    session.take_dispatches();
    session
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Whoever holds the turn fires at a random cell. Accepted shots pass the
    /// turn, repeat hits keep it, and the game ends exactly once.
    #[test]
    fn shots_alternate_and_finish_once(
        seed in any::<u64>(),
        shots in prop::collection::vec((1..=10i32, 1..=10i32), 1..600),
    ) {
        let mut session = started(seed);
        let mut game_ended = 0;

        for (x, y) in shots {
            let Some(shooter) = session.current_turn() else { break };
            let opponent = session.opponent(shooter).unwrap();
            let target = Position::new(x, y);
            let fleet = session.fleet(opponent).unwrap();
            let had_ship = fleet.ship_at(target).is_some();
            let was_damaged = fleet.ship_at(target).is_some_and(|s| s.is_damaged_at(target));

            match session.shoot(shooter, x, y) {
                Ok(report) => {
                    prop_assert!(!was_damaged);
                    prop_assert_eq!(report.did_hit, had_ship);
                    game_ended += session
                        .take_dispatches()
                        .iter()
                        .filter(|d| matches!(d.event, ServerEvent::GameEnded { .. }))
                        .count();
                    if game_ended > 0 {
                        prop_assert_eq!(session.phase(), Phase::GameOver { winner: shooter });
                        prop_assert_eq!(session.current_turn(), None);
                        break;
                    }
                    prop_assert_eq!(session.current_turn(), Some(opponent));
                    let ship = session.fleet(opponent).unwrap().ship_at(target);
                    if let Some(ship) = ship {
                        prop_assert!(ship.is_damaged_at(target));
                        prop_assert_eq!(
                            ship.is_destroyed(),
                            ship.damaged_positions().len() == ship.length()
                        );
                    }
                }
                Err(ShotError::AlreadyShot) => {
                    prop_assert!(was_damaged);
                    prop_assert_eq!(session.current_turn(), Some(shooter));
                    prop_assert!(session.take_dispatches().is_empty());
                }
                Err(other) => prop_assert!(false, "unexpected refusal: {}", other),
            }
        }

        // One GameEnded per seated player, or none if the game is still on.
        prop_assert!(game_ended == 0 || game_ended == 2);
        if game_ended == 0 {
            prop_assert_eq!(session.phase(), Phase::AwaitingShot);
        }
    }
}
