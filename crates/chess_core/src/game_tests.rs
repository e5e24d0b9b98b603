use super::*;
use std::time::Instant;

fn sq(s: &str) -> Position {
    Position::from_algebraic(s).unwrap()
}

/// A timed game whose real clock never fires during a test.
fn timed(seconds: u32) -> Game {
    Game::new(seconds).with_tick_interval(Duration::from_secs(3600))
}

#[test]
fn test_not_started_game_ignores_moves() {
    let mut game = Game::new(0);
    assert_eq!(game.status(), GameStatus::NotStarted);
    assert!(game.legal_moves(sq("e2")).is_empty());
    assert!(!game.make_move(sq("e2"), sq("e4"), None));
    game.resign();
    assert!(game.drain_events().is_empty());
}

#[test]
fn test_start_sets_up_game() {
    let mut game = timed(300);
    game.start();
    assert!(game.is_in_progress());
    assert_eq!(game.current_player(), Color::White);
    assert_eq!(game.time_left(Color::White), 300);
    assert_eq!(game.time_left(Color::Black), 300);
    assert_eq!(game.legal_moves(sq("e2")).len(), 2);
    assert_eq!(game.board().fen(), Board::startpos().fen());
}

#[test]
fn test_start_twice_is_ignored() {
    let mut game = Game::new(0);
    game.start();
    assert!(game.make_move(sq("e2"), sq("e4"), None));
    game.start();
    assert_eq!(game.current_player(), Color::Black);
    assert!(game.board().piece_at(sq("e4")).is_some());
}

#[test]
fn test_moves_alternate() {
    let mut game = Game::new(0);
    game.start();
    assert!(game.legal_moves(sq("e7")).is_empty(), "not Black's turn");
    assert!(!game.make_move(sq("e7"), sq("e5"), None));
    assert!(game.drain_events().is_empty());

    assert!(game.make_move(sq("e2"), sq("e4"), None));
    assert_eq!(
        game.drain_events(),
        vec![GameEvent::MoveMade {
            next_to_move: Color::Black
        }]
    );
    assert_eq!(game.current_player(), Color::Black);
    assert!(game.legal_moves(sq("d2")).is_empty());
    assert!(game.make_move(sq("e7"), sq("e5"), None));
    assert_eq!(game.current_player(), Color::White);
}

#[test]
fn test_illegal_requests_are_ignored() {
    let mut game = Game::new(0);
    game.start();
    assert!(!game.make_move(sq("e4"), sq("e5"), None), "empty square");
    assert!(!game.make_move(sq("e2"), sq("e5"), None), "no such move");
    assert!(!game.make_move(sq("e1"), sq("e2"), None), "own piece");
    assert!(game.drain_events().is_empty());
    assert_eq!(game.current_player(), Color::White);
}

#[test]
fn test_stop_freezes_game() {
    let mut game = Game::new(0);
    game.start();
    game.stop();
    assert_eq!(game.status(), GameStatus::Stopped);
    assert!(!game.make_move(sq("e2"), sq("e4"), None));
    game.stop();
    game.draw_by_agreement();
    assert!(game.drain_events().is_empty());
}

#[test]
fn test_resign_gives_win_to_opponent() {
    let mut game = Game::new(0);
    game.start();
    game.make_move(sq("e2"), sq("e4"), None);
    game.drain_events();
    game.resign();
    let outcome = Outcome::Win {
        reason: WinReason::Resignation,
        winner: Color::White,
    };
    assert_eq!(game.status(), GameStatus::Finished(outcome));
    assert_eq!(game.drain_events(), vec![GameEvent::from(outcome)]);

    game.resign();
    assert!(game.drain_events().is_empty());
}

#[test]
fn test_draw_by_agreement() {
    let mut game = Game::new(0);
    game.start();
    game.draw_by_agreement();
    assert_eq!(
        game.drain_events(),
        vec![GameEvent::Draw {
            reason: DrawReason::Agreement
        }]
    );
    assert!(!game.is_in_progress());
}

#[test]
fn test_tick_counts_down_current_player() {
    let mut game = timed(30);
    game.start();
    game.handle(Command::Tick);
    assert_eq!(game.time_left(Color::White), 29);
    assert_eq!(game.time_left(Color::Black), 30);
    assert_eq!(
        game.drain_events(),
        vec![GameEvent::TimeUpdated {
            color: Color::White,
            seconds_left: 29
        }]
    );

    game.make_move(sq("e2"), sq("e4"), None);
    game.handle(Command::Tick);
    assert_eq!(game.time_left(Color::Black), 29);
    assert_eq!(game.player(Color::White).time_left, 29);
}

#[test]
fn test_timeout_wins_for_opponent() {
    let mut game = timed(30);
    game.start();
    for _ in 0..30 {
        game.handle(Command::Tick);
    }
    let events = game.drain_events();
    assert_eq!(events.len(), 31);
    assert_eq!(
        events.last(),
        Some(&GameEvent::Win {
            reason: WinReason::Timeout,
            winner: Color::Black
        })
    );

    game.handle(Command::Tick);
    assert!(game.drain_events().is_empty(), "no tick after the end");
    assert_eq!(game.time_left(Color::White), 0);
}

#[test]
fn test_untimed_game_ignores_ticks() {
    let mut game = Game::new(0);
    game.start();
    game.handle(Command::Tick);
    assert!(game.drain_events().is_empty());
    assert_eq!(game.time_left(Color::White), 0);
}

#[test]
fn test_real_clock_runs_out() {
    let mut game = Game::new(30).with_tick_interval(Duration::from_millis(2));
    game.start();
    let deadline = Instant::now() + Duration::from_secs(10);
    while game.is_in_progress() && Instant::now() < deadline {
        game.pump_timeout(Duration::from_millis(50));
    }
    assert_eq!(
        game.status(),
        GameStatus::Finished(Outcome::Win {
            reason: WinReason::Timeout,
            winner: Color::Black
        })
    );
    // Clock is torn down; nothing else arrives.
    std::thread::sleep(Duration::from_millis(20));
    game.pump();
    let timeouts = game
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, GameEvent::Win { .. }))
        .count();
    assert_eq!(timeouts, 1);
}

#[test]
fn test_subscribers_receive_events() {
    let mut game = Game::new(0);
    let rx = game.subscribe();
    let dropped = game.subscribe();
    drop(dropped);
    game.start();
    game.make_move(sq("g1"), sq("f3"), None);
    assert_eq!(
        rx.try_recv().unwrap(),
        GameEvent::MoveMade {
            next_to_move: Color::Black
        }
    );
    assert_eq!(game.subscribers.len(), 1);
}

#[test]
fn test_start_from_fen() {
    let mut game = Game::new(0);
    assert!(game.start_from_fen("not a fen").is_err());
    assert_eq!(game.status(), GameStatus::NotStarted);

    assert!(game.start_from_fen("4k3/8/8/8/8/8/4p3/K7 b - - 0 1").unwrap());
    assert_eq!(game.current_player(), Color::Black);
    assert!(!game.start_from_fen("4k3/8/8/8/8/8/8/K7 w - - 0 1").unwrap());
    assert_eq!(game.current_player(), Color::Black);
    assert!(game.make_move(sq("e2"), sq("e1"), Some(PieceKind::Rook)));
    assert_eq!(
        game.board().piece_at(sq("e1")).map(|p| p.kind),
        Some(PieceKind::Rook)
    );
}

#[test]
fn test_from_config() {
    let config = GameConfig {
        time_in_seconds: 60,
        ..GameConfig::default()
    };
    let game = Game::from_config(&config, None).unwrap();
    assert_eq!(game.time_in_seconds(), 60);
    assert_eq!(game.human_color(), None);

    let engine_config = GameConfig {
        opponent: Opponent::Engine {
            human_color: Color::White,
            skill_level: 3,
            move_time_ms: 100,
            path: "random".into(),
        },
        ..GameConfig::default()
    };
    assert!(matches!(
        Game::from_config(&engine_config, None),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_from_config_uses_start_fen() {
    let fen = "4k3/8/8/8/8/8/4P3/4K3 b - - 3 20";
    let config = GameConfig {
        start_fen: Some(fen.to_string()),
        ..GameConfig::default()
    };
    let mut game = Game::from_config(&config, None).unwrap();
    game.start();
    assert_eq!(game.board().fen(), fen);
    assert_eq!(game.current_player(), Color::Black);
}

#[test]
fn test_engine_reply_without_engine_is_dropped() {
    let mut game = Game::new(0);
    game.start();
    game.handle(Command::EngineReply {
        generation: 7,
        result: Err(EngineError::Closed),
    });
    game.handle(Command::EngineReply {
        generation: 1,
        result: Ok(CoordinateMove::parse("e2e4").unwrap()),
    });
    assert_eq!(game.status(), GameStatus::InProgress);
    assert!(game.drain_events().is_empty());
    assert!(game.board().piece_at(sq("e4")).is_none());
}
