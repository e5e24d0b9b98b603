use super::*;
use std::collections::VecDeque;

use crate::position::Position;

struct Scripted {
    replies: VecDeque<&'static str>,
    fail_new_game: bool,
}

impl Scripted {
    fn new(replies: &[&'static str]) -> Self {
        Self {
            replies: replies.iter().copied().collect(),
            fail_new_game: false,
        }
    }
}

impl Engine for Scripted {
    fn best_move(&mut self, _fen: &str, _limits: &SearchLimits) -> Result<String, EngineError> {
        self.replies
            .pop_front()
            .map(str::to_string)
            .ok_or(EngineError::Closed)
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn new_game(&mut self) -> Result<(), EngineError> {
        if self.fail_new_game {
            Err(EngineError::Closed)
        } else {
            Ok(())
        }
    }
}

fn reply(rx: &mpsc::Receiver<Command>) -> (u64, Result<CoordinateMove, EngineError>) {
    match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
        Command::EngineReply { generation, result } => (generation, result),
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn test_search_limits_clamp_skill() {
    let limits = SearchLimits::new(Duration::from_millis(200), 35);
    assert_eq!(limits.skill_level, MAX_SKILL_LEVEL);
    assert_eq!(SearchLimits::default().move_time, Duration::from_millis(1000));
}

#[test]
fn test_colors() {
    let opponent = EngineOpponent::new(
        Color::Black,
        Box::new(Scripted::new(&[])),
        SearchLimits::default(),
    );
    assert_eq!(opponent.human_color(), Color::Black);
    assert_eq!(opponent.engine_color(), Color::White);
    assert!(!opponent.is_thinking());
}

#[test]
fn test_request_before_start_fails() {
    let mut opponent = EngineOpponent::new(
        Color::White,
        Box::new(Scripted::new(&["e7e5"])),
        SearchLimits::default(),
    );
    assert!(matches!(
        opponent.request("fen".to_string()),
        Err(EngineError::WorkerGone)
    ));
}

#[test]
fn test_reply_carries_generation() {
    let (tx, rx) = mpsc::channel();
    let mut opponent = EngineOpponent::new(
        Color::White,
        Box::new(Scripted::new(&["e7e5", "g8f6"])),
        SearchLimits::default(),
    );
    opponent.start(tx).unwrap();

    let first = opponent.request("fen one".to_string()).unwrap();
    assert!(opponent.is_thinking());
    let (generation, result) = reply(&rx);
    assert_eq!(generation, first);
    let mv = result.unwrap();
    assert_eq!(mv.from, Position::from_algebraic("e7").unwrap());
    assert_eq!(mv.to, Position::from_algebraic("e5").unwrap());
    assert!(opponent.accept(generation));
    assert!(!opponent.is_thinking());
    assert!(!opponent.accept(generation), "a reply is consumed once");

    let second = opponent.request("fen two".to_string()).unwrap();
    assert!(second > first);
    assert!(!opponent.accept(first), "older generation is stale");
    assert_eq!(reply(&rx).0, second);
}

#[test]
fn test_malformed_reply_is_an_error() {
    let (tx, rx) = mpsc::channel();
    let mut opponent = EngineOpponent::new(
        Color::White,
        Box::new(Scripted::new(&["(none)"])),
        SearchLimits::default(),
    );
    opponent.start(tx).unwrap();
    opponent.request("fen".to_string()).unwrap();
    assert!(matches!(reply(&rx).1, Err(EngineError::MalformedReply(_))));
}

#[test]
fn test_new_game_failure_is_reported() {
    let (tx, rx) = mpsc::channel();
    let mut engine = Scripted::new(&[]);
    engine.fail_new_game = true;
    let mut opponent = EngineOpponent::new(Color::White, Box::new(engine), SearchLimits::default());
    opponent.start(tx).unwrap();
    let (generation, result) = reply(&rx);
    assert_eq!(generation, 0);
    assert!(result.is_err());
}

#[test]
fn test_shutdown_ends_worker() {
    let (tx, rx) = mpsc::channel();
    let mut opponent = EngineOpponent::new(
        Color::White,
        Box::new(Scripted::new(&[])),
        SearchLimits::default(),
    );
    opponent.start(tx).unwrap();
    opponent.shutdown();
    assert!(matches!(
        opponent.request("fen".to_string()),
        Err(EngineError::WorkerGone)
    ));
    // The worker exits and drops its reply sender.
    assert!(matches!(
        rx.recv_timeout(Duration::from_secs(5)),
        Err(mpsc::RecvTimeoutError::Disconnected)
    ));
}
