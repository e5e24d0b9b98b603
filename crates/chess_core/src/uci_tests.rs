use super::*;

fn sq(s: &str) -> Position {
    Position::from_algebraic(s).unwrap()
}

#[test]
fn test_parse_plain_move() {
    let mv = CoordinateMove::parse("e2e4").unwrap();
    assert_eq!(mv.from, sq("e2"));
    assert_eq!(mv.to, sq("e4"));
    assert_eq!(mv.promotion, None);
    assert_eq!(mv.to_string(), "e2e4");
}

#[test]
fn test_parse_promotion() {
    for (txt, kind) in [
        ("e7e8q", PieceKind::Queen),
        ("e7e8r", PieceKind::Rook),
        ("e7e8b", PieceKind::Bishop),
        ("a2a1n", PieceKind::Knight),
    ] {
        let mv = CoordinateMove::parse(txt).unwrap();
        assert_eq!(mv.promotion, Some(kind));
        assert_eq!(mv.to_string(), txt);
    }
}

#[test]
fn test_parse_tolerates_surrounding_whitespace() {
    assert_eq!(CoordinateMove::parse(" g1f3\n").unwrap().to, sq("f3"));
}

#[test]
fn test_parse_rejects_malformed() {
    for txt in ["", "e2", "e2e", "e2e4qq", "e7e8k", "e7e8Q", "z2e4", "e9e4", "(none)", "é2e4"] {
        assert!(
            matches!(CoordinateMove::parse(txt), Err(EngineError::MalformedReply(_))),
            "{txt:?} should be rejected"
        );
    }
}

#[test]
fn test_engine_name_from_path() {
    let engine = UciEngine::new("/usr/games/stockfish");
    assert_eq!(engine.name(), "stockfish");
}

#[test]
fn test_missing_binary_fails_to_spawn() {
    let mut engine = UciEngine::new("/nonexistent/engine-binary");
    let err = engine.new_game().unwrap_err();
    assert!(matches!(err, EngineError::Spawn { .. }));

    let err = engine
        .best_move(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            &SearchLimits::default(),
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::Spawn { .. }));
}

#[cfg(unix)]
mod process {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::time::{SystemTime, UNIX_EPOCH};

    const START: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
    const LATER: &str = "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2";

    fn unique_temp_dir(name: &str) -> PathBuf {
        let base = std::env::temp_dir().join("chess_core_tests").join(name);
        let _ = fs::create_dir_all(&base);

        let pid = std::process::id();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();

        for i in 0..1000u32 {
            let p = base.join(format!("{pid}-{nanos}-{i}"));
            if fs::create_dir(&p).is_ok() {
                return p;
            }
        }
        panic!("failed to create a unique temp dir under {}", base.display());
    }

    /// Writes a shell engine that logs every command it reads to `log` and
    /// answers with the `case` arms in `answers`.
    fn fake_engine(dir: &Path, answers: &str) -> (PathBuf, PathBuf) {
        let script = dir.join("fake-engine");
        let log = dir.join("commands.log");
        let body = format!(
            "#!/bin/sh\n\
             while IFS= read -r line; do\n\
             \techo \"$line\" >> '{log}'\n\
             \tcase \"$line\" in\n\
             {answers}\n\
             \t\tquit) exit 0 ;;\n\
             \tesac\n\
             done\n",
            log = log.display(),
        );
        fs::write(&script, body).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        (script, log)
    }

    /// `new_game`, retrying while the freshly written script is still
    /// reported busy by a fork on another test thread.
    fn start(engine: &mut UciEngine) {
        for _ in 0..20 {
            match engine.new_game() {
                Err(EngineError::Spawn { source, .. }) if source.raw_os_error() == Some(26) => {
                    thread::sleep(Duration::from_millis(50));
                }
                other => return other.unwrap(),
            }
        }
        panic!("engine script stayed busy");
    }

    fn transcript(log: &Path) -> Vec<String> {
        fs::read_to_string(log)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    const ANSWERING: &str = "\
        \t\tuci) echo 'id name fake'; echo 'uciok' ;;\n\
        \t\tisready) echo 'readyok' ;;\n\
        \t\tgo*) echo 'info depth 1 score cp 20'; echo 'bestmove e7e5 ponder g1f3' ;;";

    #[test]
    fn test_uci_conversation() {
        let dir = unique_temp_dir("uci_conversation");
        let (script, log) = fake_engine(&dir, ANSWERING);

        let mut engine = UciEngine::new(&script);
        start(&mut engine);
        let limits = SearchLimits::new(Duration::from_millis(50), 5);
        assert_eq!(engine.best_move(START, &limits).unwrap(), "e7e5");
        assert_eq!(engine.best_move(LATER, &limits).unwrap(), "e7e5");
        let stronger = SearchLimits::new(Duration::from_millis(50), 7);
        assert_eq!(engine.best_move(START, &stronger).unwrap(), "e7e5");
        drop(engine);

        let expected = [
            "uci".to_string(),
            "ucinewgame".to_string(),
            "isready".to_string(),
            "setoption name Skill Level value 5".to_string(),
            format!("position fen {START}"),
            "go movetime 50".to_string(),
            format!("position fen {LATER}"),
            "go movetime 50".to_string(),
            "setoption name Skill Level value 7".to_string(),
            format!("position fen {START}"),
            "go movetime 50".to_string(),
            "quit".to_string(),
        ];
        assert_eq!(transcript(&log), expected);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_second_new_game_reuses_process() {
        let dir = unique_temp_dir("uci_new_game");
        let (script, log) = fake_engine(&dir, ANSWERING);

        let mut engine = UciEngine::new(&script);
        start(&mut engine);
        engine.new_game().unwrap();
        engine.quit();

        assert_eq!(
            transcript(&log),
            ["uci", "ucinewgame", "isready", "ucinewgame", "isready", "quit"]
        );
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_silent_engine_times_out() {
        let dir = unique_temp_dir("uci_silent");
        let (script, _) = fake_engine(
            &dir,
            "\t\tuci) echo 'uciok' ;;\n\t\tisready) echo 'readyok' ;;",
        );

        let mut engine = UciEngine::new(&script);
        start(&mut engine);
        let limits = SearchLimits::new(Duration::from_millis(10), MAX_SKILL_LEVEL);
        let began = Instant::now();
        let err = engine.best_move(START, &limits).unwrap_err();
        assert!(matches!(err, EngineError::Timeout(_)), "{err:?}");
        assert!(began.elapsed() >= REPLY_GRACE);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_bare_bestmove_is_malformed() {
        let dir = unique_temp_dir("uci_bare_bestmove");
        let (script, _) = fake_engine(
            &dir,
            "\t\tuci) echo 'uciok' ;;\n\t\tisready) echo 'readyok' ;;\n\t\tgo*) echo 'bestmove' ;;",
        );

        let mut engine = UciEngine::new(&script);
        start(&mut engine);
        let err = engine.best_move(START, &SearchLimits::default()).unwrap_err();
        assert!(matches!(err, EngineError::MalformedReply(_)), "{err:?}");
        let _ = fs::remove_dir_all(&dir);
    }
}
