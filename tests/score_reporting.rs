//! The session-to-scoreboard path: a finished session's report is recorded
//! once, under its own game's namespace.

use termcade::core::store::{MemoryStore, Scoreboard};
use termcade::games::runner::game::RunnerGame;
use termcade::{Context, Game, GameKind, SessionEvent};

#[test]
fn finished_event_drives_one_scoreboard_record() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let ctx = Context::new(tx);
    let mut scores = Scoreboard::new(MemoryStore::new());

    let mut game = RunnerGame::with_seed(5);
    let mut guard = 0;
    while !game.game_over() {
        game.on_tick(16, &ctx);
        guard += 1;
        assert!(guard < 1_000_000, "session never ended");
    }

    // Drain the outbox the way the shell does.
    let mut finished = 0;
    while let Ok(event) = rx.try_recv() {
        if let SessionEvent::Finished { kind, score } = event {
            scores.record(kind, score);
            finished += 1;
            assert_eq!(kind, GameKind::Runner);
            assert_eq!(score, game.score());
        }
    }
    assert_eq!(finished, 1);

    assert_eq!(scores.games_played(GameKind::Runner), 1);
    assert_eq!(scores.best(GameKind::Runner), game.score());
    assert_eq!(scores.total_score(GameKind::Runner), u64::from(game.score()));
    // Other games are untouched.
    assert_eq!(scores.games_played(GameKind::Snake), 0);
    assert_eq!(scores.games_played(GameKind::TwentyFortyEight), 0);
}

#[test]
fn best_only_moves_upward() {
    let mut scores = Scoreboard::new(MemoryStore::new());
    scores.record(GameKind::TwentyFortyEight, 5000);
    scores.record(GameKind::TwentyFortyEight, 1200);
    assert_eq!(scores.best(GameKind::TwentyFortyEight), 5000);
    assert_eq!(scores.games_played(GameKind::TwentyFortyEight), 2);
    assert_eq!(scores.total_score(GameKind::TwentyFortyEight), 6200);
}
