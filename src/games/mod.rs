pub mod game2048;
pub mod runner;
pub mod snake;

use std::time::Duration;

use crossterm::event::KeyEvent;
use ratatui::Frame;

pub use game2048::Game2048;
pub use runner::RunnerGame;
pub use snake::SnakeGame;

use crate::{Context, Game, GameKind};

/// The one live session, as a closed variant per game kind. Construction
/// goes through [`ActiveGame::new`] so the shell never names a concrete
/// game type.
pub enum ActiveGame {
    Runner(RunnerGame),
    Snake(SnakeGame),
    TwentyFortyEight(Game2048),
}

impl ActiveGame {
    /// Build a fresh session for `kind`. `best` is the stored best score
    /// (only 2048 displays it); `seed` feeds the session RNG so tests can
    /// pin it.
    pub fn new(kind: GameKind, best: u32, seed: u64) -> ActiveGame {
        match kind {
            GameKind::Runner => ActiveGame::Runner(RunnerGame::with_seed(seed)),
            GameKind::Snake => ActiveGame::Snake(SnakeGame::with_seed(seed)),
            GameKind::TwentyFortyEight => {
                ActiveGame::TwentyFortyEight(Game2048::with_seed(best, seed))
            }
        }
    }
}

impl Game for ActiveGame {
    fn kind(&self) -> GameKind {
        match self {
            ActiveGame::Runner(game) => game.kind(),
            ActiveGame::Snake(game) => game.kind(),
            ActiveGame::TwentyFortyEight(game) => game.kind(),
        }
    }

    fn tick_rate(&self) -> Option<Duration> {
        match self {
            ActiveGame::Runner(game) => game.tick_rate(),
            ActiveGame::Snake(game) => game.tick_rate(),
            ActiveGame::TwentyFortyEight(game) => game.tick_rate(),
        }
    }

    fn on_tick(&mut self, dt_ms: u32, ctx: &Context) {
        match self {
            ActiveGame::Runner(game) => game.on_tick(dt_ms, ctx),
            ActiveGame::Snake(game) => game.on_tick(dt_ms, ctx),
            ActiveGame::TwentyFortyEight(game) => game.on_tick(dt_ms, ctx),
        }
    }

    fn handle_input(&mut self, key: KeyEvent, ctx: &Context) {
        match self {
            ActiveGame::Runner(game) => game.handle_input(key, ctx),
            ActiveGame::Snake(game) => game.handle_input(key, ctx),
            ActiveGame::TwentyFortyEight(game) => game.handle_input(key, ctx),
        }
    }

    fn render(&self, frame: &mut Frame) {
        match self {
            ActiveGame::Runner(game) => game.render(frame),
            ActiveGame::Snake(game) => game.render(frame),
            ActiveGame::TwentyFortyEight(game) => game.render(frame),
        }
    }
}
