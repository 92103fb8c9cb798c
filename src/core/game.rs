/// Core game interface for the termcade framework
use std::time::Duration;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use tokio::sync::mpsc::UnboundedSender;

/// The closed set of games the arcade ships with.
///
/// Metadata is a table of pure functions over this enum rather than an open
/// trait-object registry, so adding a game means adding a variant and the
/// compiler points at every match that needs updating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKind {
    Runner,
    Snake,
    TwentyFortyEight,
}

impl GameKind {
    pub const ALL: [GameKind; 3] = [GameKind::Runner, GameKind::Snake, GameKind::TwentyFortyEight];

    /// Stable identifier used for CLI selection and score-store namespacing.
    pub const fn id(self) -> &'static str {
        match self {
            GameKind::Runner => "runner",
            GameKind::Snake => "snake",
            GameKind::TwentyFortyEight => "2048",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            GameKind::Runner => "Pixel Runner",
            GameKind::Snake => "Snake",
            GameKind::TwentyFortyEight => "2048",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            GameKind::Runner => "█",
            GameKind::Snake => "🐍",
            GameKind::TwentyFortyEight => "🔢",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            GameKind::Runner => "Retro arcade endless runner",
            GameKind::Snake => "Classic snake game with growing mechanics",
            GameKind::TwentyFortyEight => "Merge tiles to reach 2048",
        }
    }

    pub fn from_id(id: &str) -> Option<GameKind> {
        GameKind::ALL
            .into_iter()
            .find(|kind| kind.id().eq_ignore_ascii_case(id))
    }
}

/// Events a running session sends up to the hosting shell.
///
/// This is the whole session-to-shell surface: navigation back to the
/// launcher, and the final score of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    ExitToMenu,
    Finished { kind: GameKind, score: u32 },
}

/// Handle games use to reach the shell from input/tick callbacks.
#[derive(Clone)]
pub struct Context {
    tx: UnboundedSender<SessionEvent>,
}

impl Context {
    pub fn new(tx: UnboundedSender<SessionEvent>) -> Self {
        Self { tx }
    }

    /// Delivery failure is ignored; the simulation never depends on the
    /// shell having received an event.
    pub fn send(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }
}

/// Main trait every game session implements.
///
/// The engine owns the loop; sessions own all game state. A session that
/// returns `None` from [`Game::tick_rate`] is purely input-driven and its
/// `on_tick` is never called.
pub trait Game {
    fn kind(&self) -> GameKind;

    /// Desired tick cadence right now. May change between ticks (Snake
    /// speeds up as it eats).
    fn tick_rate(&self) -> Option<Duration>;

    /// Advance the simulation. `dt_ms` is the elapsed time since the last
    /// tick; sessions that schedule future work derive deadlines from it.
    fn on_tick(&mut self, dt_ms: u32, ctx: &Context);

    /// Handle one key event. Sessions ignore everything they don't
    /// recognize, and ignore gameplay input entirely once game over.
    fn handle_input(&mut self, key: KeyEvent, ctx: &Context);

    /// Render the current state into the ratatui frame.
    fn render(&self, frame: &mut Frame);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_ids_round_trip() {
        for kind in GameKind::ALL {
            assert_eq!(GameKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(GameKind::from_id("RUNNER"), Some(GameKind::Runner));
        assert_eq!(GameKind::from_id("tetris"), None);
    }

    #[test]
    fn send_after_receiver_dropped_is_silent() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        drop(rx);
        let ctx = Context::new(tx);
        ctx.send(SessionEvent::ExitToMenu);
    }
}
