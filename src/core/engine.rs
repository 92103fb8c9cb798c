use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use tracing::info;

use crate::core::game::{Context, Game, SessionEvent};
use crate::core::store::Scoreboard;

/// Drives one game session: draw, poll input, tick. Everything runs on the
/// current task, so ticks and input handling never overlap.
pub struct Engine<G: Game> {
    game: G,
}

impl<G: Game> Engine<G> {
    pub fn new(game: G) -> Self {
        Self { game }
    }

    /// Run the session until the player leaves it. Final scores arriving on
    /// the session's outbox are recorded on `scores` exactly as delivered.
    pub async fn run(mut self, terminal: &mut DefaultTerminal, scores: &mut Scoreboard) -> Result<()> {
        let mut last_tick = Instant::now();

        // Channel for session-to-shell events (back navigation, final score)
        let (outbox_tx, mut outbox_rx) = tokio::sync::mpsc::unbounded_channel::<SessionEvent>();
        let ctx = Context::new(outbox_tx);

        loop {
            terminal.draw(|f| self.game.render(f))?;

            // INPUT (non-blocking)
            if crossterm::event::poll(Duration::from_millis(0))? {
                if let Event::Key(key) = crossterm::event::read()? {
                    if key.kind == KeyEventKind::Press {
                        if key.code == KeyCode::Esc {
                            return Ok(());
                        }
                        self.game.handle_input(key, &ctx);
                    }
                }
            }

            // Always wake the loop periodically so input keeps getting polled
            // even when the game does not use ticks. For games without ticks
            // we use a small sleep to avoid a tight loop while still letting
            // input through.
            let tick_rate = self.game.tick_rate();
            let tick_sleep = tick_rate.unwrap_or(Duration::from_millis(16));
            let tick_fused = tokio::time::sleep(tick_sleep);

            tokio::select! {
                // Session raised an event for the shell
                Some(event) = outbox_rx.recv() => {
                    match event {
                        SessionEvent::Finished { kind, score } => {
                            info!(game = kind.id(), score, "session finished");
                            scores.record(kind, score);
                        }
                        SessionEvent::ExitToMenu => return Ok(()),
                    }
                }

                // Game heartbeat
                _ = tick_fused => {
                    if tick_rate.is_some() {
                        let dt = last_tick.elapsed().as_millis() as u32;
                        last_tick = Instant::now();
                        self.game.on_tick(dt, &ctx);
                    }
                }
            }
        }
    }
}
