use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use rand::Rng;
use tracing::info;

use crate::core::engine::Engine;
use crate::core::game::GameKind;
use crate::core::menu::{MenuManager, MenuResult};
use crate::core::store::{JsonFileStore, Scoreboard};
use crate::games::ActiveGame;

#[derive(Parser)]
#[command(name = "termcade")]
#[command(about = "🕹️ Retro arcade games for your terminal")]
#[command(version)]
pub struct Cli {
    /// Path to the scores file (default: ~/.termcade.json)
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Jump straight into a game
    Play {
        /// Game id (see `list`)
        game: String,
    },
    /// List available games
    List,
    /// Show stored best scores and play counters
    Stats,
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let path = cli.data_file.unwrap_or_else(JsonFileStore::default_path);
    let mut scores = Scoreboard::new(JsonFileStore::open(path));

    match cli.command {
        Some(Commands::Play { game }) => {
            let kind = GameKind::from_id(&game).ok_or_else(|| {
                anyhow!(
                    "game '{}' not found; available: {}",
                    game,
                    GameKind::ALL.map(GameKind::id).join(", ")
                )
            })?;
            run_arcade(Some(kind), &mut scores).await
        }

        Some(Commands::List) => {
            println!("🎮 Available games:");
            println!();
            for kind in GameKind::ALL {
                println!("📦 {} {} ({})", kind.icon(), kind.name(), kind.id());
                println!("   {}", kind.description());
                println!();
            }
            Ok(())
        }

        Some(Commands::Stats) => {
            for kind in GameKind::ALL {
                println!(
                    "{:<14} best {:>8}   games {:>6}   total {:>10}",
                    kind.name(),
                    scores.best(kind),
                    scores.games_played(kind),
                    scores.total_score(kind),
                );
            }
            Ok(())
        }

        None => run_arcade(None, &mut scores).await,
    }
}

async fn run_arcade(first: Option<GameKind>, scores: &mut Scoreboard) -> Result<()> {
    let mut terminal = ratatui::init();
    let result = arcade_loop(&mut terminal, first, scores).await;
    ratatui::restore();
    result
}

/// The shell loop: launcher menu and game sessions swap the live screen
/// until the player quits from the menu.
async fn arcade_loop(
    terminal: &mut ratatui::DefaultTerminal,
    mut first: Option<GameKind>,
    scores: &mut Scoreboard,
) -> Result<()> {
    let mut menu = MenuManager::new();

    loop {
        let kind = match first.take() {
            Some(kind) => kind,
            None => match menu.run(terminal, scores)? {
                MenuResult::Play(kind) => kind,
                MenuResult::Quit => return Ok(()),
            },
        };

        info!(game = kind.id(), best = scores.best(kind), "starting session");
        let session = ActiveGame::new(kind, scores.best(kind), rand::rng().random());
        Engine::new(session).run(terminal, scores).await?;
    }
}
