/// Score persistence: a small key-value port plus the scoreboard built on it.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use tracing::warn;

use crate::core::game::GameKind;

/// Storage port for integer values under namespaced string keys.
///
/// Sessions never touch storage directly; the shell owns a [`Scoreboard`]
/// and injects results into sessions at construction, so the simulation
/// core carries no ambient persistence state.
pub trait ScoreStore {
    fn get(&self, key: &str) -> Option<i64>;
    fn set(&mut self, key: &str, value: i64);
    /// Persist pending writes. In-memory stores are a no-op.
    fn flush(&mut self) -> Result<()>;
}

/// Volatile store for tests and `--data-file /dev/null` style runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, i64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryStore {
    fn get(&self, key: &str) -> Option<i64> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), value);
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Store backed by a flat JSON object on disk.
pub struct JsonFileStore {
    path: PathBuf,
    values: HashMap<String, i64>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store; a file
    /// that fails to parse is treated the same, with a warning. Individual
    /// non-integer values are dropped rather than failing the whole load.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match Self::load(&path) {
            Ok(values) => values,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to load score file, starting empty");
                HashMap::new()
            }
        };
        Self { path, values }
    }

    fn load(path: &Path) -> Result<HashMap<String, i64>> {
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let raw: HashMap<String, serde_json::Value> =
            serde_json::from_str(&text).context("score file is not a JSON object")?;
        Ok(raw
            .into_iter()
            .filter_map(|(key, value)| value.as_i64().map(|n| (key, n)))
            .collect())
    }

    /// Default location: `$TERMCADE_DATA` if set, else `~/.termcade.json`,
    /// else a file in the current directory.
    pub fn default_path() -> PathBuf {
        if let Some(path) = std::env::var_os("TERMCADE_DATA") {
            return PathBuf::from(path);
        }
        match std::env::var_os("HOME") {
            Some(home) => Path::new(&home).join(".termcade.json"),
            None => PathBuf::from(".termcade.json"),
        }
    }
}

impl ScoreStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<i64> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), value);
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let text = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, text)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}

/// Typed view over a [`ScoreStore`]: best score, games played, and total
/// score, each keyed per game. Reads happen at session init, the single
/// write happens at game over.
pub struct Scoreboard {
    store: Box<dyn ScoreStore>,
}

impl Scoreboard {
    pub fn new(store: impl ScoreStore + 'static) -> Self {
        Self { store: Box::new(store) }
    }

    fn read(&self, kind: GameKind, field: &str) -> u64 {
        // Negative or missing values both read as zero.
        self.store
            .get(&key(kind, field))
            .filter(|value| *value >= 0)
            .unwrap_or(0) as u64
    }

    pub fn best(&self, kind: GameKind) -> u32 {
        self.read(kind, "best").min(u32::MAX as u64) as u32
    }

    pub fn games_played(&self, kind: GameKind) -> u64 {
        self.read(kind, "games")
    }

    pub fn total_score(&self, kind: GameKind) -> u64 {
        self.read(kind, "total-score")
    }

    /// Record one finished session. Called exactly once per session, when
    /// the shell receives the session's `Finished` event.
    pub fn record(&mut self, kind: GameKind, score: u32) {
        let best = self.best(kind).max(score);
        let games = self.games_played(kind) + 1;
        let total = self.total_score(kind) + u64::from(score);
        self.store.set(&key(kind, "best"), i64::from(best));
        self.store.set(&key(kind, "games"), games as i64);
        self.store.set(&key(kind, "total-score"), total as i64);
        if let Err(err) = self.store.flush() {
            warn!(game = kind.id(), error = %err, "failed to persist scores");
        }
    }
}

fn key(kind: GameKind, field: &str) -> String {
    format!("{}.{}", kind.id(), field)
}
