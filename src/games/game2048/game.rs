use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Context, Game, GameKind, SessionEvent};

pub const SIDE: usize = 4;
pub const WIN_TILE: u32 = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

/// How the session ended, if it has. Winning is terminal the same way
/// losing is; both report the final score once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Playing,
    Won,
    Lost,
}

/// 2048 on a 4×4 grid. Purely input-driven: there is no tick.
pub struct Game2048 {
    grid: [[u32; SIDE]; SIDE],
    score: u32,
    best: u32,
    outcome: Outcome,
    rng: StdRng,
}

impl Game2048 {
    pub fn with_seed(best: u32, seed: u64) -> Self {
        let mut game = Self {
            grid: [[0; SIDE]; SIDE],
            score: 0,
            best,
            outcome: Outcome::Playing,
            rng: StdRng::seed_from_u64(seed),
        };
        game.reset();
        game
    }

    pub fn new(best: u32) -> Self {
        Self::with_seed(best, rand::rng().random())
    }

    pub fn reset(&mut self) {
        self.grid = [[0; SIDE]; SIDE];
        self.score = 0;
        self.outcome = Outcome::Playing;
        self.add_random_tile();
        self.add_random_tile();
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Stored best, tracking the live score as it passes it.
    pub fn best(&self) -> u32 {
        self.best.max(self.score)
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn game_over(&self) -> bool {
        self.outcome != Outcome::Playing
    }

    pub fn tile(&self, row: usize, col: usize) -> u32 {
        self.grid[row][col]
    }

    fn add_random_tile(&mut self) {
        let empty: Vec<(usize, usize)> = (0..SIDE)
            .flat_map(|r| (0..SIDE).map(move |c| (r, c)))
            .filter(|(r, c)| self.grid[*r][*c] == 0)
            .collect();
        if empty.is_empty() {
            return;
        }
        let (r, c) = empty[self.rng.random_range(0..empty.len())];
        self.grid[r][c] = if self.rng.random_bool(0.9) { 2 } else { 4 };
    }

    /// Apply one move. Only a move that changes the grid spawns a new tile
    /// and can end the game; a blocked move is a no-op.
    pub fn shift(&mut self, mv: Move) -> bool {
        if self.game_over() {
            return false;
        }

        let mut moved = false;
        for i in 0..SIDE {
            let line = self.line(mv, i);
            let (merged, gained) = merge_line(line);
            if merged != line {
                moved = true;
            }
            self.score += gained;
            self.set_line(mv, i, merged);
        }

        if moved {
            self.add_random_tile();
            if self.has_tile(WIN_TILE) {
                self.outcome = Outcome::Won;
            } else if self.is_stuck() {
                self.outcome = Outcome::Lost;
            }
        }
        moved
    }

    /// Read row/column `i` oriented so the move direction is "leftward".
    fn line(&self, mv: Move, i: usize) -> [u32; SIDE] {
        let mut line = [0; SIDE];
        for j in 0..SIDE {
            line[j] = match mv {
                Move::Left => self.grid[i][j],
                Move::Right => self.grid[i][SIDE - 1 - j],
                Move::Up => self.grid[j][i],
                Move::Down => self.grid[SIDE - 1 - j][i],
            };
        }
        line
    }

    fn set_line(&mut self, mv: Move, i: usize, line: [u32; SIDE]) {
        for j in 0..SIDE {
            match mv {
                Move::Left => self.grid[i][j] = line[j],
                Move::Right => self.grid[i][SIDE - 1 - j] = line[j],
                Move::Up => self.grid[j][i] = line[j],
                Move::Down => self.grid[SIDE - 1 - j][i] = line[j],
            }
        }
    }

    fn has_tile(&self, value: u32) -> bool {
        self.grid.iter().flatten().any(|tile| *tile == value)
    }

    /// No empty cell and no adjacent equal pair.
    fn is_stuck(&self) -> bool {
        for r in 0..SIDE {
            for c in 0..SIDE {
                if self.grid[r][c] == 0 {
                    return false;
                }
                if r + 1 < SIDE && self.grid[r + 1][c] == self.grid[r][c] {
                    return false;
                }
                if c + 1 < SIDE && self.grid[r][c + 1] == self.grid[r][c] {
                    return false;
                }
            }
        }
        true
    }
}

/// Compact a line toward index 0 and merge equal neighbors once each.
/// Returns the new line and the score gained.
pub fn merge_line(line: [u32; SIDE]) -> ([u32; SIDE], u32) {
    let mut tiles: Vec<u32> = line.iter().copied().filter(|t| *t != 0).collect();
    let mut gained = 0;

    let mut i = 0;
    while i + 1 < tiles.len() {
        if tiles[i] == tiles[i + 1] {
            tiles[i] *= 2;
            gained += tiles[i];
            tiles.remove(i + 1);
        }
        i += 1;
    }

    let mut out = [0; SIDE];
    out[..tiles.len()].copy_from_slice(&tiles);
    (out, gained)
}

impl Game for Game2048 {
    fn kind(&self) -> GameKind {
        GameKind::TwentyFortyEight
    }

    // Input-driven; the engine only needs to keep polling keys.
    fn tick_rate(&self) -> Option<Duration> {
        None
    }

    fn on_tick(&mut self, _dt_ms: u32, _ctx: &Context) {}

    fn handle_input(&mut self, key: KeyEvent, ctx: &Context) {
        if self.game_over() {
            match key.code {
                KeyCode::Char('r') | KeyCode::Enter => self.reset(),
                KeyCode::Char('b') | KeyCode::Char('q') => ctx.send(SessionEvent::ExitToMenu),
                _ => {}
            }
            return;
        }

        let mv = match key.code {
            KeyCode::Up | KeyCode::Char('w') => Move::Up,
            KeyCode::Down | KeyCode::Char('s') => Move::Down,
            KeyCode::Left | KeyCode::Char('a') => Move::Left,
            KeyCode::Right | KeyCode::Char('d') => Move::Right,
            _ => return,
        };

        self.shift(mv);
        if self.game_over() {
            ctx.send(SessionEvent::Finished {
                kind: GameKind::TwentyFortyEight,
                score: self.score,
            });
        }
    }

    fn render(&self, frame: &mut ratatui::Frame) {
        super::renderer::draw(frame, self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_line_compacts_and_merges() {
        assert_eq!(merge_line([2, 2, 0, 0]), ([4, 0, 0, 0], 4));
        assert_eq!(merge_line([0, 2, 0, 2]), ([4, 0, 0, 0], 4));
        assert_eq!(merge_line([2, 2, 2, 2]), ([4, 4, 0, 0], 8));
        assert_eq!(merge_line([4, 2, 2, 0]), ([4, 4, 0, 0], 4));
        assert_eq!(merge_line([2, 4, 8, 16]), ([2, 4, 8, 16], 0));
        assert_eq!(merge_line([0, 0, 0, 0]), ([0, 0, 0, 0], 0));
    }

    #[test]
    fn merged_tile_does_not_merge_again() {
        // [2,2,4] compacts to [4,4] in one move, not [8].
        assert_eq!(merge_line([2, 2, 4, 0]), ([4, 4, 0, 0], 4));
    }

    #[test]
    fn shift_moves_tiles_toward_direction() {
        let mut game = Game2048::with_seed(0, 3);
        game.grid = [[0; SIDE]; SIDE];
        game.grid[0] = [2, 0, 2, 0];
        assert!(game.shift(Move::Left));
        assert_eq!(game.tile(0, 0), 4);
        assert_eq!(game.score(), 4);
    }

    #[test]
    fn blocked_move_spawns_nothing() {
        let mut game = Game2048::with_seed(0, 3);
        game.grid = [[0; SIDE]; SIDE];
        game.grid[0][0] = 2;
        let before = game.grid;
        assert!(!game.shift(Move::Left));
        assert_eq!(game.grid, before);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn vertical_moves_use_columns() {
        let mut game = Game2048::with_seed(0, 3);
        game.grid = [[0; SIDE]; SIDE];
        game.grid[0][1] = 2;
        game.grid[3][1] = 2;
        assert!(game.shift(Move::Down));
        assert_eq!(game.tile(3, 1), 4);
    }

    #[test]
    fn reaching_win_tile_is_terminal() {
        let mut game = Game2048::with_seed(0, 3);
        game.grid = [[0; SIDE]; SIDE];
        game.grid[0][0] = 1024;
        game.grid[0][1] = 1024;
        game.shift(Move::Left);
        assert_eq!(game.outcome(), Outcome::Won);
        assert!(game.game_over());
        // Terminal: further moves are rejected.
        assert!(!game.shift(Move::Right));
    }

    #[test]
    fn stuck_grid_rejects_every_move() {
        let mut game = Game2048::with_seed(0, 3);
        game.grid = [
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
        ];
        assert!(game.is_stuck());
        assert!(!game.shift(Move::Left));
        assert_eq!(game.outcome(), Outcome::Playing);
    }

    #[test]
    fn best_tracks_live_score() {
        let mut game = Game2048::with_seed(8, 3);
        game.grid = [[0; SIDE]; SIDE];
        game.grid[0] = [8, 8, 0, 0];
        game.shift(Move::Left);
        assert_eq!(game.score(), 16);
        assert_eq!(game.best(), 16);
    }

    #[test]
    fn reset_starts_with_two_tiles() {
        let mut game = Game2048::with_seed(0, 3);
        game.reset();
        let tiles = game.grid.iter().flatten().filter(|t| **t != 0).count();
        assert_eq!(tiles, 2);
        assert_eq!(game.score(), 0);
        assert_eq!(game.outcome(), Outcome::Playing);
    }
}
