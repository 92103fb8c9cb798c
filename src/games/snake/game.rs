use std::collections::VecDeque;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Context, Game, GameKind, SessionEvent};

pub const GRID: i16 = 20;

const START_INTERVAL_MS: u32 = 150;
const MIN_INTERVAL_MS: u32 = 50;
const SPEEDUP_PER_FOOD_MS: u32 = 2;
const POINTS_PER_FOOD: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub x: i16,
    pub y: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    const fn delta(self) -> (i16, i16) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Snake on a 20×20 grid. The step cadence doubles as the session tick
/// rate, shortening a little with every food eaten.
pub struct SnakeGame {
    body: VecDeque<Cell>,
    dir: Direction,
    food: Cell,
    score: u32,
    interval_ms: u32,
    game_over: bool,
    rng: StdRng,
}

impl SnakeGame {
    pub fn with_seed(seed: u64) -> Self {
        let mut game = Self {
            body: VecDeque::new(),
            dir: Direction::Right,
            food: Cell { x: 0, y: 0 },
            score: 0,
            interval_ms: START_INTERVAL_MS,
            game_over: false,
            rng: StdRng::seed_from_u64(seed),
        };
        game.reset();
        game
    }

    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    pub fn reset(&mut self) {
        self.body.clear();
        self.body.push_front(Cell { x: 10, y: 10 });
        self.dir = Direction::Right;
        self.score = 0;
        self.interval_ms = START_INTERVAL_MS;
        self.game_over = false;
        self.food = self.spawn_food();
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn body(&self) -> impl Iterator<Item = &Cell> {
        self.body.iter()
    }

    pub fn head(&self) -> Cell {
        *self.body.front().expect("snake always has a head")
    }

    pub fn food(&self) -> Cell {
        self.food
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub fn direction(&self) -> Direction {
        self.dir
    }

    /// Turn the snake; direct reversals are rejected.
    pub fn turn(&mut self, dir: Direction) {
        if self.game_over || dir == self.dir.opposite() {
            return;
        }
        self.dir = dir;
    }

    fn occupied(&self, cell: Cell) -> bool {
        self.body.iter().any(|segment| *segment == cell)
    }

    fn spawn_food(&mut self) -> Cell {
        loop {
            let candidate = Cell {
                x: self.rng.random_range(0..GRID),
                y: self.rng.random_range(0..GRID),
            };
            if !self.occupied(candidate) {
                return candidate;
            }
        }
    }

    /// Advance one cell. Walls and the snake's own body are fatal; food
    /// grows the snake, scores, and speeds the cadence up.
    pub fn step(&mut self) {
        if self.game_over {
            return;
        }

        let (dx, dy) = self.dir.delta();
        let head = self.head();
        let next = Cell { x: head.x + dx, y: head.y + dy };

        if next.x < 0 || next.x >= GRID || next.y < 0 || next.y >= GRID {
            self.game_over = true;
            return;
        }
        if self.occupied(next) {
            self.game_over = true;
            return;
        }

        self.body.push_front(next);

        if next == self.food {
            self.score += POINTS_PER_FOOD;
            self.interval_ms = self
                .interval_ms
                .saturating_sub(SPEEDUP_PER_FOOD_MS)
                .max(MIN_INTERVAL_MS);
            if self.body.len() as i32 >= i32::from(GRID) * i32::from(GRID) {
                // Board full: nowhere left to place food.
                self.game_over = true;
                return;
            }
            self.food = self.spawn_food();
        } else {
            self.body.pop_back();
        }
    }
}

impl Default for SnakeGame {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for SnakeGame {
    fn kind(&self) -> GameKind {
        GameKind::Snake
    }

    fn tick_rate(&self) -> Option<Duration> {
        Some(Duration::from_millis(u64::from(self.interval_ms)))
    }

    fn on_tick(&mut self, _dt_ms: u32, ctx: &Context) {
        if self.game_over {
            return;
        }
        self.step();
        if self.game_over {
            ctx.send(SessionEvent::Finished {
                kind: GameKind::Snake,
                score: self.score,
            });
        }
    }

    fn handle_input(&mut self, key: KeyEvent, ctx: &Context) {
        if self.game_over {
            match key.code {
                KeyCode::Char('r') | KeyCode::Enter => self.reset(),
                KeyCode::Char('b') | KeyCode::Char('q') => ctx.send(SessionEvent::ExitToMenu),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('w') => self.turn(Direction::Up),
            KeyCode::Down | KeyCode::Char('s') => self.turn(Direction::Down),
            KeyCode::Left | KeyCode::Char('a') => self.turn(Direction::Left),
            KeyCode::Right | KeyCode::Char('d') => self.turn(Direction::Right),
            _ => {}
        }
    }

    fn render(&self, frame: &mut ratatui::Frame) {
        super::renderer::draw(frame, self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> SnakeGame {
        SnakeGame::with_seed(11)
    }

    #[test]
    fn starts_centered_heading_right() {
        let game = game();
        assert_eq!(game.head(), Cell { x: 10, y: 10 });
        assert_eq!(game.direction(), Direction::Right);
        assert_eq!(game.body().count(), 1);
    }

    #[test]
    fn moves_one_cell_per_step() {
        let mut game = game();
        game.step();
        assert_eq!(game.head(), Cell { x: 11, y: 10 });
        assert_eq!(game.body().count(), 1);
    }

    #[test]
    fn eating_food_grows_scores_and_speeds_up() {
        let mut game = game();
        game.food = Cell { x: 11, y: 10 };
        game.step();
        assert_eq!(game.score(), POINTS_PER_FOOD);
        assert_eq!(game.body().count(), 2);
        assert_eq!(game.interval_ms(), START_INTERVAL_MS - SPEEDUP_PER_FOOD_MS);
        assert_ne!(game.food(), Cell { x: 11, y: 10 });
    }

    #[test]
    fn wall_contact_is_fatal() {
        let mut game = game();
        for _ in 0..GRID {
            game.step();
        }
        assert!(game.game_over());
    }

    #[test]
    fn direct_reversal_is_rejected() {
        let mut game = game();
        game.turn(Direction::Left);
        assert_eq!(game.direction(), Direction::Right);
        game.turn(Direction::Up);
        assert_eq!(game.direction(), Direction::Up);
        game.turn(Direction::Down);
        assert_eq!(game.direction(), Direction::Up);
    }

    #[test]
    fn self_collision_is_fatal() {
        let mut game = game();
        // Grow to length 5 by feeding directly in front of the head.
        for _ in 0..4 {
            let head = game.head();
            game.food = Cell { x: head.x + 1, y: head.y };
            game.step();
        }
        assert_eq!(game.body().count(), 5);
        // Turn back into the body: up, left, down lands on a segment.
        game.turn(Direction::Up);
        game.step();
        game.turn(Direction::Left);
        game.step();
        game.turn(Direction::Down);
        game.step();
        assert!(game.game_over());
    }

    #[test]
    fn interval_never_drops_below_floor() {
        let mut game = game();
        game.interval_ms = MIN_INTERVAL_MS + 1;
        for _ in 0..2 {
            let head = game.head();
            game.food = Cell { x: head.x + 1, y: head.y };
            game.step();
            assert_eq!(game.interval_ms(), MIN_INTERVAL_MS);
        }
    }

    #[test]
    fn food_never_spawns_on_snake() {
        let mut game = game();
        for _ in 0..50 {
            let food = game.spawn_food();
            assert!(!game.occupied(food));
        }
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut game = game();
        game.food = Cell { x: 11, y: 10 };
        game.step();
        for _ in 0..GRID {
            game.step();
        }
        assert!(game.game_over());

        game.reset();
        assert_eq!(game.score(), 0);
        assert_eq!(game.head(), Cell { x: 10, y: 10 });
        assert_eq!(game.interval_ms(), START_INTERVAL_MS);
        assert!(!game.game_over());
    }
}
