use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::timer::OneShot;
use crate::{Context, Game, GameKind, SessionEvent};

pub const LANES: usize = 3;

/// Logical field the simulation runs in. Entities scroll downward from
/// negative offsets, the player sits near the bottom; the renderer maps
/// this space onto whatever terminal area it gets.
pub const FIELD_WIDTH: f32 = 300.0;
pub const FIELD_HEIGHT: f32 = 600.0;

pub const BASE_SPEED: f32 = 2.5;
pub const SPEED_PER_PICKUP: f32 = 0.05;

/// Fixed-duration parametric jump: airborne for exactly this many ticks.
pub const JUMP_TICKS: u32 = 30;
const JUMP_RISE: f32 = 80.0;

const PLAYER_SIZE: f32 = 32.0;
const GROUND_CLEARANCE: f32 = 68.0;
const DESPAWN_MARGIN: f32 = 50.0;

const SCORE_PER_LEVEL: u32 = 500;
const MAX_LEVEL: u32 = 8;
const BASE_SPAWN_INTERVAL_MS: u32 = 1500;
const MIN_SPAWN_INTERVAL_MS: u32 = 800;

const PICKUP_CHANCE: f64 = 0.75;
const COIN_TRAIN_CHANCE: f64 = 0.4;
const COIN_TRAIN_LEN: usize = 5;
const COIN_TRAIN_SPACING: f32 = 60.0;
const OBSTACLE_SPAWN_OFFSET: f32 = -140.0;

const OBSTACLE_WEIGHTS: [(EntityKind, f32); 5] = [
    (EntityKind::Block, 0.30),
    (EntityKind::Train, 0.20),
    (EntityKind::Wall, 0.20),
    (EntityKind::Spike, 0.15),
    (EntityKind::Barrier, 0.15),
];

const PICKUP_WEIGHTS: [(EntityKind, f32); 3] = [
    (EntityKind::Coin, 0.70),
    (EntityKind::GoldCoin, 0.25),
    (EntityKind::Gem, 0.05),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Block,
    Train,
    Wall,
    Spike,
    Barrier,
    Coin,
    GoldCoin,
    Gem,
}

impl EntityKind {
    pub const fn is_obstacle(self) -> bool {
        matches!(
            self,
            EntityKind::Block
                | EntityKind::Train
                | EntityKind::Wall
                | EntityKind::Spike
                | EntityKind::Barrier
        )
    }

    /// Width and height of the entity's collision box.
    pub const fn size(self) -> (f32, f32) {
        match self {
            EntityKind::Block => (32.0, 48.0),
            EntityKind::Train => (32.0, 80.0),
            EntityKind::Wall => (32.0, 64.0),
            EntityKind::Spike => (32.0, 32.0),
            EntityKind::Barrier => (64.0, 48.0),
            EntityKind::Coin => (20.0, 20.0),
            EntityKind::GoldCoin => (24.0, 24.0),
            EntityKind::Gem => (22.0, 22.0),
        }
    }

    pub const fn points(self) -> u32 {
        match self {
            EntityKind::Coin => 100,
            EntityKind::GoldCoin => 250,
            EntityKind::Gem => 500,
            _ => 0,
        }
    }

    /// Vertical offset entities of this kind enter the field at. Short
    /// obstacles start closer to the visible edge.
    const fn spawn_offset(self) -> f32 {
        match self {
            EntityKind::Spike => -40.0,
            EntityKind::Barrier => -60.0,
            _ => OBSTACLE_SPAWN_OFFSET,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entity {
    pub kind: EntityKind,
    pub lane: usize,
    pub y: f32,
}

impl Entity {
    fn rect(&self) -> Rect {
        let (w, h) = self.kind.size();
        Rect::centered_on(lane_center(self.lane), self.y, w, h)
    }
}

/// Axis-aligned box in field coordinates, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rect {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

impl Rect {
    /// Box of width `w` and height `h` horizontally centered on `cx` with
    /// its top edge at `top`.
    fn centered_on(cx: f32, top: f32, w: f32, h: f32) -> Self {
        Self {
            left: cx - w / 2.0,
            top,
            right: cx + w / 2.0,
            bottom: top + h,
        }
    }

    fn overlaps(&self, other: &Rect) -> bool {
        self.left < other.right
            && self.right > other.left
            && self.top < other.bottom
            && self.bottom > other.top
    }
}

pub fn lane_center(lane: usize) -> f32 {
    FIELD_WIDTH * (2 * lane + 1) as f32 / (2 * LANES) as f32
}

/// The endless-runner session: three lanes, obstacles and coins scrolling
/// down, one player dodging between them.
pub struct RunnerGame {
    lane: usize,
    jump_ticks_left: u32,
    entities: Vec<Entity>,
    score: u32,
    speed: f32,
    game_over: bool,
    spawn_timer: OneShot,
    rng: StdRng,
}

impl RunnerGame {
    pub fn with_seed(seed: u64) -> Self {
        let mut game = Self {
            lane: 1,
            jump_ticks_left: 0,
            entities: Vec::new(),
            score: 0,
            speed: BASE_SPEED,
            game_over: false,
            spawn_timer: OneShot::idle(),
            rng: StdRng::seed_from_u64(seed),
        };
        game.reset();
        game
    }

    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Reinitialize the session. First entry and restart-after-game-over
    /// both go through here, so the resulting state is always the same:
    /// no entities, player centered, score zero, base speed.
    pub fn reset(&mut self) {
        self.entities.clear();
        self.lane = 1;
        self.jump_ticks_left = 0;
        self.score = 0;
        self.speed = BASE_SPEED;
        self.game_over = false;
        self.spawn_timer.cancel();
        self.spawn_timer.schedule(self.spawn_interval_ms());
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn lane(&self) -> usize {
        self.lane
    }

    pub fn airborne(&self) -> bool {
        self.jump_ticks_left > 0
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    fn level(&self) -> u32 {
        (self.score / SCORE_PER_LEVEL).min(MAX_LEVEL)
    }

    pub fn spawn_interval_ms(&self) -> u32 {
        BASE_SPAWN_INTERVAL_MS
            .saturating_sub(100 * self.level())
            .max(MIN_SPAWN_INTERVAL_MS)
    }

    pub fn obstacle_chance(&self) -> f64 {
        (0.5 + 0.05 * f64::from(self.level())).min(0.8)
    }

    fn pattern_chance(&self) -> f64 {
        (0.1 + 0.02 * f64::from(self.level())).min(0.25)
    }

    pub fn move_left(&mut self) {
        if self.game_over {
            return;
        }
        self.lane = self.lane.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.game_over {
            return;
        }
        self.lane = (self.lane + 1).min(LANES - 1);
    }

    /// No-op while already airborne.
    pub fn jump(&mut self) {
        if self.game_over || self.airborne() {
            return;
        }
        self.jump_ticks_left = JUMP_TICKS;
    }

    /// One spawn-scheduler firing. Interval and probabilities are re-derived
    /// from the live score by the caller; this only produces the burst.
    ///
    /// Invariant: a single burst never puts obstacles in all three lanes,
    /// so the row it creates always has a passable gap.
    pub fn spawn_burst(&mut self) {
        let mut obstacle_lanes = [false; LANES];

        if self.rng.random_bool(self.obstacle_chance()) {
            let kind = pick_weighted(&mut self.rng, &OBSTACLE_WEIGHTS);
            let lane = self.rng.random_range(0..LANES);
            self.entities.push(Entity { kind, lane, y: kind.spawn_offset() });
            obstacle_lanes[lane] = true;

            // Occasional double: same kind in the next lane over. At most
            // two lanes are ever occupied by one burst.
            if self.rng.random_bool(self.pattern_chance()) {
                let second = (lane + 1) % LANES;
                self.entities.push(Entity {
                    kind,
                    lane: second,
                    y: OBSTACLE_SPAWN_OFFSET,
                });
                obstacle_lanes[second] = true;
            }
        }

        debug_assert!(obstacle_lanes.iter().any(|occupied| !occupied));

        if self.rng.random_bool(PICKUP_CHANCE) {
            if self.rng.random_bool(COIN_TRAIN_CHANCE) {
                let lane = self.rng.random_range(0..LANES);
                for i in 0..COIN_TRAIN_LEN {
                    self.entities.push(Entity {
                        kind: EntityKind::Coin,
                        lane,
                        y: -40.0 - COIN_TRAIN_SPACING * i as f32,
                    });
                }
            } else {
                let kind = pick_weighted(&mut self.rng, &PICKUP_WEIGHTS);
                let open = self.open_lanes();
                let lane = open[self.rng.random_range(0..open.len())];
                let y = [-40.0, -60.0, -80.0][self.rng.random_range(0..3)];
                self.entities.push(Entity { kind, lane, y });
            }
        }
    }

    /// Lanes with no obstacle near the spawn area, so single pickups don't
    /// land on top of something fatal. Falls back to every lane when the
    /// whole top band is blocked.
    fn open_lanes(&self) -> Vec<usize> {
        let mut blocked = [false; LANES];
        for entity in &self.entities {
            if entity.kind.is_obstacle() && entity.y > -200.0 && entity.y < 0.0 {
                blocked[entity.lane] = true;
            }
        }
        let open: Vec<usize> = (0..LANES).filter(|lane| !blocked[*lane]).collect();
        if open.is_empty() {
            (0..LANES).collect()
        } else {
            open
        }
    }

    fn player_rect(&self) -> Rect {
        let lift = if self.airborne() { JUMP_RISE } else { 0.0 };
        let bottom = FIELD_HEIGHT - GROUND_CLEARANCE - lift;
        Rect::centered_on(
            lane_center(self.lane),
            bottom - PLAYER_SIZE,
            PLAYER_SIZE,
            PLAYER_SIZE,
        )
    }

    /// One animation frame: move entities, advance the jump, resolve
    /// collisions, purge what has scrolled past the bottom.
    pub fn advance_frame(&mut self) {
        if self.game_over {
            return;
        }

        for entity in &mut self.entities {
            entity.y += self.speed;
        }

        if self.jump_ticks_left > 0 {
            self.jump_ticks_left -= 1;
        }

        self.resolve_collisions();

        self.entities
            .retain(|entity| entity.y <= FIELD_HEIGHT + DESPAWN_MARGIN);
    }

    fn resolve_collisions(&mut self) {
        let player = self.player_rect();

        // Obstacles only matter on the ground; a fatal hit ends the frame
        // before any pickup can still score.
        if !self.airborne()
            && self
                .entities
                .iter()
                .any(|e| e.kind.is_obstacle() && e.rect().overlaps(&player))
        {
            self.game_over = true;
            return;
        }

        // Pickups score once: removal on first contact.
        let mut i = 0;
        while i < self.entities.len() {
            let entity = self.entities[i];
            if !entity.kind.is_obstacle() && entity.rect().overlaps(&player) {
                self.score += entity.kind.points();
                self.speed += SPEED_PER_PICKUP;
                self.entities.swap_remove(i);
            } else {
                i += 1;
            }
        }
    }
}

impl Default for RunnerGame {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for RunnerGame {
    fn kind(&self) -> GameKind {
        GameKind::Runner
    }

    fn tick_rate(&self) -> Option<Duration> {
        Some(Duration::from_millis(16))
    }

    fn on_tick(&mut self, dt_ms: u32, ctx: &Context) {
        if self.game_over {
            return;
        }

        if self.spawn_timer.advance(dt_ms) {
            self.spawn_burst();
            self.spawn_timer.schedule(self.spawn_interval_ms());
        }

        self.advance_frame();

        if self.game_over {
            self.spawn_timer.cancel();
            ctx.send(SessionEvent::Finished {
                kind: GameKind::Runner,
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
            KeyCode::Left | KeyCode::Char('a') => self.move_left(),
            KeyCode::Right | KeyCode::Char('d') => self.move_right(),
            KeyCode::Char(' ') | KeyCode::Up => self.jump(),
            _ => {}
        }
    }

    fn render(&self, frame: &mut ratatui::Frame) {
        super::renderer::draw(frame, self);
    }
}

fn pick_weighted(rng: &mut StdRng, choices: &[(EntityKind, f32)]) -> EntityKind {
    let mut roll: f32 = rng.random();
    for (kind, weight) in choices {
        if roll < *weight {
            return *kind;
        }
        roll -= weight;
    }
    choices[choices.len() - 1].0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> RunnerGame {
        RunnerGame::with_seed(7)
    }

    fn place(game: &mut RunnerGame, kind: EntityKind, lane: usize, y: f32) {
        game.entities.push(Entity { kind, lane, y });
    }

    /// Put an entity right on the player's row so the next frame collides.
    fn place_on_player(game: &mut RunnerGame, kind: EntityKind) {
        let (_, h) = kind.size();
        let y = FIELD_HEIGHT - GROUND_CLEARANCE - h;
        place(game, kind, game.lane(), y);
    }

    #[test]
    fn lane_shift_clamps_at_edges() {
        let mut game = game();
        game.move_left();
        assert_eq!(game.lane(), 0);
        game.move_left();
        assert_eq!(game.lane(), 0);
        game.move_right();
        game.move_right();
        assert_eq!(game.lane(), 2);
        game.move_right();
        assert_eq!(game.lane(), 2);
    }

    #[test]
    fn jump_is_noop_while_airborne() {
        let mut game = game();
        game.jump();
        assert!(game.airborne());
        for _ in 0..10 {
            game.advance_frame();
        }
        let before = game.jump_ticks_left;
        game.jump();
        assert_eq!(game.jump_ticks_left, before);
    }

    #[test]
    fn jump_lasts_exactly_thirty_ticks() {
        let mut game = game();
        game.jump();
        for _ in 0..JUMP_TICKS {
            assert!(game.airborne());
            game.advance_frame();
        }
        assert!(!game.airborne());
    }

    #[test]
    fn scroll_is_monotonic() {
        let mut game = game();
        place(&mut game, EntityKind::Block, 0, -140.0);
        place(&mut game, EntityKind::Coin, 2, -40.0);
        let mut last: Vec<f32> = game.entities().iter().map(|e| e.y).collect();
        for _ in 0..50 {
            game.advance_frame();
            for (entity, prev) in game.entities().iter().zip(&last) {
                assert!(entity.y > *prev);
            }
            last = game.entities().iter().map(|e| e.y).collect();
        }
    }

    #[test]
    fn coin_scores_once_and_bumps_speed() {
        let mut game = game();
        place_on_player(&mut game, EntityKind::Coin);
        game.advance_frame();
        assert_eq!(game.score(), 100);
        assert!((game.speed() - (BASE_SPEED + SPEED_PER_PICKUP)).abs() < 1e-6);
        // Entity is gone; nothing more to score.
        game.advance_frame();
        assert_eq!(game.score(), 100);
    }

    #[test]
    fn pickup_values_differ_by_kind() {
        for (kind, points) in [
            (EntityKind::Coin, 100),
            (EntityKind::GoldCoin, 250),
            (EntityKind::Gem, 500),
        ] {
            let mut game = game();
            place_on_player(&mut game, kind);
            game.advance_frame();
            assert_eq!(game.score(), points);
        }
    }

    #[test]
    fn grounded_obstacle_hit_ends_session() {
        let mut game = game();
        place_on_player(&mut game, EntityKind::Block);
        game.advance_frame();
        assert!(game.game_over());
    }

    #[test]
    fn no_score_changes_after_game_over() {
        let mut game = game();
        place_on_player(&mut game, EntityKind::Block);
        place_on_player(&mut game, EntityKind::Gem);
        game.advance_frame();
        assert!(game.game_over());
        let frozen = game.score();
        for _ in 0..20 {
            game.advance_frame();
        }
        assert_eq!(game.score(), frozen);
    }

    #[test]
    fn airborne_player_clears_obstacles() {
        let mut game = game();
        game.jump();
        place_on_player(&mut game, EntityKind::Spike);
        game.advance_frame();
        assert!(!game.game_over());
    }

    #[test]
    fn offscreen_entity_retires_without_scoring() {
        let mut game = game();
        place(&mut game, EntityKind::Coin, 0, FIELD_HEIGHT + DESPAWN_MARGIN);
        game.advance_frame();
        assert!(game.entities().is_empty());
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn burst_always_leaves_a_free_lane() {
        let mut game = game();
        // Pin difficulty to the cap so obstacle and pattern odds are maxed.
        game.score = SCORE_PER_LEVEL * MAX_LEVEL;
        for _ in 0..500 {
            game.entities.clear();
            game.spawn_burst();
            let mut lanes = [false; LANES];
            for entity in game.entities() {
                if entity.kind.is_obstacle() {
                    lanes[entity.lane] = true;
                }
            }
            assert!(lanes.iter().any(|occupied| !occupied));
        }
    }

    #[test]
    fn difficulty_curve_caps() {
        let mut game = game();
        assert_eq!(game.spawn_interval_ms(), 1500);
        assert!((game.obstacle_chance() - 0.5).abs() < 1e-9);

        game.score = 2000; // level 4
        assert_eq!(game.spawn_interval_ms(), 1100);
        assert!((game.obstacle_chance() - 0.7).abs() < 1e-9);

        game.score = 1_000_000; // far past the cap
        assert_eq!(game.spawn_interval_ms(), 800);
        assert!((game.obstacle_chance() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut game = game();
        game.move_left();
        place_on_player(&mut game, EntityKind::Coin);
        game.advance_frame();
        assert_eq!(game.score(), 100);
        place_on_player(&mut game, EntityKind::Wall);
        game.advance_frame();
        assert!(game.game_over());

        game.reset();
        assert_eq!(game.score(), 0);
        assert_eq!(game.speed(), BASE_SPEED);
        assert_eq!(game.lane(), 1);
        assert!(!game.airborne());
        assert!(!game.game_over());
        assert!(game.entities().is_empty());
        assert!(game.spawn_timer.pending());
    }

    #[test]
    fn lane_centers_are_evenly_spread() {
        assert_eq!(lane_center(0), 50.0);
        assert_eq!(lane_center(1), 150.0);
        assert_eq!(lane_center(2), 250.0);
    }
}
