//! World state and core simulation types
//!
//! Everything a frame reads or writes lives in [`World`]. Entities are plain
//! structs; obstacles and projectiles cycle through [`ObjectPool`]s.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use super::pool::ObjectPool;
use crate::consts::*;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    /// Idle, nothing simulated
    Menu,
    /// Simulation advances every frame
    Playing,
    /// Player crashed (terminal)
    GameOver,
    /// Boss defeated (terminal)
    Victory,
    /// A level is being generated; owned by the host, ignored by the engine
    Generating,
}

impl GamePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::Victory)
    }

    /// Kebab-case name for page styling hooks
    pub fn label(&self) -> &'static str {
        match self {
            GamePhase::Menu => "menu",
            GamePhase::Playing => "playing",
            GamePhase::GameOver => "game-over",
            GamePhase::Victory => "victory",
            GamePhase::Generating => "generating",
        }
    }
}

/// Obstacle tags as they appear in a level descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObstacleKind {
    /// Solid pipe, randomized height
    Pipe,
    /// Walking enemy
    Goomba,
    /// Solid brick block on an elevated lane
    #[default]
    Block,
    /// Solid single-use block that releases a power-up
    QuestionBlock,
    /// Empty space; never materialized
    Gap,
    Coin,
    /// Rolling shell enemy
    Shell,
    /// Power-up granting fire power
    FireFlower,
    /// Stationary hazard
    Piranha,
}

/// What touching an obstacle does to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    Coin,
    PowerUp,
    Solid,
    Lethal,
    /// Nothing to touch
    Empty,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 9] = [
        ObstacleKind::Pipe,
        ObstacleKind::Goomba,
        ObstacleKind::Block,
        ObstacleKind::QuestionBlock,
        ObstacleKind::Gap,
        ObstacleKind::Coin,
        ObstacleKind::Shell,
        ObstacleKind::FireFlower,
        ObstacleKind::Piranha,
    ];

    pub fn contact(&self) -> Contact {
        match self {
            ObstacleKind::Coin => Contact::Coin,
            ObstacleKind::FireFlower => Contact::PowerUp,
            ObstacleKind::Pipe | ObstacleKind::Block | ObstacleKind::QuestionBlock => {
                Contact::Solid
            }
            ObstacleKind::Goomba | ObstacleKind::Shell | ObstacleKind::Piranha => Contact::Lethal,
            ObstacleKind::Gap => Contact::Empty,
        }
    }

    pub fn is_solid(&self) -> bool {
        self.contact() == Contact::Solid
    }

    /// Enemies a fireball can destroy
    pub fn is_hazard(&self) -> bool {
        matches!(
            self,
            ObstacleKind::Goomba | ObstacleKind::Shell | ObstacleKind::Piranha
        )
    }

    /// Leftward pace on top of the world scroll
    pub fn creep_speed(&self) -> f32 {
        match self {
            ObstacleKind::Goomba => 2.0,
            ObstacleKind::Shell => 4.0,
            ObstacleKind::Pipe
            | ObstacleKind::Block
            | ObstacleKind::QuestionBlock
            | ObstacleKind::Gap
            | ObstacleKind::Coin
            | ObstacleKind::FireFlower
            | ObstacleKind::Piranha => 0.0,
        }
    }
}

/// The player's kart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub rect: Rect,
    pub vy: f32,
    pub is_grounded: bool,
    /// Cosmetic lean in degrees
    pub rotation: f32,
    pub has_fire_power: bool,
}

impl Player {
    /// Fresh kart resting on the ground line
    pub fn new() -> Self {
        Self {
            rect: Rect::new(
                PLAYER_X_OFFSET,
                GROUND_Y - PLAYER_HEIGHT,
                PLAYER_WIDTH,
                PLAYER_HEIGHT,
            ),
            vy: 0.0,
            is_grounded: true,
            rotation: 0.0,
            has_fire_power: false,
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

/// A scrolling obstacle, pickup or enemy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    pub rect: Rect,
    /// Scored or consumed; ignored by further collision checks
    pub passed: bool,
    /// Bonus block already triggered
    pub is_used: bool,
    /// Own velocity (launched power-ups); zero for scenery
    pub vel: Vec2,
}

impl Obstacle {
    /// Neutral state applied when an instance leaves the pool
    pub fn reset(&mut self) {
        self.id = 0;
        self.kind = ObstacleKind::default();
        self.rect = Rect::default();
        self.passed = false;
        self.is_used = false;
        self.vel = Vec2::ZERO;
    }

    /// Park off-screen until the cull pass returns it to the pool
    pub fn retire(&mut self) {
        self.passed = true;
        self.rect.y = RETIRED_Y;
        self.vel = Vec2::ZERO;
    }

    pub fn is_launched(&self) -> bool {
        self.vel != Vec2::ZERO
    }
}

/// A fireball (player) or boss shot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub rect: Rect,
    pub vel: Vec2,
}

impl Projectile {
    pub fn reset(&mut self) {
        self.id = 0;
        self.rect = Rect::default();
        self.vel = Vec2::ZERO;
    }

    /// Move past the right cull line
    pub fn retire(&mut self) {
        self.rect.x = RETIRED_X;
        self.vel = Vec2::ZERO;
    }
}

/// The end-of-run boss
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub rect: Rect,
    pub hp: u32,
    pub max_hp: u32,
    pub active: bool,
    pub defeated: bool,
    /// Vertical bob velocity
    pub vy: f32,
    /// Frames until the next shot
    pub shoot_timer: u32,
}

impl Boss {
    pub fn new() -> Self {
        Self {
            rect: Rect::new(BOSS_ENTRY_X, BOSS_ENTRY_Y, BOSS_WIDTH, BOSS_HEIGHT),
            hp: BOSS_HP,
            max_hp: BOSS_HP,
            active: false,
            defeated: false,
            vy: BOSS_BOB_SPEED,
            shoot_timer: BOSS_SHOOT_INTERVAL,
        }
    }
}

impl Default for Boss {
    fn default() -> Self {
        Self::new()
    }
}

/// Notifications produced during a frame, drained by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    PhaseChanged(GamePhase),
    ScoreChanged(u64),
    Announce(String),
}

/// Complete simulation state for one engine
pub struct World {
    pub phase: GamePhase,
    pub player: Player,
    pub boss: Boss,
    /// Live obstacles in spawn order (the tail is the newest)
    pub obstacles: Vec<Obstacle>,
    pub projectiles: Vec<Projectile>,
    pub enemy_projectiles: Vec<Projectile>,
    pub game_speed: f32,
    pub distance: f32,
    /// Cursor into the level's cyclic obstacle sequence
    pub next_obstacle_index: usize,
    /// Distance until which spawning is held back by a gap token
    pub gap_until: f32,
    pub score: u64,
    /// Frames since the run started
    pub frame_count: u64,
    /// Host timestamp of the last fireball
    pub last_shot_ms: f64,
    pub rng: Pcg32,
    pub obstacle_pool: ObjectPool<Obstacle>,
    pub projectile_pool: ObjectPool<Projectile>,
    /// Pending notifications
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl World {
    pub fn new(seed: u64) -> Self {
        Self {
            phase: GamePhase::Menu,
            player: Player::new(),
            boss: Boss::new(),
            obstacles: Vec::new(),
            projectiles: Vec::new(),
            enemy_projectiles: Vec::new(),
            game_speed: GAME_SPEED_INITIAL,
            distance: 0.0,
            next_obstacle_index: 0,
            gap_until: 0.0,
            score: 0,
            frame_count: 0,
            last_shot_ms: f64::NEG_INFINITY,
            rng: Pcg32::seed_from_u64(seed),
            obstacle_pool: ObjectPool::new(Obstacle::default, Obstacle::reset, POOL_PREWARM),
            projectile_pool: ObjectPool::new(Projectile::default, Projectile::reset, POOL_PREWARM),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Discard the current run. Live entities go back to their pools.
    pub fn reset(&mut self) {
        for obstacle in self.obstacles.drain(..) {
            self.obstacle_pool.release(obstacle);
        }
        for projectile in self
            .projectiles
            .drain(..)
            .chain(self.enemy_projectiles.drain(..))
        {
            self.projectile_pool.release(projectile);
        }

        self.player = Player::new();
        self.boss = Boss::new();
        self.game_speed = GAME_SPEED_INITIAL;
        self.distance = 0.0;
        self.next_obstacle_index = 0;
        self.gap_until = 0.0;
        self.score = 0;
        self.frame_count = 0;
        self.last_shot_ms = f64::NEG_INFINITY;
        self.events.clear();
    }

    /// Add to the score and queue a notification
    pub fn add_score(&mut self, points: u64) {
        self.score += points;
        self.events.push(GameEvent::ScoreChanged(self.score));
    }

    pub fn announce(&mut self, message: impl Into<String>) {
        self.events.push(GameEvent::Announce(message.into()));
    }

    pub fn set_phase(&mut self, phase: GamePhase) {
        self.phase = phase;
        self.events.push(GameEvent::PhaseChanged(phase));
    }

    /// Pull an obstacle from the pool and append it to the live list
    pub fn spawn_obstacle(&mut self, kind: ObstacleKind, rect: Rect, vel: Vec2) {
        let id = self.next_entity_id();
        let mut obstacle = self.obstacle_pool.get();
        obstacle.id = id;
        obstacle.kind = kind;
        obstacle.rect = rect;
        obstacle.vel = vel;
        self.obstacles.push(obstacle);
    }

    /// Pull a projectile from the pool
    pub fn make_projectile(&mut self, rect: Rect, vel: Vec2) -> Projectile {
        let id = self.next_entity_id();
        let mut projectile = self.projectile_pool.get();
        projectile.id = id;
        projectile.rect = rect;
        projectile.vel = vel;
        projectile
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("phase", &self.phase)
            .field("score", &self.score)
            .field("distance", &self.distance)
            .field("game_speed", &self.game_speed)
            .field("obstacles", &self.obstacles.len())
            .field("projectiles", &self.projectiles.len())
            .field("enemy_projectiles", &self.enemy_projectiles.len())
            .field("boss", &self.boss)
            .finish()
    }
}
