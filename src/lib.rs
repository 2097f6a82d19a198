//! Kart Dash - A side-scrolling kart platformer
//!
//! Core modules:
//! - `sim`: Simulation (physics, spawning, collisions, boss, game state)
//! - `input`: Action queries over held keys and touch buttons
//! - `level`: Level descriptors, presets and level generation
//! - `tuning`: Data-driven difficulty and theme tables
//! - `renderer`: WebGPU rendering pipeline
//! - `platform`: Browser listener lifecycle and frame loop

pub mod error;
pub mod highscores;
pub mod input;
pub mod level;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{EngineError, LevelError};
pub use highscores::BestScore;
pub use input::{Action, InputState, KeyBindings};
pub use level::LevelConfig;
pub use settings::{CarColor, Settings};

/// Game configuration constants
///
/// Every speed and acceleration is expressed per frame: the simulation advances
/// once per display refresh with no delta-time scaling.
pub mod consts {
    /// Logical canvas dimensions
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;
    pub const GROUND_HEIGHT: f32 = 80.0;
    /// Y of the ground surface (entities rest with their bottom edge here)
    pub const GROUND_Y: f32 = CANVAS_HEIGHT - GROUND_HEIGHT;

    /// Player physics
    pub const GRAVITY: f32 = 0.6;
    pub const JUMP_FORCE: f32 = -13.0;
    pub const FAST_FALL_BOOST: f32 = 1.0;
    pub const PLAYER_SPEED: f32 = 6.0;
    /// Floatier physics while the boss is on screen
    pub const BOSS_PHASE_GRAVITY_SCALE: f32 = 0.5;
    pub const BOSS_PHASE_JUMP_SCALE: f32 = 0.75;

    /// Cosmetic lean (degrees)
    pub const JUMP_ROTATION: f32 = -25.0;
    pub const MAX_FALL_ROTATION: f32 = 20.0;
    pub const ROTATION_STEP: f32 = 2.0;

    /// World scroll
    pub const GAME_SPEED_INITIAL: f32 = 6.0;
    pub const SPEED_INCREMENT: f32 = 0.003;
    pub const MAX_GAME_SPEED: f32 = 12.0;

    /// Spawning
    pub const BASE_SPACING: f32 = 200.0;
    pub const SPACING_PER_SPEED: f32 = 8.0;
    pub const SPAWN_X: f32 = CANVAS_WIDTH + 50.0;
    pub const CULL_MARGIN: f32 = 100.0;

    /// Player
    pub const PLAYER_X_OFFSET: f32 = 100.0;
    pub const PLAYER_WIDTH: f32 = 50.0;
    pub const PLAYER_HEIGHT: f32 = 30.0;
    pub const PLAYER_HIT_PADDING: f32 = 4.0;
    /// Landing tolerance above an obstacle's top edge
    pub const LANDING_TOLERANCE: f32 = 10.0;
    /// Downward kick after bonking a block from below
    pub const BONK_VELOCITY: f32 = 1.0;

    /// Player projectiles
    pub const PROJECTILE_SIZE: f32 = 20.0;
    pub const PROJECTILE_SPEED: f32 = 10.0;
    pub const PROJECTILE_INITIAL_VY: f32 = 5.0;
    pub const PROJECTILE_BOUNCE_VY: f32 = -4.0;
    pub const MAX_PLAYER_PROJECTILES: usize = 3;
    pub const FIRE_COOLDOWN_MS: f64 = 250.0;

    /// Boss encounter
    pub const BOSS_WIDTH: f32 = 100.0;
    pub const BOSS_HEIGHT: f32 = 100.0;
    pub const BOSS_HP: u32 = 10;
    pub const BOSS_SPAWN_DISTANCE: f32 = 8000.0;
    pub const BOSS_ENTRY_X: f32 = CANVAS_WIDTH + 100.0;
    pub const BOSS_ENTRY_Y: f32 = 100.0;
    pub const BOSS_REST_X: f32 = CANVAS_WIDTH - 250.0;
    pub const BOSS_DRIFT_SPEED: f32 = 2.0;
    pub const BOSS_BOB_SPEED: f32 = 2.0;
    pub const BOSS_MIN_Y: f32 = 50.0;
    pub const BOSS_MAX_Y: f32 = 300.0;
    pub const BOSS_SHOOT_INTERVAL: u32 = 120;
    pub const BOSS_SHOT_SPEED: f32 = 6.0;
    pub const BOSS_SHOT_SIZE: f32 = 24.0;
    pub const BOSS_KNOCKBACK: f32 = 10.0;
    pub const ENEMY_HIT_PADDING: f32 = 5.0;

    /// Scoring
    pub const COIN_SCORE: u64 = 50;
    pub const POWERUP_SCORE: u64 = 1000;
    pub const KILL_SCORE: u64 = 100;
    pub const BOSS_DEFEAT_SCORE: u64 = 5000;

    /// Where consumed entities are parked until the cull pass drops them
    pub const RETIRED_Y: f32 = -1000.0;
    pub const RETIRED_X: f32 = CANVAS_WIDTH + 10_000.0;

    /// Pool pre-warm size
    pub const POOL_PREWARM: usize = 10;
}
