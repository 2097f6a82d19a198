//! Simulation module
//!
//! All gameplay logic lives here:
//! - Physics in per-frame units, one step per host callback
//! - One seeded RNG owned by the world
//! - Obstacles and projectiles recycled through object pools
//! - No rendering or platform dependencies below [`Engine`]

pub mod engine;
pub mod geometry;
pub mod pool;
pub mod spawn;
pub mod state;
pub mod tick;

pub use engine::Engine;
pub use geometry::{Rect, check_collision, is_vertical_collision};
pub use pool::ObjectPool;
pub use spawn::{activate_block, activate_block_at, obstacle_rect};
pub use state::{
    Boss, Contact, GameEvent, GamePhase, Obstacle, ObstacleKind, Player, Projectile, World,
};
pub use tick::{TickInput, tick};
