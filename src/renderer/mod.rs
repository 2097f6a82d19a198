//! Rendering
//!
//! The simulation hands each frame to a [`Renderer`] after all gameplay
//! decisions are made. Drawing never feeds back into the world.
//!
//! [`shapes::scene`] turns a frame into canvas-space triangles;
//! [`RenderState`] uploads them to WebGPU.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;

use crate::settings::CarColor;
use crate::sim::{Boss, Obstacle, Player, Projectile, World};
use crate::tuning::Theme;

/// Read-only snapshot of everything drawn in one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub theme: Theme,
    /// Cumulative scroll, drives parallax
    pub distance: f32,
    pub player: &'a Player,
    pub obstacles: &'a [Obstacle],
    pub boss: &'a Boss,
    pub projectiles: &'a [Projectile],
    pub enemy_projectiles: &'a [Projectile],
    pub car_color: CarColor,
    /// Frames since the run started, drives animation
    pub frame_count: u64,
}

impl<'a> FrameView<'a> {
    pub fn new(world: &'a World, theme: Theme, car_color: CarColor) -> Self {
        Self {
            theme,
            distance: world.distance,
            player: &world.player,
            obstacles: &world.obstacles,
            boss: &world.boss,
            projectiles: &world.projectiles,
            enemy_projectiles: &world.enemy_projectiles,
            car_color,
            frame_count: world.frame_count,
        }
    }
}

/// Draws a frame. Implementations must not affect simulation state.
pub trait Renderer {
    fn draw(&mut self, frame: &FrameView<'_>);
}

/// Headless renderer for tests and the native demo
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn draw(&mut self, _frame: &FrameView<'_>) {}
}
