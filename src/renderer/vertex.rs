//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

use crate::tuning::Color;

/// 2D vertex with position and color
///
/// Positions are in canvas space (top-left origin, y down) until the pipeline
/// maps them to clip space.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: Color,
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: Color) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Fixed colours for sprites that do not follow the level theme
pub mod colors {
    use crate::tuning::{Color, hex};

    pub const BLACK: Color = hex(0x000000);
    pub const WHITE: Color = hex(0xffffff);
    pub const SHADE: Color = [0.0, 0.0, 0.0, 0.1];
    pub const SUN: Color = hex(0xffd700);
    pub const COIN: Color = hex(0xffd700);
    pub const COIN_EDGE: Color = hex(0xdaa520);
    pub const QUESTION_BLOCK: Color = hex(0xf8931d);
    pub const QUESTION_MARK: Color = hex(0x5a2e03);
    pub const USED_BLOCK: Color = hex(0x8b4513);
    pub const GOOMBA: Color = hex(0x8b4513);
    pub const GOOMBA_FACE: Color = hex(0xcd853f);
    pub const SHELL: Color = hex(0x00aa00);
    pub const SHELL_FEET: Color = hex(0xffff00);
    pub const PIRANHA: Color = hex(0xff0000);
    pub const FLOWER_PETAL: Color = hex(0xff4500);
    pub const FLOWER_CORE: Color = hex(0xffff00);
    pub const FLOWER_LEAF: Color = hex(0x00aa00);
    pub const BOSS_SHELL: Color = hex(0x006400);
    pub const BOSS_BODY: Color = hex(0xffa500);
    pub const BOSS_BELLY: Color = hex(0xfff5e1);
    pub const BOSS_HORN: Color = hex(0xff0000);
    pub const HP_BAR: Color = hex(0xff0000);
    pub const FIREBALL: Color = hex(0xff4400);
    pub const BOSS_SHOT: Color = hex(0xff0000);
    pub const WHEEL: Color = hex(0x000000);
    pub const EXHAUST: Color = hex(0x555555);
    pub const SKIN: Color = hex(0xffccaa);
    pub const LAVA: Color = [1.0, 0.27, 0.0, 0.35];
}
