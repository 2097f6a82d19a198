//! Data-driven game balance
//!
//! Difficulty presets and theme palettes. Both are read-only tables looked up
//! by exhaustive match; the engine consumes them and never mutates them.

use serde::{Deserialize, Serialize};

use crate::consts::{BASE_SPACING, MAX_GAME_SPEED, SPACING_PER_SPEED};

/// Difficulty label carried by a level descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Parse a label. Unknown labels silently become `Medium`.
    pub fn from_label(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "easy" => Difficulty::Easy,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }

    pub fn tuning(&self) -> DifficultyTuning {
        match self {
            Difficulty::Easy => DifficultyTuning {
                speed_multiplier: 0.8,
                spacing_multiplier: 1.3,
            },
            Difficulty::Medium => DifficultyTuning {
                speed_multiplier: 1.0,
                spacing_multiplier: 1.0,
            },
            Difficulty::Hard => DifficultyTuning {
                speed_multiplier: 1.25,
                spacing_multiplier: 0.8,
            },
        }
    }
}

impl From<String> for Difficulty {
    fn from(s: String) -> Self {
        Difficulty::from_label(&s)
    }
}

/// Physics/spawn multipliers for a difficulty preset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyTuning {
    /// Scales the scroll speed cap
    pub speed_multiplier: f32,
    /// Scales the minimum gap between spawned obstacles
    pub spacing_multiplier: f32,
}

impl DifficultyTuning {
    /// Scroll speed the world ramps toward
    pub fn max_speed(&self) -> f32 {
        MAX_GAME_SPEED * self.speed_multiplier
    }

    /// Minimum horizontal gap before the next obstacle may spawn
    pub fn min_spacing(&self, speed: f32) -> f32 {
        BASE_SPACING * self.spacing_multiplier + speed * SPACING_PER_SPEED
    }
}

/// Visual theme of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Theme {
    #[default]
    Overworld,
    Underground,
    Castle,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Overworld => "OVERWORLD",
            Theme::Underground => "UNDERGROUND",
            Theme::Castle => "CASTLE",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "OVERWORLD" => Some(Theme::Overworld),
            "UNDERGROUND" => Some(Theme::Underground),
            "CASTLE" => Some(Theme::Castle),
            _ => None,
        }
    }

    pub fn palette(&self) -> &'static ThemePalette {
        match self {
            Theme::Overworld => &OVERWORLD,
            Theme::Underground => &UNDERGROUND,
            Theme::Castle => &CASTLE,
        }
    }
}

/// RGBA colour
pub type Color = [f32; 4];

/// Convert 0xRRGGBB into an opaque colour
pub const fn hex(rgb: u32) -> Color {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
        1.0,
    ]
}

/// Colour table for one theme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemePalette {
    pub sky: Color,
    pub ground: Color,
    pub ground_detail: Color,
    pub pipe: Color,
    pub pipe_highlight: Color,
    pub block: Color,
    pub brick_lines: Color,
    pub hill: Color,
    pub bush: Color,
    pub cloud: Color,
}

pub const OVERWORLD: ThemePalette = ThemePalette {
    sky: hex(0x5c94fc),
    ground: hex(0xc84c0c),
    ground_detail: hex(0xdba463),
    pipe: hex(0x00aa00),
    pipe_highlight: hex(0x55ff55),
    block: hex(0xb84e00),
    brick_lines: hex(0x000000),
    hill: hex(0x009900),
    bush: hex(0x00cc00),
    cloud: hex(0xffffff),
};

pub const UNDERGROUND: ThemePalette = ThemePalette {
    sky: hex(0x000000),
    ground: hex(0x0055aa),
    ground_detail: hex(0x4499ea),
    pipe: hex(0x22cc22),
    pipe_highlight: hex(0x88ff88),
    block: hex(0x0055aa),
    brick_lines: hex(0xffffff),
    hill: hex(0x004400),
    bush: hex(0x006600),
    cloud: hex(0x444444),
};

pub const CASTLE: ThemePalette = ThemePalette {
    sky: hex(0x000000),
    ground: hex(0x888888),
    ground_detail: hex(0xaaaaaa),
    pipe: hex(0x555555),
    pipe_highlight: hex(0x777777),
    block: hex(0x884400),
    brick_lines: hex(0x000000),
    hill: hex(0x330000),
    bush: hex(0x550000),
    cloud: hex(0x333333),
};
