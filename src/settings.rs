//! Player preferences
//!
//! Chosen in the menu and injected into the engine at construction. Not
//! persisted between sessions.

use serde::{Deserialize, Serialize};

use crate::input::KeyBindings;
use crate::tuning::{Color, hex};

/// Kart body colour choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CarColor {
    #[default]
    Red,
    Blue,
    Green,
    Yellow,
    Orange,
    Pink,
    Purple,
    Cyan,
}

impl CarColor {
    pub const ALL: [CarColor; 8] = [
        CarColor::Red,
        CarColor::Blue,
        CarColor::Green,
        CarColor::Yellow,
        CarColor::Orange,
        CarColor::Pink,
        CarColor::Purple,
        CarColor::Cyan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CarColor::Red => "Red",
            CarColor::Blue => "Blue",
            CarColor::Green => "Green",
            CarColor::Yellow => "Yellow",
            CarColor::Orange => "Orange",
            CarColor::Pink => "Pink",
            CarColor::Purple => "Purple",
            CarColor::Cyan => "Cyan",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn rgb(&self) -> u32 {
        match self {
            CarColor::Red => 0xe70000,
            CarColor::Blue => 0x0058f8,
            CarColor::Green => 0x00a800,
            CarColor::Yellow => 0xf8d800,
            CarColor::Orange => 0xf87800,
            CarColor::Pink => 0xf878f8,
            CarColor::Purple => 0x8800cc,
            CarColor::Cyan => 0x00c8f8,
        }
    }

    pub fn rgba(&self) -> Color {
        hex(self.rgb())
    }

    /// CSS form for menu swatches
    pub fn css(&self) -> String {
        format!("#{:06x}", self.rgb())
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub car_color: CarColor,
    pub bindings: KeyBindings,
}
