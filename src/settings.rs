use serde::{Deserialize, Serialize};
use tsify::Tsify;

use crate::input::KeyBindings;
use crate::randomizer::RandomizerKind;

pub const DROP_SLOW_MS: f32 = 1000.0;
pub const DROP_QUICK_MS: f32 = 60.0;
/// Largest accepted grid width or height.
pub const MAX_DIMENSION: usize = 1000;

#[derive(Clone, Serialize, Deserialize, Tsify, Debug, PartialEq)]
#[serde(default)]
pub struct GameSettings {
    pub width: usize,
    pub height: usize,
    pub players: usize,
    pub drop_slow_ms: f32,
    pub drop_fast_ms: f32,
    pub randomizer: RandomizerKind,
    /// Entry `n` belongs to player `n`. Missing entries fall back to the
    /// defaults and entries past `players` are ignored.
    pub bindings: Vec<KeyBindings>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            width: 12,
            height: 20,
            players: 2,
            drop_slow_ms: DROP_SLOW_MS,
            drop_fast_ms: DROP_QUICK_MS,
            randomizer: RandomizerKind::default(),
            bindings: KeyBindings::defaults(),
        }
    }
}

impl GameSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!("grid must be at least 1x1, got {}x{}", self.width, self.height));
        }
        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return Err(format!(
                "grid is limited to {MAX_DIMENSION}x{MAX_DIMENSION}, got {}x{}",
                self.width, self.height
            ));
        }
        if self.players == 0 {
            return Err("at least one player is required".into());
        }
        if !(self.drop_slow_ms > 0.0 && self.drop_fast_ms > 0.0) {
            return Err("drop intervals must be positive".into());
        }
        Ok(())
    }

    pub fn timing(&self) -> DropTiming {
        DropTiming {
            slow_ms: self.drop_slow_ms,
            fast_ms: self.drop_fast_ms,
        }
    }

    /// Bindings for `player`, or that player's default set.
    pub fn bindings_for(&self, player: usize) -> KeyBindings {
        self.bindings
            .get(player)
            .cloned()
            .unwrap_or_else(|| KeyBindings::for_player(player))
    }
}

/// The two drop intervals a session switches between.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropTiming {
    pub slow_ms: f32,
    pub fast_ms: f32,
}

impl Default for DropTiming {
    fn default() -> Self {
        Self {
            slow_ms: DROP_SLOW_MS,
            fast_ms: DROP_QUICK_MS,
        }
    }
}
