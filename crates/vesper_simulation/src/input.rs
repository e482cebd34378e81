//! Input seam
//!
//! Хост (клиент, тест, headless runner) пишет в `ButtonInput<PlayerAction>`
//! и `PlayerAxes`; симуляция только читает. Edge-флаги (`just_pressed`,
//! `just_released`) сбрасываются в конце кадра симуляции.

use bevy::prelude::*;

/// Named player actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum PlayerAction {
    Jump,
    Sprint,
    Attack,
}

/// Continuous axes in [-1, 1]
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerAxes {
    pub horizontal: f32,
    pub vertical: f32,
}

impl PlayerAxes {
    pub fn set(&mut self, horizontal: f32, vertical: f32) {
        self.horizontal = horizontal.clamp(-1.0, 1.0);
        self.vertical = vertical.clamp(-1.0, 1.0);
    }
}

/// System: сброс edge-флагов (последний в кадре)
pub fn clear_input_edges(mut buttons: ResMut<ButtonInput<PlayerAction>>) {
    buttons.clear();
}
