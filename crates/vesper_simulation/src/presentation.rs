//! Presentation cues (fire-and-forget)
//!
//! Симуляция не знает ничего про спрайты и аниматоры: она только пишет
//! события, хост (рендер/аудио) читает их, если хочет. Ответа нет, ошибок нет.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Animator parameter update
#[derive(Event, Debug, Clone, PartialEq)]
pub enum AnimationCue {
    Trigger { entity: Entity, name: &'static str },
    ResetTrigger { entity: Entity, name: &'static str },
    Bool { entity: Entity, name: &'static str, value: bool },
    Float { entity: Entity, name: &'static str, value: f32 },
}

impl AnimationCue {
    pub fn entity(&self) -> Entity {
        match self {
            AnimationCue::Trigger { entity, .. }
            | AnimationCue::ResetTrigger { entity, .. }
            | AnimationCue::Bool { entity, .. }
            | AnimationCue::Float { entity, .. } => *entity,
        }
    }
}

/// RGBA sprite tint
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct Tint {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Tint {
    pub const WHITE: Tint = Tint { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Tint {
    fn default() -> Self {
        Self::WHITE
    }
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct TintCue {
    pub entity: Entity,
    pub tint: Tint,
}

/// Fade-out progress, 1.0 = opaque
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct OpacityCue {
    pub entity: Entity,
    pub opacity: f32,
}

/// Буфер cue-событий одного кадра
///
/// States и чистые функции пишут сюда, система потом сбрасывает буфер в
/// `EventWriter<AnimationCue>`.
#[derive(Debug, Default)]
pub struct CueBuffer {
    pub cues: Vec<AnimationCue>,
}

impl CueBuffer {
    pub fn trigger(&mut self, entity: Entity, name: &'static str) {
        self.cues.push(AnimationCue::Trigger { entity, name });
    }

    pub fn reset_trigger(&mut self, entity: Entity, name: &'static str) {
        self.cues.push(AnimationCue::ResetTrigger { entity, name });
    }

    pub fn set_bool(&mut self, entity: Entity, name: &'static str, value: bool) {
        self.cues.push(AnimationCue::Bool { entity, name, value });
    }

    pub fn set_float(&mut self, entity: Entity, name: &'static str, value: f32) {
        self.cues.push(AnimationCue::Float { entity, name, value });
    }

    pub fn flush(&mut self, writer: &mut EventWriter<AnimationCue>) {
        for cue in self.cues.drain(..) {
            writer.write(cue);
        }
    }
}
