//! Death sequencing: fade-out + отложенный despawn
//!
//! Любой, кто "умирает красиво" (враг, упавшая ловушка), вызывает
//! `begin_fade_out`: entity получает `FadeOut`, а Despawn таймер ставится на
//! конец fade'а. Удаление: только через таймер, так что все прочие таймеры
//! владельца после этого молча отбрасываются.

use bevy::prelude::*;

use crate::presentation::OpacityCue;
use crate::timer::{TimerAction, TimerElapsed, TimerScheduler};

/// Fade-out прогресс
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct FadeOut {
    pub elapsed: f32,
    pub duration: f32,
}

impl FadeOut {
    pub fn new(duration: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration,
        }
    }

    /// 1.0 = opaque, 0.0 = invisible
    pub fn opacity(&self) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        (1.0 - self.elapsed / self.duration).clamp(0.0, 1.0)
    }
}

/// Запустить fade-out и запланировать despawn
pub fn begin_fade_out(
    commands: &mut Commands,
    scheduler: &mut TimerScheduler,
    entity: Entity,
    duration: f32,
) {
    commands.entity(entity).try_insert(FadeOut::new(duration));
    scheduler.schedule(entity, duration, TimerAction::Despawn);
}

/// Система: fade tick → OpacityCue
pub fn tick_fades(
    time: Res<Time>,
    mut fading: Query<(Entity, &mut FadeOut)>,
    mut opacity: EventWriter<OpacityCue>,
) {
    let dt = time.delta_secs();

    for (entity, mut fade) in fading.iter_mut() {
        fade.elapsed = (fade.elapsed + dt).min(fade.duration.max(0.0));
        opacity.write(OpacityCue {
            entity,
            opacity: fade.opacity(),
        });
    }
}

/// Система: `TimerAction::Despawn` → удалить владельца
pub fn despawn_on_timer(mut commands: Commands, mut elapsed: EventReader<TimerElapsed>) {
    for timer in elapsed.read() {
        if timer.action == TimerAction::Despawn {
            crate::logger::log(&format!("Despawning entity {:?}", timer.owner));
            commands.entity(timer.owner).try_despawn();
        }
    }
}
