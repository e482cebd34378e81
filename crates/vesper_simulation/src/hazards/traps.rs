//! Traps: falling, unstable platform, moving, deadly

use bevy::prelude::*;
use bevy_rapier2d::prelude::CollisionGroups;

use super::TrapTriggered;
use crate::combat::begin_fade_out;
use crate::components::PhysicsBody;
use crate::physics::{decoration_groups, ContactEvent, ContactPhase, LAYER_PLATFORM};
use crate::player::PlayerHandle;
use crate::presentation::AnimationCue;
use crate::timer::{HazardTimer, TimerAction, TimerElapsed, TimerScheduler};

/// Висит без гравитации, пока не сработает; падает со следующего кадра
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
#[require(PhysicsBody)]
pub struct FallingTrap {
    pub destroy_delay: f32,
    /// Сработала в этом кадре, гравитация включится в следующем
    pub pending: bool,
    pub landed: bool,
}

impl FallingTrap {
    pub fn new(destroy_delay: f32) -> Self {
        Self {
            destroy_delay,
            pending: false,
            landed: false,
        }
    }
}

/// Платформа, которая рушится после касания игрока
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct UnstablePlatform {
    pub trigger_delay: f32,
    pub self_destroy_delay: f32,
    pub triggered: bool,
}

impl UnstablePlatform {
    pub fn new(trigger_delay: f32, self_destroy_delay: f32) -> Self {
        Self {
            trigger_delay,
            self_destroy_delay,
            triggered: false,
        }
    }

    /// Запустить обрушение (один раз)
    pub fn trigger(&mut self) -> bool {
        if self.triggered {
            return false;
        }
        self.triggered = true;
        true
    }
}

/// Кинематическая платформа-маятник по x
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct MovingTrap {
    pub speed: f32,
    pub limit: f32,
    pub offset: f32,
    pub base: Vec2,
}

impl MovingTrap {
    pub fn new(base: Vec2, speed: f32, limit: f32) -> Self {
        Self {
            speed,
            limit,
            offset: 0.0,
            base,
        }
    }

    /// Шаг на `dt`: разворот при |offset| ≥ limit, база сдвигается
    pub fn advance(&mut self, dt: f32) -> Vec2 {
        let next = self.offset + dt * self.speed;
        if next.abs() >= self.limit {
            self.speed = -self.speed;
            self.base.x += self.offset;
            self.offset = 0.0;
        } else {
            self.offset = next;
        }
        Vec2::new(self.base.x + self.offset, self.base.y)
    }
}

/// Система: TrapTriggered → конкретная ловушка
///
/// Ловушки без реакции на trigger (moving, deadly) игнорируют событие.
pub fn trigger_traps(
    mut triggered: EventReader<TrapTriggered>,
    mut scheduler: ResMut<TimerScheduler>,
    mut falling: Query<&mut FallingTrap>,
    mut platforms: Query<&mut UnstablePlatform>,
) {
    for event in triggered.read() {
        if let Ok(mut trap) = falling.get_mut(event.trap) {
            trap.pending = true;
        } else if let Ok(mut platform) = platforms.get_mut(event.trap) {
            if platform.trigger() {
                scheduler.schedule(
                    event.trap,
                    platform.trigger_delay,
                    TimerAction::Hazard(HazardTimer::PlatformCrumble),
                );
            }
        }
    }
}

/// Система: отложенное включение гравитации
pub fn drop_falling_traps(mut traps: Query<(&mut FallingTrap, &mut PhysicsBody)>) {
    for (mut trap, mut body) in traps.iter_mut() {
        if trap.pending {
            trap.pending = false;
            body.gravity_scale = 1.0;
        }
    }
}

/// Система: падающая ловушка коснулась платформы → decoration + fade-out
pub fn land_falling_traps(
    mut commands: Commands,
    mut contacts: EventReader<ContactEvent>,
    mut scheduler: ResMut<TimerScheduler>,
    groups: Query<&CollisionGroups>,
    mut traps: Query<&mut FallingTrap>,
) {
    for contact in contacts.read() {
        if contact.phase != ContactPhase::Enter {
            continue;
        }
        let Ok(mut trap) = traps.get_mut(contact.entity) else {
            continue;
        };
        let on_platform = groups
            .get(contact.other)
            .is_ok_and(|g| g.memberships.intersects(LAYER_PLATFORM));
        if trap.landed || !on_platform {
            continue;
        }

        trap.landed = true;
        commands.entity(contact.entity).try_insert(decoration_groups());
        begin_fade_out(&mut commands, &mut scheduler, contact.entity, trap.destroy_delay);
    }
}

/// Система: игрок встал на нестабильную платформу
pub fn touch_unstable_platforms(
    mut contacts: EventReader<ContactEvent>,
    mut triggered: EventWriter<TrapTriggered>,
    player: Option<Res<PlayerHandle>>,
    platforms: Query<(), With<UnstablePlatform>>,
) {
    let Some(player) = player else {
        contacts.clear();
        return;
    };

    for contact in contacts.read() {
        if contact.phase == ContactPhase::Enter
            && contact.other == player.0
            && platforms.contains(contact.entity)
        {
            triggered.write(TrapTriggered {
                trap: contact.entity,
            });
        }
    }
}

/// Система: trigger delay истёк → платформа проваливается
pub fn crumble_platforms(
    mut commands: Commands,
    mut elapsed: EventReader<TimerElapsed>,
    mut scheduler: ResMut<TimerScheduler>,
    mut cues: EventWriter<AnimationCue>,
    platforms: Query<&UnstablePlatform>,
) {
    for timer in elapsed.read() {
        if timer.action != TimerAction::Hazard(HazardTimer::PlatformCrumble) {
            continue;
        }
        let Ok(platform) = platforms.get(timer.owner) else {
            continue;
        };

        cues.write(AnimationCue::Trigger {
            entity: timer.owner,
            name: "trigger",
        });
        commands.entity(timer.owner).try_insert(decoration_groups());
        scheduler.schedule_from(
            timer.deadline,
            timer.owner,
            platform.self_destroy_delay,
            TimerAction::Despawn,
        );
    }
}

/// Система: маятник
pub fn move_traps(time: Res<Time>, mut traps: Query<(&mut MovingTrap, &mut Transform)>) {
    let dt = time.delta_secs();
    for (mut trap, mut transform) in traps.iter_mut() {
        let position = trap.advance(dt);
        transform.translation.x = position.x;
        transform.translation.y = position.y;
    }
}

/// Система: игрок на движущейся ловушке едет вместе с ней
pub fn drag_riders(
    time: Res<Time>,
    mut contacts: EventReader<ContactEvent>,
    player: Option<Res<PlayerHandle>>,
    traps: Query<&MovingTrap>,
    mut transforms: Query<&mut Transform>,
) {
    let Some(player) = player else {
        contacts.clear();
        return;
    };
    let dt = time.delta_secs();

    for contact in contacts.read() {
        if contact.phase != ContactPhase::Stay || contact.other != player.0 {
            continue;
        }
        let Ok(trap) = traps.get(contact.entity) else {
            continue;
        };
        if let Ok(mut transform) = transforms.get_mut(player.0) {
            transform.translation.x += trap.speed * dt;
        }
    }
}
