//! Hazards & interactables
//!
//! Всё, что на уровне реагирует на игрока, но не является врагом:
//! - `switch`: переключатель (удар атакой) → препятствие исчезает, ловушка срабатывает
//! - `traps`: падающая ловушка, нестабильная платформа, маятник, смертельная поверхность
//! - `LevelExit`: выход уровня → `LevelRequest::Load`
//!
//! Ловушки общаются только событиями: `SwitchActivated`, `TrapTriggered`.

use bevy::prelude::*;
use bevy_rapier2d::prelude::GravityScale;

use crate::combat::ContactDamage;
use crate::components::PhysicsBody;
use crate::level::{LevelProgress, LevelRequest};
use crate::physics::{
    goal_groups, platform_groups, switch_groups, trap_groups, ContactEvent, ContactPhase, Hitbox,
};
use crate::player::PlayerHandle;
use crate::schedule::SimulationSet;

pub mod switch;
pub mod traps;

pub use switch::{activate_switches, Switch};
pub use traps::{FallingTrap, MovingTrap, UnstablePlatform};

/// Event: атака игрока задела переключатель
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchActivated {
    pub switch: Entity,
    pub by: Entity,
}

/// Event: ловушку нужно запустить (переключатель, касание)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrapTriggered {
    pub trap: Entity,
}

/// Препятствие, которое убирает переключатель
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Obstacle;

/// Выход уровня (срабатывает один раз)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct LevelExit {
    pub reached: bool,
}

/// Hazards Plugin
///
/// Порядок (по фазам кадра):
/// 1. Continuations: crumble_platforms
/// 2. Contacts: падение ловушек на платформу, касания платформ, выход, drag
/// 3. Hazards: gravity on → switches → traps → маятники
pub struct HazardsPlugin;

impl Plugin for HazardsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SwitchActivated>()
            .add_event::<TrapTriggered>();

        app.add_systems(
            FixedUpdate,
            (
                traps::crumble_platforms.in_set(SimulationSet::Continuations),
                (
                    traps::land_falling_traps,
                    traps::touch_unstable_platforms,
                    reach_level_exit,
                    traps::drag_riders,
                )
                    .chain()
                    .in_set(SimulationSet::Contacts),
                (
                    traps::drop_falling_traps,
                    switch::activate_switches,
                    traps::trigger_traps,
                    traps::move_traps,
                )
                    .chain()
                    .in_set(SimulationSet::Hazards),
            ),
        );
    }
}

/// Система: игрок коснулся выхода
pub fn reach_level_exit(
    mut contacts: EventReader<ContactEvent>,
    mut requests: EventWriter<LevelRequest>,
    player: Option<Res<PlayerHandle>>,
    progress: Res<LevelProgress>,
    mut exits: Query<&mut LevelExit>,
) {
    let Some(player) = player else {
        contacts.clear();
        return;
    };

    for contact in contacts.read() {
        if contact.phase != ContactPhase::Enter || contact.other != player.0 {
            continue;
        }
        let Ok(mut exit) = exits.get_mut(contact.entity) else {
            continue;
        };
        if exit.reached {
            continue;
        }

        exit.reached = true;
        requests.write(LevelRequest::Load(progress.next_level.clone()));
    }
}

/// Статичный прямоугольник (платформа/стена/препятствие)
fn static_box(center: Vec2, size: Vec2) -> impl Bundle {
    (
        Hitbox::new(size.x, size.y),
        Transform::from_translation(center.extend(0.0)),
    )
}

pub fn spawn_switch(
    world: &mut World,
    center: Vec2,
    obstacle: Option<Entity>,
    trap: Option<Entity>,
) -> Entity {
    world
        .spawn((
            Switch {
                obstacle,
                trap,
                activated: false,
            },
            switch_groups(),
            static_box(center, Vec2::new(0.5, 0.5)),
        ))
        .id()
}

pub fn spawn_obstacle(world: &mut World, center: Vec2, size: Vec2) -> Entity {
    world
        .spawn((Obstacle, platform_groups(), static_box(center, size)))
        .id()
}

pub fn spawn_falling_trap(world: &mut World, center: Vec2, size: Vec2, destroy_delay: f32) -> Entity {
    world
        .spawn((
            FallingTrap::new(destroy_delay),
            PhysicsBody {
                gravity_scale: 0.0,
                ..Default::default()
            },
            GravityScale(0.0),
            trap_groups(),
            static_box(center, size),
        ))
        .id()
}

pub fn spawn_unstable_platform(
    world: &mut World,
    center: Vec2,
    size: Vec2,
    trigger_delay: f32,
    self_destroy_delay: f32,
) -> Entity {
    world
        .spawn((
            UnstablePlatform::new(trigger_delay, self_destroy_delay),
            platform_groups(),
            static_box(center, size),
        ))
        .id()
}

pub fn spawn_moving_trap(world: &mut World, center: Vec2, size: Vec2, speed: f32, limit: f32) -> Entity {
    world
        .spawn((
            MovingTrap::new(center, speed, limit),
            platform_groups(),
            static_box(center, size),
        ))
        .id()
}

/// Шипы / пропасть: касание забирает всё здоровье
pub fn spawn_deadly(world: &mut World, center: Vec2, size: Vec2) -> Entity {
    world
        .spawn((ContactDamage::Lethal, trap_groups(), static_box(center, size)))
        .id()
}

pub fn spawn_level_exit(world: &mut World, center: Vec2, size: Vec2) -> Entity {
    world
        .spawn((LevelExit::default(), goal_groups(), static_box(center, size)))
        .id()
}
