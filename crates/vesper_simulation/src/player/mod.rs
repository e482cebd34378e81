//! Player behaviour controller
//!
//! ECS ответственность:
//! - `controller`: регионы состояния и чистая логика команд
//! - `systems`: кадр контроллера (refresh → move → jump → fall → sprint → attack)
//! - `climb`: стены: вход/выход из climb
//! - `vitality`: hurt / death реакции, неуязвимость, reload уровня

use bevy::prelude::*;
use bevy_rapier2d::prelude::{Friction, Restitution};

use crate::combat::CombatEvent;
use crate::components::{Facing, Health, PhysicsBody};
use crate::config::PlayerConfig;
use crate::error::SpawnError;
use crate::physics::{player_groups, Hitbox, PhysicsQueries};
use crate::schedule::SimulationSet;

pub mod climb;
pub mod controller;
pub mod systems;
pub mod vitality;


pub use controller::{
    CombatRegion, MovementRegion, PlayerController, PlayerFrame, PlayerInput, SprintRegion,
    Vitality,
};

/// Marker: entity, которым управляет ввод (а не AI)
///
/// В симуляции ровно один игрок; ссылка на него: `PlayerHandle`.
#[derive(Component, Debug, Clone, Copy, Default)]
#[require(PhysicsBody, Facing, Health, PlayerController)]
pub struct Player;

/// Кто сейчас игрок (для сенсоров врагов, контактов, ловушек)
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerHandle(pub Entity);

/// Player Plugin
///
/// Порядок (по фазам кадра):
/// 1. Continuations: таймеры контроллера, затем ECS эффекты vitality таймеров
/// 2. Contacts: стены → climb
/// 3. Player: drive_player
/// 4. Reactions: hurt / death
pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (
                (systems::handle_player_timers, vitality::apply_vitality_timers)
                    .chain()
                    .in_set(SimulationSet::Continuations),
                climb::handle_wall_contacts.in_set(SimulationSet::Contacts),
                systems::drive_player.in_set(SimulationSet::Player),
                vitality::react_to_player_damage.in_set(SimulationSet::Reactions),
            ),
        );
    }
}

/// Spawn player + регистрация `PlayerHandle`
///
/// Ground probe и attack sweep требуют `PhysicsQueries`: проверяем до спавна.
pub fn spawn_player(
    world: &mut World,
    position: Vec2,
    config: PlayerConfig,
) -> Result<Entity, SpawnError> {
    config.validate()?;
    if world.get_resource::<PhysicsQueries>().is_none() {
        return Err(SpawnError::MissingCollaborator("PhysicsQueries"));
    }

    let entity = world
        .spawn((
            Player,
            Health::new(config.health),
            config,
            player_groups(),
            Hitbox::new(0.6, 1.0),
            Friction::coefficient(0.0),
            Restitution::coefficient(0.0),
            Transform::from_translation(position.extend(0.0)),
        ))
        .id();
    world.insert_resource(PlayerHandle(entity));

    crate::logger::log_info(&format!("Player {:?} spawned at {:?}", entity, position));
    Ok(entity)
}

/// Прямой удар по игроку (ловушки-скрипты, тесты)
pub fn hurt_player(world: &mut World, attacker: Entity, damage: u32) -> Option<Entity> {
    let player = world.get_resource::<PlayerHandle>()?.0;
    world.send_event(CombatEvent {
        attacker,
        target: player,
        damage,
        direction: Vec2::ZERO,
    });
    Some(player)
}
