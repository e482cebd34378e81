//! Enemy behaviour set
//!
//! Два архетипа на общем state machine core (`crate::fsm`):
//! - `patroller`: Patrol (Idle/WalkingLeft/WalkingRight) ⇄ Chase
//! - `gunner`: Idle ⇄ Shooting, без движения
//!
//! Общее для всех врагов здесь: sensing дистанции до игрока, реакция на
//! урон (recoil, death sequence), спавн.

use bevy::prelude::*;

use crate::combat::{begin_fade_out, ContactDamage, DamageDealt, Dead};
use crate::components::{Facing, Health, PhysicsBody};
use crate::config::{EnemyVitalsConfig, GunnerConfig, PatrolConfig, ProjectileConfig};
use crate::error::SpawnError;
use crate::physics::{decoration_groups, enemy_groups, Hitbox, PhysicsQueries};
use crate::player::PlayerHandle;
use crate::presentation::AnimationCue;
use crate::schedule::SimulationSet;
use crate::timer::{EnemyTimer, TimerAction, TimerElapsed, TimerScheduler};

pub mod gunner;
pub mod patroller;

// Re-export основных типов
pub use gunner::{Gunner, GunnerContext, GunnerMode};
pub use patroller::{PatrolContext, PatrolMode, PatrolStep, Patroller};

/// Общая часть врага
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
#[require(PhysicsBody, Facing, Health, EnemySenses)]
pub struct Enemy {
    /// false во время hurt recoil и навсегда после смерти
    pub movable: bool,
}

impl Default for Enemy {
    fn default() -> Self {
        Self { movable: true }
    }
}

/// Результаты sensing фазы
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct EnemySenses {
    /// player.x − self.x (знак = сторона игрока)
    pub player_distance: f32,
    /// 0: земля впереди, ±1: край в направлении facing
    pub reach_edge: i8,
}

/// AI Plugin
///
/// Регистрирует системы врагов в фазах кадра:
/// 1. Continuations: recoil end, patrol step, shoot cooldown / projectile spawn
/// 2. Sensing: дистанция до игрока, edge probe
/// 3. Behaviour: transition + execute (patroller, gunner)
/// 4. Reactions: hurt recoil / death sequence
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (
                (
                    handle_recoil_end,
                    patroller::handle_patrol_timers,
                    gunner::handle_gunner_timers,
                )
                    .chain()
                    .in_set(SimulationSet::Continuations),
                (sense_player_distance, patroller::sense_edges)
                    .chain()
                    .in_set(SimulationSet::Sensing),
                (patroller::run_patrollers, gunner::run_gunners)
                    .chain()
                    .in_set(SimulationSet::Behaviour),
                react_to_enemy_damage.in_set(SimulationSet::Reactions),
            ),
        );
    }
}

/// Система: дистанция по x до игрока
pub fn sense_player_distance(
    player: Option<Res<PlayerHandle>>,
    transforms: Query<&Transform>,
    mut enemies: Query<(&Transform, &mut EnemySenses), (With<Enemy>, Without<Dead>)>,
) {
    let Some(player_x) = player
        .and_then(|handle| transforms.get(handle.0).ok())
        .map(|transform| transform.translation.x)
    else {
        return;
    };

    for (transform, mut senses) in enemies.iter_mut() {
        senses.player_distance = player_x - transform.translation.x;
    }
}

/// Система: реакция врага на нанесённый урон
///
/// Жив → recoil velocity (x × facing), движение заблокировано на recoil_time.
/// Умер → isDead cue, velocity = 0, слой Decoration, death impulse, fade-out.
pub fn react_to_enemy_damage(
    mut commands: Commands,
    mut dealt: EventReader<DamageDealt>,
    mut scheduler: ResMut<TimerScheduler>,
    mut cues: EventWriter<AnimationCue>,
    mut enemies: Query<(&mut Enemy, &mut PhysicsBody, &Facing, &EnemyVitalsConfig)>,
) {
    for event in dealt.read() {
        let Ok((mut enemy, mut body, facing, vitals)) = enemies.get_mut(event.target) else {
            continue;
        };

        enemy.movable = false;

        if event.target_died {
            cues.write(AnimationCue::Trigger {
                entity: event.target,
                name: "isDead",
            });

            body.velocity = Vec2::ZERO;
            body.apply_impulse(Vec2::new(
                facing.sign() * vitals.death_force.x,
                vitals.death_force.y,
            ));
            commands.entity(event.target).try_insert(decoration_groups());
            begin_fade_out(&mut commands, &mut scheduler, event.target, vitals.destroy_delay);
            continue;
        }

        body.velocity = Vec2::new(facing.sign() * vitals.hurt_recoil.x, vitals.hurt_recoil.y);
        scheduler.schedule(
            event.target,
            vitals.recoil_time,
            TimerAction::Enemy(EnemyTimer::RecoilEnd),
        );
    }
}

/// Система: конец recoil окна
///
/// Мёртвые остаются неподвижными. Gunner дополнительно гасит скорость.
pub fn handle_recoil_end(
    mut elapsed: EventReader<TimerElapsed>,
    mut enemies: Query<(&mut Enemy, &mut PhysicsBody, Has<Gunner>), Without<Dead>>,
) {
    for timer in elapsed.read() {
        if timer.action != TimerAction::Enemy(EnemyTimer::RecoilEnd) {
            continue;
        }
        let Ok((mut enemy, mut body, is_gunner)) = enemies.get_mut(timer.owner) else {
            continue;
        };

        enemy.movable = true;
        if is_gunner {
            body.velocity = Vec2::ZERO;
        }
    }
}

/// Общие компоненты врага
fn enemy_base(position: Vec2, vitals: &EnemyVitalsConfig) -> impl Bundle {
    (
        Enemy::default(),
        Health::new(vitals.health),
        ContactDamage::Fixed(vitals.contact_damage),
        vitals.clone(),
        enemy_groups(),
        Hitbox::new(0.8, 1.0),
        Transform::from_translation(position.extend(0.0)),
    )
}

fn require_player(world: &World) -> Result<(), SpawnError> {
    if world.get_resource::<PlayerHandle>().is_none() {
        return Err(SpawnError::MissingCollaborator("PlayerHandle"));
    }
    Ok(())
}

/// Spawn ground patroller
///
/// Коллабораторы (`PhysicsQueries` для edge probe, `PlayerHandle`) проверяются
/// ДО создания entity.
pub fn spawn_patroller(
    world: &mut World,
    position: Vec2,
    vitals: EnemyVitalsConfig,
    patrol: PatrolConfig,
) -> Result<Entity, SpawnError> {
    vitals.validate()?;
    patrol.validate()?;
    if world.get_resource::<PhysicsQueries>().is_none() {
        return Err(SpawnError::MissingCollaborator("PhysicsQueries"));
    }
    require_player(world)?;

    let entity = world
        .spawn((enemy_base(position, &vitals), Patroller::default(), patrol))
        .id();

    crate::logger::log_info(&format!("Patroller {:?} spawned at {:?}", entity, position));
    Ok(entity)
}

/// Spawn gunner (стационарный стрелок)
pub fn spawn_gunner(
    world: &mut World,
    position: Vec2,
    vitals: EnemyVitalsConfig,
    fire: GunnerConfig,
    projectile: ProjectileConfig,
) -> Result<Entity, SpawnError> {
    vitals.validate()?;
    fire.validate()?;
    projectile.validate()?;
    require_player(world)?;

    let entity = world
        .spawn((enemy_base(position, &vitals), Gunner::default(), fire, projectile))
        .id();

    crate::logger::log_info(&format!("Gunner {:?} spawned at {:?}", entity, position));
    Ok(entity)
}
