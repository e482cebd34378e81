//! Projectiles (gunner shots)
//!
//! Запуск: velocity = direction.normalize() × speed, гравитации нет.
//! Снаряд живёт `lifetime` секунд (Despawn таймер), исчезает раньше при
//! попадании в игрока (`ContactDamage`) или от удара игрока (sweep).

use bevy::prelude::*;
use bevy_rapier2d::prelude::{GravityScale, Velocity};

use super::contact::ContactDamage;
use crate::components::PhysicsBody;
use crate::config::ProjectileConfig;
use crate::physics::{projectile_groups, Hitbox};
use crate::timer::{TimerAction, TimerScheduler};

pub const PROJECTILE_SIZE: f32 = 0.3;

#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
#[require(PhysicsBody)]
pub struct Projectile {
    /// Кто выстрелил (для логов; снаряд автономен после запуска)
    pub shooter: Entity,
    pub direction: Vec2,
}

/// Spawn + trigger снаряда
pub fn launch_projectile(
    commands: &mut Commands,
    scheduler: &mut TimerScheduler,
    shooter: Entity,
    origin: Vec2,
    direction: Vec2,
    config: &ProjectileConfig,
) -> Entity {
    let velocity = direction.normalize_or_zero() * config.speed;

    let projectile = commands
        .spawn((
            Projectile { shooter, direction },
            ContactDamage::Fixed(config.damage),
            PhysicsBody {
                velocity,
                impulse: Vec2::ZERO,
                gravity_scale: 0.0,
            },
            Velocity::linear(velocity),
            GravityScale(0.0),
            projectile_groups(),
            Hitbox::new(PROJECTILE_SIZE, PROJECTILE_SIZE),
            Transform::from_translation(origin.extend(0.0)),
        ))
        .id();

    scheduler.schedule(projectile, config.lifetime, TimerAction::Despawn);

    crate::logger::log(&format!(
        "Projectile {:?} launched by {:?}, velocity {:?}",
        projectile, shooter, velocity
    ));

    projectile
}
