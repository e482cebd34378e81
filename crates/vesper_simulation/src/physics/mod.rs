//! Physics collaborator boundary
//!
//! Симуляция НЕ владеет физикой. Она:
//! - читает/пишет rapier компоненты (`Velocity`, `ExternalImpulse`, `GravityScale`)
//!   через рабочую копию `PhysicsBody`
//! - делает shape-cast запросы через `ShapeCaster` trait
//! - получает `ContactEvent` (Enter/Stay/Exit) от физического движка
//!
//! Бэкенды:
//! - `HeadlessPhysicsPlugin`: минимальный интегратор + AABB контакты (тесты, headless runner)
//! - `RapierBridgePlugin`: rapier тела/коллайдеры + `CollisionEvent` → `ContactEvent`
//!   (шаг мира делает `RapierPhysicsPlugin` хоста)

use bevy::prelude::*;
use bevy_rapier2d::prelude::{CollisionGroups, ExternalImpulse, GravityScale, Group, Velocity};
use std::collections::BTreeSet;

use crate::components::PhysicsBody;

pub mod headless;
pub mod layers;
pub mod rapier_bridge;

pub use headless::{HeadlessPhysicsPlugin, SnapshotCaster, GRAVITY};
pub use layers::*;
pub use rapier_bridge::RapierBridgePlugin;

/// Axis-aligned collider extents (centered on `Transform`)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Hitbox {
    pub half_extents: Vec2,
}

impl Hitbox {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            half_extents: Vec2::new(width * 0.5, height * 0.5),
        }
    }
}

/// Circle swept along `direction` up to `max_distance`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleCast {
    pub origin: Vec2,
    pub radius: f32,
    /// Unit vector
    pub direction: Vec2,
    pub max_distance: f32,
    /// Только коллайдеры, чьи memberships пересекаются с маской
    pub mask: Group,
}

impl CircleCast {
    /// Downward probe (ground / edge sensing)
    pub fn down(origin: Vec2, radius: f32, max_distance: f32, mask: Group) -> Self {
        Self {
            origin,
            radius,
            direction: Vec2::NEG_Y,
            max_distance,
            mask,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeHit {
    pub entity: Entity,
    /// Memberships коллайдера на момент запроса
    pub layer: Group,
    pub distance: f32,
}

/// Shape-cast query seam
pub trait ShapeCaster: Send + Sync {
    /// All hits, nearest first
    fn cast_all(&self, cast: &CircleCast) -> Vec<ShapeHit>;

    fn cast(&self, cast: &CircleCast) -> Option<ShapeHit> {
        self.cast_all(cast).into_iter().next()
    }

    /// Обновить collider snapshot (бэкенды со своим миром игнорируют)
    fn refresh(&mut self, _colliders: &[ColliderSnapshot]) {}
}

/// Collider state captured at the start of a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderSnapshot {
    pub entity: Entity,
    pub center: Vec2,
    pub half_extents: Vec2,
    pub groups: CollisionGroups,
}

/// Resource: активный shape caster
#[derive(Resource)]
pub struct PhysicsQueries(pub Box<dyn ShapeCaster>);

impl PhysicsQueries {
    pub fn new(caster: impl ShapeCaster + 'static) -> Self {
        Self(Box::new(caster))
    }

    pub fn cast(&self, cast: &CircleCast) -> Option<ShapeHit> {
        self.0.cast(cast)
    }

    pub fn cast_all(&self, cast: &CircleCast) -> Vec<ShapeHit> {
        self.0.cast_all(cast)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Enter,
    Stay,
    Exit,
}

/// Event: контакт двух коллайдеров
///
/// Пишется для ОБОИХ порядков пары, так что каждый обработчик фильтрует
/// только по `entity`.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ContactEvent {
    pub entity: Entity,
    pub other: Entity,
    pub phase: ContactPhase,
}

/// Resource: пары в контакте (упорядоченные, для детерминизма)
#[derive(Resource, Debug, Default)]
pub struct ActiveContacts {
    pub pairs: BTreeSet<(Entity, Entity)>,
}

impl ActiveContacts {
    pub fn key(a: Entity, b: Entity) -> (Entity, Entity) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    pub fn contains(&self, a: Entity, b: Entity) -> bool {
        self.pairs.contains(&Self::key(a, b))
    }
}

/// Записать пару в обоих порядках
pub fn write_contact_pair(
    writer: &mut EventWriter<ContactEvent>,
    a: Entity,
    b: Entity,
    phase: ContactPhase,
) {
    writer.write(ContactEvent {
        entity: a,
        other: b,
        phase,
    });
    writer.write(ContactEvent {
        entity: b,
        other: a,
        phase,
    });
}

/// System: собрать collider snapshot для `PhysicsQueries`
pub fn refresh_shape_caster(
    queries: Option<ResMut<PhysicsQueries>>,
    colliders: Query<(Entity, &Transform, &Hitbox, &CollisionGroups)>,
) {
    let Some(mut queries) = queries else {
        return;
    };

    let mut snapshot: Vec<ColliderSnapshot> = colliders
        .iter()
        .map(|(entity, transform, hitbox, groups)| ColliderSnapshot {
            entity,
            center: transform.translation.truncate(),
            half_extents: hitbox.half_extents,
            groups: *groups,
        })
        .collect();

    // Query order не гарантирован: сортируем
    snapshot.sort_by_key(|c| c.entity);
    queries.0.refresh(&snapshot);
}

/// System: physics → рабочая копия (начало кадра)
pub fn read_physics_state(mut bodies: Query<(&mut PhysicsBody, &Velocity, &GravityScale)>) {
    for (mut body, velocity, gravity) in bodies.iter_mut() {
        body.velocity = velocity.linvel;
        body.gravity_scale = gravity.0;
        body.impulse = Vec2::ZERO;
    }
}

/// System: рабочая копия → physics (конец кадра)
pub fn commit_physics_state(
    mut bodies: Query<(
        &mut PhysicsBody,
        &mut Velocity,
        &mut ExternalImpulse,
        &mut GravityScale,
    )>,
) {
    for (mut body, mut velocity, mut impulse, mut gravity) in bodies.iter_mut() {
        velocity.linvel = body.velocity;
        gravity.0 = body.gravity_scale;

        if body.impulse != Vec2::ZERO {
            impulse.impulse += body.impulse;
            body.impulse = Vec2::ZERO;
        }
    }
}
