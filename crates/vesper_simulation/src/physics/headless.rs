//! Headless physics stand-in
//!
//! Не претендует на точность rapier: только то, что нужно поведению:
//! - гравитация × `GravityScale`, одноразовые `ExternalImpulse` (масса = 1)
//! - приземление на верх платформ, упор в стены
//! - AABB контакты → `ContactEvent` Enter/Stay/Exit
//! - `SnapshotCaster`: circle cast = луч против AABB, расширенного на радиус

use bevy::prelude::*;
use bevy_rapier2d::prelude::{CollisionGroups, ExternalImpulse, GravityScale, Velocity};
use std::collections::BTreeSet;

use super::{
    can_collide, write_contact_pair, ActiveContacts, CircleCast, ColliderSnapshot, ContactEvent,
    ContactPhase, Hitbox, PhysicsQueries, ShapeCaster, ShapeHit, LAYER_PLATFORM, LAYER_WALL,
};
use crate::components::PhysicsBody;
use crate::schedule::SimulationSet;

/// Ускорение свободного падения (units/s²)
pub const GRAVITY: f32 = -20.0;

/// Касание без перекрытия тоже считается контактом
const CONTACT_SLOP: f32 = 0.01;

pub struct HeadlessPhysicsPlugin;

impl Plugin for HeadlessPhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ContactEvent>()
            .init_resource::<ActiveContacts>()
            .insert_resource(PhysicsQueries::new(SnapshotCaster::default()))
            .add_systems(
                FixedUpdate,
                (integrate_bodies, detect_contacts)
                    .chain()
                    .in_set(SimulationSet::PhysicsStep),
            );
    }
}

/// Shape caster по snapshot'у коллайдеров кадра
#[derive(Debug, Default, Clone)]
pub struct SnapshotCaster {
    colliders: Vec<ColliderSnapshot>,
}

impl SnapshotCaster {
    pub fn with_colliders(colliders: Vec<ColliderSnapshot>) -> Self {
        Self { colliders }
    }
}

impl ShapeCaster for SnapshotCaster {
    fn cast_all(&self, cast: &CircleCast) -> Vec<ShapeHit> {
        let mut hits: Vec<ShapeHit> = self
            .colliders
            .iter()
            .filter(|c| c.groups.memberships.intersects(cast.mask))
            .filter_map(|c| {
                let half = c.half_extents + Vec2::splat(cast.radius);
                sweep_aabb(cast.origin, cast.direction, c.center - half, c.center + half)
                    .filter(|t| *t <= cast.max_distance)
                    .map(|distance| ShapeHit {
                        entity: c.entity,
                        layer: c.groups.memberships,
                        distance,
                    })
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.entity.cmp(&b.entity))
        });
        hits
    }

    fn refresh(&mut self, colliders: &[ColliderSnapshot]) {
        self.colliders.clear();
        self.colliders.extend_from_slice(colliders);
    }
}

/// Ray vs AABB (slab test). Origin внутри → 0.
fn sweep_aabb(origin: Vec2, direction: Vec2, min: Vec2, max: Vec2) -> Option<f32> {
    let mut t_enter = 0.0_f32;
    let mut t_exit = f32::INFINITY;

    for axis in 0..2 {
        let o = origin[axis];
        let d = direction[axis];
        if d.abs() < f32::EPSILON {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }

        let t1 = (min[axis] - o) / d;
        let t2 = (max[axis] - o) / d;
        t_enter = t_enter.max(t1.min(t2));
        t_exit = t_exit.min(t1.max(t2));
        if t_enter > t_exit {
            return None;
        }
    }

    Some(t_enter)
}

fn overlaps(a_center: Vec2, a_half: Vec2, b_center: Vec2, b_half: Vec2) -> bool {
    let gap = (a_center - b_center).abs() - (a_half + b_half);
    gap.x <= CONTACT_SLOP && gap.y <= CONTACT_SLOP
}

/// System: интегрировать динамические тела
pub fn integrate_bodies(
    time: Res<Time>,
    mut bodies: Query<
        (
            Entity,
            &mut Transform,
            &mut Velocity,
            &mut ExternalImpulse,
            &GravityScale,
            &CollisionGroups,
            Option<&Hitbox>,
        ),
        With<PhysicsBody>,
    >,
    solids: Query<(Entity, &Transform, &Hitbox, &CollisionGroups), Without<PhysicsBody>>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }

    for (entity, mut transform, mut velocity, mut impulse, gravity, groups, hitbox) in
        bodies.iter_mut()
    {
        velocity.linvel += impulse.impulse;
        impulse.impulse = Vec2::ZERO;
        velocity.linvel.y += GRAVITY * gravity.0 * dt;

        let previous = transform.translation.truncate();
        let mut position = previous + velocity.linvel * dt;

        let Some(hitbox) = hitbox else {
            transform.translation = position.extend(transform.translation.z);
            continue;
        };

        for (solid, solid_transform, solid_box, solid_groups) in solids.iter() {
            if solid == entity || !can_collide(groups, solid_groups) {
                continue;
            }

            let center = solid_transform.translation.truncate();
            let gap = (position - center).abs() - (hitbox.half_extents + solid_box.half_extents);
            if gap.x >= 0.0 || gap.y >= 0.0 {
                continue;
            }

            let top = center.y + solid_box.half_extents.y;
            let was_above = previous.y - hitbox.half_extents.y >= top - CONTACT_SLOP;

            if solid_groups.memberships.intersects(LAYER_PLATFORM) && was_above && velocity.linvel.y <= 0.0 {
                position.y = top + hitbox.half_extents.y;
                velocity.linvel.y = 0.0;
            } else if solid_groups.memberships.intersects(LAYER_WALL | LAYER_PLATFORM) {
                // Выталкиваем по x на сторону, с которой пришли
                let side = if previous.x < center.x { -1.0 } else { 1.0 };
                position.x = center.x + side * (solid_box.half_extents.x + hitbox.half_extents.x);
                velocity.linvel.x = 0.0;
            }
        }

        transform.translation = position.extend(transform.translation.z);
    }
}

/// System: AABB контакты → `ContactEvent`
pub fn detect_contacts(
    colliders: Query<(Entity, &Transform, &Hitbox, &CollisionGroups, Has<PhysicsBody>)>,
    mut active: ResMut<ActiveContacts>,
    mut contacts: EventWriter<ContactEvent>,
) {
    let mut snapshot: Vec<_> = colliders
        .iter()
        .map(|(entity, transform, hitbox, groups, dynamic)| {
            (entity, transform.translation.truncate(), hitbox.half_extents, *groups, dynamic)
        })
        .collect();
    snapshot.sort_by_key(|c| c.0);

    let mut current = BTreeSet::new();
    for (i, a) in snapshot.iter().enumerate() {
        for b in snapshot.iter().skip(i + 1) {
            // Статика со статикой не контактирует
            if !a.4 && !b.4 {
                continue;
            }
            if can_collide(&a.3, &b.3) && overlaps(a.1, a.2, b.1, b.2) {
                current.insert(ActiveContacts::key(a.0, b.0));
            }
        }
    }

    for &(a, b) in current.iter() {
        let phase = if active.pairs.contains(&(a, b)) {
            ContactPhase::Stay
        } else {
            ContactPhase::Enter
        };
        write_contact_pair(&mut contacts, a, b, phase);
    }

    for &(a, b) in active.pairs.difference(&current) {
        write_contact_pair(&mut contacts, a, b, ContactPhase::Exit);
    }

    active.pairs = current;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{platform_groups, LAYER_ENEMY};
    use bevy_rapier2d::prelude::Group;

    fn platform(entity: u32, center: Vec2, half: Vec2) -> ColliderSnapshot {
        ColliderSnapshot {
            entity: Entity::from_raw(entity),
            center,
            half_extents: half,
            groups: platform_groups(),
        }
    }

    #[test]
    fn test_down_cast_hits_platform_below() {
        let caster = SnapshotCaster::with_colliders(vec![platform(
            1,
            Vec2::new(0.0, -1.0),
            Vec2::new(2.0, 0.5),
        )]);

        let hit = caster
            .cast(&CircleCast::down(Vec2::ZERO, 0.2, 0.5, LAYER_PLATFORM))
            .expect("platform below");
        assert_eq!(hit.entity, Entity::from_raw(1));
        assert!((hit.distance - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_cast_respects_distance_and_mask() {
        let caster = SnapshotCaster::with_colliders(vec![platform(
            1,
            Vec2::new(0.0, -3.0),
            Vec2::new(2.0, 0.5),
        )]);

        assert!(caster
            .cast(&CircleCast::down(Vec2::ZERO, 0.2, 0.5, LAYER_PLATFORM))
            .is_none());
        assert!(caster
            .cast(&CircleCast::down(Vec2::ZERO, 0.2, 10.0, LAYER_ENEMY))
            .is_none());
    }

    #[test]
    fn test_cast_all_sorted_by_distance() {
        let caster = SnapshotCaster::with_colliders(vec![
            platform(1, Vec2::new(3.0, 0.0), Vec2::splat(0.5)),
            platform(2, Vec2::new(1.0, 0.0), Vec2::splat(0.5)),
        ]);

        let hits = caster.cast_all(&CircleCast {
            origin: Vec2::ZERO,
            radius: 0.1,
            direction: Vec2::X,
            max_distance: 5.0,
            mask: Group::ALL,
        });

        let order: Vec<_> = hits.iter().map(|h| h.entity).collect();
        assert_eq!(order, vec![Entity::from_raw(2), Entity::from_raw(1)]);
    }
}
