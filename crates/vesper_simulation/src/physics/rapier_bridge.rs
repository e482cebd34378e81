//! Rapier backend: host-side seam вместо `HeadlessPhysicsPlugin`
//!
//! Что делает bridge:
//! - каждому новому `Hitbox` даёт rapier тело и collider с
//!   `ActiveEvents::COLLISION_EVENTS` (`PhysicsBody` → Dynamic, остальное → Fixed)
//! - переводит `CollisionEvent` в `ContactEvent`. Rapier шлёт только
//!   Started/Stopped, Stay досчитываем по `ActiveContacts`: каждая активная
//!   пара, не начавшаяся в этом кадре, → Stay
//! - shape casts обслуживает `SnapshotCaster` (снимок `Hitbox` кадра), если
//!   хост не поставил свой `PhysicsQueries`
//!
//! Сам `RapierPhysicsPlugin` (шаг мира, sync Transform) добавляет хост:
//! симуляция физикой не владеет.

use bevy::prelude::*;
use bevy_rapier2d::prelude::{ActiveEvents, Collider, CollisionEvent, LockedAxes, RigidBody};

use super::{
    write_contact_pair, ActiveContacts, ContactEvent, ContactPhase, Hitbox, PhysicsQueries,
    SnapshotCaster,
};
use crate::components::PhysicsBody;
use crate::schedule::SimulationSet;

pub struct RapierBridgePlugin;

impl Plugin for RapierBridgePlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<PhysicsQueries>() {
            app.insert_resource(PhysicsQueries::new(SnapshotCaster::default()));
        }

        app.add_event::<CollisionEvent>()
            .add_event::<ContactEvent>()
            .init_resource::<ActiveContacts>()
            .add_systems(
                FixedUpdate,
                (
                    translate_collision_events.in_set(SimulationSet::PhysicsRead),
                    attach_rapier_colliders.in_set(SimulationSet::PhysicsCommit),
                ),
            );
    }
}

/// System: rapier тело + collider для новых `Hitbox`
pub fn attach_rapier_colliders(
    mut commands: Commands,
    added: Query<(Entity, &Hitbox, Has<PhysicsBody>), (Added<Hitbox>, Without<Collider>)>,
) {
    for (entity, hitbox, dynamic) in added.iter() {
        let body = if dynamic {
            RigidBody::Dynamic
        } else {
            RigidBody::Fixed
        };

        commands.entity(entity).try_insert((
            body,
            Collider::cuboid(hitbox.half_extents.x, hitbox.half_extents.y),
            ActiveEvents::COLLISION_EVENTS,
            LockedAxes::ROTATION_LOCKED,
        ));
    }
}

/// System: `CollisionEvent` → `ContactEvent`
pub fn translate_collision_events(
    mut collisions: EventReader<CollisionEvent>,
    mut active: ResMut<ActiveContacts>,
    mut contacts: EventWriter<ContactEvent>,
) {
    let mut started = Vec::new();

    for event in collisions.read() {
        match *event {
            CollisionEvent::Started(a, b, _) => {
                let key = ActiveContacts::key(a, b);
                if active.pairs.insert(key) {
                    started.push(key);
                    write_contact_pair(&mut contacts, key.0, key.1, ContactPhase::Enter);
                }
            }
            CollisionEvent::Stopped(a, b, _) => {
                let key = ActiveContacts::key(a, b);
                if active.pairs.remove(&key) {
                    write_contact_pair(&mut contacts, key.0, key.1, ContactPhase::Exit);
                }
            }
        }
    }

    for &(a, b) in active.pairs.iter() {
        if !started.contains(&(a, b)) {
            write_contact_pair(&mut contacts, a, b, ContactPhase::Stay);
        }
    }
}
