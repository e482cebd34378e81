//! Rapier backend: коллайдеры для хоста, CollisionEvent → climb

mod common;

use bevy::prelude::*;
use bevy_rapier2d::prelude::{ActiveEvents, Collider, CollisionEvent, GravityScale, RigidBody};
use bevy_rapier2d::rapier::geometry::CollisionEventFlags;
use common::DT;
use vesper_simulation::config::PlayerConfig;
use vesper_simulation::physics::{wall_groups, Hitbox};
use vesper_simulation::*;

/// App без headless интегратора: физический мир принадлежит хосту
fn rapier_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(11))
        .add_plugins((SimulationPlugin, RapierBridgePlugin));
    app
}

#[test]
fn test_bridge_gives_hitboxes_rapier_colliders() {
    let mut app = rapier_app();
    let wall = app
        .world_mut()
        .spawn((wall_groups(), Hitbox::new(1.0, 10.0), Transform::from_xyz(2.0, 3.0, 0.0)))
        .id();
    let player = spawn_player(app.world_mut(), Vec2::new(0.0, 3.0), PlayerConfig::default())
        .expect("bridge provides shape queries");

    step_frame(&mut app, DT);

    let world = app.world();
    assert_eq!(world.get::<RigidBody>(player), Some(&RigidBody::Dynamic));
    assert_eq!(world.get::<RigidBody>(wall), Some(&RigidBody::Fixed));
    assert!(world.get::<Collider>(wall).is_some());
    assert_eq!(
        world.get::<ActiveEvents>(player),
        Some(&ActiveEvents::COLLISION_EVENTS)
    );
}

#[test]
fn test_rapier_wall_contact_drives_climb() {
    let mut app = rapier_app();
    let wall = app
        .world_mut()
        .spawn((wall_groups(), Hitbox::new(1.0, 10.0), Transform::from_xyz(2.0, 3.0, 0.0)))
        .id();
    let player = spawn_player(app.world_mut(), Vec2::new(0.0, 3.0), PlayerConfig::default())
        .expect("player spawns");
    step_frame(&mut app, DT);

    app.world_mut().send_event(CollisionEvent::Started(
        player,
        wall,
        CollisionEventFlags::empty(),
    ));
    step_frame(&mut app, DT);
    assert!(app.world().get::<PlayerController>(player).unwrap().movement.climbing);
    assert_eq!(app.world().get::<GravityScale>(player).unwrap().0, 0.0);

    // Пара активна: Stay каждый кадр, climb держится
    step_frame(&mut app, DT);
    assert!(app.world().get::<PlayerController>(player).unwrap().movement.climbing);

    app.world_mut().send_event(CollisionEvent::Stopped(
        wall,
        player,
        CollisionEventFlags::empty(),
    ));
    step_frame(&mut app, DT);
    assert!(!app.world().get::<PlayerController>(player).unwrap().movement.climbing);
    assert_eq!(app.world().get::<GravityScale>(player).unwrap().0, 1.0);
}
