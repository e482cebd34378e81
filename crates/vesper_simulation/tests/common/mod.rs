//! Общие хелперы интеграционных тестов

#![allow(dead_code)]

use bevy::prelude::*;
use vesper_simulation::config::PlayerConfig;
use vesper_simulation::physics::{platform_groups, Hitbox};
use vesper_simulation::timer::TimerElapsed;
use vesper_simulation::{create_headless_app, spawn_player, step_frame, PlayerAction, SimulationSet};

/// 1/64 s: точно представимо во float, дедлайны таймеров совпадают с кадрами
pub const DT: f32 = 1.0 / 64.0;

/// App + пол (верх на y = 0) + игрок стоит в `player_x`
pub fn arena(seed: u64, player_x: f32, player: PlayerConfig) -> (App, Entity) {
    let mut app = create_headless_app(seed);
    let world = app.world_mut();

    world.spawn((
        platform_groups(),
        Hitbox::new(100.0, 1.0),
        Transform::from_xyz(0.0, -0.5, 0.0),
    ));

    let player = spawn_player(world, Vec2::new(player_x, 0.5), player).expect("player spawns");
    (app, player)
}

pub fn run_frames(app: &mut App, frames: u32) {
    for _ in 0..frames {
        step_frame(app, DT);
    }
}

/// Нажать и отпустить кнопку (один кадр с just_pressed)
pub fn tap(app: &mut App, action: PlayerAction) {
    app.world_mut()
        .resource_mut::<ButtonInput<PlayerAction>>()
        .press(action);
    step_frame(app, DT);
    app.world_mut()
        .resource_mut::<ButtonInput<PlayerAction>>()
        .release(action);
}

pub fn teleport(app: &mut App, entity: Entity, x: f32) {
    if let Some(mut transform) = app.world_mut().get_mut::<Transform>(entity) {
        transform.translation.x = x;
    }
}

/// Журнал событий `E` с момента `record_events`
#[derive(Resource)]
pub struct EventLog<E: Event>(pub Vec<E>);

/// Копить события `E` в `EventLog` (в конце каждого кадра)
pub fn record_events<E: Event + Clone>(app: &mut App) {
    app.insert_resource(EventLog::<E>(Vec::new())).add_systems(
        FixedUpdate,
        collect_events::<E>.in_set(SimulationSet::InputReset),
    );
}

fn collect_events<E: Event + Clone>(mut reader: EventReader<E>, mut log: ResMut<EventLog<E>>) {
    log.0.extend(reader.read().cloned());
}

pub fn logged_events<E: Event + Clone>(app: &App) -> Vec<E> {
    app.world()
        .get_resource::<EventLog<E>>()
        .map(|log| log.0.clone())
        .unwrap_or_default()
}

/// Сработавшие таймеры владельца (нужен `record_events::<TimerElapsed>`)
pub fn timers_for(app: &App, owner: Entity) -> usize {
    logged_events::<TimerElapsed>(app)
        .iter()
        .filter(|t| t.owner == owner)
        .count()
}
