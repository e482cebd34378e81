//! Headless симуляция Vesper
//!
//! Собирает небольшой уровень и прогоняет 600 кадров со скриптованным вводом.
//! Первый аргумент (опционально): путь к TOML конфигу.

use bevy::prelude::*;
use bevy_rapier2d::prelude::CollisionGroups;
use vesper_simulation::config::GameConfig;
use vesper_simulation::hazards::{
    spawn_deadly, spawn_falling_trap, spawn_level_exit, spawn_moving_trap, spawn_obstacle,
    spawn_switch, spawn_unstable_platform,
};
use vesper_simulation::physics::{platform_groups, wall_groups, Hitbox};
use vesper_simulation::{
    create_configured_app, log_error, log_info, spawn_gunner, spawn_patroller, spawn_player,
    step_frame, Health, LevelProgress, PlayerAction, PlayerAxes, SpawnError, SIMULATION_HZ,
};

const FRAMES: u32 = 600;

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => match GameConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Failed to load config {}: {}", path, err);
                std::process::exit(1);
            }
        },
        None => GameConfig::default(),
    };

    println!("Starting Vesper headless simulation (seed: {})", config.seed);

    let mut app = match create_configured_app(&config) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("Invalid config: {}", err);
            std::process::exit(1);
        }
    };

    let player = match build_level(app.world_mut(), &config) {
        Ok(player) => player,
        Err(err) => {
            log_error(&format!("Level build failed: {}", err));
            std::process::exit(1);
        }
    };

    let dt = (1.0 / SIMULATION_HZ) as f32;
    for frame in 0..FRAMES {
        script_input(app.world_mut(), frame);
        step_frame(&mut app, dt);

        if frame % 100 == 0 {
            let world = app.world();
            let health = world.get::<Health>(player).map(|h| h.current).unwrap_or(0);
            let position = world
                .get::<Transform>(player)
                .map(|t| t.translation.truncate())
                .unwrap_or_default();
            log_info(&format!(
                "Frame {}: {} entities, player hp {} at {:?}",
                frame,
                world.entities().len(),
                health,
                position
            ));
        }
    }

    let progress = app.world().resource::<LevelProgress>();
    println!(
        "Simulation complete! last level request: {:?}",
        progress.last_request
    );
}

/// Пол, стены, враги, ловушки, выход
fn build_level(world: &mut World, config: &GameConfig) -> Result<Entity, SpawnError> {
    let solid = |world: &mut World, center: Vec2, size: Vec2, groups: CollisionGroups| {
        world.spawn((
            groups,
            Hitbox::new(size.x, size.y),
            Transform::from_translation(center.extend(0.0)),
        ));
    };

    solid(world, Vec2::new(10.0, -0.5), Vec2::new(30.0, 1.0), platform_groups());
    solid(world, Vec2::new(-5.5, 4.0), Vec2::new(1.0, 10.0), wall_groups());
    solid(world, Vec2::new(25.5, 4.0), Vec2::new(1.0, 10.0), wall_groups());

    let player = spawn_player(world, Vec2::new(0.0, 0.5), config.player.clone())?;

    spawn_patroller(
        world,
        Vec2::new(6.0, 0.5),
        config.patroller.clone(),
        config.patrol.clone(),
    )?;
    spawn_gunner(
        world,
        Vec2::new(18.0, 0.5),
        config.gunner.clone(),
        config.gunner_fire.clone(),
        config.projectile.clone(),
    )?;

    let obstacle = spawn_obstacle(world, Vec2::new(14.0, 1.5), Vec2::new(0.5, 2.0));
    let trap = spawn_falling_trap(world, Vec2::new(16.0, 5.0), Vec2::new(1.0, 0.5), 1.0);
    spawn_switch(world, Vec2::new(12.0, 2.0), Some(obstacle), Some(trap));

    spawn_unstable_platform(world, Vec2::new(8.0, 3.0), Vec2::new(2.0, 0.3), 0.5, 1.0);
    spawn_moving_trap(world, Vec2::new(4.0, 4.0), Vec2::new(2.0, 0.3), 1.5, 2.0);
    spawn_deadly(world, Vec2::new(21.0, 0.2), Vec2::new(1.0, 0.4));
    spawn_level_exit(world, Vec2::new(24.0, 1.0), Vec2::new(1.0, 2.0));

    Ok(player)
}

/// Скрипт: бег вправо, прыжки каждые 40 кадров, атака каждые 25
fn script_input(world: &mut World, frame: u32) {
    world.resource_mut::<PlayerAxes>().set(1.0, 0.0);

    let mut buttons = world.resource_mut::<ButtonInput<PlayerAction>>();
    if frame % 40 == 0 {
        buttons.press(PlayerAction::Jump);
    } else if frame % 40 == 12 {
        buttons.release(PlayerAction::Jump);
    }
    if frame % 25 == 0 {
        buttons.press(PlayerAction::Attack);
    } else if frame % 25 == 1 {
        buttons.release(PlayerAction::Attack);
    }
    if frame % 90 == 45 {
        buttons.press(PlayerAction::Sprint);
    } else if frame % 90 == 46 {
        buttons.release(PlayerAction::Sprint);
    }
}
