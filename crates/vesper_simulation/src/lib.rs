//! Vesper Simulation Core
//!
//! Behaviour core 2D action-платформера на Bevy 0.16 (headless).
//!
//! Симуляция решает, ЧТО делают сущности каждый кадр:
//! - враги (patroller, gunner) на общем state machine core
//! - игрок (movement / sprint / combat / vitality регионы)
//! - combat resolver (sweep, contact damage, death sequencing)
//! - ловушки и переключатели
//!
//! Физика, рендер, ввод, загрузка уровней: внешние коллабораторы
//! (rapier компоненты, `ShapeCaster`, `ButtonInput`, `LevelRequest`).

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod error;
pub mod fsm;
pub mod hazards;
pub mod input;
pub mod level;
pub mod logger;
pub mod physics;
pub mod player;
pub mod presentation;
pub mod schedule;
pub mod timer;

// Re-export основных типов для удобства
pub use ai::{spawn_gunner, spawn_patroller, AIPlugin, Enemy, Gunner, Patroller};
pub use combat::{CombatEvent, CombatPlugin, DamageDealt, Dead, EntityDied};
pub use components::*;
pub use config::GameConfig;
pub use error::{ConfigError, SpawnError};
pub use hazards::HazardsPlugin;
pub use input::{PlayerAction, PlayerAxes};
pub use level::{LevelPlugin, LevelProgress, LevelRequest};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use physics::{HeadlessPhysicsPlugin, RapierBridgePlugin};
pub use player::{spawn_player, Player, PlayerController, PlayerHandle, PlayerPlugin};
pub use schedule::{FrameDriverPlugin, SimulationSet};
pub use timer::TimerScheduler;

/// Fixed timestep по умолчанию
pub const SIMULATION_HZ: f64 = 60.0;

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// Физический бэкенд (headless или rapier bridge) хост добавляет сам.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(GameConfig::default().seed));
        }

        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ))
            .add_plugins((
                FrameDriverPlugin,
                CombatPlugin,
                AIPlugin,
                PlayerPlugin,
                HazardsPlugin,
                LevelPlugin,
            ));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Симуляция + headless физика, без рендера. Кадры крутит `step_frame`.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .add_plugins((SimulationPlugin, HeadlessPhysicsPlugin));

    app
}

/// Headless app с настройками из `GameConfig`
pub fn create_configured_app(config: &GameConfig) -> Result<App, ConfigError> {
    config.validate()?;

    let mut app = create_headless_app(config.seed);
    app.insert_resource(LevelProgress::new(config.next_level.clone()))
        .insert_resource(config.clone());
    Ok(app)
}

/// Один кадр симуляции длиной `dt` секунд
///
/// Двигаем `Time` вручную и запускаем `FixedUpdate` напрямую: одинаковые
/// входы → одинаковые кадры, независимо от wall clock. В конце кадра буферы
/// событий меняются местами, иначе они росли бы весь прогон.
pub fn step_frame(app: &mut App, dt: f32) {
    let world = app.world_mut();
    world
        .resource_mut::<Time>()
        .advance_by(Duration::from_secs_f32(dt));
    world.run_schedule(FixedUpdate);
    schedule::update_simulation_events(world);
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
