//! Level flow seam
//!
//! Симуляция не грузит сцены: она только просит хост (`LevelRequest`).
//! `LevelProgress` помнит, куда ведёт выход уровня и последний запрос.

use bevy::prelude::*;

use crate::schedule::SimulationSet;

#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub enum LevelRequest {
    /// Перезапустить текущий уровень (смерть игрока)
    Reload,
    /// Перейти на уровень (выход уровня)
    Load(String),
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelProgress {
    pub next_level: String,
    /// Последний достигнутый выход (аналог сохранённого milestone)
    pub milestone: Option<String>,
    pub last_request: Option<LevelRequest>,
}

impl LevelProgress {
    pub fn new(next_level: impl Into<String>) -> Self {
        Self {
            next_level: next_level.into(),
            ..Default::default()
        }
    }
}

pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<LevelRequest>()
            .init_resource::<LevelProgress>()
            .add_systems(FixedUpdate, record_level_requests.in_set(SimulationSet::Fades));
    }
}

/// Система: запомнить запросы уровня (хост читает события или ресурс)
pub fn record_level_requests(
    mut requests: EventReader<LevelRequest>,
    mut progress: ResMut<LevelProgress>,
) {
    for request in requests.read() {
        if let LevelRequest::Load(level) = request {
            progress.milestone = Some(level.clone());
        }
        crate::logger::log_info(&format!("Level request: {:?}", request));
        progress.last_request = Some(request.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn test_load_request_sets_milestone() {
        let mut world = World::new();
        world.init_resource::<Events<LevelRequest>>();
        world.insert_resource(LevelProgress::new("level_2"));

        world.send_event(LevelRequest::Load("level_2".to_string()));
        world.send_event(LevelRequest::Reload);
        world
            .run_system_once(record_level_requests)
            .expect("system runs");

        let progress = world.resource::<LevelProgress>();
        assert_eq!(progress.milestone.as_deref(), Some("level_2"));
        assert_eq!(progress.last_request, Some(LevelRequest::Reload));
    }
}
