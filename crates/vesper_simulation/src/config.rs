//! Tuning data для архетипов (player, patroller, gunner, projectile)
//!
//! Каждая структура: component с `Default` значениями и serde derive, так что
//! спавн без конфига работает из коробки, а `GameConfig` можно грузить из TOML:
//!
//! ```toml
//! seed = 7
//! next_level = "level_2"
//!
//! [patrol]
//! walk_speed = 2.5
//! behave_interval_least = 1.0
//! behave_interval_most = 3.0
//! ```
//!
//! Отсутствующие поля берутся из `Default` (`#[serde(default)]`).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::presentation::Tint;

/// Health/damage/death parameters shared by every enemy archetype
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyVitalsConfig {
    pub health: u32,
    pub detect_distance: f32,
    /// Урон игроку при касании телом
    pub contact_damage: u32,
    /// Скорость отдачи при попадании (x масштабируется facing)
    pub hurt_recoil: Vec2,
    pub recoil_time: f32,
    pub death_force: Vec2,
    /// Длительность fade-out после смерти
    pub destroy_delay: f32,
}

impl Default for EnemyVitalsConfig {
    fn default() -> Self {
        Self {
            health: 3,
            detect_distance: 3.0,
            contact_damage: 1,
            hurt_recoil: Vec2::new(-4.0, 2.0),
            recoil_time: 0.2,
            death_force: Vec2::new(-3.0, 4.0),
            destroy_delay: 1.0,
        }
    }
}

/// Ground patroller movement
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolConfig {
    pub walk_speed: f32,
    /// Patrol sub-state длится `[least, most)` секунд
    pub behave_interval_least: f32,
    pub behave_interval_most: f32,
    /// Горизонтальный вынос edge probe перед врагом
    pub edge_safe_distance: f32,
}

impl Default for PatrolConfig {
    fn default() -> Self {
        Self {
            walk_speed: 2.0,
            behave_interval_least: 1.0,
            behave_interval_most: 3.0,
            edge_safe_distance: 0.5,
        }
    }
}

#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GunnerConfig {
    pub shoot_interval: f32,
    /// Задержка между анимацией выстрела и появлением снаряда
    pub shoot_startup: f32,
}

impl Default for GunnerConfig {
    fn default() -> Self {
        Self {
            shoot_interval: 1.0,
            shoot_startup: 0.2,
        }
    }
}

#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub speed: f32,
    pub lifetime: f32,
    pub damage: u32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 6.0,
            lifetime: 3.0,
            damage: 1,
        }
    }
}

/// Player tuning
///
/// Recoil/force векторы задаются модулем по x; знак выбирается по facing
/// в момент применения.
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub health: u32,
    pub move_speed: f32,
    pub jump_speed: f32,
    pub fall_speed: f32,
    pub climb_jump_force: Vec2,
    pub climb_creep_speed: f32,
    /// Окно, в течение которого ввод заблокирован после climb-jump
    pub climb_jump_delay: f32,

    pub sprint_speed: f32,
    pub sprint_time: f32,
    pub sprint_interval: f32,

    pub attack_interval: f32,
    pub attack_effect_lifetime: f32,
    pub attack_up_recoil: Vec2,
    pub attack_forward_recoil: Vec2,
    pub attack_down_recoil: Vec2,

    pub invulnerable_tint: Tint,
    pub hurt_velocity: Vec2,
    pub hurt_time: f32,
    pub hurt_recover_time: f32,
    pub death_force: Vec2,
    pub death_delay: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            health: 5,
            move_speed: 6.0,
            jump_speed: 12.0,
            fall_speed: 8.0,
            climb_jump_force: Vec2::new(8.0, 10.0),
            climb_creep_speed: 2.0,
            climb_jump_delay: 0.2,

            sprint_speed: 15.0,
            sprint_time: 0.25,
            sprint_interval: 0.5,

            attack_interval: 0.25,
            attack_effect_lifetime: 0.05,
            attack_up_recoil: Vec2::new(0.0, -2.0),
            attack_forward_recoil: Vec2::new(3.0, 0.0),
            attack_down_recoil: Vec2::new(0.0, 10.0),

            invulnerable_tint: Tint::rgba(1.0, 1.0, 1.0, 0.5),
            hurt_velocity: Vec2::new(5.0, 5.0),
            hurt_time: 0.5,
            hurt_recover_time: 1.0,
            death_force: Vec2::new(5.0, 8.0),
            death_delay: 2.0,
        }
    }
}

/// Конфиг всей симуляции
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed для `DeterministicRng`
    pub seed: u64,
    /// Уровень, который запрашивает LevelExit
    pub next_level: String,
    pub player: PlayerConfig,
    pub patroller: EnemyVitalsConfig,
    pub patrol: PatrolConfig,
    pub gunner: EnemyVitalsConfig,
    pub gunner_fire: GunnerConfig,
    pub projectile: ProjectileConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            next_level: "level_2".to_string(),
            player: PlayerConfig::default(),
            patroller: EnemyVitalsConfig::default(),
            patrol: PatrolConfig::default(),
            gunner: EnemyVitalsConfig {
                detect_distance: 8.0,
                ..EnemyVitalsConfig::default()
            },
            gunner_fire: GunnerConfig::default(),
            projectile: ProjectileConfig::default(),
        }
    }
}

impl GameConfig {
    /// Parse + validate
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.player.validate()?;
        self.patroller.validate()?;
        self.patrol.validate()?;
        self.gunner.validate()?;
        self.gunner_fire.validate()?;
        self.projectile.validate()
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field, value })
    }
}

fn finite_vec(field: &'static str, value: Vec2) -> Result<(), ConfigError> {
    finite(field, value.x)?;
    finite(field, value.y)
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

impl EnemyVitalsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("health", self.health as f32)?;
        non_negative("detect_distance", self.detect_distance)?;
        non_negative("recoil_time", self.recoil_time)?;
        non_negative("destroy_delay", self.destroy_delay)?;
        finite_vec("hurt_recoil", self.hurt_recoil)?;
        finite_vec("death_force", self.death_force)
    }
}

impl PatrolConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("walk_speed", self.walk_speed)?;
        non_negative("behave_interval_least", self.behave_interval_least)?;
        finite("behave_interval_most", self.behave_interval_most)?;
        // gen_range паникует на пустом диапазоне: ловим здесь
        if self.behave_interval_least >= self.behave_interval_most {
            return Err(ConfigError::EmptyInterval {
                field: "behave_interval",
                least: self.behave_interval_least,
                most: self.behave_interval_most,
            });
        }
        non_negative("edge_safe_distance", self.edge_safe_distance)
    }
}

impl GunnerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("shoot_interval", self.shoot_interval)?;
        non_negative("shoot_startup", self.shoot_startup)
    }
}

impl ProjectileConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("projectile.speed", self.speed)?;
        positive("projectile.lifetime", self.lifetime)
    }
}

impl PlayerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("player.health", self.health as f32)?;
        positive("move_speed", self.move_speed)?;
        positive("jump_speed", self.jump_speed)?;
        non_negative("fall_speed", self.fall_speed)?;
        non_negative("climb_jump_delay", self.climb_jump_delay)?;
        positive("sprint_speed", self.sprint_speed)?;
        non_negative("sprint_time", self.sprint_time)?;
        non_negative("sprint_interval", self.sprint_interval)?;
        non_negative("attack_interval", self.attack_interval)?;
        non_negative("attack_effect_lifetime", self.attack_effect_lifetime)?;
        non_negative("hurt_time", self.hurt_time)?;
        non_negative("hurt_recover_time", self.hurt_recover_time)?;
        non_negative("death_delay", self.death_delay)?;
        finite_vec("climb_jump_force", self.climb_jump_force)?;
        finite_vec("attack_up_recoil", self.attack_up_recoil)?;
        finite_vec("attack_forward_recoil", self.attack_forward_recoil)?;
        finite_vec("attack_down_recoil", self.attack_down_recoil)?;
        finite_vec("hurt_velocity", self.hurt_velocity)?;
        finite_vec("player.death_force", self.death_force)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
            seed = 7
            next_level = "caves"

            [patrol]
            walk_speed = 3.5

            [player]
            hurt_velocity = [2.0, 6.0]
            "#,
        )
        .expect("valid config");

        assert_eq!(config.seed, 7);
        assert_eq!(config.next_level, "caves");
        assert_eq!(config.patrol.walk_speed, 3.5);
        assert_eq!(config.patrol.edge_safe_distance, PatrolConfig::default().edge_safe_distance);
        assert_eq!(config.player.hurt_velocity, Vec2::new(2.0, 6.0));
        assert_eq!(config.gunner_fire.shoot_startup, 0.2);
    }

    #[test]
    fn test_empty_behave_interval_rejected() {
        let result = GameConfig::from_toml_str(
            r#"
            [patrol]
            behave_interval_least = 2.0
            behave_interval_most = 2.0
            "#,
        );

        assert!(matches!(
            result,
            Err(ConfigError::EmptyInterval { field: "behave_interval", .. })
        ));
    }

    #[test]
    fn test_nan_interval_bound_rejected() {
        let result = GameConfig::from_toml_str(
            r#"
            [patrol]
            behave_interval_least = 0.5
            behave_interval_most = nan
            "#,
        );

        assert!(matches!(
            result,
            Err(ConfigError::NonFinite { field: "behave_interval_most", .. })
        ));
    }

    #[test]
    fn test_infinite_speed_rejected() {
        let mut config = GameConfig::default();
        config.player.move_speed = f32::INFINITY;
        config.player.hurt_velocity = Vec2::new(f32::NAN, 1.0);

        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinite { field: "move_speed", .. })
        ));

        config.player.move_speed = 5.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinite { field: "hurt_velocity", .. })
        ));
    }

    #[test]
    fn test_non_positive_speed_rejected() {
        let config = GameConfig {
            projectile: ProjectileConfig {
                speed: 0.0,
                ..ProjectileConfig::default()
            },
            ..GameConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { field: "projectile.speed", .. })
        ));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        assert!(matches!(
            GameConfig::from_toml_str("seed = \"not a number\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
