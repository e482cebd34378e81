//! Ошибки конфигурации и спавна
//!
//! Всё, что здесь: фатально и всплывает на старте/спавне. Runtime логика
//! (урон, здоровье, таймеры) ошибок не возвращает: только clamp.

use std::path::PathBuf;
use thiserror::Error;

/// Invalid tuning data
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// `[least, most)` не содержит ни одного значения
    #[error("{field}: interval [{least}, {most}) is empty")]
    EmptyInterval {
        field: &'static str,
        least: f32,
        most: f32,
    },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    /// NaN / inf (TOML допускает `nan` и `inf` литералы)
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f32 },
}

/// Entity could not be initialized
#[derive(Debug, Error)]
pub enum SpawnError {
    /// Обязательный коллаборатор (resource) отсутствует в World
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}
