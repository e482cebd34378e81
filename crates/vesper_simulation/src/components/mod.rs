//! ECS Components общие для всех акторов
//!
//! - actor: Health, Facing, PhysicsBody (рабочая копия rigid body)

pub mod actor;

pub use actor::*;
