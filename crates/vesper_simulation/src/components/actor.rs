//! Базовые компоненты акторов: Health, Facing, PhysicsBody

use bevy::prelude::*;
use bevy_rapier2d::prelude::{CollisionGroups, ExternalImpulse, GravityScale, Velocity};
use serde::{Deserialize, Serialize};

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max. Лечения нет: current только убывает.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(3)
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Clamps at zero; returns the amount actually removed.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let before = self.current;
        self.current = self.current.saturating_sub(amount);
        before - self.current
    }
}

/// Horizontal facing of a 2D actor
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// `None` for zero (facing is kept as is)
    pub fn from_direction(direction: f32) -> Option<Self> {
        if direction > 0.0 {
            Some(Facing::Right)
        } else if direction < 0.0 {
            Some(Facing::Left)
        } else {
            None
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// Рабочая копия rigid body состояния на текущий кадр
///
/// Frame driver:
/// 1. `read_physics_state`: Velocity/GravityScale (physics) → PhysicsBody
/// 2. behaviour системы меняют velocity / копят impulse
/// 3. `commit_physics_state`: PhysicsBody → Velocity/ExternalImpulse/GravityScale
///
/// Required components гарантируют, что коллаборатор физики всегда на месте.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
#[require(Velocity, ExternalImpulse, GravityScale, CollisionGroups, Transform)]
pub struct PhysicsBody {
    pub velocity: Vec2,
    /// Impulse accumulated this frame, flushed on commit
    pub impulse: Vec2,
    pub gravity_scale: f32,
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            impulse: Vec2::ZERO,
            gravity_scale: 1.0,
        }
    }
}

impl PhysicsBody {
    pub fn set_horizontal(&mut self, x: f32) {
        self.velocity.x = x;
    }

    pub fn set_vertical(&mut self, y: f32) {
        self.velocity.y = y;
    }

    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.impulse += impulse;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage() {
        let mut health = Health::new(3);
        assert_eq!(health.current, 3);

        assert_eq!(health.take_damage(1), 1);
        assert_eq!(health.current, 2);
        assert!(health.is_alive());

        assert_eq!(health.take_damage(100), 2); // Saturating sub
        assert_eq!(health.current, 0);
        assert!(!health.is_alive());
    }

    #[test]
    fn test_facing_from_direction() {
        assert_eq!(Facing::from_direction(-0.5), Some(Facing::Left));
        assert_eq!(Facing::from_direction(2.0), Some(Facing::Right));
        assert_eq!(Facing::from_direction(0.0), None);
        assert_eq!(Facing::Left.flipped().sign(), 1.0);
    }

    #[test]
    fn test_physics_body_impulse_accumulates() {
        let mut body = PhysicsBody::default();
        body.apply_impulse(Vec2::new(1.0, 2.0));
        body.apply_impulse(Vec2::new(-3.0, 0.5));
        assert_eq!(body.impulse, Vec2::new(-2.0, 2.5));
        assert_eq!(body.gravity_scale, 1.0);
    }
}
