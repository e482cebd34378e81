//! Directional hit detection (player attack sweep)
//!
//! Circle-cast-all вдоль направления атаки, затем классификация попаданий по
//! слою. Урон получают только враги; switch активируется, снаряд уничтожается,
//! ловушка просто "гасит" удар (recoil есть, эффекта нет).

use bevy::prelude::*;

use super::damage::CombatEvent;
use crate::physics::{
    CircleCast, ShapeHit, LAYER_ENEMY, LAYER_PROJECTILE, LAYER_SWITCH, MASK_ATTACK_SWEEP,
};

pub const ATTACK_RADIUS: f32 = 0.6;
pub const ATTACK_DISTANCE: f32 = 1.5;
pub const ATTACK_DAMAGE: u32 = 1;

/// Направление атаки игрока
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackDirection {
    Up,
    Down,
    Forward,
}

impl AttackDirection {
    /// Вертикальная ось + контакт с землёй → направление
    ///
    /// Down только в воздухе; на земле "вниз" = Forward.
    pub fn choose(vertical: f32, grounded: bool) -> Self {
        if vertical > 0.0 {
            AttackDirection::Up
        } else if vertical < 0.0 && !grounded {
            AttackDirection::Down
        } else {
            AttackDirection::Forward
        }
    }

    pub fn vector(self, facing_sign: f32) -> Vec2 {
        match self {
            AttackDirection::Up => Vec2::Y,
            AttackDirection::Down => Vec2::NEG_Y,
            AttackDirection::Forward => Vec2::new(facing_sign, 0.0),
        }
    }

    pub fn cue(self) -> &'static str {
        match self {
            AttackDirection::Up => "IsAttackUp",
            AttackDirection::Down => "IsAttackDown",
            AttackDirection::Forward => "IsAttack",
        }
    }
}

pub fn attack_cast(origin: Vec2, direction: Vec2) -> CircleCast {
    CircleCast {
        origin,
        radius: ATTACK_RADIUS,
        direction,
        max_distance: ATTACK_DISTANCE,
        mask: MASK_ATTACK_SWEEP,
    }
}

/// Итог одного взмаха
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepOutcome {
    pub combat: Vec<CombatEvent>,
    pub switches: Vec<Entity>,
    pub projectiles: Vec<Entity>,
    /// Хоть одно попадание по слою из маски атаки (→ recoil)
    pub hit_any: bool,
}

/// Классифицировать попадания sweep'а
pub fn resolve_sweep(attacker: Entity, direction: Vec2, hits: &[ShapeHit]) -> SweepOutcome {
    let mut outcome = SweepOutcome::default();

    for hit in hits {
        if hit.entity == attacker || !hit.layer.intersects(MASK_ATTACK_SWEEP) {
            continue;
        }
        outcome.hit_any = true;

        if hit.layer.intersects(LAYER_ENEMY) {
            outcome.combat.push(CombatEvent {
                attacker,
                target: hit.entity,
                damage: ATTACK_DAMAGE,
                direction,
            });
        } else if hit.layer.intersects(LAYER_SWITCH) {
            outcome.switches.push(hit.entity);
        } else if hit.layer.intersects(LAYER_PROJECTILE) {
            outcome.projectiles.push(hit.entity);
        }
        // LAYER_TRAP: ловушки неуязвимы, только recoil
    }

    outcome
}
