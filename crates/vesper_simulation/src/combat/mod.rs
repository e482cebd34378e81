//! Combat resolver
//!
//! ECS ответственность:
//! - Hit detection: directional sweep игрока (`sweep`), damaging contacts (`contact`)
//! - Damage application: `CombatEvent` → Health → `DamageDealt` / `EntityDied`
//! - Death sequencing: fade-out + отложенный despawn (`death`)
//! - Projectiles: запуск, lifetime
//!
//! Реакции на урон (recoil, invulnerability, death impulse) живут у владельцев:
//! враги: `ai`, игрок: `player`.

use bevy::prelude::*;

pub mod contact;
pub mod damage;
pub mod death;
pub mod projectile;
pub mod sweep;

// Re-export основных типов
pub use contact::{apply_contact_damage, ContactDamage};
pub use damage::{
    apply_combat_events, resolve_hit, CombatEvent, DamageDealt, Dead, EntityDied, HitOutcome,
    Invulnerable,
};
pub use death::{begin_fade_out, despawn_on_timer, tick_fades, FadeOut};
pub use projectile::{launch_projectile, Projectile};
pub use sweep::{attack_cast, resolve_sweep, AttackDirection, SweepOutcome};

use crate::schedule::SimulationSet;

/// Combat Plugin
///
/// Порядок выполнения (по фазам кадра):
/// 1. Continuations: despawn_on_timer: fade/lifetime закончился
/// 2. Contacts: apply_contact_damage: касания → CombatEvent
/// 3. Combat: apply_combat_events: CombatEvent → damage
/// 4. Fades: tick_fades: OpacityCue
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<CombatEvent>()
            .add_event::<DamageDealt>()
            .add_event::<EntityDied>();

        app.add_systems(
            FixedUpdate,
            (
                despawn_on_timer.in_set(SimulationSet::Continuations),
                apply_contact_damage.in_set(SimulationSet::Contacts),
                apply_combat_events.in_set(SimulationSet::Combat),
                tick_fades.in_set(SimulationSet::Fades),
            ),
        );
    }
}
