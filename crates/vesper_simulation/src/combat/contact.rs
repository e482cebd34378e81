//! Damaging contacts: тело врага, снаряд, смертельная поверхность
//!
//! Все три: один компонент `ContactDamage`. Касание (Enter) игрока →
//! `CombatEvent`. Снаряд после попадания уничтожается.

use bevy::prelude::*;

use super::damage::{CombatEvent, Dead};
use super::projectile::Projectile;
use crate::components::Health;
use crate::physics::{ContactEvent, ContactPhase};
use crate::player::PlayerHandle;

/// Урон игроку при касании
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub enum ContactDamage {
    Fixed(u32),
    /// Весь текущий запас здоровья (шипы, пропасть)
    Lethal,
}

impl ContactDamage {
    pub fn amount(self, target_health: &Health) -> u32 {
        match self {
            ContactDamage::Fixed(amount) => amount,
            ContactDamage::Lethal => target_health.current,
        }
    }
}

/// Система: Enter контакт с игроком → CombatEvent
pub fn apply_contact_damage(
    mut commands: Commands,
    mut contacts: EventReader<ContactEvent>,
    mut combat: EventWriter<CombatEvent>,
    player: Option<Res<PlayerHandle>>,
    sources: Query<(&ContactDamage, &Transform, Has<Projectile>), Without<Dead>>,
    targets: Query<(&Health, &Transform)>,
) {
    let Some(player) = player else {
        contacts.clear();
        return;
    };

    for contact in contacts.read() {
        if contact.phase != ContactPhase::Enter || contact.other != player.0 {
            continue;
        }

        let Ok((damage, source_transform, is_projectile)) = sources.get(contact.entity) else {
            continue;
        };
        let Ok((health, target_transform)) = targets.get(contact.other) else {
            continue;
        };

        let direction = (target_transform.translation - source_transform.translation)
            .truncate()
            .normalize_or_zero();

        combat.write(CombatEvent {
            attacker: contact.entity,
            target: contact.other,
            damage: damage.amount(health),
            direction,
        });

        if is_projectile {
            commands.entity(contact.entity).try_despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lethal_contact_takes_all_health() {
        let mut health = Health::new(5);
        health.take_damage(2);
        assert_eq!(ContactDamage::Lethal.amount(&health), 3);
        assert_eq!(ContactDamage::Fixed(1).amount(&health), 1);
    }
}
