//! Damage application: единственная точка cross-entity мутации
//!
//! Атакующий никогда не трогает Health цели напрямую: он пишет `CombatEvent`,
//! а `apply_combat_events` применяет урон и публикует результат
//! (`DamageDealt`, `EntityDied`). Реакции (recoil, death sequence) читают
//! уже результат.

use bevy::prelude::*;

use crate::components::Health;

/// Event: попадание (sweep игрока, касание врага, снаряд, ловушка)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct CombatEvent {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: u32,
    /// Направление удара (attacker → target), может быть нулевым
    pub direction: Vec2,
}

/// Событие: урон нанесен
///
/// Генерируется после применения damage к Health.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DamageDealt {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: u32,
    pub direction: Vec2,
    pub target_died: bool,
}

/// Событие: entity умер (health == 0)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Компонент-маркер: entity мертв
///
/// Ставится сразу в кадре смерти. Death sequence необратима: ни одна
/// behaviour система не обрабатывает entity с `Dead`.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Dead;

/// Компонент-маркер: урон игнорируется (post-hurt окно игрока)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Invulnerable;

/// Результат одного попадания
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Zero damage, dead or invulnerable target
    Ignored,
    Damaged { amount: u32 },
    Killed { amount: u32 },
}

/// Чистая функция: применить `damage` к здоровью
pub fn resolve_hit(health: &mut Health, damage: u32, invulnerable: bool) -> HitOutcome {
    if damage == 0 || invulnerable || !health.is_alive() {
        return HitOutcome::Ignored;
    }

    let amount = health.take_damage(damage);
    if health.is_alive() {
        HitOutcome::Damaged { amount }
    } else {
        HitOutcome::Killed { amount }
    }
}

/// Система: apply damage от CombatEvent
///
/// 1. Читаем CombatEvent
/// 2. Пропускаем zero damage / мёртвых / неуязвимых
/// 3. Применяем damage к Health
/// 4. Генерируем DamageDealt и EntityDied, ставим `Dead`
pub fn apply_combat_events(
    mut commands: Commands,
    mut combat_events: EventReader<CombatEvent>,
    mut damage_dealt: EventWriter<DamageDealt>,
    mut entity_died: EventWriter<EntityDied>,
    mut targets: Query<(&mut Health, Has<Dead>, Has<Invulnerable>)>,
) {
    for event in combat_events.read() {
        let Ok((mut health, dead, invulnerable)) = targets.get_mut(event.target) else {
            crate::logger::log(&format!(
                "CombatEvent: target {:?} has no Health, ignored",
                event.target
            ));
            continue;
        };

        let outcome = resolve_hit(&mut health, event.damage, dead || invulnerable);
        let (amount, target_died) = match outcome {
            HitOutcome::Ignored => continue,
            HitOutcome::Damaged { amount } => (amount, false),
            HitOutcome::Killed { amount } => (amount, true),
        };

        damage_dealt.write(DamageDealt {
            attacker: event.attacker,
            target: event.target,
            damage: amount,
            direction: event.direction,
            target_died,
        });

        if target_died {
            commands.entity(event.target).try_insert(Dead);
            entity_died.write(EntityDied {
                entity: event.target,
                killer: Some(event.attacker),
            });

            crate::logger::log_info(&format!(
                "Entity {:?} killed by {:?}",
                event.target, event.attacker
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_damage_has_no_effect() {
        let mut health = Health::new(3);
        assert_eq!(resolve_hit(&mut health, 0, false), HitOutcome::Ignored);
        assert_eq!(health.current, 3);
    }

    #[test]
    fn test_dead_target_is_not_hurt_again() {
        let mut health = Health::new(1);
        assert_eq!(resolve_hit(&mut health, 1, false), HitOutcome::Killed { amount: 1 });
        assert_eq!(resolve_hit(&mut health, 5, false), HitOutcome::Ignored);
        assert_eq!(health.current, 0);
    }

    #[test]
    fn test_overkill_clamps_at_zero() {
        let mut health = Health::new(2);
        assert_eq!(resolve_hit(&mut health, 10, false), HitOutcome::Killed { amount: 2 });
        assert_eq!(health.current, 0);
    }

    #[test]
    fn test_invulnerable_ignores_damage() {
        let mut health = Health::new(3);
        assert_eq!(resolve_hit(&mut health, 1, true), HitOutcome::Ignored);
        assert_eq!(resolve_hit(&mut health, 1, false), HitOutcome::Damaged { amount: 1 });
        assert_eq!(health.current, 2);
    }
}
