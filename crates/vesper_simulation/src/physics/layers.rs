//! Collision layers: centralised constants для всей симуляции.
//!
//! - **Layer (memberships):** на каком слое объект находится
//! - **Filter (filters):** с какими слоями объект коллидирует
//!
//! Слои выражены через `bevy_rapier2d::Group`, так что `CollisionGroups`
//! компонент читается и нашими системами, и физическим движком.

use bevy_rapier2d::prelude::{CollisionGroups, Group};

/// Walkable ground (edge sensing, ground probe)
pub const LAYER_PLATFORM: Group = Group::GROUP_1;

/// Climbable wall surfaces
pub const LAYER_WALL: Group = Group::GROUP_2;

/// Player in normal state
pub const LAYER_PLAYER: Group = Group::GROUP_3;

/// Player during the post-hurt window (ignored by enemies, traps, projectiles)
pub const LAYER_PLAYER_INVULNERABLE: Group = Group::GROUP_4;

pub const LAYER_ENEMY: Group = Group::GROUP_5;

pub const LAYER_TRAP: Group = Group::GROUP_6;

pub const LAYER_SWITCH: Group = Group::GROUP_7;

pub const LAYER_PROJECTILE: Group = Group::GROUP_8;

/// Corpses, spent switches, crumbled platforms: only rest on platforms
pub const LAYER_DECORATION: Group = Group::GROUP_9;

/// Level exit trigger
pub const LAYER_GOAL: Group = Group::GROUP_10;

/// Mask: player attack sweep
pub const MASK_ATTACK_SWEEP: Group = LAYER_ENEMY
    .union(LAYER_TRAP)
    .union(LAYER_SWITCH)
    .union(LAYER_PROJECTILE);

/// Mask: layers on which a `CombatEvent` may be produced
pub const MASK_COMBATANTS: Group = LAYER_ENEMY.union(LAYER_PLAYER);

const SOLID: Group = LAYER_PLATFORM.union(LAYER_WALL);

pub fn player_groups() -> CollisionGroups {
    CollisionGroups::new(
        LAYER_PLAYER,
        SOLID
            .union(LAYER_ENEMY)
            .union(LAYER_TRAP)
            .union(LAYER_PROJECTILE)
            .union(LAYER_GOAL),
    )
}

pub fn player_invulnerable_groups() -> CollisionGroups {
    CollisionGroups::new(LAYER_PLAYER_INVULNERABLE, SOLID.union(LAYER_GOAL))
}

pub fn enemy_groups() -> CollisionGroups {
    CollisionGroups::new(LAYER_ENEMY, SOLID.union(LAYER_PLAYER))
}

pub fn trap_groups() -> CollisionGroups {
    CollisionGroups::new(LAYER_TRAP, SOLID.union(LAYER_PLAYER))
}

pub fn switch_groups() -> CollisionGroups {
    CollisionGroups::new(LAYER_SWITCH, Group::NONE)
}

pub fn projectile_groups() -> CollisionGroups {
    CollisionGroups::new(LAYER_PROJECTILE, LAYER_PLAYER)
}

pub fn decoration_groups() -> CollisionGroups {
    CollisionGroups::new(LAYER_DECORATION, LAYER_PLATFORM)
}

pub fn platform_groups() -> CollisionGroups {
    CollisionGroups::new(LAYER_PLATFORM, Group::ALL)
}

pub fn wall_groups() -> CollisionGroups {
    CollisionGroups::new(LAYER_WALL, Group::ALL)
}

pub fn goal_groups() -> CollisionGroups {
    CollisionGroups::new(LAYER_GOAL, LAYER_PLAYER.union(LAYER_PLAYER_INVULNERABLE))
}

/// Двусторонняя проверка: оба объекта должны "видеть" слой друг друга
pub fn can_collide(a: &CollisionGroups, b: &CollisionGroups) -> bool {
    a.memberships.intersects(b.filters) && b.memberships.intersects(a.filters)
}

/// Название слоя для debug логов
pub fn layer_name(layer: Group) -> &'static str {
    if layer == LAYER_PLATFORM {
        "Platform"
    } else if layer == LAYER_WALL {
        "Wall"
    } else if layer == LAYER_PLAYER {
        "Player"
    } else if layer == LAYER_PLAYER_INVULNERABLE {
        "PlayerInvulnerable"
    } else if layer == LAYER_ENEMY {
        "Enemy"
    } else if layer == LAYER_TRAP {
        "Trap"
    } else if layer == LAYER_SWITCH {
        "Switch"
    } else if layer == LAYER_PROJECTILE {
        "Projectile"
    } else if layer == LAYER_DECORATION {
        "Decoration"
    } else if layer == LAYER_GOAL {
        "Goal"
    } else {
        "Unknown"
    }
}
