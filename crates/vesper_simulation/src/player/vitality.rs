//! Hurt / death реакции игрока
//!
//! Timeline удара (t = момент урона):
//! - t: слой PLAYER_INVULNERABLE, tint, recoil velocity, ввод выключен
//! - t + hurt_time: ввод включён
//! - t + hurt_time + hurt_recover_time: обычный tint, слой PLAYER
//!
//! Смерть: ввод выключен навсегда, материал "отскок" на `death_delay`,
//! потом материал сбрасывается и запрашивается reload уровня.

use bevy::prelude::*;
use bevy_rapier2d::prelude::{Friction, Restitution};

use super::controller::{PlayerController, PlayerFrame};
use super::Player;
use crate::combat::{DamageDealt, Invulnerable};
use crate::components::{Facing, PhysicsBody};
use crate::config::PlayerConfig;
use crate::level::LevelRequest;
use crate::physics::{player_groups, player_invulnerable_groups};
use crate::presentation::{AnimationCue, Tint, TintCue};
use crate::timer::{PlayerTimer, TimerAction, TimerElapsed, TimerScheduler};

/// Материал тела, пока игрок мёртв
pub const DEATH_RESTITUTION: f32 = 0.5;
pub const DEATH_FRICTION: f32 = 1.0;

/// Система: DamageDealt по игроку → hurt или death
#[allow(clippy::too_many_arguments)]
pub fn react_to_player_damage(
    mut commands: Commands,
    mut dealt: EventReader<DamageDealt>,
    mut scheduler: ResMut<TimerScheduler>,
    mut cues: EventWriter<AnimationCue>,
    mut tints: EventWriter<TintCue>,
    mut players: Query<
        (&mut PlayerController, &PlayerConfig, &mut PhysicsBody, &mut Facing),
        With<Player>,
    >,
) {
    for event in dealt.read() {
        let Ok((mut controller, config, mut body, mut facing)) = players.get_mut(event.target)
        else {
            continue;
        };
        if controller.is_dead() {
            continue;
        }

        let player = event.target;
        let mut frame = PlayerFrame::new(player, config, &mut body, &mut facing);

        if event.target_died {
            controller.die(&mut frame);
            commands.entity(player).try_insert((
                player_invulnerable_groups(),
                Restitution::coefficient(DEATH_RESTITUTION),
                Friction::coefficient(DEATH_FRICTION),
            ));
            crate::logger::log_info(&format!("Player {:?} died", player));
        } else {
            controller.hurt(&mut frame);
            commands
                .entity(player)
                .try_insert((player_invulnerable_groups(), Invulnerable));
            crate::logger::log(&format!(
                "Player {:?} hurt for {} (invulnerable)",
                player, event.damage
            ));
        }

        tints.write(TintCue {
            entity: player,
            tint: config.invulnerable_tint,
        });
        frame.flush(&mut scheduler, &mut cues);
    }
}

/// Система: ECS эффекты vitality таймеров
///
/// Состояние регионов уже обновил `handle_player_timers` (та же фаза, раньше).
pub fn apply_vitality_timers(
    mut commands: Commands,
    mut elapsed: EventReader<TimerElapsed>,
    mut tints: EventWriter<TintCue>,
    mut levels: EventWriter<LevelRequest>,
    players: Query<&PlayerController, With<Player>>,
) {
    for timer in elapsed.read() {
        let Ok(controller) = players.get(timer.owner) else {
            continue;
        };

        match timer.action {
            TimerAction::Player(PlayerTimer::HurtRecover) if !controller.is_dead() => {
                commands
                    .entity(timer.owner)
                    .try_insert(player_groups())
                    .try_remove::<Invulnerable>();
                tints.write(TintCue {
                    entity: timer.owner,
                    tint: Tint::WHITE,
                });
            }
            TimerAction::Player(PlayerTimer::DeathReload) => {
                commands.entity(timer.owner).try_insert((
                    Restitution::coefficient(0.0),
                    Friction::coefficient(0.0),
                ));
                levels.write(LevelRequest::Reload);
                crate::logger::log_info("Player death sequence finished, reloading level");
            }
            _ => {}
        }
    }
}
