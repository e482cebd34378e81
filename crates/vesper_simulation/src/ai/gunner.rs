//! Gunner: Idle ⇄ Shooting
//!
//! Не двигается, только разворачивается к игроку. В Shooting стреляет, как
//! только cooldown свободен:
//! 1. cue `attack`
//! 2. через `shoot_startup`: снаряд туда, где игрок был в момент выстрела
//! 3. следующий выстрел не раньше, чем через `shoot_interval`

use bevy::prelude::*;

use super::{Enemy, EnemySenses};
use crate::combat::{launch_projectile, Dead};
use crate::components::Facing;
use crate::config::{EnemyVitalsConfig, GunnerConfig, ProjectileConfig};
use crate::fsm::{ModePair, State, TokenCounter, TwoWayMachine};
use crate::player::PlayerHandle;
use crate::presentation::AnimationCue;
use crate::timer::{EnemyTimer, TimerAction, TimerElapsed, TimerScheduler};

#[cfg(test)]
#[path = "gunner_tests.rs"]
mod gunner_tests;

#[derive(Debug, Clone, PartialEq)]
pub enum GunnerMode {
    Idle,
    Shooting {
        /// Токен активного cooldown; `None`: можно стрелять
        cooldown: Option<u32>,
    },
}

impl ModePair for GunnerMode {
    fn passive() -> Self {
        GunnerMode::Idle
    }

    fn alert() -> Self {
        GunnerMode::Shooting { cooldown: None }
    }
}

pub struct GunnerContext<'a> {
    pub player_distance: f32,
    pub detect_distance: f32,
    pub tokens: &'a mut TokenCounter,
    /// Output: токен cooldown'а, если в этом кадре был выстрел
    pub fired: Option<u32>,
}

impl<'a> State<GunnerContext<'a>> for GunnerMode {
    fn check_valid(&self, ctx: &GunnerContext<'a>) -> bool {
        let distance = ctx.player_distance.abs();
        match self {
            GunnerMode::Idle => distance > ctx.detect_distance,
            GunnerMode::Shooting { .. } => distance <= ctx.detect_distance,
        }
    }

    fn execute(&mut self, ctx: &mut GunnerContext<'a>) {
        if let GunnerMode::Shooting { cooldown } = self {
            if cooldown.is_none() {
                let token = ctx.tokens.issue();
                *cooldown = Some(token);
                ctx.fired = Some(token);
            }
        }
    }
}

#[derive(Component, Debug, Clone, Default, PartialEq)]
#[require(Enemy)]
pub struct Gunner {
    pub machine: TwoWayMachine<GunnerMode>,
    pub tokens: TokenCounter,
    pub shots_fired: u32,
}

impl Gunner {
    /// Continuation: cooldown истёк (только для своего токена)
    pub fn rearm(&mut self, token: u32) -> bool {
        match self.machine.current_mut() {
            GunnerMode::Shooting { cooldown } if *cooldown == Some(token) => {
                *cooldown = None;
                true
            }
            _ => false,
        }
    }
}

/// Система: facing к игроку + transition + execute
pub fn run_gunners(
    mut scheduler: ResMut<TimerScheduler>,
    mut cues: EventWriter<AnimationCue>,
    player: Option<Res<PlayerHandle>>,
    transforms: Query<&Transform>,
    mut gunners: Query<
        (
            Entity,
            &mut Gunner,
            &EnemySenses,
            &EnemyVitalsConfig,
            &GunnerConfig,
            &mut Facing,
        ),
        Without<Dead>,
    >,
) {
    for (entity, mut gunner, senses, vitals, fire, mut facing) in gunners.iter_mut() {
        if let Some(toward_player) = Facing::from_direction(senses.player_distance) {
            *facing = toward_player;
        }

        let Gunner {
            machine,
            tokens,
            shots_fired,
        } = &mut *gunner;

        let mut ctx = GunnerContext {
            player_distance: senses.player_distance,
            detect_distance: vitals.detect_distance,
            tokens,
            fired: None,
        };

        if machine.step(&mut ctx) {
            crate::logger::log(&format!("Gunner {:?} → {:?}", entity, machine.current()));
        }

        let Some(token) = ctx.fired else {
            continue;
        };

        // Без игрока/transform стреляем вперёд
        let direction = player
            .as_ref()
            .and_then(|handle| transforms.get(handle.0).ok())
            .zip(transforms.get(entity).ok())
            .map(|(target, own)| (target.translation - own.translation).truncate())
            .unwrap_or(Vec2::new(facing.sign(), 0.0));

        *shots_fired += 1;
        cues.write(AnimationCue::Trigger {
            entity,
            name: "attack",
        });
        scheduler.schedule(
            entity,
            fire.shoot_startup,
            TimerAction::Enemy(EnemyTimer::SpawnProjectile { direction }),
        );
        scheduler.schedule(
            entity,
            fire.shoot_interval,
            TimerAction::Enemy(EnemyTimer::ShootCooldownElapsed { generation: token }),
        );
    }
}

/// Система: cooldown истёк / startup прошёл → снаряд
pub fn handle_gunner_timers(
    mut commands: Commands,
    mut elapsed: EventReader<TimerElapsed>,
    mut scheduler: ResMut<TimerScheduler>,
    mut gunners: Query<(&mut Gunner, &Transform, &ProjectileConfig, Has<Dead>)>,
) {
    for timer in elapsed.read() {
        let TimerAction::Enemy(action) = timer.action else {
            continue;
        };
        let Ok((mut gunner, transform, projectile, dead)) = gunners.get_mut(timer.owner) else {
            continue;
        };

        match action {
            EnemyTimer::ShootCooldownElapsed { generation } => {
                gunner.rearm(generation);
            }
            EnemyTimer::SpawnProjectile { direction } if !dead => {
                launch_projectile(
                    &mut commands,
                    &mut scheduler,
                    timer.owner,
                    transform.translation.truncate(),
                    direction,
                    projectile,
                );
            }
            _ => {}
        }
    }
}
