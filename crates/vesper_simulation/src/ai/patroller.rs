//! Ground patroller: Patrol { Idle | WalkingLeft | WalkingRight } ⇄ Chase
//!
//! Top-level режимы чередуются через `TwoWayMachine` (alert флаг).
//! Внутри Patrol: случайные sub-state'ы с таймером длительности:
//! - пока таймер шага не истёк, sub-state не сменяется
//! - исключение: Idle перед краем платформы пересэмплируется сразу
//! - новый sub-state никогда не равен предыдущему

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::{Enemy, EnemySenses};
use crate::combat::Dead;
use crate::components::{Facing, PhysicsBody};
use crate::config::{EnemyVitalsConfig, PatrolConfig};
use crate::fsm::{pick_excluding, ModePair, State, TokenCounter, TwoWayMachine};
use crate::physics::{CircleCast, PhysicsQueries, LAYER_PLATFORM};
use crate::presentation::AnimationCue;
use crate::timer::{EnemyTimer, TimerAction, TimerElapsed, TimerScheduler};
use crate::DeterministicRng;

#[cfg(test)]
#[path = "patroller_tests.rs"]
mod patroller_tests;

/// Edge probe: circle cast вниз
pub const EDGE_PROBE_RADIUS: f32 = 0.3;
pub const EDGE_PROBE_DISTANCE: f32 = 1.1;

/// Chase не дёргается, если игрок ближе этого по x
pub const CHASE_DEAD_ZONE: f32 = 0.1;

/// Patrol sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum PatrolStep {
    Idle,
    WalkingLeft,
    WalkingRight,
}

impl PatrolStep {
    pub const ALL: [PatrolStep; 3] = [
        PatrolStep::Idle,
        PatrolStep::WalkingLeft,
        PatrolStep::WalkingRight,
    ];

    /// Exit guard по результату edge sensing
    pub fn check_valid(self, reach_edge: i8) -> bool {
        match self {
            PatrolStep::Idle => reach_edge == 0,
            PatrolStep::WalkingLeft => reach_edge != -1,
            PatrolStep::WalkingRight => reach_edge != 1,
        }
    }

    pub fn move_command(self) -> f32 {
        match self {
            PatrolStep::Idle => 0.0,
            PatrolStep::WalkingLeft => -1.0,
            PatrolStep::WalkingRight => 1.0,
        }
    }
}

/// Top-level режим патрульного
#[derive(Debug, Clone, PartialEq)]
pub enum PatrolMode {
    Patrol {
        step: PatrolStep,
        /// Токен таймера текущего шага; `None`: шаг закончен
        awaiting: Option<u32>,
    },
    Chase,
}

impl ModePair for PatrolMode {
    /// Свежий Patrol считает Idle предыдущим шагом и сразу сэмплирует
    fn passive() -> Self {
        PatrolMode::Patrol {
            step: PatrolStep::Idle,
            awaiting: None,
        }
    }

    fn alert() -> Self {
        PatrolMode::Chase
    }
}

/// Контекст одного кадра патрульного
pub struct PatrolContext<'a> {
    /// player.x − self.x
    pub player_distance: f32,
    pub detect_distance: f32,
    pub reach_edge: i8,
    pub interval_least: f32,
    pub interval_most: f32,
    pub rng: &'a mut ChaCha8Rng,
    pub tokens: &'a mut TokenCounter,
    /// Output: команда движения этого кадра
    pub walk: Option<f32>,
    /// Output: (token, delay) нового таймера шага
    pub armed: Option<(u32, f32)>,
}

impl<'a> State<PatrolContext<'a>> for PatrolMode {
    fn check_valid(&self, ctx: &PatrolContext<'a>) -> bool {
        let distance = ctx.player_distance.abs();
        match self {
            PatrolMode::Patrol { .. } => distance > ctx.detect_distance,
            PatrolMode::Chase => distance <= ctx.detect_distance,
        }
    }

    fn execute(&mut self, ctx: &mut PatrolContext<'a>) {
        match self {
            PatrolMode::Patrol { step, awaiting } => {
                let finished = awaiting.is_none();
                let idle_at_edge = *step == PatrolStep::Idle && !step.check_valid(ctx.reach_edge);

                if finished || idle_at_edge {
                    *step = pick_excluding(&PatrolStep::ALL, *step, &mut *ctx.rng);

                    let token = ctx.tokens.issue();
                    let delay = ctx.rng.gen_range(ctx.interval_least..ctx.interval_most);
                    *awaiting = Some(token);
                    ctx.armed = Some((token, delay));
                }

                ctx.walk = Some(step.move_command());
            }
            PatrolMode::Chase => {
                let distance = ctx.player_distance;
                ctx.walk = Some(if distance.abs() < CHASE_DEAD_ZONE {
                    0.0
                } else {
                    distance
                });
            }
        }
    }
}

/// Patroller component: машина режимов + токены таймеров шагов
#[derive(Component, Debug, Clone, Default, PartialEq)]
#[require(Enemy)]
pub struct Patroller {
    pub machine: TwoWayMachine<PatrolMode>,
    pub tokens: TokenCounter,
}

impl Patroller {
    /// Continuation: таймер шага истёк (чужие токены игнорируются)
    pub fn finish_step(&mut self, token: u32) -> bool {
        match self.machine.current_mut() {
            PatrolMode::Patrol { awaiting, .. } if *awaiting == Some(token) => {
                *awaiting = None;
                true
            }
            _ => false,
        }
    }
}

/// Walk command → velocity/facing
///
/// Скорость 0, если направление совпадает с краем впереди. Facing
/// разворачивается на любое ненулевое направление. Возвращает |speed|.
pub fn walk(
    command: f32,
    reach_edge: i8,
    walk_speed: f32,
    body: &mut PhysicsBody,
    facing: &mut Facing,
) -> f32 {
    let direction: i8 = if command > 0.0 {
        1
    } else if command < 0.0 {
        -1
    } else {
        0
    };

    let speed = if direction == reach_edge {
        0.0
    } else {
        f32::from(direction) * walk_speed
    };

    if let Some(new_facing) = Facing::from_direction(command) {
        *facing = new_facing;
    }

    body.set_horizontal(speed);
    speed.abs()
}

/// Edge sensing result: 0: земля впереди есть, иначе знак facing
pub fn reach_edge_from_probe(ground_ahead: bool, facing: Facing) -> i8 {
    if ground_ahead {
        0
    } else if facing == Facing::Right {
        1
    } else {
        -1
    }
}

/// Система: edge probe перед каждым патрульным
pub fn sense_edges(
    queries: Option<Res<PhysicsQueries>>,
    mut patrollers: Query<
        (&Transform, &Facing, &PatrolConfig, &mut EnemySenses),
        (With<Patroller>, Without<Dead>),
    >,
) {
    let Some(queries) = queries else {
        return;
    };

    for (transform, facing, patrol, mut senses) in patrollers.iter_mut() {
        let origin = transform.translation.truncate()
            + Vec2::new(patrol.edge_safe_distance * facing.sign(), 0.0);
        let probe = CircleCast::down(origin, EDGE_PROBE_RADIUS, EDGE_PROBE_DISTANCE, LAYER_PLATFORM);

        senses.reach_edge = reach_edge_from_probe(queries.cast(&probe).is_some(), *facing);
    }
}

/// Система: transition + execute для всех живых патрульных
pub fn run_patrollers(
    mut rng: ResMut<DeterministicRng>,
    mut scheduler: ResMut<TimerScheduler>,
    mut cues: EventWriter<AnimationCue>,
    mut patrollers: Query<
        (
            Entity,
            &mut Patroller,
            &Enemy,
            &EnemySenses,
            &EnemyVitalsConfig,
            &PatrolConfig,
            &mut PhysicsBody,
            &mut Facing,
        ),
        Without<Dead>,
    >,
) {
    for (entity, mut patroller, enemy, senses, vitals, patrol, mut body, mut facing) in
        patrollers.iter_mut()
    {
        let Patroller { machine, tokens } = &mut *patroller;

        let mut ctx = PatrolContext {
            player_distance: senses.player_distance,
            detect_distance: vitals.detect_distance,
            reach_edge: senses.reach_edge,
            interval_least: patrol.behave_interval_least,
            interval_most: patrol.behave_interval_most,
            rng: &mut rng.rng,
            tokens,
            walk: None,
            armed: None,
        };

        if machine.evaluate(&ctx) {
            crate::logger::log(&format!(
                "Patroller {:?} → {:?} (distance {:.2})",
                entity,
                machine.current(),
                senses.player_distance
            ));
        }

        if !enemy.movable {
            continue;
        }

        machine.current_mut().execute(&mut ctx);

        if let Some((token, delay)) = ctx.armed {
            scheduler.schedule(
                entity,
                delay,
                TimerAction::Enemy(EnemyTimer::PatrolStepElapsed { generation: token }),
            );
        }

        if let Some(command) = ctx.walk {
            let speed = walk(command, senses.reach_edge, patrol.walk_speed, &mut body, &mut facing);
            cues.write(AnimationCue::Float {
                entity,
                name: "Speed",
                value: speed,
            });
        }
    }
}

/// Система: продолжения таймеров шагов
pub fn handle_patrol_timers(
    mut elapsed: EventReader<TimerElapsed>,
    mut patrollers: Query<&mut Patroller>,
) {
    for timer in elapsed.read() {
        let TimerAction::Enemy(EnemyTimer::PatrolStepElapsed { generation }) = timer.action else {
            continue;
        };
        if let Ok(mut patroller) = patrollers.get_mut(timer.owner) {
            patroller.finish_step(generation);
        }
    }
}
