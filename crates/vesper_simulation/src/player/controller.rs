//! Player controller: ортогональные регионы состояния
//!
//! Вместо одного enum: несколько независимых регионов (movement, sprint,
//! combat, vitality) плюс общий гейт ввода. Каждый регион меняется своими
//! командами и своими таймерами, регионы друг друга не сбрасывают.
//!
//! Вся логика здесь чистая: ECS системы (`systems`, `climb`, `vitality`)
//! собирают `PlayerFrame`, вызывают методы контроллера и потом сбрасывают
//! накопленные cue/таймеры в Bevy.

use bevy::prelude::*;

use crate::combat::AttackDirection;
use crate::components::{Facing, PhysicsBody};
use crate::config::PlayerConfig;
use crate::input::{PlayerAction, PlayerAxes};
use crate::presentation::CueBuffer;
use crate::timer::{PlayerTimer, TimerAction, TimerScheduler};

/// Jump charges после приземления
pub const GROUND_JUMP_CHARGES: u8 = 2;
/// Jump charges, пока висим на стене
pub const CLIMB_JUMP_CHARGES: u8 = 1;

/// Ground probe (circle cast вниз)
pub const GROUND_PROBE_RADIUS: f32 = 0.2;
pub const GROUND_PROBE_DISTANCE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct MovementRegion {
    pub grounded: bool,
    pub climbing: bool,
    /// Отпустили Jump в этом кадре (ускоренное падение)
    pub falling: bool,
    pub jump_charges: u8,
}

/// Два последовательных гейта: `sprintable` возвращается после `sprint_time`,
/// `recharged`: ещё через `sprint_interval`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct SprintRegion {
    pub sprintable: bool,
    pub recharged: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct CombatRegion {
    pub attack_ready: bool,
    /// Активный attack effect (окно `attack_effect_lifetime`)
    #[reflect(ignore)]
    pub effect: Option<AttackDirection>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum Vitality {
    #[default]
    Normal,
    /// Неуязвим: от удара до конца `hurt_time + hurt_recover_time`
    Hurt,
    Dead,
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PlayerController {
    pub movement: MovementRegion,
    pub sprint: SprintRegion,
    pub combat: CombatRegion,
    pub vitality: Vitality,
    pub input_enabled: bool,
}

impl Default for PlayerController {
    fn default() -> Self {
        Self {
            movement: MovementRegion {
                grounded: false,
                climbing: false,
                falling: false,
                jump_charges: GROUND_JUMP_CHARGES,
            },
            sprint: SprintRegion {
                sprintable: false,
                recharged: true,
            },
            combat: CombatRegion {
                attack_ready: true,
                effect: None,
            },
            vitality: Vitality::Normal,
            input_enabled: true,
        }
    }
}

/// Снимок ввода на кадр
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    pub horizontal: f32,
    pub vertical: f32,
    pub jump_pressed: bool,
    pub jump_released: bool,
    pub sprint_pressed: bool,
    pub attack_pressed: bool,
}

impl PlayerInput {
    pub fn read(buttons: &ButtonInput<PlayerAction>, axes: &PlayerAxes) -> Self {
        Self {
            horizontal: axes.horizontal,
            vertical: axes.vertical,
            jump_pressed: buttons.just_pressed(PlayerAction::Jump),
            jump_released: buttons.just_released(PlayerAction::Jump),
            sprint_pressed: buttons.just_pressed(PlayerAction::Sprint),
            attack_pressed: buttons.just_pressed(PlayerAction::Attack),
        }
    }
}

/// Рабочий контекст одного вызова контроллера
///
/// Копит cue и запросы таймеров; `flush` отдаёт их в Bevy.
pub struct PlayerFrame<'a> {
    pub entity: Entity,
    pub config: &'a PlayerConfig,
    pub body: &'a mut PhysicsBody,
    pub facing: &'a mut Facing,
    pub cues: CueBuffer,
    pub timers: Vec<(f32, PlayerTimer)>,
    /// Точка отсчёта для `timers`; `None`: текущий кадр
    pub origin: Option<f64>,
}

impl<'a> PlayerFrame<'a> {
    pub fn new(
        entity: Entity,
        config: &'a PlayerConfig,
        body: &'a mut PhysicsBody,
        facing: &'a mut Facing,
    ) -> Self {
        Self {
            entity,
            config,
            body,
            facing,
            cues: CueBuffer::default(),
            timers: Vec::new(),
            origin: None,
        }
    }

    /// Продолжение цепочки: новые таймеры считаются от дедлайна сработавшего
    pub fn chained_from(mut self, deadline: f64) -> Self {
        self.origin = Some(deadline);
        self
    }

    fn after(&mut self, delay: f32, timer: PlayerTimer) {
        self.timers.push((delay, timer));
    }

    pub fn flush(
        &mut self,
        scheduler: &mut TimerScheduler,
        writer: &mut EventWriter<crate::presentation::AnimationCue>,
    ) {
        let origin = self.origin.unwrap_or_else(|| scheduler.now());
        for (delay, timer) in self.timers.drain(..) {
            scheduler.schedule_from(origin, self.entity, delay, TimerAction::Player(timer));
        }
        self.cues.flush(writer);
    }
}

impl PlayerController {
    pub fn is_dead(&self) -> bool {
        self.vitality == Vitality::Dead
    }

    /// Один кадр: refresh состояния, затем команды (если ввод разрешён)
    ///
    /// Возвращает направление атаки, если атака началась в этом кадре.
    pub fn update(
        &mut self,
        grounded: bool,
        input: &PlayerInput,
        frame: &mut PlayerFrame,
    ) -> Option<AttackDirection> {
        self.refresh(grounded, frame);
        if !self.input_enabled {
            return None;
        }

        self.move_horizontal(input.horizontal, frame);
        if input.jump_pressed {
            self.jump(frame);
        }
        self.fall_control(input.jump_released, frame);
        if input.sprint_pressed {
            self.try_sprint(frame);
        }
        if input.attack_pressed {
            return self.try_attack(input.vertical, frame);
        }
        None
    }

    /// Ground probe → флаги, charges, sprint re-arm
    pub fn refresh(&mut self, grounded: bool, frame: &mut PlayerFrame) {
        let entity = frame.entity;
        self.movement.grounded = grounded;
        frame.cues.set_bool(entity, "IsGround", grounded);

        let vertical = frame.body.velocity.y;
        frame.cues.set_bool(entity, "IsDown", vertical < 0.0);

        if grounded && vertical == 0.0 {
            frame.cues.set_bool(entity, "IsJump", false);
            frame.cues.reset_trigger(entity, "IsJumpFirst");
            frame.cues.reset_trigger(entity, "IsJumpSecond");
            frame.cues.set_bool(entity, "IsDown", false);

            self.movement.jump_charges = GROUND_JUMP_CHARGES;
            self.movement.climbing = false;
            self.sprint.sprintable = true;
        } else if self.movement.climbing {
            self.movement.jump_charges = CLIMB_JUMP_CHARGES;
        }
    }

    pub fn move_horizontal(&mut self, axis: f32, frame: &mut PlayerFrame) {
        let entity = frame.entity;
        frame.body.set_horizontal(axis * frame.config.move_speed);

        if !self.movement.climbing {
            if let Some(direction) = Facing::from_direction(axis) {
                if direction != *frame.facing {
                    *frame.facing = direction;
                    if self.movement.grounded {
                        frame.cues.trigger(entity, "IsRotate");
                    }
                } else {
                    frame.cues.set_bool(entity, "IsRun", true);
                }
            }
        }

        if axis == 0.0 {
            frame.cues.trigger(entity, "stopTrigger");
            frame.cues.reset_trigger(entity, "IsRotate");
            frame.cues.set_bool(entity, "IsRun", false);
        } else {
            frame.cues.reset_trigger(entity, "stopTrigger");
        }
    }

    /// Jump press: climb-jump со стены или обычный прыжок за charge
    pub fn jump(&mut self, frame: &mut PlayerFrame) {
        if self.movement.climbing {
            self.climb_jump(frame);
            return;
        }
        if self.movement.jump_charges == 0 {
            return;
        }

        let entity = frame.entity;
        frame.body.set_vertical(frame.config.jump_speed);
        frame.cues.set_bool(entity, "IsJump", true);

        self.movement.jump_charges -= 1;
        match self.movement.jump_charges {
            0 => frame.cues.trigger(entity, "IsJumpSecond"),
            1 => frame.cues.trigger(entity, "IsJumpFirst"),
            _ => {}
        }
    }

    /// Оттолкнуться от стены; разворот: только после `climb_jump_delay`
    fn climb_jump(&mut self, frame: &mut PlayerFrame) {
        let force = frame.config.climb_jump_force;
        let away = -frame.facing.sign();
        frame.body.apply_impulse(Vec2::new(away * force.x, force.y));

        frame.cues.trigger(frame.entity, "IsClimbJump");
        frame.cues.trigger(frame.entity, "IsJumpFirst");

        self.input_enabled = false;
        frame.after(frame.config.climb_jump_delay, PlayerTimer::ClimbJumpCommit);
    }

    pub fn fall_control(&mut self, jump_released: bool, frame: &mut PlayerFrame) {
        if jump_released && !self.movement.climbing {
            self.movement.falling = true;
            frame.body.set_vertical(-frame.config.fall_speed);
        } else {
            self.movement.falling = false;
        }
    }

    pub fn try_sprint(&mut self, frame: &mut PlayerFrame) -> bool {
        if !(self.sprint.sprintable && self.sprint.recharged) {
            return false;
        }

        self.input_enabled = false;
        self.sprint.sprintable = false;
        self.sprint.recharged = false;

        let speed = frame.config.sprint_speed;
        let sign = frame.facing.sign();
        // Со стены: рывок от неё
        let vx = if self.movement.climbing {
            -sign * speed
        } else {
            sign * speed
        };
        frame.body.velocity = Vec2::new(vx, 0.0);

        if self.movement.climbing {
            *frame.facing = frame.facing.flipped();
        }

        frame.cues.trigger(frame.entity, "IsSprint");
        frame.after(frame.config.sprint_time, PlayerTimer::SprintEnd);
        true
    }

    pub fn try_attack(&mut self, vertical: f32, frame: &mut PlayerFrame) -> Option<AttackDirection> {
        if !self.combat.attack_ready || self.movement.climbing {
            return None;
        }

        let direction = AttackDirection::choose(vertical, self.movement.grounded);
        self.combat.attack_ready = false;
        self.combat.effect = Some(direction);

        frame.cues.trigger(frame.entity, direction.cue());
        frame.after(frame.config.attack_effect_lifetime, PlayerTimer::AttackEffectEnd);
        Some(direction)
    }

    /// Recoil после попадания sweep'а
    pub fn attack_recoil(direction: AttackDirection, facing: Facing, config: &PlayerConfig) -> Vec2 {
        match direction {
            AttackDirection::Up => config.attack_up_recoil,
            AttackDirection::Down => config.attack_down_recoil,
            AttackDirection::Forward => Vec2::new(
                -facing.sign() * config.attack_forward_recoil.x,
                config.attack_forward_recoil.y,
            ),
        }
    }

    pub fn start_climb(&mut self, frame: &mut PlayerFrame) {
        frame.body.gravity_scale = 0.0;
        frame.body.velocity = Vec2::new(0.0, -frame.config.climb_creep_speed);

        self.movement.climbing = true;
        frame.cues.set_bool(frame.entity, "IsClimb", true);
        self.sprint.sprintable = true;
    }

    pub fn stop_climb(&mut self, frame: &mut PlayerFrame) {
        self.movement.climbing = false;
        frame.cues.set_bool(frame.entity, "IsClimb", false);
        frame.body.gravity_scale = 1.0;
    }

    /// Урон, после которого игрок жив
    pub fn hurt(&mut self, frame: &mut PlayerFrame) {
        self.vitality = Vitality::Hurt;
        self.input_enabled = false;

        frame.cues.trigger(frame.entity, "IsHurt");

        let velocity = frame.config.hurt_velocity;
        frame.body.velocity = Vec2::new(-frame.facing.sign() * velocity.x, velocity.y);
        frame.after(frame.config.hurt_time, PlayerTimer::HurtInputRestore);
    }

    /// Здоровье кончилось: ввод выключен навсегда
    pub fn die(&mut self, frame: &mut PlayerFrame) {
        self.vitality = Vitality::Dead;
        self.input_enabled = false;

        frame.cues.trigger(frame.entity, "IsDead");

        let force = frame.config.death_force;
        frame.body.velocity = Vec2::ZERO;
        frame
            .body
            .apply_impulse(Vec2::new(-frame.facing.sign() * force.x, force.y));
        frame.after(frame.config.death_delay, PlayerTimer::DeathReload);
    }

    /// Продолжения таймеров игрока (только состояние регионов)
    ///
    /// Слой, tint, материал и reload уровня делает `vitality`.
    pub fn on_timer(&mut self, timer: PlayerTimer, frame: &mut PlayerFrame) {
        let alive = !self.is_dead();

        match timer {
            PlayerTimer::ClimbJumpCommit => {
                self.input_enabled = alive;
                frame.cues.reset_trigger(frame.entity, "IsClimbJump");
                *frame.facing = frame.facing.flipped();
            }
            PlayerTimer::SprintEnd => {
                self.input_enabled = alive;
                self.sprint.sprintable = true;
                frame.after(frame.config.sprint_interval, PlayerTimer::SprintRecharged);
            }
            PlayerTimer::SprintRecharged => {
                self.sprint.recharged = true;
            }
            PlayerTimer::AttackEffectEnd => {
                self.combat.effect = None;
                frame.after(frame.config.attack_interval, PlayerTimer::AttackReady);
            }
            PlayerTimer::AttackReady => {
                self.combat.attack_ready = true;
            }
            PlayerTimer::HurtInputRestore => {
                self.input_enabled = alive;
                frame.after(frame.config.hurt_recover_time, PlayerTimer::HurtRecover);
            }
            PlayerTimer::HurtRecover => {
                if alive {
                    self.vitality = Vitality::Normal;
                }
            }
            PlayerTimer::DeathReload => {}
        }
    }
}
