//! Timer scheduler: отложенные продолжения в simulation time
//!
//! Любое "подождать N секунд, потом сделать X" (recoil, cooldown, fade,
//! delayed spawn, climb-jump commit, reload после смерти) оформляется как
//! `TimerAction` в очереди с дедлайном. Кадр не блокируется: действие
//! начинается синхронно, продолжение срабатывает на одном из следующих кадров.
//!
//! # Гарантии
//! - Таймер срабатывает не более одного раза
//! - Порядок: по дедлайну, при равенстве: по порядку постановки
//! - Таймеры despawned владельцев молча отбрасываются (нет cancel API)
//! - Цепочки (`schedule_from` от `TimerElapsed::deadline`) не копят ошибку
//!   округления до кадра: второй шаг срабатывает ровно через сумму задержек

use bevy::ecs::entity::Entities;
use bevy::prelude::*;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;


/// Продолжения врагов
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyTimer {
    /// Конец hurt recoil окна: движение снова разрешено
    RecoilEnd,
    /// Patrol sub-state отработал свой интервал
    PatrolStepElapsed { generation: u32 },
    /// Gunner cooldown между выстрелами истёк
    ShootCooldownElapsed { generation: u32 },
    /// Startup delay выстрела прошёл: спавним снаряд
    ///
    /// Направление фиксируется в момент выстрела (gunner → player).
    SpawnProjectile { direction: Vec2 },
}

/// Продолжения игрока
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerTimer {
    ClimbJumpCommit,
    SprintEnd,
    SprintRecharged,
    AttackEffectEnd,
    AttackReady,
    HurtInputRestore,
    HurtRecover,
    DeathReload,
}

/// Продолжения ловушек
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HazardTimer {
    /// Trigger delay нестабильной платформы истёк
    PlatformCrumble,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerAction {
    Enemy(EnemyTimer),
    Player(PlayerTimer),
    Hazard(HazardTimer),
    /// Удалить владельца (конец fade-out, lifetime снаряда)
    Despawn,
}

/// Event: таймер владельца сработал (owner гарантированно жив на момент dispatch)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct TimerElapsed {
    pub owner: Entity,
    pub action: TimerAction,
    /// Дедлайн, на который таймер был поставлен (≤ текущего времени)
    pub deadline: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct ScheduledTimer {
    pub deadline: f64,
    pub seq: u64,
    pub owner: Entity,
    pub action: TimerAction,
}

impl PartialEq for ScheduledTimer {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledTimer {}

impl PartialOrd for ScheduledTimer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledTimer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.deadline
            .total_cmp(&other.deadline)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Очередь таймеров (min-heap по дедлайну)
#[derive(Resource, Debug, Default)]
pub struct TimerScheduler {
    queue: BinaryHeap<Reverse<ScheduledTimer>>,
    next_seq: u64,
    /// Simulation time текущего кадра (обновляется в `dispatch_due_timers`)
    now: f64,
}

impl TimerScheduler {
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn advance_to(&mut self, now: f64) {
        self.now = self.now.max(now);
    }

    /// Запланировать `action` для `owner` через `delay` секунд от текущего кадра
    pub fn schedule(&mut self, owner: Entity, delay: f32, action: TimerAction) {
        self.schedule_from(self.now, owner, delay, action);
    }

    /// То же, но отсчёт от `origin` (дедлайн предыдущего звена цепочки)
    pub fn schedule_from(&mut self, origin: f64, owner: Entity, delay: f32, action: TimerAction) {
        let deadline = origin + f64::from(delay.max(0.0));
        let seq = self.next_seq;
        self.next_seq += 1;

        self.queue.push(Reverse(ScheduledTimer {
            deadline,
            seq,
            owner,
            action,
        }));
    }

    /// Следующий таймер с дедлайном ≤ now
    pub fn pop_due(&mut self, now: f64) -> Option<ScheduledTimer> {
        match self.queue.peek() {
            Some(Reverse(timer)) if timer.deadline <= now => self.queue.pop().map(|r| r.0),
            _ => None,
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn pending_for(&self, owner: Entity) -> usize {
        self.queue.iter().filter(|r| r.0.owner == owner).count()
    }

    pub fn next_deadline(&self) -> Option<f64> {
        self.queue.peek().map(|r| r.0.deadline)
    }
}

/// System: выдать все созревшие таймеры как `TimerElapsed` events
///
/// Запускается ПЕРВЫМ в кадре: продолжения видят состояние до behaviour систем.
pub fn dispatch_due_timers(
    mut scheduler: ResMut<TimerScheduler>,
    time: Res<Time>,
    entities: &Entities,
    mut elapsed: EventWriter<TimerElapsed>,
) {
    let now = time.elapsed_secs_f64();
    scheduler.advance_to(now);

    while let Some(timer) = scheduler.pop_due(now) {
        if !entities.contains(timer.owner) {
            crate::logger::log(&format!(
                "timer {:?} dropped: owner {:?} no longer exists",
                timer.action, timer.owner
            ));
            continue;
        }

        elapsed.write(TimerElapsed {
            owner: timer.owner,
            action: timer.action,
            deadline: timer.deadline,
        });
    }
}
