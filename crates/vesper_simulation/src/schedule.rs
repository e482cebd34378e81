//! Entity frame driver: порядок фаз внутри одного FixedUpdate кадра
//!
//! ```text
//! Timers → Continuations → PhysicsRead → Sensing → Contacts → Behaviour
//!   → Player → Combat → Reactions → Hazards → Fades → PhysicsCommit
//!   → PhysicsStep → InputReset
//! ```
//!
//! Все фазы выполняются последовательно (`.chain()`), поведение одной
//! сущности никогда не мутируется параллельно. FixedUpdate однопоточный:
//! порядок резервирования Entity (снаряды, спавны) одинаков между запусками.

use bevy::ecs::schedule::ExecutorKind;
use bevy::prelude::*;
use bevy_rapier2d::prelude::CollisionEvent;

use crate::combat::{CombatEvent, DamageDealt, EntityDied};
use crate::hazards::{SwitchActivated, TrapTriggered};
use crate::level::LevelRequest;

use crate::input::{clear_input_edges, PlayerAction, PlayerAxes};
use crate::physics::{
    commit_physics_state, read_physics_state, refresh_shape_caster, ActiveContacts, ContactEvent,
};
use crate::presentation::{AnimationCue, OpacityCue, TintCue};
use crate::timer::{dispatch_due_timers, TimerElapsed, TimerScheduler};

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Созревшие таймеры → `TimerElapsed`
    Timers,
    /// Обработчики продолжений (recoil end, cooldowns, reload…)
    Continuations,
    /// Rigid body → `PhysicsBody`, collider snapshot
    PhysicsRead,
    /// Distance to player, edge / ground probes
    Sensing,
    /// `ContactEvent` → combat / climb / hazard intents
    Contacts,
    /// Enemy FSM: transition + execute
    Behaviour,
    Player,
    /// `CombatEvent` → damage
    Combat,
    /// Hurt / death reactions
    Reactions,
    Hazards,
    Fades,
    /// `PhysicsBody` → rigid body
    PhysicsCommit,
    /// Headless integrator (rapier работает в своём schedule)
    PhysicsStep,
    InputReset,
}

/// Plugin: фазы кадра + системы, не принадлежащие ни одному домену
pub struct FrameDriverPlugin;

impl Plugin for FrameDriverPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TimerScheduler>()
            .init_resource::<ButtonInput<PlayerAction>>()
            .init_resource::<PlayerAxes>()
            .init_resource::<ActiveContacts>()
            .add_event::<TimerElapsed>()
            .add_event::<ContactEvent>()
            .add_event::<AnimationCue>()
            .add_event::<TintCue>()
            .add_event::<OpacityCue>();

        app.edit_schedule(FixedUpdate, |schedule| {
            schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        });

        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::Timers,
                SimulationSet::Continuations,
                SimulationSet::PhysicsRead,
                SimulationSet::Sensing,
                SimulationSet::Contacts,
                SimulationSet::Behaviour,
                SimulationSet::Player,
                SimulationSet::Combat,
                SimulationSet::Reactions,
                SimulationSet::Hazards,
                SimulationSet::Fades,
                SimulationSet::PhysicsCommit,
                SimulationSet::PhysicsStep,
                SimulationSet::InputReset,
            )
                .chain(),
        )
        .add_systems(
            FixedUpdate,
            (
                dispatch_due_timers.in_set(SimulationSet::Timers),
                (read_physics_state, refresh_shape_caster)
                    .chain()
                    .in_set(SimulationSet::PhysicsRead),
                commit_physics_state.in_set(SimulationSet::PhysicsCommit),
                clear_input_edges.in_set(SimulationSet::InputReset),
            ),
        );
    }
}

/// Double-buffer swap всех событий симуляции
///
/// `step_frame` крутит `FixedUpdate` без `First`, так что штатный
/// `event_update_system` не выполняется. Каждый reader читает каждый кадр:
/// событие живёт два swap'а и успевает дойти до всех.
pub fn update_simulation_events(world: &mut World) {
    update_events::<TimerElapsed>(world);
    update_events::<ContactEvent>(world);
    update_events::<AnimationCue>(world);
    update_events::<TintCue>(world);
    update_events::<OpacityCue>(world);
    update_events::<CombatEvent>(world);
    update_events::<DamageDealt>(world);
    update_events::<EntityDied>(world);
    update_events::<SwitchActivated>(world);
    update_events::<TrapTriggered>(world);
    update_events::<LevelRequest>(world);
    update_events::<CollisionEvent>(world);
}

fn update_events<E: Event>(world: &mut World) {
    if let Some(mut events) = world.get_resource_mut::<Events<E>>() {
        events.update();
    }
}
