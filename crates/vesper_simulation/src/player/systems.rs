//! Player systems: кадр контроллера и продолжения таймеров

use bevy::prelude::*;

use super::controller::{
    PlayerController, PlayerFrame, PlayerInput, GROUND_PROBE_DISTANCE, GROUND_PROBE_RADIUS,
};
use super::Player;
use crate::combat::{attack_cast, resolve_sweep, CombatEvent};
use crate::components::{Facing, PhysicsBody};
use crate::config::PlayerConfig;
use crate::hazards::SwitchActivated;
use crate::input::{PlayerAction, PlayerAxes};
use crate::physics::{CircleCast, PhysicsQueries, LAYER_PLATFORM};
use crate::presentation::AnimationCue;
use crate::timer::{TimerAction, TimerElapsed, TimerScheduler};

/// Система: refresh + input команды + attack sweep
///
/// Sweep выполняется сразу (в кадре нажатия); эффекты попаданий идут
/// через события (`CombatEvent`, `SwitchActivated`) и despawn снарядов.
#[allow(clippy::too_many_arguments)]
pub fn drive_player(
    mut commands: Commands,
    buttons: Res<ButtonInput<PlayerAction>>,
    axes: Res<PlayerAxes>,
    queries: Option<Res<PhysicsQueries>>,
    mut scheduler: ResMut<TimerScheduler>,
    mut cues: EventWriter<AnimationCue>,
    mut combat: EventWriter<CombatEvent>,
    mut switches: EventWriter<SwitchActivated>,
    mut players: Query<
        (
            Entity,
            &mut PlayerController,
            &PlayerConfig,
            &mut PhysicsBody,
            &mut Facing,
            &Transform,
        ),
        With<Player>,
    >,
) {
    let Some(queries) = queries else {
        return;
    };
    let input = PlayerInput::read(&buttons, &axes);

    for (entity, mut controller, config, mut body, mut facing, transform) in players.iter_mut() {
        let origin = transform.translation.truncate();
        let probe = CircleCast::down(origin, GROUND_PROBE_RADIUS, GROUND_PROBE_DISTANCE, LAYER_PLATFORM);
        let grounded = queries.cast(&probe).is_some();

        let mut frame = PlayerFrame::new(entity, config, &mut body, &mut facing);
        let attack = controller.update(grounded, &input, &mut frame);

        if let Some(direction) = attack {
            let vector = direction.vector(frame.facing.sign());
            let hits = queries.cast_all(&attack_cast(origin, vector));
            let outcome = resolve_sweep(entity, vector, &hits);

            for event in outcome.combat {
                combat.write(event);
            }
            for switch in outcome.switches {
                switches.write(SwitchActivated { switch, by: entity });
            }
            for projectile in outcome.projectiles {
                commands.entity(projectile).try_despawn();
            }

            if outcome.hit_any {
                frame.body.velocity =
                    PlayerController::attack_recoil(direction, *frame.facing, config);
            }

            crate::logger::log(&format!(
                "Player attack {:?}: {} hits",
                direction,
                hits.len()
            ));
        }

        frame.flush(&mut scheduler, &mut cues);
    }
}

/// Система: продолжения таймеров игрока
pub fn handle_player_timers(
    mut elapsed: EventReader<TimerElapsed>,
    mut scheduler: ResMut<TimerScheduler>,
    mut cues: EventWriter<AnimationCue>,
    mut players: Query<
        (&mut PlayerController, &PlayerConfig, &mut PhysicsBody, &mut Facing),
        With<Player>,
    >,
) {
    for timer in elapsed.read() {
        let TimerAction::Player(action) = timer.action else {
            continue;
        };
        let Ok((mut controller, config, mut body, mut facing)) = players.get_mut(timer.owner)
        else {
            continue;
        };

        let mut frame = PlayerFrame::new(timer.owner, config, &mut body, &mut facing)
            .chained_from(timer.deadline);
        controller.on_timer(action, &mut frame);
        frame.flush(&mut scheduler, &mut cues);
    }
}
