//! Switch → obstacle / trap cascade

use bevy::prelude::*;

use super::{Obstacle, SwitchActivated, TrapTriggered};
use crate::physics::decoration_groups;
use crate::presentation::{AnimationCue, Tint, TintCue};

/// Цвет сработавшего переключателя
pub const SWITCH_TRIGGERED_TINT: Tint = Tint::rgba(0.6, 1.0, 0.6, 1.0);

/// Переключатель: одноразовый, бьётся атакой игрока
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Switch {
    /// Препятствие, которое исчезает при активации
    pub obstacle: Option<Entity>,
    /// Ловушка, которая срабатывает при активации
    pub trap: Option<Entity>,
    pub activated: bool,
}

impl Switch {
    /// Одноразовость: true только при первом включении
    pub fn turn_on(&mut self) -> bool {
        if self.activated {
            return false;
        }
        self.activated = true;
        true
    }
}

/// Система: SwitchActivated → cue, убрать препятствие, запустить ловушку
pub fn activate_switches(
    mut commands: Commands,
    mut activations: EventReader<SwitchActivated>,
    mut triggered: EventWriter<TrapTriggered>,
    mut cues: EventWriter<AnimationCue>,
    mut tints: EventWriter<TintCue>,
    mut switches: Query<&mut Switch>,
    obstacles: Query<(), With<Obstacle>>,
) {
    for activation in activations.read() {
        let Ok(mut switch) = switches.get_mut(activation.switch) else {
            continue;
        };
        if !switch.turn_on() {
            continue;
        }

        cues.write(AnimationCue::Trigger {
            entity: activation.switch,
            name: "triggered",
        });
        tints.write(TintCue {
            entity: activation.switch,
            tint: SWITCH_TRIGGERED_TINT,
        });

        if let Some(obstacle) = switch.obstacle.filter(|o| obstacles.contains(*o)) {
            commands.entity(obstacle).try_despawn();
        }
        if let Some(trap) = switch.trap {
            triggered.write(TrapTriggered { trap });
        }
        commands
            .entity(activation.switch)
            .try_insert(decoration_groups());

        crate::logger::log_info(&format!(
            "Switch {:?} turned on by {:?}",
            activation.switch, activation.by
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_is_one_shot() {
        let mut switch = Switch::default();
        assert!(switch.turn_on());
        assert!(!switch.turn_on());
        assert!(switch.activated);
    }
}
