//! Wall contacts → climb enter/exit

use bevy::prelude::*;
use bevy_rapier2d::prelude::CollisionGroups;

use super::controller::{PlayerController, PlayerFrame};
use super::Player;
use crate::components::{Facing, PhysicsBody};
use crate::config::PlayerConfig;
use crate::physics::{ContactEvent, ContactPhase, LAYER_WALL};
use crate::presentation::AnimationCue;

/// Решение по одному контакту со стеной
pub fn wall_contact_starts_climb(controller: &PlayerController, phase: ContactPhase) -> bool {
    match phase {
        ContactPhase::Enter => !controller.movement.grounded,
        ContactPhase::Stay => controller.movement.falling && !controller.movement.climbing,
        ContactPhase::Exit => false,
    }
}

/// Система: ContactEvent игрока со стеной
///
/// Enter в воздухе (или Stay во время fall) → climb; Exit → конец climb.
/// Мёртвый игрок не цепляется за стены, но Exit всё равно возвращает гравитацию.
pub fn handle_wall_contacts(
    mut contacts: EventReader<ContactEvent>,
    mut cues: EventWriter<AnimationCue>,
    walls: Query<&CollisionGroups>,
    mut players: Query<
        (&mut PlayerController, &PlayerConfig, &mut PhysicsBody, &mut Facing),
        With<Player>,
    >,
) {
    for contact in contacts.read() {
        let is_wall = walls
            .get(contact.other)
            .is_ok_and(|groups| groups.memberships.intersects(LAYER_WALL));
        if !is_wall {
            continue;
        }
        let Ok((mut controller, config, mut body, mut facing)) = players.get_mut(contact.entity)
        else {
            continue;
        };
        if contact.phase != ContactPhase::Exit && controller.is_dead() {
            continue;
        }

        let mut frame = PlayerFrame::new(contact.entity, config, &mut body, &mut facing);
        if contact.phase == ContactPhase::Exit {
            controller.stop_climb(&mut frame);
        } else if wall_contact_starts_climb(&controller, contact.phase) {
            controller.start_climb(&mut frame);
        }
        frame.cues.flush(&mut cues);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::wall_groups;
    use crate::player::Vitality;
    use bevy::ecs::system::RunSystemOnce;

    fn world_with_climber() -> (World, Entity, Entity) {
        let mut world = World::new();
        world.init_resource::<Events<ContactEvent>>();
        world.init_resource::<Events<AnimationCue>>();

        let wall = world.spawn(wall_groups()).id();
        let mut controller = PlayerController::default();
        controller.movement.grounded = false;
        controller.movement.climbing = true;
        let player = world
            .spawn((
                Player,
                controller,
                PlayerConfig::default(),
                PhysicsBody {
                    gravity_scale: 0.0,
                    ..Default::default()
                },
            ))
            .id();
        (world, player, wall)
    }

    fn touch(world: &mut World, player: Entity, wall: Entity, phase: ContactPhase) {
        world.send_event(ContactEvent {
            entity: player,
            other: wall,
            phase,
        });
        world
            .run_system_once(handle_wall_contacts)
            .expect("wall contacts run");
    }

    #[test]
    fn test_corpse_leaving_wall_gets_gravity_back() {
        let (mut world, player, wall) = world_with_climber();
        world
            .get_mut::<PlayerController>(player)
            .expect("controller")
            .vitality = Vitality::Dead;

        touch(&mut world, player, wall, ContactPhase::Exit);

        let body = world.get::<PhysicsBody>(player).expect("body");
        assert_eq!(body.gravity_scale, 1.0);
        assert!(!world.get::<PlayerController>(player).expect("controller").movement.climbing);
    }

    #[test]
    fn test_corpse_does_not_grab_wall() {
        let (mut world, player, wall) = world_with_climber();
        {
            let mut controller = world.get_mut::<PlayerController>(player).expect("controller");
            controller.vitality = Vitality::Dead;
            controller.movement.climbing = false;
        }
        world.get_mut::<PhysicsBody>(player).expect("body").gravity_scale = 1.0;

        touch(&mut world, player, wall, ContactPhase::Enter);

        assert_eq!(world.get::<PhysicsBody>(player).expect("body").gravity_scale, 1.0);
        assert!(!world.get::<PlayerController>(player).expect("controller").movement.climbing);
    }
}
