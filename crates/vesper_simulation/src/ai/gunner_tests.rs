//! Tests for gunner modes and systems.

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::components::PhysicsBody;
    use bevy::ecs::system::RunSystemOnce;

    fn ctx(tokens: &mut TokenCounter, player_distance: f32) -> GunnerContext<'_> {
        GunnerContext {
            player_distance,
            detect_distance: 8.0,
            tokens,
            fired: None,
        }
    }

    #[test]
    fn test_idle_valid_only_while_player_far() {
        let mut tokens = TokenCounter::default();
        assert!(GunnerMode::Idle.check_valid(&ctx(&mut tokens, 9.0)));
        assert!(!GunnerMode::Idle.check_valid(&ctx(&mut tokens, -8.0)));
        assert!(GunnerMode::alert().check_valid(&ctx(&mut tokens, -8.0)));
        assert!(!GunnerMode::alert().check_valid(&ctx(&mut tokens, 8.5)));
    }

    #[test]
    fn test_detection_fires_in_same_frame() {
        let mut machine = TwoWayMachine::<GunnerMode>::new();
        let mut tokens = TokenCounter::default();
        let mut frame = ctx(&mut tokens, 3.0);

        assert!(machine.step(&mut frame));
        assert!(frame.fired.is_some());
        assert!(machine.alerted());
        assert_eq!(
            *machine.current(),
            GunnerMode::Shooting { cooldown: frame.fired }
        );
    }

    #[test]
    fn test_cooldown_blocks_second_shot() {
        let mut gunner = Gunner::default();
        let mut tokens = TokenCounter::default();

        let first = {
            let mut frame = ctx(&mut tokens, 2.0);
            gunner.machine.step(&mut frame);
            frame.fired.expect("first shot")
        };

        let mut frame = ctx(&mut tokens, 2.0);
        gunner.machine.step(&mut frame);
        assert_eq!(frame.fired, None);

        assert!(gunner.rearm(first));
        let mut frame = ctx(&mut tokens, 2.0);
        gunner.machine.step(&mut frame);
        assert!(frame.fired.is_some());
    }

    #[test]
    fn test_stale_cooldown_token_ignored() {
        let mut gunner = Gunner::default();
        let mut tokens = TokenCounter::default();

        let stale = {
            let mut frame = ctx(&mut tokens, 2.0);
            gunner.machine.step(&mut frame);
            frame.fired.expect("shot")
        };

        // Игрок ушёл и вернулся: новый Shooting, cooldown сброшен
        gunner.machine.step(&mut ctx(&mut tokens, 20.0));
        let fresh = {
            let mut frame = ctx(&mut tokens, 2.0);
            gunner.machine.step(&mut frame);
            frame.fired.expect("fresh shooting fires immediately")
        };
        assert_ne!(stale, fresh);

        assert!(!gunner.rearm(stale));
        assert!(gunner.rearm(fresh));
    }

    fn spawn_armed_gunner(world: &mut World, player_distance: f32) -> Entity {
        world
            .spawn((
                Gunner::default(),
                EnemySenses {
                    player_distance,
                    reach_edge: 0,
                },
                EnemyVitalsConfig {
                    detect_distance: 8.0,
                    ..Default::default()
                },
                GunnerConfig::default(),
                ProjectileConfig {
                    speed: 6.0,
                    ..Default::default()
                },
                Facing::Right,
                Transform::default(),
            ))
            .id()
    }

    fn pending_shot(world: &mut World, gunner: Entity) -> Option<Vec2> {
        world.resource_mut::<TimerScheduler>().advance_to(10.0);
        let mut scheduler = world.resource_mut::<TimerScheduler>();
        let mut direction = None;
        while let Some(timer) = scheduler.pop_due(10.0) {
            if timer.owner != gunner {
                continue;
            }
            if let TimerAction::Enemy(EnemyTimer::SpawnProjectile { direction: aim }) = timer.action {
                direction = Some(aim);
            }
        }
        direction
    }

    #[test]
    fn test_run_gunners_faces_player_and_schedules_shot() {
        let mut world = World::new();
        world.init_resource::<TimerScheduler>();
        world.init_resource::<Events<AnimationCue>>();

        let player = world.spawn(Transform::from_xyz(-4.0, 0.0, 0.0)).id();
        world.insert_resource(PlayerHandle(player));
        let gunner = spawn_armed_gunner(&mut world, -4.0);

        world.run_system_once(run_gunners).expect("run_gunners runs");

        assert_eq!(*world.get::<Facing>(gunner).expect("facing"), Facing::Left);
        assert_eq!(world.get::<Gunner>(gunner).expect("gunner").shots_fired, 1);
        // SpawnProjectile + ShootCooldownElapsed
        assert_eq!(world.resource::<TimerScheduler>().pending_for(gunner), 2);

        let cues: Vec<_> = world
            .resource_mut::<Events<AnimationCue>>()
            .drain()
            .collect();
        assert_eq!(
            cues,
            vec![AnimationCue::Trigger {
                entity: gunner,
                name: "attack"
            }]
        );
    }

    #[test]
    fn test_shot_direction_fixed_when_fired() {
        let mut world = World::new();
        world.init_resource::<TimerScheduler>();
        world.init_resource::<Events<AnimationCue>>();
        world.init_resource::<Events<TimerElapsed>>();

        let player = world.spawn(Transform::from_xyz(-4.0, 0.0, 0.0)).id();
        world.insert_resource(PlayerHandle(player));
        let gunner = spawn_armed_gunner(&mut world, -4.0);

        world.run_system_once(run_gunners).expect("run_gunners runs");
        let direction = pending_shot(&mut world, gunner).expect("shot scheduled");
        assert_eq!(direction, Vec2::new(-4.0, 0.0));

        // Игрок успел отпрыгнуть до конца startup: снаряд летит в старую точку
        if let Some(mut transform) = world.get_mut::<Transform>(player) {
            transform.translation = Vec3::new(0.0, 4.0, 0.0);
        }
        world.send_event(TimerElapsed {
            owner: gunner,
            action: TimerAction::Enemy(EnemyTimer::SpawnProjectile { direction }),
            deadline: 0.2,
        });
        world
            .run_system_once(handle_gunner_timers)
            .expect("handler runs");

        let mut projectiles = world.query::<(&crate::combat::Projectile, &PhysicsBody)>();
        let (projectile, body) = projectiles.single(&world).expect("one projectile");
        assert_eq!(projectile.shooter, gunner);
        assert!((body.velocity - Vec2::new(-6.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_shot_without_player_goes_forward() {
        let mut world = World::new();
        world.init_resource::<TimerScheduler>();
        world.init_resource::<Events<AnimationCue>>();

        let gunner = spawn_armed_gunner(&mut world, 3.0);
        world.run_system_once(run_gunners).expect("run_gunners runs");

        assert_eq!(pending_shot(&mut world, gunner), Some(Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn test_dead_gunner_does_not_fire_pending_shot() {
        let mut world = World::new();
        world.init_resource::<TimerScheduler>();
        world.init_resource::<Events<TimerElapsed>>();

        let gunner = world
            .spawn((
                Gunner::default(),
                ProjectileConfig::default(),
                Transform::default(),
                Dead,
            ))
            .id();

        world.send_event(TimerElapsed {
            owner: gunner,
            action: TimerAction::Enemy(EnemyTimer::SpawnProjectile {
                direction: Vec2::new(-3.0, 0.0),
            }),
            deadline: 0.2,
        });
        world
            .run_system_once(handle_gunner_timers)
            .expect("handler runs");

        let mut projectiles = world.query::<&crate::combat::Projectile>();
        assert_eq!(projectiles.iter(&world).count(), 0);
    }
}
