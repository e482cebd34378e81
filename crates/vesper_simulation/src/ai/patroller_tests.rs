//! Tests for the ground patroller.

#[cfg(test)]
mod tests {
    use super::super::*;
    use bevy::ecs::system::RunSystemOnce;
    use rand::SeedableRng;

    struct Frame {
        rng: ChaCha8Rng,
        tokens: TokenCounter,
    }

    impl Frame {
        fn new(seed: u64) -> Self {
            Self {
                rng: ChaCha8Rng::seed_from_u64(seed),
                tokens: TokenCounter::default(),
            }
        }

        fn ctx(&mut self, player_distance: f32, reach_edge: i8) -> PatrolContext<'_> {
            PatrolContext {
                player_distance,
                detect_distance: 3.0,
                reach_edge,
                interval_least: 1.0,
                interval_most: 3.0,
                rng: &mut self.rng,
                tokens: &mut self.tokens,
                walk: None,
                armed: None,
            }
        }
    }

    #[test]
    fn test_step_exit_guards() {
        assert!(PatrolStep::Idle.check_valid(0));
        assert!(!PatrolStep::Idle.check_valid(1));
        assert!(!PatrolStep::Idle.check_valid(-1));

        assert!(PatrolStep::WalkingLeft.check_valid(1));
        assert!(!PatrolStep::WalkingLeft.check_valid(-1));
        assert!(PatrolStep::WalkingRight.check_valid(-1));
        assert!(!PatrolStep::WalkingRight.check_valid(1));
    }

    #[test]
    fn test_fresh_patrol_samples_walking_step_and_arms_timer() {
        let mut frame = Frame::new(7);
        let mut mode = PatrolMode::passive();

        let mut ctx = frame.ctx(10.0, 0);
        mode.execute(&mut ctx);

        let (token, delay) = ctx.armed.expect("timer armed");
        assert!((1.0..3.0).contains(&delay));

        let PatrolMode::Patrol { step, awaiting } = mode else {
            panic!("still patrolling");
        };
        assert_ne!(step, PatrolStep::Idle);
        assert_eq!(awaiting, Some(token));
        assert_eq!(ctx.walk, Some(step.move_command()));
    }

    #[test]
    fn test_consecutive_steps_never_repeat() {
        let mut frame = Frame::new(99);
        let mut mode = PatrolMode::passive();
        let mut previous = PatrolStep::Idle;

        for _ in 0..50 {
            let mut ctx = frame.ctx(10.0, 0);
            mode.execute(&mut ctx);
            let (token, _) = ctx.armed.expect("finished step resamples");

            let PatrolMode::Patrol { step, .. } = &mode else {
                panic!("still patrolling");
            };
            assert_ne!(*step, previous);
            previous = *step;

            // Таймер шага истёк
            if let PatrolMode::Patrol { awaiting, .. } = &mut mode {
                assert_eq!(*awaiting, Some(token));
                *awaiting = None;
            }
        }
    }

    #[test]
    fn test_pending_walk_toward_edge_is_not_resampled() {
        let mut frame = Frame::new(1);
        let mut mode = PatrolMode::Patrol {
            step: PatrolStep::WalkingRight,
            awaiting: Some(5),
        };

        let mut ctx = frame.ctx(10.0, 1);
        mode.execute(&mut ctx);

        assert_eq!(ctx.armed, None);
        assert_eq!(ctx.walk, Some(1.0));
        assert_eq!(
            mode,
            PatrolMode::Patrol {
                step: PatrolStep::WalkingRight,
                awaiting: Some(5),
            }
        );
    }

    #[test]
    fn test_idle_at_edge_resamples_immediately() {
        let mut frame = Frame::new(3);
        let mut mode = PatrolMode::Patrol {
            step: PatrolStep::Idle,
            awaiting: Some(0),
        };

        let mut ctx = frame.ctx(10.0, -1);
        mode.execute(&mut ctx);

        assert!(ctx.armed.is_some());
        let PatrolMode::Patrol { step, .. } = mode else {
            panic!("still patrolling");
        };
        assert_ne!(step, PatrolStep::Idle);
    }

    #[test]
    fn test_chase_dead_zone() {
        let mut frame = Frame::new(0);
        let mut mode = PatrolMode::Chase;

        let mut ctx = frame.ctx(0.05, 0);
        mode.execute(&mut ctx);
        assert_eq!(ctx.walk, Some(0.0));

        let mut ctx = frame.ctx(-2.0, 0);
        mode.execute(&mut ctx);
        assert_eq!(ctx.walk, Some(-2.0));
    }

    #[test]
    fn test_detection_switches_to_chase_in_same_frame() {
        let mut frame = Frame::new(11);
        let mut machine = TwoWayMachine::<PatrolMode>::new();

        let mut ctx = frame.ctx(5.0, 0);
        assert!(!machine.step(&mut ctx));

        let mut ctx = frame.ctx(2.0, 0);
        assert!(machine.step(&mut ctx));
        assert_eq!(*machine.current(), PatrolMode::Chase);
        assert_eq!(ctx.walk, Some(2.0));

        // Игрок ушёл: свежий Patrol
        let mut ctx = frame.ctx(4.0, 0);
        assert!(machine.step(&mut ctx));
        assert!(matches!(machine.current(), PatrolMode::Patrol { .. }));
        assert!(ctx.armed.is_some());
    }

    #[test]
    fn test_finish_step_ignores_stale_token() {
        let mut patroller = Patroller {
            machine: TwoWayMachine::from_parts(
                PatrolMode::Patrol {
                    step: PatrolStep::WalkingLeft,
                    awaiting: Some(4),
                },
                false,
            ),
            tokens: TokenCounter::default(),
        };

        assert!(!patroller.finish_step(3));
        assert!(patroller.finish_step(4));
        assert!(!patroller.finish_step(4));
    }

    #[test]
    fn test_walk_stops_at_edge_but_turns() {
        let mut body = PhysicsBody::default();
        let mut facing = Facing::Left;

        let speed = walk(1.0, 1, 2.0, &mut body, &mut facing);
        assert_eq!(speed, 0.0);
        assert_eq!(body.velocity.x, 0.0);
        assert_eq!(facing, Facing::Right);

        let speed = walk(-1.0, 1, 2.0, &mut body, &mut facing);
        assert_eq!(speed, 2.0);
        assert_eq!(body.velocity.x, -2.0);
        assert_eq!(facing, Facing::Left);

        // Idle: facing не меняется
        walk(0.0, 0, 2.0, &mut body, &mut facing);
        assert_eq!(body.velocity.x, 0.0);
        assert_eq!(facing, Facing::Left);
    }

    #[test]
    fn test_reach_edge_from_probe() {
        assert_eq!(reach_edge_from_probe(true, Facing::Right), 0);
        assert_eq!(reach_edge_from_probe(false, Facing::Right), 1);
        assert_eq!(reach_edge_from_probe(false, Facing::Left), -1);
    }

    fn patrol_world(movable: bool, player_distance: f32) -> (World, Entity) {
        let mut world = World::new();
        world.insert_resource(DeterministicRng::new(42));
        world.init_resource::<TimerScheduler>();
        world.init_resource::<Events<AnimationCue>>();

        let entity = world
            .spawn((
                Patroller::default(),
                Enemy { movable },
                EnemySenses {
                    player_distance,
                    reach_edge: 0,
                },
                EnemyVitalsConfig::default(),
                PatrolConfig::default(),
            ))
            .id();

        (world, entity)
    }

    #[test]
    fn test_run_patrollers_chases_player() {
        let (mut world, entity) = patrol_world(true, -2.0);

        world.run_system_once(run_patrollers).expect("system runs");

        let patroller = world.get::<Patroller>(entity).expect("patroller");
        assert_eq!(*patroller.machine.current(), PatrolMode::Chase);

        let body = world.get::<PhysicsBody>(entity).expect("body");
        assert_eq!(body.velocity.x, -2.0);
        assert_eq!(*world.get::<Facing>(entity).expect("facing"), Facing::Left);
    }

    #[test]
    fn test_immobile_patroller_transitions_but_does_not_move() {
        let (mut world, entity) = patrol_world(false, -2.0);

        world.run_system_once(run_patrollers).expect("system runs");

        let patroller = world.get::<Patroller>(entity).expect("patroller");
        assert_eq!(*patroller.machine.current(), PatrolMode::Chase);
        assert_eq!(world.get::<PhysicsBody>(entity).expect("body").velocity, Vec2::ZERO);
        assert_eq!(world.resource::<TimerScheduler>().pending(), 0);
    }

    #[test]
    fn test_patrol_step_timer_schedules_with_token() {
        let (mut world, entity) = patrol_world(true, 10.0);

        world.run_system_once(run_patrollers).expect("system runs");

        let scheduler = world.resource::<TimerScheduler>();
        assert_eq!(scheduler.pending_for(entity), 1);
        let deadline = scheduler.next_deadline().expect("step timer");
        assert!((1.0..3.0).contains(&deadline));
    }
}
