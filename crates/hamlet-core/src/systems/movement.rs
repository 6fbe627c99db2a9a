//! Movement system - walks entities along their routes

use hamlet_logic::config::SimConfig;
use hecs::World;

use crate::components::{Brain, Motion, Movement, Position};

/// Step every entity with a route toward its current waypoint.
///
/// A villager whose route no longer ends on its brain's target does not move
/// this tick; the route is dropped and the schedule system replans it.
pub fn movement_system(world: &mut World, config: &SimConfig, delta_seconds: f32) {
    for (_entity, (pos, movement, motion, brain)) in
        world.query_mut::<(&mut Position, &mut Movement, &mut Motion, Option<&mut Brain>)>()
    {
        if let Some(brain) = brain.as_deref() {
            if movement
                .follower
                .is_stale_for(brain.target, config.route_stale_epsilon)
            {
                movement.follower.clear();
                motion.moving = false;
                continue;
            }
        }

        let speed = movement.speed;
        let step = movement
            .follower
            .step(pos.world, speed, delta_seconds, config.waypoint_epsilon);

        pos.world = step.position;
        if let Some(facing) = step.facing {
            motion.facing = facing;
        }
        motion.moving = step.moving && !step.finished;

        if step.finished {
            movement.follower.clear();
            if let Some(brain) = brain {
                if brain.going_home {
                    brain.arrive_home();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hamlet_logic::follower::Facing;
    use hamlet_logic::grid::WorldPos;

    fn walker(world: &mut World, at: WorldPos, route: Vec<WorldPos>) -> hecs::Entity {
        let mut movement = Movement::new(2.0);
        movement.follower.set_route(route);
        world.spawn((Position { world: at }, movement, Motion::default()))
    }

    #[test]
    fn test_walks_route_to_end() {
        let mut world = World::new();
        let config = SimConfig::default();
        let e = walker(
            &mut world,
            WorldPos::new(0.5, 0.5),
            vec![WorldPos::new(1.5, 0.5), WorldPos::new(1.5, 1.5)],
        );

        movement_system(&mut world, &config, 0.25);
        {
            let pos = world.get::<&Position>(e).unwrap();
            assert!((pos.world.x - 1.0).abs() < 1e-5);
            let motion = world.get::<&Motion>(e).unwrap();
            assert!(motion.moving);
            assert_eq!(motion.facing, Facing::Right);
        }

        for _ in 0..10 {
            movement_system(&mut world, &config, 0.25);
        }
        let pos = world.get::<&Position>(e).unwrap();
        assert!(pos.world.distance(&WorldPos::new(1.5, 1.5)) < config.waypoint_epsilon);
        assert!(!world.get::<&Motion>(e).unwrap().moving);
        assert!(!world.get::<&Movement>(e).unwrap().follower.has_route());
    }

    #[test]
    fn test_facing_left_and_vertical_keeps_facing() {
        let mut world = World::new();
        let config = SimConfig::default();
        let e = walker(
            &mut world,
            WorldPos::new(3.5, 0.5),
            vec![WorldPos::new(2.5, 0.5), WorldPos::new(2.5, 3.5)],
        );

        movement_system(&mut world, &config, 0.6);
        assert_eq!(world.get::<&Motion>(e).unwrap().facing, Facing::Left);

        // Straight down: facing unchanged
        movement_system(&mut world, &config, 0.5);
        assert_eq!(world.get::<&Motion>(e).unwrap().facing, Facing::Left);
    }

    #[test]
    fn test_stale_route_is_not_walked() {
        let mut world = World::new();
        let config = SimConfig::default();
        let start = WorldPos::new(0.5, 0.5);
        let e = walker(&mut world, start, vec![WorldPos::new(4.5, 0.5)]);
        world
            .insert_one(e, Brain::new(WorldPos::new(0.5, 4.5)))
            .unwrap();

        movement_system(&mut world, &config, 0.5);

        assert_eq!(world.get::<&Position>(e).unwrap().world, start);
        assert!(!world.get::<&Motion>(e).unwrap().moving);
        assert!(!world.get::<&Movement>(e).unwrap().follower.has_route());
    }

    #[test]
    fn test_finishing_home_route_marks_at_home() {
        let mut world = World::new();
        let config = SimConfig::default();
        let home = WorldPos::new(1.5, 0.5);
        let e = walker(&mut world, WorldPos::new(0.5, 0.5), vec![home]);
        let mut brain = Brain::new(home);
        brain.going_home = true;
        world.insert_one(e, brain).unwrap();

        movement_system(&mut world, &config, 1.0);

        let brain = world.get::<&Brain>(e).unwrap();
        assert!(brain.at_home);
        assert!(!brain.going_home);
        assert!(!world.get::<&Motion>(e).unwrap().moving);
    }
}
