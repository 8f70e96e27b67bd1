use enkinet::{
    ApproxEq, Color, Entity, EntityType, GroundTexture, Part, Shape, Texture, Walls, World,
    WorldSync, registry,
};
use glam::DVec2;
use proptest::prelude::*;

fn coord() -> impl Strategy<Value = f64> {
    -500.0f64..500.0
}

fn color_strategy() -> impl Strategy<Value = Color> {
    (0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0, 0.0f64..=1.0)
        .prop_map(|(r, g, b, a)| Color::new(r, g, b, a))
}

fn part_strategy() -> impl Strategy<Value = Part> {
    (
        prop::collection::vec((coord(), coord()), 3..8),
        0.1f64..20.0,
        any::<bool>(),
        color_strategy(),
    )
        .prop_map(|(points, height, textured, color)| {
            let shape: Vec<DVec2> = points.into_iter().map(|(x, y)| DVec2::new(x, y)).collect();
            if textured {
                let textures = vec![Texture::uniform(color, 2); shape.len()];
                Part::textured(shape, height, textures)
            } else {
                Part::new(shape, height)
            }
        })
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    prop_oneof![
        (0.1f64..50.0, 0.1f64..50.0, 0.1f64..5000.0)
            .prop_map(|(radius, height, mass)| Shape::Cylinder { radius, height, mass }),
        (prop::collection::vec(part_strategy(), 1..10), 0.1f64..5000.0)
            .prop_map(|(parts, mass)| Shape::Hull { parts, mass }),
    ]
}

fn entity_strategy() -> impl Strategy<Value = Entity> {
    (
        prop::sample::select(EntityType::ALL.to_vec()),
        (coord(), coord(), -3.2f64..3.2),
        color_strategy(),
        shape_strategy(),
        (-20.0f64..20.0, -20.0f64..20.0),
        prop::collection::vec(color_strategy(), 24),
    )
        .prop_map(|(entity_type, (x, y, angle), color, shape, (left, right), leds)| {
            let mut entity = registry::create(entity_type);
            let body = entity.body_mut();
            body.position = DVec2::new(x, y);
            body.angle = angle;
            body.color = color;
            if entity_type == EntityType::PhysicalObject {
                body.shape = shape;
            }
            if let Some(robot) = entity.robot_mut() {
                robot.set_speeds(left, right);
            }
            if let Some(thymio) = entity.as_thymio_mut() {
                for (index, led) in leds.into_iter().enumerate() {
                    thymio.set_led(index, led);
                }
            }
            entity
        })
}

fn walls_strategy() -> impl Strategy<Value = Walls> {
    prop_oneof![
        (1.0f64..500.0, 1.0f64..500.0).prop_map(|(width, height)| Walls::Square { width, height }),
        (1.0f64..500.0).prop_map(|radius| Walls::Circular { radius }),
        Just(Walls::None),
    ]
}

fn world_strategy() -> impl Strategy<Value = World> {
    (
        walls_strategy(),
        color_strategy(),
        (0u32..4, 0u32..4, any::<u32>()),
        prop::collection::vec(entity_strategy(), 0..12),
    )
        .prop_map(|(walls, color, (w, h, pixel), entities)| {
            let texture = GroundTexture::new(w, h, vec![pixel; (w * h) as usize])
                .unwrap_or_default();
            let mut world = World::new(walls, color, texture);
            for entity in entities {
                world.add_object(entity);
            }
            world
        })
}

proptest! {
    #[test]
    fn prop_snapshot_reproduces_world(world in world_strategy()) {
        let mut sync = WorldSync::default();
        let frame = sync.encode_snapshot(&world);
        let (remote, report) = sync.apply_snapshot(frame.as_bytes()).unwrap();

        prop_assert!(report.is_clean(), "{:?}", report.errors);
        prop_assert_eq!(remote.object_count(), world.object_count());
        prop_assert!(remote.approx_eq(&world, sync.codec().tolerance()));
    }

    #[test]
    fn prop_snapshot_is_stable_after_one_trip(world in world_strategy()) {
        let mut sync = WorldSync::default();
        let first = sync.encode_snapshot(&world);
        let (remote, _) = sync.apply_snapshot(first.as_bytes()).unwrap();
        let second = sync.encode_snapshot(&remote);
        let (again, _) = sync.apply_snapshot(second.as_bytes()).unwrap();

        prop_assert_eq!(sync.encode_snapshot(&again), second);
    }

    #[test]
    fn prop_delta_brings_remote_up_to_date(
        world in world_strategy(),
        moves in prop::collection::vec((coord(), coord(), -3.2f64..3.2), 12),
    ) {
        let mut sync = WorldSync::default();
        let (mut remote, _) = sync
            .apply_snapshot(sync.encode_snapshot(&world).as_bytes())
            .unwrap();

        let mut moved = world.clone();
        for (entity, (x, y, angle)) in moved.objects_mut().zip(moves) {
            entity.body_mut().position = DVec2::new(x, y);
            entity.body_mut().angle = angle;
        }
        let report = sync.apply_delta(&mut remote, sync.encode_delta(&moved).as_bytes());

        prop_assert!(report.is_clean(), "{:?}", report.errors);
        prop_assert_eq!(report.applied, moved.object_count());
        prop_assert!(remote.approx_eq(&moved, sync.codec().tolerance()));
    }

    #[test]
    fn prop_garbage_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let mut sync = WorldSync::new(enkinet::SyncConfig::buffered());
        let mut world = World::default();
        let _ = sync.apply_snapshot(&bytes);
        let _ = sync.resync(&mut world, &bytes);
        let _ = sync.apply_delta(&mut world, &bytes);
    }
}
