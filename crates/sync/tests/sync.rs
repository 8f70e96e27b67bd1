use enkinet::codec::Records;
use enkinet::{
    ApproxEq, Color, DecodeError, Entity, EntityType, Part, PhysicalObject, Robot, SyncConfig,
    Texture, Thymio2, Walls, World, WorldSync,
};
use glam::DVec2;

fn scenario_world() -> World {
    let mut world = World::square(100.0, 50.0, Color::new(0.2, 0.2, 0.6, 1.0));
    let mut thymio = Thymio2::new();
    thymio.body_mut().position = DVec2::new(10.0, 20.0);
    world.add_object(thymio);
    world
}

fn mixed_world() -> World {
    let mut world = World::circular(80.0, Color::WHITE);
    world.add_object(Thymio2::new());
    world.add_object(Entity::EPuck(Robot::epuck()));
    world.add_object(Entity::Sbot(Robot::sbot()));
    world.add_object(Entity::Marxbot(Robot::marxbot()));
    world.add_object(Entity::Khepera(Robot::khepera()));
    let box_part = Part::textured(
        vec![
            DVec2::new(-1.0, -1.0),
            DVec2::new(1.0, -1.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(-1.0, 1.0),
        ],
        2.0,
        vec![Texture::uniform(Color::RED, 1); 4],
    );
    world.add_object(PhysicalObject::with_hull(vec![box_part], 15.0));
    world
}

fn replicate(sync: &mut WorldSync, world: &World) -> World {
    let frame = sync.encode_snapshot(world);
    let (remote, report) = sync.apply_snapshot(frame.as_bytes()).unwrap();
    assert!(report.is_clean(), "{:?}", report.errors);
    remote
}

#[test]
fn scenario_a_snapshot_roundtrip() {
    let world = scenario_world();
    let mut sync = WorldSync::default();

    let remote = replicate(&mut sync, &world);

    assert_eq!(remote.walls, Walls::Square { width: 100.0, height: 50.0 });
    assert!(remote.color.approx_eq(&Color::new(0.2, 0.2, 0.6, 1.0), 0.01));
    assert_eq!(remote.object_count(), 1);

    let thymio = remote.get(0).and_then(Entity::as_thymio).unwrap();
    assert_eq!(thymio.body().position, DVec2::new(10.0, 20.0));
    assert_eq!(thymio.body().angle, 0.0);
    assert!(thymio.leds.iter().all(|led| *led == Color::new(0.0, 0.0, 0.0, 1.0)));
}

#[test]
fn scenario_b_delta_is_pose_and_leds_only() {
    let world = scenario_world();
    let sync = WorldSync::default();

    let delta = sync.encode_delta(&world);

    let expected = format!("1;0;10.00;20.00;0.00;24;{}:", "0.00;0.00;0.00;1.00;".repeat(24));
    assert_eq!(delta, expected);
    assert!(!delta.contains("200.00"));
}

#[test]
fn snapshot_encoding_is_idempotent() {
    let world = mixed_world();
    let mut sync = WorldSync::default();

    let first = sync.encode_snapshot(&world);
    let remote = replicate(&mut sync, &world);

    assert_eq!(sync.encode_snapshot(&remote), first);
}

#[test]
fn delta_never_touches_creation_fields() {
    let world = mixed_world();
    let mut sync = WorldSync::default();
    let mut remote = replicate(&mut sync, &world);

    let mut moved = world.clone();
    for entity in moved.objects_mut() {
        entity.body_mut().position = DVec2::new(3.0, 4.0);
        entity.body_mut().shape = enkinet::Shape::Cylinder {
            radius: 99.0,
            height: 99.0,
            mass: 99.0,
        };
        if let Some(robot) = entity.robot_mut() {
            robot.set_speeds(7.0, 7.0);
        }
    }

    let report = sync.apply_delta(&mut remote, sync.encode_delta(&moved).as_bytes());
    assert_eq!(report.applied, world.object_count());

    for (id, original) in world.objects().map(|e| (e.id(), e)) {
        let remote = remote.get(id).unwrap();
        assert_eq!(remote.body().position, DVec2::new(3.0, 4.0));
        assert!(remote.body().shape.approx_eq(&original.body().shape, 0.01));
        if let Some(robot) = remote.robot() {
            assert!(robot.left_speed.approx_eq(&original.robot().unwrap().left_speed, 0.01));
        }
    }
}

#[test]
fn hull_count_prefixes_match_contents() {
    let mut world = World::default();
    let parts = vec![
        Part::rectangle(DVec2::ZERO, DVec2::new(2.0, 1.0), 1.0),
        Part::new(
            vec![DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0), DVec2::new(0.0, 1.0)],
            3.0,
        ),
    ];
    world.add_object(PhysicalObject::with_hull(parts.clone(), 4.0));
    let mut sync = WorldSync::default();

    let remote = replicate(&mut sync, &world);

    let hull = remote.get(0).unwrap().body().shape.hull().unwrap();
    assert_eq!(hull.len(), 2);
    assert_eq!(hull[0].shape.len(), parts[0].shape.len());
    assert_eq!(hull[1].shape.len(), 3);
    assert!(hull.iter().all(|p| p.textures.is_empty()));
}

#[test]
fn overstated_count_is_truncation() {
    let mut sync = WorldSync::default();
    // Hull claims 5 parts but carries none.
    let frame = "2;0.00;0.00;0.00;1.00;0;0;0;:0;0;1.00;1.00;1.00;1.00;0;5;1.00;0.00;0.00;0.00;:";

    let (world, report) = sync.apply_snapshot(frame.as_bytes()).unwrap();

    assert!(world.is_empty());
    assert!(matches!(
        report.errors.as_slice(),
        [DecodeError::TruncatedRecord { record: 1, .. }]
    ));
}

#[test]
fn many_small_collections_decode_quickly() {
    let textures = 100_000;
    let frame = format!(
        "2;0.00;0.00;0.00;1.00;0;0;0;:0;0;1.00;1.00;1.00;1.00;0;1;3;0.00;0.00;1.00;0.00;0.00;1.00;1.00;{textures};{}2.00;0.00;0.00;0.00;:",
        "0;".repeat(textures)
    );
    let mut sync = WorldSync::default();

    let start = std::time::Instant::now();
    let (world, report) = sync.apply_snapshot(frame.as_bytes()).unwrap();

    assert!(start.elapsed() < std::time::Duration::from_secs(2));
    assert!(report.is_clean(), "{:?}", report.errors);
    let hull = world.get(0).unwrap().body().shape.hull().unwrap();
    assert_eq!(hull[0].textures.len(), textures);
}

#[test]
fn unknown_ids_do_not_disturb_known_objects() {
    let world = mixed_world();
    let mut sync = WorldSync::default();
    let mut remote = replicate(&mut sync, &world);
    let before = remote.clone();

    let report = sync.apply_delta(&mut remote, b"2;77;1.00;1.00;1.00;:");

    assert_eq!(
        report.errors,
        vec![DecodeError::UnknownObjectId { record: 0, id: 77 }]
    );
    assert_eq!(remote, before);
}

#[test]
fn decoding_resumes_after_bad_records() {
    let world = mixed_world();
    let mut sync = WorldSync::default();
    let mut remote = replicate(&mut sync, &world);

    let frame = "9;1;0.00;0.00;0.00;:2;1;not;0.00;0.00;:2;1;5.00;6.00;0.50;:5;4;1.00;";
    let report = sync.apply_delta(&mut remote, frame.as_bytes());

    assert_eq!(report.applied, 1);
    let errors: Vec<_> = report.errors.iter().map(|e| (e.record(), e.field())).collect();
    assert_eq!(errors, vec![(Some(0), None), (Some(1), Some(2)), (Some(3), Some(3))]);
    assert!(matches!(report.errors[0], DecodeError::UnknownTypeTag { tag: 9, .. }));

    let epuck = remote.get(1).unwrap();
    assert_eq!(epuck.entity_type(), EntityType::EPuck);
    assert_eq!(epuck.body().position, DVec2::new(5.0, 6.0));
    assert_eq!(remote.get(4).unwrap().body().position, DVec2::ZERO);
}

#[test]
fn every_record_is_terminated() {
    let world = mixed_world();
    let sync = WorldSync::default();

    let snapshot = sync.encode_snapshot(&world);
    assert!(Records::new(&snapshot).all(|r| r.terminated));
    assert_eq!(Records::new(&snapshot).count(), world.object_count() + 1);
    assert_eq!(
        Records::new(&sync.encode_delta(&world)).count(),
        world.object_count()
    );
}

#[test]
fn resync_reports_objects_the_server_dropped() {
    let world = mixed_world();
    let mut sync = WorldSync::default();
    let mut remote = replicate(&mut sync, &world);

    let mut server = world.clone();
    server.add_object(Entity::EPuck(Robot::epuck()));
    let mut shrunk = World::circular(80.0, Color::WHITE);
    for entity in server.objects().filter(|e| e.id() != 2) {
        shrunk.insert_object(entity.clone());
    }

    let report = sync
        .resync(&mut remote, sync.encode_snapshot(&shrunk).as_bytes())
        .unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(report.unreferenced, vec![2]);
    assert!(remote.contains(2));
    assert!(remote.contains(6));
}

#[test]
fn buffered_deltas_for_late_objects_yield_to_snapshot() {
    let mut server = mixed_world();
    let mut sync = WorldSync::new(SyncConfig::buffered());
    let mut remote = replicate(&mut sync, &server);

    let late = server.add_object(Entity::Khepera(Robot::khepera())).unwrap();
    server.get_mut(late).unwrap().body_mut().position = DVec2::new(-4.0, 2.5);

    let report = sync.apply_delta(&mut remote, sync.encode_delta(&server).as_bytes());
    assert_eq!(report.buffered, 1);
    assert!(!remote.contains(late));

    let report = sync
        .resync(&mut remote, sync.encode_snapshot(&server).as_bytes())
        .unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(report.superseded, 1);
    assert_eq!(sync.pending_len(), 0);
    assert_eq!(remote.get(late).unwrap().body().position, DVec2::new(-4.0, 2.5));
}
