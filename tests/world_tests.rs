//! Whole-world integration tests
//!
//! These drive SimWorld through long runs and assert the invariants that
//! must hold on every tick.

use rand::rngs::StdRng;
use rand::SeedableRng;

use signal_sim::simulation::{
    ApproachGroup, Direction, LaneId, SignalPhase, SimConfig, SimId, SimVehicle, SimWorld,
    VehicleId, VEHICLE_LENGTH,
};

#[test]
fn test_long_run_invariants() {
    let mut world = SimWorld::new_with_seed(12345);

    for tick in 0..3000 {
        world.tick(0.1);

        // Signals of the two groups are never simultaneously permissive
        let states = world.signal_states();
        let permissive = |phase: SignalPhase| {
            matches!(phase, SignalPhase::Green | SignalPhase::Yellow)
        };
        let primary = states[&ApproachGroup::Primary].phase;
        let secondary = states[&ApproachGroup::Secondary].phase;
        assert!(
            !(permissive(primary) && permissive(secondary)),
            "tick {}: both groups permissive",
            tick
        );

        for lane in LaneId::all() {
            let vehicles = world.lane_vehicles(&lane);

            // Lane population respects the hard cap
            assert!(
                vehicles.len() <= world.config.max_vehicles_per_lane,
                "tick {}: lane {:?} over cap with {} vehicles",
                tick,
                lane,
                vehicles.len()
            );

            for vehicle in vehicles {
                assert!(vehicle.speed >= 0.0);
                assert!(vehicle.speed <= vehicle.max_speed + 1e-3);
            }

            // No rear-end interpenetration: the bumper-to-bumper gap
            // between consecutive vehicles in a lane never goes negative
            let mut positions: Vec<f32> = vehicles.iter().map(|v| v.progress).collect();
            positions.sort_by(|a, b| a.total_cmp(b));
            for pair in positions.windows(2) {
                assert!(
                    pair[1] - pair[0] >= VEHICLE_LENGTH,
                    "tick {}: vehicles overlapping in lane {:?}",
                    tick,
                    lane
                );
            }
        }
    }

    // Five simulated minutes of default traffic produces real flow
    let stats = world.statistics();
    assert!(stats.total_spawned > 0, "nothing ever spawned");
    assert!(stats.total_completed > 0, "nothing ever completed");
}

#[test]
fn test_seeded_runs_are_deterministic() {
    let mut a = SimWorld::new_with_seed(777);
    let mut b = SimWorld::new_with_seed(777);

    for _ in 0..800 {
        a.tick(0.1);
        b.tick(0.1);
    }

    assert_eq!(a.statistics().total_spawned, b.statistics().total_spawned);
    assert_eq!(
        a.statistics().total_completed,
        b.statistics().total_completed
    );
    assert_eq!(a.vehicle_count(), b.vehicle_count());

    let mut positions_a: Vec<(usize, f32)> =
        a.vehicles().map(|v| (v.id.0 .0, v.speed)).collect();
    let mut positions_b: Vec<(usize, f32)> =
        b.vehicles().map(|v| (v.id.0 .0, v.speed)).collect();
    positions_a.sort_by(|x, y| x.0.cmp(&y.0));
    positions_b.sort_by(|x, y| x.0.cmp(&y.0));
    assert_eq!(positions_a, positions_b);
}

#[test]
fn test_inserted_vehicle_completes_and_is_counted() {
    let mut world = SimWorld::new_with_seed(1);
    // Quiet the spawner so only the inserted vehicle finishes this fast
    world.config.set_spawn_rate(0.05);

    let mut rng = StdRng::seed_from_u64(2);
    let lane = LaneId::new(Direction::Eastbound, 0);
    let mut vehicle = SimVehicle::new(VehicleId(SimId(9000)), lane, &world.config, &mut rng);
    vehicle.progress = 190.0;
    vehicle.speed = 10.0;
    world.insert_vehicle(vehicle);

    for _ in 0..50 {
        world.tick(0.1);
    }

    assert_eq!(world.statistics().total_completed, 1);
    assert!(world
        .lane_vehicles(&lane)
        .iter()
        .all(|v| v.id != VehicleId(SimId(9000))));
}

#[test]
fn test_queue_forms_behind_red_and_drains_on_green() {
    let mut world = SimWorld::new_with_seed(4242);
    world.config.set_spawn_rate(1.0);

    // The secondary group starts red; its lane should accumulate waiters
    let lane = LaneId::new(Direction::Northbound, 0);

    // 12 simulated seconds: still inside the first primary green plus
    // yellow, so northbound stays stopped
    for _ in 0..120 {
        world.tick(0.1);
    }

    let queued = world.lane_vehicles(&lane).len();
    assert!(queued > 0, "no northbound vehicles spawned under load");

    // By t=30 the secondary green (t=19..34) has been open for a while
    for _ in 0..180 {
        world.tick(0.1);
    }
    let moved = world
        .lane_vehicles(&lane)
        .iter()
        .any(|v| v.has_passed_intersection || v.speed > 0.5);
    assert!(
        moved || world.statistics().total_completed > 0,
        "secondary queue never drained on green"
    );
}

#[test]
fn test_statistics_track_queues() {
    let mut world = SimWorld::new_with_seed(31);
    world.config.set_spawn_rate(1.0);

    for _ in 0..600 {
        world.tick(0.1);
    }

    let stats = world.statistics();
    assert_eq!(
        stats.total_spawned,
        stats.lanes().map(|(_, l)| l.spawned).sum::<u64>()
    );
    assert!(stats.total_spawn_attempts >= stats.total_spawned);
    let max_queue: usize = stats.lanes().map(|(_, l)| l.max_queue).max().unwrap_or(0);
    assert!(max_queue > 0, "queues never observed");
}

#[test]
fn test_max_queue_counts_waiting_not_population() {
    let mut world = SimWorld::new_with_seed(3);
    world.config.set_spawn_rate(0.05);

    // A free-flowing vehicle on the green approach is population, not a
    // queue; max_queue must stay zero while nothing ever waits
    let mut rng = StdRng::seed_from_u64(4);
    let lane = LaneId::new(Direction::Eastbound, 0);
    let mut vehicle = SimVehicle::new(VehicleId(SimId(7000)), lane, &world.config, &mut rng);
    vehicle.progress = -100.0;
    vehicle.speed = 10.0;
    world.insert_vehicle(vehicle);

    // 5 seconds, all inside the first primary green
    for _ in 0..50 {
        world.tick(0.1);
    }

    let stats = world.statistics();
    assert_eq!(stats.lane(&lane).map(|l| l.max_queue).unwrap_or(0), 0);
}

#[test]
fn test_signal_snapshots_report_per_group_time() {
    let mut world = SimWorld::new_with_seed(8);
    world.tick(5.0);

    let states = world.signal_states();
    let primary = states[&ApproachGroup::Primary];
    let secondary = states[&ApproachGroup::Secondary];
    assert_eq!(primary.phase, SignalPhase::Green);
    assert_eq!(secondary.phase, SignalPhase::Red);
    // The red head holds until the all-red, one yellow past the green end,
    // rather than mirroring the active group's countdown
    assert!(
        (secondary.time_remaining - primary.time_remaining - world.config.yellow_time).abs()
            < 1e-3
    );
}

#[test]
fn test_config_setters_clamp() {
    let mut config = SimConfig::default();

    config.set_yellow_time(10.0);
    assert_eq!(config.yellow_time, 5.0);
    config.set_yellow_time(0.5);
    assert_eq!(config.yellow_time, 2.0);

    config.set_all_red_time(9.0);
    assert_eq!(config.all_red_time, 4.0);
    config.set_all_red_time(0.1);
    assert_eq!(config.all_red_time, 0.5);

    config.set_spawn_rate(7.0);
    assert_eq!(config.spawn_rate, 1.0);
    config.set_spawn_rate(0.0);
    assert_eq!(config.spawn_rate, 0.05);

    // Green floor, and max green keeps a 5s margin above green
    config.set_green_time(1.0, 1.0);
    assert_eq!(config.primary.green, 5.0);
    assert_eq!(config.secondary.green, 5.0);
    assert!(config.primary.max_green >= config.primary.green + 5.0);

    config.set_green_time(30.0, 30.0);
    assert!(config.primary.max_green >= 35.0);

    config.set_pedestrian_spawn_rate(2.0);
    assert_eq!(config.pedestrian_spawn_rate, 0.5);
}

#[test]
fn test_snapshot_queries_are_consistent() {
    let mut world = SimWorld::new_with_seed(55);
    world.config.set_spawn_rate(1.0);

    for _ in 0..300 {
        world.tick(0.1);
    }

    let snapshots: Vec<_> = world.vehicles().collect();
    assert_eq!(snapshots.len(), world.vehicle_count());

    for snapshot in &snapshots {
        // Snapshot position matches the lane geometry
        let expected = snapshot
            .direction
            .position_at(snapshot.direction.progress_of(&snapshot.position), snapshot.lane.index);
        assert!((expected.x - snapshot.position.x).abs() < 1e-3);
        assert!((expected.y - snapshot.position.y).abs() < 1e-3);
    }

    let states = world.signal_states();
    assert!(states.contains_key(&ApproachGroup::Primary));
    assert!(states.contains_key(&ApproachGroup::Secondary));
}
