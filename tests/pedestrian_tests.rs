//! Pedestrian signal and crossing validation tests

use rand::rngs::StdRng;
use rand::SeedableRng;

use signal_sim::simulation::{
    ApproachGroup, CrossingAxis, PedPhase, PedestrianId, PedestrianSignal, PedestrianState,
    SignalController, SimConfig, SimId, SimPedestrian,
};

#[test]
fn test_call_not_served_against_live_traffic() {
    // Vertical crossing conflicts with the primary group, which starts
    // green; the call must wait
    let config = SimConfig::default();
    let controller = SignalController::new(&config);
    assert!(!controller.must_stop(ApproachGroup::Primary));

    let mut signal = PedestrianSignal::new(CrossingAxis::Vertical);
    signal.press_call();
    signal.update(0.1, &controller, false, &config);

    assert_eq!(signal.phase, PedPhase::DontWalk);
    assert!(signal.call_active, "call was dropped instead of held");
}

#[test]
fn test_call_served_when_conflicting_group_stops() {
    let config = SimConfig::default();
    let mut controller = SignalController::new(&config);
    // Into the secondary green: primary is red
    controller.advance(19.5, &config);
    assert!(controller.must_stop(ApproachGroup::Primary));

    let mut signal = PedestrianSignal::new(CrossingAxis::Vertical);
    signal.press_call();
    signal.update(0.1, &controller, false, &config);

    assert_eq!(signal.phase, PedPhase::Walk);
    assert!(!signal.call_active);
}

#[test]
fn test_call_not_served_into_expiring_stop() {
    let config = SimConfig::default();
    let mut controller = SignalController::new(&config);
    // Inside the final all-red before the primary green at t=38
    controller.advance(37.9, &config);
    assert!(controller.must_stop(ApproachGroup::Primary));

    let mut signal = PedestrianSignal::new(CrossingAxis::Vertical);
    signal.press_call();
    signal.update(0.05, &controller, false, &config);

    // A walk started now would outlive the stop; the call is held instead
    assert_eq!(signal.phase, PedPhase::DontWalk);
    assert!(signal.call_active);
}

#[test]
fn test_arrival_during_clearance_is_eventually_served() {
    let config = SimConfig::default();
    let mut controller = SignalController::new(&config);
    controller.advance(19.5, &config);

    let mut signal = PedestrianSignal::new(CrossingAxis::Vertical);
    signal.press_call();
    signal.update(0.1, &controller, false, &config);
    signal.update(config.walk_time + 0.1, &controller, false, &config);
    assert_eq!(signal.phase, PedPhase::Clearance);

    // A new arrival mid-clearance keeps their press latched
    let mut rng = StdRng::seed_from_u64(9);
    let mut pedestrian = SimPedestrian::new(
        PedestrianId(SimId(2)),
        CrossingAxis::Vertical,
        &mut signal,
        &mut rng,
    );
    assert!(signal.call_active, "press during clearance was dropped");

    // Within one more cycle the next safe stop serves the held call and
    // the pedestrian gets across
    for _ in 0..1200 {
        controller.advance(0.1, &config);
        signal.update(0.1, &controller, pedestrian.is_crossing(), &config);
        pedestrian.update(0.1, &signal);
        if pedestrian.state == PedestrianState::Done {
            break;
        }
    }
    assert_eq!(pedestrian.state, PedestrianState::Done);
}

#[test]
fn test_walk_then_clearance_then_dont_walk() {
    let config = SimConfig::default();
    let mut controller = SignalController::new(&config);
    controller.advance(19.5, &config);

    let mut signal = PedestrianSignal::new(CrossingAxis::Vertical);
    signal.press_call();
    signal.update(0.1, &controller, false, &config);
    assert_eq!(signal.phase, PedPhase::Walk);

    // Walk interval runs out
    signal.update(config.walk_time + 0.1, &controller, false, &config);
    assert_eq!(signal.phase, PedPhase::Clearance);

    // Clearance runs out with nobody on the crossing
    signal.update(config.clearance_time + 0.1, &controller, false, &config);
    assert_eq!(signal.phase, PedPhase::DontWalk);
}

#[test]
fn test_clearance_extends_while_someone_is_crossing() {
    let config = SimConfig::default();
    let mut controller = SignalController::new(&config);
    controller.advance(19.5, &config);

    let mut signal = PedestrianSignal::new(CrossingAxis::Vertical);
    signal.press_call();
    signal.update(0.1, &controller, false, &config);
    signal.update(config.walk_time + 0.1, &controller, false, &config);
    assert_eq!(signal.phase, PedPhase::Clearance);

    // Clearance expires but someone is mid-crossing: the signal grants
    // grace instead of stranding them
    signal.update(config.clearance_time + 0.1, &controller, true, &config);
    assert_eq!(signal.phase, PedPhase::Clearance);

    // Once the crossing empties the phase finally drops
    signal.update(5.0, &controller, false, &config);
    assert_eq!(signal.phase, PedPhase::DontWalk);
}

#[test]
fn test_pedestrian_presses_call_on_spawn() {
    let mut signal = PedestrianSignal::new(CrossingAxis::Horizontal);
    let mut rng = StdRng::seed_from_u64(5);

    let pedestrian = SimPedestrian::new(
        PedestrianId(SimId(0)),
        CrossingAxis::Horizontal,
        &mut signal,
        &mut rng,
    );

    assert!(signal.call_active);
    assert_eq!(pedestrian.state, PedestrianState::Waiting);
    assert_eq!(pedestrian.progress, 0.0);
}

#[test]
fn test_pedestrian_crosses_on_walk() {
    let mut signal = PedestrianSignal::new(CrossingAxis::Horizontal);
    let mut rng = StdRng::seed_from_u64(6);
    let mut pedestrian = SimPedestrian::new(
        PedestrianId(SimId(1)),
        CrossingAxis::Horizontal,
        &mut signal,
        &mut rng,
    );

    // Waiting accrues until the walk phase shows
    pedestrian.update(1.0, &signal);
    assert_eq!(pedestrian.state, PedestrianState::Waiting);
    assert!(pedestrian.wait_time >= 1.0);

    signal.phase = PedPhase::Walk;
    pedestrian.update(0.1, &signal);
    assert_eq!(pedestrian.state, PedestrianState::Crossing);

    // Walking speed is at least 1.2, so the 7-unit crossing finishes
    // comfortably inside 10 seconds
    for _ in 0..100 {
        pedestrian.update(0.1, &signal);
        if pedestrian.state == PedestrianState::Done {
            break;
        }
    }
    assert_eq!(pedestrian.state, PedestrianState::Done);
    assert!(pedestrian.progress >= CrossingAxis::Horizontal.crossing_length());
}
