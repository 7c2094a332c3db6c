//! Main simulation world that ties everything together
//!
//! This is the entry point for running the intersection simulation
//! without any rendering dependencies.

use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::collections::HashMap;

use super::config::SimConfig;
use super::pedestrian::{CrossingAxis, PedestrianSignal, PedestrianState, SimPedestrian};
use super::signal::{SignalController, SignalPhase};
use super::spawn::SpawnManager;
use super::stats::SimStatistics;
use super::types::{
    ApproachGroup, Direction, LaneId, PedestrianId, SimId, Vec2, VehicleId, VEHICLE_LENGTH,
};
use super::vehicle::{LeaderInfo, SimVehicle, VehicleState, VehicleUpdateResult};

/// Read-only view of one signal group for renderers and metrics
#[derive(Debug, Clone, Copy)]
pub struct SignalSnapshot {
    pub phase: SignalPhase,
    /// Seconds until this group's displayed phase changes
    pub time_remaining: f32,
    /// Fraction of the controller's current interval already elapsed;
    /// the interval is shared by both groups
    pub progress: f32,
}

/// Read-only view of one vehicle
#[derive(Debug, Clone, Copy)]
pub struct VehicleSnapshot {
    pub id: VehicleId,
    pub position: Vec2,
    pub direction: Direction,
    pub lane: LaneId,
    pub speed: f32,
    pub state: VehicleState,
    pub color_seed: f32,
}

/// Read-only view of one pedestrian
#[derive(Debug, Clone, Copy)]
pub struct PedestrianSnapshot {
    pub id: PedestrianId,
    pub axis: CrossingAxis,
    pub position: Vec2,
    pub state: PedestrianState,
}

/// The main simulation world
pub struct SimWorld {
    controller: SignalController,

    /// Vehicles keyed by the lane they travel in
    lanes: HashMap<LaneId, Vec<SimVehicle>>,

    /// One pedestrian signal per crossing axis
    pedestrian_signals: HashMap<CrossingAxis, PedestrianSignal>,

    pedestrians: Vec<SimPedestrian>,

    spawner: SpawnManager,

    pub config: SimConfig,

    stats: SimStatistics,

    /// Simulation time
    pub time: f32,

    /// Optional seeded RNG for reproducible simulations
    rng: Option<StdRng>,

    next_pedestrian_id: usize,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimWorld {
    fn new_internal(rng: Option<StdRng>) -> Self {
        let config = SimConfig::default();
        let controller = SignalController::new(&config);
        let lanes = LaneId::all()
            .into_iter()
            .map(|lane| (lane, Vec::new()))
            .collect();
        let pedestrian_signals = CrossingAxis::ALL
            .into_iter()
            .map(|axis| (axis, PedestrianSignal::new(axis)))
            .collect();

        Self {
            controller,
            lanes,
            pedestrian_signals,
            pedestrians: Vec::new(),
            spawner: SpawnManager::new(),
            config,
            stats: SimStatistics::new(),
            time: 0.0,
            rng,
            next_pedestrian_id: 0,
        }
    }

    pub fn new() -> Self {
        Self::new_internal(None)
    }

    /// Create a new SimWorld with a seeded RNG for reproducible simulations
    pub fn new_with_seed(seed: u64) -> Self {
        Self::new_internal(Some(StdRng::seed_from_u64(seed)))
    }

    /// Get a random value in the given range, using seeded RNG if available
    fn random_range(&mut self, range: std::ops::Range<f32>) -> f32 {
        match &mut self.rng {
            Some(rng) => rng.random_range(range),
            None => rand::rng().random_range(range),
        }
    }

    /// Main simulation tick
    pub fn tick(&mut self, delta_secs: f32) {
        let delta_secs = delta_secs.max(0.0);
        self.time += delta_secs;
        self.stats.elapsed_time = self.time;

        // Signals first so vehicles react to this tick's phase
        self.controller.advance(delta_secs, &self.config);
        if let Some(group) = self.controller.active_group() {
            let demand = self.approach_demand(group);
            self.controller.request_extension(group, demand, &self.config);
        }

        self.spawn_vehicles(delta_secs);
        self.update_vehicles(delta_secs);
        self.spawn_pedestrians(delta_secs);
        self.update_pedestrians(delta_secs);
        self.update_statistics();

        self.controller.check_mutual_exclusion();
    }

    /// Vehicles of this group still on approach, the demand the adaptive
    /// green reacts to
    fn approach_demand(&self, group: ApproachGroup) -> usize {
        self.lanes
            .iter()
            .filter(|(lane, _)| lane.direction.group() == group)
            .flat_map(|(_, vehicles)| vehicles.iter())
            .filter(|v| !v.has_passed_intersection)
            .count()
    }

    fn spawn_vehicles(&mut self, delta_secs: f32) {
        for lane in LaneId::all() {
            let vehicles = match self.lanes.get(&lane) {
                Some(v) => v,
                None => continue,
            };
            let spawned = match &mut self.rng {
                Some(rng) => self.spawner.try_spawn(
                    lane,
                    vehicles,
                    self.time,
                    delta_secs,
                    &self.config,
                    rng,
                ),
                None => self.spawner.try_spawn(
                    lane,
                    vehicles,
                    self.time,
                    delta_secs,
                    &self.config,
                    &mut rand::rng(),
                ),
            };
            if let Some(vehicle) = spawned {
                self.stats.record_spawn(lane);
                if let Some(vehicles) = self.lanes.get_mut(&lane) {
                    vehicles.push(vehicle);
                }
            }
        }
    }

    fn update_vehicles(&mut self, delta_secs: f32) {
        for (lane, vehicles) in self.lanes.iter_mut() {
            // Front of the lane first, so index i-1 is always the leader
            vehicles.sort_by_key(|v| std::cmp::Reverse(OrderedFloat(v.progress)));

            // Snapshot leaders before anyone moves so every follower sees
            // the same pre-update state regardless of update order
            let leaders: Vec<Option<LeaderInfo>> = vehicles
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    if i == 0 {
                        None
                    } else {
                        let ahead = &vehicles[i - 1];
                        Some(LeaderInfo {
                            gap: ahead.progress - v.progress - VEHICLE_LENGTH,
                            speed: ahead.speed,
                        })
                    }
                })
                .collect();

            let mut exited = Vec::new();
            for (i, vehicle) in vehicles.iter_mut().enumerate() {
                let result =
                    vehicle.update(delta_secs, &self.controller, leaders[i], &self.config);
                if result == VehicleUpdateResult::Exited {
                    exited.push(i);
                }
            }

            for i in exited.into_iter().rev() {
                let vehicle = vehicles.remove(i);
                self.stats.record_completion(*lane, vehicle.total_wait_time);
            }
        }
    }

    fn spawn_pedestrians(&mut self, delta_secs: f32) {
        let probability = self.config.pedestrian_spawn_rate * delta_secs;
        if self.random_range(0.0..1.0) >= probability {
            return;
        }

        let axis = if self.random_range(0.0..1.0) < 0.5 {
            CrossingAxis::Horizontal
        } else {
            CrossingAxis::Vertical
        };

        let id = PedestrianId(SimId(self.next_pedestrian_id));
        self.next_pedestrian_id += 1;

        let signal = match self.pedestrian_signals.get_mut(&axis) {
            Some(signal) => signal,
            None => return,
        };
        let pedestrian = match &mut self.rng {
            Some(rng) => SimPedestrian::new(id, axis, signal, rng),
            None => SimPedestrian::new(id, axis, signal, &mut rand::rng()),
        };
        self.pedestrians.push(pedestrian);
        self.stats.pedestrians_spawned += 1;
    }

    fn update_pedestrians(&mut self, delta_secs: f32) {
        for axis in CrossingAxis::ALL {
            let anyone_crossing = self
                .pedestrians
                .iter()
                .any(|p| p.axis == axis && p.is_crossing());
            if let Some(signal) = self.pedestrian_signals.get_mut(&axis) {
                signal.update(delta_secs, &self.controller, anyone_crossing, &self.config);
            }
        }

        for pedestrian in &mut self.pedestrians {
            if let Some(signal) = self.pedestrian_signals.get(&pedestrian.axis) {
                pedestrian.update(delta_secs, signal);
            }
        }

        let before = self.pedestrians.len();
        self.pedestrians.retain(|p| p.state != PedestrianState::Done);
        self.stats.pedestrians_completed += (before - self.pedestrians.len()) as u64;
    }

    fn update_statistics(&mut self) {
        for (lane, vehicles) in &self.lanes {
            let waiting = vehicles
                .iter()
                .filter(|v| v.state == VehicleState::Waiting)
                .count();
            self.stats.observe_lane(*lane, waiting);
        }

        let (attempts, blocked) = self
            .spawner
            .points()
            .fold((0, 0), |(a, b), (_, p)| (a + p.attempts, b + p.blocked));
        self.stats.total_spawn_attempts = attempts;
        self.stats.total_spawn_blocked = blocked;
    }

    /// Place a prepared vehicle into its lane. Scenario setup hook for
    /// tests and demos; normal traffic arrives through the spawn gates.
    pub fn insert_vehicle(&mut self, vehicle: SimVehicle) {
        self.stats.record_spawn(vehicle.lane);
        self.lanes.entry(vehicle.lane).or_default().push(vehicle);
    }

    /// Vehicles currently in one lane
    pub fn lane_vehicles(&self, lane: &LaneId) -> &[SimVehicle] {
        self.lanes.get(lane).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn vehicle_count(&self) -> usize {
        self.lanes.values().map(Vec::len).sum()
    }

    pub fn controller(&self) -> &SignalController {
        &self.controller
    }

    pub fn pedestrian_signal(&self, axis: CrossingAxis) -> Option<&PedestrianSignal> {
        self.pedestrian_signals.get(&axis)
    }

    /// Signal state of both groups as one snapshot
    pub fn signal_states(&self) -> HashMap<ApproachGroup, SignalSnapshot> {
        [ApproachGroup::Primary, ApproachGroup::Secondary]
            .into_iter()
            .map(|group| {
                (
                    group,
                    SignalSnapshot {
                        phase: self.controller.phase(group),
                        time_remaining: self.controller.time_until_change(group, &self.config),
                        progress: self.controller.progress_fraction(),
                    },
                )
            })
            .collect()
    }

    /// Snapshot of every vehicle in the world
    pub fn vehicles(&self) -> impl Iterator<Item = VehicleSnapshot> + '_ {
        self.lanes.values().flatten().map(|v| VehicleSnapshot {
            id: v.id,
            position: v.position(),
            direction: v.lane.direction,
            lane: v.lane,
            speed: v.speed,
            state: v.state,
            color_seed: v.color_seed,
        })
    }

    /// Snapshot of every pedestrian in the world
    pub fn pedestrians(&self) -> impl Iterator<Item = PedestrianSnapshot> + '_ {
        self.pedestrians.iter().map(|p| PedestrianSnapshot {
            id: p.id,
            axis: p.axis,
            position: p.position(),
            state: p.state,
        })
    }

    pub fn statistics(&self) -> &SimStatistics {
        &self.stats
    }

    /// Print a summary of the world state
    pub fn print_summary(&self) {
        println!("=== Intersection Simulation Summary ===");
        println!("Time: {:.2}s", self.time);

        println!("--- Signals ---");
        for (group, snapshot) in self.signal_states() {
            println!(
                "  {:?}: {:?}, {:.1}s remaining",
                group, snapshot.phase, snapshot.time_remaining
            );
        }
        for axis in CrossingAxis::ALL {
            if let Some(signal) = self.pedestrian_signals.get(&axis) {
                let call = if signal.call_active { " (call)" } else { "" };
                println!("  Crossing {:?}: {:?}{}", axis, signal.phase, call);
            }
        }

        println!("--- Lanes ---");
        for lane in LaneId::all() {
            let vehicles = self.lane_vehicles(&lane);
            let waiting = vehicles
                .iter()
                .filter(|v| v.state == VehicleState::Waiting)
                .count();
            let max_queue = self
                .stats
                .lane(&lane)
                .map(|l| l.max_queue)
                .unwrap_or(0);
            println!(
                "  {:?} lane {}: {} vehicles, {} waiting, max queue {}",
                lane.direction,
                lane.index,
                vehicles.len(),
                waiting,
                max_queue
            );
        }

        println!("--- Totals ---");
        println!(
            "  Vehicles: {} spawned, {} completed, {} active",
            self.stats.total_spawned,
            self.stats.total_completed,
            self.vehicle_count()
        );
        println!(
            "  Spawn attempts: {} ({} blocked)",
            self.stats.total_spawn_attempts, self.stats.total_spawn_blocked
        );
        println!(
            "  Pedestrians: {} spawned, {} crossed, {} active",
            self.stats.pedestrians_spawned,
            self.stats.pedestrians_completed,
            self.pedestrians.len()
        );
        println!("  Average wait: {:.2}s", self.stats.average_wait());
        println!("  Throughput: {:.1} vehicles/min", self.stats.throughput());
    }
}
