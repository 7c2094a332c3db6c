//! Stochastic per-lane vehicle spawning
//!
//! Standalone implementation that doesn't depend on any rendering layer.
//! Every lane runs the same three gates each tick: a cooldown, a
//! probability roll, and a spatial safety check against the nearest
//! vehicle ahead of the spawn point. Failing a gate is normal operation,
//! not an error; the gates just feed counters.

use std::collections::HashMap;

use rand::Rng;

use super::config::SimConfig;
use super::types::{ApproachGroup, LaneId, SimId, VehicleId, SPAWN_PROGRESS};
use super::vehicle::SimVehicle;

/// Nearest-vehicle distance beyond which a spawn is always safe
pub const FREE_FLOW_DISTANCE: f32 = 70.0;

/// Minimum distance to a *stationary* nearest vehicle; lets queues pack
/// up behind a red light without spawning into a moving car's path
pub const QUEUE_PACK_DISTANCE: f32 = 16.0;

/// The cross street sees less traffic than the main road
const CROSS_STREET_MULTIPLIER: f32 = 0.8;

/// Lane population above which spawn probability starts shrinking
const CONGESTION_THRESHOLD: usize = 8;

/// Why the most recent attempt on a lane was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    Cooldown,
    ProbabilityRoll,
    LaneFull,
    TooClose,
}

/// Per-lane spawn bookkeeping
#[derive(Debug, Clone)]
pub struct SpawnPoint {
    pub last_spawn: f32,
    pub attempts: u64,
    pub spawned: u64,
    pub blocked: u64,
    pub last_block: Option<BlockReason>,
}

impl SpawnPoint {
    fn new() -> Self {
        Self {
            // Far enough in the past that the first attempt is never
            // cooldown-blocked
            last_spawn: f32::MIN,
            attempts: 0,
            spawned: 0,
            blocked: 0,
            last_block: None,
        }
    }
}

/// Owns the spawn points and the vehicle id counter
#[derive(Debug, Clone)]
pub struct SpawnManager {
    points: HashMap<LaneId, SpawnPoint>,
    next_vehicle_id: usize,
}

impl SpawnManager {
    pub fn new() -> Self {
        let points = LaneId::all()
            .into_iter()
            .map(|lane| (lane, SpawnPoint::new()))
            .collect();
        Self {
            points,
            next_vehicle_id: 0,
        }
    }

    pub fn point(&self, lane: &LaneId) -> Option<&SpawnPoint> {
        self.points.get(lane)
    }

    pub fn points(&self) -> impl Iterator<Item = (&LaneId, &SpawnPoint)> {
        self.points.iter()
    }

    /// Run the spawn gates for one lane. Returns the new vehicle when all
    /// gates pass; `vehicles` are the lane's current members.
    pub fn try_spawn<R: Rng + ?Sized>(
        &mut self,
        lane: LaneId,
        vehicles: &[SimVehicle],
        now: f32,
        delta_secs: f32,
        config: &SimConfig,
        rng: &mut R,
    ) -> Option<SimVehicle> {
        let point = self.points.entry(lane).or_insert_with(SpawnPoint::new);
        point.attempts += 1;

        // Gate 1: cooldown
        if now - point.last_spawn < config.spawn_cooldown {
            point.blocked += 1;
            point.last_block = Some(BlockReason::Cooldown);
            return None;
        }

        // Gate 2: probability, scaled by the tick length
        let jitter = rng.random_range(0.5..1.0);
        let road_multiplier = match lane.direction.group() {
            ApproachGroup::Primary => 1.0,
            ApproachGroup::Secondary => CROSS_STREET_MULTIPLIER,
        };
        let probability = config.spawn_rate
            * jitter
            * rush_hour_multiplier(now, config)
            * congestion_damp(vehicles.len())
            * road_multiplier
            * delta_secs;
        if rng.random_range(0.0..1.0) >= probability {
            point.blocked += 1;
            point.last_block = Some(BlockReason::ProbabilityRoll);
            return None;
        }

        // Gate 3: spatial safety
        if vehicles.len() >= config.max_vehicles_per_lane {
            point.blocked += 1;
            point.last_block = Some(BlockReason::LaneFull);
            return None;
        }
        if !spawn_gap_is_safe(vehicles) {
            point.blocked += 1;
            point.last_block = Some(BlockReason::TooClose);
            return None;
        }

        let id = VehicleId(SimId(self.next_vehicle_id));
        self.next_vehicle_id += 1;
        point.spawned += 1;
        point.last_spawn = now;
        point.last_block = None;

        Some(SimVehicle::new(id, lane, config, rng))
    }
}

impl Default for SpawnManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Distance check against the nearest vehicle ahead of the spawn point.
/// Far-away traffic is always safe; a closer vehicle is only acceptable
/// when it is stationary, so queues can back up toward the spawn point.
pub fn spawn_gap_is_safe(vehicles: &[SimVehicle]) -> bool {
    let nearest = vehicles
        .iter()
        .map(|v| (v.progress - SPAWN_PROGRESS, v.is_stationary()))
        .filter(|(distance, _)| *distance >= 0.0)
        .min_by(|a, b| a.0.total_cmp(&b.0));

    match nearest {
        None => true,
        Some((distance, _)) if distance >= FREE_FLOW_DISTANCE => true,
        Some((distance, stationary)) => stationary && distance >= QUEUE_PACK_DISTANCE,
    }
}

/// Demand multiplier over a compressed simulated day: two rush-hour
/// windows, morning and evening
fn rush_hour_multiplier(now: f32, config: &SimConfig) -> f32 {
    let day_fraction = (now % config.day_length) / config.day_length;
    let hour = day_fraction * 24.0;
    if (7.0..9.0).contains(&hour) || (17.0..19.0).contains(&hour) {
        config.rush_hour_multiplier
    } else {
        1.0
    }
}

/// Probability shrinks as a lane fills past the congestion threshold
fn congestion_damp(population: usize) -> f32 {
    if population <= CONGESTION_THRESHOLD {
        1.0
    } else {
        let excess = (population - CONGESTION_THRESHOLD) as f32;
        (1.0 - 0.15 * excess).max(0.2)
    }
}
