//! Standalone intersection simulation module
//!
//! This module contains all the core simulation logic: the signal
//! controller, vehicles and their drivers, pedestrian crossings, and the
//! spawn system. It runs independently of any rendering layer and can be
//! driven from the console or from tests.

mod config;
mod pedestrian;
mod signal;
mod spawn;
mod stats;
mod types;
mod vehicle;
mod world;

// Re-export public types for external use
// These may not be used within this crate but are part of the public API
#[allow(unused_imports)]
pub use config::{
    GreenSplit, SimConfig, ALL_RED_RANGE, MIN_GREEN_FLOOR, PED_SPAWN_RATE_RANGE, SPAWN_RATE_RANGE,
    YELLOW_RANGE,
};
#[allow(unused_imports)]
pub use pedestrian::{
    CrossingAxis, PedPhase, PedestrianSignal, PedestrianState, SimPedestrian, WALKING_SPEED_RANGE,
};
#[allow(unused_imports)]
pub use signal::{SignalController, SignalPhase};
#[allow(unused_imports)]
pub use spawn::{
    spawn_gap_is_safe, BlockReason, SpawnManager, SpawnPoint, FREE_FLOW_DISTANCE,
    QUEUE_PACK_DISTANCE,
};
#[allow(unused_imports)]
pub use stats::{LaneStats, SimStatistics};
#[allow(unused_imports)]
pub use types::{
    ApproachGroup, Direction, LaneId, PedestrianId, SimId, Vec2, VehicleId, BASE_SAFE_GAP,
    CRITICAL_GAP, EMERGENCY_BRAKE_GAP, LANE_WIDTH, SIGNAL_DETECTION_HORIZON, SPAWN_PROGRESS,
    STOP_LINE_OFFSET, STOP_LINE_PROGRESS, VEHICLE_LENGTH, WORLD_HALF_EXTENT, YELLOW_STOP_MARGIN,
};
#[allow(unused_imports)]
pub use vehicle::{
    DriverKind, DriverProfile, LeaderInfo, SimVehicle, VehicleState, VehicleUpdateResult,
    DRIVER_PROFILES,
};
pub use world::{PedestrianSnapshot, SignalSnapshot, SimWorld, VehicleSnapshot};
