//! Core types for the intersection simulation
//!
//! These are standalone types with no dependency on any rendering layer.

/// A unique identifier for simulation entities
/// This is a simple wrapper around a usize for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SimId(pub usize);

/// A wrapper type for vehicle IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VehicleId(pub SimId);

/// A wrapper type for pedestrian IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PedestrianId(pub SimId);

/// A 2D position in the simulation plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn dot(&self, other: &Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }
}

impl Default for Vec2 {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
}

/// The two conflicting signal groups at the intersection.
///
/// Primary is the east-west main road, Secondary the north-south cross
/// street. They are never simultaneously green.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApproachGroup {
    Primary,
    Secondary,
}

impl ApproachGroup {
    pub fn conflicting(&self) -> ApproachGroup {
        match self {
            ApproachGroup::Primary => ApproachGroup::Secondary,
            ApproachGroup::Secondary => ApproachGroup::Primary,
        }
    }
}

/// Travel direction of a vehicle, one per approach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Eastbound,
    Westbound,
    Northbound,
    Southbound,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Eastbound,
        Direction::Westbound,
        Direction::Northbound,
        Direction::Southbound,
    ];

    /// Unit vector of travel
    pub fn unit(&self) -> Vec2 {
        match self {
            Direction::Eastbound => Vec2::new(1.0, 0.0),
            Direction::Westbound => Vec2::new(-1.0, 0.0),
            Direction::Northbound => Vec2::new(0.0, 1.0),
            Direction::Southbound => Vec2::new(0.0, -1.0),
        }
    }

    /// Signal group controlling this approach
    pub fn group(&self) -> ApproachGroup {
        match self {
            Direction::Eastbound | Direction::Westbound => ApproachGroup::Primary,
            Direction::Northbound | Direction::Southbound => ApproachGroup::Secondary,
        }
    }

    /// The main road carries two lanes per direction, the cross street one
    pub fn lane_count(&self) -> usize {
        match self.group() {
            ApproachGroup::Primary => 2,
            ApproachGroup::Secondary => 1,
        }
    }

    /// Lateral offset of a lane center from the road axis, in world units.
    /// Lane 0 is the curb-side lane.
    pub fn lane_offset(&self, lane: usize) -> f32 {
        // Right-hand traffic: lanes sit on the right of the travel axis
        let lateral = LANE_WIDTH * (0.5 + lane as f32);
        match self {
            Direction::Eastbound => -lateral,
            Direction::Westbound => lateral,
            Direction::Northbound => lateral,
            Direction::Southbound => -lateral,
        }
    }

    /// World position for a given progress along this approach.
    /// Progress 0 is the intersection center, negative is upstream.
    pub fn position_at(&self, progress: f32, lane: usize) -> Vec2 {
        let along = self.unit();
        let offset = self.lane_offset(lane);
        match self {
            Direction::Eastbound | Direction::Westbound => Vec2::new(along.x * progress, offset),
            Direction::Northbound | Direction::Southbound => Vec2::new(offset, along.y * progress),
        }
    }

    /// Scalar progress of a world position along this approach
    pub fn progress_of(&self, position: &Vec2) -> f32 {
        position.dot(&self.unit())
    }
}

/// A single travel lane: one direction plus a lane index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LaneId {
    pub direction: Direction,
    pub index: usize,
}

impl LaneId {
    pub fn new(direction: Direction, index: usize) -> Self {
        Self { direction, index }
    }

    /// All lanes of the intersection, main road first
    pub fn all() -> Vec<LaneId> {
        let mut lanes = Vec::new();
        for direction in Direction::ALL {
            for index in 0..direction.lane_count() {
                lanes.push(LaneId::new(direction, index));
            }
        }
        lanes
    }
}

/// Length of a vehicle in world units
pub const VEHICLE_LENGTH: f32 = 4.5;

/// Width of one travel lane
pub const LANE_WIDTH: f32 = 3.5;

/// Half-extent of the simulated area; vehicles despawn beyond it
pub const WORLD_HALF_EXTENT: f32 = 200.0;

/// Distance from the intersection center to the stop line
pub const STOP_LINE_OFFSET: f32 = 12.0;

/// How far out a red light is noticed by an approaching vehicle
pub const SIGNAL_DETECTION_HORIZON: f32 = 50.0;

/// Bumper-to-bumper gap below which the target speed drops to zero
pub const CRITICAL_GAP: f32 = 2.0;

/// Gap below which braking switches to the emergency rate
pub const EMERGENCY_BRAKE_GAP: f32 = 1.8;

/// Base bumper-to-bumper gap of the safety envelope, before the
/// personality following factor and speed-dependent term are applied
pub const BASE_SAFE_GAP: f32 = 6.0;

/// Margin added to the computed stopping distance on a yellow light
pub const YELLOW_STOP_MARGIN: f32 = 3.0;

/// Progress coordinate of a lane's spawn point
pub const SPAWN_PROGRESS: f32 = -WORLD_HALF_EXTENT;

/// Progress coordinate of the stop line
pub const STOP_LINE_PROGRESS: f32 = -STOP_LINE_OFFSET;
