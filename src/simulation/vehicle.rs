//! Vehicle movement and driver decision logic
//!
//! Standalone implementation that doesn't depend on any rendering layer.
//! Each vehicle travels along one lane measured by a scalar progress
//! coordinate: negative upstream of the intersection center, positive past
//! it. Drivers yield to the vehicle ahead first, then to the signal.

use rand::Rng;

use super::config::SimConfig;
use super::signal::{SignalController, SignalPhase};
use super::types::{
    LaneId, Vec2, VehicleId, BASE_SAFE_GAP, CRITICAL_GAP, EMERGENCY_BRAKE_GAP,
    SIGNAL_DETECTION_HORIZON, SPAWN_PROGRESS, STOP_LINE_PROGRESS, WORLD_HALF_EXTENT,
    YELLOW_STOP_MARGIN,
};

/// Result of a vehicle update indicating what action should be taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleUpdateResult {
    Continue,
    /// Vehicle left the simulated area and should be removed
    Exited,
}

/// Observable movement state, derived from speed and target speed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleState {
    Driving,
    Accelerating,
    Stopping,
    Waiting,
}

/// Driver temperament, fixed at spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    Aggressive,
    Conservative,
    Normal,
    Elderly,
}

/// Baseline parameters for one driver temperament
#[derive(Debug, Clone, Copy)]
pub struct DriverProfile {
    pub kind: DriverKind,
    /// Range the reaction time is drawn from, in seconds
    pub reaction_time: (f32, f32),
    /// Multiplier on the safe following gap
    pub following_factor: f32,
    /// Probability of proceeding on a yellow that could still be stopped for
    pub yellow_go_probability: f32,
    /// Multiplier on the lane's base speed limit
    pub speed_factor: f32,
    /// Relative spawn weight, out of the profile total
    pub weight: u32,
}

pub const DRIVER_PROFILES: [DriverProfile; 4] = [
    DriverProfile {
        kind: DriverKind::Normal,
        reaction_time: (0.8, 1.2),
        following_factor: 1.0,
        yellow_go_probability: 0.5,
        speed_factor: 1.0,
        weight: 50,
    },
    DriverProfile {
        kind: DriverKind::Conservative,
        reaction_time: (1.2, 1.5),
        following_factor: 1.4,
        yellow_go_probability: 0.2,
        speed_factor: 0.9,
        weight: 25,
    },
    DriverProfile {
        kind: DriverKind::Aggressive,
        reaction_time: (0.5, 0.8),
        following_factor: 0.8,
        yellow_go_probability: 0.8,
        speed_factor: 1.1,
        weight: 15,
    },
    DriverProfile {
        kind: DriverKind::Elderly,
        reaction_time: (1.5, 2.0),
        following_factor: 1.3,
        yellow_go_probability: 0.1,
        speed_factor: 0.8,
        weight: 10,
    },
];

impl DriverProfile {
    /// Weighted draw across all profiles
    pub fn choose<R: Rng + ?Sized>(rng: &mut R) -> &'static DriverProfile {
        let total: u32 = DRIVER_PROFILES.iter().map(|p| p.weight).sum();
        let mut roll = rng.random_range(0..total);
        for profile in &DRIVER_PROFILES {
            if roll < profile.weight {
                return profile;
            }
            roll -= profile.weight;
        }
        // Unreachable while weights sum to total
        &DRIVER_PROFILES[0]
    }
}

/// What a vehicle knows about the one ahead of it in the same lane,
/// snapshotted before any vehicle in the lane moves
#[derive(Debug, Clone, Copy)]
pub struct LeaderInfo {
    /// Bumper-to-bumper gap, may be negative if overlapped
    pub gap: f32,
    pub speed: f32,
}

/// A vehicle in the simulation
#[derive(Debug, Clone)]
pub struct SimVehicle {
    pub id: VehicleId,
    pub lane: LaneId,
    /// Scalar position along the approach; 0 is the intersection center
    pub progress: f32,
    pub speed: f32,
    /// Speed the driver is currently steering toward
    pub target_speed: f32,
    /// Personal speed limit after temperament and jitter
    pub max_speed: f32,
    pub kind: DriverKind,
    pub reaction_time: f32,
    pub following_factor: f32,
    yellow_go_probability: f32,
    /// Pre-rolled willingness for this driver's next yellow call
    yellow_roll: f32,
    /// Once past the stop line the signal is ignored for good
    pub has_passed_intersection: bool,
    /// Decision made on first seeing the current yellow; cleared on green
    yellow_decision: Option<bool>,
    pub state: VehicleState,
    /// Seconds spent stationary since spawn
    pub total_wait_time: f32,
    /// Seconds of the current stop, zero while moving
    pub current_wait: f32,
    /// Stable per-vehicle value in 0..1 for renderers to derive a color from
    pub color_seed: f32,
}

impl SimVehicle {
    pub fn new<R: Rng + ?Sized>(id: VehicleId, lane: LaneId, config: &SimConfig, rng: &mut R) -> Self {
        let profile = DriverProfile::choose(rng);
        // Each driver varies around their temperament's baseline
        let variation = rng.random_range(0.9..1.1);
        let reaction_time =
            rng.random_range(profile.reaction_time.0..profile.reaction_time.1) * variation;
        let max_speed = config.base_max_speed * profile.speed_factor * variation;

        Self {
            id,
            lane,
            progress: SPAWN_PROGRESS,
            speed: 0.0,
            target_speed: max_speed,
            max_speed,
            kind: profile.kind,
            reaction_time,
            following_factor: profile.following_factor * variation,
            yellow_go_probability: profile.yellow_go_probability,
            yellow_roll: rng.random_range(0.0..1.0),
            has_passed_intersection: false,
            yellow_decision: None,
            state: VehicleState::Accelerating,
            total_wait_time: 0.0,
            current_wait: 0.0,
            color_seed: rng.random_range(0.0..1.0),
        }
    }

    /// World position of this vehicle
    pub fn position(&self) -> Vec2 {
        self.lane.direction.position_at(self.progress, self.lane.index)
    }

    /// Distance still to travel before the stop line, negative once past it
    pub fn distance_to_stop_line(&self) -> f32 {
        STOP_LINE_PROGRESS - self.progress
    }

    /// The gap the driver tries to keep to a leader at the current speed
    pub fn safe_gap(&self) -> f32 {
        BASE_SAFE_GAP * self.following_factor + self.speed * self.reaction_time
    }

    /// True while effectively stationary
    pub fn is_stationary(&self) -> bool {
        self.speed < 0.1
    }

    /// Advance the vehicle by `delta_secs`.
    ///
    /// The leader constraint always wins over the signal: a green light
    /// never drives a vehicle into the one ahead.
    pub fn update(
        &mut self,
        delta_secs: f32,
        controller: &SignalController,
        leader: Option<LeaderInfo>,
        config: &SimConfig,
    ) -> VehicleUpdateResult {
        let mut target = self.max_speed;
        let mut emergency = false;
        let mut critical_stop = false;

        // 1. Vehicle ahead
        if let Some(leader) = leader {
            if leader.gap < CRITICAL_GAP {
                target = 0.0;
                critical_stop = true;
                emergency = leader.gap < EMERGENCY_BRAKE_GAP;
            } else {
                let safe = self.safe_gap();
                if leader.gap < safe {
                    // Close the gap gradually, never below a creep floor so
                    // queues keep compacting
                    let ratio = (leader.gap - CRITICAL_GAP) / (safe - CRITICAL_GAP);
                    let floor = self.max_speed * 0.1;
                    target = target.min((self.max_speed * ratio).max(floor).min(leader.speed + 2.0));
                }
                // Never carry more speed than the remaining gap can absorb
                // at the comfortable braking rate; this is what makes a
                // fast approach to a stopped queue tail shed speed early
                let absorbable = (2.0
                    * config.comfortable_deceleration
                    * (leader.gap - CRITICAL_GAP))
                    .sqrt();
                target = target.min(absorbable);
            }
        }

        // 2. Signal, only while approaching and within sight of the light.
        // A critical car-following stop already pins the target at zero, so
        // the driver is not making signal decisions underneath it.
        if !self.has_passed_intersection && !critical_stop {
            let distance = self.distance_to_stop_line();
            if distance > 0.0 && distance <= SIGNAL_DETECTION_HORIZON {
                let phase = controller.phase(self.lane.direction.group());
                match phase {
                    SignalPhase::Red | SignalPhase::AllRed => {
                        target = 0.0;
                        self.yellow_decision = None;
                    }
                    SignalPhase::Yellow => {
                        if !self.yellow_go_decision(distance, config) {
                            target = 0.0;
                        }
                    }
                    SignalPhase::Green => {
                        self.yellow_decision = None;
                    }
                }
            }
        }

        self.target_speed = target;

        // 3. Physics
        if self.speed < target {
            self.speed = (self.speed + config.acceleration * delta_secs).min(target);
        } else if self.speed > target {
            let rate = if emergency {
                config.emergency_deceleration
            } else {
                config.comfortable_deceleration
            };
            self.speed = (self.speed - rate * delta_secs).max(target);
        }

        self.progress += self.speed * delta_secs;

        // Latch: the stop line only gets crossed once
        if !self.has_passed_intersection && self.distance_to_stop_line() <= 0.0 {
            self.has_passed_intersection = true;
            self.yellow_decision = None;
        }

        // 4. Bookkeeping
        if self.is_stationary() && self.target_speed == 0.0 {
            self.current_wait += delta_secs;
            self.total_wait_time += delta_secs;
            self.state = VehicleState::Waiting;
        } else {
            self.current_wait = 0.0;
            self.state = if self.target_speed == 0.0 {
                VehicleState::Stopping
            } else if self.speed < self.target_speed - 0.1 {
                VehicleState::Accelerating
            } else {
                VehicleState::Driving
            };
        }

        if self.progress > WORLD_HALF_EXTENT {
            VehicleUpdateResult::Exited
        } else {
            VehicleUpdateResult::Continue
        }
    }

    /// Whether this driver proceeds on the current yellow. Decided once per
    /// yellow and cached so the vehicle never flip-flops mid-interval.
    fn yellow_go_decision(&mut self, distance: f32, config: &SimConfig) -> bool {
        if let Some(decision) = self.yellow_decision {
            return decision;
        }
        let stopping_distance =
            self.speed * self.speed / (2.0 * config.comfortable_deceleration) + YELLOW_STOP_MARGIN;
        let decision = if stopping_distance >= distance {
            // Physically committed, stopping would overrun the line
            true
        } else {
            // A fast driver close to the line is more tempted to go
            let speed_fraction = (self.speed / self.max_speed).clamp(0.0, 1.0);
            let proximity = 1.0 - (distance / SIGNAL_DETECTION_HORIZON).clamp(0.0, 1.0);
            let go_probability = (self.yellow_go_probability * 0.6
                + speed_fraction * 0.25
                + proximity * 0.15)
                .clamp(0.0, 1.0);
            self.yellow_roll < go_probability
        };
        self.yellow_decision = Some(decision);
        decision
    }

    /// The cached yellow-light decision, if one has been made this approach
    pub fn yellow_decision(&self) -> Option<bool> {
        self.yellow_decision
    }
}
