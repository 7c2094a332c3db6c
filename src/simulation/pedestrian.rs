//! Pedestrian crossings: call-button signals and the people using them
//!
//! Standalone implementation that doesn't depend on any rendering layer.
//! Each crossing axis has one pedestrian signal that is only served while
//! the conflicting vehicle group is hard-stopped long enough to cover the
//! walk interval.

use rand::Rng;

use super::config::SimConfig;
use super::signal::SignalController;
use super::types::{ApproachGroup, PedestrianId, Vec2, LANE_WIDTH, STOP_LINE_OFFSET};

/// Walking speed range, world units per second
pub const WALKING_SPEED_RANGE: (f32, f32) = (1.2, 1.6);

/// Clearance grows by this much while someone is still mid-crossing
const CLEARANCE_GRACE: f32 = 2.0;

/// The two crossing axes of the intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrossingAxis {
    /// East-west crossing over the cross street
    Horizontal,
    /// North-south crossing over the main road
    Vertical,
}

impl CrossingAxis {
    pub const ALL: [CrossingAxis; 2] = [CrossingAxis::Horizontal, CrossingAxis::Vertical];

    /// The vehicle group whose traffic runs through this crossing
    pub fn conflicting_group(&self) -> ApproachGroup {
        match self {
            CrossingAxis::Horizontal => ApproachGroup::Secondary,
            CrossingAxis::Vertical => ApproachGroup::Primary,
        }
    }

    /// Curb-to-curb distance of this crossing
    pub fn crossing_length(&self) -> f32 {
        match self {
            // The cross street is one lane each way, the main road two
            CrossingAxis::Horizontal => 2.0 * LANE_WIDTH,
            CrossingAxis::Vertical => 4.0 * LANE_WIDTH,
        }
    }
}

/// What the pedestrian head shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PedPhase {
    DontWalk,
    Walk,
    /// Flashing interval after walk; entering the crossing is no longer
    /// allowed but anyone already in it finishes
    Clearance,
}

/// One pedestrian signal with a call button
#[derive(Debug, Clone)]
pub struct PedestrianSignal {
    pub axis: CrossingAxis,
    pub phase: PedPhase,
    /// Set by the button, cleared when the call is served
    pub call_active: bool,
    elapsed: f32,
    /// Length of the current clearance, including grace extensions
    clearance_interval: f32,
}

impl PedestrianSignal {
    pub fn new(axis: CrossingAxis) -> Self {
        Self {
            axis,
            phase: PedPhase::DontWalk,
            call_active: false,
            elapsed: 0.0,
            clearance_interval: 0.0,
        }
    }

    /// Latch a button press until a walk is served. A press during an
    /// active walk stays latched; the presser usually crosses right away
    /// and the leftover call is served next window.
    pub fn press_call(&mut self) {
        self.call_active = true;
    }

    /// Advance the signal. `anyone_crossing` reports whether a pedestrian
    /// is still between the curbs; clearance never ends while one is.
    pub fn update(
        &mut self,
        delta_secs: f32,
        controller: &SignalController,
        anyone_crossing: bool,
        config: &SimConfig,
    ) {
        match self.phase {
            PedPhase::DontWalk => {
                // Serve only while conflicting traffic is guaranteed to
                // stay held for the full walk interval
                let conflicting = self.axis.conflicting_group();
                if self.call_active
                    && controller.must_stop(conflicting)
                    && controller.stop_time_remaining(conflicting, config) >= config.walk_time
                {
                    self.phase = PedPhase::Walk;
                    self.call_active = false;
                    self.elapsed = 0.0;
                }
            }
            PedPhase::Walk => {
                self.elapsed += delta_secs;
                if self.elapsed >= config.walk_time {
                    self.phase = PedPhase::Clearance;
                    self.elapsed = 0.0;
                    self.clearance_interval = config.clearance_time;
                }
            }
            PedPhase::Clearance => {
                self.elapsed += delta_secs;
                if self.elapsed >= self.clearance_interval {
                    if anyone_crossing {
                        // Never strand someone mid-crossing
                        self.clearance_interval += CLEARANCE_GRACE;
                    } else {
                        self.phase = PedPhase::DontWalk;
                        self.elapsed = 0.0;
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PedestrianState {
    Waiting,
    Crossing,
    Done,
}

/// A pedestrian at one of the crossings
#[derive(Debug, Clone)]
pub struct SimPedestrian {
    pub id: PedestrianId,
    pub axis: CrossingAxis,
    /// Distance covered across the crossing, from 0 at the curb
    pub progress: f32,
    pub walking_speed: f32,
    pub state: PedestrianState,
    /// Seconds spent at the curb before the walk signal
    pub wait_time: f32,
}

impl SimPedestrian {
    /// Spawn at the curb; the new arrival presses the call button
    pub fn new<R: Rng + ?Sized>(
        id: PedestrianId,
        axis: CrossingAxis,
        signal: &mut PedestrianSignal,
        rng: &mut R,
    ) -> Self {
        signal.press_call();
        Self {
            id,
            axis,
            progress: 0.0,
            walking_speed: rng.random_range(WALKING_SPEED_RANGE.0..WALKING_SPEED_RANGE.1),
            state: PedestrianState::Waiting,
            wait_time: 0.0,
        }
    }

    /// World position, used by snapshot queries
    pub fn position(&self) -> Vec2 {
        let length = self.axis.crossing_length();
        let along = self.progress - length / 2.0;
        match self.axis {
            CrossingAxis::Horizontal => Vec2::new(along, STOP_LINE_OFFSET),
            CrossingAxis::Vertical => Vec2::new(STOP_LINE_OFFSET, along),
        }
    }

    pub fn is_crossing(&self) -> bool {
        self.state == PedestrianState::Crossing
    }

    pub fn update(&mut self, delta_secs: f32, signal: &PedestrianSignal) {
        match self.state {
            PedestrianState::Waiting => {
                self.wait_time += delta_secs;
                if signal.phase == PedPhase::Walk {
                    self.state = PedestrianState::Crossing;
                }
            }
            PedestrianState::Crossing => {
                self.progress += self.walking_speed * delta_secs;
                if self.progress >= self.axis.crossing_length() {
                    self.state = PedestrianState::Done;
                }
            }
            PedestrianState::Done => {}
        }
    }
}
