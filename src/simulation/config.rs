//! Runtime configuration for the simulation
//!
//! Every setter clamps to a safe range instead of rejecting the value; the
//! core never surfaces a configuration error.

use log::debug;

/// Floor for the green interval of either group
pub const MIN_GREEN_FLOOR: f32 = 5.0;

/// Yellow interval bounds
pub const YELLOW_RANGE: (f32, f32) = (2.0, 5.0);

/// All-red clearance interval bounds
pub const ALL_RED_RANGE: (f32, f32) = (0.5, 4.0);

/// Vehicle spawn rate bounds, in expected vehicles per second per lane
pub const SPAWN_RATE_RANGE: (f32, f32) = (0.05, 1.0);

/// Pedestrian spawn rate bounds, in pedestrians per second
pub const PED_SPAWN_RATE_RANGE: (f32, f32) = (0.02, 0.5);

/// Timing for one signal group
#[derive(Debug, Clone, Copy)]
pub struct GreenSplit {
    pub green: f32,
    pub max_green: f32,
}

/// All runtime-adjustable parameters of the simulation
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Green timing of the main road (east-west)
    pub primary: GreenSplit,
    /// Green timing of the cross street (north-south)
    pub secondary: GreenSplit,
    pub yellow_time: f32,
    pub all_red_time: f32,

    /// Adaptive green: seconds added per granted extension
    pub extension_time: f32,
    /// Adaptive green: cap on extensions within one green interval
    pub max_extensions: u32,

    /// Expected vehicles per second per lane before multipliers
    pub spawn_rate: f32,
    /// Minimum interval between spawns on one lane
    pub spawn_cooldown: f32,
    /// Upper bound on vehicles a single lane may hold
    pub max_vehicles_per_lane: usize,

    /// Expected pedestrians per second across all crossings
    pub pedestrian_spawn_rate: f32,
    /// Seconds the walk phase lasts once a call is served
    pub walk_time: f32,
    /// Nominal clearance interval after walk
    pub clearance_time: f32,

    /// Base vehicle speed before the personality factor and jitter
    pub base_max_speed: f32,
    pub acceleration: f32,
    pub comfortable_deceleration: f32,
    pub emergency_deceleration: f32,

    /// Length of a simulated day, driving the rush-hour schedule
    pub day_length: f32,
    pub rush_hour_multiplier: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            primary: GreenSplit {
                green: 15.0,
                max_green: 35.0,
            },
            secondary: GreenSplit {
                green: 15.0,
                max_green: 25.0,
            },
            yellow_time: 3.0,
            all_red_time: 1.0,
            extension_time: 0.5,
            max_extensions: 10,
            spawn_rate: 0.25,
            spawn_cooldown: 0.8,
            max_vehicles_per_lane: 14,
            pedestrian_spawn_rate: 0.1,
            walk_time: 8.0,
            clearance_time: 12.0,
            base_max_speed: 14.0,
            acceleration: 3.0,
            comfortable_deceleration: 4.5,
            emergency_deceleration: 9.0,
            day_length: 600.0,
            rush_hour_multiplier: 2.5,
        }
    }
}

impl SimConfig {
    /// Set the green interval of both groups, clamped to the floor.
    /// `max_green` is pushed up if the new minimum would invert the range.
    pub fn set_green_time(&mut self, primary: f32, secondary: f32) {
        self.primary.green = clamp_logged("primary green", primary, MIN_GREEN_FLOOR, f32::MAX);
        self.secondary.green =
            clamp_logged("secondary green", secondary, MIN_GREEN_FLOOR, f32::MAX);
        self.primary.max_green = self.primary.max_green.max(self.primary.green + 5.0);
        self.secondary.max_green = self.secondary.max_green.max(self.secondary.green + 5.0);
    }

    pub fn set_max_green(&mut self, primary: f32, secondary: f32) {
        self.primary.max_green =
            clamp_logged("primary max green", primary, self.primary.green + 5.0, f32::MAX);
        self.secondary.max_green = clamp_logged(
            "secondary max green",
            secondary,
            self.secondary.green + 5.0,
            f32::MAX,
        );
    }

    pub fn set_yellow_time(&mut self, value: f32) {
        self.yellow_time = clamp_logged("yellow time", value, YELLOW_RANGE.0, YELLOW_RANGE.1);
    }

    pub fn set_all_red_time(&mut self, value: f32) {
        self.all_red_time = clamp_logged("all-red time", value, ALL_RED_RANGE.0, ALL_RED_RANGE.1);
    }

    pub fn set_spawn_rate(&mut self, value: f32) {
        self.spawn_rate = clamp_logged("spawn rate", value, SPAWN_RATE_RANGE.0, SPAWN_RATE_RANGE.1);
    }

    pub fn set_pedestrian_spawn_rate(&mut self, value: f32) {
        self.pedestrian_spawn_rate = clamp_logged(
            "pedestrian spawn rate",
            value,
            PED_SPAWN_RATE_RANGE.0,
            PED_SPAWN_RATE_RANGE.1,
        );
    }
}

fn clamp_logged(name: &str, value: f32, min: f32, max: f32) -> f32 {
    let clamped = value.clamp(min, max);
    if clamped != value {
        debug!("{} {} out of range, clamped to {}", name, value, clamped);
    }
    clamped
}
