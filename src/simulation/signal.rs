//! Signal controller for the intersection
//!
//! Standalone implementation that doesn't depend on any rendering layer.
//! One controller owns both signal groups and guarantees they are never
//! simultaneously permissive.

use log::debug;

use super::config::SimConfig;
use super::types::ApproachGroup;

/// What an approaching driver sees for their group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalPhase {
    Green,
    Yellow,
    /// Clearance interval where every approach is held
    AllRed,
    Red,
}

impl SignalPhase {
    /// A vehicle may enter the intersection only on green
    pub fn can_proceed(&self) -> bool {
        matches!(self, SignalPhase::Green)
    }

    /// Red and all-red are hard stops; yellow is a driver decision
    pub fn must_stop(&self) -> bool {
        matches!(self, SignalPhase::Red | SignalPhase::AllRed)
    }
}

/// Internal controller state, one active interval at a time
#[derive(Debug, Clone, Copy, PartialEq)]
enum ControllerState {
    Green(ApproachGroup),
    Yellow(ApproachGroup),
    AllRed { next: ApproachGroup },
}

/// The signal state machine.
///
/// Cycles Green -> Yellow -> AllRed for one group, then hands green to the
/// conflicting group. Green may be extended while demand persists, up to
/// the configured maximum.
#[derive(Debug, Clone)]
pub struct SignalController {
    state: ControllerState,
    /// Time spent in the current interval
    elapsed: f32,
    /// Length of the current interval, including granted extensions
    interval: f32,
    /// Extensions granted within the current green
    extensions_granted: u32,
}

/// Extensions are only considered this close to the end of green
const EXTENSION_THRESHOLD: f32 = 2.0;

impl SignalController {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            state: ControllerState::Green(ApproachGroup::Primary),
            elapsed: 0.0,
            interval: config.primary.green,
            extensions_granted: 0,
        }
    }

    /// Advance the controller by `delta_secs`.
    ///
    /// Negative deltas are treated as zero. Leftover time past an interval
    /// boundary carries into the next interval, so the cycle length is exact
    /// regardless of tick granularity.
    pub fn advance(&mut self, delta_secs: f32, config: &SimConfig) {
        let mut remaining = delta_secs.max(0.0);

        while remaining > 0.0 {
            let left_in_interval = self.interval - self.elapsed;
            if remaining < left_in_interval {
                self.elapsed += remaining;
                break;
            }
            remaining -= left_in_interval;
            self.transition(config);
        }

        debug_assert!(self.elapsed <= self.interval);
    }

    fn transition(&mut self, config: &SimConfig) {
        self.elapsed = 0.0;
        match self.state {
            ControllerState::Green(group) => {
                self.state = ControllerState::Yellow(group);
                self.interval = config.yellow_time;
                self.extensions_granted = 0;
                debug!("signal: {:?} green -> yellow", group);
            }
            ControllerState::Yellow(group) => {
                self.state = ControllerState::AllRed {
                    next: group.conflicting(),
                };
                self.interval = config.all_red_time;
                debug!("signal: {:?} yellow -> all-red", group);
            }
            ControllerState::AllRed { next } => {
                self.state = ControllerState::Green(next);
                self.interval = self.base_green(next, config);
                debug!("signal: all-red -> {:?} green", next);
            }
        }
    }

    fn base_green(&self, group: ApproachGroup, config: &SimConfig) -> f32 {
        match group {
            ApproachGroup::Primary => config.primary.green,
            ApproachGroup::Secondary => config.secondary.green,
        }
    }

    fn max_green(&self, group: ApproachGroup, config: &SimConfig) -> f32 {
        match group {
            ApproachGroup::Primary => config.primary.max_green,
            ApproachGroup::Secondary => config.secondary.max_green,
        }
    }

    /// What this group's head sees right now
    pub fn phase(&self, group: ApproachGroup) -> SignalPhase {
        match self.state {
            ControllerState::Green(active) if active == group => SignalPhase::Green,
            ControllerState::Yellow(active) if active == group => SignalPhase::Yellow,
            ControllerState::AllRed { .. } => SignalPhase::AllRed,
            _ => SignalPhase::Red,
        }
    }

    /// The group currently holding green or yellow, if any
    pub fn active_group(&self) -> Option<ApproachGroup> {
        match self.state {
            ControllerState::Green(group) | ControllerState::Yellow(group) => Some(group),
            ControllerState::AllRed { .. } => None,
        }
    }

    /// Seconds until the current interval ends
    pub fn time_remaining(&self) -> f32 {
        (self.interval - self.elapsed).max(0.0)
    }

    /// Fraction of the current interval already elapsed, in 0..=1
    pub fn progress_fraction(&self) -> f32 {
        if self.interval > 0.0 {
            (self.elapsed / self.interval).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    /// Seconds until this group's head changes what it displays. While the
    /// conflicting group holds green, the red head only changes at the
    /// start of the all-red, one yellow after the green ends.
    pub fn time_until_change(&self, group: ApproachGroup, config: &SimConfig) -> f32 {
        let remaining = self.time_remaining();
        match self.state {
            ControllerState::Green(active) if active != group => remaining + config.yellow_time,
            _ => remaining,
        }
    }

    /// Guaranteed seconds the named group stays hard-stopped from now,
    /// zero while it is green or yellow. Extensions granted to the
    /// conflicting green only lengthen the real window, so this is a
    /// floor.
    pub fn stop_time_remaining(&self, group: ApproachGroup, config: &SimConfig) -> f32 {
        let remaining = self.time_remaining();
        match self.state {
            ControllerState::Green(active) => {
                if active == group {
                    0.0
                } else {
                    remaining + config.yellow_time + config.all_red_time
                }
            }
            ControllerState::Yellow(active) => {
                if active == group {
                    0.0
                } else {
                    remaining + config.all_red_time
                }
            }
            ControllerState::AllRed { next } => {
                if next == group {
                    remaining
                } else {
                    remaining
                        + self.base_green(next, config)
                        + config.yellow_time
                        + config.all_red_time
                }
            }
        }
    }

    /// Request a green extension for `group` because `demand` vehicles are
    /// still queued or approaching. Granted only while that group holds
    /// green, the interval is nearly over, and both the extension count and
    /// the configured maximum green allow it. The caps keep the conflicting
    /// group from starving. Returns true when the extension was granted.
    pub fn request_extension(
        &mut self,
        group: ApproachGroup,
        demand: usize,
        config: &SimConfig,
    ) -> bool {
        if demand == 0 || self.state != ControllerState::Green(group) {
            return false;
        }
        if self.time_remaining() > EXTENSION_THRESHOLD {
            return false;
        }
        if self.extensions_granted >= config.max_extensions {
            return false;
        }
        let max = self.max_green(group, config);
        if self.interval + config.extension_time > max {
            return false;
        }
        self.interval += config.extension_time;
        self.extensions_granted += 1;
        debug!(
            "signal: extended {:?} green to {:.1}s ({} extensions)",
            group, self.interval, self.extensions_granted
        );
        true
    }

    /// True while the named group may be entered, false otherwise.
    /// Convenience over `phase(group).can_proceed()`.
    pub fn can_proceed(&self, group: ApproachGroup) -> bool {
        self.phase(group).can_proceed()
    }

    /// True while the named group is hard-stopped (red or all-red)
    pub fn must_stop(&self, group: ApproachGroup) -> bool {
        self.phase(group).must_stop()
    }

    /// Conflicting groups are never simultaneously permissive; checked in
    /// debug builds after every tick
    pub fn check_mutual_exclusion(&self) {
        let permissive = |phase: SignalPhase| {
            matches!(phase, SignalPhase::Green | SignalPhase::Yellow)
        };
        let primary = self.phase(ApproachGroup::Primary);
        let secondary = self.phase(ApproachGroup::Secondary);
        debug_assert!(
            !(permissive(primary) && permissive(secondary)),
            "both groups permissive: {:?} / {:?}",
            primary,
            secondary
        );
    }
}
