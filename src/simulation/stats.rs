//! Simulation statistics
//!
//! Standalone implementation that doesn't depend on any rendering layer.

use std::collections::HashMap;

use super::types::LaneId;

/// Counters for one lane
#[derive(Debug, Clone, Default)]
pub struct LaneStats {
    pub spawned: u64,
    pub completed: u64,
    /// Vehicles currently stopped in the lane
    pub waiting: usize,
    /// Largest simultaneous count of waiting vehicles observed
    pub max_queue: usize,
    /// Wait time folded in from vehicles that finished their trip
    pub total_wait_time: f32,
}

impl LaneStats {
    pub fn average_wait(&self) -> f32 {
        if self.completed > 0 {
            self.total_wait_time / self.completed as f32
        } else {
            0.0
        }
    }
}

/// Aggregate statistics across the whole simulation
#[derive(Debug, Clone, Default)]
pub struct SimStatistics {
    lanes: HashMap<LaneId, LaneStats>,
    pub total_spawned: u64,
    pub total_completed: u64,
    pub total_spawn_attempts: u64,
    pub total_spawn_blocked: u64,
    pub pedestrians_spawned: u64,
    pub pedestrians_completed: u64,
    pub elapsed_time: f32,
}

impl SimStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lane(&self, lane: &LaneId) -> Option<&LaneStats> {
        self.lanes.get(lane)
    }

    pub fn lanes(&self) -> impl Iterator<Item = (&LaneId, &LaneStats)> {
        self.lanes.iter()
    }

    pub fn record_spawn(&mut self, lane: LaneId) {
        self.total_spawned += 1;
        self.lanes.entry(lane).or_default().spawned += 1;
    }

    pub fn record_completion(&mut self, lane: LaneId, wait_time: f32) {
        self.total_completed += 1;
        let entry = self.lanes.entry(lane).or_default();
        entry.completed += 1;
        entry.total_wait_time += wait_time;
    }

    /// Per-tick queue observation for one lane. The queue is the waiting
    /// count, not the lane population; free-flowing vehicles don't queue.
    pub fn observe_lane(&mut self, lane: LaneId, waiting: usize) {
        let entry = self.lanes.entry(lane).or_default();
        entry.waiting = waiting;
        entry.max_queue = entry.max_queue.max(waiting);
    }

    pub fn average_wait(&self) -> f32 {
        let total: f32 = self.lanes.values().map(|l| l.total_wait_time).sum();
        if self.total_completed > 0 {
            total / self.total_completed as f32
        } else {
            0.0
        }
    }

    /// Completed vehicles per minute of simulated time
    pub fn throughput(&self) -> f32 {
        if self.elapsed_time > 0.0 {
            self.total_completed as f32 * 60.0 / self.elapsed_time
        } else {
            0.0
        }
    }
}
