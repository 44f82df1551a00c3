//! Simulation clock: owns the tick counter.

use crate::types::{RunId, Tick};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub run_id:       RunId,
    /// Ticks completed so far. 0 until the first sweep.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            current_tick: 0,
        }
    }

    /// Advance one tick. Returns the new tick number.
    pub fn advance(&mut self) -> Tick {
        self.current_tick += 1;
        self.current_tick
    }

    /// True when the current tick lands on a multiple of `interval`.
    pub fn on_interval(&self, interval: Tick) -> bool {
        interval > 0 && self.current_tick > 0 && self.current_tick % interval == 0
    }
}
