//! Snapshot serialization — full simulation state to/from JSON.
//!
//! A snapshot is taken every SNAPSHOT_INTERVAL ticks when a store is
//! attached. It captures the clock, the counts and every agent.

use crate::{
    clock::SimClock,
    population::Population,
    stats::AgentCounts,
    types::{RunId, Tick},
};
use serde::{Deserialize, Serialize};

pub const SNAPSHOT_INTERVAL: Tick = 7; // weekly

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimSnapshot {
    pub run_id:     RunId,
    pub tick:       Tick,
    pub clock:      SimClock,
    pub counts:     AgentCounts,
    pub population: Population,
}
