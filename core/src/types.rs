//! Shared primitive types used across the entire simulation.

/// A simulation tick. One tick = one full sweep over the population.
pub type Tick = u64;

/// Index of an agent within its population. Stable for the run.
pub type AgentId = usize;

/// The canonical run identifier.
pub type RunId = String;
