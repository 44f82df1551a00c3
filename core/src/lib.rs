//! flusim-core: a tick-driven agent-based flu simulator.
//!
//! A fixed population of agents moves through
//! susceptible → infected → recovered | dead, with recovered agents
//! losing their immunity after a fixed number of ticks. Every tick visits
//! every agent once, in a freshly shuffled order.
//!
//! The three core operations are free functions:
//!   - [`population::initialize`]: config + seed → population
//!   - [`scheduler::advance`]: sweep the population n times
//!   - [`stats::collect_statistics`]: population → category counts
//!
//! [`engine::SimEngine`] wraps them with a clock, interventions, an event
//! log and optional SQLite persistence.

pub mod agent;
pub mod clock;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod population;
pub mod rng;
pub mod scheduler;
pub mod snapshot;
pub mod stats;
pub mod store;
pub mod types;
