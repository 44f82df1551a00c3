//! The event log — every state change the engine makes.
//!
//! RULE: Anything that changes an agent's state emits an event.
//! Two runs with the same seed and interventions produce identical logs.

use crate::{
    stats::AgentCounts,
    types::{AgentId, RunId, Tick},
};
use serde::{Deserialize, Serialize};

/// Every event emitted during simulation.
/// Variants are appended — never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine events ──────────────────────────────
    RunInitialized {
        run_id: RunId,
        seed: u64,
    },
    TickStarted {
        tick: Tick,
    },
    TickCompleted {
        tick: Tick,
    },

    // ── Interventions ──────────────────────────────
    AgentInfected {
        tick: Tick,
        agent_id: AgentId,
    },
    AgentVaccinated {
        tick: Tick,
        agent_id: AgentId,
    },

    // ── Disease progression ────────────────────────
    AgentRecovered {
        tick: Tick,
        agent_id: AgentId,
    },
    AgentDied {
        tick: Tick,
        agent_id: AgentId,
    },
    ImmunityWaned {
        tick: Tick,
        agent_id: AgentId,
    },

    // ── Statistics ─────────────────────────────────
    StatisticsRecorded {
        tick: Tick,
        counts: AgentCounts,
    },
}

impl SimEvent {
    /// Stable string name, used for the event_type column in event_log.
    pub fn type_name(&self) -> &'static str {
        match self {
            SimEvent::RunInitialized { .. }     => "run_initialized",
            SimEvent::TickStarted { .. }        => "tick_started",
            SimEvent::TickCompleted { .. }      => "tick_completed",
            SimEvent::AgentInfected { .. }      => "agent_infected",
            SimEvent::AgentVaccinated { .. }    => "agent_vaccinated",
            SimEvent::AgentRecovered { .. }     => "agent_recovered",
            SimEvent::AgentDied { .. }          => "agent_died",
            SimEvent::ImmunityWaned { .. }      => "immunity_waned",
            SimEvent::StatisticsRecorded { .. } => "statistics_recorded",
        }
    }

    /// The component that emits this kind of event.
    pub fn source(&self) -> &'static str {
        match self {
            SimEvent::RunInitialized { .. }
            | SimEvent::TickStarted { .. }
            | SimEvent::TickCompleted { .. } => "engine",
            SimEvent::AgentInfected { .. } | SimEvent::AgentVaccinated { .. } => "intervention",
            SimEvent::AgentRecovered { .. }
            | SimEvent::AgentDied { .. }
            | SimEvent::ImmunityWaned { .. } => "scheduler",
            SimEvent::StatisticsRecorded { .. } => "statistics",
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub run_id: RunId,
    pub tick: Tick,
    pub source: String,
    pub event_type: String,
    pub payload: String, // JSON-serialized SimEvent
}

impl EventLogEntry {
    pub fn from_event(run_id: &str, tick: Tick, event: &SimEvent) -> serde_json::Result<Self> {
        Ok(Self {
            id: None,
            run_id: run_id.to_string(),
            tick,
            source: event.source().to_string(),
            event_type: event.type_name().to_string(),
            payload: serde_json::to_string(event)?,
        })
    }
}
