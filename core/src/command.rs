use crate::types::{AgentId, Tick};
use serde::{Deserialize, Serialize};

/// Externally issued actions, applied between ticks.
/// Variants are appended — never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Intervention {
    /// Mark the listed agents infected, whatever their current state.
    Infect { agent_ids: Vec<AgentId> },

    /// Mark the listed agents vaccinated.
    Vaccinate { agent_ids: Vec<AgentId> },

    /// Infect `count` distinct agents drawn uniformly from the currently
    /// susceptible ones (all of them if fewer are available).
    SeedInfections { count: usize },

    /// Vaccinate each unvaccinated agent with probability `coverage`.
    VaccinationCampaign { coverage: f64 },
}

impl Intervention {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Infect { .. } => "infect",
            Self::Vaccinate { .. } => "vaccinate",
            Self::SeedInfections { .. } => "seed_infections",
            Self::VaccinationCampaign { .. } => "vaccination_campaign",
        }
    }
}

/// An intervention waiting for the clock to reach `at_tick`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueuedIntervention {
    /// Applied once `at_tick` ticks have completed, before the next sweep.
    pub at_tick:      Tick,
    pub intervention: Intervention,
}
