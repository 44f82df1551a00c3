//! Population generation and ownership.
//!
//! The population is created once and never grows or shrinks:
//! dead agents stay in place with `InfectionStatus::Dead`.

use crate::{
    agent::{Agent, VaccinationStatus},
    config::ModelConfig,
    error::{SimError, SimResult},
    rng::{RandomSource, RngBank, RngSlot},
    types::AgentId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Population {
    agents: Vec<Agent>,
}

impl Population {
    /// Generate `config.num_agents` agents from the given stream.
    ///
    /// Per agent, in id order: age, health status, then the vaccination
    /// roll. The draw order is part of the reproducibility contract.
    pub fn generate<R: RandomSource + ?Sized>(config: &ModelConfig, rng: &mut R) -> Self {
        let d = &config.demographics;
        let agents = (0..config.num_agents)
            .map(|id| {
                let age = rng.normal(d.age_mean, d.age_sd);
                let health_status = rng.normal(d.health_mean, d.health_sd);
                let vaccination_status = if rng.chance(config.vaccination_rate) {
                    VaccinationStatus::Vaccinated
                } else {
                    VaccinationStatus::Unvaccinated
                };
                Agent::new(id, age, health_status, vaccination_status)
            })
            .collect();
        Self { agents }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> SimResult<&mut Agent> {
        self.agents
            .get_mut(id)
            .ok_or(SimError::AgentNotFound { agent_id: id })
    }

    pub(crate) fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }
}

/// Validate `config` and build the population from `seed`.
///
/// Same config and seed always produce the same population.
pub fn initialize(config: &ModelConfig, seed: u64) -> SimResult<Population> {
    config.validate()?;
    let mut rng = RngBank::new(seed).for_slot(RngSlot::Population);
    let population = Population::generate(config, &mut rng);
    log::info!(
        "population: generated {} agents (seed={seed}, vaccination_rate={})",
        population.len(),
        config.vaccination_rate
    );
    Ok(population)
}
