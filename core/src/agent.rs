//! The per-agent epidemiological state machine.
//!
//! susceptible ──mark_infected──▶ infected ──(exposure_duration)──▶ recovered | dead
//!      ▲                                                              │
//!      └────────────────────(recovery_duration)───────────────────────┘
//!
//! Infection onset is always external (`mark_infected`); the timers drive
//! everything else. `dead` is terminal for the timer logic.

use crate::{config::ModelConfig, rng::RandomSource, types::AgentId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InfectionStatus {
    Susceptible,
    Infected,
    Recovered,
    Dead,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VaccinationStatus {
    Unvaccinated,
    Vaccinated,
}

/// What a single tick did to an agent, if anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Died,
    Recovered,
    ImmunityWaned,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    id: AgentId,
    /// Sampled once; may be negative.
    pub age: f64,
    /// Carried attribute. No transition reads it.
    pub health_status: f64,
    vaccination_status: VaccinationStatus,
    infection_status: InfectionStatus,
    exposure_timer: u64,
    recovery_timer: u64,
}

impl Agent {
    pub fn new(
        id: AgentId,
        age: f64,
        health_status: f64,
        vaccination_status: VaccinationStatus,
    ) -> Self {
        Self {
            id,
            age,
            health_status,
            vaccination_status,
            infection_status: InfectionStatus::Susceptible,
            exposure_timer: 0,
            recovery_timer: 0,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn infection_status(&self) -> InfectionStatus {
        self.infection_status
    }

    pub fn vaccination_status(&self) -> VaccinationStatus {
        self.vaccination_status
    }

    pub fn exposure_timer(&self) -> u64 {
        self.exposure_timer
    }

    pub fn recovery_timer(&self) -> u64 {
        self.recovery_timer
    }

    /// Advance this agent by one tick.
    ///
    /// Draws exactly one uniform sample, and only when the exposure timer
    /// reaches `exposure_duration`. Susceptible and dead agents are left
    /// untouched.
    pub fn transition<R: RandomSource + ?Sized>(
        &mut self,
        config: &ModelConfig,
        rng: &mut R,
    ) -> Option<Transition> {
        match self.infection_status {
            InfectionStatus::Infected => {
                self.exposure_timer += 1;
                if self.exposure_timer < config.exposure_duration {
                    return None;
                }
                if rng.next_f64() < config.mortality_rate {
                    // Terminal: the exposure timer is left as is.
                    self.infection_status = InfectionStatus::Dead;
                    Some(Transition::Died)
                } else {
                    self.infection_status = InfectionStatus::Recovered;
                    self.exposure_timer = 0;
                    self.recovery_timer = 0;
                    Some(Transition::Recovered)
                }
            }
            InfectionStatus::Recovered => {
                self.recovery_timer += 1;
                if self.recovery_timer < config.recovery_duration {
                    return None;
                }
                self.infection_status = InfectionStatus::Susceptible;
                self.recovery_timer = 0;
                Some(Transition::ImmunityWaned)
            }
            InfectionStatus::Susceptible | InfectionStatus::Dead => None,
        }
    }

    pub fn mark_vaccinated(&mut self) {
        self.vaccination_status = VaccinationStatus::Vaccinated;
    }

    /// Unconditional, from any state (dead included).
    pub fn mark_infected(&mut self) {
        if self.infection_status == InfectionStatus::Recovered {
            self.recovery_timer = 0;
        }
        self.infection_status = InfectionStatus::Infected;
    }

    pub fn is_susceptible(&self) -> bool {
        self.infection_status == InfectionStatus::Susceptible
    }

    pub fn is_vaccinated(&self) -> bool {
        self.vaccination_status == VaccinationStatus::Vaccinated
    }

    /// True only while actively infected, not once recovered or dead.
    pub fn is_infected(&self) -> bool {
        self.infection_status == InfectionStatus::Infected
    }

    pub fn is_dead(&self) -> bool {
        self.infection_status == InfectionStatus::Dead
    }
}
