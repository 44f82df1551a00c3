//! Population category counts.
//!
//! Buckets are assigned by a priority chain, first match wins:
//!   susceptible → vaccinated → infected → recovered → dead
//! so a vaccinated agent is only counted as `vaccinated` once it is no
//! longer susceptible, and then never as infected/recovered/dead.

use crate::{
    agent::{Agent, InfectionStatus},
    population::Population,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Report categories, declared in output order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Susceptible,
    Vaccinated,
    Infected,
    Recovered,
    Dead,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Susceptible,
        Category::Vaccinated,
        Category::Infected,
        Category::Recovered,
        Category::Dead,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Susceptible => "susceptible",
            Self::Vaccinated => "vaccinated",
            Self::Infected => "infected",
            Self::Recovered => "recovered",
            Self::Dead => "dead",
        }
    }

    /// The bucket `agent` falls in.
    pub fn of(agent: &Agent) -> Category {
        if agent.is_susceptible() {
            Category::Susceptible
        } else if agent.is_vaccinated() {
            Category::Vaccinated
        } else {
            match agent.infection_status() {
                InfectionStatus::Infected => Category::Infected,
                InfectionStatus::Recovered => Category::Recovered,
                InfectionStatus::Dead => Category::Dead,
                // Caught by the first branch.
                InfectionStatus::Susceptible => Category::Susceptible,
            }
        }
    }
}

/// Counts per category. Serializes with keys in report order.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentCounts {
    pub susceptible: usize,
    pub vaccinated: usize,
    pub infected: usize,
    pub recovered: usize,
    pub dead: usize,
}

impl AgentCounts {
    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::Susceptible => self.susceptible,
            Category::Vaccinated => self.vaccinated,
            Category::Infected => self.infected,
            Category::Recovered => self.recovered,
            Category::Dead => self.dead,
        }
    }

    fn bump(&mut self, category: Category) {
        let slot = match category {
            Category::Susceptible => &mut self.susceptible,
            Category::Vaccinated => &mut self.vaccinated,
            Category::Infected => &mut self.infected,
            Category::Recovered => &mut self.recovered,
            Category::Dead => &mut self.dead,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        Category::ALL.iter().map(|c| self.get(*c)).sum()
    }

    /// `(category, count)` pairs in report order.
    pub fn entries(&self) -> [(Category, usize); 5] {
        Category::ALL.map(|c| (c, self.get(c)))
    }

    pub fn as_map(&self) -> BTreeMap<Category, usize> {
        self.entries().into_iter().collect()
    }
}

/// Scan the population once. Read-only; calling it twice on an unchanged
/// population yields the same counts.
pub fn collect_statistics(population: &Population) -> AgentCounts {
    population
        .iter()
        .fold(AgentCounts::default(), |mut counts, agent| {
            counts.bump(Category::of(agent));
            counts
        })
}
