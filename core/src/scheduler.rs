//! Random activation: every agent, once per tick, in a fresh order.
//!
//! RULES:
//!   - The visitation order is an explicit shuffled index array,
//!     drawn anew every tick and never reused.
//!   - No agent is skipped on account of its state; dead agents get a
//!     no-op call.
//!   - Agents never read or write each other during a sweep.

use crate::{
    agent::Transition,
    config::ModelConfig,
    population::Population,
    rng::RandomSource,
    types::AgentId,
};

/// Everything one sweep did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepOutcome {
    /// The order agents were visited in.
    pub order: Vec<AgentId>,
    /// State changes, in visitation order.
    pub transitions: Vec<(AgentId, Transition)>,
}

/// A uniform random permutation of `0..n`.
pub fn activation_order<R: RandomSource + ?Sized>(n: usize, rng: &mut R) -> Vec<AgentId> {
    let mut order: Vec<AgentId> = (0..n).collect();
    rng.shuffle(&mut order);
    order
}

/// One full sweep. `order_rng` draws the permutation, `transition_rng`
/// feeds the agents' mortality draws.
pub fn sweep<O, T>(
    population: &mut Population,
    config: &ModelConfig,
    order_rng: &mut O,
    transition_rng: &mut T,
) -> SweepOutcome
where
    O: RandomSource + ?Sized,
    T: RandomSource + ?Sized,
{
    let order = activation_order(population.len(), order_rng);
    let transitions = visit(population, &order, config, transition_rng);
    SweepOutcome { order, transitions }
}

/// Run `num_steps` sweeps through a single stream.
pub fn advance<R: RandomSource + ?Sized>(
    population: &mut Population,
    config: &ModelConfig,
    rng: &mut R,
    num_steps: u64,
) {
    for _ in 0..num_steps {
        let order = activation_order(population.len(), rng);
        visit(population, &order, config, rng);
    }
}

fn visit<R: RandomSource + ?Sized>(
    population: &mut Population,
    order: &[AgentId],
    config: &ModelConfig,
    rng: &mut R,
) -> Vec<(AgentId, Transition)> {
    let agents = population.agents_mut();
    let mut transitions = Vec::new();
    for &id in order {
        if let Some(t) = agents[id].transition(config, rng) {
            log::trace!("agent {id}: {t:?}");
            transitions.push((id, t));
        }
    }
    transitions
}
