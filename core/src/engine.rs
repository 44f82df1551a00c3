//! The simulation engine — owns one run from initialization to the last tick.
//!
//! TICK ORDER (fixed, documented, never reordered):
//!   1. Interventions queued for this boundary, in queue order
//!   2. Clock advances to tick t
//!   3. Scheduler sweep: fresh activation order, one transition per agent
//!   4. Statistics collected and recorded
//!   5. Events persisted; snapshot every SNAPSHOT_INTERVAL ticks
//!
//! RULES:
//!   - The population is owned here and nowhere else.
//!   - All randomness flows through the RngBank.
//!   - All state changes are recorded in the event log.

use crate::{
    agent::Transition,
    clock::SimClock,
    command::{Intervention, QueuedIntervention},
    config::{check_rate, ModelConfig},
    error::{SimError, SimResult},
    event::{EventLogEntry, SimEvent},
    population::{self, Population},
    rng::{RandomSource, RngBank, RngSlot, SimRng},
    scheduler::{self, SweepOutcome},
    snapshot::{SimSnapshot, SNAPSHOT_INTERVAL},
    stats::{collect_statistics, AgentCounts},
    store::SimStore,
    types::{AgentId, RunId, Tick},
};

/// The capability set a driver needs from a model.
pub trait Model {
    fn configuration(&self) -> &ModelConfig;
    fn population(&self) -> &Population;
    fn advance(&mut self, num_steps: u64) -> SimResult<()>;
}

pub struct SimEngine {
    pub run_id:       RunId,
    pub clock:        SimClock,
    pub rng_bank:     RngBank,
    config:           ModelConfig,
    population:       Population,
    intervention_rng: SimRng,
    pending:          Vec<QueuedIntervention>,
    /// Counts after every completed tick; index 0 is the initial state.
    history:          Vec<AgentCounts>,
    last_sweep:       SweepOutcome,
    store:            Option<SimStore>,
}

impl SimEngine {
    /// Validate `config` and generate the population. No persistence.
    pub fn new(run_id: RunId, seed: u64, config: ModelConfig) -> SimResult<Self> {
        let population = population::initialize(&config, seed)?;
        let rng_bank = RngBank::new(seed);
        let initial = collect_statistics(&population);
        log::info!(
            "run={run_id} initialized: {} agents, seed={seed}, counts={initial:?}",
            population.len()
        );
        Ok(Self {
            clock: SimClock::new(run_id.clone()),
            intervention_rng: rng_bank.for_slot(RngSlot::Intervention),
            rng_bank,
            config,
            population,
            pending: Vec::new(),
            history: vec![initial],
            last_sweep: SweepOutcome::default(),
            store: None,
            run_id,
        })
    }

    /// Like `new`, but records the run, its events, per-tick statistics
    /// and periodic snapshots in `store`.
    pub fn with_store(
        run_id: RunId,
        seed: u64,
        config: ModelConfig,
        store: SimStore,
    ) -> SimResult<Self> {
        let mut engine = Self::new(run_id, seed, config)?;
        store.migrate()?;
        store.insert_run(
            &engine.run_id,
            seed,
            env!("CARGO_PKG_VERSION"),
            &serde_json::to_string(&engine.config)?,
        )?;
        store.record_statistics(&engine.run_id, 0, &engine.history[0])?;
        engine.store = Some(store);
        engine.persist(
            0,
            &[SimEvent::RunInitialized {
                run_id: engine.run_id.clone(),
                seed,
            }],
        )?;
        Ok(engine)
    }

    /// Small config, in-memory store. For tests.
    pub fn build_test(run_id: RunId, seed: u64) -> SimResult<Self> {
        Self::with_store(run_id, seed, ModelConfig::default_test(), SimStore::in_memory()?)
    }

    // ── Accessors ──────────────────────────────────────────────

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn current_tick(&self) -> Tick {
        self.clock.current_tick
    }

    /// Counts for the population as it is right now.
    pub fn statistics(&self) -> AgentCounts {
        collect_statistics(&self.population)
    }

    /// Counts after every completed tick; index 0 is the initial state.
    pub fn history(&self) -> &[AgentCounts] {
        &self.history
    }

    /// The visitation order of the most recent sweep.
    pub fn last_activation_order(&self) -> &[AgentId] {
        &self.last_sweep.order
    }

    pub fn store(&self) -> Option<&SimStore> {
        self.store.as_ref()
    }

    pub fn pending_interventions(&self) -> &[QueuedIntervention] {
        &self.pending
    }

    // ── Interventions ──────────────────────────────────────────

    /// Apply an intervention now, at the current tick boundary.
    pub fn apply(&mut self, intervention: &Intervention) -> SimResult<Vec<SimEvent>> {
        let tick = self.clock.current_tick;
        let events = self.apply_intervention(intervention)?;
        log::debug!(
            "tick={tick} intervention {}: {} agents affected",
            intervention.name(),
            events.len()
        );
        if events.is_empty() {
            log::warn!("tick={tick} intervention {} affected no agents", intervention.name());
        }
        self.persist(tick, &events)?;
        Ok(events)
    }

    /// Queue an intervention for the boundary after `at_tick` ticks have
    /// completed. A tick already in the past means "before the next sweep".
    /// Rejected up front if it could not be applied.
    pub fn schedule(&mut self, at_tick: Tick, intervention: Intervention) -> SimResult<()> {
        self.check_intervention(&intervention)?;
        self.pending.push(QueuedIntervention { at_tick, intervention });
        Ok(())
    }

    pub fn infect(&mut self, agent_id: AgentId) -> SimResult<()> {
        self.apply(&Intervention::Infect { agent_ids: vec![agent_id] })?;
        Ok(())
    }

    pub fn vaccinate(&mut self, agent_id: AgentId) -> SimResult<()> {
        self.apply(&Intervention::Vaccinate { agent_ids: vec![agent_id] })?;
        Ok(())
    }

    fn apply_intervention(&mut self, intervention: &Intervention) -> SimResult<Vec<SimEvent>> {
        self.check_intervention(intervention)?;
        let tick = self.clock.current_tick;
        let mut events = Vec::new();
        match intervention {
            Intervention::Infect { agent_ids } => {
                for &agent_id in agent_ids {
                    self.population.agent_mut(agent_id)?.mark_infected();
                    events.push(SimEvent::AgentInfected { tick, agent_id });
                }
            }
            Intervention::Vaccinate { agent_ids } => {
                for &agent_id in agent_ids {
                    self.population.agent_mut(agent_id)?.mark_vaccinated();
                    events.push(SimEvent::AgentVaccinated { tick, agent_id });
                }
            }
            Intervention::SeedInfections { count } => {
                let mut candidates: Vec<AgentId> = self
                    .population
                    .iter()
                    .filter(|a| a.is_susceptible())
                    .map(|a| a.id())
                    .collect();
                if candidates.len() < *count {
                    log::warn!(
                        "tick={tick} seed_infections: asked for {count}, only {} susceptible",
                        candidates.len()
                    );
                }
                self.intervention_rng.shuffle(&mut candidates);
                candidates.truncate(*count);
                candidates.sort_unstable();
                for agent_id in candidates {
                    self.population.agent_mut(agent_id)?.mark_infected();
                    events.push(SimEvent::AgentInfected { tick, agent_id });
                }
            }
            Intervention::VaccinationCampaign { coverage } => {
                let rng = &mut self.intervention_rng;
                for agent in self.population.agents_mut() {
                    if !agent.is_vaccinated() && rng.chance(*coverage) {
                        agent.mark_vaccinated();
                        events.push(SimEvent::AgentVaccinated {
                            tick,
                            agent_id: agent.id(),
                        });
                    }
                }
            }
        }
        Ok(events)
    }

    /// Everything that can make an intervention fail before it touches an
    /// agent. Id lists are all-or-nothing: one unknown id rejects the list.
    fn check_intervention(&self, intervention: &Intervention) -> SimResult<()> {
        match intervention {
            Intervention::Infect { agent_ids } | Intervention::Vaccinate { agent_ids } => {
                match agent_ids.iter().find(|&&id| id >= self.population.len()) {
                    Some(&agent_id) => Err(SimError::AgentNotFound { agent_id }),
                    None => Ok(()),
                }
            }
            Intervention::VaccinationCampaign { coverage } => check_rate("coverage", *coverage),
            Intervention::SeedInfections { .. } => Ok(()),
        }
    }

    /// Apply due interventions in queue order. On failure, the failing
    /// intervention and everything after it go back on the queue.
    fn apply_due_interventions(&mut self) -> SimResult<()> {
        let now = self.clock.current_tick;
        let (due, later): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.pending).into_iter().partition(|q| q.at_tick <= now);
        self.pending = later;
        for (i, queued) in due.iter().enumerate() {
            if let Err(e) = self.apply(&queued.intervention) {
                let mut unapplied = due[i..].to_vec();
                unapplied.append(&mut self.pending);
                self.pending = unapplied;
                return Err(e);
            }
        }
        Ok(())
    }

    // ── Ticking ────────────────────────────────────────────────

    /// Advance one tick. This is the core simulation step.
    fn tick(&mut self) -> SimResult<Vec<SimEvent>> {
        self.apply_due_interventions()?;

        let current_tick = self.clock.advance();
        let mut tick_events = vec![SimEvent::TickStarted { tick: current_tick }];

        let mut order_rng = self.rng_bank.for_slot_at_tick(RngSlot::Scheduler, current_tick);
        let mut transition_rng = self.rng_bank.for_slot_at_tick(RngSlot::Transition, current_tick);
        let sweep = scheduler::sweep(
            &mut self.population,
            &self.config,
            &mut order_rng,
            &mut transition_rng,
        );
        tick_events.extend(sweep.transitions.iter().map(|&(agent_id, t)| match t {
            Transition::Died => SimEvent::AgentDied { tick: current_tick, agent_id },
            Transition::Recovered => SimEvent::AgentRecovered { tick: current_tick, agent_id },
            Transition::ImmunityWaned => SimEvent::ImmunityWaned { tick: current_tick, agent_id },
        }));
        self.last_sweep = sweep;

        let counts = collect_statistics(&self.population);
        debug_assert_eq!(counts.total(), self.population.len());
        self.history.push(counts);
        tick_events.push(SimEvent::StatisticsRecorded { tick: current_tick, counts });
        tick_events.push(SimEvent::TickCompleted { tick: current_tick });

        log::debug!(
            "tick={current_tick} S={} V={} I={} R={} D={}",
            counts.susceptible,
            counts.vaccinated,
            counts.infected,
            counts.recovered,
            counts.dead
        );

        self.persist(current_tick, &tick_events)?;
        if let Some(store) = &self.store {
            store.record_statistics(&self.run_id, current_tick, &counts)?;
        }
        if self.clock.on_interval(SNAPSHOT_INTERVAL) {
            self.take_snapshot(current_tick, counts)?;
        }

        Ok(tick_events)
    }

    /// Run exactly one tick and return its events.
    pub fn step(&mut self) -> SimResult<Vec<SimEvent>> {
        self.tick()
    }

    /// Run n ticks in a loop. No early termination; stops at the first error.
    pub fn run_ticks(&mut self, n: u64) -> SimResult<()> {
        for _ in 0..n {
            self.tick()?;
        }
        Ok(())
    }

    fn persist(&mut self, tick: Tick, events: &[SimEvent]) -> SimResult<()> {
        let Some(store) = self.store.as_mut() else {
            return Ok(());
        };
        let entries = events
            .iter()
            .map(|e| EventLogEntry::from_event(&self.run_id, tick, e))
            .collect::<Result<Vec<_>, _>>()?;
        store.append_events(&entries)
    }

    fn take_snapshot(&self, tick: Tick, counts: AgentCounts) -> SimResult<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let snapshot = SimSnapshot {
            run_id: self.run_id.clone(),
            tick,
            clock: self.clock.clone(),
            counts,
            population: self.population.clone(),
        };
        let json = serde_json::to_string(&snapshot)?;
        store.save_snapshot(&self.run_id, tick, &json)?;
        log::debug!("Snapshot saved at tick {tick}");
        Ok(())
    }
}

impl Model for SimEngine {
    fn configuration(&self) -> &ModelConfig {
        &self.config
    }

    fn population(&self) -> &Population {
        &self.population
    }

    fn advance(&mut self, num_steps: u64) -> SimResult<()> {
        self.run_ticks(num_steps)
    }
}
