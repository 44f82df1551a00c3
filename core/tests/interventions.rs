//! Externally triggered infections and vaccinations.

use flusim_core::{
    command::Intervention,
    config::ModelConfig,
    engine::SimEngine,
    error::SimError,
    event::SimEvent,
};

fn engine(seed: u64) -> SimEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    SimEngine::build_test(format!("interventions-{seed}"), seed).unwrap()
}

fn infected_count(engine: &SimEngine) -> usize {
    engine.population().iter().filter(|a| a.is_infected()).count()
}

#[test]
fn infect_marks_listed_agents() {
    let mut e = engine(1);
    let events = e
        .apply(&Intervention::Infect { agent_ids: vec![3, 7, 11] })
        .unwrap();

    assert_eq!(events.len(), 3);
    assert!(events.contains(&SimEvent::AgentInfected { tick: 0, agent_id: 7 }));
    assert_eq!(infected_count(&e), 3);
}

#[test]
fn unknown_agent_id_rejects_the_whole_list() {
    let mut e = engine(2);
    let err = e
        .apply(&Intervention::Infect { agent_ids: vec![1, 2, 1000] })
        .unwrap_err();

    assert!(
        matches!(err, SimError::AgentNotFound { agent_id: 1000 }),
        "got {err:?}"
    );
    assert_eq!(infected_count(&e), 0, "No agent may be touched on rejection");
}

#[test]
fn vaccinate_is_idempotent_and_leaves_infection_alone() {
    let mut e = engine(3);
    e.infect(5).unwrap();
    e.vaccinate(5).unwrap();
    e.vaccinate(5).unwrap();

    let agent = e.population().get(5).unwrap();
    assert!(agent.is_vaccinated());
    assert!(agent.is_infected());
}

#[test]
fn seed_infections_infects_exactly_count_susceptibles() {
    let mut e = engine(4);
    let events = e.apply(&Intervention::SeedInfections { count: 25 }).unwrap();

    assert_eq!(events.len(), 25);
    assert_eq!(infected_count(&e), 25);
}

#[test]
fn seed_infections_caps_at_available_susceptibles() {
    let mut e = engine(5);
    let n = e.population().len();
    e.apply(&Intervention::SeedInfections { count: n - 10 }).unwrap();

    let events = e.apply(&Intervention::SeedInfections { count: 50 }).unwrap();
    assert_eq!(events.len(), 10);
    assert_eq!(infected_count(&e), n);

    let none = e.apply(&Intervention::SeedInfections { count: 5 }).unwrap();
    assert!(none.is_empty());
}

#[test]
fn full_coverage_campaign_vaccinates_everyone() {
    let mut e = engine(6);
    e.apply(&Intervention::VaccinationCampaign { coverage: 1.0 }).unwrap();
    assert!(e.population().iter().all(|a| a.is_vaccinated()));

    let again = e.apply(&Intervention::VaccinationCampaign { coverage: 1.0 }).unwrap();
    assert!(again.is_empty(), "Already vaccinated agents are skipped");
}

#[test]
fn campaign_coverage_out_of_range_is_rejected() {
    let mut e = engine(7);
    let before = e.population().clone();
    let err = e
        .apply(&Intervention::VaccinationCampaign { coverage: 1.5 })
        .unwrap_err();

    assert!(
        matches!(err, SimError::InvalidConfig { field: "coverage", .. }),
        "got {err:?}"
    );
    assert_eq!(e.population(), &before);
}

/// Queued for tick 5: applied at the boundary after tick 5, before tick 6.
#[test]
fn scheduled_intervention_applies_before_the_next_sweep() {
    let mut e = engine(8);
    e.schedule(5, Intervention::Infect { agent_ids: vec![0] }).unwrap();
    assert_eq!(e.pending_interventions().len(), 1);

    e.run_ticks(5).unwrap();
    assert!(!e.population().get(0).unwrap().is_infected());
    assert_eq!(e.pending_interventions().len(), 1);

    e.step().unwrap();
    let agent = e.population().get(0).unwrap();
    assert!(agent.is_infected());
    assert_eq!(agent.exposure_timer(), 1, "Swept once during tick 6");
    assert!(e.pending_interventions().is_empty());

    let store = e.store().unwrap();
    let at_five = store.events_for_tick(&e.run_id, 5).unwrap();
    assert!(at_five.iter().any(|entry| entry.event_type == "agent_infected"));
}

#[test]
fn interventions_parse_from_json() {
    let json = r#"[
        {"action": "infect", "agent_ids": [1, 2]},
        {"action": "seed_infections", "count": 4},
        {"action": "vaccination_campaign", "coverage": 0.25}
    ]"#;
    let parsed: Vec<Intervention> = serde_json::from_str(json).unwrap();
    assert_eq!(parsed[0], Intervention::Infect { agent_ids: vec![1, 2] });
    assert_eq!(parsed[1], Intervention::SeedInfections { count: 4 });
    assert_eq!(parsed[2], Intervention::VaccinationCampaign { coverage: 0.25 });
}

#[test]
fn campaign_share_tracks_coverage() {
    let config = ModelConfig {
        num_agents: 4_000,
        vaccination_rate: 0.0,
        ..ModelConfig::default_test()
    };
    let mut e = SimEngine::new("campaign-share".into(), 9, config).unwrap();
    let events = e
        .apply(&Intervention::VaccinationCampaign { coverage: 0.25 })
        .unwrap();
    // Expected 1000, sd ≈ 27; allow 4 sd.
    assert!((890..=1_110).contains(&events.len()), "got {}", events.len());
}

#[test]
fn schedule_rejects_what_could_never_apply() {
    let mut e = engine(10);
    let err = e
        .schedule(1, Intervention::Infect { agent_ids: vec![9_999] })
        .unwrap_err();
    assert!(matches!(err, SimError::AgentNotFound { agent_id: 9_999 }), "got {err:?}");

    let err = e
        .schedule(1, Intervention::VaccinationCampaign { coverage: -0.1 })
        .unwrap_err();
    assert!(matches!(err, SimError::InvalidConfig { field: "coverage", .. }), "got {err:?}");
    assert!(e.pending_interventions().is_empty());

    // A rejected entry does not disturb the ones queued beside it.
    e.schedule(1, Intervention::Infect { agent_ids: vec![0] }).unwrap();
    e.run_ticks(2).unwrap();
    assert!(e.population().get(0).unwrap().is_infected());
    assert!(e.pending_interventions().is_empty());
}

#[test]
fn due_interventions_apply_in_queue_order() {
    let mut e = engine(11);
    e.schedule(1, Intervention::Infect { agent_ids: vec![0, 1] }).unwrap();
    e.schedule(1, Intervention::Vaccinate { agent_ids: vec![1] }).unwrap();
    e.schedule(3, Intervention::Infect { agent_ids: vec![2] }).unwrap();

    e.run_ticks(2).unwrap();
    assert_eq!(e.pending_interventions().len(), 1);
    assert_eq!(e.pending_interventions()[0].at_tick, 3);

    let logged: Vec<String> = e
        .store()
        .unwrap()
        .events_for_tick(&e.run_id, 1)
        .unwrap()
        .into_iter()
        .map(|entry| entry.event_type)
        .collect();
    let first_applied = logged.iter().position(|t| t == "agent_infected").unwrap();
    assert_eq!(
        logged[first_applied..first_applied + 3],
        ["agent_infected", "agent_infected", "agent_vaccinated"]
    );
}

/// A boundary already in the past means "before the next sweep".
#[test]
fn past_schedule_fires_at_the_next_boundary() {
    let mut e = engine(12);
    e.run_ticks(3).unwrap();
    e.schedule(1, Intervention::Vaccinate { agent_ids: vec![4] }).unwrap();

    e.step().unwrap();
    assert!(e.population().get(4).unwrap().is_vaccinated());

    let store = e.store().unwrap();
    let at_three = store.events_for_tick(&e.run_id, 3).unwrap();
    assert!(at_three.iter().any(|entry| entry.event_type == "agent_vaccinated"));
    let at_one = store.events_for_tick(&e.run_id, 1).unwrap();
    assert!(at_one.iter().all(|entry| entry.event_type != "agent_vaccinated"));
}
