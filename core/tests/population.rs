//! Population generation tests.

use flusim_core::{
    agent::{InfectionStatus, VaccinationStatus},
    config::ModelConfig,
    error::SimError,
    population,
};

fn config(num_agents: usize, vaccination_rate: f64) -> ModelConfig {
    ModelConfig {
        num_agents,
        vaccination_rate,
        ..ModelConfig::flu_default()
    }
}

#[test]
fn initial_population_has_sequential_ids_and_is_susceptible() {
    let pop = population::initialize(&config(250, 0.5), 42).unwrap();
    assert_eq!(pop.len(), 250);
    for (i, agent) in pop.iter().enumerate() {
        assert_eq!(agent.id(), i);
        assert_eq!(agent.infection_status(), InfectionStatus::Susceptible);
        assert_eq!(agent.exposure_timer(), 0);
        assert_eq!(agent.recovery_timer(), 0);
    }
}

#[test]
fn attributes_follow_configured_normals() {
    let pop = population::initialize(&config(10_000, 0.5), 123).unwrap();
    let n = pop.len() as f64;

    let mean_age = pop.iter().map(|a| a.age).sum::<f64>() / n;
    let mean_health = pop.iter().map(|a| a.health_status).sum::<f64>() / n;
    let sd_age = (pop.iter().map(|a| (a.age - mean_age).powi(2)).sum::<f64>() / n).sqrt();

    assert!((mean_age - 40.0).abs() < 0.5, "mean age {mean_age:.2}");
    assert!((sd_age - 10.0).abs() < 0.5, "age sd {sd_age:.2}");
    assert!((mean_health - 1.0).abs() < 0.01, "mean health {mean_health:.3}");
}

#[test]
fn vaccination_share_tracks_rate() {
    let pop = population::initialize(&config(10_000, 0.5), 7).unwrap();
    let vaccinated = pop.iter().filter(|a| a.is_vaccinated()).count();
    // sd = 50; allow 4 sd.
    assert!(
        (4_800..=5_200).contains(&vaccinated),
        "Expected ~5000 vaccinated, got {vaccinated}"
    );
}

#[test]
fn vaccination_rate_extremes_are_exact() {
    let none = population::initialize(&config(500, 0.0), 1).unwrap();
    assert!(none
        .iter()
        .all(|a| a.vaccination_status() == VaccinationStatus::Unvaccinated));

    let all = population::initialize(&config(500, 1.0), 1).unwrap();
    assert!(all.iter().all(|a| a.is_vaccinated()));
}

#[test]
fn same_seed_same_population() {
    let a = population::initialize(&config(100, 0.5), 99).unwrap();
    let b = population::initialize(&config(100, 0.5), 99).unwrap();
    assert_eq!(a, b);
}

#[test]
fn invalid_config_refuses_to_initialize() {
    let err = population::initialize(&config(0, 0.5), 1).unwrap_err();
    assert!(
        matches!(err, SimError::InvalidConfig { field: "num_agents", .. }),
        "got {err:?}"
    );
}

#[test]
fn shipped_scenario_matches_builtin_default() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../data/scenarios/flu.json");
    assert_eq!(ModelConfig::load(path).unwrap(), ModelConfig::flu_default());
}

#[test]
fn missing_scenario_file_is_an_error() {
    let err = ModelConfig::load("/nonexistent/scenario.json").unwrap_err();
    assert!(matches!(err, SimError::Other(_)), "got {err:?}");
}
