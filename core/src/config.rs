use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Attribute distributions sampled once per agent at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographicsConfig {
    #[serde(default = "default_age_mean")]
    pub age_mean: f64,
    #[serde(default = "default_age_sd")]
    pub age_sd: f64,
    #[serde(default = "default_health_mean")]
    pub health_mean: f64,
    #[serde(default = "default_health_sd")]
    pub health_sd: f64,
}

fn default_age_mean() -> f64 {
    40.0
}

fn default_age_sd() -> f64 {
    10.0
}

fn default_health_mean() -> f64 {
    1.0
}

fn default_health_sd() -> f64 {
    0.1
}

impl Default for DemographicsConfig {
    fn default() -> Self {
        Self {
            age_mean: default_age_mean(),
            age_sd: default_age_sd(),
            health_mean: default_health_mean(),
            health_sd: default_health_sd(),
        }
    }
}

/// Immutable model parameters for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub num_agents: usize,
    /// Ticks an agent stays infected before recovering or dying.
    pub exposure_duration: u64,
    /// Ticks an agent stays recovered before immunity wanes.
    pub recovery_duration: u64,
    pub mortality_rate: f64,
    pub vaccination_rate: f64,
    #[serde(default)]
    pub demographics: DemographicsConfig,
}

impl ModelConfig {
    /// Load a scenario file and validate it.
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> SimResult<Self> {
        let raw: serde_json::Value = serde_json::from_str(content)?;
        // Negative counts would otherwise surface as a type error.
        for field in ["num_agents", "exposure_duration", "recovery_duration"] {
            if let Some(n) = raw.get(field).and_then(|v| v.as_i64()) {
                if n <= 0 {
                    return Err(SimError::invalid(field, format!("must be > 0, got {n}")));
                }
            }
        }
        let config: Self = serde_json::from_value(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// The canonical seasonal flu scenario.
    pub fn flu_default() -> Self {
        Self {
            num_agents: 1000,
            exposure_duration: 7,
            recovery_duration: 14,
            mortality_rate: 0.03,
            vaccination_rate: 0.5,
            demographics: DemographicsConfig::default(),
        }
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self {
            num_agents: 100,
            exposure_duration: 3,
            recovery_duration: 5,
            mortality_rate: 0.1,
            vaccination_rate: 0.5,
            demographics: DemographicsConfig::default(),
        }
    }

    /// Reject any configuration the run must not start with.
    pub fn validate(&self) -> SimResult<()> {
        if self.num_agents == 0 {
            return Err(SimError::invalid("num_agents", "must be > 0"));
        }
        if self.exposure_duration == 0 {
            return Err(SimError::invalid("exposure_duration", "must be > 0"));
        }
        if self.recovery_duration == 0 {
            return Err(SimError::invalid("recovery_duration", "must be > 0"));
        }
        check_rate("mortality_rate", self.mortality_rate)?;
        check_rate("vaccination_rate", self.vaccination_rate)?;

        let d = &self.demographics;
        check_finite("demographics.age_mean", d.age_mean)?;
        check_finite("demographics.health_mean", d.health_mean)?;
        check_sd("demographics.age_sd", d.age_sd)?;
        check_sd("demographics.health_sd", d.health_sd)?;
        Ok(())
    }
}

pub(crate) fn check_rate(field: &'static str, value: f64) -> SimResult<()> {
    // NaN fails the range check.
    if !(0.0..=1.0).contains(&value) {
        return Err(SimError::invalid(field, format!("must be in [0, 1], got {value}")));
    }
    Ok(())
}

fn check_finite(field: &'static str, value: f64) -> SimResult<()> {
    if !value.is_finite() {
        return Err(SimError::invalid(field, format!("must be finite, got {value}")));
    }
    Ok(())
}

fn check_sd(field: &'static str, value: f64) -> SimResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SimError::invalid(
            field,
            format!("must be finite and >= 0, got {value}"),
        ));
    }
    Ok(())
}
