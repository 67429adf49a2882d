use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TICK_MS: u64 = 2_000;
pub const TICK_ENV: &str = "PAI_DASHBOARD_TICK_MS";

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("probability {name} out of range: {value}")]
    Probability { name: &'static str, value: f64 },
    #[error("population bounds inverted: min {min} > max {max}")]
    PopulationBounds { min: usize, max: usize },
    #[error("initial population {initial} outside [{min}, {max}]")]
    InitialPopulation {
        initial: usize,
        min: usize,
        max: usize,
    },
    #[error("tick interval must be non-zero")]
    ZeroTick,
    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },
}

/// Per-tick odds driving the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionRates {
    /// Running drifts to Idle, Paused or Error.
    pub running_drift: f64,
    pub idle_resume: f64,
    pub paused_resume: f64,
    pub error_recover: f64,
    pub phase_advance: f64,
    pub isc_flip: f64,
    pub spawn: f64,
    pub collect: f64,
}

impl Default for TransitionRates {
    fn default() -> Self {
        Self {
            running_drift: 0.15,
            idle_resume: 0.30,
            paused_resume: 0.40,
            error_recover: 0.30,
            phase_advance: 0.25,
            isc_flip: 0.20,
            spawn: 0.12,
            collect: 0.06,
        }
    }
}

impl TransitionRates {
    fn named(&self) -> [(&'static str, f64); 8] {
        [
            ("running_drift", self.running_drift),
            ("idle_resume", self.idle_resume),
            ("paused_resume", self.paused_resume),
            ("error_recover", self.error_recover),
            ("phase_advance", self.phase_advance),
            ("isc_flip", self.isc_flip),
            ("spawn", self.spawn),
            ("collect", self.collect),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimSettings {
    pub tick_interval: Duration,
    pub initial_population: usize,
    pub min_population: usize,
    pub max_population: usize,
    pub rates: TransitionRates,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
            initial_population: 10,
            min_population: 6,
            max_population: 14,
            rates: TransitionRates::default(),
        }
    }
}

impl SimSettings {
    /// Defaults overlaid with environment overrides, validated.
    pub fn from_env() -> Result<Self, SettingsError> {
        let mut settings = Self::default();
        if let Ok(raw) = std::env::var(TICK_ENV) {
            settings.tick_interval = parse_tick_ms(&raw)?;
        }
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        for (name, value) in self.rates.named() {
            if !(0.0..=1.0).contains(&value) {
                return Err(SettingsError::Probability { name, value });
            }
        }
        if self.min_population > self.max_population {
            return Err(SettingsError::PopulationBounds {
                min: self.min_population,
                max: self.max_population,
            });
        }
        if !(self.min_population..=self.max_population).contains(&self.initial_population) {
            return Err(SettingsError::InitialPopulation {
                initial: self.initial_population,
                min: self.min_population,
                max: self.max_population,
            });
        }
        if self.tick_interval.is_zero() {
            return Err(SettingsError::ZeroTick);
        }
        Ok(())
    }
}

fn parse_tick_ms(raw: &str) -> Result<Duration, SettingsError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .ok_or_else(|| SettingsError::InvalidEnv {
            key: TICK_ENV,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = SimSettings::default();
        assert_eq!(settings.validate(), Ok(()));
        assert_eq!(settings.tick_interval, Duration::from_secs(2));
    }

    #[test]
    fn rejects_out_of_range_probability() {
        let mut settings = SimSettings::default();
        settings.rates.spawn = 1.5;
        assert_eq!(
            settings.validate(),
            Err(SettingsError::Probability {
                name: "spawn",
                value: 1.5
            })
        );
    }

    #[test]
    fn rejects_inverted_bounds_and_stray_initial_population() {
        let mut settings = SimSettings {
            min_population: 9,
            max_population: 4,
            ..SimSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::PopulationBounds { .. })
        ));

        settings.min_population = 6;
        settings.max_population = 8;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InitialPopulation { initial: 10, .. })
        ));
    }

    #[test]
    fn tick_override_parses_milliseconds() {
        assert_eq!(parse_tick_ms(" 500 "), Ok(Duration::from_millis(500)));
        assert!(matches!(
            parse_tick_ms("0"),
            Err(SettingsError::InvalidEnv { .. })
        ));
        assert!(matches!(
            parse_tick_ms("fast"),
            Err(SettingsError::InvalidEnv { .. })
        ));
    }
}
