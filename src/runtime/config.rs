//! Engine Configuration
//!
//! Defaults match the stock clicker; every field can be overridden from
//! `CLICKER_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::game::events::{DEFAULT_TOAST_MS, MILESTONE_TOAST_MS};
use crate::game::particles::PARTICLE_LIFETIME;
use crate::game::session::DEFAULT_MILESTONE_INTERVAL;

/// Engine configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClickerConfig {
    /// How long a particle stays on screen.
    pub particle_lifetime: Duration,
    /// Milestone spacing in clicks.
    pub milestone_interval: u64,
    /// Upper bound on live particles (None = unbounded).
    pub max_live_particles: Option<usize>,
    /// Duration of the milestone toast (ms).
    pub milestone_toast_ms: u64,
    /// Duration of the other toasts (ms).
    pub toast_ms: u64,
    /// JSON file replacing the built-in leaderboard and tournaments.
    pub content_path: Option<PathBuf>,
}

impl Default for ClickerConfig {
    fn default() -> Self {
        Self {
            particle_lifetime: PARTICLE_LIFETIME,
            milestone_interval: DEFAULT_MILESTONE_INTERVAL,
            max_live_particles: None,
            milestone_toast_ms: MILESTONE_TOAST_MS,
            toast_ms: DEFAULT_TOAST_MS,
            content_path: None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable is set but not a valid number.
    #[error("{name} must be a non-negative integer, got {value:?}")]
    InvalidNumber {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
    },

    /// Value parsed but is out of range.
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

impl ClickerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let number = |name: &'static str| -> Result<Option<u64>, ConfigError> {
            match lookup(name) {
                Some(raw) if !raw.trim().is_empty() => raw
                    .trim()
                    .parse::<u64>()
                    .map(Some)
                    .map_err(|_| ConfigError::InvalidNumber { name, value: raw }),
                _ => Ok(None),
            }
        };

        let config = Self {
            particle_lifetime: number("CLICKER_PARTICLE_LIFETIME_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.particle_lifetime),
            milestone_interval: number("CLICKER_MILESTONE_INTERVAL")?
                .unwrap_or(defaults.milestone_interval),
            max_live_particles: number("CLICKER_MAX_PARTICLES")?.map(|n| n as usize),
            milestone_toast_ms: number("CLICKER_MILESTONE_TOAST_MS")?
                .unwrap_or(defaults.milestone_toast_ms),
            toast_ms: number("CLICKER_TOAST_MS")?.unwrap_or(defaults.toast_ms),
            content_path: lookup("CLICKER_CONTENT_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_lifetime.is_zero() {
            return Err(ConfigError::Zero("CLICKER_PARTICLE_LIFETIME_MS"));
        }
        if self.milestone_interval == 0 {
            return Err(ConfigError::Zero("CLICKER_MILESTONE_INTERVAL"));
        }
        if self.max_live_particles == Some(0) {
            return Err(ConfigError::Zero("CLICKER_MAX_PARTICLES"));
        }
        Ok(())
    }
}
