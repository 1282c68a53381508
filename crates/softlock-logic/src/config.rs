//! Validator configuration — cost knobs, jump physics and the profile set.
//!
//! Hosts usually load this from JSON; every field has a default so partial
//! documents are fine. `validate_config` reports every problem at once.
//!
//! ```
//! use softlock_logic::config::{validate_config, ValidatorConfig};
//!
//! let config = ValidatorConfig::default();
//! assert!(validate_config(&config).is_empty());
//! assert_eq!(config.profiles.len(), 5);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::capability::{canonical_profiles, AgentCapabilities};
use crate::jump_arc::JumpPhysics;
use crate::traversal::TraversalCostConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub cost: TraversalCostConfig,
    pub physics: JumpPhysics,
    /// Profiles evaluated by the validation report, in order.
    pub profiles: Vec<AgentCapabilities>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            cost: TraversalCostConfig::default(),
            physics: JumpPhysics::default(),
            profiles: canonical_profiles(),
        }
    }
}

impl ValidatorConfig {
    /// Clamp profile skill levels that came in through deserialization.
    pub fn normalized(mut self) -> Self {
        self.profiles = self
            .profiles
            .into_iter()
            .map(AgentCapabilities::normalized)
            .collect();
        self
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} multiplier must be finite and >= 1 (got {value})")]
    InvalidMultiplier { name: &'static str, value: f32 },
    #[error("physics value {name} must be finite and non-negative (got {value})")]
    NegativePhysics { name: &'static str, value: f32 },
    #[error("gravity scale must be positive (got {0})")]
    NonPositiveGravity(f32),
    #[error("no capability profiles configured")]
    NoProfiles,
    #[error("profile #{0} has an empty label")]
    EmptyProfileLabel(usize),
    #[error("duplicate profile label '{0}'")]
    DuplicateProfileLabel(String),
}

fn check_multiplier(name: &'static str, value: f32, errors: &mut Vec<ConfigError>) {
    if !value.is_finite() || value < 1.0 {
        errors.push(ConfigError::InvalidMultiplier { name, value });
    }
}

/// Validate a configuration, returning all errors found.
pub fn validate_config(config: &ValidatorConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    check_multiplier("soft gate", config.cost.soft_gate_multiplier, &mut errors);
    check_multiplier(
        "skill shortfall",
        config.cost.skill_shortfall_multiplier,
        &mut errors,
    );

    let p = &config.physics;
    for (name, value) in [
        ("jump_height", p.jump_height),
        ("jump_distance", p.jump_distance),
        ("double_jump_bonus", p.double_jump_bonus),
        ("wall_jump_height", p.wall_jump_height),
        ("dash_distance", p.dash_distance),
    ] {
        if !value.is_finite() || value < 0.0 {
            errors.push(ConfigError::NegativePhysics { name, value });
        }
    }
    if !(p.gravity_scale.is_finite() && p.gravity_scale > 0.0) {
        errors.push(ConfigError::NonPositiveGravity(p.gravity_scale));
    }

    if config.profiles.is_empty() {
        errors.push(ConfigError::NoProfiles);
    }
    let mut labels = HashSet::new();
    for (i, profile) in config.profiles.iter().enumerate() {
        if profile.label.trim().is_empty() {
            errors.push(ConfigError::EmptyProfileLabel(i));
        } else if !labels.insert(profile.label.as_str()) {
            errors.push(ConfigError::DuplicateProfileLabel(profile.label.clone()));
        }
    }

    errors
}
