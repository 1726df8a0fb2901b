//! Build Configuration
//!
//! Tunable constants for socket matching, preview display, part removal and
//! the building locator. `Default` reproduces the values the prototype
//! builder shipped with; a JSON file may override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::game::building::BuildResult;

/// What happens to parts attached to a part that is being removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    /// Remove only the requested part; dependents keep a stale consumed slot
    #[default]
    Orphan,
    /// Also remove every part transitively attached to the removed part
    Cascade,
    /// Refuse to remove a part while anything is attached to it
    Reject,
}

/// Central configuration for building placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Max socket-to-slot distance accepted by the matcher (meters, strict)
    pub acceptance_radius: f32,
    /// Vertical offset applied to the preview pose so it does not z-fight (meters)
    pub preview_lift: f32,
    /// Two slots closer than this with the same type are the same connector (meters)
    pub coincident_epsilon: f32,
    /// Handling of parts attached to a removed part
    pub removal_policy: RemovalPolicy,
    /// Margin around a building's bounds that still counts as "in range" (meters)
    pub influence_radius: f32,
    /// Edge length of the locator's region grid cells (meters)
    pub region_cell_size: f32,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            acceptance_radius: 0.25,
            preview_lift: 0.025,
            coincident_epsilon: 1e-3,
            removal_policy: RemovalPolicy::Orphan,
            influence_radius: 4.0,
            region_cell_size: 16.0,
        }
    }
}

impl BuildConfig {
    /// Parse a config from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> BuildResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config file
    pub fn load(path: &Path) -> BuildResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("[Config] loaded build config from {}", path.display());
        Ok(config)
    }

    pub fn with_removal_policy(mut self, policy: RemovalPolicy) -> Self {
        self.removal_policy = policy;
        self
    }
}
