//! Edit engine configuration.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::EditResult;
use crate::snap::SnapMode;

/// Default grid spacing in world units.
pub const DEFAULT_GRID_SIZE: f64 = 20.0;

/// Default object snap distance in world units.
pub const DEFAULT_SNAP_DISTANCE: f64 = 8.0;

/// Default discrete rotation step (15°).
pub const DEFAULT_ROTATION_SNAP: f64 = PI / 12.0;

/// Configuration for edit sessions.
///
/// Missing fields fall back to their defaults when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditConfig {
    /// Snapping applied to move and resize when no override is held.
    pub snap_mode: SnapMode,
    /// Grid spacing in world units.
    pub grid_size: f64,
    /// Maximum distance at which object snapping engages.
    pub object_snap_distance: f64,
    /// Rotation step in radians used when angle snapping is requested.
    pub rotation_snap_interval: Option<f64>,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            snap_mode: SnapMode::Off,
            grid_size: DEFAULT_GRID_SIZE,
            object_snap_distance: DEFAULT_SNAP_DISTANCE,
            rotation_snap_interval: Some(DEFAULT_ROTATION_SNAP),
        }
    }
}

impl EditConfig {
    /// Parse a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EditError::Config`] if the JSON is malformed.
    pub fn from_json(json: &str) -> EditResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.validated())
    }

    /// Replace non-positive sizes with their defaults.
    #[must_use]
    pub fn validated(mut self) -> Self {
        if !is_positive(self.grid_size) {
            tracing::warn!(grid_size = self.grid_size, "invalid grid size, using default");
            self.grid_size = DEFAULT_GRID_SIZE;
        }
        if !is_positive(self.object_snap_distance) {
            tracing::warn!(
                distance = self.object_snap_distance,
                "invalid snap distance, using default"
            );
            self.object_snap_distance = DEFAULT_SNAP_DISTANCE;
        }
        if self.rotation_snap_interval.is_some_and(|i| !is_positive(i)) {
            self.rotation_snap_interval = None;
        }
        self
    }

    /// Rotation step, if angle snapping is usable.
    #[must_use]
    pub fn rotation_step(&self) -> Option<f64> {
        self.rotation_snap_interval.filter(|i| is_positive(*i))
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
