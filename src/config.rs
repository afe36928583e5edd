use crate::error::TrackerError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Defines what the config file should contain.
pub struct Config {
    /// Axis-aligned distance in pixels below which a detection may still be
    /// associated with a track. Assumes objects move less than this far
    /// between consecutive frames.
    pub gate_distance: f64,
    /// Number of match events a track survives without being selected
    /// before it is evicted.
    pub initial_budget: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gate_distance: 40.0,
            initial_budget: 10,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), TrackerError> {
        if !self.gate_distance.is_finite() || self.gate_distance <= 0.0 {
            return Err(TrackerError::InvalidConfig(format!(
                "gate_distance must be positive, got {}",
                self.gate_distance
            )));
        }
        if self.initial_budget == 0 {
            return Err(TrackerError::InvalidConfig(
                "initial_budget must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
