use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::data::error::{DataError, DataResult};
use crate::data::loader::DEFAULT_MAX_POINTS;
use crate::data::nearest::threshold_for;

// ---------------------------------------------------------------------------
// Tunables supplied by whatever drives the core
// ---------------------------------------------------------------------------

/// Tunables for loading and cursor queries. Missing JSON fields take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Point budget per series for one load.
    pub max_points: usize,
    /// Minimum spacing between two evaluated pointer moves.
    pub debounce_interval_ms: u64,
    /// The nearest-point radius is the visible x span divided by this.
    pub nearest_point_threshold_divisor: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            max_points: DEFAULT_MAX_POINTS,
            debounce_interval_ms: 20,
            nearest_point_threshold_divisor: 30.0,
        }
    }
}

impl ChartConfig {
    pub fn from_json_str(text: &str) -> DataResult<Self> {
        let config: ChartConfig = serde_json::from_str(text)
            .map_err(|e| DataError::InvalidConfig(format!("parsing config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> DataResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        log::info!("Loaded config from {}: {config:?}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> DataResult<()> {
        if self.max_points == 0 {
            return Err(DataError::InvalidConfig(
                "max_points must be greater than zero".to_string(),
            ));
        }
        let divisor = self.nearest_point_threshold_divisor;
        if !divisor.is_finite() || divisor <= 0.0 {
            return Err(DataError::InvalidConfig(format!(
                "nearest_point_threshold_divisor must be positive, got {divisor}"
            )));
        }
        Ok(())
    }

    pub fn debounce_interval(&self) -> Duration {
        Duration::from_millis(self.debounce_interval_ms)
    }

    /// Nearest-point radius for the visible x range.
    pub fn threshold_for(&self, x_min: f64, x_max: f64) -> f64 {
        threshold_for(x_min, x_max, self.nearest_point_threshold_divisor)
    }
}
