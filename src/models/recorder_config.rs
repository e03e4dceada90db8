use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::constants::{DEFAULT_CHUNK_CAPACITY_BYTES, DEFAULT_TIME_UNIT};
use crate::core::error::{Result, TelemetryError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Upper bound, in bytes, of one chunk (header included).
    #[serde(default = "default_chunk_capacity")]
    pub chunk_capacity_bytes: usize,
    /// Seconds per tick of the logged time.
    #[serde(default = "default_time_unit")]
    pub time_unit: f64,
}

fn default_chunk_capacity() -> usize {
    DEFAULT_CHUNK_CAPACITY_BYTES
}

fn default_time_unit() -> f64 {
    DEFAULT_TIME_UNIT
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            chunk_capacity_bytes: DEFAULT_CHUNK_CAPACITY_BYTES,
            time_unit: DEFAULT_TIME_UNIT,
        }
    }
}

impl RecorderConfig {
    pub fn from_json_str(data: &str) -> Result<Self> {
        let config: RecorderConfig = serde_json::from_str(data)
            .map_err(|e| TelemetryError::Config(format!("JSON Parse Error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .map_err(|e| TelemetryError::Config(format!("File read Error: {e} {}", path.display())))?;
        Self::from_json_str(&data)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.time_unit.is_finite() || self.time_unit <= 0.0 {
            return Err(TelemetryError::InvalidTimeUnit(self.time_unit));
        }
        if self.chunk_capacity_bytes == 0 {
            return Err(TelemetryError::Config(
                "chunk_capacity_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
