use serde::{Deserialize, Serialize};

use super::device::DevicePosition;
use super::error::CaptureError;

/// Capture quality requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPreset {
    #[default]
    High,
    Medium,
    Low,
}

/// Configuration for a call-screen session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Camera tried first when the session comes up (default: back).
    /// The opposite position is the fallback.
    pub preferred_position: DevicePosition,

    /// Preset applied while configuring the session (default: high).
    pub session_preset: SessionPreset,

    /// Restart the session after a runtime error if it stopped running
    /// (default: true).
    pub restart_on_runtime_error: bool,
}

impl OrchestratorConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.preferred_position == DevicePosition::Unspecified {
            return Err("preferred position must be front or back".into());
        }
        Ok(())
    }

    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, CaptureError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CaptureError::InvalidConfiguration(format!("failed to parse config: {}", e)))?;
        config.validate().map_err(CaptureError::InvalidConfiguration)?;
        Ok(config)
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            preferred_position: DevicePosition::Back,
            session_preset: SessionPreset::High,
            restart_on_runtime_error: true,
        }
    }
}
