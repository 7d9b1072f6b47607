use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{WalkerError, WalkerResult};

/// Runtime configuration for the per-tick pipeline.
///
/// Loaded from a JSON file; any field left out takes its default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkerConfig {
    pub tick_interval_ms: f32,
    pub sprint_freq_hz: f32,
    pub walk_freq_hz: f32,
    pub sneak_freq_hz: f32,
    /// Minimum |yPos| for forward/backward.
    pub y_deadzone: f32,
    /// Minimum |dcOffset| for strafing left/right.
    pub strafe_threshold: f32,
    pub jump_grace_seconds: f64,
    pub sample_buffer_capacity: usize,
    pub diagonal_actions_enabled: bool,
    /// Diagonal ratio difference (percentage points) needed for a diagonal turn.
    pub diagonal_threshold: f32,
    pub actions_enabled: bool,
    pub joystick_enabled: bool,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 16.0,
            sprint_freq_hz: 2.0,
            walk_freq_hz: 1.0,
            sneak_freq_hz: 0.3,
            y_deadzone: 0.2,
            strafe_threshold: 5.0,
            jump_grace_seconds: 2.0,
            sample_buffer_capacity: 64,
            diagonal_actions_enabled: false,
            diagonal_threshold: 15.0,
            actions_enabled: true,
            joystick_enabled: false,
        }
    }
}

impl WalkerConfig {
    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> WalkerResult<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let config: WalkerConfig = serde_json::from_str(&text)?;
        config.validate()?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> WalkerResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> WalkerResult<()> {
        if !(self.tick_interval_ms.is_finite() && self.tick_interval_ms > 0.0) {
            return Err(invalid(format!(
                "tick_interval_ms must be positive, got {}",
                self.tick_interval_ms
            )));
        }

        if !(self.sprint_freq_hz > self.walk_freq_hz && self.walk_freq_hz > self.sneak_freq_hz) {
            return Err(invalid(format!(
                "frequency thresholds must descend sprint > walk > sneak, got {} / {} / {}",
                self.sprint_freq_hz, self.walk_freq_hz, self.sneak_freq_hz
            )));
        }

        if self.sample_buffer_capacity < 2 || !self.sample_buffer_capacity.is_power_of_two() {
            return Err(invalid(format!(
                "sample_buffer_capacity must be a power of two >= 2, got {}",
                self.sample_buffer_capacity
            )));
        }

        for (name, value) in [
            ("y_deadzone", self.y_deadzone),
            ("strafe_threshold", self.strafe_threshold),
            ("diagonal_threshold", self.diagonal_threshold),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(format!("{} must be >= 0, got {}", name, value)));
            }
        }

        if !(self.jump_grace_seconds.is_finite() && self.jump_grace_seconds > 0.0) {
            return Err(invalid(format!(
                "jump_grace_seconds must be positive, got {}",
                self.jump_grace_seconds
            )));
        }

        Ok(())
    }

    /// Ticks per second.
    pub fn sample_rate_hz(&self) -> f32 {
        1000.0 / self.tick_interval_ms
    }
}

fn invalid(msg: String) -> WalkerError {
    WalkerError::InvalidConfig(msg)
}
