//! Gesture classification: waddle cadence + weight position -> action flags.
//!
//! The only state carried between ticks is the time the user was last seen
//! standing on the board, which drives the jump grace window.

use serde::{Deserialize, Serialize};

use crate::config::WalkerConfig;
use crate::frequency::FrequencyEstimate;
use crate::geometry::WeightGeometry;

/// Below this calibrated total (kg) the board counts as unloaded.
const GROUNDED_WEIGHT_KG: f32 = 1.0;

/// One mappable output action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Left,
    Right,
    Forward,
    Backward,
    SprintModifier,
    SneakModifier,
    Jump,
    DiagonalLeft,
    DiagonalRight,
}

impl Action {
    pub const ALL: [Action; 9] = [
        Action::Left,
        Action::Right,
        Action::Forward,
        Action::Backward,
        Action::SprintModifier,
        Action::SneakModifier,
        Action::Jump,
        Action::DiagonalLeft,
        Action::DiagonalRight,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Action::Left => "Left",
            Action::Right => "Right",
            Action::Forward => "Forward",
            Action::Backward => "Backward",
            Action::SprintModifier => "SprintModifier",
            Action::SneakModifier => "SneakModifier",
            Action::Jump => "Jump",
            Action::DiagonalLeft => "DiagonalLeft",
            Action::DiagonalRight => "DiagonalRight",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Level-triggered action state for a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionFlags {
    pub left: bool,
    pub right: bool,
    pub forward: bool,
    pub backward: bool,
    pub sprint_modifier: bool,
    pub sneak_modifier: bool,
    pub jump: bool,
    pub diagonal_left: bool,
    pub diagonal_right: bool,
}

impl ActionFlags {
    pub fn get(&self, action: Action) -> bool {
        match action {
            Action::Left => self.left,
            Action::Right => self.right,
            Action::Forward => self.forward,
            Action::Backward => self.backward,
            Action::SprintModifier => self.sprint_modifier,
            Action::SneakModifier => self.sneak_modifier,
            Action::Jump => self.jump,
            Action::DiagonalLeft => self.diagonal_left,
            Action::DiagonalRight => self.diagonal_right,
        }
    }

    pub fn active(&self) -> impl Iterator<Item = Action> + '_ {
        Action::ALL.into_iter().filter(move |a| self.get(*a))
    }

    pub fn any_direction(&self) -> bool {
        self.left || self.right || self.forward || self.backward
    }

    /// Human-readable summary, e.g. "Forward + SprintModifier".
    pub fn describe(&self) -> String {
        let names: Vec<&str> = self.active().map(|a| a.name()).collect();
        if names.is_empty() {
            "Idle".to_string()
        } else {
            names.join(" + ")
        }
    }
}

/// Which cadence band the waddle frequency fell into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CadenceTier {
    Sprint,
    Walk,
    Sneak,
    #[default]
    Still,
}

#[derive(Clone, Debug)]
pub struct GestureThresholds {
    pub sprint_freq_hz: f32,
    pub walk_freq_hz: f32,
    pub sneak_freq_hz: f32,
    pub y_deadzone: f32,
    pub strafe_threshold: f32,
    pub jump_grace_seconds: f64,
    pub diagonal_enabled: bool,
    pub diagonal_threshold: f32,
}

impl From<&WalkerConfig> for GestureThresholds {
    fn from(config: &WalkerConfig) -> Self {
        Self {
            sprint_freq_hz: config.sprint_freq_hz,
            walk_freq_hz: config.walk_freq_hz,
            sneak_freq_hz: config.sneak_freq_hz,
            y_deadzone: config.y_deadzone,
            strafe_threshold: config.strafe_threshold,
            jump_grace_seconds: config.jump_grace_seconds,
            diagonal_enabled: config.diagonal_actions_enabled,
            diagonal_threshold: config.diagonal_threshold,
        }
    }
}

pub struct GestureClassifier {
    thresholds: GestureThresholds,
    last_grounded_time: f64,
}

impl GestureClassifier {
    /// `start_time` seeds the jump timer (seconds, same clock as tick timestamps).
    pub fn new(thresholds: GestureThresholds, start_time: f64) -> Self {
        Self {
            thresholds,
            last_grounded_time: start_time,
        }
    }

    pub fn last_grounded_time(&self) -> f64 {
        self.last_grounded_time
    }

    pub fn cadence_tier(&self, frequency_hz: f32) -> CadenceTier {
        let t = &self.thresholds;
        if frequency_hz >= t.sprint_freq_hz {
            CadenceTier::Sprint
        } else if frequency_hz >= t.walk_freq_hz {
            CadenceTier::Walk
        } else if frequency_hz >= t.sneak_freq_hz {
            CadenceTier::Sneak
        } else {
            CadenceTier::Still
        }
    }

    pub fn classify(
        &mut self,
        frequency: &FrequencyEstimate,
        geometry: &WeightGeometry,
        total_weight: f32,
        timestamp: f64,
    ) -> ActionFlags {
        let t = &self.thresholds;
        let mut flags = ActionFlags::default();

        match self.cadence_tier(frequency.frequency_hz) {
            CadenceTier::Sprint => flags.sprint_modifier = true,
            CadenceTier::Sneak => flags.sneak_modifier = true,
            CadenceTier::Walk | CadenceTier::Still => {}
        }

        // Direction needs some periodic motion; forward/back wins over strafing
        if frequency.raw_frequency_hz > 0.0 {
            if geometry.y_pos.abs() >= t.y_deadzone {
                if geometry.y_pos > 0.0 {
                    flags.forward = true;
                } else {
                    flags.backward = true;
                }
            } else if frequency.dc_offset.abs() >= t.strafe_threshold {
                if frequency.dc_offset > 0.0 {
                    flags.right = true;
                } else {
                    flags.left = true;
                }
            }
        }

        // Inclusive boundary: a loss of weight exactly grace seconds ago still jumps
        if total_weight < GROUNDED_WEIGHT_KG {
            if timestamp - self.last_grounded_time <= t.jump_grace_seconds {
                flags.jump = true;
            }
        } else {
            self.last_grounded_time = timestamp;
        }

        if t.diagonal_enabled
            && !flags.any_direction()
            && geometry.diag_delta > t.diagonal_threshold
        {
            if geometry.diag_left > geometry.diag_right {
                flags.diagonal_left = true;
            } else {
                flags.diagonal_right = true;
            }
        }

        flags
    }
}
