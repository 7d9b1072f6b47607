use serde::{Deserialize, Serialize};

/// Per-corner load of the board in kilograms. May be negative or NaN from sensor noise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CornerWeights {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_left: f32,
    pub bottom_right: f32,
    pub total_weight: f32,
}

impl CornerWeights {
    pub fn new(top_left: f32, top_right: f32, bottom_left: f32, bottom_right: f32) -> Self {
        Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
            total_weight: top_left + top_right + bottom_left + bottom_right,
        }
    }

    pub fn corners(&self) -> [f32; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        ]
    }
}

/// One snapshot delivered by the sensor collaborator at tick time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoardReading {
    pub timestamp: f64,
    pub weights: CornerWeights,
    /// False when the device is disconnected or is not a balance board.
    pub is_balance_board: bool,
}

impl BoardReading {
    pub fn new(timestamp: f64, weights: CornerWeights) -> Self {
        Self {
            timestamp,
            weights,
            is_balance_board: true,
        }
    }
}

/// Corner weights after floor removal, center offset and the in-use guard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibratedWeights {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_left: f32,
    pub bottom_right: f32,
    /// Raw total clamped to be non-negative.
    pub total_weight: f32,
}

impl CalibratedWeights {
    pub fn sum(&self) -> f32 {
        self.top_left + self.top_right + self.bottom_left + self.bottom_right
    }

    pub fn in_use(&self) -> bool {
        self.total_weight > 0.0
    }
}

/// Additive per-corner correction captured by the "set center" command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CenterOffset {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_left: f32,
    pub bottom_right: f32,
}

pub fn current_timestamp() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
