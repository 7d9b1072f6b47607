use serde::{Deserialize, Serialize};

use crate::types::{CalibratedWeights, CenterOffset, CornerWeights};

/// Zero-offset calibration for the four corner sensors.
///
/// Two corrections are applied every tick:
/// - the running negative floor (lowest corner value ever seen) is subtracted so
///   readings are zero-based
/// - a user-captured center offset is added so an asymmetric resting stance reads
///   as balanced
///
/// Values are forced to zero whenever the board is not in use, otherwise the
/// center offset alone would look like a lean.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CalibrationModel {
    floor: f32,
    center_offset: CenterOffset,
    center_requested: bool,
}

impl CalibrationModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the one-shot "set center" command; consumed by the next `observe`.
    pub fn request_center_offset(&mut self) {
        self.center_requested = true;
    }

    pub fn center_pending(&self) -> bool {
        self.center_requested
    }

    pub fn floor(&self) -> f32 {
        self.floor
    }

    pub fn center_offset(&self) -> CenterOffset {
        self.center_offset
    }

    pub fn observe(&mut self, raw: &CornerWeights) -> CalibratedWeights {
        // f32::min ignores NaN, so a bad sample never poisons the floor
        for value in raw.corners() {
            self.floor = self.floor.min(value);
        }

        let total_weight = if raw.total_weight.is_finite() {
            raw.total_weight.max(0.0)
        } else {
            0.0
        };

        let top_left = raw.top_left - self.floor;
        let top_right = raw.top_right - self.floor;
        let bottom_left = raw.bottom_left - self.floor;
        let bottom_right = raw.bottom_right - self.floor;

        if self.center_requested {
            self.center_requested = false;

            let highest = top_left.max(top_right).max(bottom_left.max(bottom_right));
            self.center_offset = CenterOffset {
                top_left: highest - top_left,
                top_right: highest - top_right,
                bottom_left: highest - bottom_left,
                bottom_right: highest - bottom_right,
            };
            log::info!(
                "Center offset captured: TL {:.2} TR {:.2} BL {:.2} BR {:.2}",
                self.center_offset.top_left,
                self.center_offset.top_right,
                self.center_offset.bottom_left,
                self.center_offset.bottom_right
            );
        }

        if total_weight > 0.0 {
            CalibratedWeights {
                top_left: top_left + self.center_offset.top_left,
                top_right: top_right + self.center_offset.top_right,
                bottom_left: bottom_left + self.center_offset.bottom_left,
                bottom_right: bottom_right + self.center_offset.bottom_right,
                total_weight,
            }
        } else {
            CalibratedWeights {
                total_weight,
                ..CalibratedWeights::default()
            }
        }
    }
}
