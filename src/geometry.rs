use serde::{Deserialize, Serialize};

use crate::types::CalibratedWeights;

/// Weight distribution derived from one tick of calibrated corners.
///
/// Percentages and ratios are in [0, 100]; 50 on a ratio means centered.
/// Positions are in [-1, 1]. Every field is finite: an unloaded board
/// (corner sum of zero) yields all zeros.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightGeometry {
    pub pct_top_left: f32,
    pub pct_top_right: f32,
    pub pct_bottom_left: f32,
    pub pct_bottom_right: f32,
    /// Right-ward pressure bias.
    pub ratio_right: f32,
    /// Rear-ward pressure bias.
    pub ratio_bottom: f32,
    pub diag_left: f32,
    pub diag_right: f32,
    pub diag_delta: f32,
    pub x_pos: f32,
    pub y_pos: f32,
    pub loaded: bool,
}

impl WeightGeometry {
    pub fn from_calibrated(w: &CalibratedWeights) -> Self {
        let sum = w.sum();
        if sum == 0.0 || !sum.is_finite() {
            return Self::default();
        }

        let percent_unit = 100.0 / sum;

        let pct_top_left = percent_unit * w.top_left;
        let pct_top_right = percent_unit * w.top_right;
        let pct_bottom_left = percent_unit * w.bottom_left;
        let pct_bottom_right = percent_unit * w.bottom_right;

        let diag_left = percent_unit * (w.bottom_left + w.top_right);
        let diag_right = percent_unit * (w.bottom_right + w.top_left);

        let x_pos = ((w.top_right + w.bottom_right) - (w.top_left + w.bottom_left)) / sum;
        let y_pos = ((w.top_right + w.top_left) - (w.bottom_right + w.bottom_left)) / sum;

        Self {
            pct_top_left: finite_or_zero(pct_top_left),
            pct_top_right: finite_or_zero(pct_top_right),
            pct_bottom_left: finite_or_zero(pct_bottom_left),
            pct_bottom_right: finite_or_zero(pct_bottom_right),
            ratio_right: finite_or_zero(pct_bottom_right + pct_top_right),
            ratio_bottom: finite_or_zero(pct_bottom_right + pct_bottom_left),
            diag_left: finite_or_zero(diag_left),
            diag_right: finite_or_zero(diag_right),
            diag_delta: finite_or_zero((diag_left - diag_right).abs()),
            x_pos: finite_or_zero(x_pos),
            y_pos: finite_or_zero(y_pos),
            loaded: true,
        }
    }
}

pub fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
