use serde::{Deserialize, Serialize};

use crate::geometry::WeightGeometry;

const AXIS_LIMIT: f64 = 32767.0;

/// Signed 16-bit joystick axes, 0 at center.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisValues {
    pub x: i16,
    pub y: i16,
}

impl AxisValues {
    pub const CENTERED: AxisValues = AxisValues { x: 0, y: 0 };

    /// Map balance ratios to axes. An unloaded board reads as centered.
    pub fn from_geometry(geometry: &WeightGeometry) -> Self {
        if !geometry.loaded {
            return Self::CENTERED;
        }
        Self {
            x: map_axis(geometry.ratio_right),
            y: map_axis(geometry.ratio_bottom),
        }
    }
}

/// Convert a balance ratio (0-100, 50 centered) to a joystick axis value.
///
/// Stretched by 2 since realistic use stays within the 30-70% band.
/// Clamped before narrowing so the sign never wraps.
pub fn map_axis(ratio: f32) -> i16 {
    let raw = (ratio as f64 * 655.34 - AXIS_LIMIT) * 2.0;
    if raw.is_nan() {
        return 0;
    }
    raw.clamp(-AXIS_LIMIT, AXIS_LIMIT) as i16
}
