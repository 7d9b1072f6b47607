//! One full pass per tick: calibration -> geometry -> {sample window -> FFT}
//! -> classification and axis mapping.
//!
//! All mutable state (floor, center offset, sample window, jump timer) lives in
//! [`Pipeline`], which has a single owner. Ticks must be serialized by the caller.

use serde::{Deserialize, Serialize};

use crate::axis::AxisValues;
use crate::calibration::CalibrationModel;
use crate::config::WalkerConfig;
use crate::error::{WalkerError, WalkerResult};
use crate::frequency::{FrequencyAnalyzer, FrequencyEstimate};
use crate::gesture::{ActionFlags, CadenceTier, GestureClassifier, GestureThresholds};
use crate::geometry::WeightGeometry;
use crate::sample_buffer::SampleBuffer;
use crate::types::{BoardReading, CalibratedWeights, CenterOffset, CornerWeights};

/// Read-only view of every intermediate value of a tick.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    pub timestamp: f64,
    pub raw: CornerWeights,
    pub floor: f32,
    pub center_offset: CenterOffset,
    pub calibrated: CalibratedWeights,
    pub geometry: WeightGeometry,
    pub frequency: FrequencyEstimate,
    pub samples_buffered: usize,
    pub cadence: CadenceTier,
}

#[derive(Clone, Debug)]
pub struct TickOutput {
    pub flags: ActionFlags,
    /// Present only when joystick emulation is enabled.
    pub axes: Option<AxisValues>,
    pub diagnostics: Diagnostics,
}

pub struct Pipeline {
    calibration: CalibrationModel,
    samples: SampleBuffer,
    analyzer: FrequencyAnalyzer,
    classifier: GestureClassifier,
    joystick_enabled: bool,
}

impl Pipeline {
    /// Build a pipeline from a validated config. `start_time` seeds the jump timer.
    pub fn new(config: &WalkerConfig, start_time: f64) -> WalkerResult<Self> {
        config.validate()?;
        Ok(Self {
            calibration: CalibrationModel::new(),
            samples: SampleBuffer::new(config.sample_buffer_capacity),
            analyzer: FrequencyAnalyzer::new(
                config.sample_rate_hz(),
                config.sample_buffer_capacity,
            ),
            classifier: GestureClassifier::new(GestureThresholds::from(config), start_time),
            joystick_enabled: config.joystick_enabled,
        })
    }

    pub fn request_center_offset(&mut self) {
        self.calibration.request_center_offset();
    }

    /// Clear the sample window; calibration and the jump timer are kept.
    pub fn reset_samples(&mut self) {
        self.samples.clear();
    }

    pub fn set_joystick_enabled(&mut self, enabled: bool) {
        self.joystick_enabled = enabled;
    }

    pub fn tick(&mut self, reading: &BoardReading) -> WalkerResult<TickOutput> {
        if !reading.is_balance_board {
            return Err(WalkerError::DeviceUnavailable(
                "device is not a balance board".to_string(),
            ));
        }

        let calibrated = self.calibration.observe(&reading.weights);
        let geometry = WeightGeometry::from_calibrated(&calibrated);

        self.samples.push(geometry.x_pos);
        let frequency = self.analyzer.analyze(&mut self.samples.snapshot());

        let flags = self.classifier.classify(
            &frequency,
            &geometry,
            calibrated.total_weight,
            reading.timestamp,
        );

        let axes = self
            .joystick_enabled
            .then(|| AxisValues::from_geometry(&geometry));

        log::trace!(
            "tick {:.3}: x {:.2} y {:.2} f {:.2}Hz dc {:.2} -> {}",
            reading.timestamp,
            geometry.x_pos,
            geometry.y_pos,
            frequency.frequency_hz,
            frequency.dc_offset,
            flags.describe()
        );

        Ok(TickOutput {
            flags,
            axes,
            diagnostics: Diagnostics {
                timestamp: reading.timestamp,
                raw: reading.weights,
                floor: self.calibration.floor(),
                center_offset: self.calibration.center_offset(),
                calibrated,
                geometry,
                frequency,
                samples_buffered: self.samples.len(),
                cadence: self.classifier.cadence_tier(frequency.frequency_hz),
            },
        })
    }
}
