use anyhow::Result;
use rerun::{archetypes::Scalar, RecordingStreamBuilder};

use crate::gesture::{Action, ActionFlags};
use crate::pipeline::Diagnostics;

/// Rerun time-series logger for per-tick diagnostics
/// Supports Rerun v0.15+ API with archetype-based logging
pub struct RerunLogger {
    rec: rerun::RecordingStream,
}

impl RerunLogger {
    /// Initialize Rerun recording to file
    /// Takes output path (e.g., "walker_sessions/rerun_20251122_120000.rrd")
    pub fn new(output_path: &str) -> Result<Self> {
        let rec = RecordingStreamBuilder::new("balance_walker")
            .save(output_path)
            .map_err(|e| anyhow::anyhow!("Failed to create Rerun recording: {}", e))?;

        log::info!("[RERUN] Recording initialized to: {}", output_path);

        Ok(RerunLogger { rec })
    }

    pub fn set_time(&self, elapsed_secs: f64) {
        self.rec.set_time_seconds("stable_time", elapsed_secs);
    }

    pub fn log_scalar(&self, path: &str, value: f64) {
        let _ = self.rec.log(path, &Scalar::new(value));
    }

    pub fn log_diagnostics(&self, d: &Diagnostics) {
        self.log_scalar("board/raw/top_left", d.raw.top_left as f64);
        self.log_scalar("board/raw/top_right", d.raw.top_right as f64);
        self.log_scalar("board/raw/bottom_left", d.raw.bottom_left as f64);
        self.log_scalar("board/raw/bottom_right", d.raw.bottom_right as f64);
        self.log_scalar("board/raw/total", d.raw.total_weight as f64);
        self.log_scalar("board/floor", d.floor as f64);

        self.log_scalar("board/calibrated/top_left", d.calibrated.top_left as f64);
        self.log_scalar("board/calibrated/top_right", d.calibrated.top_right as f64);
        self.log_scalar("board/calibrated/bottom_left", d.calibrated.bottom_left as f64);
        self.log_scalar("board/calibrated/bottom_right", d.calibrated.bottom_right as f64);

        let g = &d.geometry;
        self.log_scalar("balance/ratio_right", g.ratio_right as f64);
        self.log_scalar("balance/ratio_bottom", g.ratio_bottom as f64);
        self.log_scalar("balance/diag_delta", g.diag_delta as f64);
        self.log_scalar("balance/x_pos", g.x_pos as f64);
        self.log_scalar("balance/y_pos", g.y_pos as f64);

        let f = &d.frequency;
        self.log_scalar("spectrum/frequency_hz", f.frequency_hz as f64);
        self.log_scalar("spectrum/magnitude", f.dominant_magnitude);
        self.log_scalar("spectrum/dc_offset", f.dc_offset as f64);
    }

    /// Log each action as a 0/1 step signal
    pub fn log_actions(&self, flags: &ActionFlags) {
        for action in Action::ALL {
            let path = format!("actions/{}", action.name());
            self.log_scalar(&path, if flags.get(action) { 1.0 } else { 0.0 });
        }
    }
}
