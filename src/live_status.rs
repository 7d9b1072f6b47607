use serde::{Deserialize, Serialize};
use std::fs;

use crate::gesture::ActionFlags;
use crate::pipeline::Diagnostics;
use crate::session::SessionStats;
pub use crate::types::current_timestamp;

#[derive(Serialize, Deserialize, Clone)]
pub struct LiveStatus {
    pub timestamp: f64,
    pub uptime_seconds: u64,
    pub total_ticks: u64,
    pub unavailable_ticks: u64,
    pub sink_failures: u64,
    pub save_failures: u64,
    pub center_offset_commands: u64,
    pub device_available: bool,
    pub actions_enabled: bool,
    pub joystick_enabled: bool,
    pub joystick_x: i16,
    pub joystick_y: i16,
    // Current tick
    pub actions: ActionFlags,
    pub summary: String,
    pub diagnostics: Option<Diagnostics>,
}

impl LiveStatus {
    pub fn new() -> Self {
        Self {
            timestamp: current_timestamp(),
            uptime_seconds: 0,
            total_ticks: 0,
            unavailable_ticks: 0,
            sink_failures: 0,
            save_failures: 0,
            center_offset_commands: 0,
            device_available: false,
            actions_enabled: true,
            joystick_enabled: false,
            joystick_x: 0,
            joystick_y: 0,
            actions: ActionFlags::default(),
            summary: String::from("Idle"),
            diagnostics: None,
        }
    }

    pub fn apply_stats(&mut self, stats: &SessionStats) {
        self.total_ticks = stats.total_ticks;
        self.unavailable_ticks = stats.unavailable_ticks;
        self.sink_failures = stats.sink_failures;
        self.save_failures = stats.save_failures;
        self.center_offset_commands = stats.center_offset_commands;
    }

    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl Default for LiveStatus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_stats() {
        let mut stats = SessionStats::default();
        stats.total_ticks = 12;
        stats.sink_failures = 2;
        stats.save_failures = 1;

        let mut status = LiveStatus::new();
        status.apply_stats(&stats);
        assert_eq!(status.total_ticks, 12);
        assert_eq!(status.sink_failures, 2);
        assert_eq!(status.save_failures, 1);
    }

    #[test]
    fn test_save_writes_json() {
        let path = std::env::temp_dir().join(format!("bw_live_{}.json", std::process::id()));
        let path_str = path.to_string_lossy().to_string();

        let status = LiveStatus::new();
        status.save(&path_str).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"summary\": \"Idle\""));

        std::fs::remove_file(&path).ok();
    }
}
