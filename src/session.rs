use chrono::Utc;
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::config::WalkerConfig;
use crate::error::WalkerResult;
use crate::gesture::ActionFlags;
use crate::types::BoardReading;

/// Per-session counters.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_ticks: u64,
    pub unavailable_ticks: u64,
    pub sink_failures: u64,
    pub save_failures: u64,
    pub center_offset_commands: u64,
    /// Number of ticks each action was active.
    pub action_ticks: BTreeMap<String, u64>,
}

impl SessionStats {
    pub fn record_flags(&mut self, flags: &ActionFlags) {
        self.total_ticks += 1;
        for action in flags.active() {
            *self.action_ticks.entry(action.name().to_string()).or_insert(0) += 1;
        }
    }
}

/// On-disk session log: config, every raw reading and the summary.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionFile {
    pub session_id: String,
    pub start_time: String,
    pub config: WalkerConfig,
    pub readings: Vec<BoardReading>,
    pub stats: SessionStats,
}

pub struct SessionRecorder {
    file: SessionFile,
    output_dir: PathBuf,
}

impl SessionRecorder {
    pub fn new(output_dir: impl Into<PathBuf>, config: &WalkerConfig) -> WalkerResult<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;

        Ok(Self {
            file: SessionFile {
                session_id: format!("session_{}", Utc::now().format("%Y%m%d_%H%M%S")),
                start_time: Utc::now().to_rfc3339(),
                config: config.clone(),
                readings: Vec::new(),
                stats: SessionStats::default(),
            },
            output_dir,
        })
    }

    pub fn record_reading(&mut self, reading: &BoardReading) {
        self.file.readings.push(reading.clone());
    }

    pub fn stats(&self) -> &SessionStats {
        &self.file.stats
    }

    pub fn stats_mut(&mut self) -> &mut SessionStats {
        &mut self.file.stats
    }

    pub fn reading_count(&self) -> usize {
        self.file.readings.len()
    }

    pub fn path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.json", self.file.session_id))
    }

    /// Write the whole session, replacing the previous save.
    pub fn save(&self) -> WalkerResult<PathBuf> {
        let path = self.path();
        let json = serde_json::to_string_pretty(&self.file)?;
        fs::write(&path, json)?;
        Ok(path)
    }
}

/// Load a session written by [`SessionRecorder`], plain or `.gz` compressed.
pub fn load_session(path: &Path) -> WalkerResult<SessionFile> {
    let file = File::open(path)?;
    if path.extension().map(|e| e == "gz").unwrap_or(false) {
        let reader = BufReader::new(GzDecoder::new(file));
        Ok(serde_json::from_reader(reader)?)
    } else {
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WalkerError;
    use crate::types::CornerWeights;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bw_session_{}_{}", tag, std::process::id()))
    }

    #[test]
    fn test_stats_count_active_actions() {
        let mut stats = SessionStats::default();
        stats.record_flags(&ActionFlags {
            forward: true,
            jump: true,
            ..ActionFlags::default()
        });
        stats.record_flags(&ActionFlags {
            forward: true,
            ..ActionFlags::default()
        });
        assert_eq!(stats.total_ticks, 2);
        assert_eq!(stats.action_ticks["Forward"], 2);
        assert_eq!(stats.action_ticks["Jump"], 1);
    }

    #[test]
    fn test_save_and_load() {
        let dir = temp_dir("plain");
        let mut recorder = SessionRecorder::new(&dir, &WalkerConfig::default()).unwrap();
        recorder.record_reading(&BoardReading::new(1.5, CornerWeights::new(1.0, 2.0, 3.0, 4.0)));
        recorder.stats_mut().center_offset_commands += 1;

        let path = recorder.save().unwrap();
        let loaded = load_session(&path).unwrap();
        assert_eq!(loaded.readings.len(), 1);
        assert_eq!(loaded.readings[0].weights.bottom_right, 4.0);
        assert_eq!(loaded.stats.center_offset_commands, 1);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_into_removed_dir_is_recoverable() {
        let dir = temp_dir("gone");
        let mut recorder = SessionRecorder::new(&dir, &WalkerConfig::default()).unwrap();
        recorder.record_reading(&BoardReading::new(0.5, CornerWeights::new(5.0, 5.0, 5.0, 5.0)));
        fs::remove_dir_all(&dir).unwrap();

        assert!(matches!(recorder.save(), Err(WalkerError::Io(_))));
        recorder.stats_mut().save_failures += 1;

        // Recorder keeps its state and the next save succeeds once the dir is back
        fs::create_dir_all(&dir).unwrap();
        recorder.record_reading(&BoardReading::new(1.0, CornerWeights::new(5.0, 5.0, 5.0, 5.0)));
        let path = recorder.save().unwrap();
        let loaded = load_session(&path).unwrap();
        assert_eq!(loaded.readings.len(), 2);
        assert_eq!(loaded.stats.save_failures, 1);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_gzipped() {
        let dir = temp_dir("gz");
        let recorder = SessionRecorder::new(&dir, &WalkerConfig::default()).unwrap();
        let plain = recorder.save().unwrap();

        let gz_path = dir.join("session.json.gz");
        let mut encoder = GzEncoder::new(File::create(&gz_path).unwrap(), Compression::default());
        encoder.write_all(&fs::read(&plain).unwrap()).unwrap();
        encoder.finish().unwrap();

        let loaded = load_session(&gz_path).unwrap();
        assert!(loaded.readings.is_empty());
        assert_eq!(loaded.config, WalkerConfig::default());

        fs::remove_dir_all(&dir).ok();
    }
}
