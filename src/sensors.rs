use std::collections::VecDeque;
use std::f64::consts::PI;
use tokio::sync::watch;
use tokio::time::{interval, Duration};

use crate::types::{current_timestamp, BoardReading, CornerWeights};

/// Anything that can deliver balance board snapshots.
pub trait BoardSource {
    /// Next snapshot, or None once the source is exhausted.
    fn next_reading(&mut self) -> Option<BoardReading>;
}

/// Poll a source and publish only the latest snapshot.
///
/// Readers on the tick side see the most recent value; intermediate samples
/// are coalesced by the watch channel.
pub async fn board_loop<S>(
    mut source: S,
    tx: watch::Sender<Option<BoardReading>>,
    poll_interval: Duration,
) where
    S: BoardSource + Send + 'static,
{
    let mut interval = interval(poll_interval);
    let mut sample_count = 0u64;

    loop {
        interval.tick().await;

        let Some(reading) = source.next_reading() else {
            log::info!("[board] Source exhausted after {} samples", sample_count);
            break;
        };

        if tx.send(Some(reading)).is_err() {
            log::info!("[board] Receiver closed after {} samples", sample_count);
            break;
        }

        sample_count += 1;
        if sample_count % 1000 == 0 {
            log::debug!("[board] {} samples", sample_count);
        }
    }
}

/// Synthetic user standing on the board and shifting weight side to side.
#[derive(Clone, Debug)]
pub struct SimulatedBoard {
    /// Lateral sway frequency in Hz.
    pub sway_hz: f64,
    /// Peak lateral shift in kg per corner.
    pub sway_kg: f64,
    /// Forward (+) / backward (-) lean in kg shifted per corner.
    pub lean_kg: f64,
    pub body_kg: f64,
    /// Seconds after start when the user steps off; None stays on.
    pub step_off_after: Option<f64>,
    start: f64,
}

impl SimulatedBoard {
    pub fn new(sway_hz: f64, lean_kg: f64) -> Self {
        Self {
            sway_hz,
            sway_kg: 6.0,
            lean_kg,
            body_kg: 70.0,
            step_off_after: None,
            start: current_timestamp(),
        }
    }

    pub fn with_step_off(mut self, seconds: f64) -> Self {
        self.step_off_after = Some(seconds);
        self
    }

    /// Reading at `elapsed` seconds after start.
    pub fn weights_at(&self, elapsed: f64) -> CornerWeights {
        if let Some(off) = self.step_off_after {
            if elapsed >= off {
                // Slight negative drift like an unloaded sensor
                return CornerWeights::new(-0.2, -0.1, -0.15, -0.05);
            }
        }

        let quarter = self.body_kg / 4.0;
        let sway = (2.0 * PI * self.sway_hz * elapsed).sin() * self.sway_kg;
        let lean = self.lean_kg;

        CornerWeights::new(
            (quarter - sway + lean) as f32,
            (quarter + sway + lean) as f32,
            (quarter - sway - lean) as f32,
            (quarter + sway - lean) as f32,
        )
    }
}

impl BoardSource for SimulatedBoard {
    fn next_reading(&mut self) -> Option<BoardReading> {
        let now = current_timestamp();
        Some(BoardReading::new(now, self.weights_at(now - self.start)))
    }
}

/// Replays recorded readings in order.
pub struct ReplayBoard {
    readings: VecDeque<BoardReading>,
}

impl ReplayBoard {
    pub fn new(readings: Vec<BoardReading>) -> Self {
        Self {
            readings: readings.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.readings.len()
    }
}

impl BoardSource for ReplayBoard {
    fn next_reading(&mut self) -> Option<BoardReading> {
        self.readings.pop_front()
    }
}
