use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Derived figures for one progress tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressSample {
    pub elapsed_ms: u64,
    pub processed_bytes: u64,
    pub emitted_bytes: u64,
    pub speed_bytes_per_sec: f64,
    pub eta_ms: u64,
    /// `None` until at least one byte has been processed.
    pub ratio_percent: Option<f64>,
}

/// Turns cumulative byte counters into speed, ETA and ratio.
///
/// Elapsed time only accrues over non-paused intervals. The `1 +` in both
/// denominators keeps the first ticks finite and biases early estimates low.
#[derive(Debug, Clone)]
pub struct Estimator {
    total_bytes: u64,
    elapsed: Duration,
    interval_start: Duration,
    paused: bool,
}

impl Estimator {
    pub fn start(total_bytes: u64, now: Duration) -> Self {
        Self {
            total_bytes,
            elapsed: Duration::ZERO,
            interval_start: now,
            paused: false,
        }
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn tick(&mut self, processed: u64, emitted: u64, now: Duration) -> ProgressSample {
        if !self.paused {
            self.accrue(now);
        }
        let elapsed_ms = self.elapsed.as_millis() as u64;
        let speed = processed as f64 / (1.0 + elapsed_ms as f64 / 1000.0);
        let remaining = self.total_bytes.saturating_sub(processed);
        let eta_ms = (remaining as f64 / (1.0 + speed) * 1000.0) as u64;
        let ratio_percent = (processed > 0).then(|| 100.0 * emitted as f64 / processed as f64);
        ProgressSample {
            elapsed_ms,
            processed_bytes: processed,
            emitted_bytes: emitted,
            speed_bytes_per_sec: speed,
            eta_ms,
            ratio_percent,
        }
    }

    pub fn on_pause(&mut self, now: Duration) {
        if !self.paused {
            self.accrue(now);
            self.paused = true;
        }
    }

    pub fn on_resume(&mut self, now: Duration) {
        if self.paused {
            self.interval_start = now;
            self.paused = false;
        }
    }

    // A reading earlier than the interval start accrues nothing.
    fn accrue(&mut self, now: Duration) {
        self.elapsed += now.saturating_sub(self.interval_start);
        self.interval_start = self.interval_start.max(now);
    }
}
