use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::progress::estimator::ProgressSample;
use crate::progress::format;
use crate::report::JobReport;

pub mod controller;
pub mod paths;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Compress,
    Decompress,
}

/// `Finished`, `Cancelled` and `Failed` are terminal.
///
/// `Idle -> Running <-> Paused`; `Running -> Finished | Failed`;
/// `Running | Paused -> Cancelled`. A pause always resolves through `Running`
/// (or `Cancelled`) before the job can finish.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Idle,
    Running,
    Paused,
    Finished,
    Cancelled,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled | Self::Failed)
    }
}

/// One compress-or-decompress operation.
#[derive(Clone, Debug)]
pub struct CompressionJob {
    pub source: PathBuf,
    pub target: PathBuf,
    pub mode: Mode,
    pub level: u32,
    pub dictionary_size: u32,
    pub total_bytes: u64,
    pub processed_bytes: u64,
    pub emitted_bytes: u64,
    pub state: JobState,
}

/// What a progress surface sees on every tick.
#[derive(Clone, Debug)]
pub struct ProgressReport<'a> {
    pub mode: Mode,
    pub source: &'a Path,
    pub total_bytes: u64,
    pub sample: ProgressSample,
    /// Set on the tick synthesized after the codec returns.
    pub is_final: bool,
}

impl ProgressReport<'_> {
    pub fn ratio_display(&self) -> String {
        format::ratio_to_string(self.sample.ratio_percent)
    }

    pub fn elapsed_display(&self) -> String {
        format::millis_to_string(self.sample.elapsed_ms)
    }

    pub fn remaining_display(&self) -> String {
        format::millis_to_string(self.sample.eta_ms)
    }

    pub fn status_line(&self) -> String {
        let name = self
            .source
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| self.source.to_string_lossy());
        format::status_line(&name, &self.sample, self.total_bytes)
    }
}

/// Receiver for job notifications. Called on the job's thread from inside
/// the codec callback, so implementations must stay quick.
pub trait ProgressObserver {
    fn on_progress(&mut self, _report: &ProgressReport<'_>) {}
    fn on_state(&mut self, _state: JobState) {}
    fn on_finished(&mut self, _report: &JobReport) {}
}

pub struct NoopObserver;

impl ProgressObserver for NoopObserver {}
