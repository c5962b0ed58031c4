use serde::Serialize;
use std::path::PathBuf;

use crate::job::{JobState, Mode};

/// Summary of a completed job, emitted to observers and the CLI.
#[derive(Clone, Debug, Serialize)]
pub struct JobReport {
    pub mode: Mode,
    pub source: PathBuf,
    pub target: PathBuf,
    pub input_bytes: u64,
    pub output_bytes: u64,
    /// Compressed size as a percentage of the uncompressed size.
    pub ratio_percent: Option<f64>,
    pub elapsed_ms: u64,
    /// Unix seconds at job start.
    pub started_at: i64,
    pub state: JobState,
}
