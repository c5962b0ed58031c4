#![forbid(unsafe_code)]

pub mod error;
pub mod options;
pub mod report;

pub mod container {
    pub mod header;
}

pub mod progress {
    pub mod clock;
    pub mod estimator;
    pub mod format;
}

pub mod codec;

pub mod adapter;

pub mod job;

// Re-exports: stable API surface
pub use container::header::{ContainerHeader, HEADER_LEN};
pub use error::{Lz86Error, Result};
pub use job::controller::{JobController, query_size};
pub use job::{JobState, Mode, NoopObserver, ProgressObserver, ProgressReport};
pub use options::JobOptions;
pub use report::JobReport;
