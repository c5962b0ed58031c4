use std::fs::{self, File};
use std::io::{self, Write};
use std::ops::ControlFlow;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use time::OffsetDateTime;
use tracing::{debug, info, warn};

use super::paths::{self, ResolvedPaths};
use super::{CompressionJob, JobState, Mode, ProgressObserver, ProgressReport};
use crate::adapter;
use crate::codec::EntropyCodec;
use crate::codec::xz::XzLzma;
use crate::container::header::{read_size_at, read_uncompressed_size};
use crate::error::{Lz86Error, Result};
use crate::options::JobOptions;
use crate::progress::clock::{Clock, SystemClock};
use crate::progress::estimator::{Estimator, ProgressSample};
use crate::report::JobReport;

/// How often a paused job re-checks its state besides being notified.
const PAUSE_POLL: Duration = Duration::from_millis(100);

/// Owns one `CompressionJob` from configuration to a terminal state.
///
/// Share it as `Arc<JobController>`: `run` blocks the calling thread while
/// `pause_or_resume`, `stop` and `hide` may be called from anywhere. Control
/// requests are observed at the next progress callback or after the forced
/// final tick, never mid-codec-call.
pub struct JobController {
    job: Mutex<CompressionJob>,
    changed: Condvar,
    hidden: AtomicBool,
    options: JobOptions,
    codec: Box<dyn EntropyCodec>,
    clock: Arc<dyn Clock>,
}

struct Outcome {
    input_bytes: u64,
    output_bytes: u64,
    last: ProgressSample,
}

impl JobController {
    pub fn configure(
        input: Option<&Path>,
        output: Option<&Path>,
        mode: Option<Mode>,
        options: JobOptions,
    ) -> Result<Self> {
        options.validate()?;
        let resolved = paths::resolve(input, output, mode, &options.suffix)?;
        Ok(Self::new(resolved, options))
    }

    pub fn new(paths: ResolvedPaths, options: JobOptions) -> Self {
        let job = CompressionJob {
            source: paths.source,
            target: paths.target,
            mode: paths.mode,
            level: options.level,
            dictionary_size: options.dictionary_size,
            total_bytes: 0,
            processed_bytes: 0,
            emitted_bytes: 0,
            state: JobState::Idle,
        };
        Self {
            job: Mutex::new(job),
            changed: Condvar::new(),
            hidden: AtomicBool::new(false),
            codec: Box::new(XzLzma::with_tick_bytes(options.tick_bytes)),
            options,
            clock: Arc::new(SystemClock::new()),
        }
    }

    pub fn with_codec(mut self, codec: Box<dyn EntropyCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn options(&self) -> &JobOptions {
        &self.options
    }

    pub fn snapshot(&self) -> CompressionJob {
        self.lock().clone()
    }

    pub fn state(&self) -> JobState {
        self.lock().state
    }

    /// Toggle `Running` <-> `Paused`; returns the new state.
    pub fn pause_or_resume(&self) -> Result<JobState> {
        let next = {
            let mut job = self.lock();
            let next = match job.state {
                JobState::Running => JobState::Paused,
                JobState::Paused => JobState::Running,
                state => {
                    return Err(Lz86Error::InvalidTransition {
                        action: "pause or resume",
                        state,
                    });
                }
            };
            job.state = next;
            next
        };
        self.changed.notify_all();
        info!(state = ?next, "pause toggled");
        Ok(next)
    }

    /// Abort the job. Lands in `Cancelled` at once; the worker stops at its
    /// next callback boundary.
    pub fn stop(&self) -> Result<()> {
        {
            let mut job = self.lock();
            match job.state {
                JobState::Running | JobState::Paused => job.state = JobState::Cancelled,
                state => {
                    return Err(Lz86Error::InvalidTransition {
                        action: "stop",
                        state,
                    });
                }
            }
        }
        self.changed.notify_all();
        warn!("stop requested");
        Ok(())
    }

    /// Display-only; the job is unaffected.
    pub fn hide(&self) {
        self.hidden.store(true, Ordering::Relaxed);
    }

    pub fn show(&self) {
        self.hidden.store(false, Ordering::Relaxed);
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.load(Ordering::Relaxed)
    }

    /// Run the job to a terminal state on the calling thread.
    pub fn run(&self, observer: &mut dyn ProgressObserver) -> Result<JobReport> {
        let job = self.begin()?;
        let started_at = OffsetDateTime::now_utc().unix_timestamp();
        info!(
            mode = ?job.mode,
            source = %job.source.display(),
            target = %job.target.display(),
            level = job.level,
            dictionary_size = job.dictionary_size,
            "job started"
        );
        observer.on_state(JobState::Running);

        let res = match job.mode {
            Mode::Compress => self.compress(&job, observer),
            Mode::Decompress => self.decompress(&job, observer),
        }
        .and_then(|outcome| self.complete().map(|()| outcome));

        match res {
            Ok(outcome) => {
                let report = JobReport {
                    mode: job.mode,
                    source: job.source.clone(),
                    target: job.target.clone(),
                    input_bytes: outcome.input_bytes,
                    output_bytes: outcome.output_bytes,
                    ratio_percent: outcome.last.ratio_percent,
                    elapsed_ms: outcome.last.elapsed_ms,
                    started_at,
                    state: JobState::Finished,
                };
                info!(
                    input = report.input_bytes,
                    output = report.output_bytes,
                    elapsed_ms = report.elapsed_ms,
                    "job finished"
                );
                observer.on_state(JobState::Finished);
                observer.on_finished(&report);
                Ok(report)
            }
            Err(e) => {
                let state = self.fail(&e);
                warn!(error = %e, state = ?state, "job ended early");
                observer.on_state(state);
                Err(e)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, CompressionJob> {
        self.job.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> Result<CompressionJob> {
        let mut job = self.lock();
        match job.state {
            JobState::Idle => {}
            JobState::Running | JobState::Paused => return Err(Lz86Error::JobAlreadyRunning),
            state => {
                return Err(Lz86Error::InvalidTransition {
                    action: "start",
                    state,
                });
            }
        }
        job.state = JobState::Running;
        job.total_bytes = 0;
        job.processed_bytes = 0;
        job.emitted_bytes = 0;
        Ok(job.clone())
    }

    // A pause requested after `settle` is still waited out; `Paused` never
    // goes straight to `Finished`.
    fn complete(&self) -> Result<()> {
        let mut job = self.lock();
        while job.state == JobState::Paused {
            job = match self.changed.wait_timeout(job, PAUSE_POLL) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        if job.state == JobState::Cancelled {
            return Err(Lz86Error::Cancelled);
        }
        job.state = JobState::Finished;
        Ok(())
    }

    fn fail(&self, e: &Lz86Error) -> JobState {
        let mut job = self.lock();
        job.state = if matches!(e, Lz86Error::Cancelled) || job.state == JobState::Cancelled {
            JobState::Cancelled
        } else {
            JobState::Failed
        };
        job.state
    }

    fn set_total(&self, total: u64) {
        self.lock().total_bytes = total;
    }

    fn compress(
        &self,
        job: &CompressionJob,
        observer: &mut dyn ProgressObserver,
    ) -> Result<Outcome> {
        let input = read_source(&job.source)?;
        let total = input.len() as u64;
        self.set_total(total);

        let mut ticker = Ticker::new(self, job, total, observer);
        let container = adapter::encode(
            self.codec.as_ref(),
            &input,
            &self.options.codec_params(),
            &mut |bytes_in, bytes_out| ticker.on_codec(bytes_in, bytes_out),
        )?;
        // The codec never reports its own completion.
        let output_bytes = container.len() as u64;
        let last = ticker.tick(total, output_bytes, true);
        ticker.settle()?;

        write_target(&job.target, &container)?;
        Ok(Outcome {
            input_bytes: total,
            output_bytes,
            last,
        })
    }

    fn decompress(
        &self,
        job: &CompressionJob,
        observer: &mut dyn ProgressObserver,
    ) -> Result<Outcome> {
        let container = read_source(&job.source)?;
        let total = read_uncompressed_size(&container)?;
        self.set_total(total);

        let mut ticker = Ticker::new(self, job, total, observer);
        // Decoded bytes measure progress; consumed bytes are the "emitted" side
        // so the ratio reads compressed / original in both directions.
        let data = adapter::decode(
            self.codec.as_ref(),
            &container,
            &mut |bytes_in, bytes_out| ticker.on_codec(bytes_out, bytes_in),
        )?;
        let input_bytes = container.len() as u64;
        let last = ticker.tick(total, input_bytes, true);
        ticker.settle()?;

        write_target(&job.target, &data)?;
        Ok(Outcome {
            input_bytes,
            output_bytes: data.len() as u64,
            last,
        })
    }
}

/// Progress state for one run: estimator, counters, observer fan-out and the
/// cooperative pause point.
struct Ticker<'a> {
    ctl: &'a JobController,
    job: &'a CompressionJob,
    total: u64,
    est: Estimator,
    observer: &'a mut dyn ProgressObserver,
}

impl<'a> Ticker<'a> {
    fn new(
        ctl: &'a JobController,
        job: &'a CompressionJob,
        total: u64,
        observer: &'a mut dyn ProgressObserver,
    ) -> Self {
        Self {
            ctl,
            job,
            total,
            est: Estimator::start(total, ctl.clock.now()),
            observer,
        }
    }

    fn on_codec(&mut self, processed: u64, emitted: u64) -> ControlFlow<()> {
        self.tick(processed, emitted, false);
        self.checkpoint()
    }

    fn tick(&mut self, processed: u64, emitted: u64, is_final: bool) -> ProgressSample {
        let (processed, emitted) = {
            let mut job = self.ctl.lock();
            job.processed_bytes = job.processed_bytes.max(processed.min(self.total));
            job.emitted_bytes = job.emitted_bytes.max(emitted);
            (job.processed_bytes, job.emitted_bytes)
        };
        let sample = self.est.tick(processed, emitted, self.ctl.clock.now());
        self.observer.on_progress(&ProgressReport {
            mode: self.job.mode,
            source: &self.job.source,
            total_bytes: self.total,
            sample,
            is_final,
        });
        sample
    }

    /// Last control point after the forced final tick, so a pause or stop
    /// requested after the codec's last callback is still honored.
    fn settle(&mut self) -> Result<()> {
        match self.checkpoint() {
            ControlFlow::Continue(()) => Ok(()),
            ControlFlow::Break(()) => Err(Lz86Error::Cancelled),
        }
    }

    // Blocks here while paused; control requests take effect only here.
    fn checkpoint(&mut self) -> ControlFlow<()> {
        match self.ctl.state() {
            JobState::Running => ControlFlow::Continue(()),
            JobState::Paused => {
                self.est.on_pause(self.ctl.clock.now());
                debug!("paused at callback boundary");
                self.observer.on_state(JobState::Paused);
                match self.wait_while_paused() {
                    JobState::Running => {
                        self.est.on_resume(self.ctl.clock.now());
                        debug!("resumed");
                        self.observer.on_state(JobState::Running);
                        ControlFlow::Continue(())
                    }
                    _ => ControlFlow::Break(()),
                }
            }
            _ => ControlFlow::Break(()),
        }
    }

    fn wait_while_paused(&self) -> JobState {
        let mut job = self.ctl.lock();
        while job.state == JobState::Paused {
            job = match self.ctl.changed.wait_timeout(job, PAUSE_POLL) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        job.state
    }
}

fn read_source(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| Lz86Error::SourceOpenFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// Partial output is left on disk when the write falls short.
fn write_target(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut out = File::create(path).map_err(|source| Lz86Error::TargetOpenFailed {
        path: path.to_path_buf(),
        source,
    })?;
    let incomplete = |written: usize, source: io::Error| Lz86Error::IncompleteWrite {
        path: path.to_path_buf(),
        written: written as u64,
        expected: bytes.len() as u64,
        source,
    };
    let mut written = 0usize;
    while written < bytes.len() {
        match out.write(&bytes[written..]) {
            Ok(0) => return Err(incomplete(written, io::ErrorKind::WriteZero.into())),
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(incomplete(written, e)),
        }
    }
    out.flush().map_err(|e| incomplete(written, e))?;
    Ok(())
}

/// Original size of a container, read from its header alone.
pub fn query_size(path: &Path) -> Result<u64> {
    let mut f = File::open(path).map_err(|source| Lz86Error::SourceOpenFailed {
        path: path.to_path_buf(),
        source,
    })?;
    read_size_at(&mut f)
}
