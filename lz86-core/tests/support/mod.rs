#![allow(dead_code)]

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lz86_core::codec::{CodecParams, CodecStatus, Encoded, EntropyCodec, ProgressFn};
use lz86_core::container::header::PROPS_LEN;
use lz86_core::job::controller::JobController;
use lz86_core::progress::clock::ManualClock;
use lz86_core::progress::estimator::ProgressSample;
use lz86_core::{JobReport, JobState, ProgressObserver, ProgressReport};

pub const PROPS: [u8; PROPS_LEN] = [0x5d, 0x00, 0x00, 0x01, 0x00];

/// Stores input verbatim and reports `ticks` evenly spaced progress calls,
/// advancing the manual clock by `step` before each call and once more
/// before returning.
pub struct ScriptedCodec {
    pub ticks: u64,
    pub step: Duration,
    pub clock: Arc<ManualClock>,
    pub fail_with: Option<i32>,
}

impl ScriptedCodec {
    pub fn new(ticks: u64, step: Duration, clock: Arc<ManualClock>) -> Self {
        Self {
            ticks,
            step,
            clock,
            fail_with: None,
        }
    }

    fn drive(&self, len: u64, progress: &mut ProgressFn<'_>) -> Result<(), CodecStatus> {
        for k in 1..=self.ticks {
            self.clock.advance(self.step);
            let done = len * k / (self.ticks + 1);
            if progress(done, done / 2).is_break() {
                return Err(CodecStatus::Aborted);
            }
        }
        self.clock.advance(self.step);
        Ok(())
    }
}

impl EntropyCodec for ScriptedCodec {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn encode(
        &self,
        input: &[u8],
        output: &mut [u8],
        _params: &CodecParams,
        progress: &mut ProgressFn<'_>,
    ) -> Result<Encoded, CodecStatus> {
        if let Some(code) = self.fail_with {
            return Err(CodecStatus::Failed(code));
        }
        self.drive(input.len() as u64, progress)?;
        if output.len() < input.len() {
            return Err(CodecStatus::OutputFull);
        }
        output[..input.len()].copy_from_slice(input);
        Ok(Encoded {
            len: input.len(),
            props: PROPS,
        })
    }

    fn decode(
        &self,
        _props: &[u8; PROPS_LEN],
        payload: &[u8],
        _expected_len: u64,
        progress: &mut ProgressFn<'_>,
    ) -> Result<Vec<u8>, CodecStatus> {
        if let Some(code) = self.fail_with {
            return Err(CodecStatus::Failed(code));
        }
        self.drive(payload.len() as u64, progress)?;
        Ok(payload.to_vec())
    }
}

type TickHook = Box<dyn FnMut(&Arc<JobController>, usize) + Send>;
type StateHook = Box<dyn FnMut(&Arc<JobController>, JobState) + Send>;

/// Observer that records everything and lets a test poke the controller
/// from inside callbacks.
pub struct Recorder {
    pub ctl: Arc<JobController>,
    pub samples: Vec<(ProgressSample, bool)>,
    pub states: Vec<JobState>,
    pub finished: Option<JobReport>,
    pub on_tick: Option<TickHook>,
    pub on_state: Option<StateHook>,
}

impl Recorder {
    pub fn new(ctl: Arc<JobController>) -> Self {
        Self {
            ctl,
            samples: Vec::new(),
            states: Vec::new(),
            finished: None,
            on_tick: None,
            on_state: None,
        }
    }
}

impl ProgressObserver for Recorder {
    fn on_progress(&mut self, report: &ProgressReport<'_>) {
        self.samples.push((report.sample, report.is_final));
        if !report.is_final {
            let idx = self.samples.len();
            if let Some(hook) = self.on_tick.as_mut() {
                hook(&self.ctl, idx);
            }
        }
    }

    fn on_state(&mut self, state: JobState) {
        self.states.push(state);
        if let Some(hook) = self.on_state.as_mut() {
            hook(&self.ctl, state);
        }
    }

    fn on_finished(&mut self, report: &JobReport) {
        self.finished = Some(report.clone());
    }
}

/// Shared slot for results produced inside hooks.
pub fn slot<T>() -> Arc<Mutex<Option<T>>> {
    Arc::new(Mutex::new(None))
}

pub fn keep_going(_: u64, _: u64) -> ControlFlow<()> {
    ControlFlow::Continue(())
}
