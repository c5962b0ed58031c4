use std::fs::File;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use lz86_core::error::Result;
use lz86_core::progress::format::{millis_to_string, ratio_to_string, size_to_string};
use lz86_core::{
    ContainerHeader, HEADER_LEN, JobController, JobOptions, JobReport, JobState, Mode,
    ProgressObserver, ProgressReport, query_size,
};
use serde_json::json;
use tracing::{debug, info};

use crate::presentation::cli::CodecArgs;

/// Global output switches shared by every command.
#[derive(Clone, Copy, Debug, Default)]
pub struct Surface {
    pub quiet: bool,
    pub json: bool,
    pub interactive: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Key {
    Toggle,
    Stop,
    Hide,
}

fn parse_key(c: char) -> Option<Key> {
    match c.to_ascii_lowercase() {
        'p' | ' ' => Some(Key::Toggle),
        's' | 'q' => Some(Key::Stop),
        'h' => Some(Key::Hide),
        _ => None,
    }
}

fn apply_key(ctl: &JobController, key: Key) {
    let res = match key {
        Key::Toggle => ctl.pause_or_resume().map(|_| ()),
        Key::Stop => ctl.stop(),
        Key::Hide => {
            if ctl.is_hidden() {
                ctl.show();
            } else {
                ctl.hide();
            }
            Ok(())
        }
    };
    if let Err(e) = res {
        debug!(error = %e, "control key ignored");
    }
}

/// Feeds stdin keys to the controller. The thread is detached; a blocking
/// read outliving the job is dropped at process exit.
fn spawn_key_reader(ctl: Arc<JobController>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            for key in line.chars().filter_map(parse_key) {
                apply_key(&ctl, key);
            }
            if ctl.state().is_terminal() {
                break;
            }
        }
    });
}

fn options_from(codec: CodecArgs) -> JobOptions {
    JobOptions {
        level: codec.level,
        dictionary_size: codec.dict_size,
        suffix: codec.suffix,
        ..Default::default()
    }
}

/// Redraws one status line on stderr.
struct TerminalObserver {
    ctl: Arc<JobController>,
    quiet: bool,
    drawn: usize,
}

impl TerminalObserver {
    fn draw(&mut self, line: &str) {
        let mut err = io::stderr().lock();
        let pad = self.drawn.saturating_sub(line.len());
        let _ = write!(err, "\r{line}{:pad$}", "");
        let _ = err.flush();
        self.drawn = line.len();
    }

    fn end_line(&mut self) {
        if self.drawn > 0 {
            eprintln!();
            self.drawn = 0;
        }
    }
}

impl ProgressObserver for TerminalObserver {
    fn on_progress(&mut self, report: &ProgressReport<'_>) {
        if self.quiet || self.ctl.is_hidden() {
            return;
        }
        self.draw(&report.status_line());
    }

    fn on_state(&mut self, state: JobState) {
        if self.quiet {
            return;
        }
        match state {
            JobState::Paused if !self.ctl.is_hidden() => {
                self.draw("[paused] press p to resume, s to stop")
            }
            JobState::Cancelled | JobState::Failed => self.end_line(),
            _ => {}
        }
    }

    fn on_finished(&mut self, _report: &JobReport) {
        self.end_line();
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(io::Error::from)?;
    println!("{text}");
    Ok(())
}

fn print_report(report: &JobReport, surface: &Surface) -> Result<()> {
    if surface.json {
        return print_json(report);
    }
    if surface.quiet {
        return Ok(());
    }
    let verb = match report.mode {
        Mode::Compress => "compressed",
        Mode::Decompress => "decompressed",
    };
    println!(
        "{verb} {} -> {}: {} -> {} (ratio {}, {})",
        report.source.display(),
        report.target.display(),
        size_to_string(report.input_bytes),
        size_to_string(report.output_bytes),
        ratio_to_string(report.ratio_percent),
        millis_to_string(report.elapsed_ms),
    );
    Ok(())
}

pub fn handle_job(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    mode: Option<Mode>,
    codec: CodecArgs,
    surface: &Surface,
) -> Result<()> {
    let ctl = Arc::new(JobController::configure(
        input.as_deref(),
        output.as_deref(),
        mode,
        options_from(codec),
    )?);
    if surface.interactive {
        info!("interactive controls on stdin: p pause/resume, s stop, h hide");
        spawn_key_reader(ctl.clone());
    }

    let mut observer = TerminalObserver {
        ctl: ctl.clone(),
        quiet: surface.quiet || surface.json,
        drawn: 0,
    };
    let report = ctl.run(&mut observer)?;
    print_report(&report, surface)
}

pub fn handle_size(container: PathBuf, surface: &Surface) -> Result<()> {
    let size = query_size(&container)?;
    if surface.json {
        return print_json(&json!({
            "path": container,
            "uncompressed_size": size,
        }));
    }
    println!("{size}");
    Ok(())
}

fn read_header(path: &Path) -> Result<(ContainerHeader, u64)> {
    let f = File::open(path)?;
    let file_len = f.metadata()?.len();
    let mut buf = Vec::with_capacity(HEADER_LEN);
    f.take(HEADER_LEN as u64).read_to_end(&mut buf)?;
    Ok((ContainerHeader::parse(&buf)?, file_len))
}

pub fn handle_info(container: PathBuf, surface: &Surface) -> Result<()> {
    let (hdr, file_len) = read_header(&container)?;
    let (lc, lp, pb) = hdr.lc_lp_pb();
    let payload = file_len.saturating_sub(HEADER_LEN as u64);
    if surface.json {
        return print_json(&json!({
            "path": container,
            "filter_id": hdr.filter_id,
            "props": hdr.props_hex(),
            "lc": lc,
            "lp": lp,
            "pb": pb,
            "dictionary_size": hdr.dictionary_size(),
            "uncompressed_size": hdr.uncompressed_size,
            "payload_bytes": payload,
        }));
    }
    println!("file:        {}", container.display());
    println!("filter:      {}", hdr.filter_id);
    println!("props:       {} (lc={lc} lp={lp} pb={pb})", hdr.props_hex());
    println!(
        "dictionary:  {}",
        size_to_string(u64::from(hdr.dictionary_size()))
    );
    println!("original:    {}", size_to_string(hdr.uncompressed_size));
    println!("payload:     {}", size_to_string(payload));
    Ok(())
}
