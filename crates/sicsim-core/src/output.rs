//! Step observers that persist or retain run output.
//!
//! [`CsvRecorder`] writes the per-run summary file and the per-step frame
//! files. A write failure is logged once, the failing sink is switched off,
//! and the simulation carries on; the lattices are never touched from here.
//! [`MemoryRecorder`] keeps the same data in memory for tests and the
//! headless harness.

use serde::Serialize;
use sicsim_logic::analysis::StepSummary;
use sicsim_logic::constants::output::FRAME_INDEX_WIDTH;
use sicsim_logic::lattice::Lattice;
use sicsim_logic::treatment::Scenario;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::engine::{Frame, StepObserver};
use crate::error::OutputError;

/// What a recorder writes besides the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecorderOptions {
    /// Write full-lattice frames at all.
    pub write_frames: bool,
    /// Only steps divisible by this get a frame. Values below 1 are treated as 1.
    pub frame_interval: u32,
}

impl Default for RecorderOptions {
    fn default() -> Self {
        Self {
            write_frames: true,
            frame_interval: 1,
        }
    }
}

/// Counters returned when a recorder is finished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecorderStats {
    pub rows_written: u64,
    pub frames_written: u64,
    /// Sinks switched off after a failure (0, 1 or 2).
    pub failed_sinks: usize,
}

/// `results_<scenario>.csv`
pub fn summary_file_name(scenario: Scenario) -> String {
    format!("results_{}.csv", scenario.name())
}

/// `data_<scenario>`
pub fn frame_dir_name(scenario: Scenario) -> String {
    format!("data_{}", scenario.name())
}

/// Zero-pad width for the frame index of a run of `total_steps` steps.
///
/// Never below [`FRAME_INDEX_WIDTH`], and wide enough for the last step so
/// every frame name of the run has the same length.
pub fn frame_index_width(total_steps: u32) -> usize {
    let last = total_steps.saturating_sub(1);
    let digits = last.checked_ilog10().map_or(1, |d| d as usize + 1);
    digits.max(FRAME_INDEX_WIDTH)
}

/// `frame_<step>.csv` with the step zero-padded to `width`.
pub fn frame_file_name(step: u32, width: usize) -> String {
    format!("frame_{:0width$}.csv", step, width = width)
}

#[derive(Serialize)]
struct SummaryRow {
    time: u32,
    mean_infection: f64,
    mean_callose: f64,
    drug_concentration: f64,
}

impl From<&StepSummary> for SummaryRow {
    fn from(s: &StepSummary) -> Self {
        Self {
            time: s.step,
            mean_infection: s.mean_infection,
            mean_callose: s.mean_defense,
            drug_concentration: s.drug_concentration,
        }
    }
}

#[derive(Serialize)]
struct FrameRow {
    i: usize,
    j: usize,
    infection: f64,
    callose: f64,
    drug: f64,
}

/// Writes CSV output for one scenario run.
pub struct CsvRecorder {
    summary_path: PathBuf,
    summary: Option<csv::Writer<File>>,
    frames_dir: PathBuf,
    frames_enabled: bool,
    frames_dir_ready: bool,
    frame_interval: u32,
    frame_index_width: usize,
    rows_written: u64,
    frames_written: u64,
    failures: Vec<OutputError>,
}

impl CsvRecorder {
    /// Open the summary file under `out_dir` for a run of `total_steps` steps.
    /// Failure to open it disables the summary sink only; frames are still
    /// attempted.
    pub fn new(
        out_dir: impl AsRef<Path>,
        scenario: Scenario,
        total_steps: u32,
        options: RecorderOptions,
    ) -> Self {
        let out_dir = out_dir.as_ref();
        let mut recorder = Self {
            summary_path: out_dir.join(summary_file_name(scenario)),
            summary: None,
            frames_dir: out_dir.join(frame_dir_name(scenario)),
            frames_enabled: options.write_frames,
            frames_dir_ready: false,
            frame_interval: options.frame_interval.max(1),
            frame_index_width: frame_index_width(total_steps),
            rows_written: 0,
            frames_written: 0,
            failures: Vec::new(),
        };

        match open_summary(out_dir, &recorder.summary_path) {
            Ok(writer) => recorder.summary = Some(writer),
            Err(err) => recorder.fail_summary(err),
        }
        recorder
    }

    pub fn summary_path(&self) -> &Path {
        &self.summary_path
    }

    pub fn frames_dir(&self) -> &Path {
        &self.frames_dir
    }

    /// Errors that switched a sink off, in the order they happened.
    pub fn failures(&self) -> &[OutputError] {
        &self.failures
    }

    /// Flush the summary and report what was written.
    pub fn finish(mut self) -> RecorderStats {
        if let Some(mut writer) = self.summary.take() {
            if let Err(err) = writer.flush() {
                let err = OutputError::io(&self.summary_path, err);
                self.fail_summary(err);
            }
        }
        RecorderStats {
            rows_written: self.rows_written,
            frames_written: self.frames_written,
            failed_sinks: self.failures.len(),
        }
    }

    fn write_summary(&mut self, summary: &StepSummary) {
        let Some(writer) = self.summary.as_mut() else {
            return;
        };
        match writer.serialize(SummaryRow::from(summary)) {
            Ok(()) => self.rows_written += 1,
            Err(err) => {
                let err = OutputError::csv(&self.summary_path, err);
                self.fail_summary(err);
            }
        }
    }

    fn write_frame(&mut self, frame: &Frame<'_>) {
        if !self.frames_enabled || frame.step % self.frame_interval != 0 {
            return;
        }
        if !self.frames_dir_ready {
            if let Err(err) = fs::create_dir_all(&self.frames_dir) {
                let err = OutputError::io(&self.frames_dir, err);
                self.fail_frames(err);
                return;
            }
            self.frames_dir_ready = true;
        }

        let path = self.frames_dir.join(frame_file_name(frame.step, self.frame_index_width));
        match write_frame_file(&path, frame) {
            Ok(()) => self.frames_written += 1,
            Err(err) => self.fail_frames(err),
        }
    }

    fn fail_summary(&mut self, err: OutputError) {
        log::warn!("Summary output disabled: {}", err);
        self.summary = None;
        self.failures.push(err);
    }

    fn fail_frames(&mut self, err: OutputError) {
        log::warn!("Frame output disabled: {}", err);
        self.frames_enabled = false;
        self.failures.push(err);
    }
}

impl StepObserver for CsvRecorder {
    fn observe(&mut self, summary: &StepSummary, frame: &Frame<'_>) {
        self.write_summary(summary);
        self.write_frame(frame);
    }
}

fn open_summary(out_dir: &Path, path: &Path) -> Result<csv::Writer<File>, OutputError> {
    fs::create_dir_all(out_dir).map_err(|e| OutputError::io(out_dir, e))?;
    csv::Writer::from_path(path).map_err(|e| OutputError::csv(path, e))
}

fn write_frame_file(path: &Path, frame: &Frame<'_>) -> Result<(), OutputError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| OutputError::csv(path, e))?;
    for ((i, j), infection) in frame.infection.indexed_iter() {
        let row = FrameRow {
            i,
            j,
            infection,
            callose: frame.defense[(i, j)],
            drug: frame.drug_concentration,
        };
        writer.serialize(row).map_err(|e| OutputError::csv(path, e))?;
    }
    writer.flush().map_err(|e| OutputError::io(path, e))
}

/// Full state retained by [`MemoryRecorder`].
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub step: u32,
    pub infection: Lattice,
    pub defense: Lattice,
    pub drug_concentration: f64,
}

/// Keeps summaries and, every `frame_interval` steps, a copy of both lattices.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecorder {
    pub summaries: Vec<StepSummary>,
    pub frames: Vec<FrameSnapshot>,
    frame_interval: Option<u32>,
}

impl MemoryRecorder {
    /// Summaries only.
    pub fn summaries_only() -> Self {
        Self::default()
    }

    /// Summaries plus a snapshot every `frame_interval` steps.
    pub fn with_frames(frame_interval: u32) -> Self {
        Self {
            frame_interval: Some(frame_interval.max(1)),
            ..Self::default()
        }
    }
}

impl StepObserver for MemoryRecorder {
    fn observe(&mut self, summary: &StepSummary, frame: &Frame<'_>) {
        self.summaries.push(*summary);
        if let Some(k) = self.frame_interval {
            if frame.step % k == 0 {
                self.frames.push(FrameSnapshot {
                    step: frame.step,
                    infection: frame.infection.clone(),
                    defense: frame.defense.clone(),
                    drug_concentration: frame.drug_concentration,
                });
            }
        }
    }
}
