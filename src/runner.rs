//! Types for navigation run reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::device::Device;
use crate::navigator::NavResult;
use crate::snapshot::{self, SnapshotResult, snap_index, snap_path};

/// One frame written during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Frame index in the flow (0 = screen before the first instruction)
    pub index: usize,

    /// Frame of this run
    pub tmp_path: PathBuf,

    /// Golden the frame was compared with
    pub golden_path: PathBuf,
}

/// Summary of a navigation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationReport {
    /// Whether the run completed successfully
    pub success: bool,

    /// Error message if failed
    pub error: Option<String>,

    pub device: Device,

    /// Test case name, if snapshots were compared
    pub case: Option<String>,

    pub golden_run: bool,

    /// Instructions as given, in their textual form
    pub instructions: Vec<String>,

    /// Navigation steps taken by a search loop (0 for plain runs)
    pub steps: usize,

    /// Frames written to the temporary directory
    pub frames: Vec<FrameRecord>,

    #[serde(with = "chrono::serde::ts_seconds")]
    pub started_at: DateTime<Utc>,

    pub duration_ms: u64,

    #[serde(skip)]
    started: Option<Instant>,
}

impl NavigationReport {
    /// Start a report; the clock runs until [`finish`](Self::finish)
    pub fn start(device: Device, case: Option<String>, golden_run: bool) -> Self {
        Self {
            success: false,
            error: None,
            device,
            case,
            golden_run,
            instructions: Vec::new(),
            steps: 0,
            frames: Vec::new(),
            started_at: Utc::now(),
            duration_ms: 0,
            started: Some(Instant::now()),
        }
    }

    pub fn instructions<T: ToString>(mut self, instructions: &[T]) -> Self {
        self.instructions = instructions.iter().map(ToString::to_string).collect();
        self
    }

    /// Record the outcome of the run
    pub fn finish(mut self, outcome: &NavResult<usize>) -> Self {
        match outcome {
            Ok(steps) => {
                self.success = true;
                self.steps = *steps;
            }
            Err(err) => self.error = Some(err.to_string()),
        }
        if let Some(started) = self.started.take() {
            self.duration_ms = started.elapsed().as_millis() as u64;
        }
        self
    }

    /// Collect the frames present in `tmp_dir`, pairing each with its golden
    pub fn collect_frames(mut self, tmp_dir: &Path, golden_dir: &Path) -> SnapshotResult<Self> {
        self.frames = snapshot::list_snaps(tmp_dir)?
            .into_iter()
            .filter_map(|path| {
                let index = snap_index(&path)?;
                Some(FrameRecord {
                    index,
                    golden_path: snap_path(golden_dir, index),
                    tmp_path: path,
                })
            })
            .collect();
        Ok(self)
    }
}
