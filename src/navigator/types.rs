// Errors, configuration and call options of the navigator

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::instruction::NavInsId;
use crate::backend::types::{BackendError, Crop};
use crate::device::Device;
use crate::snapshot::SnapshotError;

/// Result type for navigation operations
pub type NavResult<T> = Result<T, NavError>;

/// Error types for navigation operations
#[derive(Debug)]
pub enum NavError {
    /// No callback registered for the instruction on this navigator
    NotImplemented(NavInsId),

    /// A callback is already registered and overriding was not allowed
    CallbackExists(NavInsId),

    /// Instruction name that is not part of the vocabulary
    UnknownInstruction(String),

    /// Instruction arguments do not fit its callback
    InvalidArgument { id: NavInsId, reason: String },

    /// Navigator family does not drive this device
    UnsupportedDevice { device: Device, family: &'static str },

    /// Golden directory does not exist outside of a golden run
    GoldenDirMissing(PathBuf),

    /// Test case name cannot be used as a directory
    InvalidCaseName(PathBuf),

    /// Screen differs from its golden snapshot
    ScreenMismatch { index: usize, golden: PathBuf, tmp: PathBuf },

    /// Awaited screen state never showed up
    Timeout(TimeoutError),

    /// Backend error
    Backend(BackendError),

    /// I/O error
    Io(std::io::Error),
}

impl std::fmt::Display for NavError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NavError::NotImplemented(id) => {
                write!(f, "Instruction {} is not implemented on this navigator", id)
            }
            NavError::CallbackExists(id) => {
                write!(f, "A callback is already registered for {}", id)
            }
            NavError::UnknownInstruction(name) => write!(f, "Unknown instruction '{}'", name),
            NavError::InvalidArgument { id, reason } => {
                write!(f, "Invalid argument for {}: {}", id, reason)
            }
            NavError::UnsupportedDevice { device, family } => {
                write!(f, "Device {} cannot be driven by a {} navigator", device, family)
            }
            NavError::GoldenDirMissing(path) => write!(
                f,
                "Golden snapshots directory ({}) does not exist.",
                path.display()
            ),
            NavError::InvalidCaseName(name) => {
                write!(f, "Invalid test case name '{}'", name.display())
            }
            NavError::ScreenMismatch { tmp, .. } => {
                write!(f, "Screen does not match golden {}.", tmp.display())
            }
            NavError::Timeout(err) => write!(f, "{}", err),
            NavError::Backend(err) => write!(f, "{}", err),
            NavError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for NavError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NavError::Timeout(err) => Some(err),
            NavError::Backend(err) => Some(err),
            NavError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BackendError> for NavError {
    fn from(err: BackendError) -> Self {
        NavError::Backend(err)
    }
}

impl From<TimeoutError> for NavError {
    fn from(err: TimeoutError) -> Self {
        NavError::Timeout(err)
    }
}

impl From<std::io::Error> for NavError {
    fn from(err: std::io::Error) -> Self {
        NavError::Io(err)
    }
}

impl From<SnapshotError> for NavError {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::GoldenDirMissing(path) => NavError::GoldenDirMissing(path),
            SnapshotError::InvalidCaseName(name) => NavError::InvalidCaseName(name),
            SnapshotError::Io(err) => NavError::Io(err),
        }
    }
}

/// Ways a bounded navigation loop can run out of time
///
/// Each variant carries what was being waited for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeoutError {
    /// The flow never started: the first snapshot was not displayed
    FirstSnapshot(PathBuf),

    /// The flow never converged to the last snapshot
    Snapshot(PathBuf),

    /// The validation did not move the screen away from the last snapshot
    ScreenUnchanged(PathBuf),

    /// The text was never displayed
    Text(String),
}

impl std::fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeoutError::FirstSnapshot(path) => {
                write!(f, "Could not find first snapshot {}", path.display())
            }
            TimeoutError::Snapshot(path) => write!(f, "Timeout waiting for snap {}", path.display()),
            TimeoutError::ScreenUnchanged(path) => write!(
                f,
                "Timeout waiting for screen change after last snapshot : {}",
                path.display()
            ),
            TimeoutError::Text(text) => write!(f, "Timeout waiting for text '{}'", text),
        }
    }
}

impl std::error::Error for TimeoutError {}

// ============================================================================
// Configuration
// ============================================================================

/// Default interval between two snapshot comparison attempts (milliseconds)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 20;

/// Default bound of a screen-change wait (milliseconds)
pub const DEFAULT_SCREEN_CHANGE_TIMEOUT_MS: u64 = 10_000;

/// Settle pauses of `navigate_and_compare`
///
/// The screen-change waits cover most of the latency of a step; these
/// pauses absorb rendering that keeps going after the first change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitTimings {
    /// Before the first comparison
    pub before_first: Duration,
    /// After each instruction but the last
    pub between: Duration,
    /// After the last instruction, before the final comparison
    pub after_last: Duration,
}

impl Default for WaitTimings {
    fn default() -> Self {
        Self {
            before_first: Duration::from_millis(100),
            between: Duration::from_millis(20),
            after_last: Duration::from_millis(50),
        }
    }
}

impl WaitTimings {
    /// No pause at all
    pub fn none() -> Self {
        Self {
            before_first: Duration::ZERO,
            between: Duration::ZERO,
            after_last: Duration::ZERO,
        }
    }

    pub fn scaled(&self, multipliers: &WaitMultipliers) -> Self {
        Self {
            before_first: self.before_first * multipliers.before_first,
            between: self.between * multipliers.between,
            after_last: self.after_last * multipliers.after_last,
        }
    }
}

/// Factors applied to [`WaitTimings`] while recording goldens, where a
/// frame captured too early would become the reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitMultipliers {
    pub before_first: u32,
    pub between: u32,
    pub after_last: u32,
}

impl Default for WaitMultipliers {
    fn default() -> Self {
        Self {
            before_first: 2,
            between: 5,
            after_last: 2,
        }
    }
}

/// Navigator settings, fixed for the navigator lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigatorConfig {
    /// Record golden snapshots instead of comparing against them
    pub golden_run: bool,
    /// Pause between two snapshot comparison attempts
    pub poll_interval: Duration,
    /// Default bound of screen-change waits
    pub screen_change_timeout: Duration,
    /// How long the first snapshot of `navigate_until_snap` may take to show
    pub first_snapshot_timeout: Duration,
    /// Bound of a single search attempt for the last snapshot
    pub snapshot_attempt_timeout: Duration,
    /// How long the screen may keep showing the last snapshot after validation
    pub last_screen_update_timeout: Duration,
    pub timings: WaitTimings,
    pub golden_run_multipliers: WaitMultipliers,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            golden_run: false,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            screen_change_timeout: Duration::from_millis(DEFAULT_SCREEN_CHANGE_TIMEOUT_MS),
            first_snapshot_timeout: Duration::from_secs(2),
            snapshot_attempt_timeout: Duration::from_millis(500),
            last_screen_update_timeout: Duration::from_secs(2),
            timings: WaitTimings::default(),
            golden_run_multipliers: WaitMultipliers::default(),
        }
    }
}

impl NavigatorConfig {
    pub fn golden_run(mut self, golden_run: bool) -> Self {
        self.golden_run = golden_run;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn screen_change_timeout(mut self, timeout: Duration) -> Self {
        self.screen_change_timeout = timeout;
        self
    }

    pub fn first_snapshot_timeout(mut self, timeout: Duration) -> Self {
        self.first_snapshot_timeout = timeout;
        self
    }

    pub fn snapshot_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.snapshot_attempt_timeout = timeout;
        self
    }

    pub fn last_screen_update_timeout(mut self, timeout: Duration) -> Self {
        self.last_screen_update_timeout = timeout;
        self
    }

    pub fn timings(mut self, timings: WaitTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn golden_run_multipliers(mut self, multipliers: WaitMultipliers) -> Self {
        self.golden_run_multipliers = multipliers;
        self
    }

    /// Settle pauses for this run, scaled up when recording goldens
    pub fn effective_timings(&self) -> WaitTimings {
        if self.golden_run {
            self.timings.scaled(&self.golden_run_multipliers)
        } else {
            self.timings
        }
    }
}

// ============================================================================
// Call options
// ============================================================================

/// Options of `navigate_and_compare`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompareOptions {
    /// Bound of every screen-change wait
    pub timeout: Duration,
    /// Wait for a screen change before the first comparison
    pub screen_change_before_first_instruction: bool,
    /// Wait for a screen change after the last instruction
    pub screen_change_after_last_instruction: bool,
    /// Index of the first frame, earlier frames are kept in the tmp directory
    pub snap_start_idx: usize,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_SCREEN_CHANGE_TIMEOUT_MS),
            screen_change_before_first_instruction: true,
            screen_change_after_last_instruction: true,
            snap_start_idx: 0,
        }
    }
}

impl CompareOptions {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn screen_change_before_first_instruction(mut self, wait: bool) -> Self {
        self.screen_change_before_first_instruction = wait;
        self
    }

    pub fn screen_change_after_last_instruction(mut self, wait: bool) -> Self {
        self.screen_change_after_last_instruction = wait;
        self
    }

    pub fn snap_start_idx(mut self, idx: usize) -> Self {
        self.snap_start_idx = idx;
        self
    }
}

/// Options of `navigate_until_snap`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UntilSnapOptions {
    /// Save the frame of every step in the tmp directory
    pub take_snaps: bool,
    /// Bound of the whole search
    pub timeout: Duration,
    /// Region of the first snapshot used for comparison
    pub crop_first: Option<Crop>,
    /// Region of the last snapshot used for comparison
    pub crop_last: Option<Crop>,
}

impl Default for UntilSnapOptions {
    fn default() -> Self {
        Self {
            take_snaps: true,
            timeout: Duration::from_secs(30),
            crop_first: None,
            crop_last: None,
        }
    }
}

impl UntilSnapOptions {
    pub fn take_snaps(mut self, take: bool) -> Self {
        self.take_snaps = take;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn crop_first(mut self, crop: Crop) -> Self {
        self.crop_first = Some(crop);
        self
    }

    pub fn crop_last(mut self, crop: Crop) -> Self {
        self.crop_last = Some(crop);
        self
    }
}

/// Options of `navigate_until_text_and_compare` and `navigate_until_text`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UntilTextOptions {
    /// Bound of the whole search
    pub timeout: Duration,
    pub screen_change_before_first_instruction: bool,
    pub screen_change_after_last_instruction: bool,
    pub snap_start_idx: usize,
}

impl Default for UntilTextOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            screen_change_before_first_instruction: true,
            screen_change_after_last_instruction: true,
            snap_start_idx: 0,
        }
    }
}

impl UntilTextOptions {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn screen_change_before_first_instruction(mut self, wait: bool) -> Self {
        self.screen_change_before_first_instruction = wait;
        self
    }

    pub fn screen_change_after_last_instruction(mut self, wait: bool) -> Self {
        self.screen_change_after_last_instruction = wait;
        self
    }

    pub fn snap_start_idx(mut self, idx: usize) -> Self {
        self.snap_start_idx = idx;
        self
    }
}
