//! Backend abstraction consumed by the navigator.
//!
//! A backend provides input primitives (buttons or finger gestures) and
//! observation of the device screen:
//! - `EmulatorBackend` renders an application model in-process and can
//!   take screenshots
//! - `PhysicalBackend` drives a real device through an operator and cannot
//! - `StubBackend` replays scripted answers for unit tests

use regex::Regex;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use super::types::{BackendError, BackendResult, Crop, ScreenContent, SwipeDirection};

/// Interval between two screen reads in the provided wait helpers
pub const TEXT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Trait for device backends
pub trait Backend {
    /// Whether screenshots can be taken (false for physical devices)
    fn supports_snapshots(&self) -> bool;

    /// Press then release the right button
    fn right_click(&mut self) -> BackendResult<()>;

    /// Press then release the left button
    fn left_click(&mut self) -> BackendResult<()>;

    /// Press both buttons, then release them
    fn both_click(&mut self) -> BackendResult<()>;

    /// Touch the screen at `(x, y)`, holding for `delay`
    fn finger_touch(&mut self, x: u32, y: u32, delay: Duration) -> BackendResult<()>;

    /// Swipe from `(x, y)` toward `direction`, taking `delay`
    fn finger_swipe(
        &mut self,
        x: u32,
        y: u32,
        direction: SwipeDirection,
        delay: Duration,
    ) -> BackendResult<()>;

    /// Compare the current screen with a golden image
    ///
    /// With `golden_run` the golden file is (over)written with the current
    /// frame and the comparison always succeeds. When `tmp_snap_path` is
    /// given the current frame is written there whatever the outcome.
    fn compare_screen_with_snapshot(
        &mut self,
        golden_snap_path: &Path,
        crop: Option<Crop>,
        tmp_snap_path: Option<&Path>,
        golden_run: bool,
    ) -> BackendResult<bool>;

    /// Whether a line of the current screen matches `pattern` (a regex)
    fn compare_screen_with_text(&mut self, pattern: &str) -> BackendResult<bool> {
        let content = self.get_current_screen_content()?;
        screen_matches(&content, pattern)
    }

    /// Block until the screen differs from the last observed one
    fn wait_for_screen_change(&mut self, timeout: Duration) -> BackendResult<ScreenContent>;

    /// Read the current screen without waiting
    fn get_current_screen_content(&mut self) -> BackendResult<ScreenContent>;

    /// Block until the application home screen is displayed
    fn wait_for_home_screen(&mut self, timeout: Duration) -> BackendResult<()>;

    /// Block until `text` is displayed
    fn wait_for_text_on_screen(&mut self, text: &str, timeout: Duration) -> BackendResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.get_current_screen_content()?.contains(text) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BackendError::TextNotShown(text.to_string()));
            }
            thread::sleep(TEXT_POLL_INTERVAL);
        }
    }

    /// Block until `text` is no longer displayed
    fn wait_for_text_not_on_screen(&mut self, text: &str, timeout: Duration) -> BackendResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if !self.get_current_screen_content()?.contains(text) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BackendError::TextStillShown(text.to_string()));
            }
            thread::sleep(TEXT_POLL_INTERVAL);
        }
    }
}

/// Whether any line of `content` matches the regex `pattern`
pub fn screen_matches(content: &ScreenContent, pattern: &str) -> BackendResult<bool> {
    let regex = Regex::new(pattern)?;
    Ok(content.lines.iter().any(|line| regex.is_match(line)))
}
