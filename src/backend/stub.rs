//! Scripted backend for unit tests of code built on [`Backend`].
//!
//! Every call is recorded. Comparisons and screen-change waits answer from
//! queues filled by the test, falling back to configurable defaults once a
//! queue is empty.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::interface::Backend;
use super::types::{BackendError, BackendResult, Crop, ScreenContent, SwipeDirection};

/// A call received by the stub
#[derive(Debug, Clone, PartialEq)]
pub enum StubCall {
    RightClick,
    LeftClick,
    BothClick,
    Touch { x: u32, y: u32, delay: Duration },
    Swipe { x: u32, y: u32, direction: SwipeDirection },
    CompareSnapshot { golden: PathBuf, tmp: Option<PathBuf>, crop: Option<Crop>, golden_run: bool },
    CompareText(String),
    WaitForScreenChange(Duration),
    GetScreenContent,
    WaitForHomeScreen(Duration),
    WaitForText(String),
    WaitForNoText(String),
}

impl StubCall {
    /// Whether the call is an input action
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            StubCall::RightClick
                | StubCall::LeftClick
                | StubCall::BothClick
                | StubCall::Touch { .. }
                | StubCall::Swipe { .. }
        )
    }
}

#[derive(Debug, Clone)]
pub struct StubBackend {
    calls: Vec<StubCall>,
    snapshots: bool,
    snapshot_results: VecDeque<bool>,
    default_snapshot_result: bool,
    text_results: VecDeque<bool>,
    default_text_result: bool,
    screen_changes: VecDeque<bool>,
    default_screen_change: bool,
    screen: ScreenContent,
}

impl Default for StubBackend {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            snapshots: true,
            snapshot_results: VecDeque::new(),
            default_snapshot_result: true,
            text_results: VecDeque::new(),
            default_text_result: false,
            screen_changes: VecDeque::new(),
            default_screen_change: true,
            screen: ScreenContent::default(),
        }
    }
}

impl StubBackend {
    /// Snapshot-capable stub where every comparison matches and the screen
    /// always changes
    pub fn new() -> Self {
        Self::default()
    }

    pub fn supporting_snapshots(mut self, snapshots: bool) -> Self {
        self.snapshots = snapshots;
        self
    }

    /// Answers for the next snapshot comparisons
    pub fn snapshot_results(mut self, results: impl IntoIterator<Item = bool>) -> Self {
        self.snapshot_results.extend(results);
        self
    }

    pub fn default_snapshot_result(mut self, result: bool) -> Self {
        self.default_snapshot_result = result;
        self
    }

    /// Answers for the next text comparisons
    pub fn text_results(mut self, results: impl IntoIterator<Item = bool>) -> Self {
        self.text_results.extend(results);
        self
    }

    pub fn default_text_result(mut self, result: bool) -> Self {
        self.default_text_result = result;
        self
    }

    /// Outcome of the next screen-change waits (false times out)
    pub fn screen_changes(mut self, results: impl IntoIterator<Item = bool>) -> Self {
        self.screen_changes.extend(results);
        self
    }

    pub fn default_screen_change(mut self, changes: bool) -> Self {
        self.default_screen_change = changes;
        self
    }

    pub fn screen(mut self, lines: &[&str]) -> Self {
        self.screen = ScreenContent::new(lines.iter().map(|l| l.to_string()).collect());
        self
    }

    pub fn calls(&self) -> &[StubCall] {
        &self.calls
    }

    /// Input actions received, in order
    pub fn inputs(&self) -> Vec<&StubCall> {
        self.calls.iter().filter(|call| call.is_input()).collect()
    }

    /// Golden paths of the snapshot comparisons, in order
    pub fn compared_goldens(&self) -> Vec<&Path> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                StubCall::CompareSnapshot { golden, .. } => Some(golden.as_path()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: impl Fn(&StubCall) -> bool) -> usize {
        self.calls.iter().filter(|call| wanted(call)).count()
    }
}

impl Backend for StubBackend {
    fn supports_snapshots(&self) -> bool {
        self.snapshots
    }

    fn right_click(&mut self) -> BackendResult<()> {
        self.calls.push(StubCall::RightClick);
        Ok(())
    }

    fn left_click(&mut self) -> BackendResult<()> {
        self.calls.push(StubCall::LeftClick);
        Ok(())
    }

    fn both_click(&mut self) -> BackendResult<()> {
        self.calls.push(StubCall::BothClick);
        Ok(())
    }

    fn finger_touch(&mut self, x: u32, y: u32, delay: Duration) -> BackendResult<()> {
        self.calls.push(StubCall::Touch { x, y, delay });
        Ok(())
    }

    fn finger_swipe(
        &mut self,
        x: u32,
        y: u32,
        direction: SwipeDirection,
        _delay: Duration,
    ) -> BackendResult<()> {
        self.calls.push(StubCall::Swipe { x, y, direction });
        Ok(())
    }

    fn compare_screen_with_snapshot(
        &mut self,
        golden_snap_path: &Path,
        crop: Option<Crop>,
        tmp_snap_path: Option<&Path>,
        golden_run: bool,
    ) -> BackendResult<bool> {
        self.calls.push(StubCall::CompareSnapshot {
            golden: golden_snap_path.to_path_buf(),
            tmp: tmp_snap_path.map(Path::to_path_buf),
            crop,
            golden_run,
        });
        if let Some(tmp) = tmp_snap_path {
            fs::write(tmp, b"stub")?;
        }
        if golden_run {
            fs::write(golden_snap_path, b"stub")?;
            return Ok(true);
        }
        Ok(self
            .snapshot_results
            .pop_front()
            .unwrap_or(self.default_snapshot_result))
    }

    fn compare_screen_with_text(&mut self, pattern: &str) -> BackendResult<bool> {
        self.calls.push(StubCall::CompareText(pattern.to_string()));
        Ok(self.text_results.pop_front().unwrap_or(self.default_text_result))
    }

    fn wait_for_screen_change(&mut self, timeout: Duration) -> BackendResult<ScreenContent> {
        self.calls.push(StubCall::WaitForScreenChange(timeout));
        let changes = self
            .screen_changes
            .pop_front()
            .unwrap_or(self.default_screen_change);
        if changes {
            Ok(self.screen.clone())
        } else {
            Err(BackendError::ScreenChangeTimeout)
        }
    }

    fn get_current_screen_content(&mut self) -> BackendResult<ScreenContent> {
        self.calls.push(StubCall::GetScreenContent);
        Ok(self.screen.clone())
    }

    fn wait_for_home_screen(&mut self, timeout: Duration) -> BackendResult<()> {
        self.calls.push(StubCall::WaitForHomeScreen(timeout));
        Ok(())
    }

    fn wait_for_text_on_screen(&mut self, text: &str, _timeout: Duration) -> BackendResult<()> {
        self.calls.push(StubCall::WaitForText(text.to_string()));
        if self.screen.contains(text) {
            Ok(())
        } else {
            Err(BackendError::TextNotShown(text.to_string()))
        }
    }

    fn wait_for_text_not_on_screen(&mut self, text: &str, _timeout: Duration) -> BackendResult<()> {
        self.calls.push(StubCall::WaitForNoText(text.to_string()));
        if self.screen.contains(text) {
            Err(BackendError::TextStillShown(text.to_string()))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_answers_from_queues_then_defaults() {
        let mut stub = StubBackend::new()
            .snapshot_results([false])
            .text_results([true])
            .screen_changes([false]);

        let golden = Path::new("/nonexistent/00000.png");
        assert!(!stub.compare_screen_with_snapshot(golden, None, None, false).unwrap());
        assert!(stub.compare_screen_with_snapshot(golden, None, None, false).unwrap());
        assert!(stub.compare_screen_with_text("x").unwrap());
        assert!(!stub.compare_screen_with_text("x").unwrap());
        assert!(stub.wait_for_screen_change(Duration::ZERO).is_err());
        assert!(stub.wait_for_screen_change(Duration::ZERO).is_ok());
        assert_eq!(stub.calls().len(), 6);
    }

    #[test]
    fn test_stub_records_inputs() {
        let mut stub = StubBackend::new();
        stub.right_click().unwrap();
        stub.get_current_screen_content().unwrap();
        stub.finger_touch(1, 2, Duration::ZERO).unwrap();
        assert_eq!(
            stub.inputs(),
            vec![
                &StubCall::RightClick,
                &StubCall::Touch { x: 1, y: 2, delay: Duration::ZERO }
            ]
        );
    }
}
