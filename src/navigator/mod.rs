//! Navigation engine.
//!
//! A [`Navigator`] runs instructions against a backend through a callback
//! table built for one device family, and checks every step of a flow
//! against golden snapshots.
//!
//! # Example
//!
//! ```ignore
//! let mut navigator = Navigator::for_device(backend, Device::NanoX, NavigatorConfig::default())?;
//! let case = SnapshotCase::new("tests", "sign_tx");
//! navigator.navigate_and_compare(
//!     Some(&case),
//!     [NavInsId::RightClick, NavInsId::BothClick],
//!     CompareOptions::default(),
//! )?;
//! ```

pub mod callbacks;
pub mod instruction;
pub mod nano;
pub mod scenario;
pub mod touch;
pub mod types;

pub use callbacks::{Callback, CallbackRegistry};
pub use instruction::{NavIns, NavInsId, parse_instructions};
pub use scenario::{NavigateWithScenario, ScenarioData, ScenarioOptions, UseCase};
pub use types::{
    CompareOptions, NavError, NavResult, NavigatorConfig, TimeoutError, UntilSnapOptions,
    UntilTextOptions, WaitMultipliers, WaitTimings,
};

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use crate::backend::{Backend, BackendError, Crop};
use crate::device::Device;
use crate::snapshot::{self, SnapshotCase, SnapshotDirs};

/// Drives one device through a backend
pub struct Navigator<B: Backend + 'static> {
    backend: B,
    device: Device,
    callbacks: CallbackRegistry<B>,
    config: NavigatorConfig,
    span: tracing::Span,
}

impl<B: Backend + 'static> Navigator<B> {
    /// Navigator with an explicit callback table
    pub fn new(backend: B, device: Device, callbacks: CallbackRegistry<B>, config: NavigatorConfig) -> Self {
        let span = tracing::info_span!("navigator", device = %device, golden_run = config.golden_run);
        Self {
            backend,
            device,
            callbacks,
            config,
            span,
        }
    }

    /// Navigator for a button device
    pub fn nano(backend: B, device: Device, config: NavigatorConfig) -> NavResult<Self> {
        if !device.is_nano() {
            return Err(NavError::UnsupportedDevice {
                device,
                family: "nano",
            });
        }
        Ok(Self::new(backend, device, nano::callbacks(), config))
    }

    /// Navigator for a touch device
    pub fn touch(backend: B, device: Device, config: NavigatorConfig) -> NavResult<Self> {
        let callbacks = touch::callbacks(device)?;
        Ok(Self::new(backend, device, callbacks, config))
    }

    /// Navigator of the family matching `device`
    pub fn for_device(backend: B, device: Device, config: NavigatorConfig) -> NavResult<Self> {
        if device.is_nano() {
            Self::nano(backend, device, config)
        } else {
            Self::touch(backend, device, config)
        }
    }

    /// Register an extra callback
    ///
    /// Fails with [`NavError::CallbackExists`] when the id already has one
    /// and `override_existing` is not set.
    pub fn add_callback(&mut self, id: NavInsId, callback: Callback<B>, override_existing: bool) -> NavResult<()> {
        self.callbacks.register(id, callback, override_existing)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn callbacks(&self) -> &CallbackRegistry<B> {
        &self.callbacks
    }

    // ========================================================================
    // Instruction execution
    // ========================================================================

    fn run_instruction(&mut self, ins: &NavIns, timeout: Duration, wait_for_change: bool) -> NavResult<()> {
        let callback = self
            .callbacks
            .get(ins.id)
            .ok_or(NavError::NotImplemented(ins.id))?;
        tracing::debug!(instruction = %ins, "run instruction");
        callback(&mut self.backend, ins)?;
        if wait_for_change && !ins.id.is_wait() {
            self.backend.wait_for_screen_change(timeout)?;
        }
        Ok(())
    }

    /// Run a navigation step of a search loop, reporting a screen that does
    /// not move within `budget` as `on_timeout`
    fn run_step(&mut self, ins: &NavIns, budget: Duration, on_timeout: impl FnOnce() -> TimeoutError) -> NavResult<()> {
        match self.run_instruction(ins, budget, true) {
            Err(NavError::Backend(BackendError::ScreenChangeTimeout)) => Err(on_timeout().into()),
            other => other,
        }
    }

    /// Run instructions in order, without waiting between them
    pub fn navigate<I>(&mut self, instructions: I) -> NavResult<()>
    where
        I: IntoIterator,
        I::Item: Into<NavIns>,
    {
        let _span = self.span.clone().entered();
        for ins in instructions {
            let ins = ins.into();
            self.run_instruction(&ins, self.config.screen_change_timeout, false)?;
        }
        Ok(())
    }

    // ========================================================================
    // Snapshot comparison
    // ========================================================================

    fn compare_snap(&mut self, dirs: &SnapshotDirs, index: usize) -> NavResult<()> {
        let golden = dirs.golden_snap(index);
        let tmp = dirs.tmp_snap(index);
        let matched = self.backend.compare_screen_with_snapshot(
            &golden,
            None,
            Some(&tmp),
            self.config.golden_run,
        )?;
        if !matched {
            tracing::error!(index, golden = %golden.display(), tmp = %tmp.display(), "screen mismatch");
            return Err(NavError::ScreenMismatch { index, golden, tmp });
        }
        tracing::debug!(index, "screen matches golden");
        Ok(())
    }

    /// Compare until the screen matches or `timeout` elapses
    ///
    /// At least one comparison is made, even with a zero timeout. Goldens are
    /// never recorded here: the images searched for must already exist.
    fn compare_snap_with_timeout(
        &mut self,
        golden: &Path,
        timeout: Duration,
        crop: Option<Crop>,
        tmp: Option<&Path>,
    ) -> NavResult<bool> {
        let start = Instant::now();
        loop {
            if self.backend.compare_screen_with_snapshot(golden, crop, tmp, false)? {
                return Ok(true);
            }
            if start.elapsed() >= timeout {
                return Ok(false);
            }
            thread::sleep(self.config.poll_interval);
        }
    }

    /// Run instructions, checking the screen against its golden before each
    /// of them and once more after the last
    ///
    /// Frames are numbered from `options.snap_start_idx`; with `case` unset
    /// the flow runs with the same waits but nothing is compared.
    pub fn navigate_and_compare<I>(
        &mut self,
        case: Option<&SnapshotCase>,
        instructions: I,
        options: CompareOptions,
    ) -> NavResult<()>
    where
        I: IntoIterator,
        I::Item: Into<NavIns>,
    {
        let instructions: Vec<NavIns> = instructions.into_iter().map(Into::into).collect();
        let _span = self.span.clone().entered();
        let dirs = case
            .map(|case| snapshot::prepare(case, self.device, self.config.golden_run, options.snap_start_idx))
            .transpose()?;
        let timings = self.config.effective_timings();
        tracing::info!(
            case = ?case.map(|c| c.name.display().to_string()),
            steps = instructions.len(),
            start_idx = options.snap_start_idx,
            "navigate and compare"
        );

        if options.screen_change_before_first_instruction {
            self.backend.wait_for_screen_change(options.timeout)?;
        }
        thread::sleep(timings.before_first);

        for (i, ins) in instructions.iter().enumerate() {
            if let Some(dirs) = &dirs {
                self.compare_snap(dirs, options.snap_start_idx + i)?;
            }
            let is_last = i + 1 == instructions.len();
            let wait = !is_last || options.screen_change_after_last_instruction;
            self.run_instruction(ins, options.timeout, wait)?;
            if !is_last {
                thread::sleep(timings.between);
            }
        }

        thread::sleep(timings.after_last);
        if let Some(dirs) = &dirs {
            self.compare_snap(dirs, options.snap_start_idx + instructions.len())?;
        }
        Ok(())
    }

    // ========================================================================
    // Search loops
    // ========================================================================

    fn first_snap_shown(
        &mut self,
        first: &Path,
        last: &Path,
        options: &UntilSnapOptions,
        tmp: Option<&Path>,
    ) -> NavResult<bool> {
        let start = Instant::now();
        loop {
            if self.backend.compare_screen_with_snapshot(first, options.crop_first, tmp, false)?
                || self.backend.compare_screen_with_snapshot(last, options.crop_last, tmp, false)?
            {
                return Ok(true);
            }
            if start.elapsed() >= self.config.first_snapshot_timeout {
                return Ok(false);
            }
            thread::sleep(self.config.poll_interval);
        }
    }

    /// Repeat `navigate` until the screen shows the golden `last_img`, then
    /// run `validation` and check that the screen moves on
    ///
    /// `start_img` and `last_img` are file names in the golden directory of
    /// `case`. Returns the number of navigation steps taken. Backends that
    /// cannot take screenshots skip the whole flow and return 0.
    pub fn navigate_until_snap(
        &mut self,
        navigate: impl Into<NavIns>,
        validation: impl Into<NavIns>,
        case: &SnapshotCase,
        start_img: &str,
        last_img: &str,
        options: UntilSnapOptions,
    ) -> NavResult<usize> {
        let (navigate, validation) = (navigate.into(), validation.into());
        let _span = self.span.clone().entered();
        if !self.backend.supports_snapshots() {
            tracing::warn!(last_img, "backend cannot take snapshots, perform the navigation on the device");
            return Ok(0);
        }

        let dirs = snapshot::prepare(case, self.device, self.config.golden_run, 0)?;
        let first = dirs.golden_named(start_img);
        let last = dirs.golden_named(last_img);
        let tmp_at = |index: usize| options.take_snaps.then(|| dirs.tmp_snap(index));

        let tmp = tmp_at(0);
        if !self.first_snap_shown(&first, &last, &options, tmp.as_deref())? {
            return Err(TimeoutError::FirstSnapshot(first).into());
        }

        let mut img_idx = 0;
        let start = Instant::now();
        loop {
            let attempt = self
                .config
                .snapshot_attempt_timeout
                .min(options.timeout.saturating_sub(start.elapsed()));
            let tmp = tmp_at(img_idx);
            if self.compare_snap_with_timeout(&last, attempt, options.crop_last, tmp.as_deref())? {
                break;
            }
            if start.elapsed() > options.timeout {
                return Err(TimeoutError::Snapshot(last).into());
            }
            let budget = options.timeout.saturating_sub(start.elapsed());
            self.run_step(&navigate, budget, || TimeoutError::Snapshot(last.clone()))?;
            img_idx += 1;
        }
        tracing::info!(steps = img_idx, last = %last.display(), "reached last snapshot");

        self.run_instruction(&validation, self.config.screen_change_timeout, false)?;

        let start = Instant::now();
        while self.compare_snap_with_timeout(&last, Duration::ZERO, options.crop_last, None)? {
            if start.elapsed() > self.config.last_screen_update_timeout {
                return Err(TimeoutError::ScreenUnchanged(last).into());
            }
            thread::sleep(self.config.poll_interval);
        }
        Ok(img_idx)
    }

    /// Repeat `navigate` until a screen line matches `text`, then run
    /// `validation` through [`navigate_and_compare`](Self::navigate_and_compare)
    ///
    /// Every screen of the search is checked against its golden when `case`
    /// is set; validation frames continue the same numbering. Returns the
    /// number of navigation steps taken.
    pub fn navigate_until_text_and_compare<V>(
        &mut self,
        navigate: impl Into<NavIns>,
        validation: V,
        text: &str,
        case: Option<&SnapshotCase>,
        options: UntilTextOptions,
    ) -> NavResult<usize>
    where
        V: IntoIterator,
        V::Item: Into<NavIns>,
    {
        let navigate = navigate.into();
        let _span = self.span.clone().entered();
        let dirs = case
            .map(|case| snapshot::prepare(case, self.device, self.config.golden_run, options.snap_start_idx))
            .transpose()?;
        tracing::info!(text, "navigate until text");

        if options.screen_change_before_first_instruction {
            self.backend.wait_for_screen_change(options.timeout)?;
        }

        let mut idx = options.snap_start_idx;
        let start = Instant::now();
        loop {
            if let Some(dirs) = &dirs {
                self.compare_snap(dirs, idx)?;
            }
            if self.backend.compare_screen_with_text(text)? {
                break;
            }
            let budget = options
                .timeout
                .checked_sub(start.elapsed())
                .ok_or_else(|| TimeoutError::Text(text.to_string()))?;
            self.run_step(&navigate, budget, || TimeoutError::Text(text.to_string()))?;
            idx += 1;
        }
        let steps = idx - options.snap_start_idx;
        tracing::info!(text, steps, "text found");

        let compare = CompareOptions::default()
            .timeout(self.config.screen_change_timeout)
            .screen_change_before_first_instruction(false)
            .screen_change_after_last_instruction(options.screen_change_after_last_instruction)
            .snap_start_idx(idx);
        self.navigate_and_compare(case, validation, compare)?;
        Ok(steps)
    }

    /// [`navigate_until_text_and_compare`](Self::navigate_until_text_and_compare)
    /// without any snapshot
    pub fn navigate_until_text<V>(
        &mut self,
        navigate: impl Into<NavIns>,
        validation: V,
        text: &str,
        options: UntilTextOptions,
    ) -> NavResult<usize>
    where
        V: IntoIterator,
        V::Item: Into<NavIns>,
    {
        self.navigate_until_text_and_compare(navigate, validation, text, None, options)
    }
}

impl<B: Backend + 'static> std::fmt::Debug for Navigator<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("device", &self.device)
            .field("callbacks", &self.callbacks)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{StubBackend, StubCall};
    use std::fs;
    use tempfile::TempDir;

    fn config() -> NavigatorConfig {
        NavigatorConfig::default()
            .timings(WaitTimings::none())
            .poll_interval(Duration::from_millis(1))
            .first_snapshot_timeout(Duration::from_millis(30))
            .snapshot_attempt_timeout(Duration::from_millis(5))
            .last_screen_update_timeout(Duration::from_millis(30))
    }

    fn nano(stub: StubBackend) -> Navigator<StubBackend> {
        Navigator::nano(stub, Device::NanoX, config()).unwrap()
    }

    fn case_with_goldens(temp: &TempDir) -> SnapshotCase {
        let case = SnapshotCase::new(temp.path(), "flow");
        fs::create_dir_all(case.golden_dir(Device::NanoX)).unwrap();
        case
    }

    fn is_wait(call: &StubCall) -> bool {
        matches!(call, StubCall::WaitForScreenChange(_))
    }

    #[test]
    fn test_family_must_match_device() {
        assert!(Navigator::nano(StubBackend::new(), Device::Stax, config()).is_err());
        assert!(Navigator::touch(StubBackend::new(), Device::NanoS, config()).is_err());
        assert!(Navigator::for_device(StubBackend::new(), Device::Flex, config()).is_ok());
    }

    #[test]
    fn test_navigate_runs_in_order_without_waits() {
        let mut navigator = nano(StubBackend::new());
        navigator
            .navigate([NavInsId::RightClick, NavInsId::LeftClick, NavInsId::BothClick])
            .unwrap();
        assert_eq!(
            navigator.backend().calls(),
            &[StubCall::RightClick, StubCall::LeftClick, StubCall::BothClick]
        );
    }

    #[test]
    fn test_navigate_unregistered_instruction() {
        let mut navigator = nano(StubBackend::new());
        let err = navigator
            .navigate([NavInsId::RightClick, NavInsId::Touch])
            .unwrap_err();
        assert!(matches!(err, NavError::NotImplemented(NavInsId::Touch)));
        assert_eq!(navigator.backend().calls(), &[StubCall::RightClick]);
    }

    #[test]
    fn test_add_callback_guard() {
        let mut navigator = nano(StubBackend::new());
        let noop: Callback<StubBackend> = Box::new(|_: &mut StubBackend, _: &NavIns| Ok(()));
        assert!(matches!(
            navigator.add_callback(NavInsId::RightClick, noop, false),
            Err(NavError::CallbackExists(NavInsId::RightClick))
        ));

        let swap: Callback<StubBackend> = Box::new(|backend: &mut StubBackend, _: &NavIns| {
            Ok(backend.left_click()?)
        });
        navigator.add_callback(NavInsId::RightClick, swap, true).unwrap();
        navigator.navigate([NavInsId::RightClick]).unwrap();
        assert_eq!(navigator.backend().calls(), &[StubCall::LeftClick]);
    }

    #[test]
    fn test_navigate_and_compare_checks_every_step() {
        let temp = TempDir::new().unwrap();
        let case = case_with_goldens(&temp);
        let mut navigator = nano(StubBackend::new());
        navigator
            .navigate_and_compare(
                Some(&case),
                [NavInsId::RightClick, NavInsId::BothClick],
                CompareOptions::default(),
            )
            .unwrap();

        let golden = case.golden_dir(Device::NanoX);
        assert_eq!(
            navigator.backend().compared_goldens(),
            vec![
                golden.join("00000.png").as_path(),
                golden.join("00001.png").as_path(),
                golden.join("00002.png").as_path(),
            ]
        );
        // before the first instruction, between both, after the last
        assert_eq!(navigator.backend().count(is_wait), 3);
        assert!(case.tmp_dir(Device::NanoX).join("00002.png").is_file());
    }

    #[test]
    fn test_navigate_and_compare_reports_mismatch_index() {
        let temp = TempDir::new().unwrap();
        let case = case_with_goldens(&temp);
        let mut navigator = nano(StubBackend::new().snapshot_results([true, false]));
        let err = navigator
            .navigate_and_compare(
                Some(&case),
                [NavInsId::RightClick, NavInsId::RightClick],
                CompareOptions::default(),
            )
            .unwrap_err();

        match &err {
            NavError::ScreenMismatch { index, tmp, .. } => {
                assert_eq!(*index, 1);
                assert!(tmp.ends_with("00001.png"));
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(err.to_string().contains("00001.png"));
        // the mismatch stops the flow before the second click
        assert_eq!(navigator.backend().inputs(), vec![&StubCall::RightClick]);
    }

    #[test]
    fn test_navigate_and_compare_missing_golden_dir() {
        let temp = TempDir::new().unwrap();
        let case = SnapshotCase::new(temp.path(), "absent");
        let mut navigator = nano(StubBackend::new());
        let err = navigator
            .navigate_and_compare(Some(&case), [NavInsId::RightClick], CompareOptions::default())
            .unwrap_err();
        assert!(matches!(err, NavError::GoldenDirMissing(_)));
        assert!(navigator.backend().calls().is_empty());
    }

    #[test]
    fn test_golden_run_creates_directory_and_records() {
        let temp = TempDir::new().unwrap();
        let case = SnapshotCase::new(temp.path(), "new_flow");
        let mut navigator = Navigator::nano(StubBackend::new(), Device::NanoX, config().golden_run(true)).unwrap();
        navigator
            .navigate_and_compare(Some(&case), [NavInsId::BothClick], CompareOptions::default())
            .unwrap();
        let golden = case.golden_dir(Device::NanoX);
        assert!(golden.join("00000.png").is_file());
        assert!(golden.join("00001.png").is_file());
    }

    #[test]
    fn test_wait_instructions_are_not_followed_by_screen_change_wait() {
        let mut navigator = nano(StubBackend::new());
        navigator
            .navigate_and_compare(
                None,
                [NavIns::new(NavInsId::WaitForHomeScreen).arg(1), NavInsId::RightClick.into()],
                CompareOptions::default().screen_change_before_first_instruction(false),
            )
            .unwrap();
        assert_eq!(
            navigator.backend().calls(),
            &[
                StubCall::WaitForHomeScreen(Duration::from_secs(1)),
                StubCall::RightClick,
                StubCall::WaitForScreenChange(Duration::from_millis(
                    types::DEFAULT_SCREEN_CHANGE_TIMEOUT_MS
                )),
            ]
        );
    }

    #[test]
    fn test_until_snap_without_snapshots_is_a_noop() {
        let temp = TempDir::new().unwrap();
        let case = SnapshotCase::new(temp.path(), "physical");
        let mut navigator = nano(StubBackend::new().supporting_snapshots(false));
        let steps = navigator
            .navigate_until_snap(
                NavInsId::RightClick,
                NavInsId::BothClick,
                &case,
                "00000.png",
                "00003.png",
                UntilSnapOptions::default(),
            )
            .unwrap();
        assert_eq!(steps, 0);
        assert!(navigator.backend().calls().is_empty());
    }

    #[test]
    fn test_until_snap_already_on_last_snapshot() {
        let temp = TempDir::new().unwrap();
        let case = case_with_goldens(&temp);
        // first check, last check, then the screen left the last snapshot
        let stub = StubBackend::new().snapshot_results([true, true, false]);
        let mut navigator = nano(stub);
        let steps = navigator
            .navigate_until_snap(
                NavInsId::RightClick,
                NavInsId::BothClick,
                &case,
                "00000.png",
                "00004.png",
                UntilSnapOptions::default(),
            )
            .unwrap();
        assert_eq!(steps, 0);
        assert_eq!(navigator.backend().inputs(), vec![&StubCall::BothClick]);
    }

    #[test]
    fn test_until_snap_counts_steps() {
        let temp = TempDir::new().unwrap();
        let case = case_with_goldens(&temp);
        // first found, then two misses on the last snapshot before it shows
        let stub = StubBackend::new()
            .snapshot_results([true, false, false, true, false])
            .default_snapshot_result(false);
        let mut navigator = Navigator::nano(
            stub,
            Device::NanoX,
            config().snapshot_attempt_timeout(Duration::ZERO),
        )
        .unwrap();
        let steps = navigator
            .navigate_until_snap(
                NavInsId::RightClick,
                NavInsId::BothClick,
                &case,
                "00000.png",
                "00002.png",
                UntilSnapOptions::default(),
            )
            .unwrap();
        assert_eq!(steps, 2);
        assert_eq!(
            navigator.backend().inputs(),
            vec![&StubCall::RightClick, &StubCall::RightClick, &StubCall::BothClick]
        );
    }

    #[test]
    fn test_until_snap_first_snapshot_missing() {
        let temp = TempDir::new().unwrap();
        let case = case_with_goldens(&temp);
        let mut navigator = nano(StubBackend::new().default_snapshot_result(false));
        let err = navigator
            .navigate_until_snap(
                NavInsId::RightClick,
                NavInsId::BothClick,
                &case,
                "00000.png",
                "00004.png",
                UntilSnapOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(err, NavError::Timeout(TimeoutError::FirstSnapshot(_))));
        assert!(err.to_string().starts_with("Could not find first snapshot"));
        assert!(navigator.backend().inputs().is_empty());
    }

    #[test]
    fn test_until_snap_screen_unchanged_after_validation() {
        let temp = TempDir::new().unwrap();
        let case = case_with_goldens(&temp);
        let mut navigator = nano(StubBackend::new());
        let err = navigator
            .navigate_until_snap(
                NavInsId::RightClick,
                NavInsId::BothClick,
                &case,
                "00000.png",
                "00001.png",
                UntilSnapOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(err, NavError::Timeout(TimeoutError::ScreenUnchanged(_))));
    }

    #[test]
    fn test_until_text_stops_on_first_match() {
        let mut navigator = nano(StubBackend::new().text_results([false, false, true]));
        let steps = navigator
            .navigate_until_text(
                NavInsId::RightClick,
                [NavInsId::BothClick],
                "^Approve$",
                UntilTextOptions::default(),
            )
            .unwrap();
        assert_eq!(steps, 2);
        assert_eq!(
            navigator.backend().inputs(),
            vec![&StubCall::RightClick, &StubCall::RightClick, &StubCall::BothClick]
        );
        assert_eq!(
            navigator.backend().count(|c| matches!(c, StubCall::CompareText(_))),
            3
        );
    }

    #[test]
    fn test_until_text_and_compare_numbers_frames_contiguously() {
        let temp = TempDir::new().unwrap();
        let case = case_with_goldens(&temp);
        let mut navigator = nano(StubBackend::new().text_results([false, true]));
        navigator
            .navigate_until_text_and_compare(
                NavInsId::RightClick,
                [NavInsId::BothClick, NavInsId::BothClick],
                "^Approve$",
                Some(&case),
                UntilTextOptions::default(),
            )
            .unwrap();

        let tmp = case.tmp_dir(Device::NanoX);
        let frames = snapshot::list_snaps(&tmp).unwrap();
        let names: Vec<String> = frames
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["00000.png", "00001.png", "00002.png", "00003.png"]);
    }

    #[test]
    fn test_until_text_timeout() {
        let mut navigator = nano(StubBackend::new().default_screen_change(false));
        let err = navigator
            .navigate_until_text(
                NavInsId::RightClick,
                [NavInsId::BothClick],
                "^Approve$",
                UntilTextOptions::default()
                    .timeout(Duration::from_millis(20))
                    .screen_change_before_first_instruction(false),
            )
            .unwrap_err();
        assert!(matches!(err, NavError::Timeout(TimeoutError::Text(ref t)) if t == "^Approve$"));
    }
}
