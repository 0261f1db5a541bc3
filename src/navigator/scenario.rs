//! Review and address confirmation flows resolved per device.

use std::path::PathBuf;

use super::instruction::NavInsId;
use super::types::{NavResult, UntilTextOptions};
use super::Navigator;
use crate::backend::Backend;
use crate::device::Device;
use crate::snapshot::SnapshotCase;

/// Kind of flow shown by the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UseCase {
    TxReview,
    AddressConfirmation,
}

/// Instructions and stop pattern of one flow on one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioData {
    /// Instruction moving to the next screen
    pub navigation: NavInsId,
    /// Instructions run once the pattern shows
    pub validation: Vec<NavInsId>,
    /// Regex matched against each screen line
    pub pattern: String,
}

impl ScenarioData {
    pub fn new(device: Device, use_case: UseCase, approve: bool, secondary_confirmation: bool) -> Self {
        if device.is_nano() {
            let mut validation = vec![NavInsId::BothClick];
            if secondary_confirmation {
                validation.push(NavInsId::BothClick);
            }
            let pattern = if approve { "^Approve$" } else { "^Reject$" };
            return Self {
                navigation: NavInsId::RightClick,
                validation,
                pattern: pattern.to_string(),
            };
        }

        let navigation = match device {
            Device::Flex => NavInsId::SwipeCenterToLeft,
            _ => NavInsId::UseCaseReviewTap,
        };
        let (mut validation, pattern) = match (use_case, approve) {
            (UseCase::TxReview, true) => (vec![NavInsId::UseCaseReviewConfirm], "^Hold to sign$"),
            (UseCase::TxReview, false) => (
                vec![NavInsId::UseCaseReviewReject, NavInsId::UseCaseChoiceConfirm],
                "^Hold to sign$",
            ),
            (UseCase::AddressConfirmation, true) => {
                (vec![NavInsId::UseCaseAddressConfirmationConfirm], "^Confirm$")
            }
            (UseCase::AddressConfirmation, false) => {
                (vec![NavInsId::UseCaseAddressConfirmationCancel], "^Confirm$")
            }
        };
        // The status screen shown after the choice must be cleared either way
        validation.push(NavInsId::UseCaseStatusDismiss);
        Self {
            navigation,
            validation,
            pattern: pattern.to_string(),
        }
    }
}

/// Per-call settings of a scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioOptions {
    /// Snapshot root replacing the default one
    pub path: Option<PathBuf>,
    /// Test case name replacing the default one
    pub test_name: Option<PathBuf>,
    /// Pattern replacing the scenario's own
    pub custom_screen_text: Option<String>,
    /// Check every screen against goldens
    pub do_comparison: bool,
}

impl Default for ScenarioOptions {
    fn default() -> Self {
        Self {
            path: None,
            test_name: None,
            custom_screen_text: None,
            do_comparison: true,
        }
    }
}

impl ScenarioOptions {
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn test_name(mut self, name: impl Into<PathBuf>) -> Self {
        self.test_name = Some(name.into());
        self
    }

    pub fn custom_screen_text(mut self, text: impl Into<String>) -> Self {
        self.custom_screen_text = Some(text.into());
        self
    }

    pub fn do_comparison(mut self, compare: bool) -> Self {
        self.do_comparison = compare;
        self
    }
}

/// High level flows on top of a [`Navigator`]
#[derive(Debug)]
pub struct NavigateWithScenario<B: Backend + 'static> {
    navigator: Navigator<B>,
    device: Device,
    test_name: PathBuf,
    screenshot_path: PathBuf,
    use_secondary_confirmation: bool,
    options: UntilTextOptions,
}

impl<B: Backend + 'static> NavigateWithScenario<B> {
    pub fn new(navigator: Navigator<B>, test_name: impl Into<PathBuf>, screenshot_path: impl Into<PathBuf>) -> Self {
        let device = navigator.device();
        Self {
            navigator,
            device,
            test_name: test_name.into(),
            screenshot_path: screenshot_path.into(),
            use_secondary_confirmation: false,
            options: UntilTextOptions::default(),
        }
    }

    /// Confirm twice on button devices, for applications asking to
    /// confirm the choice again
    pub fn with_secondary_confirmation(mut self, enabled: bool) -> Self {
        self.use_secondary_confirmation = enabled;
        self
    }

    /// Timeouts and waits of the underlying search
    pub fn with_options(mut self, options: UntilTextOptions) -> Self {
        self.options = options;
        self
    }

    pub fn navigator(&self) -> &Navigator<B> {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut Navigator<B> {
        &mut self.navigator
    }

    pub fn into_navigator(self) -> Navigator<B> {
        self.navigator
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Instructions this wrapper would run for a flow
    pub fn scenario(&self, use_case: UseCase, approve: bool) -> ScenarioData {
        ScenarioData::new(self.device, use_case, approve, self.use_secondary_confirmation)
    }

    fn run(&mut self, use_case: UseCase, approve: bool, options: ScenarioOptions) -> NavResult<usize> {
        let mut scenario = self.scenario(use_case, approve);
        if let Some(text) = options.custom_screen_text {
            scenario.pattern = text;
        }
        tracing::info!(?use_case, approve, pattern = %scenario.pattern, "scenario");

        if !options.do_comparison {
            return self.navigator.navigate_until_text(
                scenario.navigation,
                scenario.validation,
                &scenario.pattern,
                self.options,
            );
        }
        let case = SnapshotCase::new(
            options.path.unwrap_or_else(|| self.screenshot_path.clone()),
            options.test_name.unwrap_or_else(|| self.test_name.clone()),
        );
        self.navigator.navigate_until_text_and_compare(
            scenario.navigation,
            scenario.validation,
            &scenario.pattern,
            Some(&case),
            self.options,
        )
    }

    pub fn review_approve(&mut self, options: ScenarioOptions) -> NavResult<usize> {
        self.run(UseCase::TxReview, true, options)
    }

    pub fn review_reject(&mut self, options: ScenarioOptions) -> NavResult<usize> {
        self.run(UseCase::TxReview, false, options)
    }

    pub fn address_review_approve(&mut self, options: ScenarioOptions) -> NavResult<usize> {
        self.run(UseCase::AddressConfirmation, true, options)
    }

    pub fn address_review_reject(&mut self, options: ScenarioOptions) -> NavResult<usize> {
        self.run(UseCase::AddressConfirmation, false, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{StubBackend, StubCall};
    use crate::navigator::types::{NavigatorConfig, WaitTimings};
    use crate::navigator::touch::{LONG_PRESS_DELAY, TAP_DELAY};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn scenario(device: Device, stub: StubBackend) -> NavigateWithScenario<StubBackend> {
        let config = NavigatorConfig::default().timings(WaitTimings::none());
        let navigator = Navigator::for_device(stub, device, config).unwrap();
        NavigateWithScenario::new(navigator, "review", "/nonexistent")
    }

    #[test]
    fn test_nano_scenarios() {
        let data = ScenarioData::new(Device::NanoSP, UseCase::TxReview, true, false);
        assert_eq!(
            data,
            ScenarioData {
                navigation: NavInsId::RightClick,
                validation: vec![NavInsId::BothClick],
                pattern: "^Approve$".to_string(),
            }
        );
        let data = ScenarioData::new(Device::NanoS, UseCase::AddressConfirmation, false, true);
        assert_eq!(data.validation, vec![NavInsId::BothClick, NavInsId::BothClick]);
        assert_eq!(data.pattern, "^Reject$");
    }

    #[test]
    fn test_touch_scenarios() {
        let data = ScenarioData::new(Device::Stax, UseCase::TxReview, false, false);
        assert_eq!(data.navigation, NavInsId::UseCaseReviewTap);
        assert_eq!(
            data.validation,
            vec![
                NavInsId::UseCaseReviewReject,
                NavInsId::UseCaseChoiceConfirm,
                NavInsId::UseCaseStatusDismiss
            ]
        );
        assert_eq!(data.pattern, "^Hold to sign$");

        let data = ScenarioData::new(Device::Flex, UseCase::AddressConfirmation, true, true);
        assert_eq!(data.navigation, NavInsId::SwipeCenterToLeft);
        assert_eq!(
            data.validation,
            vec![NavInsId::UseCaseAddressConfirmationConfirm, NavInsId::UseCaseStatusDismiss]
        );
        assert_eq!(data.pattern, "^Confirm$");
    }

    #[test]
    fn test_review_approve_without_comparison() {
        let mut flow = scenario(Device::Stax, StubBackend::new().text_results([false, true]));
        let steps = flow
            .review_approve(ScenarioOptions::default().do_comparison(false))
            .unwrap();
        assert_eq!(steps, 1);
        assert_eq!(
            flow.navigator().backend().inputs(),
            vec![
                &StubCall::Touch { x: 342, y: 606, delay: TAP_DELAY },
                &StubCall::Touch { x: 200, y: 515, delay: LONG_PRESS_DELAY },
                &StubCall::Touch { x: 200, y: 335, delay: TAP_DELAY },
            ]
        );
        assert!(flow
            .navigator()
            .backend()
            .calls()
            .contains(&StubCall::CompareText("^Hold to sign$".to_string())));
    }

    #[test]
    fn test_custom_text_and_case_override() {
        let temp = TempDir::new().unwrap();
        let case = SnapshotCase::new(temp.path(), "custom");
        fs::create_dir_all(case.golden_dir(Device::NanoX)).unwrap();

        let mut flow = scenario(Device::NanoX, StubBackend::new().text_results([true]));
        flow.address_review_reject(
            ScenarioOptions::default()
                .path(temp.path())
                .test_name("custom")
                .custom_screen_text("^Cancel$"),
        )
        .unwrap();

        let backend = flow.navigator().backend();
        assert!(backend.calls().contains(&StubCall::CompareText("^Cancel$".to_string())));
        assert_eq!(backend.inputs(), vec![&StubCall::BothClick]);
        assert!(case.tmp_dir(Device::NanoX).join("00001.png").is_file());
    }
}
