//! Callback table of touch devices.
//!
//! Every tap resolves to fixed screen coordinates of the device layout, see
//! [`crate::device::positions`].

use std::time::Duration;

use super::callbacks::{Callback, CallbackRegistry, DEFAULT_WAIT_TIMEOUT, register_waits};
use super::instruction::{NavIns, NavInsId};
use super::types::{NavError, NavResult};
use crate::backend::{Backend, SwipeDirection};
use crate::device::positions::{self, Anchor, Keyboard, UseCaseAction};
use crate::device::{Device, Position};

/// Press duration of a plain tap
pub const TAP_DELAY: Duration = Duration::from_millis(500);

/// Press duration of "hold to confirm" buttons
pub const LONG_PRESS_DELAY: Duration = Duration::from_millis(1500);

/// Duration of a swipe gesture
pub const SWIPE_DELAY: Duration = Duration::from_millis(300);

fn tap<B: Backend + 'static>(position: Position, delay: Duration) -> Callback<B> {
    Box::new(move |backend: &mut B, _: &NavIns| {
        backend.finger_touch(position.x, position.y, delay)?;
        Ok(())
    })
}

fn swipe<B: Backend + 'static>(from: Position, direction: SwipeDirection) -> Callback<B> {
    Box::new(move |backend: &mut B, _: &NavIns| {
        backend.finger_swipe(from.x, from.y, direction, SWIPE_DELAY)?;
        Ok(())
    })
}

fn write<B: Backend + 'static>(device: Device, keyboard: Keyboard) -> Callback<B> {
    Box::new(move |backend: &mut B, ins: &NavIns| {
        let text = ins.required_str(0, "text")?;
        for ch in text.chars() {
            let key = positions::key(device, keyboard, ch).ok_or_else(|| NavError::InvalidArgument {
                id: ins.id,
                reason: format!("'{}' is not on this keyboard", ch),
            })?;
            backend.finger_touch(key.x, key.y, TAP_DELAY)?;
        }
        Ok(())
    })
}

fn indexed<B: Backend + 'static>(device: Device, lookup: fn(Device, usize) -> Option<Position>) -> Callback<B> {
    Box::new(move |backend: &mut B, ins: &NavIns| {
        let index = ins.required_u32(0, "index")? as usize;
        let position = lookup(device, index).ok_or_else(|| NavError::InvalidArgument {
            id: ins.id,
            reason: format!("no entry {} on {}", index, device),
        })?;
        backend.finger_touch(position.x, position.y, TAP_DELAY)?;
        Ok(())
    })
}

/// Use-case instructions and the action they perform
const USE_CASES: &[(NavInsId, UseCaseAction)] = &[
    (NavInsId::UseCaseHomeInfo, UseCaseAction::HomeInfo),
    (NavInsId::UseCaseHomeSettings, UseCaseAction::HomeSettings),
    (NavInsId::UseCaseHomeAction, UseCaseAction::HomeAction),
    (NavInsId::UseCaseHomeQuit, UseCaseAction::HomeQuit),
    (NavInsId::UseCaseSettingsSinglePageExit, UseCaseAction::SettingsSinglePageExit),
    (NavInsId::UseCaseSettingsMultiPageExit, UseCaseAction::SettingsMultiPageExit),
    (NavInsId::UseCaseSettingsPrevious, UseCaseAction::SettingsPrevious),
    (NavInsId::UseCaseSettingsNext, UseCaseAction::SettingsNext),
    (NavInsId::UseCaseSubSettingsExit, UseCaseAction::SubSettingsExit),
    (NavInsId::UseCaseSubSettingsPrevious, UseCaseAction::SubSettingsPrevious),
    (NavInsId::UseCaseSubSettingsNext, UseCaseAction::SubSettingsNext),
    (NavInsId::UseCaseChoiceConfirm, UseCaseAction::ChoiceConfirm),
    (NavInsId::UseCaseChoiceReject, UseCaseAction::ChoiceReject),
    (NavInsId::UseCaseStatusDismiss, UseCaseAction::StatusDismiss),
    (NavInsId::UseCaseReviewTap, UseCaseAction::ReviewTap),
    (NavInsId::UseCaseReviewPrevious, UseCaseAction::ReviewPrevious),
    (NavInsId::UseCaseReviewReject, UseCaseAction::ReviewReject),
    (NavInsId::UseCaseReviewConfirm, UseCaseAction::ReviewConfirm),
    (NavInsId::UseCaseViewDetailsExit, UseCaseAction::ViewDetailsExit),
    (NavInsId::UseCaseViewDetailsPrevious, UseCaseAction::ViewDetailsPrevious),
    (NavInsId::UseCaseViewDetailsNext, UseCaseAction::ViewDetailsNext),
    (NavInsId::UseCaseAddressConfirmationTap, UseCaseAction::AddressConfirmationTap),
    (NavInsId::UseCaseAddressConfirmationExitQr, UseCaseAction::AddressConfirmationExitQr),
    (NavInsId::UseCaseAddressConfirmationConfirm, UseCaseAction::AddressConfirmationConfirm),
    (NavInsId::UseCaseAddressConfirmationCancel, UseCaseAction::AddressConfirmationCancel),
];

/// Header, center and footer taps and their button
const ELEMENTS: &[(NavInsId, Anchor)] = &[
    (NavInsId::RightHeaderTap, Anchor::UpperRight),
    (NavInsId::InfoHeaderTap, Anchor::UpperRight),
    (NavInsId::ExitHeaderTap, Anchor::UpperLeft),
    (NavInsId::LeftHeaderTap, Anchor::UpperLeft),
    (NavInsId::NavigationHeaderTap, Anchor::UpperLeft),
    (NavInsId::TappableCenterTap, Anchor::Center),
    (NavInsId::CenteredFooterTap, Anchor::LowerMiddle),
    (NavInsId::CancelFooterTap, Anchor::LowerLeft),
    (NavInsId::ExitFooterTap, Anchor::LowerLeft),
    (NavInsId::InfoFooterTap, Anchor::LowerRight),
];

/// Callbacks for Stax and Flex
pub fn callbacks<B: Backend + 'static>(device: Device) -> NavResult<CallbackRegistry<B>> {
    let unsupported = || NavError::UnsupportedDevice {
        device,
        family: "touch",
    };
    if !device.is_touchable() {
        return Err(unsupported());
    }
    let anchor = |anchor| positions::anchor(device, anchor).ok_or_else(unsupported);

    let mut registry = CallbackRegistry::new();
    register_waits(&mut registry);

    registry.insert(
        NavInsId::Touch,
        Box::new(|backend: &mut B, ins: &NavIns| {
            let x = ins.required_u32(0, "x")?;
            let y = ins.required_u32(1, "y")?;
            let delay = ins.secs_param(2, "delay")?.unwrap_or(TAP_DELAY);
            backend.finger_touch(x, y, delay)?;
            Ok(())
        }),
    );
    let center = anchor(Anchor::Center)?;
    registry.insert(NavInsId::SwipeCenterToLeft, swipe(center, SwipeDirection::Left));
    registry.insert(NavInsId::SwipeCenterToRight, swipe(center, SwipeDirection::Right));

    for &(id, element) in ELEMENTS {
        registry.insert(id, tap(anchor(element)?, TAP_DELAY));
    }
    for &(id, action) in USE_CASES {
        let position = positions::use_case(device, action).ok_or_else(unsupported)?;
        let delay = if action == UseCaseAction::ReviewConfirm {
            LONG_PRESS_DELAY
        } else {
            TAP_DELAY
        };
        registry.insert(id, tap(position, delay));
    }
    registry.insert(
        NavInsId::UseCaseStatusWait,
        Box::new(|backend: &mut B, ins: &NavIns| {
            let timeout = ins.secs_param(0, "timeout")?.unwrap_or(DEFAULT_WAIT_TIMEOUT);
            backend.wait_for_home_screen(timeout)?;
            Ok(())
        }),
    );

    registry.insert(NavInsId::ChoiceChoose, indexed(device, positions::choice));
    registry.insert(NavInsId::SuggestionChoose, indexed(device, positions::suggestion));

    registry.insert(NavInsId::KbLetterOnlyWrite, write(device, Keyboard::LetterOnly));
    registry.insert(NavInsId::KbLettersWrite, write(device, Keyboard::Letters));
    registry.insert(NavInsId::KbSpecialChar1Write, write(device, Keyboard::SpecialChars1));
    registry.insert(NavInsId::KbSpecialChar2Write, write(device, Keyboard::SpecialChars2));

    Ok(registry)
}
