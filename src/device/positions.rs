//! Screen coordinates of tappable elements on touch devices.
//!
//! Stax resolution is 400x670, Flex resolution is 480x600. Button devices
//! have no positions: every lookup returns `None` for them.

use serde::{Deserialize, Serialize};

use super::Device;

/// A point on the touch screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Fixed buttons shared by every touch layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    Center,
    UpperCenterMiddle,
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerMiddle,
    LowerMiddleRight,
    LowerRight,
    AboveLowerMiddle,
}

/// Coordinates of a fixed button
pub fn anchor(device: Device, anchor: Anchor) -> Option<Position> {
    let position = match (device, anchor) {
        (Device::Stax, Anchor::Center) => Position::new(200, 335),
        (Device::Stax, Anchor::UpperCenterMiddle) => Position::new(200, 280),
        (Device::Stax, Anchor::UpperLeft) => Position::new(36, 36),
        (Device::Stax, Anchor::UpperRight) => Position::new(342, 55),
        (Device::Stax, Anchor::LowerLeft) => Position::new(36, 606),
        (Device::Stax, Anchor::LowerMiddle) => Position::new(200, 606),
        (Device::Stax, Anchor::LowerMiddleRight) => Position::new(266, 615),
        (Device::Stax, Anchor::LowerRight) => Position::new(342, 606),
        (Device::Stax, Anchor::AboveLowerMiddle) => Position::new(200, 515),
        (Device::Flex, Anchor::Center) => Position::new(240, 300),
        (Device::Flex, Anchor::UpperCenterMiddle) => Position::new(240, 250),
        (Device::Flex, Anchor::UpperLeft) => Position::new(45, 45),
        (Device::Flex, Anchor::UpperRight) => Position::new(405, 75),
        (Device::Flex, Anchor::LowerLeft) => Position::new(55, 530),
        (Device::Flex, Anchor::LowerMiddle) => Position::new(240, 550),
        (Device::Flex, Anchor::LowerMiddleRight) => Position::new(320, 550),
        (Device::Flex, Anchor::LowerRight) => Position::new(430, 550),
        (Device::Flex, Anchor::AboveLowerMiddle) => Position::new(240, 435),
        _ => return None,
    };
    Some(position)
}

/// Touch-driven use cases and their actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UseCaseAction {
    HomeInfo,
    HomeSettings,
    HomeAction,
    HomeQuit,
    SettingsSinglePageExit,
    SettingsMultiPageExit,
    SettingsPrevious,
    SettingsNext,
    SubSettingsExit,
    SubSettingsPrevious,
    SubSettingsNext,
    ChoiceConfirm,
    ChoiceReject,
    StatusDismiss,
    ReviewTap,
    ReviewPrevious,
    ReviewConfirm,
    ReviewReject,
    ViewDetailsExit,
    ViewDetailsPrevious,
    ViewDetailsNext,
    AddressConfirmationTap,
    AddressConfirmationExitQr,
    AddressConfirmationConfirm,
    AddressConfirmationCancel,
}

impl UseCaseAction {
    fn anchor(self) -> Anchor {
        use UseCaseAction::*;
        match self {
            HomeInfo | HomeSettings => Anchor::UpperRight,
            HomeAction => Anchor::AboveLowerMiddle,
            HomeQuit => Anchor::LowerMiddle,
            SettingsSinglePageExit | SettingsMultiPageExit => Anchor::UpperLeft,
            SettingsPrevious => Anchor::LowerMiddleRight,
            SettingsNext => Anchor::LowerRight,
            SubSettingsExit => Anchor::UpperLeft,
            SubSettingsPrevious => Anchor::LowerLeft,
            SubSettingsNext => Anchor::LowerRight,
            ChoiceConfirm => Anchor::AboveLowerMiddle,
            ChoiceReject => Anchor::LowerLeft,
            StatusDismiss => Anchor::Center,
            ReviewTap => Anchor::LowerRight,
            ReviewPrevious => Anchor::LowerMiddle,
            ReviewConfirm => Anchor::AboveLowerMiddle,
            ReviewReject => Anchor::LowerLeft,
            ViewDetailsExit => Anchor::LowerLeft,
            ViewDetailsPrevious => Anchor::LowerMiddle,
            ViewDetailsNext => Anchor::LowerRight,
            AddressConfirmationTap | AddressConfirmationConfirm => Anchor::AboveLowerMiddle,
            AddressConfirmationExitQr => Anchor::LowerMiddle,
            AddressConfirmationCancel => Anchor::LowerLeft,
        }
    }
}

/// Coordinates of a use-case action
pub fn use_case(device: Device, action: UseCaseAction) -> Option<Position> {
    anchor(device, action.anchor())
}

/// Position of the n-th entry (1-based, up to 5) of a choice list
pub fn choice(device: Device, index: usize) -> Option<Position> {
    if !(1..=5).contains(&index) {
        return None;
    }
    let step = index as u32 - 1;
    match device {
        Device::Stax => Some(Position::new(200, 140 + 95 * step)),
        Device::Flex => Some(Position::new(240, 150 + 90 * step)),
        _ => None,
    }
}

/// Position of the n-th (1-based) word suggestion
///
/// Stax shows 2 rows of 2 suggestions; Flex a single swipeable row where
/// only the first 2 are reachable without swiping.
pub fn suggestion(device: Device, index: usize) -> Option<Position> {
    match (device, index) {
        (Device::Stax, 1) => Some(Position::new(100, 280)),
        (Device::Stax, 2) => Some(Position::new(290, 280)),
        (Device::Stax, 3) => Some(Position::new(110, 350)),
        (Device::Stax, 4) => Some(Position::new(290, 350)),
        (Device::Flex, 1) => Some(Position::new(140, 300)),
        (Device::Flex, 2) => Some(Position::new(350, 300)),
        _ => None,
    }
}

/// On-screen keyboard layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyboard {
    /// Lowercase letters only
    LetterOnly,
    /// Full keyboard, letters page
    Letters,
    /// Full keyboard, first special characters page
    SpecialChars1,
    /// Full keyboard, second special characters page
    SpecialChars2,
}

/// Grid geometry of a keyboard on a given device
struct Grid {
    /// Y coordinate of each row
    rows: [u32; 4],
    /// Key pitch in pixels
    pitch: u32,
    /// X coordinate of the first key of the first row
    first: u32,
}

fn grid(device: Device, keyboard: Keyboard) -> Option<Grid> {
    let grid = match (device, keyboard) {
        (Device::Stax, Keyboard::LetterOnly) => Grid { rows: [470, 525, 580, 580], pitch: 40, first: 20 },
        (Device::Stax, _) => Grid { rows: [415, 470, 525, 580], pitch: 40, first: 20 },
        (Device::Flex, Keyboard::LetterOnly) => Grid { rows: [415, 490, 565, 565], pitch: 48, first: 24 },
        (Device::Flex, _) => Grid { rows: [350, 420, 490, 560], pitch: 48, first: 24 },
        _ => return None,
    };
    Some(grid)
}

fn key_in_row(row: &str, key: char) -> Option<u32> {
    row.chars().position(|c| c == key).map(|i| i as u32)
}

/// Position of a single character key on a keyboard page
///
/// Returns `None` when the device has no keyboard or the character is not
/// on the requested page.
pub fn key(device: Device, keyboard: Keyboard, ch: char) -> Option<Position> {
    let g = grid(device, keyboard)?;
    let is_stax = device == Device::Stax;
    let (first_row, second_row) = match keyboard {
        Keyboard::LetterOnly | Keyboard::Letters => ("qwertyuiop", "asdfghjkl"),
        Keyboard::SpecialChars1 => ("1234567890", "-/:;()&@\""),
        Keyboard::SpecialChars2 if is_stax => ("[]{}#%^*+=", "_\\|~<>$`\""),
        Keyboard::SpecialChars2 => ("[]{}#%^*+=", "_\\|~><$`\""),
    };

    if let Some(i) = key_in_row(first_row, ch) {
        return Some(Position::new(g.first + g.pitch * i, g.rows[0]));
    }
    if let Some(i) = key_in_row(second_row, ch) {
        return Some(Position::new(2 * g.first + g.pitch * i, g.rows[1]));
    }

    match keyboard {
        Keyboard::LetterOnly => {
            key_in_row("zxcvbnm", ch).map(|i| Position::new(g.first + g.pitch * i, g.rows[2]))
        }
        Keyboard::Letters => {
            let offset = if is_stax { 80 } else { 96 };
            if let Some(i) = key_in_row("zxcvbnm", ch) {
                return Some(Position::new(offset + g.pitch * i, g.rows[2]));
            }
            space(device, ch, &g)
        }
        Keyboard::SpecialChars1 | Keyboard::SpecialChars2 => {
            let offset = if is_stax { 120 } else { 144 };
            if let Some(i) = key_in_row(".,?!'", ch) {
                return Some(Position::new(offset + g.pitch * i, g.rows[2]));
            }
            space(device, ch, &g)
        }
    }
}

fn space(device: Device, ch: char, g: &Grid) -> Option<Position> {
    if ch != ' ' {
        return None;
    }
    let x = if device == Device::Stax { 250 } else { 312 };
    Some(Position::new(x, g.rows[3]))
}

/// Non-character keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialKey {
    Back,
    ChangeCase,
    ChangeLayout,
    MoreSpecials,
    Confirm,
}

/// Position of a non-character key
pub fn special_key(device: Device, keyboard: Keyboard, special: SpecialKey) -> Option<Position> {
    let g = grid(device, keyboard)?;
    let is_stax = device == Device::Stax;
    let position = match (keyboard, special) {
        (_, SpecialKey::Confirm) => return anchor(device, Anchor::UpperCenterMiddle),
        (Keyboard::LetterOnly, SpecialKey::Back) => {
            Position::new(if is_stax { 340 } else { 400 }, g.rows[2])
        }
        (Keyboard::LetterOnly, _) => return None,
        (Keyboard::Letters, SpecialKey::Back) => {
            Position::new(if is_stax { 380 } else { 444 }, g.rows[2])
        }
        (Keyboard::Letters, SpecialKey::ChangeCase) => {
            Position::new(if is_stax { 30 } else { 36 }, g.rows[2])
        }
        (Keyboard::Letters, SpecialKey::MoreSpecials) => return None,
        (_, SpecialKey::Back) => Position::new(if is_stax { 380 } else { 420 }, g.rows[2]),
        (_, SpecialKey::MoreSpecials) => Position::new(if is_stax { 50 } else { 60 }, g.rows[2]),
        (_, SpecialKey::ChangeCase) => return None,
        (_, SpecialKey::ChangeLayout) => Position::new(if is_stax { 70 } else { 72 }, g.rows[3]),
    };
    Some(position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_devices_have_no_positions() {
        assert_eq!(anchor(Device::NanoS, Anchor::Center), None);
        assert_eq!(use_case(Device::NanoX, UseCaseAction::ReviewConfirm), None);
        assert_eq!(key(Device::NanoSP, Keyboard::LetterOnly, 'a'), None);
    }

    #[test]
    fn test_use_case_positions() {
        assert_eq!(
            use_case(Device::Stax, UseCaseAction::ReviewTap),
            Some(Position::new(342, 606))
        );
        assert_eq!(
            use_case(Device::Flex, UseCaseAction::StatusDismiss),
            Some(Position::new(240, 300))
        );
        assert_eq!(
            use_case(Device::Flex, UseCaseAction::AddressConfirmationCancel),
            Some(Position::new(55, 530))
        );
    }

    #[test]
    fn test_letter_only_keyboard() {
        assert_eq!(key(Device::Stax, Keyboard::LetterOnly, 'q'), Some(Position::new(20, 470)));
        assert_eq!(key(Device::Stax, Keyboard::LetterOnly, 'l'), Some(Position::new(360, 525)));
        assert_eq!(key(Device::Stax, Keyboard::LetterOnly, 'm'), Some(Position::new(260, 580)));
        assert_eq!(key(Device::Flex, Keyboard::LetterOnly, 'p'), Some(Position::new(456, 415)));
        assert_eq!(key(Device::Flex, Keyboard::LetterOnly, 'a'), Some(Position::new(48, 490)));
        assert_eq!(key(Device::Stax, Keyboard::LetterOnly, '1'), None);
    }

    #[test]
    fn test_full_keyboards() {
        assert_eq!(key(Device::Stax, Keyboard::Letters, 'z'), Some(Position::new(80, 525)));
        assert_eq!(key(Device::Flex, Keyboard::Letters, 'm'), Some(Position::new(384, 490)));
        assert_eq!(key(Device::Stax, Keyboard::Letters, ' '), Some(Position::new(250, 580)));
        assert_eq!(key(Device::Stax, Keyboard::SpecialChars1, '0'), Some(Position::new(380, 415)));
        assert_eq!(key(Device::Flex, Keyboard::SpecialChars1, '?'), Some(Position::new(240, 490)));
        assert_eq!(key(Device::Stax, Keyboard::SpecialChars2, '<'), Some(Position::new(200, 470)));
        assert_eq!(key(Device::Flex, Keyboard::SpecialChars2, '<'), Some(Position::new(288, 420)));
    }

    #[test]
    fn test_special_keys() {
        assert_eq!(
            special_key(Device::Stax, Keyboard::LetterOnly, SpecialKey::Back),
            Some(Position::new(340, 580))
        );
        assert_eq!(
            special_key(Device::Flex, Keyboard::Letters, SpecialKey::ChangeCase),
            Some(Position::new(36, 490))
        );
        assert_eq!(
            special_key(Device::Stax, Keyboard::SpecialChars1, SpecialKey::ChangeLayout),
            Some(Position::new(70, 580))
        );
        assert_eq!(special_key(Device::Stax, Keyboard::LetterOnly, SpecialKey::ChangeCase), None);
    }

    #[test]
    fn test_choice_and_suggestions() {
        assert_eq!(choice(Device::Stax, 1), Some(Position::new(200, 140)));
        assert_eq!(choice(Device::Flex, 5), Some(Position::new(240, 510)));
        assert_eq!(choice(Device::Stax, 6), None);
        assert_eq!(suggestion(Device::Flex, 3), None);
        assert_eq!(suggestion(Device::Stax, 4), Some(Position::new(290, 350)));
    }
}
