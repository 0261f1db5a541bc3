//! Navigation instructions.
//!
//! [`NavInsId`] is the closed vocabulary of actions a navigator knows about;
//! [`NavIns`] pairs an id with the arguments of one invocation. Instructions
//! have a textual form used on the command line and in logs:
//! `RIGHT_CLICK`, `TOUCH(200, 335)`, `KB_LETTER_ONLY_WRITE("abc")`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::types::{NavError, NavResult};

macro_rules! nav_ins_ids {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Navigation instruction identifiers
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum NavInsId {
            $($variant),+
        }

        impl NavInsId {
            /// Every identifier, in declaration order
            pub const ALL: &'static [NavInsId] = &[$(NavInsId::$variant),+];

            /// Upper snake case name (`RIGHT_CLICK`)
            pub fn name(&self) -> &'static str {
                match self {
                    $(NavInsId::$variant => $name),+
                }
            }
        }
    };
}

nav_ins_ids! {
    Wait => "WAIT",

    // Button devices
    RightClick => "RIGHT_CLICK",
    LeftClick => "LEFT_CLICK",
    BothClick => "BOTH_CLICK",

    // Touch devices
    Touch => "TOUCH",
    SwipeCenterToLeft => "SWIPE_CENTER_TO_LEFT",
    SwipeCenterToRight => "SWIPE_CENTER_TO_RIGHT",
    // headers
    RightHeaderTap => "RIGHT_HEADER_TAP",
    ExitHeaderTap => "EXIT_HEADER_TAP",
    InfoHeaderTap => "INFO_HEADER_TAP",
    LeftHeaderTap => "LEFT_HEADER_TAP",
    NavigationHeaderTap => "NAVIGATION_HEADER_TAP",
    // centers
    ChoiceChoose => "CHOICE_CHOOSE",
    SuggestionChoose => "SUGGESTION_CHOOSE",
    TappableCenterTap => "TAPPABLE_CENTER_TAP",
    KbLetterOnlyWrite => "KB_LETTER_ONLY_WRITE",
    KbLettersWrite => "KB_LETTERS_WRITE",
    KbSpecialChar1Write => "KB_SPECIAL_CHAR_1_WRITE",
    KbSpecialChar2Write => "KB_SPECIAL_CHAR_2_WRITE",
    // footers
    CenteredFooterTap => "CENTERED_FOOTER_TAP",
    CancelFooterTap => "CANCEL_FOOTER_TAP",
    ExitFooterTap => "EXIT_FOOTER_TAP",
    InfoFooterTap => "INFO_FOOTER_TAP",
    // use cases
    UseCaseHomeInfo => "USE_CASE_HOME_INFO",
    UseCaseHomeSettings => "USE_CASE_HOME_SETTINGS",
    UseCaseHomeAction => "USE_CASE_HOME_ACTION",
    UseCaseHomeQuit => "USE_CASE_HOME_QUIT",
    UseCaseSettingsSinglePageExit => "USE_CASE_SETTINGS_SINGLE_PAGE_EXIT",
    UseCaseSettingsMultiPageExit => "USE_CASE_SETTINGS_MULTI_PAGE_EXIT",
    UseCaseSettingsPrevious => "USE_CASE_SETTINGS_PREVIOUS",
    UseCaseSettingsNext => "USE_CASE_SETTINGS_NEXT",
    UseCaseSubSettingsExit => "USE_CASE_SUB_SETTINGS_EXIT",
    UseCaseSubSettingsPrevious => "USE_CASE_SUB_SETTINGS_PREVIOUS",
    UseCaseSubSettingsNext => "USE_CASE_SUB_SETTINGS_NEXT",
    UseCaseChoiceConfirm => "USE_CASE_CHOICE_CONFIRM",
    UseCaseChoiceReject => "USE_CASE_CHOICE_REJECT",
    UseCaseStatusDismiss => "USE_CASE_STATUS_DISMISS",
    UseCaseStatusWait => "USE_CASE_STATUS_WAIT",
    UseCaseReviewTap => "USE_CASE_REVIEW_TAP",
    UseCaseReviewPrevious => "USE_CASE_REVIEW_PREVIOUS",
    UseCaseReviewReject => "USE_CASE_REVIEW_REJECT",
    UseCaseReviewConfirm => "USE_CASE_REVIEW_CONFIRM",
    UseCaseViewDetailsExit => "USE_CASE_VIEW_DETAILS_EXIT",
    UseCaseViewDetailsPrevious => "USE_CASE_VIEW_DETAILS_PREVIOUS",
    UseCaseViewDetailsNext => "USE_CASE_VIEW_DETAILS_NEXT",
    UseCaseAddressConfirmationTap => "USE_CASE_ADDRESS_CONFIRMATION_TAP",
    UseCaseAddressConfirmationExitQr => "USE_CASE_ADDRESS_CONFIRMATION_EXIT_QR",
    UseCaseAddressConfirmationConfirm => "USE_CASE_ADDRESS_CONFIRMATION_CONFIRM",
    UseCaseAddressConfirmationCancel => "USE_CASE_ADDRESS_CONFIRMATION_CANCEL",

    // Screen observation
    WaitForScreenChange => "WAIT_FOR_SCREEN_CHANGE",
    WaitForHomeScreen => "WAIT_FOR_HOME_SCREEN",
    WaitForTextOnScreen => "WAIT_FOR_TEXT_ON_SCREEN",
    WaitForTextNotOnScreen => "WAIT_FOR_TEXT_NOT_ON_SCREEN",
}

impl NavInsId {
    /// Whether the instruction only waits instead of acting on the device
    ///
    /// The screen is not expected to change after such an instruction, so
    /// navigation never waits for a screen change after running one.
    pub fn is_wait(&self) -> bool {
        matches!(
            self,
            NavInsId::Wait
                | NavInsId::UseCaseStatusWait
                | NavInsId::WaitForScreenChange
                | NavInsId::WaitForHomeScreen
                | NavInsId::WaitForTextOnScreen
                | NavInsId::WaitForTextNotOnScreen
        )
    }
}

impl fmt::Display for NavInsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NavInsId {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        NavInsId::ALL
            .iter()
            .copied()
            .find(|id| id.name() == wanted)
            .ok_or_else(|| NavError::UnknownInstruction(s.to_string()))
    }
}

impl Serialize for NavInsId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for NavInsId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// An instruction with the arguments of one invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavIns {
    pub id: NavInsId,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub kwargs: Map<String, Value>,
}

impl NavIns {
    pub fn new(id: NavInsId) -> Self {
        Self {
            id,
            args: Vec::new(),
            kwargs: Map::new(),
        }
    }

    pub fn with_args(id: NavInsId, args: impl IntoIterator<Item = Value>) -> Self {
        Self {
            id,
            args: args.into_iter().collect(),
            kwargs: Map::new(),
        }
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Set a keyword argument
    pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    /// Argument given either at `position` or as `key`, keyword first
    pub fn param(&self, position: usize, key: &str) -> Option<&Value> {
        self.kwargs.get(key).or_else(|| self.args.get(position))
    }

    fn invalid(&self, reason: String) -> NavError {
        NavError::InvalidArgument {
            id: self.id,
            reason,
        }
    }

    pub fn u32_param(&self, position: usize, key: &str) -> NavResult<Option<u32>> {
        match self.param(position, key) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .map(Some)
                .ok_or_else(|| self.invalid(format!("'{}' must be a positive integer, got {}", key, value))),
        }
    }

    pub fn required_u32(&self, position: usize, key: &str) -> NavResult<u32> {
        self.u32_param(position, key)?
            .ok_or_else(|| self.invalid(format!("missing '{}'", key)))
    }

    pub fn str_param(&self, position: usize, key: &str) -> NavResult<Option<&str>> {
        match self.param(position, key) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| self.invalid(format!("'{}' must be a string, got {}", key, value))),
        }
    }

    pub fn required_str(&self, position: usize, key: &str) -> NavResult<&str> {
        self.str_param(position, key)?
            .ok_or_else(|| self.invalid(format!("missing '{}'", key)))
    }

    /// Duration given in (possibly fractional) seconds
    pub fn secs_param(&self, position: usize, key: &str) -> NavResult<Option<Duration>> {
        match self.param(position, key) {
            None => Ok(None),
            Some(value) => value
                .as_f64()
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                .map(Some)
                .ok_or_else(|| self.invalid(format!("'{}' must be a number of seconds, got {}", key, value))),
        }
    }
}

impl From<NavInsId> for NavIns {
    fn from(id: NavInsId) -> Self {
        NavIns::new(id)
    }
}

impl fmt::Display for NavIns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id.name())?;
        if self.args.is_empty() && self.kwargs.is_empty() {
            return Ok(());
        }
        let rendered: Vec<String> = self
            .args
            .iter()
            .map(Value::to_string)
            .chain(self.kwargs.iter().map(|(k, v)| format!("{}={}", k, v)))
            .collect();
        write!(f, "({})", rendered.join(", "))
    }
}

impl FromStr for NavIns {
    type Err = NavError;

    /// Parse `NAME` or `NAME(arg, ...)` where every arg is a JSON value
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some(open) = s.find('(') else {
            return Ok(NavIns::new(s.parse()?));
        };
        let id: NavInsId = s[..open].parse()?;
        let inner = s[open + 1..]
            .strip_suffix(')')
            .ok_or_else(|| NavError::UnknownInstruction(s.to_string()))?;
        let args: Vec<Value> = serde_json::from_str(&format!("[{}]", inner)).map_err(|e| {
            NavError::InvalidArgument {
                id,
                reason: format!("cannot parse arguments '{}': {}", inner, e),
            }
        })?;
        Ok(NavIns::with_args(id, args))
    }
}

/// Parse a comma separated instruction list, commas inside parentheses or
/// strings belonging to the instruction arguments
pub fn parse_instructions(text: &str) -> NavResult<Vec<NavIns>> {
    let mut instructions = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => depth = depth.saturating_sub(1),
            ',' if !in_string && depth == 0 => {
                push_instruction(&text[start..i], &mut instructions)?;
                start = i + 1;
            }
            _ => {}
        }
    }
    push_instruction(&text[start..], &mut instructions)?;
    Ok(instructions)
}

fn push_instruction(part: &str, instructions: &mut Vec<NavIns>) -> NavResult<()> {
    if !part.trim().is_empty() {
        instructions.push(part.parse()?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_names_are_unique_and_parse_back() {
        for id in NavInsId::ALL {
            assert_eq!(id.name().parse::<NavInsId>().unwrap(), *id);
        }
        assert_eq!("right_click".parse::<NavInsId>().unwrap(), NavInsId::RightClick);
        assert!("JUMP".parse::<NavInsId>().is_err());
    }

    #[test]
    fn test_wait_family() {
        assert!(NavInsId::WaitForScreenChange.is_wait());
        assert!(NavInsId::Wait.is_wait());
        assert!(!NavInsId::BothClick.is_wait());
        assert!(!NavInsId::UseCaseStatusDismiss.is_wait());
    }

    #[test]
    fn test_params_prefer_keywords() {
        let ins = NavIns::new(NavInsId::Touch).arg(10).arg(20).kwarg("x", 30);
        assert_eq!(ins.required_u32(0, "x").unwrap(), 30);
        assert_eq!(ins.required_u32(1, "y").unwrap(), 20);
        assert_eq!(ins.u32_param(2, "delay").unwrap(), None);
    }

    #[test]
    fn test_invalid_param_names_the_instruction() {
        let ins = NavIns::new(NavInsId::ChoiceChoose).arg("first");
        let err = ins.required_u32(0, "index").unwrap_err();
        assert!(err.to_string().contains("CHOICE_CHOOSE"));
    }

    #[test]
    fn test_secs_param() {
        let ins = NavIns::new(NavInsId::Wait).arg(0.25);
        assert_eq!(ins.secs_param(0, "delay").unwrap(), Some(Duration::from_millis(250)));
        let negative = NavIns::new(NavInsId::Wait).arg(-1.0);
        assert!(negative.secs_param(0, "delay").is_err());
    }

    #[test]
    fn test_parse_instruction_text() {
        let ins: NavIns = "TOUCH(200, 335)".parse().unwrap();
        assert_eq!(ins, NavIns::with_args(NavInsId::Touch, [json!(200), json!(335)]));
        assert_eq!(ins.to_string(), "TOUCH(200, 335)");

        let bare: NavIns = " both_click ".parse().unwrap();
        assert_eq!(bare, NavIns::from(NavInsId::BothClick));
    }

    #[test]
    fn test_parse_instruction_list() {
        let list = parse_instructions(
            r#"RIGHT_CLICK, KB_LETTERS_WRITE("a, b"), WAIT_FOR_TEXT_ON_SCREEN("Ready", 2),BOTH_CLICK"#,
        )
        .unwrap();
        let ids: Vec<NavInsId> = list.iter().map(|ins| ins.id).collect();
        assert_eq!(
            ids,
            vec![
                NavInsId::RightClick,
                NavInsId::KbLettersWrite,
                NavInsId::WaitForTextOnScreen,
                NavInsId::BothClick
            ]
        );
        assert_eq!(list[1].required_str(0, "text").unwrap(), "a, b");
    }

    #[test]
    fn test_instruction_json_form() {
        let ins = NavIns::new(NavInsId::ChoiceChoose).arg(2);
        let value = serde_json::to_value(&ins).unwrap();
        assert_eq!(value, json!({ "id": "CHOICE_CHOOSE", "args": [2] }));
        let back: NavIns = serde_json::from_value(json!({ "id": "RIGHT_CLICK" })).unwrap();
        assert_eq!(back, NavIns::from(NavInsId::RightClick));
    }
}
