//! JSON description of an application driven by the screen emulator.
//!
//! ```json
//! {
//!   "name": "demo",
//!   "home": "home",
//!   "screens": [
//!     { "id": "home", "lines": ["Demo app", "is ready"], "right": "review" },
//!     { "id": "review", "lines": ["Review", "transaction"], "both": "approved" },
//!     { "id": "approved", "lines": ["Approved"], "auto": { "after_ms": 300, "to": "home" } }
//!   ],
//!   "commands": [
//!     { "cla": 224, "ins": 4, "prompt": "review", "approve_on": ["approved"], "response": "01" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use super::types::{BackendError, BackendResult};

/// A complete application model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppModel {
    pub name: String,

    /// Screen the application idles on
    pub home: String,

    /// Screen displayed at launch, `home` when absent
    #[serde(default)]
    pub start: Option<String>,

    pub screens: Vec<ScreenModel>,

    #[serde(default)]
    pub commands: Vec<CommandModel>,
}

/// One screen and the inputs that leave it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenModel {
    pub id: String,

    /// Displayed text, one entry per line
    pub lines: Vec<String>,

    #[serde(default)]
    pub right: Option<String>,

    #[serde(default)]
    pub left: Option<String>,

    #[serde(default)]
    pub both: Option<String>,

    #[serde(default)]
    pub swipe_left: Option<String>,

    #[serde(default)]
    pub swipe_right: Option<String>,

    #[serde(default)]
    pub touch: Vec<TouchRegion>,

    /// Transition taken without input once the screen has been shown long enough
    #[serde(default)]
    pub auto: Option<AutoTransition>,
}

/// Rectangle of a touch screen leading to another screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchRegion {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub to: String,

    /// Minimum press duration (long press buttons), 0 for a plain tap
    #[serde(default)]
    pub min_delay_ms: u64,
}

impl TouchRegion {
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoTransition {
    pub after_ms: u64,
    pub to: String,
}

/// APDU command understood by the application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandModel {
    pub cla: u8,
    pub ins: u8,

    /// Screen opened by the command; answered immediately when absent
    #[serde(default)]
    pub prompt: Option<String>,

    /// Reaching one of these screens answers with the response and 0x9000
    #[serde(default)]
    pub approve_on: Vec<String>,

    /// Reaching one of these screens answers with 0x6985
    #[serde(default)]
    pub reject_on: Vec<String>,

    /// Hex-encoded response payload
    #[serde(default)]
    pub response: String,
}

impl CommandModel {
    pub fn response_bytes(&self) -> BackendResult<Vec<u8>> {
        hex::decode(&self.response).map_err(|e| {
            BackendError::Model(format!(
                "response of command {:02x}/{:02x} is not hex: {}",
                self.cla, self.ins, e
            ))
        })
    }
}

impl AppModel {
    /// Parse and validate a model from JSON text
    pub fn from_json(text: &str) -> BackendResult<Self> {
        let model: AppModel = serde_json::from_str(text)?;
        model.validate()?;
        Ok(model)
    }

    pub fn from_value(value: serde_json::Value) -> BackendResult<Self> {
        let model: AppModel = serde_json::from_value(value)?;
        model.validate()?;
        Ok(model)
    }

    pub fn from_file(path: &Path) -> BackendResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn screen_index(&self, id: &str) -> Option<usize> {
        self.screens.iter().position(|screen| screen.id == id)
    }

    pub fn start_screen(&self) -> &str {
        self.start.as_deref().unwrap_or(&self.home)
    }

    /// Check that ids are unique and every reference names a known screen
    pub fn validate(&self) -> BackendResult<()> {
        let mut ids = HashSet::new();
        for screen in &self.screens {
            if !ids.insert(screen.id.as_str()) {
                return Err(BackendError::Model(format!("duplicate screen '{}'", screen.id)));
            }
        }

        let check = |id: &str, context: &str| {
            if ids.contains(id) {
                Ok(())
            } else {
                Err(BackendError::Model(format!(
                    "{} references unknown screen '{}'",
                    context, id
                )))
            }
        };

        check(&self.home, "home")?;
        check(self.start_screen(), "start")?;
        for screen in &self.screens {
            let context = format!("screen '{}'", screen.id);
            for target in [
                &screen.right,
                &screen.left,
                &screen.both,
                &screen.swipe_left,
                &screen.swipe_right,
            ]
            .into_iter()
            .flatten()
            {
                check(target, &context)?;
            }
            for region in &screen.touch {
                check(&region.to, &context)?;
            }
            if let Some(auto) = &screen.auto {
                check(&auto.to, &context)?;
            }
        }
        for command in &self.commands {
            let context = format!("command {:02x}/{:02x}", command.cla, command.ins);
            if let Some(prompt) = &command.prompt {
                check(prompt, &context)?;
            }
            for id in command.approve_on.iter().chain(&command.reject_on) {
                check(id, &context)?;
            }
            command.response_bytes()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_minimal_model() {
        let model = AppModel::from_value(json!({
            "name": "demo",
            "home": "home",
            "screens": [
                { "id": "home", "lines": ["Ready"], "right": "next" },
                { "id": "next", "lines": ["Next"], "left": "home" }
            ]
        }))
        .unwrap();

        assert_eq!(model.start_screen(), "home");
        assert_eq!(model.screen_index("next"), Some(1));
        assert_eq!(model.screens[0].right.as_deref(), Some("next"));
        assert!(model.commands.is_empty());
    }

    #[test]
    fn test_unknown_screen_is_rejected() {
        let err = AppModel::from_value(json!({
            "name": "demo",
            "home": "home",
            "screens": [{ "id": "home", "lines": [], "both": "nowhere" }]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("nowhere"));
    }

    #[test]
    fn test_duplicate_screen_is_rejected() {
        let err = AppModel::from_value(json!({
            "name": "demo",
            "home": "home",
            "screens": [
                { "id": "home", "lines": [] },
                { "id": "home", "lines": [] }
            ]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_command_response_must_be_hex() {
        let err = AppModel::from_value(json!({
            "name": "demo",
            "home": "home",
            "screens": [{ "id": "home", "lines": [] }],
            "commands": [{ "cla": 224, "ins": 1, "response": "zz" }]
        }))
        .unwrap_err();
        assert!(matches!(err, BackendError::Model(_)));
    }

    #[test]
    fn test_touch_region_bounds() {
        let region = TouchRegion {
            x: 10,
            y: 20,
            w: 5,
            h: 5,
            to: "home".into(),
            min_delay_ms: 0,
        };
        assert!(region.contains(10, 20));
        assert!(region.contains(14, 24));
        assert!(!region.contains(15, 24));
    }
}
