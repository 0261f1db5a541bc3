// Core types shared by every backend

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::apdu::ExceptionRapdu;

/// Region of a screenshot kept for comparison
///
/// Box coordinates in pixels: `left`/`upper` inclusive, `right`/`lower`
/// exclusive. Bounds larger than the image are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crop {
    pub left: u32,
    pub upper: u32,
    pub right: u32,
    pub lower: u32,
}

impl Crop {
    pub fn new(left: u32, upper: u32, right: u32, lower: u32) -> Self {
        Self {
            left,
            upper,
            right,
            lower,
        }
    }

    /// Clamp the box to an image of the given size, as `(x, y, width, height)`
    pub fn clamp_to(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let left = self.left.min(width);
        let upper = self.upper.min(height);
        let right = self.right.min(width).max(left);
        let lower = self.lower.min(height).max(upper);
        (left, upper, right - left, lower - upper)
    }
}

/// Textual content of the screen, one entry per displayed line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenContent {
    pub lines: Vec<String>,
}

impl ScreenContent {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Whether any line contains `text` as a substring
    pub fn contains(&self, text: &str) -> bool {
        self.lines.iter().any(|line| line.contains(text))
    }
}

/// Direction of a finger swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for backend operations
#[derive(Debug)]
pub enum BackendError {
    /// I/O error
    Io(std::io::Error),

    /// Image decoding or encoding error
    Image(image::ImageError),

    /// Golden snapshot file does not exist
    GoldenMissing(PathBuf),

    /// Text pattern is not a valid regular expression
    Pattern(regex::Error),

    /// Screen did not change before the timeout
    ScreenChangeTimeout,

    /// Text did not appear on screen before the timeout
    TextNotShown(String),

    /// Text did not leave the screen before the timeout
    TextStillShown(String),

    /// Home screen was not reached before the timeout
    HomeScreenTimeout,

    /// APDU response status rejected by the raise policy
    Status(ExceptionRapdu),

    /// `complete_exchange` called without a matching pending exchange
    NoPendingExchange,

    /// APDU payload longer than a short length byte can announce
    PayloadTooLong(usize),

    /// Response not available yet (the prompt is still waiting for a decision)
    ExchangeNotReady,

    /// Application model could not be loaded
    Model(String),

    /// Action is not available on this backend or device
    Unsupported(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::Io(err) => write!(f, "I/O error: {}", err),
            BackendError::Image(err) => write!(f, "Image error: {}", err),
            BackendError::GoldenMissing(path) => {
                write!(f, "No such file or directory: '{}'", path.display())
            }
            BackendError::Pattern(err) => write!(f, "Invalid text pattern: {}", err),
            BackendError::ScreenChangeTimeout => write!(f, "Timeout waiting for screen change"),
            BackendError::TextNotShown(text) => {
                write!(f, "Timeout waiting for text '{}' on screen", text)
            }
            BackendError::TextStillShown(text) => {
                write!(f, "Timeout waiting for text '{}' to leave the screen", text)
            }
            BackendError::HomeScreenTimeout => write!(f, "Timeout waiting for home screen"),
            BackendError::Status(err) => write!(f, "{}", err),
            BackendError::NoPendingExchange => write!(f, "No exchange is pending"),
            BackendError::PayloadTooLong(len) => {
                write!(f, "APDU payload of {} bytes exceeds 255 bytes", len)
            }
            BackendError::ExchangeNotReady => {
                write!(f, "Exchange response is not available yet")
            }
            BackendError::Model(msg) => write!(f, "Invalid application model: {}", msg),
            BackendError::Unsupported(msg) => write!(f, "Unsupported action: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackendError::Io(err) => Some(err),
            BackendError::Image(err) => Some(err),
            BackendError::Pattern(err) => Some(err),
            BackendError::Status(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::Io(err)
    }
}

impl From<image::ImageError> for BackendError {
    fn from(err: image::ImageError) -> Self {
        BackendError::Image(err)
    }
}

impl From<regex::Error> for BackendError {
    fn from(err: regex::Error) -> Self {
        BackendError::Pattern(err)
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Model(err.to_string())
    }
}

impl From<ExceptionRapdu> for BackendError {
    fn from(err: ExceptionRapdu) -> Self {
        BackendError::Status(err)
    }
}
