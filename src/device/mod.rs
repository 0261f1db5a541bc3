//! Device models supported by the harness.
//!
//! Button devices (the Nano family) are driven with left/right/both clicks,
//! touch devices (Stax, Flex) with finger touches and swipes at fixed
//! screen coordinates (see [`positions`]).

pub mod positions;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use positions::Position;

/// Device models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    NanoS,
    NanoSP,
    NanoX,
    Stax,
    Flex,
}

impl Device {
    /// Every supported device, button devices first
    pub const ALL: [Device; 5] = [
        Device::NanoS,
        Device::NanoSP,
        Device::NanoX,
        Device::Stax,
        Device::Flex,
    ];

    /// Name used on disk (`snapshots/<name>/...`) and on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Device::NanoS => "nanos",
            Device::NanoSP => "nanosp",
            Device::NanoX => "nanox",
            Device::Stax => "stax",
            Device::Flex => "flex",
        }
    }

    /// Screen resolution in pixels (width, height)
    pub fn resolution(&self) -> (u32, u32) {
        match self {
            Device::NanoS => (128, 32),
            Device::NanoSP | Device::NanoX => (128, 64),
            Device::Stax => (400, 670),
            Device::Flex => (480, 600),
        }
    }

    /// Whether the device is driven with buttons
    pub fn is_nano(&self) -> bool {
        matches!(self, Device::NanoS | Device::NanoSP | Device::NanoX)
    }

    /// Whether the device has a touch screen
    pub fn is_touchable(&self) -> bool {
        !self.is_nano()
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown device name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDevice(pub String);

impl fmt::Display for UnknownDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown device '{}'. Use one of: nanos, nanosp, nanox, stax, flex",
            self.0
        )
    }
}

impl std::error::Error for UnknownDevice {}

impl FromStr for Device {
    type Err = UnknownDevice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Device::ALL
            .into_iter()
            .find(|device| device.name() == lowered)
            .ok_or_else(|| UnknownDevice(s.to_string()))
    }
}
