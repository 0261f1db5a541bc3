//! Configuration management with environment variable support.
//!
//! Settings shared by the library and the `device-harness` binary:
//! - Environment variables for every process-wide setting
//! - Defaults used when a variable is unset or unparsable
//! - Conversion into a [`NavigatorConfig`]
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DEVICE_HARNESS_GOLDEN_RUN` | Record goldens instead of comparing | `false` |
//! | `DEVICE_HARNESS_DEVICE` | Device driven by the harness | `nanox` |
//! | `DEVICE_HARNESS_SNAPSHOT_ROOT` | Root of the `snapshots/` trees | `tests` |
//! | `DEVICE_HARNESS_LOG` | Log filter (`tracing` env-filter syntax) | `info` |
//! | `DEVICE_HARNESS_SCREEN_CHANGE_TIMEOUT_MS` | Bound of screen-change waits (ms) | `10000` |
//! | `DEVICE_HARNESS_POLL_INTERVAL_MS` | Pause between comparison attempts (ms) | `20` |
//!
//! # Example
//!
//! ```bash
//! # Re-record the goldens of a Stax test suite
//! export DEVICE_HARNESS_GOLDEN_RUN=1
//! export DEVICE_HARNESS_DEVICE=stax
//! ```

use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use crate::device::Device;
use crate::navigator::NavigatorConfig;
use crate::navigator::types::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_SCREEN_CHANGE_TIMEOUT_MS};

// ============================================================================
// Default Values
// ============================================================================

/// Default device
pub const DEFAULT_DEVICE: Device = Device::NanoX;

/// Default snapshot root
pub const DEFAULT_SNAPSHOT_ROOT: &str = "tests";

/// Default log filter
pub const DEFAULT_LOG: &str = "info";

// ============================================================================
// Environment Variable Names
// ============================================================================

/// Environment variable for golden-run mode
pub const ENV_GOLDEN_RUN: &str = "DEVICE_HARNESS_GOLDEN_RUN";

/// Environment variable for the device
pub const ENV_DEVICE: &str = "DEVICE_HARNESS_DEVICE";

/// Environment variable for the snapshot root
pub const ENV_SNAPSHOT_ROOT: &str = "DEVICE_HARNESS_SNAPSHOT_ROOT";

/// Environment variable for the log filter
pub const ENV_LOG: &str = "DEVICE_HARNESS_LOG";

/// Environment variable for the screen-change timeout
pub const ENV_SCREEN_CHANGE_TIMEOUT_MS: &str = "DEVICE_HARNESS_SCREEN_CHANGE_TIMEOUT_MS";

/// Environment variable for the poll interval
pub const ENV_POLL_INTERVAL_MS: &str = "DEVICE_HARNESS_POLL_INTERVAL_MS";

// ============================================================================
// Configuration Getters (with caching)
// ============================================================================

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration (initialized from environment on first access)
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Process-wide harness configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Record goldens instead of comparing against them
    pub golden_run: bool,
    /// Device under test
    pub device: Device,
    /// Root holding `snapshots/` and `snapshots-tmp/`
    pub snapshot_root: PathBuf,
    /// Log filter
    pub log: String,
    /// Bound of screen-change waits (milliseconds)
    pub screen_change_timeout_ms: u64,
    /// Pause between comparison attempts (milliseconds)
    pub poll_interval_ms: u64,
}

impl Config {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::defaults();
        Self {
            golden_run: env::var(ENV_GOLDEN_RUN)
                .ok()
                .and_then(|s| parse_bool(&s))
                .unwrap_or(defaults.golden_run),
            device: env::var(ENV_DEVICE)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.device),
            snapshot_root: env::var(ENV_SNAPSHOT_ROOT)
                .map(PathBuf::from)
                .unwrap_or(defaults.snapshot_root),
            log: env::var(ENV_LOG).unwrap_or(defaults.log),
            screen_change_timeout_ms: env::var(ENV_SCREEN_CHANGE_TIMEOUT_MS)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.screen_change_timeout_ms),
            poll_interval_ms: env::var(ENV_POLL_INTERVAL_MS)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.poll_interval_ms),
        }
    }

    /// Create configuration with all defaults (ignoring environment)
    pub fn defaults() -> Self {
        Self {
            golden_run: false,
            device: DEFAULT_DEVICE,
            snapshot_root: PathBuf::from(DEFAULT_SNAPSHOT_ROOT),
            log: DEFAULT_LOG.to_string(),
            screen_change_timeout_ms: DEFAULT_SCREEN_CHANGE_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Navigator settings derived from this configuration
    pub fn navigator_config(&self) -> NavigatorConfig {
        NavigatorConfig::default()
            .golden_run(self.golden_run)
            .screen_change_timeout(Duration::from_millis(self.screen_change_timeout_ms))
            .poll_interval(Duration::from_millis(self.poll_interval_ms))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse a boolean flag: "1", "true", "yes", "on" and their negations
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Whether goldens are being recorded (convenience function)
pub fn golden_run() -> bool {
    get().golden_run
}

/// Device under test (convenience function)
pub fn device() -> Device {
    get().device
}

/// Snapshot root (convenience function)
pub fn snapshot_root() -> PathBuf {
    get().snapshot_root.clone()
}

/// Navigator settings from the environment (convenience function)
pub fn navigator_config() -> NavigatorConfig {
    get().navigator_config()
}
