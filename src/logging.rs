//! Logging setup.
//!
//! Called once at process start. Console output goes through an env-filter
//! built from the configured level, in plain text or JSON; APDU traffic
//! (events with target `apdu`) can additionally be copied to a file.

use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::filter::{self, EnvFilter, ParseError};
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, registry};

use crate::config::Config;

/// Target of APDU exchange events
pub const APDU_TARGET: &str = "apdu";

/// Result type for logging setup
pub type LogResult<T> = Result<T, LogError>;

/// Error types for logging setup
#[derive(Debug)]
pub enum LogError {
    /// Level is not a valid filter directive
    Filter(ParseError),

    /// APDU log file cannot be created
    Io(std::io::Error),

    /// A global subscriber is already installed
    Init(TryInitError),
}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogError::Filter(err) => write!(f, "Invalid log filter: {}", err),
            LogError::Io(err) => write!(f, "Cannot open APDU log: {}", err),
            LogError::Init(err) => write!(f, "Failed to initialize logging: {}", err),
        }
    }
}

impl std::error::Error for LogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LogError::Filter(err) => Some(err),
            LogError::Io(err) => Some(err),
            LogError::Init(err) => Some(err),
        }
    }
}

impl From<ParseError> for LogError {
    fn from(err: ParseError) -> Self {
        LogError::Filter(err)
    }
}

impl From<std::io::Error> for LogError {
    fn from(err: std::io::Error) -> Self {
        LogError::Io(err)
    }
}

impl From<TryInitError> for LogError {
    fn from(err: TryInitError) -> Self {
        LogError::Init(err)
    }
}

/// Where and how to log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Filter directives, e.g. `info` or `device_harness=debug`
    pub level: String,
    /// One JSON object per event instead of plain text
    pub json: bool,
    /// File receiving every APDU event, whatever the level filter
    pub apdu_log: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: crate::config::DEFAULT_LOG.to_string(),
            json: false,
            apdu_log: None,
        }
    }
}

impl LogSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            level: config.log.clone(),
            ..Self::default()
        }
    }

    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn apdu_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.apdu_log = Some(path.into());
        self
    }
}

/// Install the global subscriber
pub fn init(settings: &LogSettings) -> LogResult<()> {
    let console_filter = EnvFilter::try_new(&settings.level)?;
    let (plain, json) = if settings.json {
        (None, Some(fmt::layer().json().with_filter(console_filter)))
    } else {
        (Some(fmt::layer().with_target(false).with_filter(console_filter)), None)
    };

    let apdu = match &settings.apdu_log {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let file = File::create(path)?;
            let layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
                .with_filter(filter::filter_fn(|meta| meta.target() == APDU_TARGET));
            Some(layer)
        }
        None => None,
    };

    registry().with(plain).with(json).with(apdu).try_init()?;
    tracing::debug!(level = %settings.level, json = settings.json, "logging initialized");
    Ok(())
}
