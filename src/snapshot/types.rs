// Core types for snapshot directory handling

use serde::{Deserialize, Serialize};
use std::path::{Component, PathBuf};

use crate::device::Device;

/// Directory holding golden snapshots, under the snapshot root
pub const GOLDEN_DIR: &str = "snapshots";

/// Directory holding the snapshots of the current run, under the snapshot root
pub const TMP_DIR: &str = "snapshots-tmp";

/// Where the snapshots of one test case live
///
/// `<root>/snapshots/<device>/<name>/` holds the golden frames and
/// `<root>/snapshots-tmp/<device>/<name>/` the frames of the current run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotCase {
    /// Snapshot root, usually the test suite directory
    pub root: PathBuf,

    /// Test case name, relative to the device directory (may be nested)
    pub name: PathBuf,
}

impl SnapshotCase {
    pub fn new(root: impl Into<PathBuf>, name: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            name: name.into(),
        }
    }

    /// Golden or temporary directory of this case for `device`
    pub fn dir(&self, device: Device, golden: bool) -> PathBuf {
        let subdir = if golden { GOLDEN_DIR } else { TMP_DIR };
        self.root.join(subdir).join(device.name()).join(&self.name)
    }

    pub fn golden_dir(&self, device: Device) -> PathBuf {
        self.dir(device, true)
    }

    pub fn tmp_dir(&self, device: Device) -> PathBuf {
        self.dir(device, false)
    }

    /// Case names must stay below the device directory
    pub fn validate(&self) -> SnapshotResult<()> {
        let escapes = self.name.as_os_str().is_empty()
            || self
                .name
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(SnapshotError::InvalidCaseName(self.name.clone()));
        }
        Ok(())
    }
}

/// Snapshot directory pair resolved for one navigation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotDirs {
    pub golden: PathBuf,
    pub tmp: PathBuf,
}

impl SnapshotDirs {
    pub fn golden_snap(&self, index: usize) -> PathBuf {
        super::dirs::snap_path(&self.golden, index)
    }

    pub fn tmp_snap(&self, index: usize) -> PathBuf {
        super::dirs::snap_path(&self.tmp, index)
    }

    /// Golden file named explicitly (e.g. `00003.png`)
    pub fn golden_named(&self, file_name: &str) -> PathBuf {
        self.golden.join(file_name)
    }
}

/// Result type for snapshot directory operations
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Error types for snapshot directory operations
#[derive(Debug)]
pub enum SnapshotError {
    /// Golden directory does not exist and the run does not record goldens
    GoldenDirMissing(PathBuf),

    /// Test case name is empty, absolute, or climbs out of its directory
    InvalidCaseName(PathBuf),

    /// I/O error
    Io(std::io::Error),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::GoldenDirMissing(path) => write!(
                f,
                "Golden snapshots directory ({}) does not exist.",
                path.display()
            ),
            SnapshotError::InvalidCaseName(name) => {
                write!(f, "Invalid test case name '{}'", name.display())
            }
            SnapshotError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SnapshotError {
    fn from(err: std::io::Error) -> Self {
        SnapshotError::Io(err)
    }
}
