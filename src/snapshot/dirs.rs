//! On-disk snapshot layout.
//!
//! Frames are named after their index in the flow, zero-padded to 5 digits
//! (`00000.png`, `00001.png`, ...). The temporary directory of a case is
//! owned by the navigation call using it and reset when that call starts.

use std::fs;
use std::path::{Path, PathBuf};

use super::types::{SnapshotCase, SnapshotDirs, SnapshotError, SnapshotResult, TMP_DIR};
use crate::device::Device;

/// Path of frame `index` in `dir`
pub fn snap_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("{:05}.png", index))
}

/// Frame index encoded in a snapshot file name, if it is one
pub fn snap_index(path: &Path) -> Option<usize> {
    if path.extension().is_none_or(|ext| ext != "png") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if stem.len() != 5 || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

/// Resolve the golden directory of a case
///
/// A missing directory is created when recording goldens and is an error
/// otherwise.
pub fn check_golden_dir(case: &SnapshotCase, device: Device, golden_run: bool) -> SnapshotResult<PathBuf> {
    case.validate()?;
    let dir = case.golden_dir(device);
    if !dir.is_dir() {
        if golden_run {
            fs::create_dir_all(&dir)?;
            tracing::info!(dir = %dir.display(), "created golden snapshots directory");
        } else {
            return Err(SnapshotError::GoldenDirMissing(dir));
        }
    }
    Ok(dir)
}

/// Prepare the temporary directory of a case
///
/// Frames numbered `start_idx` and above are removed, along with any other
/// file; frames below `start_idx` belong to an earlier phase of the same
/// flow and are kept. Subdirectories are left alone.
pub fn init_tmp_dir(case: &SnapshotCase, device: Device, start_idx: usize) -> SnapshotResult<PathBuf> {
    case.validate()?;
    let dir = case.tmp_dir(device);
    if !dir.exists() {
        fs::create_dir_all(&dir)?;
        return Ok(dir);
    }

    let mut removed = 0;
    for entry in fs::read_dir(&dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let keep = snap_index(&path).is_some_and(|index| index < start_idx);
        if !keep {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    tracing::debug!(dir = %dir.display(), removed, start_idx, "reset temporary snapshots");
    Ok(dir)
}

/// Resolve both directories of a case for one navigation call
pub fn prepare(
    case: &SnapshotCase,
    device: Device,
    golden_run: bool,
    start_idx: usize,
) -> SnapshotResult<SnapshotDirs> {
    // Golden first: a missing golden directory must fail before any file is touched
    let golden = check_golden_dir(case, device, golden_run)?;
    let tmp = init_tmp_dir(case, device, start_idx)?;
    Ok(SnapshotDirs { golden, tmp })
}

/// Snapshot files of a directory, sorted by index
pub fn list_snaps(dir: &Path) -> SnapshotResult<Vec<PathBuf>> {
    let mut snaps = Vec::new();
    if dir.exists() {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if snap_index(&path).is_some() {
                snaps.push(path);
            }
        }
    }
    snaps.sort();
    Ok(snaps)
}

/// Remove the temporary tree under `root`, for one device or all of them
///
/// Returns whether something was removed.
pub fn clean_tmp_tree(root: &Path, device: Option<Device>) -> SnapshotResult<bool> {
    let mut dir = root.join(TMP_DIR);
    if let Some(device) = device {
        dir = dir.join(device.name());
    }
    if !dir.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(&dir)?;
    tracing::info!(dir = %dir.display(), "removed temporary snapshots");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_snap_path_is_zero_padded() {
        assert!(snap_path(Path::new("/x"), 0).ends_with("00000.png"));
        assert!(snap_path(Path::new("/x"), 42).ends_with("00042.png"));
        assert!(snap_path(Path::new("/x"), 12345).ends_with("12345.png"));
    }

    #[test]
    fn test_snap_index() {
        assert_eq!(snap_index(Path::new("/x/00007.png")), Some(7));
        assert_eq!(snap_index(Path::new("/x/7.png")), None);
        assert_eq!(snap_index(Path::new("/x/00007.txt")), None);
        assert_eq!(snap_index(Path::new("/x/abcde.png")), None);
    }

    #[test]
    fn test_case_layout() {
        let case = SnapshotCase::new("/suite", "test_sign");
        assert_eq!(
            case.golden_dir(Device::NanoX),
            PathBuf::from("/suite/snapshots/nanox/test_sign")
        );
        assert_eq!(
            case.tmp_dir(Device::Stax),
            PathBuf::from("/suite/snapshots-tmp/stax/test_sign")
        );
    }

    #[test]
    fn test_invalid_case_names() {
        for name in ["", "../escape", "/absolute"] {
            let case = SnapshotCase::new("/suite", name);
            assert!(matches!(case.validate(), Err(SnapshotError::InvalidCaseName(_))));
        }
        assert!(SnapshotCase::new("/suite", "group/test").validate().is_ok());
    }

    #[test]
    fn test_golden_dir_missing() {
        let root = tempdir().unwrap();
        let case = SnapshotCase::new(root.path(), "test_missing");
        let err = check_golden_dir(&case, Device::NanoS, false).unwrap_err();
        assert!(matches!(err, SnapshotError::GoldenDirMissing(_)));
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_golden_dir_created_in_golden_run() {
        let root = tempdir().unwrap();
        let case = SnapshotCase::new(root.path(), "test_record");
        let dir = check_golden_dir(&case, Device::Flex, true).unwrap();
        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn test_init_tmp_dir_keeps_earlier_frames() {
        let root = tempdir().unwrap();
        let case = SnapshotCase::new(root.path(), "test_resume");
        let dir = init_tmp_dir(&case, Device::NanoSP, 0).unwrap();
        for index in 0..4 {
            fs::write(snap_path(&dir, index), b"frame").unwrap();
        }
        fs::write(dir.join("notes.txt"), b"stale").unwrap();

        init_tmp_dir(&case, Device::NanoSP, 2).unwrap();
        let names: Vec<String> = list_snaps(&dir)
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["00000.png", "00001.png"]);
        assert!(!dir.join("notes.txt").exists());

        init_tmp_dir(&case, Device::NanoSP, 0).unwrap();
        assert!(list_snaps(&dir).unwrap().is_empty());
    }

    #[test]
    fn test_prepare_checks_golden_before_tmp() {
        let root = tempdir().unwrap();
        let case = SnapshotCase::new(root.path(), "test_order");
        assert!(prepare(&case, Device::Stax, false, 0).is_err());
        assert!(!case.tmp_dir(Device::Stax).exists());
    }

    #[test]
    fn test_clean_tmp_tree() {
        let root = tempdir().unwrap();
        let case = SnapshotCase::new(root.path(), "test_clean");
        init_tmp_dir(&case, Device::NanoX, 0).unwrap();
        init_tmp_dir(&case, Device::Stax, 0).unwrap();

        assert!(clean_tmp_tree(root.path(), Some(Device::NanoX)).unwrap());
        assert!(!case.tmp_dir(Device::NanoX).exists());
        assert!(case.tmp_dir(Device::Stax).exists());

        assert!(clean_tmp_tree(root.path(), None).unwrap());
        assert!(!clean_tmp_tree(root.path(), None).unwrap());
    }
}
