pub mod dirs;
pub mod types;

pub use dirs::{check_golden_dir, clean_tmp_tree, init_tmp_dir, list_snaps, prepare, snap_index, snap_path};
pub use types::{GOLDEN_DIR, SnapshotCase, SnapshotDirs, SnapshotError, SnapshotResult, TMP_DIR};
