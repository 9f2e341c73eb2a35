use std::path::{Path, PathBuf};

use crate::{startup_mode::PackagingMode, WEB_ROOT_ENTRY_FILE};

const WEB_BUILD_DIR: [&str; 2] = ["build", "web"];

fn join_web_build_dir(base: &Path) -> PathBuf {
    WEB_BUILD_DIR
        .iter()
        .fold(base.to_path_buf(), |path, segment| path.join(segment))
}

/// Maps a packaging mode to the directory holding the pre-built web assets.
///
/// Nothing is checked on disk; a missing directory or entry file shows up
/// later as a load failure.
pub fn resolve_web_root(mode: &PackagingMode) -> PathBuf {
    match mode {
        PackagingMode::Packaged { resources_dir } => join_web_build_dir(resources_dir),
        PackagingMode::Development { manifest_dir } => join_web_build_dir(&manifest_dir.join("..")),
    }
}

pub fn resolve_web_root_with_override(mode: &PackagingMode, override_dir: Option<&Path>) -> PathBuf {
    match override_dir {
        Some(path) if !path.as_os_str().is_empty() => path.to_path_buf(),
        _ => resolve_web_root(mode),
    }
}

pub fn web_root_entry_missing(web_root: &Path) -> bool {
    !web_root.join(WEB_ROOT_ENTRY_FILE).is_file()
}
