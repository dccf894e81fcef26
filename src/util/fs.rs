use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use anyhow::{Context, Result};

/// Ensure a directory exists at `path`. Does not create missing ancestors:
/// the scaffolder's callers only ever need the immediate parent to already
/// exist (it was either mounted or created by an earlier, earlier-ordered
/// table entry), so a genuinely missing root of the tree — e.g. a
/// mistyped `new_root_path` — surfaces here as a real error instead of
/// being silently auto-created.
pub fn ensure_dir(path: &Path) -> Result<()> {
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => {
            Err(e).with_context(|| format!("failed to create directory {}", path.display()))
        }
    }
}

/// Recursively ensure a directory exists with the given permission bits.
/// The mode is (re)applied whether or not the directory already existed, so
/// repeated runs converge on the same permissions (idempotence).
pub fn ensure_dir_mode(path: &Path, mode: u32) -> Result<()> {
    ensure_dir(path)?;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .with_context(|| format!("failed to set mode on {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_dir_mode_sets_requested_bits() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a");
        ensure_dir_mode(&target, 0o700).unwrap();
        let mode = fs::metadata(&target).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o700);
    }

    #[test]
    fn ensure_dir_does_not_create_missing_ancestors() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing-parent/child");
        assert!(ensure_dir(&target).is_err());
    }

    #[test]
    fn ensure_dir_treats_already_exists_as_success() {
        let dir = tempfile::tempdir().unwrap();
        ensure_dir(dir.path()).unwrap();
    }
}
