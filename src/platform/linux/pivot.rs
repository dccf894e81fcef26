//! Root Pivoter: the ordered `pivot_root` sequence, with rollback on the
//! first failure.
//!
//! `pivot_root(2)` requires that both the new and old root be mount points,
//! that the current working directory sit on the new root, and that the
//! root not be shared-propagated. Getting the nine steps below in this
//! exact order is what makes the syscall succeed; swapping any two fails
//! with a different errno.

use std::fs;
use std::os::fd::{AsFd, BorrowedFd, FromRawFd, OwnedFd};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use nix::fcntl::{open, OFlag};
use nix::mount::{mount, umount2, MntFlags, MsFlags};
use nix::sys::stat::Mode;
use nix::unistd::{chdir, fchdir, pivot_root as sys_pivot_root};

use crate::diag;
use crate::error::PivotError;

/// Opens the current working directory and restores it on drop unless
/// `disarm`ed. This is the rollback mechanism for a partially-completed
/// pivot: whatever step failed, the child's cwd is put back the way it was.
struct OldCwdGuard {
    fd: Option<OwnedFd>,
}

impl OldCwdGuard {
    fn open() -> Result<Self, PivotError> {
        let raw = open(".", OFlag::O_DIRECTORY | OFlag::O_RDONLY, Mode::empty())
            .map_err(PivotError::OpenCwd)?;
        // SAFETY: `open` just returned this as a freshly-opened, uniquely
        // owned descriptor.
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };
        Ok(Self { fd: Some(fd) })
    }

    fn disarm(&mut self) {
        self.fd = None;
    }
}

impl Drop for OldCwdGuard {
    fn drop(&mut self) {
        if let Some(fd) = self.fd.take() {
            let borrowed: BorrowedFd = fd.as_fd();
            if let Err(errno) = fchdir(borrowed) {
                diag::warn(Some(errno), "failed to restore working directory during pivot rollback");
            }
        }
    }
}

/// Perform the pivot_root sequence inside the current mount namespace,
/// making `new_root` the new `/`. `put_root_name` is the scratch directory
/// name created under `new_root` to receive the old root (e.g.
/// `.old_root`); it is removed again before this function returns.
///
/// On any failure, best-effort rolls back: lazy-detaches and removes the
/// scratch directory, and restores the working directory. Returns the
/// error describing which step failed.
pub fn pivot_root(new_root: &Path, put_root_name: &str) -> Result<(), PivotError> {
    // 1. Make the whole tree private so our changes don't propagate to the
    //    host's mount namespace.
    mount(
        None::<&str>,
        "/",
        None::<&str>,
        MsFlags::MS_REC | MsFlags::MS_PRIVATE,
        None::<&str>,
    )
    .map_err(PivotError::MakePrivate)?;

    // 2. Bind-mount new_root onto itself: promotes it to a mount point
    //    (pivot_root's prerequisite) and captures any sub-mounts beneath it.
    mount(
        Some(new_root),
        new_root,
        None::<&str>,
        MsFlags::MS_BIND | MsFlags::MS_REC,
        None::<&str>,
    )
    .map_err(PivotError::BindSelf)?;

    // 3. Retain the current working directory for rollback.
    let mut cwd_guard = OldCwdGuard::open()?;

    // From here, any failure must go through `fail_with` so the guard's
    // Drop impl restores the cwd, and the scratch directory is cleaned up.
    if let Err(e) = run_pivot_steps(new_root, put_root_name) {
        rollback_put_root(new_root, put_root_name);
        return Err(e);
    }

    // Success: the guard's rollback is no longer needed.
    cwd_guard.disarm();
    Ok(())
}

fn run_pivot_steps(new_root: &Path, put_root_name: &str) -> Result<(), PivotError> {
    // 4. chdir into the new root.
    chdir(new_root).map_err(PivotError::ChdirNewRoot)?;

    // 5. Create the scratch directory to receive the old root.
    let put_root = new_root.join(put_root_name);
    match fs::create_dir(&put_root) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
        Err(e) => return Err(PivotError::CreatePutOld(e)),
    }
    let _ = fs::set_permissions(&put_root, fs::Permissions::from_mode(0o700));

    // 6. pivot_root(".", put_root_name): swaps root and old root.
    sys_pivot_root(".", put_root_name).map_err(PivotError::Syscall)?;

    // 7. chdir to / (the new root).
    chdir("/").map_err(PivotError::ChdirRoot)?;

    // 8. Lazy-detach the old root so it's no longer reachable.
    let put_root_abs = Path::new("/").join(put_root_name);
    if let Err(errno) = umount2(&put_root_abs, MntFlags::MNT_DETACH) {
        diag::warn(Some(errno), &format!("failed to unmount old root at {}", put_root_abs.display()));
    }

    // 9. Remove the now-empty scratch directory.
    if let Err(e) = fs::remove_dir(&put_root_abs) {
        diag::warn(None, &format!("failed to remove old root directory {}: {e}", put_root_abs.display()));
    }

    Ok(())
}

fn rollback_put_root(new_root: &Path, put_root_name: &str) {
    let put_root = new_root.join(put_root_name);
    if let Err(errno) = umount2(&put_root, MntFlags::MNT_DETACH) {
        diag::warn(Some(errno), &format!("rollback: failed to unmount {}", put_root.display()));
    }
    if let Err(e) = fs::remove_dir(&put_root) {
        diag::warn(None, &format!("rollback: failed to remove {}: {e}", put_root.display()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn old_cwd_guard_disarm_prevents_restore() {
        // Disarming just drops the held fd; nothing to assert about side
        // effects without actually chdir'ing, but this exercises the path
        // without requiring namespace privileges.
        let mut guard = OldCwdGuard { fd: None };
        guard.disarm();
        assert!(guard.fd.is_none());
    }
}
