//! Filesystem Scaffolder: idempotent, order-preserving mounts/nodes/symlinks
//! driven entirely by the declarative tables in `core::scaffold`.
//!
//! None of these functions propagate failures to their caller. Every
//! per-entry failure is logged via `diag::warn` and the batch continues —
//! later components (the Root Pivoter, the exec at the end of the child)
//! fail loudly if a mount that was actually required turned out to be
//! missing, so silently skipping an optional one here is the correct
//! default.

use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::mount::{mount, umount2, MntFlags, MsFlags};
use nix::sys::stat::{self, Mode, SFlag};
use nix::unistd;

use crate::core::scaffold::{
    DeviceNode, DeviceSymlink, MountEntry, CONTAINER_MOUNTS, DEVICE_NODES, DEVICE_SYMLINKS,
    HOST_STAGE_MOUNTS,
};
use crate::diag;
use crate::util::fs as ufs;

/// Stage all host-side mounts under `root`, in table order. Directory
/// creation failures and mount failures are both logged and do not abort
/// the batch: a later entry might still succeed even though an earlier one
/// didn't.
pub fn stage_host_mounts(root: &Path) {
    for entry in HOST_STAGE_MOUNTS {
        stage_one(root, entry);
    }
}

fn stage_one(root: &Path, entry: &MountEntry) {
    let target = root.join(entry.target);
    if let Err(e) = ufs::ensure_dir_mode(&target, entry.dir_mode) {
        diag::warn(None, &format!("failed to create mount target {}: {e}", target.display()));
        // Fall through: the mount itself may still succeed if the
        // directory already existed under different ownership/perms.
    }

    if let Err(errno) = mount(
        Some(entry.source),
        &target,
        entry.fstype,
        entry.flags,
        entry.data,
    ) {
        diag::warn(
            Some(errno),
            &format!("failed to mount {} at {}", entry.source, target.display()),
        );
    }
}

/// Unmount all host-stage mounts under `root`, in reverse table order.
/// Best-effort: the child's mount namespace already captured these at
/// clone time, so a failure here only leaks a host-side mount entry.
pub fn unstage_host_mounts(root: &Path) {
    for entry in HOST_STAGE_MOUNTS.iter().rev() {
        let target = root.join(entry.target);
        if let Err(errno) = umount2(&target, MntFlags::MNT_DETACH) {
            diag::warn(Some(errno), &format!("failed to unmount {}", target.display()));
        }
    }
}

/// Create all device nodes under `root`, in table order. Failures (e.g.
/// missing `CAP_MKNOD`) are logged, not fatal: the container simply lacks
/// that device.
pub fn create_host_devices(root: &Path) {
    for dev in DEVICE_NODES {
        create_one_device(root, dev);
    }
}

fn create_one_device(root: &Path, dev: &DeviceNode) {
    let path = root.join(dev.path);
    if let Some(parent) = path.parent() {
        if let Err(e) = ufs::ensure_dir(parent) {
            diag::warn(None, &format!("failed to create {}: {e}", parent.display()));
        }
    }

    let mode = Mode::from_bits_truncate(dev.mode);
    let rdev = stat::makedev(dev.major, dev.minor);
    match stat::mknod(&path, SFlag::S_IFCHR, mode, rdev) {
        Ok(()) | Err(Errno::EEXIST) => {}
        Err(errno) => {
            diag::warn(Some(errno), &format!("failed to create device node {}", path.display()));
        }
    }
}

/// Apply the in-container mount table. Invoked post-pivot, so `target` is
/// resolved against `/`.
pub fn create_container_mounts() {
    for entry in CONTAINER_MOUNTS {
        create_container_mount_one(entry);
    }
}

fn create_container_mount_one(entry: &MountEntry) {
    let target = PathBuf::from("/").join(entry.target);
    if let Err(e) = ufs::ensure_dir_mode(&target, entry.dir_mode) {
        diag::warn(None, &format!("failed to create mount target {}: {e}", target.display()));
    }

    if let Err(errno) = mount(
        Some(entry.source),
        &target,
        entry.fstype,
        entry.flags,
        entry.data,
    ) {
        diag::warn(
            Some(errno),
            &format!("failed to mount {} at {}", entry.source, target.display()),
        );
    }
}

/// Create the in-container device symlinks. Invoked post-pivot.
pub fn create_container_symlinks() {
    for link in DEVICE_SYMLINKS {
        create_one_symlink(link);
    }
}

fn create_one_symlink(link: &DeviceSymlink) {
    let path = PathBuf::from("/").join(link.link);
    if let Some(parent) = path.parent() {
        if let Err(e) = ufs::ensure_dir(parent) {
            diag::warn(None, &format!("failed to create {}: {e}", parent.display()));
        }
    }

    match unistd::symlinkat(link.target, None, &path) {
        Ok(()) | Err(Errno::EEXIST) => {}
        Err(errno) => {
            diag::warn(
                Some(errno),
                &format!("failed to symlink {} -> {}", path.display(), link.target),
            );
        }
    }
}
