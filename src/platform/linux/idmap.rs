//! Identity Mapper: writes the uid/gid/setgroups mapping files of a child
//! from the parent, so the child may appear as root inside its own user
//! namespace.
//!
//! Ordering is mandatory: `setgroups` must be set to `deny` before
//! `gid_map` can be written by an unprivileged process. Each file is
//! written with a single `write(2)`; a short write is treated as failure,
//! since the kernel itself rejects partial map writes.

use std::fs::OpenOptions;
use std::os::fd::AsFd;

use nix::unistd::{Gid, Pid, Uid};

use crate::error::IdMapError;

/// Map uid 0 and gid 0 inside `child`'s user namespace to `uid`/`gid`
/// outside it. Must be called after the child has been created (so
/// `/proc/<pid>/...` exists) and before the barrier is released.
pub fn map_identity(child: Pid, uid: Uid, gid: Gid) -> Result<(), IdMapError> {
    write_map_file(child, "uid_map", format!("0 {uid} 1\n").as_bytes())?;
    write_map_file(child, "setgroups", b"deny")?;
    write_map_file(child, "gid_map", format!("0 {gid} 1\n").as_bytes())?;
    Ok(())
}

fn write_map_file(pid: Pid, name: &str, contents: &[u8]) -> Result<(), IdMapError> {
    let path = format!("/proc/{pid}/{name}");
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(&path)
        .map_err(|source| IdMapError::Open { path: path.clone(), source })?;

    let written = nix::unistd::write(file.as_fd(), contents)
        .map_err(|source| IdMapError::Write { path: path.clone(), source })?;

    if written != contents.len() {
        return Err(IdMapError::ShortWrite { path, wrote: written, expected: contents.len() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_map_line_has_the_expected_shape() {
        let uid = Uid::from_raw(1000);
        let line = format!("0 {uid} 1\n");
        assert_eq!(line, "0 1000 1\n");
    }

    #[test]
    fn gid_map_line_has_the_expected_shape() {
        let gid = Gid::from_raw(1000);
        let line = format!("0 {gid} 1\n");
        assert_eq!(line, "0 1000 1\n");
    }

    #[test]
    fn mapping_a_nonexistent_pid_reports_open_failure() {
        // PID 1 exists but this process almost certainly lacks permission
        // to write its maps; some very permissive CI sandboxes might still
        // allow it, so assert on a PID that cannot exist instead.
        let bogus = Pid::from_raw(i32::MAX - 1);
        let err = map_identity(bogus, Uid::from_raw(0), Gid::from_raw(0));
        assert!(err.is_err());
    }
}
