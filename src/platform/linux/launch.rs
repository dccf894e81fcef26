//! Namespace Launcher / Supervisor: the parent side of the bring-up
//! protocol. Creates the synchronization pipe, stages host-side scaffolding,
//! spawns the child into a fresh namespace set, maps its identity, then
//! releases the barrier and waits for it to exit.

use std::os::fd::{AsRawFd, OwnedFd};

use nix::sched::clone;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{self, Pid};

use crate::core::model::Request;
use crate::diag;
use crate::error::LaunchError;
use crate::platform::linux::{child, fs_scaffold, idmap};

/// Size of the stack handed to `clone(2)` for the child process. The child
/// never recurses deeply — this only needs to survive until the kernel has
/// copied the child's own page tables, which happens inside the `clone`
/// call itself.
const CHILD_STACK_SIZE: usize = 1024 * 1024;

/// Run the full launcher lifecycle for `req`. On success, the child has
/// been reaped; its own exit status is not propagated (an acknowledged
/// limitation — the launcher always signals success to its own caller once
/// the child has been waited for).
pub fn run(req: &Request) -> Result<(), LaunchError> {
    let (read_fd, write_fd): (OwnedFd, OwnedFd) = unistd::pipe().map_err(LaunchError::Pipe)?;

    fs_scaffold::stage_host_mounts(&req.new_root_path);
    fs_scaffold::create_host_devices(&req.new_root_path);

    let child_pid = spawn_child(req, &read_fd, &write_fd)?;

    if req.map_to_root {
        let uid = unistd::getuid();
        let gid = unistd::getgid();
        idmap::map_identity(child_pid, uid, gid).map_err(LaunchError::IdMap)?;
    } else {
        diag::note(req.verbose, "skipping uid/gid mapping (map_to_root disabled)");
    }

    fs_scaffold::unstage_host_mounts(&req.new_root_path);

    // Closing our write end releases the barrier: the child's blocking read
    // now returns EOF.
    drop(write_fd);
    drop(read_fd);

    reap(child_pid)
}

fn spawn_child(req: &Request, read_fd: &OwnedFd, write_fd: &OwnedFd) -> Result<Pid, LaunchError> {
    let child_req = req.clone();
    let read_raw = read_fd.as_raw_fd();
    let write_raw = write_fd.as_raw_fd();

    let mut stack = vec![0u8; CHILD_STACK_SIZE];
    let flags = req.namespace_flags.bits();

    // SAFETY: the closure only touches owned/copy data (the cloned request
    // and two raw fd numbers that remain valid descriptors in the child's
    // copy of the fd table), and it never returns — every path through
    // `child::child_main` ends in `execve` or process termination.
    let result = unsafe {
        clone(
            Box::new(move || child::child_main(&child_req, read_raw, write_raw)),
            &mut stack,
            flags,
            Some(libc::SIGCHLD),
        )
    };

    result.map_err(LaunchError::Spawn)
}

fn reap(child_pid: Pid) -> Result<(), LaunchError> {
    loop {
        match waitpid(child_pid, None) {
            Ok(WaitStatus::Exited(..)) | Ok(WaitStatus::Signaled(..)) => return Ok(()),
            Ok(_) => continue,
            Err(nix::errno::Errno::EINTR) => continue,
            Err(e) => return Err(LaunchError::Wait(e)),
        }
    }
}
