//! Child Initializer: runs inside the freshly cloned process, blocks on the
//! barrier, then brings up the container and execs the target command.
//!
//! Every exit path here is either a successful `execve` (which replaces the
//! process image and never returns) or a `diag::die` call. There is no
//! "return to the supervisor" path once this function is entered.

use std::ffi::CString;
use std::os::fd::RawFd;

use nix::errno::Errno;
use nix::unistd::{self, sethostname};

use crate::core::model::Request;
use crate::diag;
use crate::platform::linux::{fs_scaffold, pivot};

/// Entry point passed to `clone(2)`. `read_fd`/`write_fd` are the two ends
/// of the synchronization pipe, inherited from the parent's fd table.
pub fn child_main(req: &Request, read_fd: RawFd, write_fd: RawFd) -> ! {
    // 1. Close our copy of the parent's write end. Until this happens, the
    //    parent closing its own write end will not produce EOF on `read_fd`,
    //    since our copy keeps the pipe's write side alive.
    if let Err(errno) = unistd::close(write_fd) {
        diag::die(Some(errno), "failed to close inherited pipe write end");
    }

    // 2. Block on the barrier: the only valid outcome is EOF (0 bytes). Any
    //    other result means the parent died or misbehaved before releasing
    //    us, which is fatal — we must not touch anything that depends on a
    //    uid/gid mapping that may not have been written yet.
    wait_for_barrier(read_fd);
    let _ = unistd::close(read_fd);

    // 3. Set the UTS hostname.
    if let Err(errno) = sethostname(&req.hostname) {
        diag::die(Some(errno), "sethostname failed");
    }
    diag::note(req.verbose, &format!("set hostname: {}", req.hostname));

    // 4. Pivot into the new root.
    if let Err(e) = pivot::pivot_root(&req.new_root_path, Request::PUT_ROOT_NAME) {
        diag::die(None, &format!("container_pivot_root failed: {e}"));
    }

    // 5. Container-side scaffolding.
    fs_scaffold::create_container_mounts();
    fs_scaffold::create_container_symlinks();

    // 6. Exec the target command, resolved via PATH.
    diag::note(req.verbose, &format!("executing command: {}", req.command.join(" ")));
    exec_command(&req.command);
}

fn wait_for_barrier(read_fd: RawFd) {
    let mut buf = [0u8; 1];
    loop {
        match unistd::read(read_fd, &mut buf) {
            Ok(0) => return,
            Ok(_) => {
                diag::die(None, "barrier read returned data instead of EOF — parent did not release cleanly");
            }
            Err(Errno::EINTR) => continue,
            Err(errno) => diag::die(Some(errno), "barrier read failed"),
        }
    }
}

fn exec_command(command: &[String]) -> ! {
    let program = match CString::new(command[0].as_str()) {
        Ok(c) => c,
        Err(_) => diag::die(None, &format!("invalid command: {}", command[0])),
    };
    let args: Vec<CString> = match command
        .iter()
        .map(|a| CString::new(a.as_str()))
        .collect::<Result<_, _>>()
    {
        Ok(v) => v,
        Err(_) => diag::die(None, "invalid argument: contains a NUL byte"),
    };

    match unistd::execvp(&program, &args) {
        Ok(never) => match never {},
        Err(errno) => diag::die(Some(errno), &format!("execvp '{}' failed", command[0])),
    }
}
