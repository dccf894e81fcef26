//! End-to-end smoke tests for the `daftbox` binary.
//!
//! These exercise the real `clone(2)`/`pivot_root(2)`/`execve(2)` path, so
//! they require:
//! 1. Running on Linux.
//! 2. Enough privilege to create user/mount/pid/uts/net namespaces (either
//!    running as root, or on a kernel with unprivileged user namespaces
//!    enabled).
//! 3. A populated root filesystem tree at `tests/rootfs/` (or the path set
//!    in `DAFTBOX_TEST_ROOTFS`), with at least `/bin/true`, `/bin/sh`, and
//!    `/bin/hostname`.
//!
//! Tests are skipped (not failed) when prerequisites are missing.

use std::path::Path;
use std::process::Command;

fn rootfs_path() -> String {
    std::env::var("DAFTBOX_TEST_ROOTFS").unwrap_or_else(|_| "tests/rootfs".to_string())
}

fn can_run() -> bool {
    if cfg!(not(target_os = "linux")) {
        eprintln!("SKIP: not on Linux");
        return false;
    }

    let rfs = rootfs_path();
    if !Path::new(&rfs).join("bin").exists() {
        eprintln!("SKIP: rootfs not found at {rfs}/bin");
        return false;
    }

    #[cfg(target_os = "linux")]
    {
        if !can_create_user_namespace() {
            eprintln!("SKIP: cannot create a user namespace in this environment");
            return false;
        }
    }

    true
}

#[cfg(target_os = "linux")]
fn can_create_user_namespace() -> bool {
    use nix::sched::{unshare, CloneFlags};
    use nix::unistd::{fork, ForkResult};

    // Probe in a throwaway child so a successful unshare doesn't affect this
    // test process's own namespaces.
    match unsafe { fork() } {
        Ok(ForkResult::Child) => {
            let ok = unshare(CloneFlags::CLONE_NEWUSER).is_ok();
            std::process::exit(if ok { 0 } else { 1 });
        }
        Ok(ForkResult::Parent { child }) => nix::sys::wait::waitpid(child, None)
            .map(|status| matches!(status, nix::sys::wait::WaitStatus::Exited(_, 0)))
            .unwrap_or(false),
        Err(_) => false,
    }
}

fn daftbox() -> Command {
    Command::new(env!("CARGO_BIN_EXE_daftbox"))
}

#[test]
fn runs_true_successfully() {
    if !can_run() {
        return;
    }

    let rootfs = rootfs_path();
    let output = daftbox()
        .args(["-r", &rootfs, "/bin/true"])
        .output()
        .expect("failed to run daftbox");

    assert!(
        output.status.success(),
        "daftbox /bin/true should succeed, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn verbose_narrates_hostname_and_exec() {
    if !can_run() {
        return;
    }

    let rootfs = rootfs_path();
    let output = daftbox()
        .args(["-v", "-r", &rootfs, "/bin/true"])
        .output()
        .expect("failed to run daftbox");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("set hostname: daft-container"),
        "expected hostname narration, got: {stdout}"
    );
    assert!(
        stdout.contains("executing command: /bin/true"),
        "expected exec narration, got: {stdout}"
    );
}

#[test]
fn missing_exec_target_reports_execvp_failure() {
    if !can_run() {
        return;
    }

    let rootfs = rootfs_path();
    let output = daftbox()
        .args(["-r", &rootfs, "/no/such/binary"])
        .output()
        .expect("failed to run daftbox");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("execvp") && stderr.contains("/no/such/binary"),
        "expected execvp failure diagnostic, got: {stderr}"
    );
}

#[test]
fn missing_rootfs_reports_pivot_failure() {
    if !can_run() {
        return;
    }

    let output = daftbox()
        .args(["-r", "tests/no-such-rootfs", "/bin/true"])
        .output()
        .expect("failed to run daftbox");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("container_pivot_root failed"),
        "expected a pivot failure diagnostic, got: {stderr}"
    );
}

#[test]
fn usage_error_on_missing_command_exits_one() {
    if cfg!(not(target_os = "linux")) {
        return;
    }

    let output = daftbox().output().expect("failed to run daftbox");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No command provided"), "got: {stderr}");
}

#[test]
fn help_flag_exits_one_and_writes_to_stderr() {
    if cfg!(not(target_os = "linux")) {
        return;
    }

    let output = daftbox().arg("-h").output().expect("failed to run daftbox");
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(!output.stderr.is_empty());
}
