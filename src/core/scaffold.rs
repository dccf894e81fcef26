//! Declarative scaffold tables.
//!
//! Kept as plain data — sequences of records — rather than an imperative
//! list of calls, so the idempotence and reverse-order invariants the
//! Filesystem Scaffolder relies on are trivially enforceable and testable:
//! nothing here decides *whether* to mount something, only *what* the full
//! ordered set looks like.

use nix::mount::MsFlags;

/// One entry of an ordered mount table. `target` is always relative; the
/// caller resolves it against whichever root is in scope (the staging root
/// for host-stage mounts, `/` for in-container mounts).
#[derive(Debug, Clone, Copy)]
pub struct MountEntry {
    pub dir_mode: u32,
    pub source: &'static str,
    pub target: &'static str,
    pub fstype: Option<&'static str>,
    pub flags: MsFlags,
    pub data: Option<&'static str>,
}

/// One device node to create with `mknod(2)`.
#[derive(Debug, Clone, Copy)]
pub struct DeviceNode {
    pub path: &'static str,
    pub mode: u32,
    pub major: u64,
    pub minor: u64,
}

/// One symlink to create, pointing into `/proc/self/fd/*`.
#[derive(Debug, Clone, Copy)]
pub struct DeviceSymlink {
    pub target: &'static str,
    pub link: &'static str,
}

/// Mounts staged under `new_root_path` on the host side, before the child is
/// spawned. The child's mount namespace, cloned at spawn time, inherits
/// these; the host then unmounts its own view of them (`unstage_host_mounts`)
/// since it no longer needs them once the clone has happened.
pub static HOST_STAGE_MOUNTS: &[MountEntry] = &[
    MountEntry {
        dir_mode: 0o755,
        source: "tmpfs",
        target: "dev",
        fstype: Some("tmpfs"),
        flags: MsFlags::MS_NOSUID,
        data: Some("mode=755,size=65536k"),
    },
    MountEntry {
        dir_mode: 0o755,
        source: "devpts",
        target: "dev/pts",
        fstype: Some("devpts"),
        flags: MsFlags::from_bits_truncate(MsFlags::MS_NOSUID.bits() | MsFlags::MS_NOEXEC.bits()),
        data: Some("newinstance,ptmxmode=0666,mode=0620"),
    },
    MountEntry {
        dir_mode: 0o1777,
        source: "shm",
        target: "dev/shm",
        fstype: Some("tmpfs"),
        flags: MsFlags::from_bits_truncate(MsFlags::MS_NOSUID.bits() | MsFlags::MS_NODEV.bits()),
        data: Some("mode=1777,size=65536k"),
    },
    MountEntry {
        dir_mode: 0o555,
        source: "sysfs",
        target: "sys",
        fstype: Some("sysfs"),
        flags: MsFlags::from_bits_truncate(
            MsFlags::MS_NOSUID.bits()
                | MsFlags::MS_NOEXEC.bits()
                | MsFlags::MS_NODEV.bits()
                | MsFlags::MS_RDONLY.bits(),
        ),
        data: None,
    },
];

/// Mounts created inside the container after `pivot_root`, i.e. relative to
/// the new `/`. `/proc` must be mounted here rather than staged on the host
/// side: it needs to reflect the container's own PID namespace, which only
/// exists once the child process itself is running inside it.
pub static CONTAINER_MOUNTS: &[MountEntry] = &[MountEntry {
    dir_mode: 0o555,
    source: "proc",
    target: "proc",
    fstype: Some("proc"),
    flags: MsFlags::from_bits_truncate(
        MsFlags::MS_NOSUID.bits() | MsFlags::MS_NOEXEC.bits() | MsFlags::MS_NODEV.bits(),
    ),
    data: None,
}];

/// Character device nodes created under `new_root_path/dev` on the host
/// side, before the child is spawned.
pub static DEVICE_NODES: &[DeviceNode] = &[
    DeviceNode { path: "dev/null", mode: 0o666, major: 1, minor: 3 },
    DeviceNode { path: "dev/zero", mode: 0o666, major: 1, minor: 5 },
    DeviceNode { path: "dev/full", mode: 0o666, major: 1, minor: 7 },
    DeviceNode { path: "dev/tty", mode: 0o666, major: 5, minor: 0 },
    DeviceNode { path: "dev/random", mode: 0o666, major: 1, minor: 8 },
    DeviceNode { path: "dev/urandom", mode: 0o666, major: 1, minor: 9 },
];

/// Symlinks created inside the container after `pivot_root`.
pub static DEVICE_SYMLINKS: &[DeviceSymlink] = &[
    DeviceSymlink { target: "/proc/self/fd", link: "dev/fd" },
    DeviceSymlink { target: "/proc/self/fd/0", link: "dev/stdin" },
    DeviceSymlink { target: "/proc/self/fd/1", link: "dev/stdout" },
    DeviceSymlink { target: "/proc/self/fd/2", link: "dev/stderr" },
];
