use std::path::PathBuf;

use nix::sched::CloneFlags;

/// Default value of `-r`: the root filesystem tree, relative to the
/// launcher's own working directory.
pub const DEFAULT_ROOTFS: &str = "rootfs";

/// Default value of the UTS-namespace hostname.
pub const DEFAULT_HOSTNAME: &str = "daft-container";

/// The namespace set this crate is allowed to request: user, UTS, PID,
/// mount, and network. All five are on by default (the canonical behavior
/// for `CLONE_NEWNET` — an empty network namespace, always created); there
/// is currently no flag to narrow this set, since nothing in scope needs
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceFlags(CloneFlags);

impl NamespaceFlags {
    pub const ALL: NamespaceFlags = NamespaceFlags(CloneFlags::from_bits_truncate(
        CloneFlags::CLONE_NEWUSER.bits()
            | CloneFlags::CLONE_NEWUTS.bits()
            | CloneFlags::CLONE_NEWPID.bits()
            | CloneFlags::CLONE_NEWNS.bits()
            | CloneFlags::CLONE_NEWNET.bits(),
    ));

    pub fn bits(self) -> CloneFlags {
        self.0
    }

    pub fn contains_user(self) -> bool {
        self.0.contains(CloneFlags::CLONE_NEWUSER)
    }
}

impl Default for NamespaceFlags {
    fn default() -> Self {
        Self::ALL
    }
}

/// The immutable request produced by the CLI layer and threaded through the
/// entire core. Nothing below this point reads argv or env directly except
/// `diag::die`'s `EF_DUMPCORE` check.
#[derive(Debug, Clone)]
pub struct Request {
    /// Executable plus arguments to run inside the container. Never empty.
    pub command: Vec<String>,
    /// Path to a populated root filesystem tree.
    pub new_root_path: PathBuf,
    /// Hostname to set inside the UTS namespace.
    pub hostname: String,
    /// Enables verbose narration on stdout.
    pub verbose: bool,
    /// If true, uid 0 inside the container maps to the caller's uid outside.
    pub map_to_root: bool,
    /// Namespace set to request at spawn time.
    pub namespace_flags: NamespaceFlags,
}

impl Request {
    /// Scratch directory name used by the pivot (`<new_root>/.old_root`).
    pub const PUT_ROOT_NAME: &'static str = ".old_root";
}
