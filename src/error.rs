//! Structured error variants at the module boundaries of the core.
//!
//! These exist so tests and the supervisor can match on *which* step of the
//! bring-up protocol failed; `main` itself only ever sees the `anyhow`
//! wrapping applied at the call site, same as the teacher's `process.rs`.

use nix::errno::Errno;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PivotError {
    #[error("failed to make mount tree private: {0}")]
    MakePrivate(#[source] Errno),

    #[error("failed to bind-mount new root onto itself: {0}")]
    BindSelf(#[source] Errno),

    #[error("failed to open current working directory for rollback: {0}")]
    OpenCwd(#[source] Errno),

    #[error("failed to chdir into new root: {0}")]
    ChdirNewRoot(#[source] Errno),

    #[error("failed to create put-old directory: {0}")]
    CreatePutOld(#[source] std::io::Error),

    #[error("pivot_root syscall failed: {0}")]
    Syscall(#[source] Errno),

    #[error("failed to chdir to / after pivot_root: {0}")]
    ChdirRoot(#[source] Errno),
}

#[derive(Debug, Error)]
pub enum IdMapError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("short write to {path}: wrote {wrote} of {expected} bytes")]
    ShortWrite {
        path: String,
        wrote: usize,
        expected: usize,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: Errno,
    },
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to create synchronization pipe: {0}")]
    Pipe(#[source] Errno),

    #[error("failed to spawn child in new namespaces: {0}")]
    Spawn(#[source] Errno),

    #[error("identity mapping failed")]
    IdMap(#[source] IdMapError),

    #[error("failed to wait for child: {0}")]
    Wait(#[source] Errno),
}
