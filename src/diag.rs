//! The launcher's diagnostic sink: two severities, one line format each.
//!
//! Mirrors the `errMsg`/`errExit` pair of the original C implementation this
//! crate's behavior is specified against: every syscall failure gets exactly
//! one line on stderr, shaped either `ERROR [<ERRNO> <text>] <message>` or,
//! when no errno applies, `ERROR: <message>`.

use std::io::Write;
use std::process;

use nix::errno::Errno;

/// Log a non-fatal diagnostic. Execution continues after this returns.
pub fn warn(err: Option<Errno>, message: &str) {
    emit(err, message);
}

/// Log a diagnostic and terminate the process.
///
/// If `EF_DUMPCORE` is set to a non-empty value, terminates via `abort()`
/// (producing a core dump where the system allows it) instead of a clean
/// exit. Otherwise flushes stdout/stderr and exits with status 1.
pub fn die(err: Option<Errno>, message: &str) -> ! {
    emit(err, message);
    terminate()
}

/// Write a verbose narration line to stdout. No-op unless `enabled`.
pub fn note(enabled: bool, message: &str) {
    if enabled {
        println!("{message}");
    }
}

fn emit(err: Option<Errno>, message: &str) {
    let _ = std::io::stdout().flush();
    let line = match err {
        Some(errno) => format!("ERROR [{errno:?} {}] {message}", errno_text(errno)),
        None => format!("ERROR: {message}"),
    };
    let mut stderr = std::io::stderr();
    let _ = writeln!(stderr, "{line}");
    let _ = stderr.flush();
}

fn errno_text(errno: Errno) -> String {
    // `Errno`'s `Debug` renders the symbolic name (e.g. "ENOENT"); `desc()`
    // is the human-readable strerror(3) text.
    errno.desc().to_string()
}

fn terminate() -> ! {
    match std::env::var_os("EF_DUMPCORE") {
        Some(v) if !v.is_empty() => {
            // SAFETY: abort() never returns and performs no further Rust-side
            // state access.
            unsafe { libc::abort() }
        }
        _ => process::exit(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errno_text_matches_strerror() {
        assert_eq!(errno_text(Errno::ENOENT), "No such file or directory");
    }
}
