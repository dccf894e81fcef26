//! CLI surface: turns argv into a `Request`. This is an external
//! collaborator to the core — only its output, the parsed `Request`, enters
//! the launch pipeline.

use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser};

use crate::core::model::{NamespaceFlags, Request, DEFAULT_HOSTNAME, DEFAULT_ROOTFS};

/// `daftbox [-h] [-v] [-r <rootdir>] <cmd> [<arg>...]`
#[derive(Parser, Debug)]
#[command(
    name = "daftbox",
    about = "Run a command inside an isolated Linux container",
    disable_help_flag = true
)]
struct Args {
    /// Print usage and exit.
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    /// Enable verbose diagnostics.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Path to the root filesystem tree.
    #[arg(short = 'r', long = "root", default_value = "rootfs")]
    root: PathBuf,

    /// The command (and its arguments) to run inside the container.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

/// Parse `argv` into a `Request`. Terminates the process directly (exit 1)
/// on `-h` or any usage error — there is no error value to hand back, since
/// a usage failure can only be resolved by the user re-running the command.
pub fn parse<I: IntoIterator<Item = String>>(argv: I) -> Request {
    let argv: Vec<String> = argv.into_iter().collect();

    let args = match Args::try_parse_from(&argv) {
        Ok(args) => args,
        Err(e) => usage_error(&e.to_string()),
    };

    if args.help {
        eprintln!("{}", Args::command().render_help());
        process::exit(1);
    }

    if args.command.is_empty() {
        usage_error("No command provided");
    }

    Request {
        command: args.command,
        new_root_path: args.root,
        hostname: DEFAULT_HOSTNAME.to_string(),
        verbose: args.verbose,
        map_to_root: true,
        namespace_flags: NamespaceFlags::default(),
    }
}

fn usage_error(detail: &str) -> ! {
    eprintln!("{}", detail.trim_end());
    eprintln!("see `-h` for usage");
    process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(s: &str) -> Vec<String> {
        std::iter::once("daftbox".to_string())
            .chain(s.split_whitespace().map(str::to_string))
            .collect()
    }

    #[test]
    fn parses_root_verbose_and_command() {
        let args = Args::try_parse_from(argv("-v -r ./rootfs /bin/true")).unwrap();
        assert!(args.verbose);
        assert_eq!(args.root, PathBuf::from("./rootfs"));
        assert_eq!(args.command, vec!["/bin/true".to_string()]);
    }

    #[test]
    fn defaults_root_to_rootfs() {
        let args = Args::try_parse_from(argv("/bin/true")).unwrap();
        assert_eq!(args.root, PathBuf::from(DEFAULT_ROOTFS));
        assert!(!args.verbose);
    }

    #[test]
    fn command_with_its_own_flags_is_preserved_verbatim() {
        let args = Args::try_parse_from(argv("/bin/sh -c hi")).unwrap();
        assert_eq!(
            args.command,
            vec!["/bin/sh".to_string(), "-c".to_string(), "hi".to_string()]
        );
    }

    #[test]
    fn unrecognized_option_is_rejected_by_clap() {
        assert!(Args::try_parse_from(argv("--bogus /bin/true")).is_err());
    }
}
