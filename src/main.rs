mod cli;
mod core;
mod diag;
mod error;
mod platform;
mod util;

use std::process;

fn main() {
    let req = cli::parse(std::env::args());

    #[cfg(not(target_os = "linux"))]
    {
        let _ = req;
        diag::die(None, "daftbox only runs on Linux");
    }

    #[cfg(target_os = "linux")]
    {
        if let Err(e) = platform::linux::launch::run(&req) {
            let err = anyhow::Error::new(e).context("failed to run container");
            diag::die(None, &format!("{err:#}"));
        }
    }

    process::exit(0);
}
