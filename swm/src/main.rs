#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::module_name_repetitions)]
// X11 uses inconsistent integer types fairly interchangeably
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

use std::process::ExitCode;

use swm_core::config::{VERSION, WINDOW_MANAGER_NAME};
use tracing_subscriber::EnvFilter;

mod error;
mod manager;
mod wm;
mod x11;

const LOG_ENV: &str = "SWM_LOG";

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    match (args.next(), args.next()) {
        (None, _) => {}
        (Some(arg), None) if arg == "-v" => {
            println!("{WINDOW_MANAGER_NAME}-{VERSION}");
            return ExitCode::SUCCESS;
        }
        _ => {
            eprintln!("usage: {WINDOW_MANAGER_NAME} [-v]");
            return ExitCode::FAILURE;
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    match wm::run_wm() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Fatal error: {e}");
            ExitCode::FAILURE
        }
    }
}
