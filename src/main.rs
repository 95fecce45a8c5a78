//! rpn - An interactive reverse-Polish calculator
//!
//! Usage:
//!   rpn               Start interactive REPL (or read lines from piped stdin)
//!
//! Environment:
//!   RPN_TRACE=1       Print each token and the stack after it
//!   RPN_BANNER=0      Hide the startup banner
//!   RPN_RC=path       Startup file (default ~/.rpnrc)
//!   RPN_LOG=filter    tracing filter (default warn)

mod config;
mod rcfile;
mod repl;
mod terminal;

use config::{Config, DEFAULT_LOG_FILTER};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("RPN_LOG")
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let config = Config::from_env();
    tracing::debug!(?config, "starting");

    match repl::run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("REPL error: {}", e);
            ExitCode::FAILURE
        }
    }
}
