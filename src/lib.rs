//! Library crate for the `groupdisk` storage-audit tool.
//!
//! `main.rs` is a thin shim over [`run`]; everything else lives here so the
//! pieces are independently testable.

pub mod aggregator;
pub mod cancellation;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod dedupe;
pub mod error;
pub mod error_sink;
pub mod exclude;
pub mod ignore_poison;
pub mod output;
pub mod owner_names;
pub mod pool;
pub mod result_tree;
pub mod worker;

use std::sync::Arc;

use clap::Parser;

use cli::Cli;
use config::RunConfig;
use error::AppError;

/// Parse arguments, initialize logging, run the coordinator, and render output
/// to stdout. Returns the process exit code.
pub fn run() -> i32 {
    init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;
            // `--help`/`--version` aren't failures; let clap print its banner and
            // exit 0 the way it always does. Every other parse error (missing the
            // required root, a malformed `-m`/`-t` value, an unrecognized flag) is
            // an ordinary input error and must map to exit code 1, not clap's
            // default exit code 2.
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
                _ => {
                    eprintln!("{e}");
                    return AppError::Input(e.to_string()).exit_code();
                }
            }
        }
    };

    let config = match cli.into_run_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return e.exit_code();
        }
    };

    match run_with_config(config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    }
}

fn run_with_config(config: RunConfig) -> Result<i32, AppError> {
    let owner_mode = config.owner_mode;
    let resolve_names = config.resolve_names;
    let human_readable = config.human_readable;
    let format = config.output_format;

    let outcome = coordinator::run(Arc::new(config))?;
    let exit_status = outcome.exit_status;

    let rendered = output::render(&outcome, format, owner_mode, resolve_names, human_readable);
    print!("{rendered}");

    Ok(exit_status as i32)
}

fn init_logging() {
    // RUST_LOG governs diagnostic verbosity; independent of the user-facing `-v`
    // stdout trace, which print!s directly rather than going through `log`.
    let _ = env_logger::try_init();
}
