pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use clap::Parser;
use psplit_core::CancelFlag;
use psplit_core::error::Result;
use std::process::ExitCode;
use tracing::warn;

/// Exit status for a run stopped by Ctrl+C (128 + SIGINT).
pub const EXIT_CANCELLED: u8 = 130;

/// Raise the returned flag on Ctrl+C. The copy loops stay synchronous; the
/// signal is awaited on a helper thread with its own single-threaded runtime.
///
/// Once installed the default SIGINT action is gone for the whole process,
/// so only commands that poll the flag call this.
fn install_ctrl_c() -> CancelFlag {
    let cancel = CancelFlag::new();
    let flag = cancel.clone();
    let spawned = std::thread::Builder::new()
        .name("ctrl-c".into())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    warn!(error = %e, "Ctrl+C handling unavailable");
                    return;
                }
            };
            rt.block_on(async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Ctrl+C received - stopping after the current block...");
                    flag.cancel();
                }
            });
        });
    if let Err(e) = spawned {
        warn!(error = %e, "could not start Ctrl+C handler");
    }
    cancel
}

pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Split {
            source,
            output_dir,
            size,
            block_mib,
            block_size,
            naming,
            error_log,
            quiet,
        } => handlers::handle_split(
            source,
            output_dir,
            size,
            block_mib,
            block_size,
            naming,
            error_log,
            quiet,
            install_ctrl_c(),
        ),
        Commands::Status {
            output_dir,
            source,
            size,
            naming,
            json,
        } => handlers::handle_status(output_dir, source, size, naming, json),
        Commands::Join {
            output_dir,
            dest,
            naming,
        } => handlers::handle_join(output_dir, dest, naming, install_ctrl_c()),
    }
}
