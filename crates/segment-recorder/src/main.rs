//! Segment Recorder: camera-to-file recording with pause and resume,
//! driven by line commands on stdin.
//!
//! Usage: `segment-recorder [CONFIG_PATH]`

mod app;
mod app_command;
mod config;
mod error;
mod logging;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    error::{AppError, Result as AppResult},
};

use crate::config::Config;

use std::{path::PathBuf, time::Duration};

use tokio::sync::mpsc;
use tracing::{error, info};

/// Application entry point.
fn main() {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);

    let config = match Config::load(config_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            tracing_subscriber::fmt().init();
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    // Dropping the guard flushes the log file, so it lives until exit.
    let _log_guard = match logging::init(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    let result = rt.block_on(async {
        let app = App::new(&config)?;
        let (command_tx, command_rx) = mpsc::channel(32);
        let _reader = app::spawn_stdin_reader(command_tx);

        println!(
            "recording to {} (commands: start, pause, stop, swap, status, quit)",
            config.recording.destination.display()
        );

        app.run(command_rx).await
    });

    // The stdin reader may still be blocked on a read.
    rt.shutdown_timeout(Duration::from_secs(1));

    match result {
        Ok(()) => info!("Exited cleanly"),
        Err(e) => {
            error!(error = ?e, "App error");
            std::process::exit(1);
        }
    }
}
