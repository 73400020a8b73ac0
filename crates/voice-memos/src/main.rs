//! Voice Memos: record, list and play back microphone memos from the terminal.

mod alert;
mod app;
mod app_command;
mod auth_session;
mod config;
mod error;
mod input;
mod prompt_permission;
mod router;

pub(crate) use {
    alert::Alert,
    app::App,
    app_command::AppCommand,
    auth_session::AuthSession,
    error::{AppError, Result as AppResult},
    router::Router,
};

use crate::{config::Config, input::spawn_stdin_reader};

use tracing::error;
use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "voice_memos=debug,voice_memos_core=debug";

/// Application entry point.
fn main() {
    // Logs go to stderr so they never interleave with prompts on stdout.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    // cpal streams are not Send on every backend, so the whole app runs
    // on one thread.
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    let result = runtime.block_on(async {
        let input = spawn_stdin_reader()?;
        App::new(&config, input).run().await
    });

    if let Err(e) = result {
        error!(error = ?e, "App error");
        std::process::exit(1);
    }
}
