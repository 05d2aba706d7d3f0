//! kdbxsync - Upload a KeePass database to cloud storage
//!
//! Usage: `kdbxsync /absolute/path/to/passwords.kdbx`
//!
//! Meant to be run after every save of the database (for example from a
//! KeePass trigger). The first run asks which backends to use; later runs
//! upload without prompting unless a backend needs to be set up again.

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use kdbxsync_cloud::{CloudError, GoogleDriveProvider, YandexDiskProvider};
use kdbxsync_core::{
    config::{AppPaths, APP_NAME, DEFAULT_LOG_FILTER},
    ports::{Console, LogLevel},
    store::{PersistentStore, StoreHandle},
    usecases::{RunOutcome, Syncer},
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod console;

use console::TerminalConsole;

#[derive(Debug, Parser)]
#[command(name = "kdbxsync", version, about = "Upload a KeePass database to cloud storage")]
pub struct Cli {
    /// Absolute path of the .kdbx file to upload
    source: PathBuf,
}

/// Wires the store and every backend, in the order they run
fn build_syncer(
    source: PathBuf,
    paths: &AppPaths,
    console: Arc<dyn Console>,
) -> Result<Syncer, CloudError> {
    let store = StoreHandle::new(PersistentStore::new(&paths.state_file));
    let yandex = YandexDiskProvider::new(store.clone(), console.clone())?;
    let google = GoogleDriveProvider::new(store.clone(), console)?;

    Ok(Syncer::new(source, store)
        .with_provider(Box::new(yandex))
        .with_provider(Box::new(google)))
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let console: Arc<dyn Console> = Arc::new(TerminalConsole);
    console.welcome(APP_NAME, env!("CARGO_PKG_VERSION"));

    let paths = AppPaths::default();
    debug!(state = %paths.state_file.display(), "Resolved state file");

    let mut syncer = match build_syncer(cli.source, &paths, console.clone()) {
        Ok(syncer) => syncer,
        Err(e) => console.confirm_and_exit(&e.to_string()),
    };
    match syncer.start().await {
        Ok(RunOutcome::FirstRun) => console.log(
            LogLevel::Info,
            "Setup finished. The database will be uploaded on every run from now on.",
        ),
        Ok(RunOutcome::Synced) => console.log(LogLevel::Info, "All done."),
        Err(e) => console.confirm_and_exit(&e.to_string()),
    }
}
