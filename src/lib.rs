pub mod capture;
pub mod commands;
pub mod db;
pub mod error;
pub mod events;
pub mod normalize;
pub mod payload;
pub mod protocol;
pub mod replay;
pub mod service;
pub mod settings;

#[cfg(test)]
mod test_support;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use log::{error, info, warn};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    sync::broadcast::error::RecvError,
};

use commands::Dispatcher;
use db::Database;
use events::EventBus;
use replay::LogTransport;
use service::IrService;
use settings::SettingsStore;

pub use error::{Error, Result};

/// Directory holding `settings.json` and the code database.
pub const DATA_DIR_ENV: &str = "IRBEAM_DATA_DIR";

pub fn run() -> anyhow::Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("irbeam starting up...");

    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    runtime.block_on(serve())
}

async fn serve() -> anyhow::Result<()> {
    let data_dir = match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir().context("Failed to resolve working directory")?,
    };
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    let settings_store = SettingsStore::open(&data_dir)?;
    let settings = settings_store.settings();
    let database = Database::new(settings_store.database_path(&data_dir))?;
    info!("Using code store at {}", database.path().display());

    let bus = EventBus::new();
    let notifications = tokio::spawn(log_notifications(bus.clone()));

    let service = IrService::new(
        database,
        Arc::new(bus.clone()),
        Arc::new(LogTransport),
        &settings,
    );
    let mut listener = service.listen(&bus, &settings.signal_event_type);
    let dispatcher = Dispatcher::new(service, bus, settings.signal_event_type.clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.next_line().await.context("Failed to read command")? {
        if line.trim().is_empty() {
            continue;
        }
        let response = dispatcher.handle_line(&line).await;
        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        stdout.write_all(&encoded).await?;
        stdout.flush().await?;
    }

    info!("Input closed, shutting down");
    listener.stop().await;
    drop(dispatcher);
    if let Err(err) = notifications.await {
        warn!("Notification logger failed to join: {err}");
    }
    Ok(())
}

async fn log_notifications(bus: EventBus) {
    let mut notifications = bus.subscribe_notifications();
    drop(bus);
    loop {
        match notifications.recv().await {
            Ok(notification) => match serde_json::to_string(&notification) {
                Ok(json) => info!("Notification {json}"),
                Err(err) => error!("Failed to encode {}: {err}", notification.event_type()),
            },
            Err(RecvError::Lagged(skipped)) => {
                warn!("Notification logger lagged, {skipped} notifications skipped");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
