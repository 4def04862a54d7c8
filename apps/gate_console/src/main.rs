use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use gate_core::{DashboardError, GateDashboard};
use lane_store::LaneStore;
use shared::domain::LaneId;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    sync::broadcast::{self, error::RecvError},
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod render;

use commands::{ConsoleCommand, HELP};
use config::load_settings;

#[derive(Parser, Debug)]
#[command(name = "gate_console", about = "Gate lane OCR/TOS reconciliation console")]
struct Args {
    /// TOML settings file (defaults to ./gate.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Lane to select on start-up.
    #[arg(long)]
    lane: Option<String>,
    /// Read commands from a file instead of stdin.
    #[arg(long)]
    script: Option<PathBuf>,
}

struct Console {
    dashboard: GateDashboard,
    store: LaneStore,
}

impl Console {
    async fn dispatch(&self, command: ConsoleCommand) -> Result<()> {
        debug!(?command, "dispatching console command");
        match command {
            ConsoleCommand::Lanes(filter) => {
                let lanes = self.dashboard.lanes(&filter).await?;
                print!("{}", render::lanes(&lanes));
            }
            ConsoleCommand::Select(lane_id) => {
                let view = self.dashboard.select_lane(&lane_id).await?;
                print!("{}", render::view(&view));
            }
            ConsoleCommand::Show => self.show().await,
            ConsoleCommand::Open => {
                self.dashboard.open_correction().await?;
                print!("{}", render::form(&self.dashboard.snapshot().await));
            }
            ConsoleCommand::Set { field, value } => {
                let changes = self.dashboard.edit(field, &value).await?;
                println!("changes: {changes}");
            }
            ConsoleCommand::Flag { flag, on } => {
                let changes = self.dashboard.set_flag(flag, on).await?;
                println!("changes: {changes}");
            }
            ConsoleCommand::Reset => {
                self.dashboard.reset_correction().await?;
                print!("{}", render::form(&self.dashboard.snapshot().await));
            }
            ConsoleCommand::Cancel => {
                self.dashboard.cancel_correction().await?;
                println!("correction discarded");
            }
            ConsoleCommand::Submit => {
                let outcome = self.dashboard.submit_correction().await?;
                println!("{} ('ok' to confirm)", outcome.confirmation_notice());
            }
            ConsoleCommand::Acknowledge => {
                let result = self.dashboard.acknowledge().await;
                report_sync(result)?;
            }
            ConsoleCommand::Retry => {
                let result = self.dashboard.retry_sync().await;
                report_sync(result)?;
            }
            ConsoleCommand::Dismiss => {
                self.dashboard.dismiss_sync_error().await?;
                println!("sync error dismissed; the local record keeps the correction");
            }
            ConsoleCommand::Search {
                truck_plate,
                container_no,
            } => {
                let view = self.dashboard.search(&truck_plate, &container_no).await?;
                print!("{}", render::view(&view));
            }
            ConsoleCommand::History(query) => {
                let entries = self.store.search_history(&query).await;
                print!("{}", render::history(&entries));
            }
            ConsoleCommand::Snapshot => {
                let snapshot = self.dashboard.snapshot().await;
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }
            ConsoleCommand::Help => println!("{HELP}"),
            ConsoleCommand::Quit => {}
        }
        Ok(())
    }

    async fn show(&self) {
        let snapshot = self.dashboard.snapshot().await;
        print!("{}", render::view(&snapshot.view));
        print!("{}", render::form(&snapshot));
        if let Some(overlay) = render::overlay(&snapshot.overlay) {
            println!("{overlay}");
        }
    }
}

fn report_sync<T>(result: Result<T, DashboardError>) -> Result<()> {
    match result {
        Ok(_) => {
            println!("TOS acknowledged the correction");
            Ok(())
        }
        Err(DashboardError::SyncFailed(notice)) => {
            println!("{} ('retry' or 'dismiss')", notice.message());
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn spawn_event_printer(mut events: broadcast::Receiver<gate_core::DashboardEvent>) {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => println!("[event] {}", render::event(&event)),
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "event printer lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = load_settings(args.config.as_deref())?;
    info!(
        sync_latency_ms = settings.sync_latency_ms,
        sync_timeout_ms = settings.sync_timeout_ms,
        sync_max_attempts = settings.sync_max_attempts,
        simulate_failures = settings.simulate_failures,
        "gate console starting"
    );

    let store = LaneStore::with_fixtures();
    let dashboard = GateDashboard::new(
        Arc::new(store.clone()),
        Arc::new(settings.simulated_sink()),
        settings.sync_policy(),
        settings.dashboard_options(),
    );
    spawn_event_printer(dashboard.subscribe_events());
    let console = Console { dashboard, store };

    if let Some(lane) = args.lane.or_else(|| settings.default_lane.clone()) {
        if let Err(err) = console.dispatch(ConsoleCommand::Select(LaneId::new(lane))).await {
            println!("error: {err:#}");
        }
    }

    let reader: Box<dyn AsyncRead + Unpin + Send> = match &args.script {
        Some(path) => Box::new(
            tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open script '{}'", path.display()))?,
        ),
        None => Box::new(tokio::io::stdin()),
    };

    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await? {
        match ConsoleCommand::parse(&line) {
            Ok(None) => continue,
            Ok(Some(ConsoleCommand::Quit)) => break,
            Ok(Some(command)) => {
                if let Err(err) = console.dispatch(command).await {
                    println!("error: {err:#}");
                }
            }
            Err(err) => println!("error: {err:#}"),
        }
    }

    info!("gate console stopped");
    Ok(())
}
