use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gate_core::{reconcile, ReconciliationOptions};
use lane_store::LaneStore;
use shared::domain::{LaneFilter, LaneId};

#[derive(Parser, Debug)]
#[command(name = "gate_tools", about = "Inspect the gate lane fixtures as JSON")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lane board, optionally filtered by direction or lane id.
    Lanes {
        #[arg(long, default_value = "all")]
        filter: String,
    },
    /// Active transaction record of a lane.
    Transaction { lane: String },
    /// OCR versus TOS comparison of a lane's active transaction.
    Reconcile {
        lane: String,
        #[arg(long)]
        seal: bool,
    },
    /// Correction history, newest first.
    History {
        #[arg(long, default_value = "")]
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let store = LaneStore::with_fixtures();

    let json = match cli.command {
        Command::Lanes { filter } => {
            let lanes = store.list_lanes(&LaneFilter::parse(&filter)).await;
            serde_json::to_string_pretty(&lanes)?
        }
        Command::Transaction { lane } => {
            let lane_id = LaneId::new(lane);
            let record = store
                .transaction(&lane_id)
                .await
                .with_context(|| format!("lane {lane_id} has no active transaction"))?;
            serde_json::to_string_pretty(&record)?
        }
        Command::Reconcile { lane, seal } => {
            let lane_id = LaneId::new(lane);
            let record = store.transaction(&lane_id).await;
            let view = reconcile(
                Some(&lane_id),
                record.as_ref(),
                ReconciliationOptions { include_seal: seal },
            );
            serde_json::to_string_pretty(&view)?
        }
        Command::History { query } => {
            let entries = store.search_history(&query).await;
            serde_json::to_string_pretty(&entries)?
        }
    };

    println!("{json}");
    Ok(())
}
