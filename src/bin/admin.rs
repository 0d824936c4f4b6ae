//! `swap-admin`: the operator CLI over the store (spec.md §6's admin
//! surface) — `maintain`, `reverify`, `reswap`, `manual-pass`,
//! `manual-fail`, mirroring `original_source/cmd/swapadmin`'s subcommand
//! layout.

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;
use swap_bridge::admin::{self, MaintainTarget};
use swap_bridge::config::BridgeConfig;
use swap_bridge::model::SwapKey;
use swap_bridge::error::BridgeError;
use swap_bridge::logging;
use swap_bridge::store::{SledStore, SwapStore};

#[derive(Parser)]
#[command(author, version, about = "Operator CLI for the swap bridge store")]
struct Cli {
    /// Path to the sled store the daemon is running against.
    #[arg(long, default_value_t = default_store_path())]
    store_path: String,

    #[command(subcommand)]
    command: Command,
}

fn default_store_path() -> String {
    BridgeConfig::default().store_path
}

#[derive(Subcommand)]
enum Command {
    /// Open or close a swap direction.
    Maintain {
        #[arg(value_enum)]
        action: MaintainAction,
        direction: String,
    },
    /// Send a row back through Verify.
    Reverify { tx_id: String, bind_addr: String },
    /// Send a row back through Do-swap.
    Reswap { tx_id: String, bind_addr: String },
    /// Force a big-value hold back into the pipeline.
    ManualPass { tx_id: String, bind_addr: String },
    /// Force a row into the terminal manual-failed bucket.
    ManualFail { tx_id: String, bind_addr: String },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum MaintainAction {
    Open,
    Close,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init("swap-admin");

    let store: Arc<dyn SwapStore> = match SledStore::open(&cli.store_path) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            eprintln!("opening store at {}: {e}", cli.store_path);
            return ExitCode::FAILURE;
        }
    };

    let result = run(&store, cli.command).await;
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(store: &Arc<dyn SwapStore>, command: Command) -> Result<(), BridgeError> {
    match command {
        Command::Maintain { action, direction } => {
            let target: MaintainTarget = direction.parse()?;
            admin::maintain(store, matches!(action, MaintainAction::Open), target).await
        }
        Command::Reverify { tx_id, bind_addr } => {
            admin::reverify(store, &SwapKey { tx_id, bind_addr }).await
        }
        Command::Reswap { tx_id, bind_addr } => {
            admin::reswap(store, &SwapKey { tx_id, bind_addr }).await
        }
        Command::ManualPass { tx_id, bind_addr } => {
            admin::manual_pass(store, &SwapKey { tx_id, bind_addr }).await
        }
        Command::ManualFail { tx_id, bind_addr } => {
            admin::manual_fail(store, &SwapKey { tx_id, bind_addr }).await
        }
    }
}
