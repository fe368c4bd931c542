//! chainpin — watch a batcher inbox on L1 and pin the CIDs it posts.
//!
//! ```bash
//! chainpin --l1-rpc https://ethereum-rpc.publicnode.com \
//!          --ipfs-endpoint http://127.0.0.1:5001 \
//!          --last-block-path ./last-block
//! ```
//!
//! Every flag can also be set through the `CHAINPIN_*` variable shown in
//! `chainpin --help`.

use std::path::PathBuf;
use std::process;

use alloy_primitives::Address;
use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use chainpin_core::config::{DEFAULT_BATCHER, DEFAULT_INBOX, DEFAULT_START_BLOCK};
use chainpin_core::{CheckpointManager, Scanner, ScannerBuilder, ScannerConfig, SystemClock};
use chainpin_evm::{EvmBlockSource, HttpClientConfig, HttpRpcClient};
use chainpin_ipfs::KuboClient;
use chainpin_storage::FileCheckpointStore;

mod logging;

const DEFAULT_L1_RPC: &str = "https://ethereum-rpc.publicnode.com";
const DEFAULT_IPFS_ENDPOINT: &str = "http://127.0.0.1:5001";

#[derive(Parser, Debug)]
#[command(
    name = "chainpin",
    about = "Pin the IPFS content referenced by batcher inbox transactions",
    version
)]
struct Cli {
    /// L1 JSON-RPC endpoint
    #[arg(long, env = "CHAINPIN_L1_RPC", default_value = DEFAULT_L1_RPC)]
    l1_rpc: String,

    /// IPFS Kubo RPC endpoint
    #[arg(long, env = "CHAINPIN_IPFS_ENDPOINT", default_value = DEFAULT_IPFS_ENDPOINT)]
    ipfs_endpoint: String,

    /// Address that signs batch transactions
    #[arg(long, env = "CHAINPIN_BATCHER_ADDRESS", default_value_t = DEFAULT_BATCHER)]
    batcher_address: Address,

    /// Inbox address batch transactions are sent to
    #[arg(long, env = "CHAINPIN_BATCHER_INBOX", default_value_t = DEFAULT_INBOX)]
    batcher_inbox: Address,

    /// First block to scan when no checkpoint file exists
    #[arg(long, env = "CHAINPIN_START_BLOCK", default_value_t = DEFAULT_START_BLOCK)]
    start_block: u64,

    /// File holding the block to resume from
    #[arg(long, env = "CHAINPIN_LAST_BLOCK_PATH", default_value = "./last-block")]
    last_block_path: PathBuf,

    /// Enable debug logging
    #[arg(long, env = "CHAINPIN_DEBUG")]
    debug: bool,

    /// Also save the checkpoint every N blocks, not only after pins
    #[arg(long, env = "CHAINPIN_CHECKPOINT_INTERVAL")]
    checkpoint_interval: Option<u64>,

    /// Stop after this block (inclusive) instead of following the chain
    #[arg(long, env = "CHAINPIN_TO_BLOCK")]
    to_block: Option<u64>,

    /// Emit JSON logs
    #[arg(long, env = "CHAINPIN_LOG_JSON")]
    log_json: bool,
}

impl Cli {
    fn scanner_config(&self) -> Result<ScannerConfig> {
        let mut builder = ScannerBuilder::new()
            .batcher(self.batcher_address)
            .inbox(self.batcher_inbox)
            .start_block(self.start_block);
        if let Some(n) = self.checkpoint_interval {
            builder = builder.checkpoint_interval(n);
        }
        if let Some(to) = self.to_block {
            builder = builder.to_block(to);
        }
        let config = builder.build_config();
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.debug, cli.log_json);

    if let Err(e) = run(cli).await {
        tracing::error!(error = %format!("{e:#}"), "chainpin stopped");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.scanner_config()?;

    let rpc = HttpRpcClient::new(
        cli.l1_rpc.as_str(),
        HttpClientConfig {
            request_timeout: config.fetch_timeout(),
        },
    )
    .context("Invalid L1 RPC endpoint")?;
    let source = EvmBlockSource::new(rpc);
    let chain_id = source
        .chain_id()
        .await
        .with_context(|| format!("Unable to connect to L1 RPC {}", cli.l1_rpc))?;
    tracing::info!(url = %cli.l1_rpc, chain_id, "Connected to L1");

    let ipfs = KuboClient::new(&cli.ipfs_endpoint).context("Invalid IPFS endpoint")?;
    let version = ipfs
        .version()
        .await
        .with_context(|| format!("Unable to connect to IPFS endpoint {}", cli.ipfs_endpoint))?;
    tracing::info!(url = %cli.ipfs_endpoint, version = %version.version, "Connected to IPFS");

    let store = FileCheckpointStore::new(&cli.last_block_path);
    let checkpoint = CheckpointManager::new(Box::new(store), config.checkpoint_interval);

    let cancel = CancellationToken::new();
    spawn_shutdown_listener(cancel.clone());

    let mut scanner = Scanner::new(config, source, ipfs, checkpoint, SystemClock, cancel);
    match scanner.run().await {
        Ok(()) => Ok(()),
        Err(e) if e.is_cancelled() => {
            tracing::info!(stats = ?scanner.stats(), "Shut down");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn spawn_shutdown_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, stopping after the current step");
        cancel.cancel();
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Unable to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
