use std::{path::PathBuf, process::ExitCode, time::Duration};

use alloy::{
    network::Ethereum,
    primitives::{Address, BlockNumber},
    transports::http::reqwest::Url,
};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vault_scanner::{
    DEFAULT_FAN_OUT, DEFAULT_FROM_BLOCK, DEFAULT_MAX_BLOCK_RANGE, DEFAULT_OUTPUT_PATH, HeadPolicy,
    VAULT_REGISTRY_ADDRESS, VaultScannerBuilder,
    provider::{ChainProvider, ChainProviderBuilder},
};

/// Scans the vault registry's status updates and writes the whitelisted vaults to a JSON file.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// JSON-RPC endpoint (http or ws) of the chain to scan.
    #[clap(long, env = "RPC_URL")]
    rpc_url: Url,

    /// Contract emitting `VaultWhitelistedStatusUpdated`.
    #[clap(long, env = "VAULT_REGISTRY", default_value_t = VAULT_REGISTRY_ADDRESS)]
    registry: Address,

    /// First block to scan.
    #[clap(long, env = "FROM_BLOCK", default_value_t = DEFAULT_FROM_BLOCK)]
    from_block: BlockNumber,

    /// Blocks covered by a single eth_getLogs query.
    #[clap(long, env = "MAX_BLOCK_RANGE", default_value_t = DEFAULT_MAX_BLOCK_RANGE)]
    max_block_range: u64,

    /// Concurrent eth_getLogs queries per batch.
    #[clap(long, env = "FAN_OUT", default_value_t = DEFAULT_FAN_OUT)]
    fan_out: usize,

    /// Re-read the chain head after every batch instead of once at start.
    #[clap(long)]
    refresh_head: bool,

    /// Per-call RPC timeout in seconds.
    #[clap(long, env = "CALL_TIMEOUT_SECS")]
    call_timeout_secs: Option<u64>,

    /// Deadline for the whole scan in seconds.
    #[clap(long, env = "SCAN_DEADLINE_SECS")]
    deadline_secs: Option<u64>,

    /// Output file, resolved against the current working directory when relative. Its directory
    /// must exist.
    #[clap(long, env = "OUTPUT_PATH", default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    init_tracing();

    let args = Args::parse();

    exit_code(run(args).await)
}

/// Maps the run outcome to the process status. Failures are reported once, through the log.
fn exit_code(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %format!("{err:#}"), "Gathering whitelisted vaults failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    info!(rpc_url = %args.rpc_url, output = %args.output.display(), "Gathering whitelisted vaults");

    let mut provider = ChainProviderBuilder::<Ethereum, _>::new(args.rpc_url);
    if let Some(secs) = args.call_timeout_secs {
        provider = provider.call_timeout(Duration::from_secs(secs));
    }
    let provider: ChainProvider = provider.build().await?;

    let mut builder = VaultScannerBuilder::new()
        .registry(args.registry)
        .from_block(args.from_block)
        .max_block_range(args.max_block_range)
        .fan_out(args.fan_out);
    if args.refresh_head {
        builder = builder.head_policy(HeadPolicy::RefreshPerBatch);
    }
    if let Some(secs) = args.deadline_secs {
        builder = builder.deadline(Duration::from_secs(secs));
    }
    let scanner = builder.connect(provider).await?;

    let vaults = scanner.whitelisted_vaults().await?;
    vaults.write_to(&args.output).await?;

    info!(vault_count = vaults.len(), "Done");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
