// canvote-keeper: watches governance proposals and finalizes them once their
// voting window closes.

use std::sync::Arc;

use canvote_keeper::sweep;
use canvote_sdk::{
    config::{ClientConfig, ConfigError},
    poller::poller,
    signer::KeypairSigner,
    GovernanceSession,
};
use log::{error, info};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::signature::{read_keypair_file, Keypair};

// ── Config ──────────────────────────────────────────────────────────────────

struct KeeperConfig {
    client: ClientConfig,
    keypair: Keypair,
}

impl KeeperConfig {
    fn from_env() -> Result<Self, String> {
        let client = ClientConfig::from_env().map_err(|e: ConfigError| e.to_string())?;

        let keypair_path = std::env::var("KEEPER_KEYPAIR_PATH")
            .unwrap_or_else(|_| "keeper-keypair.json".to_string());
        let keypair = read_keypair_file(&keypair_path)
            .map_err(|e| format!("Failed to read keypair from {}: {}", keypair_path, e))?;

        Ok(Self { client, keypair })
    }
}

// ── Main Loop ───────────────────────────────────────────────────────────────

async fn run_keeper(config: KeeperConfig) {
    let client = config.client;
    let signer = KeypairSigner::new(config.keypair);
    let authority = signer.pubkey();
    let rpc = RpcClient::new_with_commitment(client.rpc_url.clone(), client.commitment);

    info!("=== CanVote Keeper ===");
    info!("RPC:             {}", client.rpc_url);
    info!("Cluster:         {}", client.chain_id());
    info!("Program:         {} ({})", client.program.program_id, client.program.variant);
    info!("Keeper:          {}", authority);
    info!("Poll Interval:   {}ms", client.poll_interval.as_millis());

    let session = Arc::new(GovernanceSession::from_config(&client, rpc, signer, authority));
    let (poller, handle) = poller(client.poll_interval);

    let ticker = poller.run(|| {
        let session = Arc::clone(&session);
        async move {
            match sweep(&session).await {
                Ok(report) => info!(
                    "[SWEEP] upcoming={} active={} settled={} finalized={} failed={}",
                    report.upcoming, report.active, report.settled, report.finalized, report.failed
                ),
                Err(e) => error!("[SWEEP] Error listing proposals: {}", e),
            }
        }
    });
    tokio::pin!(ticker);

    tokio::select! {
        ticks = &mut ticker => {
            info!("Keeper stopped after {} sweeps", ticks);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown requested, finishing current sweep");
            handle.cancel();
            let ticks = ticker.await;
            info!("Keeper stopped after {} sweeps", ticks);
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match KeeperConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!();
            eprintln!("Required environment variables:");
            eprintln!("  KEEPER_KEYPAIR_PATH         Path to keeper keypair JSON file");
            eprintln!();
            eprintln!("Optional environment variables:");
            eprintln!("  GOVERNANCE_CLUSTER          devnet | mainnet (default: devnet)");
            eprintln!("  GOVERNANCE_RPC_URL          RPC URL (default: cluster endpoint)");
            eprintln!("  GOVERNANCE_PROGRAM_VARIANT  delegation | quadratic (default: delegation)");
            eprintln!("  GOVERNANCE_PROGRAM_ID       Program ID (default: variant's deployment)");
            eprintln!("  GOVERNANCE_COMMITMENT       processed | confirmed | finalized");
            eprintln!("                              (default: confirmed)");
            eprintln!("  POLL_INTERVAL_MS            Polling interval in ms (default: 30000)");
            std::process::exit(1);
        }
    };

    run_keeper(config).await;
}
