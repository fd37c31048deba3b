use anyhow::Context;
use clap::Parser;
use multi_transfer::{
    cli::{Cli, Commands, RunArgs, StatusArgs},
    run_pipeline, run_status,
    telemetry::setup_telemetry,
    MultiTransferConfig, StatusConfig,
};
use multi_transfer_client::SolanaRpcConnection;
use solana_sdk::commitment_config::CommitmentConfig;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    setup_telemetry();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Status(args) => status(args).await,
    };

    match result {
        Ok(()) => {
            info!("Finished successfully");
            Ok(())
        }
        Err(e) => {
            error!("{:?}", e);
            Err(e)
        }
    }
}

async fn run(args: &RunArgs) -> anyhow::Result<()> {
    let config = MultiTransferConfig::new_for_run(args).context("invalid configuration")?;
    let mut rpc = SolanaRpcConnection::new_with_retry(
        &config.rpc_url,
        Some(CommitmentConfig::confirmed()),
        Some(config.retry_config),
    );

    let report = run_pipeline(&mut rpc, &config).await?;
    info!(
        "Mint {} funded {} recipients from {} in {} transactions ({} failed)",
        report.mint,
        report.batch.recipients_created(),
        report.payer_token_account,
        report.batch.submitted(),
        report.batch.failed()
    );
    Ok(())
}

async fn status(args: &StatusArgs) -> anyhow::Result<()> {
    let config = StatusConfig::new_for_status(args).context("invalid configuration")?;
    let mut rpc = SolanaRpcConnection::new(&config.rpc_url, Some(CommitmentConfig::confirmed()));
    run_status(&mut rpc, &config).await?;
    Ok(())
}
