use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the mint, fund the payer and fan tokens out in batches.
    Run(RunArgs),
    /// Print the mint and the payer's token balance.
    Status(StatusArgs),
}

#[derive(Parser, Clone, Debug)]
pub struct RunArgs {
    #[arg(long, env = "MULTI_TRANSFER_RPC_URL", default_value = "http://127.0.0.1:8899")]
    pub rpc_url: String,

    #[arg(long, env = "MULTI_TRANSFER_MINT_KEYPAIR")]
    pub mint_keypair: PathBuf,

    #[arg(long, env = "MULTI_TRANSFER_PAYER_KEYPAIR")]
    pub payer_keypair: PathBuf,

    #[arg(long, env = "MULTI_TRANSFER_DECIMALS", default_value = "2")]
    pub decimals: u8,

    /// Whole tokens minted to the payer, scaled by the mint decimals.
    #[arg(
        long,
        env = "MULTI_TRANSFER_MINT_AMOUNT",
        default_value = "1000000",
        allow_negative_numbers = true
    )]
    pub mint_amount: i64,

    /// Create and transfer instruction pairs packed into each transaction.
    #[arg(long, env = "MULTI_TRANSFER_BATCH_SIZE", default_value = "10")]
    pub batch_size: usize,

    #[arg(long, env = "MULTI_TRANSFER_BATCH_DURATION_SECS", default_value = "10")]
    pub batch_duration_secs: u64,

    #[arg(long, env = "MULTI_TRANSFER_MAX_TRANSACTIONS")]
    pub max_transactions: Option<u64>,

    /// Base units sent to each new recipient.
    #[arg(long, env = "MULTI_TRANSFER_TRANSFER_AMOUNT", default_value = "100")]
    pub transfer_amount: u64,

    /// 0 fetches a new blockhash for every transaction.
    #[arg(
        long,
        env = "MULTI_TRANSFER_BLOCKHASH_REFRESH_SECS",
        default_value = "20"
    )]
    pub blockhash_refresh_secs: u64,

    #[arg(long, env = "MULTI_TRANSFER_RECIPIENT_LOG")]
    pub recipient_log: Option<PathBuf>,

    /// Wait for the signature statuses of all submitted transactions.
    #[arg(long, env = "MULTI_TRANSFER_CONFIRM")]
    pub confirm: bool,

    #[arg(long, env = "MULTI_TRANSFER_CONFIRM_TIMEOUT_SECS", default_value = "30")]
    pub confirm_timeout_secs: u64,

    #[arg(long, env = "MULTI_TRANSFER_COMPUTE_UNIT_PRICE")]
    pub compute_unit_price: Option<u64>,

    #[arg(long, env = "MULTI_TRANSFER_COMPUTE_UNIT_LIMIT")]
    pub compute_unit_limit: Option<u32>,

    /// Airdrop lamports to the payer when its balance is below this value.
    #[arg(long, env = "MULTI_TRANSFER_MIN_PAYER_BALANCE")]
    pub min_payer_balance: Option<u64>,

    #[arg(long, env = "MULTI_TRANSFER_MAX_RETRIES", default_value = "3")]
    pub max_retries: u32,

    #[arg(long, env = "MULTI_TRANSFER_RETRY_DELAY_MS", default_value = "1000")]
    pub retry_delay_ms: u64,

    #[arg(long, env = "MULTI_TRANSFER_RETRY_TIMEOUT_MS", default_value = "30000")]
    pub retry_timeout_ms: u64,
}

#[derive(Parser, Clone, Debug)]
pub struct StatusArgs {
    #[arg(long, env = "MULTI_TRANSFER_RPC_URL", default_value = "http://127.0.0.1:8899")]
    pub rpc_url: String,

    #[arg(long, env = "MULTI_TRANSFER_MINT_KEYPAIR")]
    pub mint_keypair: PathBuf,

    #[arg(long, env = "MULTI_TRANSFER_PAYER_KEYPAIR")]
    pub payer_keypair: PathBuf,
}
