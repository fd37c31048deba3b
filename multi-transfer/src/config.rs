use std::{path::PathBuf, time::Duration};

use multi_transfer_client::RetryConfig;
use multi_transfer_token_client::scale_amount;
use solana_sdk::{packet::PACKET_DATA_SIZE, signature::Keypair};

use crate::{
    batch::batch_transaction_size,
    cli::{RunArgs, StatusArgs},
    errors::ConfigError,
    keypair::load_keypair,
};

#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Create and transfer instruction pairs per transaction.
    pub batch_size: usize,
    pub duration: Duration,
    pub max_transactions: Option<u64>,
    pub transfer_amount: u64,
    pub blockhash_refresh: Duration,
    pub confirm: bool,
    pub confirm_timeout: Duration,
    pub compute_unit_price: Option<u64>,
    pub compute_unit_limit: Option<u32>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            duration: Duration::from_secs(10),
            max_transactions: None,
            transfer_amount: 100,
            blockhash_refresh: Duration::from_secs(20),
            confirm: false,
            confirm_timeout: Duration::from_secs(30),
            compute_unit_price: None,
            compute_unit_limit: None,
        }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::EmptyBatch);
        }
        if self.duration.is_zero() {
            return Err(ConfigError::InvalidDuration(self.duration));
        }
        let size = batch_transaction_size(self)?;
        if size > PACKET_DATA_SIZE {
            return Err(ConfigError::BatchTooLarge {
                batch_size: self.batch_size,
                size,
                limit: PACKET_DATA_SIZE,
            });
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct MultiTransferConfig {
    pub rpc_url: String,
    pub mint_keypair: Keypair,
    pub payer_keypair: Keypair,
    pub decimals: u8,
    /// Whole tokens, scaled by `decimals` before minting.
    pub mint_amount: i64,
    pub min_payer_balance: Option<u64>,
    pub batch: BatchConfig,
    pub recipient_log: Option<PathBuf>,
    pub retry_config: RetryConfig,
}

impl MultiTransferConfig {
    pub fn new_for_run(args: &RunArgs) -> Result<Self, ConfigError> {
        let config = Self {
            rpc_url: args.rpc_url.clone(),
            mint_keypair: load_keypair(&args.mint_keypair)?,
            payer_keypair: load_keypair(&args.payer_keypair)?,
            decimals: args.decimals,
            mint_amount: args.mint_amount,
            min_payer_balance: args.min_payer_balance,
            batch: BatchConfig {
                batch_size: args.batch_size,
                duration: Duration::from_secs(args.batch_duration_secs),
                max_transactions: args.max_transactions,
                transfer_amount: args.transfer_amount,
                blockhash_refresh: Duration::from_secs(args.blockhash_refresh_secs),
                confirm: args.confirm,
                confirm_timeout: Duration::from_secs(args.confirm_timeout_secs),
                compute_unit_price: args.compute_unit_price,
                compute_unit_limit: args.compute_unit_limit,
            },
            recipient_log: args.recipient_log.clone(),
            retry_config: RetryConfig {
                max_retries: args.max_retries,
                retry_delay: Duration::from_millis(args.retry_delay_ms),
                timeout: Duration::from_millis(args.retry_timeout_ms),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        scale_amount(self.mint_amount, self.decimals)?;
        self.batch.validate()
    }
}

#[derive(Debug)]
pub struct StatusConfig {
    pub rpc_url: String,
    pub mint_keypair: Keypair,
    pub payer_keypair: Keypair,
}

impl StatusConfig {
    pub fn new_for_status(args: &StatusArgs) -> Result<Self, ConfigError> {
        Ok(Self {
            rpc_url: args.rpc_url.clone(),
            mint_keypair: load_keypair(&args.mint_keypair)?,
            payer_keypair: load_keypair(&args.payer_keypair)?,
        })
    }
}
