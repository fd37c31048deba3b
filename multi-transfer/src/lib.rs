pub mod batch;
pub mod cli;
pub mod config;
pub mod errors;
pub mod keypair;
pub mod recipient_log;
pub mod telemetry;

use multi_transfer_client::RpcConnection;
use multi_transfer_token_client::{
    actions::{
        create_mint, get_mint, get_or_create_associated_token_account, get_token_account, mint_to,
    },
    get_associated_token_address, scale_amount, TokenClientError,
};
use solana_sdk::{
    program_option::COption,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};
use spl_token::state::Mint;
use tracing::info;

pub use batch::{send_batched_transactions, BatchReport, SubmissionOutcome, SubmissionStatus};
pub use config::{BatchConfig, MultiTransferConfig, StatusConfig};
pub use errors::MultiTransferError;
use recipient_log::RecipientLog;

pub type Result<T> = std::result::Result<T, MultiTransferError>;

#[derive(Debug)]
pub struct PipelineReport {
    pub mint: Pubkey,
    pub payer_token_account: Pubkey,
    pub mint_signature: Signature,
    pub batch: BatchReport,
}

/// Creates the mint, funds the payer's associated token account and fans
/// tokens out to fresh recipients in batched transactions.
pub async fn run_pipeline<R: RpcConnection>(
    rpc: &mut R,
    config: &MultiTransferConfig,
) -> Result<PipelineReport> {
    let payer = &config.payer_keypair;
    let amount = scale_amount(config.mint_amount, config.decimals)?;
    info!("Payer: {}", payer.pubkey());

    if let Some(min_balance) = config.min_payer_balance {
        ensure_payer_balance(rpc, &payer.pubkey(), min_balance).await?;
    }

    let mint = initialize_mint(rpc, payer, &config.mint_keypair, config.decimals).await?;
    info!("Mint address: {}", mint);

    let token_account =
        get_or_create_associated_token_account(rpc, payer, &mint, &payer.pubkey()).await?;
    info!("Payer token account: {}", token_account.address);

    let mint_signature = mint_to(rpc, payer, &mint, &token_account.address, payer, amount).await?;

    let mut recipient_log = config
        .recipient_log
        .as_ref()
        .map(RecipientLog::open)
        .transpose()?;
    if let Some(log) = &recipient_log {
        info!("Recording recipients in {}", log.path().display());
    }

    let batch = send_batched_transactions(
        rpc,
        payer,
        &token_account.address,
        &mint,
        &config.batch,
        recipient_log.as_mut(),
    )
    .await?;

    Ok(PipelineReport {
        mint,
        payer_token_account: token_account.address,
        mint_signature,
        batch,
    })
}

/// Airdrops the shortfall when `payer` holds fewer than `min_balance`
/// lamports. Only local and test clusters honor airdrops.
pub async fn ensure_payer_balance<R: RpcConnection>(
    rpc: &mut R,
    payer: &Pubkey,
    min_balance: u64,
) -> Result<()> {
    let balance = rpc.get_balance(payer).await?;
    if balance < min_balance {
        let shortfall = min_balance - balance;
        let signature = rpc.airdrop_lamports(payer, shortfall).await?;
        info!(
            "Airdropped {} lamports to {}: {}",
            shortfall, payer, signature
        );
    }
    Ok(())
}

/// Creates the mint at the address of `mint_keypair`, or reuses it when a
/// previous run already created it with the same decimals and authority.
pub async fn initialize_mint<R: RpcConnection>(
    rpc: &mut R,
    payer: &Keypair,
    mint_keypair: &Keypair,
    decimals: u8,
) -> Result<Pubkey> {
    let mint = mint_keypair.pubkey();
    let Some(existing) = get_mint(rpc, &mint).await? else {
        return Ok(create_mint(
            rpc,
            payer,
            &payer.pubkey(),
            Some(&payer.pubkey()),
            decimals,
            mint_keypair,
        )
        .await?);
    };

    if existing.decimals != decimals {
        return Err(MultiTransferError::MintMismatch {
            mint,
            reason: format!("{} decimals, expected {}", existing.decimals, decimals),
        });
    }
    if existing.mint_authority != COption::Some(payer.pubkey()) {
        return Err(MultiTransferError::MintMismatch {
            mint,
            reason: format!("a mint authority other than {}", payer.pubkey()),
        });
    }
    info!("Mint {} already exists, reusing it", mint);
    Ok(mint)
}

#[derive(Debug)]
pub struct StatusReport {
    pub mint: Pubkey,
    pub mint_state: Option<Mint>,
    pub payer_token_account: Pubkey,
    pub payer_token_balance: Option<u64>,
    pub payer_lamports: u64,
}

/// Reads the mint and the payer's token account without submitting anything.
pub async fn run_status<R: RpcConnection>(
    rpc: &mut R,
    config: &StatusConfig,
) -> Result<StatusReport> {
    let mint = config.mint_keypair.pubkey();
    let payer = config.payer_keypair.pubkey();
    let payer_token_account = get_associated_token_address(&payer, &mint);

    let mint_state = get_mint(rpc, &mint).await?;
    let payer_token_balance = match get_token_account(rpc, &payer_token_account).await {
        Ok(account) => account.map(|account| account.amount),
        Err(TokenClientError::AccountMismatch { .. }) => None,
        Err(e) => return Err(e.into()),
    };
    let payer_lamports = rpc.get_balance(&payer).await?;

    match &mint_state {
        Some(state) => info!(
            "Mint {}: supply {}, decimals {}, mint authority {:?}, freeze authority {:?}",
            mint, state.supply, state.decimals, state.mint_authority, state.freeze_authority
        ),
        None => info!("Mint {} does not exist", mint),
    }
    match payer_token_balance {
        Some(balance) => info!(
            "Payer {} token account {}: {} base units",
            payer, payer_token_account, balance
        ),
        None => info!(
            "Payer {} has no token account {}",
            payer, payer_token_account
        ),
    }
    info!("Payer {} lamports: {}", payer, payer_lamports);

    Ok(StatusReport {
        mint,
        mint_state,
        payer_token_account,
        payer_token_balance,
        payer_lamports,
    })
}
