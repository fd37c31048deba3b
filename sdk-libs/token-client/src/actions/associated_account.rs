use multi_transfer_client::RpcConnection;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account_idempotent,
};
use tracing::{debug, info};

use crate::{actions::get_token_account, errors::TokenClientError, TokenAccount};

/// Returns the associated token account of `owner` for `mint`, creating it
/// first if it does not exist yet.
///
/// An existing account is returned without submitting a transaction.
pub async fn get_or_create_associated_token_account<R: RpcConnection>(
    rpc: &mut R,
    payer: &Keypair,
    mint: &Pubkey,
    owner: &Pubkey,
) -> Result<TokenAccount, TokenClientError> {
    let address = get_associated_token_address(owner, mint);

    if let Some(account) = get_token_account(rpc, &address).await? {
        debug!("Associated token account {} already exists", address);
        return check_account(account, mint, owner);
    }

    let instructions = [create_associated_token_account_idempotent(
        &payer.pubkey(),
        owner,
        mint,
        &spl_token::id(),
    )];
    let signature = rpc
        .create_and_send_transaction(&instructions, &payer.pubkey(), &[payer])
        .await
        .map_err(|e| TokenClientError::from_rpc(e, &instructions))?;
    info!(
        "Created associated token account {} for owner {}: {}",
        address, owner, signature
    );

    let account = get_token_account(rpc, &address)
        .await?
        .ok_or(TokenClientError::AccountNotFound(address))?;
    check_account(account, mint, owner)
}

fn check_account(
    account: TokenAccount,
    mint: &Pubkey,
    owner: &Pubkey,
) -> Result<TokenAccount, TokenClientError> {
    if account.mint != *mint {
        return Err(TokenClientError::AccountMismatch {
            address: account.address,
            reason: format!("holds mint {}, expected {}", account.mint, mint),
        });
    }
    if account.owner != *owner {
        return Err(TokenClientError::AccountMismatch {
            address: account.address,
            reason: format!("owned by {}, expected {}", account.owner, owner),
        });
    }
    Ok(account)
}
