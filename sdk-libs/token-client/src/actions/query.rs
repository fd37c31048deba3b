use multi_transfer_client::RpcConnection;
use solana_sdk::{program_pack::Pack, pubkey::Pubkey};
use spl_token::state::{Account as SplTokenAccount, Mint};

use crate::{errors::TokenClientError, TokenAccount};

pub async fn get_mint<R: RpcConnection>(
    rpc: &mut R,
    mint: &Pubkey,
) -> Result<Option<Mint>, TokenClientError> {
    match rpc.get_account(*mint).await? {
        Some(account) => {
            if account.owner != spl_token::id() {
                return Err(TokenClientError::AccountMismatch {
                    address: *mint,
                    reason: format!("owned by {}, not the token program", account.owner),
                });
            }
            Ok(Some(Mint::unpack(&account.data)?))
        }
        None => Ok(None),
    }
}

pub async fn get_token_account<R: RpcConnection>(
    rpc: &mut R,
    address: &Pubkey,
) -> Result<Option<TokenAccount>, TokenClientError> {
    match rpc.get_account(*address).await? {
        Some(account) => {
            if account.owner != spl_token::id() {
                return Err(TokenClientError::AccountMismatch {
                    address: *address,
                    reason: format!("owned by {}, not the token program", account.owner),
                });
            }
            let state = SplTokenAccount::unpack(&account.data)?;
            Ok(Some(TokenAccount {
                address: *address,
                mint: state.mint,
                owner: state.owner,
                amount: state.amount,
            }))
        }
        None => Ok(None),
    }
}

pub async fn get_token_balance<R: RpcConnection>(
    rpc: &mut R,
    address: &Pubkey,
) -> Result<u64, TokenClientError> {
    get_token_account(rpc, address)
        .await?
        .map(|account| account.amount)
        .ok_or(TokenClientError::AccountNotFound(*address))
}
