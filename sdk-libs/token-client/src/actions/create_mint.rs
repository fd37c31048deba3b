use multi_transfer_client::RpcConnection;
use solana_sdk::{
    program_pack::Pack,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use spl_token::state::Mint;
use tracing::info;

use crate::{errors::TokenClientError, instructions::create_mint_instructions};

/// Creates and initializes a token mint at the address of `mint_keypair`,
/// waiting for confirmation.
///
/// `payer` funds the rent-exempt account and the fee; both `payer` and
/// `mint_keypair` sign.
pub async fn create_mint<R: RpcConnection>(
    rpc: &mut R,
    payer: &Keypair,
    mint_authority: &Pubkey,
    freeze_authority: Option<&Pubkey>,
    decimals: u8,
    mint_keypair: &Keypair,
) -> Result<Pubkey, TokenClientError> {
    let mint = mint_keypair.pubkey();
    let rent = rpc.get_minimum_balance_for_rent_exemption(Mint::LEN).await?;
    let instructions = create_mint_instructions(
        &payer.pubkey(),
        &mint,
        mint_authority,
        freeze_authority,
        decimals,
        rent,
    )?;

    let mut signers: Vec<&Keypair> = vec![payer];
    if mint != payer.pubkey() {
        signers.push(mint_keypair);
    }

    let signature = rpc
        .create_and_send_transaction(&instructions, &payer.pubkey(), &signers)
        .await
        .map_err(|e| TokenClientError::from_rpc(e, &instructions))?;
    info!(
        "Created mint {} with {} decimals: {}",
        mint, decimals, signature
    );
    Ok(mint)
}
