use multi_transfer_client::RpcConnection;
use solana_sdk::{
    program_option::COption,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};
use tracing::info;

use crate::{actions::get_mint, errors::TokenClientError};

/// Mints `amount` base units of `mint` into `destination`.
///
/// The mint is read first so a signer without mint authority is rejected
/// before anything is submitted.
pub async fn mint_to<R: RpcConnection>(
    rpc: &mut R,
    payer: &Keypair,
    mint: &Pubkey,
    destination: &Pubkey,
    authority: &Keypair,
    amount: u64,
) -> Result<Signature, TokenClientError> {
    let mint_state = get_mint(rpc, mint)
        .await?
        .ok_or(TokenClientError::AccountNotFound(*mint))?;
    if mint_state.mint_authority != COption::Some(authority.pubkey()) {
        return Err(TokenClientError::Authorization(format!(
            "{} is not the mint authority of {}",
            authority.pubkey(),
            mint
        )));
    }

    let instructions = [spl_token::instruction::mint_to(
        &spl_token::id(),
        mint,
        destination,
        &authority.pubkey(),
        &[],
        amount,
    )?];

    // Payer and authority are often the same keypair.
    let mut signers: Vec<&Keypair> = vec![payer];
    if authority.pubkey() != payer.pubkey() {
        signers.push(authority);
    }

    let signature = rpc
        .create_and_send_transaction(&instructions, &payer.pubkey(), &signers)
        .await
        .map_err(|e| TokenClientError::from_rpc(e, &instructions))?;
    info!("The signature of the mint transaction: {}", signature);
    Ok(signature)
}
