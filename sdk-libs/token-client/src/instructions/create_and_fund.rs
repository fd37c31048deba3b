use solana_sdk::{instruction::Instruction, program_error::ProgramError, pubkey::Pubkey};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account,
};

/// Instructions that open the associated token account of `recipient` and
/// move `amount` base units into it from `source`, which `payer` owns.
///
/// Returns the derived associated account address with the pair.
pub fn create_and_fund_recipient_instructions(
    payer: &Pubkey,
    source: &Pubkey,
    mint: &Pubkey,
    recipient: &Pubkey,
    amount: u64,
) -> Result<(Pubkey, [Instruction; 2]), ProgramError> {
    let associated_account = get_associated_token_address(recipient, mint);
    let create_ix = create_associated_token_account(payer, recipient, mint, &spl_token::id());
    let transfer_ix = spl_token::instruction::transfer(
        &spl_token::id(),
        source,
        &associated_account,
        payer,
        &[],
        amount,
    )?;
    Ok((associated_account, [create_ix, transfer_ix]))
}
