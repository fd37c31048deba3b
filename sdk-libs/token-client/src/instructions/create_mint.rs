use solana_sdk::{
    instruction::Instruction, program_error::ProgramError, program_pack::Pack, pubkey::Pubkey,
    system_instruction,
};
use spl_token::state::Mint;

/// Allocates a rent-exempt mint account at `mint` and initializes it.
pub fn create_mint_instructions(
    payer: &Pubkey,
    mint: &Pubkey,
    mint_authority: &Pubkey,
    freeze_authority: Option<&Pubkey>,
    decimals: u8,
    rent: u64,
) -> Result<[Instruction; 2], ProgramError> {
    let create_account_ix = system_instruction::create_account(
        payer,
        mint,
        rent,
        Mint::LEN as u64,
        &spl_token::id(),
    );
    let initialize_mint_ix = spl_token::instruction::initialize_mint2(
        &spl_token::id(),
        mint,
        mint_authority,
        freeze_authority,
        decimals,
    )?;
    Ok([create_account_ix, initialize_mint_ix])
}
