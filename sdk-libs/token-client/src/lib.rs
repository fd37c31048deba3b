pub mod actions;
pub mod amount;
pub mod errors;
pub mod instructions;

pub use amount::scale_amount;
pub use errors::TokenClientError;
pub use spl_associated_token_account::get_associated_token_address;

use solana_sdk::pubkey::Pubkey;

/// A token account as read back from the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAccount {
    pub address: Pubkey,
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
}
