use multi_transfer_client::RpcError;
use solana_sdk::{instruction::Instruction, program_error::ProgramError, pubkey::Pubkey};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenClientError {
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Account {0} not found")]
    AccountNotFound(Pubkey),

    #[error("Account {address} does not match: {reason}")]
    AccountMismatch { address: Pubkey, reason: String },

    #[error("Program error: {0}")]
    Program(#[from] ProgramError),
}

impl TokenClientError {
    /// Lifts authority failures reported by the network out of the generic
    /// RPC error. `instructions` are the ones the failed transaction carried.
    pub fn from_rpc(error: RpcError, instructions: &[Instruction]) -> Self {
        if error.is_authorization_error(instructions) {
            Self::Authorization(error.to_string())
        } else {
            Self::Rpc(error)
        }
    }
}
