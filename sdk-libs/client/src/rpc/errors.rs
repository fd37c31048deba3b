use std::io;

#[cfg(feature = "program-test")]
use solana_banks_client::BanksClientError;
use solana_client::client_error::ClientError;
use solana_sdk::{
    instruction::{Instruction, InstructionError},
    transaction::TransactionError,
};
use spl_token::error::TokenError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcError {
    #[cfg(feature = "program-test")]
    #[error("BanksError: {0}")]
    BanksError(#[from] Box<BanksClientError>),

    #[error("TransactionError: {0}")]
    TransactionError(#[from] Box<TransactionError>),

    #[error("ClientError: {0}")]
    ClientError(#[from] Box<ClientError>),

    #[error("IoError: {0}")]
    IoError(#[from] Box<io::Error>),

    #[error("Error: `{0}`")]
    CustomError(String),
}

#[cfg(feature = "program-test")]
impl From<BanksClientError> for RpcError {
    fn from(err: BanksClientError) -> Self {
        RpcError::BanksError(Box::new(err))
    }
}

impl From<TransactionError> for RpcError {
    fn from(err: TransactionError) -> Self {
        RpcError::TransactionError(Box::new(err))
    }
}

impl From<ClientError> for RpcError {
    fn from(err: ClientError) -> Self {
        RpcError::ClientError(Box::new(err))
    }
}

impl From<io::Error> for RpcError {
    fn from(err: io::Error) -> Self {
        RpcError::IoError(Box::new(err))
    }
}

impl RpcError {
    /// The on-chain transaction error behind this failure, if the network
    /// executed (or simulated) the transaction at all.
    pub fn transaction_error(&self) -> Option<TransactionError> {
        match self {
            #[cfg(feature = "program-test")]
            RpcError::BanksError(err) => match err.as_ref() {
                BanksClientError::TransactionError(err)
                | BanksClientError::SimulationError { err, .. } => Some(err.clone()),
                _ => None,
            },
            RpcError::TransactionError(err) => Some(err.as_ref().clone()),
            RpcError::ClientError(err) => err.get_transaction_error(),
            _ => None,
        }
    }

    /// True when a signer lacked the authority an instruction required.
    ///
    /// `instructions` are the instructions of the failed transaction, in
    /// order. Custom error codes only count when the failing instruction
    /// belongs to the token program.
    pub fn is_authorization_error(&self, instructions: &[Instruction]) -> bool {
        match self.transaction_error() {
            Some(TransactionError::InstructionError(
                _,
                InstructionError::MissingRequiredSignature,
            )) => true,
            Some(TransactionError::InstructionError(index, InstructionError::Custom(code))) => {
                code == TokenError::OwnerMismatch as u32
                    && instructions
                        .get(usize::from(index))
                        .is_some_and(|instruction| instruction.program_id == spl_token::id())
            }
            _ => false,
        }
    }
}
