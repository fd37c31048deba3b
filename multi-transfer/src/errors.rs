use std::{io, path::PathBuf, time::Duration};

use multi_transfer_client::RpcError;
use multi_transfer_token_client::TokenClientError;
use solana_sdk::{program_error::ProgramError, pubkey::Pubkey};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MultiTransferError {
    #[error("Keypair error: {0}")]
    Keypair(#[from] KeypairError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Token client error: {0}")]
    Token(#[from] TokenClientError),

    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Program error: {0}")]
    Program(#[from] ProgramError),

    #[error("Recipient log {path}: {source}")]
    RecipientLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Mint {mint} already exists with {reason}")]
    MintMismatch { mint: Pubkey, reason: String },
}

#[derive(Error, Debug)]
pub enum KeypairError {
    #[error("Failed to read keypair file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid keypair data in {path}: {reason}")]
    Format { path: PathBuf, reason: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Batch size must be at least 1")]
    EmptyBatch,

    #[error("Batch duration must be greater than zero, got {0:?}")]
    InvalidDuration(Duration),

    #[error(
        "A batch of {batch_size} instruction pairs serializes to {size} bytes, over the {limit} byte transaction limit"
    )]
    BatchTooLarge {
        batch_size: usize,
        size: usize,
        limit: usize,
    },

    #[error("Invalid mint amount: {0}")]
    InvalidAmount(#[from] TokenClientError),

    #[error(transparent)]
    Keypair(#[from] KeypairError),

    #[error("Program error: {0}")]
    Program(#[from] ProgramError),
}
