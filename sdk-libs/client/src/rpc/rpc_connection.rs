use std::fmt::Debug;

use async_trait::async_trait;
use solana_sdk::{
    account::Account,
    hash::Hash,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    transaction::Transaction,
};
use solana_transaction_status::TransactionStatus;

use crate::rpc::errors::RpcError;

/// Network operations needed to create, fund and query token accounts.
///
/// Implemented against a JSON-RPC endpoint by [`SolanaRpcConnection`] and
/// against an in-process bank by `ProgramTestRpcConnection`.
///
/// [`SolanaRpcConnection`]: crate::rpc::SolanaRpcConnection
#[async_trait]
pub trait RpcConnection: Send + Sync + Debug + 'static {
    fn get_url(&self) -> String;

    async fn get_latest_blockhash(&mut self) -> Result<Hash, RpcError>;
    async fn get_account(&mut self, address: Pubkey) -> Result<Option<Account>, RpcError>;
    async fn get_balance(&mut self, pubkey: &Pubkey) -> Result<u64, RpcError>;
    async fn get_minimum_balance_for_rent_exemption(
        &mut self,
        data_len: usize,
    ) -> Result<u64, RpcError>;

    /// Sends the transaction and waits until it is confirmed.
    async fn process_transaction(
        &mut self,
        transaction: Transaction,
    ) -> Result<Signature, RpcError>;

    /// Sends the transaction without waiting for confirmation.
    async fn send_transaction(&mut self, transaction: &Transaction)
        -> Result<Signature, RpcError>;

    async fn confirm_transaction(&mut self, signature: Signature) -> Result<bool, RpcError>;
    async fn get_signature_statuses(
        &mut self,
        signatures: &[Signature],
    ) -> Result<Vec<Option<TransactionStatus>>, RpcError>;

    async fn airdrop_lamports(&mut self, to: &Pubkey, lamports: u64)
        -> Result<Signature, RpcError>;

    async fn create_and_send_transaction<'a>(
        &'a mut self,
        instructions: &'a [Instruction],
        payer: &'a Pubkey,
        signers: &'a [&'a Keypair],
    ) -> Result<Signature, RpcError> {
        let blockhash = self.get_latest_blockhash().await?;
        let transaction =
            Transaction::new_signed_with_payer(instructions, Some(payer), signers, blockhash);
        self.process_transaction(transaction).await
    }
}
