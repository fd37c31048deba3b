use std::{
    collections::HashMap,
    fmt::{Debug, Formatter},
};

use async_trait::async_trait;
use solana_program_test::{ProgramTest, ProgramTestContext};
use solana_sdk::{
    account::Account,
    hash::Hash,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    system_instruction,
    transaction::{Transaction, TransactionError},
};
use solana_transaction_status::{TransactionConfirmationStatus, TransactionStatus};

use super::{RpcConnection, RpcError};

/// In-process bank with the SPL token and associated token account programs
/// preloaded. Submitted transactions are executed before `send_transaction`
/// returns, so state is observable immediately.
pub struct ProgramTestRpcConnection {
    pub context: ProgramTestContext,
    processed: HashMap<Signature, Result<(), TransactionError>>,
}

impl Debug for ProgramTestRpcConnection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProgramTestRpcConnection")
    }
}

impl ProgramTestRpcConnection {
    pub fn new(context: ProgramTestContext) -> Self {
        Self {
            context,
            processed: HashMap::new(),
        }
    }

    pub async fn start() -> Self {
        let context = ProgramTest::default().start_with_context().await;
        Self::new(context)
    }

    pub fn get_payer(&self) -> &Keypair {
        &self.context.payer
    }

    async fn execute(&mut self, transaction: Transaction) -> Result<Signature, RpcError> {
        let signature = *transaction
            .signatures
            .first()
            .ok_or_else(|| RpcError::CustomError("Transaction is not signed".into()))?;
        let result = self
            .context
            .banks_client
            .process_transaction_with_metadata(transaction)
            .await
            .map_err(RpcError::from)?;
        self.processed.insert(signature, result.result.clone());
        result.result.map_err(RpcError::from)?;
        Ok(signature)
    }
}

#[async_trait]
impl RpcConnection for ProgramTestRpcConnection {
    fn get_url(&self) -> String {
        "program-test".to_string()
    }

    async fn get_latest_blockhash(&mut self) -> Result<Hash, RpcError> {
        self.context
            .banks_client
            .get_latest_blockhash()
            .await
            .map_err(RpcError::from)
    }

    async fn get_account(&mut self, address: Pubkey) -> Result<Option<Account>, RpcError> {
        self.context
            .banks_client
            .get_account(address)
            .await
            .map_err(RpcError::from)
    }

    async fn get_balance(&mut self, pubkey: &Pubkey) -> Result<u64, RpcError> {
        self.context
            .banks_client
            .get_balance(*pubkey)
            .await
            .map_err(RpcError::from)
    }

    async fn get_minimum_balance_for_rent_exemption(
        &mut self,
        data_len: usize,
    ) -> Result<u64, RpcError> {
        let rent = self
            .context
            .banks_client
            .get_rent()
            .await
            .map_err(RpcError::from)?;
        Ok(rent.minimum_balance(data_len))
    }

    async fn process_transaction(
        &mut self,
        transaction: Transaction,
    ) -> Result<Signature, RpcError> {
        self.execute(transaction).await
    }

    async fn send_transaction(
        &mut self,
        transaction: &Transaction,
    ) -> Result<Signature, RpcError> {
        self.execute(transaction.clone()).await
    }

    async fn confirm_transaction(&mut self, signature: Signature) -> Result<bool, RpcError> {
        Ok(matches!(self.processed.get(&signature), Some(Ok(()))))
    }

    async fn get_signature_statuses(
        &mut self,
        signatures: &[Signature],
    ) -> Result<Vec<Option<TransactionStatus>>, RpcError> {
        let slot = self
            .context
            .banks_client
            .get_root_slot()
            .await
            .map_err(RpcError::from)?;
        Ok(signatures
            .iter()
            .map(|signature| {
                self.processed.get(signature).map(|result| TransactionStatus {
                    slot,
                    confirmations: None,
                    status: result.clone(),
                    err: result.clone().err(),
                    confirmation_status: Some(TransactionConfirmationStatus::Finalized),
                })
            })
            .collect())
    }

    async fn airdrop_lamports(
        &mut self,
        to: &Pubkey,
        lamports: u64,
    ) -> Result<Signature, RpcError> {
        let payer = self.context.payer.insecure_clone();
        let instruction = system_instruction::transfer(&payer.pubkey(), to, lamports);
        let blockhash = self.context.get_new_latest_blockhash().await?;
        let transaction = Transaction::new_signed_with_payer(
            &[instruction],
            Some(&payer.pubkey()),
            &[&payer],
            blockhash,
        );
        self.execute(transaction).await
    }

    async fn create_and_send_transaction<'a>(
        &'a mut self,
        instructions: &'a [Instruction],
        payer: &'a Pubkey,
        signers: &'a [&'a Keypair],
    ) -> Result<Signature, RpcError> {
        // A fresh blockhash keeps repeated identical instructions from being
        // rejected as already processed.
        let blockhash = self.context.get_new_latest_blockhash().await?;
        let transaction =
            Transaction::new_signed_with_payer(instructions, Some(payer), signers, blockhash);
        self.execute(transaction).await
    }
}
