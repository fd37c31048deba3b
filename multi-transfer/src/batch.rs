use std::time::Duration;

use multi_transfer_client::RpcConnection;
use multi_transfer_token_client::instructions::create_and_fund_recipient_instructions;
use solana_client::rpc_request::MAX_GET_SIGNATURE_STATUSES_QUERY_ITEMS;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    compute_budget::ComputeBudgetInstruction,
    hash::Hash,
    instruction::Instruction,
    program_error::ProgramError,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::{config::BatchConfig, recipient_log::RecipientLog, Result};

const CONFIRM_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recipient {
    pub owner: Pubkey,
    pub associated_account: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStatus {
    /// Accepted by the node, outcome unknown.
    Sent,
    Confirmed,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    /// 1-based position of the transaction in the run.
    pub index: u64,
    pub signature: Signature,
    pub recipients: Vec<Recipient>,
    pub status: SubmissionStatus,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<SubmissionOutcome>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn submitted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| !matches!(outcome.status, SubmissionStatus::Failed(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.submitted() - self.succeeded()
    }

    pub fn confirmed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status == SubmissionStatus::Confirmed)
            .count()
    }

    /// Recipients of every transaction that was not reported as failed.
    pub fn recipients_created(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| !matches!(outcome.status, SubmissionStatus::Failed(_)))
            .map(|outcome| outcome.recipients.len())
            .sum()
    }
}

/// Builds one signed transaction that creates and funds the associated token
/// account of every owner in `owners`, paid for by `payer`.
pub fn build_batch_transaction(
    payer: &Keypair,
    source: &Pubkey,
    mint: &Pubkey,
    owners: &[Pubkey],
    config: &BatchConfig,
    recent_blockhash: Hash,
) -> std::result::Result<(Transaction, Vec<Recipient>), ProgramError> {
    let mut instructions: Vec<Instruction> = Vec::with_capacity(owners.len() * 2 + 2);
    if let Some(price) = config.compute_unit_price {
        instructions.push(ComputeBudgetInstruction::set_compute_unit_price(price));
    }
    if let Some(limit) = config.compute_unit_limit {
        instructions.push(ComputeBudgetInstruction::set_compute_unit_limit(limit));
    }

    let mut recipients = Vec::with_capacity(owners.len());
    for owner in owners {
        let (associated_account, pair) = create_and_fund_recipient_instructions(
            &payer.pubkey(),
            source,
            mint,
            owner,
            config.transfer_amount,
        )?;
        instructions.extend(pair);
        recipients.push(Recipient {
            owner: *owner,
            associated_account,
        });
    }

    let transaction = Transaction::new_signed_with_payer(
        &instructions,
        Some(&payer.pubkey()),
        &[payer],
        recent_blockhash,
    );
    Ok((transaction, recipients))
}

/// Wire size of a signed transaction.
pub fn transaction_size(transaction: &Transaction) -> usize {
    let num_signatures = transaction.signatures.len();
    short_vec_len(num_signatures) + num_signatures * 64 + transaction.message.serialize().len()
}

/// Wire size of a batch transaction holding `config.batch_size` pairs.
pub fn batch_transaction_size(config: &BatchConfig) -> std::result::Result<usize, ProgramError> {
    let payer = Keypair::new();
    let mint = Keypair::new().pubkey();
    let source = Keypair::new().pubkey();
    let owners: Vec<Pubkey> = (0..config.batch_size)
        .map(|_| Keypair::new().pubkey())
        .collect();
    let (transaction, _) =
        build_batch_transaction(&payer, &source, &mint, &owners, config, Hash::default())?;
    Ok(transaction_size(&transaction))
}

fn short_vec_len(mut value: usize) -> usize {
    let mut len = 1;
    while value >= 0x80 {
        value >>= 7;
        len += 1;
    }
    len
}

/// Fans `config.transfer_amount` base units from `source` out to freshly
/// generated owners, `config.batch_size` owners per transaction.
///
/// Runs until `config.duration` has elapsed or `config.max_transactions`
/// transactions were submitted. The budget is checked between transactions
/// only, so the last submission may finish after the deadline. A failed
/// submission is recorded and the run continues; only the initial blockhash
/// fetch and recipient log writes abort it.
pub async fn send_batched_transactions<R: RpcConnection>(
    rpc: &mut R,
    payer: &Keypair,
    source: &Pubkey,
    mint: &Pubkey,
    config: &BatchConfig,
    mut recipient_log: Option<&mut RecipientLog>,
) -> Result<BatchReport> {
    let start_time = Instant::now();
    let mut recent_blockhash = rpc.get_latest_blockhash().await?;
    let mut blockhash_fetched_at = Instant::now();
    let mut outcomes = Vec::new();
    let mut index: u64 = 0;

    loop {
        if start_time.elapsed() >= config.duration {
            debug!("Batch duration {:?} elapsed", config.duration);
            break;
        }
        if config
            .max_transactions
            .is_some_and(|max_transactions| index >= max_transactions)
        {
            debug!("Reached {} transactions", index);
            break;
        }

        // Blockhashes expire after ~150 slots, refresh well before that.
        if index > 0 && blockhash_fetched_at.elapsed() >= config.blockhash_refresh {
            match rpc.get_latest_blockhash().await {
                Ok(blockhash) => {
                    recent_blockhash = blockhash;
                    blockhash_fetched_at = Instant::now();
                }
                Err(e) => warn!("Failed to refresh blockhash, reusing previous: {}", e),
            }
        }

        index += 1;
        let owners: Vec<Pubkey> = (0..config.batch_size)
            .map(|_| Keypair::new().pubkey())
            .collect();
        let (transaction, recipients) =
            build_batch_transaction(payer, source, mint, &owners, config, recent_blockhash)?;
        let signature = transaction.signatures[0];

        let status = match rpc.send_transaction(&transaction).await {
            Ok(signature) => {
                info!("{}-Signature: {}", index, signature);
                if let Some(log) = recipient_log.as_deref_mut() {
                    log.append(&signature, &recipients)?;
                }
                SubmissionStatus::Sent
            }
            Err(e) => {
                warn!("{}-Failed {}: {}", index, signature, e);
                SubmissionStatus::Failed(e.to_string())
            }
        };
        outcomes.push(SubmissionOutcome {
            index,
            signature,
            recipients,
            status,
        });
    }

    if config.confirm {
        confirm_outcomes(rpc, &mut outcomes, config.confirm_timeout).await;
    }

    let report = BatchReport {
        outcomes,
        elapsed: start_time.elapsed(),
    };
    info!(
        "Batch run finished in {:?}: {} transactions, {} succeeded, {} failed, {} confirmed, {} recipients",
        report.elapsed,
        report.submitted(),
        report.succeeded(),
        report.failed(),
        report.confirmed(),
        report.recipients_created()
    );
    Ok(report)
}

/// Polls signature statuses until every sent transaction resolved or
/// `timeout` passed. Unresolved transactions stay `Sent`.
async fn confirm_outcomes<R: RpcConnection>(
    rpc: &mut R,
    outcomes: &mut [SubmissionOutcome],
    timeout: Duration,
) {
    let deadline = Instant::now() + timeout;
    loop {
        let mut pending: Vec<&mut SubmissionOutcome> = outcomes
            .iter_mut()
            .filter(|outcome| outcome.status == SubmissionStatus::Sent)
            .collect();
        if pending.is_empty() {
            return;
        }

        for chunk in pending.chunks_mut(MAX_GET_SIGNATURE_STATUSES_QUERY_ITEMS) {
            let signatures: Vec<Signature> =
                chunk.iter().map(|outcome| outcome.signature).collect();
            let statuses = match rpc.get_signature_statuses(&signatures).await {
                Ok(statuses) => statuses,
                Err(e) => {
                    warn!("Failed to fetch signature statuses: {}", e);
                    continue;
                }
            };
            for (outcome, status) in chunk.iter_mut().zip(statuses) {
                let Some(status) = status else {
                    continue;
                };
                if let Some(err) = status.err {
                    warn!("{}-Failed {}: {}", outcome.index, outcome.signature, err);
                    outcome.status = SubmissionStatus::Failed(err.to_string());
                } else if status.satisfies_commitment(CommitmentConfig::confirmed()) {
                    outcome.status = SubmissionStatus::Confirmed;
                }
            }
        }

        if Instant::now() >= deadline {
            let unresolved = outcomes
                .iter()
                .filter(|outcome| outcome.status == SubmissionStatus::Sent)
                .count();
            if unresolved > 0 {
                warn!(
                    "{} transactions unconfirmed after {:?}",
                    unresolved, timeout
                );
            }
            return;
        }
        sleep(CONFIRM_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use solana_sdk::packet::PACKET_DATA_SIZE;

    use super::*;

    #[test]
    fn batch_of_ten_has_twenty_instructions() {
        let payer = Keypair::new();
        let mint = Keypair::new().pubkey();
        let source = Keypair::new().pubkey();
        let owners: Vec<Pubkey> = (0..10).map(|_| Keypair::new().pubkey()).collect();
        let config = BatchConfig::default();

        let (transaction, recipients) =
            build_batch_transaction(&payer, &source, &mint, &owners, &config, Hash::default())
                .unwrap();

        assert_eq!(transaction.message.instructions.len(), 20);
        assert_eq!(recipients.len(), 10);
        assert_eq!(transaction.message.account_keys[0], payer.pubkey());
        assert!(transaction.verify().is_ok());
        for (recipient, owner) in recipients.iter().zip(&owners) {
            assert_eq!(recipient.owner, *owner);
        }
    }

    #[test]
    fn compute_budget_instructions_come_first() {
        let payer = Keypair::new();
        let owners = vec![Keypair::new().pubkey()];
        let config = BatchConfig {
            compute_unit_price: Some(1_000),
            compute_unit_limit: Some(400_000),
            ..BatchConfig::default()
        };

        let (transaction, _) = build_batch_transaction(
            &payer,
            &Keypair::new().pubkey(),
            &Keypair::new().pubkey(),
            &owners,
            &config,
            Hash::default(),
        )
        .unwrap();

        let program_ids: Vec<Pubkey> = transaction
            .message
            .instructions
            .iter()
            .map(|ix| transaction.message.account_keys[ix.program_id_index as usize])
            .collect();
        assert_eq!(program_ids.len(), 4);
        assert_eq!(program_ids[0], solana_sdk::compute_budget::id());
        assert_eq!(program_ids[1], solana_sdk::compute_budget::id());
    }

    #[test]
    fn default_batch_fits_in_packet() {
        let size = batch_transaction_size(&BatchConfig::default()).unwrap();
        assert!(size <= PACKET_DATA_SIZE, "size {}", size);
    }

    #[test]
    fn oversized_batch_exceeds_packet() {
        let config = BatchConfig {
            batch_size: 30,
            ..BatchConfig::default()
        };
        assert!(batch_transaction_size(&config).unwrap() > PACKET_DATA_SIZE);
    }

    #[test]
    fn transaction_size_matches_wire_encoding() {
        let payer = Keypair::new();
        let owners = vec![Keypair::new().pubkey()];
        let (transaction, _) = build_batch_transaction(
            &payer,
            &Keypair::new().pubkey(),
            &Keypair::new().pubkey(),
            &owners,
            &BatchConfig::default(),
            Hash::default(),
        )
        .unwrap();
        let message_len = transaction.message.serialize().len();
        assert_eq!(transaction_size(&transaction), 1 + 64 + message_len);
    }

    #[test]
    fn short_vec_lengths() {
        assert_eq!(short_vec_len(0), 1);
        assert_eq!(short_vec_len(127), 1);
        assert_eq!(short_vec_len(128), 2);
        assert_eq!(short_vec_len(16_384), 3);
    }

    #[test]
    fn report_counts() {
        let recipient = Recipient {
            owner: Pubkey::new_unique(),
            associated_account: Pubkey::new_unique(),
        };
        let outcome = |index, status| SubmissionOutcome {
            index,
            signature: Signature::default(),
            recipients: vec![recipient; 10],
            status,
        };
        let report = BatchReport {
            outcomes: vec![
                outcome(1, SubmissionStatus::Confirmed),
                outcome(2, SubmissionStatus::Failed("blockhash not found".into())),
                outcome(3, SubmissionStatus::Sent),
            ],
            elapsed: Duration::from_secs(1),
        };
        assert_eq!(report.submitted(), 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.confirmed(), 1);
        assert_eq!(report.recipients_created(), 20);
    }
}
