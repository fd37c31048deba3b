
use std::{collections::HashSet, fs, time::Duration};

use multi_transfer::{
    recipient_log::RecipientLog, send_batched_transactions, BatchConfig, MultiTransferError,
    SubmissionStatus,
};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use test_utils::MockRpc;
use tokio::time::Instant;

struct Accounts {
    payer: Keypair,
    source: Pubkey,
    mint: Pubkey,
}

fn accounts() -> Accounts {
    Accounts {
        payer: Keypair::new(),
        source: Pubkey::new_unique(),
        mint: Pubkey::new_unique(),
    }
}

fn capped(max_transactions: u64) -> BatchConfig {
    BatchConfig {
        duration: Duration::from_secs(60),
        max_transactions: Some(max_transactions),
        ..BatchConfig::default()
    }
}

#[tokio::test]
async fn test_every_transaction_creates_and_funds_ten_recipients() {
    let accounts = accounts();
    let mut rpc = MockRpc::with_latency(Duration::from_millis(5));
    let config = BatchConfig {
        duration: Duration::from_millis(300),
        ..BatchConfig::default()
    };

    let report = send_batched_transactions(
        &mut rpc,
        &accounts.payer,
        &accounts.source,
        &accounts.mint,
        &config,
        None,
    )
    .await
    .unwrap();

    assert!(report.submitted() > 0);
    assert_eq!(report.submitted(), rpc.sent.len());
    assert_eq!(report.failed(), 0);
    for (outcome, transaction) in report.outcomes.iter().zip(&rpc.sent) {
        assert_eq!(transaction.message.instructions.len(), 20);
        assert_eq!(transaction.message.account_keys[0], accounts.payer.pubkey());
        assert_eq!(outcome.signature, transaction.signatures[0]);
        assert_eq!(outcome.recipients.len(), 10);
        assert_eq!(outcome.status, SubmissionStatus::Sent);
    }

    let owners: HashSet<Pubkey> = report
        .outcomes
        .iter()
        .flat_map(|outcome| outcome.recipients.iter().map(|recipient| recipient.owner))
        .collect();
    assert_eq!(owners.len(), report.recipients_created());
}

#[tokio::test]
async fn test_run_stops_after_duration() {
    let accounts = accounts();
    let latency = Duration::from_millis(15);
    let mut rpc = MockRpc::with_latency(latency);
    let config = BatchConfig {
        duration: Duration::from_millis(500),
        ..BatchConfig::default()
    };

    let started = Instant::now();
    let report = send_batched_transactions(
        &mut rpc,
        &accounts.payer,
        &accounts.source,
        &accounts.mint,
        &config,
        None,
    )
    .await
    .unwrap();
    let elapsed = started.elapsed();

    // A send that starts just before the deadline may take up to 3x latency.
    assert!(report.elapsed >= config.duration);
    assert!(
        elapsed < config.duration + latency * 3 + Duration::from_millis(250),
        "ran for {:?}",
        elapsed
    );
    assert!(report.submitted() > 1);
}

#[tokio::test]
async fn test_max_transactions_caps_run() {
    let accounts = accounts();
    let mut rpc = MockRpc::default();

    let report = send_batched_transactions(
        &mut rpc,
        &accounts.payer,
        &accounts.source,
        &accounts.mint,
        &capped(4),
        None,
    )
    .await
    .unwrap();

    assert_eq!(report.submitted(), 4);
    assert_eq!(rpc.sent.len(), 4);
    let indices: Vec<u64> = report.outcomes.iter().map(|outcome| outcome.index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_failed_submissions_do_not_stop_run() {
    let accounts = accounts();
    let mut rpc = MockRpc::failing_every(3);

    let report = send_batched_transactions(
        &mut rpc,
        &accounts.payer,
        &accounts.source,
        &accounts.mint,
        &capped(9),
        None,
    )
    .await
    .unwrap();

    assert_eq!(report.submitted(), 9);
    assert_eq!(report.failed(), 3);
    assert_eq!(report.succeeded(), 6);
    assert_eq!(report.recipients_created(), 60);
    for outcome in &report.outcomes {
        let failed = matches!(outcome.status, SubmissionStatus::Failed(_));
        assert_eq!(failed, outcome.index % 3 == 0, "index {}", outcome.index);
    }
}

#[tokio::test]
async fn test_blockhash_refreshed_every_transaction() {
    let accounts = accounts();
    let mut rpc = MockRpc::default();
    let config = BatchConfig {
        blockhash_refresh: Duration::ZERO,
        ..capped(5)
    };

    send_batched_transactions(
        &mut rpc,
        &accounts.payer,
        &accounts.source,
        &accounts.mint,
        &config,
        None,
    )
    .await
    .unwrap();

    assert_eq!(rpc.blockhash_fetches, 5);
    let blockhashes: HashSet<_> = rpc
        .sent
        .iter()
        .map(|transaction| transaction.message.recent_blockhash)
        .collect();
    assert_eq!(blockhashes.len(), 5);
}

#[tokio::test]
async fn test_blockhash_reused_within_refresh_interval() {
    let accounts = accounts();
    let mut rpc = MockRpc::default();

    send_batched_transactions(
        &mut rpc,
        &accounts.payer,
        &accounts.source,
        &accounts.mint,
        &capped(5),
        None,
    )
    .await
    .unwrap();

    assert_eq!(rpc.blockhash_fetches, 1);
    let first = rpc.sent[0].message.recent_blockhash;
    assert!(rpc
        .sent
        .iter()
        .all(|transaction| transaction.message.recent_blockhash == first));
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_blockhash() {
    let accounts = accounts();
    let mut rpc = MockRpc::with_blockhash_fetch_limit(1);
    let config = BatchConfig {
        blockhash_refresh: Duration::ZERO,
        ..capped(3)
    };

    let report = send_batched_transactions(
        &mut rpc,
        &accounts.payer,
        &accounts.source,
        &accounts.mint,
        &config,
        None,
    )
    .await
    .unwrap();

    assert_eq!(report.succeeded(), 3);
    let first = rpc.sent[0].message.recent_blockhash;
    assert!(rpc
        .sent
        .iter()
        .all(|transaction| transaction.message.recent_blockhash == first));
}

#[tokio::test]
async fn test_initial_blockhash_failure_aborts() {
    let accounts = accounts();
    let mut rpc = MockRpc::with_blockhash_fetch_limit(0);

    let result = send_batched_transactions(
        &mut rpc,
        &accounts.payer,
        &accounts.source,
        &accounts.mint,
        &capped(3),
        None,
    )
    .await;

    assert!(matches!(result, Err(MultiTransferError::Rpc(_))));
    assert!(rpc.sent.is_empty());
}

#[tokio::test]
async fn test_confirm_marks_sent_transactions_confirmed() {
    let accounts = accounts();
    let mut rpc = MockRpc::failing_every(2);
    let config = BatchConfig {
        confirm: true,
        confirm_timeout: Duration::from_secs(5),
        ..capped(4)
    };

    let report = send_batched_transactions(
        &mut rpc,
        &accounts.payer,
        &accounts.source,
        &accounts.mint,
        &config,
        None,
    )
    .await
    .unwrap();

    assert_eq!(report.confirmed(), 2);
    assert_eq!(report.failed(), 2);
    assert!(report
        .outcomes
        .iter()
        .all(|outcome| outcome.status != SubmissionStatus::Sent));
}

#[tokio::test]
async fn test_recipient_log_lists_sent_recipients_only() {
    let accounts = accounts();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token-accounts-list.txt");
    let mut log = RecipientLog::open(&path).unwrap();
    let mut rpc = MockRpc::failing_every(2);

    let report = send_batched_transactions(
        &mut rpc,
        &accounts.payer,
        &accounts.source,
        &accounts.mint,
        &capped(4),
        Some(&mut log),
    )
    .await
    .unwrap();
    drop(log);

    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 20);

    let logged: HashSet<String> = lines
        .iter()
        .map(|line| line.split(',').next().unwrap().to_string())
        .collect();
    let sent: HashSet<String> = report
        .outcomes
        .iter()
        .filter(|outcome| outcome.status == SubmissionStatus::Sent)
        .map(|outcome| outcome.signature.to_string())
        .collect();
    assert_eq!(logged, sent);

    for line in lines {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), 3);
        let owner: Pubkey = fields[1].parse().unwrap();
        let associated_account: Pubkey = fields[2].parse().unwrap();
        assert_eq!(
            associated_account,
            multi_transfer_token_client::get_associated_token_address(&owner, &accounts.mint)
        );
    }
}
