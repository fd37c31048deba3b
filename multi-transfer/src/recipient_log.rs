use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use solana_sdk::signature::Signature;

use crate::{batch::Recipient, errors::MultiTransferError, Result};

/// Append-only ledger of generated recipients, one
/// `signature,owner,associated_account` line each.
#[derive(Debug)]
pub struct RecipientLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl RecipientLog {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| MultiTransferError::RecipientLog {
                path: path.clone(),
                source,
            })?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes one line per recipient and flushes.
    pub fn append(&mut self, signature: &Signature, recipients: &[Recipient]) -> Result<()> {
        recipients
            .iter()
            .try_for_each(|recipient| {
                writeln!(
                    self.writer,
                    "{},{},{}",
                    signature, recipient.owner, recipient.associated_account
                )
            })
            .and_then(|_| self.writer.flush())
            .map_err(|source| MultiTransferError::RecipientLog {
                path: self.path.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use solana_sdk::pubkey::Pubkey;

    use super::*;

    fn recipient() -> Recipient {
        Recipient {
            owner: Pubkey::new_unique(),
            associated_account: Pubkey::new_unique(),
        }
    }

    #[test]
    fn appends_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token-accounts-list.txt");
        let first = recipient();
        let second = recipient();

        let mut log = RecipientLog::open(&path).unwrap();
        log.append(&Signature::default(), &[first]).unwrap();
        drop(log);
        let mut log = RecipientLog::open(&path).unwrap();
        log.append(&Signature::default(), &[second]).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            format!(
                "{},{},{}",
                Signature::default(),
                first.owner,
                first.associated_account
            )
        );
        assert!(lines[1].ends_with(&second.associated_account.to_string()));
    }

    #[test]
    fn flushes_on_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipients.csv");
        let mut log = RecipientLog::open(&path).unwrap();

        log.append(&Signature::default(), &[recipient(), recipient()])
            .unwrap();

        // Visible before the log is dropped.
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 2);
    }

    #[test]
    fn unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = RecipientLog::open(dir.path().join("missing").join("log.csv"));
        assert!(matches!(
            result,
            Err(MultiTransferError::RecipientLog { .. })
        ));
    }
}
