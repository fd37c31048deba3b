use std::{fs, path::Path};

use solana_sdk::signature::Keypair;

use crate::errors::KeypairError;

/// Secret key followed by public key, as written by `solana-keygen`.
pub const KEYPAIR_LENGTH: usize = 64;

/// Reads a keypair stored as a JSON array of bytes.
pub fn load_keypair<P: AsRef<Path>>(path: P) -> Result<Keypair, KeypairError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| KeypairError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let format_error = |reason: String| KeypairError::Format {
        path: path.to_path_buf(),
        reason,
    };

    let bytes: Vec<u8> = serde_json::from_str(&contents).map_err(|e| format_error(e.to_string()))?;
    if bytes.len() != KEYPAIR_LENGTH {
        return Err(format_error(format!(
            "expected {} bytes, found {}",
            KEYPAIR_LENGTH,
            bytes.len()
        )));
    }
    Keypair::from_bytes(&bytes).map_err(|e| format_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use solana_sdk::signature::Signer;
    use tempfile::NamedTempFile;

    use super::*;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_same_identity_on_every_read() {
        let keypair = Keypair::new();
        let file = write_temp(&serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap());

        let first = load_keypair(file.path()).unwrap();
        let second = load_keypair(file.path()).unwrap();

        assert_eq!(first.pubkey(), keypair.pubkey());
        assert_eq!(first.pubkey(), second.pubkey());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_keypair(dir.path().join("missing.json"));
        assert!(matches!(result, Err(KeypairError::Io { .. })));
    }

    #[test]
    fn wrong_length_is_format_error() {
        let file = write_temp("[1, 2, 3]");
        let result = load_keypair(file.path());
        assert!(
            matches!(result, Err(KeypairError::Format { ref reason, .. }) if reason.contains("expected 64 bytes"))
        );
    }

    #[test]
    fn non_byte_json_is_format_error() {
        for contents in ["{\"key\": 1}", "not json", "[256, 0]", "[-1]"] {
            let file = write_temp(contents);
            assert!(
                matches!(load_keypair(file.path()), Err(KeypairError::Format { .. })),
                "accepted {}",
                contents
            );
        }
    }
}
