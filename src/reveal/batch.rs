//! The batch: import key, fetch once, decrypt every record concurrently.

use std::collections::HashSet;

use super::DecryptedNameMap;
use crate::client::EncryptedPayloadSource;
use crate::error::Result;

/// Why a single record could not be revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFailure {
    /// Payload is not valid base64.
    Encoding,
    /// OAEP decryption rejected the ciphertext.
    Decrypt,
    /// Plaintext is not UTF-8.
    Utf8,
    /// Plaintext carries no usable `name`.
    MissingName,
    /// The decrypt task did not complete.
    Aborted,
    /// The service returned nothing for this hash.
    NotReturned,
}

/// Settled result of one record's decrypt task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealOutcome {
    Revealed(String),
    Failed(RecordFailure),
}

/// Drops repeated hashes, keeping first-seen order.
pub fn dedupe_hashes(student_hashes: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(student_hashes.len());
    student_hashes
        .iter()
        .filter(|hash| seen.insert(hash.as_str()))
        .cloned()
        .collect()
}

/// Reveals names for `student_hashes` using the PKCS#8 private key in `pem`.
///
/// The key is imported before anything touches the network, so a bad key
/// produces [`Error::KeyImport`](crate::error::Error::KeyImport) and no request.
/// Otherwise exactly one fetch is made for the deduplicated hash list, and the
/// returned map has exactly one entry per deduplicated hash.
#[cfg(feature = "reveal")]
pub async fn reveal_names<S>(
    source: &S,
    pem: &str,
    student_hashes: &[String],
) -> Result<DecryptedNameMap>
where
    S: EncryptedPayloadSource + ?Sized,
{
    use super::RevealedName;
    use super::key::RevealKey;
    use std::sync::Arc;
    use tracing::{debug, info, warn};

    let key = Arc::new(RevealKey::import(pem)?);

    let requested = dedupe_hashes(student_hashes);
    if requested.is_empty() {
        return Ok(DecryptedNameMap::new());
    }

    let items = source.fetch_encrypted(&requested).await?;

    let mut pending: HashSet<&str> = requested.iter().map(String::as_str).collect();
    let mut tasks = Vec::with_capacity(items.len());
    for item in items {
        if !pending.remove(item.student_hash.as_str()) {
            warn!("ignoring unrequested or repeated payload in encrypted batch");
            continue;
        }
        let key = Arc::clone(&key);
        let handle =
            tokio::task::spawn_blocking(move || decrypt_record(&key, &item.encrypted_payload));
        tasks.push((item.student_hash, handle));
    }

    let mut names = DecryptedNameMap::new();
    for (student_hash, handle) in tasks {
        let outcome = handle
            .await
            .unwrap_or(RevealOutcome::Failed(RecordFailure::Aborted));
        let name = match outcome {
            RevealOutcome::Revealed(name) => RevealedName::Name(name),
            RevealOutcome::Failed(reason) => {
                debug!(?reason, "record could not be revealed");
                RevealedName::Failed
            }
        };
        names.insert(student_hash, name);
    }

    for missing in pending {
        debug!(reason = ?RecordFailure::NotReturned, "record could not be revealed");
        names.insert(missing.to_string(), RevealedName::Failed);
    }

    info!(
        requested = requested.len(),
        revealed = names.revealed_count(),
        failed = names.failed_count(),
        "batch reveal finished"
    );
    Ok(names)
}

/// Without a crypto backend the batch is unavailable; nothing is fetched.
#[cfg(not(feature = "reveal"))]
pub async fn reveal_names<S>(
    _source: &S,
    _pem: &str,
    _student_hashes: &[String],
) -> Result<DecryptedNameMap>
where
    S: EncryptedPayloadSource + ?Sized,
{
    Err(crate::error::Error::CryptoUnavailable)
}

#[cfg(feature = "reveal")]
fn decrypt_record(key: &super::key::RevealKey, payload: &str) -> RevealOutcome {
    let Ok(ciphertext) = super::decode_base64(payload) else {
        return RevealOutcome::Failed(RecordFailure::Encoding);
    };
    let Ok(plaintext) = key.decrypt(&ciphertext) else {
        return RevealOutcome::Failed(RecordFailure::Decrypt);
    };
    let Ok(text) = std::str::from_utf8(&plaintext) else {
        return RevealOutcome::Failed(RecordFailure::Utf8);
    };
    match super::name::extract_name(text) {
        Some(name) => RevealOutcome::Revealed(name),
        None => RevealOutcome::Failed(RecordFailure::MissingName),
    }
}
