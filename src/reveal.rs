//! Batch reveal: recover student names from RSA-OAEP encrypted payloads.
//!
//! The flow is all-or-nothing only at the edges. A bad private key or a failed
//! fetch fails the batch; anything that goes wrong for one record only marks
//! that record as [`RevealedName::Failed`].
//!
//! ```rust,ignore
//! use sandeul_cleaner::client::CleanerClient;
//! use sandeul_cleaner::reveal;
//!
//! let client = CleanerClient::from_env()?;
//! let names = reveal::reveal_names(&client, &pem, &hashes).await?;
//! for (hash, name) in names.iter() {
//!     println!("{hash}: {name}");
//! }
//! ```

mod batch;
#[cfg(feature = "reveal")]
mod key;
pub mod name;

pub use batch::{RecordFailure, RevealOutcome, dedupe_hashes, reveal_names};
#[cfg(feature = "reveal")]
pub use key::{RevealKey, clean_pem};
pub use name::extract_name;

use base64::Engine;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use std::collections::HashMap;
use std::fmt;

/// Display text for a record that could not be revealed.
pub const FAILURE_SENTINEL: &str = "복호화 실패";

/// Whether this build can decrypt payloads at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealCapability {
    Available,
    Unavailable,
}

impl RevealCapability {
    pub fn is_available(&self) -> bool {
        matches!(self, RevealCapability::Available)
    }
}

/// Reports the decrypt backend compiled into this build.
pub fn capability() -> RevealCapability {
    if cfg!(feature = "reveal") {
        RevealCapability::Available
    } else {
        RevealCapability::Unavailable
    }
}

/// Result of revealing one student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealedName {
    Name(String),
    Failed,
}

impl RevealedName {
    pub fn name(&self) -> Option<&str> {
        match self {
            RevealedName::Name(name) => Some(name),
            RevealedName::Failed => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RevealedName::Failed)
    }
}

impl fmt::Display for RevealedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevealedName::Name(name) => f.write_str(name),
            RevealedName::Failed => f.write_str(FAILURE_SENTINEL),
        }
    }
}

/// `student_hash` to revealed name, produced by one batch and replaced wholesale by the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecryptedNameMap {
    entries: HashMap<String, RevealedName>,
}

impl DecryptedNameMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, student_hash: &str) -> Option<&RevealedName> {
        self.entries.get(student_hash)
    }

    pub fn contains(&self, student_hash: &str) -> bool {
        self.entries.contains_key(student_hash)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RevealedName)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn revealed_count(&self) -> usize {
        self.entries.values().filter(|v| !v.is_failed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries.values().filter(|v| v.is_failed()).count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn insert(&mut self, student_hash: String, name: RevealedName) {
        self.entries.insert(student_hash, name);
    }
}

impl FromIterator<(String, RevealedName)> for DecryptedNameMap {
    fn from_iter<I: IntoIterator<Item = (String, RevealedName)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Standard alphabet, padding optional, ASCII whitespace ignored.
const FORGIVING: GeneralPurpose = GeneralPurpose::new(
    &base64::alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

pub(crate) fn decode_base64(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = input.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    FORGIVING.decode(compact)
}
