//! Change detection via content fingerprint comparison

use std::str::FromStr;

use md5::{Digest as _, Md5};
use sha2::Sha256;

use crate::error::{Result, SyncError};
use crate::store::{ObjectStore, RemoteObjectMeta};

/// Digest used for the local content fingerprint.
///
/// The default matches the remote store's integrity tag convention for
/// single-part objects (128-bit MD5, hex, double-quoted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    #[default]
    Md5,
    Sha256,
    /// Hashing disabled; every file is treated as changed
    None,
}

impl FromStr for HashAlgorithm {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            "none" => Ok(HashAlgorithm::None),
            other => Err(SyncError::Config(format!(
                "unknown hash algorithm '{other}' (expected md5, sha256 or none)"
            ))),
        }
    }
}

/// How the local file relates to the remote object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// No remote object under this key
    New,
    /// Local fingerprint equals the remote fingerprint
    Unchanged,
    /// Fingerprints differ, or equality could not be proven
    Changed,
}

/// Change-detection decision plus the remote metadata it was based on
#[derive(Debug, Clone)]
pub struct Decision {
    pub freshness: Freshness,
    pub remote: RemoteObjectMeta,
}

/// Compare the local payload against the remote object under `key`.
///
/// A missing remote object (including forbidden lookups in restricted
/// setups, which the store maps to "absent") yields `New`. When the payload
/// is `None` (streamed contents) or hashing is disabled, equality cannot be
/// proven and the file is always `Changed`. Classification never considers
/// timestamps, only fingerprints.
pub async fn detect(
    store: &dyn ObjectStore,
    target: &str,
    key: &str,
    payload: Option<&[u8]>,
    algorithm: HashAlgorithm,
) -> Result<Decision> {
    let remote = store.head(target, key).await?;

    if !remote.exists {
        return Ok(Decision {
            freshness: Freshness::New,
            remote,
        });
    }

    let local = payload.and_then(|bytes| quoted_digest(algorithm, bytes));
    let freshness = match (&local, &remote.fingerprint) {
        (Some(local), Some(remote)) if local == remote => Freshness::Unchanged,
        _ => Freshness::Changed,
    };

    Ok(Decision { freshness, remote })
}

/// Hex digest wrapped in double quotes, matching the remote fingerprint
/// convention. `None` when hashing is disabled.
pub fn quoted_digest(algorithm: HashAlgorithm, bytes: &[u8]) -> Option<String> {
    let hex = match algorithm {
        HashAlgorithm::Md5 => hex::encode(Md5::digest(bytes)),
        HashAlgorithm::Sha256 => hex::encode(Sha256::digest(bytes)),
        HashAlgorithm::None => return None,
    };
    Some(format!("\"{hex}\""))
}
