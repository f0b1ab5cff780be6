//! Remote object store seam
//!
//! The engine consumes exactly two operations: an existence/metadata lookup
//! and a write. Backends decide how lookup failures map to "absent" versus
//! fatal; see the S3 backend for the 404/403 convention.

#[cfg(feature = "s3")]
pub mod s3;

use async_trait::async_trait;

use crate::error::Result;
use crate::options::WriteOptions;

/// Metadata for a remote object as observed by a lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteObjectMeta {
    pub exists: bool,
    /// Opaque content fingerprint (quoted hash by convention)
    pub fingerprint: Option<String>,
}

impl RemoteObjectMeta {
    /// Metadata for an object that does not exist
    pub fn absent() -> Self {
        Self::default()
    }
}

/// Result of a write
#[derive(Debug, Clone, Default)]
pub struct PutResult {
    /// Fingerprint of the object as written
    pub fingerprint: Option<String>,
}

/// Remote key/object store consumed by the sync engine
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Look up an object's existence and fingerprint.
    ///
    /// "Not found" (and "forbidden" where lookups are permission-restricted)
    /// must be reported as `Ok` with `exists: false`, never as an error.
    async fn head(&self, target: &str, key: &str) -> Result<RemoteObjectMeta>;

    /// Write an object and return its post-write fingerprint
    async fn put(&self, options: WriteOptions) -> Result<PutResult>;
}
