//! blobsync - incremental file to object-store synchronization
//!
//! Uploads local files into a remote key/object store, writing only objects
//! whose content fingerprint actually changed, with per-file control over
//! destination keys, content metadata, and store-specific write parameters.

pub mod config;
pub mod content;
pub mod detect;
pub mod engine;
pub mod error;
pub mod key;
pub mod options;
pub mod record;
pub mod store;

pub use config::{OutcomeHooks, RawParams, SyncConfig, SyncConfigBuilder, ValueSource};
pub use content::{ContentDescriptor, MimeLookup};
pub use detect::{Decision, Freshness, HashAlgorithm};
pub use engine::{SkipReason, SyncEngine, SyncOutcome, SyncReport};
pub use error::{Result, SyncError};
pub use key::KeyTransform;
pub use options::{FieldMapper, WriteOptions};
pub use record::{FileContents, FileRecord};
#[cfg(feature = "s3")]
pub use store::s3::S3Store;
pub use store::{ObjectStore, PutResult, RemoteObjectMeta};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
