//! Run-level configuration
//!
//! Legacy callers addressed several options under two spellings
//! (`keyTransform`/`nameTransform`, `metadata`/`metadataMap`, ...). All of
//! that is normalized here, at load time, so the rest of the crate only ever
//! sees one canonical field per concern.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use crate::content::MimeLookup;
use crate::detect::HashAlgorithm;
use crate::error::{Result, SyncError};
use crate::key::KeyTransform;
use crate::options::{self, FieldMapper};

/// A value that is either fixed for the run or computed per key
pub enum ValueSource<T> {
    Static(T),
    PerKey(Arc<dyn Fn(&str) -> T + Send + Sync>),
}

impl<T: Clone> ValueSource<T> {
    pub fn per_key<F>(f: F) -> Self
    where
        F: Fn(&str) -> T + Send + Sync + 'static,
    {
        ValueSource::PerKey(Arc::new(f))
    }

    pub fn resolve(&self, key: &str) -> T {
        match self {
            ValueSource::Static(value) => value.clone(),
            ValueSource::PerKey(f) => f(key),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ValueSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::Static(value) => f.debug_tuple("Static").field(value).finish(),
            ValueSource::PerKey(_) => f.write_str("PerKey(..)"),
        }
    }
}

/// Per-outcome caller callback, invoked with the resolved key
pub type OutcomeHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Optional hooks fired after an outcome is finalized
#[derive(Clone, Default)]
pub struct OutcomeHooks {
    pub on_new: Option<OutcomeHook>,
    pub on_change: Option<OutcomeHook>,
    pub on_no_change: Option<OutcomeHook>,
}

impl OutcomeHooks {
    pub fn fire_new(&self, key: &str) {
        if let Some(hook) = &self.on_new {
            hook(key);
        }
    }

    pub fn fire_change(&self, key: &str) {
        if let Some(hook) = &self.on_change {
            hook(key);
        }
    }

    pub fn fire_no_change(&self, key: &str) {
        if let Some(hook) = &self.on_no_change {
            hook(key);
        }
    }
}

/// Static configuration subset, as loaded from JSON/TOML by the caller's
/// config layer. Legacy spellings are accepted as aliases; strategy
/// functions can only be attached through the builder.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawParams {
    #[serde(alias = "bucket")]
    pub target: Option<String>,
    pub charset: Option<String>,
    #[serde(alias = "contentEncodingMap")]
    pub content_encoding: Option<String>,
    #[serde(alias = "metadataMap")]
    pub metadata: Option<HashMap<String, String>>,
    #[serde(alias = "etag_hash", alias = "etagHash")]
    pub hash_algorithm: Option<String>,
    pub upload_new_files_only: Option<bool>,
    pub verbose: Option<bool>,
    pub acl: Option<String>,
    /// Anything else is forwarded to the remote write untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Immutable configuration for one sync run
pub struct SyncConfig {
    /// Remote container (bucket-equivalent) identifier
    pub target: String,
    pub key_transform: Option<Arc<dyn KeyTransform>>,
    pub mime_lookup: Option<Arc<dyn MimeLookup>>,
    /// Charset suffix, applied to the HTML media type only
    pub charset: Option<String>,
    pub metadata: Option<ValueSource<HashMap<String, String>>>,
    pub content_encoding: Option<ValueSource<String>>,
    pub field_mappers: HashMap<String, Box<dyn FieldMapper>>,
    pub hash_algorithm: HashAlgorithm,
    pub upload_new_files_only: bool,
    pub verbose: bool,
    /// Write ACL used when the caller supplies none
    pub default_acl: Option<String>,
    /// Store-specific pass-through parameters
    pub extra: BTreeMap<String, String>,
    pub hooks: OutcomeHooks,
}

impl SyncConfig {
    pub fn builder(target: impl Into<String>) -> SyncConfigBuilder {
        SyncConfigBuilder::new(target)
    }
}

impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("target", &self.target)
            .field("key_transform", &self.key_transform.as_ref().map(|_| ".."))
            .field("mime_lookup", &self.mime_lookup.as_ref().map(|_| ".."))
            .field("charset", &self.charset)
            .field("metadata", &self.metadata)
            .field("content_encoding", &self.content_encoding)
            .field(
                "field_mappers",
                &self.field_mappers.keys().collect::<Vec<_>>(),
            )
            .field("hash_algorithm", &self.hash_algorithm)
            .field("upload_new_files_only", &self.upload_new_files_only)
            .field("verbose", &self.verbose)
            .field("default_acl", &self.default_acl)
            .field("extra", &self.extra)
            .finish_non_exhaustive()
    }
}

/// Builder for [`SyncConfig`]
pub struct SyncConfigBuilder {
    config: SyncConfig,
}

impl std::fmt::Debug for SyncConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl SyncConfigBuilder {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            config: SyncConfig {
                target: target.into(),
                key_transform: None,
                mime_lookup: None,
                charset: None,
                metadata: None,
                content_encoding: None,
                field_mappers: HashMap::new(),
                hash_algorithm: HashAlgorithm::default(),
                upload_new_files_only: false,
                verbose: false,
                default_acl: None,
                extra: BTreeMap::new(),
                hooks: OutcomeHooks::default(),
            },
        }
    }

    /// Seed a builder from loaded static parameters
    pub fn from_params(params: RawParams) -> Result<Self> {
        let target = params
            .target
            .ok_or_else(|| SyncError::Config("missing target bucket name".to_string()))?;

        let mut builder = Self::new(target);

        if let Some(charset) = params.charset {
            builder = builder.charset(charset);
        }
        if let Some(encoding) = params.content_encoding {
            builder = builder.content_encoding(encoding);
        }
        if let Some(metadata) = params.metadata {
            builder = builder.metadata(metadata);
        }
        if let Some(algorithm) = params.hash_algorithm {
            builder = builder.hash_algorithm(HashAlgorithm::from_str(&algorithm)?);
        }
        if let Some(flag) = params.upload_new_files_only {
            builder.config.upload_new_files_only = flag;
        }
        if let Some(flag) = params.verbose {
            builder.config.verbose = flag;
        }
        if let Some(acl) = params.acl {
            builder = builder.default_acl(acl);
        }
        for (field, value) in params.extra {
            if options::is_reserved(&field) {
                continue;
            }
            match value {
                serde_json::Value::String(s) => builder.config.extra.insert(field, s),
                serde_json::Value::Number(n) => builder.config.extra.insert(field, n.to_string()),
                serde_json::Value::Bool(b) => builder.config.extra.insert(field, b.to_string()),
                other => {
                    tracing::warn!(field = %field, value = %other, "dropping non-scalar write parameter");
                    None
                }
            };
        }

        Ok(builder)
    }

    pub fn key_transform(mut self, transform: impl KeyTransform + 'static) -> Self {
        self.config.key_transform = Some(Arc::new(transform));
        self
    }

    pub fn mime_lookup(mut self, lookup: impl MimeLookup + 'static) -> Self {
        self.config.mime_lookup = Some(Arc::new(lookup));
        self
    }

    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.config.charset = Some(charset.into());
        self
    }

    pub fn metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.config.metadata = Some(ValueSource::Static(metadata));
        self
    }

    pub fn metadata_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> HashMap<String, String> + Send + Sync + 'static,
    {
        self.config.metadata = Some(ValueSource::per_key(f));
        self
    }

    pub fn content_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.config.content_encoding = Some(ValueSource::Static(encoding.into()));
        self
    }

    pub fn content_encoding_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.config.content_encoding = Some(ValueSource::per_key(f));
        self
    }

    pub fn field_mapper(
        mut self,
        field: impl Into<String>,
        mapper: impl FieldMapper + 'static,
    ) -> Self {
        self.config
            .field_mappers
            .insert(field.into(), Box::new(mapper));
        self
    }

    pub fn hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.config.hash_algorithm = algorithm;
        self
    }

    pub fn upload_new_files_only(mut self, flag: bool) -> Self {
        self.config.upload_new_files_only = flag;
        self
    }

    pub fn verbose(mut self, flag: bool) -> Self {
        self.config.verbose = flag;
        self
    }

    pub fn default_acl(mut self, acl: impl Into<String>) -> Self {
        self.config.default_acl = Some(acl.into());
        self
    }

    pub fn extra_param(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.extra.insert(field.into(), value.into());
        self
    }

    pub fn on_new<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.config.hooks.on_new = Some(Arc::new(hook));
        self
    }

    pub fn on_change<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.config.hooks.on_change = Some(Arc::new(hook));
        self
    }

    pub fn on_no_change<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.config.hooks.on_no_change = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> Result<SyncConfig> {
        if self.config.target.trim().is_empty() {
            return Err(SyncError::Config("missing target bucket name".to_string()));
        }
        Ok(self.config)
    }
}
