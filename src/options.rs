//! Write-option composition

use std::collections::{BTreeMap, HashMap};

use crate::config::SyncConfig;
use crate::content::ContentDescriptor;
use crate::error::{Result, SyncError};

/// Configuration fields that drive the core's own logic and must never be
/// forwarded to the remote write, under either naming convention.
pub const RESERVED_FIELDS: &[&str] = &[
    "target",
    "bucket",
    "keyTransform",
    "nameTransform",
    "mimeTypeLookup",
    "mimeTypeLookupOverride",
    "metadata",
    "metadataMap",
    "contentEncoding",
    "contentEncodingMap",
    "maps",
    "fieldMappers",
    "charset",
    "verbose",
    "uploadNewFilesOnly",
    "hashAlgorithm",
    "etag_hash",
    "etagHash",
    "onNew",
    "onChange",
    "onNoChange",
    "Bucket",
    "Key",
    "Body",
    "ContentType",
    "ContentEncoding",
    "Metadata",
];

/// Strategy computing a write-field value per key.
///
/// Plain closures returning `String` implement this; implement the trait
/// directly when the mapping can fail.
pub trait FieldMapper: Send + Sync {
    fn value(&self, key: &str) -> Result<String>;
}

impl<F> FieldMapper for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn value(&self, key: &str) -> Result<String> {
        Ok(self(key))
    }
}

/// Final parameter set for one remote write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub target: String,
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
    pub content_encoding: Option<String>,
    pub metadata: Option<HashMap<String, String>>,
    /// Store-specific pass-through parameters (ACL, cache-control, ...)
    pub extra: BTreeMap<String, String>,
}

pub fn is_reserved(field: &str) -> bool {
    RESERVED_FIELDS.contains(&field)
}

/// Compose the write options for one file.
///
/// Seeded from the caller's pass-through parameters with reserved fields
/// removed, then metadata and content-encoding by their precedence rules,
/// then per-field mappers (which override anything set so far). Target and
/// key are assigned last and cannot be redirected by any mapper or static
/// field; the body is attached by the engine.
pub fn compose(
    config: &SyncConfig,
    key: &str,
    descriptor: &ContentDescriptor,
) -> Result<WriteOptions> {
    let mut options = WriteOptions {
        content_type: descriptor.mime_type.clone(),
        content_encoding: descriptor.content_encoding.clone(),
        ..WriteOptions::default()
    };

    for (field, value) in &config.extra {
        if !is_reserved(field) {
            options.extra.insert(field.clone(), value.clone());
        }
    }

    if let Some(acl) = &config.default_acl {
        options
            .extra
            .entry("ACL".to_string())
            .or_insert_with(|| acl.clone());
    }

    options.metadata = config.metadata.as_ref().map(|source| source.resolve(key));

    for (field, mapper) in &config.field_mappers {
        let value = mapper
            .value(key)
            .map_err(|e| SyncError::Callback(format!("field mapper '{field}': {e}")))?;
        match field.as_str() {
            "ContentType" => options.content_type = value,
            "ContentEncoding" => options.content_encoding = Some(value),
            "Bucket" | "Key" | "Body" => {}
            _ => {
                options.extra.insert(field.clone(), value);
            }
        }
    }

    options.target = config.target.clone();
    options.key = key.to_string();

    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SyncConfig, ValueSource};
    use pretty_assertions::assert_eq;

    fn descriptor() -> ContentDescriptor {
        ContentDescriptor {
            mime_type: "application/javascript".to_string(),
            content_encoding: None,
        }
    }

    fn base_config() -> SyncConfig {
        SyncConfig::builder("assets-bucket").build().unwrap()
    }

    #[test]
    fn reserved_fields_never_reach_write_options() {
        let mut config = base_config();
        config
            .extra
            .insert("uploadNewFilesOnly".to_string(), "true".to_string());
        config
            .extra
            .insert("Bucket".to_string(), "evil-bucket".to_string());
        config
            .extra
            .insert("CacheControl".to_string(), "max-age=300".to_string());

        let options = compose(&config, "a.js", &descriptor()).unwrap();
        assert_eq!(options.extra.get("CacheControl").unwrap(), "max-age=300");
        assert!(!options.extra.contains_key("uploadNewFilesOnly"));
        assert!(!options.extra.contains_key("Bucket"));
        assert_eq!(options.target, "assets-bucket");
    }

    #[test]
    fn metadata_precedence_static_over_absent() {
        let mut config = base_config();
        let mut meta = HashMap::new();
        meta.insert("surrogate-key".to_string(), "all".to_string());
        config.metadata = Some(ValueSource::Static(meta.clone()));

        let options = compose(&config, "a.js", &descriptor()).unwrap();
        assert_eq!(options.metadata, Some(meta));
    }

    #[test]
    fn metadata_map_invoked_with_key() {
        let mut config = base_config();
        config.metadata = Some(ValueSource::per_key(|key: &str| {
            let mut meta = HashMap::new();
            meta.insert("source-key".to_string(), key.to_string());
            meta
        }));

        let options = compose(&config, "deep/path.css", &descriptor()).unwrap();
        assert_eq!(
            options.metadata.unwrap().get("source-key").unwrap(),
            "deep/path.css"
        );
    }

    #[test]
    fn field_mapper_overrides_static_value() {
        let mut config = base_config();
        config
            .extra
            .insert("CacheControl".to_string(), "max-age=3600".to_string());
        config.field_mappers.insert(
            "CacheControl".to_string(),
            Box::new(|key: &str| {
                if key == "a.js" {
                    "max-age=60".to_string()
                } else {
                    "max-age=3600".to_string()
                }
            }),
        );

        let options = compose(&config, "a.js", &descriptor()).unwrap();
        assert_eq!(options.extra.get("CacheControl").unwrap(), "max-age=60");

        let options = compose(&config, "b.js", &descriptor()).unwrap();
        assert_eq!(options.extra.get("CacheControl").unwrap(), "max-age=3600");
    }

    #[test]
    fn mapper_cannot_redirect_the_write() {
        let mut config = base_config();
        config
            .field_mappers
            .insert("Bucket".to_string(), Box::new(|_: &str| "other".to_string()));
        config
            .field_mappers
            .insert("Key".to_string(), Box::new(|_: &str| "other".to_string()));

        let options = compose(&config, "a.js", &descriptor()).unwrap();
        assert_eq!(options.target, "assets-bucket");
        assert_eq!(options.key, "a.js");
        assert!(!options.extra.contains_key("Bucket"));
        assert!(!options.extra.contains_key("Key"));
    }

    #[test]
    fn default_acl_yields_to_caller_supplied_acl() {
        let mut config = base_config();
        config.default_acl = Some("public-read".to_string());

        let options = compose(&config, "a.js", &descriptor()).unwrap();
        assert_eq!(options.extra.get("ACL").unwrap(), "public-read");

        config
            .extra
            .insert("ACL".to_string(), "private".to_string());
        let options = compose(&config, "a.js", &descriptor()).unwrap();
        assert_eq!(options.extra.get("ACL").unwrap(), "private");
    }

    #[test]
    fn failing_mapper_is_a_callback_error() {
        struct Broken;
        impl FieldMapper for Broken {
            fn value(&self, _: &str) -> Result<String> {
                Err(SyncError::Callback("boom".into()))
            }
        }
        let mut config = base_config();
        config
            .field_mappers
            .insert("Expires".to_string(), Box::new(Broken));

        let err = compose(&config, "a.js", &descriptor()).unwrap_err();
        assert!(matches!(err, SyncError::Callback(_)));
    }
}
