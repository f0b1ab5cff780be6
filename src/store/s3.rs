//! S3-compatible backend (S3, R2, GCS interop endpoints)

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::operation::put_object::builders::PutObjectFluentBuilder;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{ObjectCannedAcl, StorageClass};
use aws_sdk_s3::Client as S3Client;

use crate::error::{Result, SyncError};
use crate::options::WriteOptions;
use crate::store::{ObjectStore, PutResult, RemoteObjectMeta};

/// Object store backed by an S3-compatible service
pub struct S3Store {
    client: S3Client,
}

impl S3Store {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }

    /// Build a client from ambient AWS configuration (environment,
    /// credentials file, instance profile)
    pub async fn from_env() -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self::new(S3Client::new(&config))
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn head(&self, target: &str, key: &str) -> Result<RemoteObjectMeta> {
        match self
            .client
            .head_object()
            .bucket(target)
            .key(key)
            .send()
            .await
        {
            Ok(response) => Ok(RemoteObjectMeta {
                exists: true,
                fingerprint: response.e_tag().map(String::from),
            }),
            Err(e) => {
                // Buckets that deny HeadObject on missing keys answer 403
                // instead of 404; both mean the object is not there yet.
                let status = e.raw_response().map(|res| res.status().as_u16());
                let service_error = e.into_service_error();
                if service_error.is_not_found() || status == Some(403) {
                    Ok(RemoteObjectMeta::absent())
                } else {
                    Err(SyncError::RemoteLookup(format!(
                        "{key}: {service_error}"
                    )))
                }
            }
        }
    }

    async fn put(&self, options: WriteOptions) -> Result<PutResult> {
        let key = options.key.clone();

        let mut request = self
            .client
            .put_object()
            .bucket(&options.target)
            .key(&options.key)
            .content_type(&options.content_type)
            .body(ByteStream::from(options.body));

        if let Some(encoding) = &options.content_encoding {
            request = request.content_encoding(encoding);
        }
        if let Some(metadata) = options.metadata.clone() {
            request = request.set_metadata(Some(metadata));
        }
        for (field, value) in &options.extra {
            request = apply_extra_field(request, field, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SyncError::RemoteWrite(format!("{key}: {e}")))?;

        Ok(PutResult {
            fingerprint: response.e_tag().map(String::from),
        })
    }
}

/// Map a pass-through write parameter onto the typed request builder
fn apply_extra_field(
    request: PutObjectFluentBuilder,
    field: &str,
    value: &str,
) -> PutObjectFluentBuilder {
    match field {
        "ACL" | "acl" => request.acl(ObjectCannedAcl::from(value)),
        "CacheControl" => request.cache_control(value),
        "ContentDisposition" => request.content_disposition(value),
        "ContentLanguage" => request.content_language(value),
        "StorageClass" => request.storage_class(StorageClass::from(value)),
        "Tagging" => request.tagging(value),
        "WebsiteRedirectLocation" => request.website_redirect_location(value),
        other => {
            tracing::warn!(field = other, "unsupported write parameter, ignoring");
            request
        }
    }
}
