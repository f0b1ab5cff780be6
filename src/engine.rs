//! Per-file sync pipeline
//!
//! Files are offered one at a time; the engine never starts file N+1 before
//! file N's pipeline has fully completed, so outcome order always equals
//! input order. Per-file failures become that file's outcome and never halt
//! the run; only configuration errors abort before any file is processed.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use serde::Serialize;
use tokio::io::AsyncReadExt;

use crate::config::SyncConfig;
use crate::content;
use crate::detect::{self, Freshness};
use crate::error::{Result, SyncError};
use crate::key;
use crate::options;
use crate::record::{FileContents, FileRecord};
use crate::store::ObjectStore;

/// Why a file was skipped without a remote write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Record carried no contents
    NoContents,
    /// Remote fingerprint matches the local content
    Unchanged,
    /// Object already exists and the run only uploads new files
    AlreadyExists,
}

/// Per-file result, reported in input order
#[derive(Debug)]
pub enum SyncOutcome {
    Skipped { key: String, reason: SkipReason },
    Created { key: String },
    Updated { key: String },
    Failed { key: String, error: SyncError },
}

impl SyncOutcome {
    /// Stable marker for scripting on outcome logs
    pub fn marker(&self) -> &'static str {
        match self {
            SyncOutcome::Skipped { reason, .. } => match reason {
                SkipReason::NoContents => "no_contents",
                SkipReason::Unchanged => "no_change",
                SkipReason::AlreadyExists => "exists",
            },
            SyncOutcome::Created { .. } => "created",
            SyncOutcome::Updated { .. } => "updated",
            SyncOutcome::Failed { .. } => "failed",
        }
    }
}

/// Running outcome counters, updated only after each outcome is finalized
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub created: u64,
    pub updated: u64,
    pub unchanged: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl SyncReport {
    fn record(&mut self, outcome: &SyncOutcome) {
        match outcome {
            SyncOutcome::Created { .. } => self.created += 1,
            SyncOutcome::Updated { .. } => self.updated += 1,
            SyncOutcome::Skipped {
                reason: SkipReason::Unchanged,
                ..
            } => self.unchanged += 1,
            SyncOutcome::Skipped { .. } => self.skipped += 1,
            SyncOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.created + self.updated + self.unchanged + self.skipped + self.failed
    }
}

/// Materialized payload for one file
struct Payload {
    bytes: Vec<u8>,
    /// Delivered as a non-seekable stream; equality cannot be proven
    streamed: bool,
}

/// Drives the per-file pipeline: resolve key, classify content, detect
/// change, compose options, conditionally write.
pub struct SyncEngine {
    store: Arc<dyn ObjectStore>,
    config: SyncConfig,
    report: SyncReport,
}

impl SyncEngine {
    /// Build an engine for one run. Fails before any file is processed if
    /// the target identifier is missing.
    pub fn new(store: Arc<dyn ObjectStore>, config: SyncConfig) -> Result<Self> {
        if config.target.trim().is_empty() {
            return Err(SyncError::Config("missing target bucket name".to_string()));
        }
        Ok(Self {
            store,
            config,
            report: SyncReport::default(),
        })
    }

    /// Process a single file and report its outcome.
    ///
    /// Taking `&mut self` keeps at most one file in flight per engine.
    pub async fn process(&mut self, record: FileRecord) -> SyncOutcome {
        let relative_path = record.relative_path.clone();
        let outcome = match self.try_process(record).await {
            Ok(outcome) => outcome,
            Err(error) => SyncOutcome::Failed {
                key: relative_path,
                error,
            },
        };

        self.report.record(&outcome);
        self.log(&outcome);
        outcome
    }

    /// Drain an ordered stream of records, strictly one at a time
    pub async fn run<S>(&mut self, mut records: S) -> SyncReport
    where
        S: Stream<Item = FileRecord> + Unpin,
    {
        while let Some(record) = records.next().await {
            self.process(record).await;
        }
        self.report.clone()
    }

    pub fn report(&self) -> &SyncReport {
        &self.report
    }

    async fn try_process(&self, record: FileRecord) -> Result<SyncOutcome> {
        let FileRecord {
            relative_path,
            contents,
            ..
        } = record;

        let payload = match contents {
            FileContents::Empty => {
                return Ok(SyncOutcome::Skipped {
                    key: relative_path,
                    reason: SkipReason::NoContents,
                })
            }
            FileContents::Buffer(bytes) => Payload {
                bytes,
                streamed: false,
            },
            FileContents::Stream {
                mut reader,
                declared_len,
            } => {
                let len = declared_len.ok_or_else(|| {
                    SyncError::UnsupportedInput(format!(
                        "streamed contents for '{relative_path}' carry no declared length"
                    ))
                })?;
                let mut bytes = Vec::with_capacity(len as usize);
                reader.read_to_end(&mut bytes).await?;
                Payload {
                    bytes,
                    streamed: true,
                }
            }
        };

        let key = key::resolve(&relative_path, self.config.key_transform.as_deref())?;
        let descriptor = content::classify(
            &key,
            self.config.mime_lookup.as_deref(),
            self.config.charset.as_deref(),
            self.config.content_encoding.as_ref(),
        );

        let digestable = if payload.streamed {
            None
        } else {
            Some(payload.bytes.as_slice())
        };
        let decision = detect::detect(
            self.store.as_ref(),
            &self.config.target,
            &key,
            digestable,
            self.config.hash_algorithm,
        )
        .await?;

        if decision.freshness == Freshness::Unchanged {
            self.config.hooks.fire_no_change(&key);
            return Ok(SyncOutcome::Skipped {
                key,
                reason: SkipReason::Unchanged,
            });
        }

        if self.config.upload_new_files_only && decision.remote.exists {
            return Ok(SyncOutcome::Skipped {
                key,
                reason: SkipReason::AlreadyExists,
            });
        }

        let mut write = options::compose(&self.config, &key, &descriptor)?;
        write.body = payload.bytes;
        let put = self.store.put(write).await?;

        // The write may land bytes identical to what was already stored
        // (e.g. when hashing was skipped); the returned fingerprint settles
        // the classification.
        let outcome = if !decision.remote.exists {
            self.config.hooks.fire_new(&key);
            SyncOutcome::Created { key }
        } else if put.fingerprint.is_some() && put.fingerprint == decision.remote.fingerprint {
            self.config.hooks.fire_no_change(&key);
            SyncOutcome::Skipped {
                key,
                reason: SkipReason::Unchanged,
            }
        } else {
            self.config.hooks.fire_change(&key);
            SyncOutcome::Updated { key }
        };

        Ok(outcome)
    }

    fn log(&self, outcome: &SyncOutcome) {
        match outcome {
            SyncOutcome::Created { key } => tracing::info!(key = %key, "uploaded"),
            SyncOutcome::Updated { key } => tracing::info!(key = %key, "updated"),
            SyncOutcome::Skipped { key, .. } => {
                if self.config.verbose {
                    tracing::info!(key = %key, marker = outcome.marker(), "skipped");
                } else {
                    tracing::debug!(key = %key, marker = outcome.marker(), "skipped");
                }
            }
            SyncOutcome::Failed { key, error } => {
                tracing::error!(key = %key, kind = error.kind(), error = %error, "failed");
            }
        }
    }
}
