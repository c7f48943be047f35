//! Webhook audit trail.
//!
//! Every decoded webhook is written to a plain-text log before anything is
//! persisted. Entries are pretty-printed JSON wrapped in provider-tagged
//! delimiter lines, and the newest entry is always at the top of the file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::payload::Payload;
use crate::providers::ProviderKind;

/// Errors raised while appending to the audit log.
#[derive(Debug, Error)]
pub enum AuditLogError {
    #[error("audit log I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize audit entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Destination for webhook audit entries.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, provider: ProviderKind, payload: &Payload) -> Result<(), AuditLogError>;
}

#[derive(Debug, Serialize)]
struct AuditEntry<'a> {
    timestamp: String,
    provider: &'a str,
    payload: Value,
}

/// Renders one delimited audit block, trailing blank line included.
pub fn render_entry(provider: ProviderKind, payload: &Payload) -> Result<String, AuditLogError> {
    let entry = AuditEntry {
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        provider: provider.display_name(),
        payload: payload.to_json(),
    };
    let body = serde_json::to_string_pretty(&entry)?;
    let name = provider.display_name();
    Ok(format!(
        "===== BEGIN {name} webhook =====\n{body}\n===== END {name} webhook =====\n\n"
    ))
}

/// File-backed audit log that prepends each entry.
///
/// Prepending rewrites the whole file; the write goes to a sibling temp file
/// that is renamed over the log so a failed write never truncates it.
#[derive(Debug)]
pub struct FileAuditLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Existing log bytes, passed through untouched.
    async fn read_existing(&self) -> Result<Vec<u8>, std::io::Error> {
        match tokio::fs::read(&self.path).await {
            Ok(contents) => Ok(contents),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl AuditSink for FileAuditLog {
    async fn append(&self, provider: ProviderKind, payload: &Payload) -> Result<(), AuditLogError> {
        let block = render_entry(provider, payload)?;

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let existing = self.read_existing().await?;
        let tmp = self.temp_path();
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(block.as_bytes()).await?;
        file.write_all(&existing).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!(
            provider = provider.slug(),
            path = %self.path.display(),
            bytes = block.len(),
            "Audit entry written"
        );
        Ok(())
    }
}
