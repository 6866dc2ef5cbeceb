use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

use crate::core::config::Settings;
use crate::core::time::now_utc;
use crate::db::ids::{file_id_timestamp, generate_file_id};
use crate::db::{keys, LocalStore, StoreError};
use crate::services::errors::ServiceError;

/// Locator scheme for blobs held in the local store; anything else is an
/// external URL and passes through untouched.
pub const LOCAL_SCHEME: &str = "local://";

/// Share of stored blobs dropped per eviction pass, oldest first.
const EVICT_FRACTION: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFile {
    pub id: String,
    pub file_name: String,
    pub content_type: String,
    pub data_url: String,
    pub size: u64,
    pub sha256: String,
    #[serde(with = "time::serde::rfc3339")]
    pub stored_at: OffsetDateTime,
}

/// Base64 blob store sharing the collection store's keyspace under a
/// `blob_` prefix. Quota handling lives here and only here; entity
/// collections get no such treatment.
#[derive(Debug, Clone)]
pub struct FileStore {
    store: Arc<LocalStore>,
    quota_bytes: u64,
    max_upload_bytes: u64,
    allowed_extensions: Vec<String>,
}

impl FileStore {
    pub fn from_settings(settings: &Settings, store: Arc<LocalStore>) -> Self {
        Self {
            store,
            quota_bytes: settings.store().blob_quota_bytes(),
            max_upload_bytes: settings.store().max_upload_bytes(),
            allowed_extensions: settings.store().allowed_attachment_extensions.clone(),
        }
    }

    /// Persists the bytes as a base64 data URL and returns a `local://<id>`
    /// locator. On a full store the oldest ~20% of blobs are evicted and the
    /// write retried once; if space is still insufficient the call fails with
    /// nothing written.
    pub fn store_file(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, ServiceError> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .ok_or_else(|| ServiceError::Validation(format!("file {file_name} has no extension")))?;
        if !self.allowed_extensions.contains(&extension) {
            return Err(ServiceError::Validation(format!(
                "file type .{extension} is not allowed"
            )));
        }
        if bytes.len() as u64 > self.max_upload_bytes {
            return Err(ServiceError::Validation(format!(
                "file exceeds the {} byte upload limit",
                self.max_upload_bytes
            )));
        }

        let id = generate_file_id();
        let hash = Sha256::digest(bytes);
        let envelope = StoredFile {
            id: id.clone(),
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            data_url: format!("data:{};base64,{}", content_type, STANDARD.encode(bytes)),
            size: bytes.len() as u64,
            sha256: hex::encode(hash),
            stored_at: now_utc(),
        };
        let encoded = serde_json::to_string(&envelope)
            .map_err(|e| ServiceError::internal(e, "Failed to encode file envelope"))?;

        let usage = self
            .usage_bytes()
            .map_err(|e| ServiceError::internal(e, "Failed to measure file store usage"))?;
        if usage + encoded.len() as u64 > self.quota_bytes {
            let evicted = self
                .evict_oldest()
                .map_err(|e| ServiceError::internal(e, "Failed to evict old files"))?;
            tracing::warn!(evicted, "File store over quota; evicted oldest blobs");

            let usage = self
                .usage_bytes()
                .map_err(|e| ServiceError::internal(e, "Failed to measure file store usage"))?;
            if usage + encoded.len() as u64 > self.quota_bytes {
                return Err(ServiceError::Internal(String::from("file store quota exceeded")));
            }
        }

        self.store
            .set_raw(&blob_key(&id), &encoded)
            .map_err(|e| ServiceError::internal(e, "Failed to persist file"))?;

        Ok(format!("{LOCAL_SCHEME}{id}"))
    }

    /// Resolves a locator to its data URL; non-`local://` URLs are returned
    /// unchanged.
    pub fn resolve_url(&self, url: &str) -> Result<String, ServiceError> {
        let Some(id) = url.strip_prefix(LOCAL_SCHEME) else {
            return Ok(url.to_string());
        };
        let file = self
            .load(id)
            .map_err(|e| ServiceError::internal(e, "Failed to read stored file"))?
            .ok_or_else(|| ServiceError::NotFound(format!("file {id} not found")))?;
        Ok(file.data_url)
    }

    /// Full envelope for a locator, `None` for external URLs.
    pub fn metadata(&self, url: &str) -> Result<Option<StoredFile>, ServiceError> {
        let Some(id) = url.strip_prefix(LOCAL_SCHEME) else {
            return Ok(None);
        };
        self.load(id).map_err(|e| ServiceError::internal(e, "Failed to read stored file"))
    }

    /// Removes a locally stored blob; external URLs are a no-op. Returns
    /// whether anything was deleted.
    pub fn delete_url(&self, url: &str) -> Result<bool, ServiceError> {
        let Some(id) = url.strip_prefix(LOCAL_SCHEME) else {
            return Ok(false);
        };
        self.store
            .remove_raw(&blob_key(id))
            .map_err(|e| ServiceError::internal(e, "Failed to delete stored file"))
    }

    pub fn usage_bytes(&self) -> Result<u64, StoreError> {
        let mut total = 0;
        for key in self.store.keys_with_prefix(keys::BLOB_PREFIX)? {
            total += self.store.size_of(&key)?.unwrap_or(0);
        }
        Ok(total)
    }

    fn load(&self, id: &str) -> Result<Option<StoredFile>, StoreError> {
        let Some(raw) = self.store.get_raw(&blob_key(id))? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Decode { key: blob_key(id), source })
    }

    fn evict_oldest(&self) -> Result<usize, StoreError> {
        let mut blob_keys = self.store.keys_with_prefix(keys::BLOB_PREFIX)?;
        if blob_keys.is_empty() {
            return Ok(0);
        }
        // Order by the timestamp embedded in the file id; ids that do not
        // parse sort first and go before anything dated.
        blob_keys.sort_by_key(|key| {
            key.strip_prefix(keys::BLOB_PREFIX).and_then(file_id_timestamp).unwrap_or(i64::MIN)
        });

        let count = ((blob_keys.len() as f64 * EVICT_FRACTION).ceil() as usize).max(1);
        let mut evicted = 0;
        for key in blob_keys.into_iter().take(count) {
            if self.store.remove_raw(&key)? {
                evicted += 1;
            }
        }
        metrics::counter!("blob_evictions_total").increment(evicted as u64);
        Ok(evicted)
    }
}

fn blob_key(id: &str) -> String {
    format!("{}{}", keys::BLOB_PREFIX, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[test]
    fn store_and_resolve_roundtrip() {
        let ctx = test_support::setup_test_context();
        let bytes = "שלום עולם".as_bytes();

        let locator =
            ctx.state.files().store_file("note.png", "image/png", bytes).expect("store file");
        assert!(locator.starts_with(LOCAL_SCHEME));

        let data_url = ctx.state.files().resolve_url(&locator).expect("resolve");
        assert_eq!(data_url, format!("data:image/png;base64,{}", STANDARD.encode(bytes)));

        let meta = ctx.state.files().metadata(&locator).expect("metadata").expect("stored");
        assert_eq!(meta.file_name, "note.png");
        assert_eq!(meta.size, bytes.len() as u64);
        assert_eq!(meta.sha256, hex::encode(Sha256::digest(bytes)));
    }

    #[test]
    fn external_urls_pass_through_untouched() {
        let ctx = test_support::setup_test_context();
        let url = "https://meyda.education.gov.il/exams/math_2023_winter.pdf";

        assert_eq!(ctx.state.files().resolve_url(url).expect("resolve"), url);
        assert_eq!(ctx.state.files().metadata(url).expect("metadata"), None);
        assert!(!ctx.state.files().delete_url(url).expect("delete"));
    }

    #[test]
    fn disallowed_extension_is_rejected() {
        let ctx = test_support::setup_test_context();
        let err = ctx
            .state
            .files()
            .store_file("malware.exe", "application/octet-stream", b"nope")
            .expect_err("extension");
        assert!(matches!(err, ServiceError::Validation(_)), "got {err:?}");
    }

    #[test]
    fn oversize_upload_is_rejected() {
        let ctx = test_support::setup_test_context_with(|| {
            std::env::set_var("MAX_UPLOAD_SIZE_MB", "1");
        });
        let bytes = vec![b'x'; 2 * 1024 * 1024];

        let err =
            ctx.state.files().store_file("big.pdf", "application/pdf", &bytes).expect_err("size");
        assert!(matches!(err, ServiceError::Validation(_)), "got {err:?}");
    }

    #[test]
    fn quota_eviction_drops_oldest_blobs_first() {
        let ctx = test_support::setup_test_context_with(|| {
            std::env::set_var("BLOB_QUOTA_MB", "1");
        });
        let files = ctx.state.files();
        // Each blob encodes to ~400 KiB, so the third write overflows the
        // 1 MiB quota and must push out the oldest.
        let bytes = vec![b'a'; 300 * 1024];

        let first = files.store_file("a.pdf", "application/pdf", &bytes).expect("first");
        let second = files.store_file("b.pdf", "application/pdf", &bytes).expect("second");
        let third = files.store_file("c.pdf", "application/pdf", &bytes).expect("third");

        let err = files.resolve_url(&first).expect_err("oldest evicted");
        assert!(matches!(err, ServiceError::NotFound(_)), "got {err:?}");
        files.resolve_url(&second).expect("second survives");
        files.resolve_url(&third).expect("third survives");
    }

    #[test]
    fn over_quota_after_eviction_fails_without_partial_writes() {
        let ctx = test_support::setup_test_context_with(|| {
            std::env::set_var("BLOB_QUOTA_MB", "1");
            std::env::set_var("MAX_UPLOAD_SIZE_MB", "10");
        });
        let files = ctx.state.files();
        let bytes = vec![b'a'; 2 * 1024 * 1024];

        let err = files.store_file("huge.pdf", "application/pdf", &bytes).expect_err("quota");
        assert!(matches!(err, ServiceError::Internal(_)), "got {err:?}");
        assert_eq!(files.usage_bytes().expect("usage"), 0);
    }
}
