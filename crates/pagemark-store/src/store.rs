//! The annotation store proper: key derivation, serialization, byte-quota
//! accounting, LRU eviction, and corruption recovery over a raw
//! [`KeyValueBackend`].

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use pagemark_types::{validate_user_annotations, UserAnnotations};

use crate::backend::KeyValueBackend;
use crate::error::{StoreError, StoreResult};

/// Namespace prefix for every persisted key.
pub const STORAGE_PREFIX: &str = "pagemark";

/// Well-known key holding [`StorageMetadata`].
pub const METADATA_KEY: &str = "pagemark-storage-metadata";

/// Maximum total encoded bytes permitted across all annotation keys.
pub const MAX_STORAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Eviction runs when projected usage reaches this percentage of the quota.
pub const CLEANUP_TRIGGER_PERCENT: u64 = 80;

/// Eviction removes entries until projected usage falls to this percentage.
/// Ten points below the trigger so a completed cleanup is not immediately
/// re-triggered by the next write.
pub const CLEANUP_TARGET_PERCENT: u64 = 70;

const ANNOTATION_SUFFIX: &str = "-annotations";

/// Bookkeeping persisted under [`METADATA_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageMetadata {
    /// Total encoded bytes across all annotation keys, maintained on every
    /// write, delete, eviction, and self-heal.
    pub total_size: u64,
    /// Milliseconds since the UNIX epoch of the last eviction pass.
    pub last_cleanup: u64,
    /// Per-key last-access time in milliseconds since the UNIX epoch.
    /// Keys that were never read or written are absent and sort as 0.
    pub access_times: HashMap<String, u64>,
}

/// Diagnostic snapshot of storage usage. Informational only; callers must
/// not base decisions on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStats {
    pub used_bytes: u64,
    pub max_bytes: u64,
    pub percent_used: f64,
    pub entry_count: usize,
}

/// Durable, quota-bounded persistence of [`UserAnnotations`] aggregates.
///
/// One aggregate per (user, document) pair, stored as a JSON document under
/// `{prefix}-{user}-{document}-annotations`. Saves that would push total
/// usage past the trigger threshold evict least-recently-used aggregates
/// first and fail with [`StoreError::QuotaExceeded`] if eviction cannot make
/// room. Loads self-heal: a blob that cannot be parsed or fails revalidation
/// is deleted and replaced by an empty aggregate.
///
/// The store assumes a single logical writer per key. All mutation is
/// read-modify-write of the whole aggregate, so a concurrent host must
/// serialize access per key (mutex or actor) externally.
pub struct AnnotationStore<B: KeyValueBackend> {
    backend: B,
    max_bytes: u64,
}

impl<B: KeyValueBackend> AnnotationStore<B> {
    /// Create a store with the default 5 MiB quota.
    pub fn new(backend: B) -> Self {
        Self::with_quota(backend, MAX_STORAGE_BYTES)
    }

    /// Create a store with an explicit byte quota.
    pub fn with_quota(backend: B, max_bytes: u64) -> Self {
        Self { backend, max_bytes }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The configured quota in bytes.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Storage key for one (user, document) aggregate.
    pub fn annotation_key(user_id: &str, document_id: &str) -> String {
        format!("{STORAGE_PREFIX}-{user_id}-{document_id}{ANNOTATION_SUFFIX}")
    }

    /// Persist the aggregate for `(user_id, document_id)`.
    ///
    /// Validates first, then serializes, then enforces the quota (running
    /// eviction if the projected usage reaches the trigger threshold).
    /// Eviction bookkeeping is persisted before the write is attempted, so
    /// it stays committed whether the write succeeds, fails, or is refused
    /// with [`StoreError::QuotaExceeded`].
    pub fn save(
        &self,
        user_id: &str,
        document_id: &str,
        annotations: &UserAnnotations,
    ) -> StoreResult<()> {
        check_ids(user_id, document_id)?;
        validate_user_annotations(annotations)?;

        let encoded = serde_json::to_string(annotations)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let key = Self::annotation_key(user_id, document_id);
        let new_len = encoded.len() as u64;
        let existing_len = self.entry_size(&key)?;
        let delta = new_len as i64 - existing_len as i64;

        let mut meta = self.metadata()?;
        if projected(meta.total_size, delta) >= self.trigger_bytes() {
            self.evict(&mut meta, delta, &key)?;
            // Evictions are committed before the write is attempted.
            self.write_metadata(&meta)?;
        }

        let needed = projected(meta.total_size, delta);
        if needed > self.max_bytes {
            return Err(StoreError::QuotaExceeded {
                needed,
                max: self.max_bytes,
            });
        }

        self.backend.set(&key, &encoded)?;
        meta.total_size = needed;
        meta.access_times.insert(key, now_ms());
        self.write_metadata(&meta)?;
        debug!(
            user = user_id,
            document = document_id,
            bytes = new_len,
            "saved annotation set"
        );
        Ok(())
    }

    /// Load the aggregate for `(user_id, document_id)`.
    ///
    /// An absent key yields an empty aggregate. A stored blob that cannot be
    /// parsed, or parses but fails revalidation, is deleted and an empty
    /// aggregate returned; the corruption never propagates to the caller.
    pub fn load(&self, user_id: &str, document_id: &str) -> StoreResult<UserAnnotations> {
        check_ids(user_id, document_id)?;
        let key = Self::annotation_key(user_id, document_id);
        let Some(raw) = self.backend.get(&key)? else {
            return Ok(UserAnnotations::default());
        };

        let annotations = match serde_json::from_str::<UserAnnotations>(&raw) {
            Ok(parsed) => match validate_user_annotations(&parsed) {
                Ok(()) => parsed,
                Err(e) => return self.self_heal(&key, raw.len() as u64, &e.to_string()),
            },
            Err(e) => return self.self_heal(&key, raw.len() as u64, &e.to_string()),
        };

        let mut meta = self.metadata()?;
        meta.access_times.insert(key, now_ms());
        self.write_metadata(&meta)?;
        Ok(annotations)
    }

    /// Remove the aggregate for `(user_id, document_id)`.
    ///
    /// Returns `true` if the key existed. Pure bookkeeping; never triggers
    /// eviction.
    pub fn delete(&self, user_id: &str, document_id: &str) -> StoreResult<bool> {
        check_ids(user_id, document_id)?;
        let key = Self::annotation_key(user_id, document_id);
        let Some(raw) = self.backend.get(&key)? else {
            return Ok(false);
        };

        self.backend.remove(&key)?;
        let mut meta = self.metadata()?;
        meta.total_size = meta.total_size.saturating_sub(raw.len() as u64);
        meta.access_times.remove(&key);
        self.write_metadata(&meta)?;
        Ok(true)
    }

    /// Returns `true` if an aggregate exists for `(user_id, document_id)`.
    pub fn has_annotations(&self, user_id: &str, document_id: &str) -> StoreResult<bool> {
        check_ids(user_id, document_id)?;
        self.backend
            .contains(&Self::annotation_key(user_id, document_id))
    }

    /// Document identifiers with a stored aggregate for `user_id`, sorted.
    pub fn list_documents(&self, user_id: &str) -> StoreResult<Vec<String>> {
        if user_id.trim().is_empty() {
            return Err(StoreError::EmptyUserId);
        }
        let prefix = format!("{STORAGE_PREFIX}-{user_id}-");
        let mut documents: Vec<String> = self
            .annotation_keys()?
            .into_iter()
            .filter_map(|key| {
                key.strip_prefix(&prefix)?
                    .strip_suffix(ANNOTATION_SUFFIX)
                    .map(str::to_owned)
            })
            .collect();
        documents.sort();
        Ok(documents)
    }

    /// Diagnostic usage snapshot, computed by scanning the backend.
    pub fn stats(&self) -> StoreResult<StorageStats> {
        let keys = self.annotation_keys()?;
        let mut used_bytes = 0;
        for key in &keys {
            used_bytes += self.entry_size(key)?;
        }
        let percent_used = if self.max_bytes == 0 {
            0.0
        } else {
            used_bytes as f64 * 100.0 / self.max_bytes as f64
        };
        Ok(StorageStats {
            used_bytes,
            max_bytes: self.max_bytes,
            percent_used,
            entry_count: keys.len(),
        })
    }

    /// The persisted bookkeeping record. Unreadable metadata is rebuilt from
    /// a key scan rather than poisoning every subsequent operation.
    pub fn metadata(&self) -> StoreResult<StorageMetadata> {
        let Some(raw) = self.backend.get(METADATA_KEY)? else {
            return Ok(StorageMetadata::default());
        };
        match serde_json::from_str(&raw) {
            Ok(meta) => Ok(meta),
            Err(e) => {
                warn!(error = %e, "rebuilding unreadable storage metadata");
                self.rebuild_metadata()
            }
        }
    }

    fn write_metadata(&self, meta: &StorageMetadata) -> StoreResult<()> {
        let encoded =
            serde_json::to_string(meta).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.backend.set(METADATA_KEY, &encoded)
    }

    /// Recompute `total_size` from the stored keys. Access times are not
    /// recoverable and start empty, so every key sorts as never-accessed.
    fn rebuild_metadata(&self) -> StoreResult<StorageMetadata> {
        let mut meta = StorageMetadata::default();
        for key in self.annotation_keys()? {
            meta.total_size += self.entry_size(&key)?;
        }
        Ok(meta)
    }

    /// Remove least-recently-used aggregates until projected usage (current
    /// total plus the incoming size delta) falls to the cleanup target.
    ///
    /// Never-accessed keys sort first. The key being written is exempt: its
    /// bytes are already accounted for in the delta. Eviction is best-effort
    /// and may legitimately remove nothing.
    fn evict(
        &self,
        meta: &mut StorageMetadata,
        incoming_delta: i64,
        exclude_key: &str,
    ) -> StoreResult<()> {
        let target = self.max_bytes * CLEANUP_TARGET_PERCENT / 100;
        let mut candidates: Vec<(u64, String)> = self
            .annotation_keys()?
            .into_iter()
            .filter(|key| key != exclude_key)
            .map(|key| (meta.access_times.get(&key).copied().unwrap_or(0), key))
            .collect();
        candidates.sort();

        for (last_access_ms, key) in candidates {
            if projected(meta.total_size, incoming_delta) <= target {
                break;
            }
            let freed = self.entry_size(&key)?;
            self.backend.remove(&key)?;
            meta.total_size = meta.total_size.saturating_sub(freed);
            meta.access_times.remove(&key);
            warn!(
                key = %key,
                freed,
                last_access_ms,
                "evicted least-recently-used annotation set"
            );
        }
        meta.last_cleanup = now_ms();
        Ok(())
    }

    fn self_heal(&self, key: &str, len: u64, reason: &str) -> StoreResult<UserAnnotations> {
        warn!(key = %key, reason, "discarding corrupt annotation set");
        self.backend.remove(key)?;
        let mut meta = self.metadata()?;
        meta.total_size = meta.total_size.saturating_sub(len);
        meta.access_times.remove(key);
        self.write_metadata(&meta)?;
        Ok(UserAnnotations::default())
    }

    fn annotation_keys(&self) -> StoreResult<Vec<String>> {
        let prefix = format!("{STORAGE_PREFIX}-");
        Ok(self
            .backend
            .keys()?
            .into_iter()
            .filter(|key| key.starts_with(&prefix) && key.ends_with(ANNOTATION_SUFFIX))
            .collect())
    }

    fn entry_size(&self, key: &str) -> StoreResult<u64> {
        Ok(self.backend.get(key)?.map(|v| v.len() as u64).unwrap_or(0))
    }

    fn trigger_bytes(&self) -> u64 {
        self.max_bytes * CLEANUP_TRIGGER_PERCENT / 100
    }
}

impl<B: KeyValueBackend> std::fmt::Debug for AnnotationStore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationStore")
            .field("max_bytes", &self.max_bytes)
            .finish()
    }
}

fn check_ids(user_id: &str, document_id: &str) -> StoreResult<()> {
    if user_id.trim().is_empty() {
        return Err(StoreError::EmptyUserId);
    }
    if document_id.trim().is_empty() {
        return Err(StoreError::EmptyDocumentId);
    }
    Ok(())
}

fn projected(total: u64, delta: i64) -> u64 {
    (total as i64 + delta).max(0) as u64
}

fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}
