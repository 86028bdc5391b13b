use crate::error::StoreResult;

/// Raw key-value seam beneath the annotation store.
///
/// Values are UTF-8 JSON documents; the byte size of an entry is the UTF-8
/// length of its value. Implementations must satisfy these invariants:
/// - `set` replaces any existing value for the key atomically from the
///   caller's point of view.
/// - `keys` enumerates every stored key, in no particular order.
/// - The backend never interprets values.
/// - All I/O errors are propagated, never silently ignored.
pub trait KeyValueBackend: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, replacing any existing value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove `key`. Returns `true` if the key existed.
    fn remove(&self, key: &str) -> StoreResult<bool>;

    /// Enumerate all stored keys.
    fn keys(&self) -> StoreResult<Vec<String>>;

    /// Returns `true` if `key` exists.
    ///
    /// Default implementation reads the value; backends may override with a
    /// cheaper existence check.
    fn contains(&self, key: &str) -> StoreResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}
