//! Key-value store port and the in-memory adapters.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Failures at the store boundary.
///
/// Callers in this crate never propagate these past their own API: reads
/// degrade to defaults and writes are logged and dropped.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	/// The backing store cannot be reached at all.
	#[error("store unavailable: {0}")]
	Unavailable(String),
	/// Writing would exceed the store's capacity.
	#[error("quota exceeded writing '{key}' ({needed} bytes, {available} available)")]
	QuotaExceeded { key: String, needed: usize, available: usize },
	/// Backing file could not be read or written.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
	/// A stored value is not valid JSON for the expected type.
	#[error("malformed value at '{key}': {source}")]
	Malformed {
		key: String,
		#[source]
		source: serde_json::Error,
	},
}

/// Synchronous string store scoped to one origin.
pub trait KeyValueStore: Send + Sync {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
	fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
	fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
		(**self).get(key)
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
		(**self).set(key, value)
	}

	fn remove(&self, key: &str) -> Result<(), StoreError> {
		(**self).remove(key)
	}
}

/// Reads and decodes a JSON value; a missing key is `Ok(None)`.
pub fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>, StoreError> {
	match store.get(key)? {
		Some(raw) => serde_json::from_str(&raw)
			.map(Some)
			.map_err(|source| StoreError::Malformed { key: key.to_string(), source }),
		None => Ok(None),
	}
}

/// Encodes and writes a JSON value.
pub fn write_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), StoreError> {
	let raw = serde_json::to_string(value).map_err(|source| StoreError::Malformed { key: key.to_string(), source })?;
	store.set(key, &raw)
}

/// In-memory store with an optional byte quota over all values.
#[derive(Debug, Default)]
pub struct MemoryStore {
	entries: Mutex<IndexMap<String, String>>,
	quota: Option<usize>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Store that refuses writes once the summed value length would exceed `bytes`.
	pub fn with_quota(bytes: usize) -> Self {
		Self {
			entries: Mutex::default(),
			quota: Some(bytes),
		}
	}

	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.lock().is_empty()
	}

	/// Current keys in insertion order.
	pub fn keys(&self) -> Vec<String> {
		self.entries.lock().keys().cloned().collect()
	}
}

impl KeyValueStore for MemoryStore {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
		Ok(self.entries.lock().get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
		let mut entries = self.entries.lock();
		if let Some(quota) = self.quota {
			let used: usize = entries.iter().filter(|(k, _)| k.as_str() != key).map(|(_, v)| v.len()).sum();
			let available = quota.saturating_sub(used);
			if value.len() > available {
				return Err(StoreError::QuotaExceeded {
					key: key.to_string(),
					needed: value.len(),
					available,
				});
			}
		}
		entries.insert(key.to_string(), value.to_string());
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<(), StoreError> {
		self.entries.lock().shift_remove(key);
		Ok(())
	}
}

/// Prefixes every key with `<scope>:` so several surfaces can share one
/// backing store without colliding.
#[derive(Debug)]
pub struct ScopedStore<S> {
	inner: S,
	scope: String,
}

impl<S: KeyValueStore> ScopedStore<S> {
	pub fn new(inner: S, scope: impl Into<String>) -> Self {
		Self { inner, scope: scope.into() }
	}

	pub fn scope(&self) -> &str {
		&self.scope
	}

	fn scoped(&self, key: &str) -> String {
		if self.scope.is_empty() {
			key.to_string()
		} else {
			format!("{}:{key}", self.scope)
		}
	}
}

impl<S: KeyValueStore> KeyValueStore for ScopedStore<S> {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
		self.inner.get(&self.scoped(key))
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
		self.inner.set(&self.scoped(key), value)
	}

	fn remove(&self, key: &str) -> Result<(), StoreError> {
		self.inner.remove(&self.scoped(key))
	}
}
