//! File-backed store: one JSON object of string values on disk.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::store::{KeyValueStore, StoreError};

/// Store persisted as a single JSON object, loaded once at open and written
/// through on every mutation.
#[derive(Debug)]
pub struct JsonFileStore {
	path: PathBuf,
	entries: Mutex<IndexMap<String, String>>,
}

impl JsonFileStore {
	/// Opens `path`, starting empty when the file does not exist yet.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();
		let entries = match std::fs::read_to_string(&path) {
			Ok(raw) if raw.trim().is_empty() => IndexMap::new(),
			Ok(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Malformed {
				key: path.display().to_string(),
				source,
			})?,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => IndexMap::new(),
			Err(e) => return Err(e.into()),
		};
		Ok(Self {
			path,
			entries: Mutex::new(entries),
		})
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn flush(&self, entries: &IndexMap<String, String>) -> Result<(), StoreError> {
		if let Some(parent) = self.path.parent()
			&& !parent.as_os_str().is_empty()
		{
			std::fs::create_dir_all(parent)?;
		}
		let raw = serde_json::to_string_pretty(entries).map_err(|source| StoreError::Malformed {
			key: self.path.display().to_string(),
			source,
		})?;
		std::fs::write(&self.path, raw)?;
		Ok(())
	}
}

impl KeyValueStore for JsonFileStore {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
		Ok(self.entries.lock().get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
		let mut entries = self.entries.lock();
		let previous = entries.insert(key.to_string(), value.to_string());
		if let Err(e) = self.flush(&entries) {
			match previous {
				Some(old) => entries.insert(key.to_string(), old),
				None => entries.shift_remove(key),
			};
			return Err(e);
		}
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<(), StoreError> {
		let mut entries = self.entries.lock();
		let Some((index, key, value)) = entries.shift_remove_full(key) else {
			return Ok(());
		};
		if let Err(e) = self.flush(&entries) {
			entries.shift_insert(index, key, value);
			return Err(e);
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn values_survive_reopen() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("nested").join("store.json");

		let store = JsonFileStore::open(&path).unwrap();
		assert_eq!(store.get("usedPath").unwrap(), None);
		store.set("usedPath", "[]").unwrap();
		store.set("seenApis", "{}").unwrap();
		store.remove("usedPath").unwrap();
		drop(store);

		let reopened = JsonFileStore::open(&path).unwrap();
		assert_eq!(reopened.get("seenApis").unwrap().as_deref(), Some("{}"));
		assert_eq!(reopened.get("usedPath").unwrap(), None);
	}

	#[test]
	fn failed_writes_leave_entries_untouched() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("store.json");
		let store = JsonFileStore::open(&path).unwrap();
		store.set("usedPath", "[]").unwrap();
		store.set("seenApis", "{}").unwrap();

		// A directory in place of the file makes every flush fail.
		std::fs::remove_file(&path).unwrap();
		std::fs::create_dir(&path).unwrap();

		assert!(store.remove("usedPath").is_err());
		assert_eq!(store.get("usedPath").unwrap().as_deref(), Some("[]"));
		assert!(store.set("seenApis", "{\"x\":1}").is_err());
		assert_eq!(store.get("seenApis").unwrap().as_deref(), Some("{}"));
		assert_eq!(store.entries.lock().keys().collect::<Vec<_>>(), ["usedPath", "seenApis"]);
	}

	#[test]
	fn corrupt_file_is_reported() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("store.json");
		std::fs::write(&path, "[1, 2").unwrap();
		assert!(matches!(JsonFileStore::open(&path), Err(StoreError::Malformed { .. })));
	}
}
