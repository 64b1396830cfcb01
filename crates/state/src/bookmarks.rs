//! Selection/bookmark store: the persisted list of chosen operations.
//!
//! [`BookmarkStore::toggle`] is the only mutation besides [`BookmarkStore::clear`];
//! every affordance that adds or removes a bookmark goes through it.

use std::fmt;
use std::sync::Arc;

use specmark_primitives::BookmarkIdentity;
use tracing::{debug, warn};

use crate::store::{KeyValueStore, read_json, write_json};

/// Store key of the selection list.
pub const USED_PATH_KEY: &str = "usedPath";

#[derive(Clone)]
pub struct BookmarkStore {
	store: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for BookmarkStore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BookmarkStore").finish_non_exhaustive()
	}
}

impl BookmarkStore {
	pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
		Self { store }
	}

	/// Current selection in insertion order; empty when unreadable.
	pub fn get_all(&self) -> Vec<BookmarkIdentity> {
		match read_json::<Vec<BookmarkIdentity>>(self.store.as_ref(), USED_PATH_KEY) {
			Ok(list) => list.unwrap_or_default(),
			Err(e) => {
				warn!(error = %e, "bookmark list unreadable");
				Vec::new()
			}
		}
	}

	/// Raw selection as stored, distinguishing "never saved" from "empty".
	pub fn saved(&self) -> Option<Vec<BookmarkIdentity>> {
		read_json(self.store.as_ref(), USED_PATH_KEY).unwrap_or_else(|e| {
			warn!(error = %e, "bookmark list unreadable");
			None
		})
	}

	pub fn contains(&self, identity: &BookmarkIdentity) -> bool {
		self.get_all().contains(identity)
	}

	/// Adds `identity` if absent, removes it if present, and returns the new
	/// membership. The list is written back immediately.
	pub fn toggle(&self, identity: &BookmarkIdentity) -> bool {
		let mut list = self.get_all();
		let now_member = match list.iter().position(|item| item == identity) {
			Some(index) => {
				list.remove(index);
				false
			}
			None => {
				list.push(identity.clone());
				true
			}
		};
		debug!(sub_tag = %identity.sub_tag_name, bookmarked = now_member, "bookmark toggled");
		if let Err(e) = write_json(self.store.as_ref(), USED_PATH_KEY, &list) {
			warn!(sub_tag = %identity.sub_tag_name, error = %e, "failed to persist bookmark list");
		}
		now_member
	}

	pub fn clear(&self) {
		if let Err(e) = self.store.remove(USED_PATH_KEY) {
			warn!(error = %e, "failed to clear bookmark list");
		}
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;
	use crate::store::MemoryStore;
	use crate::store::tests::UnavailableStore;

	fn identity(sub: &str) -> BookmarkIdentity {
		BookmarkIdentity {
			root_tag_name: Some("todos".into()),
			sub_tag_name: sub.into(),
			method: "get".into(),
			root_path: Some("2".into()),
			sub_path: Some("todo".into()),
		}
	}

	#[test]
	fn toggle_adds_then_removes() {
		let store = BookmarkStore::new(Arc::new(MemoryStore::new()));
		assert!(store.toggle(&identity("getTodo2")));
		assert!(store.contains(&identity("getTodo2")));
		assert!(!store.toggle(&identity("getTodo2")));
		assert!(store.get_all().is_empty());
		assert_eq!(store.saved(), Some(Vec::new()));
	}

	#[test]
	fn membership_compares_every_field() {
		let store = BookmarkStore::new(Arc::new(MemoryStore::new()));
		store.toggle(&identity("getTodo2"));

		let mut other_method = identity("getTodo2");
		other_method.method = "post".into();
		assert!(!store.contains(&other_method));
		assert!(store.toggle(&other_method));
		assert_eq!(store.get_all().len(), 2);
	}

	#[test]
	fn insertion_order_is_kept() {
		let store = BookmarkStore::new(Arc::new(MemoryStore::new()));
		for sub in ["c", "a", "b"] {
			store.toggle(&identity(sub));
		}
		let subs: Vec<_> = store.get_all().into_iter().map(|i| i.sub_tag_name).collect();
		assert_eq!(subs, ["c", "a", "b"]);
	}

	#[test]
	fn unavailable_store_reads_as_empty() {
		let store = BookmarkStore::new(Arc::new(UnavailableStore));
		assert!(store.toggle(&identity("x")));
		assert!(!store.contains(&identity("x")));
		assert_eq!(store.saved(), None);
	}

	proptest! {
		#[test]
		fn toggle_twice_restores_membership_and_serialized_length(
			existing in proptest::collection::vec("[a-z]{1,6}", 0..6),
			target in "[a-z]{1,6}",
		) {
			let backing = Arc::new(MemoryStore::new());
			let store = BookmarkStore::new(backing.clone());
			for sub in &existing {
				if !store.contains(&identity(sub)) {
					store.toggle(&identity(sub));
				}
			}
			let before_member = store.contains(&identity(&target));
			let before_len = store.get_all().len();
			let before_raw_len = backing.get(USED_PATH_KEY).unwrap().map_or(0, |raw| raw.len());

			store.toggle(&identity(&target));
			store.toggle(&identity(&target));

			prop_assert_eq!(store.contains(&identity(&target)), before_member);
			prop_assert_eq!(store.get_all().len(), before_len);
			let after_raw_len = backing.get(USED_PATH_KEY).unwrap().map_or(0, |raw| raw.len());
			if before_raw_len > 0 {
				prop_assert_eq!(after_raw_len, before_raw_len);
			}
		}
	}
}
