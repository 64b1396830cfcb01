//! Persisted sidebar ordering, passed through for the tree-order UI.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::store::{KeyValueStore, read_json, write_json};

/// Ordered list of root category ids.
pub const TREE_ORDER_KEY: &str = "apiTreeOrder";
/// Opaque sidebar structure owned by the tree-order UI.
pub const TREE_STRUCTURE_KEY: &str = "apiTreeStructure";

#[derive(Clone)]
pub struct SidebarLayout {
	store: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for SidebarLayout {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SidebarLayout").finish_non_exhaustive()
	}
}

impl SidebarLayout {
	pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
		Self { store }
	}

	/// Saved root order, empty when none was saved or it is unreadable.
	pub fn order(&self) -> Vec<String> {
		read_json(self.store.as_ref(), TREE_ORDER_KEY).unwrap_or_else(|e| {
			warn!(error = %e, "tree order unreadable");
			None
		})
		.unwrap_or_default()
	}

	pub fn save_order(&self, order: &[String]) {
		if let Err(e) = write_json(self.store.as_ref(), TREE_ORDER_KEY, order) {
			warn!(error = %e, "failed to persist tree order");
		}
	}

	pub fn structure(&self) -> Option<Value> {
		read_json(self.store.as_ref(), TREE_STRUCTURE_KEY).unwrap_or_else(|e| {
			warn!(error = %e, "tree structure unreadable");
			None
		})
	}

	pub fn save_structure(&self, structure: &Value) {
		if let Err(e) = write_json(self.store.as_ref(), TREE_STRUCTURE_KEY, structure) {
			warn!(error = %e, "failed to persist tree structure");
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::store::MemoryStore;

	#[test]
	fn order_and_structure_pass_through() {
		let layout = SidebarLayout::new(Arc::new(MemoryStore::new()));
		assert!(layout.order().is_empty());
		assert!(layout.structure().is_none());

		layout.save_order(&["users".to_string(), "todos".to_string()]);
		layout.save_structure(&json!([{ "id": "todos", "open": true }]));

		assert_eq!(layout.order(), ["users", "todos"]);
		assert_eq!(layout.structure().unwrap()[0]["id"], "todos");
	}

	#[test]
	fn malformed_order_reads_as_empty() {
		let store = Arc::new(MemoryStore::new());
		store.set(TREE_ORDER_KEY, "{\"not\": \"a list\"}").unwrap();
		assert!(SidebarLayout::new(store).order().is_empty());
	}
}
