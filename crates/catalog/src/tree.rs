//! Two-level category tree: root tag, then the operations under it.

use indexmap::IndexMap;
use serde::Serialize;
use specmark_primitives::{BookmarkIdentity, SpecDocument};

/// Root node for operations that carry no tag.
pub const UNTAGGED_CATEGORY: &str = "default";

/// Sidebar/modal tree, rebuilt from scratch on every open.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryTree {
	pub children: Vec<CategoryNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryNode {
	pub id: String,
	pub name: String,
	pub children: Vec<OperationLeaf>,
}

/// Displayable operation under a category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationLeaf {
	pub method: String,
	pub path: String,
	pub summary: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub operation_id: Option<String>,
	pub identity: BookmarkIdentity,
	pub bookmarked: bool,
}

/// Groups every operation of `spec` by its first tag.
pub fn build_category_tree(spec: &SpecDocument) -> CategoryTree {
	build_category_tree_with(spec, &[])
}

/// Like [`build_category_tree`], marking leaves whose identity is in
/// `bookmarks`.
pub fn build_category_tree_with(spec: &SpecDocument, bookmarks: &[BookmarkIdentity]) -> CategoryTree {
	let mut roots: IndexMap<&str, Vec<OperationLeaf>> = IndexMap::new();
	for (path, method, op) in spec.operations() {
		let identity = BookmarkIdentity::for_operation(path, method, op);
		let leaf = OperationLeaf {
			method: method.to_string(),
			path: path.to_string(),
			summary: op.summary.clone().unwrap_or_default(),
			operation_id: op.operation_id.clone(),
			bookmarked: bookmarks.contains(&identity),
			identity,
		};
		roots.entry(op.root_tag().unwrap_or(UNTAGGED_CATEGORY)).or_default().push(leaf);
	}

	let children = roots
		.into_iter()
		.map(|(tag, leaves)| CategoryNode {
			id: tag.to_string(),
			name: tag.to_string(),
			children: leaves,
		})
		.collect();
	CategoryTree { children }
}

impl CategoryTree {
	pub fn leaf_count(&self) -> usize {
		self.children.iter().map(|node| node.children.len()).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.children.is_empty()
	}

	pub fn node(&self, id: &str) -> Option<&CategoryNode> {
		self.children.iter().find(|node| node.id == id)
	}

	/// Moves roots named in `order` to the front in that order. Roots not named
	/// keep their relative order after them; unknown ids are ignored.
	pub fn apply_order(&mut self, order: &[String]) {
		let rank = |id: &str| order.iter().position(|o| o == id).unwrap_or(order.len());
		self.children.sort_by_key(|node| rank(&node.id));
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	fn spec() -> SpecDocument {
		serde_json::from_value(json!({
			"tags": [{ "name": "todos" }, { "name": "users" }],
			"paths": {
				"/api/todo": {
					"get": { "tags": ["todos"], "operationId": "listTodos", "summary": "List" },
					"post": { "tags": ["todos"], "operationId": "createTodo", "summary": "Create" }
				},
				"/api/user/me": {
					"get": { "tags": ["users", "todos"], "operationId": "me" }
				},
				"/health": {
					"get": { "operationId": "health" }
				}
			}
		}))
		.unwrap()
	}

	#[test]
	fn groups_by_first_tag() {
		let tree = build_category_tree(&spec());
		let ids: Vec<_> = tree.children.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, ["todos", "users", UNTAGGED_CATEGORY]);
		assert_eq!(tree.leaf_count(), 4);

		let todos = tree.node("todos").unwrap();
		assert_eq!(todos.children[1].method, "post");
		assert_eq!(todos.children[1].summary, "Create");
		assert_eq!(tree.node("users").unwrap().children[0].summary, "");
	}

	#[test]
	fn bookmarked_leaves_are_flagged() {
		let spec = spec();
		let op = spec.operation("/api/todo", "get").unwrap();
		let identity = BookmarkIdentity::for_operation("/api/todo", "get", op);
		let tree = build_category_tree_with(&spec, &[identity]);
		let flags: Vec<_> = tree.node("todos").unwrap().children.iter().map(|l| l.bookmarked).collect();
		assert_eq!(flags, [true, false]);
	}

	#[test]
	fn empty_spec_gives_empty_tree() {
		let tree = build_category_tree(&SpecDocument::default());
		assert!(tree.is_empty());
		assert_eq!(tree.leaf_count(), 0);
	}

	#[test]
	fn persisted_order_moves_named_roots_first() {
		let mut tree = build_category_tree(&spec());
		tree.apply_order(&["users".to_string(), "ghost".to_string()]);
		let ids: Vec<_> = tree.children.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, ["users", "todos", UNTAGGED_CATEGORY]);
	}

	#[test]
	fn leaves_serialize_camel_case() {
		let tree = build_category_tree(&spec());
		let value = serde_json::to_value(&tree).unwrap();
		assert_eq!(value["children"][0]["children"][0]["operationId"], "listTodos");
		assert_eq!(value["children"][0]["children"][0]["identity"]["subTagName"], "listTodostodo");
	}
}
