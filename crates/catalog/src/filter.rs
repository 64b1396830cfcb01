//! Reduces a specification to the operations a user selected.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use specmark_primitives::{BookmarkIdentity, Operation, PathItem, SpecDocument, TagObject};
use tracing::debug;

/// Projects `spec` onto the operations matched by `selection`.
///
/// An absent or empty selection gives a document with no tags and no paths
/// (every other top-level field is kept). An operation is retained when some
/// entry has the same method (case-insensitive), composes to exactly its path
/// and names a tag the operation carries. Tags referenced by retained
/// operations survive in first-reference order.
pub fn filter_by_used_paths(spec: &SpecDocument, selection: Option<&[BookmarkIdentity]>) -> SpecDocument {
	let selection = match selection {
		Some(list) if !list.is_empty() => list,
		_ => return spec.with_contents(Vec::new(), IndexMap::new()),
	};

	let wanted: Vec<(String, &BookmarkIdentity)> = selection
		.iter()
		.filter_map(|entry| entry.composed_path().map(|path| (path, entry)))
		.collect();

	let filtered = retain_operations(spec, |path, method, op| {
		wanted.iter().any(|(composed, entry)| {
			entry.method.eq_ignore_ascii_case(method)
				&& composed == path
				&& entry.root_tag_name.as_deref().is_some_and(|tag| op.has_tag(tag))
		})
	});
	debug!(
		selected = selection.len(),
		retained = filtered.operation_count(),
		"filtered specification by selection"
	);
	filtered
}

/// Keeps operations carrying any of `tags`. An empty tag list gives an empty
/// document.
pub fn filter_by_tags(spec: &SpecDocument, tags: &[&str]) -> SpecDocument {
	if tags.is_empty() {
		return spec.with_contents(Vec::new(), IndexMap::new());
	}
	retain_operations(spec, |_, _, op| tags.iter().any(|t| op.has_tag(t)))
}

fn retain_operations<F>(spec: &SpecDocument, mut keep: F) -> SpecDocument
where
	F: FnMut(&str, &str, &Operation) -> bool,
{
	let mut paths = IndexMap::new();
	let mut referenced = IndexSet::new();

	for (path, item) in &spec.paths {
		let mut kept = PathItem {
			operations: IndexMap::new(),
			extra: item.extra.clone(),
		};
		for (method, op) in &item.operations {
			if keep(path, method, op) {
				referenced.extend(op.tags.iter().cloned());
				kept.operations.insert(method.clone(), op.clone());
			}
		}
		if !kept.operations.is_empty() {
			paths.insert(path.clone(), kept);
		}
	}

	let tags = referenced
		.into_iter()
		.map(|name| {
			spec.tags
				.iter()
				.find(|declared| declared.name == name)
				.cloned()
				.unwrap_or_else(|| TagObject::named(name))
		})
		.collect();

	spec.with_contents(tags, paths)
}

/// Size comparison between a source document and a filtered one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterStats {
	pub original_paths: usize,
	pub filtered_paths: usize,
	pub original_operations: usize,
	pub filtered_operations: usize,
	pub original_tags: usize,
	pub filtered_tags: usize,
	/// Retained paths as a percentage of the source's paths.
	pub path_ratio: f64,
}

impl FilterStats {
	pub fn between(original: &SpecDocument, filtered: &SpecDocument) -> Self {
		let path_ratio = if original.path_count() == 0 {
			0.0
		} else {
			filtered.path_count() as f64 / original.path_count() as f64 * 100.0
		};
		Self {
			original_paths: original.path_count(),
			filtered_paths: filtered.path_count(),
			original_operations: original.operation_count(),
			filtered_operations: filtered.operation_count(),
			original_tags: original.tags.len(),
			filtered_tags: filtered.tags.len(),
			path_ratio,
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;

	fn spec() -> SpecDocument {
		serde_json::from_value(json!({
			"openapi": "3.0.1",
			"info": { "title": "Todo API", "version": "v1" },
			"tags": [
				{ "name": "todos", "description": "Todo endpoints" },
				{ "name": "users", "description": "User endpoints" }
			],
			"paths": {
				"/api/2/todo": {
					"get": { "tags": ["todos"], "operationId": "getTodo", "summary": "List todos" },
					"post": { "tags": ["todos"], "operationId": "createTodo" }
				},
				"/api/2/todos": {
					"get": { "tags": ["todos"], "operationId": "getTodos" }
				},
				"/api/3/todo": {
					"get": { "tags": ["todos"], "operationId": "getTodo3" }
				},
				"/api/user/me": {
					"get": { "tags": ["users", "audit"], "operationId": "me" }
				}
			},
			"components": { "schemas": { "Todo": { "type": "object" } } }
		}))
		.unwrap()
	}

	fn selection_entry() -> BookmarkIdentity {
		BookmarkIdentity {
			root_tag_name: Some("todos".into()),
			sub_tag_name: "getTodo2".into(),
			method: "get".into(),
			root_path: Some("2".into()),
			sub_path: Some("todo".into()),
		}
	}

	#[test]
	fn empty_or_absent_selection_yields_empty_document() {
		let spec = spec();
		for filtered in [filter_by_used_paths(&spec, None), filter_by_used_paths(&spec, Some(&[]))] {
			assert!(filtered.tags.is_empty());
			assert!(filtered.paths.is_empty());
			assert_eq!(filtered.extra, spec.extra);
		}
	}

	#[test]
	fn exact_selection_is_retained() {
		let filtered = filter_by_used_paths(&spec(), Some(&[selection_entry()]));
		assert_eq!(filtered.paths.keys().collect::<Vec<_>>(), ["/api/2/todo"]);
		assert_eq!(filtered.paths["/api/2/todo"].operations.keys().collect::<Vec<_>>(), ["get"]);
		assert_eq!(filtered.tags.len(), 1);
		assert_eq!(filtered.tags[0].description.as_deref(), Some("Todo endpoints"));
		assert!(filtered.extra.contains_key("components"));
	}

	#[test]
	fn any_single_field_difference_excludes() {
		let spec = spec();
		let mut variants = Vec::new();

		let mut e = selection_entry();
		e.method = "delete".into();
		variants.push(e);
		let mut e = selection_entry();
		e.root_path = Some("3x".into());
		variants.push(e);
		let mut e = selection_entry();
		e.sub_path = Some("todos2".into());
		variants.push(e);
		let mut e = selection_entry();
		e.root_tag_name = Some("users".into());
		variants.push(e);
		let mut e = selection_entry();
		e.root_tag_name = None;
		variants.push(e);

		for entry in variants {
			let filtered = filter_by_used_paths(&spec, Some(std::slice::from_ref(&entry)));
			assert!(filtered.paths.is_empty(), "entry {entry:?} should match nothing");
		}
	}

	#[test]
	fn method_comparison_ignores_case() {
		let mut entry = selection_entry();
		entry.method = "GET".into();
		let filtered = filter_by_used_paths(&spec(), Some(&[entry]));
		assert_eq!(filtered.operation_count(), 1);
	}

	#[test]
	fn undeclared_tags_become_bare_tag_objects() {
		let entry = BookmarkIdentity {
			root_tag_name: Some("users".into()),
			sub_tag_name: "meuser".into(),
			method: "get".into(),
			root_path: Some("user".into()),
			sub_path: Some("me".into()),
		};
		let filtered = filter_by_used_paths(&spec(), Some(&[entry]));
		let names: Vec<_> = filtered.tags.iter().map(|t| t.name.as_str()).collect();
		assert_eq!(names, ["users", "audit"]);
		assert_eq!(filtered.tags[1], TagObject::named("audit"));
	}

	#[test]
	fn tag_filter_and_stats() {
		let spec = spec();
		let filtered = filter_by_tags(&spec, &["users"]);
		assert_eq!(filtered.operation_count(), 1);
		assert!(filter_by_tags(&spec, &[]).is_empty());

		let stats = FilterStats::between(&spec, &filtered);
		assert_eq!(stats.original_paths, 4);
		assert_eq!(stats.filtered_paths, 1);
		assert_eq!(stats.original_operations, 5);
		assert_eq!(stats.filtered_operations, 1);
		assert!((stats.path_ratio - 25.0).abs() < 1e-9);
	}

	#[test]
	fn filtered_tree_has_one_leaf_per_match_and_no_empty_roots() {
		let spec = spec();
		let mut wrong_tag = selection_entry();
		wrong_tag.root_tag_name = Some("users".into());
		let filtered = filter_by_used_paths(&spec, Some(&[selection_entry(), wrong_tag]));

		let tree = crate::build_category_tree(&filtered);
		assert_eq!(tree.children.len(), 1);
		assert_eq!(tree.children[0].name, "todos");
		assert_eq!(tree.leaf_count(), 1);
		let leaf = &tree.children[0].children[0];
		assert_eq!((leaf.method.as_str(), leaf.path.as_str()), ("get", "/api/2/todo"));
		assert!(tree.node("users").is_none());
	}

	#[test]
	fn operation_tagged_elsewhere_is_excluded_from_the_tree() {
		let spec: SpecDocument = serde_json::from_value(json!({
			"openapi": "3.0.1",
			"tags": [{ "name": "todos" }, { "name": "users" }],
			"paths": {
				"/api/2/todo": {
					"get": { "tags": ["users"], "operationId": "getTodo" }
				}
			}
		}))
		.unwrap();
		let filtered = filter_by_used_paths(&spec, Some(&[selection_entry()]));

		assert!(filtered.paths.is_empty());
		assert!(filtered.tags.is_empty());
		assert!(crate::build_category_tree(&filtered).is_empty());
	}

}
