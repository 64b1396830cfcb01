//! Maps a rendered operation block back to its specification operation.

use specmark_primitives::{BookmarkIdentity, Operation, OperationKey, SpecDocument};
use tracing::trace;

use crate::view::{NodeId, Slot, ViewTree};

/// Everything an annotator needs about one rendered operation.
///
/// Built fresh for each block on every pass.
#[derive(Debug, Clone)]
pub struct OperationContext<'s> {
	pub block: NodeId,
	pub summary: Option<NodeId>,
	pub description_wrapper: Option<NodeId>,
	pub path: String,
	/// Lowercase, as used for specification lookups.
	pub method: String,
	pub key: OperationKey,
	pub operation: &'s Operation,
	/// `summary + " " + description` of the operation.
	pub summary_text: String,
	pub identity: BookmarkIdentity,
}

/// Correlates `block` with `spec`.
///
/// Returns `None` when the block has no path or method label, or when the
/// labelled operation is not in the specification. Label text is trimmed.
pub fn correlate<'s>(view: &dyn ViewTree, block: NodeId, spec: &'s SpecDocument) -> Option<OperationContext<'s>> {
	let label = |slot| view.slot(block, slot).and_then(|node| view.text(node));
	let (Some(path), Some(method)) = (label(Slot::Path), label(Slot::Method)) else {
		trace!(%block, "block has no path or method label");
		return None;
	};
	let path = path.trim().to_string();
	let method = method.trim().to_ascii_lowercase();

	let Some(operation) = spec.operation(&path, &method) else {
		trace!(%block, %method, %path, "rendered operation not in specification");
		return None;
	};

	Some(OperationContext {
		block,
		summary: view.slot(block, Slot::Summary),
		description_wrapper: view.slot(block, Slot::DescriptionWrapper),
		key: OperationKey::new(&method, path.as_str()),
		summary_text: operation.annotation_text(),
		identity: BookmarkIdentity::for_operation(&path, &method, operation),
		path,
		method,
		operation,
	})
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;

	use super::*;
	use crate::view::{Element, HeadlessView};

	fn spec() -> SpecDocument {
		serde_json::from_value(json!({
			"paths": {
				"/api/todo/{id}": {
					"get": { "tags": ["todos"], "operationId": "getTodo", "summary": "Get todo", "description": "✅ done" }
				}
			}
		}))
		.unwrap()
	}

	#[test]
	fn rendered_block_correlates() {
		let spec = spec();
		let view = HeadlessView::render(&spec);
		let block = view.operation_blocks()[0];

		let ctx = correlate(&view, block, &spec).unwrap();
		assert_eq!(ctx.key.to_string(), "GET /api/todo/{id}");
		assert_eq!(ctx.method, "get");
		assert_eq!(ctx.summary_text, "Get todo ✅ done");
		assert_eq!(ctx.identity.sub_tag_name, "getTodotodo");
		assert_eq!(ctx.identity.root_path.as_deref(), Some("todo"));
		assert_eq!(ctx.identity.sub_path.as_deref(), Some("{id}"));
		assert!(ctx.summary.is_some());
		assert!(ctx.description_wrapper.is_some());
	}

	#[test]
	fn unknown_operation_is_skipped() {
		let spec = spec();
		let mut view = HeadlessView::new();
		let block = view.push_block("/api/todo/{id}", "delete", &Operation::default());
		assert!(correlate(&view, block, &spec).is_none());
	}

	#[test]
	fn block_without_labels_is_skipped() {
		let spec = spec();
		let mut view = HeadlessView::new();
		let root = view.root();
		let bare = view.append(root, Element::new("div").with_class("opblock")).unwrap();
		assert!(correlate(&view, bare, &spec).is_none());
	}
}
