//! Bookmark identities and the path-segment mapping.
//!
//! A bookmark identity is derived from a rendered operation by splitting its
//! path on `/` and taking the third and fourth segments as `rootPath` and
//! `subPath`. The specification filter rebuilds the path from those two
//! fields with [`compose_path`]. Both directions live in this module so the
//! positional contract is written down exactly once: `/api/todo/{id}` splits
//! into `todo` / `{id}` and `todo` / `{id}` composes back to `/api/todo/{id}`.
//! Paths with fewer or more segments do not survive the round trip; that is
//! observable behavior, not something to repair here.

use serde::{Deserialize, Serialize};

use crate::document::Operation;

/// Fixed prefix of every composed path.
pub const API_PATH_PREFIX: &str = "/api";

/// Positional segments of an operation path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathSegments {
	/// Third `/`-separated segment (index 2).
	pub root_path: Option<String>,
	/// Fourth `/`-separated segment (index 3).
	pub sub_path: Option<String>,
}

impl PathSegments {
	pub fn of(path: &str) -> Self {
		let mut parts = path.split('/');
		let root_path = parts.nth(2).map(str::to_string);
		let sub_path = parts.next().map(str::to_string);
		Self { root_path, sub_path }
	}

	/// Path rebuilt from these segments, see [`compose_path`].
	pub fn compose(&self) -> Option<String> {
		compose_path(self.root_path.as_deref(), self.sub_path.as_deref())
	}
}

/// Rebuilds `/api/<root>/<sub>` and collapses repeated slashes.
///
/// Returns `None` when either segment is absent, so such identities never
/// match any operation.
pub fn compose_path(root_path: Option<&str>, sub_path: Option<&str>) -> Option<String> {
	let (root, sub) = (root_path?, sub_path?);
	let raw = format!("{API_PATH_PREFIX}/{root}/{sub}");

	let mut composed = String::with_capacity(raw.len());
	for ch in raw.chars() {
		if ch == '/' && composed.ends_with('/') {
			continue;
		}
		composed.push(ch);
	}
	Some(composed)
}

/// Five-field identity of a user-selectable operation.
///
/// Equality is structural over all five fields. Absent fields are omitted
/// from the persisted JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkIdentity {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub root_tag_name: Option<String>,
	#[serde(default)]
	pub sub_tag_name: String,
	pub method: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub root_path: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sub_path: Option<String>,
}

impl BookmarkIdentity {
	/// Derives the identity of `operation` rendered at `method path`.
	///
	/// `subTagName` is the operation id followed by the root segment.
	pub fn for_operation(path: &str, method: &str, operation: &Operation) -> Self {
		let PathSegments { root_path, sub_path } = PathSegments::of(path);
		let sub_tag_name = format!(
			"{}{}",
			operation.operation_id.as_deref().unwrap_or_default(),
			root_path.as_deref().unwrap_or_default()
		);
		Self {
			root_tag_name: operation.root_tag().map(str::to_string),
			sub_tag_name,
			method: method.to_ascii_lowercase(),
			root_path,
			sub_path,
		}
	}

	/// Path this identity selects in the filter.
	pub fn composed_path(&self) -> Option<String> {
		compose_path(self.root_path.as_deref(), self.sub_path.as_deref())
	}
}
