//! Specification document model.
//!
//! Only the parts the engine reads are typed (`tags`, `paths`, operation tags,
//! id, summary and description). Everything else is carried through untouched
//! in `extra` maps so a filtered document serializes with all of the source's
//! other top-level fields (`openapi`, `info`, `servers`, `components`, ...).

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::operation::is_http_method;

/// Full or filtered specification document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecDocument {
	#[serde(default)]
	pub tags: Vec<TagObject>,
	#[serde(default)]
	pub paths: IndexMap<String, PathItem>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

/// Declared tag entry of the top-level `tags` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagObject {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl TagObject {
	pub fn named(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			description: None,
			extra: Map::new(),
		}
	}
}

/// One operation (a method entry of a path item).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub tags: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub operation_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub summary: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl Operation {
	/// First tag, which names the operation's category.
	pub fn root_tag(&self) -> Option<&str> {
		self.tags.first().map(String::as_str)
	}

	pub fn has_tag(&self, tag: &str) -> bool {
		self.tags.iter().any(|t| t == tag)
	}

	/// `summary + " " + description`, the text searched for status glyphs.
	pub fn annotation_text(&self) -> String {
		format!(
			"{} {}",
			self.summary.as_deref().unwrap_or_default(),
			self.description.as_deref().unwrap_or_default()
		)
	}
}

/// Path item: method-keyed operations plus any non-operation members
/// (`parameters`, `servers`, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathItem {
	/// Operations keyed by lowercase method, in document order.
	pub operations: IndexMap<String, Operation>,
	pub extra: Map<String, Value>,
}

impl PathItem {
	pub fn get(&self, method: &str) -> Option<&Operation> {
		self.operations.get(&method.to_ascii_lowercase())
	}
}

impl Serialize for PathItem {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.operations.len() + self.extra.len()))?;
		for (method, op) in &self.operations {
			map.serialize_entry(method, op)?;
		}
		for (key, value) in &self.extra {
			map.serialize_entry(key, value)?;
		}
		map.end()
	}
}

impl<'de> Deserialize<'de> for PathItem {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
		let mut item = PathItem::default();
		for (key, value) in raw {
			if is_http_method(&key) {
				let op = serde_json::from_value::<Operation>(value).map_err(|e| D::Error::custom(format!("operation '{key}': {e}")))?;
				item.operations.insert(key.to_ascii_lowercase(), op);
			} else {
				item.extra.insert(key, value);
			}
		}
		Ok(item)
	}
}

impl SpecDocument {
	/// Looks up `paths[path][method]`; the method is matched case-insensitively.
	pub fn operation(&self, path: &str, method: &str) -> Option<&Operation> {
		self.paths.get(path)?.get(method)
	}

	/// Every `(path, method, operation)` triple in document order.
	pub fn operations(&self) -> impl Iterator<Item = (&str, &str, &Operation)> {
		self.paths
			.iter()
			.flat_map(|(path, item)| item.operations.iter().map(move |(method, op)| (path.as_str(), method.as_str(), op)))
	}

	pub fn path_count(&self) -> usize {
		self.paths.len()
	}

	pub fn operation_count(&self) -> usize {
		self.paths.values().map(|item| item.operations.len()).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.paths.is_empty()
	}

	/// Number of operations carrying each tag.
	pub fn operation_count_by_tag(&self) -> BTreeMap<String, usize> {
		let mut counts = BTreeMap::new();
		for (_, _, op) in self.operations() {
			for tag in &op.tags {
				*counts.entry(tag.clone()).or_insert(0) += 1;
			}
		}
		counts
	}

	/// Copy of this document with the given tags and paths; every other
	/// top-level field is kept.
	pub fn with_contents(&self, tags: Vec<TagObject>, paths: IndexMap<String, PathItem>) -> Self {
		Self {
			tags,
			paths,
			extra: self.extra.clone(),
		}
	}
}
