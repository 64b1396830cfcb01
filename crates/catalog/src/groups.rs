//! Grouped-document hierarchy from dotted group names.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Entry of the grouped-document list served next to the specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGroup {
	pub group: String,
	#[serde(default)]
	pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupNode {
	pub group: String,
	pub display_name: String,
	pub children: Vec<GroupNode>,
}

/// Nests `list` by group name: the parent of `a.b.c` is `a.b`.
///
/// Entries whose parent is not in the list are dropped along with their
/// descendants. The first entry wins when a group name repeats.
pub fn build_group_tree(list: &[ApiGroup]) -> Vec<GroupNode> {
	let mut entries: IndexMap<&str, &ApiGroup> = IndexMap::new();
	for item in list {
		entries.entry(item.group.as_str()).or_insert(item);
	}

	let mut roots = Vec::new();
	let mut children: IndexMap<&str, Vec<&str>> = IndexMap::new();
	for &name in entries.keys() {
		match name.rsplit_once('.') {
			Some((parent, _)) if entries.contains_key(parent) => children.entry(parent).or_default().push(name),
			Some(_) => debug!(group = %name, "group parent missing, dropping"),
			None => roots.push(name),
		}
	}

	fn assemble(name: &str, entries: &IndexMap<&str, &ApiGroup>, children: &IndexMap<&str, Vec<&str>>) -> GroupNode {
		let item = entries[name];
		GroupNode {
			group: item.group.clone(),
			display_name: item.display_name.clone(),
			children: children
				.get(name)
				.map(|kids| kids.iter().map(|kid| assemble(kid, entries, children)).collect())
				.unwrap_or_default(),
		}
	}

	roots.into_iter().map(|name| assemble(name, &entries, &children)).collect()
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn group(name: &str) -> ApiGroup {
		ApiGroup {
			group: name.into(),
			display_name: name.to_uppercase(),
		}
	}

	#[test]
	fn nests_by_last_dot() {
		let list = [group("a"), group("a.b.c"), group("a.b"), group("d")];
		let tree = build_group_tree(&list);
		assert_eq!(tree.len(), 2);
		assert_eq!(tree[0].group, "a");
		assert_eq!(tree[0].children[0].group, "a.b");
		assert_eq!(tree[0].children[0].children[0].display_name, "A.B.C");
		assert!(tree[1].children.is_empty());
	}

	#[test]
	fn orphans_are_dropped() {
		let tree = build_group_tree(&[group("x.y"), group("z")]);
		assert_eq!(tree.iter().map(|n| n.group.as_str()).collect::<Vec<_>>(), ["z"]);
	}

	#[test]
	fn reads_display_name_from_json() {
		let list: Vec<ApiGroup> = serde_json::from_str(r#"[{"group":"core","displayName":"Core API"}]"#).unwrap();
		assert_eq!(build_group_tree(&list)[0].display_name, "Core API");
	}
}
