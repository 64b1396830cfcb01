//! View-tree port.
//!
//! The engine never talks to a concrete renderer. It reads and mutates the
//! rendered operations through [`ViewTree`], a small DOM-like surface: nodes
//! with classes and text, append/remove, and a mutation subscription that
//! queues [`MutationRecord`]s until they are taken.
//!
//! Operation blocks and their parts are located by class name (see [`Slot`]),
//! so any renderer that emits the same class structure can be driven.

use std::fmt;

use thiserror::Error;

pub mod headless;

pub use headless::HeadlessView;

/// Class carried by every rendered operation block.
pub const OPERATION_BLOCK_CLASS: &str = "opblock";

/// Handle to a node of a view tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Handle to an active mutation subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u32);

/// Named part of an operation block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
	/// Clickable header row holding method, path and summary.
	Summary,
	/// Path label inside the summary.
	Path,
	/// Method label inside the summary.
	Method,
	/// Summary text container; badges are appended here.
	DescriptionWrapper,
	/// Paragraph of the expanded operation description.
	DescriptionBody,
}

impl Slot {
	pub const fn class_name(self) -> &'static str {
		match self {
			Self::Summary => "opblock-summary",
			Self::Path => "opblock-summary-path",
			Self::Method => "opblock-summary-method",
			Self::DescriptionWrapper => "opblock-summary-description",
			Self::DescriptionBody => "opblock-description",
		}
	}
}

/// Element to be inserted into a view tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
	pub tag: String,
	pub classes: Vec<String>,
	pub text: Option<String>,
	pub attributes: Vec<(String, String)>,
}

impl Element {
	pub fn new(tag: impl Into<String>) -> Self {
		Self {
			tag: tag.into(),
			..Self::default()
		}
	}

	pub fn with_class(mut self, class: impl Into<String>) -> Self {
		self.classes.push(class.into());
		self
	}

	pub fn with_text(mut self, text: impl Into<String>) -> Self {
		self.text = Some(text.into());
		self
	}

	pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.attributes.push((name.into(), value.into()));
		self
	}

	pub fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
	}
}

/// What changed in a [`MutationRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
	ChildAdded,
	ChildRemoved,
	ClassChanged,
	TextChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationRecord {
	pub target: NodeId,
	pub kind: MutationKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
	#[error("node {0} is not attached to the view")]
	Detached(NodeId),
}

/// Mutable, observable view tree.
///
/// Mutators record a [`MutationRecord`] for every subscription whose root is
/// the target or one of its ancestors. Mutations that change nothing (adding
/// a class already present) record nothing.
pub trait ViewTree {
	fn root(&self) -> NodeId;
	fn contains(&self, node: NodeId) -> bool;
	/// Own text of `node`, excluding descendants.
	fn text(&self, node: NodeId) -> Option<String>;
	fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), ViewError>;
	fn classes(&self, node: NodeId) -> Vec<String>;
	fn add_class(&mut self, node: NodeId, class: &str) -> Result<(), ViewError>;
	fn remove_class(&mut self, node: NodeId, class: &str) -> Result<(), ViewError>;
	/// Every descendant of `node` in document order, excluding `node`.
	fn descendants(&self, node: NodeId) -> Vec<NodeId>;
	fn append(&mut self, parent: NodeId, element: Element) -> Result<NodeId, ViewError>;
	/// Detaches `node` and its subtree.
	fn remove(&mut self, node: NodeId) -> Result<(), ViewError>;

	/// Starts queueing records for mutations under `root`.
	fn observe(&mut self, root: NodeId) -> SubscriptionId;
	/// Ends a subscription and discards its queued records. Unknown ids are ignored.
	fn disconnect(&mut self, id: SubscriptionId);
	fn take_records(&mut self, id: SubscriptionId) -> Vec<MutationRecord>;

	fn has_class(&self, node: NodeId, class: &str) -> bool {
		self.classes(node).iter().any(|c| c == class)
	}

	/// First descendant of `within` carrying `class`.
	fn find_by_class(&self, within: NodeId, class: &str) -> Option<NodeId> {
		self.descendants(within).into_iter().find(|&n| self.has_class(n, class))
	}

	fn find_all_by_class(&self, within: NodeId, class: &str) -> Vec<NodeId> {
		self.descendants(within).into_iter().filter(|&n| self.has_class(n, class)).collect()
	}

	/// Descendants with any class starting with `prefix`.
	fn find_all_by_class_prefix(&self, within: NodeId, prefix: &str) -> Vec<NodeId> {
		self.descendants(within)
			.into_iter()
			.filter(|&n| self.classes(n).iter().any(|c| c.starts_with(prefix)))
			.collect()
	}

	/// Every currently rendered operation block.
	fn operation_blocks(&self) -> Vec<NodeId> {
		self.find_all_by_class(self.root(), OPERATION_BLOCK_CLASS)
	}

	fn slot(&self, block: NodeId, slot: Slot) -> Option<NodeId> {
		self.find_by_class(block, slot.class_name())
	}
}
