//! Arena-backed [`ViewTree`] used as the renderer stand-in.

use rustc_hash::FxHashMap as HashMap;
use specmark_primitives::{Operation, SpecDocument};

use super::{Element, MutationKind, MutationRecord, NodeId, OPERATION_BLOCK_CLASS, Slot, SubscriptionId, ViewError, ViewTree};

/// Id attribute of the root container.
pub const ROOT_ID: &str = "swagger-ui";

#[derive(Debug)]
struct Node {
	element: Element,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
}

#[derive(Debug)]
struct Subscription {
	root: NodeId,
	records: Vec<MutationRecord>,
}

/// In-memory view tree. Removed nodes leave a tombstone so ids are never reused.
#[derive(Debug)]
pub struct HeadlessView {
	nodes: Vec<Option<Node>>,
	subscriptions: HashMap<SubscriptionId, Subscription>,
	next_subscription: u32,
}

impl Default for HeadlessView {
	fn default() -> Self {
		Self::new()
	}
}

impl HeadlessView {
	/// Empty view holding only the root container.
	pub fn new() -> Self {
		let root = Node {
			element: Element::new("div").with_attribute("id", ROOT_ID),
			parent: None,
			children: Vec::new(),
		};
		Self {
			nodes: vec![Some(root)],
			subscriptions: HashMap::default(),
			next_subscription: 0,
		}
	}

	/// Renders one block per operation of `spec`, in document order.
	pub fn render(spec: &SpecDocument) -> Self {
		let mut view = Self::new();
		for (path, method, op) in spec.operations() {
			view.push_block(path, method, op);
		}
		view
	}

	/// Appends an operation block under the root and returns it.
	///
	/// The structure is: block > summary > (method, path, summary description),
	/// then block > description wrapper > description body when the operation
	/// has a description.
	pub fn push_block(&mut self, path: &str, method: &str, op: &Operation) -> NodeId {
		let root = self.root();
		let method = method.to_ascii_lowercase();
		let block = self.insert(
			root,
			Element::new("div")
				.with_class(OPERATION_BLOCK_CLASS)
				.with_class(format!("opblock-{method}")),
		);
		let summary = self.insert(block, Element::new("div").with_class(Slot::Summary.class_name()));
		self.insert(
			summary,
			Element::new("span")
				.with_class(Slot::Method.class_name())
				.with_text(method.to_ascii_uppercase()),
		);
		self.insert(summary, Element::new("span").with_class(Slot::Path.class_name()).with_text(path));
		self.insert(
			summary,
			Element::new("div")
				.with_class(Slot::DescriptionWrapper.class_name())
				.with_text(op.summary.clone().unwrap_or_default()),
		);
		if let Some(description) = &op.description {
			let wrapper = self.insert(block, Element::new("div").with_class("opblock-description-wrapper"));
			self.insert(
				wrapper,
				Element::new("p")
					.with_class(Slot::DescriptionBody.class_name())
					.with_text(description.as_str()),
			);
		}
		// One record per block, once the subtree is complete.
		self.record(root, MutationKind::ChildAdded);
		block
	}

	pub fn element(&self, node: NodeId) -> Option<&Element> {
		self.node(node).map(|n| &n.element)
	}

	pub fn parent(&self, node: NodeId) -> Option<NodeId> {
		self.node(node)?.parent
	}

	/// Number of attached nodes, root included.
	pub fn len(&self) -> usize {
		self.nodes.iter().flatten().count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() <= 1
	}

	fn node(&self, id: NodeId) -> Option<&Node> {
		self.nodes.get(id.0 as usize)?.as_ref()
	}

	fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, ViewError> {
		self.nodes
			.get_mut(id.0 as usize)
			.and_then(Option::as_mut)
			.ok_or(ViewError::Detached(id))
	}

	fn insert(&mut self, parent: NodeId, element: Element) -> NodeId {
		let id = NodeId(self.nodes.len() as u32);
		self.nodes.push(Some(Node {
			element,
			parent: Some(parent),
			children: Vec::new(),
		}));
		if let Some(Some(p)) = self.nodes.get_mut(parent.0 as usize) {
			p.children.push(id);
		}
		id
	}

	fn is_within(&self, node: NodeId, root: NodeId) -> bool {
		let mut cursor = Some(node);
		while let Some(current) = cursor {
			if current == root {
				return true;
			}
			cursor = self.parent(current);
		}
		false
	}

	fn record(&mut self, target: NodeId, kind: MutationKind) {
		let within: Vec<SubscriptionId> = self
			.subscriptions
			.iter()
			.filter(|(_, sub)| self.is_within(target, sub.root))
			.map(|(id, _)| *id)
			.collect();
		for id in within {
			if let Some(sub) = self.subscriptions.get_mut(&id) {
				sub.records.push(MutationRecord { target, kind });
			}
		}
	}

	fn collect_subtree(&self, node: NodeId, out: &mut Vec<NodeId>) {
		if let Some(n) = self.node(node) {
			for &child in &n.children {
				out.push(child);
				self.collect_subtree(child, out);
			}
		}
	}
}

impl ViewTree for HeadlessView {
	fn root(&self) -> NodeId {
		NodeId(0)
	}

	fn contains(&self, node: NodeId) -> bool {
		self.node(node).is_some()
	}

	fn text(&self, node: NodeId) -> Option<String> {
		self.node(node)?.element.text.clone()
	}

	fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), ViewError> {
		let n = self.node_mut(node)?;
		if n.element.text.as_deref() == Some(text) {
			return Ok(());
		}
		n.element.text = Some(text.to_string());
		self.record(node, MutationKind::TextChanged);
		Ok(())
	}

	fn classes(&self, node: NodeId) -> Vec<String> {
		self.node(node).map(|n| n.element.classes.clone()).unwrap_or_default()
	}

	fn has_class(&self, node: NodeId, class: &str) -> bool {
		self.node(node).is_some_and(|n| n.element.classes.iter().any(|c| c == class))
	}

	fn add_class(&mut self, node: NodeId, class: &str) -> Result<(), ViewError> {
		let n = self.node_mut(node)?;
		if n.element.classes.iter().any(|c| c == class) {
			return Ok(());
		}
		n.element.classes.push(class.to_string());
		self.record(node, MutationKind::ClassChanged);
		Ok(())
	}

	fn remove_class(&mut self, node: NodeId, class: &str) -> Result<(), ViewError> {
		let n = self.node_mut(node)?;
		let before = n.element.classes.len();
		n.element.classes.retain(|c| c != class);
		if n.element.classes.len() != before {
			self.record(node, MutationKind::ClassChanged);
		}
		Ok(())
	}

	fn descendants(&self, node: NodeId) -> Vec<NodeId> {
		let mut out = Vec::new();
		self.collect_subtree(node, &mut out);
		out
	}

	fn append(&mut self, parent: NodeId, element: Element) -> Result<NodeId, ViewError> {
		if !self.contains(parent) {
			return Err(ViewError::Detached(parent));
		}
		let id = self.insert(parent, element);
		self.record(parent, MutationKind::ChildAdded);
		Ok(id)
	}

	fn remove(&mut self, node: NodeId) -> Result<(), ViewError> {
		let parent = self.node_mut(node)?.parent;
		let Some(parent) = parent else {
			return Err(ViewError::Detached(node));
		};
		// Record first, while the parent chain is still intact.
		self.record(parent, MutationKind::ChildRemoved);
		let mut doomed = vec![node];
		self.collect_subtree(node, &mut doomed);
		if let Some(Some(p)) = self.nodes.get_mut(parent.0 as usize) {
			p.children.retain(|&c| c != node);
		}
		for id in doomed {
			if let Some(slot) = self.nodes.get_mut(id.0 as usize) {
				*slot = None;
			}
		}
		Ok(())
	}

	fn observe(&mut self, root: NodeId) -> SubscriptionId {
		let id = SubscriptionId(self.next_subscription);
		self.next_subscription += 1;
		self.subscriptions.insert(id, Subscription { root, records: Vec::new() });
		id
	}

	fn disconnect(&mut self, id: SubscriptionId) {
		self.subscriptions.remove(&id);
	}

	fn take_records(&mut self, id: SubscriptionId) -> Vec<MutationRecord> {
		self.subscriptions
			.get_mut(&id)
			.map(|sub| std::mem::take(&mut sub.records))
			.unwrap_or_default()
	}
}
